//! Finite-strain kinematics with consistent tangents.
//!
//! The crate provides closed-form kinematic building blocks for material point evaluation in
//! finite element and material point solvers: strain measures, push-forward and pull-back
//! operations between the reference and current configurations, the volumetric-isochoric
//! split of the Green-Lagrange strain and a generalized midpoint integrator for the
//! deformation gradient. Every operation that is differentiable has a `_with_jacobian(s)`
//! variant that additionally returns the exact tangents.
//!
//! Tensors are passed as flat row-major slices, see [`tensor`] for the conventions.
pub mod calculus;
pub mod decomposition;
pub mod error;
pub mod evolution;
pub mod mapping;
pub mod measures;
pub mod tensor;
pub mod thermal;

#[cfg(feature = "proptest")]
pub mod proptest;

pub extern crate nalgebra;

pub use error::{ErrorKind, KinematicsError, Result};
pub use tensor::{Jacobian, Real};
