//! Strategies for generating kinematic quantities in property-based tests.
use crate::tensor::to_row_major;
use ::proptest::collection::vec;
use ::proptest::prelude::*;
use nalgebra::{Rotation3, Vector3};

/// A 3x3 deformation gradient $\vec F = \vec I + \vec P$ with $|P_{ij}| < 0.2$.
///
/// Such a matrix is strictly diagonally dominant with a positive diagonal, so that
/// $\det \vec F > 0$ and $\vec F$ is well conditioned.
pub fn deformation_gradient() -> impl Strategy<Value = Vec<f64>> {
    vec(-0.2..0.2, 9).prop_map(|perturbation| {
        perturbation
            .into_iter()
            .enumerate()
            .map(|(idx, p)| if idx % 4 == 0 { 1.0 + p } else { p })
            .collect()
    })
}

/// An arbitrary 3x3 tensor with moderately sized entries.
pub fn tensor3() -> impl Strategy<Value = Vec<f64>> {
    // Pick a small range, so that finite difference approximations remain accurate
    vec(-1.0..1.0, 9)
}

pub fn velocity_gradient() -> impl Strategy<Value = Vec<f64>> {
    tensor3()
}

/// A symmetric 3x3 strain with entries small enough that $\det(2 \vec E + \vec I) > 0$.
pub fn symmetric_strain() -> impl Strategy<Value = Vec<f64>> {
    [-0.1..0.1, -0.1..0.1, -0.1..0.1, -0.1..0.1, -0.1..0.1, -0.1..0.1].prop_map(|[xx, yy, zz, xy, xz, yz]| {
        vec![xx, xy, xz, xy, yy, yz, xz, yz, zz]
    })
}

/// A row-major rotation matrix.
pub fn rotation3() -> impl Strategy<Value = Vec<f64>> {
    let range = -3.0..3.0;
    [range.clone(), range.clone(), range].prop_map(|[x, y, z]| {
        let rotation = Rotation3::new(Vector3::new(x, y, z));
        to_row_major(rotation.matrix())
    })
}

/// An integration parameter in $[0, 1]$.
pub fn alpha() -> impl Strategy<Value = f64> {
    0.0..=1.0
}

/// A time step small enough that the implicit operator $\vec I - \Delta t (1 - \alpha) \vec L$
/// stays invertible for velocity gradients drawn from [`velocity_gradient`].
pub fn time_step() -> impl Strategy<Value = f64> {
    0.01..0.2
}
