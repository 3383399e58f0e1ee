//! Finite difference approximations of Jacobians.
//!
//! Mainly useful for verifying analytic tangents.
use crate::error::{KinematicsError, Result, WrapError};
use crate::tensor::{Jacobian, Real};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum FiniteDifference {
    /// $(f(x + h e_j) - f(x)) / h$.
    Forward,
    /// $(f(x + h e_j) - f(x - h e_j)) / 2h$.
    #[default]
    Central,
}

/// The perturbation $h = \epsilon |x| + \epsilon$ applied to a component with value $x$.
pub fn relative_step<T: Real>(x: T, eps: T) -> T {
    eps * x.abs() + eps
}

/// Approximates the Jacobian of a function $f: \mathbb{R}^n \rightarrow \mathbb{R}^m$ at `x`
/// with finite differences.
///
/// Each component $x_j$ is perturbed by [`relative_step`]`(x_j, eps)`. The Jacobian is built
/// column by column and has entries $J_{ij} \approx \pd{f_i}{x_j}$, matching the layout of
/// the analytic tangents in this crate.
pub fn approximate_jacobian_fd<T, F>(mut f: F, x: &[T], eps: T, scheme: FiniteDifference) -> Result<Jacobian<T>>
where
    T: Real,
    F: FnMut(&[T]) -> Result<Vec<T>>,
{
    const OP: &str = "approximate_jacobian_fd";
    let f_x = f(x).wrap_error(OP, "failed to evaluate the function at x")?;
    let m = f_x.len();
    let n = x.len();
    let mut x = x.to_vec();
    let mut jacobian = Jacobian::zeros(m, n);

    for j in 0..n {
        let x_j = x[j];
        let h = relative_step(x_j, eps);

        x[j] = x_j + h;
        let f_plus = f(&x).wrap_error(OP, "failed to evaluate the function at a perturbed point")?;
        let (f_minus, width) = match scheme {
            FiniteDifference::Forward => (f_x.clone(), h),
            FiniteDifference::Central => {
                x[j] = x_j - h;
                let f_minus = f(&x).wrap_error(OP, "failed to evaluate the function at a perturbed point")?;
                (f_minus, h + h)
            }
        };
        x[j] = x_j;

        if f_plus.len() != m || f_minus.len() != m {
            return Err(KinematicsError::shape(
                OP,
                "the function output changed length under perturbation",
            ));
        }
        for i in 0..m {
            jacobian[(i, j)] = (f_plus[i] - f_minus[i]) / width;
        }
    }

    Ok(jacobian)
}

/// Approximates the derivative of a scalar-parametrized function $f: \mathbb{R} \rightarrow \mathbb{R}^m$.
pub fn approximate_derivative_fd<T, F>(mut f: F, x: T, eps: T, scheme: FiniteDifference) -> Result<Vec<T>>
where
    T: Real,
    F: FnMut(T) -> Result<Vec<T>>,
{
    let jacobian = approximate_jacobian_fd(|x: &[T]| f(x[0]), &[x], eps, scheme)
        .wrap_error("approximate_derivative_fd", "failed to approximate the derivative")?;
    Ok(jacobian.into_vec())
}
