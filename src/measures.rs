//! Strain and deformation measures with their tangents.
use crate::error::{KinematicsError, Result, WrapError};
use crate::tensor::{
    check_3d, delta, infer_dimension, is_fuzzy_zero, matrix3, square_matrix, to_row_major, try_invert, Jacobian, Real,
};
use nalgebra::{DMatrix, Matrix3};
use numeric_literals::replace_float_literals;
use serde::{Deserialize, Serialize};

/// The configuration in which a displacement gradient is expressed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Configuration {
    /// Gradient with respect to reference coordinates, $\nabla_X \vec u$.
    Reference,
    /// Gradient with respect to current coordinates, $\nabla_x \vec u$.
    Current,
}

/// Computes the deformation gradient $\vec F$ from a displacement gradient.
///
/// For a displacement gradient taken in the reference configuration, $\vec F = \vec I + \nabla_X \vec u$.
/// In the current configuration, $\vec F = (\vec I - \nabla_x \vec u)^{-1}$.
/// The dimension is inferred from the length of `displacement_gradient`.
pub fn deformation_gradient<T: Real>(displacement_gradient: &[T], configuration: Configuration) -> Result<Vec<T>> {
    deformation_gradient_with_dimension(displacement_gradient, configuration).map(|(f, _)| f)
}

#[allow(non_snake_case)]
fn deformation_gradient_with_dimension<T: Real>(
    displacement_gradient: &[T],
    configuration: Configuration,
) -> Result<(Vec<T>, usize)> {
    const OP: &str = "deformation_gradient";
    let dim = infer_dimension(OP, displacement_gradient.len())?;
    let grad_u = square_matrix(dim, displacement_gradient);
    let I = DMatrix::<T>::identity(dim, dim);

    let F = match configuration {
        Configuration::Reference => I + grad_u,
        Configuration::Current => try_invert(OP, "I - grad(u)", I - grad_u)?,
    };
    Ok((to_row_major(&F), dim))
}

/// Computes the deformation gradient and its tangent with respect to the displacement gradient.
///
/// The tangent is the identity in the reference configuration, and
/// $\pd{F_{ij}}{(\nabla_x u)_{kl}} = F_{ik} F_{lj}$ in the current configuration.
#[allow(non_snake_case)]
pub fn deformation_gradient_with_jacobian<T: Real>(
    displacement_gradient: &[T],
    configuration: Configuration,
) -> Result<(Vec<T>, Jacobian<T>)> {
    let (F, dim) = deformation_gradient_with_dimension(displacement_gradient, configuration).wrap_error(
        "deformation_gradient_with_jacobian",
        "failed to compute the deformation gradient",
    )?;

    let dF_dgrad_u = match configuration {
        Configuration::Reference => Jacobian::identity(dim * dim),
        Configuration::Current => Jacobian::fourth_order(dim, |i, j, k, l| F[dim * i + k] * F[dim * l + j]),
    };
    Ok((F, dF_dgrad_u))
}

/// Computes the right Cauchy-Green deformation tensor $\vec C = \vec F^T \vec F$.
#[allow(non_snake_case)]
pub fn right_cauchy_green<T: Real>(deformation_gradient: &[T]) -> Result<Vec<T>> {
    check_3d("right_cauchy_green", "the deformation gradient", deformation_gradient.len())?;
    let F = matrix3(deformation_gradient);
    Ok(to_row_major(&(F.transpose() * F)))
}

/// Computes $\vec C$ and its tangent
/// $$ \pd{C_{IJ}}{F_{kK}} = \delta_{IK} F_{kJ} + \delta_{JK} F_{kI}. $$
#[allow(non_snake_case)]
pub fn right_cauchy_green_with_jacobian<T: Real>(deformation_gradient: &[T]) -> Result<(Vec<T>, Jacobian<T>)> {
    let C = right_cauchy_green(deformation_gradient).wrap_error(
        "right_cauchy_green_with_jacobian",
        "failed to compute the right Cauchy-Green deformation tensor",
    )?;
    let F = deformation_gradient;
    let dC_dF = Jacobian::fourth_order(3, |I, J, k, K| {
        delta::<T>(I, K) * F[3 * k + J] + delta::<T>(J, K) * F[3 * k + I]
    });
    Ok((C, dC_dF))
}

/// Computes the Green-Lagrange strain tensor
/// $$ \vec E = \frac{1}{2} \left( \vec F^T \vec F - \vec I \right). $$
#[allow(non_snake_case)]
#[replace_float_literals(T::from_f64(literal).expect("literal must fit in T"))]
pub fn green_lagrange_strain<T: Real>(deformation_gradient: &[T]) -> Result<Vec<T>> {
    check_3d("green_lagrange_strain", "the deformation gradient", deformation_gradient.len())?;
    let F = matrix3(deformation_gradient);
    let E = (F.transpose() * F - Matrix3::identity()) * 0.5;
    Ok(to_row_major(&E))
}

/// Computes the tangent of the Green-Lagrange strain with respect to the deformation gradient,
/// $$ \pd{E_{IJ}}{F_{kK}} = \frac{1}{2} \left( \delta_{IK} F_{kJ} + F_{kI} \delta_{JK} \right). $$
pub fn d_green_lagrange_strain_d_f<T: Real>(deformation_gradient: &[T]) -> Result<Jacobian<T>> {
    check_3d("d_green_lagrange_strain_d_f", "the deformation gradient", deformation_gradient.len())?;
    Ok(green_lagrange_strain_tangent(deformation_gradient))
}

/// Assumes a validated 3x3 deformation gradient.
#[allow(non_snake_case)]
#[replace_float_literals(T::from_f64(literal).expect("literal must fit in T"))]
fn green_lagrange_strain_tangent<T: Real>(F: &[T]) -> Jacobian<T> {
    Jacobian::fourth_order(3, |I, J, k, K| {
        0.5 * (delta::<T>(I, K) * F[3 * k + J] + F[3 * k + I] * delta::<T>(J, K))
    })
}

#[allow(non_snake_case)]
pub fn green_lagrange_strain_with_jacobian<T: Real>(deformation_gradient: &[T]) -> Result<(Vec<T>, Jacobian<T>)> {
    let E = green_lagrange_strain(deformation_gradient).wrap_error(
        "green_lagrange_strain_with_jacobian",
        "failed to compute the Green-Lagrange strain",
    )?;
    Ok((E, green_lagrange_strain_tangent(deformation_gradient)))
}

/// Computes the symmetric part $\frac{1}{2}(\vec A + \vec A^T)$ of a square tensor of
/// inferred dimension.
pub fn symmetric_part<T: Real>(tensor: &[T]) -> Result<Vec<T>> {
    symmetric_part_with_dimension(tensor).map(|(symmetric, _)| symmetric)
}

#[replace_float_literals(T::from_f64(literal).expect("literal must fit in T"))]
fn symmetric_part_with_dimension<T: Real>(tensor: &[T]) -> Result<(Vec<T>, usize)> {
    let dim = infer_dimension("symmetric_part", tensor.len())?;
    let a = square_matrix(dim, tensor);
    Ok((to_row_major(&((&a + a.transpose()) * 0.5)), dim))
}

/// Computes the symmetric part of a tensor along with the constant projection tangent
/// $\frac{1}{2}(\delta_{ik} \delta_{jl} + \delta_{jk} \delta_{il})$.
#[replace_float_literals(T::from_f64(literal).expect("literal must fit in T"))]
pub fn symmetric_part_with_jacobian<T: Real>(tensor: &[T]) -> Result<(Vec<T>, Jacobian<T>)> {
    let (symmetric, dim) = symmetric_part_with_dimension(tensor).wrap_error(
        "symmetric_part_with_jacobian",
        "failed to compute the symmetric part",
    )?;
    let projection = Jacobian::fourth_order(dim, |i, j, k, l| {
        0.5 * (delta::<T>(i, k) * delta::<T>(j, l) + delta::<T>(j, k) * delta::<T>(i, l))
    });
    Ok((symmetric, projection))
}

fn euclidean_norm<T: Real>(tensor: &[T]) -> T {
    tensor.iter().fold(T::zero(), |acc, &a| acc + a * a).sqrt()
}

/// Computes the unit normal $\vec A / \norm{\vec A}$ of a tensor of arbitrary length.
///
/// A tensor with vanishing norm has the zero tensor as its normal.
pub fn unit_normal<T: Real>(tensor: &[T]) -> Vec<T> {
    let norm = euclidean_norm(tensor);
    if is_fuzzy_zero(norm) {
        log::debug!("unit normal requested for a tensor of vanishing norm, returning zeros");
        vec![T::zero(); tensor.len()]
    } else {
        tensor.iter().map(|&a| a / norm).collect()
    }
}

/// Computes the unit normal $\vec n$ and its tangent $(\vec I - \vec n \otimes \vec n) / \norm{\vec A}$.
///
/// The tangent is undefined for a tensor with vanishing norm, which is reported as a domain error.
pub fn unit_normal_with_jacobian<T: Real>(tensor: &[T]) -> Result<(Vec<T>, Jacobian<T>)> {
    let norm = euclidean_norm(tensor);
    if is_fuzzy_zero(norm) {
        return Err(KinematicsError::domain(
            "unit_normal_with_jacobian",
            "the tangent of the unit normal is undefined for a tensor of vanishing norm",
        ));
    }
    let n = unit_normal(tensor);
    let len = n.len();
    let dn_da = Jacobian::from_fn(len, len, |i, j| (delta::<T>(i, j) - n[i] * n[j]) / norm);
    Ok((n, dn_da))
}

