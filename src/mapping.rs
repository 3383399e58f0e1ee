//! Push-forward and pull-back operations between the reference and current configurations.
//!
//! All operations except [`rotate_matrix`] act on 3x3 tensors. Indices of reference
//! quantities are written in upper case and indices of current quantities in lower case.
use crate::error::{Result, WrapError};
use crate::tensor::{
    check_3d, check_same_len, delta, infer_dimension, matrix3, square_matrix, to_row_major, try_invert, Jacobian, Real,
};
use nalgebra::Matrix3;

/// Tangents of a configuration mapping $\vec B(\vec A, \vec F)$.
#[derive(Debug, Clone, PartialEq)]
pub struct MappingJacobians<T> {
    /// The mapped tensor $\vec B$.
    pub mapped: Vec<T>,
    /// $\pd{\vec B}{\vec A}$, the tangent with respect to the tensor being mapped.
    pub d_mapped_d_tensor: Jacobian<T>,
    /// $\pd{\vec B}{\vec F}$, the tangent with respect to the deformation gradient.
    pub d_mapped_d_deformation_gradient: Jacobian<T>,
}

/// Validated operands of a mapping.
#[derive(Clone, Copy)]
#[allow(non_snake_case)]
struct Operands<T: Real> {
    A: Matrix3<T>,
    F: Matrix3<T>,
    F_inv: Matrix3<T>,
    J: T,
}

#[allow(non_snake_case)]
fn operands<T: Real>(
    operation: &'static str,
    names: [&str; 2],
    tensor: &[T],
    deformation_gradient: &[T],
) -> Result<Operands<T>> {
    check_same_len(operation, names, [tensor.len(), deformation_gradient.len()])?;
    check_3d(operation, names[0], tensor.len())?;
    check_3d(operation, names[1], deformation_gradient.len())?;
    let F = matrix3(deformation_gradient);
    let F_inv = try_invert(operation, names[1], F)?;
    Ok(Operands {
        A: matrix3(tensor),
        F,
        F_inv,
        J: F.determinant(),
    })
}

/// Pushes the second Piola-Kirchhoff stress $\vec S$ forward to the Cauchy stress
/// $$ \vec \sigma = \frac{1}{J} \vec F \vec S \vec F^T. $$
pub fn push_forward_pk2_stress<T: Real>(pk2_stress: &[T], deformation_gradient: &[T]) -> Result<Vec<T>> {
    push_forward_pk2_stress_with_operands(pk2_stress, deformation_gradient).map(|(sigma, _)| sigma)
}

#[allow(non_snake_case)]
fn push_forward_pk2_stress_with_operands<T: Real>(
    pk2_stress: &[T],
    deformation_gradient: &[T],
) -> Result<(Vec<T>, Operands<T>)> {
    let operands = operands(
        "push_forward_pk2_stress",
        ["the PK2 stress", "the deformation gradient"],
        pk2_stress,
        deformation_gradient,
    )?;
    let Operands { A: S, F, J, .. } = operands;
    Ok((to_row_major(&(F * S * F.transpose() / J)), operands))
}

/// Maps the second Piola-Kirchhoff stress to the Cauchy stress.
///
/// Equivalent to [`push_forward_pk2_stress`].
pub fn map_pk2_to_cauchy<T: Real>(pk2_stress: &[T], deformation_gradient: &[T]) -> Result<Vec<T>> {
    push_forward_pk2_stress(pk2_stress, deformation_gradient)
        .wrap_error("map_pk2_to_cauchy", "failed to push forward the PK2 stress")
}

/// Pushes the PK2 stress forward and computes the tangents
/// $$ \pd{\sigma_{ij}}{S_{AB}} = \frac{1}{J} F_{iA} F_{jB} $$
/// and
/// $$ \pd{\sigma_{ij}}{F_{AB}} = -\sigma_{ij} F^{-1}_{BA}
///     + \frac{1}{J} \left( \delta_{iA} (\vec S \vec F^T)_{Bj} + (\vec F \vec S)_{iB} \delta_{jA} \right). $$
#[allow(non_snake_case)]
pub fn push_forward_pk2_stress_with_jacobians<T: Real>(
    pk2_stress: &[T],
    deformation_gradient: &[T],
) -> Result<MappingJacobians<T>> {
    let (sigma, Operands { A: S, F, F_inv, J }) =
        push_forward_pk2_stress_with_operands(pk2_stress, deformation_gradient)
            .wrap_error("push_forward_pk2_stress_with_jacobians", "failed to push forward the PK2 stress")?;
    let S_Ft = S * F.transpose();
    let F_S = F * S;

    let d_sigma_d_S = Jacobian::fourth_order(3, |i, j, A, B| F[(i, A)] * F[(j, B)] / J);
    let d_sigma_d_F = Jacobian::fourth_order(3, |i, j, A, B| {
        -sigma[3 * i + j] * F_inv[(B, A)] + (delta::<T>(i, A) * S_Ft[(B, j)] + F_S[(i, B)] * delta::<T>(j, A)) / J
    });

    Ok(MappingJacobians {
        mapped: sigma,
        d_mapped_d_tensor: d_sigma_d_S,
        d_mapped_d_deformation_gradient: d_sigma_d_F,
    })
}

/// Pulls the Cauchy stress $\vec \sigma$ back to the second Piola-Kirchhoff stress
/// $$ \vec S = J \vec F^{-1} \vec \sigma \vec F^{-T}. $$
#[allow(non_snake_case)]
pub fn pull_back_cauchy_stress<T: Real>(cauchy_stress: &[T], deformation_gradient: &[T]) -> Result<Vec<T>> {
    pull_back_cauchy_stress_with_operands(cauchy_stress, deformation_gradient).map(|(S, _)| S)
}

#[allow(non_snake_case)]
fn pull_back_cauchy_stress_with_operands<T: Real>(
    cauchy_stress: &[T],
    deformation_gradient: &[T],
) -> Result<(Vec<T>, Operands<T>)> {
    let operands = operands(
        "pull_back_cauchy_stress",
        ["the Cauchy stress", "the deformation gradient"],
        cauchy_stress,
        deformation_gradient,
    )?;
    let Operands { A: sigma, F_inv, J, .. } = operands;
    Ok((to_row_major(&(F_inv * sigma * F_inv.transpose() * J)), operands))
}

/// Pulls the Cauchy stress back and computes the tangents
/// $$ \pd{S_{AB}}{\sigma_{kl}} = J F^{-1}_{Ak} F^{-1}_{Bl} $$
/// and
/// $$ \pd{S_{AB}}{F_{kl}} = F^{-1}_{lk} S_{AB} - F^{-1}_{Ak} S_{lB} - F^{-1}_{Bk} S_{Al}. $$
#[allow(non_snake_case)]
pub fn pull_back_cauchy_stress_with_jacobians<T: Real>(
    cauchy_stress: &[T],
    deformation_gradient: &[T],
) -> Result<MappingJacobians<T>> {
    let (S, Operands { F_inv, J, .. }) = pull_back_cauchy_stress_with_operands(cauchy_stress, deformation_gradient)
        .wrap_error("pull_back_cauchy_stress_with_jacobians", "failed to pull back the Cauchy stress")?;

    let d_S_d_sigma = Jacobian::fourth_order(3, |A, B, k, l| J * F_inv[(A, k)] * F_inv[(B, l)]);
    let d_S_d_F = Jacobian::fourth_order(3, |A, B, k, l| {
        F_inv[(l, k)] * S[3 * A + B] - F_inv[(A, k)] * S[3 * l + B] - F_inv[(B, k)] * S[3 * A + l]
    });

    Ok(MappingJacobians {
        mapped: S,
        d_mapped_d_tensor: d_S_d_sigma,
        d_mapped_d_deformation_gradient: d_S_d_F,
    })
}

/// Pushes the Green-Lagrange strain forward to the Almansi strain
/// $$ \vec e = \vec F^{-T} \vec E \vec F^{-1}. $$
pub fn push_forward_green_lagrange_strain<T: Real>(
    green_lagrange_strain: &[T],
    deformation_gradient: &[T],
) -> Result<Vec<T>> {
    push_forward_green_lagrange_strain_with_operands(green_lagrange_strain, deformation_gradient).map(|(e, _)| e)
}

#[allow(non_snake_case)]
fn push_forward_green_lagrange_strain_with_operands<T: Real>(
    green_lagrange_strain: &[T],
    deformation_gradient: &[T],
) -> Result<(Vec<T>, Operands<T>)> {
    let operands = operands(
        "push_forward_green_lagrange_strain",
        ["the Green-Lagrange strain", "the deformation gradient"],
        green_lagrange_strain,
        deformation_gradient,
    )?;
    let Operands { A: E, F_inv, .. } = operands;
    Ok((to_row_major(&(F_inv.transpose() * E * F_inv)), operands))
}

/// Pushes the Green-Lagrange strain forward and computes the tangents
/// $$ \pd{e_{ij}}{E_{KL}} = F^{-1}_{Ki} F^{-1}_{Lj} $$
/// and
/// $$ \pd{e_{ij}}{F_{kL}} = -F^{-1}_{Li} e_{kj} - F^{-1}_{Lj} e_{ik}. $$
#[allow(non_snake_case)]
pub fn push_forward_green_lagrange_strain_with_jacobians<T: Real>(
    green_lagrange_strain: &[T],
    deformation_gradient: &[T],
) -> Result<MappingJacobians<T>> {
    let (e, Operands { F_inv, .. }) =
        push_forward_green_lagrange_strain_with_operands(green_lagrange_strain, deformation_gradient).wrap_error(
            "push_forward_green_lagrange_strain_with_jacobians",
            "failed to push forward the Green-Lagrange strain",
        )?;

    let d_e_d_E = Jacobian::fourth_order(3, |i, j, K, L| F_inv[(K, i)] * F_inv[(L, j)]);
    let d_e_d_F = Jacobian::fourth_order(3, |i, j, k, L| {
        -F_inv[(L, i)] * e[3 * k + j] - F_inv[(L, j)] * e[3 * i + k]
    });

    Ok(MappingJacobians {
        mapped: e,
        d_mapped_d_tensor: d_e_d_E,
        d_mapped_d_deformation_gradient: d_e_d_F,
    })
}

/// Pulls the Almansi strain back to the Green-Lagrange strain
/// $$ \vec E = \vec F^T \vec e \vec F. $$
#[allow(non_snake_case)]
pub fn pull_back_almansi_strain<T: Real>(almansi_strain: &[T], deformation_gradient: &[T]) -> Result<Vec<T>> {
    const OP: &str = "pull_back_almansi_strain";
    let names = ["the Almansi strain", "the deformation gradient"];
    check_same_len(OP, names, [almansi_strain.len(), deformation_gradient.len()])?;
    check_3d(OP, names[0], almansi_strain.len())?;
    check_3d(OP, names[1], deformation_gradient.len())?;

    // No inverse is needed, so a singular F is admissible here
    let e = matrix3(almansi_strain);
    let F = matrix3(deformation_gradient);
    Ok(to_row_major(&(F.transpose() * e * F)))
}

/// Pulls the Almansi strain back and computes the tangents
/// $$ \pd{E_{IJ}}{e_{kl}} = F_{kI} F_{lJ} $$
/// and
/// $$ \pd{E_{IJ}}{F_{kL}} = \delta_{IL} (\vec e \vec F)_{kJ} + (\vec F^T \vec e)_{Ik} \delta_{JL}. $$
#[allow(non_snake_case)]
pub fn pull_back_almansi_strain_with_jacobians<T: Real>(
    almansi_strain: &[T],
    deformation_gradient: &[T],
) -> Result<MappingJacobians<T>> {
    const OP: &str = "pull_back_almansi_strain_with_jacobians";
    let E = pull_back_almansi_strain(almansi_strain, deformation_gradient)
        .wrap_error(OP, "failed to pull back the Almansi strain")?;
    let e = matrix3(almansi_strain);
    let F = matrix3(deformation_gradient);
    let e_F = e * F;
    let Ft_e = F.transpose() * e;

    let d_E_d_e = Jacobian::fourth_order(3, |I, J, k, l| F[(k, I)] * F[(l, J)]);
    let d_E_d_F = Jacobian::fourth_order(3, |I, J, k, L| {
        delta::<T>(I, L) * e_F[(k, J)] + Ft_e[(I, k)] * delta::<T>(J, L)
    });

    Ok(MappingJacobians {
        mapped: E,
        d_mapped_d_tensor: d_E_d_e,
        d_mapped_d_deformation_gradient: d_E_d_F,
    })
}

/// Pulls the velocity gradient back to the configuration described by $\vec F$,
/// $$ \bar{\vec L} = \vec F^{-1} \vec L \vec F. $$
#[allow(non_snake_case)]
pub fn pull_back_velocity_gradient<T: Real>(velocity_gradient: &[T], deformation_gradient: &[T]) -> Result<Vec<T>> {
    pull_back_velocity_gradient_with_operands(velocity_gradient, deformation_gradient).map(|(L_bar, _)| L_bar)
}

#[allow(non_snake_case)]
fn pull_back_velocity_gradient_with_operands<T: Real>(
    velocity_gradient: &[T],
    deformation_gradient: &[T],
) -> Result<(Vec<T>, Operands<T>)> {
    let operands = operands(
        "pull_back_velocity_gradient",
        ["the velocity gradient", "the deformation gradient"],
        velocity_gradient,
        deformation_gradient,
    )?;
    let Operands { A: L, F, F_inv, .. } = operands;
    Ok((to_row_major(&(F_inv * L * F)), operands))
}

/// Pulls the velocity gradient back and computes the tangents
/// $$ \pd{\bar L_{IJ}}{L_{kl}} = F^{-1}_{Ik} F_{lJ} $$
/// and
/// $$ \pd{\bar L_{IJ}}{F_{kK}} = -F^{-1}_{Ik} \bar L_{KJ} + (\vec F^{-1} \vec L)_{Ik} \delta_{JK}. $$
#[allow(non_snake_case)]
pub fn pull_back_velocity_gradient_with_jacobians<T: Real>(
    velocity_gradient: &[T],
    deformation_gradient: &[T],
) -> Result<MappingJacobians<T>> {
    let (L_bar, Operands { A: L, F, F_inv, .. }) =
        pull_back_velocity_gradient_with_operands(velocity_gradient, deformation_gradient).wrap_error(
            "pull_back_velocity_gradient_with_jacobians",
            "failed to pull back the velocity gradient",
        )?;
    let F_inv_L = F_inv * L;

    let d_L_bar_d_L = Jacobian::fourth_order(3, |I, J, k, l| F_inv[(I, k)] * F[(l, J)]);
    let d_L_bar_d_F = Jacobian::fourth_order(3, |I, J, k, K| {
        -F_inv[(I, k)] * L_bar[3 * K + J] + F_inv_L[(I, k)] * delta::<T>(J, K)
    });

    Ok(MappingJacobians {
        mapped: L_bar,
        d_mapped_d_tensor: d_L_bar_d_L,
        d_mapped_d_deformation_gradient: d_L_bar_d_F,
    })
}

/// Rotates a square tensor, $\vec A' = \vec Q^T \vec A \vec Q$.
///
/// The dimension is inferred from the length of the tensors, which must agree.
/// Orthogonality of `rotation` is not checked.
#[allow(non_snake_case)]
pub fn rotate_matrix<T: Real>(tensor: &[T], rotation: &[T]) -> Result<Vec<T>> {
    const OP: &str = "rotate_matrix";
    check_same_len(OP, ["the tensor", "the rotation"], [tensor.len(), rotation.len()])?;
    let dim = infer_dimension(OP, tensor.len())?;
    let A = square_matrix(dim, tensor);
    let Q = square_matrix(dim, rotation);
    Ok(to_row_major(&(Q.transpose() * A * Q)))
}
