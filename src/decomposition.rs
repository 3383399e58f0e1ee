//! Volumetric-isochoric split of the Green-Lagrange strain.
use crate::error::{KinematicsError, Result, WrapError};
use crate::tensor::{check_3d, delta, matrix3, to_row_major, Jacobian, Real};
use nalgebra::Matrix3;
use numeric_literals::replace_float_literals;

/// The result of splitting a Green-Lagrange strain into volumetric and isochoric parts.
#[derive(Debug, Clone, PartialEq)]
pub struct StrainDecomposition<T> {
    /// The volume ratio $J = \det \vec F = \sqrt{\det(2 \vec E + \vec I)}$.
    pub volume_ratio: T,
    /// The isochoric strain $\bar{\vec E}$, whose associated deformation has unit determinant.
    pub isochoric_strain: Vec<T>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrainDecompositionJacobians<T> {
    pub volume_ratio: T,
    pub isochoric_strain: Vec<T>,
    /// $\pd{J}{\vec E}$, a second-order tensor.
    pub d_volume_ratio_d_strain: Vec<T>,
    /// $\pd{\bar{\vec E}}{\vec E}$.
    pub d_isochoric_strain_d_strain: Jacobian<T>,
}

/// Decomposes the Green-Lagrange strain $\vec E$ into the volume ratio
/// $$ J = \sqrt{\det(2 \vec E + \vec I)} $$
/// and the isochoric strain
/// $$ \bar{\vec E} = J^{-2/3} \vec E + \frac{1}{2} \left( J^{-2/3} - 1 \right) \vec I. $$
///
/// Fails with a domain error if $\det(2 \vec E + \vec I) \leq 0$, since no deformation
/// gradient can produce such a strain.
pub fn decompose_green_lagrange_strain<T: Real>(green_lagrange_strain: &[T]) -> Result<StrainDecomposition<T>> {
    decompose_with_deformation_tensor(green_lagrange_strain).map(|(decomposition, _)| decomposition)
}

/// Decomposes the strain and also returns the right Cauchy-Green tensor $\vec C = 2 \vec E + \vec I$.
#[allow(non_snake_case)]
#[replace_float_literals(T::from_f64(literal).expect("literal must fit in T"))]
fn decompose_with_deformation_tensor<T: Real>(
    green_lagrange_strain: &[T],
) -> Result<(StrainDecomposition<T>, Matrix3<T>)> {
    const OP: &str = "decompose_green_lagrange_strain";
    check_3d(OP, "the Green-Lagrange strain", green_lagrange_strain.len())?;
    let E = matrix3(green_lagrange_strain);
    let I = Matrix3::identity();

    let C = E * 2.0 + I;
    let J_squared = C.determinant();
    if J_squared <= 0.0 {
        return Err(KinematicsError::domain(
            OP,
            format!("det(2E + I) = {J_squared:?} is not positive"),
        ));
    }
    let J = J_squared.sqrt();
    let J_m23 = J.powf(-2.0 / 3.0);
    let E_bar = E * J_m23 + I * (0.5 * (J_m23 - 1.0));

    let decomposition = StrainDecomposition {
        volume_ratio: J,
        isochoric_strain: to_row_major(&E_bar),
    };
    Ok((decomposition, C))
}

/// Decomposes the Green-Lagrange strain and computes the tangents
/// $$ \pd{J}{E_{KL}} = J (2 \vec E + \vec I)^{-1}_{LK} $$
/// and
/// $$ \pd{\bar E_{IJ}}{E_{KL}} = J^{-2/3} \delta_{IK} \delta_{JL}
///     - \frac{1}{3} J^{-5/3} \delta_{IJ} \pd{J}{E_{KL}}
///     - \frac{2}{3} J^{-5/3} E_{IJ} \pd{J}{E_{KL}}. $$
#[allow(non_snake_case)]
#[replace_float_literals(T::from_f64(literal).expect("literal must fit in T"))]
pub fn decompose_green_lagrange_strain_with_jacobians<T: Real>(
    green_lagrange_strain: &[T],
) -> Result<StrainDecompositionJacobians<T>> {
    let (decomposition, C) = decompose_with_deformation_tensor(green_lagrange_strain).wrap_error(
        "decompose_green_lagrange_strain_with_jacobians",
        "failed to decompose the Green-Lagrange strain",
    )?;
    let StrainDecomposition {
        volume_ratio: J,
        isochoric_strain,
    } = decomposition;

    // J C^{-T} = cof(C) / J, with the columns of the cofactor matrix given by cross products
    let E = green_lagrange_strain;
    let (c0, c1, c2) = (C.column(0), C.column(1), C.column(2));
    let cofactor = Matrix3::from_columns(&[c1.cross(&c2), c2.cross(&c0), c0.cross(&c1)]);
    let dJ_dE = to_row_major(&(cofactor / J));

    let J_m23 = J.powf(-2.0 / 3.0);
    let J_m53 = J.powf(-5.0 / 3.0);
    let dEbar_dE = Jacobian::fourth_order(3, |i, j, k, l| {
        let dJ_dE_kl = dJ_dE[3 * k + l];
        J_m23 * delta::<T>(i, k) * delta::<T>(j, l)
            - (1.0 / 3.0) * J_m53 * delta::<T>(i, j) * dJ_dE_kl
            - (2.0 / 3.0) * J_m53 * E[3 * i + j] * dJ_dE_kl
    });

    Ok(StrainDecompositionJacobians {
        volume_ratio: J,
        isochoric_strain,
        d_volume_ratio_d_strain: dJ_dE,
        d_isochoric_strain_d_strain: dEbar_dE,
    })
}
