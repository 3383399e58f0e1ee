//! Generalized midpoint integration of rate equations.
//!
//! A quantity $A$ with rate $\dot A$ is advanced over a step $\Delta t$ by
//! $$ A = A_p + \Delta t \left( \alpha \dot A_p + (1 - \alpha) \dot A \right), $$
//! where the subscript $p$ denotes values at the beginning of the step. Note that $\alpha$
//! weights the *previous* rate, so that $\alpha = 1$ gives the explicit (forward Euler) update
//! and $\alpha = 0$ the implicit (backward Euler) update.
use crate::error::{KinematicsError, Result, WrapError};
use crate::tensor::{check_3d, check_same_len, delta, matrix3, to_row_major, try_invert, Jacobian, Real};
use itertools::izip;
use nalgebra::Matrix3;
use numeric_literals::replace_float_literals;
use serde::{Deserialize, Serialize};

#[inline]
fn blend<T: Real>(alpha: T, previous: T, current: T) -> T {
    alpha * previous + (T::one() - alpha) * current
}

fn check_alpha<T: Real>(operation: &'static str, alpha: &[T]) -> Result<()> {
    let out_of_range = alpha
        .iter()
        .position(|&a| !(a >= T::zero() && a <= T::one()));
    match out_of_range {
        None => Ok(()),
        Some(i) => Err(KinematicsError::parameter(
            operation,
            format!("alpha[{i}] = {:?} is not in the interval [0, 1]", alpha[i]),
        )),
    }
}

fn check_scalar_alpha<T: Real>(operation: &'static str, alpha: T) -> Result<()> {
    if alpha >= T::zero() && alpha <= T::one() {
        Ok(())
    } else {
        Err(KinematicsError::parameter(
            operation,
            format!("alpha = {alpha:?} is not in the interval [0, 1]"),
        ))
    }
}

/// The result of a generalized midpoint step.
#[derive(Debug, Clone, PartialEq)]
pub struct MidpointStep<T> {
    /// $\Delta A = A - A_p$.
    pub increment: Vec<T>,
    pub value: Vec<T>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MidpointStepJacobians<T> {
    pub increment: Vec<T>,
    pub value: Vec<T>,
    /// $\pd{A}{\dot A}$, diagonal with entries $\Delta t (1 - \alpha_i)$.
    pub d_value_d_rate: Jacobian<T>,
    /// $\pd{A}{\dot A_p}$, diagonal with entries $\Delta t \alpha_i$.
    pub d_value_d_previous_rate: Jacobian<T>,
}

/// Advances a vector quantity with the generalized midpoint rule, using one integration
/// parameter per component.
///
/// All slices must have the same length and every $\alpha_i$ must lie in $[0, 1]$.
pub fn midpoint_evolution<T: Real>(
    dt: T,
    previous_value: &[T],
    previous_rate: &[T],
    rate: &[T],
    alpha: &[T],
) -> Result<MidpointStep<T>> {
    const OP: &str = "midpoint_evolution";
    let n = previous_value.len();
    check_same_len(OP, ["the previous value", "the previous rate"], [n, previous_rate.len()])?;
    check_same_len(OP, ["the previous value", "the rate"], [n, rate.len()])?;
    check_same_len(OP, ["the previous value", "alpha"], [n, alpha.len()])?;
    check_alpha(OP, alpha)?;

    let increment: Vec<T> = izip!(previous_rate, rate, alpha)
        .map(|(&rate_p, &rate_i, &alpha_i)| dt * blend(alpha_i, rate_p, rate_i))
        .collect();
    let value = izip!(previous_value, &increment)
        .map(|(&value_p, &delta_i)| value_p + delta_i)
        .collect();

    Ok(MidpointStep { increment, value })
}

/// Same as [`midpoint_evolution`], but with the same integration parameter for every component.
pub fn midpoint_evolution_uniform<T: Real>(
    dt: T,
    previous_value: &[T],
    previous_rate: &[T],
    rate: &[T],
    alpha: T,
) -> Result<MidpointStep<T>> {
    let alpha = vec![alpha; previous_value.len()];
    midpoint_evolution(dt, previous_value, previous_rate, rate, &alpha)
        .wrap_error("midpoint_evolution_uniform", "failed to perform the midpoint step")
}

/// Advances a vector quantity with the generalized midpoint rule and computes the tangents of
/// the new value with respect to the current and previous rates.
///
/// The tangent with respect to the previous value is always the identity and is not returned.
pub fn midpoint_evolution_with_jacobians<T: Real>(
    dt: T,
    previous_value: &[T],
    previous_rate: &[T],
    rate: &[T],
    alpha: &[T],
) -> Result<MidpointStepJacobians<T>> {
    let MidpointStep { increment, value } = midpoint_evolution(dt, previous_value, previous_rate, rate, alpha)
        .wrap_error("midpoint_evolution_with_jacobians", "failed to perform the midpoint step")?;

    let n = value.len();
    let d_value_d_rate = Jacobian::from_fn(n, n, |i, j| delta::<T>(i, j) * dt * (T::one() - alpha[i]));
    let d_value_d_previous_rate = Jacobian::from_fn(n, n, |i, j| delta::<T>(i, j) * dt * alpha[i]);

    Ok(MidpointStepJacobians {
        increment,
        value,
        d_value_d_rate,
        d_value_d_previous_rate,
    })
}

pub fn midpoint_evolution_uniform_with_jacobians<T: Real>(
    dt: T,
    previous_value: &[T],
    previous_rate: &[T],
    rate: &[T],
    alpha: T,
) -> Result<MidpointStepJacobians<T>> {
    let alpha = vec![alpha; previous_value.len()];
    midpoint_evolution_with_jacobians(dt, previous_value, previous_rate, rate, &alpha).wrap_error(
        "midpoint_evolution_uniform_with_jacobians",
        "failed to perform the midpoint step",
    )
}

/// The configuration in which the velocity gradient driving [`evolve_f`] is expressed.
///
/// Serialized as the integer codes `1` and `2`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum EvolutionMode {
    /// The velocity gradient is expressed in the current configuration, $\dot{\vec F} = \vec L \vec F$.
    Current,
    /// The velocity gradient is expressed in the reference configuration, $\dot{\vec F} = \vec F \vec L$.
    Reference,
}

impl TryFrom<u32> for EvolutionMode {
    type Error = KinematicsError;

    fn try_from(code: u32) -> Result<Self> {
        match code {
            1 => Ok(Self::Current),
            2 => Ok(Self::Reference),
            _ => Err(KinematicsError::parameter(
                "EvolutionMode::try_from",
                format!("{code} is not a valid evolution mode, expected 1 or 2"),
            )),
        }
    }
}

impl From<EvolutionMode> for u32 {
    fn from(mode: EvolutionMode) -> Self {
        match mode {
            EvolutionMode::Current => 1,
            EvolutionMode::Reference => 2,
        }
    }
}

/// The result of advancing the deformation gradient over a step.
#[derive(Debug, Clone, PartialEq)]
pub struct DeformationGradientStep<T> {
    /// $\Delta \vec F = \vec F - \vec F_p$.
    pub increment: Vec<T>,
    pub deformation_gradient: Vec<T>,
}

/// The result of advancing the deformation gradient, together with its tangents.
#[derive(Debug, Clone, PartialEq)]
pub struct DeformationGradientStepJacobians<T> {
    pub increment: Vec<T>,
    pub deformation_gradient: Vec<T>,
    /// $\pd{\vec F}{\vec L}$.
    pub d_f_d_l: Jacobian<T>,
    /// $\pd{\Delta \vec F}{\vec F_p}$.
    pub d_increment_d_fp: Jacobian<T>,
    /// $\pd{\vec F}{\vec F_p}$, equal to $\pd{\Delta \vec F}{\vec F_p}$ plus the identity.
    pub d_f_d_fp: Jacobian<T>,
    /// $\pd{\vec F}{\vec L_p}$.
    pub d_f_d_lp: Jacobian<T>,
}

/// The blended velocity gradient $\vec L^*$ and the inverse of the implicit operator $\vec A$.
#[allow(non_snake_case)]
struct ImplicitOperator<T: Real> {
    L_star: Matrix3<T>,
    A_inv: Matrix3<T>,
}

#[allow(non_snake_case)]
fn implicit_operator<T: Real>(
    operation: &'static str,
    dt: T,
    previous_velocity_gradient: &[T],
    velocity_gradient: &[T],
    alpha: T,
) -> Result<ImplicitOperator<T>> {
    let Lp = matrix3(previous_velocity_gradient);
    let L = matrix3(velocity_gradient);
    let L_star = Matrix3::from_fn(|i, j| blend(alpha, Lp[(i, j)], L[(i, j)]));
    let A = Matrix3::identity() - L * (dt * (T::one() - alpha));
    let A_inv = try_invert(operation, "I - dt (1 - alpha) L", A)?;
    Ok(ImplicitOperator { L_star, A_inv })
}

/// Advances the deformation gradient over a step of length `dt` with the generalized
/// midpoint rule.
///
/// With $\vec L^* = \alpha \vec L_p + (1 - \alpha) \vec L$ and
/// $\vec A = \vec I - \Delta t (1 - \alpha) \vec L$, the increment is
/// $$ \Delta \vec F = \vec A^{-1} \left( \Delta t \vec L^* \vec F_p \right) $$
/// in [`EvolutionMode::Current`] and
/// $$ \Delta \vec F = \left( \Delta t \vec F_p \vec L^* \right) \vec A^{-1} $$
/// in [`EvolutionMode::Reference`]. The new deformation gradient is
/// $\vec F = \vec F_p + \Delta \vec F$.
#[allow(non_snake_case)]
pub fn evolve_f<T: Real>(
    dt: T,
    previous_deformation_gradient: &[T],
    previous_velocity_gradient: &[T],
    velocity_gradient: &[T],
    alpha: T,
    mode: EvolutionMode,
) -> Result<DeformationGradientStep<T>> {
    let (step, _) = evolve_f_with_operator(
        dt,
        previous_deformation_gradient,
        previous_velocity_gradient,
        velocity_gradient,
        alpha,
        mode,
    )?;
    Ok(step)
}

/// Validated step of [`evolve_f`], along with the implicit operator it was computed from.
#[allow(non_snake_case)]
fn evolve_f_with_operator<T: Real>(
    dt: T,
    previous_deformation_gradient: &[T],
    previous_velocity_gradient: &[T],
    velocity_gradient: &[T],
    alpha: T,
    mode: EvolutionMode,
) -> Result<(DeformationGradientStep<T>, ImplicitOperator<T>)> {
    const OP: &str = "evolve_f";
    check_3d(OP, "the previous deformation gradient", previous_deformation_gradient.len())?;
    check_3d(OP, "the previous velocity gradient", previous_velocity_gradient.len())?;
    check_3d(OP, "the velocity gradient", velocity_gradient.len())?;
    check_scalar_alpha(OP, alpha)?;

    let operator = implicit_operator(OP, dt, previous_velocity_gradient, velocity_gradient, alpha)?;
    let ImplicitOperator { L_star, A_inv } = &operator;
    let Fp = matrix3(previous_deformation_gradient);
    let dF = match mode {
        EvolutionMode::Current => A_inv * (L_star * Fp * dt),
        EvolutionMode::Reference => (Fp * L_star * dt) * A_inv,
    };
    let F = Fp + dF;
    log::trace!("evolved deformation gradient over dt = {dt:?} with alpha = {alpha:?} in {mode:?} mode");

    let step = DeformationGradientStep {
        increment: to_row_major(&dF),
        deformation_gradient: to_row_major(&F),
    };
    Ok((step, operator))
}

/// Advances the deformation gradient as in [`evolve_f`] and computes the tangents of the result
/// with respect to the current velocity gradient, the previous deformation gradient and the
/// previous velocity gradient.
#[allow(non_snake_case)]
pub fn evolve_f_with_jacobians<T: Real>(
    dt: T,
    previous_deformation_gradient: &[T],
    previous_velocity_gradient: &[T],
    velocity_gradient: &[T],
    alpha: T,
    mode: EvolutionMode,
) -> Result<DeformationGradientStepJacobians<T>> {
    let (step, ImplicitOperator { L_star, A_inv }) = evolve_f_with_operator(
        dt,
        previous_deformation_gradient,
        previous_velocity_gradient,
        velocity_gradient,
        alpha,
        mode,
    )
    .wrap_error("evolve_f_with_jacobians", "failed to evolve the deformation gradient")?;
    let DeformationGradientStep {
        increment,
        deformation_gradient,
    } = step;
    let Fp = matrix3(previous_deformation_gradient);
    let F = matrix3(&deformation_gradient);
    let one_minus_alpha = T::one() - alpha;

    let (d_f_d_l, d_f_d_lp, d_increment_d_fp) = match mode {
        EvolutionMode::Current => {
            let A_inv_L_star = A_inv * L_star;
            (
                Jacobian::fourth_order(3, |j, I, k, l| dt * one_minus_alpha * A_inv[(j, k)] * F[(l, I)]),
                Jacobian::fourth_order(3, |j, I, k, l| dt * alpha * A_inv[(j, k)] * Fp[(l, I)]),
                Jacobian::fourth_order(3, |j, I, k, K| dt * A_inv_L_star[(j, k)] * delta::<T>(I, K)),
            )
        }
        EvolutionMode::Reference => {
            let L_star_A_inv = L_star * A_inv;
            (
                Jacobian::fourth_order(3, |j, I, K, L| dt * one_minus_alpha * F[(j, K)] * A_inv[(L, I)]),
                Jacobian::fourth_order(3, |j, I, K, L| dt * alpha * Fp[(j, K)] * A_inv[(L, I)]),
                Jacobian::fourth_order(3, |j, I, k, K| dt * delta::<T>(j, k) * L_star_A_inv[(K, I)]),
            )
        }
    };
    let d_f_d_fp = d_increment_d_fp.clone().add_identity();

    Ok(DeformationGradientStepJacobians {
        increment,
        deformation_gradient,
        d_f_d_l,
        d_increment_d_fp,
        d_f_d_fp,
        d_f_d_lp,
    })
}

/// Computes the rate of the deformation gradient $\dot{\vec F} = \vec L \vec F$ for a velocity
/// gradient expressed in the current configuration.
#[allow(non_snake_case)]
pub fn compute_dfdt<T: Real>(velocity_gradient: &[T], deformation_gradient: &[T]) -> Result<Vec<T>> {
    const OP: &str = "compute_dfdt";
    check_same_len(
        OP,
        ["the velocity gradient", "the deformation gradient"],
        [velocity_gradient.len(), deformation_gradient.len()],
    )?;
    check_3d(OP, "the velocity gradient", velocity_gradient.len())?;
    let L = matrix3(velocity_gradient);
    let F = matrix3(deformation_gradient);
    Ok(to_row_major(&(L * F)))
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeformationRateJacobians<T> {
    pub rate: Vec<T>,
    /// $\pd{\dot F_{iI}}{L_{kl}} = \delta_{ik} F_{lI}$.
    pub d_rate_d_velocity_gradient: Jacobian<T>,
    /// $\pd{\dot F_{iI}}{F_{kK}} = L_{ik} \delta_{IK}$.
    pub d_rate_d_deformation_gradient: Jacobian<T>,
}

#[allow(non_snake_case)]
pub fn compute_dfdt_with_jacobians<T: Real>(
    velocity_gradient: &[T],
    deformation_gradient: &[T],
) -> Result<DeformationRateJacobians<T>> {
    let rate = compute_dfdt(velocity_gradient, deformation_gradient)
        .wrap_error("compute_dfdt_with_jacobians", "failed to compute the rate of the deformation gradient")?;
    let L = velocity_gradient;
    let F = deformation_gradient;

    Ok(DeformationRateJacobians {
        rate,
        d_rate_d_velocity_gradient: Jacobian::fourth_order(3, |i, I, k, l| delta::<T>(i, k) * F[3 * l + I]),
        d_rate_d_deformation_gradient: Jacobian::fourth_order(3, |i, I, k, K| L[3 * i + k] * delta::<T>(I, K)),
    })
}

/// Integration settings for evolving the deformation gradient.
///
/// Typically part of a material's configuration, e.g.
/// ```json
/// { "alpha": 0.5, "mode": 1 }
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EvolutionSettings<T> {
    pub alpha: T,
    pub mode: EvolutionMode,
}

impl<T> Default for EvolutionSettings<T>
where
    T: Real,
{
    #[replace_float_literals(T::from_f64(literal).expect("literal must fit in T"))]
    fn default() -> Self {
        Self {
            alpha: 0.5,
            mode: EvolutionMode::Current,
        }
    }
}

impl<T: Real> EvolutionSettings<T> {
    pub fn validate(&self) -> Result<()> {
        check_scalar_alpha("EvolutionSettings::validate", self.alpha)
    }

    /// Advances the deformation gradient with these settings. See [`evolve_f`].
    pub fn evolve_f(
        &self,
        dt: T,
        previous_deformation_gradient: &[T],
        previous_velocity_gradient: &[T],
        velocity_gradient: &[T],
    ) -> Result<DeformationGradientStep<T>> {
        evolve_f(
            dt,
            previous_deformation_gradient,
            previous_velocity_gradient,
            velocity_gradient,
            self.alpha,
            self.mode,
        )
    }

    /// See [`evolve_f_with_jacobians`].
    pub fn evolve_f_with_jacobians(
        &self,
        dt: T,
        previous_deformation_gradient: &[T],
        previous_velocity_gradient: &[T],
        velocity_gradient: &[T],
    ) -> Result<DeformationGradientStepJacobians<T>> {
        evolve_f_with_jacobians(
            dt,
            previous_deformation_gradient,
            previous_velocity_gradient,
            velocity_gradient,
            self.alpha,
            self.mode,
        )
    }
}
