//! Temperature dependence: time-temperature shift factors and thermal expansion.
use crate::error::{KinematicsError, Result, WrapError};
use crate::tensor::{check_same_len, is_fuzzy_zero, Real};
use itertools::izip;
use numeric_literals::replace_float_literals;
use serde::{Deserialize, Serialize};

/// Parameters of the Williams-Landel-Ferry equation.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WlfParameters<T> {
    pub reference_temperature: T,
    pub c1: T,
    pub c2: T,
}

/// Reads the parameters from the layout `[T_r, C_1, C_2]`.
impl<T: Real> TryFrom<&[T]> for WlfParameters<T> {
    type Error = KinematicsError;

    fn try_from(params: &[T]) -> Result<Self> {
        match *params {
            [reference_temperature, c1, c2] => Ok(Self {
                reference_temperature,
                c1,
                c2,
            }),
            _ => Err(KinematicsError::shape(
                "WlfParameters::try_from",
                format!("expected the 3 parameters [T_r, C_1, C_2], got {}", params.len()),
            )),
        }
    }
}

impl<T: Real> WlfParameters<T> {
    fn denominator(&self, operation: &'static str, temperature: T) -> Result<T> {
        let denominator = self.c2 + (temperature - self.reference_temperature);
        if is_fuzzy_zero(denominator) {
            Err(KinematicsError::domain(
                operation,
                format!("zero denominator C_2 + (T - T_r) at temperature {temperature:?}"),
            ))
        } else {
            Ok(denominator)
        }
    }
}

/// Computes the Williams-Landel-Ferry shift factor
/// $$ a_T = 10^{-C_1 (T - T_r) / (C_2 + T - T_r)}. $$
pub fn wlf<T: Real>(temperature: T, params: &WlfParameters<T>) -> Result<T> {
    wlf_with_denominator(temperature, params).map(|(factor, _)| factor)
}

fn wlf_with_denominator<T: Real>(temperature: T, params: &WlfParameters<T>) -> Result<(T, T)> {
    let denominator = params.denominator("wlf", temperature)?;
    let exponent = -params.c1 * (temperature - params.reference_temperature) / denominator;
    Ok(((exponent * T::ln_10()).exp(), denominator))
}

/// Computes the shift factor $a_T$ and its derivative
/// $$ \frac{d a_T}{d T} = \ln(10) \, a_T \left( -\frac{C_1}{C_2 + T - T_r}
///     + \frac{C_1 (T - T_r)}{(C_2 + T - T_r)^2} \right). $$
pub fn wlf_with_derivative<T: Real>(temperature: T, params: &WlfParameters<T>) -> Result<(T, T)> {
    let (factor, denominator) = wlf_with_denominator(temperature, params)
        .wrap_error("wlf_with_derivative", "failed to compute the shift factor")?;
    let dt = temperature - params.reference_temperature;
    let d_exponent = -params.c1 / denominator + params.c1 * dt / (denominator * denominator);
    Ok((factor, T::ln_10() * factor * d_exponent))
}

/// Computes the quadratic thermal expansion
/// $$ e_i = a_i (T - T_0) + b_i (T^2 - T_0^2) $$
/// for linear parameters $a$ and quadratic parameters $b$ of equal length.
pub fn quadratic_thermal_expansion<T: Real>(
    temperature: T,
    reference_temperature: T,
    linear: &[T],
    quadratic: &[T],
) -> Result<Vec<T>> {
    check_same_len(
        "quadratic_thermal_expansion",
        ["the linear parameters", "the quadratic parameters"],
        [linear.len(), quadratic.len()],
    )?;
    let t = temperature;
    let t0 = reference_temperature;
    Ok(izip!(linear, quadratic)
        .map(|(&a, &b)| a * (t - t0) + b * (t * t - t0 * t0))
        .collect())
}

/// Computes the quadratic thermal expansion and its derivative $a_i + 2 b_i T$ with respect to
/// the temperature.
#[replace_float_literals(T::from_f64(literal).expect("literal must fit in T"))]
pub fn quadratic_thermal_expansion_with_derivative<T: Real>(
    temperature: T,
    reference_temperature: T,
    linear: &[T],
    quadratic: &[T],
) -> Result<(Vec<T>, Vec<T>)> {
    let expansion = quadratic_thermal_expansion(temperature, reference_temperature, linear, quadratic).wrap_error(
        "quadratic_thermal_expansion_with_derivative",
        "failed to compute the thermal expansion",
    )?;
    let derivative = izip!(linear, quadratic)
        .map(|(&a, &b)| a + 2.0 * b * temperature)
        .collect();
    Ok((expansion, derivative))
}
