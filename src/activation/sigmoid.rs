use crate::activation::policy::NumericPolicy;
use crate::error::{NnError, Result};

/// Smallest positive `f64`; the clamped floor of the sigmoid.
pub const SIGMOID_FLOOR: f64 = 4.9406564584124654e-324;

/// Largest `f64` strictly below 1; the clamped ceiling of the sigmoid.
pub const SIGMOID_CEIL: f64 = 1.0 - f64::EPSILON / 2.0;

/// Logistic sigmoid `1 / (1 + e^-x)` evaluated under `policy`.
pub fn sigmoid(x: f64, policy: NumericPolicy) -> Result<f64> {
    let e = (-x).exp();
    match policy {
        NumericPolicy::Ignore => Ok(1.0 / (1.0 + e)),
        NumericPolicy::Clamp => {
            if x.is_nan() {
                return Err(NnError::Numeric { value: x });
            }
            if e.is_infinite() {
                return Ok(SIGMOID_FLOOR);
            }
            Ok((1.0 / (1.0 + e)).clamp(SIGMOID_FLOOR, SIGMOID_CEIL))
        }
        NumericPolicy::Trap => {
            if x.is_nan() || e.is_infinite() {
                return Err(NnError::Numeric { value: x });
            }
            Ok(1.0 / (1.0 + e))
        }
    }
}

/// Sigmoid derivative expressed through the sigmoid's own output `s`.
pub fn sigmoid_derivative(s: f64) -> f64 {
    s * (1.0 - s)
}
