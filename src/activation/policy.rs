use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// What the sigmoid does when its argument leaves the range where
/// `1 / (1 + e^-x)` is representable as a value strictly inside `(0, 1)`.
///
/// - `Clamp`  — saturate to the nearest representable value above 0 or below 1.
/// - `Trap`   — report `NnError::Numeric` when `e^-x` overflows.
/// - `Ignore` — evaluate the raw formula; saturated outputs of exactly 0 or 1
///              (and NaN for NaN input) flow through unchecked.
///
/// A NaN argument is an error under both `Clamp` and `Trap`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum NumericPolicy {
    #[default]
    Clamp,
    Trap,
    Ignore,
}
