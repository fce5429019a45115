//! Small numeric helpers shared by the analyses.

use statrs::statistics::Statistics;

/// Round half away from zero to `decimals` places.
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Arithmetic mean, `None` for an empty slice.
pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    (!values.is_empty()).then(|| values.iter().mean())
}

/// Population standard deviation, `None` for an empty slice.
pub(crate) fn population_std_dev(values: &[f64]) -> Option<f64> {
    (!values.is_empty()).then(|| values.iter().population_std_dev())
}
