//! Nearest-rank percentile estimation.

use serde::{Deserialize, Serialize};

use crate::error::{AnalyticsError, Result};
use precip_domain::PrecipitationRecord;

/// Nearest-rank percentile of `values`.
///
/// Sorts a copy ascending and returns the element at
/// `ceil(p / 100 * n) - 1`, clamped to `[0, n - 1]`. The result is always an
/// observed value; adjacent ranks are never interpolated.
pub fn percentile(values: &[f64], p: f64) -> Result<f64> {
    if values.is_empty() {
        return Err(AnalyticsError::EmptyInput(
            "percentile of an empty value set".to_string(),
        ));
    }
    if !(0.0..=100.0).contains(&p) {
        return Err(AnalyticsError::InvalidParameter(format!(
            "percentile must be within [0, 100], got {p}"
        )));
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let n = sorted.len();
    let rank = ((p / 100.0) * n as f64).ceil() as i64 - 1;
    let index = rank.clamp(0, n as i64 - 1) as usize;
    Ok(sorted[index])
}

/// A percentile value together with the percentile it represents
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentileThreshold {
    /// Percentile in `[0, 100]`
    pub percentile: f64,
    /// Threshold value (mm)
    pub value: f64,
}

impl PercentileThreshold {
    /// Threshold over the days with positive combined precipitation.
    ///
    /// Dry days never enter the basis. Fails with
    /// [`AnalyticsError::EmptyInput`] when no day had any precipitation.
    pub fn of_positive_precip(records: &[PrecipitationRecord], p: f64) -> Result<Self> {
        let basis = positive_precip(records);
        if basis.is_empty() {
            return Err(AnalyticsError::EmptyInput(
                "no days with positive precipitation".to_string(),
            ));
        }
        Ok(Self {
            percentile: p,
            value: percentile(&basis, p)?,
        })
    }

    /// Whether `value` lies strictly above the threshold
    pub fn is_exceeded_by(&self, value: f64) -> bool {
        value > self.value
    }
}

/// Combined precipitation values above zero, in input order
pub(crate) fn positive_precip(records: &[PrecipitationRecord]) -> Vec<f64> {
    records
        .iter()
        .map(PrecipitationRecord::precip)
        .filter(|&p| p > 0.0)
        .collect()
}
