//! Analysis thresholds.
//!
//! Every cutoff the analyses compare against lives here so tests and
//! callers can probe boundary behaviour without touching the algorithms.

use serde::{Deserialize, Serialize};

/// Thresholds and constants for all four analyses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Days with combined precipitation strictly below this are dry (mm)
    pub dry_day_threshold: f64,

    /// Shortest run of dry days reported as a drought
    pub min_drought_days: usize,

    /// Percentile marking an extreme event
    pub extreme_percentile: f64,

    /// Percentile marking a severe extreme event
    pub severe_percentile: f64,

    /// Month/quarter mean above `very_wet_ratio` x overall mean is "Very Wet"
    pub very_wet_ratio: f64,

    /// Above `wet_ratio` x overall mean is "Wet"
    pub wet_ratio: f64,

    /// Below `very_dry_ratio` x overall mean is "Very Dry"
    pub very_dry_ratio: f64,

    /// Below `dry_ratio` x overall mean is "Dry"
    pub dry_ratio: f64,

    /// Yearly anomaly beyond this many standard deviations is "Very Wet"/"Very Dry"
    pub strong_anomaly_sigma: f64,

    /// Yearly anomaly beyond this many standard deviations is "Wet"/"Dry"
    pub mild_anomaly_sigma: f64,

    /// Slopes with magnitude below this are "Stable" (mm/day per year)
    pub stable_slope: f64,

    /// Slopes with magnitude above this are "Strong"
    pub strong_slope: f64,

    /// Year the fitted trend line is extrapolated to
    pub projection_year: i32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            dry_day_threshold: 0.1,
            min_drought_days: 3,
            extreme_percentile: 95.0,
            severe_percentile: 99.0,
            very_wet_ratio: 1.5,
            wet_ratio: 1.2,
            very_dry_ratio: 0.5,
            dry_ratio: 0.8,
            strong_anomaly_sigma: 1.5,
            mild_anomaly_sigma: 0.5,
            stable_slope: 0.01,
            strong_slope: 0.05,
            projection_year: 2030,
        }
    }
}

impl AnalysisConfig {
    /// Whether a day counts as rainy in the climatology views.
    ///
    /// Strictly above the threshold; a day exactly at it is neither rainy
    /// nor a drought day.
    #[must_use]
    pub fn is_rainy(&self, precip: f64) -> bool {
        precip > self.dry_day_threshold
    }

    /// Whether a day extends a drought run
    #[must_use]
    pub fn is_dry(&self, precip: f64) -> bool {
        precip < self.dry_day_threshold
    }
}
