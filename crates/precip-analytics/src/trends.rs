//! Multi-year trend analysis.
//!
//! Aggregates the input by year, fits an ordinary-least-squares line through
//! `(year, yearly mean)`, flags anomalous years, compares decades and
//! extrapolates the fitted line to a projection year.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::classification::{TrendClass, WetnessClass};
use crate::config::AnalysisConfig;
use crate::error::{AnalyticsError, Result};
use crate::percentile::{percentile, positive_precip};
use crate::stats::{mean, population_std_dev, round_to};
use precip_domain::PrecipitationRecord;

/// SStot at or below this is treated as zero variance
const VARIANCE_EPSILON: f64 = 1e-12;

// =============================================================================
// RESULT TYPES
// =============================================================================

/// Aggregates for one calendar year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyTrendPoint {
    pub year: i32,
    pub total: f64,
    pub mean: f64,
    pub rainy_days: usize,
    pub dry_days: usize,
    /// Days above the p95 of the whole input
    pub extreme_events: usize,
}

/// Raw least-squares fit, unrounded
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

impl LinearFit {
    /// Value of the fitted line at `x`
    #[must_use]
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Reported regression, rounded for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionModel {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub trend: TrendClass,
    /// mm/day per year
    pub annual_rate: f64,
    /// Change over the observed span, `slope * (last - first)`
    pub total_change: f64,
}

/// A year whose mean departs from the mean of yearly means
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyRecord {
    pub year: i32,
    pub deviation: f64,
    pub classification: WetnessClass,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecadeComparison {
    /// e.g. "1990s"
    pub decade: String,
    /// Observed years, e.g. "1991-1999"
    pub years: String,
    pub mean: f64,
    /// Difference from the preceding decade, 0 for the first
    pub change: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSummary {
    pub years_analyzed: usize,
    pub first_year: i32,
    pub last_year: i32,
    pub trend: TrendClass,
    pub annual_rate: f64,
    pub r_squared: f64,
    pub projection_year: i32,
    pub projected_mean: f64,
    pub total_change: f64,
}

/// Trend analysis output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendResult {
    pub summary: TrendSummary,
    pub regression: RegressionModel,
    pub yearly: Vec<YearlyTrendPoint>,
    /// Non-normal years only, ascending
    pub anomalies: Vec<AnomalyRecord>,
    pub decades: Vec<DecadeComparison>,
}

// =============================================================================
// REGRESSION
// =============================================================================

/// Ordinary least squares over `(x, y)` points.
///
/// Needs at least two distinct `x` values; fails with
/// [`AnalyticsError::DegenerateDistribution`] when every `y` is the same,
/// since R² is then undefined.
pub fn fit_linear(points: &[(f64, f64)]) -> Result<LinearFit> {
    let n = points.len() as f64;
    let (sum_x, sum_y, sum_xy, sum_x2) = points.iter().fold(
        (0.0, 0.0, 0.0, 0.0),
        |(sx, sy, sxy, sx2), &(x, y)| (sx + x, sy + y, sxy + x * y, sx2 + x * x),
    );

    let denominator = n * sum_x2 - sum_x * sum_x;
    if points.len() < 2 || denominator == 0.0 {
        return Err(AnalyticsError::InsufficientData {
            found: points.len(),
            required: 2,
        });
    }

    let slope = (n * sum_xy - sum_x * sum_y) / denominator;
    let intercept = (sum_y - slope * sum_x) / n;

    let y_mean = sum_y / n;
    let (ss_res, ss_tot) = points.iter().fold((0.0, 0.0), |(res, tot), &(x, y)| {
        let fitted = slope * x + intercept;
        (res + (y - fitted).powi(2), tot + (y - y_mean).powi(2))
    });
    if ss_tot <= VARIANCE_EPSILON {
        return Err(AnalyticsError::DegenerateDistribution(
            "all yearly means are equal; R² undefined".to_string(),
        ));
    }

    Ok(LinearFit {
        slope,
        intercept,
        r_squared: 1.0 - ss_res / ss_tot,
    })
}

// =============================================================================
// ANALYSIS
// =============================================================================

/// Trend analysis with the default thresholds.
pub fn analyze_trends(records: &[PrecipitationRecord]) -> Result<TrendResult> {
    analyze_trends_with(records, &AnalysisConfig::default())
}

/// Trend analysis.
///
/// Fails with [`AnalyticsError::InsufficientData`] when fewer than two
/// distinct years are present.
pub fn analyze_trends_with(
    records: &[PrecipitationRecord],
    config: &AnalysisConfig,
) -> Result<TrendResult> {
    let mut by_year: BTreeMap<i32, Vec<f64>> = BTreeMap::new();
    for record in records {
        by_year.entry(record.year()).or_default().push(record.precip());
    }
    if by_year.len() < 2 {
        return Err(AnalyticsError::InsufficientData {
            found: by_year.len(),
            required: 2,
        });
    }

    // One threshold for the whole input; no positive days means no extremes
    let basis = positive_precip(records);
    let p95 = if basis.is_empty() {
        None
    } else {
        Some(percentile(&basis, config.extreme_percentile)?)
    };

    // (year, unrounded mean) in ascending year order
    let mut yearly_means: Vec<(i32, f64)> = Vec::with_capacity(by_year.len());
    let mut yearly = Vec::with_capacity(by_year.len());
    for (&year, values) in &by_year {
        let total: f64 = values.iter().sum();
        let year_mean = total / values.len() as f64;
        let rainy_days = values.iter().filter(|&&p| config.is_rainy(p)).count();
        let extreme_events = p95.map_or(0, |t| values.iter().filter(|&&p| p > t).count());

        yearly_means.push((year, year_mean));
        yearly.push(YearlyTrendPoint {
            year,
            total: round_to(total, 2),
            mean: round_to(year_mean, 2),
            rainy_days,
            dry_days: values.len() - rainy_days,
            extreme_events,
        });
    }

    let points: Vec<(f64, f64)> = yearly_means
        .iter()
        .map(|&(year, m)| (f64::from(year), m))
        .collect();
    let fit = fit_linear(&points)?;

    let first_year = yearly_means[0].0;
    let last_year = yearly_means[yearly_means.len() - 1].0;
    let total_change = fit.slope * f64::from(last_year - first_year);
    let trend = TrendClass::from_slope(fit.slope, config);

    let regression = RegressionModel {
        slope: round_to(fit.slope, 4),
        intercept: round_to(fit.intercept, 2),
        r_squared: round_to(fit.r_squared, 3),
        trend,
        annual_rate: round_to(fit.slope, 3),
        total_change: round_to(total_change, 2),
    };

    let anomalies = anomalies(&yearly_means, config)?;
    let decades = decades(&yearly_means);

    let summary = TrendSummary {
        years_analyzed: yearly_means.len(),
        first_year,
        last_year,
        trend,
        annual_rate: regression.annual_rate,
        r_squared: regression.r_squared,
        projection_year: config.projection_year,
        projected_mean: round_to(fit.predict(f64::from(config.projection_year)), 2),
        total_change: regression.total_change,
    };

    tracing::debug!(
        records = records.len(),
        years = summary.years_analyzed,
        slope = fit.slope,
        anomalies = anomalies.len(),
        "Trend analysis complete"
    );

    Ok(TrendResult {
        summary,
        regression,
        yearly,
        anomalies,
        decades,
    })
}

fn anomalies(yearly_means: &[(i32, f64)], config: &AnalysisConfig) -> Result<Vec<AnomalyRecord>> {
    let means: Vec<f64> = yearly_means.iter().map(|&(_, m)| m).collect();
    let empty = || AnalyticsError::EmptyInput("no yearly means".to_string());
    let overall = mean(&means).ok_or_else(empty)?;
    let std_dev = population_std_dev(&means).ok_or_else(empty)?;

    Ok(yearly_means
        .iter()
        .filter_map(|&(year, m)| {
            let deviation = m - overall;
            let classification = WetnessClass::from_anomaly(deviation, std_dev, config);
            (classification != WetnessClass::Normal).then(|| AnomalyRecord {
                year,
                deviation: round_to(deviation, 2),
                classification,
            })
        })
        .collect())
}

fn decades(yearly_means: &[(i32, f64)]) -> Vec<DecadeComparison> {
    let mut buckets: BTreeMap<i32, Vec<(i32, f64)>> = BTreeMap::new();
    for &(year, m) in yearly_means {
        buckets.entry(year.div_euclid(10) * 10).or_default().push((year, m));
    }

    let mut previous: Option<f64> = None;
    buckets
        .into_iter()
        .map(|(decade, entries)| {
            let decade_mean =
                entries.iter().map(|&(_, m)| m).sum::<f64>() / entries.len() as f64;
            let first = entries.first().map_or(decade, |&(y, _)| y);
            let last = entries.last().map_or(decade, |&(y, _)| y);
            let change = previous.map_or(0.0, |prev| decade_mean - prev);
            previous = Some(decade_mean);
            DecadeComparison {
                decade: format!("{decade}s"),
                years: format!("{first}-{last}"),
                mean: round_to(decade_mean, 2),
                change: round_to(change, 2),
            }
        })
        .collect()
}
