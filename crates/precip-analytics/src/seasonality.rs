//! Monthly and quarterly climatology.
//!
//! Buckets the input by calendar month and by the record's quarter, labels
//! each bucket against the overall daily mean and compares the three
//! stations by their mean of monthly means.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::classification::WetnessClass;
use crate::config::AnalysisConfig;
use crate::error::{AnalyticsError, Result};
use crate::stats::{mean, population_std_dev, round_to};
use precip_domain::{MONTH_ABBREVIATIONS, PrecipitationRecord, Station};

const QUARTERS: [(&str, &str); 4] = [
    ("Q1 (Jan-Mar)", "Jan-Mar"),
    ("Q2 (Apr-Jun)", "Apr-Jun"),
    ("Q3 (Jul-Sep)", "Jul-Sep"),
    ("Q4 (Oct-Dec)", "Oct-Dec"),
];

// =============================================================================
// RESULT TYPES
// =============================================================================

/// Climatology of one calendar month across all years in the input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyStatistic {
    pub month: u32,
    pub month_name: String,
    pub mean: f64,
    pub max: f64,
    pub min: f64,
    pub rainy_days: usize,
    pub dry_days: usize,
    pub classification: WetnessClass,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuarterlyStatistic {
    pub quarter: u32,
    pub name: String,
    pub months: String,
    pub mean: f64,
    pub classification: WetnessClass,
}

/// A month together with a mean value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthMean {
    pub month: u32,
    pub month_name: String,
    pub mean: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalitySummary {
    /// Mean combined precipitation over every day in the input
    pub overall_mean: f64,
    pub wettest_month: MonthMean,
    pub driest_month: MonthMean,
    /// Months labelled "Wet" or "Very Wet", in calendar order
    pub humid_season: Vec<String>,
    /// Months labelled "Dry" or "Very Dry", in calendar order
    pub dry_season: Vec<String>,
    /// Coefficient of variation of the monthly means, percent
    pub coefficient_of_variation: f64,
}

/// Per-station climatology
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationSeasonality {
    /// Average of the station's twelve monthly means
    pub mean_of_monthly_means: f64,
    /// Month with the highest station mean
    pub peak_month: String,
}

/// Seasonality analysis output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalityResult {
    pub summary: SeasonalitySummary,
    pub monthly: Vec<MonthlyStatistic>,
    pub quarterly: Vec<QuarterlyStatistic>,
    pub by_station: BTreeMap<Station, StationSeasonality>,
}

// =============================================================================
// ANALYSIS
// =============================================================================

/// Seasonality analysis with the default thresholds.
pub fn analyze_seasonality(records: &[PrecipitationRecord]) -> Result<SeasonalityResult> {
    analyze_seasonality_with(records, &AnalysisConfig::default())
}

/// Seasonality analysis.
///
/// Every calendar month and quarter must be represented in `records`; an
/// empty bucket fails with [`AnalyticsError::EmptyInput`] naming it.
pub fn analyze_seasonality_with(
    records: &[PrecipitationRecord],
    config: &AnalysisConfig,
) -> Result<SeasonalityResult> {
    let mut months: [Vec<&PrecipitationRecord>; 12] = std::array::from_fn(|_| Vec::new());
    let mut quarters: [Vec<&PrecipitationRecord>; 4] = std::array::from_fn(|_| Vec::new());
    for record in records {
        months[(record.month() - 1) as usize].push(record);
        quarters[(record.quarter() - 1) as usize].push(record);
    }

    if let Some(i) = months.iter().position(Vec::is_empty) {
        return Err(AnalyticsError::EmptyInput(format!(
            "no records for month {}",
            MONTH_ABBREVIATIONS[i]
        )));
    }
    if let Some(i) = quarters.iter().position(Vec::is_empty) {
        return Err(AnalyticsError::EmptyInput(format!(
            "no records for quarter {}",
            QUARTERS[i].0
        )));
    }

    let all_precip: Vec<f64> = records.iter().map(PrecipitationRecord::precip).collect();
    let overall_mean = mean(&all_precip)
        .ok_or_else(|| AnalyticsError::EmptyInput("no records".to_string()))?;

    // Unrounded monthly means feed every derived statistic
    let monthly_means: Vec<f64> = months.iter().map(|b| bucket_mean(b, |r| r.precip())).collect();

    let monthly: Vec<MonthlyStatistic> = months
        .iter()
        .zip(&monthly_means)
        .enumerate()
        .map(|(i, (bucket, &avg))| {
            let rainy_days = bucket.iter().filter(|r| config.is_rainy(r.precip())).count();
            let (min, max) = bucket.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), r| {
                (lo.min(r.precip()), hi.max(r.precip()))
            });
            MonthlyStatistic {
                month: i as u32 + 1,
                month_name: MONTH_ABBREVIATIONS[i].to_string(),
                mean: round_to(avg, 2),
                max: round_to(max, 2),
                min: round_to(min, 2),
                rainy_days,
                dry_days: bucket.len() - rainy_days,
                classification: WetnessClass::from_ratio(avg, overall_mean, config),
            }
        })
        .collect();

    let quarterly: Vec<QuarterlyStatistic> = quarters
        .iter()
        .enumerate()
        .map(|(i, bucket)| {
            let quarter_mean = bucket_mean(bucket, |r| r.precip());
            QuarterlyStatistic {
                quarter: i as u32 + 1,
                name: QUARTERS[i].0.to_string(),
                months: QUARTERS[i].1.to_string(),
                mean: round_to(quarter_mean, 2),
                classification: WetnessClass::from_ratio(quarter_mean, overall_mean, config),
            }
        })
        .collect();

    let coefficient_of_variation = coefficient_of_variation(&monthly_means)?;

    let wettest = arg_best(&monthly_means, |candidate, best| candidate > best);
    let driest = arg_best(&monthly_means, |candidate, best| candidate < best);

    let season = |pick: fn(&WetnessClass) -> bool| -> Vec<String> {
        monthly
            .iter()
            .filter(|m| pick(&m.classification))
            .map(|m| m.month_name.clone())
            .collect()
    };

    let summary = SeasonalitySummary {
        overall_mean: round_to(overall_mean, 2),
        wettest_month: month_mean(wettest, monthly_means[wettest]),
        driest_month: month_mean(driest, monthly_means[driest]),
        humid_season: season(WetnessClass::is_wet),
        dry_season: season(WetnessClass::is_dry),
        coefficient_of_variation: round_to(coefficient_of_variation, 1),
    };

    let by_station = Station::ALL
        .into_iter()
        .map(|station| {
            let station_means: Vec<f64> = months
                .iter()
                .map(|b| bucket_mean(b, |r| r.reading(station)))
                .collect();
            let peak = arg_best(&station_means, |candidate, best| candidate > best);
            let overall = station_means.iter().sum::<f64>() / station_means.len() as f64;
            (
                station,
                StationSeasonality {
                    mean_of_monthly_means: round_to(overall, 2),
                    peak_month: MONTH_ABBREVIATIONS[peak].to_string(),
                },
            )
        })
        .collect();

    tracing::debug!(
        records = records.len(),
        humid_months = summary.humid_season.len(),
        dry_months = summary.dry_season.len(),
        "Seasonality analysis complete"
    );

    Ok(SeasonalityResult {
        summary,
        monthly,
        quarterly,
        by_station,
    })
}

/// Mean of `value` over a non-empty bucket
fn bucket_mean(bucket: &[&PrecipitationRecord], value: impl Fn(&PrecipitationRecord) -> f64) -> f64 {
    bucket.iter().map(|&r| value(r)).sum::<f64>() / bucket.len() as f64
}

/// Index of the best value; the earliest index wins ties.
fn arg_best(values: &[f64], better: impl Fn(f64, f64) -> bool) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if better(v, values[best]) {
            best = i;
        }
    }
    best
}

fn month_mean(index: usize, value: f64) -> MonthMean {
    MonthMean {
        month: index as u32 + 1,
        month_name: MONTH_ABBREVIATIONS[index].to_string(),
        mean: round_to(value, 2),
    }
}

/// `100 * stddev / mean` over the monthly means, population statistics.
fn coefficient_of_variation(monthly_means: &[f64]) -> Result<f64> {
    let empty = || AnalyticsError::EmptyInput("no monthly means".to_string());
    let mean = mean(monthly_means).ok_or_else(empty)?;
    let std_dev = population_std_dev(monthly_means).ok_or_else(empty)?;
    if mean == 0.0 {
        return Err(AnalyticsError::DegenerateDistribution(
            "mean of monthly means is zero; coefficient of variation undefined".to_string(),
        ));
    }
    Ok(100.0 * std_dev / mean)
}
