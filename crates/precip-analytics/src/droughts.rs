//! Drought-run detection.
//!
//! A drought is a maximal run of consecutive dry days (combined precipitation
//! strictly below the dry-day threshold) at least `min_drought_days` long.
//! Runs are attributed to the calendar year, month and quarter of their first
//! day, even when they cross a month or year boundary.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::stats::round_to;
use precip_domain::{MONTH_ABBREVIATIONS, PrecipitationRecord};

// =============================================================================
// RESULT TYPES
// =============================================================================

/// A qualifying run of dry days
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DroughtRun {
    /// 1-based, in chronological order of detection
    pub id: usize,
    pub start_date: String,
    pub end_date: String,
    pub duration_days: usize,
    /// Calendar attributes of the first day of the run
    pub year: i32,
    pub month: u32,
    pub quarter: u32,
}

/// Headline numbers for the drought view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroughtSummary {
    pub total_runs: usize,
    /// Every dry day in the input, inside a qualifying run or not
    pub total_dry_days: usize,
    pub longest_run_days: usize,
    pub longest_run_start: Option<String>,
    /// Mean run length in days (1 decimal)
    pub mean_duration_days: f64,
    /// Share of dry days over all days, percent (1 decimal)
    pub dry_day_percentage: f64,
}

/// Runs starting in one calendar year
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearlyDroughts {
    pub year: i32,
    pub runs: usize,
    pub total_days: usize,
    pub longest_days: usize,
}

/// Runs starting in one calendar month, across all years
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyDroughtFrequency {
    pub month: u32,
    pub month_name: String,
    pub runs: usize,
}

/// One histogram bar over run durations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationBand {
    pub label: String,
    pub min_days: usize,
    /// Inclusive upper bound, `None` for the open-ended band
    pub max_days: Option<usize>,
    pub count: usize,
}

/// Drought analysis output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroughtResult {
    pub summary: DroughtSummary,
    pub by_year: Vec<YearlyDroughts>,
    pub by_month: Vec<MonthlyDroughtFrequency>,
    pub duration_histogram: Vec<DurationBand>,
    /// All runs, longest first
    pub runs: Vec<DroughtRun>,
}

const DURATION_BANDS: [(usize, Option<usize>); 5] = [
    (3, Some(5)),
    (6, Some(10)),
    (11, Some(15)),
    (16, Some(20)),
    (21, None),
];

// =============================================================================
// ANALYSIS
// =============================================================================

/// Detect droughts with the default thresholds.
pub fn analyze_droughts(records: &[PrecipitationRecord]) -> DroughtResult {
    analyze_droughts_with(records, &AnalysisConfig::default())
}

/// Detect droughts.
///
/// Records are sorted by date internally; the caller's order does not
/// matter. An empty input yields an empty result.
pub fn analyze_droughts_with(
    records: &[PrecipitationRecord],
    config: &AnalysisConfig,
) -> DroughtResult {
    let mut sorted: Vec<&PrecipitationRecord> = records.iter().collect();
    sorted.sort_by_key(|r| r.date());

    let mut runs = scan_runs(&sorted, config);
    let total_dry_days = sorted.iter().filter(|r| config.is_dry(r.precip())).count();

    let by_year = yearly_rollup(&runs);
    let by_month = monthly_frequency(&runs);
    let duration_histogram = duration_histogram(&runs);

    let longest = runs
        .iter()
        .max_by(|a, b| a.duration_days.cmp(&b.duration_days).then(b.id.cmp(&a.id)));
    let mean_duration_days = if runs.is_empty() {
        0.0
    } else {
        runs.iter().map(|r| r.duration_days).sum::<usize>() as f64 / runs.len() as f64
    };
    let dry_day_percentage = if sorted.is_empty() {
        0.0
    } else {
        total_dry_days as f64 / sorted.len() as f64 * 100.0
    };

    let summary = DroughtSummary {
        total_runs: runs.len(),
        total_dry_days,
        longest_run_days: longest.map_or(0, |r| r.duration_days),
        longest_run_start: longest.map(|r| r.start_date.clone()),
        mean_duration_days: round_to(mean_duration_days, 1),
        dry_day_percentage: round_to(dry_day_percentage, 1),
    };

    // Stable: equal durations stay in chronological order
    runs.sort_by(|a, b| b.duration_days.cmp(&a.duration_days));

    tracing::debug!(
        records = records.len(),
        runs = runs.len(),
        dry_days = total_dry_days,
        "Drought analysis complete"
    );

    DroughtResult {
        summary,
        by_year,
        by_month,
        duration_histogram,
        runs,
    }
}

/// Single forward pass over date-sorted records, in chronological order.
fn scan_runs(sorted: &[&PrecipitationRecord], config: &AnalysisConfig) -> Vec<DroughtRun> {
    let mut runs = Vec::new();
    // (start index, length) of the dry run currently open
    let mut open: Option<(usize, usize)> = None;

    for (i, record) in sorted.iter().enumerate() {
        if config.is_dry(record.precip()) {
            open = Some(open.map_or((i, 1), |(start, len)| (start, len + 1)));
        } else if let Some((start, len)) = open.take() {
            push_run(&mut runs, sorted, start, len, config);
        }
    }
    if let Some((start, len)) = open {
        push_run(&mut runs, sorted, start, len, config);
    }

    runs
}

fn push_run(
    runs: &mut Vec<DroughtRun>,
    sorted: &[&PrecipitationRecord],
    start: usize,
    len: usize,
    config: &AnalysisConfig,
) {
    if len < config.min_drought_days {
        return;
    }
    let first = sorted[start];
    let last = sorted[start + len - 1];
    runs.push(DroughtRun {
        id: runs.len() + 1,
        start_date: first.day_label().to_string(),
        end_date: last.day_label().to_string(),
        duration_days: len,
        year: first.year(),
        month: first.month(),
        quarter: first.quarter(),
    });
}

fn yearly_rollup(runs: &[DroughtRun]) -> Vec<YearlyDroughts> {
    let mut by_year: BTreeMap<i32, YearlyDroughts> = BTreeMap::new();
    for run in runs {
        let entry = by_year.entry(run.year).or_insert(YearlyDroughts {
            year: run.year,
            runs: 0,
            total_days: 0,
            longest_days: 0,
        });
        entry.runs += 1;
        entry.total_days += run.duration_days;
        entry.longest_days = entry.longest_days.max(run.duration_days);
    }
    by_year.into_values().collect()
}

fn monthly_frequency(runs: &[DroughtRun]) -> Vec<MonthlyDroughtFrequency> {
    let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
    for run in runs {
        *counts.entry(run.month).or_insert(0) += 1;
    }

    let mut months: Vec<MonthlyDroughtFrequency> = counts
        .into_iter()
        .map(|(month, runs)| MonthlyDroughtFrequency {
            month,
            month_name: MONTH_ABBREVIATIONS[(month - 1) as usize].to_string(),
            runs,
        })
        .collect();
    months.sort_by(|a, b| b.runs.cmp(&a.runs));
    months
}

fn duration_histogram(runs: &[DroughtRun]) -> Vec<DurationBand> {
    DURATION_BANDS
        .iter()
        .filter_map(|&(min_days, max_days)| {
            let count = runs
                .iter()
                .filter(|r| {
                    r.duration_days >= min_days && max_days.is_none_or(|max| r.duration_days <= max)
                })
                .count();
            let label = match max_days {
                Some(max) => format!("{min_days}-{max} days"),
                None => format!("{min_days}+ days"),
            };
            (count > 0).then_some(DurationBand {
                label,
                min_days,
                max_days,
                count,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::series;

    const WET: f64 = 5.0;
    const DRY: f64 = 0.0;

    #[test]
    fn test_single_interior_run() {
        let records = series("2010-03-01", &[WET, DRY, DRY, DRY, WET, WET]);
        let result = analyze_droughts(&records);

        assert_eq!(result.runs.len(), 1);
        let run = &result.runs[0];
        assert_eq!(run.id, 1);
        assert_eq!(run.duration_days, 3);
        assert_eq!(run.start_date, "2010-03-02");
        assert_eq!(run.end_date, "2010-03-04");
        assert_eq!(result.summary.total_dry_days, 3);
        assert_eq!(result.summary.dry_day_percentage, 50.0);
    }

    #[test]
    fn test_trailing_run_is_emitted() {
        let records = series("2010-03-01", &[WET, WET, DRY, DRY, DRY, DRY]);
        let result = analyze_droughts(&records);
        assert_eq!(result.runs.len(), 1);
        assert_eq!(result.runs[0].duration_days, 4);
        assert_eq!(result.runs[0].end_date, "2010-03-06");
    }

    #[test]
    fn test_short_runs_count_as_dry_days_only() {
        let records = series("2010-03-01", &[DRY, DRY, WET, DRY, WET]);
        let result = analyze_droughts(&records);
        assert!(result.runs.is_empty());
        assert_eq!(result.summary.total_dry_days, 3);
        assert_eq!(result.summary.longest_run_start, None);
        assert_eq!(result.summary.mean_duration_days, 0.0);
        assert!(result.duration_histogram.is_empty());
    }

    #[test]
    fn test_threshold_day_breaks_a_run() {
        let records = series("2010-03-01", &[DRY, DRY, 0.1, DRY, DRY, DRY]);
        let result = analyze_droughts(&records);
        assert_eq!(result.runs.len(), 1);
        assert_eq!(result.runs[0].start_date, "2010-03-04");
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let mut records = series("2010-03-01", &[WET, DRY, DRY, DRY, WET]);
        records.reverse();
        let result = analyze_droughts(&records);
        assert_eq!(result.runs.len(), 1);
        assert_eq!(result.runs[0].start_date, "2010-03-02");
    }

    #[test]
    fn test_run_attributed_to_start_month() {
        // Jan 30 .. Feb 3
        let records = series("2011-01-29", &[WET, DRY, DRY, DRY, DRY, DRY, WET]);
        let result = analyze_droughts(&records);
        let run = &result.runs[0];
        assert_eq!((run.year, run.month, run.quarter), (2011, 1, 1));
        assert_eq!(run.end_date, "2011-02-03");
        assert_eq!(result.by_month[0].month_name, "Jan");
    }

    #[test]
    fn test_sorting_ids_and_rollups() {
        let mut values = vec![WET];
        values.extend([DRY; 3]); // run 1: 3 days
        values.push(WET);
        values.extend([DRY; 7]); // run 2: 7 days
        values.push(WET);
        values.extend([DRY; 3]); // run 3: 3 days
        values.push(WET);
        values.extend([DRY; 22]); // run 4: 22 days
        values.push(WET);
        let records = series("2012-01-01", &values);
        let result = analyze_droughts(&records);

        let order: Vec<(usize, usize)> =
            result.runs.iter().map(|r| (r.id, r.duration_days)).collect();
        assert_eq!(order, vec![(4, 22), (2, 7), (1, 3), (3, 3)]);

        assert_eq!(result.summary.total_runs, 4);
        assert_eq!(result.summary.longest_run_days, 22);
        assert_eq!(result.summary.mean_duration_days, 8.8);

        assert_eq!(result.by_year.len(), 1);
        assert_eq!(result.by_year[0].total_days, 35);
        assert_eq!(result.by_year[0].longest_days, 22);

        let labels: Vec<(&str, usize)> = result
            .duration_histogram
            .iter()
            .map(|b| (b.label.as_str(), b.count))
            .collect();
        assert_eq!(
            labels,
            vec![("3-5 days", 2), ("6-10 days", 1), ("21+ days", 1)]
        );
    }

    #[test]
    fn test_monthly_frequency_sorted_by_count() {
        let mut values = vec![WET];
        values.extend([DRY; 3]); // starts Jan 2
        values.push(WET);
        values.resize(35, WET);
        values.extend([DRY; 3]); // starts Feb 5
        values.push(WET);
        values.extend([DRY; 3]); // starts Feb 9
        values.push(WET);
        let records = series("2013-01-01", &values);
        let result = analyze_droughts(&records);

        let months: Vec<(u32, usize)> = result.by_month.iter().map(|m| (m.month, m.runs)).collect();
        assert_eq!(months, vec![(2, 2), (1, 1)]);
    }

    #[test]
    fn test_empty_input() {
        let result = analyze_droughts(&[]);
        assert!(result.runs.is_empty());
        assert_eq!(result.summary.dry_day_percentage, 0.0);
    }

    #[test]
    fn test_min_run_length_configurable() {
        let records = series("2010-03-01", &[WET, DRY, DRY, WET]);
        let config = AnalysisConfig {
            min_drought_days: 2,
            ..AnalysisConfig::default()
        };
        assert_eq!(analyze_droughts_with(&records, &config).runs.len(), 1);
    }

    #[test]
    fn test_idempotent() {
        let records = series("2010-03-01", &[WET, DRY, DRY, DRY, WET, DRY, DRY, DRY, DRY]);
        assert_eq!(analyze_droughts(&records), analyze_droughts(&records));
    }
}
