//! Extreme-event detection.
//!
//! A day is extreme when its combined precipitation lies strictly above the
//! 95th percentile of the positive combined values of the same input. Days
//! above the 99th percentile are tagged as severe.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::percentile::PercentileThreshold;
use crate::stats::round_to;
use precip_domain::{PrecipitationRecord, Station};

/// A day whose combined precipitation exceeded the extreme threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtremeEvent {
    pub date: String,
    /// Combined precipitation (mm, 2 decimals)
    pub precip: f64,
    /// Station with the highest reading that day
    pub station: Station,
    /// Highest percentile tier exceeded (95 or 99 with the default config)
    pub percentile: f64,
    pub year: i32,
    pub month: u32,
}

/// Headline numbers for the extreme-event view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtremesSummary {
    pub total_events: usize,
    pub p95: f64,
    pub p99: f64,
    /// Largest event magnitude, `None` when nothing exceeded the threshold
    pub max_precip: Option<f64>,
    pub max_date: Option<String>,
    /// Mean event magnitude, 0 without events
    pub mean_event_precip: f64,
}

/// Per-station exceedance statistics
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StationExtremes {
    /// Days on which this station alone read above the extreme threshold
    pub events: usize,
    /// Highest such reading, 0 when there were none
    pub max: f64,
}

/// Extreme-event analysis output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtremesResult {
    pub summary: ExtremesSummary,
    pub by_station: BTreeMap<Station, StationExtremes>,
    pub by_year: BTreeMap<i32, usize>,
    pub by_month: BTreeMap<u32, usize>,
    /// All events, largest first
    pub events: Vec<ExtremeEvent>,
}

/// Detect extreme events with the default thresholds.
pub fn analyze_extreme_events(records: &[PrecipitationRecord]) -> Result<ExtremesResult> {
    analyze_extreme_events_with(records, &AnalysisConfig::default())
}

/// Detect extreme events.
///
/// Fails with [`crate::AnalyticsError::EmptyInput`] when no day in `records`
/// had positive precipitation, since the percentile basis is then empty.
pub fn analyze_extreme_events_with(
    records: &[PrecipitationRecord],
    config: &AnalysisConfig,
) -> Result<ExtremesResult> {
    let extreme = PercentileThreshold::of_positive_precip(records, config.extreme_percentile)?;
    let severe = PercentileThreshold::of_positive_precip(records, config.severe_percentile)?;

    let mut by_station: BTreeMap<Station, StationExtremes> = Station::ALL
        .into_iter()
        .map(|s| (s, StationExtremes::default()))
        .collect();
    let mut by_year: BTreeMap<i32, usize> = BTreeMap::new();
    let mut by_month: BTreeMap<u32, usize> = BTreeMap::new();
    let mut ranked: Vec<(f64, ExtremeEvent)> = Vec::new();
    let mut max_event: Option<(f64, &str)> = None;

    for record in records {
        // Station counters look at every day, not only combined-series events.
        for (station, reading) in record.readings().iter() {
            if extreme.is_exceeded_by(reading) {
                let entry = by_station.entry(station).or_default();
                entry.events += 1;
                entry.max = entry.max.max(reading);
            }
        }

        let precip = record.precip();
        if !extreme.is_exceeded_by(precip) {
            continue;
        }

        let tier = if severe.is_exceeded_by(precip) {
            severe.percentile
        } else {
            extreme.percentile
        };

        *by_year.entry(record.year()).or_insert(0) += 1;
        *by_month.entry(record.month()).or_insert(0) += 1;

        if max_event.is_none_or(|(max, _)| precip > max) {
            max_event = Some((precip, record.raw_date()));
        }

        ranked.push((
            precip,
            ExtremeEvent {
                date: record.raw_date().to_string(),
                precip: round_to(precip, 2),
                station: record.readings().wettest(),
                percentile: tier,
                year: record.year(),
                month: record.month(),
            },
        ));
    }

    // sort_by is stable: equal magnitudes keep input order
    ranked.sort_by(|a, b| b.0.total_cmp(&a.0));

    let mean_event_precip = if ranked.is_empty() {
        0.0
    } else {
        ranked.iter().map(|(p, _)| p).sum::<f64>() / ranked.len() as f64
    };

    let events: Vec<ExtremeEvent> = ranked.into_iter().map(|(_, event)| event).collect();

    tracing::debug!(
        records = records.len(),
        events = events.len(),
        p95 = extreme.value,
        p99 = severe.value,
        "Extreme event analysis complete"
    );

    Ok(ExtremesResult {
        summary: ExtremesSummary {
            total_events: events.len(),
            p95: round_to(extreme.value, 2),
            p99: round_to(severe.value, 2),
            max_precip: max_event.map(|(p, _)| round_to(p, 2)),
            max_date: max_event.map(|(_, date)| date.to_string()),
            mean_event_precip: round_to(mean_event_precip, 2),
        },
        by_station,
        by_year,
        by_month,
        events,
    })
}
