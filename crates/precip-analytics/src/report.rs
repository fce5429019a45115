//! Combined climate report.

use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::droughts::{analyze_droughts_with, DroughtResult};
use crate::error::{AnalyticsError, Result};
use crate::extremes::{analyze_extreme_events_with, ExtremesResult};
use crate::seasonality::{analyze_seasonality_with, SeasonalityResult};
use crate::trends::{analyze_trends_with, TrendResult};
use precip_domain::PrecipitationRecord;

/// All four analyses over the same record set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimateReport {
    pub generated_at: String,
    pub record_count: usize,
    /// First and last day in the input
    pub period: Option<(String, String)>,
    pub extremes: ExtremesResult,
    pub droughts: DroughtResult,
    pub seasonality: SeasonalityResult,
    pub trends: TrendResult,
}

impl ClimateReport {
    /// Run every analysis; the first failure aborts the report.
    pub fn generate(records: &[PrecipitationRecord], config: &AnalysisConfig) -> Result<Self> {
        let extremes = analyze_extreme_events_with(records, config)?;
        let droughts = analyze_droughts_with(records, config);
        let seasonality = analyze_seasonality_with(records, config)?;
        let trends = analyze_trends_with(records, config)?;

        let first = records.iter().min_by_key(|r| r.date());
        let last = records.iter().max_by_key(|r| r.date());
        let period = first
            .zip(last)
            .map(|(a, b)| (a.day_label().to_string(), b.day_label().to_string()));

        Ok(Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            record_count: records.len(),
            period,
            extremes,
            droughts,
            seasonality,
            trends,
        })
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| AnalyticsError::Conversion(e.to_string()))
    }

    /// Markdown rendering for sharing outside the dashboard.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();
        md.push_str("# Precipitation Climate Report\n\n");
        md.push_str(&format!("**Generated:** {}\n\n", self.generated_at));

        md.push_str("## Dataset\n\n");
        md.push_str("| Metric | Value |\n");
        md.push_str("|--------|-------|\n");
        md.push_str(&format!("| Records | {} |\n", self.record_count));
        if let Some((ref first, ref last)) = self.period {
            md.push_str(&format!("| Period | {first} to {last} |\n"));
        }
        md.push_str(&format!(
            "| Years | {} |\n\n",
            self.trends.summary.years_analyzed
        ));

        let ext = &self.extremes.summary;
        md.push_str("## Extreme Events\n\n");
        md.push_str("| Metric | Value |\n");
        md.push_str("|--------|-------|\n");
        md.push_str(&format!("| Events | {} |\n", ext.total_events));
        md.push_str(&format!("| P95 | {:.2} mm |\n", ext.p95));
        md.push_str(&format!("| P99 | {:.2} mm |\n", ext.p99));
        if let (Some(max), Some(date)) = (ext.max_precip, &ext.max_date) {
            md.push_str(&format!("| Maximum | {max:.2} mm on {date} |\n"));
        }
        md.push_str(&format!("| Mean Event | {:.2} mm |\n\n", ext.mean_event_precip));

        if !self.extremes.events.is_empty() {
            md.push_str("| Date | Precip | Station | Tier |\n");
            md.push_str("|------|--------|---------|------|\n");
            for event in self.extremes.events.iter().take(10) {
                md.push_str(&format!(
                    "| {} | {:.2} | {} | P{} |\n",
                    event.date, event.precip, event.station, event.percentile
                ));
            }
            md.push('\n');
        }

        let dry = &self.droughts.summary;
        md.push_str("## Droughts\n\n");
        md.push_str("| Metric | Value |\n");
        md.push_str("|--------|-------|\n");
        md.push_str(&format!("| Runs | {} |\n", dry.total_runs));
        md.push_str(&format!("| Dry Days | {} ({:.1}%) |\n", dry.total_dry_days, dry.dry_day_percentage));
        if let Some(ref start) = dry.longest_run_start {
            md.push_str(&format!(
                "| Longest Run | {} days from {} |\n",
                dry.longest_run_days, start
            ));
        }
        md.push_str(&format!("| Mean Duration | {:.1} days |\n\n", dry.mean_duration_days));

        if !self.droughts.duration_histogram.is_empty() {
            md.push_str("| Duration | Runs |\n");
            md.push_str("|----------|------|\n");
            for band in &self.droughts.duration_histogram {
                md.push_str(&format!("| {} | {} |\n", band.label, band.count));
            }
            md.push('\n');
        }

        let season = &self.seasonality.summary;
        md.push_str("## Seasonality\n\n");
        md.push_str("| Month | Mean | Max | Rainy Days | Class |\n");
        md.push_str("|-------|------|-----|------------|-------|\n");
        for month in &self.seasonality.monthly {
            md.push_str(&format!(
                "| {} | {:.2} | {:.2} | {} | {} |\n",
                month.month_name, month.mean, month.max, month.rainy_days, month.classification
            ));
        }
        md.push('\n');
        md.push_str(&format!(
            "**Humid season:** {}  \n",
            season_list(&season.humid_season)
        ));
        md.push_str(&format!("**Dry season:** {}  \n", season_list(&season.dry_season)));
        md.push_str(&format!(
            "**Variability:** {:.1}%\n\n",
            season.coefficient_of_variation
        ));

        let trend = &self.trends.summary;
        md.push_str("## Trends\n\n");
        md.push_str("| Metric | Value |\n");
        md.push_str("|--------|-------|\n");
        md.push_str(&format!("| Trend | {} |\n", trend.trend));
        md.push_str(&format!("| Annual Rate | {:.3} mm/day per year |\n", trend.annual_rate));
        md.push_str(&format!("| R² | {:.3} |\n", trend.r_squared));
        md.push_str(&format!(
            "| Projection {} | {:.2} mm/day |\n\n",
            trend.projection_year, trend.projected_mean
        ));

        if !self.trends.decades.is_empty() {
            md.push_str("| Decade | Years | Mean | Change |\n");
            md.push_str("|--------|-------|------|--------|\n");
            for decade in &self.trends.decades {
                md.push_str(&format!(
                    "| {} | {} | {:.2} | {:+.2} |\n",
                    decade.decade, decade.years, decade.mean, decade.change
                ));
            }
            md.push('\n');
        }

        md
    }
}

fn season_list(months: &[String]) -> String {
    if months.is_empty() {
        "Not defined".to_string()
    } else {
        months.join(", ")
    }
}
