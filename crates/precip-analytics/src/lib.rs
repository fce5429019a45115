//! # Precipitation Analytics
//!
//! Analytical core of the climate dashboard. Turns a flat sequence of daily
//! [`PrecipitationRecord`]s into four derived views.
//!
//! ## Features
//!
//! - Extreme-event detection against nearest-rank percentiles
//! - Drought runs (consecutive dry days)
//! - Monthly and quarterly climatology with station comparison
//! - Yearly trend regression, anomalies and decade comparison
//!
//! Every analysis is a pure function of its input slice. Callers filter the
//! records before the call and page through the results after it.
//!
//! [`PrecipitationRecord`]: precip_domain::PrecipitationRecord

#![forbid(unsafe_code)]
#![warn(clippy::all, missing_docs)]

pub mod classification;
pub mod config;
pub mod droughts;
pub mod error;
pub mod extremes;
pub mod percentile;
pub mod report;
pub mod seasonality;
mod stats;
pub mod trends;

pub use classification::{TrendClass, WetnessClass};
pub use config::AnalysisConfig;
pub use droughts::{analyze_droughts, analyze_droughts_with, DroughtResult, DroughtRun};
pub use error::{AnalyticsError, Result};
pub use extremes::{
    analyze_extreme_events, analyze_extreme_events_with, ExtremeEvent, ExtremesResult,
};
pub use percentile::{percentile, PercentileThreshold};
pub use report::ClimateReport;
pub use seasonality::{analyze_seasonality, analyze_seasonality_with, SeasonalityResult};
pub use stats::round_to;
pub use trends::{analyze_trends, analyze_trends_with, RegressionModel, TrendResult};
