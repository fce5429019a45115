//! # Route Handlers
//!
//! Each handler filters the shared dataset, runs one analysis and trims the
//! returned list. Analyses always see the full filtered set.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use precip_analytics::{
    analyze_droughts_with, analyze_extreme_events_with, analyze_seasonality_with,
    analyze_trends_with, ClimateReport,
};
use precip_domain::{PrecipitationRecord, RecordFilter};

use crate::dataset::available_years;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

// =============================================================================
// ENVELOPE
// =============================================================================

/// Successful response body
#[derive(Debug, Serialize)]
pub struct Envelope<F, D> {
    pub success: bool,
    pub filters: F,
    pub data: D,
}

impl<F: Serialize, D: Serialize> Envelope<F, D> {
    fn ok(filters: F, data: D) -> Json<Self> {
        Json(Self {
            success: true,
            filters,
            data,
        })
    }
}

/// Unwrap query parameters, turning axum's plain-text rejection into an envelope
fn params<T>(query: Result<Query<T>, QueryRejection>) -> ApiResult<T> {
    query
        .map(|Query(q)| q)
        .map_err(|rejection| ApiError::InvalidQuery(rejection.body_text()))
}

/// Validate a calendar filter and apply it to the dataset
fn filtered(state: &AppState, filter: RecordFilter) -> ApiResult<Vec<PrecipitationRecord>> {
    filter.validate()?;
    let records = filter.apply(&state.records);
    tracing::debug!(?filter, matched = records.len(), "Dataset filtered");
    Ok(records)
}

// =============================================================================
// QUERY PARAMETERS
// =============================================================================

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
pub struct ExtremesQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
pub struct DroughtsQuery {
    pub year: Option<i32>,
    pub min_duration: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
pub struct SeasonalityQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
pub struct TrendsQuery {
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Json,
    Markdown,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
pub struct ReportQuery {
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    #[serde(default)]
    pub format: ReportFormat,
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `GET /api/extremes`
pub async fn extremes(
    State(state): State<AppState>,
    query: Result<Query<ExtremesQuery>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let mut query = params(query)?;
    let limit = *query.limit.get_or_insert(state.default_limit);

    let records = filtered(
        &state,
        RecordFilter {
            year: query.year,
            month: query.month,
            ..Default::default()
        },
    )?;

    let mut result = analyze_extreme_events_with(&records, &state.analysis)?;
    result.events.truncate(limit);

    Ok(Envelope::ok(query, result))
}

/// `GET /api/droughts`
pub async fn droughts(
    State(state): State<AppState>,
    query: Result<Query<DroughtsQuery>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let mut query = params(query)?;
    let limit = *query.limit.get_or_insert(state.default_limit);
    let min_duration = *query
        .min_duration
        .get_or_insert(state.analysis.min_drought_days);

    let records = filtered(
        &state,
        RecordFilter {
            year: query.year,
            ..Default::default()
        },
    )?;

    let mut result = analyze_droughts_with(&records, &state.analysis);
    result.runs.retain(|run| run.duration_days >= min_duration);
    result.runs.truncate(limit);

    Ok(Envelope::ok(query, result))
}

/// `GET /api/seasonality`
pub async fn seasonality(
    State(state): State<AppState>,
    query: Result<Query<SeasonalityQuery>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let query = params(query)?;
    let records = filtered(
        &state,
        RecordFilter {
            year: query.year,
            month: query.month,
            ..Default::default()
        },
    )?;

    let result = analyze_seasonality_with(&records, &state.analysis)?;
    Ok(Envelope::ok(query, result))
}

/// `GET /api/trends`
pub async fn trends(
    State(state): State<AppState>,
    query: Result<Query<TrendsQuery>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let query = params(query)?;
    let records = filtered(
        &state,
        RecordFilter {
            start_year: query.start_year,
            end_year: query.end_year,
            ..Default::default()
        },
    )?;

    let result = analyze_trends_with(&records, &state.analysis)?;
    Ok(Envelope::ok(query, result))
}

/// `GET /api/years`
pub async fn years(State(state): State<AppState>) -> impl IntoResponse {
    Envelope::ok(serde_json::json!({}), available_years(&state.records))
}

/// `GET /api/report`: all four analyses, as JSON or Markdown
pub async fn report(
    State(state): State<AppState>,
    query: Result<Query<ReportQuery>, QueryRejection>,
) -> ApiResult<Response> {
    let query = params(query)?;
    let records = filtered(
        &state,
        RecordFilter {
            start_year: query.start_year,
            end_year: query.end_year,
            ..Default::default()
        },
    )?;

    let report = ClimateReport::generate(&records, &state.analysis)?;
    let response = match query.format {
        ReportFormat::Json => Envelope::ok(query, report).into_response(),
        ReportFormat::Markdown => (
            [(header::CONTENT_TYPE, "text/markdown; charset=utf-8")],
            report.to_markdown(),
        )
            .into_response(),
    };
    Ok(response)
}
