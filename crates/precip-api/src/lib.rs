//! # Precipitation Climate API
//!
//! Thin HTTP layer over the analytics engine. The dataset is loaded once at
//! startup; every request filters it, runs one analysis and wraps the result
//! in a `{"success", "filters", "data"}` envelope.
//!
//! ## Routes
//!
//! | Route | Query parameters |
//! |-------|------------------|
//! | `GET /api/extremes` | `year`, `month`, `limit` |
//! | `GET /api/droughts` | `year`, `min_duration`, `limit` |
//! | `GET /api/seasonality` | `year`, `month` |
//! | `GET /api/trends` | `start_year`, `end_year` |
//! | `GET /api/report` | `start_year`, `end_year`, `format` (`json` or `markdown`) |
//! | `GET /api/years` | |
//! | `GET /health` | |

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod dataset;
pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::http::{HeaderValue, Method};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use precip_analytics::AnalysisConfig;
use precip_domain::PrecipitationRecord;

pub use config::Config;
pub use dataset::{available_years, load_dataset, parse_dataset};
pub use error::{ApiError, ApiResult};

/// Application state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    /// Immutable dataset snapshot
    pub records: Arc<[PrecipitationRecord]>,

    /// Analysis thresholds
    pub analysis: Arc<AnalysisConfig>,

    /// Result list length when a request does not pass `limit`
    pub default_limit: usize,
}

impl AppState {
    pub fn new(records: Arc<[PrecipitationRecord]>, default_limit: usize) -> Self {
        Self {
            records,
            analysis: Arc::new(AnalysisConfig::default()),
            default_limit,
        }
    }
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    "OK"
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() || origins.iter().any(|o| o == "*") {
        AllowOrigin::from(Any)
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match origin.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(%origin, "Ignoring unparseable CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_origin(allow_origin)
        .allow_headers(Any)
}

/// Build the Axum router
pub fn build_router(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        // Analyses
        .route("/api/extremes", get(handlers::extremes))
        .route("/api/droughts", get(handlers::droughts))
        .route("/api/seasonality", get(handlers::seasonality))
        .route("/api/trends", get(handlers::trends))
        .route("/api/report", get(handlers::report))
        .route("/api/years", get(handlers::years))
        // Health check
        .route("/health", get(health_check))
        .route("/", get(|| async { "Precipitation Climate Analytics API" }))
        // State and middleware
        .with_state(state)
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
}

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use chrono::{Datelike, NaiveDate};
    use precip_domain::StationReadings;
    use serde_json::Value;
    use tower::ServiceExt;

    /// Two years of daily data: a monthly ramp broken by recurring dry spells.
    fn test_records() -> Arc<[PrecipitationRecord]> {
        let first = NaiveDate::from_ymd_opt(2001, 1, 1).unwrap();
        first
            .iter_days()
            .take_while(|d| d.year() <= 2002)
            .map(|d| {
                let p = if d.day() % 9 < 4 {
                    0.0
                } else {
                    f64::from(d.month()) + f64::from(d.year() - 2001) * 0.5
                };
                PrecipitationRecord::for_day(d, StationReadings::new(p, p * 0.8, p * 1.2), p)
                    .unwrap()
            })
            .collect()
    }

    fn app() -> Router {
        build_router(AppState::new(test_records(), 100), &["*".to_string()])
    }

    async fn get_json(uri: &str) -> (StatusCode, Value) {
        let response = app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"OK");
    }

    #[tokio::test]
    async fn test_extremes_limit_and_filters_echo() {
        let (status, body) = get_json("/api/extremes?limit=2").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["filters"]["limit"], 2);
        assert!(body["filters"]["year"].is_null());
        assert!(body["data"]["events"].as_array().unwrap().len() <= 2);
        assert!(body["data"]["summary"]["total_events"].as_u64().unwrap() >= 2);
    }

    #[tokio::test]
    async fn test_extremes_default_limit() {
        let (status, body) = get_json("/api/extremes?year=2002").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["filters"]["limit"], 100);
        assert_eq!(body["filters"]["year"], 2002);
    }

    #[tokio::test]
    async fn test_invalid_month_is_bad_request() {
        let (status, body) = get_json("/api/extremes?month=13").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "INVALID_FILTER");
    }

    #[tokio::test]
    async fn test_unparseable_query_is_bad_request() {
        let (status, body) = get_json("/api/droughts?year=abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_QUERY");
    }

    #[tokio::test]
    async fn test_droughts_min_duration_filters_runs_only() {
        let (_, all) = get_json("/api/droughts").await;
        let (status, body) = get_json("/api/droughts?min_duration=5").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["filters"]["min_duration"], 5);

        let runs = body["data"]["runs"].as_array().unwrap();
        assert!(runs.iter().all(|r| r["duration_days"].as_u64().unwrap() >= 5));
        assert!(runs.len() < all["data"]["runs"].as_array().unwrap().len());
        assert_eq!(body["data"]["summary"], all["data"]["summary"]);
    }

    #[tokio::test]
    async fn test_seasonality() {
        let (status, body) = get_json("/api/seasonality?year=2001").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["monthly"].as_array().unwrap().len(), 12);
        assert_eq!(body["data"]["summary"]["wettest_month"]["month_name"], "Dec");
    }

    #[tokio::test]
    async fn test_seasonality_single_month_is_unprocessable() {
        let (status, body) = get_json("/api/seasonality?month=3").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "EMPTY_INPUT");
    }

    #[tokio::test]
    async fn test_trends_need_two_years() {
        let (status, body) = get_json("/api/trends").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["summary"]["years_analyzed"], 2);

        let (status, body) = get_json("/api/trends?start_year=2001&end_year=2001").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "INSUFFICIENT_DATA");
    }

    #[tokio::test]
    async fn test_inverted_year_range() {
        let (status, _) = get_json("/api/trends?start_year=2005&end_year=2001").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_years() {
        let (status, body) = get_json("/api/years").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], serde_json::json!([2001, 2002]));
    }

    #[tokio::test]
    async fn test_report_markdown() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/report?format=markdown")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.starts_with("# Precipitation Climate Report"));
    }

    #[tokio::test]
    async fn test_report_json() {
        let (status, body) = get_json("/api/report").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["filters"]["format"], "json");
        assert_eq!(body["data"]["record_count"], 730);
    }
}
