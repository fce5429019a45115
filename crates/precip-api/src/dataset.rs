//! # Dataset Loading
//!
//! The dataset is a JSON array of daily records, read once at startup and
//! shared read-only between requests.

use std::path::Path;
use std::sync::Arc;

use precip_domain::{PrecipitationRecord, RecordWire};

use crate::error::{ApiError, ApiResult};

/// Read and validate the dataset at `path`.
///
/// Validation stops at the first invalid record and reports its index.
pub async fn load_dataset(path: &Path) -> ApiResult<Arc<[PrecipitationRecord]>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ApiError::DatasetIo {
            path: path.to_path_buf(),
            source,
        })?;

    let records = parse_dataset(&raw)?;
    tracing::info!(
        path = %path.display(),
        records = records.len(),
        "Dataset loaded"
    );
    Ok(records)
}

/// Parse a JSON dataset held in memory.
pub fn parse_dataset(raw: &str) -> ApiResult<Arc<[PrecipitationRecord]>> {
    let rows: Vec<RecordWire> = serde_json::from_str(raw)?;
    rows.into_iter()
        .enumerate()
        .map(|(index, row)| {
            PrecipitationRecord::try_from(row)
                .map_err(|source| ApiError::InvalidRecord { index, source })
        })
        .collect()
}

/// Distinct years present in `records`, ascending
pub fn available_years(records: &[PrecipitationRecord]) -> Vec<i32> {
    let mut years: Vec<i32> = records.iter().map(PrecipitationRecord::year).collect();
    years.sort_unstable();
    years.dedup();
    years
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const TWO_ROWS: &str = r#"[
        {"fecha": "2003-01-01 00:00:00", "P42_Ramon_Huanuna": 0.0, "P43_Limboasi": 1.2,
         "P55_Diguchi": 0.4, "precip": 0.53, "year": 2003, "month": 1, "quarter": 1},
        {"fecha": "2001-12-31 00:00:00", "P42_Ramon_Huanuna": 2.0, "P43_Limboasi": 0.0,
         "P55_Diguchi": 1.0, "precip": 1.0, "year": 2001, "month": 12, "quarter": 4}
    ]"#;

    #[tokio::test]
    async fn test_load_dataset_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(TWO_ROWS.as_bytes()).unwrap();

        let records = load_dataset(file.path()).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].raw_date(), "2003-01-01 00:00:00");
        assert_eq!(available_years(&records), vec![2001, 2003]);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_dataset(&dir.path().join("absent.json")).await.unwrap_err();
        assert!(matches!(err, ApiError::DatasetIo { .. }));
    }

    #[test]
    fn test_invalid_record_reports_index() {
        let raw = r#"[
            {"fecha": "2003-01-01", "P42_Ramon_Huanuna": 0.0, "P43_Limboasi": 0.0,
             "P55_Diguchi": 0.0, "precip": 0.0, "year": 2003, "month": 1, "quarter": 1},
            {"fecha": "2003-01-02", "P42_Ramon_Huanuna": 0.0, "P43_Limboasi": 0.0,
             "P55_Diguchi": 0.0, "precip": 0.0, "year": 2003, "month": 1, "quarter": 2}
        ]"#;
        let err = parse_dataset(raw).unwrap_err();
        assert!(matches!(err, ApiError::InvalidRecord { index: 1, .. }));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            parse_dataset("{not json"),
            Err(ApiError::DatasetFormat(_))
        ));
    }
}
