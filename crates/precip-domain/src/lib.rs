//! # Precipitation Climate Analytics - Domain Model
//!
//! Core record types shared by the analytics engine, the HTTP service and
//! the dataset simulator. A [`PrecipitationRecord`] is validated once, when
//! it is constructed or deserialized; nothing downstream re-checks it.
//!
//! ## Wire format
//!
//! ```json
//! {
//!   "fecha": "2004-02-17 00:00:00",
//!   "P42_Ramon_Huanuna": 3.2,
//!   "P43_Limboasi": 1.8,
//!   "P55_Diguchi": 4.0,
//!   "precip": 3.0,
//!   "year": 2004,
//!   "month": 2,
//!   "quarter": 1
//! }
//! ```

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

// =============================================================================
// CALENDAR
// =============================================================================

/// Short English month names, January first.
pub const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Quarter of the year (1-4) a month (1-12) belongs to.
#[must_use]
pub const fn quarter_of(month: u32) -> u32 {
    (month - 1) / 3 + 1
}

// =============================================================================
// STATIONS
// =============================================================================

/// Rain gauge stations contributing to the dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Station {
    #[serde(rename = "P42_Ramon_Huanuna")]
    RamonHuanuna,
    #[serde(rename = "P43_Limboasi")]
    Limboasi,
    #[serde(rename = "P55_Diguchi")]
    Diguchi,
}

impl Station {
    /// All stations, in dataset column order.
    pub const ALL: [Self; 3] = [Self::RamonHuanuna, Self::Limboasi, Self::Diguchi];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RamonHuanuna => "P42_Ramon_Huanuna",
            Self::Limboasi => "P43_Limboasi",
            Self::Diguchi => "P55_Diguchi",
        }
    }
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reading per station for a single day
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StationReadings {
    pub ramon_huanuna: f64,
    pub limboasi: f64,
    pub diguchi: f64,
}

impl StationReadings {
    pub fn new(ramon_huanuna: f64, limboasi: f64, diguchi: f64) -> Self {
        Self {
            ramon_huanuna,
            limboasi,
            diguchi,
        }
    }

    /// Reading for a given station
    #[must_use]
    pub fn get(&self, station: Station) -> f64 {
        match station {
            Station::RamonHuanuna => self.ramon_huanuna,
            Station::Limboasi => self.limboasi,
            Station::Diguchi => self.diguchi,
        }
    }

    /// `(station, reading)` pairs in [`Station::ALL`] order
    pub fn iter(&self) -> impl Iterator<Item = (Station, f64)> + '_ {
        Station::ALL.into_iter().map(move |s| (s, self.get(s)))
    }

    /// Station with the highest reading.
    ///
    /// Scans in [`Station::ALL`] order and lets a later station take over on
    /// equal readings, so ties go to the last station holding the maximum.
    #[must_use]
    pub fn wettest(&self) -> Station {
        self.iter()
            .reduce(|best, next| if best.1 > next.1 { best } else { next })
            .map_or(Station::Diguchi, |(station, _)| station)
    }
}

// =============================================================================
// RECORDS
// =============================================================================

/// Daily precipitation record.
///
/// Invariants, enforced by [`PrecipitationRecord::new`] and by
/// deserialization:
/// - all readings and `precip` are finite and non-negative
/// - `month` is 1-12, `quarter` is 1-4 and matches `month`
/// - the date's year and month match `year` and `month`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RecordWire", into = "RecordWire")]
pub struct PrecipitationRecord {
    raw_date: String,
    date: NaiveDate,
    readings: StationReadings,
    precip: f64,
    year: i32,
    month: u32,
    quarter: u32,
}

impl PrecipitationRecord {
    /// Build a record from externally supplied values, validating every invariant.
    ///
    /// `date` may carry a time-of-day suffix (`"2004-02-17 00:00:00"`); only
    /// the first whitespace-separated token is parsed.
    pub fn new(
        date: impl Into<String>,
        readings: StationReadings,
        precip: f64,
        year: i32,
        month: u32,
        quarter: u32,
    ) -> Result<Self> {
        let raw_date = date.into();
        let day = raw_date.split_whitespace().next().unwrap_or_default();
        let parsed = NaiveDate::parse_from_str(day, "%Y-%m-%d")
            .map_err(|_| DomainError::InvalidDate(raw_date.clone()))?;

        for (station, value) in readings.iter() {
            check_reading(station.as_str(), &raw_date, value)?;
        }
        check_reading("precip", &raw_date, precip)?;

        if !(1..=12).contains(&month) {
            return Err(DomainError::CalendarOutOfRange {
                date: raw_date,
                attribute: "month",
                value: i64::from(month),
            });
        }
        if !(1..=4).contains(&quarter) {
            return Err(DomainError::CalendarOutOfRange {
                date: raw_date,
                attribute: "quarter",
                value: i64::from(quarter),
            });
        }
        if quarter != quarter_of(month) {
            return Err(DomainError::InconsistentCalendar {
                detail: format!("quarter {quarter} does not contain month {month}"),
                date: raw_date,
            });
        }
        if parsed.year() != year || parsed.month() != month {
            return Err(DomainError::InconsistentCalendar {
                detail: format!("year/month {year}/{month} do not match the date"),
                date: raw_date,
            });
        }

        Ok(Self {
            raw_date,
            date: parsed,
            readings,
            precip,
            year,
            month,
            quarter,
        })
    }

    /// Build a record for a calendar day, deriving year, month and quarter from it.
    pub fn for_day(date: NaiveDate, readings: StationReadings, precip: f64) -> Result<Self> {
        Self::new(
            date.format("%Y-%m-%d").to_string(),
            readings,
            precip,
            date.year(),
            date.month(),
            quarter_of(date.month()),
        )
    }

    /// Date as supplied, including any time-of-day suffix
    pub fn raw_date(&self) -> &str {
        &self.raw_date
    }

    /// Calendar day of the record
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Date without the time-of-day suffix, e.g. `"2004-02-17"`
    pub fn day_label(&self) -> &str {
        self.raw_date.split_whitespace().next().unwrap_or_default()
    }

    pub fn readings(&self) -> &StationReadings {
        &self.readings
    }

    pub fn reading(&self, station: Station) -> f64 {
        self.readings.get(station)
    }

    /// Combined precipitation value for the day
    pub fn precip(&self) -> f64 {
        self.precip
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn quarter(&self) -> u32 {
        self.quarter
    }
}

fn check_reading(field: &str, date: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(DomainError::NonFiniteReading {
            field: field.to_string(),
            date: date.to_string(),
        });
    }
    if value < 0.0 {
        return Err(DomainError::NegativeReading {
            field: field.to_string(),
            date: date.to_string(),
            value,
        });
    }
    Ok(())
}

/// On-disk shape of a record, as produced by the dataset exporter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordWire {
    #[serde(rename = "fecha", alias = "date")]
    pub date: String,
    #[serde(rename = "P42_Ramon_Huanuna")]
    pub ramon_huanuna: f64,
    #[serde(rename = "P43_Limboasi")]
    pub limboasi: f64,
    #[serde(rename = "P55_Diguchi")]
    pub diguchi: f64,
    pub precip: f64,
    pub year: i32,
    pub month: u32,
    pub quarter: u32,
}

impl TryFrom<RecordWire> for PrecipitationRecord {
    type Error = DomainError;

    fn try_from(wire: RecordWire) -> Result<Self> {
        Self::new(
            wire.date,
            StationReadings::new(wire.ramon_huanuna, wire.limboasi, wire.diguchi),
            wire.precip,
            wire.year,
            wire.month,
            wire.quarter,
        )
    }
}

impl From<PrecipitationRecord> for RecordWire {
    fn from(record: PrecipitationRecord) -> Self {
        Self {
            date: record.raw_date,
            ramon_huanuna: record.readings.ramon_huanuna,
            limboasi: record.readings.limboasi,
            diguchi: record.readings.diguchi,
            precip: record.precip,
            year: record.year,
            month: record.month,
            quarter: record.quarter,
        }
    }
}

// =============================================================================
// QUERY/FILTER TYPES
// =============================================================================

/// Calendar filter applied to a record set before analysis
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFilter {
    /// Exact year
    pub year: Option<i32>,
    /// Exact month (1-12)
    pub month: Option<u32>,
    /// Inclusive lower year bound
    pub start_year: Option<i32>,
    /// Inclusive upper year bound
    pub end_year: Option<i32>,
}

impl RecordFilter {
    /// Reject filters that can never be meaningful
    pub fn validate(&self) -> Result<()> {
        if let Some(month) = self.month {
            if !(1..=12).contains(&month) {
                return Err(DomainError::InvalidFilter(format!(
                    "month must be between 1 and 12, got {month}"
                )));
            }
        }
        if let (Some(start), Some(end)) = (self.start_year, self.end_year) {
            if start > end {
                return Err(DomainError::InvalidFilter(format!(
                    "start_year {start} is after end_year {end}"
                )));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn matches(&self, record: &PrecipitationRecord) -> bool {
        self.year.is_none_or(|y| record.year() == y)
            && self.month.is_none_or(|m| record.month() == m)
            && self.start_year.is_none_or(|y| record.year() >= y)
            && self.end_year.is_none_or(|y| record.year() <= y)
    }

    /// Matching records, in input order
    pub fn apply(&self, records: &[PrecipitationRecord]) -> Vec<PrecipitationRecord> {
        records.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

// =============================================================================
// ERRORS
// =============================================================================

/// Domain-level errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    #[error("Invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Negative reading for {field} on {date}: {value}")]
    NegativeReading {
        field: String,
        date: String,
        value: f64,
    },

    #[error("Non-finite reading for {field} on {date}")]
    NonFiniteReading { field: String, date: String },

    #[error("Calendar attribute out of range on {date}: {attribute}={value}")]
    CalendarOutOfRange {
        date: String,
        attribute: &'static str,
        value: i64,
    },

    #[error("Inconsistent calendar attributes on {date}: {detail}")]
    InconsistentCalendar { date: String, detail: String },

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),
}

/// Result type for domain operations.
pub type Result<T> = std::result::Result<T, DomainError>;
