//! Synthetic dataset generation.

use std::f64::consts::PI;

use chrono::{Datelike, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Gamma, Normal};
use thiserror::Error;

use precip_domain::{quarter_of, DomainError, PrecipitationRecord, StationReadings};

/// Rain probability on an average day of the year
const BASE_RAIN_PROBABILITY: f64 = 0.35;

/// Swing of the rain probability between the wettest and driest month
const SEASONAL_AMPLITUDE: f64 = 0.25;

/// Gamma shape for daily rainfall; below 1 gives many light days and few heavy ones
const AMOUNT_SHAPE: f64 = 0.8;

/// Relative catch of each station, in `Station::ALL` order
const STATION_SCALES: [f64; 3] = [1.1, 0.9, 1.0];

/// Standard deviation of the per-station multiplicative noise
const STATION_NOISE: f64 = 0.25;

/// Generator errors
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Distribution error: {0}")]
    Distribution(String),

    #[error("Generated an invalid record: {0}")]
    Domain(#[from] DomainError),
}

/// Result type for generator operations.
pub type Result<T> = std::result::Result<T, GeneratorError>;

/// Dataset shape and randomness
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    /// First calendar year generated
    pub start_year: i32,
    /// Number of whole years generated
    pub years: u32,
    /// Scales the seasonal swing; 0 gives a flat year
    pub wet_season_boost: f64,
    /// Fixed seed for reproducible output
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            start_year: 1990,
            years: 30,
            wet_season_boost: 1.0,
            seed: None,
        }
    }
}

/// Seasonal weight in `[-1, 1]`: 1 in January (wet season peak), -1 in July.
fn seasonal_weight(month: u32) -> f64 {
    (2.0 * PI * f64::from(month - 1) / 12.0).cos()
}

fn round(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Daily dataset generator for the three-station network.
pub struct DatasetGenerator {
    config: GeneratorConfig,
    first_day: NaiveDate,
    last_year: i32,
    rng: StdRng,
    /// Rainfall amount distribution per month, January first
    amounts: Vec<Gamma<f64>>,
    noise: Normal<f64>,
}

impl DatasetGenerator {
    /// Create a generator, validating the configuration.
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        if config.years == 0 {
            return Err(GeneratorError::InvalidParameter(
                "years must be at least 1".to_string(),
            ));
        }
        if !config.wet_season_boost.is_finite() || config.wet_season_boost < 0.0 {
            return Err(GeneratorError::InvalidParameter(format!(
                "wet season boost must be a non-negative number, got {}",
                config.wet_season_boost
            )));
        }

        let last_year = i32::try_from(config.years - 1)
            .ok()
            .and_then(|span| config.start_year.checked_add(span))
            .filter(|&y| NaiveDate::from_ymd_opt(y, 12, 31).is_some())
            .ok_or_else(|| GeneratorError::InvalidParameter("year range out of bounds".to_string()))?;
        let first_day = NaiveDate::from_ymd_opt(config.start_year, 1, 1).ok_or_else(|| {
            GeneratorError::InvalidParameter(format!("invalid start year {}", config.start_year))
        })?;

        let amounts = (1..=12)
            .map(|month| {
                let scale = (4.0 + 3.0 * seasonal_weight(month) * config.wet_season_boost).max(1.0);
                Gamma::new(AMOUNT_SHAPE, scale)
                    .map_err(|e| GeneratorError::Distribution(e.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;
        let noise = Normal::new(0.0, STATION_NOISE)
            .map_err(|e| GeneratorError::Distribution(e.to_string()))?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            config,
            first_day,
            last_year,
            rng,
            amounts,
            noise,
        })
    }

    /// Probability that a day in `month` (1-12) has any rain
    #[must_use]
    pub fn rain_probability(&self, month: u32) -> f64 {
        (BASE_RAIN_PROBABILITY
            + SEASONAL_AMPLITUDE * self.config.wet_season_boost * seasonal_weight(month))
        .clamp(0.02, 0.95)
    }

    /// Generate one record per calendar day of the configured range.
    pub fn generate(&mut self) -> Result<Vec<PrecipitationRecord>> {
        let last_year = self.last_year;
        let records = self
            .first_day
            .iter_days()
            .take_while(|d| d.year() <= last_year)
            .map(|d| self.day(d))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            start_year = self.config.start_year,
            years = self.config.years,
            records = records.len(),
            "Dataset generated"
        );
        Ok(records)
    }

    fn day(&mut self, date: NaiveDate) -> Result<PrecipitationRecord> {
        let month = date.month();
        let probability = self.rain_probability(month);
        let mut readings = [0.0; 3];

        if self.rng.gen_bool(probability) {
            // Shared base amount keeps the stations correlated
            let base = self.amounts[(month - 1) as usize].sample(&mut self.rng);
            for (slot, scale) in readings.iter_mut().zip(STATION_SCALES) {
                let factor = 1.0 + self.noise.sample(&mut self.rng);
                *slot = round((base * scale * factor).max(0.0), 1);
            }
        }

        let precip = round(readings.iter().sum::<f64>() / 3.0, 2);
        let record = PrecipitationRecord::new(
            format!("{} 00:00:00", date.format("%Y-%m-%d")),
            StationReadings::new(readings[0], readings[1], readings[2]),
            precip,
            date.year(),
            month,
            quarter_of(month),
        )?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(start_year: i32, years: u32, seed: u64) -> DatasetGenerator {
        DatasetGenerator::new(GeneratorConfig {
            start_year,
            years,
            seed: Some(seed),
            ..GeneratorConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_one_record_per_day() {
        let records = seeded(2000, 2, 7).generate().unwrap();
        assert_eq!(records.len(), 366 + 365);
        assert_eq!(records[0].raw_date(), "2000-01-01 00:00:00");
        assert_eq!(records[records.len() - 1].day_label(), "2001-12-31");
    }

    #[test]
    fn test_seed_is_reproducible() {
        let a = seeded(1995, 3, 42).generate().unwrap();
        let b = seeded(1995, 3, 42).generate().unwrap();
        assert_eq!(a, b);

        let c = seeded(1995, 3, 43).generate().unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_precip_is_rounded_station_mean() {
        for record in seeded(2010, 1, 3).generate().unwrap() {
            let r = record.readings();
            let expected = round((r.ramon_huanuna + r.limboasi + r.diguchi) / 3.0, 2);
            assert_eq!(record.precip(), expected);
        }
    }

    #[test]
    fn test_wet_season_is_wetter() {
        let records = seeded(1990, 20, 11).generate().unwrap();
        let month_mean = |m: u32| {
            let values: Vec<f64> = records
                .iter()
                .filter(|r| r.month() == m)
                .map(PrecipitationRecord::precip)
                .collect();
            values.iter().sum::<f64>() / values.len() as f64
        };
        assert!(month_mean(1) > month_mean(7) * 2.0);
    }

    #[test]
    fn test_rain_probability_curve() {
        let generator = seeded(2000, 1, 1);
        assert!(generator.rain_probability(1) > generator.rain_probability(4));
        assert!(generator.rain_probability(4) > generator.rain_probability(7));

        let flat = DatasetGenerator::new(GeneratorConfig {
            wet_season_boost: 0.0,
            ..GeneratorConfig::default()
        })
        .unwrap();
        assert_eq!(flat.rain_probability(1), flat.rain_probability(7));
    }

    #[test]
    fn test_invalid_config() {
        let zero_years = GeneratorConfig {
            years: 0,
            ..GeneratorConfig::default()
        };
        assert!(matches!(
            DatasetGenerator::new(zero_years),
            Err(GeneratorError::InvalidParameter(_))
        ));

        let negative_boost = GeneratorConfig {
            wet_season_boost: -1.0,
            ..GeneratorConfig::default()
        };
        assert!(DatasetGenerator::new(negative_boost).is_err());
    }

    #[test]
    fn test_output_loads_as_dataset() {
        let records = seeded(2000, 1, 5).generate().unwrap();
        let json = serde_json::to_string(&records).unwrap();
        assert!(json.contains("\"fecha\":\"2000-01-01 00:00:00\""));

        let back: Vec<PrecipitationRecord> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, records);
    }
}
