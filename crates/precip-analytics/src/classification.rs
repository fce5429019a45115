//! Qualitative labels for wetness and trend direction.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::AnalysisConfig;

/// Wetness of a period relative to a reference level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WetnessClass {
    #[serde(rename = "Very Wet")]
    VeryWet,
    Wet,
    Normal,
    Dry,
    #[serde(rename = "Very Dry")]
    VeryDry,
}

impl WetnessClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VeryWet => "Very Wet",
            Self::Wet => "Wet",
            Self::Normal => "Normal",
            Self::Dry => "Dry",
            Self::VeryDry => "Very Dry",
        }
    }

    /// "Wet" or "Very Wet"
    pub fn is_wet(&self) -> bool {
        matches!(self, Self::VeryWet | Self::Wet)
    }

    /// "Dry" or "Very Dry"
    pub fn is_dry(&self) -> bool {
        matches!(self, Self::VeryDry | Self::Dry)
    }

    /// Classify a period mean against the overall mean, first match wins:
    /// very wet, wet, very dry, dry, normal. All comparisons are strict.
    #[must_use]
    pub fn from_ratio(mean: f64, overall_mean: f64, config: &AnalysisConfig) -> Self {
        if mean > overall_mean * config.very_wet_ratio {
            Self::VeryWet
        } else if mean > overall_mean * config.wet_ratio {
            Self::Wet
        } else if mean < overall_mean * config.very_dry_ratio {
            Self::VeryDry
        } else if mean < overall_mean * config.dry_ratio {
            Self::Dry
        } else {
            Self::Normal
        }
    }

    /// Classify a signed deviation against standard-deviation bands
    #[must_use]
    pub fn from_anomaly(deviation: f64, std_dev: f64, config: &AnalysisConfig) -> Self {
        let strong = std_dev * config.strong_anomaly_sigma;
        let mild = std_dev * config.mild_anomaly_sigma;
        if deviation > strong {
            Self::VeryWet
        } else if deviation > mild {
            Self::Wet
        } else if deviation < -strong {
            Self::VeryDry
        } else if deviation < -mild {
            Self::Dry
        } else {
            Self::Normal
        }
    }
}

impl fmt::Display for WetnessClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction and strength of a fitted trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrendClass {
    Stable,
    #[serde(rename = "Strong Increase")]
    StrongIncrease,
    #[serde(rename = "Mild Increase")]
    MildIncrease,
    #[serde(rename = "Strong Decrease")]
    StrongDecrease,
    #[serde(rename = "Mild Decrease")]
    MildDecrease,
}

impl TrendClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stable => "Stable",
            Self::StrongIncrease => "Strong Increase",
            Self::MildIncrease => "Mild Increase",
            Self::StrongDecrease => "Strong Decrease",
            Self::MildDecrease => "Mild Decrease",
        }
    }

    /// Label a regression slope. Checked in order, first match wins.
    #[must_use]
    pub fn from_slope(slope: f64, config: &AnalysisConfig) -> Self {
        if slope.abs() < config.stable_slope {
            Self::Stable
        } else if slope > config.strong_slope {
            Self::StrongIncrease
        } else if slope > 0.0 {
            Self::MildIncrease
        } else if slope < -config.strong_slope {
            Self::StrongDecrease
        } else {
            Self::MildDecrease
        }
    }
}

impl fmt::Display for TrendClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_boundaries_are_exclusive() {
        let config = AnalysisConfig::default();
        assert_eq!(WetnessClass::from_ratio(1.5, 1.0, &config), WetnessClass::Wet);
        assert_eq!(WetnessClass::from_ratio(1.51, 1.0, &config), WetnessClass::VeryWet);
        assert_eq!(WetnessClass::from_ratio(1.2, 1.0, &config), WetnessClass::Normal);
        assert_eq!(WetnessClass::from_ratio(0.5, 1.0, &config), WetnessClass::Dry);
        assert_eq!(WetnessClass::from_ratio(0.49, 1.0, &config), WetnessClass::VeryDry);
        assert_eq!(WetnessClass::from_ratio(0.8, 1.0, &config), WetnessClass::Normal);
    }

    #[test]
    fn test_zero_reference_is_normal() {
        let config = AnalysisConfig::default();
        assert_eq!(WetnessClass::from_ratio(0.0, 0.0, &config), WetnessClass::Normal);
    }

    #[test]
    fn test_anomaly_bands() {
        let config = AnalysisConfig::default();
        assert_eq!(WetnessClass::from_anomaly(2.0, 1.0, &config), WetnessClass::VeryWet);
        assert_eq!(WetnessClass::from_anomaly(1.5, 1.0, &config), WetnessClass::Wet);
        assert_eq!(WetnessClass::from_anomaly(0.5, 1.0, &config), WetnessClass::Normal);
        assert_eq!(WetnessClass::from_anomaly(-0.6, 1.0, &config), WetnessClass::Dry);
        assert_eq!(WetnessClass::from_anomaly(-1.6, 1.0, &config), WetnessClass::VeryDry);
    }

    #[test]
    fn test_trend_labels() {
        let config = AnalysisConfig::default();
        assert_eq!(TrendClass::from_slope(0.005, &config), TrendClass::Stable);
        assert_eq!(TrendClass::from_slope(-0.009, &config), TrendClass::Stable);
        assert_eq!(TrendClass::from_slope(0.06, &config), TrendClass::StrongIncrease);
        assert_eq!(TrendClass::from_slope(0.05, &config), TrendClass::MildIncrease);
        assert_eq!(TrendClass::from_slope(-0.5, &config), TrendClass::StrongDecrease);
        assert_eq!(TrendClass::from_slope(-0.03, &config), TrendClass::MildDecrease);
    }

    #[test]
    fn test_labels_serialize_with_spaces() {
        assert_eq!(
            serde_json::to_string(&WetnessClass::VeryWet).unwrap(),
            "\"Very Wet\""
        );
        assert_eq!(
            serde_json::to_string(&TrendClass::StrongDecrease).unwrap(),
            "\"Strong Decrease\""
        );
        assert!(WetnessClass::VeryDry.is_dry());
        assert!(!WetnessClass::Normal.is_wet());
    }
}
