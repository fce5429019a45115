//! Analytics error types.

use thiserror::Error;

/// Analytics errors.
///
/// Every analysis either returns a complete result or exactly one of these;
/// undefined statistics never leak out as `NaN` or infinity.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    /// A value set required by the analysis is empty
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// Too few year groups to fit a regression line
    #[error("Insufficient data: need at least {required} distinct years, found {found}")]
    InsufficientData {
        /// Distinct years present in the input
        found: usize,
        /// Distinct years the analysis needs
        required: usize,
    },

    /// Zero variance leaves a statistic undefined
    #[error("Degenerate distribution: {0}")]
    DegenerateDistribution(String),

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Result serialization error
    #[error("Data conversion error: {0}")]
    Conversion(String),
}

impl AnalyticsError {
    /// Stable machine-readable code for transport layers
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyInput(_) => "EMPTY_INPUT",
            Self::InsufficientData { .. } => "INSUFFICIENT_DATA",
            Self::DegenerateDistribution(_) => "DEGENERATE_DISTRIBUTION",
            Self::InvalidParameter(_) => "INVALID_PARAMETER",
            Self::Conversion(_) => "CONVERSION_ERROR",
        }
    }
}

/// Result type for analytics operations.
pub type Result<T> = std::result::Result<T, AnalyticsError>;
