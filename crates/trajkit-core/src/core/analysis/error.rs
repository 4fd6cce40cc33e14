use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FesError {
    #[error("No samples to histogram")]
    EmptyData,

    #[error("Expected {expected} values, found {found}")]
    LengthMismatch { expected: usize, found: usize },

    #[error("Number of bins must be at least 1")]
    ZeroBins,

    #[error("Invalid histogram range [{min}, {max}]")]
    InvalidRange { min: f64, max: f64 },

    #[error("No sample falls inside the histogram range")]
    NoPopulatedBins,

    #[error("Temperature must be positive and finite, got {0}")]
    InvalidTemperature(f64),

    #[error("Unknown energy unit '{0}'. Expected one of: kb, kJ, kcal")]
    UnknownUnit(String),

    #[error("Unknown zero level '{0}'. Expected 'min', 'max' or a number")]
    InvalidZeroLevel(String),
}
