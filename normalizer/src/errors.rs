use thiserror::Error;

/// Result type alias for normalizer operations
pub type Result<T, E = NormalizationError> = std::result::Result<T, E>;

/// Errors that fail a single hit. Never shared across records.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizationError {
    #[error("Missing required field: {key}")]
    MissingRequiredField { key: &'static str },

    #[error("Cannot convert {key}={value:?} to {expected}")]
    ValueConversion {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
}

impl NormalizationError {
    /// Short, stable tag suitable for metric labels
    pub fn reason(&self) -> &'static str {
        match self {
            NormalizationError::MissingRequiredField { .. } => "missing_field",
            NormalizationError::ValueConversion { .. } => "value_conversion",
        }
    }
}

/// Errors raised by a user agent parser backend.
///
/// These never leave the normalizer: the adapter in `user_agent` turns every
/// one of them into absent device fields.
#[derive(Error, Debug)]
pub enum UserAgentError {
    #[error("Failed to load user agent regexes: {0}")]
    LoadError(String),

    #[error("User agent not recognized")]
    Unrecognized,

    #[error("User agent parser unavailable")]
    Unavailable,
}
