//! # Error Types
//!
//! Structured error types for spt_core.
//!
//! Normative noncompliance is never an error here: a sounding that violates
//! NBR 6484:2020 produces a [`ComplianceResult`](crate::validation::ComplianceResult)
//! full of messages. `SptError` is reserved for broken contracts (zero-width
//! footing, missing report records, illegal status changes) and for I/O.
//!
//! ## Example
//!
//! ```rust
//! use spt_core::errors::{SptError, SptResult};
//!
//! fn check_width(base_width_m: f64) -> SptResult<()> {
//!     if base_width_m <= 0.0 {
//!         return Err(SptError::invalid_input(
//!             "base_width_m",
//!             base_width_m.to_string(),
//!             "Base width must be positive",
//!         ));
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for spt_core operations
pub type SptResult<T> = Result<T, SptError>;

/// Structured error type for spt_core operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum SptError {
    /// An input value is outside the domain of a formula
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A required record or field is missing
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// Sounding lifecycle transition not allowed
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Bundle schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },

    /// Configuration could not be loaded or extracted
    #[error("Configuration error: {reason}")]
    Config { reason: String },

    /// Report rendering failed
    #[error("Render error: {reason}")]
    Render { reason: String },
}

impl SptError {
    /// Create an InvalidInput error
    pub fn invalid_input(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        SptError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        SptError::MissingField {
            field: field.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(
        operation: impl Into<String>,
        path: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        SptError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a Render error
    pub fn render(reason: impl Into<String>) -> Self {
        SptError::Render {
            reason: reason.into(),
        }
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            SptError::InvalidInput { .. } => "INVALID_INPUT",
            SptError::MissingField { .. } => "MISSING_FIELD",
            SptError::InvalidTransition { .. } => "INVALID_TRANSITION",
            SptError::FileError { .. } => "FILE_ERROR",
            SptError::SerializationError { .. } => "SERIALIZATION_ERROR",
            SptError::VersionMismatch { .. } => "VERSION_MISMATCH",
            SptError::Config { .. } => "CONFIG_ERROR",
            SptError::Render { .. } => "RENDER_ERROR",
        }
    }
}

impl From<serde_json::Error> for SptError {
    fn from(e: serde_json::Error) -> Self {
        SptError::SerializationError {
            reason: e.to_string(),
        }
    }
}

impl From<figment::Error> for SptError {
    fn from(e: figment::Error) -> Self {
        SptError::Config {
            reason: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = SptError::invalid_input("base_width_m", "0", "Base width must be positive");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"type\":\"InvalidInput\""));
        let roundtrip: SptError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(SptError::missing_field("responsible").error_code(), "MISSING_FIELD");
        assert_eq!(
            SptError::InvalidTransition {
                from: "approved".into(),
                to: "draft".into()
            }
            .error_code(),
            "INVALID_TRANSITION"
        );
    }

    #[test]
    fn test_json_error_conversion() {
        let err: SptError = serde_json::from_str::<u32>("not a number").unwrap_err().into();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
    }
}
