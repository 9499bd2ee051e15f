//! Validation errors for app ids and user settings.

use thiserror::Error;

/// Why a value from the environment or the settings file was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Host id is not present in the settings
    #[error("Host not found: {host_id}")]
    HostNotFound { host_id: String },

    /// Field present but unusable
    #[error("Invalid {field}: {value} (expected {expected})")]
    InvalidFieldValue {
        field: String,
        value: String,
        expected: String,
    },

    /// Field could not be parsed at all
    #[error("Failed to parse {field}: {reason}")]
    ParseError { field: String, reason: String },
}

/// Result of a validation.
pub type DomainResult<T> = Result<T, DomainError>;
