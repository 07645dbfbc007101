//! Error types for draft relay operations

use std::time::Duration;
use thiserror::Error;

/// Outcome of a failed call to the remote invitation backend.
///
/// `save_draft` surfaces these to its caller unchanged. Loads collapse every
/// variant into an absent draft.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SaveError {
    /// No response arrived within the bound. The remote outcome is unknown:
    /// the request may still have been applied.
    #[error("Backend did not respond within {after:?}")]
    Timeout { after: Duration },

    #[error("Backend rejected the draft: {message}")]
    Rejected { message: String },

    #[error("Network failure talking to backend: {reason}")]
    Network { reason: String },
}

impl SaveError {
    /// Create a Rejected error, substituting a generic message when the
    /// backend sent none.
    pub fn rejected(message: Option<String>) -> Self {
        Self::Rejected {
            message: message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| "Backend did not accept the draft".to_string()),
        }
    }

    /// Create a Network error.
    pub fn network(reason: impl Into<String>) -> Self {
        Self::Network {
            reason: reason.into(),
        }
    }

    /// Returns true if the caller cannot tell whether the save happened.
    pub fn is_outcome_unknown(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Validation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing configuration file path (use --config or INVITRA_CONFIG)")]
    MissingConfigPath,

    #[error("Failed to read config file {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("Failed to parse config TOML: {reason}")]
    Parse { reason: String },

    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Result type alias for save operations.
pub type SaveResult<T> = Result<T, SaveError>;

// =============================================================================
// TESTS
// =============================================================================
