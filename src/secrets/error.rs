//! Error types for secret resolution.
//!
//! Denial messages are stable: operators grep for them and the orchestrator
//! shows them verbatim. None of them echo the path, key or value.

use std::fmt;
use thiserror::Error;

/// Result type for secret resolution.
pub type Result<T> = std::result::Result<T, SecretsError>;

/// Policy category that rejected a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    Event,
    Repository,
    Branch,
    Fork,
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            DenialReason::Event => "event does not match",
            DenialReason::Repository => "repository does not match",
            DenialReason::Branch => "branch does not match",
            DenialReason::Fork => "forks are not allowed",
        };
        f.write_str(message)
    }
}

/// Errors that can occur while resolving a secret.
#[derive(Error, Debug)]
pub enum SecretsError {
    /// Record absent or empty.
    #[error("secret not found")]
    NotFound,

    /// Requested key absent in the record.
    #[error("secret key not found")]
    KeyNotFound,

    /// A reserved policy key rejected the request.
    #[error("access denied: {reason}")]
    AccessDenied { reason: DenialReason },

    /// Transport or protocol failure talking to Vault.
    #[error("Backend error: {message}")]
    Upstream { message: String },

    /// Serialization of the wildcard record failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SecretsError {
    /// Create an access denied error.
    pub fn access_denied(reason: DenialReason) -> Self {
        Self::AccessDenied { reason }
    }

    /// Create an upstream error.
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream { message: message.into() }
    }

    /// Expected outcomes that are returned to the caller verbatim.
    pub fn is_denial(&self) -> bool {
        matches!(self, Self::NotFound | Self::KeyNotFound | Self::AccessDenied { .. })
    }
}
