//! # Error Handling
//!
//! Process-level error type for the plugin. Request-scoped outcomes live in
//! [`crate::secrets::SecretsError`] and credential failures in
//! [`crate::auth::AuthError`]; both fold into [`Error`] when they abort the process.

use crate::auth::AuthError;

/// Custom result type for plugin operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the plugin process
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network transport errors (listener, upstream HTTP client)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Vault authentication errors
    #[error("Vault authentication error: {0}")]
    Auth(#[from] AuthError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create a new transport error
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport(message.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Config(errors.to_string())
    }
}
