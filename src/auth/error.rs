//! Errors raised while obtaining or renewing a Vault credential.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AuthError>;

#[derive(Error, Debug)]
pub enum AuthError {
    /// The service-account token could not be read.
    #[error("cannot read identity token {path}: {source}")]
    IdentityToken {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Transport failure or Vault error response.
    #[error("Vault request failed: {0}")]
    Request(String),

    /// Vault answered, but without a usable credential.
    #[error("Unexpected Vault response: {0}")]
    Protocol(String),

    /// The strategy has no such operation.
    #[error("{strategy} authentication does not support {operation}")]
    Unsupported { strategy: &'static str, operation: &'static str },

    /// Client settings could not be built.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AuthError {
    pub fn request<S: Into<String>>(message: S) -> Self {
        Self::Request(message.into())
    }

    pub fn protocol<S: Into<String>>(message: S) -> Self {
        Self::Protocol(message.into())
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    pub fn unsupported(strategy: &'static str, operation: &'static str) -> Self {
        Self::Unsupported { strategy, operation }
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }
}
