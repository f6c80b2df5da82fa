//! Seam between secret resolution and the storage backend.

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::error::Result;

/// Raw secret payload as returned by the backend.
pub type RawSecret = Map<String, Value>;

/// A source of raw secret records.
///
/// Implementations resolve engine-specific path layouts and unwrap any
/// versioned envelope, so callers see the record's own fields.
#[async_trait]
pub trait SecretStore: Send + Sync + std::fmt::Debug {
    /// Fetch the record stored at `path`.
    ///
    /// `Ok(None)` means the record does not exist. Transport and protocol
    /// failures are reported as [`super::SecretsError::Upstream`].
    async fn fetch(&self, path: &str) -> Result<Option<RawSecret>>;
}
