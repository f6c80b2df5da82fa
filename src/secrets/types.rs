//! Request and response types for secret resolution, plus the redacting
//! [`SecretString`] wrapper used for every sensitive value.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Name used when a request does not specify which key to read.
pub const DEFAULT_SECRET_NAME: &str = "value";

/// Name that selects the entire record, serialized as a JSON object.
pub const WILDCARD_SECRET_NAME: &str = "*";

/// A secret lookup issued by the CI orchestrator.
///
/// Mirrors the orchestrator's plugin payload. Unknown fields are ignored and
/// missing fields default to empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretRequest {
    /// Storage path of the record (e.g. `secret/docker`)
    #[serde(default)]
    pub path: String,

    /// Key to read from the record; empty means [`DEFAULT_SECRET_NAME`]
    #[serde(default)]
    pub name: String,

    /// Repository that owns the pipeline
    #[serde(default)]
    pub repo: RepoContext,

    /// Build that triggered the request
    #[serde(default)]
    pub build: BuildContext,
}

/// Read-only repository context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoContext {
    /// Repository slug, `owner/name`
    #[serde(default)]
    pub slug: String,
}

/// Read-only build context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildContext {
    /// Triggering event (`push`, `pull_request`, `tag`, ...)
    #[serde(default)]
    pub event: String,

    /// Git reference (`refs/heads/master`)
    #[serde(default, rename = "ref")]
    pub git_ref: String,

    /// Target branch
    #[serde(default)]
    pub target: String,

    /// Slug of the repository the build originates from, empty for branch builds
    #[serde(default)]
    pub fork: String,
}

impl SecretRequest {
    /// Effective key name, applying the `value` default.
    pub fn requested_name(&self) -> &str {
        if self.name.is_empty() {
            DEFAULT_SECRET_NAME
        } else {
            &self.name
        }
    }

    /// A build comes from a fork when its source slug is set and differs
    /// from the owning repository.
    pub fn is_fork(&self) -> bool {
        !self.build.fork.is_empty() && self.build.fork != self.repo.slug
    }

    /// Source repository of a fork build.
    pub fn fork_repo(&self) -> Option<&str> {
        self.is_fork().then_some(self.build.fork.as_str())
    }
}

/// A secret that passed every policy check.
///
/// `pull` and `fork` are always `true`: pull request and fork builds are
/// filtered by the reserved policy keys before this value is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSecret {
    pub name: String,
    pub data: SecretString,
    pub pull: bool,
    pub fork: bool,
}

impl ResolvedSecret {
    pub fn new(name: impl Into<String>, data: impl Into<SecretString>) -> Self {
        Self { name: name.into(), data: data.into(), pull: true, fork: true }
    }
}

/// A string wrapper that redacts its contents in Debug, Display, and serialization.
///
/// Memory is zeroed on drop. The value is only reachable through
/// [`SecretString::expose_secret`].
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretString(String);

impl SecretString {
    /// Creates a new SecretString from a string value.
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Exposes the underlying secret value. Never log the result.
    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    /// Returns the length of the secret without exposing the value.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the secret is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for SecretString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str("[REDACTED]")
    }
}

impl<'de> Deserialize<'de> for SecretString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(SecretString(value))
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretString([REDACTED])")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl PartialEq for SecretString {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for SecretString {}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl Default for SecretString {
    fn default() -> Self {
        Self::new("")
    }
}
