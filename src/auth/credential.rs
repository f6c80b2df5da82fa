//! The Vault credential and the cell that shares it.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::secrets::SecretString;

/// A Vault token and the lease Vault granted for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    token: SecretString,
    ttl: Duration,
}

impl Credential {
    pub fn new(token: impl Into<SecretString>, ttl: Duration) -> Self {
        Self { token: token.into(), ttl }
    }

    pub fn token(&self) -> &SecretString {
        &self.token
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

/// Authentication state observed through the credential cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenewalState {
    Unauthenticated,
    Authenticated { ttl: Duration },
}

/// Shared, swappable credential.
///
/// The renewer writes, the storage client reads. Readers get a snapshot and
/// never observe a partially replaced credential.
#[derive(Debug, Clone, Default)]
pub struct CredentialCell {
    inner: Arc<RwLock<Option<Credential>>>,
}

impl CredentialCell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(credential: Credential) -> Self {
        let cell = Self::new();
        cell.install(credential);
        cell
    }

    /// Snapshot of the current credential.
    pub fn current(&self) -> Option<Credential> {
        self.inner.read().ok()?.clone()
    }

    pub fn token(&self) -> Option<SecretString> {
        self.current().map(|c| c.token)
    }

    /// Replace the credential. Empty tokens are ignored.
    pub fn install(&self, credential: Credential) {
        if credential.token.is_empty() {
            return;
        }
        if let Ok(mut slot) = self.inner.write() {
            *slot = Some(credential);
        }
    }

    pub fn state(&self) -> RenewalState {
        match self.current() {
            Some(credential) => RenewalState::Authenticated { ttl: credential.ttl },
            None => RenewalState::Unauthenticated,
        }
    }
}
