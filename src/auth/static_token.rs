//! Token supplied by the operator, kept alive with renew-self.

use std::time::Duration;

use super::client::VaultAuthClient;
use super::credential::Credential;
use super::error::{AuthError, Result};

#[derive(Debug, Clone)]
pub struct StaticTokenSource {
    client: VaultAuthClient,
    fail_on_error: bool,
}

impl StaticTokenSource {
    pub const NAME: &'static str = "token";

    /// `fail_on_error` stops the renewal loop on the first failed renewal
    /// instead of retrying on the next tick.
    pub fn new(client: VaultAuthClient, fail_on_error: bool) -> Self {
        Self { client, fail_on_error }
    }

    pub fn fail_on_error(&self) -> bool {
        self.fail_on_error
    }

    pub async fn renew(&self, increment: Duration) -> Result<Credential> {
        self.client.renew_self(increment).await
    }

    /// A static token cannot be re-issued.
    pub async fn acquire(&self) -> Result<Credential> {
        Err(AuthError::unsupported(Self::NAME, "login"))
    }
}
