//! AppRole login with renew-self between logins.

use std::time::Duration;

use super::client::VaultAuthClient;
use super::credential::Credential;
use super::error::Result;
use crate::secrets::SecretString;

pub const DEFAULT_MOUNT: &str = "approle";

#[derive(Debug, Clone)]
pub struct AppRoleTokenSource {
    client: VaultAuthClient,
    mount: String,
    role_id: String,
    secret_id: SecretString,
}

impl AppRoleTokenSource {
    pub const NAME: &'static str = "approle";

    pub fn new(
        client: VaultAuthClient,
        mount: impl Into<String>,
        role_id: impl Into<String>,
        secret_id: SecretString,
    ) -> Self {
        Self { client, mount: mount.into(), role_id: role_id.into(), secret_id }
    }

    pub async fn renew(&self, increment: Duration) -> Result<Credential> {
        self.client.renew_self(increment).await
    }

    pub async fn acquire(&self) -> Result<Credential> {
        self.client.login_approle(&self.mount, &self.role_id, &self.secret_id).await
    }
}
