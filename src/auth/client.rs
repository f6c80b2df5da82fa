//! Vault auth-method calls, made with `vaultrs`.

use std::path::PathBuf;
use std::time::Duration;

use tracing::debug;
use vaultrs::api::AuthInfo;
use vaultrs::client::{VaultClient, VaultClientSettingsBuilder};

use super::credential::{Credential, CredentialCell};
use super::error::{AuthError, Result};
use crate::config::{ca_certificate_files, VaultConfig};
use crate::secrets::SecretString;

/// Issues login and renew-self calls against Vault.
///
/// A `vaultrs` client carries a fixed token, so one is built per call from
/// the credential current at that moment.
#[derive(Debug, Clone)]
pub struct VaultAuthClient {
    address: String,
    namespace: Option<String>,
    verify: bool,
    ca_cert: Option<PathBuf>,
    ca_path: Option<PathBuf>,
    timeout: Duration,
    credential: CredentialCell,
}

impl VaultAuthClient {
    pub fn new(config: &VaultConfig, credential: CredentialCell) -> Self {
        Self {
            address: config.address.clone(),
            namespace: config.namespace.clone(),
            verify: !config.skip_verify,
            ca_cert: config.ca_cert.clone(),
            ca_path: config.ca_path.clone(),
            timeout: config.timeout,
            credential,
        }
    }

    pub fn credential(&self) -> &CredentialCell {
        &self.credential
    }

    fn client(&self, token: Option<&SecretString>) -> Result<VaultClient> {
        let mut settings_builder = VaultClientSettingsBuilder::default();
        settings_builder.address(&self.address);
        settings_builder.verify(self.verify);
        settings_builder.timeout(Some(self.timeout));
        settings_builder.ca_certs(self.ca_certs()?);

        if let Some(token) = token {
            settings_builder.token(token.expose_secret());
        }

        if let Some(namespace) = &self.namespace {
            settings_builder.namespace(Some(namespace.clone()));
        }

        let settings = settings_builder
            .build()
            .map_err(|e| AuthError::config(format!("Invalid Vault configuration: {}", e)))?;

        VaultClient::new(settings)
            .map_err(|e| AuthError::request(format!("Failed to create Vault client: {}", e)))
    }

    /// Same trust roots as the logical-read client.
    fn ca_certs(&self) -> Result<Vec<String>> {
        let files = ca_certificate_files(self.ca_cert.as_deref(), self.ca_path.as_deref())
            .map_err(|e| AuthError::config(e.to_string()))?;
        Ok(files.into_iter().map(|path| path.to_string_lossy().into_owned()).collect())
    }

    /// Renew the current token, asking for `increment` more lifetime.
    pub async fn renew_self(&self, increment: Duration) -> Result<Credential> {
        let token = self
            .credential
            .token()
            .ok_or_else(|| AuthError::protocol("no token to renew"))?;
        let client = self.client(Some(&token))?;
        let increment = format!("{}s", increment.as_secs());

        debug!(increment = %increment, "renewing Vault token");
        let auth = vaultrs::token::renew_self(&client, Some(&increment))
            .await
            .map_err(|e| AuthError::request(e.to_string()))?;

        credential_from_auth(auth)
    }

    pub async fn login_kubernetes(&self, mount: &str, role: &str, jwt: &str) -> Result<Credential> {
        let client = self.client(None)?;

        debug!(mount = %mount, role = %role, "logging in with kubernetes auth");
        let auth = vaultrs::auth::kubernetes::login(&client, mount, role, jwt)
            .await
            .map_err(|e| AuthError::request(e.to_string()))?;

        credential_from_auth(auth)
    }

    pub async fn login_approle(
        &self,
        mount: &str,
        role_id: &str,
        secret_id: &SecretString,
    ) -> Result<Credential> {
        let client = self.client(None)?;

        debug!(mount = %mount, "logging in with approle auth");
        let auth = vaultrs::auth::approle::login(&client, mount, role_id, secret_id.expose_secret())
            .await
            .map_err(|e| AuthError::request(e.to_string()))?;

        credential_from_auth(auth)
    }
}

fn credential_from_auth(auth: AuthInfo) -> Result<Credential> {
    if auth.client_token.is_empty() {
        return Err(AuthError::protocol("expected a client token"));
    }
    Ok(Credential::new(auth.client_token, Duration::from_secs(auth.lease_duration)))
}
