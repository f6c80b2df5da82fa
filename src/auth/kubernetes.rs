//! Kubernetes service-account login.
//!
//! Tokens issued this way are not renewed; a fresh login is performed on
//! every cycle with the JWT mounted into the pod.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::client::VaultAuthClient;
use super::credential::Credential;
use super::error::{AuthError, Result};

pub const DEFAULT_MOUNT: &str = "kubernetes";
pub const DEFAULT_TOKEN_PATH: &str = "/var/run/secrets/kubernetes.io/serviceaccount/token";

#[derive(Debug, Clone)]
pub struct KubernetesTokenSource {
    client: VaultAuthClient,
    role: String,
    mount: String,
    token_path: PathBuf,
}

impl KubernetesTokenSource {
    pub const NAME: &'static str = "kubernetes";

    pub fn new(
        client: VaultAuthClient,
        role: impl Into<String>,
        mount: impl Into<String>,
        token_path: impl Into<PathBuf>,
    ) -> Self {
        Self { client, role: role.into(), mount: mount.into(), token_path: token_path.into() }
    }

    pub fn token_path(&self) -> &Path {
        &self.token_path
    }

    pub async fn renew(&self) -> Result<Credential> {
        Err(AuthError::unsupported(Self::NAME, "renewal"))
    }

    pub async fn acquire(&self) -> Result<Credential> {
        let jwt = tokio::fs::read_to_string(&self.token_path).await.map_err(|source| {
            AuthError::IdentityToken { path: self.token_path.clone(), source }
        })?;

        debug!(path = %self.token_path.display(), "read service account token");
        self.client.login_kubernetes(&self.mount, &self.role, jwt.trim_end()).await
    }
}
