//! Logical-read client for Vault.
//!
//! Reads use the token currently held by the shared [`CredentialCell`], so a
//! credential swapped in by the renewer is picked up by the next request
//! without rebuilding the client.

use async_trait::async_trait;
use reqwest::{Certificate, Client, RequestBuilder, StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::mounts::{self, ResolvedPath, MOUNTS_ENDPOINT};
use crate::auth::CredentialCell;
use crate::config::VaultConfig;
use crate::errors::{Error, Result};
use crate::secrets::{self, RawSecret, SecretStore, SecretsError};

const TOKEN_HEADER: &str = "X-Vault-Token";
const NAMESPACE_HEADER: &str = "X-Vault-Namespace";

#[derive(Debug, Deserialize)]
struct LogicalResponse {
    #[serde(default)]
    data: Option<RawSecret>,
}

/// Vault-backed [`SecretStore`].
#[derive(Debug, Clone)]
pub struct VaultStore {
    http: Client,
    base: Url,
    namespace: Option<String>,
    credential: CredentialCell,
}

impl VaultStore {
    pub fn new(config: &VaultConfig, credential: CredentialCell) -> Result<Self> {
        let base = Url::parse(config.address.trim_end_matches('/'))
            .map_err(|e| Error::config(format!("Invalid Vault address '{}': {}", config.address, e)))?;
        if base.cannot_be_a_base() {
            return Err(Error::config(format!("Invalid Vault address '{}'", config.address)));
        }

        let mut builder = Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.skip_verify);

        for path in config.ca_certificates()? {
            let pem = std::fs::read(&path).map_err(|e| {
                Error::config(format!("Cannot read CA certificate {}: {}", path.display(), e))
            })?;
            let certificate = Certificate::from_pem(&pem).map_err(|e| {
                Error::config(format!("Invalid CA certificate {}: {}", path.display(), e))
            })?;
            builder = builder.add_root_certificate(certificate);
        }

        let http = builder
            .build()
            .map_err(|e| Error::transport(format!("Failed to create Vault HTTP client: {}", e)))?;

        Ok(Self { http, base, namespace: config.namespace.clone(), credential })
    }

    /// `<address>/v1/<path>`, each path segment percent-encoded.
    fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("v1").extend(path.trim_start_matches('/').split('/'));
        }
        url
    }

    fn get(&self, path: &str) -> RequestBuilder {
        let mut request = self.http.get(self.endpoint(path));

        if let Some(token) = self.credential.token() {
            request = request.header(TOKEN_HEADER, token.expose_secret());
        }
        if let Some(namespace) = &self.namespace {
            request = request.header(NAMESPACE_HEADER, namespace);
        }
        request
    }

    /// Determine the engine version serving `path` and rewrite it for KV v2.
    ///
    /// Introspection failures are not errors: the path is read as given.
    pub async fn resolve_path(&self, path: &str) -> ResolvedPath {
        let endpoint = format!("{}/{}", MOUNTS_ENDPOINT, path.trim_start_matches('/'));

        let response = match self.get(&endpoint).send().await {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                debug!(path = %path, status = %response.status(), "mount lookup rejected, using path as given");
                return ResolvedPath::passthrough(path);
            }
            Err(e) => {
                debug!(path = %path, error = %e, "mount lookup failed, using path as given");
                return ResolvedPath::passthrough(path);
            }
        };

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                debug!(path = %path, error = %e, "mount lookup body unreadable, using path as given");
                return ResolvedPath::passthrough(path);
            }
        };

        match mounts::rewrite_path(&body, path) {
            Ok(resolved) => {
                debug!(path = %path, resolved = %resolved.path, versioned = resolved.versioned, "resolved secret path");
                resolved
            }
            Err(e) => {
                debug!(path = %path, error = %e, "mount lookup body malformed, using path as given");
                ResolvedPath::passthrough(path)
            }
        }
    }

    /// Logical read. A 404 is an absent record, not an error.
    pub async fn read(&self, path: &str) -> secrets::Result<Option<RawSecret>> {
        let response = self
            .get(path)
            .send()
            .await
            .map_err(|e| SecretsError::upstream(format!("Vault read failed: {}", e)))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            warn!(path = %path, status = %status, "Vault rejected secret read");
            return Err(SecretsError::upstream(format!("Vault returned status {}", status)));
        }

        let body: LogicalResponse = response
            .json()
            .await
            .map_err(|e| SecretsError::upstream(format!("Invalid Vault response: {}", e)))?;

        Ok(body.data)
    }
}

#[async_trait]
impl SecretStore for VaultStore {
    async fn fetch(&self, path: &str) -> secrets::Result<Option<RawSecret>> {
        let resolved = self.resolve_path(path).await;
        let data = self.read(&resolved.path).await?;

        if !resolved.versioned {
            return Ok(data);
        }

        // KV v2 nests the record one level down, next to its metadata
        Ok(data.and_then(|mut envelope| match envelope.remove("data") {
            Some(Value::Object(record)) => Some(record),
            _ => None,
        }))
    }
}
