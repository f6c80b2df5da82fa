//! # Configuration Settings
//!
//! Defines the configuration structure for the plugin.

use std::path::{Path, PathBuf};
use std::time::Duration;

use validator::Validate;

use crate::auth::{approle, kubernetes};
use crate::errors::{Error, Result};
use crate::secrets::SecretString;

pub const DEFAULT_BIND: &str = ":3000";
pub const DEFAULT_VAULT_ADDR: &str = "http://127.0.0.1:8200";
pub const DEFAULT_VAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Main application configuration
#[derive(Debug, Clone, Validate, Default)]
pub struct AppConfig {
    /// Inbound HTTP server
    #[validate(nested)]
    pub server: ServerConfig,

    /// Plugin behaviour
    pub plugin: PluginConfig,

    /// Vault connection and authentication
    #[validate(nested)]
    pub vault: VaultConfig,

    /// Logging
    #[validate(nested)]
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(Error::from)?;
        self.validate_custom()
    }

    fn validate_custom(&self) -> Result<()> {
        if self.plugin.secret.is_empty() {
            return Err(Error::config("DRONE_SECRET must be set"));
        }

        if !self.vault.address.starts_with("http://") && !self.vault.address.starts_with("https://") {
            return Err(Error::config("VAULT_ADDR must start with 'http://' or 'https://'"));
        }

        match &self.vault.auth {
            VaultAuthMethod::Token => {}
            VaultAuthMethod::Kubernetes { role, .. } if role.is_empty() => {
                return Err(Error::config("VAULT_KUBERNETES_ROLE is required for kubernetes authentication"));
            }
            VaultAuthMethod::AppRole { role_id, secret_id, .. } if role_id.is_empty() || secret_id.is_empty() => {
                return Err(Error::config(
                    "VAULT_APPROLE_ID and VAULT_APPROLE_SECRET are required for approle authentication",
                ));
            }
            _ => {}
        }

        Ok(())
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Validate)]
pub struct ServerConfig {
    /// Listen address, `host:port` or `:port`
    #[validate(length(min = 1, message = "Bind address cannot be empty"))]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: DEFAULT_BIND.to_string() }
    }
}

impl ServerConfig {
    /// Socket address to bind; a bare `:port` listens on all interfaces.
    pub fn bind_address(&self) -> String {
        if self.bind.starts_with(':') {
            format!("0.0.0.0{}", self.bind)
        } else {
            self.bind.clone()
        }
    }
}

/// Plugin behaviour
#[derive(Debug, Clone, Default)]
pub struct PluginConfig {
    /// Shared secret the orchestrator presents as a bearer token
    pub secret: SecretString,

    /// Deny fork builds unless a secret overrides it
    pub disallow_forks: bool,
}

/// Vault connection settings
#[derive(Debug, Clone, Validate)]
pub struct VaultConfig {
    #[validate(length(min = 1, message = "Vault address cannot be empty"))]
    pub address: String,

    /// Token for the `token` auth method
    pub token: SecretString,

    /// Enterprise namespace
    pub namespace: Option<String>,

    /// Skip TLS certificate verification
    pub skip_verify: bool,

    /// PEM file with CA certificates trusted for the Vault server
    pub ca_cert: Option<PathBuf>,

    /// Directory of PEM files with CA certificates
    pub ca_path: Option<PathBuf>,

    /// Per-request timeout
    pub timeout: Duration,

    /// Interval between renewal cycles; zero disables static token renewal
    pub renewal_interval: Duration,

    /// Lifetime requested on renewal
    pub token_ttl: Duration,

    /// Stop the process when a static token cannot be renewed
    pub renewal_strict: bool,

    pub auth: VaultAuthMethod,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_VAULT_ADDR.to_string(),
            token: SecretString::default(),
            namespace: None,
            skip_verify: false,
            ca_cert: None,
            ca_path: None,
            timeout: DEFAULT_VAULT_TIMEOUT,
            renewal_interval: Duration::ZERO,
            token_ttl: Duration::ZERO,
            renewal_strict: false,
            auth: VaultAuthMethod::Token,
        }
    }
}

impl VaultConfig {
    /// CA files to trust for the Vault server.
    pub fn ca_certificates(&self) -> Result<Vec<PathBuf>> {
        ca_certificate_files(self.ca_cert.as_deref(), self.ca_path.as_deref())
    }
}

/// `ca_cert` first, then every file in `ca_path` in name order.
pub fn ca_certificate_files(ca_cert: Option<&Path>, ca_path: Option<&Path>) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = ca_cert.map(Path::to_path_buf).into_iter().collect();

    if let Some(dir) = ca_path {
        let unreadable = |e: std::io::Error| {
            Error::config(format!("Cannot read VAULT_CAPATH {}: {}", dir.display(), e))
        };

        let mut found = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(unreadable)? {
            let path = entry.map_err(unreadable)?.path();
            if path.is_file() {
                found.push(path);
            }
        }
        found.sort();
        files.extend(found);
    }

    Ok(files)
}

/// How the plugin authenticates to Vault
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum VaultAuthMethod {
    /// Operator-supplied `VAULT_TOKEN`
    #[default]
    Token,

    Kubernetes { role: String, mount: String, token_path: PathBuf },

    AppRole { role_id: String, secret_id: SecretString, mount: String },
}

impl VaultAuthMethod {
    /// Build from `VAULT_AUTH_TYPE` and the method-specific settings.
    pub fn parse(
        kind: &str,
        mount: Option<String>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        match kind.trim().to_lowercase().as_str() {
            "" | "token" => Ok(Self::Token),
            "kubernetes" => Ok(Self::Kubernetes {
                role: lookup("VAULT_KUBERNETES_ROLE").unwrap_or_default(),
                mount: mount.unwrap_or_else(|| kubernetes::DEFAULT_MOUNT.to_string()),
                token_path: lookup("VAULT_KUBERNETES_TOKEN_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(kubernetes::DEFAULT_TOKEN_PATH)),
            }),
            "approle" => Ok(Self::AppRole {
                role_id: lookup("VAULT_APPROLE_ID").unwrap_or_default(),
                secret_id: SecretString::new(lookup("VAULT_APPROLE_SECRET").unwrap_or_default()),
                mount: mount.unwrap_or_else(|| approle::DEFAULT_MOUNT.to_string()),
            }),
            other => Err(Error::config(format!(
                "Unsupported VAULT_AUTH_TYPE '{}', expected token, kubernetes or approle",
                other
            ))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Token => "token",
            Self::Kubernetes { .. } => "kubernetes",
            Self::AppRole { .. } => "approle",
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Validate)]
pub struct ObservabilityConfig {
    /// Default filter directive when `RUST_LOG` is unset
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub log_level: String,

    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self { log_level: "info".to_string(), log_format: LogFormat::Text }
    }
}
