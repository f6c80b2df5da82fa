//! # Configuration Management
//!
//! Configuration comes from environment variables, optionally seeded from a
//! `.env` file by the binary. Durations accept human-readable values such as
//! `90s`, `30m` or `1h`.

pub mod settings;

pub use settings::{
    ca_certificate_files, AppConfig, LogFormat, ObservabilityConfig, PluginConfig, ServerConfig,
    VaultAuthMethod, VaultConfig, DEFAULT_BIND, DEFAULT_VAULT_ADDR, DEFAULT_VAULT_TIMEOUT,
};

use std::path::PathBuf;
use std::time::Duration;

use crate::errors::{Error, Result};
use crate::secrets::SecretString;

impl AppConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary key lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let debug = parse_bool("DRONE_DEBUG", get("DRONE_DEBUG"))?;
        let log_format = match get("DRONE_LOG_FORMAT").as_deref().map(str::to_lowercase).as_deref() {
            None | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(Error::config(format!(
                    "Invalid DRONE_LOG_FORMAT '{}', expected text or json",
                    other
                )))
            }
        };

        let auth = VaultAuthMethod::parse(
            &get("VAULT_AUTH_TYPE").unwrap_or_default(),
            get("VAULT_AUTH_MOUNT_POINT"),
            &get,
        )?;

        let config = AppConfig {
            server: ServerConfig { bind: get("DRONE_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string()) },
            plugin: PluginConfig {
                secret: SecretString::new(get("DRONE_SECRET").unwrap_or_default()),
                disallow_forks: parse_bool("DRONE_DISALLOW_FORKS", get("DRONE_DISALLOW_FORKS"))?,
            },
            vault: VaultConfig {
                address: get("VAULT_ADDR").unwrap_or_else(|| DEFAULT_VAULT_ADDR.to_string()),
                token: SecretString::new(get("VAULT_TOKEN").unwrap_or_default()),
                namespace: get("VAULT_NAMESPACE"),
                skip_verify: parse_bool("VAULT_SKIP_VERIFY", get("VAULT_SKIP_VERIFY"))?,
                ca_cert: get("VAULT_CACERT").map(PathBuf::from),
                ca_path: get("VAULT_CAPATH").map(PathBuf::from),
                timeout: parse_duration("VAULT_CLIENT_TIMEOUT", get("VAULT_CLIENT_TIMEOUT"))?
                    .unwrap_or(DEFAULT_VAULT_TIMEOUT),
                renewal_interval: parse_duration("VAULT_TOKEN_RENEWAL", get("VAULT_TOKEN_RENEWAL"))?
                    .unwrap_or_default(),
                token_ttl: parse_duration("VAULT_TOKEN_TTL", get("VAULT_TOKEN_TTL"))?.unwrap_or_default(),
                renewal_strict: parse_bool(
                    "VAULT_TOKEN_RENEWAL_STRICT",
                    get("VAULT_TOKEN_RENEWAL_STRICT"),
                )?,
                auth,
            },
            observability: ObservabilityConfig {
                log_level: if debug { "debug" } else { "info" }.to_string(),
                log_format,
            },
        };

        config.validate()?;
        Ok(config)
    }
}

fn parse_bool(key: &str, value: Option<String>) -> Result<bool> {
    match value.as_deref().map(str::to_lowercase).as_deref() {
        None => Ok(false),
        Some("1" | "t" | "true" | "yes" | "on") => Ok(true),
        Some("0" | "f" | "false" | "no" | "off") => Ok(false),
        Some(other) => Err(Error::config(format!("Invalid boolean for {}: '{}'", key, other))),
    }
}

fn parse_duration(key: &str, value: Option<String>) -> Result<Option<Duration>> {
    value
        .map(|v| {
            humantime::parse_duration(v.trim())
                .map_err(|e| Error::config(format!("Invalid duration for {}: {}", key, e)))
        })
        .transpose()
}
