//! Integration tests for configuration management
//!
//! Environment-driven configuration, and the API server binding the
//! configured address.

mod common;

use std::env;
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use common::{MockVault, TOKEN};
use tokio_util::sync::CancellationToken;
use vault_secrets_plugin::api::{start_api_server, ApiState, SharedSecret};
use vault_secrets_plugin::auth::{Credential, CredentialCell};
use vault_secrets_plugin::config::{LogFormat, ServerConfig, VaultAuthMethod};
use vault_secrets_plugin::secrets::{SecretResolver, SecretString};
use vault_secrets_plugin::vault::VaultStore;
use vault_secrets_plugin::{AppConfig, Result};

// Serializes tests that modify environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

const VARS: &[&str] = &[
    "DRONE_BIND",
    "DRONE_DEBUG",
    "DRONE_SECRET",
    "DRONE_LOG_FORMAT",
    "DRONE_DISALLOW_FORKS",
    "VAULT_ADDR",
    "VAULT_TOKEN",
    "VAULT_NAMESPACE",
    "VAULT_CACERT",
    "VAULT_CAPATH",
    "VAULT_AUTH_TYPE",
    "VAULT_AUTH_MOUNT_POINT",
    "VAULT_APPROLE_ID",
    "VAULT_APPROLE_SECRET",
    "VAULT_KUBERNETES_ROLE",
    "VAULT_TOKEN_RENEWAL",
    "VAULT_TOKEN_TTL",
];

/// Run `f` with exactly `pairs` set among the plugin's variables, restoring
/// the previous environment afterwards.
fn with_env<T>(pairs: &[(&str, &str)], f: impl FnOnce() -> T) -> T {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());

    let saved: Vec<(&str, Option<String>)> = VARS.iter().map(|k| (*k, env::var(k).ok())).collect();
    for key in VARS {
        env::remove_var(key);
    }
    for (key, value) in pairs {
        env::set_var(key, value);
    }

    let result = f();

    for (key, value) in saved {
        match value {
            Some(value) => env::set_var(key, value),
            None => env::remove_var(key),
        }
    }
    result
}

#[test]
fn test_config_environment_integration() -> Result<()> {
    let config = with_env(
        &[
            ("DRONE_BIND", "127.0.0.1:3100"),
            ("DRONE_SECRET", "bea26a2221fd8090ea38720fc445eca6"),
            ("DRONE_DEBUG", "true"),
            ("DRONE_LOG_FORMAT", "json"),
            ("DRONE_DISALLOW_FORKS", "true"),
            ("VAULT_ADDR", "https://vault.example.com:8200"),
            ("VAULT_TOKEN", TOKEN),
            ("VAULT_NAMESPACE", "ci"),
            ("VAULT_TOKEN_RENEWAL", "84h"),
            ("VAULT_TOKEN_TTL", "168h"),
        ],
        AppConfig::from_env,
    )?;

    assert_eq!(config.server.bind_address(), "127.0.0.1:3100");
    assert_eq!(config.plugin.secret.expose_secret(), "bea26a2221fd8090ea38720fc445eca6");
    assert!(config.plugin.disallow_forks);
    assert_eq!(config.observability.log_level, "debug");
    assert_eq!(config.observability.log_format, LogFormat::Json);
    assert_eq!(config.vault.address, "https://vault.example.com:8200");
    assert_eq!(config.vault.token.expose_secret(), TOKEN);
    assert_eq!(config.vault.namespace.as_deref(), Some("ci"));
    assert_eq!(config.vault.renewal_interval, Duration::from_secs(84 * 3600));
    assert_eq!(config.vault.token_ttl, Duration::from_secs(168 * 3600));
    assert_eq!(config.vault.auth, VaultAuthMethod::Token);
    Ok(())
}

#[test]
fn test_config_auth_methods_from_environment() -> Result<()> {
    let approle = with_env(
        &[
            ("DRONE_SECRET", "correct-horse"),
            ("VAULT_AUTH_TYPE", "approle"),
            ("VAULT_AUTH_MOUNT_POINT", "ci-approle"),
            ("VAULT_APPROLE_ID", "c3dedbfe-eadd-56dc-6883-83cf898b3ecc"),
            ("VAULT_APPROLE_SECRET", "4d8ce042-4684-7e8d-dbb3-389bb9a39f7f"),
        ],
        AppConfig::from_env,
    )?;
    match approle.vault.auth {
        VaultAuthMethod::AppRole { role_id, mount, .. } => {
            assert_eq!(role_id, "c3dedbfe-eadd-56dc-6883-83cf898b3ecc");
            assert_eq!(mount, "ci-approle");
        }
        other => panic!("expected approle, got {:?}", other),
    }

    let missing_role = with_env(
        &[("DRONE_SECRET", "correct-horse"), ("VAULT_AUTH_TYPE", "kubernetes")],
        AppConfig::from_env,
    );
    assert!(missing_role.is_err());

    let unknown = with_env(
        &[("DRONE_SECRET", "correct-horse"), ("VAULT_AUTH_TYPE", "ldap")],
        AppConfig::from_env,
    );
    assert!(unknown.is_err());
    Ok(())
}

#[test]
fn test_config_ca_certificates_from_environment() -> Result<()> {
    let ca_cert = format!("{}/tests/fixtures/vault_ca.pem", env!("CARGO_MANIFEST_DIR"));
    let config = with_env(
        &[("DRONE_SECRET", "correct-horse"), ("VAULT_CACERT", ca_cert.as_str())],
        AppConfig::from_env,
    )?;

    assert_eq!(config.vault.ca_certificates()?, vec![std::path::PathBuf::from(&ca_cert)]);

    let credential = CredentialCell::with_credential(Credential::new(TOKEN, Duration::ZERO));
    assert!(VaultStore::new(&config.vault, credential).is_ok());
    Ok(())
}

#[test]
fn test_config_invalid_values_are_rejected() {
    let bad_duration = with_env(
        &[("DRONE_SECRET", "correct-horse"), ("VAULT_TOKEN_TTL", "forever")],
        AppConfig::from_env,
    );
    assert!(bad_duration.is_err());

    let bad_address = with_env(
        &[("DRONE_SECRET", "correct-horse"), ("VAULT_ADDR", "vault.example.com")],
        AppConfig::from_env,
    );
    assert!(bad_address.is_err());
}

#[tokio::test]
async fn test_api_server_binds_configured_port() {
    let port = {
        let probe = TcpListener::bind("127.0.0.1:0").unwrap();
        probe.local_addr().unwrap().port()
    };

    let vault = MockVault::start().await;
    let credential = CredentialCell::with_credential(Credential::new(TOKEN, Duration::ZERO));
    let store = VaultStore::new(&vault.config(), credential).unwrap();
    let state = ApiState {
        resolver: Arc::new(SecretResolver::new(Arc::new(store), false)),
        secret: Arc::new(SharedSecret::new(SecretString::new("correct-horse"))),
    };

    let server_config = ServerConfig { bind: format!("127.0.0.1:{}", port) };
    let shutdown = CancellationToken::new();
    let server = tokio::spawn({
        let shutdown = shutdown.clone();
        async move { start_api_server(&server_config, state, shutdown).await }
    });

    let url = format!("http://127.0.0.1:{}/healthz", port);
    let mut body = None;
    for _ in 0..50 {
        if let Ok(response) = reqwest::get(&url).await {
            body = Some(response.text().await.unwrap());
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(body.as_deref(), Some("ok"));

    shutdown.cancel();
    let result = tokio::time::timeout(Duration::from_secs(5), server).await.unwrap().unwrap();
    assert!(result.is_ok());
}
