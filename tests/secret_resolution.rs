//! Secret resolution against a mock Vault.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{fixture, push_request, MockVault, TOKEN};
use vault_secrets_plugin::auth::{Credential, CredentialCell};
use vault_secrets_plugin::config::VaultConfig;
use vault_secrets_plugin::secrets::{DenialReason, SecretResolver, SecretsError};
use vault_secrets_plugin::vault::VaultStore;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, ResponseTemplate};

fn resolver_for(config: &VaultConfig, disallow_forks: bool) -> SecretResolver {
    let credential = CredentialCell::with_credential(Credential::new(TOKEN, Duration::from_secs(1200)));
    let store = VaultStore::new(config, credential).unwrap();
    SecretResolver::new(Arc::new(store), disallow_forks)
}

#[tokio::test]
async fn kv_v1_secret_is_read_with_token() {
    let vault = MockVault::start().await;
    vault.mount("secret/docker", "mounts_kv_v1.json").await;
    Mock::given(method("GET"))
        .and(path("/v1/secret/docker"))
        .and(header("X-Vault-Token", TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixture("secret_v1.json")))
        .expect(1)
        .mount(&vault.server)
        .await;

    let resolver = resolver_for(&vault.config(), false);
    let secret = resolver.find(&push_request("secret/docker", "username")).await.unwrap();

    assert_eq!(secret.name, "username");
    assert_eq!(secret.data.expose_secret(), "david");
    assert!(secret.pull);
    assert!(secret.fork);
}

#[tokio::test]
async fn kv_v2_path_is_rewritten_and_unwrapped() {
    let vault = MockVault::start().await;
    vault.mount("secret/docker", "mounts_kv_v2.json").await;
    vault.secret("secret/data/docker", "secret_v2.json").await;

    let resolver = resolver_for(&vault.config(), false);

    let password = resolver.find(&push_request("secret/docker", "password")).await.unwrap();
    assert_eq!(password.data.expose_secret(), "BnQw&XDWgaEeT9XGTT29");

    let port = resolver.find(&push_request("secret/docker", "port")).await.unwrap();
    assert_eq!(port.data.expose_secret(), "5432");

    let insecure = resolver.find(&push_request("secret/docker", "insecure")).await.unwrap();
    assert_eq!(insecure.data.expose_secret(), "false");
}

#[tokio::test]
async fn kv_v2_metadata_is_not_a_key() {
    let vault = MockVault::start().await;
    vault.mount("secret/docker", "mounts_kv_v2.json").await;
    vault.secret("secret/data/docker", "secret_v2.json").await;

    let resolver = resolver_for(&vault.config(), false);
    let err = resolver.find(&push_request("secret/docker", "metadata")).await.unwrap_err();
    assert!(matches!(err, SecretsError::KeyNotFound));
}

#[tokio::test]
async fn wildcard_returns_sorted_json() {
    let vault = MockVault::start().await;
    vault.mount("secret/docker", "mounts_kv_v2.json").await;
    vault.secret("secret/data/docker", "secret_v2.json").await;

    let resolver = resolver_for(&vault.config(), false);
    let secret = resolver.find(&push_request("secret/docker", "*")).await.unwrap();

    assert_eq!(
        secret.data.expose_secret(),
        r#"{"insecure":"false","password":"BnQw&XDWgaEeT9XGTT29","port":"5432","username":"david"}"#
    );
}

#[tokio::test]
async fn missing_record_is_not_found() {
    let vault = MockVault::start().await;
    vault.mount("secret/missing", "mounts_kv_v1.json").await;

    let resolver = resolver_for(&vault.config(), false);
    let err = resolver.find(&push_request("secret/missing", "username")).await.unwrap_err();

    assert!(matches!(err, SecretsError::NotFound));
    assert_eq!(err.to_string(), "secret not found");
}

#[tokio::test]
async fn deleted_v2_version_is_not_found() {
    let vault = MockVault::start().await;
    vault.mount("secret/docker", "mounts_kv_v2.json").await;
    vault.secret("secret/data/docker", "secret_v2_deleted.json").await;

    let resolver = resolver_for(&vault.config(), false);
    let err = resolver.find(&push_request("secret/docker", "username")).await.unwrap_err();
    assert!(matches!(err, SecretsError::NotFound));
}

#[tokio::test]
async fn missing_key_is_reported() {
    let vault = MockVault::start().await;
    vault.secret("secret/docker", "secret_v1.json").await;

    let resolver = resolver_for(&vault.config(), false);
    let err = resolver.find(&push_request("secret/docker", "token")).await.unwrap_err();
    assert_eq!(err.to_string(), "secret key not found");
}

#[tokio::test]
async fn mount_lookup_failure_reads_path_as_given() {
    let vault = MockVault::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/sys/internal/ui/mounts/secret/docker"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&vault.server)
        .await;
    vault.secret("secret/docker", "secret_v1.json").await;

    let resolver = resolver_for(&vault.config(), false);
    let secret = resolver.find(&push_request("secret/docker", "username")).await.unwrap();
    assert_eq!(secret.data.expose_secret(), "david");
}

#[tokio::test]
async fn vault_errors_are_upstream_failures() {
    let vault = MockVault::start().await;
    vault.status("secret/docker", 500).await;

    let resolver = resolver_for(&vault.config(), false);
    let err = resolver.find(&push_request("secret/docker", "username")).await.unwrap_err();
    assert!(matches!(err, SecretsError::Upstream { .. }));
}

#[tokio::test]
async fn namespace_header_is_sent() {
    let vault = MockVault::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/secret/docker"))
        .and(header("X-Vault-Namespace", "ci"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixture("secret_v1.json")))
        .expect(1)
        .mount(&vault.server)
        .await;

    let config = VaultConfig { namespace: Some("ci".to_string()), ..vault.config() };
    let resolver = resolver_for(&config, false);
    assert!(resolver.find(&push_request("secret/docker", "username")).await.is_ok());
}

#[tokio::test]
async fn restricted_secret_policies() {
    let vault = MockVault::start().await;
    vault.secret("secret/restricted", "secret_restricted.json").await;
    let resolver = resolver_for(&vault.config(), false);

    let allowed = push_request("secret/restricted", "password");
    assert!(resolver.find(&allowed).await.is_ok());

    let mut tag_on_release = allowed.clone();
    tag_on_release.build.event = "TAG".to_string();
    tag_on_release.build.target = "release/1.0".to_string();
    assert!(resolver.find(&tag_on_release).await.is_ok());

    let mut pull_request = allowed.clone();
    pull_request.build.event = "pull_request".to_string();
    let err = resolver.find(&pull_request).await.unwrap_err();
    assert!(matches!(err, SecretsError::AccessDenied { reason: DenialReason::Event }));

    let mut other_repo = allowed.clone();
    other_repo.repo.slug = "github/hello-world".to_string();
    let err = resolver.find(&other_repo).await.unwrap_err();
    assert!(matches!(err, SecretsError::AccessDenied { reason: DenialReason::Repository }));

    let mut other_branch = allowed.clone();
    other_branch.build.target = "develop".to_string();
    let err = resolver.find(&other_branch).await.unwrap_err();
    assert!(matches!(err, SecretsError::AccessDenied { reason: DenialReason::Branch }));

    let mut nested_release = allowed.clone();
    nested_release.build.target = "release/1.0/hotfix".to_string();
    let err = resolver.find(&nested_release).await.unwrap_err();
    assert!(matches!(err, SecretsError::AccessDenied { reason: DenialReason::Branch }));

    let mut fork = allowed.clone();
    fork.build.fork = "spaceghost/hello-world".to_string();
    let err = resolver.find(&fork).await.unwrap_err();
    assert_eq!(err.to_string(), "access denied: forks are not allowed");
}

#[tokio::test]
async fn global_fork_default_applies_without_override() {
    let vault = MockVault::start().await;
    vault.secret("secret/docker", "secret_v1.json").await;

    let mut fork = push_request("secret/docker", "username");
    fork.build.fork = "spaceghost/hello-world".to_string();

    let permissive = resolver_for(&vault.config(), false);
    assert!(permissive.find(&fork).await.is_ok());

    let strict = resolver_for(&vault.config(), true);
    let err = strict.find(&fork).await.unwrap_err();
    assert!(matches!(err, SecretsError::AccessDenied { reason: DenialReason::Fork }));
}

#[tokio::test]
async fn reserved_url_characters_stay_in_the_path() {
    let vault = MockVault::start().await;
    vault.secret("secret/prod", "secret_v1.json").await;
    let resolver = resolver_for(&vault.config(), false);

    for secret_path in ["secret/prod#staging", "secret/prod?version=1"] {
        let err = resolver.find(&push_request(secret_path, "username")).await.unwrap_err();
        assert!(matches!(err, SecretsError::NotFound), "path {secret_path:?} read another record");
    }
}

#[tokio::test]
async fn encoded_path_reaches_its_own_record() {
    let vault = MockVault::start().await;
    vault.secret("secret/prod%23staging", "secret_v1.json").await;
    let resolver = resolver_for(&vault.config(), false);

    let secret = resolver.find(&push_request("secret/prod#staging", "username")).await.unwrap();
    assert_eq!(secret.data.expose_secret(), "david");
}

#[tokio::test]
async fn kv_v2_envelope_without_data_is_not_found() {
    let vault = MockVault::start().await;
    vault.mount("secret/docker", "mounts_kv_v2.json").await;
    Mock::given(method("GET"))
        .and(path("/v1/secret/data/docker"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {"metadata": {"version": 3, "destroyed": false}}
        })))
        .mount(&vault.server)
        .await;

    let resolver = resolver_for(&vault.config(), false);
    let err = resolver.find(&push_request("secret/docker", "metadata")).await.unwrap_err();
    assert!(matches!(err, SecretsError::NotFound));
}
