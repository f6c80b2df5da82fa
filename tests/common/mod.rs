//! Shared test infrastructure: a wiremock-backed Vault and recorded fixtures.

#![allow(dead_code)]

use std::path::PathBuf;

use serde_json::Value;
use vault_secrets_plugin::config::VaultConfig;
use vault_secrets_plugin::secrets::{BuildContext, RepoContext, SecretRequest};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN: &str = "s.zREhsyJT79kcuGbfrKsbyo0W";
pub const NEW_TOKEN: &str = "s.OhZm4kQxf6K45Tg0bKNQbTJD";
pub const ROLE_ID: &str = "c3dedbfe-eadd-56dc-6883-83cf898b3ecc";
pub const SECRET_ID: &str = "4d8ce042-4684-7e8d-dbb3-389bb9a39f7f";
pub const KUBE_TOKEN: &str = "62b858f9-529c-6b26-e0b8-0457b6aacdb4";

/// Load a recorded Vault response from `tests/fixtures`.
pub fn fixture(name: &str) -> Value {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name);
    let raw = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("cannot read fixture {}: {}", path.display(), e));
    serde_json::from_str(&raw).unwrap_or_else(|e| panic!("invalid fixture {}: {}", name, e))
}

/// A mock Vault server.
pub struct MockVault {
    pub server: MockServer,
}

impl MockVault {
    pub async fn start() -> Self {
        Self { server: MockServer::start().await }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    pub fn config(&self) -> VaultConfig {
        VaultConfig { address: self.uri(), ..VaultConfig::default() }
    }

    /// Answer mount introspection for `secret_path` with a fixture.
    pub async fn mount(&self, secret_path: &str, fixture_name: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/v1/sys/internal/ui/mounts/{}", secret_path)))
            .respond_with(ResponseTemplate::new(200).set_body_json(fixture(fixture_name)))
            .mount(&self.server)
            .await;
    }

    /// Serve a logical read at `read_path`.
    pub async fn secret(&self, read_path: &str, fixture_name: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/v1/{}", read_path)))
            .respond_with(ResponseTemplate::new(200).set_body_json(fixture(fixture_name)))
            .mount(&self.server)
            .await;
    }

    /// Answer `read_path` with a bare status and Vault's error envelope.
    pub async fn status(&self, read_path: &str, status: u16) {
        Mock::given(method("GET"))
            .and(path(format!("/v1/{}", read_path)))
            .respond_with(
                ResponseTemplate::new(status).set_body_json(serde_json::json!({"errors": []})),
            )
            .mount(&self.server)
            .await;
    }
}

/// A push to master of `octocat/hello-world`.
pub fn push_request(secret_path: &str, name: &str) -> SecretRequest {
    SecretRequest {
        path: secret_path.to_string(),
        name: name.to_string(),
        repo: RepoContext { slug: "octocat/hello-world".to_string() },
        build: BuildContext {
            event: "push".to_string(),
            git_ref: "refs/heads/master".to_string(),
            target: "master".to_string(),
            fork: String::new(),
        },
    }
}
