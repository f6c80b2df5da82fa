//! # Vault Secrets Plugin
//!
//! A secret provider for Drone-style CI systems. The orchestrator asks for a
//! secret by path and key; the plugin reads it from HashiCorp Vault and hands
//! it over only when the requesting build satisfies the policy stored next to
//! the secret.
//!
//! ## Architecture
//!
//! ```text
//! HTTP API → SecretResolver → VaultStore (mount lookup + logical read)
//!                                  ↑
//!                       CredentialCell ← Renewer (token / kubernetes / approle)
//! ```
//!
//! - **api**: axum endpoint with shared-secret bearer authentication
//! - **secrets**: request types, record normalization, policy evaluation
//! - **vault**: KV v1/v2 aware reads over reqwest
//! - **auth**: Vault credential acquisition and renewal over vaultrs
//! - **startup**: runs the server and the renewer under one cancellation token

pub mod api;
pub mod auth;
pub mod config;
pub mod errors;
pub mod observability;
pub mod secrets;
pub mod startup;
pub mod vault;

pub use config::AppConfig;
pub use errors::{Error, Result};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
