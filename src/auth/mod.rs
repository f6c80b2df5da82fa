//! Vault authentication.
//!
//! One [`TokenStrategy`] is selected from configuration. The [`Renewer`]
//! obtains the first credential at startup and keeps it fresh in the
//! background; the storage client reads it through the shared
//! [`CredentialCell`].

pub mod approle;
pub mod client;
pub mod credential;
pub mod error;
pub mod kubernetes;
pub mod renewer;
pub mod static_token;

pub use approle::AppRoleTokenSource;
pub use client::VaultAuthClient;
pub use credential::{Credential, CredentialCell, RenewalState};
pub use error::AuthError;
pub use kubernetes::KubernetesTokenSource;
pub use renewer::{RefreshOutcome, Renewer, TokenStrategy, DEFAULT_LOGIN_INTERVAL};
pub use static_token::StaticTokenSource;
