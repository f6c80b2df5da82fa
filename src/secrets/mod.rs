//! Secret resolution for CI builds.
//!
//! A request names a storage path and a key. The record at that path is
//! fetched through a [`SecretStore`], normalized into a string map, and the
//! requested key is returned only when the build satisfies the access policy
//! embedded in the record's reserved `X-Drone-*` keys.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use vault_secrets_plugin::secrets::{SecretResolver, SecretRequest};
//!
//! let resolver = SecretResolver::new(Arc::new(store), false);
//! let secret = resolver.find(&request).await?;
//! ```

pub mod error;
pub mod matcher;
pub mod policy;
pub mod record;
pub mod resolver;
pub mod store;
pub mod types;

pub use error::{DenialReason, Result, SecretsError};
pub use policy::PolicyAttributes;
pub use record::SecretRecord;
pub use resolver::SecretResolver;
pub use store::{RawSecret, SecretStore};
pub use types::{
    BuildContext, RepoContext, ResolvedSecret, SecretRequest, SecretString, DEFAULT_SECRET_NAME,
    WILDCARD_SECRET_NAME,
};
