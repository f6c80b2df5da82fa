//! Secret resolution: fetch, normalize, select, and authorize.

use std::sync::Arc;

use tracing::{debug, instrument};

use super::error::{Result, SecretsError};
use super::policy::PolicyAttributes;
use super::record::SecretRecord;
use super::store::SecretStore;
use super::types::{ResolvedSecret, SecretRequest, WILDCARD_SECRET_NAME};

/// Answers secret requests against a [`SecretStore`].
///
/// Stateless apart from the store handle and the global fork default, so a
/// single instance serves concurrent requests.
#[derive(Debug, Clone)]
pub struct SecretResolver {
    store: Arc<dyn SecretStore>,
    disallow_forks: bool,
}

impl SecretResolver {
    pub fn new(store: Arc<dyn SecretStore>, disallow_forks: bool) -> Self {
        Self { store, disallow_forks }
    }

    /// Resolve a request into a secret, or the reason it was refused.
    ///
    /// Lookup errors are reported before policy errors: a missing key is
    /// `secret key not found` even when the policy would also deny.
    #[instrument(
        skip(self, request),
        fields(
            path = %request.path,
            name = %request.requested_name(),
            event = %request.build.event,
            repo = %request.repo.slug,
            git_ref = %request.build.git_ref,
            fork = %request.build.fork,
        )
    )]
    pub async fn find(&self, request: &SecretRequest) -> Result<ResolvedSecret> {
        let raw = match self.store.fetch(&request.path).await? {
            Some(raw) if !raw.is_empty() => raw,
            _ => {
                debug!("secret not found");
                return Err(SecretsError::NotFound);
            }
        };

        let record = SecretRecord::from_json(&raw);
        let name = request.requested_name();

        let data = if name == WILDCARD_SECRET_NAME {
            record.to_json_string()?
        } else {
            match record.get_ignore_case(name) {
                Some(value) => value.to_string(),
                None => {
                    debug!("secret key not found");
                    return Err(SecretsError::KeyNotFound);
                }
            }
        };

        PolicyAttributes::from_record(&record)
            .evaluate(request, self.disallow_forks)
            .map_err(SecretsError::access_denied)?;

        debug!("secret resolved");
        Ok(ResolvedSecret::new(name, data))
    }
}
