//! Shared-secret authentication for the plugin endpoint.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, Request},
    middleware::Next,
    response::Response,
};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::warn;

use crate::api::error::ApiError;
use crate::secrets::SecretString;

type HmacSha256 = Hmac<Sha256>;

/// Verifies the bearer token presented by the orchestrator.
///
/// Comparison goes through HMAC tags so it takes the same time wherever the
/// presented token first differs.
#[derive(Debug, Clone)]
pub struct SharedSecret {
    secret: SecretString,
}

impl SharedSecret {
    pub fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    fn mac(&self) -> Option<HmacSha256> {
        HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes()).ok()
    }

    pub fn verify(&self, presented: &str) -> bool {
        let (Some(mut expected), Some(mut candidate)) = (self.mac(), self.mac()) else {
            return false;
        };
        expected.update(self.secret.expose_secret().as_bytes());
        candidate.update(presented.as_bytes());

        let tag = expected.finalize().into_bytes();
        candidate.verify_slice(&tag).is_ok()
    }
}

pub type SharedSecretState = Arc<SharedSecret>;

/// Rejects requests without a valid `Authorization: Bearer <secret>` header.
pub async fn authenticate(
    State(secret): State<SharedSecretState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim);

    match token {
        Some(token) if secret.verify(token) => Ok(next.run(request).await),
        Some(_) => {
            warn!(path = %request.uri().path(), "rejected request with invalid shared secret");
            Err(ApiError::Unauthorized("invalid or missing token".to_string()))
        }
        None => {
            warn!(path = %request.uri().path(), "rejected request without bearer token");
            Err(ApiError::Unauthorized("invalid or missing token".to_string()))
        }
    }
}
