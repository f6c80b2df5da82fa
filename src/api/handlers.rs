use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Serialize;
use tracing::{info, Instrument};

use crate::api::error::ApiError;
use crate::request_span;
use crate::secrets::{ResolvedSecret, SecretRequest, SecretResolver};

/// Response body for a resolved secret.
#[derive(Debug, Serialize)]
pub struct SecretResponse {
    pub name: String,
    pub data: String,
    pub pull: bool,
    pub fork: bool,
}

impl From<ResolvedSecret> for SecretResponse {
    fn from(secret: ResolvedSecret) -> Self {
        Self {
            data: secret.data.expose_secret().to_string(),
            name: secret.name,
            pull: secret.pull,
            fork: secret.fork,
        }
    }
}

pub async fn find_secret_handler(
    State(resolver): State<Arc<SecretResolver>>,
    payload: Result<Json<SecretRequest>, JsonRejection>,
) -> Result<Json<SecretResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let span = request_span!("POST", "/", repo = %request.repo.slug, secret_path = %request.path);
    async move {
        let secret = resolver.find(&request).await?;
        info!(name = %secret.name, "secret provided");
        Ok::<_, ApiError>(Json(SecretResponse::from(secret)))
    }
    .instrument(span)
    .await
}

pub async fn health_handler() -> &'static str {
    "ok"
}
