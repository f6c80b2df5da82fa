use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::handlers::{find_secret_handler, health_handler};
use super::middleware::{authenticate, SharedSecret};
use crate::secrets::SecretResolver;

/// Everything the router needs.
#[derive(Debug, Clone)]
pub struct ApiState {
    pub resolver: Arc<SecretResolver>,
    pub secret: Arc<SharedSecret>,
}

pub fn build_router(state: ApiState) -> Router {
    let auth_layer = middleware::from_fn_with_state(state.secret.clone(), authenticate);

    let secured = Router::new()
        .route("/", post(find_secret_handler))
        .route_layer(auth_layer)
        .with_state(state.resolver);

    Router::new()
        .route("/healthz", get(health_handler))
        .merge(secured)
        .layer(TraceLayer::new_for_http())
}
