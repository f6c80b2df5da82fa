use axum::{http::StatusCode, response::IntoResponse};
use tracing::error;

use crate::secrets::SecretsError;

/// Error responses of the plugin endpoint.
///
/// Bodies are plain text: the orchestrator surfaces them to users as-is.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Unauthorized(String),
    Internal(String),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let message = match self {
            ApiError::BadRequest(msg)
            | ApiError::NotFound(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Internal(msg) => msg,
        };

        (status, message).into_response()
    }
}

impl From<SecretsError> for ApiError {
    fn from(err: SecretsError) -> Self {
        if err.is_denial() {
            return ApiError::NotFound(err.to_string());
        }

        error!(error = %err, "secret lookup failed");
        ApiError::Internal("internal error".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::DenialReason;

    #[test]
    fn test_denials_map_to_not_found() {
        let err: ApiError = SecretsError::access_denied(DenialReason::Branch).into();
        assert!(matches!(err, ApiError::NotFound(ref msg) if msg == "access denied: branch does not match"));

        let err: ApiError = SecretsError::KeyNotFound.into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_upstream_is_opaque() {
        let err: ApiError = SecretsError::upstream("dial tcp 10.0.0.1:8200: refused").into();
        assert!(matches!(err, ApiError::Internal(ref msg) if msg == "internal error"));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
