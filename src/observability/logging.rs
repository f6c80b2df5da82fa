//! # Structured Logging
//!
//! Span helpers and startup logging. Secret values and tokens never appear
//! in log fields; requests are identified by path and build context only.

/// Create a tracing span for an inbound secret request.
///
/// ```rust,ignore
/// let span = request_span!("POST", "/");
/// let span = request_span!("POST", "/", repo = %slug);
/// ```
#[macro_export]
macro_rules! request_span {
    ($method:expr, $path:expr) => {
        tracing::info_span!(
            "http_request",
            method = %$method,
            path = %$path,
            request_id = %uuid::Uuid::new_v4()
        )
    };
    ($method:expr, $path:expr, $($field:tt)*) => {
        tracing::info_span!(
            "http_request",
            method = %$method,
            path = %$path,
            request_id = %uuid::Uuid::new_v4(),
            $($field)*
        )
    };
}

/// Create a tracing span for a Vault credential operation
#[macro_export]
macro_rules! auth_span {
    ($operation:expr, $strategy:expr) => {
        tracing::debug_span!(
            "vault_auth",
            operation = %$operation,
            strategy = %$strategy,
            operation_id = %uuid::Uuid::new_v4()
        )
    };
}

/// Log configuration at startup
pub fn log_config_info(config: &crate::config::AppConfig) {
    if config.vault.address == crate::config::DEFAULT_VAULT_ADDR {
        tracing::warn!(address = %config.vault.address, "VAULT_ADDR not set, using default address");
    }

    tracing::info!(
        bind_address = %config.server.bind_address(),
        vault_address = %config.vault.address,
        vault_namespace = ?config.vault.namespace,
        auth_method = config.vault.auth.name(),
        renewal_interval = ?config.vault.renewal_interval,
        token_ttl = ?config.vault.token_ttl,
        disallow_forks = config.plugin.disallow_forks,
        "Vault secrets plugin configuration"
    );
}
