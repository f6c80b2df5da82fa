//! Process wiring: build the Vault clients, authenticate, then run the HTTP
//! server and the token renewer side by side until either stops.

use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::api::{start_api_server, ApiState, SharedSecret};
use crate::auth::{
    AppRoleTokenSource, Credential, CredentialCell, KubernetesTokenSource, Renewer,
    StaticTokenSource, TokenStrategy, VaultAuthClient,
};
use crate::config::{AppConfig, VaultAuthMethod, VaultConfig};
use crate::errors::Result;
use crate::secrets::SecretResolver;
use crate::vault::VaultStore;

/// Select the token strategy for the configured auth method.
pub fn build_strategy(config: &VaultConfig, credential: &CredentialCell) -> TokenStrategy {
    let client = VaultAuthClient::new(config, credential.clone());

    match &config.auth {
        VaultAuthMethod::Token => {
            TokenStrategy::Static(StaticTokenSource::new(client, config.renewal_strict))
        }
        VaultAuthMethod::Kubernetes { role, mount, token_path } => TokenStrategy::Kubernetes(
            KubernetesTokenSource::new(client, role.clone(), mount.clone(), token_path.clone()),
        ),
        VaultAuthMethod::AppRole { role_id, secret_id, mount } => TokenStrategy::AppRole(
            AppRoleTokenSource::new(client, mount.clone(), role_id.clone(), secret_id.clone()),
        ),
    }
}

/// Initial credential cell. Only the token method starts from `VAULT_TOKEN`;
/// login methods always begin with a fresh login.
pub fn initial_credential(config: &VaultConfig) -> CredentialCell {
    let cell = CredentialCell::new();
    if config.auth == VaultAuthMethod::Token && !config.token.is_empty() {
        cell.install(Credential::new(config.token.clone(), config.token_ttl));
    }
    cell
}

/// Run the plugin until a shutdown signal arrives or a task fails.
pub async fn run(config: AppConfig) -> Result<()> {
    let credential = initial_credential(&config.vault);
    let renewer = Renewer::new(
        build_strategy(&config.vault, &credential),
        credential.clone(),
        config.vault.renewal_interval,
        config.vault.token_ttl,
    );

    renewer.authenticate().await?;

    let store = VaultStore::new(&config.vault, credential)?;
    let state = ApiState {
        resolver: Arc::new(SecretResolver::new(Arc::new(store), config.plugin.disallow_forks)),
        secret: Arc::new(SharedSecret::new(config.plugin.secret.clone())),
    };

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_signal(cancel.clone()));

    let server = start_api_server(&config.server, state, cancel.clone());
    let renewal = {
        let cancel = cancel.clone();
        async move { renewer.run(cancel).await.map_err(Into::into) }
    };

    supervise(server, renewal, cancel).await
}

enum Finished {
    Server(Result<()>),
    Renewal(Result<()>),
}

/// Run both tasks; when one finishes, cancel and drain the other.
///
/// The error of the task that finished first takes precedence.
pub async fn supervise<S, R>(server: S, renewal: R, cancel: CancellationToken) -> Result<()>
where
    S: Future<Output = Result<()>>,
    R: Future<Output = Result<()>>,
{
    tokio::pin!(server);
    tokio::pin!(renewal);

    let first = tokio::select! {
        result = &mut server => Finished::Server(result),
        result = &mut renewal => Finished::Renewal(result),
    };

    cancel.cancel();

    match first {
        Finished::Server(result) => {
            if let Err(e) = &result {
                error!(error = %e, "API server stopped");
            }
            let other = renewal.await;
            result.and(other)
        }
        Finished::Renewal(result) => {
            if let Err(e) = &result {
                error!(error = %e, "token renewal stopped");
            }
            let other = server.await;
            result.and(other)
        }
    }
}

async fn cancel_on_signal(cancel: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
        _ = cancel.cancelled() => return,
    }

    info!("shutdown signal received");
    cancel.cancel();
}
