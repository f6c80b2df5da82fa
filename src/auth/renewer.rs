//! Credential lifecycle: initial login, periodic renewal, and fallback to a
//! fresh login when renewal fails or Vault grants a shorter lease than asked.

use std::time::Duration;

use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn, Instrument};

use super::approle::AppRoleTokenSource;
use super::credential::{Credential, CredentialCell, RenewalState};
use super::error::{AuthError, Result};
use super::kubernetes::KubernetesTokenSource;
use super::static_token::StaticTokenSource;
use crate::auth_span;

/// Interval used by login-based strategies when none is configured.
pub const DEFAULT_LOGIN_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// How the plugin authenticates to Vault. Selected once at startup.
#[derive(Debug, Clone)]
pub enum TokenStrategy {
    Static(StaticTokenSource),
    Kubernetes(KubernetesTokenSource),
    AppRole(AppRoleTokenSource),
}

impl TokenStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Static(_) => StaticTokenSource::NAME,
            Self::Kubernetes(_) => KubernetesTokenSource::NAME,
            Self::AppRole(_) => AppRoleTokenSource::NAME,
        }
    }

    pub async fn renew(&self, increment: Duration) -> Result<Credential> {
        match self {
            Self::Static(source) => source.renew(increment).await,
            Self::Kubernetes(source) => source.renew().await,
            Self::AppRole(source) => source.renew(increment).await,
        }
    }

    pub async fn acquire(&self) -> Result<Credential> {
        match self {
            Self::Static(source) => source.acquire().await,
            Self::Kubernetes(source) => source.acquire().await,
            Self::AppRole(source) => source.acquire().await,
        }
    }

    fn is_fatal(&self) -> bool {
        matches!(self, Self::Static(source) if source.fail_on_error())
    }

    /// Static tokens only renew; renewing with no requested lifetime is a no-op.
    fn needs_ttl(&self) -> bool {
        matches!(self, Self::Static(_))
    }
}

/// What one refresh cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Renewed,
    Reacquired,
}

/// Drives a [`TokenStrategy`] and installs every credential it obtains into
/// the shared [`CredentialCell`].
#[derive(Debug, Clone)]
pub struct Renewer {
    strategy: TokenStrategy,
    credential: CredentialCell,
    interval: Duration,
    ttl: Duration,
}

impl Renewer {
    /// Login-based strategies fall back to [`DEFAULT_LOGIN_INTERVAL`] when
    /// `interval` is zero.
    pub fn new(strategy: TokenStrategy, credential: CredentialCell, interval: Duration, ttl: Duration) -> Self {
        let interval = match strategy {
            TokenStrategy::Static(_) => interval,
            _ if interval.is_zero() => DEFAULT_LOGIN_INTERVAL,
            _ => interval,
        };
        Self { strategy, credential, interval, ttl }
    }

    pub fn strategy(&self) -> &TokenStrategy {
        &self.strategy
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn state(&self) -> RenewalState {
        self.credential.state()
    }

    fn is_enabled(&self) -> bool {
        !self.interval.is_zero() && !(self.strategy.needs_ttl() && self.ttl.is_zero())
    }

    /// Obtain the initial credential. Failure here is fatal for the process.
    pub async fn authenticate(&self) -> Result<()> {
        if let RenewalState::Authenticated { .. } = self.state() {
            debug!(strategy = self.strategy.name(), "using configured Vault token");
            return Ok(());
        }

        let credential = self.strategy.acquire().await.map_err(|e| match e {
            AuthError::Unsupported { .. } => AuthError::config("a Vault token is required for token authentication"),
            other => other,
        })?;

        info!(
            strategy = self.strategy.name(),
            ttl_secs = credential.ttl().as_secs(),
            "authenticated to Vault"
        );
        self.credential.install(credential);
        Ok(())
    }

    /// Run one renewal cycle.
    pub async fn refresh(&self) -> Result<RefreshOutcome> {
        if self.state() == RenewalState::Unauthenticated {
            return self.reacquire().await;
        }

        match self.strategy.renew(self.ttl).await {
            Ok(renewed) if renewed.ttl() >= self.ttl => {
                debug!(strategy = self.strategy.name(), ttl_secs = renewed.ttl().as_secs(), "token renewed");
                self.credential.install(renewed);
                Ok(RefreshOutcome::Renewed)
            }
            Ok(renewed) => {
                info!(
                    strategy = self.strategy.name(),
                    granted_secs = renewed.ttl().as_secs(),
                    requested_secs = self.ttl.as_secs(),
                    "token could not be renewed for the requested ttl"
                );
                self.credential.install(renewed);
                match self.reacquire().await {
                    Err(e) if e.is_unsupported() => {
                        warn!(strategy = self.strategy.name(), "keeping renewed token with shorter lease");
                        Ok(RefreshOutcome::Renewed)
                    }
                    other => other,
                }
            }
            Err(e) if e.is_unsupported() => self.reacquire().await,
            Err(renew_error) => {
                warn!(strategy = self.strategy.name(), error = %renew_error, "token renewal failed");
                match self.reacquire().await {
                    Err(e) if e.is_unsupported() => Err(renew_error),
                    other => other,
                }
            }
        }
    }

    async fn reacquire(&self) -> Result<RefreshOutcome> {
        let credential = self.strategy.acquire().await?;
        info!(
            strategy = self.strategy.name(),
            ttl_secs = credential.ttl().as_secs(),
            "obtained new Vault token"
        );
        self.credential.install(credential);
        Ok(RefreshOutcome::Reacquired)
    }

    /// Refresh on every interval tick until `cancel` fires.
    ///
    /// Errors are logged and retried on the next tick, except for a static
    /// token configured to fail hard.
    pub async fn run(self, cancel: CancellationToken) -> Result<()> {
        if !self.is_enabled() {
            info!(strategy = self.strategy.name(), "token renewal disabled");
            cancel.cancelled().await;
            return Ok(());
        }

        info!(
            strategy = self.strategy.name(),
            interval_secs = self.interval.as_secs(),
            ttl_secs = self.ttl.as_secs(),
            "starting token renewal"
        );

        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("token renewal stopped");
                    return Ok(());
                }
                _ = ticker.tick() => {
                    let outcome = tokio::select! {
                        _ = cancel.cancelled() => return Ok(()),
                        outcome = self
                            .refresh()
                            .instrument(auth_span!("refresh", self.strategy.name())) => outcome,
                    };

                    if let Err(e) = outcome {
                        if self.strategy.is_fatal() {
                            error!(strategy = self.strategy.name(), error = %e, "token renewal failed");
                            return Err(e);
                        }
                        error!(
                            strategy = self.strategy.name(),
                            error = %e,
                            "token refresh failed, retrying on next tick"
                        );
                    }
                }
            }
        }
    }
}
