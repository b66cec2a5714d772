//! Single-flight token refresh.
//!
//! When requests fail because the access token expired, exactly one of
//! them (the leader) exchanges the refresh token while the others wait in
//! a FIFO queue. The leader then settles the whole cohort with the same
//! outcome: either the new access token, which every waiter uses to replay
//! its own request, or the failure, which every waiter returns unchanged.
//!
//! Every sign-out advances the session epoch. A cycle only installs its
//! token if the epoch it started in is still current, and a session is
//! signed out at most once per epoch.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use ignite_domain::{
    ApiRequest, ApiResponse, Credentials, RefreshTokenRequest, RefreshTokenResponse,
    token_preview,
};
use parking_lot::{Mutex, RwLock};
use tokio::sync::oneshot;
use uuid::Uuid;

use super::SignOutHooks;
use crate::error::{ClientError, ClientResult};
use crate::ports::{TokenStore, Transport, TransportError};

/// Default path of the refresh exchange.
pub const REFRESH_PATH: &str = "/sessions/refresh-token";

/// Default deadline for the refresh exchange.
pub const DEFAULT_REFRESH_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings of the refresh exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshConfig {
    /// Path of the refresh endpoint.
    pub refresh_path: String,
    /// Deadline for one exchange; expiry fails the cycle.
    pub refresh_timeout: Duration,
}

impl RefreshConfig {
    /// Overrides the exchange deadline.
    #[must_use]
    pub const fn with_timeout(mut self, refresh_timeout: Duration) -> Self {
        self.refresh_timeout = refresh_timeout;
        self
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            refresh_path: REFRESH_PATH.to_string(),
            refresh_timeout: DEFAULT_REFRESH_TIMEOUT,
        }
    }
}

/// What a waiter receives when its cycle settles.
type RefreshOutcome = Result<String, ClientError>;

/// A request parked behind an in-flight refresh.
struct PendingRequest {
    request_id: Uuid,
    enqueued_at: Instant,
    resolve: oneshot::Sender<RefreshOutcome>,
}

#[derive(Default)]
struct RefreshState {
    refreshing: bool,
    queue: VecDeque<PendingRequest>,
}

/// How a caller takes part in handling its 401.
enum Role {
    /// Runs the exchange for everyone, on behalf of the given epoch.
    Leader(u64),
    /// Waits for the leader's outcome.
    Waiter(oneshot::Receiver<RefreshOutcome>),
    /// A newer token is already installed; replay right away.
    Renewed(String),
    /// The session ended after this request was sent.
    SignedOut,
}

/// Coordinates token renewal for one authenticated client.
pub struct RefreshCoordinator<T, S> {
    transport: Arc<T>,
    store: Arc<S>,
    config: RefreshConfig,
    state: Mutex<RefreshState>,
    access_token: RwLock<Option<String>>,
    hooks: SignOutHooks,
    exchanges: AtomicU64,
    epoch: AtomicU64,
}

impl<T: Transport, S: TokenStore> RefreshCoordinator<T, S> {
    /// Creates an idle coordinator with no access token.
    pub fn new(transport: Arc<T>, store: Arc<S>, config: RefreshConfig) -> Self {
        Self {
            transport,
            store,
            config,
            state: Mutex::new(RefreshState::default()),
            access_token: RwLock::new(None),
            hooks: SignOutHooks::new(),
            exchanges: AtomicU64::new(0),
            epoch: AtomicU64::new(0),
        }
    }

    /// Returns the exchange settings.
    pub const fn config(&self) -> &RefreshConfig {
        &self.config
    }

    /// Returns the sign-out hook registry.
    pub const fn hooks(&self) -> &SignOutHooks {
        &self.hooks
    }

    /// Returns the access token attached to new requests.
    pub fn access_token(&self) -> Option<String> {
        self.access_token.read().clone()
    }

    /// Replaces the access token attached to new requests.
    ///
    /// A refresh already in flight overwrites this value when it succeeds.
    pub fn set_access_token(&self, token: Option<String>) {
        *self.access_token.write() = token;
    }

    /// Returns the current session epoch.
    ///
    /// Capture it before sending a request and hand it back to
    /// [`handle_unauthorized`](Self::handle_unauthorized) and
    /// [`sign_out`](Self::sign_out).
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::Acquire)
    }

    /// Returns true while an exchange is in flight.
    pub fn is_refreshing(&self) -> bool {
        self.state.lock().refreshing
    }

    /// Number of requests parked behind the in-flight exchange.
    pub fn queued(&self) -> usize {
        self.state.lock().queue.len()
    }

    /// Number of refresh exchanges issued so far.
    pub fn exchanges(&self) -> u64 {
        self.exchanges.load(Ordering::Relaxed)
    }

    /// Recovers a request rejected with an expired or invalid token.
    ///
    /// `request` is the request exactly as it was sent and `sent_in` the
    /// epoch read before sending it. On success the returned response is
    /// the raw result of replaying it with the renewed token; the caller
    /// classifies it.
    ///
    /// A request that carried a token while the client now holds none
    /// fails with `SessionInvalid`. The sign-out handler runs for it only
    /// if the session of `sent_in` has not been signed out already, which
    /// is the case when the owner merely cleared the access token.
    ///
    /// # Errors
    ///
    /// Returns the cycle's failure (shared with every other waiter), or the
    /// transport error of the replay itself.
    pub async fn handle_unauthorized(
        &self,
        request: &ApiRequest,
        sent_in: u64,
    ) -> ClientResult<ApiResponse> {
        let role = self.join(request);

        let token = match role {
            Role::Leader(epoch) => self.lead_cycle(epoch).await?,
            Role::Waiter(receiver) => {
                // A dropped sender means the cycle was torn down without settling.
                receiver
                    .await
                    .unwrap_or(Err(ClientError::Transport(TransportError::Cancelled)))?
            }
            Role::Renewed(token) => {
                tracing::debug!(request_id = %request.id, "token already renewed, replaying");
                token
            }
            Role::SignedOut => {
                self.sign_out(sent_in).await;
                return Err(ClientError::SessionInvalid);
            }
        };

        self.replay(request, &token).await
    }

    /// Signs out the session of `epoch`: drops the access token, advances
    /// the epoch and runs the owner's sign-out handler to completion.
    ///
    /// Returns false without running the handler if that session has
    /// already ended.
    pub async fn sign_out(&self, epoch: u64) -> bool {
        {
            let _state = self.state.lock();
            if self
                .epoch
                .compare_exchange(epoch, epoch + 1, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
            {
                tracing::debug!(epoch, "session already signed out");
                return false;
            }
            *self.access_token.write() = None;
        }
        self.hooks.fire().await;
        true
    }

    /// Ends the current session without running the sign-out handler.
    ///
    /// A refresh in flight no longer installs or persists its token.
    pub fn end_session(&self) {
        let _state = self.state.lock();
        self.epoch.fetch_add(1, Ordering::AcqRel);
        *self.access_token.write() = None;
    }

    /// Decides this caller's role. The check and the transition to
    /// Refreshing happen under one lock acquisition.
    fn join(&self, request: &ApiRequest) -> Role {
        let mut state = self.state.lock();

        if state.refreshing {
            let (resolve, receiver) = oneshot::channel();
            state.queue.push_back(PendingRequest {
                request_id: request.id,
                enqueued_at: Instant::now(),
                resolve,
            });
            tracing::debug!(
                request_id = %request.id,
                position = state.queue.len(),
                "queued behind in-flight token refresh"
            );
            return Role::Waiter(receiver);
        }

        let current = self.access_token.read().clone();
        match (request.bearer_token(), current) {
            (Some(sent), Some(current)) if sent != current => Role::Renewed(current),
            (None, Some(current)) => Role::Renewed(current),
            (Some(_), None) => Role::SignedOut,
            _ => {
                state.refreshing = true;
                Role::Leader(self.epoch())
            }
        }
    }

    /// Runs one refresh cycle and settles every waiter with its outcome.
    async fn lead_cycle(&self, epoch: u64) -> ClientResult<String> {
        let mut guard = CycleGuard {
            coordinator: self,
            epoch,
            settled: false,
        };

        let outcome = match self.renew(epoch).await {
            Ok(credentials) => {
                tracing::info!(
                    token = %token_preview(&credentials.access_token),
                    "access token renewed"
                );
                Ok(credentials.access_token)
            }
            Err(error) => {
                tracing::warn!(%error, "token refresh failed, signing out");
                // Sign-out completes before any waiter observes the failure.
                self.sign_out(epoch).await;
                Err(error)
            }
        };
        guard.settle(outcome)
    }

    /// Exchanges the stored refresh token and persists the new pair.
    async fn renew(&self, epoch: u64) -> ClientResult<Credentials> {
        let Some(stored) = self
            .store
            .get_credentials()
            .await?
            .filter(Credentials::can_refresh)
        else {
            tracing::warn!("no refresh token stored");
            return Err(ClientError::SessionInvalid);
        };

        let request = ApiRequest::post_json(
            self.config.refresh_path.as_str(),
            &RefreshTokenRequest {
                refresh_token: stored.refresh_token,
            },
        )?;

        self.exchanges.fetch_add(1, Ordering::Relaxed);
        let timeout = self.config.refresh_timeout;
        let response = tokio::time::timeout(timeout, self.transport.execute(&request))
            .await
            .map_err(|_| TransportError::Timeout {
                timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            })??;

        if !response.is_success() {
            return Err(ClientError::from_response(&response));
        }

        let credentials: Credentials = response
            .decode::<RefreshTokenResponse>()
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?
            .into();

        if self.epoch() != epoch {
            tracing::info!("session ended during token refresh, discarding renewed token");
            return Err(ClientError::SessionInvalid);
        }
        // A renewed token that is not persisted would be lost on restart.
        self.store.save_credentials(&credentials).await?;
        if self.epoch() != epoch {
            tracing::info!("session ended while saving renewed token");
            if self.store.get_credentials().await?.as_ref() == Some(&credentials) {
                self.store.remove_credentials().await?;
            }
            return Err(ClientError::SessionInvalid);
        }
        Ok(credentials)
    }

    /// Reissues `request` with the renewed bearer token.
    async fn replay(&self, request: &ApiRequest, token: &str) -> ClientResult<ApiResponse> {
        let replay = request.authorized(token)?;
        tracing::debug!(request_id = %request.id, method = %request.method, path = %request.path, "replaying request");
        Ok(self.transport.execute(&replay).await?)
    }

    /// Installs a successful token, drains the queue in arrival order and
    /// returns to Idle in one critical section.
    ///
    /// A token renewed for an epoch that has since been signed out is
    /// dropped and the cohort fails with `SessionInvalid` instead. Returns
    /// the outcome actually delivered.
    fn settle(&self, outcome: RefreshOutcome, epoch: u64) -> RefreshOutcome {
        let (outcome, waiters) = {
            let mut state = self.state.lock();
            let outcome = match outcome {
                Ok(token) if self.epoch() == epoch => {
                    *self.access_token.write() = Some(token.clone());
                    Ok(token)
                }
                Ok(_) => {
                    tracing::info!("session ended during token refresh, discarding renewed token");
                    Err(ClientError::SessionInvalid)
                }
                Err(error) => Err(error),
            };
            state.refreshing = false;
            (outcome, std::mem::take(&mut state.queue))
        };

        if !waiters.is_empty() {
            tracing::debug!(
                waiters = waiters.len(),
                success = outcome.is_ok(),
                "settling queued requests"
            );
        }
        for waiter in waiters {
            tracing::trace!(
                request_id = %waiter.request_id,
                waited = ?waiter.enqueued_at.elapsed(),
                "resolving queued request"
            );
            // The waiter may have given up; nothing to deliver then.
            let _ = waiter.resolve.send(outcome.clone());
        }
        outcome
    }
}

impl<T, S> std::fmt::Debug for RefreshCoordinator<T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("RefreshCoordinator")
            .field("config", &self.config)
            .field("refreshing", &state.refreshing)
            .field("queued", &state.queue.len())
            .finish_non_exhaustive()
    }
}

/// Settles the cycle even if the leader's future is dropped mid-exchange.
struct CycleGuard<'a, T: Transport, S: TokenStore> {
    coordinator: &'a RefreshCoordinator<T, S>,
    epoch: u64,
    settled: bool,
}

impl<T: Transport, S: TokenStore> CycleGuard<'_, T, S> {
    fn settle(&mut self, outcome: RefreshOutcome) -> RefreshOutcome {
        self.settled = true;
        self.coordinator.settle(outcome, self.epoch)
    }
}

impl<T: Transport, S: TokenStore> Drop for CycleGuard<'_, T, S> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::warn!("token refresh abandoned before completion");
            self.coordinator.settle(
                Err(ClientError::Transport(TransportError::Cancelled)),
                self.epoch,
            );
        }
    }
}
