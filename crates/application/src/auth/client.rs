//! Authenticated API client.
//!
//! Wraps a [`Transport`], attaches the current bearer token to each
//! request and routes authorization failures through the
//! [`RefreshCoordinator`] before anything reaches the caller.

use std::future::Future;
use std::sync::Arc;

use ignite_domain::{ApiRequest, ApiResponse, UnauthorizedReason};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::{RefreshConfig, RefreshCoordinator, SignOutRegistration};
use crate::error::{ClientError, ClientResult};
use crate::ports::{TokenStore, Transport};

/// HTTP client that keeps one session authenticated.
pub struct AuthenticatedClient<T, S> {
    transport: Arc<T>,
    coordinator: Arc<RefreshCoordinator<T, S>>,
}

impl<T, S> Clone for AuthenticatedClient<T, S> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            coordinator: Arc::clone(&self.coordinator),
        }
    }
}

impl<T: Transport, S: TokenStore> AuthenticatedClient<T, S> {
    /// Creates a client with its own refresh coordinator.
    pub fn new(transport: Arc<T>, store: Arc<S>, config: RefreshConfig) -> Self {
        let coordinator = Arc::new(RefreshCoordinator::new(
            Arc::clone(&transport),
            store,
            config,
        ));
        Self {
            transport,
            coordinator,
        }
    }

    /// Returns the coordinator owning this client's refresh state.
    pub const fn coordinator(&self) -> &Arc<RefreshCoordinator<T, S>> {
        &self.coordinator
    }

    /// Sets the token attached to subsequent requests.
    ///
    /// Requests already sent keep the token they were sent with.
    pub fn set_access_token(&self, token: impl Into<String>) {
        self.coordinator.set_access_token(Some(token.into()));
    }

    /// Stops attaching a bearer token.
    ///
    /// The session itself stays current: a request that was sent with the
    /// old token and is rejected still signs out.
    pub fn clear_access_token(&self) {
        self.coordinator.set_access_token(None);
    }

    /// Ends the session locally without running the sign-out handler.
    ///
    /// Stops attaching a bearer token and keeps a refresh already in flight
    /// from installing or persisting its result.
    pub fn end_session(&self) {
        self.coordinator.end_session();
    }

    /// Returns the token attached to new requests.
    pub fn access_token(&self) -> Option<String> {
        self.coordinator.access_token()
    }

    /// Installs the handler run when the session becomes invalid.
    ///
    /// Replaces any earlier handler. Detach the returned registration when
    /// the owning session ends.
    pub fn register_sign_out_handler<F, Fut>(&self, handler: F) -> SignOutRegistration
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.coordinator.hooks().register(handler)
    }

    /// Performs one logical request.
    ///
    /// # Errors
    ///
    /// - `Transport` if no response was received
    /// - `SessionInvalid` after signing out, if the 401 cannot be recovered
    /// - the shared refresh failure if the token could not be renewed
    /// - `Remote`/`UnexpectedStatus` for any other 4xx/5xx
    pub async fn send(&self, request: ApiRequest) -> ClientResult<ApiResponse> {
        let epoch = self.coordinator.epoch();
        let outgoing = match self.access_token() {
            Some(token) => request.authorized(&token)?,
            None => request,
        };

        let response = self.transport.execute(&outgoing).await?;

        // Without a bearer token there is no session to recover; a 401 here
        // is an ordinary rejection such as a wrong password.
        if outgoing.bearer_token().is_none() {
            return Self::classify(response);
        }

        match response.unauthorized_reason() {
            None => Self::classify(response),
            Some(reason) if reason.is_refreshable() => {
                tracing::debug!(
                    request_id = %outgoing.id,
                    ?reason,
                    "access token rejected, handing over to refresh"
                );
                let replayed = self.coordinator.handle_unauthorized(&outgoing, epoch).await?;
                self.classify_replay(replayed, epoch).await
            }
            Some(reason) => self.invalidate(&reason, epoch).await,
        }
    }

    /// Performs a request and decodes a JSON success body.
    ///
    /// # Errors
    ///
    /// Same as [`send`](Self::send), plus `InvalidResponse` if the body
    /// does not decode into `R`.
    pub async fn send_json<R: DeserializeOwned>(&self, request: ApiRequest) -> ClientResult<R> {
        let response = self.send(request).await?;
        response
            .decode()
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    /// Issues a GET.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub async fn get(&self, path: &str) -> ClientResult<ApiResponse> {
        self.send(ApiRequest::get(path)).await
    }

    /// Issues a POST with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub async fn post_json<B: Serialize + Sync>(&self, path: &str, body: &B) -> ClientResult<ApiResponse> {
        self.send(ApiRequest::post_json(path, body)?).await
    }

    /// Issues a PUT with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub async fn put_json<B: Serialize + Sync>(&self, path: &str, body: &B) -> ClientResult<ApiResponse> {
        self.send(ApiRequest::put_json(path, body)?).await
    }

    /// Issues a DELETE.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub async fn delete(&self, path: &str) -> ClientResult<ApiResponse> {
        self.send(ApiRequest::delete(path)).await
    }

    fn classify(response: ApiResponse) -> ClientResult<ApiResponse> {
        if response.is_error() {
            Err(ClientError::from_response(&response))
        } else {
            Ok(response)
        }
    }

    /// A replay rejected again is not fed back into the coordinator.
    async fn classify_replay(&self, response: ApiResponse, epoch: u64) -> ClientResult<ApiResponse> {
        match response.unauthorized_reason() {
            Some(reason) => self.invalidate(&reason, epoch).await,
            None => Self::classify(response),
        }
    }

    /// Signs out the session `epoch` belonged to, unless a concurrent
    /// rejection already did.
    async fn invalidate(&self, reason: &UnauthorizedReason, epoch: u64) -> ClientResult<ApiResponse> {
        if self.coordinator.sign_out(epoch).await {
            tracing::warn!(?reason, "session rejected by server, signed out");
        }
        Err(ClientError::SessionInvalid)
    }
}

impl<T, S> std::fmt::Debug for AuthenticatedClient<T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticatedClient")
            .field("coordinator", &self.coordinator)
            .finish_non_exhaustive()
    }
}
