//! Session use case.
//!
//! Owns the signed-in user for the lifetime of the app: signing in,
//! restoring a stored session at start-up, updating the profile and
//! signing out, including sign-outs forced by the authenticated client.

use std::sync::{Arc, Weak};

use ignite_domain::{ApiRequest, ProfileUpdate, SessionUser, SignInRequest, SignInResponse};
use parking_lot::RwLock;

use crate::auth::{AuthenticatedClient, SignOutRegistration};
use crate::error::{ClientError, ClientResult};
use crate::ports::{TokenStore, Transport};

/// Path of the sign-in endpoint.
pub const SESSIONS_PATH: &str = "/sessions";

/// Path of the profile endpoint.
pub const USERS_PATH: &str = "/users";

/// Input for signing in.
#[derive(Debug, Clone)]
pub struct SignInInput {
    /// Account e-mail.
    pub email: String,
    /// Account password.
    pub password: String,
}

struct SessionInner<T, S> {
    client: AuthenticatedClient<T, S>,
    store: Arc<S>,
    user: RwLock<Option<SessionUser>>,
}

/// Use case managing the signed-in session.
pub struct SessionManager<T, S> {
    inner: Arc<SessionInner<T, S>>,
}

impl<T, S> Clone for SessionManager<T, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T, S> SessionManager<T, S>
where
    T: Transport + 'static,
    S: TokenStore + 'static,
{
    /// Creates a signed-out session manager.
    pub fn new(client: AuthenticatedClient<T, S>, store: Arc<S>) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                client,
                store,
                user: RwLock::new(None),
            }),
        }
    }

    /// Returns the authenticated client.
    pub fn client(&self) -> &AuthenticatedClient<T, S> {
        &self.inner.client
    }

    /// Makes forced sign-outs from the client end this session.
    ///
    /// The handler only holds a weak reference, so the manager and the
    /// client can be dropped while it is installed.
    pub fn attach(&self) -> SignOutRegistration {
        let weak: Weak<SessionInner<T, S>> = Arc::downgrade(&self.inner);
        self.inner.client.register_sign_out_handler(move || {
            let weak = weak.clone();
            async move {
                if let Some(inner) = weak.upgrade() {
                    let manager = SessionManager { inner };
                    if let Err(error) = manager.sign_out().await {
                        tracing::error!(%error, "failed to clear session after forced sign-out");
                    }
                }
            }
        })
    }

    /// Returns the signed-in user.
    pub fn current_user(&self) -> Option<SessionUser> {
        self.inner.user.read().clone()
    }

    /// Returns true if a user is signed in.
    pub fn is_signed_in(&self) -> bool {
        self.inner.user.read().is_some()
    }

    /// Restores a stored session.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the store cannot be read.
    pub async fn restore(&self) -> ClientResult<Option<SessionUser>> {
        let user = self.inner.store.get_user().await?;
        let credentials = self.inner.store.get_credentials().await?;

        match &credentials {
            Some(credentials) => self
                .inner
                .client
                .set_access_token(credentials.access_token.clone()),
            None => self.inner.client.clear_access_token(),
        }

        tracing::info!(
            user = user.as_ref().map(|u| u.email.as_str()),
            has_token = credentials.is_some(),
            "session restored"
        );
        self.inner.user.write().clone_from(&user);
        Ok(user)
    }

    /// Signs in and persists the new session.
    ///
    /// # Errors
    ///
    /// Returns `Remote` with the server's message for rejected credentials,
    /// `Storage` if the session cannot be persisted.
    pub async fn sign_in(&self, input: SignInInput) -> ClientResult<SessionUser> {
        let body = SignInRequest {
            email: input.email,
            password: input.password,
        };
        // A leftover token would turn a wrong password into a forced sign-out.
        self.inner.client.end_session();
        let request = ApiRequest::post_json(SESSIONS_PATH, &body)?;
        let session: SignInResponse = self.inner.client.send_json(request).await?;

        let credentials = session.credentials();
        self.inner.store.save_user(&session.user).await?;
        self.inner.store.save_credentials(&credentials).await?;
        self.inner.client.set_access_token(credentials.access_token);

        tracing::info!(user = %session.user.email, "signed in");
        *self.inner.user.write() = Some(session.user.clone());
        Ok(session.user)
    }

    /// Updates the profile and the stored user record.
    ///
    /// # Errors
    ///
    /// Returns `SessionInvalid` if no user is signed in, or the client's
    /// error for the update request.
    pub async fn update_profile(&self, update: ProfileUpdate) -> ClientResult<SessionUser> {
        let Some(mut user) = self.current_user() else {
            return Err(ClientError::SessionInvalid);
        };

        self.inner.client.put_json(USERS_PATH, &update).await?;

        user.name = update.name;
        self.inner.store.save_user(&user).await?;
        *self.inner.user.write() = Some(user.clone());
        Ok(user)
    }

    /// Ends the session locally.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the stored session cannot be removed; the
    /// in-memory session is cleared regardless.
    pub async fn sign_out(&self) -> ClientResult<()> {
        *self.inner.user.write() = None;
        self.inner.client.end_session();
        self.inner.store.clear().await?;
        tracing::info!("signed out");
        Ok(())
    }
}
