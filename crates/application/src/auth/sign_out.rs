//! Sign-out hook registry.
//!
//! The owner of a session installs one handler that runs whenever the
//! client decides the session cannot be recovered. Registering again
//! replaces the previous handler; a registration only ever detaches the
//! handler it installed.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

/// Future returned by a sign-out handler.
pub type SignOutFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

type Handler = Arc<dyn Fn() -> SignOutFuture + Send + Sync>;

#[derive(Default)]
struct Slot {
    next_id: u64,
    current: Option<(u64, Handler)>,
}

/// Shared slot holding the current sign-out handler.
#[derive(Clone, Default)]
pub struct SignOutHooks {
    slot: Arc<Mutex<Slot>>,
}

impl SignOutHooks {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `handler`, replacing any previous one.
    pub fn register<F, Fut>(&self, handler: F) -> SignOutRegistration
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handler: Handler = Arc::new(move || -> SignOutFuture { Box::pin(handler()) });
        let mut slot = self.slot.lock();
        slot.next_id += 1;
        let id = slot.next_id;
        if slot.current.replace((id, handler)).is_some() {
            tracing::debug!(registration = id, "replaced sign-out handler");
        }
        SignOutRegistration {
            id,
            slot: Arc::downgrade(&self.slot),
        }
    }

    /// Returns true if a handler is installed.
    #[must_use]
    pub fn is_registered(&self) -> bool {
        self.slot.lock().current.is_some()
    }

    /// Runs the installed handler to completion.
    ///
    /// Returns false if no handler was installed.
    pub async fn fire(&self) -> bool {
        // The lock is released before the handler runs so it may re-register.
        let handler = self.slot.lock().current.as_ref().map(|(_, h)| Arc::clone(h));
        match handler {
            Some(handler) => {
                handler().await;
                true
            }
            None => {
                tracing::warn!("session invalidated with no sign-out handler installed");
                false
            }
        }
    }
}

impl std::fmt::Debug for SignOutHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignOutHooks")
            .field("registered", &self.is_registered())
            .finish()
    }
}

/// Handle returned by [`SignOutHooks::register`].
#[derive(Debug)]
#[must_use = "dropping the registration keeps the handler installed; call detach() to remove it"]
pub struct SignOutRegistration {
    id: u64,
    slot: Weak<Mutex<Slot>>,
}

impl SignOutRegistration {
    /// Removes the handler this registration installed.
    ///
    /// Returns false if it had already been replaced or the client is gone.
    pub fn detach(self) -> bool {
        let Some(slot) = self.slot.upgrade() else {
            return false;
        };
        let mut slot = slot.lock();
        match slot.current {
            Some((id, _)) if id == self.id => {
                slot.current = None;
                true
            }
            _ => false,
        }
    }
}
