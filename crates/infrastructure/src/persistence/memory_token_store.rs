//! In-memory session store.

use async_trait::async_trait;
use ignite_application::ports::{StorageError, TokenStore};
use ignite_domain::{Credentials, SessionUser};
use tokio::sync::RwLock;

/// Session store that lives only as long as the process.
///
/// Useful for one-off commands and tests.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    credentials: RwLock<Option<Credentials>>,
    user: RwLock<Option<SessionUser>>,
}

impl MemoryTokenStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `credentials`.
    #[must_use]
    pub fn with_credentials(credentials: Credentials) -> Self {
        Self {
            credentials: RwLock::new(Some(credentials)),
            user: RwLock::new(None),
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn get_credentials(&self) -> Result<Option<Credentials>, StorageError> {
        Ok(self.credentials.read().await.clone())
    }

    async fn save_credentials(&self, credentials: &Credentials) -> Result<(), StorageError> {
        *self.credentials.write().await = Some(credentials.clone());
        Ok(())
    }

    async fn remove_credentials(&self) -> Result<(), StorageError> {
        *self.credentials.write().await = None;
        Ok(())
    }

    async fn get_user(&self) -> Result<Option<SessionUser>, StorageError> {
        Ok(self.user.read().await.clone())
    }

    async fn save_user(&self, user: &SessionUser) -> Result<(), StorageError> {
        *self.user.write().await = Some(user.clone());
        Ok(())
    }

    async fn remove_user(&self) -> Result<(), StorageError> {
        *self.user.write().await = None;
        Ok(())
    }
}
