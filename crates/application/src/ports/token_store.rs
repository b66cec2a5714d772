//! Token store port
//!
//! Durable storage of the session's credentials and user record.

use async_trait::async_trait;

use ignite_domain::{Credentials, SessionUser};

/// Errors that can occur while reading or writing the session store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for StorageError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

/// Repository trait for session persistence.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Loads the stored credentials, if a session was saved.
    async fn get_credentials(&self) -> Result<Option<Credentials>, StorageError>;

    /// Persists the credentials, replacing any previous pair.
    ///
    /// # Errors
    /// Returns an error if the credentials cannot be written.
    async fn save_credentials(&self, credentials: &Credentials) -> Result<(), StorageError>;

    /// Deletes the stored credentials. Removing nothing is not an error.
    async fn remove_credentials(&self) -> Result<(), StorageError>;

    /// Loads the stored user record.
    async fn get_user(&self) -> Result<Option<SessionUser>, StorageError>;

    /// Persists the user record.
    async fn save_user(&self, user: &SessionUser) -> Result<(), StorageError>;

    /// Deletes the stored user record.
    async fn remove_user(&self) -> Result<(), StorageError>;

    /// Deletes everything belonging to the session.
    ///
    /// Both removals are attempted; the first error is returned.
    async fn clear(&self) -> Result<(), StorageError> {
        let user = self.remove_user().await;
        let credentials = self.remove_credentials().await;
        user.and(credentials)
    }
}
