//! File-based session store.
//!
//! The session is kept in one JSON document, `session.json`, inside the
//! client's data directory:
//! ```json
//! {
//!   "credentials": {
//!     "access_token": "eyJhbGciOi...",
//!     "refresh_token": "1f4c..."
//!   },
//!   "saved_at": "2026-10-19T12:00:00Z",
//!   "user": {
//!     "id": 1,
//!     "name": "Ana",
//!     "email": "ana@example.com"
//!   }
//! }
//! ```
//! The file is removed once both entries are gone.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ignite_application::ports::{StorageError, TokenStore};
use ignite_domain::{Credentials, SessionUser};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::Mutex;

use crate::serialization::{SerializationError, from_json_bytes, to_json_stable_bytes};

/// Name of the session file inside the data directory.
pub const SESSION_FILE: &str = "session.json";

impl From<SerializationError> for StorageError {
    fn from(error: SerializationError) -> Self {
        match error {
            SerializationError::Io(e) => Self::Io(e.to_string()),
            other => Self::Serialization(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SessionDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    credentials: Option<Credentials>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    saved_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user: Option<SessionUser>,
}

impl SessionDocument {
    const fn is_empty(&self) -> bool {
        self.credentials.is_none() && self.user.is_none()
    }
}

/// Session store persisting to a JSON file.
///
/// Writes go through a temporary file and a rename so a crash never leaves
/// a half-written session behind.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    // Serializes read-modify-write cycles on the document.
    lock: Mutex<()>,
}

impl FileTokenStore {
    /// Creates a store backed by the file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Creates a store for [`SESSION_FILE`] inside `dir`.
    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(SESSION_FILE))
    }

    /// Returns the session file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<SessionDocument, StorageError> {
        let content = match fs::read(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(SessionDocument::default());
            }
            Err(e) => return Err(e.into()),
        };
        Ok(from_json_bytes(&content)?)
    }

    async fn write(&self, document: &SessionDocument) -> Result<(), StorageError> {
        if document.is_empty() {
            return match fs::remove_file(&self.path).await {
                Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
                _ => Ok(()),
            };
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let content = to_json_stable_bytes(document)?;
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, content).await?;
        fs::rename(&staging, &self.path).await?;
        Ok(())
    }

    async fn update(
        &self,
        change: impl FnOnce(&mut SessionDocument) + Send,
    ) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;
        let mut document = self.read().await?;
        change(&mut document);
        document.saved_at = Some(Utc::now());
        self.write(&document).await?;
        tracing::debug!(path = %self.path.display(), "session file updated");
        Ok(())
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn get_credentials(&self) -> Result<Option<Credentials>, StorageError> {
        Ok(self.read().await?.credentials)
    }

    async fn save_credentials(&self, credentials: &Credentials) -> Result<(), StorageError> {
        let credentials = credentials.clone();
        self.update(move |doc| doc.credentials = Some(credentials))
            .await
    }

    async fn remove_credentials(&self) -> Result<(), StorageError> {
        self.update(|doc| doc.credentials = None).await
    }

    async fn get_user(&self) -> Result<Option<SessionUser>, StorageError> {
        Ok(self.read().await?.user)
    }

    async fn save_user(&self, user: &SessionUser) -> Result<(), StorageError> {
        let user = user.clone();
        self.update(move |doc| doc.user = Some(user)).await
    }

    async fn remove_user(&self) -> Result<(), StorageError> {
        self.update(|doc| doc.user = None).await
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.update(|doc| {
            doc.credentials = None;
            doc.user = None;
        })
        .await
    }
}
