//! Client settings persistence.
//!
//! Settings live in the platform-specific config directory:
//! - Linux: ~/.config/ignite/settings.json
//! - macOS: ~/Library/Application Support/ignite/settings.json
//! - Windows: %APPDATA%/ignite/settings.json
//!
//! Environment variables override what is on disk.

use std::path::{Path, PathBuf};

use ignite_domain::ClientSettings;
use tokio::fs;

use crate::serialization::{SerializationError, from_json_bytes, to_json_stable_bytes};

/// Overrides `base_url`.
pub const BASE_URL_ENV: &str = "IGNITE_BASE_URL";
/// Overrides `refresh_timeout_ms`.
pub const REFRESH_TIMEOUT_ENV: &str = "IGNITE_REFRESH_TIMEOUT_MS";
/// Overrides `data_dir`.
pub const DATA_DIR_ENV: &str = "IGNITE_DATA_DIR";

const APP_DIR: &str = "ignite";

/// Error type for settings operations.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),

    /// An environment override could not be parsed.
    #[error("invalid value for {name}: {value}")]
    InvalidOverride {
        /// Variable name.
        name: &'static str,
        /// Rejected value.
        value: String,
    },

    /// Could not determine config directory.
    #[error("Could not determine config directory")]
    NoConfigDir,
}

/// Repository for client settings.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    path: Option<PathBuf>,
}

impl Default for SettingsRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsRepository {
    /// Creates a repository using the platform config directory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            path: dirs::config_dir().map(|p| p.join(APP_DIR).join("settings.json")),
        }
    }

    /// Creates a repository backed by an explicit file.
    #[must_use]
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Returns the path where settings are stored, if available.
    #[must_use]
    pub fn settings_path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Loads settings from disk.
    ///
    /// Returns default settings if the file doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load(&self) -> Result<ClientSettings, SettingsError> {
        let Some(path) = &self.path else {
            return Ok(ClientSettings::default());
        };

        match fs::read(path).await {
            Ok(content) => Ok(from_json_bytes(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ClientSettings::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Loads settings and applies overrides from the process environment.
    ///
    /// # Errors
    ///
    /// See [`load`](Self::load) and [`apply_overrides`].
    pub async fn load_with_env(&self) -> Result<ClientSettings, SettingsError> {
        let settings = self.load().await?;
        apply_overrides(settings, |name| std::env::var(name).ok())
    }

    /// Saves settings to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory is unknown or the file
    /// cannot be written.
    pub async fn save(&self, settings: &ClientSettings) -> Result<(), SettingsError> {
        let Some(path) = &self.path else {
            return Err(SettingsError::NoConfigDir);
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let content = to_json_stable_bytes(settings)?;
        fs::write(path, content).await?;
        Ok(())
    }
}

/// Applies environment overrides read through `lookup`.
///
/// # Errors
///
/// Returns `InvalidOverride` if the refresh timeout is not a number of
/// milliseconds.
pub fn apply_overrides(
    mut settings: ClientSettings,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<ClientSettings, SettingsError> {
    if let Some(base_url) = lookup(BASE_URL_ENV) {
        settings.base_url = base_url;
    }
    if let Some(raw) = lookup(REFRESH_TIMEOUT_ENV) {
        settings.refresh_timeout_ms =
            raw.trim()
                .parse()
                .map_err(|_| SettingsError::InvalidOverride {
                    name: REFRESH_TIMEOUT_ENV,
                    value: raw.clone(),
                })?;
    }
    if let Some(dir) = lookup(DATA_DIR_ENV) {
        settings.data_dir = Some(PathBuf::from(dir));
    }
    Ok(settings)
}

/// Directory holding the session file.
///
/// Uses the configured `data_dir`, else the platform data directory.
#[must_use]
pub fn session_dir(settings: &ClientSettings) -> Option<PathBuf> {
    settings
        .data_dir
        .clone()
        .or_else(|| dirs::data_dir().map(|p| p.join(APP_DIR)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[tokio::test]
    async fn load_returns_default_when_no_file() {
        let dir = tempdir().expect("temp dir");
        let repo = SettingsRepository::at(dir.path().join("settings.json"));

        assert_eq!(repo.load().await.unwrap(), ClientSettings::default());
    }

    #[tokio::test]
    async fn save_then_load() {
        let dir = tempdir().expect("temp dir");
        let repo = SettingsRepository::at(dir.path().join("conf").join("settings.json"));
        let settings = ClientSettings {
            base_url: "https://api.example.com".to_string(),
            refresh_timeout_ms: 2_500,
            ..ClientSettings::default()
        };

        repo.save(&settings).await.unwrap();

        assert_eq!(repo.load().await.unwrap(), settings);
    }

    #[test]
    fn overrides_replace_file_values() {
        let settings = apply_overrides(
            ClientSettings::default(),
            env(&[
                (BASE_URL_ENV, "https://staging.example.com"),
                (REFRESH_TIMEOUT_ENV, " 1500 "),
                (DATA_DIR_ENV, "/tmp/ignite"),
            ]),
        )
        .unwrap();

        assert_eq!(settings.base_url, "https://staging.example.com");
        assert_eq!(settings.refresh_timeout_ms, 1_500);
        assert_eq!(session_dir(&settings), Some(PathBuf::from("/tmp/ignite")));
    }

    #[test]
    fn bad_timeout_override_is_rejected() {
        let result = apply_overrides(
            ClientSettings::default(),
            env(&[(REFRESH_TIMEOUT_ENV, "soon")]),
        );
        assert!(matches!(
            result,
            Err(SettingsError::InvalidOverride { name: REFRESH_TIMEOUT_ENV, .. })
        ));
    }
}
