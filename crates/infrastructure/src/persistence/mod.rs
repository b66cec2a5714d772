//! Persistence implementations.
//!
//! This module provides:
//! - The JSON file session store and its in-memory counterpart
//! - Client settings loading, saving and environment overrides

mod file_token_store;
mod memory_token_store;
mod settings_repository;

pub use file_token_store::{FileTokenStore, SESSION_FILE};
pub use memory_token_store::MemoryTokenStore;
pub use settings_repository::{
    BASE_URL_ENV, DATA_DIR_ENV, REFRESH_TIMEOUT_ENV, SettingsError, SettingsRepository,
    apply_overrides, session_dir,
};
