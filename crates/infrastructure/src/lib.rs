//! Ignite Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer: the reqwest transport, the
//! session stores and the settings repository.

pub mod adapters;
pub mod persistence;
pub mod serialization;

pub use adapters::ReqwestTransport;
pub use persistence::{
    BASE_URL_ENV, DATA_DIR_ENV, FileTokenStore, MemoryTokenStore, REFRESH_TIMEOUT_ENV,
    SESSION_FILE, SettingsError, SettingsRepository, apply_overrides, session_dir,
};
pub use serialization::{
    SerializationError, from_json, from_json_bytes, to_json_stable, to_json_stable_bytes,
};
