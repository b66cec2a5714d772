//! Ignite Application - Authenticated client, token renewal and session use cases
//!
//! This crate defines the application layer with:
//! - Port traits for the transport and the session store
//! - The authenticated client and its single-flight refresh coordinator
//! - The session use case (sign in, restore, sign out)
//! - Application-level error handling

pub mod auth;
pub mod error;
pub mod ports;
pub mod use_cases;

pub use auth::{
    AuthenticatedClient, RefreshConfig, RefreshCoordinator, SignOutHooks, SignOutRegistration,
};
pub use error::{ClientError, ClientResult};
pub use ports::{StorageError, TokenStore, Transport, TransportError};
pub use use_cases::{SessionManager, SignInInput};
