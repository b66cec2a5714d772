//! Authenticated requests and token renewal.
//!
//! This module provides:
//! - The authenticated client that attaches bearer tokens
//! - The single-flight refresh coordinator behind it
//! - The sign-out hook registry used to end an unrecoverable session

mod client;
mod refresh;
mod sign_out;

pub use client::AuthenticatedClient;
pub use refresh::{DEFAULT_REFRESH_TIMEOUT, REFRESH_PATH, RefreshConfig, RefreshCoordinator};
pub use sign_out::{SignOutFuture, SignOutHooks, SignOutRegistration};
