//! Use cases
//!
//! Application-level operations built on the authenticated client.

mod session;

pub use session::{SESSIONS_PATH, SessionManager, SignInInput, USERS_PATH};
