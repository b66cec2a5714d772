//! Ignite Domain - Core session and request types
//!
//! This crate defines the data model shared by the Ignite client layers:
//! credentials and the signed-in user, the API request/response pair that
//! flows through the transport, the wire payloads of the session endpoints
//! and the client's connection settings. All types here are pure Rust with
//! no I/O dependencies.

pub mod error;
pub mod request;
pub mod response;
pub mod session;
pub mod settings;

pub use error::{DomainError, DomainResult};
pub use request::{AUTHORIZATION, ApiRequest, Header, Headers, HttpMethod, RequestBody};
pub use response::{ApiResponse, ErrorBody};
pub use session::{
    Credentials, ProfileUpdate, RefreshTokenRequest, RefreshTokenResponse, SessionUser,
    SignInRequest, SignInResponse, UnauthorizedReason, token_preview,
};
pub use settings::ClientSettings;
