//! Session types: credentials, the signed-in user and the session endpoints' payloads

mod credentials;
mod payloads;
mod reason;
mod user;

pub use credentials::{Credentials, token_preview};
pub use payloads::{
    ProfileUpdate, RefreshTokenRequest, RefreshTokenResponse, SignInRequest, SignInResponse,
};
pub use reason::UnauthorizedReason;
pub use user::SessionUser;
