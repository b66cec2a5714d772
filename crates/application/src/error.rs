//! Client error types

use ignite_domain::{ApiResponse, DomainError};
use thiserror::Error;

use crate::ports::{StorageError, TransportError};

/// Message shown when the server failed without explaining why.
const GENERIC_FAILURE: &str = "Server error. Please try again later.";

/// Errors surfaced to callers of the authenticated client.
///
/// Values are cheap to clone so one refresh failure can be handed,
/// unchanged, to every request that was waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// No response was received.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server answered with an error and explained it.
    #[error("{message}")]
    Remote {
        /// HTTP status code.
        status: u16,
        /// The `message` field of the error body.
        message: String,
    },

    /// The server answered with an error status and no readable message.
    #[error("request failed with status {0}")]
    UnexpectedStatus(u16),

    /// The session cannot be recovered; the user must sign in again.
    #[error("session is no longer valid")]
    SessionInvalid,

    /// Reading or writing the session store failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A success response did not have the expected shape.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The request could not be built.
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] DomainError),
}

impl ClientError {
    /// Builds the error for a 4xx/5xx response.
    #[must_use]
    pub fn from_response(response: &ApiResponse) -> Self {
        match response.error_body().and_then(|body| body.message) {
            Some(message) => Self::Remote {
                status: response.status,
                message,
            },
            None => Self::UnexpectedStatus(response.status),
        }
    }

    /// Text suitable for showing to the user.
    ///
    /// Server-provided messages are passed through; everything else
    /// collapses to a generic retry hint.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Remote { message, .. } => message.clone(),
            Self::SessionInvalid => "Your session has expired. Please sign in again.".to_string(),
            _ => GENERIC_FAILURE.to_string(),
        }
    }
}

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
