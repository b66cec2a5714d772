//! Transport port

use std::future::Future;

use ignite_domain::{ApiRequest, ApiResponse};

/// Errors raised when no HTTP response was received.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The request did not complete before its deadline.
    #[error("request timed out after {timeout_ms}ms")]
    Timeout {
        /// The deadline that elapsed, in milliseconds.
        timeout_ms: u64,
    },

    /// The connection could not be established or was dropped.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The request URL could not be built.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The request body could not be encoded.
    #[error("invalid request body: {0}")]
    InvalidBody(String),

    /// The request was abandoned before a response arrived.
    #[error("request cancelled")]
    Cancelled,

    /// Any other transport failure.
    #[error("{0}")]
    Other(String),
}

/// Port for issuing HTTP requests.
///
/// Implementations return every HTTP response, whatever its status;
/// only failures to obtain a response are errors.
pub trait Transport: Send + Sync {
    /// Executes a request and returns the raw response.
    ///
    /// # Errors
    ///
    /// Returns an error if no response was received.
    fn execute(
        &self,
        request: &ApiRequest,
    ) -> impl Future<Output = Result<ApiResponse, TransportError>> + Send;
}
