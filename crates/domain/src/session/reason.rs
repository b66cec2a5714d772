//! Reason codes carried by 401 responses

/// Why the server rejected a request with 401.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnauthorizedReason {
    /// The access token is past its expiry
    TokenExpired,
    /// The access token failed verification
    TokenInvalid,
    /// Any other reason code (bad credentials, revoked session, ...)
    Other(String),
    /// The body carried no reason at all
    Unspecified,
}

impl UnauthorizedReason {
    /// Parses the reason code reported by the server.
    #[must_use]
    pub fn parse(code: &str) -> Self {
        match code.trim() {
            "token.expired" => Self::TokenExpired,
            "token.invalid" => Self::TokenInvalid,
            "" => Self::Unspecified,
            other => Self::Other(other.to_string()),
        }
    }

    /// Returns true if a token refresh can recover from this rejection.
    #[must_use]
    pub const fn is_refreshable(&self) -> bool {
        matches!(self, Self::TokenExpired | Self::TokenInvalid)
    }
}
