//! Access/refresh token pair

use std::fmt;

use serde::{Deserialize, Serialize};

/// The token pair persisted for a signed-in session.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Short-lived credential attached to each request
    pub access_token: String,
    /// Longer-lived credential exchanged for a new access token
    pub refresh_token: String,
}

impl Credentials {
    /// Creates a credential pair.
    #[must_use]
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }

    /// Returns true if a refresh token is available to renew the session.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // String::is_empty is not const
    pub fn can_refresh(&self) -> bool {
        !self.refresh_token.trim().is_empty()
    }
}

// Tokens never reach logs in full.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &token_preview(&self.access_token))
            .field("refresh_token", &token_preview(&self.refresh_token))
            .finish()
    }
}

/// Returns a log-safe preview of a token (first 8 chars + ...).
#[must_use]
pub fn token_preview(token: &str) -> String {
    match token.char_indices().nth(8) {
        Some((cut, _)) if token.len() > 12 => format!("{}...", &token[..cut]),
        _ if token.len() > 12 => token.to_string(),
        _ => "***".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn debug_output_hides_tokens() {
        let credentials = Credentials::new("eyJhbGciOiJIUzI1NiJ9.payload", "refresh-secret-123");
        let rendered = format!("{credentials:?}");
        assert!(rendered.contains("eyJhbGci..."));
        assert!(!rendered.contains("payload"));
        assert!(!rendered.contains("secret"));
    }

    #[test]
    fn short_tokens_are_masked() {
        assert_eq!(token_preview("abc"), "***");
    }

    #[test]
    fn blank_refresh_token_cannot_refresh() {
        assert!(!Credentials::new("a", " ").can_refresh());
        assert!(Credentials::new("a", "r").can_refresh());
    }
}
