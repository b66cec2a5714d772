//! API response type

use std::time::Duration;

use serde::de::DeserializeOwned;

use super::ErrorBody;
use crate::request::Headers;
use crate::session::UnauthorizedReason;

/// HTTP response as seen by the client layers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: Headers,
    /// Raw response body
    pub body: Vec<u8>,
    /// Time from send to the last body byte
    pub duration: Duration,
}

impl ApiResponse {
    /// Creates a response with the given status and body.
    #[must_use]
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
            ..Self::default()
        }
    }

    /// Creates a response whose body is the JSON encoding of `value`.
    #[must_use]
    pub fn json(status: u16, value: &serde_json::Value) -> Self {
        Self::new(status, value.to_string())
    }

    /// Returns true if the status code indicates success (2xx).
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Returns true for any status the client treats as a failure (4xx/5xx).
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.status >= 400
    }

    /// Returns true if the status code is 401 Unauthorized.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    /// Returns the body as UTF-8 text, replacing invalid sequences.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decodes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns the decoder error if the body does not match `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// Parses the structured error payload, if the body carries one.
    #[must_use]
    pub fn error_body(&self) -> Option<ErrorBody> {
        self.decode::<ErrorBody>().ok()
    }

    /// Classifies a 401 by the reason code in its body.
    ///
    /// Returns `None` for any other status.
    #[must_use]
    pub fn unauthorized_reason(&self) -> Option<UnauthorizedReason> {
        if !self.is_unauthorized() {
            return None;
        }
        Some(
            self.error_body()
                .and_then(|body| body.reason().map(UnauthorizedReason::parse))
                .unwrap_or(UnauthorizedReason::Unspecified),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn status_checks() {
        assert!(ApiResponse::new(200, "").is_success());
        assert!(ApiResponse::new(404, "").is_error());
        assert!(!ApiResponse::new(304, "").is_error());
        assert!(ApiResponse::new(401, "").is_unauthorized());
    }

    #[test]
    fn expired_reason_from_message() {
        let response = ApiResponse::json(401, &json!({"status": "error", "message": "token.expired"}));
        assert_eq!(
            response.unauthorized_reason(),
            Some(UnauthorizedReason::TokenExpired)
        );
    }

    #[test]
    fn code_field_wins_over_message() {
        let response = ApiResponse::json(
            401,
            &json!({"code": "token.invalid", "message": "Invalid token"}),
        );
        assert_eq!(
            response.unauthorized_reason(),
            Some(UnauthorizedReason::TokenInvalid)
        );
    }

    #[test]
    fn unparsable_401_is_unspecified() {
        let response = ApiResponse::new(401, "<html>nope</html>");
        assert_eq!(
            response.unauthorized_reason(),
            Some(UnauthorizedReason::Unspecified)
        );
        assert_eq!(ApiResponse::new(403, "").unauthorized_reason(), None);
    }
}
