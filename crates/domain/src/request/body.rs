//! HTTP Request body types

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DomainError, DomainResult};

/// Request body held in its logical form.
///
/// Bodies are only encoded to bytes by the transport, so replaying a
/// request reuses the same logical value instead of re-encoding an already
/// serialized payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", content = "content", rename_all = "snake_case")]
pub enum RequestBody {
    /// No body
    #[default]
    None,
    /// A JSON document
    Json(Value),
    /// Raw text with an explicit content type
    Text {
        /// The content type (e.g., "text/plain")
        content_type: String,
        /// The body content
        content: String,
    },
}

impl RequestBody {
    /// Creates an empty body.
    #[must_use]
    pub const fn none() -> Self {
        Self::None
    }

    /// Creates a JSON body from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be represented as JSON.
    pub fn json<T: Serialize>(value: &T) -> DomainResult<Self> {
        serde_json::to_value(value)
            .map(Self::Json)
            .map_err(|e| DomainError::InvalidBody(e.to_string()))
    }

    /// Creates a plain text body.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text {
            content_type: "text/plain".to_string(),
            content: content.into(),
        }
    }

    /// Returns whether there is no body.
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Returns the content type if applicable.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        match self {
            Self::None => None,
            Self::Json(_) => Some("application/json"),
            Self::Text { content_type, .. } => Some(content_type),
        }
    }

    /// Encodes the body to bytes for the wire.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON value cannot be serialized.
    pub fn to_bytes(&self) -> DomainResult<Vec<u8>> {
        match self {
            Self::None => Ok(Vec::new()),
            Self::Json(value) => {
                serde_json::to_vec(value).map_err(|e| DomainError::InvalidBody(e.to_string()))
            }
            Self::Text { content, .. } => Ok(content.as_bytes().to_vec()),
        }
    }
}
