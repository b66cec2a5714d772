//! Structured error payload returned by the API

use serde::{Deserialize, Serialize};

/// Error document the API sends with 4xx/5xx responses.
///
/// The backend reports auth failures as `{"status": "error", "message":
/// "token.expired"}`; newer deployments may add a dedicated `code`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable message, or the reason code on older servers
    #[serde(default)]
    pub message: Option<String>,
    /// Machine-readable reason code
    #[serde(default)]
    pub code: Option<String>,
}

impl ErrorBody {
    /// The reason code: `code` when present, otherwise `message`.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        self.code.as_deref().or(self.message.as_deref())
    }
}
