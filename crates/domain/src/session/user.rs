//! Signed-in user profile

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Profile record of the signed-in user.
///
/// Persisted next to the credentials and handed back unchanged; fields the
/// client does not model are kept in `extra` so nothing is lost on save.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionUser {
    /// Server-side identifier
    #[serde(default)]
    pub id: Value,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// E-mail used to sign in
    #[serde(default)]
    pub email: String,
    /// Avatar file name, if one was uploaded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    /// Any other fields sent by the server
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SessionUser {
    /// Creates a user with the given name and e-mail.
    #[must_use]
    pub fn new(id: impl Into<Value>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            avatar: None,
            extra: Map::new(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn unknown_fields_survive_a_round_trip() {
        let raw = json!({
            "id": "7f3c",
            "name": "Rodrigo",
            "email": "rodrigo@example.com",
            "avatar": null,
            "created_at": "2023-02-01T10:00:00Z"
        });
        let user: SessionUser = serde_json::from_value(raw).unwrap();
        assert_eq!(user.extra.get("created_at"), Some(&json!("2023-02-01T10:00:00Z")));

        let back = serde_json::to_value(&user).unwrap();
        assert_eq!(back["created_at"], json!("2023-02-01T10:00:00Z"));
        assert_eq!(back["id"], json!("7f3c"));
    }
}
