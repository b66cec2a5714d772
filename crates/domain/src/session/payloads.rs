//! Wire payloads of the session endpoints

use serde::{Deserialize, Serialize};

use super::{Credentials, SessionUser};

/// Body of `POST /sessions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignInRequest {
    /// Account e-mail
    pub email: String,
    /// Account password
    pub password: String,
}

/// Success body of `POST /sessions`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SignInResponse {
    /// The signed-in user
    pub user: SessionUser,
    /// Access token
    pub token: String,
    /// Refresh token
    pub refresh_token: String,
}

impl SignInResponse {
    /// Returns the credential pair of this session.
    #[must_use]
    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.token.clone(), self.refresh_token.clone())
    }
}

/// Body of `POST /sessions/refresh-token`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshTokenRequest {
    /// The refresh token being exchanged
    pub refresh_token: String,
}

/// Success body of `POST /sessions/refresh-token`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RefreshTokenResponse {
    /// New access token
    pub token: String,
    /// New refresh token
    pub refresh_token: String,
}

impl From<RefreshTokenResponse> for Credentials {
    fn from(response: RefreshTokenResponse) -> Self {
        Self::new(response.token, response.refresh_token)
    }
}

/// Body of `PUT /users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    /// New display name
    pub name: String,
    /// Current password, required when changing it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_password: Option<String>,
    /// New password
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn refresh_response_becomes_credentials() {
        let response: RefreshTokenResponse =
            serde_json::from_value(json!({"token": "T2", "refresh_token": "R2"})).unwrap();
        assert_eq!(Credentials::from(response), Credentials::new("T2", "R2"));
    }

    #[test]
    fn profile_update_omits_unset_passwords() {
        let body = serde_json::to_value(ProfileUpdate {
            name: "Ana".to_string(),
            old_password: None,
            password: None,
        })
        .unwrap();
        assert_eq!(body, json!({"name": "Ana"}));
    }
}
