//! API request type

use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use super::{AUTHORIZATION, Header, Headers, HttpMethod, RequestBody};
use crate::error::{DomainError, DomainResult};

const BEARER_PREFIX: &str = "Bearer ";

/// One logical call against the API, relative to the configured base URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiRequest {
    /// Correlation identifier, stable across replays
    pub id: Uuid,
    /// HTTP method
    pub method: HttpMethod,
    /// Absolute path below the base URL (e.g. "/sessions")
    pub path: String,
    /// Query parameters in insertion order
    #[serde(default)]
    pub query: Vec<(String, String)>,
    /// HTTP headers
    #[serde(default)]
    pub headers: Headers,
    /// Request body
    #[serde(default)]
    pub body: RequestBody,
}

impl ApiRequest {
    /// Creates a request with no headers and no body.
    #[must_use]
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Headers::new(),
            body: RequestBody::none(),
        }
    }

    /// Creates a GET request.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    /// Creates a DELETE request.
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    /// Creates a POST request with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be represented as JSON.
    pub fn post_json<T: Serialize>(path: impl Into<String>, payload: &T) -> DomainResult<Self> {
        Ok(Self::new(HttpMethod::Post, path).with_body(RequestBody::json(payload)?))
    }

    /// Creates a PUT request with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be represented as JSON.
    pub fn put_json<T: Serialize>(path: impl Into<String>, payload: &T) -> DomainResult<Self> {
        Ok(Self::new(HttpMethod::Put, path).with_body(RequestBody::json(payload)?))
    }

    /// Replaces the body.
    #[must_use]
    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    /// Appends a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.add(Header::new(name, value));
        self
    }

    /// Appends a query parameter.
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Returns a copy of this request carrying `Authorization: Bearer <token>`.
    ///
    /// Everything else, including the correlation id, is left untouched.
    ///
    /// # Errors
    ///
    /// Never fails for the fixed header name; the `Result` mirrors
    /// [`Headers::set`].
    pub fn authorized(&self, token: &str) -> DomainResult<Self> {
        let mut request = self.clone();
        request
            .headers
            .set(AUTHORIZATION, format!("{BEARER_PREFIX}{token}"))?;
        Ok(request)
    }

    /// Returns the bearer token this request carries, if any.
    #[must_use]
    pub fn bearer_token(&self) -> Option<&str> {
        self.headers
            .get(AUTHORIZATION)
            .and_then(|value| value.strip_prefix(BEARER_PREFIX))
    }

    /// Resolves the full URL against a base URL.
    ///
    /// A path prefix on the base (e.g. `https://host/api`) is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not absolute, embeds a query or
    /// fragment, or the base cannot carry a path.
    pub fn resolve_url(&self, base: &Url) -> DomainResult<Url> {
        if !self.path.starts_with('/') || self.path.contains(['?', '#']) {
            return Err(DomainError::InvalidPath(self.path.clone()));
        }
        if base.cannot_be_a_base() {
            return Err(DomainError::InvalidUrl(base.to_string()));
        }

        let mut url = base.clone();
        let joined = format!("{}{}", base.path().trim_end_matches('/'), self.path);
        url.set_path(&joined);
        url.set_query(None);
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(self.query.iter());
        }
        Ok(url)
    }
}
