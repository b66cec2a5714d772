//! HTTP transport implementation using reqwest.
//!
//! This adapter implements the `Transport` port. It resolves request paths
//! against the configured base URL, encodes the logical body and hands
//! back every response, whatever its status.

use std::time::{Duration, Instant};

use ignite_application::ports::{Transport, TransportError};
use ignite_domain::{
    ApiRequest, ApiResponse, ClientSettings, Header, Headers, HttpMethod, RequestBody,
};
use reqwest::{Client, Method, Url};

const CONTENT_TYPE: &str = "Content-Type";
const MAX_REDIRECTS: usize = 10;

/// HTTP transport backed by `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    base_url: Url,
    timeout: Duration,
}

impl ReqwestTransport {
    /// Creates a transport for `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn new(base_url: Url, timeout: Duration, user_agent: &str) -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;

        Ok(Self::with_client(client, base_url, timeout))
    }

    /// Creates a transport from client settings.
    ///
    /// # Errors
    ///
    /// Returns `InvalidUrl` for a bad base URL, or an error if the client
    /// cannot be created.
    pub fn from_settings(settings: &ClientSettings) -> Result<Self, TransportError> {
        let base_url = settings
            .parsed_base_url()
            .map_err(|e| TransportError::InvalidUrl(e.to_string()))?;
        Self::new(base_url, settings.request_timeout(), &settings.user_agent)
    }

    /// Creates a transport around an existing reqwest client.
    #[must_use]
    pub const fn with_client(client: Client, base_url: Url, timeout: Duration) -> Self {
        Self {
            client,
            base_url,
            timeout,
        }
    }

    /// Returns the URL request paths are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
        }
    }

    /// Attaches the encoded body and, unless the caller set one, its
    /// content type.
    fn build_body(
        builder: reqwest::RequestBuilder,
        request: &ApiRequest,
    ) -> Result<reqwest::RequestBuilder, TransportError> {
        let body: &RequestBody = &request.body;
        if body.is_none() {
            return Ok(builder);
        }

        let bytes = body
            .to_bytes()
            .map_err(|e| TransportError::InvalidBody(e.to_string()))?;
        let builder = match body.content_type() {
            Some(content_type) if !request.headers.contains(CONTENT_TYPE) => {
                builder.header(CONTENT_TYPE, content_type)
            }
            _ => builder,
        };
        Ok(builder.body(bytes))
    }

    fn map_error(error: &reqwest::Error, timeout_ms: u64) -> TransportError {
        if error.is_timeout() {
            return TransportError::Timeout { timeout_ms };
        }

        if error.is_connect() {
            let host = error
                .url()
                .and_then(Url::host_str)
                .unwrap_or("unknown")
                .to_string();
            return TransportError::ConnectionFailed(format!("{host}: {error}"));
        }

        if error.is_redirect() {
            return TransportError::Other(format!("more than {MAX_REDIRECTS} redirects"));
        }

        if error.is_builder() {
            return TransportError::InvalidUrl(error.to_string());
        }

        TransportError::Other(error.to_string())
    }

    fn collect_headers(headers: &reqwest::header::HeaderMap) -> Headers {
        let mut collected = Headers::new();
        for (name, value) in headers {
            collected.add(Header::new(
                name.as_str(),
                value.to_str().unwrap_or("<binary>"),
            ));
        }
        collected
    }
}

impl Transport for ReqwestTransport {
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = request
            .resolve_url(&self.base_url)
            .map_err(|e| TransportError::InvalidUrl(e.to_string()))?;
        let timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);

        let start = Instant::now();

        let mut builder = self
            .client
            .request(Self::to_reqwest_method(request.method), url)
            .timeout(self.timeout);
        for header in request.headers.iter() {
            builder = builder.header(header.name.as_str(), header.value.as_str());
        }
        builder = Self::build_body(builder, request)?;

        tracing::debug!(
            request_id = %request.id,
            method = %request.method,
            path = %request.path,
            "sending request"
        );

        let response = builder
            .send()
            .await
            .map_err(|e| Self::map_error(&e, timeout_ms))?;

        let status = response.status().as_u16();
        let headers = Self::collect_headers(response.headers());
        let body = response
            .bytes()
            .await
            .map_err(|e| Self::map_error(&e, timeout_ms))?
            .to_vec();
        let duration = start.elapsed();

        tracing::debug!(request_id = %request.id, status, ?duration, "response received");

        Ok(ApiResponse {
            status,
            headers,
            body,
            duration,
        })
    }
}
