//! HTTP client configuration and the `HttpPoster` seam.
//!
//! The assessment client never touches reqwest directly. It hands a JSON body
//! and a bearer token to an [`HttpPoster`] and gets back a [`RawResponse`],
//! which keeps the client testable without a live network.

use crate::error::ApiError;
use reqwest::{Client, ClientBuilder, header};
use secrecy::{ExposeSecret, SecretString};
use std::future::Future;
use std::time::Duration;

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Request timeout (default: 30s)
    pub timeout: Duration,
    /// Connection timeout (default: 10s)
    pub connect_timeout: Duration,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: concat!("recaptcha-assessment/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl HttpConfig {
    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the connect timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Build a configured HTTP client with rustls TLS.
///
/// # Errors
///
/// Returns an error if the client cannot be built (e.g., TLS initialization fails).
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    ClientBuilder::new()
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .user_agent(&config.user_agent)
        .use_rustls_tls()
        .build()
}

/// Status and body of an HTTP response, before any interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as text
    pub body: String,
}

impl RawResponse {
    /// Whether the status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Sends an authenticated JSON POST.
pub trait HttpPoster: Send + Sync {
    /// POST `body` (already-serialized JSON) to `url` with a bearer token.
    fn post_json(
        &self,
        url: &str,
        bearer: &SecretString,
        body: Vec<u8>,
    ) -> impl Future<Output = Result<RawResponse, ApiError>> + Send;
}

/// [`HttpPoster`] backed by a reqwest client.
#[derive(Debug, Clone)]
pub struct ReqwestPoster {
    http: Client,
}

impl ReqwestPoster {
    /// Wrap an existing client.
    #[must_use]
    pub const fn new(http: Client) -> Self {
        Self { http }
    }
}

impl HttpPoster for ReqwestPoster {
    async fn post_json(
        &self,
        url: &str,
        bearer: &SecretString,
        body: Vec<u8>,
    ) -> Result<RawResponse, ApiError> {
        let response = self
            .http
            .post(url)
            .bearer_auth(bearer.expose_secret())
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(classify_send_error)?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::no_response(format!("failed to read response body: {e}")))?;

        Ok(RawResponse { status, body })
    }
}

/// Builder errors never reached the wire; everything else did.
fn classify_send_error(err: reqwest::Error) -> ApiError {
    if err.is_builder() {
        ApiError::request_setup(err.to_string())
    } else {
        ApiError::no_response(err.to_string())
    }
}
