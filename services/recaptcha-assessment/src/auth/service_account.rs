//! Service account JWT-bearer token exchange.

use super::{AccessToken, CLOUD_PLATFORM_SCOPE, TokenSource};
use crate::error::AuthError;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Assertion lifetime; Google rejects anything above one hour.
const ASSERTION_TTL_SECS: i64 = 3600;

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// Fields of a service account JSON key that the exchange needs.
#[derive(Debug, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(rename = "type", default)]
    key_type: Option<String>,
    /// Service account identity
    pub client_email: String,
    private_key: SecretString,
    /// Key ID, sent as `kid` in the assertion header
    #[serde(default)]
    pub private_key_id: Option<String>,
    /// OAuth2 token endpoint
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

impl ServiceAccountKey {
    /// Parse a key from its JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MalformedKey`] if the JSON is invalid or the key is
    /// not a service account key.
    pub fn from_json(raw: &str) -> Result<Self, AuthError> {
        let key: Self = serde_json::from_str(raw).map_err(|e| AuthError::malformed(e.to_string()))?;

        if let Some(kind) = key.key_type.as_deref() {
            if kind != "service_account" {
                return Err(AuthError::malformed(format!(
                    "expected type \"service_account\", got \"{kind}\""
                )));
            }
        }
        if key.client_email.trim().is_empty() {
            return Err(AuthError::malformed("client_email is empty"));
        }

        Ok(key)
    }

    /// Read and parse a key file.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::CredentialsNotFound`] if the file does not exist,
    /// [`AuthError::CredentialsUnreadable`] for other I/O failures and
    /// [`AuthError::MalformedKey`] if the content is not a usable key.
    pub async fn load(path: &Path) -> Result<Self, AuthError> {
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                AuthError::CredentialsNotFound {
                    path: path.display().to_string(),
                }
            } else {
                AuthError::CredentialsUnreadable {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                }
            }
        })?;

        Self::from_json(&raw)
    }

    /// Sign an RS256 assertion for the given scopes, issued at `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the private key is not a valid RSA PEM or signing fails.
    pub fn assertion(&self, scopes: &[String], now: DateTime<Utc>) -> Result<String, AuthError> {
        let key = EncodingKey::from_rsa_pem(self.private_key.expose_secret().as_bytes())
            .map_err(|e| AuthError::malformed(format!("private_key is not a valid RSA PEM: {e}")))?;

        let mut header = Header::new(Algorithm::RS256);
        header.kid.clone_from(&self.private_key_id);

        let iat = now.timestamp();
        let claims = AssertionClaims {
            iss: &self.client_email,
            scope: scopes.join(" "),
            aud: &self.token_uri,
            iat,
            exp: iat + ASSERTION_TTL_SECS,
        };

        Ok(encode(&header, &claims, &key)?)
    }
}

/// [`TokenSource`] that exchanges a service account key for an access token.
///
/// The key file is read on every call; nothing is cached.
#[derive(Debug, Clone)]
pub struct ServiceAccountTokenSource {
    key_path: PathBuf,
    scopes: Vec<String>,
    http: Client,
}

impl ServiceAccountTokenSource {
    /// Create a source for the cloud-platform scope.
    #[must_use]
    pub fn new(key_path: impl Into<PathBuf>, http: Client) -> Self {
        Self {
            key_path: key_path.into(),
            scopes: vec![CLOUD_PLATFORM_SCOPE.to_string()],
            http,
        }
    }

    async fn exchange(&self, key: &ServiceAccountKey) -> Result<AccessToken, AuthError> {
        let now = Utc::now();
        let assertion = key.assertion(&self.scopes, now)?;

        debug!(client_email = %key.client_email, token_uri = %key.token_uri, "Exchanging service account assertion");

        let response = self
            .http
            .post(&key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| AuthError::exchange(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(rejection(status.as_u16(), response.text().await));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::exchange(format!("invalid token response: {e}")))?;

        let access_token = AccessToken::new(token.access_token);
        Ok(match token.expires_in {
            Some(secs) => access_token.with_expiry(now + ChronoDuration::seconds(secs)),
            None => access_token,
        })
    }
}

/// Rejected exchange. A body that could not be read is reported in its place.
fn rejection<E: std::fmt::Display>(status: u16, body: Result<String, E>) -> AuthError {
    let body = body.unwrap_or_else(|e| format!("<failed to read response body: {e}>"));
    AuthError::ExchangeRejected { status, body }
}

impl TokenSource for ServiceAccountTokenSource {
    #[instrument(skip(self), fields(key_path = %self.key_path.display()))]
    async fn access_token(&self) -> Result<AccessToken, AuthError> {
        let key = ServiceAccountKey::load(&self.key_path).await?;
        self.exchange(&key).await
    }
}
