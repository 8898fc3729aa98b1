//! Credential provider.
//!
//! The assessment client asks a [`TokenSource`] for a bearer token right
//! before each call. Production uses [`ServiceAccountTokenSource`], which runs
//! the OAuth2 JWT-bearer flow with a service account key.

mod service_account;

pub use service_account::{ServiceAccountKey, ServiceAccountTokenSource};

use crate::error::AuthError;
use chrono::{DateTime, Utc};
use secrecy::SecretString;
use std::future::Future;

/// Scope granting access to Google Cloud platform APIs.
pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

/// Short-lived bearer token. The value never appears in `Debug` output.
#[derive(Debug)]
pub struct AccessToken {
    value: SecretString,
    expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    /// Create a token without a known expiry.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: SecretString::from(value.into()),
            expires_at: None,
        }
    }

    /// Attach the expiry reported by the identity provider.
    #[must_use]
    pub const fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Secret token value.
    #[must_use]
    pub const fn secret(&self) -> &SecretString {
        &self.value
    }

    /// Expiry, if the provider reported one.
    #[must_use]
    pub const fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }
}

/// Produces bearer tokens on demand.
pub trait TokenSource: Send + Sync {
    /// Fetch a fresh access token.
    fn access_token(&self) -> impl Future<Output = Result<AccessToken, AuthError>> + Send;
}
