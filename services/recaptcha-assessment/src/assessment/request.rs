//! `assessments.create` request body.

use crate::error::ApiError;
use serde::Serialize;

/// Action the widget is expected to have been executed with.
pub const EXPECTED_ACTION: &str = "login";

/// Number of characters of the user token shown in diagnostics.
pub const TOKEN_PREFIX_CHARS: usize = 20;

/// Request body: `{"event": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationRequest {
    event: Event,
}

/// Event being assessed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    token: String,
    site_key: String,
    expected_action: String,
}

impl VerificationRequest {
    /// Build a request for `token` against `site_key`.
    #[must_use]
    pub fn new(token: impl Into<String>, site_key: impl Into<String>) -> Self {
        Self {
            event: Event {
                token: token.into(),
                site_key: site_key.into(),
                expected_action: EXPECTED_ACTION.to_string(),
            },
        }
    }

    /// Serialize to the wire body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::RequestSetup`] if serialization fails.
    pub fn to_body(&self) -> Result<Vec<u8>, ApiError> {
        serde_json::to_vec(self).map_err(|e| ApiError::request_setup(e.to_string()))
    }

    /// Pretty JSON for diagnostics.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::RequestSetup`] if serialization fails.
    pub fn to_pretty(&self) -> Result<String, ApiError> {
        serde_json::to_string_pretty(self).map_err(|e| ApiError::request_setup(e.to_string()))
    }
}

/// First [`TOKEN_PREFIX_CHARS`] characters of a token.
#[must_use]
pub fn token_prefix(token: &str) -> &str {
    token
        .char_indices()
        .nth(TOKEN_PREFIX_CHARS)
        .map_or(token, |(idx, _)| &token[..idx])
}
