//! `assessments.create` response body.
//!
//! The API speaks proto3 JSON, which omits fields holding their default
//! value: a missing `valid` means `false`, a missing `score` means `0.0`.
//! The decoded body is kept next to the typed view so the response can be
//! echoed exactly as the server sent it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Assessment returned by the API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentResult {
    /// Resource name, `projects/{project}/assessments/{id}`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Token validity details
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_properties: Option<TokenProperties>,
    /// Risk score
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_analysis: Option<RiskAnalysis>,
    /// Remaining fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    /// Body as received, `Null` when built in code
    #[serde(skip)]
    pub raw: Value,
}

impl AssessmentResult {
    /// Decode a response body, keeping the untouched JSON in [`Self::raw`].
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not JSON or not an assessment.
    pub fn from_body(body: &str) -> Result<Self, serde_json::Error> {
        let raw: Value = serde_json::from_str(body)?;
        let mut result = Self::deserialize(&raw)?;
        result.raw = raw;
        Ok(result)
    }

    /// Pretty-printed assessment. Uses the received body when there is one.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_pretty(&self) -> Result<String, serde_json::Error> {
        if self.raw.is_null() {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string_pretty(&self.raw)
        }
    }
}

/// `tokenProperties` block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenProperties {
    /// Whether the token is valid
    #[serde(default)]
    pub valid: bool,
    /// Why the token is invalid
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invalid_reason: Option<InvalidReason>,
    /// Action the token was executed with
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub action: String,
    /// Hostname of the page that generated the token
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub hostname: String,
    /// When the token was generated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,
    /// Remaining fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `riskAnalysis` block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAnalysis {
    /// 0.0 (likely bot) to 1.0 (likely human)
    #[serde(default)]
    pub score: f64,
    /// Reason codes behind the score
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reasons: Vec<String>,
    /// Remaining fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `tokenProperties.invalidReason`.
///
/// Unknown values are kept as [`InvalidReason::Other`] rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InvalidReason {
    /// Default value
    Unspecified,
    /// Unknown reason
    Unknown,
    /// Token was malformed
    Malformed,
    /// Token expired
    Expired,
    /// Token was already assessed
    Dupe,
    /// Token was issued for a different site
    SiteMismatch,
    /// Token was empty
    Missing,
    /// Client-side error in the browser
    BrowserError,
    /// Value not known to this crate
    Other(String),
}

impl InvalidReason {
    /// Wire name of the reason.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Unspecified => "INVALID_REASON_UNSPECIFIED",
            Self::Unknown => "UNKNOWN_INVALID_REASON",
            Self::Malformed => "MALFORMED",
            Self::Expired => "EXPIRED",
            Self::Dupe => "DUPE",
            Self::SiteMismatch => "SITE_MISMATCH",
            Self::Missing => "MISSING",
            Self::BrowserError => "BROWSER_ERROR",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for InvalidReason {
    fn from(s: String) -> Self {
        match s.as_str() {
            "INVALID_REASON_UNSPECIFIED" => Self::Unspecified,
            "UNKNOWN_INVALID_REASON" => Self::Unknown,
            "MALFORMED" => Self::Malformed,
            "EXPIRED" => Self::Expired,
            "DUPE" => Self::Dupe,
            "SITE_MISMATCH" => Self::SiteMismatch,
            "MISSING" => Self::Missing,
            "BROWSER_ERROR" => Self::BrowserError,
            _ => Self::Other(s),
        }
    }
}

impl From<InvalidReason> for String {
    fn from(reason: InvalidReason) -> Self {
        match reason {
            InvalidReason::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
