//! Centralized configuration.
//!
//! Everything is read from environment variables (a `.env` file is honoured)
//! and validated once at startup. The lookup function is injectable so tests
//! never have to mutate the process environment.

use crate::error::{RecaptchaError, RecaptchaResult};
use crate::http::HttpConfig;
use crate::telemetry::{LogFormat, TracingConfig};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Production endpoint of the reCAPTCHA Enterprise API.
pub const DEFAULT_API_URL: &str = "https://recaptchaenterprise.googleapis.com";

/// Key file used when `GOOGLE_APPLICATION_CREDENTIALS` is unset.
pub const DEFAULT_CREDENTIALS_PATH: &str = "./service-account-key.json";

/// Settings the assessment client is constructed with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssessmentConfig {
    /// Google Cloud project that owns the reCAPTCHA key
    pub project_id: String,
    /// reCAPTCHA site key
    pub site_key: String,
    /// API base URL, without a trailing slash
    pub api_url: String,
}

impl AssessmentConfig {
    /// Create a configuration pointing at the production API.
    #[must_use]
    pub fn new(project_id: impl Into<String>, site_key: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            site_key: site_key.into(),
            api_url: DEFAULT_API_URL.to_string(),
        }
    }

    /// Point the client at a different API base URL.
    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Full URL of the `assessments.create` endpoint.
    #[must_use]
    pub fn assessment_url(&self) -> String {
        format!("{}/v1/projects/{}/assessments", self.api_url, self.project_id)
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Assessment client settings
    pub assessment: AssessmentConfig,
    /// Path to the service account JSON key
    pub credentials_path: PathBuf,
    /// HTTP client settings
    pub http: HttpConfig,
    /// Logging settings
    pub tracing: TracingConfig,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required variables are missing or invalid.
    pub fn from_env() -> RecaptchaResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if required variables are missing or invalid.
    pub fn from_lookup<F>(lookup: F) -> RecaptchaResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let project_id = required(&lookup, "RECAPTCHA_PROJECT_ID")?;
        let site_key = required(&lookup, "RECAPTCHA_SITE_KEY")?;

        let api_url = lookup("RECAPTCHA_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let parsed = Url::parse(&api_url)
            .map_err(|e| RecaptchaError::config(format!("Invalid RECAPTCHA_API_URL: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(RecaptchaError::config(format!(
                "RECAPTCHA_API_URL must be http(s), got {}",
                parsed.scheme()
            )));
        }

        let credentials_path = lookup("GOOGLE_APPLICATION_CREDENTIALS")
            .filter(|v| !v.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_CREDENTIALS_PATH), PathBuf::from);

        let http = HttpConfig::default()
            .with_timeout(Duration::from_secs(parse_var(&lookup, "HTTP_TIMEOUT_SECS", 30)?))
            .with_connect_timeout(Duration::from_secs(parse_var(
                &lookup,
                "HTTP_CONNECT_TIMEOUT_SECS",
                10,
            )?));

        let tracing = TracingConfig::default()
            .with_log_level(lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()))
            .with_format(lookup("LOG_FORMAT").map_or(LogFormat::Text, |f| LogFormat::parse(&f)));

        Ok(Self {
            assessment: AssessmentConfig::new(project_id, site_key).with_api_url(api_url),
            credentials_path,
            http,
            tracing,
        })
    }
}

fn required<F>(lookup: &F, name: &str) -> RecaptchaResult<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| RecaptchaError::config(format!("Missing required variable {name}")))
}

/// Parse a variable, falling back to `default` when unset.
fn parse_var<F, T>(lookup: &F, name: &str, default: T) -> RecaptchaResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(val) => val
            .trim()
            .parse()
            .map_err(|e| RecaptchaError::config(format!("Invalid {name}: {e}"))),
        None => Ok(default),
    }
}
