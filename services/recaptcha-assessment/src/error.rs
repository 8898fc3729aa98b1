//! Error types using thiserror 2.0.
//!
//! Credential failures and assessment API failures live in separate enums so
//! callers can tell which leg of the flow broke. Both fold into
//! [`RecaptchaError`], which is what the client and driver return.

use thiserror::Error;

/// Credential provider errors.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Service account key file does not exist
    #[error("Credential file not found: {path}")]
    CredentialsNotFound {
        /// Path that was looked up
        path: String,
    },

    /// Service account key file exists but could not be read
    #[error("Failed to read credential file {path}: {reason}")]
    CredentialsUnreadable {
        /// Path that was read
        path: String,
        /// Underlying I/O message
        reason: String,
    },

    /// Key file is not a usable service account key
    #[error("Malformed service account key: {0}")]
    MalformedKey(String),

    /// JWT assertion could not be signed
    #[error("Failed to sign token assertion: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    /// Token endpoint answered with a non-2xx status
    #[error("Token exchange rejected with status {status}: {body}")]
    ExchangeRejected {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// Token endpoint could not be reached or returned garbage
    #[error("Token exchange failed: {0}")]
    Exchange(String),
}

impl AuthError {
    /// Create a malformed key error.
    #[must_use]
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedKey(msg.into())
    }

    /// Create a token exchange error.
    #[must_use]
    pub fn exchange(msg: impl Into<String>) -> Self {
        Self::Exchange(msg.into())
    }
}

/// Assessment API errors.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Server responded with a non-2xx status
    #[error("Assessment API returned status {status}: {body}")]
    HttpStatus {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// Request was sent but no response arrived
    #[error("No response received from server: {0}")]
    NoResponse(String),

    /// Request could not be built or serialized
    #[error("Request setup failed: {0}")]
    RequestSetup(String),

    /// Server answered 2xx with a body that is not an assessment
    #[error("Invalid assessment response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Create an HTTP status error.
    #[must_use]
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a no-response error.
    #[must_use]
    pub fn no_response(msg: impl Into<String>) -> Self {
        Self::NoResponse(msg.into())
    }

    /// Create a request setup error.
    #[must_use]
    pub fn request_setup(msg: impl Into<String>) -> Self {
        Self::RequestSetup(msg.into())
    }

    /// HTTP status carried by the error, if the server answered.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Crate-level error.
#[derive(Error, Debug)]
pub enum RecaptchaError {
    /// Credential provider failed
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Assessment API call failed
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input channel could not be read
    #[error("Failed to read input: {0}")]
    Input(#[from] std::io::Error),
}

/// Result type for assessment operations.
pub type RecaptchaResult<T> = Result<T, RecaptchaError>;

impl RecaptchaError {
    /// Create a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Stable code for structured logs.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Auth(_) => "AUTH_ERROR",
            Self::Api(ApiError::HttpStatus { .. }) => "API_HTTP_STATUS",
            Self::Api(ApiError::NoResponse(_)) => "API_NO_RESPONSE",
            Self::Api(ApiError::RequestSetup(_)) => "API_REQUEST_SETUP",
            Self::Api(ApiError::InvalidResponse(_)) => "API_INVALID_RESPONSE",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Input(_) => "INPUT_ERROR",
        }
    }
}
