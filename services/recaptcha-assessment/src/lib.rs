//! reCAPTCHA Enterprise assessment client.
//!
//! Exchanges a client-side reCAPTCHA token for a risk assessment, using a
//! service account for authentication, and classifies the result.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod assessment;
pub mod auth;
pub mod config;
pub mod driver;
pub mod error;
pub mod http;
pub mod interpreter;
pub mod telemetry;

// Re-exports for convenience
pub use assessment::{AssessmentClient, AssessmentResult, VerificationRequest};
pub use auth::{AccessToken, ServiceAccountTokenSource, TokenSource};
pub use config::{AssessmentConfig, Config};
pub use driver::{Driver, DriverState, LineInput, RunOutcome};
pub use error::{ApiError, AuthError, RecaptchaError, RecaptchaResult};
pub use http::{HttpConfig, HttpPoster, ReqwestPoster, build_http_client};
pub use interpreter::{Verdict, classify};
