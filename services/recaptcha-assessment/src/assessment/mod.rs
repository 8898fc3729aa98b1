//! reCAPTCHA Enterprise `assessments.create`.

pub mod client;
pub mod request;
pub mod response;

pub use client::AssessmentClient;
pub use request::{EXPECTED_ACTION, VerificationRequest};
pub use response::{AssessmentResult, InvalidReason, RiskAnalysis, TokenProperties};
