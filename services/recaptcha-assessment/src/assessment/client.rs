//! Assessment client: one authenticated `assessments.create` call.

use super::request::{VerificationRequest, token_prefix};
use super::response::AssessmentResult;
use crate::auth::TokenSource;
use crate::config::AssessmentConfig;
use crate::error::{ApiError, RecaptchaResult};
use crate::http::HttpPoster;
use tracing::{error, info, instrument};

/// Verifies reCAPTCHA tokens against the Enterprise API.
pub struct AssessmentClient<T, P> {
    config: AssessmentConfig,
    tokens: T,
    poster: P,
}

impl<T, P> AssessmentClient<T, P>
where
    T: TokenSource,
    P: HttpPoster,
{
    /// Create a client.
    #[must_use]
    pub const fn new(config: AssessmentConfig, tokens: T, poster: P) -> Self {
        Self {
            config,
            tokens,
            poster,
        }
    }

    /// Configuration the client was built with.
    #[must_use]
    pub const fn config(&self) -> &AssessmentConfig {
        &self.config
    }

    /// Assess a single user token.
    ///
    /// Fetches a fresh access token, posts the verification request and
    /// decodes the response. Failures are logged here and returned as-is;
    /// nothing is retried.
    ///
    /// # Errors
    ///
    /// Returns an auth error if no access token could be obtained, otherwise
    /// an [`ApiError`] describing how the call failed.
    #[instrument(skip(self, token), fields(project_id = %self.config.project_id))]
    pub async fn verify(&self, token: &str) -> RecaptchaResult<AssessmentResult> {
        info!(length = token.chars().count(), "Token length in characters");
        info!(prefix = %token_prefix(token), "Token prefix");

        let access_token = self.tokens.access_token().await.inspect_err(|e| {
            error!(error = %e, "Error verifying reCAPTCHA token: could not obtain access token");
        })?;
        info!("Successfully obtained access token");

        let request = VerificationRequest::new(token, self.config.site_key.as_str());
        let body = request.to_body().inspect_err(log_api_error)?;
        let echo = request.to_pretty().inspect_err(log_api_error)?;
        info!(request = %echo, "Sending request to reCAPTCHA API");

        let response = self
            .poster
            .post_json(&self.config.assessment_url(), access_token.secret(), body)
            .await
            .inspect_err(log_api_error)?;

        if !response.is_success() {
            let err = ApiError::http_status(response.status, response.body);
            log_api_error(&err);
            return Err(err.into());
        }

        let result = AssessmentResult::from_body(&response.body)
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
            .inspect_err(log_api_error)?;

        Ok(result)
    }
}

fn log_api_error(err: &ApiError) {
    match err {
        ApiError::HttpStatus { status, body } => {
            error!(status, body = %pretty_body(body), "Error verifying reCAPTCHA token: server responded with an error status");
        }
        ApiError::NoResponse(reason) => {
            error!(%reason, "Error verifying reCAPTCHA token: no response received from server");
        }
        ApiError::RequestSetup(reason) => {
            error!(%reason, "Error verifying reCAPTCHA token: request could not be set up");
        }
        ApiError::InvalidResponse(reason) => {
            error!(%reason, "Error verifying reCAPTCHA token: response is not an assessment");
        }
    }
}

/// Pretty-print JSON bodies; anything else is returned verbatim.
fn pretty_body(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| serde_json::to_string_pretty(&v).ok())
        .unwrap_or_else(|| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AccessToken;
    use crate::error::{AuthError, RecaptchaError};
    use crate::http::RawResponse;
    use secrecy::{ExposeSecret, SecretString};
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Debug, Clone)]
    struct Captured {
        url: String,
        bearer: String,
        body: serde_json::Value,
    }

    /// Poster that records calls and replays a canned outcome.
    struct FakePoster {
        outcome: fn() -> Result<RawResponse, ApiError>,
        calls: Mutex<Vec<Captured>>,
    }

    impl FakePoster {
        fn new(outcome: fn() -> Result<RawResponse, ApiError>) -> Self {
            Self {
                outcome,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<Captured> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl HttpPoster for FakePoster {
        async fn post_json(
            &self,
            url: &str,
            bearer: &SecretString,
            body: Vec<u8>,
        ) -> Result<RawResponse, ApiError> {
            self.calls.lock().unwrap().push(Captured {
                url: url.to_string(),
                bearer: bearer.expose_secret().to_string(),
                body: serde_json::from_slice(&body).unwrap(),
            });
            (self.outcome)()
        }
    }

    struct StaticTokenSource(&'static str);

    impl StaticTokenSource {
        const fn new(token: &'static str) -> Self {
            Self(token)
        }
    }

    impl TokenSource for StaticTokenSource {
        async fn access_token(&self) -> Result<AccessToken, AuthError> {
            Ok(AccessToken::new(self.0))
        }
    }

    struct FailingTokens;

    impl TokenSource for FailingTokens {
        async fn access_token(&self) -> Result<AccessToken, AuthError> {
            Err(AuthError::CredentialsNotFound {
                path: "./service-account-key.json".to_string(),
            })
        }
    }

    fn valid_response() -> Result<RawResponse, ApiError> {
        Ok(RawResponse {
            status: 200,
            body: json!({
                "tokenProperties": {
                    "valid": true,
                    "action": "login",
                    "hostname": "example.com",
                    "createTime": "2024-01-01T00:00:00Z"
                },
                "riskAnalysis": { "score": 0.9 }
            })
            .to_string(),
        })
    }

    fn config() -> AssessmentConfig {
        AssessmentConfig::new("my-project", "6LcSiteKey")
    }

    #[tokio::test]
    async fn test_verify_sends_bearer_and_body() {
        let client = AssessmentClient::new(
            config(),
            StaticTokenSource::new("ACCESS123"),
            FakePoster::new(valid_response),
        );

        let result = client.verify("user-token").await.unwrap();
        assert!(result.token_properties.unwrap().valid);

        let calls = client.poster.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].bearer, "ACCESS123");
        assert_eq!(
            calls[0].url,
            "https://recaptchaenterprise.googleapis.com/v1/projects/my-project/assessments"
        );
        assert_eq!(
            calls[0].body,
            json!({ "event": { "token": "user-token", "siteKey": "6LcSiteKey", "expectedAction": "login" } })
        );
    }

    #[tokio::test]
    async fn test_non_success_status_is_http_status_error() {
        let client = AssessmentClient::new(
            config(),
            StaticTokenSource::new("ACCESS123"),
            FakePoster::new(|| {
                Ok(RawResponse {
                    status: 403,
                    body: r#"{"error":"PERMISSION_DENIED"}"#.to_string(),
                })
            }),
        );

        let err = client.verify("user-token").await.unwrap_err();
        match err {
            RecaptchaError::Api(ApiError::HttpStatus { status, body }) => {
                assert_eq!(status, 403);
                assert_eq!(body, r#"{"error":"PERMISSION_DENIED"}"#);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_transport_errors_pass_through() {
        let client = AssessmentClient::new(
            config(),
            StaticTokenSource::new("ACCESS123"),
            FakePoster::new(|| Err(ApiError::no_response("connection reset"))),
        );

        let err = client.verify("user-token").await.unwrap_err();
        assert!(matches!(err, RecaptchaError::Api(ApiError::NoResponse(_))));
    }

    #[tokio::test]
    async fn test_garbage_body_is_invalid_response() {
        let client = AssessmentClient::new(
            config(),
            StaticTokenSource::new("ACCESS123"),
            FakePoster::new(|| {
                Ok(RawResponse {
                    status: 200,
                    body: "<html>oops</html>".to_string(),
                })
            }),
        );

        let err = client.verify("user-token").await.unwrap_err();
        assert!(matches!(err, RecaptchaError::Api(ApiError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_auth_failure_skips_http_call() {
        let client = AssessmentClient::new(config(), FailingTokens, FakePoster::new(valid_response));

        let err = client.verify("user-token").await.unwrap_err();
        assert!(matches!(err, RecaptchaError::Auth(AuthError::CredentialsNotFound { .. })));
        assert!(client.poster.calls().is_empty());
    }

    #[test]
    fn test_pretty_body() {
        assert_eq!(pretty_body("plain text"), "plain text");
        assert_eq!(pretty_body(r#"{"a":1}"#), "{\n  \"a\": 1\n}");
    }
}
