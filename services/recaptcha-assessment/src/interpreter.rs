//! Turns an assessment into a valid/invalid verdict.

use crate::assessment::{AssessmentResult, InvalidReason};
use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt;

/// Generic troubleshooting hints printed for every invalid token.
///
/// These do not depend on the reported reason.
pub const POSSIBLE_REASONS: [&str; 4] = [
    "The token has expired (tokens are typically valid for 2 minutes)",
    "The site key is not properly configured for the domain",
    "The reCAPTCHA Enterprise API may not be properly enabled",
    "The service account may not have proper permissions",
];

/// Outcome of an assessment.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// The token is valid
    Valid {
        /// Risk score, 0.0 to 1.0
        score: f64,
        /// Action the token was executed with
        action: String,
        /// Page hostname
        hostname: String,
        /// When the token was generated
        create_time: Option<DateTime<Utc>>,
    },
    /// The token is invalid
    Invalid {
        /// Reason reported by the API, if any
        reason: Option<InvalidReason>,
    },
}

impl Verdict {
    /// Whether the token was valid.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }

    /// Hints to show alongside the verdict.
    #[must_use]
    pub const fn hints(&self) -> &'static [&'static str] {
        match self {
            Self::Valid { .. } => &[],
            Self::Invalid { .. } => &POSSIBLE_REASONS,
        }
    }
}

/// Classify an assessment.
#[must_use]
pub fn classify(result: &AssessmentResult) -> Verdict {
    match &result.token_properties {
        Some(props) if props.valid => Verdict::Valid {
            score: result.risk_analysis.as_ref().map_or(0.0, |r| r.score),
            action: props.action.clone(),
            hostname: props.hostname.clone(),
            create_time: props.create_time,
        },
        Some(props) => Verdict::Invalid {
            reason: props.invalid_reason.clone(),
        },
        None => Verdict::Invalid { reason: None },
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid {
                score,
                action,
                hostname,
                create_time,
            } => {
                writeln!(f, "✅ Token is valid!")?;
                writeln!(f, "Score: {score}")?;
                writeln!(f, "Action: {action}")?;
                writeln!(f, "Hostname: {hostname}")?;
                match create_time {
                    Some(t) => writeln!(
                        f,
                        "Create Time: {}",
                        t.to_rfc3339_opts(SecondsFormat::AutoSi, true)
                    ),
                    None => writeln!(f, "Create Time: unknown"),
                }
            }
            Self::Invalid { reason } => {
                writeln!(f, "❌ Token is invalid!")?;
                match reason {
                    Some(r) => writeln!(f, "Invalid reason: {r}")?,
                    None => writeln!(f, "Invalid reason: not reported")?,
                }
                writeln!(f)?;
                writeln!(f, "Possible reasons for this error:")?;
                for (i, hint) in self.hints().iter().enumerate() {
                    writeln!(f, "{}. {hint}", i + 1)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> AssessmentResult {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_valid_token() {
        let verdict = classify(&parse(json!({
            "tokenProperties": {
                "valid": true,
                "action": "login",
                "hostname": "example.com",
                "createTime": "2024-01-01T00:00:00Z"
            },
            "riskAnalysis": { "score": 0.9 }
        })));

        match &verdict {
            Verdict::Valid {
                score,
                action,
                hostname,
                create_time,
            } => {
                assert!((score - 0.9).abs() < f64::EPSILON);
                assert_eq!(action, "login");
                assert_eq!(hostname, "example.com");
                assert_eq!(
                    create_time.map(|t| t.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
                    Some("2024-01-01T00:00:00Z".to_string())
                );
            }
            Verdict::Invalid { .. } => panic!("expected a valid verdict"),
        }

        let report = verdict.to_string();
        assert!(report.contains("Score: 0.9"));
        assert!(report.contains("Hostname: example.com"));
        assert!(report.contains("Create Time: 2024-01-01T00:00:00Z"));
        assert!(verdict.hints().is_empty());
    }

    #[test]
    fn test_expired_token() {
        let verdict = classify(&parse(json!({
            "tokenProperties": { "valid": false, "invalidReason": "EXPIRED" }
        })));

        assert_eq!(
            verdict,
            Verdict::Invalid {
                reason: Some(InvalidReason::Expired)
            }
        );

        let report = verdict.to_string();
        assert!(report.contains("Invalid reason: EXPIRED"));
        for hint in POSSIBLE_REASONS {
            assert!(report.contains(hint), "missing hint: {hint}");
        }
        assert!(report.contains("4. The service account may not have proper permissions"));
    }

    #[test]
    fn test_missing_token_properties_is_invalid() {
        let verdict = classify(&parse(json!({ "riskAnalysis": { "score": 0.9 } })));
        assert_eq!(verdict, Verdict::Invalid { reason: None });
        assert!(verdict.to_string().contains("Invalid reason: not reported"));
    }

    #[test]
    fn test_valid_without_risk_analysis_scores_zero() {
        let verdict = classify(&parse(json!({ "tokenProperties": { "valid": true } })));
        assert!(verdict.is_valid());
        assert!(verdict.to_string().contains("Score: 0"));
        assert!(verdict.to_string().contains("Create Time: unknown"));
    }
}
