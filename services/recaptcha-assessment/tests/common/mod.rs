//! Shared helpers for integration tests.

#![allow(dead_code)]

use recaptcha_assessment::{AccessToken, AuthError, TokenSource};
use serde_json::{Value, json};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::subscriber::DefaultGuard;
use uuid::Uuid;

pub const PROJECT_ID: &str = "my-project";
pub const SITE_KEY: &str = "6LcTestSiteKey";
pub const CLIENT_EMAIL: &str = "verifier@my-project.iam.gserviceaccount.com";

pub const TEST_PRIVATE_KEY: &str = include_str!("../fixtures/test_key.pem");
pub const TEST_PUBLIC_KEY: &str = include_str!("../fixtures/test_key.pub.pem");

/// Token source handing out a fixed bearer token.
pub struct StaticTokenSource(&'static str);

impl StaticTokenSource {
    pub const fn new(token: &'static str) -> Self {
        Self(token)
    }
}

impl TokenSource for StaticTokenSource {
    async fn access_token(&self) -> Result<AccessToken, AuthError> {
        Ok(AccessToken::new(self.0))
    }
}

pub fn assessment_path() -> String {
    format!("/v1/projects/{PROJECT_ID}/assessments")
}

pub fn valid_assessment() -> Value {
    json!({
        "name": "projects/123456/assessments/abcdef",
        "tokenProperties": {
            "valid": true,
            "action": "login",
            "hostname": "example.com",
            "createTime": "2024-01-01T00:00:00Z"
        },
        "riskAnalysis": { "score": 0.9 }
    })
}

pub fn expired_assessment() -> Value {
    json!({
        "tokenProperties": { "valid": false, "invalidReason": "EXPIRED" }
    })
}

/// Service account key file written to the temp dir, removed on drop.
pub struct KeyFile {
    path: PathBuf,
}

impl KeyFile {
    pub fn write(token_uri: &str) -> Self {
        let path = std::env::temp_dir().join(format!("sa-key-{}.json", Uuid::new_v4()));
        let key = json!({
            "type": "service_account",
            "project_id": PROJECT_ID,
            "private_key_id": "test-key-id",
            "private_key": TEST_PRIVATE_KEY,
            "client_email": CLIENT_EMAIL,
            "token_uri": token_uri,
        });
        std::fs::write(&path, key.to_string()).unwrap();
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for KeyFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

pub fn missing_key_path() -> PathBuf {
    std::env::temp_dir().join(format!("does-not-exist-{}.json", Uuid::new_v4()))
}

/// In-memory sink for formatted log lines.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Capture logs emitted on the current thread until the guard is dropped.
pub fn capture_logs() -> (LogBuffer, DefaultGuard) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (buffer, guard)
}
