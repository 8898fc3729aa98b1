//! Interactive driver: one prompt, one assessment, one report.
//!
//! State machine:
//!
//! ```text
//! Idle -> AwaitingInput -> Verifying -> Reporting -> Closed
//!                |              |
//!                +--> Failed <--+-----------------> Closed
//! ```
//!
//! The input channel is wrapped in a [`ScopedInput`] so it is closed exactly
//! once on every path, including early returns and panics.

use crate::assessment::AssessmentClient;
use crate::auth::TokenSource;
use crate::error::RecaptchaError;
use crate::http::HttpPoster;
use crate::interpreter::{Verdict, classify};
use std::future::Future;
use std::io::{self, Write};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Prompt shown before reading the token.
pub const PROMPT: &str = "Paste the reCAPTCHA token from your test page: ";

/// Source of the user token.
pub trait InputChannel {
    /// Read one token. Trailing line terminators are stripped.
    ///
    /// # Errors
    ///
    /// Returns an error if the channel cannot be read or is closed.
    fn read_token(&mut self) -> impl Future<Output = io::Result<String>>;

    /// Release the channel.
    fn close(&mut self);
}

/// [`InputChannel`] reading a single line from an async buffered reader.
#[derive(Debug)]
pub struct LineInput<R> {
    reader: Option<R>,
}

impl<R: AsyncBufRead + Unpin> LineInput<R> {
    /// Wrap a reader.
    #[must_use]
    pub const fn new(reader: R) -> Self {
        Self {
            reader: Some(reader),
        }
    }

    /// Whether the reader has been released.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.reader.is_none()
    }
}

impl<R: AsyncBufRead + Unpin> InputChannel for LineInput<R> {
    async fn read_token(&mut self) -> io::Result<String> {
        let reader = self
            .reader
            .as_mut()
            .ok_or_else(|| io::Error::other("input channel is closed"))?;

        let mut line = String::new();
        reader.read_line(&mut line).await?;
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn close(&mut self) {
        self.reader = None;
    }
}

/// Closes the wrapped channel exactly once, on drop at the latest.
pub struct ScopedInput<I: InputChannel> {
    inner: I,
    closed: bool,
}

impl<I: InputChannel> ScopedInput<I> {
    /// Take ownership of a channel.
    pub const fn new(inner: I) -> Self {
        Self {
            inner,
            closed: false,
        }
    }

    /// Read one token from the channel.
    ///
    /// # Errors
    ///
    /// Returns an error if the channel cannot be read.
    pub async fn read_token(&mut self) -> io::Result<String> {
        self.inner.read_token().await
    }

    /// Close the channel. Later calls are no-ops.
    pub fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.inner.close();
        }
    }
}

impl<I: InputChannel> Drop for ScopedInput<I> {
    fn drop(&mut self) {
        self.close();
    }
}

/// Driver lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// Not started
    Idle,
    /// Waiting for the token
    AwaitingInput,
    /// Assessment in flight
    Verifying,
    /// Printing results
    Reporting,
    /// Something went wrong
    Failed,
    /// Input released; terminal
    Closed,
}

/// How a run ended.
#[derive(Debug)]
pub enum RunOutcome {
    /// The assessment came back and was classified
    Reported(Verdict),
    /// Input, auth or API failure
    Failed(RecaptchaError),
}

impl RunOutcome {
    /// Verdict, if one was produced.
    #[must_use]
    pub const fn verdict(&self) -> Option<&Verdict> {
        match self {
            Self::Reported(v) => Some(v),
            Self::Failed(_) => None,
        }
    }
}

/// Runs one prompt/verify/report cycle.
pub struct Driver<'a, T, P> {
    client: &'a AssessmentClient<T, P>,
    state: DriverState,
    history: Vec<DriverState>,
}

impl<'a, T, P> Driver<'a, T, P>
where
    T: TokenSource,
    P: HttpPoster,
{
    /// Create an idle driver.
    #[must_use]
    pub fn new(client: &'a AssessmentClient<T, P>) -> Self {
        Self {
            client,
            state: DriverState::Idle,
            history: vec![DriverState::Idle],
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> DriverState {
        self.state
    }

    /// Every state visited so far, in order.
    #[must_use]
    pub fn history(&self) -> &[DriverState] {
        &self.history
    }

    /// Prompt on `out`, read a token from `input`, verify it and print the
    /// report. The driver always ends in [`DriverState::Closed`].
    #[instrument(skip_all, fields(correlation_id = %Uuid::new_v4()))]
    pub async fn run<I, W>(&mut self, input: I, out: &mut W) -> RunOutcome
    where
        I: InputChannel,
        W: Write,
    {
        let mut input = ScopedInput::new(input);
        let outcome = self.cycle(&mut input, out).await;

        input.close();
        self.transition(DriverState::Closed);
        outcome
    }

    async fn cycle<I, W>(&mut self, input: &mut ScopedInput<I>, out: &mut W) -> RunOutcome
    where
        I: InputChannel,
        W: Write,
    {
        self.transition(DriverState::AwaitingInput);
        emit(out, format_args!("{PROMPT}"));

        let token = match input.read_token().await {
            Ok(token) => token,
            Err(e) => return self.fail(e.into(), out),
        };

        self.transition(DriverState::Verifying);
        emit(out, format_args!("Verifying reCAPTCHA token...\n"));

        match self.client.verify(&token).await {
            Ok(result) => {
                self.transition(DriverState::Reporting);
                let verdict = classify(&result);
                info!(valid = verdict.is_valid(), "Assessment classified");

                let pretty = result
                    .to_pretty()
                    .unwrap_or_else(|e| format!("<unprintable assessment: {e}>"));
                emit(out, format_args!("\n--- Assessment Results ---\n{pretty}\n"));
                emit(out, format_args!("\n{verdict}"));

                RunOutcome::Reported(verdict)
            }
            Err(e) => self.fail(e, out),
        }
    }

    fn fail<W: Write>(&mut self, err: RecaptchaError, out: &mut W) -> RunOutcome {
        self.transition(DriverState::Failed);
        error!(error_code = err.code(), error = %err, "Test failed");
        emit(out, format_args!("Test failed: {err}\n"));
        RunOutcome::Failed(err)
    }

    fn transition(&mut self, next: DriverState) {
        debug!(from = ?self.state, to = ?next, "Driver state change");
        self.state = next;
        self.history.push(next);
    }
}

fn emit<W: Write>(out: &mut W, args: std::fmt::Arguments<'_>) {
    if let Err(e) = out.write_fmt(args).and_then(|()| out.flush()) {
        warn!(error = %e, "Failed to write to console");
    }
}
