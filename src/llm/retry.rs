//! Retry-with-backoff around the model call
//!
//! Only quota exhaustion is retried. The wait before the next attempt comes
//! from the error itself when the upstream supplied a hint, otherwise from the
//! `retry_delay { seconds: N` fragment some client libraries print, otherwise
//! from the configured default. Once a wait has begun it cannot be cancelled.

use crate::config::RetryConfig;
use crate::error::{Result, ResumeCartError};
use crate::llm::client::{EvaluationRequest, GenerativeModel};
use log::{debug, error, warn};
use regex::Regex;
use std::sync::OnceLock;
use std::time::Duration;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY_SECS: u64 = 60;

fn retry_delay_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"retry_delay\s*\{\s*seconds:\s*(\d+)").expect("retry delay pattern is valid")
    })
}

/// Extracts `N` from an error message containing `retry_delay { seconds: N`.
///
/// This is coupled to an upstream message format; callers fall back to a
/// default through [`retry_delay_or_default`] when it stops matching.
pub fn parse_retry_delay(message: &str) -> Option<u64> {
    retry_delay_pattern()
        .captures(message)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

pub fn retry_delay_or_default(message: &str, default_secs: u64) -> u64 {
    parse_retry_delay(message).unwrap_or(default_secs)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub default_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            default_delay: Duration::from_secs(DEFAULT_RETRY_DELAY_SECS),
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            default_delay: Duration::from_secs(config.default_delay_secs),
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after a quota error.
    pub fn delay_for(&self, err: &ResumeCartError) -> Duration {
        match err {
            ResumeCartError::QuotaExhausted {
                retry_delay: Some(secs),
                ..
            } => Duration::from_secs(*secs),
            other => Duration::from_secs(retry_delay_or_default(
                &other.to_string(),
                self.default_delay.as_secs(),
            )),
        }
    }
}

/// Where the pipeline is. Attempts are numbered from 1.
#[derive(Debug)]
pub enum RetryState {
    Attempting { attempt: u32 },
    WaitingBackoff { attempt: u32, delay: Duration },
    Succeeded { attempt: u32, text: String },
    FailedTerminal { attempt: u32, error: ResumeCartError },
}

/// Receives every state transition as it happens, so users see waits while they occur.
pub trait RetryObserver {
    fn on_transition(&self, _state: &RetryState, _max_attempts: u32) {}
}

/// Observer that only writes to the log.
pub struct LogObserver;

impl RetryObserver for LogObserver {
    fn on_transition(&self, state: &RetryState, max_attempts: u32) {
        match state {
            RetryState::Attempting { attempt } => {
                debug!("model call attempt {}/{}", attempt, max_attempts)
            }
            RetryState::WaitingBackoff { attempt, delay } => warn!(
                "quota limit reached (attempt {}/{}), retrying in {} seconds",
                attempt,
                max_attempts,
                delay.as_secs()
            ),
            RetryState::Succeeded { attempt, .. } => {
                debug!("model call succeeded on attempt {}", attempt)
            }
            RetryState::FailedTerminal { attempt, error: err } => {
                error!("model call failed on attempt {}: {}", attempt, err)
            }
        }
    }
}

/// Call the model, retrying quota failures with backoff; returns the raw text.
pub async fn evaluate<M, O>(
    model: &M,
    request: &EvaluationRequest,
    policy: &RetryPolicy,
    observer: &O,
) -> Result<String>
where
    M: GenerativeModel + ?Sized,
    O: RetryObserver + ?Sized,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut state = RetryState::Attempting { attempt: 1 };

    loop {
        observer.on_transition(&state, max_attempts);

        state = match state {
            RetryState::Attempting { attempt } => match model.generate(request).await {
                Ok(text) => RetryState::Succeeded { attempt, text },
                Err(err) if err.is_quota_exhausted() && attempt < max_attempts => {
                    RetryState::WaitingBackoff {
                        attempt,
                        delay: policy.delay_for(&err),
                    }
                }
                Err(err) => RetryState::FailedTerminal {
                    attempt,
                    error: err,
                },
            },
            RetryState::WaitingBackoff { attempt, delay } => {
                tokio::time::sleep(delay).await;
                RetryState::Attempting {
                    attempt: attempt + 1,
                }
            }
            RetryState::Succeeded { text, .. } => return Ok(text),
            RetryState::FailedTerminal { error: err, .. } => return Err(err),
        };
    }
}
