//! Bounded retry with exponential backoff and outcome classification.

use std::future::Future;
use std::time::{Duration, Instant};

use tracing::{error, warn};

use crate::error::{FetchError, FetchErrorKind};

/// Backoff strategy between retry attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    /// Fixed delay between retries.
    Fixed { delay: Duration },
    /// Exponential delay: `base * factor^attempt`, capped at `max`.
    ///
    /// With `jitter` the actual sleep is drawn uniformly from zero up
    /// to the capped delay (full jitter).
    Exponential {
        base: Duration,
        factor: f64,
        max: Duration,
        jitter: bool,
    },
}

impl Default for Backoff {
    fn default() -> Self {
        Self::Exponential {
            base: Duration::from_secs(1),
            factor: 2.0,
            max: Duration::from_secs(60),
            jitter: true,
        }
    }
}

impl Backoff {
    /// The capped deterministic delay for a 0-based retry attempt.
    pub fn delay(self, attempt: u32) -> Duration {
        match self {
            Self::Fixed { delay } => delay,
            Self::Exponential {
                base, factor, max, ..
            } => {
                let scale = factor.powi(attempt as i32);
                let seconds = base.as_secs_f64() * scale;
                Duration::from_secs_f64(seconds.min(max.as_secs_f64()))
            }
        }
    }

    /// The sleep to actually take before the given retry attempt.
    pub fn sleep_for(self, attempt: u32) -> Duration {
        let delay = self.delay(attempt);
        match self {
            Self::Exponential { jitter: true, .. } => {
                let ceiling = delay.as_millis() as u64;
                Duration::from_millis(fastrand::u64(0..=ceiling))
            }
            _ => delay,
        }
    }
}

/// Bounds for the retry loop.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum total attempts, the first one included.
    pub max_tries: u32,
    /// Maximum wall-clock time across all attempts and sleeps.
    pub max_time: Duration,
    pub backoff: Backoff,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_tries: 10,
            max_time: Duration::from_secs(600),
            backoff: Backoff::default(),
        }
    }
}

impl RetryConfig {
    /// One attempt, no sleeping. Used by offline/mock composition.
    pub fn no_retry() -> Self {
        Self {
            max_tries: 1,
            max_time: Duration::from_secs(600),
            backoff: Backoff::Fixed {
                delay: Duration::ZERO,
            },
        }
    }
}

/// Classified result of one unit of work.
///
/// The unit of work reports what happened; the retry policy decides
/// what to do about it. Only `Permanent` escapes the loop as an error.
#[derive(Debug)]
pub enum Outcome<T> {
    Success(T),
    /// The upstream answered, but the decoded result was empty.
    /// Treated as retryable: an empty page is usually a hiccup.
    Empty,
    Transient(FetchError),
    /// Auth failed even after the session's single in-flight refresh.
    AuthExpired(FetchError),
    Permanent(FetchError),
}

impl<T> Outcome<T> {
    /// Fold a fetch result into an outcome.
    ///
    /// Every error kind except the structural ones maps to
    /// `Transient`; this deliberately mirrors the scraper this design
    /// replaces, which retried on any failure whatsoever.
    pub fn from_result(
        result: Result<T, FetchError>,
        is_empty: impl FnOnce(&T) -> bool,
    ) -> Self {
        match result {
            Ok(value) if is_empty(&value) => Self::Empty,
            Ok(value) => Self::Success(value),
            Err(error) => match error.kind() {
                FetchErrorKind::AuthExpired => Self::AuthExpired(error),
                FetchErrorKind::MissingColumns | FetchErrorKind::UnknownSegment => {
                    Self::Permanent(error)
                }
                _ => Self::Transient(error),
            },
        }
    }

    /// Stable class label for log fields.
    pub const fn class(&self) -> &'static str {
        match self {
            Self::Success(_) => "success",
            Self::Empty => "empty",
            Self::Transient(_) => "transient",
            Self::AuthExpired(_) => "auth_expired",
            Self::Permanent(_) => "permanent",
        }
    }
}

/// Drives a unit of work to success within configured bounds.
///
/// On exhaustion (attempts or wall clock) the policy does not surface
/// the last failure: it returns the caller-designated empty value so a
/// flaky upstream degrades to "no data for this source" instead of
/// aborting a whole universe build.
#[derive(Debug, Clone, Default)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    pub const fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Run `work` until success, permanent failure, or exhaustion.
    ///
    /// `operation` names the unit of work in log lines. `empty` is
    /// what the caller gets back when the budget runs out.
    pub async fn run<T, F, Fut>(&self, operation: &str, empty: T, mut work: F) -> Result<T, FetchError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Outcome<T>>,
    {
        let started = Instant::now();
        let max_tries = self.config.max_tries.max(1);
        let mut attempt: u32 = 0;

        loop {
            let outcome = work().await;
            match outcome {
                Outcome::Success(value) => return Ok(value),
                Outcome::Permanent(error) => {
                    warn!(
                        operation,
                        code = error.code(),
                        message = error.message(),
                        "permanent failure, not retrying"
                    );
                    return Err(error);
                }
                retryable => {
                    attempt += 1;
                    let elapsed = started.elapsed();
                    if attempt >= max_tries || elapsed >= self.config.max_time {
                        error!(
                            operation,
                            attempts = attempt,
                            elapsed_ms = elapsed.as_millis() as u64,
                            last_class = retryable.class(),
                            "giving up, returning empty result"
                        );
                        return Ok(empty);
                    }

                    let remaining = self.config.max_time.saturating_sub(elapsed);
                    let sleep = self.config.backoff.sleep_for(attempt - 1).min(remaining);
                    warn!(
                        operation,
                        attempt,
                        delay_ms = sleep.as_millis() as u64,
                        class = retryable.class(),
                        "retrying after backoff"
                    );
                    tokio::time::sleep(sleep).await;
                }
            }
        }
    }
}
