//! Retry with exponential backoff for Places API calls.
//!
//! Every attempt is classified explicitly: transient failures (throttling,
//! upstream 5xx, timeouts, connection drops, unreadable bodies) are retried
//! after `base_backoff * 2^attempt + jitter`; permanent failures are returned
//! as-is without another attempt.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::warn;

use crate::error::{PlacesError, Result};

/// HTTP statuses worth another attempt.
pub const TRANSIENT_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// Outcome of classifying a single failed attempt.
#[derive(Debug)]
pub enum Classified {
    Transient(PlacesError),
    Permanent(PlacesError),
}

impl Classified {
    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16, message: String) -> Self {
        let err = PlacesError::Api { status, message };
        if TRANSIENT_STATUSES.contains(&status) {
            Classified::Transient(err)
        } else {
            Classified::Permanent(err)
        }
    }

    /// Classify a transport-level error. Builder errors never reached the
    /// wire and will not get better on retry.
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_builder() {
            Classified::Permanent(PlacesError::Config(err.to_string()))
        } else {
            Classified::Transient(PlacesError::Network(err.to_string()))
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, Classified::Transient(_))
    }

    pub fn into_error(self) -> PlacesError {
        match self {
            Classified::Transient(e) | Classified::Permanent(e) => e,
        }
    }
}

/// A successful call together with how many attempts it took.
#[derive(Debug, Clone, PartialEq)]
pub struct Retried<T> {
    pub value: T,
    pub attempts: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt. Total attempts = `max_retries + 1`.
    pub max_retries: u32,
    pub base_backoff: Duration,
    /// Upper bound (exclusive) of the uniform jitter added to each delay.
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 4,
            base_backoff: Duration::from_millis(600),
            max_jitter: Duration::from_millis(250),
        }
    }
}

impl RetryPolicy {
    /// Policy that retries without sleeping.
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            base_backoff: Duration::ZERO,
            max_jitter: Duration::ZERO,
        }
    }

    /// Delay before retrying after the failed attempt `attempt` (0-based),
    /// without jitter.
    pub fn base_delay(&self, attempt: u32) -> Duration {
        self.base_backoff.saturating_mul(2u32.saturating_pow(attempt))
    }

    fn jitter(&self) -> Duration {
        if self.max_jitter.is_zero() {
            return Duration::ZERO;
        }
        let nanos = rand::rng().random_range(0..self.max_jitter.as_nanos() as u64);
        Duration::from_nanos(nanos)
    }

    pub fn delay(&self, attempt: u32) -> Duration {
        self.base_delay(attempt) + self.jitter()
    }
}

/// Run `op` until it succeeds, fails permanently, or exhausts the policy.
///
/// `op` receives the 0-based attempt index.
pub async fn with_retries<T, F, Fut>(
    policy: &RetryPolicy,
    label: &str,
    mut op: F,
) -> Result<Retried<T>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = std::result::Result<T, Classified>>,
{
    let mut attempt = 0u32;
    loop {
        match op(attempt).await {
            Ok(value) => {
                return Ok(Retried {
                    value,
                    attempts: attempt + 1,
                })
            }
            Err(Classified::Permanent(err)) => return Err(err),
            Err(Classified::Transient(err)) => {
                if attempt >= policy.max_retries {
                    return Err(PlacesError::RetriesExhausted {
                        attempts: attempt + 1,
                        last: Box::new(err),
                    });
                }
                let delay = policy.delay(attempt);
                warn!(
                    label,
                    attempt = attempt + 1,
                    backoff_ms = delay.as_millis() as u64,
                    error = %err,
                    "Transient Places failure, retrying after backoff"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
