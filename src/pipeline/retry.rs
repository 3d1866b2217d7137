use std::fmt::Display;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{info, warn};

use crate::entities::{AttemptOutcome, ExtractionAttempt, FailureKind};

/// Errors that carry an explicit failure class.
pub trait Classify {
    fn failure_kind(&self) -> FailureKind;
}

/// Exponential backoff delay: `base * 2^retry` (2s, 4s, 8s, ... for a 2s base).
pub fn calculate_backoff_delay(retry: u32, base_delay: Duration) -> Duration {
    // Cap the exponent to prevent overflow
    let capped = retry.min(10);
    base_delay.saturating_mul(2_u32.saturating_pow(capped))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

/// Final result of a retried operation plus one record per attempt.
#[derive(Debug)]
pub struct Retried<T, E> {
    pub result: Result<T, E>,
    pub attempts: Vec<ExtractionAttempt>,
}

impl RetryPolicy {
    /// Runs `operation` until it succeeds or its failure kind has no retry
    /// allowance left. Attempts are strictly sequential.
    pub async fn run<T, E, F, Fut>(
        &self,
        strategy: &'static str,
        budget: Option<Duration>,
        mut operation: F,
    ) -> Retried<T, E>
    where
        T: AsRef<str>,
        E: Classify + Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempts = Vec::new();
        let mut retries = 0;

        loop {
            let started = Instant::now();
            let result = operation().await;
            let elapsed = started.elapsed();

            let error = match result {
                Ok(value) => {
                    attempts.push(ExtractionAttempt {
                        strategy,
                        outcome: AttemptOutcome::Success(value.as_ref().to_string()),
                        duration_budget: budget,
                        elapsed,
                    });
                    return Retried {
                        result: Ok(value),
                        attempts,
                    };
                }
                Err(error) => error,
            };

            attempts.push(ExtractionAttempt {
                strategy,
                outcome: AttemptOutcome::Failure(error.to_string()),
                duration_budget: budget,
                elapsed,
            });

            let kind = error.failure_kind();
            if retries >= kind.retry_allowance(self.max_retries) {
                warn!(
                    strategy,
                    kind = kind.label(),
                    attempts = attempts.len(),
                    error = %error,
                    "giving up"
                );
                return Retried {
                    result: Err(error),
                    attempts,
                };
            }

            let delay = calculate_backoff_delay(retries, self.base_delay);
            info!(
                strategy,
                kind = kind.label(),
                retry = retries + 1,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "retrying after backoff"
            );
            sleep(delay).await;
            retries += 1;
        }
    }
}
