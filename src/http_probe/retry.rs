use std::future::Future;
use std::time::Duration;

/// Bounded, fixed-delay retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first. Values below 1 are treated as 1.
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        RetryPolicy {
            max_attempts,
            delay,
        }
    }
}

/// The last value produced and the attempt that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Retried<T> {
    pub value: T,
    pub attempts: u32,
}

/// Run `operation` until `done` accepts its output or the attempts run out.
///
/// `operation` receives the 1-based attempt number. Attempts are sequential and separated
/// by `policy.delay`; no delay follows the last attempt.
pub async fn retry<T, F, Fut, D>(policy: RetryPolicy, mut operation: F, done: D) -> Retried<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = T>,
    D: Fn(&T) -> bool,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        let value = operation(attempt).await;
        if done(&value) || attempt >= max_attempts {
            return Retried {
                value,
                attempts: attempt,
            };
        }
        tracing::debug!(
            attempt,
            max_attempts,
            delay_ms = policy.delay.as_millis() as u64,
            "Attempt failed, retrying"
        );
        tokio::time::sleep(policy.delay).await;
        attempt += 1;
    }
}
