//! Generic bounded-retry combinator with pluggable sleeping.
//!
//! Splitting the delay policy (pure, in `chunkferry-transfer`) from the
//! act of waiting (the [`Sleeper`] trait) keeps the retry protocol unit
//! testable without real timers or network calls.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use chunkferry_transfer::BackoffPolicy;
use tracing::debug;

/// Something that can wait. Production code uses [`TokioSleeper`];
/// tests record the requested durations instead of waiting.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;
}

/// [`Sleeper`] backed by `tokio::time::sleep`.
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep(&self, duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(tokio::time::sleep(duration))
    }
}

/// All attempts failed; carries the attempt count and the last error.
#[derive(Debug)]
pub struct RetryExhausted<E> {
    pub attempts: u32,
    pub last_error: E,
}

/// Runs `op` up to `max_attempts` times.
///
/// The first success wins immediately. After failed attempt `n` (with
/// `n < max_attempts`) the combinator waits `policy.delay_for_attempt(n)`
/// before the next attempt, so waits grow linearly. Once attempt
/// `max_attempts` fails the last error is returned with no further wait.
pub async fn retry_with_backoff<T, E, F, Fut>(
    max_attempts: u32,
    policy: BackoffPolicy,
    sleeper: &dyn Sleeper,
    mut op: F,
) -> Result<T, RetryExhausted<E>>
where
    E: std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(error) => {
                if attempt >= max_attempts {
                    return Err(RetryExhausted {
                        attempts: attempt,
                        last_error: error,
                    });
                }
                let delay = policy.delay_for_attempt(attempt);
                debug!(attempt, delay_ms = delay.as_millis() as u64, error = %error, "attempt failed, backing off");
                sleeper.sleep(delay).await;
            }
        }
    }
}
