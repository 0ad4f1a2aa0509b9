//! Retry with exponential backoff for AnkiConnect calls.

use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use super::error::{AnkiConnectError, AnkiConnectResult};

/// Async delay function used between attempts.
pub type Sleeper = Arc<dyn Fn(Duration) -> BoxFuture<'static, ()> + Send + Sync>;

/// Sleeper backed by the tokio timer.
pub fn tokio_sleeper() -> Sleeper {
    Arc::new(|delay| Box::pin(tokio::time::sleep(delay)))
}

/// How many times to try a call and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. Always at least 1.
    pub max_attempts: u32,
    /// Delay after the first failed attempt; doubles after each further one.
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Delay to wait after the given (1-based) failed attempt.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(1u32 << exponent)
    }
}

/// Bookkeeping for one call across its attempts.
#[derive(Debug)]
pub struct RetryState {
    pub attempt: u32,
    pub started: Instant,
    /// Most recent transient failure, kept to avoid repeating identical warnings.
    pub last_error: Option<AnkiConnectError>,
}

impl RetryState {
    fn new() -> Self {
        Self {
            attempt: 0,
            started: Instant::now(),
            last_error: None,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Run `op` until it succeeds, fails definitively, or the attempts run out.
///
/// `op` receives the 1-based attempt number. Only errors for which
/// [`AnkiConnectError::is_transient`] holds are retried; the last transient
/// error is returned once every attempt has been used.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    sleeper: &Sleeper,
    action: &str,
    mut op: F,
) -> AnkiConnectResult<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = AnkiConnectResult<T>>,
{
    let mut state = RetryState::new();

    loop {
        state.attempt += 1;
        debug!(
            "Calling AnkiConnect action '{}' (attempt {}/{})",
            action, state.attempt, policy.max_attempts
        );

        match op(state.attempt).await {
            Ok(value) => {
                if state.attempt > 1 {
                    info!(
                        "AnkiConnect action '{}' succeeded after {} attempts",
                        action, state.attempt
                    );
                }
                return Ok(value);
            }
            Err(e) if !e.is_transient() => return Err(e),
            Err(e) => {
                if state.attempt >= policy.max_attempts {
                    error!(
                        "AnkiConnect action '{}' failed after {} attempts in {:?}: {}",
                        action,
                        state.attempt,
                        state.elapsed(),
                        e
                    );
                    return Err(e);
                }
                let delay = policy.delay_after(state.attempt);
                if state.last_error.as_ref() == Some(&e) {
                    debug!(
                        "AnkiConnect action '{}' failed the same way, retrying in {:?}",
                        action, delay
                    );
                } else {
                    warn!(
                        "AnkiConnect action '{}' failed ({}), retrying in {:?}",
                        action, e, delay
                    );
                }
                state.last_error = Some(e);
                sleeper(delay).await;
            }
        }
    }
}
