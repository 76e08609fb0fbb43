//! Bounded retry with an injectable delay

use std::fmt::Display;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Attempts and fixed delay of a retried operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RetryPolicy {
    /// Total attempts, the first one included.
    pub attempts: u32,
    pub delay_secs: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay_secs: 3,
        }
    }
}

impl RetryPolicy {
    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }

    /// Run `operation` until it succeeds or the attempts are used up.
    ///
    /// `operation` receives the 1-based attempt number. The last error is
    /// returned when every attempt fails. A sleep cannot be cut short.
    pub fn run<T, E, F>(&self, sleeper: &dyn Sleeper, what: &str, mut operation: F) -> Result<T, E>
    where
        E: Display,
        F: FnMut(u32) -> Result<T, E>,
    {
        let attempts = self.attempts.max(1);
        let mut attempt = 1;
        loop {
            match operation(attempt) {
                Ok(value) => return Ok(value),
                Err(e) if attempt < attempts => {
                    tracing::warn!(
                        attempt,
                        attempts,
                        delay_secs = self.delay_secs,
                        error = %e,
                        "{} failed, retrying",
                        what
                    );
                    sleeper.sleep(self.delay());
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Blocks the current thread between attempts.
pub trait Sleeper {
    fn sleep(&self, delay: Duration);
}

/// Sleeps for real.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, delay: Duration) {
        std::thread::sleep(delay);
    }
}
