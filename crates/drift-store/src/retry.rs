//! Bounded retry policy for storage calls
//!
//! Every read or write against the state store goes through
//! [`with_retry`]. The policy is a fixed attempt count with a fixed delay
//! that extends after the first retries; exhausting it degrades that one
//! call to an `Unavailable` error. The caller skips the affected path and
//! keeps going; a storage outage must never take the host process down.

use std::time::Duration;

use backoff::backoff::Backoff;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{Error, Result};

/// Retry parameters for a single storage call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts, including the first (so `attempts - 1` retries).
    pub attempts: u32,
    /// Delay before each of the first `extend_after` retries.
    pub fixed_delay: Duration,
    /// Delay before every retry after that.
    pub extended_delay: Duration,
    /// How many retries use the fixed delay before extending.
    pub extend_after: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: 4,
            fixed_delay: Duration::from_millis(200),
            extended_delay: Duration::from_secs(2),
            extend_after: 2,
        }
    }
}

impl RetryConfig {
    /// Zero-delay variant for tests.
    pub fn immediate(attempts: u32) -> Self {
        Self {
            attempts,
            fixed_delay: Duration::ZERO,
            extended_delay: Duration::ZERO,
            extend_after: 1,
        }
    }
}

/// `backoff::Backoff` giving the fixed-then-extended schedule.
struct FixedThenExtended {
    config: RetryConfig,
    retries_made: u32,
}

impl FixedThenExtended {
    fn new(config: RetryConfig) -> Self {
        Self {
            config,
            retries_made: 0,
        }
    }
}

impl Backoff for FixedThenExtended {
    fn next_backoff(&mut self) -> Option<Duration> {
        // attempts includes the initial call
        if self.retries_made + 1 >= self.config.attempts {
            return None;
        }
        self.retries_made += 1;
        if self.retries_made <= self.config.extend_after {
            Some(self.config.fixed_delay)
        } else {
            Some(self.config.extended_delay)
        }
    }

    fn reset(&mut self) {
        self.retries_made = 0;
    }
}

/// Run a storage operation under the bounded retry policy.
///
/// Only `Unavailable` errors are retried; anything else is returned on
/// the first occurrence. The last `Unavailable` error is returned once
/// the attempt budget is spent.
pub fn with_retry<T>(config: &RetryConfig, mut op: impl FnMut() -> Result<T>) -> Result<T> {
    let policy = FixedThenExtended::new(config.clone());
    backoff::retry(policy, || {
        op().map_err(|e| {
            if e.is_transient() {
                warn!(error = %e, "store call failed, will retry");
                backoff::Error::transient(e)
            } else {
                backoff::Error::permanent(e)
            }
        })
    })
    .map_err(|e| match e {
        backoff::Error::Permanent(inner) => inner,
        backoff::Error::Transient { err, .. } => err,
    })
}
