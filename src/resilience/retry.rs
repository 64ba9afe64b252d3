// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Exponential backoff for the SQL collaborator boundary.
//!
//! The core never retries; transient connection failures are absorbed
//! here, at the storage edge, before an error propagates to the caller.
//! Every schedule is finite: once the attempts are spent the last error
//! is returned unchanged.
//!
//! # Example
//!
//! ```
//! use firedb::resilience::retry::RetryConfig;
//!
//! // Startup: fail fast on bad config
//! assert_eq!(RetryConfig::startup().attempts, 5);
//!
//! // Query: quick retry, then hand the error to the caller
//! assert_eq!(RetryConfig::query().attempts, 3);
//! ```

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// A finite backoff schedule: `attempts` total tries, with delays growing
/// from `base_delay` by `growth` per failure, capped at `max_delay`.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub growth: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::query()
    }
}

impl RetryConfig {
    /// Schedule for the initial connect and schema creation. Gives up
    /// after roughly five seconds so configuration errors surface fast.
    #[must_use]
    pub fn startup() -> Self {
        Self {
            attempts: 5,
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(2),
            growth: 2.0,
        }
    }

    /// Schedule for individual selects and deletes.
    #[must_use]
    pub fn query() -> Self {
        Self {
            attempts: 3,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(2),
            growth: 2.0,
        }
    }

    /// Schedule for replace batches, which redo more work per attempt
    /// and so deserve more patience.
    #[must_use]
    pub fn batch_write() -> Self {
        Self {
            attempts: 5,
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
            growth: 2.0,
        }
    }

    #[cfg(test)]
    fn immediate() -> Self {
        Self {
            attempts: 3,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            growth: 2.0,
        }
    }
}

/// Run `operation` until it succeeds or the schedule is exhausted.
///
/// The error of the final attempt is returned as-is; intermediate
/// failures are only logged.
pub async fn retry<F, Fut, T, E>(
    name: &str,
    config: &RetryConfig,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut delay = config.base_delay;
    let mut tried = 0u32;

    loop {
        tried += 1;
        match operation().await {
            Ok(value) => {
                if tried > 1 {
                    info!(name, tried, "recovered after retrying");
                }
                return Ok(value);
            }
            Err(err) if tried >= config.attempts => return Err(err),
            Err(err) => {
                warn!(
                    name,
                    tried,
                    error = %err,
                    delay_ms = delay.as_millis() as u64,
                    "transient failure, backing off"
                );
                sleep(delay).await;
                delay = delay.mul_f64(config.growth).min(config.max_delay);
            }
        }
    }
}
