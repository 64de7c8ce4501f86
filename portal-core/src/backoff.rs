//! Bounded retry with exponential backoff
//!
//! Used to wait for a dependency (the document store) to come up before
//! the loader queries it. Delays double each attempt: `base * 2^attempt`.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PortalError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub base_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_backoff_ms: 300,
        }
    }
}

impl RetryPolicy {
    /// Delay after the zero-based `attempt` failed: 300ms, 600ms, 1200ms, ...
    pub fn delay_for_attempt(&self, attempt: usize) -> Duration {
        let factor = 1u64.checked_shl(attempt as u32).unwrap_or(u64::MAX);
        Duration::from_millis(self.base_backoff_ms.saturating_mul(factor))
    }
}

/// Poll `is_ready` until it reports ready, sleeping between attempts.
///
/// No sleep follows the final attempt. The sleep is `tokio::time::sleep`,
/// so only the awaiting task is suspended.
pub async fn wait_until_ready<F, Fut>(
    dependency: &'static str,
    policy: RetryPolicy,
    mut is_ready: F,
) -> Result<usize>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    for attempt in 0..policy.max_attempts {
        if is_ready().await {
            debug!(dependency, attempt = attempt + 1, "dependency ready");
            return Ok(attempt + 1);
        }

        if attempt + 1 < policy.max_attempts {
            let delay = policy.delay_for_attempt(attempt);
            debug!(
                dependency,
                attempt = attempt + 1,
                delay_ms = delay.as_millis() as u64,
                "dependency not ready, backing off"
            );
            tokio::time::sleep(delay).await;
        }
    }

    Err(PortalError::NotReady {
        dependency,
        attempts: policy.max_attempts,
    })
}
