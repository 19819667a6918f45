//! Execution policy hook.
//!
//! Every remote round trip the CRUD surface issues runs through a policy:
//! stage the local mutations, then commit. The default (no policy
//! configured) stages and commits immediately. A configured policy can wrap
//! that round trip with cross-cutting behavior the core knows nothing about
//! (retry with backoff, telemetry, coalescing), which keeps those concerns
//! out of every operation above it.

use crate::error::Result;
use crate::store::ListStore;
use async_trait::async_trait;
use std::time::Duration;

/// Staging closure passed to a policy.
///
/// Performs zero or more local mutation stagings (field writes, item
/// creation, deletion marking) against the store's handles. Purely local;
/// the commit that follows is what talks to the remote store.
pub type StageFn<'a> = Box<dyn FnOnce() + Send + 'a>;

/// A strategy wrapping "stage, then commit" for one round trip.
///
/// Implementations must call `stage` exactly once before the first commit
/// attempt; staged work is not re-stageable.
#[async_trait]
pub trait ExecutionPolicy: Send + Sync {
    async fn execute(&self, store: &dyn ListStore, stage: StageFn<'_>) -> Result<()>;
}

/// Retry transient commit failures with exponential backoff.
///
/// Stages once, then attempts the commit up to `attempts` times, sleeping
/// `base_delay * 2^n` between attempts. Only transient errors
/// ([`crate::Error::is_transient`]) are retried; everything else propagates
/// on first occurrence.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            base_delay: Duration::from_millis(200),
        }
    }
}

#[async_trait]
impl ExecutionPolicy for RetryPolicy {
    async fn execute(&self, store: &dyn ListStore, stage: StageFn<'_>) -> Result<()> {
        stage();

        let mut delay = self.base_delay;
        for attempt in 1..self.attempts {
            match store.execute().await {
                Ok(()) => return Ok(()),
                Err(error) if error.is_transient() => {
                    tracing::warn!(attempt, ?delay, %error, "commit failed, retrying");
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
                Err(error) => return Err(error),
            }
        }
        store.execute().await
    }
}
