//! Bounded status polling.

use std::time::Duration;

use common::OrderId;

use crate::error::ReportingError;
use crate::service::StatusSource;

/// Retry budget for status polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Maximum number of status queries.
    pub max_attempts: u32,
    /// Timed wait between two queries.
    pub interval: Duration,
}

impl PollPolicy {
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 20;
    pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(500);

    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }

    /// Upper bound on the time spent waiting between attempts.
    pub fn max_wait(&self) -> Duration {
        self.interval * self.max_attempts.saturating_sub(1)
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_ATTEMPTS, Self::DEFAULT_INTERVAL)
    }
}

/// Polls a [`StatusSource`] until an order completes or the budget runs out.
///
/// The first completed status ends polling successfully. A failed status
/// ends it early with [`ReportingError::FulfillmentFailed`]. Between
/// attempts the poller sleeps; it never blocks on the store.
pub struct StatusPoller<S: StatusSource> {
    source: S,
    policy: PollPolicy,
}

impl<S: StatusSource> StatusPoller<S> {
    /// Creates a poller with the default 20 × 500 ms policy.
    pub fn new(source: S) -> Self {
        Self::with_policy(source, PollPolicy::default())
    }

    pub fn with_policy(source: S, policy: PollPolicy) -> Self {
        Self { source, policy }
    }

    pub fn policy(&self) -> PollPolicy {
        self.policy
    }

    /// Waits for an order to complete.
    ///
    /// Returns the number of queries it took. At least one query is always
    /// made, even with a zero budget.
    #[tracing::instrument(skip(self))]
    pub async fn wait_for_completion(&self, order_id: OrderId) -> Result<u32, ReportingError> {
        let attempts = self.policy.max_attempts.max(1);

        for attempt in 1..=attempts {
            metrics::counter!("status_polls_total").increment(1);
            let status = self.source.order_status(order_id).await;

            if status.is_completed() {
                tracing::debug!(attempt, "order completed");
                return Ok(attempt);
            }
            if let Some(reason) = status.failure_reason() {
                return Err(ReportingError::FulfillmentFailed {
                    order_id,
                    reason: reason.to_string(),
                });
            }
            if attempt < attempts {
                tokio::time::sleep(self.policy.interval).await;
            }
        }

        metrics::counter!("status_poll_timeouts_total").increment(1);
        tracing::warn!(attempts, "gave up waiting for order");
        Err(ReportingError::FulfillmentTimeout { order_id, attempts })
    }
}
