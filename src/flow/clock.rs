//! Polling clock driven by the machine's declared subscription.

use std::time::Duration;

use tokio::time::Instant;

/// Tracks when the next poll tick is due.
///
/// Resynchronize after every transition with
/// [`DeviceFlow::poll_subscription`](super::DeviceFlow::poll_subscription):
/// the clock starts, restarts on a period change, or stops, as a pure
/// function of that subscription.
///
/// A period too long to schedule leaves the clock subscribed with no
/// deadline; it never fires.
#[derive(Debug, Clone, Default)]
pub struct PollingClock {
    period: Option<Duration>,
    deadline: Option<Instant>,
}

impl PollingClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sync(&mut self, subscription: Option<Duration>, now: Instant) {
        if subscription == self.period {
            return;
        }
        self.period = subscription;
        self.deadline = subscription.and_then(|period| now.checked_add(period));
        match subscription {
            Some(period) => tracing::debug!(period_secs = period.as_secs(), "polling clock started"),
            None => tracing::debug!("polling clock stopped"),
        }
    }

    pub fn is_running(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn period(&self) -> Option<Duration> {
        self.period
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Consume a due tick and schedule the next one.
    pub fn fire(&mut self, now: Instant) -> bool {
        match (self.period, self.deadline) {
            (Some(period), Some(deadline)) if now >= deadline => {
                self.deadline = now.checked_add(period);
                true
            }
            _ => false,
        }
    }
}
