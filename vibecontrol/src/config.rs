use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 5000;
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_RECONCILE_DELAY_MS: u64 = 500;
pub const DEFAULT_QUEUE_DISPLAY_LIMIT: usize = 10;

/// Timing of the engine's two timers and of the post-command reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    #[serde(with = "millis")]
    pub poll_interval: Duration,
    #[serde(with = "millis")]
    pub tick_interval: Duration,
    #[serde(with = "millis")]
    pub reconcile_delay: Duration,
    pub queue_display_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            tick_interval: Duration::from_millis(DEFAULT_TICK_INTERVAL_MS),
            reconcile_delay: Duration::from_millis(DEFAULT_RECONCILE_DELAY_MS),
            queue_display_limit: DEFAULT_QUEUE_DISPLAY_LIMIT,
        }
    }
}

impl EngineConfig {
    /// Replaces zero periods by their defaults.
    ///
    /// `tokio::time::interval` panics on a zero period; a zero reconcile delay
    /// is accepted.
    pub fn sanitized(mut self) -> Self {
        if self.poll_interval.is_zero() {
            warn!(
                "poll_interval is zero, falling back to {} ms",
                DEFAULT_POLL_INTERVAL_MS
            );
            self.poll_interval = Duration::from_millis(DEFAULT_POLL_INTERVAL_MS);
        }
        if self.tick_interval.is_zero() {
            warn!(
                "tick_interval is zero, falling back to {} ms",
                DEFAULT_TICK_INTERVAL_MS
            );
            self.tick_interval = Duration::from_millis(DEFAULT_TICK_INTERVAL_MS);
        }
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    pub fn with_reconcile_delay(mut self, delay: Duration) -> Self {
        self.reconcile_delay = delay;
        self
    }

    /// Tick step applied to the interpolated progress, in milliseconds
    pub fn tick_step_ms(&self) -> u64 {
        self.tick_interval.as_millis() as u64
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
