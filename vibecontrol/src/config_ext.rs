//! Playback engine settings for vibeconfig
//!
//! Reads the `playback.*` section:
//!
//! ```yaml
//! playback:
//!   poll_interval_ms: 5000
//!   tick_interval_ms: 1000
//!   reconcile_delay_ms: 500
//!   queue_display_limit: 10
//! ```

use std::time::Duration;

use anyhow::Result;
use vibeconfig::Config;

use crate::config::{
    DEFAULT_POLL_INTERVAL_MS, DEFAULT_QUEUE_DISPLAY_LIMIT, DEFAULT_RECONCILE_DELAY_MS,
    DEFAULT_TICK_INTERVAL_MS, EngineConfig,
};

pub trait PlaybackConfigExt {
    /// Period of the authoritative poll
    fn get_poll_interval(&self) -> Result<Duration>;

    /// Period of the local progress tick
    fn get_tick_interval(&self) -> Result<Duration>;

    /// Delay between a command and its reconciliation poll
    fn get_reconcile_delay(&self) -> Result<Duration>;

    fn get_queue_display_limit(&self) -> Result<usize>;

    /// All of the above, zero periods replaced by their defaults
    fn playback_engine_config(&self) -> Result<EngineConfig>;
}

impl PlaybackConfigExt for Config {
    fn get_poll_interval(&self) -> Result<Duration> {
        Ok(millis_or(self, "poll_interval_ms", DEFAULT_POLL_INTERVAL_MS))
    }

    fn get_tick_interval(&self) -> Result<Duration> {
        Ok(millis_or(self, "tick_interval_ms", DEFAULT_TICK_INTERVAL_MS))
    }

    fn get_reconcile_delay(&self) -> Result<Duration> {
        Ok(millis_or(self, "reconcile_delay_ms", DEFAULT_RECONCILE_DELAY_MS))
    }

    fn get_queue_display_limit(&self) -> Result<usize> {
        Ok(self
            .get_u64(&["playback", "queue_display_limit"])
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(DEFAULT_QUEUE_DISPLAY_LIMIT))
    }

    fn playback_engine_config(&self) -> Result<EngineConfig> {
        let config = EngineConfig {
            poll_interval: self.get_poll_interval()?,
            tick_interval: self.get_tick_interval()?,
            reconcile_delay: self.get_reconcile_delay()?,
            queue_display_limit: self.get_queue_display_limit()?,
        };
        Ok(config.sanitized())
    }
}

fn millis_or(config: &Config, key: &str, default: u64) -> Duration {
    Duration::from_millis(config.get_u64(&["playback", key]).unwrap_or(default))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_yaml_str("{}").unwrap();
        assert_eq!(
            config.playback_engine_config().unwrap(),
            EngineConfig::default()
        );
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_yaml_str(
            "playback:\n  poll_interval_ms: 3000\n  tick_interval_ms: 250\n  reconcile_delay_ms: 800\n  queue_display_limit: 4\n",
        )
        .unwrap();
        let engine = config.playback_engine_config().unwrap();
        assert_eq!(engine.poll_interval, Duration::from_millis(3000));
        assert_eq!(engine.tick_interval, Duration::from_millis(250));
        assert_eq!(engine.reconcile_delay, Duration::from_millis(800));
        assert_eq!(engine.queue_display_limit, 4);
    }

    #[test]
    fn test_zero_poll_interval_falls_back() {
        let config = Config::from_yaml_str("playback:\n  poll_interval_ms: 0\n").unwrap();
        assert_eq!(config.get_poll_interval().unwrap(), Duration::ZERO);
        assert_eq!(
            config.playback_engine_config().unwrap().poll_interval,
            Duration::from_millis(DEFAULT_POLL_INTERVAL_MS)
        );
    }
}
