use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::debug;

use crate::shared::{Activation, EngineShared};
use crate::transport::RemoteTransport;

/// Local one-second clock advancing the interpolated progress.
///
/// Runs for the whole activation; the store ignores ticks while paused. Never
/// touches the network, so a slow poll cannot hold it back.
pub(crate) struct ClockTicker {
    handle: JoinHandle<()>,
}

impl ClockTicker {
    pub(crate) fn start<T>(shared: Arc<EngineShared<T>>, activation: Activation) -> Self
    where
        T: RemoteTransport + ?Sized + 'static,
    {
        let period = shared.config.tick_interval;
        let step = shared.config.tick_step_ms();

        let handle = tokio::spawn(async move {
            let generation = activation.generation;
            // First tick one period after activation, not immediately
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            debug!(generation, ?period, "Clock ticker started");

            loop {
                tokio::select! {
                    _ = activation.cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        shared.mutate_if_current(generation, |store| store.tick(step));
                    }
                }
            }

            debug!(generation, "Clock ticker stopped");
        });

        Self { handle }
    }

    /// Destroys the timer. Callers cancel the activation token first.
    pub(crate) fn stop(self) {
        self.handle.abort();
    }
}
