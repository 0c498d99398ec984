use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, trace};

use crate::shared::{Activation, EngineShared};
use crate::transport::RemoteTransport;

/// Periodic authoritative refresh of current playback and queue.
///
/// Polls once right away, then every `poll_interval`. Each read runs in its
/// own task, so a slow round trip never holds back the schedule or the other
/// read; overlapping reads of the same slice are last-write-wins. Failures are
/// retried on the next period only.
pub(crate) struct PollScheduler {
    handle: JoinHandle<()>,
}

impl PollScheduler {
    pub(crate) fn start<T>(shared: Arc<EngineShared<T>>, activation: Activation) -> Self
    where
        T: RemoteTransport + ?Sized + 'static,
    {
        let period = shared.config.poll_interval;

        let handle = tokio::spawn(async move {
            let generation = activation.generation;
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            debug!(generation, ?period, "Poll scheduler started");

            loop {
                tokio::select! {
                    _ = activation.cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        trace!(generation, "Poll cycle");
                        spawn_read(&shared, &activation, Read::Current);
                        spawn_read(&shared, &activation, Read::Queue);
                    }
                }
            }

            debug!(generation, "Poll scheduler stopped");
        });

        Self { handle }
    }

    pub(crate) fn stop(self) {
        self.handle.abort();
    }
}

#[derive(Clone, Copy)]
enum Read {
    Current,
    Queue,
}

/// Runs one read detached from the loop; deactivation drops it mid-flight.
fn spawn_read<T>(shared: &Arc<EngineShared<T>>, activation: &Activation, read: Read)
where
    T: RemoteTransport + ?Sized + 'static,
{
    let shared = shared.clone();
    let activation = activation.clone();
    tokio::spawn(async move {
        let generation = activation.generation;
        tokio::select! {
            _ = activation.cancel.cancelled() => {}
            _ = async {
                match read {
                    Read::Current => shared.refresh_current(generation).await,
                    Read::Queue => shared.refresh_queue(generation).await,
                }
            } => {}
        }
    });
}
