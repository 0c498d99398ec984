//! State shared between the engine handle and its background tasks.
//!
//! Every store write goes through [`EngineShared::mutate_if_current`], which
//! checks the liveness flag and the activation generation under the same lock
//! as the write. A result produced for an older activation is dropped there.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, trace, warn};

use crate::config::EngineConfig;
use crate::errors::TransportError;
use crate::model::{EngineEvent, PlaybackView};
use crate::store::PlaybackStateStore;
use crate::transport::RemoteTransport;

const EVENT_CAPACITY: usize = 16;

/// Identity of one activation cycle, handed to every task it spawns
#[derive(Debug, Clone)]
pub(crate) struct Activation {
    pub(crate) generation: u64,
    pub(crate) cancel: CancellationToken,
}

#[derive(Debug, Default)]
struct EngineState {
    generation: u64,
    live: bool,
    store: PlaybackStateStore,
}

pub(crate) struct EngineShared<T: ?Sized> {
    pub(crate) config: EngineConfig,
    state: Mutex<EngineState>,
    view_tx: watch::Sender<PlaybackView>,
    events_tx: broadcast::Sender<EngineEvent>,
    pub(crate) transport: Arc<T>,
}

impl<T: RemoteTransport + ?Sized> EngineShared<T> {
    pub(crate) fn new(transport: Arc<T>, config: EngineConfig) -> Self {
        let (view_tx, _) = watch::channel(PlaybackView::default());
        let (events_tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            config,
            state: Mutex::new(EngineState::default()),
            view_tx,
            events_tx,
            transport,
        }
    }

    fn lock(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Marks the engine live under a fresh generation and returns it.
    pub(crate) fn begin_activation(&self) -> u64 {
        let mut state = self.lock();
        state.generation += 1;
        state.live = true;
        state.generation
    }

    /// Marks the engine dead. From here on no pending result can land.
    pub(crate) fn end_activation(&self) -> u64 {
        let mut state = self.lock();
        state.live = false;
        state.generation += 1;
        state.generation
    }

    pub(crate) fn is_current(&self, generation: u64) -> bool {
        let state = self.lock();
        state.live && state.generation == generation
    }

    /// Applies `f` to the store if `generation` is still the live one.
    ///
    /// `f` reports whether it changed anything; the view is republished only
    /// then. Returns that report, or `false` when the write was discarded.
    pub(crate) fn mutate_if_current<F>(&self, generation: u64, f: F) -> bool
    where
        F: FnOnce(&mut PlaybackStateStore) -> bool,
    {
        let mut state = self.lock();
        if !state.live || state.generation != generation {
            trace!(generation, current = state.generation, "Discarding stale write");
            return false;
        }
        let changed = f(&mut state.store);
        if changed {
            // Published under the lock so subscribers see revisions in order.
            self.view_tx.send_replace(state.store.view());
        }
        changed
    }

    pub(crate) fn view(&self) -> PlaybackView {
        self.view_tx.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<PlaybackView> {
        self.view_tx.subscribe()
    }

    pub(crate) fn events(&self) -> broadcast::Receiver<EngineEvent> {
        self.events_tx.subscribe()
    }

    pub(crate) fn emit(&self, event: EngineEvent) {
        // No receiver is not an error
        let _ = self.events_tx.send(event);
    }

    /// Fetches the current snapshot and hard-syncs the store with it.
    pub(crate) async fn refresh_current(&self, generation: u64) {
        match self.transport.fetch_current().await {
            Ok(snapshot) => {
                let playing = snapshot.as_ref().map(|s| s.is_playing);
                let applied = self.mutate_if_current(generation, |store| {
                    store.apply_current(snapshot);
                    true
                });
                if applied {
                    trace!(generation, ?playing, "Applied current playback");
                }
            }
            Err(err) => self.report_failure(generation, "currently-playing", err),
        }
    }

    pub(crate) async fn refresh_queue(&self, generation: u64) {
        match self.transport.fetch_queue().await {
            Ok(queue) => {
                self.mutate_if_current(generation, |store| {
                    store.apply_queue(queue);
                    true
                });
            }
            Err(err) => self.report_failure(generation, "queue", err),
        }
    }

    /// Both reads run concurrently; each lands on its own.
    pub(crate) async fn refresh_all(&self, generation: u64) {
        tokio::join!(
            self.refresh_current(generation),
            self.refresh_queue(generation)
        );
    }

    /// Poll failures stop here: logged, and surfaced as an event when the
    /// session is gone.
    fn report_failure(&self, generation: u64, what: &str, err: TransportError) {
        if !self.is_current(generation) {
            debug!(generation, what, "Ignoring failure from a past activation: {err}");
            return;
        }
        match err {
            TransportError::Unauthorized(message) => {
                error!(generation, what, "Session rejected by the proxy: {message}");
                self.emit(EngineEvent::Unauthorized { message });
            }
            TransportError::Transient(message) => {
                warn!(generation, what, "Poll failed, keeping last known state: {message}");
            }
        }
    }
}
