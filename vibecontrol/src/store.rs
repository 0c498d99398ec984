//! Reconciliation core: authoritative snapshot plus interpolated progress.
//!
//! The store has exactly four writers:
//! - [`PlaybackStateStore::apply_current`] / [`PlaybackStateStore::apply_queue`]
//!   for poll results (hard sync),
//! - [`PlaybackStateStore::tick`] for local interpolation,
//! - [`PlaybackStateStore::apply_optimistic`] for user commands.
//!
//! Invariant: `0 <= interpolated_progress <= duration` at all times.

use crate::model::{CommandKind, PlayState, PlaybackSnapshot, PlaybackView, QueueSnapshot};

#[derive(Debug, Default, Clone)]
pub struct PlaybackStateStore {
    snapshot: Option<PlaybackSnapshot>,
    queue: QueueSnapshot,
    interpolated_progress: u64,
    revision: u64,
}

impl PlaybackStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the snapshot wholesale and resets progress to the reported
    /// position, discarding whatever the ticks accumulated.
    ///
    /// `None` means nothing is playing: progress drops to 0 and the state
    /// reads as paused.
    pub fn apply_current(&mut self, snapshot: Option<PlaybackSnapshot>) {
        self.interpolated_progress = snapshot
            .as_ref()
            .map(|s| s.progress_ms.min(s.track.duration_ms))
            .unwrap_or(0);
        self.snapshot = snapshot;
        self.revision += 1;
    }

    pub fn apply_queue(&mut self, queue: QueueSnapshot) {
        self.queue = queue;
        self.revision += 1;
    }

    /// Advances progress by `step_ms` while playing, freezing at the duration.
    ///
    /// Returns `true` when the progress actually moved.
    pub fn tick(&mut self, step_ms: u64) -> bool {
        let Some(snapshot) = &self.snapshot else {
            return false;
        };
        if !snapshot.is_playing {
            return false;
        }

        let duration = snapshot.track.duration_ms;
        let next = self.interpolated_progress.saturating_add(step_ms).min(duration);
        if next == self.interpolated_progress {
            return false;
        }
        self.interpolated_progress = next;
        self.revision += 1;
        true
    }

    /// Overwrites `snapshot.is_playing` with the state implied by `kind`.
    ///
    /// Returns `true` when the displayed state changed. Commands without an
    /// optimistic effect, or issued while nothing is playing, change nothing.
    pub fn apply_optimistic(&mut self, kind: CommandKind) -> bool {
        let Some(target) = kind.optimistic_state() else {
            return false;
        };
        let Some(snapshot) = self.snapshot.as_mut() else {
            return false;
        };
        if snapshot.is_playing == target.is_playing() {
            return false;
        }
        snapshot.is_playing = target.is_playing();
        self.revision += 1;
        true
    }

    pub fn snapshot(&self) -> Option<&PlaybackSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn queue(&self) -> &QueueSnapshot {
        &self.queue
    }

    pub fn interpolated_progress(&self) -> u64 {
        self.interpolated_progress
    }

    pub fn is_playing(&self) -> bool {
        self.snapshot.as_ref().is_some_and(|s| s.is_playing)
    }

    pub fn play_state(&self) -> PlayState {
        PlayState::from_playing(self.is_playing())
    }

    pub fn duration_ms(&self) -> u64 {
        self.snapshot.as_ref().map(|s| s.track.duration_ms).unwrap_or(0)
    }

    /// Number of writes applied so far
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn view(&self) -> PlaybackView {
        PlaybackView {
            track: self.snapshot.as_ref().map(|s| s.track.clone()),
            is_playing: self.is_playing(),
            progress_ms: self.interpolated_progress,
            duration_ms: self.duration_ms(),
            queue: self.queue.clone(),
            revision: self.revision,
        }
    }
}
