use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::time_utils::{format_progress, progress_fraction};

pub use vibespotify::{PlayHistoryItem, PlaybackSnapshot, Track};

/// Transport control requested by the user
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandKind {
    Play,
    Pause,
    Next,
    Previous,
}

impl CommandKind {
    /// Play state this command implies, when it implies one.
    ///
    /// `Next` and `Previous` change the track, which is unknown locally, so
    /// they carry no optimistic effect.
    pub fn optimistic_state(self) -> Option<PlayState> {
        match self {
            CommandKind::Play => Some(PlayState::Playing),
            CommandKind::Pause => Some(PlayState::Paused),
            CommandKind::Next | CommandKind::Previous => None,
        }
    }
}

/// A command in flight, from optimistic mutation to reconciliation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommandIntent {
    pub kind: CommandKind,
    pub issued_at: DateTime<Utc>,
}

impl CommandIntent {
    pub fn new(kind: CommandKind) -> Self {
        Self {
            kind,
            issued_at: Utc::now(),
        }
    }
}

/// Displayed transport state. Starts `Paused` until the first poll.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayState {
    Playing,
    #[default]
    Paused,
}

impl PlayState {
    pub fn from_playing(is_playing: bool) -> Self {
        if is_playing {
            PlayState::Playing
        } else {
            PlayState::Paused
        }
    }

    pub fn is_playing(self) -> bool {
        matches!(self, PlayState::Playing)
    }
}

/// Upcoming tracks, replaced wholesale on each poll.
///
/// The full sequence is kept; truncation is a display concern, see
/// [`QueueSnapshot::head`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueSnapshot {
    pub tracks: Vec<Track>,
}

impl QueueSnapshot {
    pub fn new(tracks: Vec<Track>) -> Self {
        Self { tracks }
    }

    /// At most the first `n` upcoming tracks
    pub fn head(&self, n: usize) -> &[Track] {
        &self.tracks[..n.min(self.tracks.len())]
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter()
    }
}

/// Everything a view binds to, derived from the store in one piece.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlaybackView {
    pub track: Option<Track>,
    pub is_playing: bool,
    pub progress_ms: u64,
    pub duration_ms: u64,
    pub queue: QueueSnapshot,
    /// Number of store writes so far
    pub revision: u64,
}

impl PlaybackView {
    pub fn play_state(&self) -> PlayState {
        PlayState::from_playing(self.is_playing)
    }

    pub fn progress_label(&self) -> String {
        format_progress(self.progress_ms)
    }

    pub fn duration_label(&self) -> String {
        format_progress(self.duration_ms)
    }

    pub fn progress_fraction(&self) -> f64 {
        progress_fraction(self.progress_ms, self.duration_ms)
    }
}

/// Conditions reported to the host
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EngineEvent {
    Activated { generation: u64 },
    Deactivated { generation: u64 },
    /// The session is gone; the host should re-authenticate
    Unauthorized { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(name: &str) -> Track {
        Track {
            id: Some(name.to_lowercase()),
            name: name.to_string(),
            artists: vec![],
            image: None,
            external_url: None,
            uri: None,
            duration_ms: 180_000,
        }
    }

    #[test]
    fn test_queue_head_truncates() {
        let queue = QueueSnapshot::new(vec![track("A"), track("B"), track("C")]);
        assert_eq!(queue.head(2).len(), 2);
        assert_eq!(queue.head(10).len(), 3);
        assert_eq!(queue.head(0).len(), 0);
        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn test_optimistic_state() {
        assert_eq!(CommandKind::Play.optimistic_state(), Some(PlayState::Playing));
        assert_eq!(CommandKind::Pause.optimistic_state(), Some(PlayState::Paused));
        assert_eq!(CommandKind::Next.optimistic_state(), None);
        assert_eq!(CommandKind::Previous.optimistic_state(), None);
    }

    #[test]
    fn test_view_labels() {
        let view = PlaybackView {
            track: Some(track("A")),
            is_playing: true,
            progress_ms: 13_000,
            duration_ms: 200_000,
            ..Default::default()
        };
        assert_eq!(view.progress_label(), "0:13");
        assert_eq!(view.duration_label(), "3:20");
        assert_eq!(view.play_state(), PlayState::Playing);
        assert!((view.progress_fraction() - 0.065).abs() < 1e-9);
    }

    #[test]
    fn test_default_state_is_paused() {
        assert_eq!(PlayState::default(), PlayState::Paused);
        assert!(!PlaybackView::default().play_state().is_playing());
    }
}
