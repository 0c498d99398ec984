//! # vibecontrol - Now-playing synchronization engine
//!
//! Keeps a "now playing" display and its transport controls consistent with a
//! remote Spotify device that changes state on its own.
//!
//! Two clocks feed one store:
//!
//! - a slow authoritative poll (every 5 s) that overwrites the snapshot and
//!   resets the displayed progress to the reported value (hard sync),
//! - a fast local tick (every 1 s) that advances the progress while playing,
//!   clamped to the track duration.
//!
//! User commands update the display optimistically, are sent to the proxy,
//! and are always followed by a reconciliation poll 500 ms later. That poll is
//! the only correction path: failed commands are never rolled back locally.
//!
//! ```text
//!  PollScheduler ──► RemoteTransport ──► PlaybackStateStore ◄── ClockTicker
//!                                             ▲
//!                         CommandCoordinator ─┘──► RemoteTransport
//! ```
//!
//! ## Lifecycle
//!
//! [`PlaybackEngine::activate`] creates both timers under a new generation;
//! [`PlaybackEngine::deactivate`] destroys them and bumps the generation, so a
//! request that was already in flight cannot write into the store when it
//! completes.
//!
//! ## Errors
//!
//! Poll failures never leave the engine. A [`TransportError::Transient`] is
//! logged and the last known state stays on screen; a
//! [`TransportError::Unauthorized`] is also reported as
//! [`EngineEvent::Unauthorized`] so the host can send the user back to login.

mod clock_ticker;
mod coordinator;
mod poll_scheduler;
mod shared;

pub mod config;
pub mod config_ext;
pub mod engine;
pub mod errors;
pub mod model;
pub mod store;
pub mod time_utils;
pub mod transport;

pub use config::EngineConfig;
pub use config_ext::PlaybackConfigExt;
pub use engine::PlaybackEngine;
pub use errors::{ControlError, TransportError};
pub use model::{
    CommandIntent, CommandKind, EngineEvent, PlayHistoryItem, PlayState, PlaybackSnapshot,
    PlaybackView, QueueSnapshot, Track,
};
pub use store::PlaybackStateStore;
pub use transport::RemoteTransport;
