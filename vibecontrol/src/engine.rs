//! The now-playing engine handle.
//!
//! [`PlaybackEngine`] owns one [`PlaybackStateStore`](crate::store::PlaybackStateStore)
//! and, while active, two timers feeding it: the [`PollScheduler`] for
//! authoritative refreshes and the [`ClockTicker`] for interpolation. User
//! commands go through the [`CommandCoordinator`].
//!
//! The host ties [`activate`](PlaybackEngine::activate) and
//! [`deactivate`](PlaybackEngine::deactivate) to its session lifecycle. Each
//! activation gets a new generation number; anything started under an older
//! generation is cancelled, and its results are discarded if they land anyway.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use vibeconfig::Config;
use vibespotify::SpotifyClient;

use crate::clock_ticker::ClockTicker;
use crate::config::EngineConfig;
use crate::config_ext::PlaybackConfigExt;
use crate::coordinator::CommandCoordinator;
use crate::errors::ControlError;
use crate::model::{CommandIntent, CommandKind, EngineEvent, PlayHistoryItem, PlaybackView, Track};
use crate::poll_scheduler::PollScheduler;
use crate::shared::{Activation, EngineShared};
use crate::transport::RemoteTransport;

struct ActiveSession {
    activation: Activation,
    poller: PollScheduler,
    ticker: ClockTicker,
}

impl ActiveSession {
    fn teardown(self) {
        self.activation.cancel.cancel();
        self.poller.stop();
        self.ticker.stop();
    }
}

/// Keeps a now-playing view in step with the remote player.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use vibecontrol::{EngineConfig, PlaybackEngine};
/// use vibespotify::SpotifyClient;
///
/// # async fn example() -> anyhow::Result<()> {
/// let engine = PlaybackEngine::new(Arc::new(SpotifyClient::new()?), EngineConfig::default());
/// engine.activate();
///
/// let mut view = engine.subscribe();
/// view.changed().await?;
/// println!("{} {}", view.borrow().progress_label(), view.borrow().duration_label());
///
/// engine.pause().await?;
/// engine.deactivate();
/// # Ok(())
/// # }
/// ```
pub struct PlaybackEngine<T: RemoteTransport + ?Sized + 'static> {
    shared: Arc<EngineShared<T>>,
    coordinator: CommandCoordinator<T>,
    session: Mutex<Option<ActiveSession>>,
}

impl PlaybackEngine<SpotifyClient> {
    /// Engine over the proxy client, both configured from `config`.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let client = SpotifyClient::from_config_obj(config)?;
        Ok(Self::new(Arc::new(client), config.playback_engine_config()?))
    }
}

impl<T: RemoteTransport + ?Sized + 'static> PlaybackEngine<T> {
    /// Creates an inactive engine. Nothing is polled until [`activate`](Self::activate).
    pub fn new(transport: Arc<T>, config: EngineConfig) -> Self {
        let shared = Arc::new(EngineShared::new(transport, config.sanitized()));
        Self {
            coordinator: CommandCoordinator::new(shared.clone()),
            shared,
            session: Mutex::new(None),
        }
    }

    fn session(&self) -> MutexGuard<'_, Option<ActiveSession>> {
        self.session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn current_activation(&self) -> Option<Activation> {
        self.session().as_ref().map(|s| s.activation.clone())
    }

    /// Starts fresh timers under a new generation.
    ///
    /// Does nothing if already active. Must be called from within a Tokio
    /// runtime.
    pub fn activate(&self) {
        let mut session = self.session();
        if session.is_some() {
            debug!("Engine already active");
            return;
        }

        let activation = Activation {
            generation: self.shared.begin_activation(),
            cancel: CancellationToken::new(),
        };
        let generation = activation.generation;

        *session = Some(ActiveSession {
            poller: PollScheduler::start(self.shared.clone(), activation.clone()),
            ticker: ClockTicker::start(self.shared.clone(), activation.clone()),
            activation,
        });
        drop(session);

        info!(generation, "Playback engine activated");
        self.shared.emit(EngineEvent::Activated { generation });
    }

    /// Stops both timers and any pending reconciliation.
    ///
    /// Synchronous: once this returns no store write can happen, even if a
    /// request issued earlier completes later. Does nothing if inactive.
    pub fn deactivate(&self) {
        let mut session = self.session();
        let Some(active) = session.take() else {
            return;
        };
        let generation = active.activation.generation;

        // Still under the session lock, so a racing activate cannot slip in
        // between and have its generation retired.
        self.shared.end_activation();
        drop(session);
        active.teardown();

        info!(generation, "Playback engine deactivated");
        self.shared.emit(EngineEvent::Deactivated { generation });
    }

    pub fn is_active(&self) -> bool {
        self.session().is_some()
    }

    /// Latest derived view
    pub fn view(&self) -> PlaybackView {
        self.shared.view()
    }

    /// Notified on every store write that changed something
    pub fn subscribe(&self) -> watch::Receiver<PlaybackView> {
        self.shared.subscribe()
    }

    pub fn events(&self) -> broadcast::Receiver<EngineEvent> {
        self.shared.events()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.shared.config
    }

    /// Upcoming tracks, truncated to the configured display limit
    pub fn upcoming(&self) -> Vec<Track> {
        self.view()
            .queue
            .head(self.shared.config.queue_display_limit)
            .to_vec()
    }

    /// Runs the optimistic command protocol for `kind`.
    ///
    /// The optimistic update is applied on the first poll of the returned
    /// future, before the command leaves. A transport failure is returned but
    /// not rolled back; the reconciliation poll scheduled either way corrects
    /// the display.
    pub async fn issue(&self, kind: CommandKind) -> Result<CommandIntent, ControlError> {
        let activation = self.current_activation().ok_or(ControlError::Inactive)?;
        let intent = CommandIntent::new(kind);
        self.coordinator.apply_optimistic(kind, &activation);
        self.coordinator.dispatch(intent, activation).await
    }

    pub async fn play(&self) -> Result<CommandIntent, ControlError> {
        self.issue(CommandKind::Play).await
    }

    pub async fn pause(&self) -> Result<CommandIntent, ControlError> {
        self.issue(CommandKind::Pause).await
    }

    pub async fn next(&self) -> Result<CommandIntent, ControlError> {
        self.issue(CommandKind::Next).await
    }

    pub async fn previous(&self) -> Result<CommandIntent, ControlError> {
        self.issue(CommandKind::Previous).await
    }

    /// `pause` when the display shows Playing, `play` otherwise
    pub async fn toggle_play_pause(&self) -> Result<CommandIntent, ControlError> {
        let kind = if self.view().is_playing {
            CommandKind::Pause
        } else {
            CommandKind::Play
        };
        self.issue(kind).await
    }

    /// Polls current playback and queue now, outside the schedule.
    ///
    /// Failures are handled like those of the periodic poll.
    pub async fn refresh_now(&self) -> Result<(), ControlError> {
        let activation = self.current_activation().ok_or(ControlError::Inactive)?;
        self.shared.refresh_all(activation.generation).await;
        Ok(())
    }

    /// Recently played tracks. Read-only, the store is left alone.
    pub async fn recently_played(
        &self,
        limit: u32,
    ) -> Result<Vec<PlayHistoryItem>, ControlError> {
        Ok(self.shared.transport.fetch_recently_played(limit).await?)
    }
}

impl<T: RemoteTransport + ?Sized + 'static> Drop for PlaybackEngine<T> {
    fn drop(&mut self) {
        let mut session = self.session();
        if let Some(active) = session.take() {
            self.shared.end_activation();
            drop(session);
            active.teardown();
        }
    }
}
