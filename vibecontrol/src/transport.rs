//! Remote seam of the engine.
//!
//! The engine only needs a handful of round trips; [`RemoteTransport`] names
//! them so tests can script the remote and the host can plug in any client.

use async_trait::async_trait;
use tracing::trace;
use vibespotify::{PlayerCommand, SpotifyClient};

use crate::errors::TransportError;
use crate::model::{CommandKind, PlayHistoryItem, PlaybackSnapshot, QueueSnapshot};

#[async_trait]
pub trait RemoteTransport: Send + Sync {
    /// Current playback, `None` when nothing is playing
    async fn fetch_current(&self) -> Result<Option<PlaybackSnapshot>, TransportError>;

    async fn fetch_queue(&self) -> Result<QueueSnapshot, TransportError>;

    async fn fetch_recently_played(
        &self,
        limit: u32,
    ) -> Result<Vec<PlayHistoryItem>, TransportError>;

    async fn send_play(&self) -> Result<(), TransportError>;

    async fn send_pause(&self) -> Result<(), TransportError>;

    async fn send_next(&self) -> Result<(), TransportError>;

    async fn send_previous(&self) -> Result<(), TransportError>;

    /// Dispatches `kind` to the matching `send_*` call.
    async fn send_command(&self, kind: CommandKind) -> Result<(), TransportError> {
        match kind {
            CommandKind::Play => self.send_play().await,
            CommandKind::Pause => self.send_pause().await,
            CommandKind::Next => self.send_next().await,
            CommandKind::Previous => self.send_previous().await,
        }
    }
}

impl From<CommandKind> for PlayerCommand {
    fn from(kind: CommandKind) -> Self {
        match kind {
            CommandKind::Play => PlayerCommand::Play,
            CommandKind::Pause => PlayerCommand::Pause,
            CommandKind::Next => PlayerCommand::Next,
            CommandKind::Previous => PlayerCommand::Previous,
        }
    }
}

#[async_trait]
impl RemoteTransport for SpotifyClient {
    async fn fetch_current(&self) -> Result<Option<PlaybackSnapshot>, TransportError> {
        Ok(self.current_playback().await?)
    }

    async fn fetch_queue(&self) -> Result<QueueSnapshot, TransportError> {
        let tracks = self.queue().await?;
        trace!("Fetched queue with {} tracks", tracks.len());
        Ok(QueueSnapshot::new(tracks))
    }

    async fn fetch_recently_played(
        &self,
        limit: u32,
    ) -> Result<Vec<PlayHistoryItem>, TransportError> {
        Ok(self.recently_played(limit).await?)
    }

    async fn send_play(&self) -> Result<(), TransportError> {
        self.send_command(CommandKind::Play).await
    }

    async fn send_pause(&self) -> Result<(), TransportError> {
        self.send_command(CommandKind::Pause).await
    }

    async fn send_next(&self) -> Result<(), TransportError> {
        self.send_command(CommandKind::Next).await
    }

    async fn send_previous(&self) -> Result<(), TransportError> {
        self.send_command(CommandKind::Previous).await
    }

    async fn send_command(&self, kind: CommandKind) -> Result<(), TransportError> {
        Ok(self.command(kind.into()).await?)
    }
}
