//! # vibespotify - Client for the VibeMusic Spotify proxy
//!
//! The browser never talks to Spotify directly: an authenticated reverse
//! proxy (mounted at `/api/spotify`) holds the OAuth tokens in cookies and
//! forwards a small set of routes upstream. This crate is the Rust side of
//! that boundary.
//!
//! ## Routes
//!
//! | Method | Route                 | Result                                   |
//! |--------|-----------------------|------------------------------------------|
//! | GET    | `currently-playing`   | [`PlaybackSnapshot`] or nothing playing  |
//! | GET    | `queue`               | upcoming [`Track`]s                      |
//! | GET    | `recently-played`     | [`PlayHistoryItem`]s                     |
//! | GET    | `auth/status`         | [`AuthStatus`]                           |
//! | PUT    | `player/play`, `player/pause`         | empty                    |
//! | POST   | `player/next`, `player/previous`      | empty                    |
//!
//! ## Errors
//!
//! An expired session shows up either as a 401 or as a redirect towards the
//! login route; both become [`SpotifyError::Unauthorized`]. Everything else
//! is a plain failure the caller may retry later.
//!
//! ```rust,no_run
//! use vibespotify::{SpotifyClient, SpotifyError};
//!
//! # async fn example() -> Result<(), SpotifyError> {
//! let client = SpotifyClient::from_config()?;
//! match client.pause().await {
//!     Ok(()) => {}
//!     Err(e) if e.is_auth_error() => println!("please log in again"),
//!     Err(e) => println!("pause failed: {e}"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config_ext;
pub mod error;
pub mod models;

pub use client::{ClientBuilder, PlayerCommand, SpotifyClient};
pub use config_ext::SpotifyConfigExt;
pub use error::{Result, SpotifyError};
pub use models::{
    Artist, AuthStatus, CurrentlyPlaying, PlayHistoryItem, PlaybackSnapshot, QueueResponse,
    RecentlyPlayedResponse, Track,
};
