//! Data models returned by the Spotify proxy
//!
//! The proxy flattens upstream Spotify objects before handing them to the
//! browser: a track carries a single `image` and a single `external_url`
//! instead of the nested `album.images` / `external_urls` of the raw API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An artist credited on a track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
}

/// A track as flattened by the proxy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Spotify track ID (absent for some local files)
    #[serde(default)]
    pub id: Option<String>,

    /// Track title
    #[serde(alias = "title")]
    pub name: String,

    #[serde(default)]
    pub artists: Vec<Artist>,

    /// Album art URL
    #[serde(default, alias = "album_art")]
    pub image: Option<String>,

    /// Link to the track in the Spotify web player
    #[serde(default)]
    pub external_url: Option<String>,

    #[serde(default)]
    pub uri: Option<String>,

    /// Track length in milliseconds
    #[serde(default)]
    pub duration_ms: u64,
}

impl Track {
    /// Artist names joined with ", "
    ///
    /// ```
    /// # use vibespotify::{Artist, Track};
    /// let track = Track {
    ///     id: None,
    ///     name: "Plastic Love".into(),
    ///     artists: vec![
    ///         Artist { id: None, name: "Mariya Takeuchi".into() },
    ///         Artist { id: None, name: "Tatsuro Yamashita".into() },
    ///     ],
    ///     image: None,
    ///     external_url: None,
    ///     uri: None,
    ///     duration_ms: 474_000,
    /// };
    /// assert_eq!(track.artist_line(), "Mariya Takeuchi, Tatsuro Yamashita");
    /// ```
    pub fn artist_line(&self) -> String {
        self.artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Body of `GET /currently-playing`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurrentlyPlaying {
    #[serde(default)]
    pub is_playing: bool,
    #[serde(default)]
    pub item: Option<Track>,
    #[serde(default)]
    pub progress_ms: Option<u64>,
}

/// A complete playback snapshot
///
/// Only built when the proxy reports a track; "nothing playing" is
/// represented by the absence of a snapshot, never by a half-filled one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackSnapshot {
    pub track: Track,
    pub is_playing: bool,
    /// Elapsed position at poll time, `0 <= progress_ms <= track.duration_ms`
    pub progress_ms: u64,
    pub polled_at: DateTime<Utc>,
}

impl PlaybackSnapshot {
    /// Builds a snapshot from a proxy response.
    ///
    /// Returns `None` when no track is reported. The reported progress is
    /// clamped to the track duration.
    pub fn from_currently_playing(body: CurrentlyPlaying, polled_at: DateTime<Utc>) -> Option<Self> {
        let track = body.item?;
        let progress_ms = body.progress_ms.unwrap_or(0).min(track.duration_ms);
        Some(Self {
            track,
            is_playing: body.is_playing,
            progress_ms,
            polled_at,
        })
    }

    pub fn duration_ms(&self) -> u64 {
        self.track.duration_ms
    }
}

/// Body of `GET /queue`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueueResponse {
    #[serde(default)]
    pub queue: Vec<Track>,
}

/// One entry of `GET /recently-played`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayHistoryItem {
    #[serde(default)]
    pub played_at: Option<DateTime<Utc>>,
    pub track: Track,
}

/// Body of `GET /recently-played`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecentlyPlayedResponse {
    #[serde(default)]
    pub items: Vec<PlayHistoryItem>,
}

/// Body of `GET /auth/status`
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AuthStatus {
    #[serde(default)]
    pub authenticated: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn track_json(duration: u64) -> serde_json::Value {
        json!({
            "id": "4iV5W9uYEdYUVa79Axb7Rh",
            "name": "Midnight Pretenders",
            "duration_ms": duration,
            "artists": [{"name": "Tomoko Aran"}],
            "image": "https://i.scdn.co/image/ab67616d0000b273",
            "external_url": "https://open.spotify.com/track/4iV5W9uYEdYUVa79Axb7Rh"
        })
    }

    #[test]
    fn test_parse_flattened_track() {
        let track: Track = serde_json::from_value(track_json(271_000)).unwrap();
        assert_eq!(track.name, "Midnight Pretenders");
        assert_eq!(track.duration_ms, 271_000);
        assert_eq!(track.artist_line(), "Tomoko Aran");
        assert!(track.uri.is_none());
    }

    #[test]
    fn test_missing_duration_defaults_to_zero() {
        let track: Track = serde_json::from_value(json!({"name": "Untitled"})).unwrap();
        assert_eq!(track.duration_ms, 0);
        assert!(track.artists.is_empty());
    }

    #[test]
    fn test_snapshot_clamps_progress() {
        let body: CurrentlyPlaying = serde_json::from_value(json!({
            "is_playing": true,
            "item": track_json(200_000),
            "progress_ms": 250_000
        }))
        .unwrap();
        let snapshot = PlaybackSnapshot::from_currently_playing(body, Utc::now()).unwrap();
        assert_eq!(snapshot.progress_ms, 200_000);
        assert!(snapshot.is_playing);
    }

    #[test]
    fn test_snapshot_absent_without_item() {
        let body: CurrentlyPlaying =
            serde_json::from_value(json!({"is_playing": false, "item": null})).unwrap();
        assert!(PlaybackSnapshot::from_currently_playing(body, Utc::now()).is_none());
    }

    #[test]
    fn test_parse_recently_played() {
        let body: RecentlyPlayedResponse = serde_json::from_value(json!({
            "items": [
                {"played_at": "2024-05-01T21:15:04.123Z", "track": track_json(1000)}
            ]
        }))
        .unwrap();
        assert_eq!(body.items.len(), 1);
        assert!(body.items[0].played_at.is_some());
    }
}
