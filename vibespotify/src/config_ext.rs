//! Spotify proxy settings for vibeconfig
//!
//! Adds the `accounts.spotify.*` getters and setters to [`vibeconfig::Config`].

use crate::client::{DEFAULT_API_BASE, DEFAULT_REQUEST_TIMEOUT_SECS};
use anyhow::{Result, anyhow};
use serde_yaml::Value;
use std::time::Duration;
use vibeconfig::Config;

const DEFAULT_RECENTLY_PLAYED_LIMIT: u32 = 10;

/// Extension trait for the proxy settings
///
/// # Example
///
/// ```rust,ignore
/// use vibeconfig::get_config;
/// use vibespotify::SpotifyConfigExt;
///
/// let config = get_config();
/// println!("Proxy at {}", config.get_spotify_api_base()?);
/// ```
pub trait SpotifyConfigExt {
    /// Base URL of the proxy's Spotify routes
    fn get_spotify_api_base(&self) -> Result<String>;

    fn set_spotify_api_base(&self, url: &str) -> Result<()>;

    /// Per-request timeout
    fn get_spotify_request_timeout(&self) -> Result<Duration>;

    /// Session cookie forwarded to the proxy, `None` when not configured
    fn get_spotify_session_cookie(&self) -> Result<Option<String>>;

    fn set_spotify_session_cookie(&self, cookie: &str) -> Result<()>;

    /// Number of entries requested from `/recently-played`
    fn get_recently_played_limit(&self) -> Result<u32>;
}

impl SpotifyConfigExt for Config {
    fn get_spotify_api_base(&self) -> Result<String> {
        match self.get_value(&["accounts", "spotify", "api_base"]) {
            Ok(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
            Ok(Value::String(_)) | Err(_) => Ok(DEFAULT_API_BASE.to_string()),
            Ok(other) => Err(anyhow!("accounts.spotify.api_base is not a string: {:?}", other)),
        }
    }

    fn set_spotify_api_base(&self, url: &str) -> Result<()> {
        self.set_value(
            &["accounts", "spotify", "api_base"],
            Value::String(url.to_string()),
        )
    }

    fn get_spotify_request_timeout(&self) -> Result<Duration> {
        let secs = match self.get_u64(&["accounts", "spotify", "request_timeout_secs"]) {
            Some(0) | None => DEFAULT_REQUEST_TIMEOUT_SECS,
            Some(secs) => secs,
        };
        Ok(Duration::from_secs(secs))
    }

    fn get_spotify_session_cookie(&self) -> Result<Option<String>> {
        Ok(self.get_string(&["accounts", "spotify", "session_cookie"]))
    }

    fn set_spotify_session_cookie(&self, cookie: &str) -> Result<()> {
        self.set_value(
            &["accounts", "spotify", "session_cookie"],
            Value::String(cookie.to_string()),
        )
    }

    fn get_recently_played_limit(&self) -> Result<u32> {
        let limit = self
            .get_u64(&["accounts", "spotify", "recently_played_limit"])
            .and_then(|n| u32::try_from(n).ok())
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_RECENTLY_PLAYED_LIMIT);
        Ok(limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_yaml_str("{}").unwrap();
        assert_eq!(config.get_spotify_api_base().unwrap(), DEFAULT_API_BASE);
        assert_eq!(
            config.get_spotify_request_timeout().unwrap(),
            Duration::from_secs(10)
        );
        assert_eq!(config.get_spotify_session_cookie().unwrap(), None);
        assert_eq!(config.get_recently_played_limit().unwrap(), 10);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_yaml_str(
            "accounts:\n  spotify:\n    api_base: https://vibe.example/api/spotify\n    request_timeout_secs: 3\n    session_cookie: access_token=abc\n    recently_played_limit: 25\n",
        )
        .unwrap();
        assert_eq!(
            config.get_spotify_api_base().unwrap(),
            "https://vibe.example/api/spotify"
        );
        assert_eq!(
            config.get_spotify_request_timeout().unwrap(),
            Duration::from_secs(3)
        );
        assert_eq!(
            config.get_spotify_session_cookie().unwrap().as_deref(),
            Some("access_token=abc")
        );
        assert_eq!(config.get_recently_played_limit().unwrap(), 25);
    }
}
