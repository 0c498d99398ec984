//! HTTP client for the Spotify proxy
//!
//! Every call is a single round trip. No retry happens here: callers poll
//! periodically and simply try again on their next cycle.

use crate::config_ext::SpotifyConfigExt;
use crate::error::{Result, SpotifyError};
use crate::models::{
    AuthStatus, CurrentlyPlaying, PlayHistoryItem, PlaybackSnapshot, QueueResponse,
    RecentlyPlayedResponse, Track,
};
use chrono::Utc;
use reqwest::header::{COOKIE, HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, redirect};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;
use vibeconfig::Config;

/// Default proxy mount point
pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000/api/spotify";

/// Default timeout for proxy requests
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Default User-Agent
pub const DEFAULT_USER_AGENT: &str = "vibespotify/0.1.0";

/// Transport command understood by the proxy's `/player/*` routes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerCommand {
    Play,
    Pause,
    Next,
    Previous,
}

impl PlayerCommand {
    fn route(self) -> &'static str {
        match self {
            PlayerCommand::Play => "player/play",
            PlayerCommand::Pause => "player/pause",
            PlayerCommand::Next => "player/next",
            PlayerCommand::Previous => "player/previous",
        }
    }

    fn method(self) -> Method {
        match self {
            PlayerCommand::Play | PlayerCommand::Pause => Method::PUT,
            PlayerCommand::Next | PlayerCommand::Previous => Method::POST,
        }
    }
}

/// Spotify proxy HTTP client
///
/// Redirects are never followed: the proxy answers an expired session with a
/// redirect to its login route, which is surfaced as
/// [`SpotifyError::Unauthorized`].
///
/// # Example
///
/// ```no_run
/// use vibespotify::SpotifyClient;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = SpotifyClient::builder()
///         .api_base("http://127.0.0.1:8000/api/spotify")
///         .build()?;
///     if let Some(snapshot) = client.current_playback().await? {
///         println!("{} - {}", snapshot.track.artist_line(), snapshot.track.name);
///     }
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct SpotifyClient {
    client: Client,
    api_base: String,
}

impl SpotifyClient {
    /// Create a client with default settings
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Create a builder for configuring the client
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Create a client from the global configuration
    pub fn from_config() -> Result<Self> {
        let config = vibeconfig::get_config();
        Self::from_config_obj(config.as_ref())
    }

    /// Create a client from a specific Config object
    pub fn from_config_obj(config: &Config) -> Result<Self> {
        let mut builder = Self::builder()
            .api_base(config.get_spotify_api_base()?)
            .timeout(config.get_spotify_request_timeout()?);
        if let Some(cookie) = config.get_spotify_session_cookie()? {
            builder = builder.session_cookie(cookie);
        }
        builder.build()
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn endpoint(&self, route: &str) -> Result<Url> {
        Ok(Url::parse(&format!(
            "{}/{}",
            self.api_base.trim_end_matches('/'),
            route
        ))?)
    }

    /// Sends a request and maps every non-success status to a typed error.
    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        if status.is_redirection() {
            let target = response
                .headers()
                .get(reqwest::header::LOCATION)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("")
                .to_string();
            debug!(status = status.as_u16(), %target, "Proxy redirected, session is gone");
            return Err(SpotifyError::Unauthorized(format!(
                "redirected to {}",
                if target.is_empty() { "login" } else { &target }
            )));
        }

        let message = error_message(status, response).await;
        Err(SpotifyError::from_status_code(status.as_u16(), message))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<Option<T>> {
        debug!(%url, "GET");
        let response = self.send(self.client.get(url)).await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    /// Current playback snapshot, `None` when nothing is playing
    pub async fn current_playback(&self) -> Result<Option<PlaybackSnapshot>> {
        let url = self.endpoint("currently-playing")?;
        let body: Option<CurrentlyPlaying> = self.get_json(url).await?;
        Ok(body.and_then(|b| PlaybackSnapshot::from_currently_playing(b, Utc::now())))
    }

    /// Upcoming tracks, in play order
    pub async fn queue(&self) -> Result<Vec<Track>> {
        let url = self.endpoint("queue")?;
        let body: Option<QueueResponse> = self.get_json(url).await?;
        Ok(body.map(|b| b.queue).unwrap_or_default())
    }

    /// Recently played tracks, most recent first
    pub async fn recently_played(&self, limit: u32) -> Result<Vec<PlayHistoryItem>> {
        let mut url = self.endpoint("recently-played")?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string());
        let body: Option<RecentlyPlayedResponse> = self.get_json(url).await?;
        Ok(body.map(|b| b.items).unwrap_or_default())
    }

    /// Whether the proxy holds a usable session
    pub async fn auth_status(&self) -> Result<AuthStatus> {
        let url = self.endpoint("auth/status")?;
        Ok(self.get_json(url).await?.unwrap_or_default())
    }

    /// Sends a transport command; the response body is ignored
    pub async fn command(&self, command: PlayerCommand) -> Result<()> {
        let url = self.endpoint(command.route())?;
        debug!(?command, %url, "Sending player command");
        self.send(self.client.request(command.method(), url)).await?;
        Ok(())
    }

    pub async fn play(&self) -> Result<()> {
        self.command(PlayerCommand::Play).await
    }

    pub async fn pause(&self) -> Result<()> {
        self.command(PlayerCommand::Pause).await
    }

    pub async fn next(&self) -> Result<()> {
        self.command(PlayerCommand::Next).await
    }

    pub async fn previous(&self) -> Result<()> {
        self.command(PlayerCommand::Previous).await
    }

    /// Get the internal HTTP client
    pub fn http_client(&self) -> &Client {
        &self.client
    }
}

/// Extracts `detail` or `message` from a JSON error body, falling back to the
/// status reason.
async fn error_message(status: StatusCode, response: Response) -> String {
    let fallback = format!(
        "API Error: {}",
        status.canonical_reason().unwrap_or("unknown status")
    );
    let Ok(value) = response.json::<serde_json::Value>().await else {
        return fallback;
    };
    value
        .get("detail")
        .or_else(|| value.get("message"))
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .unwrap_or(fallback)
}

/// Builder for configuring a SpotifyClient
#[derive(Debug)]
pub struct ClientBuilder {
    client: Option<Client>,
    api_base: String,
    request_timeout: Duration,
    user_agent: String,
    session_cookie: Option<String>,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            client: None,
            api_base: DEFAULT_API_BASE.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            session_cookie: None,
        }
    }
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a custom HTTP client
    ///
    /// The caller is then responsible for disabling redirects on it.
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the proxy base URL (e.g. `https://host/api/spotify`)
    pub fn api_base(mut self, url: impl Into<String>) -> Self {
        self.api_base = url.into();
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Session cookie sent with every request (`access_token=...; refresh_token=...`)
    pub fn session_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.session_cookie = Some(cookie.into());
        self
    }

    /// Build the client
    pub fn build(self) -> Result<SpotifyClient> {
        Url::parse(&self.api_base)?;

        let client = match self.client {
            Some(client) => client,
            None => {
                let mut headers = HeaderMap::new();
                if let Some(cookie) = &self.session_cookie {
                    let value = HeaderValue::from_str(cookie)
                        .map_err(|e| SpotifyError::other(format!("Invalid session cookie: {}", e)))?;
                    headers.insert(COOKIE, value);
                }

                Client::builder()
                    .user_agent(&self.user_agent)
                    .timeout(self.request_timeout)
                    .redirect(redirect::Policy::none())
                    .default_headers(headers)
                    .build()?
            }
        };

        Ok(SpotifyClient {
            client,
            api_base: self.api_base,
        })
    }
}
