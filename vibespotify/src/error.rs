//! Error types for the Spotify proxy client

use thiserror::Error;

/// Result type alias for proxy operations
pub type Result<T> = std::result::Result<T, SpotifyError>;

/// Errors that can occur when talking to the Spotify proxy
#[derive(Error, Debug)]
pub enum SpotifyError {
    /// Session missing or expired (HTTP 401, or a redirect towards the login flow)
    #[error("Authentication required: {0}")]
    Unauthorized(String),

    /// Non-success status returned by the proxy
    #[error("Spotify API error (code {code}): {message}")]
    Api { code: u16, message: String },

    /// Transport-level HTTP failure (connect, timeout, body read)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Configuration problem (base URL, cookie header)
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    #[error("{0}")]
    Other(String),
}

impl SpotifyError {
    /// Builds an error from an HTTP status code and a message.
    ///
    /// 401 and every 3xx become [`SpotifyError::Unauthorized`]. 403 is kept as
    /// an API error: the proxy uses it for missing scopes and the upstream for
    /// device control refused on the account, neither of which a new login fixes.
    pub fn from_status_code(code: u16, message: impl Into<String>) -> Self {
        match code {
            401 | 300..=399 => Self::Unauthorized(message.into()),
            _ => Self::Api {
                code,
                message: message.into(),
            },
        }
    }

    /// True when the session must be re-established
    pub fn is_auth_error(&self) -> bool {
        matches!(self, SpotifyError::Unauthorized(_))
    }

    /// HTTP status attached to the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            SpotifyError::Api { code, .. } => Some(*code),
            SpotifyError::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}
