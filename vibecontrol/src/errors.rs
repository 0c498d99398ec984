use thiserror::Error;
use vibespotify::SpotifyError;

/// Failure of a single remote round trip.
///
/// Only two outcomes matter to the engine: the session is gone and the host
/// must re-authenticate, or something hiccuped and the next poll will try
/// again.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Session expired or missing: {0}")]
    Unauthorized(String),
    #[error("Transient remote failure: {0}")]
    Transient(String),
}

impl TransportError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, TransportError::Unauthorized(_))
    }

    pub fn unauthorized(message: &str) -> Self {
        TransportError::Unauthorized(message.to_string())
    }

    pub fn transient(message: &str) -> Self {
        TransportError::Transient(message.to_string())
    }
}

impl From<SpotifyError> for TransportError {
    fn from(err: SpotifyError) -> Self {
        if err.is_auth_error() {
            TransportError::Unauthorized(err.to_string())
        } else {
            TransportError::Transient(err.to_string())
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ControlError {
    #[error("Playback engine is not active")]
    Inactive,
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl ControlError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ControlError::Transport(e) if e.is_unauthorized())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spotify_error_classification() {
        let auth: TransportError = SpotifyError::from_status_code(401, "expired").into();
        assert!(auth.is_unauthorized());

        let redirect: TransportError = SpotifyError::from_status_code(302, "login").into();
        assert!(redirect.is_unauthorized());

        let forbidden: TransportError =
            SpotifyError::from_status_code(403, "Missing permissions.").into();
        assert!(matches!(forbidden, TransportError::Transient(_)));

        let other: TransportError = SpotifyError::other("connection reset").into();
        assert!(matches!(other, TransportError::Transient(_)));
    }

    #[test]
    fn test_control_error_unauthorized() {
        let err = ControlError::from(TransportError::unauthorized("gone"));
        assert!(err.is_unauthorized());
        assert!(!ControlError::Inactive.is_unauthorized());
    }
}
