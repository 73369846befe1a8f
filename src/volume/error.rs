use std::error::Error;

use crate::spotify::SpotifyError;
use crate::volume::backend::{VolumeBackendKind, VolumeLevel};

/// Error types specific to volume control.
#[derive(Debug)]
pub enum VolumeError {
    BackendUnavailable(VolumeBackendKind),
    InvalidVolume(VolumeLevel),
    InvalidFade(String),
    Api(SpotifyError),
    Mixer(String),
    Script(String),
    UnsupportedOperation(VolumeBackendKind),
    TaskJoin(String),
}

impl std::fmt::Display for VolumeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VolumeError::BackendUnavailable(kind) => {
                write!(f, "Volume backend not available on this system: {}", kind)
            }
            VolumeError::InvalidVolume(level) => {
                write!(f, "Invalid volume value: {} (expected 0-100)", level)
            }
            VolumeError::InvalidFade(msg) => write!(f, "Invalid fade: {}", msg),
            VolumeError::Api(e) => write!(f, "Spotify API error: {}", e),
            VolumeError::Mixer(msg) => write!(f, "Mixer error: {}", msg),
            VolumeError::Script(msg) => write!(f, "Script error: {}", msg),
            VolumeError::UnsupportedOperation(kind) => {
                write!(f, "Operation not supported by backend: {}", kind)
            }
            VolumeError::TaskJoin(msg) => write!(f, "Async task join error: {}", msg),
        }
    }
}

impl Error for VolumeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            VolumeError::Api(e) => Some(e),
            _ => None,
        }
    }
}

// --- From Implementations for VolumeError ---

impl From<SpotifyError> for VolumeError {
    fn from(e: SpotifyError) -> Self {
        VolumeError::Api(e)
    }
}

impl From<tokio::task::JoinError> for VolumeError {
    fn from(e: tokio::task::JoinError) -> Self {
        VolumeError::TaskJoin(e.to_string())
    }
}

#[cfg(target_os = "linux")]
impl From<alsa::Error> for VolumeError {
    fn from(e: alsa::Error) -> Self {
        VolumeError::Mixer(e.to_string())
    }
}
