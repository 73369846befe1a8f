//! Volume backend contract and identification

use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;

use crate::volume::error::VolumeError;

/// Volume level in percent. Valid values lie in `0..=100`.
pub type VolumeLevel = i64;

/// Lowest valid volume level.
pub const MIN_VOLUME: VolumeLevel = 0;
/// Highest valid volume level.
pub const MAX_VOLUME: VolumeLevel = 100;

/// Clamps a level into the valid range.
pub fn clamp_volume(level: VolumeLevel) -> VolumeLevel {
    level.clamp(MIN_VOLUME, MAX_VOLUME)
}

/// Returns true when the level lies in the valid range.
pub fn is_valid_volume(level: VolumeLevel) -> bool {
    (MIN_VOLUME..=MAX_VOLUME).contains(&level)
}

/// The volume backends this application knows about, in selection
/// priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VolumeBackendKind {
    /// macOS system volume via osascript.
    AppleScript,
    /// High-level Linux mixer control running on the async runtime.
    Linux,
    /// Low-level ALSA mixer element control.
    Alsa,
    /// Spotify Connect device volume over the Web API.
    Spotify,
}

impl VolumeBackendKind {
    /// All kinds, most preferred first.
    pub const PRIORITY: [VolumeBackendKind; 4] = [
        VolumeBackendKind::AppleScript,
        VolumeBackendKind::Linux,
        VolumeBackendKind::Alsa,
        VolumeBackendKind::Spotify,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VolumeBackendKind::AppleScript => "applescript",
            VolumeBackendKind::Linux => "linux",
            VolumeBackendKind::Alsa => "alsa",
            VolumeBackendKind::Spotify => "spotify",
        }
    }
}

impl fmt::Display for VolumeBackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VolumeBackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "applescript" | "macos" | "osx" => Ok(VolumeBackendKind::AppleScript),
            "linux" => Ok(VolumeBackendKind::Linux),
            "alsa" => Ok(VolumeBackendKind::Alsa),
            "spotify" => Ok(VolumeBackendKind::Spotify),
            other => Err(format!("Unknown volume backend: {}", other)),
        }
    }
}

/// Contract implemented by every volume backend.
///
/// A backend reports its scheduling class through `blocking()`: backends
/// whose primitives block the calling thread have their ramps moved to the
/// blocking thread pool, the rest ramp cooperatively on the runtime.
#[async_trait]
pub trait VolumeBackend: Send + Sync {
    /// Which backend this is.
    fn kind(&self) -> VolumeBackendKind;

    /// True when the backend's primitives block the calling thread.
    fn blocking(&self) -> bool;

    /// Reads the current volume level.
    async fn volume(&self) -> Result<VolumeLevel, VolumeError>;

    /// Applies a volume level. Values outside `0..=100` are passed through
    /// to the underlying control, which may saturate or reject them.
    async fn set_volume(&self, level: VolumeLevel) -> Result<(), VolumeError>;

    /// Synchronous read used by ramps on the blocking pool. Provided only
    /// by backends reporting `blocking() == true`.
    fn volume_blocking(&self) -> Result<VolumeLevel, VolumeError> {
        Err(VolumeError::UnsupportedOperation(self.kind()))
    }

    /// Synchronous write used by ramps on the blocking pool.
    fn set_volume_blocking(&self, _level: VolumeLevel) -> Result<(), VolumeError> {
        Err(VolumeError::UnsupportedOperation(self.kind()))
    }
}
