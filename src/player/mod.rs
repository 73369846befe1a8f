//! Playback orchestration built on the volume backends

use std::error::Error;
use std::fmt;
use std::sync::Arc;
use tracing::info;

use crate::config::{FadeSettings, VolumeSettings};
use crate::spotify::{CatalogApi, Device, PlaybackApi, SpotifyError};
use crate::volume::{
    clamp_volume, fade, is_valid_volume, BackendRegistry, FadeSpec, FadeTask, VolumeBackend,
    VolumeBackendKind, VolumeError, VolumeLevel,
};

mod playback;

pub use playback::*;

const LOG_TARGET: &str = "spotifade::player";

/// Drives volume changes, fades and playback against one Spotify session.
pub struct Player {
    playback: Arc<dyn PlaybackApi>,
    catalog: Arc<dyn CatalogApi>,
    registry: BackendRegistry,
    volume: VolumeSettings,
}

/// Per-call adjustments applied over configured fade defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct FadeOverrides {
    pub limit: Option<VolumeLevel>,
    pub start: Option<VolumeLevel>,
    pub step: Option<VolumeLevel>,
    pub seconds: Option<f64>,
    pub force: Option<bool>,
}

impl FadeOverrides {
    /// Overrides applied over configured defaults.
    pub fn merge(&self, defaults: &FadeSettings) -> FadeSpec {
        self.over(defaults.spec())
    }

    /// Overrides applied over the built-in fade defaults.
    pub fn spec(&self) -> FadeSpec {
        self.over(FadeSpec::default())
    }

    fn over(&self, base: FadeSpec) -> FadeSpec {
        FadeSpec {
            limit: self.limit.unwrap_or(base.limit),
            start: self.start.unwrap_or(base.start),
            step: self.step.unwrap_or(base.step),
            seconds: self.seconds.unwrap_or(base.seconds),
            force: self.force.unwrap_or(base.force),
        }
    }
}

/// Error types for player operations
#[derive(Debug)]
pub enum PlayerError {
    Volume(VolumeError),
    Api(SpotifyError),
    PlaylistNotFound { genre: String, attempts: u32 },
    NoTopGenres,
}

impl fmt::Display for PlayerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerError::Volume(e) => write!(f, "Volume error: {}", e),
            PlayerError::Api(e) => write!(f, "Spotify API error: {}", e),
            PlayerError::PlaylistNotFound { genre, attempts } => write!(
                f,
                "No curated playlist found for genre {:?} after {} attempts",
                genre, attempts
            ),
            PlayerError::NoTopGenres => {
                write!(f, "Listening history has no genres to pick from")
            }
        }
    }
}

impl Error for PlayerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PlayerError::Volume(e) => Some(e),
            PlayerError::Api(e) => Some(e),
            _ => None,
        }
    }
}

impl From<VolumeError> for PlayerError {
    fn from(err: VolumeError) -> Self {
        PlayerError::Volume(err)
    }
}

impl From<SpotifyError> for PlayerError {
    fn from(err: SpotifyError) -> Self {
        PlayerError::Api(err)
    }
}

impl Player {
    pub fn new(
        playback: Arc<dyn PlaybackApi>,
        catalog: Arc<dyn CatalogApi>,
        registry: BackendRegistry,
        volume: VolumeSettings,
    ) -> Self {
        Player {
            playback,
            catalog,
            registry,
            volume,
        }
    }

    /// The Connect device the session is bound to.
    pub fn device(&self) -> &Device {
        self.registry.device()
    }

    pub fn registry(&self) -> &BackendRegistry {
        &self.registry
    }

    /// Changes the volume on a backend and returns the level written.
    ///
    /// The written level is `to` when given, the current backend volume
    /// otherwise, plus `by`. An explicit `to` outside 0-100 is rejected;
    /// the combined result is clamped into range.
    pub async fn change_volume(
        &self,
        by: Option<VolumeLevel>,
        to: Option<VolumeLevel>,
        backend: Option<VolumeBackendKind>,
        device: Option<&str>,
    ) -> Result<VolumeLevel, VolumeError> {
        if let Some(to) = to {
            if !is_valid_volume(to) {
                return Err(VolumeError::InvalidVolume(to));
            }
        }
        let backend = self.registry.resolve(backend, device).await?;
        let base = match to {
            Some(to) => to,
            None => backend.volume().await?,
        };
        let level = clamp_volume(base + by.unwrap_or(0));
        backend.set_volume(level).await?;
        info!(target: LOG_TARGET, backend = %backend.kind(), level, "Volume changed");
        Ok(level)
    }

    /// Nudges the volume up one step.
    pub async fn volume_up(
        &self,
        backend: Option<VolumeBackendKind>,
    ) -> Result<VolumeLevel, VolumeError> {
        self.change_volume(Some(1), None, backend, None).await
    }

    /// Nudges the volume down one step.
    pub async fn volume_down(
        &self,
        backend: Option<VolumeBackendKind>,
    ) -> Result<VolumeLevel, VolumeError> {
        self.change_volume(Some(-1), None, backend, None).await
    }

    /// Runs a fade on the chosen backend.
    ///
    /// Concurrent fades on one backend are not serialized; callers
    /// wanting one ramp at a time join or cancel the previous task
    /// first.
    pub async fn fade(
        &self,
        spec: FadeSpec,
        backend: Option<VolumeBackendKind>,
        device: Option<&str>,
        wait: bool,
    ) -> Result<Option<FadeTask>, VolumeError> {
        let backend = self.registry.resolve(backend, device).await?;
        self.fade_on(backend, spec, device, wait).await
    }

    /// Runs a fade on a specific backend instance.
    ///
    /// When the ramp runs on a system mixer, the Spotify device volume is
    /// pinned high first so the mixer alone shapes loudness.
    pub async fn fade_on(
        &self,
        backend: Arc<dyn VolumeBackend>,
        spec: FadeSpec,
        device: Option<&str>,
        wait: bool,
    ) -> Result<Option<FadeTask>, VolumeError> {
        if backend.kind() != VolumeBackendKind::Spotify {
            self.change_volume(
                None,
                Some(self.volume.spotify_volume),
                Some(VolumeBackendKind::Spotify),
                device,
            )
            .await?;
        }
        fade(backend, spec, wait).await
    }

    /// Starts the configured wake-up ramp in the background.
    pub async fn fade_up(
        &self,
        overrides: FadeOverrides,
        device: Option<&str>,
    ) -> Result<Option<FadeTask>, VolumeError> {
        let spec = overrides.merge(&self.volume.fade_up);
        self.fade(spec, None, device, false).await
    }

    /// Starts the configured wind-down ramp in the background.
    pub async fn fade_down(
        &self,
        overrides: FadeOverrides,
        device: Option<&str>,
    ) -> Result<Option<FadeTask>, VolumeError> {
        let spec = overrides.merge(&self.volume.fade_down);
        self.fade(spec, None, device, false).await
    }
}
