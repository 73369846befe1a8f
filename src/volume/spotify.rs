//! Volume control through the Spotify Connect API

use async_trait::async_trait;
use std::sync::Arc;
use tracing::trace;

use crate::spotify::api::PlaybackApi;
use crate::spotify::models::Device;
use crate::volume::backend::{VolumeBackend, VolumeBackendKind, VolumeLevel};
use crate::volume::error::VolumeError;

const LOG_TARGET: &str = "spotifade::volume::spotify";

/// Adjusts the playback volume of a Spotify Connect device.
pub struct SpotifyVolume {
    playback: Arc<dyn PlaybackApi>,
    device: Device,
}

impl SpotifyVolume {
    pub fn new(playback: Arc<dyn PlaybackApi>, device: Device) -> Self {
        SpotifyVolume { playback, device }
    }

    /// The Connect device this backend controls.
    pub fn device(&self) -> &Device {
        &self.device
    }
}

#[async_trait]
impl VolumeBackend for SpotifyVolume {
    fn kind(&self) -> VolumeBackendKind {
        VolumeBackendKind::Spotify
    }

    fn blocking(&self) -> bool {
        false
    }

    async fn volume(&self) -> Result<VolumeLevel, VolumeError> {
        let level = self.playback.device_volume(&self.device.id).await?;
        trace!(target: LOG_TARGET, device = %self.device.name, level, "Read device volume");
        Ok(level)
    }

    async fn set_volume(&self, level: VolumeLevel) -> Result<(), VolumeError> {
        trace!(target: LOG_TARGET, device = %self.device.name, level, "Setting device volume");
        self.playback
            .set_device_volume(&self.device.id, level)
            .await?;
        Ok(())
    }
}
