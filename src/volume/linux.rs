//! Cooperative Linux volume backend layered over the ALSA mixer

use async_trait::async_trait;

use crate::volume::alsa::AlsaVolume;
use crate::volume::backend::{VolumeBackend, VolumeBackendKind, VolumeLevel};
use crate::volume::error::VolumeError;

/// Drives the same mixer as [`AlsaVolume`] but stays on the async path,
/// so ramps running through it can be awaited and cancelled.
pub struct LinuxVolume {
    mixer: AlsaVolume,
}

impl LinuxVolume {
    pub fn new(mixer: AlsaVolume) -> Self {
        LinuxVolume { mixer }
    }
}

#[async_trait]
impl VolumeBackend for LinuxVolume {
    fn kind(&self) -> VolumeBackendKind {
        VolumeBackendKind::Linux
    }

    fn blocking(&self) -> bool {
        false
    }

    async fn volume(&self) -> Result<VolumeLevel, VolumeError> {
        let mixer = self.mixer.clone();
        tokio::task::spawn_blocking(move || mixer.volume_blocking()).await?
    }

    async fn set_volume(&self, level: VolumeLevel) -> Result<(), VolumeError> {
        let mixer = self.mixer.clone();
        tokio::task::spawn_blocking(move || mixer.set_volume_blocking(level)).await?
    }
}
