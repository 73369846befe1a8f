//! Discovery and memoized construction of volume backends

use std::sync::{Arc, OnceLock};
use tracing::{debug, info};

#[cfg(target_os = "linux")]
use crate::volume::alsa::AlsaVolume;
#[cfg(target_os = "linux")]
use crate::volume::linux::LinuxVolume;

use crate::spotify::api::PlaybackApi;
use crate::spotify::models::Device;
use crate::volume::applescript::AppleScriptVolume;
use crate::volume::backend::{VolumeBackend, VolumeBackendKind};
use crate::volume::error::VolumeError;
use crate::volume::spotify::SpotifyVolume;

const LOG_TARGET: &str = "spotifade::volume::registry";

/// ALSA mixer selection shared by the Linux backends.
#[derive(Debug, Clone)]
pub struct MixerConfig {
    /// ALSA device name, e.g. "default" or "hw:1".
    pub device: String,
    /// Mixer element name. Autodetected when absent.
    pub element: Option<String>,
}

impl Default for MixerConfig {
    fn default() -> Self {
        MixerConfig {
            device: "default".to_string(),
            element: None,
        }
    }
}

/// Holds one instance of every volume backend the system supports.
///
/// Availability is probed once, at construction. Each kind is built at
/// most once and handed out as a shared instance afterwards.
pub struct BackendRegistry {
    playback: Arc<dyn PlaybackApi>,
    device: Device,
    mixer: MixerConfig,
    speaker: Option<String>,
    slots: [OnceLock<Option<Arc<dyn VolumeBackend>>>; 4],
}

impl BackendRegistry {
    pub fn new(
        playback: Arc<dyn PlaybackApi>,
        device: Device,
        mixer: MixerConfig,
        speaker: Option<String>,
    ) -> Self {
        let registry = BackendRegistry {
            playback,
            device,
            mixer,
            speaker,
            slots: [
                OnceLock::new(),
                OnceLock::new(),
                OnceLock::new(),
                OnceLock::new(),
            ],
        };
        registry.discover();
        registry
    }

    /// The Connect device the session is bound to.
    pub fn device(&self) -> &Device {
        &self.device
    }

    fn discover(&self) {
        for kind in VolumeBackendKind::PRIORITY {
            self.backend(kind);
        }
    }

    /// The memoized instance for a kind, when the system supports it.
    pub fn backend(&self, kind: VolumeBackendKind) -> Option<Arc<dyn VolumeBackend>> {
        self.slots[kind as usize]
            .get_or_init(|| match self.construct(kind) {
                Ok(backend) => {
                    info!(target: LOG_TARGET, backend = %kind, "Volume backend available");
                    Some(backend)
                }
                Err(e) => {
                    debug!(
                        target: LOG_TARGET,
                        backend = %kind,
                        "Volume backend unavailable: {}", e
                    );
                    None
                }
            })
            .clone()
    }

    fn construct(&self, kind: VolumeBackendKind) -> Result<Arc<dyn VolumeBackend>, VolumeError> {
        match kind {
            VolumeBackendKind::AppleScript => Ok(Arc::new(AppleScriptVolume::try_new(
                self.speaker.as_deref(),
            )?)),
            VolumeBackendKind::Linux => self.construct_linux(),
            VolumeBackendKind::Alsa => self.construct_alsa(),
            VolumeBackendKind::Spotify => Ok(Arc::new(SpotifyVolume::new(
                self.playback.clone(),
                self.device.clone(),
            ))),
        }
    }

    #[cfg(target_os = "linux")]
    fn construct_linux(&self) -> Result<Arc<dyn VolumeBackend>, VolumeError> {
        let mixer = AlsaVolume::try_new(&self.mixer.device, self.mixer.element.as_deref())?;
        Ok(Arc::new(LinuxVolume::new(mixer)))
    }

    #[cfg(not(target_os = "linux"))]
    fn construct_linux(&self) -> Result<Arc<dyn VolumeBackend>, VolumeError> {
        Err(VolumeError::Mixer(
            "ALSA mixer control requires Linux".to_string(),
        ))
    }

    #[cfg(target_os = "linux")]
    fn construct_alsa(&self) -> Result<Arc<dyn VolumeBackend>, VolumeError> {
        let mixer = AlsaVolume::try_new(&self.mixer.device, self.mixer.element.as_deref())?;
        Ok(Arc::new(mixer))
    }

    #[cfg(not(target_os = "linux"))]
    fn construct_alsa(&self) -> Result<Arc<dyn VolumeBackend>, VolumeError> {
        Err(VolumeError::Mixer(
            "ALSA mixer control requires Linux".to_string(),
        ))
    }

    /// Every kind in priority order, with its instance when the system
    /// supports it.
    pub fn available_backends(&self) -> Vec<(VolumeBackendKind, Option<Arc<dyn VolumeBackend>>)> {
        VolumeBackendKind::PRIORITY
            .iter()
            .map(|&kind| (kind, self.backend(kind)))
            .collect()
    }

    /// Highest-priority backend available on this system.
    pub fn default_backend(&self) -> Option<Arc<dyn VolumeBackend>> {
        VolumeBackendKind::PRIORITY
            .iter()
            .find_map(|&kind| self.backend(kind))
    }

    /// Picks the backend for an operation.
    ///
    /// A named kind must be available, otherwise the highest-priority
    /// available one is used. A device override only matters to the
    /// Spotify backend: asking for a device other than the session one
    /// yields a fresh instance bound to that device.
    pub async fn resolve(
        &self,
        kind: Option<VolumeBackendKind>,
        device: Option<&str>,
    ) -> Result<Arc<dyn VolumeBackend>, VolumeError> {
        let backend = match kind {
            Some(kind) => self
                .backend(kind)
                .ok_or(VolumeError::BackendUnavailable(kind))?,
            None => self
                .default_backend()
                .ok_or(VolumeError::BackendUnavailable(VolumeBackendKind::Spotify))?,
        };

        if backend.kind() == VolumeBackendKind::Spotify {
            if let Some(needle) = device {
                if !self.device.matches(needle) {
                    let device = self.playback.resolve_device(Some(needle)).await?;
                    debug!(
                        target: LOG_TARGET,
                        device = %device.name,
                        "Volume control retargeted to device"
                    );
                    return Ok(Arc::new(SpotifyVolume::new(
                        self.playback.clone(),
                        device,
                    )));
                }
            }
        }
        Ok(backend)
    }
}
