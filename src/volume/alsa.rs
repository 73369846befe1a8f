//! ALSA mixer backend for low-level Linux volume control

use alsa::mixer::{Mixer, Selem, SelemChannelId, SelemId};
use async_trait::async_trait;
use tracing::{debug, trace};

use crate::volume::backend::{
    clamp_volume, VolumeBackend, VolumeBackendKind, VolumeLevel,
};
use crate::volume::error::VolumeError;

const LOG_TARGET: &str = "spotifade::volume::alsa";

/// Mixer element names tried when none is configured.
const PREFERRED_ELEMENTS: [&str; 4] = ["Master", "PCM", "Speaker", "Headphone"];

/// Controls a simple mixer element of an ALSA card.
///
/// The mixer handle is not sendable across threads, so each operation
/// opens the device fresh. Element discovery runs once at construction.
#[derive(Clone)]
pub struct AlsaVolume {
    device: String,
    element: String,
}

impl AlsaVolume {
    /// Opens the mixer, picks a playback element and validates it.
    pub fn try_new(device: &str, element: Option<&str>) -> Result<Self, VolumeError> {
        let mixer = Mixer::new(device, false)?;
        let element = match element {
            Some(name) => {
                let id = SelemId::new(name, 0);
                let selem = mixer.find_selem(&id).ok_or_else(|| {
                    VolumeError::Mixer(format!("ALSA mixer element not found: {}", name))
                })?;
                if !selem.has_playback_volume() {
                    return Err(VolumeError::Mixer(format!(
                        "ALSA mixer element has no playback volume: {}",
                        name
                    )));
                }
                name.to_string()
            }
            None => Self::detect_element(&mixer)?,
        };
        debug!(target: LOG_TARGET, device = device, element = %element, "ALSA mixer ready");
        Ok(AlsaVolume {
            device: device.to_string(),
            element,
        })
    }

    /// The mixer element in use.
    pub fn element(&self) -> &str {
        &self.element
    }

    fn detect_element(mixer: &Mixer) -> Result<String, VolumeError> {
        for name in PREFERRED_ELEMENTS {
            if let Some(selem) = mixer.find_selem(&SelemId::new(name, 0)) {
                if selem.has_playback_volume() {
                    return Ok(name.to_string());
                }
            }
        }
        for elem in mixer.iter() {
            let Some(selem) = Selem::new(elem) else {
                continue;
            };
            if selem.has_playback_volume() {
                let sid = selem.get_id();
                return Ok(sid.get_name().unwrap_or("Master").to_string());
            }
        }
        Err(VolumeError::Mixer(
            "No ALSA playback volume control found".to_string(),
        ))
    }

    /// Opens the mixer and runs an operation against the selected element.
    fn with_selem<T>(
        &self,
        op: impl FnOnce(&Selem) -> Result<T, VolumeError>,
    ) -> Result<T, VolumeError> {
        let mixer = Mixer::new(&self.device, false)?;
        let selem = mixer
            .find_selem(&SelemId::new(&self.element, 0))
            .ok_or_else(|| {
                VolumeError::Mixer(format!("ALSA mixer element not found: {}", self.element))
            })?;
        op(&selem)
    }

    fn read_percent(selem: &Selem) -> Result<VolumeLevel, VolumeError> {
        let (min, max) = selem.get_playback_volume_range();
        if max <= min {
            return Ok(0);
        }
        let channels = [
            SelemChannelId::FrontLeft,
            SelemChannelId::FrontRight,
            SelemChannelId::mono(),
        ];
        let mut raw = None;
        for channel in channels {
            if selem.has_playback_channel(channel) {
                raw = Some(selem.get_playback_volume(channel)?);
                break;
            }
        }
        let raw = raw.ok_or_else(|| {
            VolumeError::Mixer("No playback channel on mixer element".to_string())
        })?;
        let percent = ((raw - min) * 100 + (max - min) / 2) / (max - min);
        Ok(clamp_volume(percent))
    }

    fn write_percent(selem: &Selem, level: VolumeLevel) -> Result<(), VolumeError> {
        let (min, max) = selem.get_playback_volume_range();
        if max <= min {
            return Ok(());
        }
        let clamped = clamp_volume(level);
        let raw = min + ((max - min) * clamped + 50) / 100;
        selem.set_playback_volume_all(raw)?;
        Ok(())
    }
}

#[async_trait]
impl VolumeBackend for AlsaVolume {
    fn kind(&self) -> VolumeBackendKind {
        VolumeBackendKind::Alsa
    }

    fn blocking(&self) -> bool {
        true
    }

    async fn volume(&self) -> Result<VolumeLevel, VolumeError> {
        let mixer = self.clone();
        tokio::task::spawn_blocking(move || mixer.volume_blocking()).await?
    }

    async fn set_volume(&self, level: VolumeLevel) -> Result<(), VolumeError> {
        let mixer = self.clone();
        tokio::task::spawn_blocking(move || mixer.set_volume_blocking(level)).await?
    }

    fn volume_blocking(&self) -> Result<VolumeLevel, VolumeError> {
        let level = self.with_selem(Self::read_percent)?;
        trace!(target: LOG_TARGET, element = %self.element, level, "Read mixer volume");
        Ok(level)
    }

    fn set_volume_blocking(&self, level: VolumeLevel) -> Result<(), VolumeError> {
        trace!(target: LOG_TARGET, element = %self.element, level, "Setting mixer volume");
        self.with_selem(|selem| Self::write_percent(selem, level))
    }
}
