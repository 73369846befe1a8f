//! System volume control through macOS osascript

use async_trait::async_trait;
use std::process::Command;
use tracing::{debug, trace};

use crate::volume::backend::{VolumeBackend, VolumeBackendKind, VolumeLevel};
use crate::volume::error::VolumeError;

const LOG_TARGET: &str = "spotifade::volume::applescript";

/// Sets the desktop output volume with `osascript -e`. Optionally switches
/// the output device first via the SwitchAudioSource utility.
#[derive(Clone)]
pub struct AppleScriptVolume {
    speaker: Option<String>,
}

impl AppleScriptVolume {
    /// Probes osascript and, when a speaker is named, switches the system
    /// output to it.
    pub fn try_new(speaker: Option<&str>) -> Result<Self, VolumeError> {
        if !cfg!(target_os = "macos") {
            return Err(VolumeError::Script(
                "osascript volume control requires macOS".to_string(),
            ));
        }
        let control = AppleScriptVolume {
            speaker: speaker.map(|name| name.to_string()),
        };
        control.volume_blocking()?;
        if let Some(name) = &control.speaker {
            control.switch_output(name)?;
        }
        debug!(target: LOG_TARGET, speaker = ?control.speaker, "osascript volume ready");
        Ok(control)
    }

    fn switch_output(&self, name: &str) -> Result<(), VolumeError> {
        let output = Command::new("SwitchAudioSource")
            .arg("-s")
            .arg(name)
            .output()
            .map_err(|e| VolumeError::Script(format!("Failed to run SwitchAudioSource: {}", e)))?;
        if !output.status.success() {
            return Err(VolumeError::Script(format!(
                "SwitchAudioSource failed for output {:?}: {}",
                name,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        debug!(target: LOG_TARGET, speaker = name, "Switched audio output");
        Ok(())
    }

    fn run_osascript(script: &str) -> Result<String, VolumeError> {
        let output = Command::new("osascript")
            .arg("-e")
            .arg(script)
            .output()
            .map_err(|e| VolumeError::Script(format!("Failed to run osascript: {}", e)))?;
        if !output.status.success() {
            return Err(VolumeError::Script(format!(
                "osascript failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[async_trait]
impl VolumeBackend for AppleScriptVolume {
    fn kind(&self) -> VolumeBackendKind {
        VolumeBackendKind::AppleScript
    }

    fn blocking(&self) -> bool {
        true
    }

    async fn volume(&self) -> Result<VolumeLevel, VolumeError> {
        let control = self.clone();
        tokio::task::spawn_blocking(move || control.volume_blocking()).await?
    }

    async fn set_volume(&self, level: VolumeLevel) -> Result<(), VolumeError> {
        let control = self.clone();
        tokio::task::spawn_blocking(move || control.set_volume_blocking(level)).await?
    }

    fn volume_blocking(&self) -> Result<VolumeLevel, VolumeError> {
        let stdout = Self::run_osascript("output volume of (get volume settings)")?;
        let level = stdout.parse::<VolumeLevel>().map_err(|_| {
            VolumeError::Script(format!("Unexpected osascript volume output: {:?}", stdout))
        })?;
        trace!(target: LOG_TARGET, level, "Read system volume");
        Ok(level)
    }

    fn set_volume_blocking(&self, level: VolumeLevel) -> Result<(), VolumeError> {
        trace!(target: LOG_TARGET, level, "Setting system volume");
        Self::run_osascript(&format!("set volume output volume {}", level))?;
        Ok(())
    }
}
