//! Application settings and configuration management

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::volume::{FadeSpec, VolumeLevel};

/// Application settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Settings {
    /// Spotify application client id
    #[serde(default)]
    pub client_id: Option<String>,
    /// Spotify application client secret
    #[serde(default)]
    pub client_secret: Option<String>,
    /// Refresh token of the listening account
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Preferred Connect device, by id or name
    #[serde(default)]
    pub device: Option<String>,
    /// ALSA device the mixer backends open
    #[serde(default = "default_alsa_device")]
    pub alsa_device: String,
    /// ALSA mixer element. Autodetected when absent
    #[serde(default)]
    pub alsa_mixer: Option<String>,
    /// macOS output device to switch to before fading
    #[serde(default)]
    pub speaker: Option<String>,
    /// Volume and fade behaviour
    #[serde(default)]
    pub volume: VolumeSettings,
}

fn default_alsa_device() -> String {
    "default".to_string()
}

/// Volume behaviour settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct VolumeSettings {
    /// Spotify device volume pinned before fading on a system backend
    #[serde(default = "default_spotify_volume")]
    pub spotify_volume: VolumeLevel,
    /// How many genre picks to try before giving up on a curated playlist
    #[serde(default = "default_genre_playlist_attempts")]
    pub genre_playlist_attempts: u32,
    /// Ramp used when playback starts
    #[serde(default = "FadeSettings::up")]
    pub fade_up: FadeSettings,
    /// Ramp used to wind playback down
    #[serde(default = "FadeSettings::down")]
    pub fade_down: FadeSettings,
}

fn default_spotify_volume() -> VolumeLevel {
    100
}

fn default_genre_playlist_attempts() -> u32 {
    10
}

impl Default for VolumeSettings {
    fn default() -> Self {
        VolumeSettings {
            spotify_volume: default_spotify_volume(),
            genre_playlist_attempts: default_genre_playlist_attempts(),
            fade_up: FadeSettings::up(),
            fade_down: FadeSettings::down(),
        }
    }
}

/// Configured fade parameters
#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
pub struct FadeSettings {
    pub limit: VolumeLevel,
    pub start: VolumeLevel,
    pub step: VolumeLevel,
    pub seconds: f64,
    #[serde(default)]
    pub force: bool,
}

impl FadeSettings {
    /// Slow morning ramp from silence to half volume.
    pub fn up() -> Self {
        FadeSettings {
            limit: 50,
            start: 0,
            step: 1,
            seconds: 300.0,
            force: false,
        }
    }

    /// The same ramp, reversed.
    pub fn down() -> Self {
        FadeSettings {
            limit: 0,
            start: 50,
            step: 1,
            seconds: 300.0,
            force: false,
        }
    }

    pub fn spec(&self) -> FadeSpec {
        FadeSpec {
            limit: self.limit,
            start: self.start,
            step: self.step,
            seconds: self.seconds,
            force: self.force,
        }
    }
}

/// Spotify application credentials required to talk to the API
#[derive(Debug, Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

/// Error types for configuration operations
#[derive(Debug)]
pub enum ConfigError {
    IoError(io::Error),
    ParseError(String),
    ValidationError(String),
}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        ConfigError::IoError(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "I/O error: {}", e),
            ConfigError::ParseError(s) => write!(f, "Parse error: {}", s),
            ConfigError::ValidationError(s) => write!(f, "Validation error: {}", s),
        }
    }
}

impl Error for ConfigError {}

impl Settings {
    /// Create default settings
    pub fn default() -> Self {
        Settings {
            client_id: None,
            client_secret: None,
            refresh_token: None,
            device: None,
            alsa_device: default_alsa_device(),
            alsa_mixer: None,
            speaker: None,
            volume: VolumeSettings::default(),
        }
    }

    /// Load settings from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&content)?;
        Ok(settings)
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(&self)?;

        // Create parent directories if they don't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, content)?;
        Ok(())
    }

    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config").join("spotifade").join("config.json")
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.client_id.as_deref().map_or(true, str::is_empty) {
            return Err(ConfigError::ValidationError(
                "Spotify client id must be provided".to_string(),
            ));
        }
        if self.client_secret.as_deref().map_or(true, str::is_empty) {
            return Err(ConfigError::ValidationError(
                "Spotify client secret must be provided".to_string(),
            ));
        }
        if self.refresh_token.as_deref().map_or(true, str::is_empty) {
            return Err(ConfigError::ValidationError(
                "Spotify refresh token must be provided".to_string(),
            ));
        }
        Ok(())
    }

    /// The validated API credentials
    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        self.validate()?;
        Ok(Credentials {
            client_id: self.client_id.clone().unwrap_or_default(),
            client_secret: self.client_secret.clone().unwrap_or_default(),
            refresh_token: self.refresh_token.clone().unwrap_or_default(),
        })
    }
}
