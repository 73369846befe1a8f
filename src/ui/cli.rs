//! Command-line interface implementation

use clap::{Parser, Subcommand};
use std::error::Error;

use crate::player::FadeOverrides;
use crate::spotify::Device;
use crate::volume::{VolumeBackendKind, VolumeLevel};

/// Command-line arguments for spotifade
#[derive(Parser, Debug)]
#[command(author, version, about = "Spotify alarm-clock volume and playback control", long_about = None)]
pub struct Args {
    /// Spotify application client id
    #[arg(long, env = "SPOTIFY_CLIENT_ID")]
    pub client_id: Option<String>,

    /// Spotify application client secret
    #[arg(long, env = "SPOTIFY_CLIENT_SECRET")]
    pub client_secret: Option<String>,

    /// Refresh token of the listening account
    #[arg(long, env = "SPOTIFY_REFRESH_TOKEN")]
    pub refresh_token: Option<String>,

    /// Connect device to control, by id or name
    #[arg(short, long, env = "SPOTIFADE_DEVICE")]
    pub device: Option<String>,

    /// Volume backend: applescript, linux, alsa or spotify
    #[arg(short, long, env = "SPOTIFADE_BACKEND")]
    pub backend: Option<String>,

    /// ALSA device to use
    #[arg(long, default_value = "default", env = "SPOTIFADE_ALSA_DEVICE")]
    pub alsa_device: String,

    /// ALSA mixer element to drive
    #[arg(long, env = "SPOTIFADE_ALSA_MIXER")]
    pub alsa_mixer: Option<String>,

    /// macOS output device to switch to before fading
    #[arg(long, env = "SPOTIFADE_SPEAKER")]
    pub speaker: Option<String>,

    /// Config file path
    #[arg(short, long, env = "SPOTIFADE_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands of the spotifade binary
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Read the volume, set it, or shift it by an offset
    Volume {
        /// Level to set
        #[arg(long, allow_hyphen_values = true)]
        set: Option<VolumeLevel>,
        /// Offset added on top of the level
        #[arg(long, allow_hyphen_values = true)]
        by: Option<VolumeLevel>,
    },
    /// Raise the volume one step
    VolumeUp,
    /// Lower the volume one step
    VolumeDown,
    /// Ramp the volume between two levels
    Fade {
        #[command(flatten)]
        fade: FadeArgs,
    },
    /// Run the configured wake-up ramp
    FadeUp {
        #[command(flatten)]
        fade: FadeArgs,
    },
    /// Run the configured wind-down ramp
    FadeDown {
        #[command(flatten)]
        fade: FadeArgs,
    },
    /// Fade the volume up and play recommended music
    Play {
        /// What to play: tracks or playlist
        #[arg(short, long)]
        item_type: Option<String>,
        /// Listening-history window: short_term, medium_term or long_term
        #[arg(short, long, default_value = "long_term")]
        time_range: String,
        #[command(flatten)]
        fade: FadeArgs,
    },
    /// List the account's Connect devices
    Devices,
    /// Show volume backends and their availability
    Backends,
}

/// Fade parameters shared by the fade and play commands
#[derive(clap::Args, Debug, Clone, Copy)]
pub struct FadeArgs {
    /// Level the ramp ends at
    #[arg(long, allow_hyphen_values = true)]
    pub limit: Option<VolumeLevel>,

    /// Level the ramp starts from
    #[arg(long, allow_hyphen_values = true)]
    pub start: Option<VolumeLevel>,

    /// Level change per write
    #[arg(long)]
    pub step: Option<VolumeLevel>,

    /// Ramp duration in seconds
    #[arg(long)]
    pub seconds: Option<f64>,

    /// Write levels outside 0-100 as given
    #[arg(long)]
    pub force: bool,
}

impl FadeArgs {
    /// The flags given on the command line, as overrides.
    pub fn overrides(&self) -> FadeOverrides {
        FadeOverrides {
            limit: self.limit,
            start: self.start,
            step: self.step,
            seconds: self.seconds,
            force: self.force.then_some(true),
        }
    }
}

/// CLI user interface for interacting with the application
pub struct Cli {
    pub args: Args,
}

impl Cli {
    /// Create a new CLI instance
    pub fn new() -> Self {
        Cli {
            args: Args::parse(),
        }
    }

    /// Display the account's Connect devices
    pub fn display_devices(&self, devices: &[Device]) {
        println!("\nSpotify Connect Devices:");
        println!(
            "{:<30} {:<12} {:<8} {:<8} {}",
            "Name", "Type", "Active", "Volume", "ID"
        );
        println!("{}", "-".repeat(90));

        for device in devices {
            let name = if device.name.len() > 28 {
                format!("{:.25}...", device.name)
            } else {
                device.name.clone()
            };
            let volume = device
                .volume_percent
                .map(|v| format!("{}%", v))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "{:<30} {:<12} {:<8} {:<8} {}",
                name, device.device_type, device.is_active, volume, device.id
            );
        }
        println!();
    }

    /// Display volume backend availability
    pub fn display_backends(&self, backends: &[(VolumeBackendKind, bool)]) {
        println!("\nVolume Backends:");
        for (kind, available) in backends {
            let state = if *available { "available" } else { "unavailable" };
            println!("{:<12} {}", kind.as_str(), state);
        }
        println!();
    }

    /// Display a volume level
    pub fn display_volume(&self, level: VolumeLevel) {
        println!("{}", level);
    }

    /// Display error messages
    pub fn display_error(&self, error: &dyn Error) {
        eprintln!("Error: {}", error);
    }
}
