use spotifade::config::Settings;
use spotifade::init_app_dirs;
use spotifade::player::Player;
use spotifade::spotify::{
    CatalogApi, ItemType, PlaybackApi, RecommendationOptions, SpotifyClient, TimeRange,
};
use spotifade::ui::{Cli, Command};
use spotifade::volume::{
    BackendRegistry, FadeOutcome, FadeTask, MixerConfig, VolumeBackendKind,
};
use std::error::Error;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Parse command-line arguments and initialize CLI
    let cli = Cli::new();
    let args = &cli.args;

    // Initialize application directories
    init_app_dirs()?;

    // Load configuration from file or create default
    let config_path = match &args.config {
        Some(path) => Path::new(path).to_path_buf(),
        None => Settings::default_path(),
    };

    let mut settings = Settings::load(&config_path)?;

    // Command-line arguments (and their env fallbacks) override the file
    settings.client_id = args.client_id.clone().or(settings.client_id);
    settings.client_secret = args.client_secret.clone().or(settings.client_secret);
    settings.refresh_token = args.refresh_token.clone().or(settings.refresh_token);
    settings.device = args.device.clone().or(settings.device);
    settings.speaker = args.speaker.clone().or(settings.speaker);
    settings.alsa_mixer = args.alsa_mixer.clone().or(settings.alsa_mixer);
    if args.alsa_device != "default" {
        settings.alsa_device = args.alsa_device.clone();
    }

    let credentials = settings.credentials()?;
    let client = Arc::new(SpotifyClient::new(
        &credentials.client_id,
        &credentials.client_secret,
        &credentials.refresh_token,
    ));
    let playback: Arc<dyn PlaybackApi> = client.clone();
    let catalog: Arc<dyn CatalogApi> = client;

    // Device listing has to work even when no device is active
    if let Command::Devices = &args.command {
        let devices = playback.devices().await?;
        cli.display_devices(&devices);
        return Ok(());
    }

    let device = playback.resolve_device(settings.device.as_deref()).await?;
    let registry = BackendRegistry::new(
        playback.clone(),
        device,
        MixerConfig {
            device: settings.alsa_device.clone(),
            element: settings.alsa_mixer.clone(),
        },
        settings.speaker.clone(),
    );
    let player = Player::new(playback, catalog, registry, settings.volume.clone());

    let backend = match &args.backend {
        Some(name) => Some(VolumeBackendKind::from_str(name)?),
        None => None,
    };

    match &args.command {
        Command::Volume { set, by } => {
            if set.is_none() && by.is_none() {
                let resolved = player.registry().resolve(backend, None).await?;
                cli.display_volume(resolved.volume().await?);
            } else {
                let level = player.change_volume(*by, *set, backend, None).await?;
                cli.display_volume(level);
            }
        }
        Command::VolumeUp => {
            cli.display_volume(player.volume_up(backend).await?);
        }
        Command::VolumeDown => {
            cli.display_volume(player.volume_down(backend).await?);
        }
        Command::Fade { fade } => {
            player
                .fade(fade.overrides().spec(), backend, None, true)
                .await?;
        }
        Command::FadeUp { fade } => {
            finish_fade(player.fade_up(fade.overrides(), None).await?).await?;
        }
        Command::FadeDown { fade } => {
            finish_fade(player.fade_down(fade.overrides(), None).await?).await?;
        }
        Command::Play {
            item_type,
            time_range,
            fade,
        } => {
            let item_type = item_type.as_deref().map(ItemType::from_str).transpose()?;
            let time_range = TimeRange::from_str(time_range)?;
            let mut outcome = player
                .play(
                    time_range,
                    None,
                    item_type,
                    fade.overrides(),
                    RecommendationOptions::default(),
                )
                .await?;
            let fade = outcome.fade.take();
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            // Playback is already running by the time the ramp finishes
            if let Err(e) = finish_fade(fade).await {
                cli.display_error(e.as_ref());
            }
        }
        // Handled before the session device was resolved
        Command::Devices => {}
        Command::Backends => {
            let backends: Vec<_> = player
                .registry()
                .available_backends()
                .into_iter()
                .map(|(kind, backend)| (kind, backend.is_some()))
                .collect();
            cli.display_backends(&backends);
        }
    }

    Ok(())
}

/// Waits for a spawned fade and surfaces its failure, if any.
async fn finish_fade(task: Option<FadeTask>) -> Result<(), Box<dyn Error>> {
    if let Some(task) = task {
        match task.join().await {
            FadeOutcome::Completed | FadeOutcome::Cancelled => {}
            FadeOutcome::Failed(e) => return Err(Box::new(e)),
        }
    }
    Ok(())
}
