//! Manual test utility for Spotify Web API endpoints
//!
//! This utility exercises the token exchange and the player endpoints
//! against the real Spotify service, using credentials from the
//! SPOTIFY_CLIENT_ID, SPOTIFY_CLIENT_SECRET and SPOTIFY_REFRESH_TOKEN
//! environment variables or from a credentials.json file.
//! Run with: cargo run --bin api_probe

use reqwest::Client;
use std::env;
use std::error::Error;
use std::path::Path;
use std::time::Duration;

use spotifade::spotify::{
    refresh_access_token, CatalogApi, PlaybackApi, RecommendationOptions, SpotifyClient,
    TimeRange, TOKEN_URL,
};

#[path = "../test_utils.rs"]
mod test_utils;
use test_utils::Credentials;

/// API probe harness
struct ApiTester {
    client: Client,
    spotify: SpotifyClient,
    credentials: Credentials,
}

impl ApiTester {
    /// Create a new API tester
    fn new(credentials: Credentials) -> Result<Self, Box<dyn Error>> {
        // Create HTTP client with extended timeout for the raw token check
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        let spotify = SpotifyClient::new(
            &credentials.client_id,
            &credentials.client_secret,
            &credentials.refresh_token,
        );

        Ok(ApiTester {
            client,
            spotify,
            credentials,
        })
    }

    /// Test the refresh-token exchange against the accounts service
    async fn test_token_exchange(&self) -> Result<(), Box<dyn Error>> {
        println!("\n1. Testing refresh-token exchange...");
        let token = refresh_access_token(
            &self.client,
            TOKEN_URL,
            &self.credentials.client_id,
            &self.credentials.client_secret,
            &self.credentials.refresh_token,
        )
        .await?;

        println!("Token type: {}", token.token_type);
        println!("Expires in: {:?}s", token.expires_in);
        println!("Scope: {:?}", token.scope);
        println!("Access token length: {}", token.access_token.len());
        Ok(())
    }

    /// Test the Connect device listing
    async fn test_device_listing(&self) -> Result<(), Box<dyn Error>> {
        println!("\n2. Listing Spotify Connect devices...");
        let devices = self.spotify.devices().await?;

        println!("Found {} device(s)", devices.len());
        for device in &devices {
            println!(
                "  {} [{}] active={} volume={:?}",
                device.name, device.device_type, device.is_active, device.volume_percent
            );
        }
        Ok(())
    }

    /// Test active-device resolution and its volume reading
    async fn test_active_device_volume(&self) -> Result<(), Box<dyn Error>> {
        println!("\n3. Resolving the active device and reading its volume...");
        let device = self.spotify.resolve_device(None).await?;
        println!("Active device: {} ({})", device.name, device.id);

        let volume = self.spotify.device_volume(&device.id).await?;
        println!("Reported volume: {}", volume);
        Ok(())
    }

    /// Test the top-genre listing from the listening history
    async fn test_top_genres(&self) -> Result<(), Box<dyn Error>> {
        println!("\n4. Fetching top genres from the listening history...");
        let genres = self.spotify.top_genres(TimeRange::LongTerm).await?;

        println!("Found {} genre(s)", genres.len());
        for genre in genres.iter().take(10) {
            println!("  {}", genre);
        }
        Ok(())
    }

    /// Test track recommendations seeded from the top artists
    async fn test_recommendations(&self) -> Result<(), Box<dyn Error>> {
        println!("\n5. Fetching recommended tracks...");
        let options = RecommendationOptions {
            track_limit: 10,
            ..Default::default()
        };
        let tracks = self.spotify.top_artists_tracks(&options).await?;

        println!("Found {} track(s)", tracks.len());
        for track in &tracks {
            println!("  {} ({})", track.name, track.uri);
        }
        Ok(())
    }
}

/// Read credentials from the environment, when all three are present
fn env_credentials() -> Option<Credentials> {
    let client_id = env::var("SPOTIFY_CLIENT_ID").ok()?;
    let client_secret = env::var("SPOTIFY_CLIENT_SECRET").ok()?;
    let refresh_token = env::var("SPOTIFY_REFRESH_TOKEN").ok()?;
    Some(Credentials {
        client_id,
        client_secret,
        refresh_token,
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Environment first, credentials file as the fallback
    let credentials = match env_credentials() {
        Some(credentials) => {
            println!("Using credentials from the environment");
            credentials
        }
        None => {
            let credentials_path = Path::new("credentials.json");
            println!("Loading credentials from {}...", credentials_path.display());
            test_utils::load_credentials(credentials_path)?
        }
    };

    // Create API tester
    let tester = ApiTester::new(credentials)?;

    // Run tests
    tester.test_token_exchange().await?;
    tester.test_device_listing().await?;
    tester.test_active_device_volume().await?;
    tester.test_top_genres().await?;
    tester.test_recommendations().await?;

    Ok(())
}
