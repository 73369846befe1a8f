//! Spotify Web API client implementation

use async_trait::async_trait;
use reqwest::{Client, Error as ReqwestError, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::error::Error;
use std::fmt;
use std::sync::RwLock;
use tracing::{debug, error, trace, warn};

use crate::spotify::auth;
use crate::spotify::models::{Device, DevicesResponse, PlayTarget, PlaybackStarted};

const LOG_TARGET: &str = "spotifade::spotify::api";

/// Default Web API base URL.
pub const API_URL: &str = "https://api.spotify.com/v1";

/// Client for the Spotify Web API
pub struct SpotifyClient {
    client: Client,
    api_url: String,
    token_url: String,
    client_id: String,
    client_secret: String,
    refresh_token: String,
    access_token: RwLock<Option<String>>,
}

/// Error types for Spotify API operations
#[derive(Debug)]
pub enum SpotifyError {
    Network(ReqwestError),
    Authentication(String),
    NotFound(String),
    InvalidResponse(String),
    RateLimited(String),
}

// --- Error Implementations ---

impl fmt::Display for SpotifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpotifyError::Network(e) => write!(f, "Network error: {}", e),
            SpotifyError::Authentication(msg) => write!(f, "Authentication error: {}", msg),
            SpotifyError::NotFound(msg) => write!(f, "Not found: {}", msg),
            SpotifyError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
            SpotifyError::RateLimited(msg) => write!(f, "Rate limited: {}", msg),
        }
    }
}

impl Error for SpotifyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SpotifyError::Network(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ReqwestError> for SpotifyError {
    fn from(err: ReqwestError) -> Self {
        SpotifyError::Network(err)
    }
}

// --- SpotifyClient Implementation ---

impl SpotifyClient {
    /// Create a new client for an application and listening account.
    pub fn new(client_id: &str, client_secret: &str, refresh_token: &str) -> Self {
        debug!(target: LOG_TARGET, "Creating new SpotifyClient");

        let client = match Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
        {
            Ok(client) => client,
            Err(e) => {
                warn!(
                    target: LOG_TARGET,
                    "Error creating HTTP client with timeout: {:?}. Falling back to default.", e
                );
                Client::new()
            }
        };

        SpotifyClient {
            client,
            api_url: API_URL.to_string(),
            token_url: auth::TOKEN_URL.to_string(),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            refresh_token: refresh_token.to_string(),
            access_token: RwLock::new(None),
        }
    }

    /// Point the client at a different API base URL.
    pub fn with_api_url(mut self, url: &str) -> Self {
        self.api_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Point the client at a different token endpoint.
    pub fn with_token_url(mut self, url: &str) -> Self {
        self.token_url = url.to_string();
        self
    }

    /// Use a fixed access token instead of the refresh exchange.
    pub fn with_access_token(self, token: &str) -> Self {
        self.store_token(token);
        self
    }

    // --- Private Helper Methods ---

    fn cached_token(&self) -> Option<String> {
        self.access_token.read().ok().and_then(|guard| guard.clone())
    }

    fn store_token(&self, token: &str) {
        if let Ok(mut guard) = self.access_token.write() {
            *guard = Some(token.to_string());
        }
    }

    /// Returns a valid access token, performing the refresh exchange on
    /// first use.
    async fn access_token(&self) -> Result<String, SpotifyError> {
        if let Some(token) = self.cached_token() {
            return Ok(token);
        }
        let response = auth::refresh_access_token(
            &self.client,
            &self.token_url,
            &self.client_id,
            &self.client_secret,
            &self.refresh_token,
        )
        .await?;
        self.store_token(&response.access_token);
        Ok(response.access_token)
    }

    /// Builds a full URL for an API endpoint path.
    pub(crate) fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    /// Sends a GET request and deserializes the JSON response.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Option<&[(&str, &str)]>,
    ) -> Result<T, SpotifyError> {
        let token = self.access_token().await?;
        let url = self.build_url(path);
        debug!(target: LOG_TARGET, "Sending GET request to: {}", url);

        let mut request = self.client.get(&url).bearer_auth(&token);
        if let Some(params) = query {
            request = request.query(params);
        }

        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Sends a PUT request, optionally with a JSON body, expecting no
    /// content back.
    async fn put_no_content(
        &self,
        path: &str,
        query: Option<&[(&str, &str)]>,
        body: Option<serde_json::Value>,
    ) -> Result<(), SpotifyError> {
        let token = self.access_token().await?;
        let url = self.build_url(path);
        debug!(target: LOG_TARGET, "Sending PUT request to: {}", url);

        let mut request = self.client.put(&url).bearer_auth(&token);
        if let Some(params) = query {
            request = request.query(params);
        }
        if let Some(body) = &body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if status == StatusCode::NO_CONTENT
            || status == StatusCode::ACCEPTED
            || status == StatusCode::OK
        {
            trace!(target: LOG_TARGET, "PUT request successful with status: {}", status);
            Ok(())
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            error!(
                target: LOG_TARGET,
                "PUT request failed. Status: {}, Body: {}", status, error_text
            );
            Err(Self::status_error(status, error_text))
        }
    }

    fn status_error(status: StatusCode, body: String) -> SpotifyError {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SpotifyError::Authentication(
                format!("Authentication failed ({}): {}", status, body),
            ),
            StatusCode::NOT_FOUND => {
                SpotifyError::NotFound(format!("Resource not found ({}): {}", status, body))
            }
            StatusCode::TOO_MANY_REQUESTS => {
                SpotifyError::RateLimited(format!("Too many requests ({}): {}", status, body))
            }
            _ => SpotifyError::InvalidResponse(format!(
                "Request failed with status {}: {}",
                status, body
            )),
        }
    }

    /// Handles response status checking and JSON deserialization.
    async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T, SpotifyError> {
        let status = response.status();
        trace!(target: LOG_TARGET, "Response status: {}", status);

        if status.is_success() {
            let response_text = response.text().await?;
            if response_text.is_empty() {
                error!(
                    target: LOG_TARGET,
                    "Received empty response body with success status {}", status
                );
                return Err(SpotifyError::InvalidResponse(
                    "Empty response body received".to_string(),
                ));
            }
            serde_json::from_str::<T>(&response_text).map_err(|e| {
                error!(target: LOG_TARGET, "JSON parsing error: {}", e);
                SpotifyError::InvalidResponse(format!("Failed to parse JSON response: {}", e))
            })
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            error!(
                target: LOG_TARGET,
                "Request failed. Status: {}, Body: {}", status, error_text
            );
            Err(Self::status_error(status, error_text))
        }
    }
}

/// Player-endpoint operations the rest of the application depends on.
#[async_trait]
pub trait PlaybackApi: Send + Sync {
    /// Lists the account's Connect devices.
    async fn devices(&self) -> Result<Vec<Device>, SpotifyError>;

    /// Resolves a device by id or name. With no needle, prefers the active
    /// device and falls back to the first one listed.
    async fn resolve_device(&self, needle: Option<&str>) -> Result<Device, SpotifyError>;

    /// Current volume of a device, taken from the device listing.
    async fn device_volume(&self, device_id: &str) -> Result<i64, SpotifyError>;

    /// Sets the volume of a device.
    async fn set_device_volume(&self, device_id: &str, volume_percent: i64)
        -> Result<(), SpotifyError>;

    /// Starts playback of the target on a device.
    async fn start_playback(
        &self,
        target: &PlayTarget,
        device_id: &str,
    ) -> Result<PlaybackStarted, SpotifyError>;
}

#[async_trait]
impl PlaybackApi for SpotifyClient {
    async fn devices(&self) -> Result<Vec<Device>, SpotifyError> {
        let response: DevicesResponse = self.get_json("/me/player/devices", None).await?;
        debug!(target: LOG_TARGET, count = response.devices.len(), "Listed Connect devices");
        Ok(response.devices)
    }

    async fn resolve_device(&self, needle: Option<&str>) -> Result<Device, SpotifyError> {
        let mut devices = self.devices().await?;
        match needle {
            Some(needle) => devices
                .into_iter()
                .find(|device| device.matches(needle))
                .ok_or_else(|| {
                    SpotifyError::NotFound(format!("No Spotify device matching {:?}", needle))
                }),
            None => match devices.iter().position(|device| device.is_active) {
                Some(index) => Ok(devices.swap_remove(index)),
                None if !devices.is_empty() => Ok(devices.swap_remove(0)),
                None => Err(SpotifyError::NotFound(
                    "No Spotify Connect devices available".to_string(),
                )),
            },
        }
    }

    async fn device_volume(&self, device_id: &str) -> Result<i64, SpotifyError> {
        let devices = self.devices().await?;
        devices
            .iter()
            .find(|device| device.id == device_id)
            .and_then(|device| device.volume_percent)
            .ok_or_else(|| {
                SpotifyError::NotFound(format!("No volume reading for device {}", device_id))
            })
    }

    async fn set_device_volume(
        &self,
        device_id: &str,
        volume_percent: i64,
    ) -> Result<(), SpotifyError> {
        let volume = volume_percent.to_string();
        self.put_no_content(
            "/me/player/volume",
            Some(&[("volume_percent", volume.as_str()), ("device_id", device_id)]),
            None,
        )
        .await
    }

    async fn start_playback(
        &self,
        target: &PlayTarget,
        device_id: &str,
    ) -> Result<PlaybackStarted, SpotifyError> {
        let body = match target {
            PlayTarget::Tracks(tracks) => {
                let uris: Vec<&str> = tracks.iter().map(|track| track.uri.as_str()).collect();
                json!({ "uris": uris })
            }
            PlayTarget::Context(uri) => json!({ "context_uri": uri }),
        };
        self.put_no_content("/me/player/play", Some(&[("device_id", device_id)]), Some(body))
            .await?;

        let receipt = PlaybackStarted {
            device_id: device_id.to_string(),
            context_uri: match target {
                PlayTarget::Context(uri) => Some(uri.clone()),
                PlayTarget::Tracks(_) => None,
            },
            track_count: match target {
                PlayTarget::Tracks(tracks) => tracks.len(),
                PlayTarget::Context(_) => 0,
            },
        };
        debug!(
            target: LOG_TARGET,
            device_id = %receipt.device_id,
            tracks = receipt.track_count,
            "Playback started"
        );
        Ok(receipt)
    }
}
