//! Spotify accounts-service authentication

use reqwest::{Client, StatusCode};
use tracing::{debug, error};

use crate::spotify::api::SpotifyError;
use crate::spotify::models::TokenResponse;

const LOG_TARGET: &str = "spotifade::spotify::auth";

/// Default token endpoint of the accounts service.
pub const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Exchanges a long-lived refresh token for a fresh access token.
pub async fn refresh_access_token(
    client: &Client,
    token_url: &str,
    client_id: &str,
    client_secret: &str,
    refresh_token: &str,
) -> Result<TokenResponse, SpotifyError> {
    debug!(target: LOG_TARGET, "Requesting access token from {}", token_url);

    let response = client
        .post(token_url)
        .basic_auth(client_id, Some(client_secret))
        .form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .send()
        .await?;

    match response.status() {
        StatusCode::OK => {
            let response_text = response.text().await?;
            match serde_json::from_str::<TokenResponse>(&response_text) {
                Ok(token) => {
                    debug!(target: LOG_TARGET, "Access token obtained");
                    Ok(token)
                }
                Err(e) => {
                    error!(target: LOG_TARGET, "Failed to parse token response: {}", e);
                    Err(SpotifyError::InvalidResponse(format!(
                        "Failed to parse token response: {}",
                        e
                    )))
                }
            }
        }
        status => {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            error!(
                target: LOG_TARGET,
                "Token request failed. Status: {}, Body: {}", status, error_text
            );
            Err(SpotifyError::Authentication(format!(
                "Token request failed ({}): {}",
                status, error_text
            )))
        }
    }
}
