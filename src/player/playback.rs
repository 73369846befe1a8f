//! Choosing and starting what to play

use rand::seq::IndexedRandom;
use serde::Serialize;
use tracing::{debug, info};

use super::{FadeOverrides, Player, PlayerError, LOG_TARGET};
use crate::spotify::{
    Device, ItemType, PlayTarget, PlaybackStarted, Playlist, PopularityTier,
    RecommendationOptions, TimeRange, Track,
};
use crate::volume::FadeTask;

/// What a play request did.
#[derive(Debug, Serialize)]
pub struct PlayOutcome {
    pub playing: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<Device>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracks: Option<Vec<Track>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playlist: Option<Playlist>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<PlaybackStarted>,
    /// Handle to the fade started alongside playback, when one is running.
    #[serde(skip)]
    pub fade: Option<FadeTask>,
}

impl PlayOutcome {
    pub fn not_playing() -> Self {
        PlayOutcome {
            playing: false,
            device: None,
            tracks: None,
            playlist: None,
            result: None,
            fade: None,
        }
    }
}

/// Uniform random pick. The rng handle never crosses an await.
fn pick<T: Clone>(items: &[T]) -> Option<T> {
    let mut rng = rand::rng();
    items.choose(&mut rng).cloned()
}

impl Player {
    async fn target_device(&self, device: Option<&str>) -> Result<Device, PlayerError> {
        match device {
            Some(needle) if !self.device().matches(needle) => {
                Ok(self.playback.resolve_device(Some(needle)).await?)
            }
            _ => Ok(self.device().clone()),
        }
    }

    /// Plays tracks recommended from the account's top artists, fading
    /// the volume up while playback starts.
    pub async fn play_recommended_tracks(
        &self,
        time_range: TimeRange,
        device: Option<&str>,
        fade: FadeOverrides,
        options: RecommendationOptions,
    ) -> Result<PlayOutcome, PlayerError> {
        let options = RecommendationOptions {
            time_range,
            ..options
        };
        let tracks = self.catalog.top_artists_tracks(&options).await?;

        let fade_task = self.fade_up(fade, device).await?;
        let target = self.target_device(device).await?;
        let receipt = self
            .playback
            .start_playback(&PlayTarget::Tracks(tracks.clone()), &target.id)
            .await?;

        info!(
            target: LOG_TARGET,
            count = tracks.len(),
            device = %target.name,
            "Playing recommended tracks"
        );
        Ok(PlayOutcome {
            playing: true,
            device: Some(target),
            tracks: Some(tracks),
            playlist: None,
            result: Some(receipt),
            fade: fade_task,
        })
    }

    /// Plays a curated genre playlist drawn from the listening history.
    ///
    /// The popularity tier is picked once, then genres are drawn until a
    /// curated playlist turns up or the attempt budget runs out.
    pub async fn play_recommended_genre(
        &self,
        time_range: TimeRange,
        device: Option<&str>,
        fade: FadeOverrides,
    ) -> Result<PlayOutcome, PlayerError> {
        let tier = pick(&PopularityTier::ALL).unwrap_or(PopularityTier::Sound);
        let genres = self.catalog.top_genres(time_range).await?;
        if genres.is_empty() {
            return Err(PlayerError::NoTopGenres);
        }

        let attempts = self.volume.genre_playlist_attempts.max(1);
        let mut playlist = None;
        let mut genre = String::new();
        for attempt in 1..=attempts {
            genre = match pick(&genres) {
                Some(genre) => genre,
                None => return Err(PlayerError::NoTopGenres),
            };
            match self.catalog.genre_playlist(&genre, tier).await? {
                Some(found) => {
                    playlist = Some(found);
                    break;
                }
                None => {
                    debug!(
                        target: LOG_TARGET,
                        genre = %genre,
                        tier = %tier,
                        attempt,
                        "No curated playlist, retrying with another genre"
                    );
                }
            }
        }
        let playlist = match playlist {
            Some(playlist) => playlist,
            None => return Err(PlayerError::PlaylistNotFound { genre, attempts }),
        };

        let fade_task = self.fade_up(fade, device).await?;
        let target = self.target_device(device).await?;
        let receipt = self
            .playback
            .start_playback(&PlayTarget::Context(playlist.uri.clone()), &target.id)
            .await?;

        info!(
            target: LOG_TARGET,
            playlist = %playlist.name,
            device = %target.name,
            "Playing curated genre playlist"
        );
        Ok(PlayOutcome {
            playing: true,
            device: Some(target),
            tracks: None,
            playlist: Some(playlist),
            result: Some(receipt),
            fade: fade_task,
        })
    }

    /// Plays something. Without an item type, tracks or a genre playlist
    /// is chosen at random. Item types with no recommendation source
    /// leave playback alone.
    pub async fn play(
        &self,
        time_range: TimeRange,
        device: Option<&str>,
        item_type: Option<ItemType>,
        fade: FadeOverrides,
        options: RecommendationOptions,
    ) -> Result<PlayOutcome, PlayerError> {
        let item_type = item_type
            .or_else(|| pick(&[ItemType::Tracks, ItemType::Playlist]))
            .unwrap_or(ItemType::Tracks);
        match item_type {
            ItemType::Tracks => {
                self.play_recommended_tracks(time_range, device, fade, options)
                    .await
            }
            ItemType::Playlist => self.play_recommended_genre(time_range, device, fade).await,
            other => {
                info!(target: LOG_TARGET, item_type = %other, "Nothing to play for item type");
                Ok(PlayOutcome::not_playing())
            }
        }
    }
}
