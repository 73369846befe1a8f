//! Personalization and search endpoints used to pick music

use async_trait::async_trait;
use futures::future::join_all;
use tracing::{debug, warn};

use crate::spotify::api::{SpotifyClient, SpotifyError};
use crate::spotify::models::{
    Artist, Page, Playlist, PlaylistSearchResponse, PopularityTier, RecommendationsResponse,
    RelatedArtistsResponse, TimeRange, Track,
};

const LOG_TARGET: &str = "spotifade::spotify::catalog";

/// Spotify allows at most five seeds per recommendations request.
const MAX_SEEDS: usize = 5;

/// Options for seeding track recommendations.
#[derive(Debug, Clone, Copy)]
pub struct RecommendationOptions {
    /// How many top artists to seed from.
    pub artist_limit: usize,
    /// How many tracks to ask for.
    pub track_limit: usize,
    /// Top up the seed list with related artists when short.
    pub use_related: bool,
    /// Listening-history window the top artists are taken from.
    pub time_range: TimeRange,
}

impl Default for RecommendationOptions {
    fn default() -> Self {
        RecommendationOptions {
            artist_limit: 2,
            track_limit: 50,
            use_related: true,
            time_range: TimeRange::LongTerm,
        }
    }
}

/// Music discovery operations built on the listening history.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Recommends tracks seeded from the account's top artists.
    async fn top_artists_tracks(
        &self,
        options: &RecommendationOptions,
    ) -> Result<Vec<Track>, SpotifyError>;

    /// Genres of the account's top artists, most-listened first.
    async fn top_genres(&self, time_range: TimeRange) -> Result<Vec<String>, SpotifyError>;

    /// Looks up the curated playlist for a genre at a popularity tier.
    async fn genre_playlist(
        &self,
        genre: &str,
        tier: PopularityTier,
    ) -> Result<Option<Playlist>, SpotifyError>;
}

// --- Endpoint Wrappers ---

impl SpotifyClient {
    /// The account's top artists for a listening-history window.
    pub async fn top_artists(
        &self,
        time_range: TimeRange,
        limit: usize,
    ) -> Result<Vec<Artist>, SpotifyError> {
        let limit = limit.to_string();
        let page: Page<Artist> = self
            .get_json(
                "/me/top/artists",
                Some(&[("time_range", time_range.as_str()), ("limit", limit.as_str())]),
            )
            .await?;
        Ok(page.items)
    }

    /// Artists similar to the given artist.
    pub async fn related_artists(&self, artist_id: &str) -> Result<Vec<Artist>, SpotifyError> {
        let path = format!("/artists/{}/related-artists", artist_id);
        let response: RelatedArtistsResponse = self.get_json(&path, None).await?;
        Ok(response.artists)
    }

    /// Track recommendations seeded by artist ids.
    pub async fn recommendations_by_artists(
        &self,
        artist_ids: &[String],
        limit: usize,
    ) -> Result<Vec<Track>, SpotifyError> {
        let seeds = artist_ids.join(",");
        let limit = limit.to_string();
        let response: RecommendationsResponse = self
            .get_json(
                "/recommendations",
                Some(&[("seed_artists", seeds.as_str()), ("limit", limit.as_str())]),
            )
            .await?;
        Ok(response.tracks)
    }

    /// Playlist search by name.
    pub async fn search_playlists(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Playlist>, SpotifyError> {
        let limit = limit.to_string();
        let response: PlaylistSearchResponse = self
            .get_json(
                "/search",
                Some(&[
                    ("q", query),
                    ("type", "playlist"),
                    ("limit", limit.as_str()),
                ]),
            )
            .await?;
        Ok(response.playlists.items)
    }
}

#[async_trait]
impl CatalogApi for SpotifyClient {
    async fn top_artists_tracks(
        &self,
        options: &RecommendationOptions,
    ) -> Result<Vec<Track>, SpotifyError> {
        let artists = self
            .top_artists(options.time_range, options.artist_limit.max(1))
            .await?;
        let mut seeds: Vec<String> = artists.iter().map(|artist| artist.id.clone()).collect();

        if options.use_related && !seeds.is_empty() && seeds.len() < MAX_SEEDS {
            let lookups = artists
                .iter()
                .map(|artist| self.related_artists(&artist.id));
            for result in join_all(lookups).await {
                match result {
                    Ok(related) => {
                        for artist in related {
                            if seeds.len() >= MAX_SEEDS {
                                break;
                            }
                            if !seeds.contains(&artist.id) {
                                seeds.push(artist.id);
                            }
                        }
                    }
                    Err(e) => {
                        warn!(target: LOG_TARGET, "Related artists lookup failed: {}", e);
                    }
                }
            }
        }

        if seeds.is_empty() {
            return Err(SpotifyError::NotFound(
                "No top artists to seed recommendations".to_string(),
            ));
        }
        seeds.truncate(MAX_SEEDS);

        debug!(
            target: LOG_TARGET,
            seeds = seeds.len(),
            time_range = %options.time_range,
            "Requesting recommendations"
        );
        self.recommendations_by_artists(&seeds, options.track_limit)
            .await
    }

    async fn top_genres(&self, time_range: TimeRange) -> Result<Vec<String>, SpotifyError> {
        let artists = self.top_artists(time_range, 50).await?;
        let mut genres: Vec<String> = Vec::new();
        for artist in artists {
            for genre in artist.genres {
                if !genres.contains(&genre) {
                    genres.push(genre);
                }
            }
        }
        debug!(target: LOG_TARGET, count = genres.len(), "Collected top genres");
        Ok(genres)
    }

    async fn genre_playlist(
        &self,
        genre: &str,
        tier: PopularityTier,
    ) -> Result<Option<Playlist>, SpotifyError> {
        let title = tier.playlist_title(genre);
        let playlists = self.search_playlists(&title, 10).await?;
        let hit = playlists
            .into_iter()
            .find(|playlist| playlist.name.eq_ignore_ascii_case(&title));
        debug!(
            target: LOG_TARGET,
            genre = genre,
            tier = %tier,
            found = hit.is_some(),
            "Curated playlist lookup"
        );
        Ok(hit)
    }
}
