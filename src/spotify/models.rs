//! Data models for Spotify Web API responses

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A Spotify Connect playback device
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Device {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub device_type: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_restricted: bool,
    #[serde(default)]
    pub volume_percent: Option<i64>,
}

impl Device {
    /// True when the needle names this device by id or (case-insensitive)
    /// display name.
    pub fn matches(&self, needle: &str) -> bool {
        self.id == needle || self.name.eq_ignore_ascii_case(needle)
    }
}

/// Response wrapper for the device listing endpoint
#[derive(Deserialize, Debug)]
pub struct DevicesResponse {
    pub devices: Vec<Device>,
}

/// A track as returned by the recommendation and top-list endpoints
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub uri: String,
    #[serde(default)]
    pub artists: Vec<Artist>,
    #[serde(default)]
    pub popularity: Option<i64>,
    #[serde(default)]
    pub duration_ms: Option<i64>,
}

/// An artist. Genres are only populated by the full artist object
/// (top artists, related artists), not by the simplified one on tracks.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Artist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub popularity: Option<i64>,
}

/// A playlist as returned by the search endpoint
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub uri: String,
}

/// One page of a paged listing
#[derive(Deserialize, Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub total: Option<i64>,
}

/// `/recommendations` response body
#[derive(Deserialize, Debug)]
pub struct RecommendationsResponse {
    pub tracks: Vec<Track>,
}

/// `/artists/{id}/related-artists` response body
#[derive(Deserialize, Debug)]
pub struct RelatedArtistsResponse {
    pub artists: Vec<Artist>,
}

/// `/search?type=playlist` response body
#[derive(Deserialize, Debug)]
pub struct PlaylistSearchResponse {
    pub playlists: Page<Playlist>,
}

/// Token endpoint response from the accounts service
#[derive(Deserialize, Debug, Clone)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// What a playback start should play
#[derive(Debug, Clone)]
pub enum PlayTarget {
    /// An explicit list of tracks.
    Tracks(Vec<Track>),
    /// A context URI (playlist, album or artist).
    Context(String),
}

/// Receipt for a successfully issued playback start
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaybackStarted {
    pub device_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_uri: Option<String>,
    pub track_count: usize,
}

/// Listening-history window of the personalization endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRange {
    ShortTerm,
    MediumTerm,
    LongTerm,
}

impl TimeRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::ShortTerm => "short_term",
            TimeRange::MediumTerm => "medium_term",
            TimeRange::LongTerm => "long_term",
        }
    }
}

impl Default for TimeRange {
    fn default() -> Self {
        TimeRange::LongTerm
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "short" | "short_term" => Ok(TimeRange::ShortTerm),
            "medium" | "medium_term" => Ok(TimeRange::MediumTerm),
            "long" | "long_term" => Ok(TimeRange::LongTerm),
            other => Err(format!("Unknown time range: {}", other)),
        }
    }
}

/// What kind of catalog item a play request targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemType {
    Tracks,
    Playlist,
    Album,
    Artist,
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ItemType::Tracks => "tracks",
            ItemType::Playlist => "playlist",
            ItemType::Album => "album",
            ItemType::Artist => "artist",
        };
        f.write_str(name)
    }
}

impl FromStr for ItemType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tracks" | "track" => Ok(ItemType::Tracks),
            "playlist" => Ok(ItemType::Playlist),
            "album" => Ok(ItemType::Album),
            "artist" => Ok(ItemType::Artist),
            other => Err(format!("Unknown item type: {}", other)),
        }
    }
}

/// Popularity tier of the curated genre playlists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopularityTier {
    Sound,
    Pulse,
    Edge,
}

impl PopularityTier {
    /// The tiers a wake-up pick may draw from.
    pub const ALL: [PopularityTier; 3] = [
        PopularityTier::Sound,
        PopularityTier::Pulse,
        PopularityTier::Edge,
    ];

    /// Title prefix the curated playlists use for this tier.
    pub fn prefix(&self) -> &'static str {
        match self {
            PopularityTier::Sound => "The Sound of",
            PopularityTier::Pulse => "The Pulse of",
            PopularityTier::Edge => "The Edge of",
        }
    }

    /// Full curated playlist title for a genre.
    pub fn playlist_title(&self, genre: &str) -> String {
        format!("{} {}", self.prefix(), genre)
    }
}

impl fmt::Display for PopularityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PopularityTier::Sound => "sound",
            PopularityTier::Pulse => "pulse",
            PopularityTier::Edge => "edge",
        };
        f.write_str(name)
    }
}
