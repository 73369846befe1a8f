//! Integration tests for the player
//!
//! These tests run player operations end to end over stubbed Spotify
//! APIs and verify the outcomes the CLI prints.

use crate::test_utils::stubs::{missing_mixer, test_device, StubCatalog, StubPlayback};
use spotifade::config::{FadeSettings, VolumeSettings};
use spotifade::player::{FadeOverrides, Player};
use spotifade::spotify::{ItemType, Playlist, TimeRange, Track};
use spotifade::volume::{BackendRegistry, FadeSpec, VolumeBackendKind};
use std::sync::Arc;

#[cfg(test)]
mod player_integration_tests {
    use super::*;

    fn quick_settings() -> VolumeSettings {
        let mut volume = VolumeSettings::default();
        volume.fade_up = FadeSettings {
            limit: 2,
            start: 0,
            step: 1,
            seconds: 0.02,
            force: false,
        };
        volume
    }

    fn make_player(playback: Arc<StubPlayback>, catalog: Arc<StubCatalog>) -> Player {
        let registry = BackendRegistry::new(
            playback.clone(),
            test_device("dev-session", "Bedroom", true),
            missing_mixer(),
            None,
        );
        Player::new(playback, catalog, registry, quick_settings())
    }

    fn sample_tracks() -> Vec<Track> {
        vec![
            Track {
                id: "t1".to_string(),
                name: "One".to_string(),
                uri: "spotify:track:t1".to_string(),
                artists: Vec::new(),
                popularity: None,
                duration_ms: None,
            },
            Track {
                id: "t2".to_string(),
                name: "Two".to_string(),
                uri: "spotify:track:t2".to_string(),
                artists: Vec::new(),
                popularity: None,
                duration_ms: None,
            },
        ]
    }

    /// Volume changes issued through the player land on the session device
    #[tokio::test]
    async fn test_change_volume_lands_on_session_device() {
        let playback = StubPlayback::new(vec![test_device("dev-session", "Bedroom", true)]);
        let catalog = StubCatalog::new(Vec::new(), Vec::new(), None);
        let player = make_player(playback.clone(), catalog);

        let level = player
            .change_volume(Some(-10), None, Some(VolumeBackendKind::Spotify), None)
            .await
            .unwrap();

        assert_eq!(level, 20);
        assert_eq!(playback.write_targets(), vec!["dev-session".to_string()]);
        assert_eq!(playback.written_levels(), vec![20]);
    }

    /// A waited fade through the player walks the whole ramp
    #[tokio::test]
    async fn test_fade_through_player_runs_full_ramp() {
        let playback = StubPlayback::new(vec![test_device("dev-session", "Bedroom", true)]);
        let catalog = StubCatalog::new(Vec::new(), Vec::new(), None);
        let player = make_player(playback.clone(), catalog);

        let spec = FadeSpec {
            limit: 3,
            start: 0,
            step: 1,
            seconds: 0.03,
            force: false,
        };
        let task = player
            .fade(spec, Some(VolumeBackendKind::Spotify), None, true)
            .await
            .unwrap();

        assert!(task.is_none());
        assert_eq!(playback.written_levels(), vec![0, 1, 2, 3]);
    }

    /// Playing tracks fades up and starts playback on the session device
    #[tokio::test]
    async fn test_play_tracks_starts_on_session_device() {
        let playback = StubPlayback::new(vec![test_device("dev-session", "Bedroom", true)]);
        let catalog = StubCatalog::new(sample_tracks(), Vec::new(), None);
        let player = make_player(playback.clone(), catalog);

        let mut outcome = player
            .play(
                TimeRange::LongTerm,
                None,
                Some(ItemType::Tracks),
                FadeOverrides::default(),
                Default::default(),
            )
            .await
            .unwrap();

        if let Some(task) = outcome.fade.take() {
            task.join().await;
        }

        assert!(outcome.playing);
        assert_eq!(outcome.device.as_ref().map(|d| d.name.as_str()), Some("Bedroom"));
        assert_eq!(outcome.tracks.as_ref().map(Vec::len), Some(2));

        let requests = playback.play_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].0, "dev-session");
        assert_eq!(requests[0].2, 2);
        // The fade-up ramp finished at the configured limit
        assert_eq!(playback.written_levels().last(), Some(&2));
    }

    /// Playing a genre playlist starts its context uri
    #[tokio::test]
    async fn test_play_genre_playlist_starts_context() {
        let playback = StubPlayback::new(vec![test_device("dev-session", "Bedroom", true)]);
        let playlist = Playlist {
            id: "p1".to_string(),
            name: "The Sound of Shoegaze".to_string(),
            uri: "spotify:playlist:p1".to_string(),
        };
        let catalog = StubCatalog::new(
            Vec::new(),
            vec!["shoegaze".to_string()],
            Some(playlist),
        );
        let player = make_player(playback.clone(), catalog);

        let mut outcome = player
            .play(
                TimeRange::MediumTerm,
                None,
                Some(ItemType::Playlist),
                FadeOverrides::default(),
                Default::default(),
            )
            .await
            .unwrap();

        if let Some(task) = outcome.fade.take() {
            task.join().await;
        }

        assert!(outcome.playing);
        assert_eq!(
            outcome.playlist.as_ref().map(|p| p.uri.as_str()),
            Some("spotify:playlist:p1")
        );
        let requests = playback.play_requests();
        assert_eq!(requests[0].1.as_deref(), Some("spotify:playlist:p1"));
    }

    /// The printed outcome carries playback fields but never the fade handle
    #[tokio::test]
    async fn test_play_outcome_serializes_without_fade_handle() {
        let playback = StubPlayback::new(vec![test_device("dev-session", "Bedroom", true)]);
        let catalog = StubCatalog::new(sample_tracks(), Vec::new(), None);
        let player = make_player(playback.clone(), catalog);

        let mut outcome = player
            .play_recommended_tracks(
                TimeRange::LongTerm,
                None,
                FadeOverrides::default(),
                Default::default(),
            )
            .await
            .unwrap();
        if let Some(task) = outcome.fade.take() {
            task.join().await;
        }

        let value = serde_json::to_value(&outcome).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.get("playing"), Some(&serde_json::json!(true)));
        assert!(object.contains_key("device"));
        assert!(object.contains_key("tracks"));
        assert!(object.contains_key("result"));
        assert!(!object.contains_key("fade"));
        // Nothing was played into a context, so the key is dropped
        assert!(!object.contains_key("playlist"));
    }
}
