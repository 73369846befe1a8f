//! Integration tests for volume backend discovery
//!
//! These tests run the registry against a stubbed Spotify API and a
//! mixer config no machine can satisfy, so results do not depend on
//! the audio hardware of the host.

use crate::test_utils::stubs::{missing_mixer, test_device, StubPlayback};
use spotifade::volume::{BackendRegistry, VolumeBackendKind, VolumeError};

#[cfg(test)]
mod registry_integration_tests {
    use super::*;

    fn stub_registry() -> (std::sync::Arc<StubPlayback>, BackendRegistry) {
        let playback = StubPlayback::new(vec![
            test_device("dev-session", "Bedroom", true),
            test_device("dev-kitchen", "Kitchen", false),
        ]);
        let registry = BackendRegistry::new(
            playback.clone(),
            test_device("dev-session", "Bedroom", true),
            missing_mixer(),
            None,
        );
        (playback, registry)
    }

    /// The Spotify backend needs no local audio stack and is always there
    #[test]
    fn test_spotify_backend_always_available() {
        let (_, registry) = stub_registry();

        let backend = registry.backend(VolumeBackendKind::Spotify);
        assert!(backend.is_some());
        assert_eq!(backend.unwrap().kind(), VolumeBackendKind::Spotify);
    }

    /// Backend instances are built once and shared afterwards
    #[test]
    fn test_backend_instances_are_memoized() {
        let (_, registry) = stub_registry();

        let first = registry.backend(VolumeBackendKind::Spotify).unwrap();
        let second = registry.backend(VolumeBackendKind::Spotify).unwrap();
        assert!(std::sync::Arc::ptr_eq(&first, &second));
    }

    /// Asking for a mixer kind the host cannot provide is an error
    #[tokio::test]
    async fn test_resolve_named_unavailable_backend() {
        let (_, registry) = stub_registry();

        let result = registry.resolve(Some(VolumeBackendKind::Alsa), None).await;
        assert!(matches!(
            result,
            Err(VolumeError::BackendUnavailable(VolumeBackendKind::Alsa))
        ));
    }

    /// Without local mixers the default falls through to Spotify
    #[cfg(not(target_os = "macos"))]
    #[tokio::test]
    async fn test_resolve_default_without_system_mixers() {
        let (_, registry) = stub_registry();

        let backend = registry.resolve(None, None).await.unwrap();
        assert_eq!(backend.kind(), VolumeBackendKind::Spotify);
    }

    /// A device override rebinds Spotify volume control to that device
    #[tokio::test]
    async fn test_resolve_retargets_to_named_device() {
        let (playback, registry) = stub_registry();

        let backend = registry
            .resolve(Some(VolumeBackendKind::Spotify), Some("Kitchen"))
            .await
            .unwrap();
        let memoized = registry.backend(VolumeBackendKind::Spotify).unwrap();
        assert!(!std::sync::Arc::ptr_eq(&backend, &memoized));

        backend.set_volume(42).await.unwrap();
        assert_eq!(playback.write_targets(), vec!["dev-kitchen".to_string()]);
        assert_eq!(playback.written_levels(), vec![42]);
    }

    /// Naming the session device keeps the memoized instance and its binding
    #[tokio::test]
    async fn test_resolve_session_device_stays_bound() {
        let (playback, registry) = stub_registry();

        let backend = registry
            .resolve(Some(VolumeBackendKind::Spotify), Some("Bedroom"))
            .await
            .unwrap();
        let memoized = registry.backend(VolumeBackendKind::Spotify).unwrap();
        assert!(std::sync::Arc::ptr_eq(&backend, &memoized));

        backend.set_volume(55).await.unwrap();
        assert_eq!(playback.write_targets(), vec!["dev-session".to_string()]);
    }

    /// The availability listing covers every kind in priority order
    #[test]
    fn test_available_backends_follow_priority_order() {
        let (_, registry) = stub_registry();

        let listed = registry.available_backends();
        let kinds: Vec<_> = listed.iter().map(|(kind, _)| *kind).collect();
        assert_eq!(kinds, VolumeBackendKind::PRIORITY.to_vec());

        let spotify = listed
            .iter()
            .find(|(kind, _)| *kind == VolumeBackendKind::Spotify)
            .unwrap();
        assert!(spotify.1.is_some());
    }
}
