//! Integration tests for volume fading
//!
//! These tests drive whole fade ramps against a recording backend and
//! verify scheduling, clamping and cancellation behaviour.

use crate::test_utils::stubs::RecordingBackend;
use spotifade::volume::{fade, FadeOutcome, FadeSpec, VolumeBackendKind, VolumeError};
use std::sync::Arc;
use std::time::Duration;

#[cfg(test)]
mod fade_integration_tests {
    use super::*;

    fn quick_spec(start: i64, limit: i64, step: i64) -> FadeSpec {
        FadeSpec {
            limit,
            start,
            step,
            seconds: 0.03,
            force: false,
        }
    }

    /// A waited fade walks every step from start to limit
    #[tokio::test]
    async fn test_waited_fade_reaches_limit() {
        let backend = RecordingBackend::new(VolumeBackendKind::Alsa, false);

        let task = fade(backend.clone(), quick_spec(0, 6, 2), true)
            .await
            .unwrap();

        assert!(task.is_none());
        assert_eq!(backend.writes(), vec![0, 2, 4, 6]);
    }

    /// Matching start and limit writes the baseline once and stops
    #[tokio::test]
    async fn test_fade_with_no_distance_is_idempotent() {
        let backend = RecordingBackend::new(VolumeBackendKind::Alsa, false);

        let task = fade(backend.clone(), quick_spec(40, 40, 1), true)
            .await
            .unwrap();

        assert!(task.is_none());
        assert_eq!(backend.writes(), vec![40]);
    }

    /// Out-of-range endpoints are clamped to the percent scale
    #[tokio::test]
    async fn test_fade_clamps_unless_forced() {
        let backend = RecordingBackend::new(VolumeBackendKind::Alsa, false);

        fade(backend.clone(), quick_spec(90, 150, 5), true)
            .await
            .unwrap();

        let writes = backend.writes();
        assert_eq!(writes.first(), Some(&90));
        assert_eq!(writes.last(), Some(&100));
        assert!(writes.iter().all(|level| *level <= 100));
    }

    /// Forcing a fade keeps the raw endpoints, beyond 100 included
    #[tokio::test]
    async fn test_forced_fade_keeps_raw_endpoints() {
        let backend = RecordingBackend::new(VolumeBackendKind::Alsa, false);
        let spec = FadeSpec {
            limit: 150,
            start: 90,
            step: 30,
            seconds: 0.03,
            force: true,
        };

        fade(backend.clone(), spec, true).await.unwrap();

        let writes = backend.writes();
        assert_eq!(writes.first(), Some(&90));
        assert_eq!(writes.last(), Some(&150));
    }

    /// A bad step fails validation before any write goes out
    #[tokio::test]
    async fn test_invalid_step_makes_no_writes() {
        let backend = RecordingBackend::new(VolumeBackendKind::Alsa, false);

        let result = fade(backend.clone(), quick_spec(0, 50, 0), true).await;

        assert!(matches!(result, Err(VolumeError::InvalidFade(_))));
        assert!(backend.writes().is_empty());
    }

    /// A spawned fade can be cancelled mid-ramp
    #[tokio::test]
    async fn test_spawned_fade_cancel() {
        let backend = RecordingBackend::new(VolumeBackendKind::Alsa, false);
        let spec = FadeSpec {
            limit: 100,
            start: 0,
            step: 1,
            seconds: 30.0,
            force: false,
        };

        let task = fade(backend.clone(), spec, false)
            .await
            .unwrap()
            .expect("cooperative unwaited fades hand back a task");

        assert_eq!(task.backend_kind(), VolumeBackendKind::Alsa);
        task.cancel();
        let outcome = task.join().await;

        assert!(matches!(outcome, FadeOutcome::Cancelled));
        // Only the baseline write made it out before the cancel
        assert_eq!(backend.writes(), vec![0]);
    }

    /// Blocking backends run the ramp detached and return no handle
    #[tokio::test]
    async fn test_blocking_backend_detaches() {
        let backend = RecordingBackend::new(VolumeBackendKind::AppleScript, true);

        let task = fade(backend.clone(), quick_spec(0, 4, 2), false)
            .await
            .unwrap();
        assert!(task.is_none());

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(backend.writes(), vec![0, 2, 4]);
    }
}
