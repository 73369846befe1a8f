//! Gradual volume ramps between two levels

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::volume::backend::{clamp_volume, VolumeBackend, VolumeBackendKind, VolumeLevel};
use crate::volume::error::VolumeError;

const LOG_TARGET: &str = "spotifade::volume::fade";

/// Parameters of a volume ramp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeSpec {
    /// Level the ramp ends at.
    pub limit: VolumeLevel,
    /// Level the ramp starts from.
    pub start: VolumeLevel,
    /// Level change per intermediate write. Must be positive.
    pub step: VolumeLevel,
    /// Wall-clock duration of the ramp in seconds.
    pub seconds: f64,
    /// Skip range clamping and write levels as given.
    pub force: bool,
}

impl Default for FadeSpec {
    fn default() -> Self {
        FadeSpec {
            limit: 50,
            start: 0,
            step: 1,
            seconds: 300.0,
            force: false,
        }
    }
}

/// A fade resolved into the writes it will perform.
#[derive(Debug, Clone, PartialEq)]
pub struct FadePlan {
    /// First write, applied before the ramp is scheduled.
    pub baseline: VolumeLevel,
    /// Remaining writes, in order. The last one lands on the limit.
    pub steps: Vec<VolumeLevel>,
    /// Pause before each step write.
    pub delay: Duration,
}

/// Resolves a spec into the exact sequence of writes and the per-step
/// delay. The whole ramp, first write to last, spans `spec.seconds`.
pub fn plan(spec: &FadeSpec) -> Result<FadePlan, VolumeError> {
    if spec.step <= 0 {
        return Err(VolumeError::InvalidFade(format!(
            "step must be positive, got {}",
            spec.step
        )));
    }
    if !spec.seconds.is_finite() || spec.seconds < 0.0 {
        return Err(VolumeError::InvalidFade(format!(
            "seconds must be a non-negative number, got {}",
            spec.seconds
        )));
    }

    let baseline = if spec.force {
        spec.start
    } else {
        clamp_volume(spec.start)
    };
    let target = if spec.force {
        spec.limit
    } else {
        clamp_volume(spec.limit)
    };

    let distance = (target - baseline).abs();
    if distance == 0 {
        return Ok(FadePlan {
            baseline,
            steps: Vec::new(),
            delay: Duration::ZERO,
        });
    }

    let count = (distance + spec.step - 1) / spec.step;
    let direction: VolumeLevel = if target >= baseline { 1 } else { -1 };
    let mut steps = Vec::with_capacity(count as usize);
    for i in 1..=count {
        let value = if i == count {
            target
        } else {
            baseline + direction * spec.step * i
        };
        steps.push(if spec.force { value } else { clamp_volume(value) });
    }

    let delay = Duration::from_secs_f64(spec.seconds / count as f64);
    Ok(FadePlan {
        baseline,
        steps,
        delay,
    })
}

/// How a scheduled fade ended.
#[derive(Debug)]
pub enum FadeOutcome {
    /// Every write landed.
    Completed,
    /// The task was cancelled before finishing.
    Cancelled,
    /// A write failed and the ramp stopped early.
    Failed(VolumeError),
}

/// Handle to a fade running in the background.
#[derive(Debug)]
pub struct FadeTask {
    id: Uuid,
    backend_kind: VolumeBackendKind,
    handle: JoinHandle<Result<(), VolumeError>>,
}

impl FadeTask {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn backend_kind(&self) -> VolumeBackendKind {
        self.backend_kind
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Stops the ramp. The volume stays wherever the last write left it.
    pub fn cancel(&self) {
        info!(
            target: LOG_TARGET,
            fade_id = %self.id,
            backend = %self.backend_kind,
            "Cancelling volume fade"
        );
        self.handle.abort();
    }

    /// Waits for the ramp to finish and reports how it ended.
    pub async fn join(self) -> FadeOutcome {
        match self.handle.await {
            Ok(Ok(())) => FadeOutcome::Completed,
            Ok(Err(e)) => FadeOutcome::Failed(e),
            Err(e) if e.is_cancelled() => FadeOutcome::Cancelled,
            Err(e) => FadeOutcome::Failed(VolumeError::TaskJoin(e.to_string())),
        }
    }
}

/// Ramps the backend volume from `spec.start` to `spec.limit`.
///
/// The baseline write always happens before this returns. What happens
/// to the rest of the ramp depends on the backend and on `wait`:
/// backends that only offer blocking writes get a detached blocking
/// ramp and `None` comes back; otherwise the ramp either runs to
/// completion here (`wait`) or is spawned and returned as a [`FadeTask`].
///
/// Nothing serializes concurrent ramps on one backend. A caller that
/// needs a single fade at a time must join or cancel the previous task
/// before starting the next.
pub async fn fade(
    backend: Arc<dyn VolumeBackend>,
    spec: FadeSpec,
    wait: bool,
) -> Result<Option<FadeTask>, VolumeError> {
    let plan = plan(&spec)?;
    debug!(
        target: LOG_TARGET,
        backend = %backend.kind(),
        from = plan.baseline,
        to = spec.limit,
        steps = plan.steps.len(),
        seconds = spec.seconds,
        "Planned volume fade"
    );

    backend.set_volume(plan.baseline).await?;
    if plan.steps.is_empty() {
        return Ok(None);
    }

    if backend.blocking() {
        let id = Uuid::new_v4();
        info!(
            target: LOG_TARGET,
            fade_id = %id,
            backend = %backend.kind(),
            "Starting detached blocking fade"
        );
        tokio::task::spawn_blocking(move || {
            if let Err(e) = run_blocking_ramp(&*backend, &plan.steps, plan.delay) {
                error!(target: LOG_TARGET, fade_id = %id, "Blocking fade failed: {}", e);
            }
        });
        return Ok(None);
    }

    if wait {
        run_ramp(&*backend, &plan.steps, plan.delay).await?;
        return Ok(None);
    }

    let id = Uuid::new_v4();
    let backend_kind = backend.kind();
    let handle = tokio::spawn(async move {
        run_ramp(&*backend, &plan.steps, plan.delay).await
    });
    info!(
        target: LOG_TARGET,
        fade_id = %id,
        backend = %backend_kind,
        "Volume fade started"
    );
    Ok(Some(FadeTask {
        id,
        backend_kind,
        handle,
    }))
}

async fn run_ramp(
    backend: &dyn VolumeBackend,
    steps: &[VolumeLevel],
    delay: Duration,
) -> Result<(), VolumeError> {
    for &value in steps {
        tokio::time::sleep(delay).await;
        backend.set_volume(value).await?;
    }
    Ok(())
}

fn run_blocking_ramp(
    backend: &dyn VolumeBackend,
    steps: &[VolumeLevel],
    delay: Duration,
) -> Result<(), VolumeError> {
    for &value in steps {
        std::thread::sleep(delay);
        backend.set_volume_blocking(value)?;
    }
    Ok(())
}
