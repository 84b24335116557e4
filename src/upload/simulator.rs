//! Timer-driven upload simulator

use super::{FailurePolicy, UploadError, UploadEvent, check_file_type};
use crate::types::SelectedFile;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::debug;

/// Timing and failure behaviour of the simulated upload
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatorConfig {
    /// Progress added on every tick (clamped to 1-100)
    pub step: u8,
    /// Time between ticks
    pub interval: Duration,
    /// Local processing step once progress reaches 100
    pub processing: Duration,
    /// How long the completed state is held before success is reported
    pub hold: Duration,
    /// When the upload should fail
    pub failure: FailurePolicy,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            step: 10,
            interval: Duration::from_millis(200),
            processing: Duration::from_millis(500),
            hold: Duration::from_millis(1000),
            failure: FailurePolicy::default(),
        }
    }
}

/// Liveness flag shared between a handle and its task.
///
/// Every event is delivered while holding the lock, so once `kill` returns no
/// further event can reach the callback.
struct Liveness(Mutex<bool>);

impl Liveness {
    const fn new() -> Self {
        Self(Mutex::new(true))
    }

    fn emit(&self, deliver: impl FnOnce()) -> bool {
        let alive = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        if *alive {
            deliver();
        }
        *alive
    }

    /// Deliver the final event and go dead in the same critical section
    fn finish(&self, deliver: impl FnOnce()) {
        let mut alive = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        if *alive {
            deliver();
            *alive = false;
        }
    }

    fn kill(&self) -> bool {
        let mut alive = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *alive, false)
    }
}

/// Owned handle to a running upload
///
/// Dropping the handle cancels the upload.
pub struct UploadHandle {
    live: Arc<Liveness>,
    task: JoinHandle<()>,
}

impl UploadHandle {
    /// Stop the upload. No event is delivered after this returns.
    ///
    /// Calling it more than once, or after the upload finished, is a no-op.
    pub fn cancel(&self) {
        if self.live.kill() {
            debug!("upload cancelled");
        }
        self.task.abort();
    }

    /// Whether the upload task has exited
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for UploadHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for UploadHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadHandle")
            .field("finished", &self.task.is_finished())
            .finish_non_exhaustive()
    }
}

/// Produces timed progress sequences for selected files
#[derive(Debug, Clone, Default)]
pub struct UploadSimulator {
    config: SimulatorConfig,
}

impl UploadSimulator {
    /// Create a simulator with the given timing
    pub const fn new(config: SimulatorConfig) -> Self {
        Self { config }
    }

    /// Timing in use
    pub const fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Start uploading `file`, reporting every event to `on_event`.
    ///
    /// Non-image files are rejected here and no task is spawned. Must be
    /// called from within a tokio runtime.
    pub fn start<F>(&self, file: SelectedFile, on_event: F) -> Result<UploadHandle, UploadError>
    where
        F: Fn(UploadEvent) + Send + Sync + 'static,
    {
        check_file_type(&file)?;
        debug!(file = file.name(), size = file.size(), "starting upload");

        let live = Arc::new(Liveness::new());
        let task = tokio::spawn(run(
            self.config.clone(),
            file,
            Arc::clone(&live),
            on_event,
        ));
        Ok(UploadHandle { live, task })
    }
}

async fn run<F>(config: SimulatorConfig, file: SelectedFile, live: Arc<Liveness>, on_event: F)
where
    F: Fn(UploadEvent) + Send + Sync + 'static,
{
    let step = config.step.clamp(1, 100);
    let mut ticker = time::interval(config.interval.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // first tick completes immediately
    ticker.tick().await;

    let mut progress = 0_u8;
    while progress < 100 {
        ticker.tick().await;
        progress = progress.saturating_add(step).min(100);
        if !live.emit(|| on_event(UploadEvent::Progress(progress))) {
            return;
        }
        if config.failure.should_fail(progress) {
            debug!(progress, file = file.name(), "upload failed");
            live.finish(|| on_event(UploadEvent::Finished(Err(UploadError::Failed { progress }))));
            return;
        }
    }

    if let Err(e) = check_file_type(&file) {
        live.finish(|| on_event(UploadEvent::Finished(Err(e))));
        return;
    }

    time::sleep(config.processing).await;
    time::sleep(config.hold).await;
    debug!(file = file.name(), "upload complete");
    live.finish(|| on_event(UploadEvent::Finished(Ok(file))));
}
