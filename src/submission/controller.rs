//! Async driver for the submission machine

use crate::api::PostsApi;
use crate::cache::{NoopInvalidator, RelatedPostsInvalidator};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::submission::{
    AttemptId, Command, Event, NoopObserver, Phase, SubmissionMachine, SubmissionObserver, View,
    render,
};
use crate::upload::{SimulatorConfig, UploadEvent, UploadHandle, UploadSimulator};
use crate::validation::ValidationPolicy;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, info};

/// Tunables of a controller
#[derive(Debug, Clone)]
pub struct ControllerOptions {
    /// Upload simulation timing and failure policy
    pub simulator: SimulatorConfig,
    /// When the title is validated
    pub policy: ValidationPolicy,
    /// Delay between closing and resetting the dialog
    pub close_delay: Duration,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            simulator: SimulatorConfig::default(),
            policy: ValidationPolicy::default(),
            close_delay: Duration::from_millis(300),
        }
    }
}

impl ControllerOptions {
    /// Options from a loaded configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            simulator: config.simulator(),
            policy: config.validation_policy(),
            close_delay: config.close_delay(),
        }
    }
}

/// Owns one dialog: the machine plus everything its commands touch
pub struct SubmissionController {
    machine: SubmissionMachine,
    simulator: UploadSimulator,
    api: Arc<dyn PostsApi>,
    invalidator: Arc<dyn RelatedPostsInvalidator>,
    observer: Arc<dyn SubmissionObserver>,
    upload: Option<(AttemptId, UploadHandle)>,
    create: Option<(AttemptId, JoinHandle<()>)>,
    tx: mpsc::UnboundedSender<Event>,
    rx: mpsc::UnboundedReceiver<Event>,
}

impl SubmissionController {
    /// Create a controller for a freshly opened dialog
    pub fn new(api: Arc<dyn PostsApi>, options: ControllerOptions) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            machine: SubmissionMachine::new(options.policy, options.close_delay),
            simulator: UploadSimulator::new(options.simulator),
            api,
            invalidator: Arc::new(NoopInvalidator),
            observer: Arc::new(NoopObserver),
            upload: None,
            create: None,
            tx,
            rx,
        }
    }

    /// Notify `invalidator` after a post is created
    #[must_use]
    pub fn with_invalidator(mut self, invalidator: Arc<dyn RelatedPostsInvalidator>) -> Self {
        self.invalidator = invalidator;
        self
    }

    /// Report updates to `observer`
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn SubmissionObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Current state
    pub const fn machine(&self) -> &SubmissionMachine {
        &self.machine
    }

    /// What the dialog shows right now
    pub fn view(&self) -> View {
        render(&self.machine)
    }

    /// Sender for feeding events from other tasks
    pub fn sender(&self) -> mpsc::UnboundedSender<Event> {
        self.tx.clone()
    }

    /// Apply a user event and run the resulting commands
    pub async fn dispatch(&mut self, event: Event) {
        let mut queue = VecDeque::from([event]);

        while let Some(event) = queue.pop_front() {
            let phase = self.machine.phase();
            let progress = self.machine.progress();

            for command in self.machine.dispatch(event) {
                self.execute(command, &mut queue).await;
            }

            self.notify(phase, progress).await;
        }
    }

    /// Wait for the next internal event (upload tick, API result, timer)
    /// and apply it
    pub async fn step(&mut self) -> Result<()> {
        let event = self
            .rx
            .recv()
            .await
            .ok_or_else(|| Error::Internal("event channel closed".to_string()))?;
        self.dispatch(event).await;
        Ok(())
    }

    /// Process internal events until `done` holds
    pub async fn run_until(&mut self, done: impl Fn(&SubmissionMachine) -> bool) -> Result<()> {
        while !done(&self.machine) {
            self.step().await?;
        }
        Ok(())
    }

    /// Process internal events until no upload or create call is pending
    pub async fn settle(&mut self) -> Result<()> {
        self.run_until(|m| !m.is_busy()).await
    }

    async fn execute(&mut self, command: Command, queue: &mut VecDeque<Event>) {
        match command {
            Command::StartUpload { attempt, file } => {
                self.stop_upload();
                let tx = self.tx.clone();
                let started = self.simulator.start(file, move |event| {
                    // receiver gone means the controller was dropped
                    let _ = tx.send(Event::Upload { attempt, event });
                });
                match started {
                    Ok(handle) => self.upload = Some((attempt, handle)),
                    Err(e) => queue.push_back(Event::Upload {
                        attempt,
                        event: UploadEvent::Finished(Err(e)),
                    }),
                }
            }
            Command::CancelUpload { attempt } => {
                if self.upload.as_ref().is_some_and(|(a, _)| *a == attempt) {
                    debug!(%attempt, "cancelling upload");
                    self.stop_upload();
                }
            }
            Command::CreatePost { attempt, request } => {
                info!(%attempt, title = %request.title, "creating post");
                self.abort_create();
                let api = Arc::clone(&self.api);
                let tx = self.tx.clone();
                let task = tokio::spawn(async move {
                    let result = api.create_post(&request).await;
                    let _ = tx.send(Event::SubmitFinished { attempt, result });
                });
                self.create = Some((attempt, task));
            }
            Command::InvalidateRelatedPosts => self.invalidator.invalidate_related_posts(),
            Command::Close { reset_after } => {
                self.stop_upload();
                self.abort_create();
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    time::sleep(reset_after).await;
                    let _ = tx.send(Event::ResetAfterClose);
                });
            }
            Command::ValidationChanged(change) => {
                self.observer.on_validation_change(&change).await;
            }
        }
    }

    fn stop_upload(&mut self) {
        if let Some((_, handle)) = self.upload.take() {
            handle.cancel();
        }
    }

    fn abort_create(&mut self) {
        if let Some((attempt, task)) = self.create.take().filter(|(_, t)| !t.is_finished()) {
            debug!(%attempt, "aborting create-post call");
            task.abort();
        }
    }

    async fn notify(&self, before: Phase, progress_before: u8) {
        let phase = self.machine.phase();

        if phase == Phase::Uploading && self.machine.progress() > progress_before {
            self.observer
                .on_upload_progress(self.machine.progress())
                .await;
        }
        if phase == before {
            return;
        }

        debug!(from = %before, to = %phase, "phase changed");
        self.observer.on_phase(phase).await;

        match (before, phase) {
            (_, Phase::UploadFailed) => {
                if let Some(e) = self.machine.upload_error() {
                    self.observer.on_upload_failed(e).await;
                }
            }
            (Phase::Submitting, Phase::Uploaded) => {
                if let Some(message) = self.machine.submit_error() {
                    self.observer.on_submit_failed(message).await;
                }
            }
            (_, Phase::Submitted) => {
                if let Some(created) = self.machine.created() {
                    self.observer.on_post_created(created).await;
                }
            }
            (_, Phase::Idle) if before == Phase::Closed => {
                self.observer.on_message("Dialog reset").await;
            }
            _ => {}
        }
    }
}

impl Drop for SubmissionController {
    fn drop(&mut self) {
        self.abort_create();
    }
}
