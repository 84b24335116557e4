//! Submission state machine
//!
//! All dialog state lives in [`SubmissionMachine`]. Input arrives as [`Event`]s
//! through [`SubmissionMachine::dispatch`], which mutates the state and returns
//! the side effects to perform as [`Command`]s. Nothing here does I/O or
//! touches a timer.

use crate::error::Error;
use crate::types::{CreatePostRequest, CreatePostResponse, SelectedFile, UploadStatus};
use crate::upload::{UploadError, UploadEvent, check_file_type};
use crate::validation::{
    Field, ImageField, TitleField, ValidationChange, ValidationError, ValidationPolicy,
};
use std::time::Duration;
use tracing::{debug, trace};

/// Token identifying one upload or create-post attempt.
///
/// Results carrying a token other than the current one are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttemptId(u64);

impl std::fmt::Display for AttemptId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Dialog phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Form shown, no image accepted yet
    Idle,
    /// Image upload running
    Uploading,
    /// Upload failed or file rejected
    UploadFailed,
    /// Image accepted; form can be submitted
    Uploaded,
    /// Create-post call in flight
    Submitting,
    /// Post created, waiting for acknowledgement
    Submitted,
    /// Dialog closed, waiting for the reset
    Closed,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Uploading => write!(f, "uploading"),
            Self::UploadFailed => write!(f, "upload failed"),
            Self::Uploaded => write!(f, "uploaded"),
            Self::Submitting => write!(f, "submitting"),
            Self::Submitted => write!(f, "submitted"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// Input to the machine: user actions and async results
#[derive(Debug)]
pub enum Event {
    /// A file was picked (also used to replace the current one)
    FileSelected(SelectedFile),
    /// The "change" affordance cleared the current file
    FileCleared,
    /// Cancel a running upload
    CancelUpload,
    /// Leave the failed state to pick again
    RetryUpload,
    /// Event from the upload started for `attempt`
    Upload {
        /// Attempt the event belongs to
        attempt: AttemptId,
        /// What happened
        event: UploadEvent,
    },
    /// Title text changed
    TitleChanged(String),
    /// Title input lost focus
    TitleBlurred,
    /// Topic changed; blank means none
    TopicChanged(Option<String>),
    /// Error supplied from outside for a field; `None` clears it
    ExternalError {
        /// Field the message belongs to
        field: Field,
        /// Message, or `None` to clear
        message: Option<String>,
    },
    /// Submit button pressed
    Submit,
    /// Create-post call for `attempt` settled
    SubmitFinished {
        /// Attempt the result belongs to
        attempt: AttemptId,
        /// Server response or failure
        result: Result<CreatePostResponse, Error>,
    },
    /// "Done" pressed on the success panel
    Acknowledge,
    /// Dialog closed by the user
    Dismiss,
    /// Close delay elapsed
    ResetAfterClose,
}

/// Side effect requested by a transition
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Start uploading `file` under `attempt`
    StartUpload {
        /// New attempt token
        attempt: AttemptId,
        /// File to upload
        file: SelectedFile,
    },
    /// Stop the upload running under `attempt`
    CancelUpload {
        /// Attempt to stop
        attempt: AttemptId,
    },
    /// Call the create-post API
    CreatePost {
        /// New attempt token
        attempt: AttemptId,
        /// Title, topic and uploaded image
        request: CreatePostRequest,
    },
    /// Mark the related posts list stale
    InvalidateRelatedPosts,
    /// Close the dialog and reset once the delay elapsed
    Close {
        /// Delay before [`Event::ResetAfterClose`] should be delivered
        reset_after: Duration,
    },
    /// A field's visible error changed
    ValidationChanged(ValidationChange),
}

/// State of one open submission dialog
#[derive(Debug, Clone)]
pub struct SubmissionMachine {
    phase: Phase,
    title: TitleField,
    topic: Option<String>,
    image: ImageField,
    selected: Option<SelectedFile>,
    uploaded: Option<SelectedFile>,
    progress: u8,
    upload_error: Option<UploadError>,
    submit_error: Option<String>,
    created: Option<CreatePostResponse>,
    upload_attempt: Option<AttemptId>,
    submit_attempt: Option<AttemptId>,
    next_attempt: u64,
    close_delay: Duration,
}

impl Default for SubmissionMachine {
    fn default() -> Self {
        Self::new(ValidationPolicy::default(), Duration::ZERO)
    }
}

impl SubmissionMachine {
    /// Fresh dialog state
    pub fn new(policy: ValidationPolicy, close_delay: Duration) -> Self {
        Self {
            phase: Phase::Idle,
            title: TitleField::new(policy),
            topic: None,
            image: ImageField::default(),
            selected: None,
            uploaded: None,
            progress: 0,
            upload_error: None,
            submit_error: None,
            created: None,
            upload_attempt: None,
            submit_attempt: None,
            next_attempt: 1,
            close_delay,
        }
    }

    /// Current phase
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Upload status derived from the phase
    pub const fn upload_status(&self) -> UploadStatus {
        match self.phase {
            Phase::Idle | Phase::Closed => UploadStatus::Idle,
            Phase::Uploading => UploadStatus::Loading,
            Phase::UploadFailed => UploadStatus::Failure,
            Phase::Uploaded | Phase::Submitting | Phase::Submitted => UploadStatus::Success,
        }
    }

    /// Upload progress, 0-100
    pub const fn progress(&self) -> u8 {
        self.progress
    }

    /// Title text
    pub fn title(&self) -> &str {
        self.title.value()
    }

    /// Error shown under the title
    pub const fn title_error(&self) -> Option<&ValidationError> {
        self.title.error()
    }

    /// Error shown under the image picker
    pub const fn image_error(&self) -> Option<&ValidationError> {
        self.image.error()
    }

    /// Topic, if any
    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    /// File picked by the user (uploading, failed or accepted)
    pub const fn selected_file(&self) -> Option<&SelectedFile> {
        self.selected.as_ref()
    }

    /// File whose upload succeeded
    pub const fn uploaded_file(&self) -> Option<&SelectedFile> {
        self.uploaded.as_ref()
    }

    /// Why the last upload failed
    pub const fn upload_error(&self) -> Option<&UploadError> {
        self.upload_error.as_ref()
    }

    /// Message of the last failed create-post call
    pub fn submit_error(&self) -> Option<&str> {
        self.submit_error.as_deref()
    }

    /// Response of the successful create-post call
    pub const fn created(&self) -> Option<&CreatePostResponse> {
        self.created.as_ref()
    }

    /// Attempt of the running upload
    pub const fn upload_attempt(&self) -> Option<AttemptId> {
        self.upload_attempt
    }

    /// Attempt of the in-flight create-post call
    pub const fn submit_attempt(&self) -> Option<AttemptId> {
        self.submit_attempt
    }

    /// Whether an asynchronous operation is pending
    pub const fn is_busy(&self) -> bool {
        matches!(self.phase, Phase::Uploading | Phase::Submitting)
    }

    const fn is_editable(&self) -> bool {
        matches!(
            self.phase,
            Phase::Idle | Phase::Uploading | Phase::UploadFailed | Phase::Uploaded
        )
    }

    fn new_attempt(&mut self) -> AttemptId {
        let attempt = AttemptId(self.next_attempt);
        self.next_attempt += 1;
        attempt
    }

    /// Apply `event` and return the side effects to perform, in order
    pub fn dispatch(&mut self, event: Event) -> Vec<Command> {
        trace!(phase = %self.phase, ?event, "dispatch");
        let mut commands = Vec::new();

        match event {
            Event::FileSelected(file) => self.select_file(file, &mut commands),
            Event::FileCleared => self.clear_file(&mut commands),
            Event::CancelUpload => {
                if self.phase == Phase::Uploading {
                    self.clear_file(&mut commands);
                }
            }
            Event::RetryUpload => {
                if self.phase == Phase::UploadFailed {
                    self.clear_file(&mut commands);
                }
            }
            Event::Upload { attempt, event } => self.on_upload(attempt, event, &mut commands),
            Event::TitleChanged(value) => {
                if self.is_editable() {
                    emit(&mut commands, self.title.change(value));
                    if self.phase == Phase::Uploaded {
                        emit(&mut commands, self.image.clear());
                    }
                }
            }
            Event::TitleBlurred => {
                if self.is_editable() {
                    emit(&mut commands, self.title.blur());
                }
            }
            Event::TopicChanged(topic) => {
                if self.is_editable() {
                    self.topic = topic.filter(|t| !t.trim().is_empty());
                }
            }
            Event::ExternalError { field, message } => {
                if self.is_editable() {
                    let change = match field {
                        Field::Title => self.title.set_external(message),
                        Field::Image => self.image.set_external(message),
                    };
                    emit(&mut commands, change);
                } else {
                    debug!(phase = %self.phase, %field, "ignoring external error");
                }
            }
            Event::Submit => self.submit(&mut commands),
            Event::SubmitFinished { attempt, result } => {
                self.on_submit_finished(attempt, result, &mut commands);
            }
            Event::Acknowledge => {
                if self.phase == Phase::Submitted {
                    self.close(&mut commands);
                }
            }
            Event::Dismiss => {
                if self.phase != Phase::Closed {
                    self.close(&mut commands);
                }
            }
            Event::ResetAfterClose => {
                if self.phase == Phase::Closed {
                    self.reset();
                }
            }
        }

        commands
    }

    /// Forget the current upload, cancelling it if still running
    fn discard_upload(&mut self, commands: &mut Vec<Command>) {
        if let Some(attempt) = self.upload_attempt.take() {
            commands.push(Command::CancelUpload { attempt });
        }
        self.uploaded = None;
        self.upload_error = None;
        self.progress = 0;
    }

    fn select_file(&mut self, file: SelectedFile, commands: &mut Vec<Command>) {
        if !self.is_editable() {
            debug!(phase = %self.phase, "ignoring file selection");
            return;
        }

        self.discard_upload(commands);
        self.submit_error = None;
        emit(commands, self.image.clear());
        self.selected = Some(file.clone());

        match check_file_type(&file) {
            Err(e) => {
                debug!(file = file.name(), error = %e, "file rejected");
                self.upload_error = Some(e);
                self.phase = Phase::UploadFailed;
            }
            Ok(()) => {
                let attempt = self.new_attempt();
                debug!(file = file.name(), %attempt, "upload started");
                self.upload_attempt = Some(attempt);
                self.phase = Phase::Uploading;
                commands.push(Command::StartUpload { attempt, file });
            }
        }
    }

    fn clear_file(&mut self, commands: &mut Vec<Command>) {
        if !self.is_editable() {
            return;
        }
        self.discard_upload(commands);
        self.selected = None;
        self.submit_error = None;
        emit(commands, self.image.clear());
        self.phase = Phase::Idle;
    }

    fn on_upload(&mut self, attempt: AttemptId, event: UploadEvent, commands: &mut Vec<Command>) {
        if self.phase != Phase::Uploading || self.upload_attempt != Some(attempt) {
            debug!(%attempt, "dropping stale upload event");
            return;
        }

        match event {
            UploadEvent::Progress(value) => {
                self.progress = self.progress.max(value.min(100));
            }
            UploadEvent::Finished(Ok(file)) => {
                self.upload_attempt = None;
                self.progress = 100;
                self.uploaded = Some(file);
                self.phase = Phase::Uploaded;
                emit(commands, self.image.clear());
            }
            UploadEvent::Finished(Err(e)) => {
                debug!(%attempt, error = %e, "upload failed");
                self.upload_attempt = None;
                self.upload_error = Some(e);
                self.phase = Phase::UploadFailed;
                commands.push(Command::CancelUpload { attempt });
            }
        }
    }

    fn submit(&mut self, commands: &mut Vec<Command>) {
        if !self.is_editable() {
            debug!(phase = %self.phase, "ignoring submit");
            return;
        }

        emit(commands, self.title.validate());
        let title_ok = self.title.is_valid();
        let image_ok = self.uploaded.is_some() && self.image.is_valid(self.upload_status());
        if !image_ok {
            emit(commands, self.image.validate(self.upload_status()));
        }
        if !title_ok || !image_ok {
            debug!(title_ok, image_ok, "submit blocked by validation");
            return;
        }

        let Some(image) = self.uploaded.clone() else {
            return;
        };
        emit(commands, self.image.clear());

        let attempt = self.new_attempt();
        self.submit_attempt = Some(attempt);
        self.submit_error = None;
        self.phase = Phase::Submitting;
        commands.push(Command::CreatePost {
            attempt,
            request: CreatePostRequest {
                title: self.title.value().to_string(),
                topic: self.topic.clone(),
                image,
            },
        });
    }

    fn on_submit_finished(
        &mut self,
        attempt: AttemptId,
        result: Result<CreatePostResponse, Error>,
        commands: &mut Vec<Command>,
    ) {
        if self.phase != Phase::Submitting || self.submit_attempt != Some(attempt) {
            debug!(%attempt, "dropping stale submit result");
            return;
        }
        self.submit_attempt = None;

        match result {
            Ok(response) => {
                debug!(post_id = response.post.id, "post created");
                self.created = Some(response);
                self.phase = Phase::Submitted;
                commands.push(Command::InvalidateRelatedPosts);
            }
            Err(e) => {
                debug!(status = ?e.status(), error = %e, "create post failed");
                self.submit_error = Some(e.user_message());
                self.phase = Phase::Uploaded;
            }
        }
    }

    fn close(&mut self, commands: &mut Vec<Command>) {
        self.discard_upload(commands);
        self.submit_attempt = None;
        self.phase = Phase::Closed;
        commands.push(Command::Close {
            reset_after: self.close_delay,
        });
    }

    fn reset(&mut self) {
        let next_attempt = self.next_attempt;
        *self = Self::new(self.title.policy(), self.close_delay);
        self.next_attempt = next_attempt;
    }
}

fn emit(commands: &mut Vec<Command>, change: Option<ValidationChange>) {
    if let Some(change) = change {
        commands.push(Command::ValidationChanged(change));
    }
}
