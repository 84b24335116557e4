//! Observer trait for interface-agnostic updates
//!
//! Lets different front ends (terminal, tests, a web bridge) follow a
//! submission without polling the machine.

use crate::submission::Phase;
use crate::types::CreatePostResponse;
use crate::upload::UploadError;
use crate::validation::ValidationChange;
use async_trait::async_trait;

/// Submission observer
///
/// Implement this trait to receive updates while the controller runs.
/// - CLI implementations can draw progress bars
/// - Tests can record what happened
#[async_trait]
pub trait SubmissionObserver: Send + Sync {
    /// Called when the dialog enters a new phase
    async fn on_phase(&self, phase: Phase);

    /// Called when the upload progress advances
    async fn on_upload_progress(&self, percent: u8);

    /// Called when a field's visible error changes
    async fn on_validation_change(&self, change: &ValidationChange);

    /// Called when the file was rejected or the upload failed
    async fn on_upload_failed(&self, error: &UploadError);

    /// Called when the create-post call failed, with the message to show
    async fn on_submit_failed(&self, message: &str);

    /// Called when the post was created
    async fn on_post_created(&self, response: &CreatePostResponse);

    /// Called with a general status message
    async fn on_message(&self, message: &str);
}

/// No-op observer for tests or when updates aren't needed
pub struct NoopObserver;

#[async_trait]
impl SubmissionObserver for NoopObserver {
    async fn on_phase(&self, _phase: Phase) {}
    async fn on_upload_progress(&self, _percent: u8) {}
    async fn on_validation_change(&self, _change: &ValidationChange) {}
    async fn on_upload_failed(&self, _error: &UploadError) {}
    async fn on_submit_failed(&self, _message: &str) {}
    async fn on_post_created(&self, _response: &CreatePostResponse) {}
    async fn on_message(&self, _message: &str) {}
}
