//! In-memory posts backend and recording observers

#![allow(dead_code)]

use async_trait::async_trait;
use litepost::api::PostsApi;
use litepost::cache::RelatedPostsInvalidator;
use litepost::error::{Error, NETWORK_FAILURE, Result};
use litepost::submission::{Phase, SubmissionObserver};
use litepost::types::{CreatePostRequest, CreatePostResponse, RelatedPost};
use litepost::upload::UploadError;
use litepost::validation::ValidationChange;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use super::fixtures::{created, post};

/// Scripted result of one create-post call
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Succeed with this post id
    Created(u64),
    /// Fail with an API error
    Fail {
        /// HTTP status
        status: u16,
        /// Server message
        message: String,
    },
    /// Fail as if the server was unreachable
    Network,
}

/// Posts backend that replays scripted outcomes
pub struct FakePostsApi {
    outcomes: Mutex<VecDeque<Outcome>>,
    requests: Mutex<Vec<CreatePostRequest>>,
    related_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    delay: Duration,
}

/// Decrements the in-flight count when a call finishes or is dropped
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl FakePostsApi {
    /// Backend answering after `delay`; succeeds once outcomes run out
    pub fn new(delay: Duration, outcomes: impl IntoIterator<Item = Outcome>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
            related_calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            delay,
        }
    }

    /// Create-post requests received so far
    pub fn requests(&self) -> Vec<CreatePostRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of create-post calls
    pub fn create_calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Create-post calls currently running
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Most create-post calls ever running at once
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Number of related posts fetches
    pub fn related_calls(&self) -> usize {
        self.related_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PostsApi for FakePostsApi {
    async fn create_post(&self, request: &CreatePostRequest) -> Result<CreatePostResponse> {
        let outcome = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            let n = requests.len() as u64;
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Outcome::Created(n))
        };
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);
        tokio::time::sleep(self.delay).await;

        match outcome {
            Outcome::Created(id) => Ok(created(id, &request.title)),
            Outcome::Fail { status, message } => Err(Error::Api { status, message }),
            Outcome::Network => Err(Error::Network(NETWORK_FAILURE.to_string())),
        }
    }

    async fn related_posts(&self) -> Result<Vec<RelatedPost>> {
        let n = self.related_calls.fetch_add(1, Ordering::SeqCst) as u64;
        Ok(vec![post(n, "Related")])
    }
}

/// Counts invalidations
#[derive(Default)]
pub struct RecordingInvalidator {
    count: AtomicUsize,
}

impl RecordingInvalidator {
    /// Number of invalidations received
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl RelatedPostsInvalidator for RecordingInvalidator {
    fn invalidate_related_posts(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

/// One observer notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Update {
    Phase(Phase),
    Progress(u8),
    Validation(ValidationChange),
    UploadFailed(UploadError),
    SubmitFailed(String),
    Created(u64),
    Message(String),
}

/// Observer keeping every notification in order
#[derive(Default)]
pub struct RecordingObserver {
    updates: Mutex<Vec<Update>>,
}

impl RecordingObserver {
    /// All notifications so far
    pub fn updates(&self) -> Vec<Update> {
        self.updates.lock().unwrap().clone()
    }

    /// Progress values reported so far
    pub fn progress(&self) -> Vec<u8> {
        self.updates()
            .into_iter()
            .filter_map(|u| match u {
                Update::Progress(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    /// Phases entered so far
    pub fn phases(&self) -> Vec<Phase> {
        self.updates()
            .into_iter()
            .filter_map(|u| match u {
                Update::Phase(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    fn push(&self, update: Update) {
        self.updates.lock().unwrap().push(update);
    }
}

#[async_trait]
impl SubmissionObserver for RecordingObserver {
    async fn on_phase(&self, phase: Phase) {
        self.push(Update::Phase(phase));
    }

    async fn on_upload_progress(&self, percent: u8) {
        self.push(Update::Progress(percent));
    }

    async fn on_validation_change(&self, change: &ValidationChange) {
        self.push(Update::Validation(change.clone()));
    }

    async fn on_upload_failed(&self, error: &UploadError) {
        self.push(Update::UploadFailed(error.clone()));
    }

    async fn on_submit_failed(&self, message: &str) {
        self.push(Update::SubmitFailed(message.to_string()));
    }

    async fn on_post_created(&self, response: &CreatePostResponse) {
        self.push(Update::Created(response.post.id));
    }

    async fn on_message(&self, message: &str) {
        self.push(Update::Message(message.to_string()));
    }
}
