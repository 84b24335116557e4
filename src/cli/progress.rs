//! Terminal observer for the submission dialog

use crate::cli::style::{Stylize, check, cross, progress_style, spinner_style};
use anstream::{eprintln, println};
use async_trait::async_trait;
use indicatif::ProgressBar;
use litepost::submission::view::{UPLOAD_DONE_TEXT, UPLOAD_FAILED_TEXT, loading_text};
use litepost::submission::{Phase, SubmissionObserver};
use litepost::types::CreatePostResponse;
use litepost::upload::UploadError;
use litepost::validation::ValidationChange;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Observer drawing the upload bar and printing results
///
/// Two modes:
/// - verbose: also prints phase changes and status messages
/// - quiet: only bars, errors and the final result
pub struct CliProgress {
    /// Print phase changes and status messages
    pub verbose: bool,
    bar: Mutex<Option<ProgressBar>>,
}

impl CliProgress {
    /// Create a verbose observer
    pub const fn verbose() -> Self {
        Self {
            verbose: true,
            bar: Mutex::new(None),
        }
    }

    /// Create a quiet observer
    pub const fn quiet() -> Self {
        Self {
            verbose: false,
            bar: Mutex::new(None),
        }
    }

    fn replace_bar(&self, bar: Option<ProgressBar>) -> Option<ProgressBar> {
        let mut slot = self.bar.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *slot, bar)
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        let slot = self.bar.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(bar) = slot.as_ref() {
            f(bar);
        }
    }
}

#[async_trait]
impl SubmissionObserver for CliProgress {
    async fn on_phase(&self, phase: Phase) {
        if self.verbose {
            println!("{}", format!("[{phase}]").muted());
        }

        match phase {
            Phase::Uploading => {
                let bar = ProgressBar::new(100);
                bar.set_style(progress_style());
                bar.set_message(loading_text(0));
                if let Some(old) = self.replace_bar(Some(bar)) {
                    old.finish_and_clear();
                }
            }
            Phase::Uploaded => {
                if let Some(bar) = self.replace_bar(None) {
                    bar.set_position(100);
                    bar.finish_with_message(UPLOAD_DONE_TEXT);
                }
            }
            Phase::UploadFailed => {
                if let Some(bar) = self.replace_bar(None) {
                    bar.abandon_with_message(UPLOAD_FAILED_TEXT.danger());
                }
            }
            Phase::Submitting => {
                let spinner = ProgressBar::new_spinner();
                spinner.set_style(spinner_style());
                spinner.set_message("Creating post...");
                spinner.enable_steady_tick(Duration::from_millis(80));
                self.replace_bar(Some(spinner));
            }
            Phase::Idle | Phase::Submitted | Phase::Closed => {
                if let Some(bar) = self.replace_bar(None) {
                    bar.finish_and_clear();
                }
            }
        }
    }

    async fn on_upload_progress(&self, percent: u8) {
        self.with_bar(|bar| {
            bar.set_position(u64::from(percent));
            bar.set_message(loading_text(percent));
        });
    }

    async fn on_validation_change(&self, change: &ValidationChange) {
        if let Some(ref error) = change.error {
            eprintln!("{} {}", cross(), error.message.danger());
        }
    }

    async fn on_upload_failed(&self, error: &UploadError) {
        eprintln!("{} {error}", cross());
    }

    async fn on_submit_failed(&self, message: &str) {
        if let Some(bar) = self.replace_bar(None) {
            bar.finish_and_clear();
        }
        eprintln!("{} {}", cross(), message.danger());
    }

    async fn on_post_created(&self, response: &CreatePostResponse) {
        println!("{} {}", check(), response.message);
        println!(
            "  {} #{} {}",
            "Post:".muted(),
            response.post.id,
            response.post.title.accent()
        );
    }

    async fn on_message(&self, message: &str) {
        if self.verbose {
            println!("{}", message.muted());
        }
    }
}
