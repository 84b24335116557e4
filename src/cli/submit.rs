//! Submit command - create a post without prompts

use crate::cli::CliProgress;
use crate::cli::style::{Stylize, check};
use anstream::println;
use litepost::api::HttpPostsApi;
use litepost::config::Config;
use litepost::error::{Error, Result};
use litepost::submission::view::SUCCESS_TEXT;
use litepost::submission::{ControllerOptions, Event, Phase, SubmissionController};
use litepost::types::SelectedFile;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Options for the submit command
#[derive(Debug, Clone)]
pub struct SubmitOptions<'a> {
    /// Post title
    pub title: &'a str,
    /// Optional topic
    pub topic: Option<&'a str>,
    /// Image to upload
    pub image: &'a Path,
    /// Print phase changes
    pub verbose: bool,
}

/// Run the submit command
pub async fn run_submit(config: &Config, options: SubmitOptions<'_>) -> Result<()> {
    let file = SelectedFile::from_path(options.image).await?;
    debug!(file = file.name(), mime = file.mime_type(), "read image");

    let api = Arc::new(HttpPostsApi::new(
        &config.api_base_url(),
        config.request_timeout(),
    )?);
    let progress = Arc::new(if options.verbose {
        CliProgress::verbose()
    } else {
        CliProgress::quiet()
    });
    let mut controller =
        SubmissionController::new(api, ControllerOptions::from_config(config)).with_observer(progress);

    controller
        .dispatch(Event::TitleChanged(options.title.to_string()))
        .await;
    controller
        .dispatch(Event::TopicChanged(options.topic.map(String::from)))
        .await;
    controller.dispatch(Event::FileSelected(file)).await;
    controller.settle().await?;

    if controller.machine().phase() == Phase::UploadFailed {
        let error = controller
            .machine()
            .upload_error()
            .cloned()
            .ok_or_else(|| Error::Internal("upload failed without a reason".to_string()))?;
        return Err(error.into());
    }

    controller.dispatch(Event::Submit).await;
    if controller.machine().phase() != Phase::Submitting {
        let machine = controller.machine();
        let message = machine
            .title_error()
            .or_else(|| machine.image_error())
            .map_or_else(|| "form is not valid".to_string(), |e| e.message.clone());
        return Err(Error::Validation(message));
    }
    controller.settle().await?;

    match controller.machine().phase() {
        Phase::Submitted => {
            println!("{} {}", check(), SUCCESS_TEXT.emphasis());
            if let Some(created) = controller.machine().created() {
                println!("  {} {}", "Image:".muted(), created.post.image_url.accent());
            }
            controller.dispatch(Event::Acknowledge).await;
            Ok(())
        }
        _ => Err(Error::Submit(
            controller
                .machine()
                .submit_error()
                .unwrap_or(litepost::error::GENERIC_SUBMIT_FAILURE)
                .to_string(),
        )),
    }
}
