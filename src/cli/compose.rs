//! Compose command - the interactive submission dialog

use crate::cli::CliProgress;
use crate::cli::style::{Stylize, check};
use anstream::{eprintln, println};
use dialoguer::{Confirm, Input, Select};
use litepost::api::{HttpPostsApi, PostsApi};
use litepost::cache::{RelatedPostsCache, RelatedPostsInvalidator};
use litepost::config::Config;
use litepost::error::{Error, Result};
use litepost::submission::view::{DONE_LABEL, HEADLINE, SUBMIT_LABEL, SUCCESS_TEXT};
use litepost::submission::{ControllerOptions, Event, Phase, SubmissionController};
use litepost::types::SelectedFile;
use std::path::Path;
use std::sync::Arc;
use tokio::signal;

/// What to do after a failed step
enum Next {
    EditTitle,
    ChangeImage,
    Retry,
    Quit,
}

fn prompt_error(e: &dialoguer::Error) -> Error {
    Error::Internal(format!("Failed to read input: {e}"))
}

/// Run the interactive dialog until a post is created or the user quits
pub async fn run_compose(config: &Config, verbose: bool) -> Result<()> {
    let api: Arc<dyn PostsApi> = Arc::new(HttpPostsApi::new(
        &config.api_base_url(),
        config.request_timeout(),
    )?);
    let cache = Arc::new(RelatedPostsCache::new(
        Arc::clone(&api),
        config.related_stale_after(),
        config.related_retry_delay(),
    ));
    let progress = Arc::new(if verbose {
        CliProgress::verbose()
    } else {
        CliProgress::quiet()
    });
    let mut controller = SubmissionController::new(api, ControllerOptions::from_config(config))
        .with_invalidator(Arc::clone(&cache) as Arc<dyn RelatedPostsInvalidator>)
        .with_observer(progress);

    println!("{}", HEADLINE.emphasis());
    println!("{}", "Press Ctrl-C during an upload to cancel it.".muted());
    println!();

    edit_title(&mut controller).await?;
    edit_topic(&mut controller).await?;
    if !choose_image(&mut controller).await? {
        return quit(&mut controller).await;
    }

    loop {
        let proceed = Confirm::new()
            .with_prompt(format!("{SUBMIT_LABEL} and publish?"))
            .default(true)
            .interact()
            .map_err(|e| prompt_error(&e))?;
        if !proceed {
            return quit(&mut controller).await;
        }

        controller.dispatch(Event::Submit).await;
        let next = if controller.machine().phase() == Phase::Submitting {
            wait(&mut controller).await?;
            match controller.machine().phase() {
                Phase::Submitted => break,
                Phase::Closed => return Ok(()),
                _ => ask_next(&["Retry", "Edit title", "Change image", "Quit"])?,
            }
        } else if controller.machine().title_error().is_some() {
            Next::EditTitle
        } else {
            Next::ChangeImage
        };

        match next {
            Next::Retry => {}
            Next::EditTitle => edit_title(&mut controller).await?,
            Next::ChangeImage => {
                controller.dispatch(Event::FileCleared).await;
                if !choose_image(&mut controller).await? {
                    return quit(&mut controller).await;
                }
            }
            Next::Quit => return quit(&mut controller).await,
        }
    }

    println!();
    println!("{} {}", check(), SUCCESS_TEXT.emphasis());
    Confirm::new()
        .with_prompt(DONE_LABEL)
        .default(true)
        .show_default(false)
        .interact()
        .map_err(|e| prompt_error(&e))?;
    controller.dispatch(Event::Acknowledge).await;
    controller
        .run_until(|m| m.phase() == Phase::Idle)
        .await?;

    if let Ok(posts) = cache.get().await {
        println!("{}", format!("{} posts in the related list", posts.len()).muted());
    }
    Ok(())
}

async fn quit(controller: &mut SubmissionController) -> Result<()> {
    controller.dispatch(Event::Dismiss).await;
    println!("Aborted");
    Ok(())
}

async fn edit_title(controller: &mut SubmissionController) -> Result<()> {
    let current = controller.machine().title().to_string();
    let title: String = Input::new()
        .with_prompt("Post title")
        .with_initial_text(current)
        .allow_empty(true)
        .interact_text()
        .map_err(|e| prompt_error(&e))?;

    controller.dispatch(Event::TitleChanged(title)).await;
    controller.dispatch(Event::TitleBlurred).await;
    Ok(())
}

async fn edit_topic(controller: &mut SubmissionController) -> Result<()> {
    let topic: String = Input::new()
        .with_prompt("Topic (optional)")
        .allow_empty(true)
        .interact_text()
        .map_err(|e| prompt_error(&e))?;

    controller.dispatch(Event::TopicChanged(Some(topic))).await;
    Ok(())
}

/// Prompt for an image until one uploads. Returns `false` if the user gave up.
async fn choose_image(controller: &mut SubmissionController) -> Result<bool> {
    loop {
        let path: String = Input::new()
            .with_prompt("Image path (empty to quit)")
            .allow_empty(true)
            .interact_text()
            .map_err(|e| prompt_error(&e))?;
        if path.trim().is_empty() {
            return Ok(false);
        }

        let file = match SelectedFile::from_path(Path::new(path.trim())).await {
            Ok(file) => file,
            Err(e) => {
                eprintln!("{}", e.to_string().danger());
                continue;
            }
        };

        controller.dispatch(Event::FileSelected(file)).await;
        wait(controller).await?;

        match controller.machine().phase() {
            Phase::Uploaded => return Ok(true),
            Phase::UploadFailed => match ask_next(&["Retry", "Quit"])? {
                Next::Quit => return Ok(false),
                _ => controller.dispatch(Event::RetryUpload).await,
            },
            _ => println!("{}", "Upload cancelled".muted()),
        }
    }
}

/// Drive the controller until nothing is pending. Ctrl-C cancels the upload,
/// or closes the dialog while the post is being created.
async fn wait(controller: &mut SubmissionController) -> Result<()> {
    while controller.machine().is_busy() {
        let interrupted = tokio::select! {
            result = controller.step() => {
                result?;
                false
            }
            _ = signal::ctrl_c() => true,
        };

        if interrupted {
            let event = if controller.machine().phase() == Phase::Uploading {
                Event::CancelUpload
            } else {
                Event::Dismiss
            };
            controller.dispatch(event).await;
        }
    }
    Ok(())
}

fn ask_next(options: &[&str]) -> Result<Next> {
    let choice = Select::new()
        .with_prompt("What next?")
        .items(options)
        .default(0)
        .interact()
        .map_err(|e| prompt_error(&e))?;

    Ok(match options.get(choice).copied() {
        Some("Retry") => Next::Retry,
        Some("Edit title") => Next::EditTitle,
        Some("Change image") => Next::ChangeImage,
        _ => Next::Quit,
    })
}
