//! Related command - list the latest posts

use crate::cli::style::{Stylize, spinner_style};
use anstream::println;
use indicatif::ProgressBar;
use litepost::api::HttpPostsApi;
use litepost::cache::RelatedPostsCache;
use litepost::config::Config;
use litepost::error::Result;
use litepost::types::RelatedPost;
use std::sync::Arc;
use std::time::Duration;
use supports_hyperlinks::Stream;
use terminal_link::Link;

/// Options for the related command
#[derive(Debug, Clone, Copy, Default)]
pub struct RelatedOptions {
    /// Show at most this many posts
    pub limit: Option<usize>,
    /// Print raw JSON instead of a list
    pub json: bool,
}

/// Run the related command
pub async fn run_related(config: &Config, options: RelatedOptions) -> Result<()> {
    let api = Arc::new(HttpPostsApi::new(
        &config.api_base_url(),
        config.request_timeout(),
    )?);
    let cache = RelatedPostsCache::new(
        api,
        config.related_stale_after(),
        config.related_retry_delay(),
    );

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(spinner_style());
    spinner.set_message("Fetching related posts...");
    spinner.enable_steady_tick(Duration::from_millis(80));
    let result = cache.get().await;
    spinner.finish_and_clear();

    let mut posts = result?;
    if let Some(limit) = options.limit {
        posts.truncate(limit);
    }

    if options.json {
        println!("{}", serde_json::to_string_pretty(&posts)?);
        return Ok(());
    }

    if posts.is_empty() {
        println!("No posts yet");
        return Ok(());
    }

    let hyperlinks = supports_hyperlinks::on(Stream::Stdout);
    for post in &posts {
        print_post(post, hyperlinks);
    }
    Ok(())
}

fn print_post(post: &RelatedPost, hyperlinks: bool) {
    let topic = post
        .topic
        .as_deref()
        .map(|t| format!(" [{t}]"))
        .unwrap_or_default();
    println!(
        "{} {}{}",
        format!("#{}", post.id).muted(),
        post.title.accent(),
        topic.muted()
    );

    let image = if hyperlinks {
        Link::new("image", &post.image_url).to_string()
    } else {
        post.image_url.clone()
    };
    println!(
        "    {} {}",
        post.created_at.format("%Y-%m-%d %H:%M").to_string().muted(),
        image
    );
}
