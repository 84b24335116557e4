//! Config command - show the resolved configuration

use crate::cli::style::Stylize;
use anstream::println;
use litepost::api::RELATED_POSTS_PATH;
use litepost::config::Config;
use litepost::error::{Error, Result};
use std::path::Path;

/// Run the config command
pub fn run_config(config: &Config, path: Option<&Path>) -> Result<()> {
    let source = path
        .map(Path::to_path_buf)
        .or_else(Config::default_path)
        .filter(|p| p.is_file())
        .map_or_else(|| "(defaults)".to_string(), |p| p.display().to_string());

    println!("{}", "Configuration".emphasis());
    println!("  {} {}", "Source:".muted(), source);
    println!("  {} {}", "API:".muted(), config.api_base_url().accent());
    println!(
        "  {} {}{}",
        "Posts endpoint:".muted(),
        config.api_base_url(),
        RELATED_POSTS_PATH
    );
    println!(
        "  {} {}s",
        "Request timeout:".muted(),
        config.request_timeout().as_secs()
    );
    println!();

    let text = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("cannot render config: {e}")))?;
    println!("{text}");
    Ok(())
}
