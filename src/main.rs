//! litepost - create image posts from the terminal
//!
//! CLI binary driving the post submission dialog against a posts backend.

use anyhow::Result;
use clap::{Parser, Subcommand};
use litepost::config::Config;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod cli;

#[derive(Parser)]
#[command(name = "litepost")]
#[command(about = "Create image posts from the terminal")]
#[command(version)]
struct Cli {
    /// Posts backend URL (overrides config and environment)
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,

    /// Path to config file
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Show debug output (repeat for more)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive submission dialog
    Compose,

    /// Create a post without prompts
    Submit {
        /// Post title
        #[arg(long, short = 't')]
        title: String,

        /// Image file to upload
        #[arg(long, short = 'i')]
        image: PathBuf,

        /// Optional topic
        #[arg(long)]
        topic: Option<String>,
    },

    /// List the latest posts
    Related {
        /// Show at most this many posts
        #[arg(long, short = 'n')]
        limit: Option<usize>,

        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the resolved configuration
    Config,
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "litepost=debug",
        _ => "litepost=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(ref url) = cli.api_url {
        config = config.with_api_url(url)?;
    }
    let verbose = cli.verbose > 0;

    match cli.command {
        None | Some(Commands::Compose) => {
            cli::run_compose(&config, verbose).await?;
        }
        Some(Commands::Submit {
            title,
            image,
            topic,
        }) => {
            cli::run_submit(
                &config,
                cli::SubmitOptions {
                    title: &title,
                    topic: topic.as_deref(),
                    image: &image,
                    verbose,
                },
            )
            .await?;
        }
        Some(Commands::Related { limit, json }) => {
            cli::run_related(&config, cli::RelatedOptions { limit, json }).await?;
        }
        Some(Commands::Config) => {
            cli::run_config(&config, cli.config.as_deref())?;
        }
    }

    Ok(())
}
