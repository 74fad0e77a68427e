//! encore: render CMS rich text and resolve localized content

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{fetch::FetchArgs, render::RenderArgs};

#[derive(Parser, Debug)]
#[command(name = "encore", version, about = "CMS rich-text renderer and locale resolver")]
struct Cli {
    /// Config file (defaults to ~/.config/encore/config.toml)
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a JSON block array to HTML or plain text
    Render(RenderArgs),

    /// Resolve a document through the CMS with locale fallback
    Fetch(FetchArgs),
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Render(args) => commands::render::run(args),
        Command::Fetch(args) => commands::fetch::run(args, cli.config.as_deref()).await,
    }
}
