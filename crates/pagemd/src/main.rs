//! pagemd CLI - Notion cache page renderer.
//!
//! Provides commands for:
//! - `page`: Render a page and its blocks as Markdown
//! - `recent`: List the most recently edited blocks
//! - `schema`: Describe the cache database tables

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{PageArgs, RecentArgs, SchemaArgs};
use output::Output;

/// pagemd - Render Notion cache pages as Markdown.
#[derive(Parser)]
#[command(name = "pagemd", version, about)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a page as Markdown.
    Page(PageArgs),
    /// List recently edited blocks.
    Recent(RecentArgs),
    /// Describe the database schema.
    Schema(SchemaArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
    let result = rt.block_on(async {
        match cli.command {
            Commands::Page(args) => args.execute().await,
            Commands::Recent(args) => args.execute().await,
            Commands::Schema(args) => args.execute().await,
        }
    });

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
