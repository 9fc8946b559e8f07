//! mdview CLI - Markdown viewer.
//!
//! Provides commands for:
//! - `render`: Print display-ready markdown with diagrams rendered to images
//! - `outline`: Print the heading tree
//! - `meta`: Print categories, publication date and word count

mod commands;
mod error;
mod output;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{MetaArgs, OutlineArgs, RenderArgs};
use output::Output;

/// mdview - Markdown viewer.
#[derive(Parser)]
#[command(name = "mdview", version, about)]
struct Cli {
    /// Enable info-level logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a document for display.
    Render(RenderArgs),
    /// Print the heading outline of a document.
    Outline(OutlineArgs),
    /// Print the metadata of a document.
    Meta(MetaArgs),
}

fn main() -> ExitCode {
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

    let result = match cli.command {
        Commands::Render(args) => args.execute(&output),
        Commands::Outline(args) => args.execute(&output),
        Commands::Meta(args) => args.execute(&output),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output.error(&format!("Error: {err}"));
            ExitCode::FAILURE
        }
    }
}
