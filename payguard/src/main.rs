// payguard/src/main.rs

mod cli;
mod commands;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use payguard_core::domain::narrative::{DeterministicNarrator, Narrator};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Setup Logging (Tracing)
    // RUST_LOG=debug payguard assess ... pour voir les détails.
    // Logs go to stderr: stdout carries only the report.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Narrator picked once, here. An LLM-backed one would be wired in the same spot.
    let narrator: Box<dyn Narrator> = Box::new(DeterministicNarrator);

    match cli.command {
        Commands::Assess {
            dataset,
            checks,
            project_dir,
            output,
            format,
        } => {
            commands::assess::execute(
                dataset,
                checks,
                project_dir,
                output,
                format,
                narrator.as_ref(),
            )
            .await
        }
        Commands::Score {
            checks,
            profile,
            project_dir,
            format,
        } => commands::score::execute(checks, profile, project_dir, format),
        Commands::Detect {
            dataset,
            project_dir,
            format,
        } => commands::detect::execute(dataset, project_dir, format).await,
    }
}
