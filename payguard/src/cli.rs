// payguard/src/cli.rs
//
// Single source of truth for all CLI definitions (Clap structs).

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "payguard")]
#[command(about = "Data quality scoring and anomaly detection for payment datasets", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Format {
    #[default]
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 🛡️ Full assessment: anomaly detection + scoring + narrative
    Assess {
        /// CSV file to assess
        #[arg(long)]
        dataset: PathBuf,

        /// Rule-based check results (JSON array) to score alongside anomalies
        #[arg(long)]
        checks: Option<PathBuf>,

        /// Directory holding payguard.yaml
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// Also write the full report to this JSON file
        #[arg(long, short)]
        output: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = Format::Table)]
        format: Format,
    },

    /// 📊 Scores existing check results (no dataset needed)
    Score {
        /// Check results (JSON array)
        #[arg(long)]
        checks: PathBuf,

        /// Dataset profile (JSON), used for field criticality
        #[arg(long)]
        profile: Option<PathBuf>,

        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        #[arg(long, value_enum, default_value_t = Format::Table)]
        format: Format,
    },

    /// 🔎 Runs the anomaly detectors only
    Detect {
        #[arg(long)]
        dataset: PathBuf,

        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        #[arg(long, value_enum, default_value_t = Format::Table)]
        format: Format,
    },
}
