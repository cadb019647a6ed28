use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands;

#[derive(Parser)]
#[command(name = "skytech")]
#[command(about = "SKYTECH-3 index snapshot CLI", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute one index snapshot and write artifacts
    Snapshot {
        /// Path to the index config JSON (default: skytech.json, else built-in basket)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Artifact output directory (default: $SKYTECH_OUTPUT_DIR or outputs/)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Target session date YYYY-MM-DD (default: today in market time)
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Show the last written snapshot stats
    Status {
        /// Artifact output directory (default: $SKYTECH_OUTPUT_DIR or outputs/)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

pub fn run() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Snapshot {
            config,
            output,
            date,
        } => {
            commands::snapshot::run(config, output, date);
        }
        Commands::Status { output } => {
            commands::status::run(output);
        }
    }
}
