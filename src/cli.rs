//! Command-line interface definitions using clap

use clap::{Parser, Subcommand};

/// Usage telemetry backend for game mods
#[derive(Parser)]
#[command(name = "modtelemetry")]
#[command(version)]
#[command(about = "Usage telemetry backend for game mods", long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file (default: config.toml)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Generate example configuration file
    GenerateConfig {
        /// Output path (default: config.example.toml)
        #[arg(long, short = 'o')]
        output: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Export all telemetry records to a CSV file
    ExportCsv {
        /// Destination file
        path: String,
    },
}
