use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(version, about, long_about = None)]
pub struct CliArgs {
    /// Log level: trace, debug, info, warn or error. Overrides `RUST_LOG`.
    #[arg(short, long, global = true)]
    pub log_level: Option<log::LevelFilter>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Parse the collectd CSV files of a host and print the statistics.
    Parse {
        /// Path to a TOML config file, merged on top of the default configuration.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Host to summarise, instead of the configured one.
        #[arg(long)]
        host: Option<String>,

        /// Write the report to this file as JSON.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Append the report to this JSON lines file.
        #[arg(long)]
        append: Option<PathBuf>,
    },
    /// Print a report saved with `--output` or `--append`.
    Show {
        /// A `.json` report or a `.jsonl` report history.
        path: PathBuf,

        /// Print every report of a history, not only the latest per configuration.
        #[arg(long, default_value = "false")]
        all: bool,
    },
}
