//! Topolab command-line interface
//!
//! Inspect, validate, normalize and label topology description files
//! without a backend.

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use topolab_cli::commands::{inspect, label, normalize, validate};
use topolab_cli::load_config;

#[derive(Parser)]
#[command(name = "topolab")]
#[command(about = "Topolab - offline topology description tools", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file path
    #[arg(short, long, global = true, default_value = "topolab.toml")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Show node and link counts of a description
    Inspect {
        /// Description file
        file: PathBuf,
    },

    /// Rebuild a description and report anything that would be dropped
    Validate {
        /// Description file
        file: PathBuf,
    },

    /// Rewrite a description in canonical form
    Normalize {
        /// Description file
        file: PathBuf,

        /// Output file; printed to stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print each link with its addressing label
    Label {
        /// Description file
        file: PathBuf,

        /// Link parameter map reported by the backend
        #[arg(short, long)]
        links: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&cli.config)?;

    match cli.command {
        Commands::Inspect { file } => {
            print!("{}", inspect::run(&file)?);
        }

        Commands::Validate { file } => {
            let validation = validate::run(&file, &config)?;
            print!("{}", validation.report);
            if !validation.is_clean() {
                bail!(
                    "{} problem(s) found in {}",
                    validation.problems,
                    file.display()
                );
            }
        }

        Commands::Normalize { file, output } => {
            let json = normalize::run(&file, output.as_deref(), &config)?;
            if output.is_none() {
                println!("{json}");
            }
        }

        Commands::Label { file, links } => {
            print!("{}", label::run(&file, &links)?);
        }
    }

    Ok(())
}
