#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the credit-card statement parser.
//!
//! `card_parser parse` prints one JSON envelope per statement to stdout.
//! Logs go through `indicatif-log-bridge` (via
//! [`card_parser_cli_utils::init_logger`]) on stderr so stdout stays
//! machine readable.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use commands::CliError;

#[derive(Parser)]
#[command(name = "card_parser", about = "Credit-card statement parser")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse statement PDFs and print the extracted data as JSON
    Parse {
        /// Statement files to parse
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// TOML file overriding the built-in parser configuration
        #[arg(long)]
        config: Option<PathBuf>,
        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Print the bank a statement was issued by
    Identify {
        /// Statement file
        file: PathBuf,
    },
    /// Print the text extracted from a statement
    Text {
        /// Statement file
        file: PathBuf,
    },
    /// Print the ruled tables detected in a statement as TSV
    Tables {
        /// Statement file
        file: PathBuf,
        /// Only inspect this page (1-based)
        #[arg(long)]
        page: Option<u32>,
        /// TOML file overriding the built-in table settings
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print the effective parser configuration
    Config {
        /// TOML file overriding the built-in parser configuration
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn run(cli: Cli) -> Result<i32, CliError> {
    let multi = card_parser_cli_utils::init_logger();

    match cli.command {
        Commands::Parse {
            files,
            config,
            pretty,
        } => {
            let (document, exit_code) = commands::parse(&multi, &files, config.as_deref())?;
            let json = if pretty {
                serde_json::to_string_pretty(&document)?
            } else {
                serde_json::to_string(&document)?
            };
            println!("{json}");
            return Ok(exit_code);
        }
        Commands::Identify { file } => {
            println!("{}", commands::identify(&file)?);
        }
        Commands::Text { file } => {
            println!("{}", commands::text(&file)?);
        }
        Commands::Tables { file, page, config } => {
            print!("{}", commands::tables(&file, page, config.as_deref())?);
        }
        Commands::Config { config } => {
            print!("{}", commands::config(config.as_deref())?);
        }
    }

    Ok(0)
}

fn main() {
    let cli = Cli::parse();

    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            e.exit_code()
        }
    };

    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}
