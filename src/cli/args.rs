//! CLI argument definitions using clap
//!
//! Commands:
//! - aeroquery compile --config <path>
//! - aeroquery explain --config <path>
//! - aeroquery validate --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// aeroquery - compile conditions into key-value store query requests
#[derive(Parser, Debug)]
#[command(name = "aeroquery")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Compile a request read from stdin into its wire form
    Compile {
        /// Path to configuration file
        #[arg(long, default_value = "./aeroquery.json")]
        config: PathBuf,
    },

    /// Show which index a request read from stdin would use
    Explain {
        /// Path to configuration file
        #[arg(long, default_value = "./aeroquery.json")]
        config: PathBuf,
    },

    /// Check the configuration and its index catalog
    Validate {
        /// Path to configuration file
        #[arg(long, default_value = "./aeroquery.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
