//! CLI module for aeroquery
//!
//! Provides command-line interface for:
//! - compile: Compile a request from stdin into its wire form
//! - explain: Show the index decision for a request from stdin
//! - validate: Check the configuration and index catalog

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{
    compile, compile_document, explain, explain_document, run, run_command, validate,
    RequestDocument,
};
pub use config::Config;
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_request, read_request_from, write_error, write_error_to, write_response, write_response_to};
