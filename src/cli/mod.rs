//! CLI module for AeroCMS
//!
//! Provides command-line interface for:
//! - validate / collect: relation checks on a stdin payload
//! - create / update: checked writes against the data file
//! - schemas: registered content types
//! - webhook-check: webhook form validation

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{run, run_command};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_request, write_error, write_response};
