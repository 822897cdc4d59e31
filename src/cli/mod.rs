//! CLI module
//!
//! Command-line interface for the exporter.
//!
//! # Commands
//!
//! - `export` - Fetch all audit records of the configured window
//! - `fetch-xml` - Print the initial query document

mod commands;
mod runner;

pub use commands::{Cli, Commands, Overrides};
pub use runner::{format_elapsed, Runner};
