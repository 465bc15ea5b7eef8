//! Command-line interface module
//!
//! Provides host flag parsing and dispatch of the sample commands.

pub mod args;
pub mod commands;

pub use args::{Args, parse_args};
pub use commands::{build_commander, execute_command};
