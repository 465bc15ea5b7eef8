//! Host command-line flags
//!
//! `clap` handles the binary's own flags; everything from the first
//! positional token on is handed untouched to the dispatcher.

use clap::Parser;

/// argbind - verb dispatch and option binding demo
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "argbind")]
pub struct Args {
    /// Enable debug output
    #[arg(long)]
    pub debug: bool,

    /// Match option tags and verbs case-insensitively
    #[arg(long)]
    pub ignore_case: bool,

    /// Do not report options no command declares
    #[arg(long)]
    pub ignore_unknown: bool,

    /// Verb path, options and targets for the dispatched command
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "COMMAND LINE")]
    pub command_line: Vec<String>,
}

/// Parse command line arguments
pub fn parse_args() -> Args {
    Args::parse()
}
