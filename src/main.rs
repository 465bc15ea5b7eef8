#![allow(clippy::cargo_common_metadata)]
use anyhow::Result;
use argbind::{cli, config::Settings, setup_logging};

fn main() -> Result<()> {
    // Parse host flags; the rest of the line belongs to the dispatcher
    let args = cli::parse_args();

    // Setup logging based on debug flag
    setup_logging(args.debug)?;

    // Initialize settings
    let settings = Settings::from_args(&args)?;

    // Dispatch to the command named by the verb path
    cli::execute_command(&settings, &args.command_line)
}
