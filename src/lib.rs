//! # argbind
//!
//! Verb dispatch and declarative option binding for multi-command CLIs.
//! A raw command line is tokenized into verbs, options and targets, the verb
//! path selects a command, and the command's options are bound into a typed
//! context before its logic runs.
//!
//! ## Features
//!
//! - Descriptor tables with tags, required options, defaults and help text
//! - Every unknown, missing or unconvertible option reported in one pass
//! - Fresh command and context per invocation
//! - Lifecycle hooks for cross-field validation and custom error reporting
//!
//! ## Example
//!
//! ```no_run
//! use argbind::{config::Settings, core::Commander};
//!
//! let mut commander = Commander::new(Settings::default())?;
//! commander.register_function("hello", |args| {
//!     println!("hello {}", args.targets().join(" "));
//!     Ok(())
//! })?;
//! commander.dispatch(["hello", "--", "world"])?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod samples;

use anyhow::Result;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging with appropriate verbosity
pub fn setup_logging(debug: bool) -> Result<()> {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(true)
                .compact(),
        )
        .with(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}
