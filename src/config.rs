//! Configuration for tokenizing, resolving and dispatching
//!
//! Settings are passed explicitly through the pipeline; nothing reads them
//! from a global.

use crate::{cli::Args, error::ArgsError};
use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};

/// Diagnostic sink receiving resolved/unresolved option names
pub type TraceCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Main configuration structure
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Match option tags and verbs case-sensitively
    pub case_sensitive: bool,
    /// Do not report raw options that match no descriptor
    pub ignore_unknown_tags: bool,
    /// Ask a [`CommandResolver`](crate::core::commander::CommandResolver) for commands on startup
    pub auto_resolve_commands: bool,
    /// Prefixes marking an option token, e.g. `--` and `-`
    pub option_prefixes: Vec<String>,
    /// Characters splitting `key=value` inside one token
    pub value_separators: Vec<char>,
    /// Separator for multi-value options and list fields
    pub multi_value_delimiter: char,
    /// Optional diagnostic sink for option resolution
    #[serde(skip)]
    pub trace: Option<TraceCallback>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            case_sensitive: true,
            ignore_unknown_tags: false,
            auto_resolve_commands: false,
            option_prefixes: vec!["--".to_string(), "-".to_string()],
            value_separators: vec!['=', ':'],
            multi_value_delimiter: ',',
            trace: None,
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("case_sensitive", &self.case_sensitive)
            .field("ignore_unknown_tags", &self.ignore_unknown_tags)
            .field("auto_resolve_commands", &self.auto_resolve_commands)
            .field("option_prefixes", &self.option_prefixes)
            .field("value_separators", &self.value_separators)
            .field("multi_value_delimiter", &self.multi_value_delimiter)
            .field("trace", &self.trace.is_some())
            .finish()
    }
}

impl Settings {
    /// Create configuration from the host binary's command line flags
    pub fn from_args(args: &Args) -> Result<Self, ArgsError> {
        let settings = Self {
            case_sensitive: !args.ignore_case,
            ignore_unknown_tags: args.ignore_unknown,
            ..Self::default()
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Attach a trace sink
    #[must_use]
    pub fn with_trace(mut self, trace: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.trace = Some(Arc::new(trace));
        self
    }

    /// Send a line to the trace sink, if one is configured
    pub fn trace(&self, message: &str) {
        if let Some(trace) = &self.trace {
            trace(message);
        }
    }

    /// Compare an option tag or verb according to `case_sensitive`
    pub fn matches(&self, left: &str, right: &str) -> bool {
        if self.case_sensitive {
            left == right
        } else {
            left.to_lowercase() == right.to_lowercase()
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ArgsError> {
        if self.option_prefixes.is_empty() {
            return Err(ArgsError::config("At least one option prefix is required"));
        }

        if self.option_prefixes.iter().any(String::is_empty) {
            return Err(ArgsError::config("Option prefixes must not be empty"));
        }

        if self.value_separators.contains(&self.multi_value_delimiter) {
            return Err(ArgsError::config(format!(
                "Multi-value delimiter '{}' must differ from the value separators",
                self.multi_value_delimiter
            )));
        }

        if self.multi_value_delimiter.is_alphanumeric() {
            return Err(ArgsError::config(format!(
                "Multi-value delimiter '{}' must not be alphanumeric",
                self.multi_value_delimiter
            )));
        }

        Ok(())
    }
}
