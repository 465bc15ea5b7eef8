//! Error types for argument binding and dispatch
//!
//! Fatal errors live here. Per-option validation problems are collected in
//! [`ErrorDetailList`](crate::core::validation::ErrorDetailList) and only
//! surface as [`ArgsError::Validation`] once a command reports them.

use crate::core::validation::ErrorDetailList;
use thiserror::Error;

/// Main error type for argbind
#[derive(Error, Debug)]
pub enum ArgsError {
    /// No command is registered for the requested verb
    #[error("There is no command registered for verb '{verb}'. Check if upper/lower case is correct.")]
    CommandNotFound { verb: String },

    /// Setup defects: empty registry, empty verb, broken context shape, bad settings
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Aggregate of every argument and execution problem collected in one run
    #[error("{errors}")]
    Validation { errors: ErrorDetailList },
}

impl ArgsError {
    /// Create a new command-not-found error
    pub fn command_not_found(verb: impl Into<String>) -> Self {
        Self::CommandNotFound { verb: verb.into() }
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Create a new configuration error wrapping its cause
    pub fn config_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new aggregate validation error
    pub fn validation(errors: ErrorDetailList) -> Self {
        Self::Validation { errors }
    }

    /// The collected error details, if this is an aggregate validation error
    pub fn details(&self) -> Option<&ErrorDetailList> {
        match self {
            Self::Validation { errors } => Some(errors),
            _ => None,
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, ArgsError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::validation::ErrorKind;

    #[test]
    fn test_command_not_found_names_verb() {
        let err = ArgsError::command_not_found("math.sum");
        assert!(err.to_string().contains("'math.sum'"));
    }

    #[test]
    fn test_validation_displays_every_message() {
        let mut errors = ErrorDetailList::new();
        errors.add_error(ErrorKind::UnknownOption, "x", "Unknown option 'x'");
        errors.add_error(ErrorKind::MissingMandatoryOption, "name", "Missing 'name'");

        let err = ArgsError::validation(errors);
        let text = err.to_string();
        assert!(text.contains("Unknown option 'x'"));
        assert!(text.contains("Missing 'name'"));
        assert_eq!(err.details().map(ErrorDetailList::len), Some(2));
    }
}
