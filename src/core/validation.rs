//! Error aggregation across the binding pipeline
//!
//! Every stage appends to one [`ErrorDetailList`] so a failed invocation can
//! report all of its problems at once.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Key used for errors raised by a command's business logic
pub const COMMAND_EXECUTION_KEY: &str = "CommandExecution";

/// Category of a collected error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// A raw option matched no descriptor
    UnknownOption,
    /// A required descriptor had no matching raw option
    MissingMandatoryOption,
    /// A raw value could not be converted to the field's type
    ValueConversionFailure,
    /// Cross-field check added by a command before execution
    Validation,
    /// The command's business logic failed
    CommandExecutionFailure,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::UnknownOption => "unknown option",
            Self::MissingMandatoryOption => "missing mandatory option",
            Self::ValueConversionFailure => "value conversion failure",
            Self::Validation => "validation",
            Self::CommandExecutionFailure => "command execution failure",
        };
        f.write_str(name)
    }
}

/// All messages collected for one option or field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Option name, raw key or [`COMMAND_EXECUTION_KEY`]
    pub name: String,
    /// Error category
    pub kind: ErrorKind,
    /// Human-readable messages, never empty
    pub messages: Vec<String>,
}

/// Ordered, append-only collection of [`ErrorDetail`]s
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetailList {
    details: Vec<ErrorDetail>,
}

impl ErrorDetailList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message for `name`.
    ///
    /// Messages for an existing detail with the same name and kind are
    /// grouped under that detail; otherwise a new detail is appended.
    pub fn add_error(&mut self, kind: ErrorKind, name: impl Into<String>, message: impl Into<String>) {
        let name = name.into();
        let message = message.into();

        if let Some(detail) = self
            .details
            .iter_mut()
            .find(|d| d.kind == kind && d.name == name)
        {
            detail.messages.push(message);
        } else {
            self.details.push(ErrorDetail {
                name,
                kind,
                messages: vec![message],
            });
        }
    }

    /// Append a cross-field validation message
    pub fn add_validation(&mut self, name: impl Into<String>, message: impl Into<String>) {
        self.add_error(ErrorKind::Validation, name, message);
    }

    pub fn has_errors(&self) -> bool {
        !self.details.is_empty()
    }

    pub fn len(&self) -> usize {
        self.details.len()
    }

    pub fn is_empty(&self) -> bool {
        self.details.is_empty()
    }

    pub fn details(&self) -> &[ErrorDetail] {
        &self.details
    }

    /// Details of one kind, in the order they were added
    pub fn of_kind(&self, kind: ErrorKind) -> impl Iterator<Item = &ErrorDetail> {
        self.details.iter().filter(move |d| d.kind == kind)
    }

    /// Detail for a given option name, if any
    pub fn get(&self, name: &str) -> Option<&ErrorDetail> {
        self.details.iter().find(|d| d.name == name)
    }

    /// Every message, flattened in insertion order
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.details
            .iter()
            .flat_map(|d| d.messages.iter().map(String::as_str))
    }
}

impl fmt::Display for ErrorDetailList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.details.as_slice() {
            [] => f.write_str("no errors"),
            [single] if single.messages.len() == 1 => f.write_str(&single.messages[0]),
            details => {
                write!(f, "{} error(s) occurred:", details.len())?;
                for detail in details {
                    for message in &detail.messages {
                        write!(f, "\n  - {}: {}", detail.name, message)?;
                    }
                }
                Ok(())
            }
        }
    }
}

impl<'a> IntoIterator for &'a ErrorDetailList {
    type Item = &'a ErrorDetail;
    type IntoIter = std::slice::Iter<'a, ErrorDetail>;

    fn into_iter(self) -> Self::IntoIter {
        self.details.iter()
    }
}
