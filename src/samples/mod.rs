//! Sample commands used by the `argbind` binary
//!
//! They exist to exercise the binding pipeline end to end.

pub mod greet;
pub mod sum;

pub use greet::{GreetCommand, GreetContext, Style};
pub use sum::{SumCommand, SumContext, Summary};

use std::sync::{Arc, Mutex};

/// Where sample commands write their lines
#[derive(Debug, Clone, Default)]
pub struct Output {
    captured: Option<Arc<Mutex<Vec<String>>>>,
}

impl Output {
    /// Print to stdout
    pub fn stdout() -> Self {
        Self::default()
    }

    /// Collect lines in memory; the returned handle sees every line written
    pub fn capture() -> (Self, Arc<Mutex<Vec<String>>>) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                captured: Some(Arc::clone(&lines)),
            },
            lines,
        )
    }

    pub fn line(&self, line: impl Into<String>) {
        let line = line.into();
        match &self.captured {
            Some(lines) => match lines.lock() {
                Ok(mut lines) => lines.push(line),
                Err(poisoned) => poisoned.into_inner().push(line),
            },
            None => println!("{line}"),
        }
    }
}
