//! Option descriptors
//!
//! A descriptor declares one bindable option of a context type: its canonical
//! name, the tags a caller may type for it, whether it is required, its
//! default and its help text.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Declaration of one bindable option
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionDescriptor {
    /// Canonical name, unique within one context shape
    pub name: String,
    /// Alternative tags matched against raw option keys
    pub tags: Vec<String>,
    /// Missing required options are errors and never defaulted
    pub required: bool,
    /// Value used when a non-required option is absent
    pub default: Option<String>,
    /// Help text shown in usage output
    pub help: String,
    /// Repeated occurrences are collected instead of overwritten
    pub multi_value: bool,
}

impl OptionDescriptor {
    /// Create an optional descriptor whose only tag is its name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tags: Vec::new(),
            required: false,
            default: None,
            help: String::new(),
            multi_value: false,
        }
    }

    /// Add an alias tag
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn default_value(mut self, value: impl ToString) -> Self {
        self.default = Some(value.to_string());
        self
    }

    #[must_use]
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    #[must_use]
    pub fn multi_value(mut self) -> Self {
        self.multi_value = true;
        self
    }

    /// Whether a raw key names this option, by tag or by canonical name
    pub fn is_matched_by(&self, key: &str, case_sensitive: bool) -> bool {
        let eq = |candidate: &str| {
            if case_sensitive {
                candidate == key
            } else {
                candidate.to_lowercase() == key.to_lowercase()
            }
        };
        eq(self.name.as_str()) || self.tags.iter().any(|t| eq(t.as_str()))
    }

    /// One usage line, e.g. `--name, -n  (required)  Who to greet`.
    ///
    /// Single-character tags are spelled with the shortest prefix, everything
    /// else with the longest.
    pub fn usage_line(&self, prefixes: &[String]) -> String {
        let long = prefixes.iter().max_by_key(|p| p.len()).map_or("", String::as_str);
        let short = prefixes.iter().min_by_key(|p| p.len()).map_or("", String::as_str);
        let spell = |key: &str| {
            if key.chars().count() == 1 {
                format!("{short}{key}")
            } else {
                format!("{long}{key}")
            }
        };

        let mut line = std::iter::once(spell(&self.name))
            .chain(self.tags.iter().map(|t| spell(t)))
            .collect::<Vec<_>>()
            .join(", ");

        if self.required {
            line.push_str("  (required)");
        } else if let Some(default) = self.default.as_deref().filter(|d| !d.is_empty()) {
            line.push_str(&format!("  (default: {default})"));
        }

        if !self.help.is_empty() {
            line.push_str("  ");
            line.push_str(&self.help);
        }
        line
    }
}

impl fmt::Display for OptionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: [{}], required={}, default={}",
            self.name,
            self.tags.join(","),
            self.required,
            self.default.as_deref().unwrap_or("")
        )
    }
}
