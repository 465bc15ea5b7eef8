//! Command-line tokenizing
//!
//! Splits raw tokens into a verb path, raw options and positional targets
//! without knowing anything about the command that will consume them.

use crate::{
    config::Settings,
    error::{ArgsError, Result},
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Token ending option recognition; everything after it is a target
pub const END_OF_OPTIONS: &str = "--";

/// Value given to an option that appears without one
pub const FLAG_VALUE: &str = "true";

/// One raw `key -> value` pair as typed by the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawOption {
    pub key: String,
    pub value: String,
}

/// A parsed command line
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arguments {
    verbs: Vec<String>,
    options: Vec<RawOption>,
    occurrences: Vec<RawOption>,
    targets: Vec<String>,
}

impl Arguments {
    /// Leading plain tokens, in order
    pub fn verbs(&self) -> &[String] {
        &self.verbs
    }

    /// Verbs joined with `.`, or `None` when the command line has no verb
    pub fn verb_path(&self) -> Option<String> {
        if self.verbs.is_empty() {
            None
        } else {
            Some(self.verbs.join("."))
        }
    }

    /// Raw options with unique keys; the last occurrence of a key wins.
    /// Ordered by each key's first appearance.
    pub fn options(&self) -> &[RawOption] {
        &self.options
    }

    /// Every option occurrence in input order, duplicates included
    pub fn occurrences(&self) -> &[RawOption] {
        &self.occurrences
    }

    /// Value of a raw option key (exact match)
    pub fn option(&self, key: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|o| o.key == key)
            .map(|o| o.value.as_str())
    }

    pub fn has_option(&self, key: &str) -> bool {
        self.option(key).is_some()
    }

    /// Positional values not bound to any option
    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    fn push_option(&mut self, key: String, value: String) {
        self.occurrences.push(RawOption {
            key: key.clone(),
            value: value.clone(),
        });

        match self.options.iter_mut().find(|o| o.key == key) {
            Some(existing) => existing.value = value,
            None => self.options.push(RawOption { key, value }),
        }
    }
}

/// Tokenizer configured with option prefixes and value separators
#[derive(Debug, Clone)]
pub struct Tokenizer {
    re_option: Regex,
}

impl Tokenizer {
    /// Create a tokenizer for the given settings
    pub fn new(settings: &Settings) -> Result<Self> {
        let mut prefixes: Vec<&str> = settings.option_prefixes.iter().map(String::as_str).collect();
        // Longest first so `--` is tried before `-`
        prefixes.sort_by_key(|p| std::cmp::Reverse(p.len()));
        let prefixes = prefixes
            .into_iter()
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join("|");

        let value_part = if settings.value_separators.is_empty() {
            String::new()
        } else {
            let separators: String = settings
                .value_separators
                .iter()
                .map(|c| regex::escape(&c.to_string()))
                .collect();
            format!("(?:[{separators}](.*))?")
        };

        let pattern = format!(r"(?s)^(?:{prefixes})([A-Za-z_?][A-Za-z0-9_.?\-]*){value_part}$");
        let re_option = Regex::new(&pattern)
            .map_err(|e| ArgsError::config_with_source("Failed to compile option pattern", e))?;

        Ok(Self { re_option })
    }

    /// Whether a token is an option marker
    pub fn is_option(&self, token: &str) -> bool {
        token != END_OF_OPTIONS && self.re_option.is_match(token)
    }

    /// Parse the tokens following the program name
    #[instrument(skip(self, tokens))]
    pub fn parse<I, S>(&self, tokens: I) -> Arguments
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();
        let mut arguments = Arguments::default();
        let mut rest = tokens.into_iter().peekable();

        while let Some(token) = rest.next_if(|t| t != END_OF_OPTIONS && !self.is_option(t)) {
            arguments.verbs.push(token);
        }

        while let Some(token) = rest.next() {
            if token == END_OF_OPTIONS {
                arguments.targets.extend(rest.by_ref());
                break;
            }

            let parsed = self
                .re_option
                .captures(&token)
                .map(|caps| (caps[1].to_string(), caps.get(2).map(|m| m.as_str().to_string())));

            let Some((key, inline)) = parsed else {
                arguments.targets.push(token);
                continue;
            };

            let value = match inline {
                Some(inline) => inline,
                None => rest
                    .next_if(|next| next != END_OF_OPTIONS && !self.is_option(next))
                    .unwrap_or_else(|| FLAG_VALUE.to_string()),
            };

            debug!("Parsed option {} = '{}'", key, value);
            arguments.push_option(key, value);
        }

        debug!(
            "Tokenized command line: verbs={:?}, {} option(s), {} target(s)",
            arguments.verbs,
            arguments.options.len(),
            arguments.targets.len()
        );
        arguments
    }
}
