//! Option resolution
//!
//! Maps raw option keys onto declared descriptors, reports unknown and
//! missing options, and fills defaults for everything optional that the
//! caller left out.

use crate::{
    config::Settings,
    core::{
        descriptor::OptionDescriptor,
        tokenizer::Arguments,
        validation::{ErrorDetailList, ErrorKind},
    },
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, instrument};

/// Cross-cutting options that are never reported as unknown
pub const WELL_KNOWN_OPTIONS: &[&str] = &[TRACE_OPTION];

/// Enables the resolution trace for one invocation
pub const TRACE_OPTION: &str = "argbind-trace";

/// An option after resolution, keyed by canonical name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedOption {
    pub name: String,
    pub value: String,
    /// `true` when the caller supplied the value, `false` when defaulted
    pub is_resolved: bool,
}

/// Resolves raw options against one descriptor table
#[derive(Debug, Clone, Copy)]
pub struct OptionResolver<'a> {
    descriptors: &'a [OptionDescriptor],
}

impl<'a> OptionResolver<'a> {
    pub const fn new(descriptors: &'a [OptionDescriptor]) -> Self {
        Self { descriptors }
    }

    /// Resolve all raw options to canonical options.
    ///
    /// Problems are appended to `errors`; resolution never stops early. The
    /// result holds one option per descriptor that was either supplied or
    /// defaulted, in declaration order.
    #[instrument(skip_all, fields(descriptors = self.descriptors.len()))]
    pub fn resolve(
        &self,
        arguments: &Arguments,
        errors: &mut ErrorDetailList,
        settings: &Settings,
    ) -> Vec<ResolvedOption> {
        let mut supplied: HashMap<&str, Vec<String>> = HashMap::new();
        let mut reported_unknown: HashSet<&str> = HashSet::new();

        for raw in arguments.occurrences() {
            let descriptor = self
                .descriptors
                .iter()
                .find(|d| d.is_matched_by(&raw.key, settings.case_sensitive));

            match descriptor {
                Some(d) if d.multi_value => {
                    debug!("Option '{}' collects value '{}' for {}", raw.key, raw.value, d.name);
                    supplied.entry(d.name.as_str()).or_default().push(raw.value.clone());
                }
                Some(d) => {
                    debug!("Option '{}' resolved to {}", raw.key, d.name);
                    supplied.insert(d.name.as_str(), vec![raw.value.clone()]);
                }
                None if settings.ignore_unknown_tags
                    || WELL_KNOWN_OPTIONS.contains(&raw.key.as_str()) => {}
                None => {
                    if reported_unknown.insert(raw.key.as_str()) {
                        errors.add_error(
                            ErrorKind::UnknownOption,
                            &raw.key,
                            format!("Unknown option '{}' provided in the command-line", raw.key),
                        );
                    }
                }
            }
        }

        // Must run before defaults are applied: a missing required option
        // never receives its default.
        for d in self.descriptors.iter().filter(|d| d.required) {
            if !supplied.contains_key(d.name.as_str()) {
                errors.add_error(
                    ErrorKind::MissingMandatoryOption,
                    &d.name,
                    format!("Missing mandatory option: '{}'", d.name),
                );
            }
        }

        let delimiter = settings.multi_value_delimiter.to_string();
        let resolved: Vec<ResolvedOption> = self
            .descriptors
            .iter()
            .filter_map(|d| match supplied.get(d.name.as_str()) {
                Some(values) => Some(ResolvedOption {
                    name: d.name.clone(),
                    value: values.join(&delimiter),
                    is_resolved: true,
                }),
                None if !d.required => Some(ResolvedOption {
                    name: d.name.clone(),
                    value: d.default.clone().unwrap_or_default(),
                    is_resolved: false,
                }),
                None => None,
            })
            .collect();

        if !errors.has_errors() {
            self.trace(&resolved, arguments, settings);
        }

        resolved
    }

    fn trace(&self, resolved: &[ResolvedOption], arguments: &Arguments, settings: &Settings) {
        let names = |flag: bool| {
            resolved
                .iter()
                .filter(|o| o.is_resolved == flag)
                .map(|o| o.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };
        let resolved_line = format!("Resolved Options: '{}'", names(true));
        let unresolved_line = format!("Unresolved Options: '{}'", names(false));

        if arguments.has_option(TRACE_OPTION) {
            info!("{}", resolved_line);
            info!("{}", unresolved_line);
        } else {
            debug!("{}", resolved_line);
            debug!("{}", unresolved_line);
        }

        settings.trace(&resolved_line);
        settings.trace(&unresolved_line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tokenizer::Tokenizer;
    use std::sync::{Arc, Mutex};

    fn descriptors() -> Vec<OptionDescriptor> {
        vec![
            OptionDescriptor::new("name").tag("n").required(),
            OptionDescriptor::new("times").tag("t").default_value(1),
            OptionDescriptor::new("style"),
        ]
    }

    fn parse(line: &str) -> Arguments {
        Tokenizer::new(&Settings::default())
            .unwrap()
            .parse(line.split_whitespace())
    }

    fn resolve(line: &str, settings: &Settings) -> (Vec<ResolvedOption>, ErrorDetailList) {
        let descriptors = descriptors();
        let mut errors = ErrorDetailList::new();
        let resolved = OptionResolver::new(&descriptors).resolve(&parse(line), &mut errors, settings);
        (resolved, errors)
    }

    fn find<'a>(resolved: &'a [ResolvedOption], name: &str) -> Option<&'a ResolvedOption> {
        resolved.iter().find(|o| o.name == name)
    }

    #[test]
    fn test_tags_resolve_to_canonical_names() {
        let (resolved, errors) = resolve("greet -n Joe -t 3", &Settings::default());
        assert!(!errors.has_errors());

        let name = find(&resolved, "name").unwrap();
        assert_eq!(name.value, "Joe");
        assert!(name.is_resolved);
        assert_eq!(find(&resolved, "times").unwrap().value, "3");
    }

    #[test]
    fn test_defaults_fill_absent_optional_options() {
        let (resolved, errors) = resolve("greet --name=Joe", &Settings::default());
        assert!(!errors.has_errors());

        let times = find(&resolved, "times").unwrap();
        assert_eq!(times.value, "1");
        assert!(!times.is_resolved);

        let style = find(&resolved, "style").unwrap();
        assert_eq!(style.value, "");
        assert!(!style.is_resolved);
    }

    #[test]
    fn test_missing_required_is_reported_once_and_never_defaulted() {
        let descriptors = vec![OptionDescriptor::new("name").required()];
        let mut errors = ErrorDetailList::new();
        let resolved = OptionResolver::new(&descriptors).resolve(
            &parse("greet"),
            &mut errors,
            &Settings::default(),
        );

        assert_eq!(errors.of_kind(ErrorKind::MissingMandatoryOption).count(), 1);
        assert!(find(&resolved, "name").is_none());
    }

    #[test]
    fn test_required_default_is_never_applied() {
        let descriptors = vec![OptionDescriptor::new("name").required().default_value("anon")];
        let mut errors = ErrorDetailList::new();
        let resolved = OptionResolver::new(&descriptors).resolve(
            &parse("greet"),
            &mut errors,
            &Settings::default(),
        );

        assert_eq!(errors.len(), 1);
        assert_eq!(errors.of_kind(ErrorKind::MissingMandatoryOption).count(), 1);
        assert!(find(&resolved, "name").is_none());

        let mut errors = ErrorDetailList::new();
        let resolved = OptionResolver::new(&descriptors).resolve(
            &parse("greet --name=joe"),
            &mut errors,
            &Settings::default(),
        );
        assert!(!errors.has_errors());
        assert_eq!(find(&resolved, "name").unwrap().value, "joe");
    }

    #[test]
    fn test_unknown_options_are_reported_per_key() {
        let (_, errors) = resolve("greet --name=a --x=1 --x=2 --y", &Settings::default());
        let unknown: Vec<_> = errors
            .of_kind(ErrorKind::UnknownOption)
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(unknown, vec!["x", "y"]);
    }

    #[test]
    fn test_all_problems_surface_together() {
        let (_, errors) = resolve("greet --bogus", &Settings::default());
        assert_eq!(errors.of_kind(ErrorKind::UnknownOption).count(), 1);
        assert_eq!(errors.of_kind(ErrorKind::MissingMandatoryOption).count(), 1);
    }

    #[test]
    fn test_ignore_unknown_and_well_known() {
        let settings = Settings {
            ignore_unknown_tags: true,
            ..Settings::default()
        };
        let (_, errors) = resolve("greet --name=a --bogus", &settings);
        assert!(!errors.has_errors());

        let (_, errors) = resolve("greet --name=a --argbind-trace", &Settings::default());
        assert!(!errors.has_errors());
    }

    #[test]
    fn test_case_insensitive_matching() {
        let settings = Settings {
            case_sensitive: false,
            ..Settings::default()
        };
        let (resolved, errors) = resolve("greet --NAME=a", &settings);
        assert!(!errors.has_errors());
        assert_eq!(find(&resolved, "name").unwrap().value, "a");

        let (_, errors) = resolve("greet --NAME=a", &Settings::default());
        assert!(errors.has_errors());
    }

    #[test]
    fn test_alias_and_name_last_write_wins() {
        let (resolved, _) = resolve("greet --name=first -n second", &Settings::default());
        assert_eq!(find(&resolved, "name").unwrap().value, "second");
        assert_eq!(resolved.iter().filter(|o| o.name == "name").count(), 1);
    }

    #[test]
    fn test_multi_value_collects_occurrences() {
        let descriptors = vec![OptionDescriptor::new("values").tag("v").multi_value()];
        let mut errors = ErrorDetailList::new();
        let resolved = OptionResolver::new(&descriptors).resolve(
            &parse("sum --values=3 -v 4 --values=5"),
            &mut errors,
            &Settings::default(),
        );
        assert_eq!(resolved[0].value, "3,4,5");
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let first = resolve("greet -n a --style=x", &Settings::default());
        let second = resolve("greet -n a --style=x", &Settings::default());
        assert_eq!(first, second);
    }

    #[test]
    fn test_trace_callback_receives_names() {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&lines);
        let settings = Settings::default().with_trace(move |l| sink.lock().unwrap().push(l.to_string()));

        resolve("greet --name=a", &settings);
        let lines = lines.lock().unwrap();
        assert_eq!(lines[0], "Resolved Options: 'name'");
        assert_eq!(lines[1], "Unresolved Options: 'times, style'");
    }
}
