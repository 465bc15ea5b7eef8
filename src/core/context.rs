//! Context building
//!
//! A context type declares its options once in a [`ContextShape`]: one
//! descriptor plus one setter per field. The [`ContextBuilder`] resolves the
//! raw options against that table and runs every setter, collecting all
//! conversion problems instead of stopping at the first.

use crate::{
    config::Settings,
    core::{
        descriptor::OptionDescriptor,
        resolver::OptionResolver,
        tokenizer::Arguments,
        validation::{ErrorDetailList, ErrorKind},
    },
    error::{ArgsError, Result},
};
use std::{
    collections::{HashMap, HashSet},
    fmt::Display,
    str::FromStr,
};
use tracing::{debug, instrument};

/// Converts one resolved value into a context field
pub type Setter<T> = Box<dyn Fn(&mut T, &OptionValue<'_>) -> std::result::Result<(), String> + Send + Sync>;

/// Parameter object populated from the command line
pub trait CommandContext: Default + 'static {
    /// The descriptor table for this type
    fn shape() -> ContextShape<Self>;
}

impl CommandContext for () {
    fn shape() -> ContextShape<Self> {
        ContextShape::new()
    }
}

/// Descriptor table of a context type
pub struct ContextShape<T> {
    descriptors: Vec<OptionDescriptor>,
    setters: Vec<Setter<T>>,
}

impl<T> Default for ContextShape<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ContextShape<T> {
    pub fn new() -> Self {
        Self {
            descriptors: Vec::new(),
            setters: Vec::new(),
        }
    }

    /// Declare a field: its descriptor and how to store a converted value
    #[must_use]
    pub fn option<F>(mut self, descriptor: OptionDescriptor, setter: F) -> Self
    where
        F: Fn(&mut T, &OptionValue<'_>) -> std::result::Result<(), String> + Send + Sync + 'static,
    {
        self.descriptors.push(descriptor);
        self.setters.push(Box::new(setter));
        self
    }

    pub fn descriptors(&self) -> &[OptionDescriptor] {
        &self.descriptors
    }

    /// Check the table itself; failures here are setup defects
    pub fn validate(&self, settings: &Settings) -> Result<()> {
        let key = |s: &str| {
            if settings.case_sensitive {
                s.to_string()
            } else {
                s.to_lowercase()
            }
        };
        let mut owners: HashMap<String, &str> = HashMap::new();

        for d in &self.descriptors {
            if d.name.trim().is_empty() {
                return Err(ArgsError::config("Option descriptor with an empty name"));
            }

            let mut own: HashSet<String> = HashSet::new();
            for tag in std::iter::once(&d.name).chain(d.tags.iter()) {
                if !own.insert(key(tag.as_str())) {
                    continue;
                }
                if let Some(owner) = owners.insert(key(tag.as_str()), d.name.as_str()) {
                    return Err(ArgsError::config(format!(
                        "Tag '{}' of option '{}' is already used by option '{}'",
                        tag, d.name, owner
                    )));
                }
            }
        }
        Ok(())
    }

    /// Usage lines for every declared option, spelled with the configured
    /// option prefixes
    pub fn usage(&self, settings: &Settings) -> String {
        self.descriptors
            .iter()
            .map(|d| format!("  {}", d.usage_line(&settings.option_prefixes)))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A resolved string value on its way into a typed field
#[derive(Debug, Clone, Copy)]
pub struct OptionValue<'a> {
    name: &'a str,
    raw: &'a str,
    delimiter: char,
}

impl<'a> OptionValue<'a> {
    pub const fn new(name: &'a str, raw: &'a str, delimiter: char) -> Self {
        Self { name, raw, delimiter }
    }

    pub const fn name(&self) -> &'a str {
        self.name
    }

    pub const fn as_str(&self) -> &'a str {
        self.raw
    }

    /// Parse with [`FromStr`]: integers, enums, paths, strings.
    ///
    /// The value is parsed as typed, so strings keep surrounding whitespace;
    /// only a value that fails that way is retried trimmed.
    pub fn parse<V>(&self) -> std::result::Result<V, String>
    where
        V: FromStr,
        V::Err: Display,
    {
        parse_item(self.name, self.raw).or_else(|e| {
            let trimmed = self.raw.trim();
            if trimmed.len() == self.raw.len() {
                Err(e)
            } else {
                parse_item(self.name, trimmed)
            }
        })
    }

    /// `true`/`false` in any case, otherwise an integer where non-zero is `true`
    pub fn flag(&self) -> std::result::Result<bool, String> {
        let raw = self.raw.trim();
        if raw.eq_ignore_ascii_case("true") {
            return Ok(true);
        }
        if raw.eq_ignore_ascii_case("false") {
            return Ok(false);
        }
        raw.parse::<i64>().map(|n| n != 0).map_err(|_| {
            format!(
                "Cannot parse the value '{}' for option '{}' into a boolean.",
                self.raw, self.name
            )
        })
    }

    /// Split on the multi-value delimiter and parse each item.
    /// An empty value is an empty list.
    pub fn list<V>(&self) -> std::result::Result<Vec<V>, String>
    where
        V: FromStr,
        V::Err: Display,
    {
        self.raw
            .split(self.delimiter)
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(|item| parse_item(self.name, item))
            .collect()
    }
}

fn parse_item<V>(name: &str, raw: &str) -> std::result::Result<V, String>
where
    V: FromStr,
    V::Err: Display,
{
    raw.parse::<V>().map_err(|e| {
        let type_name = std::any::type_name::<V>().rsplit("::").next().unwrap_or("value");
        format!("Cannot parse the value '{raw}' for option '{name}' into {type_name}: {e}")
    })
}

/// Output of a context build
#[derive(Debug)]
pub struct BuiltContext<T> {
    /// The populated context; partial when conversions failed
    pub context: T,
    /// Fields the caller did not supply explicitly
    pub unresolved: HashSet<String>,
}

/// Builds context objects from parsed arguments
#[derive(Debug, Clone, Copy)]
pub struct ContextBuilder<'s> {
    settings: &'s Settings,
}

impl<'s> ContextBuilder<'s> {
    pub const fn new(settings: &'s Settings) -> Self {
        Self { settings }
    }

    /// Build a context of type `T` from its declared shape
    pub fn build<T: CommandContext>(
        &self,
        arguments: &Arguments,
        errors: &mut ErrorDetailList,
    ) -> Result<BuiltContext<T>> {
        let shape = T::shape();
        self.build_with(&shape, arguments, errors)
    }

    /// Build a context against an explicit shape
    #[instrument(skip_all, fields(context = std::any::type_name::<T>()))]
    pub fn build_with<T: Default>(
        &self,
        shape: &ContextShape<T>,
        arguments: &Arguments,
        errors: &mut ErrorDetailList,
    ) -> Result<BuiltContext<T>> {
        shape.validate(self.settings)?;

        let resolved = OptionResolver::new(shape.descriptors()).resolve(arguments, errors, self.settings);
        let mut context = T::default();
        let mut unresolved = HashSet::new();

        for (descriptor, setter) in shape.descriptors.iter().zip(&shape.setters) {
            let Some(option) = resolved.iter().find(|o| o.name == descriptor.name) else {
                // required and missing; already reported by the resolver
                unresolved.insert(descriptor.name.clone());
                continue;
            };

            if !option.is_resolved {
                unresolved.insert(descriptor.name.clone());
                if descriptor.default.is_none() {
                    continue;
                }
            }

            let value = OptionValue::new(&option.name, &option.value, self.settings.multi_value_delimiter);
            if let Err(message) = setter(&mut context, &value) {
                debug!("Conversion of '{}' failed: {}", option.name, message);
                errors.add_error(ErrorKind::ValueConversionFailure, &option.name, message);
            }
        }

        Ok(BuiltContext { context, unresolved })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tokenizer::Tokenizer;

    #[derive(Debug, Default, PartialEq)]
    struct Job {
        name: String,
        retries: u32,
        verbose: bool,
        tags: Vec<String>,
        level: Level,
    }

    #[derive(Debug, Default, PartialEq, Clone, Copy)]
    enum Level {
        #[default]
        Low,
        High,
    }

    impl FromStr for Level {
        type Err = String;

        fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
            match s.to_lowercase().as_str() {
                "low" => Ok(Self::Low),
                "high" => Ok(Self::High),
                other => Err(format!("expected low or high, got '{other}'")),
            }
        }
    }

    impl CommandContext for Job {
        fn shape() -> ContextShape<Self> {
            ContextShape::new()
                .option(OptionDescriptor::new("name").required(), |c: &mut Self, v| {
                    c.name = v.parse()?;
                    Ok(())
                })
                .option(OptionDescriptor::new("retries").tag("r").default_value(3), |c, v| {
                    c.retries = v.parse()?;
                    Ok(())
                })
                .option(OptionDescriptor::new("verbose"), |c, v| {
                    c.verbose = v.flag()?;
                    Ok(())
                })
                .option(OptionDescriptor::new("tags").multi_value(), |c, v| {
                    c.tags = v.list()?;
                    Ok(())
                })
                .option(OptionDescriptor::new("level"), |c, v| {
                    c.level = v.parse()?;
                    Ok(())
                })
        }
    }

    fn build(line: &str) -> (Result<BuiltContext<Job>>, ErrorDetailList) {
        let settings = Settings::default();
        let arguments = Tokenizer::new(&settings).unwrap().parse(line.split_whitespace());
        let mut errors = ErrorDetailList::new();
        let built = ContextBuilder::new(&settings).build::<Job>(&arguments, &mut errors);
        (built, errors)
    }

    #[test]
    fn test_build_populates_typed_fields() {
        let (built, errors) = build("job --name=nightly -r 5 --verbose --tags=a,b --tags c --level=HIGH");
        assert!(!errors.has_errors(), "{errors}");

        let built = built.unwrap();
        assert_eq!(
            built.context,
            Job {
                name: "nightly".to_string(),
                retries: 5,
                verbose: true,
                tags: vec!["a".to_string(), "b".to_string(), "c".to_string()],
                level: Level::High,
            }
        );
        assert!(built.unresolved.is_empty());
    }

    #[test]
    fn test_defaults_and_unresolved_fields() {
        let (built, errors) = build("job --name=x");
        assert!(!errors.has_errors());

        let built = built.unwrap();
        assert_eq!(built.context.retries, 3);
        assert!(!built.context.verbose);
        assert!(built.context.tags.is_empty());
        let mut unresolved: Vec<_> = built.unresolved.into_iter().collect();
        unresolved.sort();
        assert_eq!(unresolved, vec!["level", "retries", "tags", "verbose"]);
    }

    #[test]
    fn test_every_conversion_failure_is_reported() {
        let (built, errors) = build("job --name=x --retries=many --verbose=maybe --level=mid");
        assert!(built.is_ok());
        let failed: Vec<_> = errors
            .of_kind(ErrorKind::ValueConversionFailure)
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(failed, vec!["retries", "verbose", "level"]);
    }

    #[test]
    fn test_missing_required_field_is_unresolved() {
        let (built, errors) = build("job");
        assert_eq!(errors.of_kind(ErrorKind::MissingMandatoryOption).count(), 1);
        assert!(built.unwrap().unresolved.contains("name"));
    }

    #[test]
    fn test_flag_accepts_integers() {
        let value = OptionValue::new("x", "0", ',');
        assert_eq!(value.flag(), Ok(false));
        let value = OptionValue::new("x", "12", ',');
        assert_eq!(value.flag(), Ok(true));
        let value = OptionValue::new("x", "FALSE", ',');
        assert_eq!(value.flag(), Ok(false));
    }

    #[test]
    fn test_list_of_empty_value_is_empty() {
        let value = OptionValue::new("values", "", ',');
        assert_eq!(value.list::<i32>(), Ok(Vec::new()));
    }

    #[test]
    fn test_duplicate_names_are_structural_errors() {
        let shape: ContextShape<Job> = ContextShape::new()
            .option(OptionDescriptor::new("a"), |_, _| Ok(()))
            .option(OptionDescriptor::new("b").tag("a"), |_, _| Ok(()));

        let settings = Settings::default();
        let mut errors = ErrorDetailList::new();
        let result = ContextBuilder::new(&settings).build_with(&shape, &Arguments::default(), &mut errors);
        assert!(matches!(result, Err(ArgsError::Config { .. })));
    }

    #[test]
    fn test_required_with_default_is_accepted() {
        let shape: ContextShape<Job> = ContextShape::new()
            .option(OptionDescriptor::new("a").required().default_value("x"), |_, _| Ok(()));
        assert!(shape.validate(&Settings::default()).is_ok());
    }

    #[test]
    fn test_string_values_keep_whitespace() {
        let settings = Settings::default();
        let arguments = Tokenizer::new(&settings).unwrap().parse(["job", "--name=  a b  ", "-r", " 7 "]);
        let mut errors = ErrorDetailList::new();
        let built = ContextBuilder::new(&settings).build::<Job>(&arguments, &mut errors).unwrap();

        assert!(!errors.has_errors(), "{errors}");
        assert_eq!(built.context.name, "  a b  ");
        assert_eq!(built.context.retries, 7);
    }

    #[test]
    fn test_parse_error_names_the_raw_value() {
        let value = OptionValue::new("retries", " x ", ',');
        let err = value.parse::<u32>().unwrap_err();
        assert!(err.contains("'x'"), "{err}");
        assert!(err.contains("retries"), "{err}");
    }

    #[test]
    fn test_usage_follows_configured_prefixes() {
        let settings = Settings {
            option_prefixes: vec!["/".to_string()],
            ..Settings::default()
        };
        let usage = Job::shape().usage(&settings);
        assert!(usage.contains("/retries, /r  (default: 3)"), "{usage}");
        assert!(Job::shape().usage(&Settings::default()).contains("--retries, -r  (default: 3)"));
    }

    #[test]
    fn test_case_insensitive_collisions() {
        let shape: ContextShape<Job> = ContextShape::new()
            .option(OptionDescriptor::new("name"), |_, _| Ok(()))
            .option(OptionDescriptor::new("Name"), |_, _| Ok(()));

        assert!(shape.validate(&Settings::default()).is_ok());
        let settings = Settings {
            case_sensitive: false,
            ..Settings::default()
        };
        assert!(shape.validate(&settings).is_err());
    }
}
