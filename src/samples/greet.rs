//! `greet`: required name, defaults and a cross-field check

use crate::{
    core::{
        context::{CommandContext, ContextShape},
        descriptor::OptionDescriptor,
        lifecycle::{Command, Invocation},
        validation::ErrorDetailList,
    },
    samples::Output,
};
use std::{collections::HashSet, fmt, str::FromStr};

/// Shouting is capped at this many repetitions
pub const MAX_SHOUTS: u32 = 10;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    #[default]
    Plain,
    Shout,
}

impl FromStr for Style {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "plain" => Ok(Self::Plain),
            "shout" => Ok(Self::Shout),
            other => Err(format!("expected 'plain' or 'shout', got '{other}'")),
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain => f.write_str("plain"),
            Self::Shout => f.write_str("shout"),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GreetContext {
    pub name: String,
    pub greeting: String,
    pub times: u32,
    pub style: Style,
}

impl CommandContext for GreetContext {
    fn shape() -> ContextShape<Self> {
        ContextShape::new()
            .option(
                OptionDescriptor::new("name").tag("n").required().help("Who to greet"),
                |c: &mut Self, v| {
                    c.name = v.parse()?;
                    Ok(())
                },
            )
            .option(
                OptionDescriptor::new("greeting").tag("g").default_value("Hello"),
                |c, v| {
                    c.greeting = v.parse()?;
                    Ok(())
                },
            )
            .option(
                OptionDescriptor::new("times").tag("t").default_value(1).help("Repetitions"),
                |c, v| {
                    c.times = v.parse()?;
                    Ok(())
                },
            )
            .option(
                OptionDescriptor::new("style")
                    .default_value(Style::Plain)
                    .help("plain or shout"),
                |c, v| {
                    c.style = v.parse()?;
                    Ok(())
                },
            )
    }
}

pub struct GreetCommand {
    output: Output,
}

impl GreetCommand {
    pub const fn new(output: Output) -> Self {
        Self { output }
    }
}

impl Command for GreetCommand {
    type Context = GreetContext;

    fn before_execute(
        &mut self,
        context: &GreetContext,
        _unresolved: &HashSet<String>,
        errors: &mut ErrorDetailList,
    ) {
        if context.style == Style::Shout && context.times > MAX_SHOUTS {
            errors.add_validation(
                "times",
                format!("Cannot shout more than {MAX_SHOUTS} times, got {}", context.times),
            );
        }
    }

    fn execute(&mut self, context: &GreetContext, _invocation: &Invocation<'_>) -> anyhow::Result<()> {
        let name = context.name.trim();
        if name.is_empty() {
            anyhow::bail!("Cannot greet an empty name");
        }

        let line = format!("{}, {}!", context.greeting, name);
        let line = match context.style {
            Style::Plain => line,
            Style::Shout => line.to_uppercase(),
        };

        for _ in 0..context.times {
            self.output.line(line.clone());
        }
        Ok(())
    }
}
