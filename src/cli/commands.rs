//! Sample command registration and dispatch for the CLI

use crate::{
    config::Settings,
    core::{commander::Commander, context::CommandContext, tokenizer::END_OF_OPTIONS},
    error::ArgsError,
    samples::{GreetCommand, GreetContext, Output, SumCommand, SumContext},
};
use anyhow::Context;
use tracing::{info, instrument};

/// Verb used when the command line names none
pub const DEFAULT_VERB: &str = "help";

/// Build a commander with every sample command registered
pub fn build_commander(settings: Settings, output: Output) -> Result<Commander, ArgsError> {
    let mut commander = Commander::new(settings)?;

    let sum_output = output.clone();
    commander.register("sum", move || SumCommand::new(sum_output.clone()))?;
    let sum_output = output.clone();
    commander.register("math.sum", move || SumCommand::new(sum_output.clone()))?;

    let greet_output = output.clone();
    commander.register("greet", move || GreetCommand::new(greet_output.clone()))?;

    let echo_output = output.clone();
    commander.register_function("echo", move |arguments| {
        echo_output.line(arguments.targets().join(" "));
        Ok(())
    })?;

    let settings = commander.settings().clone();
    let usage: Vec<(String, String)> = commander
        .verbs()
        .chain(std::iter::once(DEFAULT_VERB))
        .map(|verb| (verb.to_string(), usage_of(verb, &settings)))
        .collect();
    commander.register_function(DEFAULT_VERB, move |_| {
        output.line("Commands:");
        for (verb, options) in &usage {
            output.line(format!(" {verb}"));
            if !options.is_empty() {
                output.line(options.clone());
            }
        }
        Ok(())
    })?;

    commander.set_default_verb(DEFAULT_VERB)?;
    Ok(commander)
}

/// Option usage shown under a verb in the help output
fn usage_of(verb: &str, settings: &Settings) -> String {
    match verb {
        "sum" | "math.sum" => SumContext::shape().usage(settings),
        "greet" => GreetContext::shape().usage(settings),
        "echo" => format!("  {END_OF_OPTIONS} <targets...>"),
        _ => String::new(),
    }
}

/// Dispatch the raw command line to the matching sample command
#[instrument(skip(settings))]
pub fn execute_command(settings: &Settings, command_line: &[String]) -> anyhow::Result<()> {
    let commander =
        build_commander(settings.clone(), Output::stdout()).context("Failed to set up commands")?;

    let stage = commander.dispatch(command_line.iter().cloned())?;
    info!("Command finished: {}", stage);
    Ok(())
}
