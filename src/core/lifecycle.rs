//! Command execution lifecycle
//!
//! One run goes `Created -> BuildingContext -> Validating -> Executing` and
//! ends in `Succeeded`, or in `Failed -> ErrorReported` as soon as any stage
//! leaves errors behind.

use crate::{
    config::Settings,
    core::{
        context::{CommandContext, ContextBuilder},
        tokenizer::Arguments,
        validation::{COMMAND_EXECUTION_KEY, ErrorDetailList, ErrorKind},
    },
    error::{ArgsError, Result},
};
use std::{
    any::Any,
    collections::HashSet,
    fmt,
    panic::{self, AssertUnwindSafe},
};
use tracing::{debug, instrument, warn};

/// Lifecycle states of one command run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Created,
    BuildingContext,
    Validating,
    Executing,
    Succeeded,
    Failed,
    ErrorReported,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// What a command receives besides its context
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    pub arguments: &'a Arguments,
    pub settings: &'a Settings,
}

impl<'a> Invocation<'a> {
    pub const fn new(arguments: &'a Arguments, settings: &'a Settings) -> Self {
        Self { arguments, settings }
    }
}

/// A command bound to a context type
pub trait Command {
    type Context: CommandContext;

    /// Cross-field checks, run only when binding produced no errors
    fn before_execute(
        &mut self,
        _context: &Self::Context,
        _unresolved: &HashSet<String>,
        _errors: &mut ErrorDetailList,
    ) {
    }

    /// The command's business logic
    fn execute(&mut self, context: &Self::Context, invocation: &Invocation<'_>) -> anyhow::Result<()>;

    /// Report collected errors.
    ///
    /// The default turns them into one [`ArgsError::Validation`]. Returning
    /// `Ok(())` marks the errors as handled.
    fn on_error(&mut self, errors: ErrorDetailList) -> Result<()> {
        Err(ArgsError::validation(errors))
    }
}

/// Object-safe entry point used by the dispatcher
pub trait Runnable {
    fn run(&mut self, invocation: &Invocation<'_>) -> Result<Stage>;
}

impl<C: Command> Runnable for C {
    fn run(&mut self, invocation: &Invocation<'_>) -> Result<Stage> {
        run_command(self, invocation)
    }
}

/// Drive one command through the lifecycle.
///
/// Returns the terminal stage: [`Stage::Succeeded`], or
/// [`Stage::ErrorReported`] when the command handled its errors itself.
/// Structural context failures and unhandled errors are returned as `Err`.
#[instrument(skip_all, fields(command = std::any::type_name::<C>()))]
pub fn run_command<C: Command>(command: &mut C, invocation: &Invocation<'_>) -> Result<Stage> {
    let mut stage = Stage::Created;
    let mut errors = ErrorDetailList::new();

    advance(&mut stage, Stage::BuildingContext);
    let built = ContextBuilder::new(invocation.settings)
        .build::<C::Context>(invocation.arguments, &mut errors)?;

    if !errors.has_errors() {
        advance(&mut stage, Stage::Validating);
        command.before_execute(&built.context, &built.unresolved, &mut errors);
    }

    if !errors.has_errors() {
        advance(&mut stage, Stage::Executing);
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            command.execute(&built.context, invocation)
        }));

        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(e)) => errors.add_error(
                ErrorKind::CommandExecutionFailure,
                COMMAND_EXECUTION_KEY,
                format!("{e:#}"),
            ),
            Err(payload) => errors.add_error(
                ErrorKind::CommandExecutionFailure,
                COMMAND_EXECUTION_KEY,
                panic_message(payload.as_ref()),
            ),
        }
    }

    if !errors.has_errors() {
        advance(&mut stage, Stage::Succeeded);
        return Ok(stage);
    }

    let failed_at = stage;
    advance(&mut stage, Stage::Failed);
    warn!("Command failed with {} error(s) at {}", errors.len(), failed_at);
    command.on_error(errors)?;
    advance(&mut stage, Stage::ErrorReported);
    Ok(stage)
}

fn advance(stage: &mut Stage, next: Stage) {
    debug!("{} -> {}", stage, next);
    *stage = next;
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "command panicked".to_string()
    }
}
