//! Command registry and dispatch
//!
//! Verbs map to factories; every resolve produces a brand-new command, so no
//! state is shared between invocations.

use crate::{
    config::Settings,
    core::{
        lifecycle::{Command, Invocation, Runnable, Stage, run_command},
        tokenizer::{Arguments, Tokenizer},
    },
    error::{ArgsError, Result},
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Creates a fresh command instance per call
pub type CommandFactory = Arc<dyn Fn() -> Box<dyn Runnable> + Send + Sync>;

/// Plain function bound to a verb; receives the raw arguments
pub type CommandFunction = Arc<dyn Fn(&Arguments) -> anyhow::Result<()> + Send + Sync>;

/// External discovery of commands, used when `auto_resolve_commands` is set
pub trait CommandResolver {
    /// All discovered `(verb, factory)` pairs
    fn command_factories(&self) -> Vec<(String, CommandFactory)>;
}

/// Registry of verbs and the entry point for dispatching a command line
pub struct Commander {
    settings: Settings,
    tokenizer: Tokenizer,
    commands: Vec<(String, CommandFactory)>,
    default_verb: Option<String>,
}

impl std::fmt::Debug for Commander {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Commander")
            .field("settings", &self.settings)
            .field("verbs", &self.verbs().collect::<Vec<_>>())
            .field("default_verb", &self.default_verb)
            .finish()
    }
}

impl Commander {
    /// Create an empty commander.
    ///
    /// Fails when `auto_resolve_commands` is set, since there is no resolver
    /// to ask; use [`Commander::with_resolver`] for that.
    pub fn new(settings: Settings) -> Result<Self> {
        if settings.auto_resolve_commands {
            return Err(ArgsError::config(
                "auto_resolve_commands is set but no command resolver was provided",
            ));
        }
        Self::empty(settings)
    }

    /// Create a commander and register everything the resolver discovers
    /// when `auto_resolve_commands` is set
    pub fn with_resolver(settings: Settings, resolver: &dyn CommandResolver) -> Result<Self> {
        let mut commander = Self::empty(settings)?;
        if !commander.settings.auto_resolve_commands {
            return Ok(commander);
        }

        let discovered = resolver.command_factories();
        if discovered.is_empty() {
            return Err(ArgsError::config(
                "auto_resolve_commands is set, however the command resolver did not find any command",
            ));
        }

        info!("Command resolver discovered {} command(s)", discovered.len());
        for (verb, factory) in discovered {
            commander.register_factory(&verb, factory)?;
        }
        Ok(commander)
    }

    fn empty(settings: Settings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            tokenizer: Tokenizer::new(&settings)?,
            settings,
            commands: Vec::new(),
            default_verb: None,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Register a command constructor for a verb, replacing any earlier one
    pub fn register<C, F>(&mut self, verb: &str, factory: F) -> Result<()>
    where
        C: Runnable + 'static,
        F: Fn() -> C + Send + Sync + 'static,
    {
        self.register_factory(verb, Arc::new(move || Box::new(factory()) as Box<dyn Runnable>))
    }

    /// Register a boxed factory for a verb, replacing any earlier one.
    /// A replaced verb keeps its original registration position.
    pub fn register_factory(&mut self, verb: &str, factory: CommandFactory) -> Result<()> {
        if verb.is_empty() {
            return Err(ArgsError::config("Cannot register a command for an empty verb"));
        }

        match self.position(verb) {
            Some(index) => {
                debug!("Replacing command for verb '{}'", verb);
                self.commands[index] = (verb.to_string(), factory);
            }
            None => {
                debug!("Registering command for verb '{}'", verb);
                self.commands.push((verb.to_string(), factory));
            }
        }
        Ok(())
    }

    /// Bind a plain function to a verb.
    ///
    /// Function commands have no declared options, so unknown options are
    /// not reported; the function reads the raw arguments itself.
    pub fn register_function<F>(&mut self, verb: &str, func: F) -> Result<()>
    where
        F: Fn(&Arguments) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let func: CommandFunction = Arc::new(func);
        self.register(verb, move || {
            LenientFunction(FunctionCommand {
                func: Arc::clone(&func),
            })
        })
    }

    /// Mark the command used when the command line carries no verb
    pub fn set_default_verb(&mut self, verb: &str) -> Result<()> {
        if verb.is_empty() {
            return Err(ArgsError::config("The default verb must not be empty"));
        }
        self.default_verb = Some(verb.to_string());
        Ok(())
    }

    /// Registered verbs in registration order
    pub fn verbs(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().map(|(verb, _)| verb.as_str())
    }

    /// Create a new instance of the command for `verb`.
    ///
    /// `None` selects the default verb if one was set, otherwise the first
    /// registered command.
    pub fn resolve(&self, verb: Option<&str>) -> Result<Box<dyn Runnable>> {
        self.ensure_commands()?;

        let verb = match (verb, self.default_verb.as_deref()) {
            (Some(verb), _) => verb,
            (None, Some(default)) => default,
            (None, None) => {
                let (first, factory) = &self.commands[0];
                warn!("No verb given and no default verb set; using first registered command '{}'", first);
                return Ok(factory());
            }
        };

        if verb.is_empty() {
            return Err(ArgsError::config("Cannot resolve a command for an empty verb"));
        }

        let index = self
            .position(verb)
            .ok_or_else(|| ArgsError::command_not_found(verb))?;
        debug!("Resolved verb '{}' to '{}'", verb, self.commands[index].0);
        Ok((self.commands[index].1)())
    }

    /// Tokenize a command line with this commander's settings
    pub fn parse<I, S>(&self, args: I) -> Arguments
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tokenizer.parse(args)
    }

    /// Parse the tokens after the program name, resolve the command for the
    /// verb path and run it through its lifecycle
    #[instrument(skip_all)]
    pub fn dispatch<I, S>(&self, args: I) -> Result<Stage>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ensure_commands()?;

        let arguments = self.parse(args);
        let verb_path = arguments.verb_path();
        info!("Dispatching verb {:?}", verb_path.as_deref().unwrap_or("<default>"));

        let mut command = self.resolve(verb_path.as_deref())?;
        command.run(&Invocation::new(&arguments, &self.settings))
    }

    fn ensure_commands(&self) -> Result<()> {
        if self.commands.is_empty() {
            return Err(ArgsError::config("No commands have been registered"));
        }
        Ok(())
    }

    fn position(&self, verb: &str) -> Option<usize> {
        self.commands
            .iter()
            .position(|(registered, _)| registered == verb)
            .or_else(|| {
                self.commands
                    .iter()
                    .position(|(registered, _)| self.settings.matches(registered, verb))
            })
    }
}

/// Wraps a registered function as a command without options
struct FunctionCommand {
    func: CommandFunction,
}

impl Command for FunctionCommand {
    type Context = ();

    fn execute(&mut self, _context: &(), invocation: &Invocation<'_>) -> anyhow::Result<()> {
        (self.func)(invocation.arguments)
    }
}

impl FunctionCommand {
    fn run_lenient(&mut self, invocation: &Invocation<'_>) -> Result<Stage> {
        let settings = Settings {
            ignore_unknown_tags: true,
            ..invocation.settings.clone()
        };
        run_command(self, &Invocation::new(invocation.arguments, &settings))
    }
}

/// Runs a function command with unknown options tolerated
struct LenientFunction(FunctionCommand);

impl Runnable for LenientFunction {
    fn run(&mut self, invocation: &Invocation<'_>) -> Result<Stage> {
        self.0.run_lenient(invocation)
    }
}
