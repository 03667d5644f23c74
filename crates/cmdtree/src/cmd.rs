//! Commands, command sets, and the recursive resolution of argv tokens.

use std::fmt;

use crate::arg::Argument;
use crate::args::ArgumentSet;
use crate::error::{ParseError, ParseResult};
use crate::help;

/// Reserved name of the auto-registered help command.
pub const HELP: &str = "help";
/// Reserved name of the root version command.
pub const VERSION: &str = "version";

/// Callback run once a command has been resolved.
pub type Exec = Box<dyn Fn(&Context<'_>) -> anyhow::Result<()>>;

/// Arguments visible to a command callback.
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    /// Application-level arguments given before the first command token.
    pub globals: &'a ArgumentSet,
    /// The resolved command's own arguments.
    pub args: &'a ArgumentSet,
}

/// What the caller should do with a resolved command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Run the command's callback.
    Execute,
    /// Show this help text.
    Help(String),
    /// Show this version text.
    Version(String),
}

impl Outcome {
    /// Text to show the user, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Execute => None,
            Self::Help(text) | Self::Version(text) => Some(text.as_str()),
        }
    }
}

/// The command a token list resolved to, and what to do with it.
#[derive(Debug)]
pub struct Resolution<'a> {
    command: &'a Command,
    outcome: Outcome,
}

impl<'a> Resolution<'a> {
    pub(crate) fn new(command: &'a Command, outcome: Outcome) -> Self {
        Self { command, outcome }
    }

    pub fn command(&self) -> &'a Command {
        self.command
    }

    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    pub fn into_outcome(self) -> Outcome {
        self.outcome
    }
}

/// A named node of the command tree.
///
/// Every command except `help` and `version` owns a `help` subcommand from
/// construction on.
pub struct Command {
    name: String,
    alias: String,
    description: String,
    default: bool,
    exec: Option<Exec>,
    args: ArgumentSet,
    commands: CommandSet,
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("alias", &self.alias)
            .field("description", &self.description)
            .field("default", &self.default)
            .field("exec", &self.exec.is_some())
            .field("args", &self.args)
            .field("commands", &self.commands)
            .finish()
    }
}

impl Command {
    pub fn new(name: impl Into<String>) -> ParseResult<Self> {
        CommandBuilder::new(name).build()
    }

    /// Start building a command named `name`.
    pub fn builder(name: impl Into<String>) -> CommandBuilder {
        CommandBuilder::new(name)
    }

    fn bare(name: String, description: String) -> Self {
        Self {
            name,
            alias: String::new(),
            description,
            default: false,
            exec: None,
            args: ArgumentSet::new(),
            commands: CommandSet::new(),
        }
    }

    /// Reserved command for the application root (`help`, `version`).
    pub(crate) fn reserved(name: &str, description: &str) -> Self {
        Self::bare(name.to_string(), description.to_string())
    }

    pub fn set_exec<F>(&mut self, exec: F)
    where
        F: Fn(&Context<'_>) -> anyhow::Result<()> + 'static,
    {
        self.exec = Some(Box::new(exec));
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn alias(&self) -> Option<&str> {
        Some(self.alias.as_str()).filter(|a| !a.is_empty())
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_default(&self) -> bool {
        self.default
    }

    /// Whether a callback is attached. Commands without one only route.
    pub fn is_executable(&self) -> bool {
        self.exec.is_some()
    }

    pub fn args(&self) -> &ArgumentSet {
        &self.args
    }

    pub fn args_mut(&mut self) -> &mut ArgumentSet {
        &mut self.args
    }

    pub fn commands(&self) -> &CommandSet {
        &self.commands
    }

    pub fn commands_mut(&mut self) -> &mut CommandSet {
        &mut self.commands
    }

    pub fn identifies(&self, identifier: &str) -> bool {
        self.name == identifier || self.alias() == Some(identifier)
    }

    /// Run the callback with this command's arguments and `globals`.
    pub fn execute(&self, globals: &ArgumentSet) -> anyhow::Result<()> {
        let Some(exec) = &self.exec else {
            anyhow::bail!("command '{}' has nothing to execute", self.name);
        };
        tracing::debug!(command = %self.name, "executing command");
        exec(&Context {
            globals,
            args: &self.args,
        })
    }

    /// Resolve `tokens` (the argv after this command's own token) to the
    /// command that should handle them.
    ///
    /// A leading subcommand token recurses into it; `help` renders help for
    /// this command instead. Anything else is parsed as this command's own
    /// arguments. With no tokens, a command without a callback falls back to
    /// its default subcommand, then to help.
    pub fn parse(&mut self, tokens: &[String]) -> ParseResult<Resolution<'_>> {
        if let Some(first) = tokens.first() {
            let rest = &tokens[1..];
            let Some(idx) = self.commands.position(first) else {
                // Not a subcommand: everything belongs to this command.
                self.args.parse(tokens)?;
                tracing::debug!(command = %self.name, "resolved command");
                return Ok(Resolution::new(self, Outcome::Execute));
            };

            if self.commands.at(idx).name == HELP {
                let text = help::command(self, rest)?;
                tracing::debug!(command = %self.name, "help requested");
                return Ok(Resolution::new(self, Outcome::Help(text)));
            }
            return self.commands.at_mut(idx).parse(rest);
        }

        if self.exec.is_some() {
            // Still parse so required arguments and defaults are handled.
            self.args.parse(&[])?;
            tracing::debug!(command = %self.name, "resolved command");
            return Ok(Resolution::new(self, Outcome::Execute));
        }

        if let Some(idx) = self.commands.default_position() {
            tracing::debug!(command = %self.name, "falling back to default subcommand");
            return self.commands.at_mut(idx).parse(&[]);
        }

        let text = help::command(self, &[])?;
        tracing::debug!(command = %self.name, "no callback or default, showing help");
        let target = match self.commands.get(HELP) {
            Some(node) => node,
            None => &*self,
        };
        Ok(Resolution::new(target, Outcome::Help(text)))
    }
}

/// Consuming builder for [`Command`].
pub struct CommandBuilder {
    name: String,
    alias: String,
    description: String,
    default: bool,
    exec: Option<Exec>,
    args: Vec<Argument>,
    commands: Vec<Command>,
}

impl CommandBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: String::new(),
            description: String::new(),
            default: false,
            exec: None,
            args: Vec::new(),
            commands: Vec::new(),
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = alias.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Mark as the fallback command of the set it is added to.
    pub fn default(mut self, default: bool) -> Self {
        self.default = default;
        self
    }

    pub fn exec<F>(mut self, exec: F) -> Self
    where
        F: Fn(&Context<'_>) -> anyhow::Result<()> + 'static,
    {
        self.exec = Some(Box::new(exec));
        self
    }

    pub fn arg(mut self, arg: Argument) -> Self {
        self.args.push(arg);
        self
    }

    pub fn subcommand(mut self, cmd: Command) -> Self {
        self.commands.push(cmd);
        self
    }

    /// Build the command, registering its `help` subcommand unless it is
    /// itself `help` or `version`.
    pub fn build(self) -> ParseResult<Command> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(ParseError::NameRequired);
        }

        let mut cmd = Command::bare(name, self.description.trim().to_string());
        cmd.alias = self.alias.trim().to_string();
        cmd.default = self.default;
        cmd.exec = self.exec;

        if cmd.name != HELP && cmd.name != VERSION {
            let description = format!("Display help for {}.", cmd.name);
            cmd.commands.add(Command::bare(HELP.to_string(), description));
        }
        for arg in self.args {
            cmd.args.add(arg);
        }
        for sub in self.commands {
            cmd.commands.add(sub);
        }
        Ok(cmd)
    }
}

/// Ordered set of commands, unique by name and alias, with at most one default.
#[derive(Debug, Default)]
pub struct CommandSet {
    commands: Vec<Command>,
}

impl CommandSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of `cmd` unless its name or alias is already taken.
    ///
    /// If the set already has a default command, `cmd` loses its default flag.
    pub fn add(&mut self, mut cmd: Command) {
        let name_taken = self.get(&cmd.name).is_some();
        let alias_taken = cmd
            .alias()
            .is_some_and(|alias| self.get(alias).is_some());
        if name_taken || alias_taken {
            tracing::debug!(command = %cmd.name, "ignoring duplicate command");
            return;
        }

        if cmd.default && self.default_command().is_some() {
            tracing::debug!(command = %cmd.name, "default command already set, clearing flag");
            cmd.default = false;
        }
        self.commands.push(cmd);
    }

    pub fn get(&self, identifier: &str) -> Option<&Command> {
        self.commands.iter().find(|c| c.identifies(identifier))
    }

    pub fn get_mut(&mut self, identifier: &str) -> Option<&mut Command> {
        self.commands.iter_mut().find(|c| c.identifies(identifier))
    }

    pub fn default_command(&self) -> Option<&Command> {
        self.commands.iter().find(|c| c.default)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub(crate) fn position(&self, identifier: &str) -> Option<usize> {
        self.commands.iter().position(|c| c.identifies(identifier))
    }

    pub(crate) fn default_position(&self) -> Option<usize> {
        self.commands.iter().position(|c| c.default)
    }

    pub(crate) fn at(&self, idx: usize) -> &Command {
        &self.commands[idx]
    }

    pub(crate) fn at_mut(&mut self, idx: usize) -> &mut Command {
        &mut self.commands[idx]
    }
}
