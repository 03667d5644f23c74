//! The application root: global arguments, reserved commands and dispatch.

use std::io::{self, Write};

use crate::arg::Argument;
use crate::args::ArgumentSet;
use crate::cmd::{Command, CommandSet, HELP, Outcome, Resolution, VERSION};
use crate::error::{ParseError, ParseResult};
use crate::help;
use crate::schema::AppSchema;

/// Root of a command tree.
///
/// The root command set always holds `help` and `version`; user commands with
/// either name are dropped when added.
#[derive(Debug)]
pub struct Application {
    name: String,
    description: String,
    version: String,
    commands: CommandSet,
    args: ArgumentSet,
}

impl Application {
    pub fn new(name: impl Into<String>) -> ParseResult<Self> {
        AppBuilder::new(name).build()
    }

    pub fn builder(name: impl Into<String>) -> AppBuilder {
        AppBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn commands(&self) -> &CommandSet {
        &self.commands
    }

    pub fn commands_mut(&mut self) -> &mut CommandSet {
        &mut self.commands
    }

    /// Global arguments, given before the first command token.
    pub fn args(&self) -> &ArgumentSet {
        &self.args
    }

    pub fn args_mut(&mut self) -> &mut ArgumentSet {
        &mut self.args
    }

    /// Resolve a full command line (program name first) to a command.
    pub fn parse(&mut self, argv: &[String]) -> ParseResult<Resolution<'_>> {
        dispatch(
            &self.name,
            &self.description,
            &self.version,
            &mut self.commands,
            &mut self.args,
            argv,
        )
    }

    /// [`Application::run_with`] against stdout.
    pub fn run(&mut self, argv: &[String]) -> anyhow::Result<()> {
        let stdout = io::stdout();
        self.run_with(argv, &mut stdout.lock())
    }

    /// Parse `argv`, then either write help/version text to `out` or run the
    /// resolved command's callback. A command without a callback writes its
    /// own help instead.
    pub fn run_with<W: Write>(&mut self, argv: &[String], out: &mut W) -> anyhow::Result<()> {
        let resolution = dispatch(
            &self.name,
            &self.description,
            &self.version,
            &mut self.commands,
            &mut self.args,
            argv,
        )?;
        let command = resolution.command();

        match resolution.into_outcome() {
            Outcome::Help(text) | Outcome::Version(text) => {
                writeln!(out, "{}", text.trim_end())?;
            }
            Outcome::Execute if command.is_executable() => {
                command.execute(&self.args)?;
            }
            Outcome::Execute => {
                let text = help::command(command, &[])?;
                writeln!(out, "{}", text.trim_end())?;
            }
        }
        Ok(())
    }

    /// Describe the tree, minus callbacks and auto-registered commands.
    pub fn schema(&self) -> AppSchema {
        AppSchema::from_app(self)
    }
}

/// Root dispatch over split borrows so the resolved command can outlive the
/// mutable borrow of the global arguments.
fn dispatch<'c>(
    name: &str,
    description: &str,
    version: &str,
    commands: &'c mut CommandSet,
    globals: &mut ArgumentSet,
    argv: &[String],
) -> ParseResult<Resolution<'c>> {
    let tokens = argv.get(1..).unwrap_or_default();
    let split = tokens
        .iter()
        .position(|t| !t.contains('='))
        .unwrap_or(tokens.len());
    let (global_tokens, tokens) = tokens.split_at(split);

    if global_tokens.is_empty() {
        globals.clear();
    } else {
        tracing::debug!(count = global_tokens.len(), "parsing global arguments");
        globals.parse(global_tokens)?;
    }

    let Some(first) = tokens.first() else {
        if let Some(idx) = commands.default_position() {
            tracing::debug!("no command given, using default");
            // Returned as is: its arguments are not parsed.
            commands.at_mut(idx).args_mut().clear();
            return Ok(Resolution::new(commands.at(idx), Outcome::Execute));
        }
        let text = help::render(name, description, commands, globals, &[])?;
        tracing::debug!("no command given, showing help");
        let node = commands
            .get(HELP)
            .ok_or_else(|| ParseError::UnexpectedCmd(HELP.to_string()))?;
        return Ok(Resolution::new(node, Outcome::Help(text)));
    };
    let rest = &tokens[1..];

    let Some(idx) = commands.position(first) else {
        return match commands.default_position() {
            Some(idx) => {
                tracing::debug!(token = %first, "unknown command, delegating to default");
                commands.at_mut(idx).parse(tokens)
            }
            None => Err(ParseError::UnexpectedCmd(first.to_string())),
        };
    };

    let is_help = commands.at(idx).name() == HELP;
    let is_version = commands.at(idx).name() == VERSION;
    if is_help {
        let text = help::render(name, description, commands, globals, rest)?;
        tracing::debug!("help requested");
        Ok(Resolution::new(commands.at(idx), Outcome::Help(text)))
    } else if is_version {
        tracing::debug!("version requested");
        let text = help::version(name, version);
        Ok(Resolution::new(commands.at(idx), Outcome::Version(text)))
    } else {
        commands.at_mut(idx).parse(rest)
    }
}

/// Consuming builder for [`Application`].
#[derive(Debug, Default)]
pub struct AppBuilder {
    name: String,
    description: String,
    version: String,
    args: Vec<Argument>,
    commands: Vec<Command>,
}

impl AppBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Display-only version string; blank renders as `undefined`.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Add a global argument.
    pub fn arg(mut self, arg: Argument) -> Self {
        self.args.push(arg);
        self
    }

    pub fn command(mut self, cmd: Command) -> Self {
        self.commands.push(cmd);
        self
    }

    pub fn build(self) -> ParseResult<Application> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(ParseError::NameRequired);
        }

        let mut commands = CommandSet::new();
        commands.add(Command::reserved(HELP, "Display help."));
        commands.add(Command::reserved(VERSION, "Display version."));
        for cmd in self.commands {
            commands.add(cmd);
        }

        let mut args = ArgumentSet::new();
        for arg in self.args {
            args.add(arg);
        }

        Ok(Application {
            name,
            description: self.description.trim().to_string(),
            version: self.version.trim().to_string(),
            commands,
            args,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::arg::ArgFields;
    use crate::cmd::Context;

    fn argv(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    fn noop(_: &Context<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    fn verbose() -> Argument {
        Argument::bool(ArgFields {
            alias: "v".to_string(),
            ..ArgFields::named("verbose")
        })
        .unwrap()
    }

    fn report() -> Command {
        Command::builder("report")
            .alias("r")
            .default(true)
            .arg(
                Argument::string(ArgFields {
                    required: true,
                    choices: ["Q1", "Q2", "Q3", "Q4"].map(String::from).to_vec(),
                    ..ArgFields::named("quarter")
                })
                .unwrap(),
            )
            .exec(noop)
            .build()
            .unwrap()
    }

    #[test]
    fn bare_app_resolves_to_help() {
        let mut app = Application::new("myApp").unwrap();
        let resolved = app.parse(&argv(&["myApp"])).unwrap();
        assert_eq!(resolved.command().name(), HELP);
        let Outcome::Help(text) = resolved.outcome() else {
            panic!("expected help, got {:?}", resolved.outcome());
        };
        assert!(text.starts_with("Name:    myApp\n"));
        assert!(text.contains("Display version."));
        assert!(!text.contains("Usage:"));
    }

    #[test]
    fn version_resolves_with_text() {
        let mut app = Application::new("myApp").unwrap();
        let resolved = app.parse(&argv(&["myApp", "version"])).unwrap();
        assert_eq!(resolved.command().name(), VERSION);
        assert_eq!(
            resolved.outcome(),
            &Outcome::Version("myApp version undefined".to_string())
        );

        let mut app = Application::builder("myApp")
            .version(" 1.2.3 ")
            .build()
            .unwrap();
        let resolved = app.parse(&argv(&["myApp", "version"])).unwrap();
        assert_eq!(resolved.outcome().message(), Some("myApp version 1.2.3"));
    }

    #[test]
    fn unknown_command_without_default_fails() {
        let mut app = Application::new("myApp").unwrap();
        assert_eq!(
            app.parse(&argv(&["myApp", "bogus"])).unwrap_err(),
            ParseError::UnexpectedCmd("bogus".to_string())
        );
    }

    #[test]
    fn empty_argv_shows_help() {
        let mut app = Application::new("myApp").unwrap();
        assert_eq!(app.parse(&[]).unwrap().command().name(), HELP);
    }

    #[test]
    fn help_token_describes_global_argument() {
        let mut app = Application::builder("myApp")
            .arg(verbose())
            .build()
            .unwrap();
        let resolved = app.parse(&argv(&["myApp", "help", "v"])).unwrap();
        assert_eq!(resolved.command().name(), HELP);
        assert!(resolved.outcome().message().unwrap().contains("Kind:           bool"));

        assert_eq!(
            app.parse(&argv(&["myApp", "help", "nope"])).unwrap_err(),
            ParseError::UnexpectedArg("nope".to_string())
        );
    }

    #[test]
    fn reserved_names_cannot_be_replaced() {
        let app = Application::builder("myApp")
            .command(
                Command::builder("help")
                    .description("Mine.")
                    .build()
                    .unwrap(),
            )
            .command(Command::new("version").unwrap())
            .build()
            .unwrap();
        assert_eq!(app.commands().len(), 2);
        assert_eq!(app.commands().get(HELP).unwrap().description(), "Display help.");
    }

    #[test]
    fn globals_are_consumed_before_the_command() {
        let mut app = Application::builder("myApp")
            .arg(verbose())
            .command(
                Command::builder("cmd1")
                    .exec(noop)
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap();

        let name = app
            .parse(&argv(&["myApp", "v=on", "cmd1"]))
            .unwrap()
            .command()
            .name()
            .to_string();
        assert_eq!(name, "cmd1");
        assert!(app.args().as_bool("verbose").unwrap());

        app.parse(&argv(&["myApp", "cmd1"])).unwrap();
        assert_eq!(
            app.args().as_bool("verbose"),
            Err(ParseError::ArgHasNoValues("verbose".to_string()))
        );

        assert_eq!(
            app.parse(&argv(&["myApp", "loud=1", "cmd1"])).unwrap_err(),
            ParseError::UnexpectedArg("loud".to_string())
        );
    }

    #[test]
    fn commands_resolve_by_alias() {
        let mut app = Application::builder("myApp")
            .command(report())
            .build()
            .unwrap();
        let resolved = app.parse(&argv(&["myApp", "r", "quarter=Q2"])).unwrap();
        assert_eq!(resolved.command().name(), "report");
        assert_eq!(resolved.command().args().as_string("quarter").unwrap(), "Q2");
    }

    #[test]
    fn no_tokens_returns_default_command_unparsed() {
        let mut app = Application::builder("myApp")
            .command(report())
            .build()
            .unwrap();
        app.parse(&argv(&["myApp", "report", "quarter=Q3"])).unwrap();

        let resolved = app.parse(&argv(&["myApp"])).unwrap();
        assert_eq!(resolved.command().name(), "report");
        assert_eq!(resolved.outcome(), &Outcome::Execute);
        assert!(resolved.command().args().get("quarter").unwrap().stored().is_empty());
    }

    #[test]
    fn no_tokens_returns_default_without_callback() {
        let mut app = Application::builder("myApp")
            .command(
                Command::builder("myCmd")
                    .default(true)
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap();
        let resolved = app.parse(&argv(&["myApp"])).unwrap();
        assert_eq!(resolved.command().name(), "myCmd");
        assert_eq!(resolved.outcome(), &Outcome::Execute);
    }

    #[test]
    fn unknown_token_goes_to_default_command() {
        let mut app = Application::builder("myApp")
            .command(report())
            .build()
            .unwrap();
        assert_eq!(
            app.parse(&argv(&["myApp", "Q1"])).unwrap_err(),
            ParseError::MissingArgValue("Q1".to_string())
        );
        assert_eq!(
            app.parse(&argv(&["myApp", "report", "quarter=Q5"])).unwrap_err(),
            ParseError::InvalidArgValue {
                name: "quarter".to_string(),
                value: "Q5".to_string(),
            }
        );
    }

    #[test]
    fn run_writes_version() {
        let mut app = Application::builder("myApp")
            .version("0.3.0")
            .build()
            .unwrap();
        let mut out = Vec::new();
        app.run_with(&argv(&["myApp", "version"]), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "myApp version 0.3.0\n");
    }

    #[test]
    fn run_calls_callback_with_globals_and_args() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let greet = Command::builder("greet")
            .arg(Argument::string(ArgFields::named("who")).unwrap())
            .exec(move |ctx| {
                let who = ctx.args.as_string("who")?.to_string();
                let loud = ctx.globals.as_bool("verbose")?;
                sink.borrow_mut().push((who, loud));
                Ok(())
            })
            .build()
            .unwrap();
        let mut app = Application::builder("myApp")
            .arg(verbose())
            .command(greet)
            .build()
            .unwrap();

        let mut out = Vec::<u8>::new();
        app.run_with(&argv(&["myApp", "verbose=yes", "greet", "who=world"]), &mut out)
            .unwrap();
        assert!(out.is_empty());
        assert_eq!(*seen.borrow(), vec![("world".to_string(), true)]);
    }

    #[test]
    fn run_surfaces_callback_errors() {
        let failing = Command::builder("fail")
            .exec(|_| Err(anyhow::anyhow!("boom")))
            .build()
            .unwrap();
        let mut app = Application::builder("myApp")
            .command(failing)
            .build()
            .unwrap();
        let err = app.run_with(&argv(&["myApp", "fail"]), &mut Vec::<u8>::new()).unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn run_prints_help_for_command_without_callback() {
        let router = Command::builder("team")
            .arg(Argument::string(ArgFields::named("name")).unwrap())
            .build()
            .unwrap();
        let mut app = Application::builder("myApp")
            .command(router)
            .build()
            .unwrap();

        let mut out = Vec::new();
        app.run_with(&argv(&["myApp", "team", "name=core"]), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Name:    team\n"));
        assert!(text.contains("team [name=string]"));
    }
}
