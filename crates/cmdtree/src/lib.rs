//! Command trees with typed `name=value` arguments.
//!
//! An [`Application`] owns a tree of [`Command`]s. Each command owns an
//! [`ArgumentSet`] of typed [`Argument`]s and a [`CommandSet`] of subcommands.
//! Parsing a command line walks the tree to one command, fills its arguments
//! (defaults included), and validates kinds, choices and required arguments.
//!
//! # Example
//!
//! ```rust,no_run
//! use cmdtree::{ArgFields, Application, Argument, Command};
//!
//! fn main() -> anyhow::Result<()> {
//!     let report = Command::builder("report")
//!         .alias("r")
//!         .arg(Argument::int(ArgFields {
//!             required: true,
//!             ..ArgFields::named("employees")
//!         })?)
//!         .exec(|ctx| {
//!             println!("{} employees", ctx.args.as_int("employees")?);
//!             Ok(())
//!         })
//!         .build()?;
//!
//!     let mut app = Application::builder("reports")
//!         .version("1.0.0")
//!         .command(report)
//!         .build()?;
//!
//!     let argv: Vec<String> = std::env::args().collect();
//!     app.run(&argv)
//! }
//! ```

pub mod app;
pub mod arg;
pub mod args;
pub mod cmd;
pub mod error;
pub mod help;
pub mod schema;

pub use app::{AppBuilder, Application};
pub use arg::{ArgFields, Argument, Kind, SEPARATOR_DEFAULT};
pub use args::ArgumentSet;
pub use cmd::{
    Command, CommandBuilder, CommandSet, Context, Exec, HELP, Outcome, Resolution, VERSION,
};
pub use error::{ParseError, ParseResult};
pub use schema::{AppSchema, ArgSchema, CommandSchema};
