//! Help and version text.
//!
//! Nothing here prints; callers get a `String` back and decide where it goes.

use crate::arg::Argument;
use crate::args::ArgumentSet;
use crate::cmd::{Command, CommandSet};
use crate::error::{ParseError, ParseResult};

const TABLE_PAD: usize = 4;
const DEFAULT_MARKER: &str = "*";

/// Left-aligned text table with a fixed column count.
struct Table<const N: usize> {
    rows: Vec<[String; N]>,
}

impl<const N: usize> Table<N> {
    fn new() -> Self {
        Self { rows: Vec::new() }
    }

    fn add(&mut self, row: [&str; N]) {
        self.rows.push(row.map(str::to_string));
    }

    fn render(&self) -> String {
        let mut widths = [0usize; N];
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let pad = " ".repeat(TABLE_PAD);
        self.rows
            .iter()
            .map(|row| {
                let cells: Vec<String> = row
                    .iter()
                    .zip(widths)
                    .map(|(cell, width)| format!("{cell:width$}"))
                    .collect();
                cells.join(pad.as_str()).trim_end().to_string()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Render help for a node of the tree.
///
/// With a leading token, only that argument is described; an unknown token is
/// an `UnexpectedArg` error. Otherwise the usage line, the argument table and
/// the command table are rendered.
pub fn render(
    name: &str,
    description: &str,
    commands: &CommandSet,
    args: &ArgumentSet,
    tokens: &[String],
) -> ParseResult<String> {
    let mut out = header(name, description);

    if let Some(token) = tokens.first() {
        let arg = args
            .get(token)
            .ok_or_else(|| ParseError::UnexpectedArg(token.to_string()))?;
        out.push_str(&usage(name, [arg]));
        out.push_str(&single_arg(arg));
        return Ok(out);
    }

    if !args.is_empty() {
        out.push_str(&usage(name, args.iter()));
        out.push_str(&all_args(name, args));
    }
    out.push_str(&command_table(commands));
    Ok(out)
}

/// Help for a single command, including its subcommands.
pub fn command(cmd: &Command, tokens: &[String]) -> ParseResult<String> {
    render(
        cmd.name(),
        cmd.description(),
        cmd.commands(),
        cmd.args(),
        tokens,
    )
}

/// `<name> version <version>`, with `undefined` standing in for a blank version.
pub fn version(name: &str, version: &str) -> String {
    let version = version.trim();
    let version = if version.is_empty() {
        "undefined"
    } else {
        version
    };
    format!("{name} version {version}")
}

fn header(name: &str, description: &str) -> String {
    let mut table = Table::<2>::new();
    table.add(["Name:", name]);
    if !description.is_empty() {
        table.add(["Description:", description]);
    }
    format!("{}\n\n", table.render())
}

fn usage<'a>(name: &str, args: impl IntoIterator<Item = &'a Argument>) -> String {
    let mut line = vec![name.to_string()];
    for arg in args {
        let fragment = format!("{}={}", arg.name(), arg.kind());
        if arg.required() {
            line.push(fragment);
        } else {
            line.push(format!("[{fragment}]"));
        }
    }
    format!("Usage:\n\n{}\n\n", line.join(" "))
}

fn single_arg(arg: &Argument) -> String {
    let multiple = arg.multiple().to_string();
    let required = arg.required().to_string();
    let kind = arg.kind().to_string();
    let choices = arg.choices().join(arg.separator());

    let mut table = Table::<2>::new();
    table.add(["Name:", arg.name()]);
    table.add(["Alias:", arg.alias().unwrap_or_default()]);
    table.add(["Description:", arg.description()]);
    table.add(["Kind:", kind.as_str()]);
    table.add(["Multiple:", multiple.as_str()]);
    table.add(["Required:", required.as_str()]);
    table.add(["Default:", arg.default_value().unwrap_or_default()]);
    table.add(["Choices:", choices.as_str()]);
    format!("{}\n\n", table.render())
}

fn all_args(name: &str, args: &ArgumentSet) -> String {
    let mut table = Table::<2>::new();
    table.add(["Name", "Description"]);
    table.add(["----", "-----------"]);
    for arg in args.iter() {
        table.add([arg.name(), arg.description()]);
    }
    format!(
        "Arguments:\n\n{}\n\n`{name} help arg` for more information.\n\n",
        table.render()
    )
}

fn command_table(commands: &CommandSet) -> String {
    let mut table = Table::<3>::new();
    table.add(["Name", "Alias", "Description"]);
    table.add(["----", "-----", "-----------"]);

    let mut has_default = false;
    for cmd in commands.iter() {
        let name = if cmd.is_default() {
            has_default = true;
            format!("{}{DEFAULT_MARKER}", cmd.name())
        } else {
            cmd.name().to_string()
        };
        table.add([name.as_str(), cmd.alias().unwrap_or_default(), cmd.description()]);
    }

    let mut out = format!("Commands:\n\n{}\n", table.render());
    if has_default {
        out.push_str(&format!("\n{DEFAULT_MARKER} indicates default command\n"));
    }
    out
}
