//! Serializable description of an application tree.
//!
//! Callbacks are not part of a schema; attach them after [`AppSchema::build`]
//! with [`CommandSet::get_mut`](crate::CommandSet::get_mut) and
//! [`Command::set_exec`].

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::app::Application;
use crate::arg::{ArgFields, Argument, Kind};
use crate::cmd::{Command, HELP, VERSION};
use crate::error::ParseResult;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ArgSchema {
    #[serde(default)]
    pub kind: Kind,
    #[serde(flatten)]
    pub fields: ArgFields,
}

impl ArgSchema {
    pub fn from_arg(arg: &Argument) -> Self {
        Self {
            kind: arg.kind(),
            fields: arg.fields().clone(),
        }
    }

    pub fn build(&self) -> ParseResult<Argument> {
        Argument::with_kind(self.kind, self.fields.clone())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CommandSchema {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub alias: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default)]
    pub default: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<ArgSchema>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<CommandSchema>,
}

impl CommandSchema {
    /// Describe `cmd` and its subcommands, leaving out the auto-registered
    /// `help` nodes.
    pub fn from_command(cmd: &Command) -> Self {
        Self {
            name: cmd.name().to_string(),
            alias: cmd.alias().unwrap_or_default().to_string(),
            description: cmd.description().to_string(),
            default: cmd.is_default(),
            args: cmd.args().iter().map(ArgSchema::from_arg).collect(),
            commands: cmd
                .commands()
                .iter()
                .filter(|c| c.name() != HELP)
                .map(Self::from_command)
                .collect(),
        }
    }

    pub fn build(&self) -> ParseResult<Command> {
        let mut builder = Command::builder(self.name.as_str())
            .alias(self.alias.as_str())
            .description(self.description.as_str())
            .default(self.default);
        for arg in &self.args {
            builder = builder.arg(arg.build()?);
        }
        for sub in &self.commands {
            builder = builder.subcommand(sub.build()?);
        }
        builder.build()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AppSchema {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<ArgSchema>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<CommandSchema>,
}

impl AppSchema {
    /// Describe `app`, leaving out the root `help` and `version` commands.
    pub fn from_app(app: &Application) -> Self {
        Self {
            name: app.name().to_string(),
            description: app.description().to_string(),
            version: app.version().to_string(),
            args: app.args().iter().map(ArgSchema::from_arg).collect(),
            commands: app
                .commands()
                .iter()
                .filter(|c| c.name() != HELP && c.name() != VERSION)
                .map(CommandSchema::from_command)
                .collect(),
        }
    }

    pub fn build(&self) -> ParseResult<Application> {
        let mut builder = Application::builder(self.name.as_str())
            .description(self.description.as_str())
            .version(self.version.as_str());
        for arg in &self.args {
            builder = builder.arg(arg.build()?);
        }
        for cmd in &self.commands {
            builder = builder.command(cmd.build()?);
        }
        builder.build()
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("failed to parse application schema JSON")
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize application schema")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseError;

    const REPORTS: &str = r#"{
        "name": "reports",
        "version": "2.0.0",
        "args": [{ "kind": "bool", "name": "verbose", "alias": "v" }],
        "commands": [
            {
                "name": "report",
                "alias": "r",
                "default": true,
                "args": [
                    {
                        "kind": "string",
                        "name": "quarter",
                        "required": true,
                        "choices": ["Q1", "Q2", "Q3", "Q4"]
                    },
                    { "kind": "int", "name": "employees", "multiple": true }
                ]
            },
            { "name": "team", "commands": [{ "name": "list" }] }
        ]
    }"#;

    #[test]
    fn json_builds_application() {
        let app = AppSchema::from_json(REPORTS).unwrap().build().unwrap();
        assert_eq!(app.name(), "reports");
        assert_eq!(app.version(), "2.0.0");
        assert_eq!(app.args().get("v").unwrap().kind(), Kind::Bool);

        let report = app.commands().get("r").unwrap();
        assert!(report.is_default());
        assert_eq!(report.args().get("employees").unwrap().separator(), ",");
        assert!(report.commands().get(HELP).is_some());

        let team = app.commands().get("team").unwrap();
        assert!(team.commands().get("list").unwrap().commands().get(HELP).is_some());
    }

    #[test]
    fn export_omits_auto_registered_commands() {
        let schema = AppSchema::from_json(REPORTS).unwrap();
        let exported = schema.build().unwrap().schema();
        let names: Vec<&str> = exported.commands.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["report", "team"]);
        assert!(exported.commands[1].commands[0].commands.is_empty());

        let quarter = &exported.commands[0].args[0];
        assert_eq!(quarter.kind, Kind::String);
        assert_eq!(quarter.fields.separator, ",");

        let rebuilt = AppSchema::from_json(&exported.to_json().unwrap()).unwrap();
        assert_eq!(rebuilt, exported);
    }

    #[test]
    fn invalid_default_fails_to_build() {
        let json = r#"{
            "name": "reports",
            "args": [{ "name": "level", "default": "loud", "choices": ["low", "high"] }]
        }"#;
        let schema = AppSchema::from_json(json).unwrap();
        assert_eq!(schema.args[0].kind, Kind::Undefined);
        assert_eq!(
            schema.build().unwrap_err(),
            ParseError::DefaultNotAValidChoice("level".to_string())
        );
    }

    #[test]
    fn malformed_json_has_context() {
        let err = AppSchema::from_json("{").unwrap_err();
        assert_eq!(err.to_string(), "failed to parse application schema JSON");
    }
}
