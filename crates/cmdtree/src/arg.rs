//! A single named, typed `name=value` slot.

use std::fmt;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::error::{ParseError, ParseResult};

/// Separator used to split multi-values when none is configured.
pub const SEPARATOR_DEFAULT: &str = ",";

const TRUTHY: [&str; 6] = ["true", "t", "yes", "y", "on", "1"];
const FALSEY: [&str; 6] = ["false", "f", "no", "n", "off", "0"];

fn is_truthy(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    TRUTHY.contains(&lower.as_str())
}

fn is_bool_literal(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    TRUTHY.contains(&lower.as_str()) || FALSEY.contains(&lower.as_str())
}

/// Parses as a finite `f64`, or is itself an infinity literal.
fn is_float_literal(value: &str) -> bool {
    match value.parse::<f64>() {
        Ok(parsed) if parsed.is_infinite() => {
            let unsigned = value.trim_start_matches(['+', '-']).to_ascii_lowercase();
            unsigned == "inf" || unsigned == "infinity"
        }
        Ok(_) => true,
        Err(_) => false,
    }
}

/// Value type an [`Argument`] validates and coerces its stored tokens into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Bool,
    Float,
    Int,
    String,
    #[default]
    Undefined,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Float => "float",
            Self::Int => "int",
            Self::String => "string",
            Self::Undefined => "undefined",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Construction-time configuration for an [`Argument`].
///
/// Every string is trimmed when the argument is built, and empty `choices`
/// entries are dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ArgFields {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub alias: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub separator: String,
    #[serde(default)]
    pub multiple: bool,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub default: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
}

impl ArgFields {
    /// Fields with only a name set.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    fn normalize(mut self) -> ParseResult<Self> {
        self.name = self.name.trim().to_string();
        if self.name.is_empty() {
            return Err(ParseError::NameRequired);
        }

        self.alias = self.alias.trim().to_string();
        self.description = self.description.trim().to_string();
        self.separator = self.separator.trim().to_string();
        self.default = self.default.trim().to_string();

        let choices: IndexSet<String> = self
            .choices
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect();
        self.choices = choices.into_iter().collect();

        if self.multiple || !self.choices.is_empty() {
            if self.separator.is_empty() {
                self.separator = SEPARATOR_DEFAULT.to_string();
            }
        } else {
            self.separator.clear();
        }

        if !self.default.is_empty()
            && !self.choices.is_empty()
            && !self.choices.contains(&self.default)
        {
            return Err(ParseError::DefaultNotAValidChoice(self.name));
        }

        Ok(self)
    }
}

/// A named slot holding the trimmed, non-empty tokens of its last parse.
///
/// Parsing and storage are shared by every kind; only [`Argument::validate`]
/// differs.
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    fields: ArgFields,
    kind: Kind,
    values: Vec<String>,
}

impl Argument {
    /// Untyped argument: accepts any value.
    pub fn new(fields: ArgFields) -> ParseResult<Self> {
        Self::with_kind(Kind::Undefined, fields)
    }

    pub fn bool(fields: ArgFields) -> ParseResult<Self> {
        Self::with_kind(Kind::Bool, fields)
    }

    pub fn float(fields: ArgFields) -> ParseResult<Self> {
        Self::with_kind(Kind::Float, fields)
    }

    pub fn int(fields: ArgFields) -> ParseResult<Self> {
        Self::with_kind(Kind::Int, fields)
    }

    pub fn string(fields: ArgFields) -> ParseResult<Self> {
        Self::with_kind(Kind::String, fields)
    }

    pub fn with_kind(kind: Kind, fields: ArgFields) -> ParseResult<Self> {
        Ok(Self {
            fields: fields.normalize()?,
            kind,
            values: Vec::new(),
        })
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.fields.name
    }

    pub fn alias(&self) -> Option<&str> {
        Some(self.fields.alias.as_str()).filter(|a| !a.is_empty())
    }

    pub fn description(&self) -> &str {
        &self.fields.description
    }

    /// Empty unless the argument is `multiple` or has choices.
    pub fn separator(&self) -> &str {
        &self.fields.separator
    }

    pub fn multiple(&self) -> bool {
        self.fields.multiple
    }

    pub fn required(&self) -> bool {
        self.fields.required
    }

    pub fn default_value(&self) -> Option<&str> {
        Some(self.fields.default.as_str()).filter(|d| !d.is_empty())
    }

    pub fn choices(&self) -> &[String] {
        &self.fields.choices
    }

    pub fn fields(&self) -> &ArgFields {
        &self.fields
    }

    /// Whether `identifier` is this argument's name or alias.
    pub fn identifies(&self, identifier: &str) -> bool {
        self.name() == identifier || self.alias() == Some(identifier)
    }

    /// Replace the stored values with the tokens found in `input`.
    ///
    /// `input` is split on the separator only when the argument is
    /// `multiple`. Tokens are trimmed and empty ones dropped.
    pub fn parse(&mut self, input: &str) {
        let tokens: Vec<&str> = if self.fields.multiple {
            input.split(self.fields.separator.as_str()).collect()
        } else {
            vec![input]
        };

        self.values = tokens
            .into_iter()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
    }

    /// Replace the stored values verbatim.
    pub fn store(&mut self, values: Vec<String>) {
        self.values = values;
    }

    pub fn stored(&self) -> &[String] {
        &self.values
    }

    pub(crate) fn clear(&mut self) {
        self.values.clear();
    }

    /// Check every stored value against the rules of this argument's kind.
    pub fn validate(&self) -> ParseResult<()> {
        let accepts: fn(&str) -> bool = match self.kind {
            Kind::Bool => is_bool_literal,
            Kind::Float => is_float_literal,
            Kind::Int => |v| v.parse::<i64>().is_ok(),
            Kind::String | Kind::Undefined => return Ok(()),
        };

        match self.values.iter().find(|v| !accepts(v)) {
            Some(bad) => Err(ParseError::invalid_value(self.name(), bad)),
            None => Ok(()),
        }
    }

    fn first(&self) -> ParseResult<&str> {
        self.values
            .first()
            .map(String::as_str)
            .ok_or_else(|| ParseError::ArgHasNoValues(self.name().to_string()))
    }

    fn all(&self) -> ParseResult<&[String]> {
        if self.values.is_empty() {
            return Err(ParseError::ArgHasNoValues(self.name().to_string()));
        }
        Ok(&self.values)
    }

    pub fn as_bool(&self) -> ParseResult<bool> {
        self.first().map(is_truthy)
    }

    pub fn as_bools(&self) -> ParseResult<Vec<bool>> {
        Ok(self.all()?.iter().map(|v| is_truthy(v)).collect())
    }

    pub fn as_float(&self) -> ParseResult<f64> {
        let value = self.first()?;
        value
            .parse()
            .map_err(|_| ParseError::invalid_value(self.name(), value))
    }

    /// All values as floats.
    ///
    /// Values are expected to have passed [`Argument::validate`] already; an
    /// unparseable value comes back as `0.0` rather than an error.
    pub fn as_floats(&self) -> ParseResult<Vec<f64>> {
        Ok(self
            .all()?
            .iter()
            .map(|v| v.parse().unwrap_or_default())
            .collect())
    }

    pub fn as_int(&self) -> ParseResult<i64> {
        let value = self.first()?;
        value
            .parse()
            .map_err(|_| ParseError::invalid_value(self.name(), value))
    }

    /// All values as integers. Same validation contract as [`Argument::as_floats`].
    pub fn as_ints(&self) -> ParseResult<Vec<i64>> {
        Ok(self
            .all()?
            .iter()
            .map(|v| v.parse().unwrap_or_default())
            .collect())
    }

    pub fn as_string(&self) -> ParseResult<&str> {
        self.first()
    }

    pub fn as_strings(&self) -> ParseResult<&[String]> {
        self.all()
    }
}
