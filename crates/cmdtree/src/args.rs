//! Ordered, name/alias-keyed collection of [`Argument`]s and the
//! `name=value` parsing pipeline.

use indexmap::IndexMap;

use crate::arg::Argument;
use crate::error::{ParseError, ParseResult};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArgumentSet {
    args: IndexMap<String, Argument>,
}

impl ArgumentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `arg` unless its name or alias is already taken.
    ///
    /// Collisions are ignored rather than reported.
    pub fn add(&mut self, arg: Argument) {
        let name_taken = self.get(arg.name()).is_some();
        let alias_taken = arg.alias().is_some_and(|alias| self.get(alias).is_some());
        if name_taken || alias_taken {
            tracing::debug!(argument = arg.name(), "ignoring duplicate argument");
            return;
        }
        self.args.insert(arg.name().to_string(), arg);
    }

    /// Look up by name, then by alias.
    pub fn get(&self, identifier: &str) -> Option<&Argument> {
        self.args
            .get(identifier)
            .or_else(|| self.args.values().find(|a| a.identifies(identifier)))
    }

    pub fn get_mut(&mut self, identifier: &str) -> Option<&mut Argument> {
        if self.args.contains_key(identifier) {
            return self.args.get_mut(identifier);
        }
        self.args.values_mut().find(|a| a.identifies(identifier))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Argument> {
        self.args.values()
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Drop every stored value.
    pub fn clear(&mut self) {
        self.args.values_mut().for_each(Argument::clear);
    }

    /// Parse `identifier=value` tokens into the set.
    ///
    /// Order of checks:
    /// 1. more tokens than arguments => `UnexpectedArg(last token)`
    /// 2. each token is split, resolved, parsed and validated (fail-fast)
    /// 3. defaults fill arguments that received nothing
    /// 4. stored values (defaults included) must be valid choices
    /// 5. required arguments must hold at least one value
    ///
    /// Values from an earlier call are cleared first. A repeated identifier
    /// keeps only its last value.
    pub fn parse(&mut self, tokens: &[String]) -> ParseResult<()> {
        self.clear();

        if tokens.len() > self.args.len() {
            let last = tokens.last().cloned().unwrap_or_default();
            return Err(ParseError::UnexpectedArg(last));
        }

        for token in tokens {
            let (identifier, value) = split_token(token)?;
            tracing::trace!(identifier, value, "parsing argument token");

            let arg = self
                .get_mut(identifier)
                .ok_or_else(|| ParseError::UnexpectedArg(identifier.to_string()))?;
            arg.parse(value);
            arg.validate()?;
        }

        self.store_defaults();
        self.validate_choices()?;
        self.verify_required()
    }

    fn store_defaults(&mut self) {
        for arg in self.args.values_mut() {
            if !arg.stored().is_empty() {
                continue;
            }
            if let Some(default) = arg.default_value().map(str::to_string) {
                tracing::trace!(argument = arg.name(), default = %default, "applying default");
                arg.store(vec![default]);
            }
        }
    }

    fn validate_choices(&self) -> ParseResult<()> {
        for arg in self.args.values() {
            if arg.choices().is_empty() {
                continue;
            }
            if let Some(bad) = arg.stored().iter().find(|v| !arg.choices().contains(v)) {
                return Err(ParseError::invalid_value(arg.name(), bad));
            }
        }
        Ok(())
    }

    fn verify_required(&self) -> ParseResult<()> {
        match self
            .args
            .values()
            .find(|a| a.required() && a.stored().is_empty())
        {
            Some(arg) => Err(ParseError::MissingRequiredArg(arg.name().to_string())),
            None => Ok(()),
        }
    }

    fn lookup(&self, identifier: &str) -> ParseResult<&Argument> {
        self.get(identifier)
            .ok_or_else(|| ParseError::UnexpectedArg(identifier.to_string()))
    }

    pub fn as_bool(&self, identifier: &str) -> ParseResult<bool> {
        self.lookup(identifier)?.as_bool()
    }

    pub fn as_bools(&self, identifier: &str) -> ParseResult<Vec<bool>> {
        self.lookup(identifier)?.as_bools()
    }

    pub fn as_float(&self, identifier: &str) -> ParseResult<f64> {
        self.lookup(identifier)?.as_float()
    }

    pub fn as_floats(&self, identifier: &str) -> ParseResult<Vec<f64>> {
        self.lookup(identifier)?.as_floats()
    }

    pub fn as_int(&self, identifier: &str) -> ParseResult<i64> {
        self.lookup(identifier)?.as_int()
    }

    pub fn as_ints(&self, identifier: &str) -> ParseResult<Vec<i64>> {
        self.lookup(identifier)?.as_ints()
    }

    pub fn as_string(&self, identifier: &str) -> ParseResult<&str> {
        self.lookup(identifier)?.as_string()
    }

    pub fn as_strings(&self, identifier: &str) -> ParseResult<&[String]> {
        self.lookup(identifier)?.as_strings()
    }
}

/// Split `identifier=value`, requiring exactly one `=` and a non-empty value.
fn split_token(token: &str) -> ParseResult<(&str, &str)> {
    let Some((identifier, value)) = token.split_once('=') else {
        return Err(ParseError::MissingArgValue(token.trim().to_string()));
    };
    let identifier = identifier.trim();
    if value.contains('=') {
        return Err(ParseError::UnexpectedArgValue(identifier.to_string()));
    }
    let value = value.trim();
    if value.is_empty() {
        return Err(ParseError::MissingArgValue(identifier.to_string()));
    }
    Ok((identifier, value))
}
