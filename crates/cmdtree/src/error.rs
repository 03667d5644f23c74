use thiserror::Error;

/// Everything that can go wrong while building a tree or resolving argv.
///
/// Every variant is surfaced immediately; nothing inside the pipeline retries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Name is required.")]
    NameRequired,

    #[error("Default value is not a valid choice: {0}.")]
    DefaultNotAValidChoice(String),

    #[error("Missing argument value: {0}.")]
    MissingArgValue(String),

    #[error("Unexpected argument value: {0}.")]
    UnexpectedArgValue(String),

    #[error("Unexpected argument: {0}.")]
    UnexpectedArg(String),

    #[error("Invalid argument value: {name}={value}.")]
    InvalidArgValue { name: String, value: String },

    #[error("Required argument missing: {0}.")]
    MissingRequiredArg(String),

    #[error("Argument has no values: {0}.")]
    ArgHasNoValues(String),

    #[error("Unexpected command: {0}.")]
    UnexpectedCmd(String),
}

impl ParseError {
    pub(crate) fn invalid_value(name: &str, value: &str) -> Self {
        Self::InvalidArgValue {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

#[cfg(test)]
mod tests {
    use super::ParseError;

    #[test]
    fn messages_name_the_offender() {
        let err = ParseError::invalid_value("quarter", "Q5");
        assert_eq!(err.to_string(), "Invalid argument value: quarter=Q5.");
        assert_eq!(
            ParseError::UnexpectedCmd("bogus".to_string()).to_string(),
            "Unexpected command: bogus."
        );
        assert_eq!(ParseError::NameRequired.to_string(), "Name is required.");
    }
}
