use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExpressError {
    /// The text could not be parsed. `fragment` is the offending substring and
    /// `offset` its byte position in the source text.
    #[error("{message} at {offset}: \"{fragment}\"")]
    Syntax {
        message: String,
        fragment: String,
        offset: usize,
    },

    #[error("\"{name}\" expects {expected} arguments, got {found}.")]
    Arity {
        name: String,
        expected: String,
        found: usize,
    },

    #[error("This expression does not contain \"{0}\" argument.")]
    UnknownArgument(String),

    #[error("Setting argument \"{name}\" to NaN is forbidden.")]
    InvalidValue { name: String },

    #[error("Expression is not compiled.")]
    NotCompiled,

    #[error("Compiled function expects {expected} arguments, got {found}.")]
    ArgumentCount { expected: usize, found: usize },
}

impl ExpressError {
    pub(crate) fn syntax(message: impl Into<String>, fragment: &str, offset: usize) -> Self {
        ExpressError::Syntax {
            message: message.into(),
            fragment: fragment.to_string(),
            offset,
        }
    }
}
