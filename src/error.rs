use thiserror::Error;

/// Structural failures raised while splitting or building argument literals.
///
/// Scalar coercion never fails on its own: anything that is not recognised
/// falls back to a bare string. Only malformed structure ends up here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unterminated {quote} quote starting at offset {offset}")]
    UnterminatedQuote { quote: char, offset: usize },

    #[error("unclosed '{bracket}' opened at offset {offset}")]
    UnclosedBracket { bracket: char, offset: usize },

    #[error("unexpected '{found}' at offset {offset}")]
    UnexpectedClosing { found: char, offset: usize },

    #[error("expected '{expected}' but found '{found}' at offset {offset}")]
    MismatchedBracket {
        expected: char,
        found: char,
        offset: usize,
    },

    #[error("unexpected characters after closing '{bracket}' in `{segment}`")]
    TrailingCharacters { bracket: char, segment: String },

    #[error("mapping entry `{entry}` is missing ':'")]
    MissingColon { entry: String },

    #[error("mapping entry `{entry}` has an empty key or value")]
    IncompleteEntry { entry: String },

    #[error("mapping entry `{entry}` has more than one top-level ':'")]
    AmbiguousColon { entry: String },

    #[error("a {kind} cannot be used as a {role}")]
    Unhashable { kind: &'static str, role: &'static str },

    #[error("nesting exceeds the maximum depth of {max_depth}")]
    DepthExceeded { max_depth: usize },

    #[error("invalid method call `{spec}`: {reason}")]
    InvalidCall { spec: String, reason: String },
}

impl ParseError {
    /// True for errors caused by quoting rather than bracket structure.
    pub fn is_quote_error(&self) -> bool {
        matches!(self, ParseError::UnterminatedQuote { .. })
    }
}

/// Failures surfaced by the [`Dispatcher`](crate::dispatch::Dispatcher).
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("no component registered with id '{id}'")]
    ComponentNotFound { id: String },

    #[error("component '{component}' has no method '{method}'")]
    MethodNotFound { component: String, method: String },

    #[error("invalid arguments for '{method}': {reason}")]
    InvalidArguments { method: String, reason: String },

    #[error("component '{id}' is unusable after a panic in an earlier call")]
    Poisoned { id: String },
}

pub type Result<T> = std::result::Result<T, ParseError>;
