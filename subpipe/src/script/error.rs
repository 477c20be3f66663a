//! Compilation errors

use thiserror::Error;

/// What went wrong while compiling a single line
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxErrorKind {
    #[error("line is neither an assignment nor a function call")]
    InvalidLine,
    #[error("assignment needs both a target and a source")]
    IncompleteAssignment,
    #[error("unterminated {quote} quote in '{text}'")]
    UnterminatedQuote { quote: char, text: String },
    #[error("unbalanced parentheses in '{0}'")]
    UnbalancedParens(String),
    #[error("invalid function name '{0}'")]
    InvalidFunctionName(String),
    #[error("unexpected text after closing parenthesis: '{0}'")]
    TrailingText(String),
    #[error("invalid named argument '{0}'")]
    InvalidNamedArgument(String),
    #[error("argument '{0}' cannot take a function call")]
    NestedCallNotAllowed(String),
    #[error("first positional argument must be '$', '$.<field>' or a call, got '{0}'")]
    InvalidFirstPositional(String),
    #[error("builtins take one positional argument, pass '{0}' as a named argument")]
    PositionalNotAllowed(String),
    #[error("calls nested deeper than {0} levels")]
    NestingTooDeep(usize),
    #[error("in nested call '{call}': {source}")]
    NestedCall {
        call: String,
        #[source]
        source: Box<SyntaxErrorKind>,
    },
}

/// A line that failed to compile
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line_number}: {kind} in `{line}`")]
pub struct SyntaxError {
    /// One-based line number within the script
    pub line_number: usize,
    /// The raw line as written
    pub line: String,
    pub kind: SyntaxErrorKind,
}

impl SyntaxError {
    pub fn new(line_number: usize, line: impl Into<String>, kind: SyntaxErrorKind) -> Self {
        SyntaxError {
            line_number,
            line: line.into(),
            kind,
        }
    }
}
