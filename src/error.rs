//! Error types for condition parsing

#[cfg(feature = "python")]
use pyo3::exceptions::PyValueError;
#[cfg(feature = "python")]
use pyo3::PyErr;
use thiserror::Error;

/// Every way a condition string can fail to parse.
///
/// Positions are byte offsets into the input text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("dangling boolean operator at byte {position}: missing right operand")]
    DanglingOperator { position: usize },

    #[error("boolean operator at byte {position} has no left operand")]
    MissingOperand { position: usize },

    #[error("unterminated quoted value starting at byte {position}")]
    UnterminatedQuote { position: usize },

    #[error("unbalanced parenthesis at byte {position}")]
    UnbalancedParenthesis { position: usize },

    #[error("unexpected token `{found}` at byte {position}")]
    UnexpectedToken { found: String, position: usize },

    #[error("unexpected character `{found}` at byte {position}")]
    UnexpectedCharacter { found: char, position: usize },

    #[error("operator `{operator}` at byte {position} is not supported by the {dialect} dialect")]
    UnsupportedOperator {
        operator: &'static str,
        dialect: &'static str,
        position: usize,
    },

    #[error("comparison at byte {position} has no key")]
    MissingKey { position: usize },

    #[error("bare key `{key}` at byte {position} is not supported by the {dialect} dialect")]
    BareKeyNotSupported {
        key: String,
        dialect: &'static str,
        position: usize,
    },

    #[error("expression nests deeper than {limit} levels at byte {position}")]
    NestingTooDeep { limit: usize, position: usize },

    #[error("empty expression")]
    EmptyExpression,

    #[error("condition text is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
}

#[cfg(feature = "python")]
impl From<ParseError> for PyErr {
    fn from(err: ParseError) -> PyErr {
        PyValueError::new_err(format!("Invalid condition: {}", err))
    }
}

/// Result type alias for condition parsing
pub type Result<T> = std::result::Result<T, ParseError>;
