//! Wire grammar error types.

use thiserror::Error;

/// Errors raised while decoding the textual query grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A rule token or scalar parameter is malformed.
    #[error("parse error: {0}")]
    Parse(String),

    /// An operator symbol is not in the operator table (strict mode only).
    #[error("unsupported operator `{0}`")]
    UnsupportedOperator(String),
}

impl Error {
    pub(crate) fn parse(message: impl Into<String>) -> Self {
        Error::Parse(message.into())
    }
}
