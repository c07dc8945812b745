//! Core error types.

use restq_proto::{FieldKind, Operator};
use thiserror::Error;

/// Errors raised while compiling or executing a query.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed request text.
    #[error("parse error: {0}")]
    Parse(String),

    /// Operator symbol outside the operator table.
    #[error("unsupported operator `{0}`")]
    UnsupportedOperator(String),

    /// A request references a field the schema does not have.
    #[error("entity `{entity}` has no field `{field}`")]
    FieldNotFound { entity: String, field: String },

    /// A literal cannot be read as the field's kind.
    #[error("literal `{literal}` is not a valid {kind} for field `{field}`")]
    LiteralTypeMismatch {
        field: String,
        kind: FieldKind,
        literal: String,
    },

    /// A comparison operator was used without a value segment.
    #[error("operator {operator} on field `{field}` requires a value")]
    MissingRequiredValue { field: String, operator: Operator },

    /// The backing collection failed.
    #[error("collection error: {0}")]
    Collection(String),

    /// Two fields with the same name were registered on one schema.
    #[error("field `{field}` is registered twice on entity `{entity}`")]
    DuplicateField { entity: String, field: String },

    /// No schema or endpoint is registered under this name.
    #[error("unknown entity `{0}`")]
    UnknownEntity(String),

    /// Response encoding failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<restq_proto::Error> for Error {
    fn from(error: restq_proto::Error) -> Self {
        match error {
            restq_proto::Error::Parse(message) => Error::Parse(message),
            restq_proto::Error::UnsupportedOperator(symbol) => Error::UnsupportedOperator(symbol),
        }
    }
}

impl Error {
    pub(crate) fn field_not_found(entity: &str, field: &str) -> Self {
        Error::FieldNotFound {
            entity: entity.to_string(),
            field: field.to_string(),
        }
    }

    /// Whether the error is caused by the request rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::Parse(_)
                | Error::UnsupportedOperator(_)
                | Error::FieldNotFound { .. }
                | Error::LiteralTypeMismatch { .. }
                | Error::MissingRequiredValue { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proto_errors_convert() {
        let error: Error = restq_proto::Error::UnsupportedOperator("$like".into()).into();
        assert!(matches!(error, Error::UnsupportedOperator(ref s) if s == "$like"));
        assert!(error.is_client_error());
    }

    #[test]
    fn test_messages() {
        let error = Error::LiteralTypeMismatch {
            field: "price".into(),
            kind: FieldKind::Number,
            literal: "abc".into(),
        };
        assert_eq!(
            error.to_string(),
            "literal `abc` is not a valid number for field `price`"
        );
        assert!(!Error::Collection("down".into()).is_client_error());
    }
}
