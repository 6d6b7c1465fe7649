//! Parser error types

use streamql_core::{FieldType, NumericKind, StatementError};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    #[error("Invalid token at position {position}: expected {expected}, found {found}")]
    UnexpectedToken {
        position: usize,
        expected: String,
        found: String,
    },

    #[error("Invalid token at position {position}: expected {expected}, found EOF")]
    UnexpectedEof { position: usize, expected: String },

    #[error("Filter groups nested deeper than {limit} at position {position}")]
    NestingTooDeep { position: usize, limit: usize },

    #[error("EventType [{name}] is not registered{hint}")]
    UnknownEventType { name: String, hint: String },

    #[error("Event type '{event_type}' has no field '{field}'{hint}")]
    UnknownField {
        event_type: String,
        field: String,
        hint: String,
    },

    #[error("Field '{field}' of type {ty} cannot be aggregated or compared")]
    UnsupportedField { field: String, ty: FieldType },

    #[error("Invalid {kind} literal '{literal}'")]
    InvalidNumber { literal: String, kind: NumericKind },

    #[error("Invalid duration: {magnitude} {unit} overflows")]
    DurationOverflow { magnitude: u64, unit: &'static str },

    #[error(transparent)]
    Incomplete(#[from] StatementError),
}

/// Broad failure classes a caller may want to react to differently
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Unexpected or missing token at a clause anchor
    Syntax,
    /// Event type or field not found in the registry
    UnresolvedReference,
    /// A digit run does not convert to the numeric kind the schema demands
    LiteralConversion,
}

impl ParseError {
    pub fn unexpected(position: usize, expected: impl Into<String>, found: impl Into<String>) -> Self {
        ParseError::UnexpectedToken {
            position,
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ParseError::UnexpectedToken { .. }
            | ParseError::UnexpectedEof { .. }
            | ParseError::NestingTooDeep { .. }
            | ParseError::Incomplete(_) => ErrorCategory::Syntax,
            ParseError::UnknownEventType { .. }
            | ParseError::UnknownField { .. }
            | ParseError::UnsupportedField { .. } => ErrorCategory::UnresolvedReference,
            ParseError::InvalidNumber { .. } | ParseError::DurationOverflow { .. } => {
                ErrorCategory::LiteralConversion
            }
        }
    }

    /// Byte offset into the query, for errors raised at a token.
    pub fn position(&self) -> Option<usize> {
        match self {
            ParseError::UnexpectedToken { position, .. }
            | ParseError::UnexpectedEof { position, .. }
            | ParseError::NestingTooDeep { position, .. } => Some(*position),
            _ => None,
        }
    }
}

pub type ParseResult<T> = Result<T, ParseError>;
