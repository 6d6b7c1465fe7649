//! Event type schemas
//!
//! An [`EventType`] is an ordered list of named, typed fields. The parser
//! never inspects event payloads; it only asks a schema what *kind* of
//! value a field holds so it can pick the integer or floating-point
//! variant of an aggregate or comparison.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Declared type of an event field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// 64-bit signed integer
    #[serde(alias = "integer")]
    Int,
    /// 64-bit floating point
    #[serde(alias = "double")]
    Float,
    /// Boolean
    Bool,
    /// UTF-8 string
    #[serde(alias = "string")]
    Str,
}

impl FieldType {
    pub fn kind(self) -> FieldKind {
        match self {
            FieldType::Int => FieldKind::Integer,
            FieldType::Float => FieldKind::Float,
            FieldType::Bool | FieldType::Str => FieldKind::Unsupported,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Int => write!(f, "int"),
            FieldType::Float => write!(f, "float"),
            FieldType::Bool => write!(f, "bool"),
            FieldType::Str => write!(f, "str"),
        }
    }
}

/// Numeric classification of a field, as seen by the query compiler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Integer,
    Float,
    /// Present on the schema but not usable in aggregates or comparisons
    Unsupported,
}

impl FieldKind {
    pub fn numeric(self) -> Option<NumericKind> {
        match self {
            FieldKind::Integer => Some(NumericKind::Int),
            FieldKind::Float => Some(NumericKind::Float),
            FieldKind::Unsupported => None,
        }
    }
}

/// Value domain of a typed expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumericKind {
    Int,
    Float,
}

impl fmt::Display for NumericKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericKind::Int => write!(f, "int"),
            NumericKind::Float => write!(f, "float"),
        }
    }
}

/// A named, typed field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: FieldType,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// A registered event type: the stream definition a query selects from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventType {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl EventType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Append a field, builder style.
    pub fn with_field(mut self, name: impl Into<String>, ty: FieldType) -> Self {
        self.fields.push(Field::new(name, ty));
        self
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Kind of the named field, or `None` if the schema has no such field.
    pub fn field_kind(&self, name: &str) -> Option<FieldKind> {
        self.field(name).map(|f| f.ty.kind())
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Reject schemas the compiler could not resolve deterministically.
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.name.trim().is_empty() {
            return Err(SchemaError::EmptyName);
        }
        for (i, field) in self.fields.iter().enumerate() {
            if field.name.trim().is_empty() {
                return Err(SchemaError::EmptyFieldName {
                    event_type: self.name.clone(),
                });
            }
            if self.fields[..i].iter().any(|f| f.name == field.name) {
                return Err(SchemaError::DuplicateField {
                    event_type: self.name.clone(),
                    field: field.name.clone(),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Event type name must not be empty")]
    EmptyName,

    #[error("Event type '{event_type}' has a field with an empty name")]
    EmptyFieldName { event_type: String },

    #[error("Event type '{event_type}' declares field '{field}' more than once")]
    DuplicateField { event_type: String, field: String },
}
