//! # StreamQL Core
//!
//! Data model shared by the StreamQL query compiler and the windowed
//! stream engine that consumes its output.
//!
//! ## Modules
//!
//! - [`schema`]: event types, declared field types and the field-kind lookup
//! - [`registry`]: name to event type mapping consulted while compiling
//! - [`expr`]: projections (`count(*)`, `avg(Value)`, ...) and filter predicates
//! - [`statement`]: windows, compiled statements and the statement builder
//! - [`span`]: byte ranges for diagnostics
//! - [`suggest`]: "did you mean" hints for unresolved names
//!
//! ## Quick Start
//!
//! ```rust
//! use streamql_core::{EventType, FieldKind, FieldType, Registry};
//!
//! let mut registry = Registry::new();
//! registry.register(
//!     EventType::new("LogEvent")
//!         .with_field("Level", FieldType::Int)
//!         .with_field("Latency", FieldType::Float),
//! );
//!
//! let log = registry.resolve("LogEvent").unwrap();
//! assert_eq!(log.field_kind("Latency"), Some(FieldKind::Float));
//! ```

pub mod expr;
pub mod registry;
pub mod schema;
pub mod span;
pub mod statement;
pub mod suggest;

pub use expr::{Aggregate, AggregateFunction, CompareOp, Comparison, Literal, Predicate, Projection};
pub use registry::Registry;
pub use schema::{EventType, Field, FieldKind, FieldType, NumericKind, SchemaError};
pub use span::Span;
pub use statement::{Statement, StatementBuilder, StatementError, Window, WindowKind};
