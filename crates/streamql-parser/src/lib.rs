//! StreamQL Parser
//!
//! This crate turns continuous-query text such as
//! `select count(*), avg(Value) from MyEvent.time(10 sec) where Value > 97`
//! into a [`Statement`](streamql_core::Statement):
//!
//! - `lexer`: token classifier with whitespace- and identifier-filtered views
//! - `parser`: clause-anchored parser with schema-directed literal handling

pub mod error;
pub mod lexer;
pub mod parser;

pub use error::{ErrorCategory, ParseError, ParseResult};
pub use lexer::{tokenize, Lexer, SpannedToken, Token};
pub use parser::{parse, Parser};
