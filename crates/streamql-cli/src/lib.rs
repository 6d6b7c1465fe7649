//! StreamQL CLI library - testable functions and modules
//!
//! The binary in `main.rs` is a thin clap wrapper around these helpers.

pub mod config;

use std::fmt::Write as _;

use streamql_core::{Registry, Statement};
use streamql_parser::{tokenize, ErrorCategory, ParseError, Token};

/// 1-based line and column of a byte offset.
pub fn diagnostic_position(source: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(source.len());
    let before = source.get(..offset).unwrap_or(source);
    let line = before.matches('\n').count() + 1;
    let col = match before.rfind('\n') {
        Some(nl) => before[nl + 1..].chars().count() + 1,
        None => before.chars().count() + 1,
    };
    (line, col)
}

pub fn category_label(category: ErrorCategory) -> &'static str {
    match category {
        ErrorCategory::Syntax => "syntax error",
        ErrorCategory::UnresolvedReference => "unresolved reference",
        ErrorCategory::LiteralConversion => "literal conversion error",
    }
}

/// Render a parse failure with its location, when the error has one.
pub fn render_error(query: &str, error: &ParseError) -> String {
    let label = category_label(error.category());
    match error.position() {
        Some(offset) => {
            let (line, col) = diagnostic_position(query, offset);
            format!("{}:{}: {}: {}", line, col, label, error)
        }
        None => format!("{}: {}", label, error),
    }
}

/// Multi-line summary of a compiled statement.
pub fn summarize(statement: &Statement) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "   Event type:  {}", statement.event_type().name);
    let projections: Vec<String> = statement.projections().iter().map(|p| p.alias()).collect();
    let _ = writeln!(out, "   Projection:  {}", projections.join(", "));
    let _ = writeln!(out, "   Window:      {}", statement.window());
    match statement.filter() {
        Some(filter) => {
            let _ = writeln!(out, "   Filter:      {}", filter);
        }
        None => {
            let _ = writeln!(out, "   Filter:      (none)");
        }
    }
    out
}

/// One line per token: `offset  kind  literal`.
pub fn render_tokens(query: &str, include_whitespace: bool) -> String {
    let mut out = String::new();
    for tok in tokenize(query) {
        if tok.token == Token::Whitespace && !include_whitespace {
            continue;
        }
        let _ = writeln!(out, "{:>5}  {:<12} {:?}", tok.start, tok.token, tok.literal);
    }
    out
}

/// Registered event types and their fields, sorted by name.
pub fn render_schema(registry: &Registry) -> String {
    if registry.is_empty() {
        return "No event types registered\n".to_string();
    }
    let mut out = String::new();
    for name in registry.names() {
        let Some(event_type) = registry.resolve(name) else {
            continue;
        };
        let _ = writeln!(out, "{}", event_type.name);
        for field in &event_type.fields {
            let _ = writeln!(out, "   {}: {}", field.name, field.ty);
        }
    }
    out
}
