//! Clause-anchored parser for StreamQL
//!
//! A query is resolved in four passes, each on a fresh [`Lexer`] over the
//! same text: event type (anchored at `from`), projection (everything
//! before `from`), window (after the first `.`) and filter (also after the
//! first `.`). Each pass skips tokens it does not care about until it
//! reaches its anchor, so the grammar needs no lookahead tables.
//!
//! Literal shape is not self-describing: `2.5` is a float only when the
//! compared field is declared `float`. For an `int` field the parser reads
//! `2` and leaves `.5` behind.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use streamql_core::suggest::did_you_mean;
use streamql_core::{
    Aggregate, CompareOp, Comparison, EventType, Field, Literal, NumericKind, Predicate,
    Projection, Registry, Statement, StatementBuilder, Window,
};
use tracing::{debug, trace};

use crate::error::{ParseError, ParseResult};
use crate::lexer::{Lexer, SpannedToken, Token};

/// Parse a query against the event types in `registry`.
pub fn parse(query: &str, registry: &Registry) -> ParseResult<Statement> {
    debug!(query, "parsing continuous query");

    expect_select(&mut Lexer::new(query))?;

    let event_type = parse_event_type(&mut Lexer::new(query), registry)?;
    let projections = parse_projection(&mut Lexer::new(query), &event_type)?;
    let window = parse_window(&mut Lexer::new(query))?;
    let filter = parse_filter(&mut Lexer::new(query), &event_type)?;

    let mut builder = StatementBuilder::new();
    builder
        .set_event_type(event_type)
        .extend_projections(projections)
        .set_window(window)
        .set_filter(filter);
    let statement = builder.build()?;

    debug!(
        event_type = %statement.event_type().name,
        projections = statement.projections().len(),
        window = %statement.window(),
        predicates = statement.predicates().len(),
        "parsed continuous query"
    );
    Ok(statement)
}

/// Query compiler bound to its own event type registry
#[derive(Debug, Clone, Default)]
pub struct Parser {
    registry: Registry,
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registry(registry: Registry) -> Self {
        Self { registry }
    }

    pub fn register(&mut self, event_type: EventType) -> Option<Arc<EventType>> {
        self.registry.register(event_type)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn parse(&self, query: &str) -> ParseResult<Statement> {
        parse(query, &self.registry)
    }
}

// ============================================================================
// Token helpers
// ============================================================================

fn unexpected(tok: &SpannedToken<'_>, expected: &str) -> ParseError {
    if tok.is_eof() {
        ParseError::UnexpectedEof {
            position: tok.start,
            expected: expected.to_string(),
        }
    } else {
        ParseError::unexpected(tok.start, expected, tok.describe())
    }
}

fn expect(lexer: &mut Lexer<'_>, token: Token, expected: &str) -> ParseResult<()> {
    let tok = lexer.next_ignoring_whitespace();
    if tok.token == token {
        Ok(())
    } else {
        Err(unexpected(&tok, expected))
    }
}

/// Discard tokens up to and including `anchor`.
fn skip_past(lexer: &mut Lexer<'_>, anchor: Token, expected: &str) -> ParseResult<()> {
    loop {
        let tok = lexer.next_token();
        if tok.token == anchor {
            return Ok(());
        }
        if tok.is_eof() {
            return Err(unexpected(&tok, expected));
        }
    }
}

fn expect_identifier<'s>(lexer: &mut Lexer<'s>, expected: &str) -> ParseResult<SpannedToken<'s>> {
    let tok = lexer.next_identifier();
    if tok.is_eof() {
        return Err(unexpected(&tok, expected));
    }
    Ok(tok)
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Fail when a name run is glued to the literal spanning `first..=last`
/// (`10abc`, `1e5`).
fn reject_adjacent(
    lexer: &mut Lexer<'_>,
    first: &SpannedToken<'_>,
    last: &SpannedToken<'_>,
    kind: NumericKind,
) -> ParseResult<()> {
    let next = lexer.peek();
    if next.token != Token::Identifier || next.start != last.end {
        return Ok(());
    }
    let span = first.span().merge(next.span());
    Err(ParseError::InvalidNumber {
        literal: span
            .slice(lexer.source())
            .unwrap_or(first.literal)
            .to_string(),
        kind,
    })
}

/// Read an integer token, rejecting trailing letters.
fn integer_literal<T: FromStr>(lexer: &mut Lexer<'_>, digits: &SpannedToken<'_>) -> ParseResult<T> {
    let value = parse_integer(digits.literal)?;
    reject_adjacent(lexer, digits, digits, NumericKind::Int)?;
    Ok(value)
}

fn parse_integer<T: FromStr>(literal: &str) -> ParseResult<T> {
    let invalid = || ParseError::InvalidNumber {
        literal: literal.to_string(),
        kind: NumericKind::Int,
    };
    if !is_digits(literal) {
        return Err(invalid());
    }
    literal.parse().map_err(|_| invalid())
}

/// Read a float whose integer part is `int_part`. The fraction is taken
/// only when a `.` immediately follows.
fn parse_float<'s>(lexer: &mut Lexer<'s>, int_part: &SpannedToken<'s>) -> ParseResult<f64> {
    let mut literal = int_part.literal.to_string();
    let mut valid = is_digits(int_part.literal);
    let mut last = *int_part;

    if lexer.peek().token == Token::Dot {
        lexer.next_token();
        let fraction = lexer.next_token();
        if fraction.token != Token::Identifier {
            return Err(unexpected(&fraction, "fractional digits"));
        }
        valid &= is_digits(fraction.literal);
        literal.push('.');
        literal.push_str(fraction.literal);
        last = fraction;
    }

    let invalid = || ParseError::InvalidNumber {
        literal: literal.clone(),
        kind: NumericKind::Float,
    };
    if !valid {
        return Err(invalid());
    }
    reject_adjacent(lexer, int_part, &last, NumericKind::Float)?;

    // Digit runs past f64 range parse to infinity
    match literal.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(invalid()),
    }
}

// ============================================================================
// Schema lookups
// ============================================================================

fn resolve_field<'e>(event_type: &'e EventType, name: &str) -> ParseResult<&'e Field> {
    event_type
        .field(name)
        .ok_or_else(|| ParseError::UnknownField {
            event_type: event_type.name.clone(),
            field: name.to_string(),
            hint: did_you_mean(name, event_type.field_names()),
        })
}

fn numeric_kind(field: &Field) -> ParseResult<NumericKind> {
    field
        .ty
        .kind()
        .numeric()
        .ok_or_else(|| ParseError::UnsupportedField {
            field: field.name.clone(),
            ty: field.ty,
        })
}

// ============================================================================
// Passes
// ============================================================================

fn expect_select(lexer: &mut Lexer<'_>) -> ParseResult<()> {
    expect(lexer, Token::Select, "select")
}

fn parse_event_type(lexer: &mut Lexer<'_>, registry: &Registry) -> ParseResult<Arc<EventType>> {
    trace!("resolving event type");
    skip_past(lexer, Token::From, "from")?;

    let mut resolved: Option<Arc<EventType>> = None;
    loop {
        let tok = lexer.next_token();
        match tok.token {
            Token::Identifier => {
                if resolved.is_some() {
                    return Err(unexpected(&tok, "'.'"));
                }
                let event_type =
                    registry
                        .resolve(tok.literal)
                        .ok_or_else(|| ParseError::UnknownEventType {
                            name: tok.literal.to_string(),
                            hint: did_you_mean(tok.literal, registry.names()),
                        })?;
                resolved = Some(event_type);
            }
            Token::Dot => return resolved.ok_or_else(|| unexpected(&tok, "event type name")),
            Token::Eof if resolved.is_some() => return Err(unexpected(&tok, "'.'")),
            Token::Eof => return Err(unexpected(&tok, "event type name")),
            _ => {}
        }
    }
}

/// `(field)` argument of an aggregate.
fn field_argument<'s>(lexer: &mut Lexer<'s>) -> ParseResult<SpannedToken<'s>> {
    expect(lexer, Token::LParen, "'('")?;
    let arg = lexer.next_ignoring_whitespace();
    if arg.token != Token::Identifier {
        return Err(unexpected(&arg, "field name"));
    }
    expect(lexer, Token::RParen, "')'")?;
    Ok(arg)
}

/// `(*)` or `(field)` argument of `count`; `None` for `*`.
fn count_argument<'s>(lexer: &mut Lexer<'s>) -> ParseResult<Option<SpannedToken<'s>>> {
    expect(lexer, Token::LParen, "'('")?;
    let arg = lexer.next_ignoring_whitespace();
    let field = match arg.token {
        Token::Star => None,
        Token::Identifier => Some(arg),
        _ => return Err(unexpected(&arg, "'*' or field name")),
    };
    expect(lexer, Token::RParen, "')'")?;
    Ok(field)
}

fn parse_projection(lexer: &mut Lexer<'_>, event_type: &EventType) -> ParseResult<Vec<Projection>> {
    trace!(event_type = %event_type.name, "resolving projection");

    let mut projections = Vec::new();
    loop {
        let tok = lexer.next_token();
        match tok.token {
            Token::From => return Ok(projections),
            Token::Eof => return Err(unexpected(&tok, "from")),
            Token::Star => projections.push(Projection::SelectAll),
            Token::Count => {
                if let Some(field) = count_argument(lexer)? {
                    resolve_field(event_type, field.literal)?;
                }
                projections.push(Projection::Count);
            }
            Token::Identifier => {
                let field = resolve_field(event_type, tok.literal)?;
                projections.push(Projection::field(field.name.clone()));
            }
            other => {
                if let Some(function) = other.aggregate_function() {
                    let arg = field_argument(lexer)?;
                    let field = resolve_field(event_type, arg.literal)?;
                    let kind = numeric_kind(field)?;
                    projections.push(Projection::Aggregate(Aggregate::new(
                        function,
                        field.name.clone(),
                        kind,
                    )));
                }
            }
        }
    }
}

fn parse_window(lexer: &mut Lexer<'_>) -> ParseResult<Window> {
    trace!("resolving window");
    skip_past(lexer, Token::Dot, "'.'")?;

    let tok = lexer.next_ignoring_whitespace();
    match tok.token {
        Token::Length => {
            let length = expect_identifier(lexer, "window length")?;
            Ok(Window::Length(integer_literal(lexer, &length)?))
        }
        Token::Time => {
            let magnitude = expect_identifier(lexer, "window duration")?;
            let magnitude: u64 = integer_literal(lexer, &magnitude)?;

            let unit = lexer.next_ignoring_whitespace();
            let seconds = match unit.token {
                Token::Sec => magnitude,
                Token::Min | Token::Minute => {
                    magnitude
                        .checked_mul(60)
                        .ok_or(ParseError::DurationOverflow {
                            magnitude,
                            unit: "min",
                        })?
                }
                _ => return Err(unexpected(&unit, "sec or min")),
            };
            Ok(Window::Time(Duration::from_secs(seconds)))
        }
        _ => Err(unexpected(&tok, "time or length")),
    }
}

fn parse_comparison(lexer: &mut Lexer<'_>, event_type: &EventType) -> ParseResult<Comparison> {
    let name = expect_identifier(lexer, "field name")?;
    let field = resolve_field(event_type, name.literal)?;
    let kind = numeric_kind(field)?;

    let op = lexer.next_non_identifier();
    let op = match op.token {
        Token::Gt => CompareOp::GreaterThan,
        Token::Lt => CompareOp::LessThan,
        _ => return Err(unexpected(&op, "'>' or '<'")),
    };

    let value = expect_identifier(lexer, "numeric literal")?;
    let value = match kind {
        NumericKind::Int => Literal::Int(integer_literal(lexer, &value)?),
        NumericKind::Float => Literal::Float(parse_float(lexer, &value)?),
    };

    Ok(Comparison::new(field.name.clone(), op, value))
}

/// Groups deeper than this are rejected before they can exhaust the stack.
const MAX_GROUP_DEPTH: usize = 64;

/// Skip to the next token the filter grammar acts on: a connective, a
/// grouping parenthesis, or end of input.
fn peek_structural<'s>(lexer: &mut Lexer<'s>) -> SpannedToken<'s> {
    loop {
        let tok = lexer.peek();
        if matches!(
            tok.token,
            Token::Where | Token::And | Token::Or | Token::LParen | Token::RParen | Token::Eof
        ) {
            return tok;
        }
        lexer.next_token();
    }
}

/// `conjunction (or conjunction)*`
fn parse_disjunction(
    lexer: &mut Lexer<'_>,
    event_type: &EventType,
    depth: usize,
) -> ParseResult<Predicate> {
    let mut lhs = parse_conjunction(lexer, event_type, depth)?;
    while peek_structural(lexer).token == Token::Or {
        lexer.next_token();
        let rhs = parse_conjunction(lexer, event_type, depth)?;
        lhs = lhs.or(rhs);
    }
    Ok(lhs)
}

/// `operand (and operand)*`
fn parse_conjunction(
    lexer: &mut Lexer<'_>,
    event_type: &EventType,
    depth: usize,
) -> ParseResult<Predicate> {
    let mut lhs = parse_operand(lexer, event_type, depth)?;
    while peek_structural(lexer).token == Token::And {
        lexer.next_token();
        let rhs = parse_operand(lexer, event_type, depth)?;
        lhs = lhs.and(rhs);
    }
    Ok(lhs)
}

/// A comparison or a parenthesised group.
fn parse_operand(
    lexer: &mut Lexer<'_>,
    event_type: &EventType,
    depth: usize,
) -> ParseResult<Predicate> {
    let tok = lexer.peek_ignoring_whitespace();
    match tok.token {
        Token::LParen => {
            if depth >= MAX_GROUP_DEPTH {
                return Err(ParseError::NestingTooDeep {
                    position: tok.start,
                    limit: MAX_GROUP_DEPTH,
                });
            }
            lexer.next_token();
            let inner = parse_disjunction(lexer, event_type, depth + 1)?;
            let close = peek_structural(lexer);
            if close.token != Token::RParen {
                return Err(unexpected(&close, "')'"));
            }
            lexer.next_token();
            Ok(inner)
        }
        Token::RParen | Token::Where | Token::And | Token::Or | Token::Eof => {
            Err(unexpected(&tok, "field name"))
        }
        _ => parse_comparison(lexer, event_type).map(Predicate::from),
    }
}

/// Filter pass. Everything between the window and `where` is skipped; after
/// it, comparisons are combined with `and` binding tighter than `or`, and
/// parentheses group.
fn parse_filter(lexer: &mut Lexer<'_>, event_type: &EventType) -> ParseResult<Option<Predicate>> {
    trace!("resolving filter");
    skip_past(lexer, Token::Dot, "'.'")?;

    loop {
        let tok = lexer.next_token();
        match tok.token {
            Token::Eof => return Ok(None),
            Token::Where => break,
            Token::And | Token::Or => return Err(unexpected(&tok, "where")),
            _ => {}
        }
    }

    let filter = parse_disjunction(lexer, event_type, 0)?;
    let rest = peek_structural(lexer);
    if !rest.is_eof() {
        return Err(unexpected(&rest, "and or or"));
    }
    Ok(Some(filter))
}

#[cfg(test)]
mod tests {
    use super::*;
    use streamql_core::{AggregateFunction, FieldType};

    fn registry() -> Registry {
        [
            EventType::new("LogEvent")
                .with_field("Level", FieldType::Int)
                .with_field("Latency", FieldType::Float)
                .with_field("Message", FieldType::Str),
            EventType::new("MyEvent").with_field("Value", FieldType::Int),
        ]
        .into_iter()
        .collect()
    }

    fn parse_ok(query: &str) -> Statement {
        parse(query, &registry()).unwrap_or_else(|e| panic!("{query}: {e}"))
    }

    #[test]
    fn test_event_type_pass_stops_at_dot() {
        let registry = registry();
        let mut lexer = Lexer::new("select * from LogEvent.length(5)");
        let event = parse_event_type(&mut lexer, &registry).unwrap();
        assert_eq!(event.name, "LogEvent");
        assert_eq!(lexer.next_token().token, Token::Length);
    }

    #[test]
    fn test_event_type_pass_rejects_two_names() {
        let err = parse(
            "select * from LogEvent MyEvent.length(5)",
            &registry(),
        )
        .unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { ref found, .. } if found == "'MyEvent'"));
    }

    #[test]
    fn test_projection_pass_typed_aggregates() {
        let statement = parse_ok("select max(Level), avg(Latency), med(Level) from LogEvent.length(10)");
        assert_eq!(
            statement.projections(),
            &[
                Projection::Aggregate(Aggregate::new(AggregateFunction::Max, "Level", NumericKind::Int)),
                Projection::Aggregate(Aggregate::new(
                    AggregateFunction::Average,
                    "Latency",
                    NumericKind::Float
                )),
                Projection::Aggregate(Aggregate::new(AggregateFunction::Median, "Level", NumericKind::Int)),
            ]
        );
    }

    #[test]
    fn test_count_does_not_add_select_all() {
        let statement = parse_ok("select count(*) from MyEvent.length(50)");
        assert_eq!(statement.projections(), &[Projection::Count]);
    }

    #[test]
    fn test_count_of_field() {
        let statement = parse_ok("select count(Value) from MyEvent.length(50)");
        assert_eq!(statement.projections(), &[Projection::Count]);
    }

    #[test]
    fn test_aggregate_over_unsupported_field_rejected() {
        let err = parse("select max(Message) from LogEvent.length(5)", &registry()).unwrap_err();
        assert_eq!(
            err,
            ParseError::UnsupportedField {
                field: "Message".to_string(),
                ty: FieldType::Str,
            }
        );
    }

    #[test]
    fn test_window_minutes() {
        let statement = parse_ok("select * from LogEvent.time(5 min)");
        assert_eq!(statement.window(), Window::Time(Duration::from_secs(300)));
        let statement = parse_ok("select * from LogEvent.time(2 minutes)");
        assert_eq!(statement.window(), Window::Time(Duration::from_secs(120)));
    }

    #[test]
    fn test_window_requires_unit() {
        let err = parse("select * from LogEvent.time(5)", &registry()).unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { ref expected, .. } if expected == "sec or min"));
    }

    #[test]
    fn test_window_duration_overflow() {
        let err = parse(
            "select * from LogEvent.time(18446744073709551615 min)",
            &registry(),
        )
        .unwrap_err();
        assert!(matches!(err, ParseError::DurationOverflow { .. }));
    }

    #[test]
    fn test_float_without_fraction() {
        let statement = parse_ok("select * from LogEvent.length(5) where Latency > 97 and Level < 3");
        let predicates = statement.predicates();
        assert_eq!(predicates[0].value, Literal::Float(97.0));
        assert_eq!(predicates[1].value, Literal::Int(3));
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        let statement = parse_ok(
            "select * from LogEvent.length(5) where Level > 1 or Level < 5 and Latency > 0.5",
        );
        let expected = Predicate::from(Comparison::greater_than("Level", Literal::Int(1))).or(
            Predicate::from(Comparison::less_than("Level", Literal::Int(5)))
                .and(Comparison::greater_than("Latency", Literal::Float(0.5)).into()),
        );
        assert_eq!(statement.filter(), Some(&expected));
    }

    #[test]
    fn test_connective_before_where_rejected() {
        let err = parse("select * from LogEvent.length(5) and Level > 1", &registry()).unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { ref expected, .. } if expected == "where"));
    }

    #[test]
    fn test_unknown_comparator_rejected() {
        let err = parse("select * from LogEvent.length(5) where Level = 1", &registry()).unwrap_err();
        // '=' is an identifier-class token, so the next operator found is EOF
        assert!(matches!(err, ParseError::UnexpectedEof { ref expected, .. } if expected == "'>' or '<'"));
    }

    #[test]
    fn test_filter_pass_without_where() {
        let event = registry().resolve("LogEvent").unwrap();
        let mut lexer = Lexer::new("select * from LogEvent.time(10 sec)");
        assert_eq!(parse_filter(&mut lexer, &event).unwrap(), None);
    }

    #[test]
    fn test_group_overrides_precedence() {
        let statement = parse_ok(
            "select * from LogEvent.length(5) where (Level > 1 or Level < 5) and Latency > 0.5",
        );
        assert!(matches!(statement.filter(), Some(Predicate::And(..))));
    }

    #[test]
    fn test_unbalanced_groups_rejected() {
        let err = parse("select * from LogEvent.length(5) where (Level > 1", &registry()).unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEof { ref expected, .. } if expected == "')'"));

        let err = parse("select * from LogEvent.length(5) where Level > 1)", &registry()).unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { ref found, .. } if found == "')'"));

        let err = parse("select * from LogEvent.length(5) where () ", &registry()).unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { ref expected, .. } if expected == "field name"));
    }

    #[test]
    fn test_group_depth_limit() {
        let nested = |depth: usize| {
            format!(
                "select * from LogEvent.length(5) where {}Level > 1{}",
                "(".repeat(depth),
                ")".repeat(depth)
            )
        };
        assert!(parse(&nested(MAX_GROUP_DEPTH), &registry()).is_ok());
        let err = parse(&nested(MAX_GROUP_DEPTH + 1), &registry()).unwrap_err();
        assert!(matches!(err, ParseError::NestingTooDeep { limit, .. } if limit == MAX_GROUP_DEPTH));
    }

    #[test]
    fn test_window_digits_with_trailing_letters_rejected() {
        let err = parse("select * from LogEvent.length(5x)", &registry()).unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidNumber {
                literal: "5x".to_string(),
                kind: NumericKind::Int,
            }
        );
    }

    #[test]
    fn test_parser_owns_registry() {
        let mut parser = Parser::new();
        parser.register(EventType::new("E").with_field("Value", FieldType::Int));
        let statement = parser.parse("select count(*) from E.length(1)").unwrap();
        assert_eq!(statement.event_type().name, "E");
        assert_eq!(parser.registry().len(), 1);
    }

    #[test]
    fn test_parser_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Parser>();
    }
}
