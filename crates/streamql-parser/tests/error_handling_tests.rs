//! Tests for parser error handling

use streamql_core::{EventType, FieldType, Registry, StatementError};
use streamql_parser::{parse, ErrorCategory, ParseError};

fn registry() -> Registry {
    [EventType::new("LogEvent")
        .with_field("Level", FieldType::Int)
        .with_field("Latency", FieldType::Float)]
    .into_iter()
    .collect()
}

#[test]
fn test_invalid_syntax_returns_error_not_panic() {
    let invalid_inputs = [
        "select",                                  // keyword only
        "select * from",                           // no event type
        "select * from LogEvent.",                 // no window
        "select * from LogEvent.time(",            // unclosed window
        "select * from LogEvent.time(10",          // no unit
        "select * from LogEvent.length(5) where",  // dangling where
        "select * from LogEvent.length(5) where Level", // no comparator
        "select count( from LogEvent.length(5)",   // broken count argument
    ];

    let registry = registry();
    for input in &invalid_inputs {
        let result = parse(input, &registry);
        assert!(
            result.is_err(),
            "Should return error for invalid input: {:?}",
            input
        );
    }
}

#[test]
fn test_eof_errors_name_what_was_expected() {
    let err = parse("select * from LogEvent.time(10", &registry()).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("expected sec or min"), "{}", msg);
    assert!(msg.contains("found EOF"), "{}", msg);
    assert_eq!(err.position(), Some(30));
}

#[test]
fn test_unexpected_token_carries_literal_and_position() {
    let query = "select * from LogEvent.length(5) where Level ! 3";
    let err = parse(query, &registry()).unwrap_err();
    match err {
        ParseError::UnexpectedEof { position, .. } => assert_eq!(position, query.len()),
        other => panic!("unexpected error: {other}"),
    }

    let query = "select * from LogEvent.length(5) where Level > 3 where Level < 5";
    let err = parse(query, &registry()).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Syntax);
    assert_eq!(err.position(), query.rfind("where"));
    assert!(err.to_string().contains("'where'"));
}

#[test]
fn test_first_failure_aborts_parse() {
    // Both the event type and the literal are bad; the event type pass runs first.
    let err = parse("select * from Missing.length(x)", &registry()).unwrap_err();
    assert!(matches!(err, ParseError::UnknownEventType { .. }));
}

#[test]
fn test_empty_registry() {
    let err = parse("select * from LogEvent.length(5)", &Registry::new()).unwrap_err();
    assert_eq!(err.to_string(), "EventType [LogEvent] is not registered");
}

#[test]
fn test_fuzz_input_no_panic() {
    let fuzz_inputs = [
        "",
        "   ",
        "123456",
        "!@#$%^&*()",
        "select",
        "from",
        "where where where",
        "...",
        "select . . . . .",
        "> < > <",
        "((((()))))",
        "select * from LogEvent.time(99999999999999999999999 sec)",
        "select * from LogEvent.length(5) where Latency > 1.",
        "select * from LogEvent.length(5) where Latency > 1.x",
        "\0\0\0",
        "select\nselect\nselect",
    ];

    let registry = registry();
    for input in &fuzz_inputs {
        let result = std::panic::catch_unwind(|| parse(input, &registry));
        assert!(result.is_ok(), "Parser panicked on input: {:?}", input);
        assert!(result.unwrap().is_err(), "Expected error for {:?}", input);
    }
}

#[test]
fn test_unicode_input_no_panic() {
    let unicode_inputs = [
        "select * from 日本語.length(5)",
        "select * from LogEvent.length(5) where Level > ５",
        "select 🚀 from LogEvent.length(5)",
        "sélect * from LogEvent.length(5)",
    ];

    let registry = registry();
    for input in &unicode_inputs {
        let result = std::panic::catch_unwind(|| parse(input, &registry));
        assert!(
            result.is_ok(),
            "Parser panicked on unicode input: {:?}",
            input
        );
    }
}

#[test]
fn test_valid_syntax_still_works() {
    let valid_inputs = [
        "select * from LogEvent.length(5)",
        "select count(*) from LogEvent.time(10 sec) where Level > 2",
        "select min(Level) from LogEvent.time(10 sec) where Level > 2",
        "select avg(Latency), count(*) from LogEvent.time(3 min) where Latency < 0.25 or Level > 4",
    ];

    let registry = registry();
    for input in &valid_inputs {
        let result = parse(input, &registry);
        assert!(
            result.is_ok(),
            "Valid query should parse: {:?}, error: {:?}",
            input,
            result.err()
        );
    }
}

#[test]
fn test_empty_projection_rejected() {
    let err = parse("select from LogEvent.length(5)", &registry()).unwrap_err();
    assert_eq!(err, ParseError::Incomplete(StatementError::EmptyProjection));
    assert_eq!(err.category(), ErrorCategory::Syntax);
}
