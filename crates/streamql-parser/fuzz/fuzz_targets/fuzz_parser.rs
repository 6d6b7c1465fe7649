#![no_main]
use libfuzzer_sys::fuzz_target;
use streamql_core::{EventType, FieldType, Registry};

fuzz_target!(|data: &[u8]| {
    if let Ok(query) = std::str::from_utf8(data) {
        let registry: Registry = [EventType::new("LogEvent")
            .with_field("Level", FieldType::Int)
            .with_field("Latency", FieldType::Float)]
        .into_iter()
        .collect();

        // The parser must never panic on any input
        let _ = streamql_parser::parse(query, &registry);

        // Filtered views must terminate on any input
        let mut lexer = streamql_parser::Lexer::new(query);
        while !lexer.next_non_identifier().is_eof() {}
    }
});
