//! Token classifier for StreamQL using Logos
//!
//! The classifier never interprets numbers: digit runs come out as
//! [`Token::Identifier`] and a decimal point is always its own
//! [`Token::Dot`]. Whether `2.5` is one float or two integers is decided by
//! the parser from the schema of the field it is compared against.

use logos::Logos;
use std::fmt;
use streamql_core::{AggregateFunction, Span};

/// Token type for StreamQL
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    // === Structural keywords ===
    #[token("select", ignore(ascii_case))]
    Select,
    #[token("from", ignore(ascii_case))]
    From,
    #[token("where", ignore(ascii_case))]
    Where,
    #[token("and", ignore(ascii_case))]
    And,
    #[token("or", ignore(ascii_case))]
    Or,

    // === Aggregates ===
    #[token("count", ignore(ascii_case))]
    Count,
    #[token("sum", ignore(ascii_case))]
    Sum,
    #[token("avg", ignore(ascii_case))]
    Avg,
    #[token("min", ignore(ascii_case))]
    Min,
    #[token("max", ignore(ascii_case))]
    Max,
    #[token("med", ignore(ascii_case))]
    Med,

    // === Windows ===
    #[token("time", ignore(ascii_case))]
    Time,
    #[token("length", ignore(ascii_case))]
    Length,

    // Time units. `min` lexes as the aggregate; the parser reads it as
    // minutes only in the unit slot of a time window.
    #[token("sec", ignore(ascii_case))]
    #[token("second", ignore(ascii_case))]
    #[token("seconds", ignore(ascii_case))]
    Sec,
    #[token("minute", ignore(ascii_case))]
    #[token("minutes", ignore(ascii_case))]
    Minute,

    // === Punctuation ===
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("*")]
    Star,

    // === Comparators ===
    #[token(">")]
    Gt,
    #[token("<")]
    Lt,

    // Names, digit runs, and any character not classified above
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    #[regex(r"[0-9]+")]
    #[regex(r"[^\x00-\x7F\s]")]
    Identifier,

    // Unicode White_Space, so vertical tab and no-break space separate too
    #[regex(r"\s+")]
    Whitespace,

    Eof,
}

impl Token {
    /// Field aggregate named by this token. `count` is not one: it takes no
    /// field.
    pub fn aggregate_function(self) -> Option<AggregateFunction> {
        match self {
            Token::Sum => Some(AggregateFunction::Sum),
            Token::Avg => Some(AggregateFunction::Average),
            Token::Min => Some(AggregateFunction::Min),
            Token::Max => Some(AggregateFunction::Max),
            Token::Med => Some(AggregateFunction::Median),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Token::Select => "select",
            Token::From => "from",
            Token::Where => "where",
            Token::And => "and",
            Token::Or => "or",
            Token::Count => "count",
            Token::Sum => "sum",
            Token::Avg => "avg",
            Token::Min => "min",
            Token::Max => "max",
            Token::Med => "med",
            Token::Time => "time",
            Token::Length => "length",
            Token::Sec => "sec",
            Token::Minute => "minute",
            Token::LParen => "(",
            Token::RParen => ")",
            Token::Comma => ",",
            Token::Dot => ".",
            Token::Star => "*",
            Token::Gt => ">",
            Token::Lt => "<",
            Token::Identifier => "identifier",
            Token::Whitespace => "whitespace",
            Token::Eof => "EOF",
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A classified token together with its literal text and byte range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpannedToken<'source> {
    pub token: Token,
    pub literal: &'source str,
    pub start: usize,
    pub end: usize,
}

impl<'source> SpannedToken<'source> {
    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }

    pub fn is_eof(&self) -> bool {
        self.token == Token::Eof
    }

    /// Literal for diagnostics; `EOF` at end of input.
    pub fn describe(&self) -> String {
        if self.is_eof() {
            Token::Eof.to_string()
        } else {
            format!("'{}'", self.literal)
        }
    }
}

/// Forward-only cursor over a query.
///
/// None of the traversal methods fail. Once the input is exhausted every
/// call returns [`Token::Eof`].
pub struct Lexer<'source> {
    source: &'source str,
    inner: logos::Lexer<'source, Token>,
    peeked: Option<SpannedToken<'source>>,
    eof_emitted: bool,
}

impl<'source> Lexer<'source> {
    pub fn new(source: &'source str) -> Self {
        Self {
            source,
            inner: Token::lexer(source),
            peeked: None,
            eof_emitted: false,
        }
    }

    pub fn source(&self) -> &'source str {
        self.source
    }

    fn scan(&mut self) -> SpannedToken<'source> {
        match self.inner.next() {
            Some(result) => {
                let span = self.inner.span();
                SpannedToken {
                    // Unclassified ASCII characters become single-char identifiers
                    token: result.unwrap_or(Token::Identifier),
                    literal: self.inner.slice(),
                    start: span.start,
                    end: span.end,
                }
            }
            None => {
                let end = self.source.len();
                SpannedToken {
                    token: Token::Eof,
                    literal: "",
                    start: end,
                    end,
                }
            }
        }
    }

    /// Look at the next raw token without consuming it.
    pub fn peek(&mut self) -> SpannedToken<'source> {
        match self.peeked {
            Some(tok) => tok,
            None => {
                let tok = self.scan();
                self.peeked = Some(tok);
                tok
            }
        }
    }

    /// Discard whitespace, then look at the next token without consuming it.
    pub fn peek_ignoring_whitespace(&mut self) -> SpannedToken<'source> {
        loop {
            let tok = self.peek();
            if tok.token != Token::Whitespace {
                return tok;
            }
            self.next_token();
        }
    }

    /// Next token exactly as written, whitespace included.
    pub fn next_token(&mut self) -> SpannedToken<'source> {
        match self.peeked.take() {
            Some(tok) => tok,
            None => self.scan(),
        }
    }

    pub fn next_ignoring_whitespace(&mut self) -> SpannedToken<'source> {
        loop {
            let tok = self.next_token();
            if tok.token != Token::Whitespace {
                return tok;
            }
        }
    }

    /// Skip to the next identifier (a name or digit run).
    pub fn next_identifier(&mut self) -> SpannedToken<'source> {
        loop {
            let tok = self.next_token();
            if matches!(tok.token, Token::Identifier | Token::Eof) {
                return tok;
            }
        }
    }

    /// Skip whitespace and identifiers; used to find the operator that
    /// follows a field name.
    pub fn next_non_identifier(&mut self) -> SpannedToken<'source> {
        loop {
            let tok = self.next_token();
            if !matches!(tok.token, Token::Identifier | Token::Whitespace) {
                return tok;
            }
        }
    }
}

impl<'source> Iterator for Lexer<'source> {
    type Item = SpannedToken<'source>;

    /// Yields every token, then `Eof` once, then `None`.
    fn next(&mut self) -> Option<Self::Item> {
        let tok = self.next_token();
        if tok.is_eof() {
            if self.eof_emitted {
                return None;
            }
            self.eof_emitted = true;
        }
        Some(tok)
    }
}

/// Tokenize a source string into a vector of spanned tokens, ending in `Eof`
pub fn tokenize(source: &str) -> Vec<SpannedToken<'_>> {
    Lexer::new(source).collect()
}
