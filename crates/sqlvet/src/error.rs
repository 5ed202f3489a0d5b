//! Error types for parsing and configuration.

use thiserror::Error;

/// Failure to obtain a syntax tree from the external parser.
///
/// Never escapes [`crate::Checker::check_syntax`]; the orchestrator turns it
/// into a single `"Syntax error: ..."` entry in the result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The parser rejected the text.
    #[error("{0}")]
    Syntax(String),

    /// The text held more or fewer than one statement.
    #[error("expected exactly 1 statement, got {0}")]
    StatementCount(usize),

    /// Nothing left to parse after preprocessing.
    #[error("empty statement")]
    Empty,
}

impl From<sqlparser::parser::ParserError> for ParseError {
    fn from(err: sqlparser::parser::ParserError) -> Self {
        ParseError::Syntax(err.to_string())
    }
}

/// Invalid configuration values.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown dialect: {0} (expected 'abap' or 'aql')")]
    UnknownDialect(String),

    #[error("Invalid lexical pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        source: regex::Error,
    },
}

/// Result type for parse operations.
pub type Result<T> = std::result::Result<T, ParseError>;
