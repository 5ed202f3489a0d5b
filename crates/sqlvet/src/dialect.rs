//! Dialect selection, dialect text preprocessing, and the parse entry point.
//!
//! Both dialects are parsed by `sqlparser`. What differs is the backend
//! grammar and the proprietary clauses stripped before parsing:
//!
//! | Dialect | Backend grammar      | Stripped before parsing                                   |
//! |---------|----------------------|-----------------------------------------------------------|
//! | ABAP    | `GenericDialect`     | `SINGLE`, `UP TO n ROWS`, `BYPASSING BUFFER`, `CLIENT SPECIFIED` |
//! | AQL     | `PostgreSqlDialect`  | `INCLUDE INACTIVE`, `SUBCLASS <name>`                      |
//!
//! ABAP's `tab~col` column selector is rewritten to `tab.col`. Stripped
//! clauses are recorded in [`DialectFeatures`] so reports can still show them.
//! None of this touches the semantic rules, which are dialect-agnostic.

use std::fmt;
use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlparser::dialect::{Dialect as Grammar, GenericDialect, PostgreSqlDialect};
use sqlparser::parser::Parser;
use tracing::{debug, trace};

use crate::error::{ConfigError, ParseError, Result};
use crate::lower::{self, Recovery};
use crate::tree::SyntaxTree;

static GENERIC: GenericDialect = GenericDialect {};
static POSTGRES: PostgreSqlDialect = PostgreSqlDialect {};

// ============================================================================
// Configuration
// ============================================================================

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Dialect {
    /// ABAP Open SQL.
    #[default]
    Abap,
    /// Ariba Query Language.
    Aql,
}

impl Dialect {
    pub fn name(self) -> &'static str {
        match self {
            Dialect::Abap => "ABAP",
            Dialect::Aql => "AQL",
        }
    }

    /// Backend grammar the dialect is parsed with.
    pub(crate) fn grammar(self) -> &'static dyn Grammar {
        match self {
            Dialect::Abap => &GENERIC,
            Dialect::Aql => &POSTGRES,
        }
    }

    /// Grammar for the DELETE forms the backend grammar lacks: the generic
    /// grammar rejects `DELETE t1, t2 FROM ...`, PostgreSQL rejects
    /// `DELETE t WHERE ...`.
    pub(crate) fn delete_grammar(self) -> &'static dyn Grammar {
        match self {
            Dialect::Abap => &POSTGRES,
            Dialect::Aql => &GENERIC,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abap" => Ok(Dialect::Abap),
            "aql" | "ariba" => Ok(Dialect::Aql),
            other => Err(ConfigError::UnknownDialect(other.to_string())),
        }
    }
}

/// Parse-step configuration: which grammar, and whether to preprocess.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialectConfig {
    pub name: Dialect,
    pub preprocess: bool,
}

impl Default for DialectConfig {
    fn default() -> Self {
        Self {
            name: Dialect::Abap,
            preprocess: true,
        }
    }
}

impl DialectConfig {
    pub fn new(name: Dialect) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }
}

// ============================================================================
// Preprocessing
// ============================================================================

/// Dialect-only clauses found (and removed) during preprocessing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DialectFeatures {
    /// ABAP `SELECT SINGLE`.
    pub single: bool,
    /// ABAP `UP TO n ROWS`.
    pub up_to_rows: Option<u64>,
    /// ABAP `BYPASSING BUFFER`.
    pub bypassing_buffer: bool,
    /// ABAP `CLIENT SPECIFIED`.
    pub client_specified: bool,
    /// AQL clauses removed verbatim, e.g. `INCLUDE INACTIVE`.
    pub stripped_clauses: Vec<String>,
}

impl DialectFeatures {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Output of [`Preprocessor::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preprocessed {
    /// Text handed to the parser.
    pub sql: String,
    pub features: DialectFeatures,
    /// Whether a dialect clause was removed or rewritten.
    pub rewritten: bool,
}

/// Compiled dialect rewrites. Built once per checker.
#[derive(Debug, Clone)]
pub struct Preprocessor {
    config: DialectConfig,
    abap_single: Regex,
    abap_up_to: Regex,
    abap_bypassing: Regex,
    abap_client: Regex,
    abap_tilde: Regex,
    aql_include_inactive: Regex,
    aql_subclass: Regex,
}

pub(crate) fn compile(pattern: &str) -> std::result::Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|source| ConfigError::Pattern {
        pattern: pattern.to_string(),
        source,
    })
}

impl Preprocessor {
    pub fn new(config: DialectConfig) -> std::result::Result<Self, ConfigError> {
        Ok(Self {
            config,
            abap_single: compile(r"(?i)^\s*SELECT\s+SINGLE\b")?,
            abap_up_to: compile(r"(?i)\s*\bUP\s+TO\s+(\d+)\s+ROWS\b")?,
            abap_bypassing: compile(r"(?i)\s*\bBYPASSING\s+BUFFER\b")?,
            abap_client: compile(r"(?i)\s*\bCLIENT\s+SPECIFIED\b")?,
            abap_tilde: compile(r"(\w)~(\w)")?,
            aql_include_inactive: compile(r"(?i)\s+INCLUDE\s+INACTIVE\b")?,
            aql_subclass: compile(r"(?i)\s+SUBCLASS\s+\w+\b")?,
        })
    }

    /// Rewrites `raw` into text the backend grammar accepts.
    ///
    /// With preprocessing disabled the text is passed through untouched.
    pub fn run(&self, raw: &str) -> Preprocessed {
        if !self.config.preprocess {
            return Preprocessed {
                sql: raw.to_string(),
                features: DialectFeatures::default(),
                rewritten: false,
            };
        }

        let mut features = DialectFeatures::default();
        let mut sql = raw.trim().to_string();

        match self.config.name {
            Dialect::Abap => {
                if self.abap_single.is_match(&sql) {
                    features.single = true;
                    sql = self.abap_single.replace(&sql, "SELECT").into_owned();
                }
                if let Some(caps) = self.abap_up_to.captures(&sql) {
                    features.up_to_rows = caps.get(1).and_then(|m| m.as_str().parse().ok());
                    sql = self.abap_up_to.replace(&sql, "").into_owned();
                }
                if self.abap_bypassing.is_match(&sql) {
                    features.bypassing_buffer = true;
                    sql = self.abap_bypassing.replace_all(&sql, "").into_owned();
                }
                if self.abap_client.is_match(&sql) {
                    features.client_specified = true;
                    sql = self.abap_client.replace_all(&sql, "").into_owned();
                }
                sql = self.abap_tilde.replace_all(&sql, "$1.$2").into_owned();
            }
            Dialect::Aql => {
                for pattern in [&self.aql_include_inactive, &self.aql_subclass] {
                    for found in pattern.find_iter(&sql) {
                        features
                            .stripped_clauses
                            .push(normalize_whitespace(found.as_str()).to_ascii_uppercase());
                    }
                    sql = pattern.replace_all(&sql, "").into_owned();
                }
            }
        }

        let sql = normalize_whitespace(&sql);
        let rewritten = !features.is_empty() || sql != normalize_whitespace(raw);

        trace!(dialect = %self.config.name, rewritten, "preprocessed statement");

        Preprocessed {
            sql,
            features,
            rewritten,
        }
    }
}

/// Collapses whitespace runs into single spaces and trims the ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ============================================================================
// Parser
// ============================================================================

/// Parses already-preprocessed text with the dialect's backend grammar and
/// lowers the result into a [`SyntaxTree`]. Built once per checker.
///
/// Incomplete DML that the backend rejects outright (for example an INSERT
/// with no VALUES) is recovered into a partial tree so the semantic rules can
/// name what is missing. Anything else the backend rejects is a
/// [`ParseError`] carrying the backend's message.
#[derive(Debug, Clone)]
pub struct SqlParser {
    dialect: Dialect,
    recovery: Recovery,
}

impl SqlParser {
    pub fn new(dialect: Dialect) -> std::result::Result<Self, ConfigError> {
        Ok(Self {
            dialect,
            recovery: Recovery::new()?,
        })
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn parse(&self, sql: &str) -> Result<SyntaxTree> {
        let dialect = self.dialect;
        let trimmed = sql.trim().trim_end_matches(';').trim();
        if trimmed.is_empty() {
            return Err(ParseError::Empty);
        }

        match Parser::parse_sql(dialect.grammar(), sql) {
            Ok(statements) => {
                if statements.len() != 1 {
                    return Err(ParseError::StatementCount(statements.len()));
                }
                Ok(lower::lower_statement(&statements[0]))
            }
            Err(err) => {
                if let Some(tree) = self.recovery.recover(trimmed, dialect) {
                    debug!(%dialect, error = %err, "recovered incomplete DML statement");
                    return Ok(tree);
                }
                Err(err.into())
            }
        }
    }
}
