//! Validation pipeline.

use serde::Serialize;
use tracing::debug;

use crate::analysis::{AnalysisReport, analyze};
use crate::config::SqlvetConfig;
use crate::dialect::{Dialect, DialectFeatures, Preprocessor, SqlParser};
use crate::error::ConfigError;
use crate::lexical::LexicalValidator;
use crate::rules;
use crate::tree::SyntaxTree;

/// Prefix of the single error reported when the text does not parse.
pub const SYNTAX_ERROR_PREFIX: &str = "Syntax error: ";

/// Appended after a parse failure when AQL preprocessing changed the text.
pub const AQL_REWRITE_NOTE: &str =
    "Note: Ariba-specific clauses were removed during pre-processing";

/// Outcome of one [`Checker::check_syntax`] call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    /// True iff `errors` is empty.
    pub is_valid: bool,
    /// Present iff the text parsed.
    #[serde(skip)]
    pub tree: Option<SyntaxTree>,
    /// Lexical errors first, then semantic errors in rule order.
    pub errors: Vec<String>,
    /// Advisory only.
    pub warnings: Vec<String>,
}

/// Validates statements of one dialect.
///
/// A checker owns its configuration and compiled patterns and is never
/// mutated after construction, so a single instance can be shared across
/// threads.
#[derive(Debug, Clone)]
pub struct Checker {
    config: SqlvetConfig,
    lexical: LexicalValidator,
    preprocessor: Preprocessor,
    parser: SqlParser,
}

impl Checker {
    /// Creates a checker from a full configuration.
    pub fn new(config: SqlvetConfig) -> Result<Self, ConfigError> {
        let lexical = LexicalValidator::new(&config.lexical)?;
        let preprocessor = Preprocessor::new(config.dialect.clone())?;
        let parser = SqlParser::new(config.dialect.name)?;
        Ok(Self {
            config,
            lexical,
            preprocessor,
            parser,
        })
    }

    /// Creates a checker for `dialect` with every other setting at its
    /// default.
    pub fn for_dialect(dialect: Dialect) -> Result<Self, ConfigError> {
        let mut config = SqlvetConfig::default();
        config.dialect.name = dialect;
        Self::new(config)
    }

    pub fn config(&self) -> &SqlvetConfig {
        &self.config
    }

    pub fn dialect(&self) -> Dialect {
        self.parser.dialect()
    }

    /// Validates one statement.
    ///
    /// Never fails: a parse failure is reported as a single
    /// `"Syntax error: ..."` entry after any lexical errors, and no semantic
    /// rule runs in that case.
    pub fn check_syntax(&self, text: &str) -> ValidationResult {
        self.validate(text).0
    }

    /// Validates one statement and describes it.
    pub fn analyze_query(&self, text: &str) -> AnalysisReport {
        let (result, features) = self.validate(text);
        AnalysisReport {
            sql: text.trim().to_string(),
            dialect: self.dialect(),
            is_valid: result.is_valid,
            analysis: result.tree.as_ref().map(analyze),
            errors: result.errors,
            warnings: result.warnings,
            features,
        }
    }

    fn validate(&self, text: &str) -> (ValidationResult, DialectFeatures) {
        let dialect = self.dialect();
        let mut errors = self.lexical.pre_validate(text);

        let preprocessed = self.preprocessor.run(text);
        let tree = match self.parser.parse(&preprocessed.sql) {
            Ok(tree) => tree,
            Err(err) => {
                debug!(%dialect, error = %err, "statement did not parse");
                errors.push(format!("{SYNTAX_ERROR_PREFIX}{err}"));
                if dialect == Dialect::Aql && preprocessed.rewritten {
                    errors.push(AQL_REWRITE_NOTE.to_string());
                }
                let result = ValidationResult {
                    is_valid: false,
                    tree: None,
                    errors,
                    warnings: Vec::new(),
                };
                return (result, preprocessed.features);
            }
        };

        errors.extend(rules::run_rules(&tree));
        let warnings = rules::warnings(&tree, &preprocessed.features, &self.config.warnings);

        debug!(
            %dialect,
            kind = %tree.statement_kind(),
            errors = errors.len(),
            warnings = warnings.len(),
            "validated statement"
        );

        let result = ValidationResult {
            is_valid: errors.is_empty(),
            tree: Some(tree),
            errors,
            warnings,
        };
        (result, preprocessed.features)
    }
}
