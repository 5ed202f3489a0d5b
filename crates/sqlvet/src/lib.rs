//! # sqlvet: semantic validation for ABAP SQL and Ariba AQL
//!
//! A permissive SQL parser accepts plenty of statements that cannot mean
//! anything: a SELECT with no FROM, an INNER JOIN with no ON, `RANK()`
//! without a window. This crate parses a statement, lowers it into a small
//! read-only tree and runs a fixed, ordered set of semantic rules over it.
//! A lexical pass over the raw text runs first and catches fragments the
//! parser would silently drop.
//!
//! ## Pipeline
//!
//! 1. Lexical pre-validation of the raw text (errors accumulate)
//! 2. Dialect preprocessing (ABAP `SINGLE`/`UP TO n ROWS`/`~`, AQL
//!    `INCLUDE INACTIVE`/`SUBCLASS`)
//! 3. Parse with `sqlparser` and lower into a [`SyntaxTree`]; a parse
//!    failure ends validation with one `"Syntax error: ..."` entry
//! 4. Semantic rules (errors) and advisory checks (warnings)
//!
//! The statement is valid iff no error was reported. Warnings never change
//! the verdict.
//!
//! ## Rules
//!
//! | Rule                    | Error                                                    |
//! |-------------------------|----------------------------------------------------------|
//! | `missing-from`          | `Missing FROM clause in SELECT statement`                |
//! | `join-without-on`       | `<KIND> JOIN requires ON condition` (CROSS is exempt)    |
//! | `window-without-over`   | `Window function <NAME>() requires OVER clause`          |
//! | `insert-without-source` | `INSERT statement requires VALUES clause or SELECT query`|
//! | `update-without-set`    | `UPDATE statement requires SET clause`                   |
//! | `delete-without-target` | `DELETE statement requires target table`                 |
//!
//! ## Usage
//!
//! ```
//! use sqlvet::{Checker, Dialect};
//!
//! let checker = Checker::for_dialect(Dialect::Abap)?;
//!
//! let result = checker.check_syntax("SELECT carrid, connid WHERE carrid = 'AA'");
//! assert!(!result.is_valid);
//! assert_eq!(result.errors, ["Missing FROM clause in SELECT statement"]);
//!
//! let report = checker.analyze_query("SELECT SINGLE carrid FROM sflight WHERE carrid = 'AA'");
//! assert!(report.features.single);
//! # Ok::<(), sqlvet::ConfigError>(())
//! ```

mod analysis;
pub mod batch;
mod checker;
mod config;
mod dialect;
mod error;
pub mod lexical;
mod lower;
pub mod rules;
pub mod tree;


pub use analysis::{AnalysisReport, QueryAnalysis, analyze};
pub use batch::{BatchEntry, BatchReport, BatchSummary, split_statements, validate_file, validate_script};
pub use checker::{AQL_REWRITE_NOTE, Checker, SYNTAX_ERROR_PREFIX, ValidationResult};
pub use config::{
    ConfigLoader, LOCAL_CONFIG_FILE, LexicalConfig, PROJECT_CONFIG_FILE, PatternCheck,
    SqlvetConfig, WarningsConfig,
};
pub use dialect::{
    Dialect, DialectConfig, DialectFeatures, Preprocessed, Preprocessor, SqlParser,
    normalize_whitespace,
};
pub use error::{ConfigError, ParseError, Result};
pub use lexical::LexicalValidator;
pub use tree::{NodeId, NodeKind, StatementKind, SyntaxTree};
