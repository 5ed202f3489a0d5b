//! Batch validation of SQL scripts.
//!
//! A script is split into statements on `;`, after `--` line comments are
//! removed. Quotes are tracked so that neither a semicolon nor `--` inside a
//! string literal is treated as syntax.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use crate::checker::Checker;
use crate::tree::StatementKind;

/// Statements longer than this are shortened in reports.
pub const SQL_PREVIEW_CHARS: usize = 100;

/// Result for one statement of a script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchEntry {
    /// 1-based position in the script.
    pub number: usize,
    /// Statement text, shortened to [`SQL_PREVIEW_CHARS`].
    pub sql: String,
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// `None` when the statement did not parse.
    pub kind: Option<StatementKind>,
    pub tables: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    /// Total warnings across all statements.
    pub warnings: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// File the script was read from, if any.
    pub source: Option<PathBuf>,
    pub entries: Vec<BatchEntry>,
    pub summary: BatchSummary,
}

impl BatchReport {
    pub fn all_valid(&self) -> bool {
        self.summary.invalid == 0
    }
}

/// Splits a script into trimmed, non-empty statements.
pub fn split_statements(script: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut in_literal = false;
    let mut in_comment = false;
    let mut chars = script.chars().peekable();

    while let Some(c) = chars.next() {
        if in_comment {
            if c == '\n' {
                in_comment = false;
                current.push(c);
            }
            continue;
        }
        match c {
            '\'' => {
                in_literal = !in_literal;
                current.push(c);
            }
            '-' if !in_literal && chars.peek() == Some(&'-') => {
                in_comment = true;
            }
            ';' if !in_literal => {
                push_statement(&mut statements, &current);
                current.clear();
            }
            _ => current.push(c),
        }
    }
    push_statement(&mut statements, &current);

    statements
}

fn push_statement(statements: &mut Vec<String>, text: &str) {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        statements.push(trimmed.to_string());
    }
}

fn preview(sql: &str) -> String {
    if sql.chars().count() > SQL_PREVIEW_CHARS {
        let head: String = sql.chars().take(SQL_PREVIEW_CHARS).collect();
        format!("{head}...")
    } else {
        sql.to_string()
    }
}

/// Validates every statement of `script`.
pub fn validate_script(checker: &Checker, script: &str) -> BatchReport {
    let mut summary = BatchSummary::default();
    let entries: Vec<BatchEntry> = split_statements(script)
        .iter()
        .enumerate()
        .map(|(index, sql)| {
            let report = checker.analyze_query(sql);

            summary.total += 1;
            if report.is_valid {
                summary.valid += 1;
            } else {
                summary.invalid += 1;
            }
            summary.warnings += report.warnings.len();

            let (kind, tables) = match report.analysis {
                Some(analysis) => (Some(analysis.kind), analysis.tables),
                None => (None, Vec::new()),
            };

            BatchEntry {
                number: index + 1,
                sql: preview(sql),
                is_valid: report.is_valid,
                errors: report.errors,
                warnings: report.warnings,
                kind,
                tables,
            }
        })
        .collect();

    debug!(
        total = summary.total,
        invalid = summary.invalid,
        "validated script"
    );

    BatchReport {
        source: None,
        entries,
        summary,
    }
}

/// Reads and validates one script file.
pub fn validate_file(checker: &Checker, path: &Path) -> Result<BatchReport> {
    let script = fs::read_to_string(path)
        .with_context(|| format!("Failed to read SQL file {}", path.display()))?;

    info!(path = %path.display(), "validating file");

    let mut report = validate_script(checker, &script);
    report.source = Some(path.to_path_buf());
    Ok(report)
}

/// Lists the `*.sql` files directly inside `dir`, sorted by path.
pub fn sql_files_in(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory {}", dir.display()))?
    {
        let path = entry?.path();
        let is_sql = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("sql"));
        if path.is_file() && is_sql {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Dialect;
    use tempfile::tempdir;

    #[test]
    fn split_drops_comments_and_blank_statements() {
        let script = "-- header\nSELECT a FROM t; -- trailing\n\n;SELECT b\nFROM u;";
        assert_eq!(
            split_statements(script),
            vec!["SELECT a FROM t".to_string(), "SELECT b\nFROM u".to_string()]
        );
    }

    #[test]
    fn split_respects_string_literals() {
        let script = "SELECT a FROM t WHERE b = 'x;y--z'; SELECT 1";
        assert_eq!(
            split_statements(script),
            vec![
                "SELECT a FROM t WHERE b = 'x;y--z'".to_string(),
                "SELECT 1".to_string()
            ]
        );
    }

    #[test]
    fn minus_operator_is_not_a_comment() {
        assert_eq!(split_statements("SELECT a - b FROM t"), vec!["SELECT a - b FROM t"]);
    }

    #[test]
    fn script_summary_counts() {
        let checker = Checker::for_dialect(Dialect::Abap).unwrap();
        let report = validate_script(
            &checker,
            "SELECT carrid FROM sflight WHERE carrid = 'AA';\n\
             SELECT carrid, connid WHERE carrid = 'AA';\n\
             SELECT * FROM sflight;",
        );

        assert_eq!(
            report.summary,
            BatchSummary {
                total: 3,
                valid: 2,
                invalid: 1,
                warnings: 2,
            }
        );
        assert!(!report.all_valid());
        assert_eq!(report.entries[1].number, 2);
        assert_eq!(report.entries[0].kind, Some(StatementKind::Select));
        assert_eq!(report.entries[0].tables, vec!["sflight"]);
    }

    #[test]
    fn long_statements_are_previewed() {
        let checker = Checker::for_dialect(Dialect::Aql).unwrap();
        let columns: Vec<String> = (0..40).map(|i| format!("col{i}")).collect();
        let sql = format!("SELECT {} FROM t WHERE col0 = 1", columns.join(", "));
        let report = validate_script(&checker, &sql);

        let shown = &report.entries[0].sql;
        assert!(shown.ends_with("..."));
        assert_eq!(shown.chars().count(), SQL_PREVIEW_CHARS + 3);
    }

    #[test]
    fn validate_file_records_source() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("queries.sql");
        fs::write(&path, "DELETE FROM sbook WHERE fldate < '20200101';").unwrap();
        fs::write(dir.path().join("notes.txt"), "not sql").unwrap();

        let checker = Checker::for_dialect(Dialect::Abap).unwrap();
        let report = validate_file(&checker, &path).unwrap();
        assert_eq!(report.source.as_deref(), Some(path.as_path()));
        assert!(report.all_valid());

        assert_eq!(sql_files_in(dir.path()).unwrap(), vec![path]);
    }

    #[test]
    fn missing_file_is_an_error() {
        let checker = Checker::for_dialect(Dialect::Abap).unwrap();
        let err = validate_file(&checker, Path::new("/nonexistent/queries.sql")).unwrap_err();
        assert!(err.to_string().contains("Failed to read SQL file"));
    }
}
