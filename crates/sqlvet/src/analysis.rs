//! Descriptive projection of a validated tree.
//!
//! Nothing here validates. [`analyze`] only reports what is in the tree:
//! the statement kind, referenced tables, columns and functions, and which
//! clauses are present.

use serde::Serialize;

use crate::dialect::{Dialect, DialectFeatures};
use crate::tree::{ClauseKind, NodeKind, StatementKind, SyntaxTree, find_all, get_clause};

/// Clause labels in reporting order. `JOIN` is handled separately because
/// joins are nodes, not clauses.
const REPORTED_CLAUSES: &[(ClauseKind, &str)] = &[
    (ClauseKind::From, "FROM"),
    (ClauseKind::Where, "WHERE"),
    (ClauseKind::GroupBy, "GROUP BY"),
    (ClauseKind::Having, "HAVING"),
    (ClauseKind::OrderBy, "ORDER BY"),
    (ClauseKind::Limit, "LIMIT"),
];

/// Flat description of one statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryAnalysis {
    pub kind: StatementKind,
    pub tables: Vec<String>,
    pub columns: Vec<String>,
    /// Upper-cased function names.
    pub functions: Vec<String>,
    pub clauses: Vec<String>,
}

/// Validation outcome plus analysis, as returned by
/// [`crate::Checker::analyze_query`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisReport {
    /// Input text, trimmed.
    pub sql: String,
    pub dialect: Dialect,
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// Absent when the text did not parse.
    pub analysis: Option<QueryAnalysis>,
    pub features: DialectFeatures,
}

/// Projects `tree` into a [`QueryAnalysis`].
///
/// Lists are deduplicated and keep first-seen order.
pub fn analyze(tree: &SyntaxTree) -> QueryAnalysis {
    let root = tree.root();
    let mut tables = Vec::new();
    let mut columns = Vec::new();
    let mut functions = Vec::new();
    let mut has_join = false;

    for id in find_all(tree, root, |_| true) {
        match tree.kind(id) {
            NodeKind::Table(name) => push_unique(&mut tables, name.clone()),
            NodeKind::Column(name) if !name.is_empty() => push_unique(&mut columns, name.clone()),
            NodeKind::Function(name) => push_unique(&mut functions, name.to_ascii_uppercase()),
            NodeKind::Join(_) => has_join = true,
            _ => {}
        }
    }

    let kind = tree.statement_kind();
    let mut clauses: Vec<String> = Vec::new();
    if kind == StatementKind::Select {
        clauses.extend(
            REPORTED_CLAUSES
                .iter()
                .filter(|(clause, _)| get_clause(tree, root, *clause).is_some())
                .map(|(_, label)| (*label).to_string()),
        );
    }
    if has_join {
        clauses.push("JOIN".to_string());
    }

    QueryAnalysis {
        kind,
        tables,
        columns,
        functions,
        clauses,
    }
}

fn push_unique(list: &mut Vec<String>, value: String) {
    if !list.contains(&value) {
        list.push(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::SqlParser;

    fn analyze_sql(sql: &str) -> QueryAnalysis {
        analyze(&SqlParser::new(Dialect::Abap).unwrap().parse(sql).unwrap())
    }

    #[test]
    fn collects_tables_columns_functions() {
        let analysis = analyze_sql(
            "SELECT f.carrid, COUNT(f.connid), max(f.price) FROM sflight AS f \
             INNER JOIN spfli AS p ON f.carrid = p.carrid WHERE f.carrid = 'AA' \
             GROUP BY f.carrid ORDER BY f.carrid",
        );

        assert_eq!(analysis.kind, StatementKind::Select);
        assert_eq!(analysis.tables, vec!["sflight", "spfli"]);
        assert_eq!(analysis.columns, vec!["carrid", "connid", "price"]);
        assert_eq!(analysis.functions, vec!["COUNT", "MAX"]);
        assert_eq!(
            analysis.clauses,
            vec!["FROM", "WHERE", "GROUP BY", "ORDER BY", "JOIN"]
        );
    }

    #[test]
    fn clauses_follow_canonical_order() {
        let analysis = analyze_sql("SELECT a FROM t ORDER BY a LIMIT 3");
        assert_eq!(analysis.clauses, vec!["FROM", "ORDER BY", "LIMIT"]);
    }

    #[test]
    fn dml_reports_tables_but_no_select_clauses() {
        let analysis = analyze_sql("UPDATE sflight SET price = 100 WHERE carrid = 'AA'");
        assert_eq!(analysis.kind, StatementKind::Update);
        assert_eq!(analysis.tables, vec!["sflight"]);
        assert!(analysis.clauses.is_empty());
    }

    #[test]
    fn serializes_to_json() {
        let analysis = analyze_sql("SELECT a FROM t");
        let json = serde_json::to_value(&analysis).unwrap();
        assert_eq!(json["kind"], "Select");
        assert_eq!(json["tables"][0], "t");
    }
}
