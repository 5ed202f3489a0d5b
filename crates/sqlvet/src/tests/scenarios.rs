//! Concrete statements with known verdicts, checked end to end.

use super::{abap, aql, check_both, has_error, has_join_error};
use crate::lexical::DANGLING_OPERATOR;
use crate::{AQL_REWRITE_NOTE, StatementKind};

#[test]
fn select_without_from() {
    for result in check_both("SELECT carrid, connid WHERE carrid = 'AA'") {
        assert!(!result.is_valid);
        assert!(has_error(&result, "Missing FROM clause in SELECT statement"));
    }
}

#[test]
fn parenthesized_select_without_from() {
    for result in check_both("(SELECT carrid WHERE carrid = 'AA')") {
        assert!(has_error(&result, "Missing FROM clause in SELECT statement"), "{:?}", result.errors);
    }
}

#[test]
fn parentheses_in_comments_and_quoted_identifiers_are_ignored() {
    for sql in ["SELECT x FROM t -- trailing ( comment", "SELECT \"a(b\" FROM t WHERE x = 1"] {
        for result in check_both(sql) {
            assert!(result.is_valid, "{sql}: {:?}", result.errors);
        }
    }
}

#[test]
fn inner_join_without_on() {
    for result in check_both("SELECT f.carrid FROM t1 AS f INNER JOIN t2 AS p WHERE f.carrid='AA'") {
        assert!(!result.is_valid);
        assert!(has_error(&result, "INNER JOIN requires ON condition"));
    }
}

#[test]
fn cross_join_is_valid() {
    for result in check_both("SELECT c.name FROM t1 AS c CROSS JOIN t2 AS s") {
        assert!(result.is_valid, "unexpected errors: {:?}", result.errors);
        assert!(!has_join_error(&result));
    }
}

#[test]
fn row_number_without_over() {
    for result in check_both("SELECT carrid, ROW_NUMBER() as rn FROM sflight") {
        assert!(!result.is_valid);
        assert!(has_error(&result, "Window function ROW_NUMBER() requires OVER clause"));
    }
}

#[test]
fn insert_without_values_or_query() {
    for result in check_both("INSERT INTO t (a,b);") {
        assert!(!result.is_valid);
        assert!(has_error(
            &result,
            "INSERT statement requires VALUES clause or SELECT query"
        ));
        assert_eq!(
            result.tree.as_ref().map(|t| t.statement_kind()),
            Some(StatementKind::Insert)
        );
    }
}

#[test]
fn delete_from_target_is_valid() {
    for result in check_both("DELETE FROM sbook WHERE fldate < '20200101'") {
        assert!(result.is_valid, "unexpected errors: {:?}", result.errors);
    }
}

#[test]
fn dangling_operator_is_reported_lexically() {
    for result in check_both("SELECT carrid, + FROM sflight") {
        assert!(!result.is_valid);
        assert!(has_error(&result, DANGLING_OPERATOR));
    }
}

#[test]
fn update_without_set() {
    for result in check_both("UPDATE sflight WHERE carrid = 'AA'") {
        assert!(!result.is_valid);
        assert!(has_error(&result, "UPDATE statement requires SET clause"));
    }
}

#[test]
fn delete_without_target() {
    for result in check_both("DELETE FROM") {
        assert!(!result.is_valid);
        assert!(has_error(&result, "DELETE statement requires target table"));
    }
}

#[test]
fn windowed_row_number_is_valid() {
    for result in check_both(
        "SELECT carrid, ROW_NUMBER() OVER (PARTITION BY carrid ORDER BY fldate) AS rn \
         FROM sflight WHERE carrid = 'AA'",
    ) {
        assert!(result.is_valid, "unexpected errors: {:?}", result.errors);
        assert!(result.warnings.is_empty());
    }
}

#[test]
fn abap_open_sql_statement_is_valid() {
    let result = abap().check_syntax(
        "SELECT SINGLE f~carrid, f~connid FROM sflight AS f \
         INNER JOIN spfli AS p ON f~carrid = p~carrid \
         WHERE f~carrid = @lv_carrid",
    );
    assert!(result.is_valid, "unexpected errors: {:?}", result.errors);
    assert!(result.warnings.is_empty());
}

#[test]
fn abap_up_to_rows_suppresses_unbounded_warning() {
    let result = abap().check_syntax("SELECT carrid FROM sflight UP TO 100 ROWS");
    assert!(result.is_valid);
    assert!(result.warnings.is_empty());
}

#[test]
fn abap_single_without_where_warns() {
    let result = abap().check_syntax("SELECT SINGLE * FROM sflight");
    assert!(result.is_valid);
    assert!(
        result
            .warnings
            .iter()
            .any(|w| w == "SELECT SINGLE should have a WHERE clause with key fields.")
    );
}

#[test]
fn aql_proprietary_clauses_are_accepted() {
    let result = aql().check_syntax(
        "SELECT cr.UniqueName FROM ariba.rfx.Document AS cr \
         WHERE cr.Active = true INCLUDE INACTIVE SUBCLASS NONE",
    );
    assert!(result.is_valid, "unexpected errors: {:?}", result.errors);
}

#[test]
fn aql_rewrite_note_follows_syntax_error() {
    let result = aql().check_syntax("SELECT cr FROM INCLUDE INACTIVE");
    assert!(!result.is_valid);
    assert_eq!(result.errors.last().map(String::as_str), Some(AQL_REWRITE_NOTE));
}

#[test]
fn rules_and_lexical_errors_combine() {
    let result = abap().check_syntax("SELECT a, RANK() WHERE (b = 1)) ");
    assert!(!result.is_valid);
    assert!(has_error(&result, "Mismatched parentheses"));
}

#[test]
fn nested_join_in_subquery_is_checked() {
    for result in check_both(
        "SELECT a FROM t WHERE a IN (SELECT u.b FROM u LEFT JOIN v AS w WHERE u.b = 1)",
    ) {
        assert!(has_error(&result, "LEFT JOIN requires ON condition"));
    }
}

#[test]
fn analysis_of_valid_join() {
    let report = aql().analyze_query(
        "SELECT d.Title, COUNT(i.Id) FROM ariba.rfx.Document AS d \
         LEFT OUTER JOIN ariba.rfx.Item AS i ON i.Document = d.Id \
         GROUP BY d.Title ORDER BY d.Title",
    );
    assert!(report.is_valid, "unexpected errors: {:?}", report.errors);

    let analysis = report.analysis.unwrap();
    assert_eq!(analysis.tables, vec!["ariba.rfx.Document", "ariba.rfx.Item"]);
    assert_eq!(analysis.functions, vec!["COUNT"]);
    assert_eq!(analysis.clauses, vec!["FROM", "GROUP BY", "ORDER BY", "JOIN"]);
}
