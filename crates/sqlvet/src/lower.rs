//! Lowering of `sqlparser` statements into [`SyntaxTree`]s.
//!
//! This is the only module that knows `sqlparser` node types. Statement and
//! clause structure is matched explicitly; expressions are walked with the
//! `sqlparser` visitor so that every expression variant is covered without
//! listing them all here.
//!
//! Shape of the produced tree:
//!
//! ```text
//! Statement(Select)
//! ├── Clause(With) ── Statement(..)*          one per CTE
//! ├── Clause(Projection) ── expr | Wildcard
//! ├── Clause(From)
//! │   ├── Table | Statement(..)               relation
//! │   └── Join(kind)
//! │       ├── Table | Statement(..)           joined relation
//! │       └── Clause(On) ── expr              or Using / Natural
//! ├── Clause(Where | GroupBy | Having | Qualify) ── expr*
//! └── Clause(OrderBy | Limit | Offset) ── expr*
//! ```
//!
//! A function call with an `OVER` specification becomes
//! `Window ── Function(name) ── args`, so "is this call windowed" is an
//! ancestor check on the function node.

use std::ops::ControlFlow;

use regex::Regex;
use sqlparser::ast::{
    Expr, FromTable, GroupByExpr, Join, JoinConstraint, JoinOperator, Query, Select, SelectItem,
    SetExpr, Statement, TableFactor, TableWithJoins, Visit, Visitor,
};
use sqlparser::parser::Parser;
use sqlparser::tokenizer::Token;
use tracing::trace;

use crate::dialect::{Dialect, compile};
use crate::error::ConfigError;
use crate::tree::{
    ClauseKind, JoinKind, NodeId, NodeKind, StatementKind, SyntaxTree, TreeBuilder,
};

/// Lowers one parsed statement.
pub fn lower_statement(statement: &Statement) -> SyntaxTree {
    match statement {
        Statement::Query(query) => {
            let mut lowerer = Lowerer::new(StatementKind::from_query(query));
            let root = lowerer.builder.root();
            lowerer.query_into(query, root);
            lowerer.finish()
        }
        Statement::Insert(insert) => {
            let mut lowerer = Lowerer::new(StatementKind::Insert);
            let root = lowerer.builder.root();

            let target = lowerer.builder.clause(root, ClauseKind::Target);
            lowerer
                .builder
                .push(target, NodeKind::Table(insert.table.to_string()));

            if !insert.columns.is_empty() {
                let columns = lowerer.builder.clause(root, ClauseKind::Columns);
                for column in &insert.columns {
                    lowerer
                        .builder
                        .push(columns, NodeKind::Column(column.value.clone()));
                }
            }

            if let Some(source) = &insert.source {
                let clause = lowerer.builder.clause(root, ClauseKind::Source);
                lowerer.query(source, clause);
            } else if insert.assignments.is_empty() && insert.format_clause.is_none() {
                // INSERT ... DEFAULT VALUES
                let clause = lowerer.builder.clause(root, ClauseKind::Source);
                lowerer.builder.clause(clause, ClauseKind::Values);
            }

            if let Some(returning) = &insert.returning {
                lowerer.returning(returning, root);
            }

            lowerer.finish()
        }
        Statement::Update {
            table,
            assignments,
            selection,
            returning,
            ..
        } => {
            let mut lowerer = Lowerer::new(StatementKind::Update);
            let root = lowerer.builder.root();

            let target = lowerer.builder.clause(root, ClauseKind::Target);
            lowerer.table_with_joins(table, target);

            if !assignments.is_empty() {
                let set = lowerer.builder.clause(root, ClauseKind::Set);
                for assignment in assignments {
                    lowerer
                        .builder
                        .push(set, NodeKind::Column(assignment.target.to_string()));
                    lowerer.expr(&assignment.value, set);
                }
            }

            if let Some(selection) = selection {
                lowerer.expr_clause(ClauseKind::Where, selection, root);
            }
            if let Some(returning) = returning {
                lowerer.returning(returning, root);
            }

            lowerer.finish()
        }
        Statement::Delete(delete) => {
            let mut lowerer = Lowerer::new(StatementKind::Delete);
            let root = lowerer.builder.root();

            if !delete.tables.is_empty() {
                let tables = lowerer.builder.clause(root, ClauseKind::Tables);
                for name in &delete.tables {
                    lowerer.builder.push(tables, NodeKind::Table(name.to_string()));
                }
            }

            // `DELETE FROM t` and `DELETE t` land in different slots.
            let (slot, relations) = match &delete.from {
                FromTable::WithFromKeyword(relations) => (ClauseKind::From, relations),
                FromTable::WithoutKeyword(relations) => (ClauseKind::Target, relations),
            };
            if !relations.is_empty() {
                let clause = lowerer.builder.clause(root, slot);
                for relation in relations {
                    lowerer.table_with_joins(relation, clause);
                }
            }

            if let Some(using) = &delete.using {
                let clause = lowerer.builder.clause(root, ClauseKind::Using);
                for relation in using {
                    lowerer.table_with_joins(relation, clause);
                }
            }
            if let Some(selection) = &delete.selection {
                lowerer.expr_clause(ClauseKind::Where, selection, root);
            }
            if let Some(returning) = &delete.returning {
                lowerer.returning(returning, root);
            }

            lowerer.finish()
        }
        _ => TreeBuilder::new(NodeKind::Statement(StatementKind::Other)).build(),
    }
}

impl StatementKind {
    fn from_query(query: &Query) -> Self {
        Self::from_set_expr(&query.body)
    }

    fn from_set_expr(body: &SetExpr) -> Self {
        match body {
            SetExpr::Select(_) => StatementKind::Select,
            SetExpr::Query(query) => Self::from_query(query),
            _ => StatementKind::Other,
        }
    }
}

// ============================================================================
// Structural lowering
// ============================================================================

struct Lowerer {
    builder: TreeBuilder,
}

impl Lowerer {
    fn new(root: StatementKind) -> Self {
        Self {
            builder: TreeBuilder::new(NodeKind::Statement(root)),
        }
    }

    fn finish(self) -> SyntaxTree {
        self.builder.build()
    }

    /// Lowers a nested query under `parent` and returns its statement node.
    fn query(&mut self, query: &Query, parent: NodeId) -> NodeId {
        let node = self.builder.push(
            parent,
            NodeKind::Statement(StatementKind::from_query(query)),
        );
        self.query_into(query, node);
        node
    }

    /// Fills an existing statement node with the clauses of `query`.
    fn query_into(&mut self, query: &Query, node: NodeId) {
        if let Some(with) = &query.with {
            let clause = self.builder.clause(node, ClauseKind::With);
            for cte in &with.cte_tables {
                self.query(&cte.query, clause);
            }
        }

        self.set_expr_into(&query.body, node);

        if let Some(order_by) = &query.order_by {
            let clause = self.builder.clause(node, ClauseKind::OrderBy);
            for item in &order_by.exprs {
                self.expr(&item.expr, clause);
            }
        }
        if let Some(limit) = &query.limit {
            self.expr_clause(ClauseKind::Limit, limit, node);
        }
        if let Some(offset) = &query.offset {
            self.expr_clause(ClauseKind::Offset, &offset.value, node);
        }
    }

    fn set_expr_into(&mut self, body: &SetExpr, node: NodeId) {
        match body {
            SetExpr::Select(select) => self.select_into(select, node),
            // `(SELECT ...)` fills the enclosing node.
            SetExpr::Query(query) => self.query_into(query, node),
            SetExpr::SetOperation {
                op, left, right, ..
            } => {
                let operation = self
                    .builder
                    .push(node, NodeKind::SetOperation(op.to_string().to_uppercase()));
                for side in [left, right] {
                    let side_node = self.builder.push(
                        operation,
                        NodeKind::Statement(StatementKind::from_set_expr(side)),
                    );
                    self.set_expr_into(side, side_node);
                }
            }
            SetExpr::Values(values) => {
                let clause = self.builder.clause(node, ClauseKind::Values);
                for row in &values.rows {
                    for value in row {
                        self.expr(value, clause);
                    }
                }
            }
            _ => {
                self.builder.push(node, NodeKind::Expression);
            }
        }
    }

    fn select_into(&mut self, select: &Select, node: NodeId) {
        let projection = self.builder.clause(node, ClauseKind::Projection);
        for item in &select.projection {
            match item {
                SelectItem::UnnamedExpr(expr) | SelectItem::ExprWithAlias { expr, .. } => {
                    self.expr(expr, projection);
                }
                SelectItem::Wildcard(..) | SelectItem::QualifiedWildcard(..) => {
                    self.builder.push(projection, NodeKind::Wildcard);
                }
            }
        }

        if !select.from.is_empty() {
            let from = self.builder.clause(node, ClauseKind::From);
            for relation in &select.from {
                self.table_with_joins(relation, from);
            }
        }

        if let Some(selection) = &select.selection {
            self.expr_clause(ClauseKind::Where, selection, node);
        }

        match &select.group_by {
            GroupByExpr::All(..) => {
                self.builder.clause(node, ClauseKind::GroupBy);
            }
            GroupByExpr::Expressions(exprs, ..) if !exprs.is_empty() => {
                let clause = self.builder.clause(node, ClauseKind::GroupBy);
                for expr in exprs {
                    self.expr(expr, clause);
                }
            }
            GroupByExpr::Expressions(..) => {}
        }

        if let Some(having) = &select.having {
            self.expr_clause(ClauseKind::Having, having, node);
        }
        if let Some(qualify) = &select.qualify {
            self.expr_clause(ClauseKind::Qualify, qualify, node);
        }
    }

    fn table_with_joins(&mut self, relation: &TableWithJoins, parent: NodeId) {
        self.table_factor(&relation.relation, parent);
        for join in &relation.joins {
            self.join(join, parent);
        }
    }

    fn table_factor(&mut self, factor: &TableFactor, parent: NodeId) {
        match factor {
            TableFactor::Table { name, .. } => {
                self.builder.push(parent, NodeKind::Table(name.to_string()));
            }
            TableFactor::Derived { subquery, .. } => {
                self.query(subquery, parent);
            }
            TableFactor::NestedJoin {
                table_with_joins, ..
            } => self.table_with_joins(table_with_joins, parent),
            _ => {
                self.builder.push(parent, NodeKind::Expression);
            }
        }
    }

    fn join(&mut self, join: &Join, parent: NodeId) {
        let (kind, constraint) = join_parts(&join.join_operator);
        let node = self.builder.push(parent, NodeKind::Join(kind));
        self.table_factor(&join.relation, node);

        match constraint {
            Some(JoinConstraint::On(expr)) => self.expr_clause(ClauseKind::On, expr, node),
            Some(JoinConstraint::Using(columns)) => {
                let clause = self.builder.clause(node, ClauseKind::Using);
                for column in columns {
                    self.builder
                        .push(clause, NodeKind::Column(column.to_string()));
                }
            }
            Some(JoinConstraint::Natural) => {
                self.builder.clause(node, ClauseKind::Natural);
            }
            Some(JoinConstraint::None) | None => {}
        }
    }

    fn returning(&mut self, items: &[SelectItem], parent: NodeId) {
        let clause = self.builder.clause(parent, ClauseKind::Returning);
        for item in items {
            match item {
                SelectItem::UnnamedExpr(expr) | SelectItem::ExprWithAlias { expr, .. } => {
                    self.expr(expr, clause);
                }
                SelectItem::Wildcard(..) | SelectItem::QualifiedWildcard(..) => {
                    self.builder.push(clause, NodeKind::Wildcard);
                }
            }
        }
    }

    fn expr_clause(&mut self, clause: ClauseKind, expr: &Expr, parent: NodeId) {
        let node = self.builder.clause(parent, clause);
        self.expr(expr, node);
    }

    fn expr(&mut self, expr: &Expr, parent: NodeId) {
        let mut visitor = ExprLowerer {
            lowerer: self,
            open: vec![parent],
            opened_per_expr: Vec::new(),
            query_depth: 0,
        };
        // The visitor never breaks.
        let _ = expr.visit(&mut visitor);
    }
}

/// Maps a backend join operator onto the closed [`JoinKind`] set, together
/// with its constraint when the operator carries one.
fn join_parts(operator: &JoinOperator) -> (JoinKind, Option<&JoinConstraint>) {
    match operator {
        JoinOperator::Inner(constraint) => (JoinKind::Inner, Some(constraint)),
        JoinOperator::LeftOuter(constraint) => (JoinKind::Left, Some(constraint)),
        JoinOperator::RightOuter(constraint) => (JoinKind::Right, Some(constraint)),
        JoinOperator::FullOuter(constraint) => (JoinKind::Full, Some(constraint)),
        JoinOperator::LeftSemi(constraint) | JoinOperator::RightSemi(constraint) => {
            (JoinKind::Semi, Some(constraint))
        }
        JoinOperator::LeftAnti(constraint) | JoinOperator::RightAnti(constraint) => {
            (JoinKind::Anti, Some(constraint))
        }
        JoinOperator::AsOf { constraint, .. } => (JoinKind::AsOf, Some(constraint)),
        // APPLY is a lateral cross product and never takes a predicate.
        JoinOperator::CrossJoin { .. }
        | JoinOperator::CrossApply { .. }
        | JoinOperator::OuterApply { .. } => (JoinKind::Cross, None),
        #[allow(unreachable_patterns)]
        _ => (JoinKind::Unspecified, None),
    }
}

// ============================================================================
// Expression lowering
// ============================================================================

/// Builds expression nodes while `sqlparser` walks an expression.
///
/// Nested queries are handed back to the structural lowerer the first time
/// they are seen; everything the visitor reports inside them afterwards is
/// skipped, since the structural pass already covered it.
struct ExprLowerer<'a> {
    lowerer: &'a mut Lowerer,
    /// Stack of nodes currently open as parents.
    open: Vec<NodeId>,
    /// How many nodes each active `pre_visit_expr` pushed onto `open`.
    opened_per_expr: Vec<usize>,
    query_depth: usize,
}

impl ExprLowerer<'_> {
    fn parent(&self) -> NodeId {
        self.open.last().copied().unwrap_or(NodeId::ROOT)
    }

    fn open(&mut self, kind: NodeKind) {
        let parent = self.parent();
        let node = self.lowerer.builder.push(parent, kind);
        self.open.push(node);
    }
}

impl Visitor for ExprLowerer<'_> {
    type Break = ();

    fn pre_visit_query(&mut self, query: &Query) -> ControlFlow<Self::Break> {
        if self.query_depth == 0 {
            let parent = self.parent();
            self.lowerer.query(query, parent);
        }
        self.query_depth += 1;
        ControlFlow::Continue(())
    }

    fn post_visit_query(&mut self, _query: &Query) -> ControlFlow<Self::Break> {
        self.query_depth = self.query_depth.saturating_sub(1);
        ControlFlow::Continue(())
    }

    fn pre_visit_expr(&mut self, expr: &Expr) -> ControlFlow<Self::Break> {
        if self.query_depth > 0 {
            return ControlFlow::Continue(());
        }

        let mut opened = 0;
        if let Expr::Function(function) = expr {
            if function.over.is_some() {
                self.open(NodeKind::Window);
                opened += 1;
            }
        }
        self.open(expr_kind(expr));
        opened += 1;

        self.opened_per_expr.push(opened);
        ControlFlow::Continue(())
    }

    fn post_visit_expr(&mut self, _expr: &Expr) -> ControlFlow<Self::Break> {
        if self.query_depth > 0 {
            return ControlFlow::Continue(());
        }
        let opened = self.opened_per_expr.pop().unwrap_or(0);
        for _ in 0..opened {
            self.open.pop();
        }
        ControlFlow::Continue(())
    }
}

fn expr_kind(expr: &Expr) -> NodeKind {
    match expr {
        // ABAP host variables (`@lv_carrid`) reach us as identifiers.
        Expr::Identifier(ident) if ident.value.starts_with('@') => {
            NodeKind::Literal(ident.value.clone())
        }
        Expr::Identifier(ident) => NodeKind::Column(ident.value.clone()),
        Expr::CompoundIdentifier(idents) => NodeKind::Column(
            idents
                .last()
                .map(|ident| ident.value.clone())
                .unwrap_or_default(),
        ),
        Expr::Function(function) => NodeKind::Function(function.name.to_string()),
        Expr::BinaryOp { op, .. } => NodeKind::Operator(op.to_string()),
        Expr::UnaryOp { op, .. } => NodeKind::Operator(op.to_string()),
        Expr::Value(value) => NodeKind::Literal(value.to_string()),
        Expr::Wildcard(..) | Expr::QualifiedWildcard(..) => NodeKind::Wildcard,
        _ => NodeKind::Expression,
    }
}

// ============================================================================
// Lenient recovery
// ============================================================================

const TABLE_NAME: &str = r"[\w./@]+";

/// Rebuilds trees for DML statements the backend grammar rejects:
///
/// * `INSERT INTO t [(a, b)]` (no VALUES or query)
/// * `UPDATE t [SET] [WHERE ...]` (no assignments)
/// * `DELETE [FROM] [WHERE ...]` (no target table)
/// * DELETE forms only the other dialect's backend grammar knows
///
/// The missing part is simply absent from the tree, so the semantic rules
/// report it. A recovered WHERE predicate must parse in full.
#[derive(Debug, Clone)]
pub struct Recovery {
    insert: Regex,
    update: Regex,
    delete: Regex,
}

impl Recovery {
    pub fn new() -> Result<Self, ConfigError> {
        Ok(Self {
            insert: compile(&format!(
                r"(?is)^INSERT\s+INTO\s+({TABLE_NAME})\s*(?:\(([^()]*)\))?\s*$"
            ))?,
            update: compile(&format!(
                r"(?is)^UPDATE\s+({TABLE_NAME})(\s+SET)?\s*(?:\bWHERE\b(.*))?$"
            ))?,
            delete: compile(r"(?is)^DELETE(?:\s+FROM)?\s*(?:\bWHERE\b(.*))?$")?,
        })
    }

    /// Returns `None` when `sql` is none of the recoverable shapes.
    pub fn recover(&self, sql: &str, dialect: Dialect) -> Option<SyntaxTree> {
        if let Some(caps) = self.insert.captures(sql) {
            let mut lowerer = Lowerer::new(StatementKind::Insert);
            let root = lowerer.builder.root();
            let target = lowerer.builder.clause(root, ClauseKind::Target);
            lowerer.builder.push(target, NodeKind::Table(caps[1].to_string()));

            let names: Vec<&str> = caps
                .get(2)
                .map(|m| m.as_str().split(',').map(str::trim).filter(|c| !c.is_empty()).collect())
                .unwrap_or_default();
            if !names.is_empty() {
                let columns = lowerer.builder.clause(root, ClauseKind::Columns);
                for name in names {
                    lowerer.builder.push(columns, NodeKind::Column(name.to_string()));
                }
            }
            return Some(lowerer.finish());
        }

        if let Some(caps) = self.update.captures(sql) {
            let predicate = match caps.get(3) {
                Some(tail) => Some(parse_predicate(tail.as_str(), dialect)?),
                None => None,
            };

            let mut lowerer = Lowerer::new(StatementKind::Update);
            let root = lowerer.builder.root();
            let target = lowerer.builder.clause(root, ClauseKind::Target);
            lowerer.builder.push(target, NodeKind::Table(caps[1].to_string()));
            if caps.get(2).is_some() {
                lowerer.builder.clause(root, ClauseKind::Set);
            }
            if let Some(predicate) = &predicate {
                lowerer.expr_clause(ClauseKind::Where, predicate, root);
            }
            return Some(lowerer.finish());
        }

        if let Some(tree) = delete_with_other_grammar(sql, dialect) {
            return Some(tree);
        }

        if let Some(caps) = self.delete.captures(sql) {
            let predicate = match caps.get(1) {
                Some(tail) => Some(parse_predicate(tail.as_str(), dialect)?),
                None => None,
            };

            let mut lowerer = Lowerer::new(StatementKind::Delete);
            let root = lowerer.builder.root();
            if let Some(predicate) = &predicate {
                lowerer.expr_clause(ClauseKind::Where, predicate, root);
            }
            return Some(lowerer.finish());
        }

        None
    }
}

fn delete_with_other_grammar(sql: &str, dialect: Dialect) -> Option<SyntaxTree> {
    let is_delete = sql
        .get(..6)
        .is_some_and(|head| head.eq_ignore_ascii_case("DELETE"));
    if !is_delete {
        return None;
    }

    match Parser::parse_sql(dialect.delete_grammar(), sql).ok()?.as_slice() {
        [statement @ Statement::Delete(_)] => Some(lower_statement(statement)),
        _ => None,
    }
}

/// Parses a recovered WHERE predicate. Trailing tokens are an error.
fn parse_predicate(tail: &str, dialect: Dialect) -> Option<Expr> {
    let parsed = Parser::new(dialect.grammar())
        .try_with_sql(tail)
        .and_then(|mut parser| {
            let expr = parser.parse_expr()?;
            let next = parser.peek_token();
            if next.token == Token::EOF {
                Ok(expr)
            } else {
                parser.expected("end of statement", next)
            }
        });

    match parsed {
        Ok(expr) => Some(expr),
        Err(err) => {
            trace!(error = %err, "recovered predicate does not parse");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::SqlParser;
    use crate::tree::{find_all, get_clause, has_ancestor_matching};

    fn lower(sql: &str) -> SyntaxTree {
        SqlParser::new(Dialect::Abap).unwrap().parse(sql).unwrap()
    }

    fn recover(sql: &str, dialect: Dialect) -> Option<SyntaxTree> {
        Recovery::new().unwrap().recover(sql, dialect)
    }

    #[test]
    fn select_clauses_are_attached_to_root() {
        let tree = lower(
            "SELECT carrid, COUNT(*) FROM sflight WHERE seatsocc > 10 \
             GROUP BY carrid HAVING COUNT(*) > 1 ORDER BY carrid LIMIT 5",
        );
        let root = tree.root();

        assert_eq!(tree.statement_kind(), StatementKind::Select);
        for clause in [
            ClauseKind::Projection,
            ClauseKind::From,
            ClauseKind::Where,
            ClauseKind::GroupBy,
            ClauseKind::Having,
            ClauseKind::OrderBy,
            ClauseKind::Limit,
        ] {
            assert!(get_clause(&tree, root, clause).is_some(), "missing {clause:?}");
        }
    }

    #[test]
    fn select_without_from_has_no_from_clause() {
        let tree = lower("SELECT carrid, connid WHERE carrid = 'AA'");
        assert!(get_clause(&tree, tree.root(), ClauseKind::From).is_none());
        assert!(get_clause(&tree, tree.root(), ClauseKind::Where).is_some());
    }

    #[test]
    fn join_carries_kind_and_on_clause() {
        let tree = lower(
            "SELECT f.carrid FROM sflight AS f LEFT OUTER JOIN spfli AS p ON f.carrid = p.carrid",
        );
        let joins = find_all(&tree, tree.root(), |k| matches!(k, NodeKind::Join(_)));
        assert_eq!(joins.len(), 1);
        assert_eq!(*tree.kind(joins[0]), NodeKind::Join(JoinKind::Left));
        assert!(get_clause(&tree, joins[0], ClauseKind::On).is_some());
    }

    #[test]
    fn join_without_constraint_has_no_on_clause() {
        let tree = lower("SELECT f.carrid FROM t1 AS f INNER JOIN t2 AS p WHERE f.carrid = 'AA'");
        let joins = find_all(&tree, tree.root(), |k| matches!(k, NodeKind::Join(_)));
        assert_eq!(*tree.kind(joins[0]), NodeKind::Join(JoinKind::Inner));
        assert!(get_clause(&tree, joins[0], ClauseKind::On).is_none());
    }

    #[test]
    fn using_constraint_becomes_using_clause() {
        let tree = lower("SELECT a FROM t1 JOIN t2 USING (id)");
        let joins = find_all(&tree, tree.root(), |k| matches!(k, NodeKind::Join(_)));
        assert!(get_clause(&tree, joins[0], ClauseKind::Using).is_some());
    }

    #[test]
    fn cross_join_maps_to_cross() {
        let tree = lower("SELECT c.name FROM t1 AS c CROSS JOIN t2 AS s");
        let joins = find_all(&tree, tree.root(), |k| matches!(k, NodeKind::Join(_)));
        assert_eq!(*tree.kind(joins[0]), NodeKind::Join(JoinKind::Cross));
    }

    #[test]
    fn windowed_call_is_wrapped_by_window_node() {
        let tree = lower(
            "SELECT ROW_NUMBER() OVER (PARTITION BY carrid ORDER BY fldate) AS rn, RANK() AS r \
             FROM sflight",
        );
        let calls = find_all(&tree, tree.root(), |k| matches!(k, NodeKind::Function(_)));
        assert_eq!(calls.len(), 2);

        let is_window = |k: &NodeKind| *k == NodeKind::Window;
        assert!(has_ancestor_matching(&tree, calls[0], is_window));
        assert!(!has_ancestor_matching(&tree, calls[1], is_window));
    }

    #[test]
    fn subquery_in_where_is_lowered_once() {
        let tree = lower(
            "SELECT a FROM t WHERE a IN (SELECT b FROM u INNER JOIN v ON u.id = v.id)",
        );
        let tables = find_all(&tree, tree.root(), |k| matches!(k, NodeKind::Table(_)));
        assert_eq!(tables.len(), 3);
        let joins = find_all(&tree, tree.root(), |k| matches!(k, NodeKind::Join(_)));
        assert_eq!(joins.len(), 1);
    }

    #[test]
    fn derived_table_becomes_nested_statement() {
        let tree = lower("SELECT x.a FROM (SELECT a FROM t) AS x");
        let nested = find_all(&tree, tree.root(), |k| {
            *k == NodeKind::Statement(StatementKind::Select)
        });
        assert_eq!(nested.len(), 1);
    }

    #[test]
    fn insert_values_land_in_source() {
        let tree = lower("INSERT INTO sbook (carrid, connid) VALUES ('AA', '0017')");
        let root = tree.root();
        assert_eq!(tree.statement_kind(), StatementKind::Insert);
        assert!(get_clause(&tree, root, ClauseKind::Target).is_some());
        assert!(get_clause(&tree, root, ClauseKind::Columns).is_some());
        let source = get_clause(&tree, root, ClauseKind::Source).unwrap();
        assert!(!find_all(&tree, source, |k| *k == NodeKind::Clause(ClauseKind::Values)).is_empty());
    }

    #[test]
    fn update_assignments_land_in_set() {
        let tree = lower("UPDATE sflight SET price = 100 WHERE carrid = 'AA'");
        let set = get_clause(&tree, tree.root(), ClauseKind::Set).unwrap();
        assert!(!tree.children(set).is_empty());
    }

    #[test]
    fn delete_from_uses_from_slot() {
        let tree = lower("DELETE FROM sbook WHERE fldate < '20200101'");
        assert!(get_clause(&tree, tree.root(), ClauseKind::From).is_some());
        assert!(get_clause(&tree, tree.root(), ClauseKind::Target).is_none());
    }

    #[test]
    fn delete_without_from_keyword_uses_target_slot() {
        let tree = lower("DELETE sbook WHERE fldate < '20200101'");
        assert!(get_clause(&tree, tree.root(), ClauseKind::Target).is_some());
    }

    #[test]
    fn host_variables_are_not_columns() {
        let tree = lower("SELECT carrid FROM sflight WHERE carrid = @lv_carrid");
        let columns = find_all(&tree, tree.root(), |k| matches!(k, NodeKind::Column(_)));
        assert_eq!(columns.len(), 2);
        assert!(columns
            .iter()
            .all(|&c| *tree.kind(c) == NodeKind::Column("carrid".into())));
    }

    #[test]
    fn parenthesized_query_fills_the_root() {
        let tree = lower("(SELECT carrid WHERE carrid = 'AA')");
        assert_eq!(tree.statement_kind(), StatementKind::Select);
        assert!(get_clause(&tree, tree.root(), ClauseKind::Projection).is_some());
        assert!(get_clause(&tree, tree.root(), ClauseKind::Where).is_some());
        assert!(get_clause(&tree, tree.root(), ClauseKind::From).is_none());
    }

    #[test]
    fn default_values_is_a_source() {
        let tree = SqlParser::new(Dialect::Aql)
            .unwrap()
            .parse("INSERT INTO sbook DEFAULT VALUES")
            .unwrap();
        let source = get_clause(&tree, tree.root(), ClauseKind::Source).unwrap();
        assert!(!tree.children(source).is_empty());
    }

    #[test]
    fn recovers_insert_without_source() {
        let tree = recover("INSERT INTO t (a, b)", Dialect::Abap).unwrap();
        assert_eq!(tree.statement_kind(), StatementKind::Insert);
        assert!(get_clause(&tree, tree.root(), ClauseKind::Source).is_none());
        let columns = get_clause(&tree, tree.root(), ClauseKind::Columns).unwrap();
        assert_eq!(tree.children(columns).len(), 2);
    }

    #[test]
    fn recovers_update_and_delete_skeletons() {
        let update = recover("UPDATE sflight WHERE carrid = 'AA'", Dialect::Abap).unwrap();
        assert_eq!(update.statement_kind(), StatementKind::Update);
        assert!(get_clause(&update, update.root(), ClauseKind::Set).is_none());
        let predicate = get_clause(&update, update.root(), ClauseKind::Where).unwrap();
        let columns = find_all(&update, predicate, |k| matches!(k, NodeKind::Column(_)));
        assert_eq!(columns.len(), 1);

        let empty_set = recover("UPDATE sflight SET", Dialect::Aql).unwrap();
        let set = get_clause(&empty_set, empty_set.root(), ClauseKind::Set).unwrap();
        assert!(empty_set.children(set).is_empty());

        let delete = recover("DELETE FROM", Dialect::Abap).unwrap();
        assert_eq!(delete.statement_kind(), StatementKind::Delete);
        assert!(get_clause(&delete, delete.root(), ClauseKind::From).is_none());
    }

    #[test]
    fn recovered_predicate_must_parse() {
        for dialect in [Dialect::Abap, Dialect::Aql] {
            assert!(recover("UPDATE t WHERE a = = 1", dialect).is_none());
            assert!(recover("UPDATE t WHERE a = 1 BOGUS TOKENS", dialect).is_none());
            assert!(recover("UPDATE t WHERE", dialect).is_none());
            assert!(recover("DELETE WHERE a = = 1", dialect).is_none());
        }
    }

    #[test]
    fn delete_forms_parse_in_both_dialects() {
        for dialect in [Dialect::Abap, Dialect::Aql] {
            let parser = SqlParser::new(dialect).unwrap();

            let bare = parser.parse("DELETE sbook WHERE fldate < '20200101'").unwrap();
            assert!(get_clause(&bare, bare.root(), ClauseKind::Target).is_some());

            let multi = parser
                .parse("DELETE t1, t2 FROM t1 INNER JOIN t2 ON t1.id = t2.id WHERE t1.a = 1")
                .unwrap();
            assert!(get_clause(&multi, multi.root(), ClauseKind::Tables).is_some());
            assert!(get_clause(&multi, multi.root(), ClauseKind::From).is_some());
        }
    }

    #[test]
    fn recovery_ignores_other_text() {
        let recovery = Recovery::new().unwrap();
        assert!(recovery.recover("SELECT FROM WHERE", Dialect::Abap).is_none());
        assert!(recovery.recover("INSERT INTO t VALUES", Dialect::Abap).is_none());
    }
}
