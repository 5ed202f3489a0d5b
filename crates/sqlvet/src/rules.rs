//! Semantic rules and advisory checks.
//!
//! Each rule is an independent function of the tree. [`run_rules`] runs all
//! of them in table order and concatenates their errors; no rule short
//! circuits another, so several defects in one statement are all reported.
//!
//! Rules only use the classifier primitives from [`crate::tree`] and never
//! see backend parser types.

use crate::config::WarningsConfig;
use crate::dialect::DialectFeatures;
use crate::tree::{
    ClauseKind, JoinKind, NodeId, NodeKind, StatementKind, SyntaxTree, classify, find_all,
    get_clause, has_ancestor_matching,
};

/// A semantic rule: returns zero or more error messages.
pub type Rule = fn(&SyntaxTree) -> Vec<String>;

/// Every rule, in evaluation order.
pub const RULES: &[(&str, Rule)] = &[
    ("missing-from", missing_from),
    ("join-without-on", join_without_on),
    ("window-without-over", window_without_over),
    ("insert-without-source", insert_without_source),
    ("update-without-set", update_without_set),
    ("delete-without-target", delete_without_target),
];

/// Join kinds that never take a predicate.
pub const PREDICATE_FREE_JOINS: &[JoinKind] = &[JoinKind::Cross];

/// Functions that are only meaningful with an `OVER` specification.
///
/// Aggregates such as `COUNT` or `SUM` are deliberately absent: they are
/// valid with or without `OVER`.
pub const WINDOW_ONLY_FUNCTIONS: &[&str] = &[
    "ROW_NUMBER",
    "RANK",
    "DENSE_RANK",
    "PERCENT_RANK",
    "CUME_DIST",
    "NTILE",
    "LAG",
    "LEAD",
    "FIRST_VALUE",
    "LAST_VALUE",
    "NTH_VALUE",
];

/// Clause slots any one of which names the target of a DELETE.
pub const DELETE_TARGET_SLOTS: &[ClauseKind] =
    &[ClauseKind::Target, ClauseKind::From, ClauseKind::Tables];

/// Join children that count as an explicit join predicate.
const JOIN_PREDICATES: &[ClauseKind] = &[ClauseKind::On, ClauseKind::Using, ClauseKind::Natural];

pub const SELECT_STAR_WARNING: &str = "Using SELECT * is discouraged. Specify explicit columns.";
pub const UNBOUNDED_SELECT_WARNING: &str =
    "Consider adding WHERE clause or LIMIT to restrict result set.";
pub const SINGLE_WITHOUT_WHERE_WARNING: &str =
    "SELECT SINGLE should have a WHERE clause with key fields.";

/// Runs every rule in [`RULES`] order.
pub fn run_rules(tree: &SyntaxTree) -> Vec<String> {
    RULES.iter().flat_map(|(_, rule)| rule(tree)).collect()
}

fn has_nonempty_clause(tree: &SyntaxTree, node: NodeId, clause: ClauseKind) -> bool {
    get_clause(tree, node, clause).is_some_and(|id| !tree.children(id).is_empty())
}

/// A SELECT must read from something.
pub fn missing_from(tree: &SyntaxTree) -> Vec<String> {
    let root = tree.root();
    if classify(tree, root) == StatementKind::Select
        && get_clause(tree, root, ClauseKind::From).is_none()
    {
        vec!["Missing FROM clause in SELECT statement".to_string()]
    } else {
        Vec::new()
    }
}

/// Every join except the predicate-free kinds needs ON, USING or NATURAL.
pub fn join_without_on(tree: &SyntaxTree) -> Vec<String> {
    find_all(tree, tree.root(), |kind| matches!(kind, NodeKind::Join(_)))
        .into_iter()
        .filter_map(|join| {
            let NodeKind::Join(kind) = *tree.kind(join) else {
                return None;
            };
            if PREDICATE_FREE_JOINS.contains(&kind) {
                return None;
            }
            if JOIN_PREDICATES
                .iter()
                .any(|&clause| get_clause(tree, join, clause).is_some())
            {
                return None;
            }
            Some(match kind.keyword() {
                "" => "JOIN requires ON condition".to_string(),
                keyword => format!("{keyword} JOIN requires ON condition"),
            })
        })
        .collect()
}

/// Window-only functions must sit under a window specification.
pub fn window_without_over(tree: &SyntaxTree) -> Vec<String> {
    find_all(tree, tree.root(), |kind| matches!(kind, NodeKind::Function(_)))
        .into_iter()
        .filter_map(|call| {
            let NodeKind::Function(name) = tree.kind(call) else {
                return None;
            };
            let name = name.to_ascii_uppercase();
            if !WINDOW_ONLY_FUNCTIONS.contains(&name.as_str()) {
                return None;
            }
            if has_ancestor_matching(tree, call, |kind| *kind == NodeKind::Window) {
                return None;
            }
            Some(format!("Window function {name}() requires OVER clause"))
        })
        .collect()
}

pub fn insert_without_source(tree: &SyntaxTree) -> Vec<String> {
    let root = tree.root();
    if classify(tree, root) == StatementKind::Insert
        && !has_nonempty_clause(tree, root, ClauseKind::Source)
    {
        vec!["INSERT statement requires VALUES clause or SELECT query".to_string()]
    } else {
        Vec::new()
    }
}

/// An UPDATE needs at least one assignment.
pub fn update_without_set(tree: &SyntaxTree) -> Vec<String> {
    let root = tree.root();
    if classify(tree, root) == StatementKind::Update
        && !has_nonempty_clause(tree, root, ClauseKind::Set)
    {
        vec!["UPDATE statement requires SET clause".to_string()]
    } else {
        Vec::new()
    }
}

/// A DELETE names its target through any one of [`DELETE_TARGET_SLOTS`].
pub fn delete_without_target(tree: &SyntaxTree) -> Vec<String> {
    let root = tree.root();
    if classify(tree, root) != StatementKind::Delete {
        return Vec::new();
    }
    let has_target = DELETE_TARGET_SLOTS
        .iter()
        .any(|&slot| has_nonempty_clause(tree, root, slot));
    if has_target {
        Vec::new()
    } else {
        vec!["DELETE statement requires target table".to_string()]
    }
}

/// Advisory checks. Never affect validity.
pub fn warnings(
    tree: &SyntaxTree,
    features: &DialectFeatures,
    config: &WarningsConfig,
) -> Vec<String> {
    let root = tree.root();
    if classify(tree, root) != StatementKind::Select {
        return Vec::new();
    }

    let mut found = Vec::new();

    if config.select_star {
        let projected_star = find_all(tree, root, |kind| *kind == NodeKind::Wildcard)
            .into_iter()
            .any(|star| {
                tree.parent(star)
                    .is_some_and(|p| *tree.kind(p) == NodeKind::Clause(ClauseKind::Projection))
            });
        if projected_star {
            found.push(SELECT_STAR_WARNING.to_string());
        }
    }

    let has_where = get_clause(tree, root, ClauseKind::Where).is_some();

    if config.single_without_where && features.single && !has_where {
        found.push(SINGLE_WITHOUT_WHERE_WARNING.to_string());
    }

    if config.unbounded_select
        && !has_where
        && get_clause(tree, root, ClauseKind::Limit).is_none()
        && features.up_to_rows.is_none()
    {
        found.push(UNBOUNDED_SELECT_WARNING.to_string());
    }

    found
}
