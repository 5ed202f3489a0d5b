//! Read-only statement tree and the classifier primitives over it.
//!
//! The tree is the only shape the rules ever see. Whatever the parser backend
//! produces is lowered into this closed vocabulary by [`crate::lower`], so the
//! rules never depend on backend node types.
//!
//! Nodes live in an arena indexed by [`NodeId`]. The root is always at index 0
//! and a parent is always pushed before its children, so walking up through
//! `parent` links terminates at the root.

use std::fmt;

use serde::Serialize;

// ============================================================================
// Vocabulary
// ============================================================================

/// Kind of a statement node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
    Other,
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatementKind::Select => "SELECT",
            StatementKind::Insert => "INSERT",
            StatementKind::Update => "UPDATE",
            StatementKind::Delete => "DELETE",
            StatementKind::Other => "OTHER",
        };
        f.write_str(name)
    }
}

/// Named sub-clause of a statement or join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ClauseKind {
    /// SELECT list.
    Projection,
    From,
    Where,
    GroupBy,
    Having,
    Qualify,
    OrderBy,
    Limit,
    Offset,
    With,
    /// Row constructor list (`VALUES (...), (...)`).
    Values,
    /// Value source of an INSERT (VALUES list or nested query).
    Source,
    /// Column list of an INSERT.
    Columns,
    /// Assignment list of an UPDATE.
    Set,
    /// Explicit target table (`UPDATE t`, `INSERT INTO t`, `DELETE t`).
    Target,
    /// Multi-table target list of a DELETE.
    Tables,
    /// `USING` list of a DELETE, or `USING (cols)` of a join.
    Using,
    /// `ON` predicate of a join.
    On,
    /// Marker child of a NATURAL join.
    Natural,
    Returning,
}

/// Join flavor as written in the statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
    Cross,
    Semi,
    Anti,
    AsOf,
    /// Plain `JOIN` where the backend does not say which kind it is.
    Unspecified,
}

impl JoinKind {
    /// Upper-case keyword used in messages, empty for [`JoinKind::Unspecified`].
    pub fn keyword(self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER",
            JoinKind::Left => "LEFT",
            JoinKind::Right => "RIGHT",
            JoinKind::Full => "FULL",
            JoinKind::Cross => "CROSS",
            JoinKind::Semi => "SEMI",
            JoinKind::Anti => "ANTI",
            JoinKind::AsOf => "ASOF",
            JoinKind::Unspecified => "",
        }
    }
}

/// What a node is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum NodeKind {
    /// A statement, or a nested query body (subquery, CTE, INSERT source).
    Statement(StatementKind),
    Clause(ClauseKind),
    Join(JoinKind),
    /// UNION / INTERSECT / EXCEPT, with both sides as children.
    SetOperation(String),
    Table(String),
    Column(String),
    Wildcard,
    Function(String),
    /// `OVER (...)` wrapper around a function call.
    Window,
    Operator(String),
    Literal(String),
    /// Any expression without a more specific kind.
    Expression,
}

/// Index of a node in its [`SyntaxTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(usize);

impl NodeId {
    /// The root of every tree.
    pub const ROOT: NodeId = NodeId(0);
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

// ============================================================================
// Tree
// ============================================================================

/// Immutable statement tree produced for one validation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyntaxTree {
    nodes: Vec<Node>,
}

impl SyntaxTree {
    /// Returns the root node id.
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Returns the node for `id`.
    ///
    /// Ids are only handed out by the tree itself, so every id is in range.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Kind of the root statement.
    pub fn statement_kind(&self) -> StatementKind {
        classify(self, self.root())
    }
}

/// Builds a [`SyntaxTree`] top-down.
///
/// Each `push` returns the id of the new node so callers can hang children
/// off it. Nodes are only ever appended, which keeps parents ahead of their
/// children in the arena.
#[derive(Debug)]
pub struct TreeBuilder {
    nodes: Vec<Node>,
}

impl TreeBuilder {
    /// Starts a tree whose root has the given kind.
    pub fn new(root: NodeKind) -> Self {
        Self {
            nodes: vec![Node {
                kind: root,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Appends a node under `parent` and returns its id.
    pub fn push(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Appends a clause node under `parent`.
    pub fn clause(&mut self, parent: NodeId, clause: ClauseKind) -> NodeId {
        self.push(parent, NodeKind::Clause(clause))
    }

    pub fn build(self) -> SyntaxTree {
        SyntaxTree { nodes: self.nodes }
    }
}

// ============================================================================
// Classifier
// ============================================================================

/// Returns the statement kind of `node`, or `Other` for non-statement nodes.
pub fn classify(tree: &SyntaxTree, node: NodeId) -> StatementKind {
    match tree.kind(node) {
        NodeKind::Statement(kind) => *kind,
        _ => StatementKind::Other,
    }
}

/// Returns the direct child clause of `node` with the given kind, if any.
pub fn get_clause(tree: &SyntaxTree, node: NodeId, clause: ClauseKind) -> Option<NodeId> {
    tree.children(node)
        .iter()
        .copied()
        .find(|&child| *tree.kind(child) == NodeKind::Clause(clause))
}

/// Returns every strict descendant of `node` that matches `predicate`, in
/// pre-order.
pub fn find_all<P>(tree: &SyntaxTree, node: NodeId, mut predicate: P) -> Vec<NodeId>
where
    P: FnMut(&NodeKind) -> bool,
{
    let mut found = Vec::new();
    let mut stack: Vec<NodeId> = tree.children(node).iter().rev().copied().collect();

    while let Some(id) = stack.pop() {
        if predicate(tree.kind(id)) {
            found.push(id);
        }
        stack.extend(tree.children(id).iter().rev().copied());
    }

    found
}

/// Returns true if any strict ancestor of `node` matches `predicate`.
pub fn has_ancestor_matching<P>(tree: &SyntaxTree, node: NodeId, mut predicate: P) -> bool
where
    P: FnMut(&NodeKind) -> bool,
{
    let mut current = tree.parent(node);
    while let Some(id) = current {
        if predicate(tree.kind(id)) {
            return true;
        }
        current = tree.parent(id);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    /// SELECT with a windowed and an unwindowed function call.
    fn sample() -> (SyntaxTree, NodeId, NodeId) {
        let mut b = TreeBuilder::new(NodeKind::Statement(StatementKind::Select));
        let root = b.root();
        let projection = b.clause(root, ClauseKind::Projection);
        let window = b.push(projection, NodeKind::Window);
        let windowed = b.push(window, NodeKind::Function("RANK".into()));
        let bare = b.push(projection, NodeKind::Function("RANK".into()));
        let from = b.clause(root, ClauseKind::From);
        b.push(from, NodeKind::Table("sflight".into()));
        (b.build(), windowed, bare)
    }

    #[test]
    fn classify_root_and_non_statement() {
        let (tree, windowed, _) = sample();
        assert_eq!(classify(&tree, tree.root()), StatementKind::Select);
        assert_eq!(classify(&tree, windowed), StatementKind::Other);
    }

    #[test]
    fn get_clause_only_looks_at_direct_children() {
        let (tree, _, _) = sample();
        assert!(get_clause(&tree, tree.root(), ClauseKind::From).is_some());
        assert!(get_clause(&tree, tree.root(), ClauseKind::Where).is_none());

        let projection = get_clause(&tree, tree.root(), ClauseKind::Projection).unwrap();
        assert!(get_clause(&tree, projection, ClauseKind::From).is_none());
    }

    #[test]
    fn find_all_is_pre_order() {
        let (tree, windowed, bare) = sample();
        let found = find_all(&tree, tree.root(), |k| matches!(k, NodeKind::Function(_)));
        assert_eq!(found, vec![windowed, bare]);
    }

    #[test]
    fn find_all_excludes_the_start_node() {
        let (tree, _, _) = sample();
        let found = find_all(&tree, tree.root(), |k| matches!(k, NodeKind::Statement(_)));
        assert!(found.is_empty());
    }

    #[test]
    fn ancestor_walk_finds_window_wrapper() {
        let (tree, windowed, bare) = sample();
        let is_window = |k: &NodeKind| *k == NodeKind::Window;
        assert!(has_ancestor_matching(&tree, windowed, is_window));
        assert!(!has_ancestor_matching(&tree, bare, is_window));
    }

    #[test]
    fn ancestor_walk_is_strict() {
        let (tree, _, _) = sample();
        let window = find_all(&tree, tree.root(), |k| *k == NodeKind::Window)[0];
        assert!(!has_ancestor_matching(&tree, window, |k| *k == NodeKind::Window));
        assert!(!has_ancestor_matching(&tree, tree.root(), |_| true));
    }

    #[test]
    fn join_keyword_for_unspecified_is_empty() {
        assert_eq!(JoinKind::Inner.keyword(), "INNER");
        assert_eq!(JoinKind::Unspecified.keyword(), "");
    }
}
