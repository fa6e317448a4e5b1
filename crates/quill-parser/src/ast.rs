//! Node tree for compiled templates.
//!
//! Nodes live in an arena owned by [`Tree`] and refer to their children by
//! [`NodeId`]. Every node except the root has exactly one parent, and the
//! tree is not modified after compilation.

use quill_lexer::Fragment;

use crate::value::Value;

/// Index of a node inside its [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A compiled template.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// A tree holding only the root node.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeKind::Root)],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Append a new node as the last child of `parent`.
    pub fn push(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(kind));
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Called when the compiler pushes `id` onto its scope stack.
    pub(crate) fn enter_scope(&mut self, id: NodeId) {
        log::trace!("enter scope {}", id.0);
    }

    /// Called when the scope opened by `id` closes.
    ///
    /// An `if` partitions its children at `else` markers.
    pub(crate) fn exit_scope(&mut self, id: NodeId) {
        let (then_branch, else_branch) = self.split_branches(id);
        if let NodeKind::If(node) = &mut self.nodes[id.0].kind {
            node.then_branch = then_branch;
            node.else_branch = else_branch;
        }
    }

    /// Children before the first `else` and children after it, with every
    /// `else` marker excluded.
    fn split_branches(&self, id: NodeId) -> (Vec<NodeId>, Vec<NodeId>) {
        let mut then_branch = Vec::new();
        let mut else_branch = Vec::new();
        let mut in_else = false;
        for &child in self.children(id) {
            if matches!(self.get(child).kind, NodeKind::Else) {
                in_else = true;
                continue;
            }
            if in_else {
                else_branch.push(child);
            } else {
                then_branch.push(child);
            }
        }
        (then_branch, else_branch)
    }
}

/// A tree element. Children are owned through the arena.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub children: Vec<NodeId>,
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
        }
    }
}

/// Node variants.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Root,
    /// Literal template text, rendered unchanged.
    Text(String),
    /// `{{ dotted.name }}`
    Variable(String),
    /// `{% array <expr> %}`
    Array(ArrayNode),
    /// `{% if <expr> [<op> <expr>] %}`
    If(IfNode),
    /// `{% else %}`, a partition marker that renders nothing.
    Else,
}

impl NodeKind {
    /// Whether subsequent nodes nest inside this one until a close marker.
    pub fn creates_scope(&self) -> bool {
        matches!(self, NodeKind::Array(_) | NodeKind::If(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayNode {
    pub items: Operand,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfNode {
    /// The `{% if ... %}` marker, kept for render-time diagnostics.
    pub header: Fragment,
    pub condition: Condition,
    pub then_branch: Vec<NodeId>,
    pub else_branch: Vec<NodeId>,
}

/// The test of an `if` header.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `if x`
    Truthy(Operand),
    /// `if a <op> b`. The operator is checked when the node renders.
    Compare {
        lhs: Operand,
        op: String,
        rhs: Operand,
    },
}

/// A header token: a literal value or a context name.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Literal(Value),
    Name(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Lt,
    Gt,
    Eq,
    Neq,
    Lte,
    Gte,
}

impl CompareOp {
    /// Look up an operator by its symbol.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "<" => Some(CompareOp::Lt),
            ">" => Some(CompareOp::Gt),
            "==" => Some(CompareOp::Eq),
            "!=" => Some(CompareOp::Neq),
            "<=" => Some(CompareOp::Lte),
            ">=" => Some(CompareOp::Gte),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Lt => "<",
            CompareOp::Gt => ">",
            CompareOp::Eq => "==",
            CompareOp::Neq => "!=",
            CompareOp::Lte => "<=",
            CompareOp::Gte => ">=",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quill_lexer::Span;

    fn if_node() -> NodeKind {
        NodeKind::If(IfNode {
            header: Fragment::new("{% if x %}", Span::default()),
            condition: Condition::Truthy(Operand::Name("x".into())),
            then_branch: Vec::new(),
            else_branch: Vec::new(),
        })
    }

    #[test]
    fn test_new_tree_has_root() {
        let tree = Tree::new();
        assert_eq!(tree.len(), 1);
        assert!(tree.is_empty());
        assert_eq!(tree.get(tree.root()).kind, NodeKind::Root);
    }

    #[test]
    fn test_push_appends_children_in_order() {
        let mut tree = Tree::new();
        let a = tree.push(tree.root(), NodeKind::Text("a".into()));
        let b = tree.push(tree.root(), NodeKind::Text("b".into()));
        assert_eq!(tree.children(tree.root()), &[a, b]);
        assert!(tree.children(a).is_empty());
    }

    #[test]
    fn test_exit_scope_splits_if_branches() {
        let mut tree = Tree::new();
        let node = tree.push(tree.root(), if_node());
        let yes = tree.push(node, NodeKind::Text("yes".into()));
        tree.push(node, NodeKind::Else);
        let no = tree.push(node, NodeKind::Text("no".into()));
        tree.exit_scope(node);

        match &tree.get(node).kind {
            NodeKind::If(n) => {
                assert_eq!(n.then_branch, vec![yes]);
                assert_eq!(n.else_branch, vec![no]);
            }
            other => panic!("Expected If, got {other:?}"),
        }
        // Ownership is unchanged; the branches only index into children.
        assert_eq!(tree.children(node).len(), 3);
    }

    #[test]
    fn test_exit_scope_without_else() {
        let mut tree = Tree::new();
        let node = tree.push(tree.root(), if_node());
        let a = tree.push(node, NodeKind::Text("a".into()));
        tree.exit_scope(node);

        match &tree.get(node).kind {
            NodeKind::If(n) => {
                assert_eq!(n.then_branch, vec![a]);
                assert!(n.else_branch.is_empty());
            }
            other => panic!("Expected If, got {other:?}"),
        }
    }

    #[test]
    fn test_creates_scope() {
        assert!(if_node().creates_scope());
        assert!(NodeKind::Array(ArrayNode {
            items: Operand::Name("xs".into())
        })
        .creates_scope());
        assert!(!NodeKind::Else.creates_scope());
        assert!(!NodeKind::Text(String::new()).creates_scope());
    }

    #[test]
    fn test_compare_op_symbols() {
        for symbol in ["<", ">", "==", "!=", "<=", ">="] {
            assert_eq!(CompareOp::from_symbol(symbol).map(CompareOp::symbol), Some(symbol));
        }
        assert_eq!(CompareOp::from_symbol("=<"), None);
    }
}
