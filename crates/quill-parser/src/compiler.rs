//! Node tree compiler.
//!
//! Consumes the fragment stream from `quill-lexer` and builds a [`Tree`].
//! A stack of open scopes decides where each new node is attached: nodes go
//! into the innermost open `array`/`if`, and a close marker pops it.

use quill_lexer::{Fragment, FragmentKind, Scanner};

use crate::ast::{ArrayNode, Condition, IfNode, NodeId, NodeKind, Tree};
use crate::literal::{eval_expression, parse_literal};
use crate::SyntaxError;

type NodeBuilder = fn(&Fragment) -> Result<NodeKind, SyntaxError>;

/// Block keywords and the node each one builds.
const BLOCK_KEYWORDS: &[(&str, NodeBuilder)] = &[
    ("array", build_array),
    ("if", build_if),
    ("else", build_else),
];

/// Quill template compiler.
pub struct Compiler {
    fragments: Vec<Fragment>,
}

impl Compiler {
    /// Create a compiler for an already scanned fragment stream.
    pub fn new(fragments: Vec<Fragment>) -> Self {
        Self { fragments }
    }

    /// Scan and compile template source.
    pub fn compile(source: &str) -> Result<Tree, SyntaxError> {
        Compiler::new(Scanner::tokenize(source)).build()
    }

    /// Build the tree.
    ///
    /// Blocks still open at the end of the stream are closed implicitly.
    pub fn build(self) -> Result<Tree, SyntaxError> {
        let mut tree = Tree::new();
        let mut scopes: Vec<NodeId> = vec![tree.root()];

        for fragment in &self.fragments {
            let parent = scopes.last().copied().unwrap_or_else(|| tree.root());

            if fragment.kind == FragmentKind::CloseBlock {
                if scopes.len() == 1 {
                    return Err(SyntaxError::at(fragment, "Unmatched close marker"));
                }
                tree.exit_scope(parent);
                scopes.pop();
                continue;
            }

            let kind = create_node(fragment)?;
            let creates_scope = kind.creates_scope();
            let id = tree.push(parent, kind);
            if creates_scope {
                scopes.push(id);
                tree.enter_scope(id);
            }
        }

        if scopes.len() > 1 {
            log::warn!(
                "{} block(s) left open at end of template",
                scopes.len() - 1
            );
            while scopes.len() > 1 {
                if let Some(id) = scopes.pop() {
                    tree.exit_scope(id);
                }
            }
        }

        Ok(tree)
    }
}

/// Build the node for a non-close fragment.
fn create_node(fragment: &Fragment) -> Result<NodeKind, SyntaxError> {
    match fragment.kind {
        FragmentKind::Text => Ok(NodeKind::Text(fragment.raw.clone())),
        FragmentKind::Variable => Ok(NodeKind::Variable(fragment.clean.clone())),
        FragmentKind::OpenBlock => {
            let keyword = fragment.keyword().unwrap_or_default();
            let builder = BLOCK_KEYWORDS
                .iter()
                .find(|(name, _)| *name == keyword)
                .map(|(_, builder)| builder)
                .ok_or_else(|| {
                    SyntaxError::at(fragment, format!("Unknown block keyword '{keyword}'"))
                })?;
            builder(fragment)
        }
        FragmentKind::CloseBlock => Err(SyntaxError::at(fragment, "Unexpected close marker")),
    }
}

/// `array <expr>`: exactly one expression after the keyword. The expression
/// may contain spaces only when it is a literal (`array [1, 2]`).
fn build_array(fragment: &Fragment) -> Result<NodeKind, SyntaxError> {
    let expr = fragment
        .clean
        .split_once(char::is_whitespace)
        .map(|(_, rest)| rest.trim())
        .unwrap_or_default();

    if expr.is_empty() {
        return Err(SyntaxError::at(fragment, "Expected 'array <expression>'"));
    }
    if expr.contains(char::is_whitespace) && parse_literal(expr).is_err() {
        return Err(SyntaxError::at(
            fragment,
            "Expected a single expression after 'array'",
        ));
    }

    Ok(NodeKind::Array(ArrayNode {
        items: eval_expression(expr),
    }))
}

/// `if <lhs>` or `if <lhs> <op> <rhs>`.
fn build_if(fragment: &Fragment) -> Result<NodeKind, SyntaxError> {
    let words = fragment.words();
    let condition = match words[1..] {
        [lhs] => Condition::Truthy(eval_expression(lhs)),
        [lhs, op, rhs] => Condition::Compare {
            lhs: eval_expression(lhs),
            op: op.to_string(),
            rhs: eval_expression(rhs),
        },
        _ => {
            return Err(SyntaxError::at(
                fragment,
                "Expected 'if <expr>' or 'if <expr> <op> <expr>'",
            ))
        }
    };

    Ok(NodeKind::If(IfNode {
        header: fragment.clone(),
        condition,
        then_branch: Vec::new(),
        else_branch: Vec::new(),
    }))
}

fn build_else(_fragment: &Fragment) -> Result<NodeKind, SyntaxError> {
    Ok(NodeKind::Else)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Operand;
    use crate::Value;
    use pretty_assertions::assert_eq;

    fn compile(source: &str) -> Tree {
        Compiler::compile(source).unwrap()
    }

    fn compile_err(source: &str) -> SyntaxError {
        Compiler::compile(source).unwrap_err()
    }

    fn kinds(tree: &Tree, id: NodeId) -> Vec<NodeKind> {
        tree.children(id)
            .iter()
            .map(|&child| tree.get(child).kind.clone())
            .collect()
    }

    fn first_child(tree: &Tree) -> NodeId {
        tree.children(tree.root())[0]
    }

    fn if_parts(tree: &Tree, id: NodeId) -> &IfNode {
        match &tree.get(id).kind {
            NodeKind::If(node) => node,
            other => panic!("Expected If, got {other:?}"),
        }
    }

    // =========================================================================
    // Flat templates
    // =========================================================================

    #[test]
    fn test_empty_template() {
        assert!(compile("").is_empty());
    }

    #[test]
    fn test_text_and_variables() {
        let tree = compile("Hello, {{ user.name }}!");
        assert_eq!(
            kinds(&tree, tree.root()),
            vec![
                NodeKind::Text("Hello, ".into()),
                NodeKind::Variable("user.name".into()),
                NodeKind::Text("!".into()),
            ]
        );
    }

    #[test]
    fn test_text_is_verbatim() {
        let tree = compile("  <p>\n  </p>  ");
        assert_eq!(
            kinds(&tree, tree.root()),
            vec![NodeKind::Text("  <p>\n  </p>  ".into())]
        );
    }

    // =========================================================================
    // Scopes
    // =========================================================================

    #[test]
    fn test_array_nests_body() {
        let tree = compile("{% array items %}{{ item }},{% endarray %}tail");
        let root_kinds = kinds(&tree, tree.root());
        assert_eq!(root_kinds.len(), 2);
        assert_eq!(
            root_kinds[0],
            NodeKind::Array(ArrayNode {
                items: Operand::Name("items".into())
            })
        );
        assert_eq!(
            kinds(&tree, first_child(&tree)),
            vec![
                NodeKind::Variable("item".into()),
                NodeKind::Text(",".into())
            ]
        );
    }

    #[test]
    fn test_array_literal_with_spaces() {
        let tree = compile("{% array [1, 2, 3] %}{% endarray %}");
        assert_eq!(
            tree.get(first_child(&tree)).kind,
            NodeKind::Array(ArrayNode {
                items: Operand::Literal(Value::from(vec![1, 2, 3]))
            })
        );
    }

    #[test]
    fn test_nested_scopes() {
        let tree = compile("{% array rows %}{% if item %}x{% endif %}{% endarray %}");
        let array = first_child(&tree);
        let if_id = tree.children(array)[0];
        assert_eq!(kinds(&tree, if_id), vec![NodeKind::Text("x".into())]);
    }

    #[test]
    fn test_if_else_split() {
        let tree = compile("{% if x > 5 %}big{% else %}small{% endif %}");
        let id = first_child(&tree);
        let node = if_parts(&tree, id);
        assert_eq!(
            node.condition,
            Condition::Compare {
                lhs: Operand::Name("x".into()),
                op: ">".into(),
                rhs: Operand::Literal(Value::Int(5)),
            }
        );
        assert_eq!(node.then_branch.len(), 1);
        assert_eq!(node.else_branch.len(), 1);
        assert_eq!(
            tree.get(node.else_branch[0]).kind,
            NodeKind::Text("small".into())
        );
    }

    #[test]
    fn test_unknown_operator_is_accepted_at_compile_time() {
        let tree = compile("{% if a <> b %}{% endif %}");
        let node = if_parts(&tree, first_child(&tree));
        assert!(matches!(&node.condition, Condition::Compare { op, .. } if op == "<>"));
    }

    #[test]
    fn test_unclosed_block_is_closed_implicitly() {
        let tree = compile("{% if a %}yes{% else %}no");
        let node = if_parts(&tree, first_child(&tree));
        assert_eq!(node.then_branch.len(), 1);
        assert_eq!(node.else_branch.len(), 1);
    }

    #[test]
    fn test_else_outside_if_is_inert() {
        let tree = compile("a{% else %}b");
        assert_eq!(
            kinds(&tree, tree.root()),
            vec![
                NodeKind::Text("a".into()),
                NodeKind::Else,
                NodeKind::Text("b".into())
            ]
        );
    }

    // =========================================================================
    // Syntax errors
    // =========================================================================

    #[test]
    fn test_unmatched_close() {
        let err = compile_err("text {% endif %}");
        assert_eq!(err.fragment, "{% endif %}");
        assert_eq!(err.line, 1);
        assert_eq!(err.column, 6);
    }

    #[test]
    fn test_extra_close_after_balanced_block() {
        let err = compile_err("{% if a %}{% endif %}\n{% endif %}");
        assert_eq!(err.line, 2);
    }

    #[test]
    fn test_unknown_keyword() {
        let err = compile_err("{% for x in xs %}");
        assert!(err.message.contains("'for'"));
        assert_eq!(err.fragment, "{% for x in xs %}");
    }

    #[test]
    fn test_empty_block_marker() {
        assert!(compile_err("{% %}").message.contains("Unknown block keyword"));
    }

    #[test]
    fn test_array_arity() {
        compile_err("{% array %}");
        compile_err("{% array a b %}");
    }

    #[test]
    fn test_if_arity() {
        compile_err("{% if %}");
        compile_err("{% if a b %}");
        compile_err("{% if a == b c %}");
    }
}
