//! Tree renderer.
//!
//! Walks a compiled [`Tree`] and writes HTML into a string buffer.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt::Write;

use quill_parser::ast::{ArrayNode, CompareOp, Condition, IfNode, NodeId, NodeKind, Operand, Tree};
use quill_parser::{SyntaxError, Value};

use crate::context::{resolve, Context};
use crate::RenderError;

/// Render a whole tree against `context`.
pub fn render(tree: &Tree, context: &Context<'_>) -> Result<String, RenderError> {
    let mut out = String::new();
    render_node(tree, tree.root(), context, &mut out)?;
    Ok(out)
}

fn render_node(
    tree: &Tree,
    id: NodeId,
    context: &Context<'_>,
    out: &mut String,
) -> Result<(), RenderError> {
    match &tree.get(id).kind {
        NodeKind::Root => render_children(tree, tree.children(id), context, out),
        NodeKind::Text(text) => {
            out.push_str(text);
            Ok(())
        }
        NodeKind::Variable(name) => {
            let value = resolve(name, context)?;
            // Writing to a String cannot fail.
            let _ = write!(out, "{value}");
            Ok(())
        }
        NodeKind::Array(node) => render_array(tree, id, node, context, out),
        NodeKind::If(node) => {
            let branch = if evaluate_condition(node, context)? {
                &node.then_branch
            } else {
                &node.else_branch
            };
            render_children(tree, branch, context, out)
        }
        NodeKind::Else => Ok(()),
    }
}

fn render_children(
    tree: &Tree,
    children: &[NodeId],
    context: &Context<'_>,
    out: &mut String,
) -> Result<(), RenderError> {
    for &child in children {
        render_node(tree, child, context, out)?;
    }
    Ok(())
}

/// Render the loop body once per element, in sequence order.
fn render_array(
    tree: &Tree,
    id: NodeId,
    node: &ArrayNode,
    context: &Context<'_>,
    out: &mut String,
) -> Result<(), RenderError> {
    let collection = evaluate(&node.items, context)?;
    let items = collection
        .iterate()
        .ok_or_else(|| RenderError::NotIterable {
            expression: operand_source(&node.items),
            found: collection.type_name().to_string(),
        })?;

    for item in &items {
        let scope = context.with_item(item);
        render_children(tree, tree.children(id), &scope, out)?;
    }
    Ok(())
}

/// Resolve an operand: literals as written, names through the context.
pub fn evaluate<'a>(
    operand: &'a Operand,
    context: &Context<'a>,
) -> Result<Cow<'a, Value>, RenderError> {
    match operand {
        Operand::Literal(value) => Ok(Cow::Borrowed(value)),
        Operand::Name(name) => resolve(name, context),
    }
}

/// Decide which branch of an `if` renders.
pub fn evaluate_condition(node: &IfNode, context: &Context<'_>) -> Result<bool, RenderError> {
    match &node.condition {
        Condition::Truthy(operand) => Ok(evaluate(operand, context)?.is_truthy()),
        Condition::Compare { lhs, op, rhs } => {
            let op = CompareOp::from_symbol(op).ok_or_else(|| {
                SyntaxError::at(&node.header, format!("Unknown comparison operator '{op}'"))
            })?;
            let lhs = evaluate(lhs, context)?;
            let rhs = evaluate(rhs, context)?;
            compare(&lhs, op, &rhs)
        }
    }
}

/// Apply a comparison operator.
///
/// Equality never fails; ordering fails for values without a natural order.
pub fn compare(lhs: &Value, op: CompareOp, rhs: &Value) -> Result<bool, RenderError> {
    let ordered = |test: fn(Ordering) -> bool| {
        lhs.ordering(rhs)
            .map(test)
            .ok_or_else(|| RenderError::Incomparable {
                lhs: lhs.type_name().to_string(),
                op: op.symbol().to_string(),
                rhs: rhs.type_name().to_string(),
            })
    };

    match op {
        CompareOp::Eq => Ok(lhs == rhs),
        CompareOp::Neq => Ok(lhs != rhs),
        CompareOp::Lt => ordered(Ordering::is_lt),
        CompareOp::Gt => ordered(Ordering::is_gt),
        CompareOp::Lte => ordered(Ordering::is_le),
        CompareOp::Gte => ordered(Ordering::is_ge),
    }
}

fn operand_source(operand: &Operand) -> String {
    match operand {
        Operand::Literal(value) => value.to_string(),
        Operand::Name(name) => name.clone(),
    }
}
