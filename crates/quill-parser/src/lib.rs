//! Quill Parser
//!
//! Compiles a fragment stream into a node tree.
//! Includes the dynamic [`Value`] model shared with the renderer and the
//! literal parser used for `if`/`array` header tokens.
//!
//! ```text
//! source → Scanner::tokenize → Compiler::build → Tree
//! ```

pub mod ast;
pub mod compiler;
pub mod literal;
pub mod value;

pub use ast::{Condition, NodeId, NodeKind, Operand, Tree};
pub use compiler::Compiler;
pub use value::Value;

use quill_lexer::{Fragment, Span};

/// Malformed template syntax, with the offending fragment and its position.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Syntax error at line {line}, column {column}: {message} in `{fragment}`")]
pub struct SyntaxError {
    pub message: String,
    pub fragment: String,
    pub line: usize,
    pub column: usize,
}

impl SyntaxError {
    /// An error pointing at `fragment`.
    pub fn at(fragment: &Fragment, message: impl Into<String>) -> Self {
        Self::spanned(&fragment.raw, fragment.span, message)
    }

    /// An error pointing at any marker text located by `span`.
    pub fn spanned(raw: &str, span: Span, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            fragment: raw.to_string(),
            line: span.line,
            column: span.column,
        }
    }
}
