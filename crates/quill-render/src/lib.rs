//! Quill Renderer
//!
//! Renders a compiled node tree against a context value. Also owns the
//! dotted-name resolver used by variables, loops and conditionals.
//!
//! ```text
//! Tree + Value → render() → String
//! ```
//!
//! ```
//! use quill_parser::Value;
//!
//! let data: Value = [("items", Value::from(vec!["a", "b", "c"]))].into_iter().collect();
//! let html = quill_render::render("{% array items %}{{ item }},{% endarray %}", &data).unwrap();
//! assert_eq!(html, "a,b,c,");
//! ```

pub mod context;
pub mod render;

pub use context::{resolve, Context};

use quill_parser::{Compiler, SyntaxError, Tree, Value};

/// Rendering error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RenderError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// A name that cannot be resolved. Not produced by the resolver today:
    /// unresolvable names render empty.
    #[error("Cannot resolve '{name}'")]
    Context { name: String },

    #[error("Cannot compare {lhs} {op} {rhs}")]
    Incomparable { lhs: String, op: String, rhs: String },

    #[error("Cannot loop over '{expression}': {found} is not iterable")]
    NotIterable { expression: String, found: String },
}

/// A compiled template, ready to render any number of times.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    tree: Tree,
}

impl Template {
    /// Compile template source.
    pub fn new(source: &str) -> Result<Self, SyntaxError> {
        Ok(Self::from_tree(Compiler::compile(source)?))
    }

    pub fn from_tree(tree: Tree) -> Self {
        Self { tree }
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Render against `data`. Rendering does not mutate the template.
    pub fn render(&self, data: &Value) -> Result<String, RenderError> {
        let html = render::render(&self.tree, &Context::new(data))?;
        log::debug!("rendered {} nodes into {} bytes", self.tree.len(), html.len());
        Ok(html)
    }
}

/// Compile and render `source` in one step.
pub fn render(source: &str, data: &Value) -> Result<String, RenderError> {
    Template::new(source)?.render(data)
}
