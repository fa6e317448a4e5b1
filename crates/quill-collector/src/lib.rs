//! Quill Collector
//!
//! Preprocesses a page before compilation: resolves `{! "parent" !}`
//! inheritance with `{? name ?}...{? endblock ?}` overrides, then expands
//! `{# path #}` includes. The result is plain template source.
//!
//! ```text
//! Loader → Collector::flatten → String → quill_render::Template
//! ```

pub mod collector;
pub mod loader;
pub mod segments;

pub use collector::Collector;
pub use loader::{FileSystemLoader, Loader, MemoryLoader};

use quill_parser::SyntaxError;
use quill_render::RenderError;

/// Preprocessing error. Every variant is fatal for the page being built.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CollectError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error("'{page}' extends {markers} pages, a page may extend at most one")]
    Inheritance { page: String, markers: usize },

    #[error("Inheritance loop: '{page}' already extended in {}", .history.join(" -> "))]
    LoopInheritance { page: String, history: Vec<String> },

    #[error("Include loop: '{path}' already included in {}", .chain.join(" -> "))]
    LoopInclude { path: String, chain: Vec<String> },

    #[error("'{page}' declares block '{name}' more than once")]
    DuplicateBlock { page: String, name: String },

    #[error("Cannot read '{path}': {message}")]
    Missing { path: String, message: String },

    #[error(transparent)]
    Render(#[from] RenderError),
}
