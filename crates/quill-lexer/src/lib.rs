//! Quill Lexer
//!
//! Splits template source into an ordered stream of fragments: plain text,
//! `{{ variable }}` markers, and `{% block %}` open/close markers.
//! The same scanner drives the preprocessor's page, block and include
//! markers with a different delimiter set.
//!
//! # Example
//!
//! ```
//! use quill_lexer::{FragmentKind, Scanner};
//!
//! let fragments = Scanner::tokenize("Hi {{ name }}");
//! assert_eq!(fragments.len(), 2);
//! assert_eq!(fragments[1].kind, FragmentKind::Variable);
//! ```

pub mod fragment;
pub mod scanner;

pub use fragment::{Delimiter, Fragment, FragmentKind, Span};
pub use scanner::{Piece, Scanner};
