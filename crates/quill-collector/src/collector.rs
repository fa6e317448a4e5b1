//! Inheritance and inclusion resolution.
//!
//! ```text
//! page ──prepare_page──▶ flat page ──prepare_include_tags──▶ template source
//! ```
//!
//! Inheritance walks up the parent chain one page at a time. Each page's
//! blocks become overrides for the pages above it; the child closest to the
//! requested page wins. Includes are expanded afterwards, over the fully
//! inherited text.

use quill_lexer::fragment::INCLUDE;
use quill_lexer::Scanner;
use quill_parser::Value;
use quill_render::Template;

use crate::loader::{normalize, Loader};
use crate::segments::{Document, Overrides};
use crate::CollectError;

/// Resolves one page into a single flat template.
pub struct Collector<L> {
    loader: L,
    page: String,
    history: Vec<String>,
}

impl<L: Loader> Collector<L> {
    pub fn new(loader: L, page: &str) -> Self {
        let page = normalize(page);
        Self {
            loader,
            history: vec![page.clone()],
            page,
        }
    }

    /// The requested page, normalized.
    pub fn page(&self) -> &str {
        &self.page
    }

    /// Pages visited by the last inheritance pass, requested page first.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Resolve the inheritance chain.
    ///
    /// Returns the root ancestor's text with every override applied and all
    /// block markers removed. Include markers are left in place.
    pub fn prepare_page(&mut self) -> Result<String, CollectError> {
        self.history = vec![self.page.clone()];
        let mut overrides = Overrides::new();
        let mut current = self.page.clone();
        let mut document = Document::parse(&self.loader.load(&current)?)?;

        while let Some(parent) = self.parent_of(&current, &document)? {
            if let Some(name) = document.duplicate_block() {
                return Err(CollectError::DuplicateBlock {
                    page: current,
                    name: name.to_string(),
                });
            }

            document.substitute(&overrides);
            for block in document.blocks() {
                overrides.insert(block.name.clone(), block.children.clone());
            }

            if self.history.contains(&parent) {
                return Err(CollectError::LoopInheritance {
                    page: parent,
                    history: self.history.clone(),
                });
            }
            log::debug!("{current} extends {parent}");
            self.history.push(parent.clone());
            document = Document::parse(&self.loader.load(&parent)?)?;
            current = parent;
        }

        document.substitute(&overrides);
        Ok(document.flatten())
    }

    /// The single parent `document` declares, if any.
    fn parent_of(&self, page: &str, document: &Document) -> Result<Option<String>, CollectError> {
        match document.parents.as_slice() {
            [] => Ok(None),
            [parent] => Ok(Some(normalize(parent))),
            markers => Err(CollectError::Inheritance {
                page: page.to_string(),
                markers: markers.len(),
            }),
        }
    }

    /// Replace every include marker in `text` with the referenced file,
    /// expanded the same way.
    pub fn prepare_include_tags(&self, text: &str) -> Result<String, CollectError> {
        let mut chain = vec![self.page.clone()];
        self.expand_includes(text, &mut chain)
    }

    fn expand_includes(&self, text: &str, chain: &mut Vec<String>) -> Result<String, CollectError> {
        let mut out = String::with_capacity(text.len());
        for piece in Scanner::new(text, &[INCLUDE]).scan() {
            let Some(target) = piece.inner() else {
                out.push_str(piece.text);
                continue;
            };

            let path = normalize(target);
            if chain.contains(&path) {
                return Err(CollectError::LoopInclude {
                    path,
                    chain: chain.clone(),
                });
            }
            log::debug!("including {path}");
            let source = self.loader.load(&path)?;
            chain.push(path);
            out.push_str(&self.expand_includes(&source, chain)?);
            chain.pop();
        }
        Ok(out)
    }

    /// Both passes: the template source the page compiles from.
    pub fn flatten(&mut self) -> Result<String, CollectError> {
        let page = self.prepare_page()?;
        self.prepare_include_tags(&page)
    }

    /// Flatten, compile and render the page against `context`.
    pub fn assemble_page(&mut self, context: &Value) -> Result<String, CollectError> {
        let source = self.flatten()?;
        let template = Template::new(&source)?;
        Ok(template.render(context)?)
    }
}
