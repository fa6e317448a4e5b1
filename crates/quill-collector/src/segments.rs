//! Page segment tree.
//!
//! A page is parsed into literal text and named blocks (`{? name ?} ...
//! {? endblock ?}`), nested as written. Parent markers (`{! "base.html" !}`)
//! are pulled out of the segment list and recorded separately.

use std::collections::BTreeMap;

use quill_lexer::fragment::{PAGE, PAGE_BLOCK};
use quill_lexer::Scanner;
use quill_parser::SyntaxError;

/// Prefix of the marker payload that closes a named block. Anything after it
/// (`{? endblock title ?}`) is ignored.
pub const ENDBLOCK: &str = "endblock";

/// Block overrides by name.
pub type Overrides = BTreeMap<String, Vec<Segment>>;

#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Text(String),
    Block(Block),
}

/// A named, overridable region of a page.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub name: String,
    pub children: Vec<Segment>,
}

/// A parsed page.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    /// Parent marker payloads in source order, unnormalized.
    pub parents: Vec<String>,
    pub segments: Vec<Segment>,
}

/// A block still waiting for its `endblock`.
struct OpenBlock<'a> {
    name: String,
    marker: &'a str,
    children: Vec<Segment>,
}

impl Document {
    /// Parse page source.
    ///
    /// An `endblock` with no open block is a syntax error. A block still open
    /// at the end of the page is not a block at all: its opening marker is
    /// kept as literal text.
    pub fn parse(source: &str) -> Result<Self, SyntaxError> {
        let mut parents = Vec::new();
        let mut root: Vec<Segment> = Vec::new();
        let mut open: Vec<OpenBlock<'_>> = Vec::new();

        for piece in Scanner::new(source, &[PAGE, PAGE_BLOCK]).scan() {
            match (piece.delimiter, piece.inner()) {
                (Some(delimiter), Some(payload)) if delimiter == PAGE => {
                    parents.push(payload.to_string());
                }
                (Some(_), Some(payload)) if payload.starts_with(ENDBLOCK) => {
                    let Some(block) = open.pop() else {
                        return Err(SyntaxError::spanned(
                            piece.text,
                            piece.span,
                            "Unmatched endblock",
                        ));
                    };
                    innermost(&mut open, &mut root).push(Segment::Block(Block {
                        name: block.name,
                        children: block.children,
                    }));
                }
                (Some(_), Some("")) => {
                    return Err(SyntaxError::spanned(
                        piece.text,
                        piece.span,
                        "Expected a block name",
                    ));
                }
                (Some(_), Some(name)) => open.push(OpenBlock {
                    name: name.to_string(),
                    marker: piece.text,
                    children: Vec::new(),
                }),
                _ => {
                    innermost(&mut open, &mut root).push(Segment::Text(piece.text.to_string()));
                }
            }
        }

        while let Some(block) = open.pop() {
            log::warn!("block '{}' is never closed, keeping it as text", block.name);
            let parent = innermost(&mut open, &mut root);
            parent.push(Segment::Text(block.marker.to_string()));
            parent.extend(block.children);
        }

        Ok(Self {
            parents,
            segments: root,
        })
    }

    /// Every block in the page, outermost first, at any depth.
    pub fn blocks(&self) -> Vec<&Block> {
        let mut found = Vec::new();
        collect_blocks(&self.segments, &mut found);
        found
    }

    /// The first block name declared more than once, if any.
    pub fn duplicate_block(&self) -> Option<&str> {
        let blocks = self.blocks();
        blocks.iter().enumerate().find_map(|(i, block)| {
            blocks[..i]
                .iter()
                .any(|earlier| earlier.name == block.name)
                .then_some(block.name.as_str())
        })
    }

    /// Replace the content of every block named in `overrides`.
    ///
    /// Overridden blocks keep their name so a later level can still find
    /// them. Their new content is taken as is.
    pub fn substitute(&mut self, overrides: &Overrides) {
        substitute_in(&mut self.segments, overrides);
    }

    /// The page text with all block markers removed.
    pub fn flatten(&self) -> String {
        let mut out = String::new();
        flatten_into(&self.segments, &mut out);
        out
    }
}

/// The segment list new content is appended to.
fn innermost<'s>(
    open: &'s mut [OpenBlock<'_>],
    root: &'s mut Vec<Segment>,
) -> &'s mut Vec<Segment> {
    match open.last_mut() {
        Some(block) => &mut block.children,
        None => root,
    }
}

fn collect_blocks<'a>(segments: &'a [Segment], found: &mut Vec<&'a Block>) {
    for segment in segments {
        if let Segment::Block(block) = segment {
            found.push(block);
            collect_blocks(&block.children, found);
        }
    }
}

fn substitute_in(segments: &mut [Segment], overrides: &Overrides) {
    for segment in segments {
        if let Segment::Block(block) = segment {
            match overrides.get(&block.name) {
                Some(children) => block.children = children.clone(),
                None => substitute_in(&mut block.children, overrides),
            }
        }
    }
}

fn flatten_into(segments: &[Segment], out: &mut String) {
    for segment in segments {
        match segment {
            Segment::Text(text) => out.push_str(text),
            Segment::Block(block) => flatten_into(&block.children, out),
        }
    }
}
