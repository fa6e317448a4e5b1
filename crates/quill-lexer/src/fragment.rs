/// A position in source text, tracking line and column for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, line: usize, column: usize) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }
}

/// An opening/closing marker pair, e.g. `{{` / `}}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delimiter {
    pub open: &'static str,
    pub close: &'static str,
}

impl Delimiter {
    pub const fn new(open: &'static str, close: &'static str) -> Self {
        Self { open, close }
    }

    /// Strip the markers from a delimited run and trim the interior.
    ///
    /// Returns `None` when `raw` is not wrapped in this pair.
    pub fn strip<'s>(&self, raw: &'s str) -> Option<&'s str> {
        if raw.len() < self.open.len() + self.close.len() {
            return None;
        }
        raw.strip_prefix(self.open)?
            .strip_suffix(self.close)
            .map(str::trim)
    }
}

// Template markers, consumed by the node tree compiler.
pub const VARIABLE: Delimiter = Delimiter::new("{{", "}}");
pub const BLOCK: Delimiter = Delimiter::new("{%", "%}");

// Preprocessor markers, resolved before compilation.
pub const PAGE: Delimiter = Delimiter::new("{!", "!}");
pub const PAGE_BLOCK: Delimiter = Delimiter::new("{?", "?}");
pub const INCLUDE: Delimiter = Delimiter::new("{#", "#}");

/// Prefix that turns a block marker into a close marker (`{% endif %}`).
pub const CLOSE_PREFIX: &str = "end";

/// Fragment classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentKind {
    /// `{{ name }}`
    Variable,
    /// `{% keyword ... %}`
    OpenBlock,
    /// `{% end... %}`
    CloseBlock,
    /// Everything outside markers, kept verbatim.
    Text,
}

/// A classified slice of template text.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    /// The text exactly as it appeared in the source.
    pub raw: String,
    /// Interior of the markers, trimmed. Equal to `raw` for text.
    pub clean: String,
    pub kind: FragmentKind,
    pub span: Span,
}

impl Fragment {
    /// Classify a delimited run by its two leading characters.
    pub fn new(raw: impl Into<String>, span: Span) -> Self {
        let raw = raw.into();
        let (kind, clean) = if let Some(clean) = VARIABLE.strip(&raw) {
            (FragmentKind::Variable, clean.to_string())
        } else if let Some(clean) = BLOCK.strip(&raw) {
            let kind = if clean.starts_with(CLOSE_PREFIX) {
                FragmentKind::CloseBlock
            } else {
                FragmentKind::OpenBlock
            };
            (kind, clean.to_string())
        } else {
            (FragmentKind::Text, raw.clone())
        };
        Self {
            raw,
            clean,
            kind,
            span,
        }
    }

    /// A plain text run. Never reclassified, even if it starts with a marker.
    pub fn text(raw: impl Into<String>, span: Span) -> Self {
        let raw = raw.into();
        Self {
            clean: raw.clone(),
            raw,
            kind: FragmentKind::Text,
            span,
        }
    }

    /// First whitespace-delimited word of the cleaned text.
    pub fn keyword(&self) -> Option<&str> {
        self.clean.split_whitespace().next()
    }

    /// Whitespace-delimited words of the cleaned text.
    pub fn words(&self) -> Vec<&str> {
        self.clean.split_whitespace().collect()
    }
}
