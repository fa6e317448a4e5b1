use crate::fragment::{Delimiter, Fragment, Span, BLOCK, VARIABLE};

/// A run of source text: either a complete delimited marker or the plain
/// text between markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece<'a> {
    pub text: &'a str,
    /// The marker pair that matched, `None` for plain text.
    pub delimiter: Option<Delimiter>,
    pub span: Span,
}

impl Piece<'_> {
    /// The trimmed interior of a delimited piece.
    pub fn inner(&self) -> Option<&str> {
        self.delimiter.and_then(|d| d.strip(self.text))
    }
}

/// Quill source scanner.
///
/// Splits text on a fixed set of marker pairs. Markers do not nest and
/// never span a line: a marker ends at the first occurrence of its closing
/// delimiter on the same line. An opening delimiter without a closing one
/// on its line is plain text. Empty runs are never emitted.
pub struct Scanner<'a> {
    source: &'a str,
    delimiters: &'a [Delimiter],
    pos: usize,
    line: usize,
    column: usize,
    text_start: usize,
    text_line: usize,
    text_column: usize,
    pieces: Vec<Piece<'a>>,
}

impl<'a> Scanner<'a> {
    /// Create a scanner for `source` matching the given marker pairs.
    ///
    /// When two pairs could start at the same position the first listed wins.
    pub fn new(source: &'a str, delimiters: &'a [Delimiter]) -> Self {
        Self {
            source,
            delimiters,
            pos: 0,
            line: 1,
            column: 1,
            text_start: 0,
            text_line: 1,
            text_column: 1,
            pieces: Vec::new(),
        }
    }

    /// Split template text into classified fragments.
    pub fn tokenize(source: &str) -> Vec<Fragment> {
        let fragments: Vec<Fragment> = Scanner::new(source, &[VARIABLE, BLOCK])
            .scan()
            .into_iter()
            .map(|piece| match piece.delimiter {
                Some(_) => Fragment::new(piece.text, piece.span),
                None => Fragment::text(piece.text, piece.span),
            })
            .collect();
        log::debug!("scanned {} fragments", fragments.len());
        fragments
    }

    /// Scan the whole source.
    pub fn scan(mut self) -> Vec<Piece<'a>> {
        while !self.is_at_end() {
            match self.match_marker() {
                Some((delimiter, end)) => {
                    self.flush_text();
                    self.emit_marker(delimiter, end);
                }
                None => self.advance(),
            }
        }
        self.flush_text();
        self.pieces
    }

    /// Try every marker pair at the current position. Returns the pair and
    /// the byte offset just past its closing delimiter.
    fn match_marker(&self) -> Option<(Delimiter, usize)> {
        let rest = &self.source[self.pos..];
        let line_end = rest.find('\n').unwrap_or(rest.len());

        self.delimiters.iter().find_map(|delimiter| {
            if !rest.starts_with(delimiter.open) {
                return None;
            }
            let body = &rest[delimiter.open.len()..line_end];
            body.find(delimiter.close).map(|offset| {
                let end = self.pos + delimiter.open.len() + offset + delimiter.close.len();
                (*delimiter, end)
            })
        })
    }

    fn emit_marker(&mut self, delimiter: Delimiter, end: usize) {
        let span = Span::new(self.pos, end, self.line, self.column);
        let text = &self.source[self.pos..end];
        self.pieces.push(Piece {
            text,
            delimiter: Some(delimiter),
            span,
        });
        // Markers never contain a newline.
        self.column += text.chars().count();
        self.pos = end;
        self.start_text();
    }

    fn flush_text(&mut self) {
        if self.pos > self.text_start {
            let span = Span::new(self.text_start, self.pos, self.text_line, self.text_column);
            self.pieces.push(Piece {
                text: &self.source[self.text_start..self.pos],
                delimiter: None,
                span,
            });
        }
        self.start_text();
    }

    fn start_text(&mut self) {
        self.text_start = self.pos;
        self.text_line = self.line;
        self.text_column = self.column;
    }

    // --- Helpers ---

    fn advance(&mut self) {
        if let Some(ch) = self.source[self.pos..].chars().next() {
            self.pos += ch.len_utf8();
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.source.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::{FragmentKind, INCLUDE, PAGE_BLOCK};
    use pretty_assertions::assert_eq;

    /// Helper: tokenize and return (kind, clean) pairs.
    fn kinds(source: &str) -> Vec<(FragmentKind, String)> {
        Scanner::tokenize(source)
            .into_iter()
            .map(|f| (f.kind, f.clean))
            .collect()
    }

    fn text(s: &str) -> (FragmentKind, String) {
        (FragmentKind::Text, s.to_string())
    }

    fn var(s: &str) -> (FragmentKind, String) {
        (FragmentKind::Variable, s.to_string())
    }

    fn open(s: &str) -> (FragmentKind, String) {
        (FragmentKind::OpenBlock, s.to_string())
    }

    fn close(s: &str) -> (FragmentKind, String) {
        (FragmentKind::CloseBlock, s.to_string())
    }

    // =========================================================================
    // Structure
    // =========================================================================

    #[test]
    fn test_empty_source() {
        assert!(Scanner::tokenize("").is_empty());
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(kinds("<p>hello</p>"), vec![text("<p>hello</p>")]);
    }

    #[test]
    fn test_variable_between_text() {
        assert_eq!(
            kinds("Hello, {{ name }}!"),
            vec![text("Hello, "), var("name"), text("!")]
        );
    }

    #[test]
    fn test_adjacent_markers_drop_empty_text() {
        assert_eq!(
            kinds("{{ a }}{{ b }}"),
            vec![var("a"), var("b")]
        );
    }

    #[test]
    fn test_block_open_and_close() {
        assert_eq!(
            kinds("{% if x %}yes{% endif %}"),
            vec![open("if x"), text("yes"), close("endif")]
        );
    }

    #[test]
    fn test_close_detected_by_prefix_only() {
        assert_eq!(kinds("{% endwhatever %}"), vec![close("endwhatever")]);
        assert_eq!(kinds("{%end%}"), vec![close("end")]);
    }

    #[test]
    fn test_else_is_open_block() {
        assert_eq!(kinds("{% else %}"), vec![open("else")]);
    }

    // =========================================================================
    // Shortest match
    // =========================================================================

    #[test]
    fn test_marker_ends_at_first_close() {
        assert_eq!(kinds("{{ a }}}"), vec![var("a"), text("}")]);
    }

    #[test]
    fn test_markers_do_not_nest() {
        assert_eq!(
            kinds("{{ a {{ b }} }}"),
            vec![var("a {{ b"), text(" }}")]
        );
    }

    #[test]
    fn test_unclosed_marker_is_text() {
        assert_eq!(kinds("a {{ b"), vec![text("a {{ b")]);
    }

    #[test]
    fn test_marker_cannot_span_lines() {
        assert_eq!(kinds("{{ a\n}}"), vec![text("{{ a\n}}")]);
    }

    #[test]
    fn test_empty_variable_marker() {
        assert_eq!(kinds("{{}}"), vec![var("")]);
    }

    #[test]
    fn test_block_inside_unclosed_variable_start() {
        assert_eq!(
            kinds("{{% if a %}"),
            vec![text("{"), open("if a")]
        );
    }

    // =========================================================================
    // Spans
    // =========================================================================

    #[test]
    fn test_spans_track_lines_and_columns() {
        let fragments = Scanner::tokenize("ab\n  {{ x }}\n{% if y %}");
        assert_eq!(fragments[1].span.line, 2);
        assert_eq!(fragments[1].span.column, 3);
        assert_eq!(fragments[3].span.line, 3);
        assert_eq!(fragments[3].span.column, 1);
        assert_eq!(fragments[1].raw, "{{ x }}");
    }

    #[test]
    fn test_multibyte_text_columns() {
        let fragments = Scanner::tokenize("héllo {{ x }}");
        assert_eq!(fragments[1].span.column, 7);
    }

    // =========================================================================
    // Custom delimiter sets
    // =========================================================================

    #[test]
    fn test_scan_with_other_delimiters() {
        let pieces = Scanner::new("a{# nav.html #}b{? t ?}", &[INCLUDE, PAGE_BLOCK]).scan();
        let inner: Vec<Option<&str>> = pieces.iter().map(Piece::inner).collect();
        assert_eq!(inner, vec![None, Some("nav.html"), None, Some("t")]);
        assert_eq!(pieces[1].delimiter, Some(INCLUDE));
        assert_eq!(pieces[3].delimiter, Some(PAGE_BLOCK));
    }

    #[test]
    fn test_template_markers_ignored_by_other_sets() {
        let pieces = Scanner::new("{{ x }}", &[INCLUDE]).scan();
        assert_eq!(pieces.len(), 1);
        assert_eq!(pieces[0].delimiter, None);
    }
}
