//! Source text and byte-range locations into it.

use std::fmt;
use std::sync::Arc;

/// How many lines a multi-line excerpt may span before the middle is elided.
const MAX_EXCERPT_LINES: usize = 7;

/// A compilation input: the program text plus a display name and an index
/// of newline positions for byte-offset to line/column translation.
#[derive(Debug)]
pub struct Source {
    name: String,
    text: String,
    /// Byte offsets of every `\n` in `text`, ascending.
    newlines: Vec<usize>,
}

impl Source {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Arc<Source> {
        let text = text.into();
        let newlines = text
            .bytes()
            .enumerate()
            .filter_map(|(i, b)| (b == b'\n').then_some(i))
            .collect();
        Arc::new(Source {
            name: name.into(),
            text,
            newlines,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn num_lines(&self) -> usize {
        self.newlines.len() + 1
    }

    /// 1-based line number containing byte offset `pos`.
    pub fn line_num_of(&self, pos: usize) -> usize {
        self.newlines.partition_point(|&nl| nl < pos) + 1
    }

    /// Byte offset of the start of 1-based line `line`.
    pub fn idx_of_line_start(&self, line: usize) -> usize {
        if line <= 1 {
            0
        } else {
            self.newlines[line - 2] + 1
        }
    }

    /// Contents of 1-based line `line`, without the trailing newline.
    pub fn line_contents(&self, line: usize) -> &str {
        let start = self.idx_of_line_start(line);
        let end = self
            .newlines
            .get(line - 1)
            .copied()
            .unwrap_or(self.text.len());
        &self.text[start..end]
    }
}

/// A byte range `[start, end)` into a [`Source`].
///
/// Locations made by [`SourceLocation::none`] carry no source at all; they
/// mark synthesized tokens and nodes that have no textual origin.
#[derive(Clone, Debug, Default)]
pub struct SourceLocation {
    src: Option<Arc<Source>>,
    start: usize,
    end: usize,
}

impl SourceLocation {
    pub fn new(src: Arc<Source>, start: usize, end: usize) -> SourceLocation {
        debug_assert!(start <= end && end <= src.len());
        SourceLocation {
            src: Some(src),
            start,
            end,
        }
    }

    /// A location with no source attached.
    pub fn none() -> SourceLocation {
        SourceLocation::default()
    }

    pub fn source(&self) -> Option<&Arc<Source>> {
        self.src.as_ref()
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn size(&self) -> usize {
        self.end - self.start
    }

    /// The text this location covers. Empty when no source is attached.
    pub fn text(&self) -> &str {
        match &self.src {
            Some(src) => &src.text()[self.start..self.end],
            None => "",
        }
    }

    /// The smallest location covering both `self` and `other`.
    ///
    /// A location without a source merges to the other operand unchanged.
    pub fn merge(&self, other: &SourceLocation) -> SourceLocation {
        let (src, other_src) = match (&self.src, &other.src) {
            (Some(a), Some(b)) => (a, b),
            (Some(_), None) => return self.clone(),
            (None, _) => return other.clone(),
        };
        debug_assert!(Arc::ptr_eq(src, other_src));
        SourceLocation {
            src: Some(Arc::clone(src)),
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// `file:line[:col]` description of this location.
    ///
    /// Columns are 1-based. A multi-line location renders as a line range,
    /// a location wider than one byte as a column range.
    pub fn pos_str(&self) -> String {
        let Some(src) = &self.src else {
            return "<unknown>".to_string();
        };
        let start_line = src.line_num_of(self.start);
        if self.size() == 0 {
            return format!("{}:{}", src.name(), start_line);
        }
        let last = self.end - 1;
        let end_line = src.line_num_of(last);
        if start_line != end_line {
            return format!("{}:{}-{}", src.name(), start_line, end_line);
        }
        let col = self.start - src.idx_of_line_start(start_line) + 1;
        if self.size() == 1 {
            format!("{}:{}:{}", src.name(), start_line, col)
        } else {
            let end_col = last - src.idx_of_line_start(end_line) + 1;
            format!("{}:{}:{}-{}", src.name(), start_line, col, end_col)
        }
    }

    /// An excerpt of the source lines this location covers, each prefixed
    /// with its line number and followed by a marker row underlining the
    /// covered bytes. Long excerpts keep only the first and last three
    /// lines. Returns an empty string when no source is attached.
    pub fn contents_str(&self) -> String {
        let Some(src) = &self.src else {
            return String::new();
        };
        let start_line = src.line_num_of(self.start);
        let end_line = src.line_num_of(self.end.saturating_sub(1).max(self.start));
        let gutter = end_line.to_string().len();
        let marker = if self.size() <= 1 && start_line == end_line {
            '^'
        } else {
            '~'
        };

        let mut out = String::new();
        let mut line = start_line;
        while line <= end_line {
            let span = end_line - start_line + 1;
            if span > MAX_EXCERPT_LINES && line == start_line + 3 {
                out.push_str(&format!("{:>gutter$} |\n", "."));
                line = end_line - 2;
                continue;
            }
            let contents = src.line_contents(line);
            out.push_str(&format!("{line:>gutter$} | {contents}\n"));

            // Marker row under the covered part of this line.
            let line_start = src.idx_of_line_start(line);
            let from = self.start.max(line_start) - line_start;
            let to = if self.size() == 0 {
                from + 1
            } else {
                self.end.min(line_start + contents.len()) - line_start
            };
            let width = to.saturating_sub(from).max(1);
            out.push_str(&format!(
                "{:>gutter$} | {:from$}{}\n",
                "",
                "",
                marker.to_string().repeat(width)
            ));
            line += 1;
        }
        out
    }
}

impl PartialEq for SourceLocation {
    /// Same range into the same `Source` allocation.
    fn eq(&self, other: &SourceLocation) -> bool {
        self.start == other.start
            && self.end == other.end
            && match (&self.src, &other.src) {
                (Some(a), Some(b)) => Arc::ptr_eq(a, b),
                (None, None) => true,
                _ => false,
            }
    }
}

impl Eq for SourceLocation {}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pos_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn src() -> Arc<Source> {
        Source::new("test.sddl", "abc = 1\ndef = abc + 2\n")
    }

    #[test]
    fn line_numbering() {
        let s = src();
        assert_eq!(s.num_lines(), 3);
        assert_eq!(s.line_num_of(0), 1);
        assert_eq!(s.line_num_of(6), 1);
        assert_eq!(s.line_num_of(7), 1);
        assert_eq!(s.line_num_of(8), 2);
        assert_eq!(s.idx_of_line_start(1), 0);
        assert_eq!(s.idx_of_line_start(2), 8);
        assert_eq!(s.line_contents(1), "abc = 1");
        assert_eq!(s.line_contents(2), "def = abc + 2");
        assert_eq!(s.line_contents(3), "");
    }

    #[test]
    fn pos_str_forms() {
        let s = src();
        assert_eq!(SourceLocation::new(s.clone(), 6, 6).pos_str(), "test.sddl:1");
        assert_eq!(
            SourceLocation::new(s.clone(), 6, 7).pos_str(),
            "test.sddl:1:7"
        );
        assert_eq!(
            SourceLocation::new(s.clone(), 0, 3).pos_str(),
            "test.sddl:1:1-3"
        );
        assert_eq!(
            SourceLocation::new(s.clone(), 0, 12).pos_str(),
            "test.sddl:1-2"
        );
        assert_eq!(SourceLocation::none().pos_str(), "<unknown>");
    }

    #[test]
    fn merge_spans_both_operands() {
        let s = src();
        let a = SourceLocation::new(s.clone(), 8, 11);
        let b = SourceLocation::new(s.clone(), 14, 17);
        let m = a.merge(&b);
        assert_eq!(m.start(), 8);
        assert_eq!(m.size(), 9);
        assert_eq!(m.text(), "def = abc");

        let none = SourceLocation::none();
        assert_eq!(none.merge(&a).start(), 8);
        assert_eq!(a.merge(&none).start(), 8);
    }

    #[test]
    fn contents_str_underlines_range() {
        let s = src();
        let loc = SourceLocation::new(s.clone(), 14, 17);
        assert_eq!(loc.contents_str(), "2 | def = abc + 2\n  |       ~~~\n");

        let point = SourceLocation::new(s, 0, 1);
        assert_eq!(point.contents_str(), "1 | abc = 1\n  | ^\n");
    }

    #[test]
    fn contents_str_elides_long_excerpts() {
        let text = (1..=10).map(|i| format!("line{i}\n")).collect::<String>();
        let len = text.len();
        let s = Source::new("big.sddl", text);
        let loc = SourceLocation::new(s, 0, len);
        let rendered = loc.contents_str();
        assert!(rendered.contains(" 1 | line1"));
        assert!(rendered.contains(" 3 | line3"));
        assert!(!rendered.contains("line5"));
        assert!(rendered.contains(" 8 | line8"));
        assert!(rendered.contains("10 | line10"));
    }
}
