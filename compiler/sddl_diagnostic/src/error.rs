//! Compiler error values.

use crate::source::SourceLocation;

pub type Result<T> = std::result::Result<T, CompilerError>;

/// The failure categories a compilation can report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input could not be tokenized or grouped into statements.
    Syntax,
    /// Grouped statements could not be reduced to a well-formed AST.
    Parse,
    /// The AST could not be encoded into the output document.
    Serialization,
    /// An internal invariant was violated. Always a compiler bug.
    Invariant,
}

impl ErrorKind {
    fn header(self) -> &'static str {
        match self {
            ErrorKind::Syntax => "Syntax error",
            ErrorKind::Parse => "Parse error",
            ErrorKind::Serialization => "Serialization error",
            ErrorKind::Invariant => "Invariant violation",
        }
    }
}

/// Supplementary context attached to an error, pointing at a related
/// location in the source.
#[derive(Clone, Debug)]
pub struct Note {
    pub message: String,
    pub location: SourceLocation,
}

/// An error produced during compilation.
#[derive(Debug, thiserror::Error)]
#[error("{}: {message} at {location}", .kind.header())]
pub struct CompilerError {
    kind: ErrorKind,
    message: String,
    location: SourceLocation,
    notes: Vec<Note>,
}

impl CompilerError {
    pub fn syntax(message: impl Into<String>, location: SourceLocation) -> CompilerError {
        CompilerError::new(ErrorKind::Syntax, message, location)
    }

    pub fn parse(message: impl Into<String>, location: SourceLocation) -> CompilerError {
        CompilerError::new(ErrorKind::Parse, message, location)
    }

    pub fn serialization(message: impl Into<String>, location: SourceLocation) -> CompilerError {
        CompilerError::new(ErrorKind::Serialization, message, location)
    }

    pub fn invariant(message: impl Into<String>, location: SourceLocation) -> CompilerError {
        CompilerError::new(ErrorKind::Invariant, message, location)
    }

    fn new(kind: ErrorKind, message: impl Into<String>, location: SourceLocation) -> CompilerError {
        CompilerError {
            kind,
            message: message.into(),
            location,
            notes: Vec::new(),
        }
    }

    /// Attach a note to this error.
    pub fn with_note(mut self, message: impl Into<String>, location: SourceLocation) -> Self {
        self.notes.push(Note {
            message: message.into(),
            location,
        });
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// The full human-readable report: header, message, source excerpt,
    /// then each note with its own excerpt.
    pub fn render(&self) -> String {
        let mut out = format!("{}: {}\n", self.kind.header(), self.message);
        Self::render_location(&mut out, &self.location);
        for note in &self.notes {
            out.push_str(&format!("Note: {}\n", note.message));
            Self::render_location(&mut out, &note.location);
        }
        out
    }

    fn render_location(out: &mut String, location: &SourceLocation) {
        if location.source().is_some() {
            out.push_str(&format!("at {}:\n", location.pos_str()));
            out.push_str(&location.contents_str());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Source;
    use pretty_assertions::assert_eq;

    #[test]
    fn render_includes_excerpt_and_notes() {
        let src = Source::new("in.sddl", "a = ;\n");
        let err = CompilerError::parse(
            "Empty expression.",
            SourceLocation::new(src.clone(), 4, 5),
        )
        .with_note(
            "While parsing this expression:",
            SourceLocation::new(src, 0, 5),
        );
        let expected = concat!(
            "Parse error: Empty expression.\n",
            "at in.sddl:1:5:\n",
            "1 | a = ;\n",
            "  |     ^\n",
            "Note: While parsing this expression:\n",
            "at in.sddl:1:1-5:\n",
            "1 | a = ;\n",
            "  | ~~~~~\n",
        );
        assert_eq!(err.render(), expected);
    }

    #[test]
    fn display_is_single_line() {
        let src = Source::new("in.sddl", "x\n");
        let err = CompilerError::syntax("bad", SourceLocation::new(src, 0, 1));
        assert_eq!(err.to_string(), "Syntax error: bad at in.sddl:1:1");
    }

    #[test]
    fn locationless_errors_render_without_excerpt() {
        let err = CompilerError::invariant("broken", SourceLocation::none());
        assert_eq!(err.render(), "Invariant violation: broken\n");
    }
}
