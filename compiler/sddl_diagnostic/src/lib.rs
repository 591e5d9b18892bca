//! Source tracking and error reporting for the SDDL compiler.
//!
//! Every token and AST node carries a [`SourceLocation`], a byte range into
//! a shared [`Source`]. Errors are [`CompilerError`] values that hold a
//! category, a message, a primary location, and any number of attached
//! notes; [`CompilerError::render`] produces the human-readable report with
//! line excerpts and caret markers.

mod error;
mod source;

pub use error::{CompilerError, ErrorKind, Note, Result};
pub use source::{Source, SourceLocation};
