//! Tokenizer for the SDDL compiler.
//!
//! Turns raw source text into a flat [`Token`] list. Words that match the
//! symbol table become symbol tokens; everything else word-shaped becomes a
//! [`TokenKind::Word`] destined to parse as a variable reference. Runs of
//! whitespace and `#` comments collapse to at most one newline token,
//! anchored at the first newline in the run.

mod lexer;
mod token;

pub use lexer::tokenize;
pub use token::{Token, TokenKind};
