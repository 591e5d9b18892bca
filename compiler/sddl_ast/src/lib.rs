//! The typed AST and its CBOR serialization.
//!
//! [`AstKind::Sym`] and [`AstKind::List`] are *unconverted* kinds: they
//! exist only while the parser is collapsing a grouped statement, and a
//! finished statement root must never contain either. Everything else is a
//! converted node that knows how to serialize itself.

mod node;
mod serialize;

pub use node::{unwrap_parens, AstKind, AstNode};
