//! Lexical symbol tables for the SDDL compiler.
//!
//! SDDL has a closed symbol vocabulary: grouping tokens (statement and list
//! separators, three bracket pairs), operators, and keyword field types.
//! This crate owns the [`Symbol`] enumeration, its classification into
//! [`SymbolType`]s, the bracket-list descriptors ([`ListType`] /
//! [`ListSymSet`]), and the string tables the rest of the compiler consults:
//! the ordered lexer match table, the canonical source spellings, the debug
//! names used in diagnostics, and the serialization tags that form the wire
//! contract with the downstream dispatch engine.
//!
//! Everything here is `const` data over a closed enum; lookups that can miss
//! return `Option` and the caller decides whether a miss is an internal bug.

mod list;
mod symbol;

pub use list::{ListSymSet, ListType, LIST_SYM_SETS};
pub use symbol::{Symbol, SymbolType, BUILTIN_FIELD_SYMS, MATCH_TABLE};
