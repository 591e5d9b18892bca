//! Structural grouping and expression parsing for the SDDL compiler.
//!
//! The pipeline stage between the tokenizer and the serializer:
//!
//! 1. The [grouper](group) restructures the flat token list into statements
//!    and bracketed lists, consuming separators.
//! 2. The [parser](parse) collapses each grouped statement into a single
//!    converted AST node by repeatedly applying [grammar](Grammar) rules in
//!    precedence order.

mod grammar;
mod grouping;
mod parser;

pub use grammar::{ArgType, Arity, Associativity, Grammar, GrammarRule, Precedence};
pub use grouping::{group, GroupingExpr, GroupingList, GroupingNode};
pub use parser::parse;
