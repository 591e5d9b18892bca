//! SDDL compiler driver.
//!
//! Provides an IO-free compilation pipeline suitable for embedding: source
//! text comes in as `&str`, the compiled CBOR document comes out as
//! `Vec<u8>`.
//!
//! # Usage
//!
//! ```ignore
//! use sddl_compiler::{Compiler, Options};
//!
//! let compiler = Compiler::new(Options::default());
//! let doc = compiler.compile(": Byte[_rem]", "[inline]")?;
//! ```
//!
//! # Architecture
//!
//! This crate sits between the core compiler crates and the CLI:
//!
//! ```text
//! sddl_syntax, sddl_lexer, sddl_parse, sddl_ast
//!                      ↓
//!                sddl_compiler  ← this crate
//!                      ↓
//!                    sddlc
//! ```

mod compiler;
mod options;

pub use compiler::Compiler;
pub use options::Options;

#[cfg(test)]
mod tests;
