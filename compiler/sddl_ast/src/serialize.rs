//! AST to CBOR-item conversion.
//!
//! Every converted node becomes a single-entry map keyed by its tag, with
//! `null`, one item, or an array of items as the value depending on arity.
//! The tag vocabulary is the wire contract with the downstream dispatch
//! engine.

use ciborium::value::Value;
use sddl_diagnostic::{CompilerError, Result};
use sddl_syntax::Symbol;

use crate::node::{AstKind, AstNode};

fn tag(sym: Symbol, node: &AstNode) -> Result<String> {
    match sym.ser_str() {
        Some(tag) => Ok(tag.to_string()),
        None => Err(CompilerError::invariant(
            format!("Symbol '{sym}' has no serialized form."),
            node.loc.clone(),
        )),
    }
}

impl AstNode {
    /// Serialize this node (and its children) into a CBOR item. When
    /// `include_source_locations` is set, every node's map gains a sibling
    /// `"dbg"` entry recording its byte range.
    pub fn serialize(&self, include_source_locations: bool) -> Result<Value> {
        let (key, value) = match &self.kind {
            AstKind::Sym(_) => {
                return Err(CompilerError::invariant(
                    "Attempting to serialize AST which contains unconverted symbols!",
                    self.loc.clone(),
                ))
            }
            AstKind::List { .. } => {
                return Err(CompilerError::parse(
                    "Attempting to serialize AST which contains a list expression \
                     which hasn't been consumed or implicitly unwrapped.",
                    self.loc.clone(),
                ))
            }
            AstKind::Num(num) => ("int".to_string(), Value::Integer((*num).into())),
            AstKind::Var(name) => ("var".to_string(), Value::Text(name.clone())),
            AstKind::Poison => (tag(Symbol::Poison, self)?, Value::Null),
            AstKind::Atom { width } => (
                tag(Symbol::Atom, self)?,
                width.serialize(include_source_locations)?,
            ),
            AstKind::BuiltinField(sym) => (
                tag(Symbol::Atom, self)?,
                Value::Text(tag(*sym, self)?),
            ),
            AstKind::Record { fields } => (
                tag(Symbol::Record, self)?,
                Value::Array(self.serialize_all(fields, include_source_locations)?),
            ),
            AstKind::Array { field, len } => (
                tag(Symbol::Array, self)?,
                Value::Array(vec![
                    field.serialize(include_source_locations)?,
                    len.serialize(include_source_locations)?,
                ]),
            ),
            AstKind::Dest => (tag(Symbol::Dest, self)?, Value::Null),
            AstKind::Op { op, args } => {
                let value = match args.len() {
                    0 => Value::Null,
                    1 => args[0].serialize(include_source_locations)?,
                    _ => Value::Array(self.serialize_all(args, include_source_locations)?),
                };
                (tag(*op, self)?, value)
            }
            AstKind::Func { args, body } => (
                "func".to_string(),
                Value::Array(vec![
                    Value::Array(self.serialize_all(args, include_source_locations)?),
                    Value::Array(self.serialize_all(body, include_source_locations)?),
                ]),
            ),
            AstKind::Tuple(nodes) => (
                "tuple".to_string(),
                Value::Array(self.serialize_all(nodes, include_source_locations)?),
            ),
        };

        let mut entries = vec![(Value::Text(key), value)];
        if include_source_locations {
            let start = self.loc.start() as u64;
            let size = self.loc.size() as u64;
            entries.push((
                Value::Text("dbg".to_string()),
                Value::Map(vec![(
                    Value::Text("loc".to_string()),
                    Value::Array(vec![
                        Value::Integer(start.into()),
                        Value::Integer(size.into()),
                    ]),
                )]),
            ));
        }
        Ok(Value::Map(entries))
    }

    fn serialize_all(
        &self,
        nodes: &[AstNode],
        include_source_locations: bool,
    ) -> Result<Vec<Value>> {
        nodes
            .iter()
            .map(|n| n.serialize(include_source_locations))
            .collect()
    }
}
