use std::fmt;

use sddl_diagnostic::SourceLocation;
use sddl_syntax::{ListType, Symbol};

/// Every AST node kind.
#[derive(Clone, Debug, PartialEq)]
pub enum AstKind {
    /// An operator or keyword symbol not yet consumed by a grammar rule.
    Sym(Symbol),
    /// A bracketed list not yet consumed by a grammar rule or implicitly
    /// unwrapped.
    List {
        list_type: ListType,
        nodes: Vec<AstNode>,
    },

    Num(i64),
    Var(String),
    Poison,
    /// A field of explicit width, in bytes.
    Atom { width: Box<AstNode> },
    /// One of the built-in fixed-width field keywords.
    BuiltinField(Symbol),
    Record { fields: Vec<AstNode> },
    Array {
        field: Box<AstNode>,
        len: Box<AstNode>,
    },
    Dest,
    Op { op: Symbol, args: Vec<AstNode> },
    Func {
        args: Vec<AstNode>,
        body: Vec<AstNode>,
    },
    Tuple(Vec<AstNode>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct AstNode {
    pub kind: AstKind,
    pub loc: SourceLocation,
}

impl AstNode {
    pub fn new(kind: AstKind, loc: SourceLocation) -> AstNode {
        AstNode { kind, loc }
    }

    pub fn sym(&self) -> Option<Symbol> {
        match self.kind {
            AstKind::Sym(sym) => Some(sym),
            _ => None,
        }
    }

    pub fn is_sym(&self) -> bool {
        matches!(self.kind, AstKind::Sym(_))
    }

    pub fn list_type(&self) -> Option<ListType> {
        match self.kind {
            AstKind::List { list_type, .. } => Some(list_type),
            _ => None,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self.kind, AstKind::List { .. })
    }

    /// Whether this node has been converted out of the raw `Sym`/`List`
    /// forms. Only converted nodes may survive parsing.
    pub fn is_converted(&self) -> bool {
        !self.is_sym() && !self.is_list()
    }
}

/// Strip any number of single-element paren lists, yielding the innermost
/// node. Parens exist only to group; they leave no trace in the AST.
pub fn unwrap_parens(node: AstNode) -> AstNode {
    let AstNode { kind, loc } = node;
    match kind {
        AstKind::List {
            list_type: ListType::Paren,
            mut nodes,
        } if nodes.len() == 1 => match nodes.pop() {
            Some(inner) => unwrap_parens(inner),
            None => AstNode::new(
                AstKind::List {
                    list_type: ListType::Paren,
                    nodes,
                },
                loc,
            ),
        },
        kind => AstNode::new(kind, loc),
    }
}

impl fmt::Display for AstNode {
    /// Structural dump used in diagnostics and logs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn list(f: &mut fmt::Formatter<'_>, nodes: &[AstNode]) -> fmt::Result {
            for (i, node) in nodes.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{node}")?;
            }
            Ok(())
        }

        match &self.kind {
            AstKind::Sym(sym) => write!(f, "Sym({sym})"),
            AstKind::List { list_type, nodes } => {
                write!(f, "List({list_type:?}, [")?;
                list(f, nodes)?;
                write!(f, "])")
            }
            AstKind::Num(num) => write!(f, "Num({num})"),
            AstKind::Var(name) => write!(f, "Var({name})"),
            AstKind::Poison => write!(f, "Poison"),
            AstKind::Atom { width } => write!(f, "Atom({width})"),
            AstKind::BuiltinField(sym) => write!(f, "Field({sym})"),
            AstKind::Record { fields } => {
                write!(f, "Record([")?;
                list(f, fields)?;
                write!(f, "])")
            }
            AstKind::Array { field, len } => write!(f, "Array({field}, {len})"),
            AstKind::Dest => write!(f, "Dest"),
            AstKind::Op { op, args } => {
                write!(f, "Op({op}")?;
                for arg in args {
                    write!(f, ", {arg}")?;
                }
                write!(f, ")")
            }
            AstKind::Func { args, body } => {
                write!(f, "Func([")?;
                list(f, args)?;
                write!(f, "], [")?;
                list(f, body)?;
                write!(f, "])")
            }
            AstKind::Tuple(nodes) => {
                write!(f, "Tuple([")?;
                list(f, nodes)?;
                write!(f, "])")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn node(kind: AstKind) -> AstNode {
        AstNode::new(kind, SourceLocation::none())
    }

    fn paren(nodes: Vec<AstNode>) -> AstNode {
        node(AstKind::List {
            list_type: ListType::Paren,
            nodes,
        })
    }

    #[test]
    fn unwrap_parens_strips_nested_singletons() {
        let wrapped = paren(vec![paren(vec![node(AstKind::Num(7))])]);
        assert_eq!(unwrap_parens(wrapped).kind, AstKind::Num(7));
    }

    #[test]
    fn unwrap_parens_leaves_tuples_alone() {
        let pair = paren(vec![node(AstKind::Num(1)), node(AstKind::Num(2))]);
        assert!(unwrap_parens(pair.clone()).kind == pair.kind);

        let curly = node(AstKind::List {
            list_type: ListType::Curly,
            nodes: vec![node(AstKind::Num(1))],
        });
        assert!(unwrap_parens(curly).list_type() == Some(ListType::Curly));
    }

    #[test]
    fn display_dump() {
        let n = node(AstKind::Op {
            op: Symbol::Assign,
            args: vec![node(AstKind::Var("x".to_string())), node(AstKind::Num(3))],
        });
        assert_eq!(n.to_string(), "Op(ASSIGN, Var(x), Num(3))");
    }
}
