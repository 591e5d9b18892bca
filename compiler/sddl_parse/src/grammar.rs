//! The declarative grammar: operator rules, their precedence table, and the
//! AST generators that fire when a rule is applied.

use std::sync::LazyLock;

use rustc_hash::FxHashMap;
use sddl_ast::{unwrap_parens, AstKind, AstNode};
use sddl_diagnostic::{CompilerError, Result, SourceLocation};
use sddl_syntax::{ListType, Symbol, BUILTIN_FIELD_SYMS};
use smallvec::SmallVec;

/// Binding tightness, tightest first. The parser applies pending rules in
/// ascending precedence order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Precedence {
    Access,
    Unary,
    Nullary,
    MulDivMod,
    AddSub,
    Relation,
    Equality,
    Assignment,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Associativity {
    LeftToRight,
    RightToLeft,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Arity {
    Nullary,
    PrefixUnary,
    InfixBinary,
}

/// The required shape of a rule's argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArgType {
    None,
    Expr,
    ListParen,
    ListSquare,
    ListCurly,
}

impl Precedence {
    /// Associativity is a function of precedence; two rules sharing a
    /// precedence always agree on it.
    pub fn associativity(self) -> Associativity {
        match self {
            Precedence::Unary | Precedence::Assignment => Associativity::RightToLeft,
            _ => Associativity::LeftToRight,
        }
    }
}

/// Which generator a rule runs when it fires.
#[derive(Clone, Copy, Debug)]
enum RuleKind {
    /// Plain operator node with 0, 1, or 2 arguments.
    Op,
    /// Builtin field keyword: expands to sending the field to the default
    /// destination.
    BuiltinField,
    Poison,
    /// Implicit curly rule with no left argument.
    Record,
    /// Implicit curly rule with a paren argument list on the left.
    Func,
    /// `field[len]`, and the auto-sized `field[]` expansion.
    Array,
    /// Implicit paren rule: `f(args)`.
    Bind,
    /// `lhs : rhs`, sugar for `lhs = consume rhs`.
    BinaryAssume,
    /// Prefix `: rhs`, sugar for `consume rhs`.
    UnaryAssume,
    /// Prefix `-`, folding literal operands into negative literals.
    Negation,
}

#[derive(Debug)]
pub struct GrammarRule {
    op: Symbol,
    precedence: Precedence,
    associativity: Associativity,
    arity: Arity,
    lhs_type: ArgType,
    rhs_type: ArgType,
    kind: RuleKind,
}

fn arity_of(lhs_type: ArgType, rhs_type: ArgType) -> Arity {
    debug_assert!(
        !(lhs_type != ArgType::None && rhs_type == ArgType::None),
        "postfix unary operators aren't supported"
    );
    match (lhs_type, rhs_type) {
        (ArgType::None, ArgType::None) => Arity::Nullary,
        (ArgType::None, _) => Arity::PrefixUnary,
        _ => Arity::InfixBinary,
    }
}

fn rule(
    op: Symbol,
    precedence: Precedence,
    lhs_type: ArgType,
    rhs_type: ArgType,
    kind: RuleKind,
) -> GrammarRule {
    GrammarRule {
        op,
        precedence,
        associativity: precedence.associativity(),
        arity: arity_of(lhs_type, rhs_type),
        lhs_type,
        rhs_type,
        kind,
    }
}

/// Peek through single-element paren lists without consuming the node.
fn peek_unwrap_parens(node: &AstNode) -> &AstNode {
    let mut cur = node;
    loop {
        match &cur.kind {
            AstKind::List {
                list_type: ListType::Paren,
                nodes,
            } if nodes.len() == 1 => cur = &nodes[0],
            _ => return cur,
        }
    }
}

impl GrammarRule {
    pub fn op(&self) -> Symbol {
        self.op
    }

    pub fn precedence(&self) -> Precedence {
        self.precedence
    }

    pub fn associativity(&self) -> Associativity {
        self.associativity
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }

    pub fn lhs_type(&self) -> ArgType {
        self.lhs_type
    }

    pub fn rhs_type(&self) -> ArgType {
        self.rhs_type
    }

    /// Whether `arg` has the shape this rule requires on the given side.
    pub fn matches_lhs(&self, arg: Option<&AstNode>) -> bool {
        Self::matches(self.lhs_type, arg)
    }

    pub fn matches_rhs(&self, arg: Option<&AstNode>) -> bool {
        Self::matches(self.rhs_type, arg)
    }

    fn matches(arg_type: ArgType, arg: Option<&AstNode>) -> bool {
        let Some(node) = arg else {
            return arg_type == ArgType::None;
        };
        match arg_type {
            ArgType::None => false,
            ArgType::ListParen => node.list_type() == Some(ListType::Paren),
            ArgType::ListSquare => {
                peek_unwrap_parens(node).list_type() == Some(ListType::Square)
            }
            ArgType::ListCurly => {
                peek_unwrap_parens(node).list_type() == Some(ListType::Curly)
            }
            ArgType::Expr => !node.is_sym() && !peek_unwrap_parens(node).is_list(),
        }
    }

    fn convert(arg_type: ArgType, node: AstNode) -> AstNode {
        match arg_type {
            // Parens around a paren argument list are meaningful; leave them.
            ArgType::ListParen => node,
            _ => unwrap_parens(node),
        }
    }

    /// Build the AST node this rule produces. `op` is the operator's own
    /// symbol node, absent for implicit list rules. Arguments have already
    /// been shape-checked by the parser; this re-validates before building.
    pub fn gen(
        &self,
        op: Option<AstNode>,
        lhs: Option<AstNode>,
        rhs: Option<AstNode>,
    ) -> Result<AstNode> {
        let op_loc = op.map(|n| n.loc).unwrap_or_default();

        if (self.lhs_type == ArgType::None) != lhs.is_none() {
            return Err(CompilerError::invariant(
                if lhs.is_some() {
                    "Unexpectedly received left-hand argument when this rule doesn't expect one."
                } else {
                    "Got null left-hand argument when this rule expects one."
                },
                op_loc,
            ));
        }
        if (self.rhs_type == ArgType::None) != rhs.is_none() {
            return Err(CompilerError::invariant(
                if rhs.is_some() {
                    "Unexpectedly received right-hand argument when this rule doesn't expect one."
                } else {
                    "Got null right-hand argument when this rule expects one."
                },
                op_loc,
            ));
        }
        if !self.matches_lhs(lhs.as_ref()) || !self.matches_rhs(rhs.as_ref()) {
            return Err(CompilerError::invariant(
                "Argument failed to match while the op was being generated, i.e., \
                 after it should already have successfully been matched!",
                op_loc,
            ));
        }

        let lhs = lhs.map(|n| Self::convert(self.lhs_type, n));
        let rhs = rhs.map(|n| Self::convert(self.rhs_type, n));

        match self.kind {
            RuleKind::Op => {
                let args = lhs.into_iter().chain(rhs).collect();
                Ok(op_node(self.op, op_loc, args))
            }
            RuleKind::BuiltinField => {
                let field = AstNode::new(AstKind::BuiltinField(self.op), op_loc.clone());
                let dest = AstNode::new(AstKind::Dest, op_loc.clone());
                Ok(op_node(Symbol::Send, op_loc, vec![field, dest]))
            }
            RuleKind::Poison => Ok(AstNode::new(AstKind::Poison, op_loc)),
            RuleKind::Record => {
                let list = rhs_or_invariant(rhs, &op_loc)?;
                record_of(list)
            }
            RuleKind::Func => {
                let args_list = lhs_or_invariant(lhs, &op_loc)?;
                let body_list = rhs_or_invariant(rhs, &op_loc)?;
                let args = list_nodes(args_list, ListType::Paren)?;
                let body = list_nodes(body_list, ListType::Curly)?;
                let loc = join_locs(args.iter().chain(&body));
                Ok(AstNode::new(AstKind::Func { args, body }, loc))
            }
            RuleKind::Array => {
                let field = lhs_or_invariant(lhs, &op_loc)?;
                let list = rhs_or_invariant(rhs, &op_loc)?;
                gen_array(field, list)
            }
            RuleKind::Bind => {
                let target = lhs_or_invariant(lhs, &op_loc)?;
                let list = rhs_or_invariant(rhs, &op_loc)?;
                let args = tuple_of(list)?;
                Ok(op_node(Symbol::Bind, SourceLocation::none(), vec![target, args]))
            }
            RuleKind::BinaryAssume => {
                let target = lhs_or_invariant(lhs, &op_loc)?;
                let source = rhs_or_invariant(rhs, &op_loc)?;
                let consume = op_node(Symbol::Consume, op_loc.clone(), vec![source]);
                Ok(op_node(Symbol::Assign, op_loc, vec![target, consume]))
            }
            RuleKind::UnaryAssume => {
                let source = rhs_or_invariant(rhs, &op_loc)?;
                Ok(op_node(Symbol::Consume, op_loc, vec![source]))
            }
            RuleKind::Negation => {
                let operand = rhs_or_invariant(rhs, &op_loc)?;
                if let AstKind::Num(val) = operand.kind {
                    if let Some(negated) = val.checked_neg() {
                        // Fold the negation into the literal.
                        let loc = op_loc.merge(&operand.loc);
                        return Ok(AstNode::new(AstKind::Num(negated), loc));
                    }
                }
                Ok(op_node(Symbol::Neg, op_loc, vec![operand]))
            }
        }
    }
}

fn join_locs<'a>(nodes: impl Iterator<Item = &'a AstNode>) -> SourceLocation {
    nodes.fold(SourceLocation::none(), |acc, n| acc.merge(&n.loc))
}

fn op_node(op: Symbol, op_loc: SourceLocation, args: Vec<AstNode>) -> AstNode {
    let loc = args.iter().fold(op_loc, |acc, arg| acc.merge(&arg.loc));
    AstNode::new(AstKind::Op { op, args }, loc)
}

fn lhs_or_invariant(lhs: Option<AstNode>, op_loc: &SourceLocation) -> Result<AstNode> {
    lhs.ok_or_else(|| {
        CompilerError::invariant(
            "Got null left-hand argument when this rule expects one.",
            op_loc.clone(),
        )
    })
}

fn rhs_or_invariant(rhs: Option<AstNode>, op_loc: &SourceLocation) -> Result<AstNode> {
    rhs.ok_or_else(|| {
        CompilerError::invariant(
            "Got null right-hand argument when this rule expects one.",
            op_loc.clone(),
        )
    })
}

fn list_nodes(node: AstNode, expected: ListType) -> Result<Vec<AstNode>> {
    match node.kind {
        AstKind::List { list_type, nodes } if list_type == expected => Ok(nodes),
        _ => Err(CompilerError::invariant(
            format!("Expected {expected:?} list."),
            node.loc,
        )),
    }
}

/// Turn a paren list into a tuple, unwrapping parens around each element.
fn tuple_of(list: AstNode) -> Result<AstNode> {
    let loc = list.loc.clone();
    let nodes = list_nodes(list, ListType::Paren)?;
    let nodes = nodes.into_iter().map(unwrap_parens).collect();
    Ok(AstNode::new(AstKind::Tuple(nodes), loc))
}

/// Turn a curly list into a record, unwrapping parens around each field.
fn record_of(list: AstNode) -> Result<AstNode> {
    let loc = list.loc.clone();
    let nodes = list_nodes(list, ListType::Curly)?;
    let fields = nodes.into_iter().map(unwrap_parens).collect();
    Ok(AstNode::new(AstKind::Record { fields }, loc))
}

fn gen_array(field: AstNode, list: AstNode) -> Result<AstNode> {
    let list_loc = list.loc.clone();
    let mut elems = list_nodes(list, ListType::Square)?;
    match elems.len() {
        0 => Ok(expand_auto_sized_array(
            field,
            list_loc,
        )),
        1 => {
            let len = match elems.pop() {
                Some(len) => len,
                None => {
                    return Err(CompilerError::invariant(
                        "Array length list emptied underneath us.",
                        list_loc,
                    ))
                }
            };
            let loc = field.loc.merge(&len.loc);
            Ok(AstNode::new(
                AstKind::Array {
                    field: Box::new(field),
                    len: Box::new(len),
                },
                loc,
            ))
        }
        _ => Err(CompilerError::parse(
            "Array declaration right-hand side list must have single element.",
            list_loc,
        )),
    }
}

/// Expand `field[]` into a closure that infers the element count from the
/// remaining input size:
///
/// ```text
/// (: (__field, __rem) {
///   __size = sizeof __field
///   __len = __rem / __size
///   expect __rem % __size == 0
///   __resolved = __field[__len]
/// } (field, _rem)).__resolved
/// ```
fn expand_auto_sized_array(field: AstNode, brackets_loc: SourceLocation) -> AstNode {
    let loc = field.loc.merge(&brackets_loc);
    let var = |name: &str| AstNode::new(AstKind::Var(name.to_string()), loc.clone());
    let op = |sym: Symbol, args: Vec<AstNode>| AstNode::new(AstKind::Op { op: sym, args }, loc.clone());

    let field_var = var("__field");
    let rem_var = var("__rem");
    let size_var = var("__size");
    let len_var = var("__len");
    let resolved_var = var("__resolved");

    let body = vec![
        op(
            Symbol::Assign,
            vec![size_var.clone(), op(Symbol::Sizeof, vec![field_var.clone()])],
        ),
        op(
            Symbol::Assign,
            vec![
                len_var.clone(),
                op(Symbol::Div, vec![rem_var.clone(), size_var.clone()]),
            ],
        ),
        op(
            Symbol::Expect,
            vec![op(
                Symbol::Eq,
                vec![
                    op(Symbol::Mod, vec![rem_var.clone(), size_var]),
                    AstNode::new(AstKind::Num(0), loc.clone()),
                ],
            )],
        ),
        op(
            Symbol::Assign,
            vec![
                resolved_var.clone(),
                AstNode::new(
                    AstKind::Array {
                        field: Box::new(field_var.clone()),
                        len: Box::new(len_var),
                    },
                    loc.clone(),
                ),
            ],
        ),
    ];

    let func = AstNode::new(
        AstKind::Func {
            args: vec![field_var, rem_var],
            body,
        },
        loc.clone(),
    );
    let bound_args = AstNode::new(AstKind::Tuple(vec![field, var("_rem")]), loc.clone());

    op(
        Symbol::Member,
        vec![
            op(Symbol::Consume, vec![op(Symbol::Bind, vec![func, bound_args])]),
            resolved_var,
        ],
    )
}

type RuleIds = SmallVec<[usize; 2]>;

/// The full rule set with its lookup tables, built once at first use.
#[derive(Debug)]
pub struct Grammar {
    rules: Vec<GrammarRule>,
    by_sym: FxHashMap<Symbol, RuleIds>,
    implicit: FxHashMap<ListType, RuleIds>,
}

static GRAMMAR: LazyLock<Grammar> = LazyLock::new(Grammar::build);

impl Grammar {
    pub fn global() -> &'static Grammar {
        &GRAMMAR
    }

    fn build() -> Grammar {
        use ArgType::{Expr, ListCurly, ListParen, ListSquare, None as NoArg};
        use Precedence::{Access, AddSub, Assignment, Equality, MulDivMod, Nullary, Relation, Unary};

        let mut rules = Vec::new();

        for &field in BUILTIN_FIELD_SYMS {
            rules.push(rule(field, Nullary, NoArg, NoArg, RuleKind::BuiltinField));
        }

        rules.push(rule(Symbol::Array, Access, Expr, ListSquare, RuleKind::Array));
        rules.push(rule(Symbol::Poison, Nullary, NoArg, NoArg, RuleKind::Poison));

        rules.push(rule(Symbol::Die, Nullary, NoArg, NoArg, RuleKind::Op));

        rules.push(rule(Symbol::Expect, Assignment, NoArg, Expr, RuleKind::Op));
        rules.push(rule(Symbol::Consume, Unary, NoArg, Expr, RuleKind::Op));
        rules.push(rule(Symbol::Sizeof, Unary, NoArg, Expr, RuleKind::Op));

        rules.push(rule(Symbol::Sub, Unary, NoArg, Expr, RuleKind::Negation));

        rules.push(rule(Symbol::Send, Assignment, Expr, Expr, RuleKind::Op));
        rules.push(rule(Symbol::Assign, Assignment, Expr, Expr, RuleKind::Op));
        rules.push(rule(Symbol::Assume, Assignment, Expr, Expr, RuleKind::BinaryAssume));
        rules.push(rule(Symbol::Assume, Assignment, NoArg, Expr, RuleKind::UnaryAssume));
        rules.push(rule(Symbol::Member, Access, Expr, Expr, RuleKind::Op));

        rules.push(rule(Symbol::Eq, Equality, Expr, Expr, RuleKind::Op));
        rules.push(rule(Symbol::Ne, Equality, Expr, Expr, RuleKind::Op));

        rules.push(rule(Symbol::Gt, Relation, Expr, Expr, RuleKind::Op));
        rules.push(rule(Symbol::Ge, Relation, Expr, Expr, RuleKind::Op));
        rules.push(rule(Symbol::Lt, Relation, Expr, Expr, RuleKind::Op));
        rules.push(rule(Symbol::Le, Relation, Expr, Expr, RuleKind::Op));

        rules.push(rule(Symbol::Add, AddSub, Expr, Expr, RuleKind::Op));
        rules.push(rule(Symbol::Sub, AddSub, Expr, Expr, RuleKind::Op));

        rules.push(rule(Symbol::Mul, MulDivMod, Expr, Expr, RuleKind::Op));
        rules.push(rule(Symbol::Div, MulDivMod, Expr, Expr, RuleKind::Op));
        rules.push(rule(Symbol::Mod, MulDivMod, Expr, Expr, RuleKind::Op));

        let mut by_sym: FxHashMap<Symbol, RuleIds> = FxHashMap::default();
        for (id, r) in rules.iter().enumerate() {
            by_sym.entry(r.op()).or_default().push(id);
        }

        // Implicit rules fire on bare lists rather than on operator symbols,
        // so they live outside the symbol table.
        let mut implicit: FxHashMap<ListType, RuleIds> = FxHashMap::default();
        let bind = rules.len();
        rules.push(rule(Symbol::Bind, Access, Expr, ListParen, RuleKind::Bind));
        implicit.entry(ListType::Paren).or_default().push(bind);

        let array = rules.len();
        rules.push(rule(Symbol::Array, Access, Expr, ListSquare, RuleKind::Array));
        implicit.entry(ListType::Square).or_default().push(array);

        let record = rules.len();
        rules.push(rule(Symbol::Record, Unary, NoArg, ListCurly, RuleKind::Record));
        let func = rules.len();
        rules.push(rule(Symbol::Record, Access, ListParen, ListCurly, RuleKind::Func));
        let curly = implicit.entry(ListType::Curly).or_default();
        curly.push(record);
        curly.push(func);

        Grammar {
            rules,
            by_sym,
            implicit,
        }
    }

    pub fn rule(&self, id: usize) -> &GrammarRule {
        &self.rules[id]
    }

    /// All rules registered for an operator or keyword symbol.
    pub fn sym_rules(&self, sym: Symbol) -> Option<&[usize]> {
        self.by_sym.get(&sym).map(|ids| ids.as_slice())
    }

    /// The implicit rules that can consume a bare list of the given type.
    pub fn implicit_rules(&self, list_type: ListType) -> &[usize] {
        self.implicit
            .get(&list_type)
            .map(|ids| ids.as_slice())
            .unwrap_or(&[])
    }

    /// True when every interpretation of the symbol is infix-binary.
    pub fn sym_is_always_binary(&self, sym: Symbol) -> bool {
        match self.by_sym.get(&sym) {
            Some(ids) => ids
                .iter()
                .all(|&id| self.rules[id].arity() == Arity::InfixBinary),
            None => false,
        }
    }
}
