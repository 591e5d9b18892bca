//! The expression parser.
//!
//! Each grouped statement is collapsed into a single converted AST node by
//! repeatedly applying grammar rules. Nodes live in an index-addressed
//! arena; `seq` holds the ids still present in the expression, left to
//! right, and `pending` holds every (node, rule) candidate not yet applied
//! or discarded. Applying a rule replaces the operator's slot with the
//! generated node, drops the consumed neighbor ids from `seq`, and purges
//! every pending candidate that referenced a consumed node.

use sddl_ast::{unwrap_parens, AstKind, AstNode};
use sddl_diagnostic::{CompilerError, Result, SourceLocation};
use sddl_lexer::{Token, TokenKind};
use sddl_syntax::SymbolType;
use smallvec::SmallVec;
use tracing::trace;

use crate::grammar::{Arity, Associativity, Grammar};
use crate::grouping::{GroupingExpr, GroupingList, GroupingNode};

/// Parse every grouped statement into its AST root.
pub fn parse(stmts: Vec<GroupingExpr>) -> Result<Vec<AstNode>> {
    stmts
        .into_iter()
        .map(|stmt| Ok(unwrap_parens(parse_expr(stmt)?)))
        .collect()
}

fn parse_token(token: Token) -> AstNode {
    let (kind, loc) = token.into_parts();
    let kind = match kind {
        TokenKind::Sym(sym) => AstKind::Sym(sym),
        // Operators and keywords were matched during lexing; every
        // remaining word is an identifier.
        TokenKind::Word(word) => AstKind::Var(word),
        TokenKind::Num(num) => AstKind::Num(num),
    };
    AstNode::new(kind, loc)
}

fn parse_list(list: GroupingList) -> Result<AstNode> {
    let loc = list.loc().clone();
    let list_type = list.list_type();
    let nodes = list
        .into_elements()
        .into_iter()
        .map(parse_expr)
        .collect::<Result<Vec<_>>>()?;
    Ok(AstNode::new(AstKind::List { list_type, nodes }, loc))
}

fn parse_node(node: GroupingNode) -> Result<AstNode> {
    match node {
        GroupingNode::Token(token) => Ok(parse_token(token)),
        GroupingNode::List(list) => parse_list(list),
    }
}

/// One (node, rule) candidate awaiting application.
#[derive(Clone, Copy, Debug)]
struct PendingOp {
    node: usize,
    /// Position in the original node sequence; ties within a precedence
    /// level are broken by position, in the direction of associativity.
    pos: usize,
    rule: usize,
}

fn parse_expr(expr: GroupingExpr) -> Result<AstNode> {
    let grammar = Grammar::global();
    let full_loc = expr.loc().clone();

    let mut arena: Vec<Option<AstNode>> = Vec::new();
    let mut seq: Vec<usize> = Vec::new();
    for group_node in expr.into_nodes() {
        let ast = parse_node(group_node)?;
        seq.push(arena.len());
        arena.push(Some(ast));
    }

    if seq.is_empty() {
        return Err(CompilerError::parse("Empty expression.", full_loc));
    }

    let mut pending = build_pending_ops(grammar, &arena, &seq)?;
    sort_pending_ops(grammar, &arena, &mut pending)?;

    // Pending ops are normally allowed to fail to match their arguments,
    // since a later application can make them viable. Once a full scan
    // applies nothing, that hope is gone; one more scan runs in must-match
    // mode so the first starved operator reports a precise error.
    let mut must_match = false;
    loop {
        check_adjacent_nodes(grammar, &full_loc, &arena, &seq)?;

        if apply_one(grammar, &mut arena, &mut seq, &mut pending, must_match)? {
            continue;
        }

        if !must_match {
            must_match = true;
            continue;
        }

        if seq.len() == 1 {
            return take_node(&mut arena, seq[0]);
        }
        let mut err = CompilerError::parse(
            "Couldn't reduce expression to a single AST node.",
            full_loc,
        );
        for &id in &seq {
            let node = node_ref(&arena, id)?;
            err = err.with_note(
                format!("Uncombined sub-expression: {node}"),
                node.loc.clone(),
            );
        }
        return Err(err);
    }
}

fn node_ref(arena: &[Option<AstNode>], id: usize) -> Result<&AstNode> {
    arena[id].as_ref().ok_or_else(|| {
        CompilerError::invariant(
            "Expression node taken out of the arena while still in the sequence.",
            SourceLocation::none(),
        )
    })
}

fn take_node(arena: &mut [Option<AstNode>], id: usize) -> Result<AstNode> {
    arena[id].take().ok_or_else(|| {
        CompilerError::invariant(
            "Expression node taken out of the arena while still in the sequence.",
            SourceLocation::none(),
        )
    })
}

fn build_pending_ops(
    grammar: &Grammar,
    arena: &[Option<AstNode>],
    seq: &[usize],
) -> Result<Vec<PendingOp>> {
    let mut pending = Vec::new();
    for (pos, &id) in seq.iter().enumerate() {
        let node = node_ref(arena, id)?;
        if let Some(sym) = node.sym() {
            let Some(rules) = grammar.sym_rules(sym) else {
                return Err(CompilerError::parse(
                    format!("Symbol '{sym}' has no associated grammar rules."),
                    node.loc.clone(),
                ));
            };
            for &rule in rules {
                pending.push(PendingOp { node: id, pos, rule });
            }
        } else if let Some(list_type) = node.list_type() {
            for &rule in grammar.implicit_rules(list_type) {
                pending.push(PendingOp { node: id, pos, rule });
            }
        }
    }
    Ok(pending)
}

fn sort_pending_ops(
    grammar: &Grammar,
    arena: &[Option<AstNode>],
    pending: &mut [PendingOp],
) -> Result<()> {
    for (i, a) in pending.iter().enumerate() {
        for b in &pending[i + 1..] {
            let ra = grammar.rule(a.rule);
            let rb = grammar.rule(b.rule);
            if ra.precedence() == rb.precedence() && ra.associativity() != rb.associativity() {
                let loc = node_ref(arena, a.node)?
                    .loc
                    .merge(&node_ref(arena, b.node)?.loc);
                return Err(CompilerError::parse(
                    format!(
                        "Two symbols ('{}' and '{}') with the same precedence \
                         can't have different associativities.",
                        ra.op(),
                        rb.op()
                    ),
                    loc,
                ));
            }
        }
    }
    pending.sort_by_key(|p| {
        let rule = grammar.rule(p.rule);
        let pos = match rule.associativity() {
            Associativity::LeftToRight => p.pos,
            Associativity::RightToLeft => usize::MAX - p.pos,
        };
        (rule.precedence(), pos)
    });
    Ok(())
}

/// Reject node pairs that can never merge: two adjacent value expressions
/// with no operator between them, and two adjacent unconditionally-binary
/// operators with no expression between them.
fn check_adjacent_nodes(
    grammar: &Grammar,
    full_loc: &SourceLocation,
    arena: &[Option<AstNode>],
    seq: &[usize],
) -> Result<()> {
    if seq.is_empty() {
        return Err(CompilerError::invariant(
            "Expression reduced to 0 nodes somehow??",
            full_loc.clone(),
        ));
    }
    for pair in seq.windows(2) {
        let lhs = node_ref(arena, pair[0])?;
        let rhs = node_ref(arena, pair[1])?;
        let lhs_sym = lhs.sym();
        let rhs_sym = rhs.sym();

        if lhs_sym.is_none() && rhs_sym.is_none() && !rhs.is_list() {
            return Err(CompilerError::parse(
                "Expected operator between expressions.",
                lhs.loc.merge(&rhs.loc),
            ));
        }

        if let (Some(a), Some(b)) = (lhs_sym, rhs_sym) {
            if grammar.sym_is_always_binary(a) && grammar.sym_is_always_binary(b) {
                return Err(CompilerError::parse(
                    "Expected expression between operators.",
                    lhs.loc.merge(&rhs.loc),
                ));
            }
        }
    }
    Ok(())
}

/// Decide how an ambiguous operator reads in context. Symbols with a single
/// rule keep that rule's arity. Symbols with two rules are always
/// {prefix-unary, infix-binary}; the left neighbor disambiguates: no left
/// neighbor or an unresolved operator on the left means prefix, a value
/// means infix.
fn resolve_arity(
    grammar: &Grammar,
    rules_for_node: &[usize],
    rule_id: usize,
    lhs: Option<&AstNode>,
    op_loc: &SourceLocation,
) -> Result<Option<Arity>> {
    let rule = grammar.rule(rule_id);

    if rules_for_node.len() == 1 {
        if rules_for_node[0] != rule_id {
            return Err(CompilerError::invariant(
                "Processing a rule not in the list of rules for that op!",
                op_loc.clone(),
            ));
        }
        return Ok(Some(rule.arity()));
    }
    if rules_for_node.len() != 2 {
        return Err(CompilerError::invariant(
            "More than two rules!",
            op_loc.clone(),
        ));
    }
    let arities: Vec<Arity> = rules_for_node
        .iter()
        .map(|&id| grammar.rule(id).arity())
        .collect();
    if !(arities.contains(&Arity::PrefixUnary) && arities.contains(&Arity::InfixBinary)) {
        return Err(CompilerError::invariant(
            "Can only handle operators with more than one interpretation when the \
             possible interpretations are (1) prefix-unary or (2) infix-binary!",
            op_loc.clone(),
        ));
    }

    Ok(match lhs {
        None => Some(Arity::PrefixUnary),
        Some(node) => match node.sym() {
            None => Some(Arity::InfixBinary),
            Some(sym) if sym.symbol_type() == SymbolType::Operator => Some(Arity::PrefixUnary),
            Some(_) => None,
        },
    })
}

/// Scan the pending ops in sorted order and apply the first one whose
/// arguments are resolvable. Returns whether anything was applied.
fn apply_one(
    grammar: &Grammar,
    arena: &mut Vec<Option<AstNode>>,
    seq: &mut Vec<usize>,
    pending: &mut Vec<PendingOp>,
    must_match: bool,
) -> Result<bool> {
    for i in 0..pending.len() {
        let p = pending[i];
        let rule = grammar.rule(p.rule);

        let Some(idx) = seq.iter().position(|&id| id == p.node) else {
            return Err(CompilerError::invariant(
                "Pending op references a node no longer in the expression.",
                SourceLocation::none(),
            ));
        };
        let op_is_sym = node_ref(arena, p.node)?.is_sym();
        let op_loc = node_ref(arena, p.node)?.loc.clone();
        // For implicit list rules the node is its own right-hand argument.
        let next_idx = if op_is_sym { idx + 1 } else { idx };
        let is_first = idx == 0;
        let is_end = next_idx >= seq.len();

        let rules_for_node: SmallVec<[usize; 2]> = pending
            .iter()
            .filter(|q| q.node == p.node)
            .map(|q| q.rule)
            .collect();
        let prev_node = if is_first {
            None
        } else {
            Some(node_ref(arena, seq[idx - 1])?)
        };

        let arity = resolve_arity(grammar, &rules_for_node, p.rule, prev_node, &op_loc)?;
        if arity != Some(rule.arity()) {
            continue;
        }

        match rule.arity() {
            Arity::InfixBinary => {
                if is_first {
                    if must_match {
                        return Err(CompilerError::parse(
                            "Operator missing left-hand argument.",
                            op_loc,
                        ));
                    }
                    continue;
                }
                if !rule.matches_lhs(prev_node) {
                    continue;
                }
                if is_end {
                    if must_match {
                        return Err(CompilerError::parse(
                            "Operator missing right-hand argument.",
                            op_loc,
                        ));
                    }
                    continue;
                }
                if !rule.matches_rhs(Some(node_ref(arena, seq[next_idx])?)) {
                    continue;
                }
            }
            Arity::PrefixUnary => {
                if is_end {
                    if must_match {
                        return Err(CompilerError::parse(
                            "Operator missing right-hand argument.",
                            op_loc,
                        ));
                    }
                    continue;
                }
                if !rule.matches_rhs(Some(node_ref(arena, seq[next_idx])?)) {
                    continue;
                }
            }
            Arity::Nullary => {}
        }

        // All checks passed; consume the arguments and apply.
        let (lhs, consumed_prev) = match rule.arity() {
            Arity::InfixBinary => {
                let prev_id = seq[idx - 1];
                (Some(take_node(arena, prev_id)?), Some(prev_id))
            }
            _ => (None, None),
        };
        let (rhs, consumed_next) = match rule.arity() {
            Arity::InfixBinary | Arity::PrefixUnary => {
                let next_id = seq[next_idx];
                (Some(take_node(arena, next_id)?), Some(next_id))
            }
            Arity::Nullary => (None, None),
        };
        let op_node = if op_is_sym {
            Some(take_node(arena, p.node)?)
        } else {
            None
        };

        let result = rule.gen(op_node, lhs, rhs)?;
        trace!(%result, "applied grammar rule");
        arena[p.node] = Some(result);

        if let Some(next_id) = consumed_next {
            if next_id != p.node {
                seq.remove(next_idx);
            }
        }
        if consumed_prev.is_some() {
            seq.remove(idx - 1);
        }

        let mut purged: SmallVec<[usize; 3]> = SmallVec::new();
        purged.push(p.node);
        purged.extend(consumed_prev);
        purged.extend(consumed_next);
        pending.retain(|q| !purged.contains(&q.node));

        return Ok(true);
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grouping::group;
    use pretty_assertions::assert_eq;
    use sddl_diagnostic::{ErrorKind, Source};
    use sddl_lexer::tokenize;

    fn parse_src(text: &str) -> Result<Vec<AstNode>> {
        parse(group(tokenize(&Source::new("[test]", text))?)?)
    }

    fn parse_one(text: &str) -> String {
        let mut stmts = parse_src(text).unwrap();
        assert_eq!(stmts.len(), 1, "{text}");
        stmts.pop().unwrap().to_string()
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        assert_eq!(
            parse_one("x = 1 + 2 * 3;"),
            "Op(ASSIGN, Var(x), Op(ADD, Num(1), Op(MUL, Num(2), Num(3))))"
        );
    }

    #[test]
    fn assignment_is_right_associative() {
        assert_eq!(
            parse_one("a = b = 1;"),
            "Op(ASSIGN, Var(a), Op(ASSIGN, Var(b), Num(1)))"
        );
    }

    #[test]
    fn subtraction_is_left_associative() {
        assert_eq!(
            parse_one("x = 9 - 5 - 2;"),
            "Op(ASSIGN, Var(x), Op(SUB, Op(SUB, Num(9), Num(5)), Num(2)))"
        );
    }

    #[test]
    fn double_minus_resolves_to_negation() {
        assert_eq!(
            parse_one("tmp = 10 - - 11;"),
            "Op(ASSIGN, Var(tmp), Op(SUB, Num(10), Num(-11)))"
        );
    }

    #[test]
    fn negation_of_non_literals_stays_an_op() {
        assert_eq!(
            parse_one("y = -x;"),
            "Op(ASSIGN, Var(y), Op(NEG, Var(x)))"
        );
    }

    #[test]
    fn parens_group_and_disappear() {
        assert_eq!(
            parse_one("x = (1 + 2) * 3;"),
            "Op(ASSIGN, Var(x), Op(MUL, Op(ADD, Num(1), Num(2)), Num(3)))"
        );
        assert_eq!(parse_one("x = (7);"), "Op(ASSIGN, Var(x), Num(7))");
    }

    // A statement that is nothing but a parenthesized expression can only
    // match the implicit bind rule, which is infix and so needs a callee on
    // its left.
    #[test]
    fn bare_paren_statement_is_rejected() {
        let err = parse_src("(7)").unwrap_err();
        assert!(err.message().contains("left-hand argument"));
    }

    #[test]
    fn builtin_keyword_statement_sends_to_default_dest() {
        assert_eq!(parse_one("Byte"), "Op(SEND, Field(BYTE), Dest)");
    }

    #[test]
    fn assume_prefix_consumes() {
        assert_eq!(
            parse_one(": UInt32LE"),
            "Op(CONSUME, Op(SEND, Field(U32LE), Dest))"
        );
    }

    #[test]
    fn assume_binary_assigns_consumed_value() {
        assert_eq!(
            parse_one("len : UInt32LE"),
            "Op(ASSIGN, Var(len), Op(CONSUME, Op(SEND, Field(U32LE), Dest)))"
        );
    }

    #[test]
    fn sized_array() {
        assert_eq!(
            parse_one(": Byte[_rem]"),
            "Op(CONSUME, Array(Op(SEND, Field(BYTE), Dest), Var(_rem)))"
        );
    }

    #[test]
    fn call_binds_arguments_as_tuple() {
        assert_eq!(
            parse_one("f = g(a, b);"),
            "Op(ASSIGN, Var(f), Op(BIND, Var(g), Tuple([Var(a), Var(b)])))"
        );
    }

    #[test]
    fn member_access_binds_tightest() {
        assert_eq!(
            parse_one("x = s.a + 1;"),
            "Op(ASSIGN, Var(x), Op(ADD, Op(MEMBER, Var(s), Var(a)), Num(1)))"
        );
    }

    #[test]
    fn bare_record() {
        assert_eq!(
            parse_one("{ x : UInt8\n y : UInt8 }"),
            "Record([Op(ASSIGN, Var(x), Op(CONSUME, Op(SEND, Field(U8), Dest))), \
             Op(ASSIGN, Var(y), Op(CONSUME, Op(SEND, Field(U8), Dest)))])"
        );
    }

    #[test]
    fn paren_list_before_curly_is_a_func() {
        assert_eq!(
            parse_one("f = (a) { a };"),
            "Op(ASSIGN, Var(f), Func([Var(a)], [Var(a)]))"
        );
    }

    #[test]
    fn auto_sized_array_expands() {
        let rendered = parse_one(": Byte[]");
        assert!(rendered.starts_with("Op(CONSUME, Op(MEMBER, Op(CONSUME, Op(BIND, Func("));
        assert!(rendered.contains("Var(__resolved)"));
    }

    #[test]
    fn empty_statement_is_an_error() {
        let err = parse_src(";").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert!(err.message().contains("Empty expression"));
    }

    #[test]
    fn missing_right_hand_argument() {
        let err = parse_src("foo = ;").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert!(err.message().contains("right-hand argument"));
    }

    #[test]
    fn missing_left_hand_argument() {
        let err = parse_src("= foo;").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert!(err.message().contains("left-hand argument"));
    }

    #[test]
    fn adjacent_expressions_are_rejected() {
        let err = parse_src("tmp = 9 + 10 11 + 12").unwrap_err();
        assert!(err.message().contains("Expected operator between expressions"));
    }

    #[test]
    fn adjacent_binary_operators_are_rejected() {
        let err = parse_src("tmp = 9 + 10 + + 11 + 12").unwrap_err();
        assert!(err.message().contains("Expected expression between operators"));
    }

    #[test]
    fn multiple_statements_parse_independently() {
        let stmts = parse_src("a = 1\nb = 2; c = 3").unwrap();
        assert_eq!(stmts.len(), 3);
        assert_eq!(stmts[0].to_string(), "Op(ASSIGN, Var(a), Num(1))");
        assert_eq!(stmts[2].to_string(), "Op(ASSIGN, Var(c), Num(3))");
    }

    #[test]
    fn comments_and_blank_lines_do_not_change_structure() {
        let plain = parse_src("x = 1 + 2\ny : UInt8").unwrap();
        let noisy =
            parse_src("# header\n\nx = 1 + 2   # trailing\n\n\ny : UInt8\n# footer\n").unwrap();
        let dump = |stmts: &[AstNode]| {
            stmts.iter().map(|n| n.to_string()).collect::<Vec<_>>()
        };
        assert_eq!(dump(&plain), dump(&noisy));
    }
}
