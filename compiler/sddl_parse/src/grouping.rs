//! The grouper: token list to statement/list structure.

use std::vec::IntoIter;

use sddl_diagnostic::{CompilerError, Result, SourceLocation};
use sddl_lexer::Token;
use sddl_syntax::{ListSymSet, ListType, Symbol, SymbolType};
use tracing::trace;

/// One node of the grouped statement tree.
#[derive(Clone, Debug)]
pub enum GroupingNode {
    Token(Token),
    List(GroupingList),
}

/// A bracketed list, with one grouped expression per element.
#[derive(Clone, Debug)]
pub struct GroupingList {
    list_type: ListType,
    elements: Vec<GroupingExpr>,
    loc: SourceLocation,
}

/// A span of grouping nodes forming one expression, plus the separator
/// token that terminated it. The final statement of a program and the
/// final element of a list may have no terminator.
#[derive(Clone, Debug)]
pub struct GroupingExpr {
    nodes: Vec<GroupingNode>,
    terminator: Option<Token>,
    loc: SourceLocation,
}

impl GroupingNode {
    pub fn loc(&self) -> &SourceLocation {
        match self {
            GroupingNode::Token(token) => token.loc(),
            GroupingNode::List(list) => &list.loc,
        }
    }
}

impl GroupingList {
    pub fn list_type(&self) -> ListType {
        self.list_type
    }

    pub fn elements(&self) -> &[GroupingExpr] {
        &self.elements
    }

    pub fn into_elements(self) -> Vec<GroupingExpr> {
        self.elements
    }

    pub fn loc(&self) -> &SourceLocation {
        &self.loc
    }
}

impl GroupingExpr {
    pub fn nodes(&self) -> &[GroupingNode] {
        &self.nodes
    }

    pub fn into_nodes(self) -> Vec<GroupingNode> {
        self.nodes
    }

    pub fn terminator(&self) -> Option<&Token> {
        self.terminator.as_ref()
    }

    /// Full span, terminator included.
    pub fn loc(&self) -> &SourceLocation {
        &self.loc
    }
}

fn join_locs<'a>(locs: impl Iterator<Item = &'a SourceLocation>) -> SourceLocation {
    locs.fold(SourceLocation::none(), |acc, loc| acc.merge(loc))
}

/// Restructure a token list into one grouped expression per top-level
/// statement.
pub fn group(tokens: Vec<Token>) -> Result<Vec<GroupingExpr>> {
    let mut it = tokens.into_iter();
    let stmts = group_stmts(&mut it)?;
    for stmt in &stmts {
        trace!(stmt = ?stmt, "grouped statement");
    }
    Ok(stmts)
}

type Tokens = IntoIter<Token>;

/// Split the top level into statements at `;` and newlines. Blank runs
/// collapse; the final statement needs no terminator.
fn group_stmts(it: &mut Tokens) -> Result<Vec<GroupingExpr>> {
    let mut stmts = Vec::new();
    let mut cur: Vec<GroupingNode> = Vec::new();

    while let Some(token) = it.next() {
        match token.sym() {
            Some(Symbol::Nl) => {
                if !cur.is_empty() {
                    stmts.push(group_expr(std::mem::take(&mut cur), Some(token))?);
                }
            }
            // A bare `;` still terminates a (possibly empty) statement, so
            // `;` alone surfaces as an empty expression at parse time.
            Some(Symbol::Semi) => {
                stmts.push(group_expr(std::mem::take(&mut cur), Some(token))?);
            }
            Some(sym) => match ListSymSet::for_open(sym) {
                Some(set) => cur.push(GroupingNode::List(group_list_inner(it, token, set)?)),
                None => cur.push(GroupingNode::Token(token)),
            },
            None => cur.push(GroupingNode::Token(token)),
        }
    }

    if !cur.is_empty() {
        stmts.push(group_expr(cur, None)?);
    }
    Ok(stmts)
}

/// Consume tokens up to the closing bracket matching `open`, splitting
/// elements at the list's separator. Curly lists additionally split at bare
/// newlines; other newlines inside lists are skipped.
fn group_list_inner(it: &mut Tokens, open: Token, set: &ListSymSet) -> Result<GroupingList> {
    let mut elements = Vec::new();
    let mut cur: Vec<GroupingNode> = Vec::new();
    let mut loc = open.loc().clone();

    loop {
        let Some(token) = it.next() else {
            return Err(CompilerError::syntax(
                format!(
                    "Couldn't find matching closing token '{}' to close this list.",
                    set.close.spelling()
                ),
                open.loc().clone(),
            ));
        };

        let Some(sym) = token.sym() else {
            cur.push(GroupingNode::Token(token));
            continue;
        };

        if let Some(inner_set) = ListSymSet::for_open(sym) {
            cur.push(GroupingNode::List(group_list_inner(it, token, inner_set)?));
            continue;
        }

        if sym == set.close {
            loc = loc.merge(token.loc());
            if !cur.is_empty() {
                elements.push(group_expr(cur, Some(token))?);
            }
            return Ok(GroupingList {
                list_type: set.list_type,
                elements,
                loc,
            });
        }

        if sym == set.sep || (set.sep == Symbol::Semi && sym == Symbol::Nl && !cur.is_empty()) {
            if cur.is_empty() {
                return Err(CompilerError::syntax(
                    "Can't have an empty expression in the middle of a list.",
                    token.loc().clone(),
                ));
            }
            elements.push(group_expr(std::mem::take(&mut cur), Some(token))?);
            continue;
        }

        if sym == Symbol::Nl {
            // Newlines don't separate elements in this list type.
            continue;
        }

        cur.push(GroupingNode::Token(token));
    }
}

/// Wrap a span of nodes into an expression, rejecting stray separators.
fn group_expr(nodes: Vec<GroupingNode>, terminator: Option<Token>) -> Result<GroupingExpr> {
    let loc = join_locs(
        nodes
            .iter()
            .map(GroupingNode::loc)
            .chain(terminator.iter().map(|t| t.loc())),
    );

    for node in &nodes {
        if let GroupingNode::Token(token) = node {
            if let Some(sym) = token.sym() {
                if sym.symbol_type() == SymbolType::Grouping {
                    return Err(CompilerError::syntax(
                        format!(
                            "Unexpected separator token '{}' in the middle of an expression.",
                            sym.spelling()
                        ),
                        token.loc().clone(),
                    )
                    .with_note("While parsing this expression:", loc));
                }
            }
        }
    }

    Ok(GroupingExpr {
        nodes,
        terminator,
        loc,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sddl_diagnostic::{ErrorKind, Source};
    use sddl_lexer::tokenize;

    fn group_src(text: &str) -> Result<Vec<GroupingExpr>> {
        group(tokenize(&Source::new("[test]", text)).unwrap())
    }

    #[test]
    fn statements_split_at_newlines_and_semis() {
        let stmts = group_src("a = 1\nb = 2; c = 3").unwrap();
        assert_eq!(stmts.len(), 3);
        assert_eq!(stmts[0].nodes().len(), 3);
        assert_eq!(stmts[1].terminator().unwrap().sym(), Some(Symbol::Semi));
        // The last statement has no terminator but keeps all its nodes.
        assert!(stmts[2].terminator().is_none());
        assert_eq!(stmts[2].nodes().len(), 3);
    }

    #[test]
    fn blank_lines_collapse() {
        let stmts = group_src("\n\na = 1\n\n\nb = 2\n\n").unwrap();
        assert_eq!(stmts.len(), 2);
    }

    #[test]
    fn bare_semi_produces_empty_statement() {
        let stmts = group_src(";").unwrap();
        assert_eq!(stmts.len(), 1);
        assert!(stmts[0].nodes().is_empty());
        assert!(stmts[0].terminator().is_some());
    }

    #[test]
    fn lists_nest() {
        let stmts = group_src("x = f(a, (b, c))").unwrap();
        assert_eq!(stmts.len(), 1);
        let GroupingNode::List(list) = &stmts[0].nodes()[3] else {
            panic!("expected list");
        };
        assert_eq!(list.list_type(), ListType::Paren);
        assert_eq!(list.elements().len(), 2);
        let GroupingNode::List(inner) = &list.elements()[1].nodes()[0] else {
            panic!("expected nested list");
        };
        assert_eq!(inner.elements().len(), 2);
    }

    #[test]
    fn curly_lists_split_at_newlines() {
        let stmts = group_src("r = {\n a = 1\n b = 2\n}").unwrap();
        let GroupingNode::List(list) = &stmts[0].nodes()[2] else {
            panic!("expected list");
        };
        assert_eq!(list.list_type(), ListType::Curly);
        assert_eq!(list.elements().len(), 2);
    }

    #[test]
    fn newlines_inside_paren_lists_are_skipped() {
        let stmts = group_src("x = f(a,\n b)").unwrap();
        let GroupingNode::List(list) = &stmts[0].nodes()[3] else {
            panic!("expected list");
        };
        assert_eq!(list.elements().len(), 2);
    }

    #[test]
    fn trailing_separator_is_allowed() {
        let stmts = group_src("x = f(a, b,)").unwrap();
        let GroupingNode::List(list) = &stmts[0].nodes()[3] else {
            panic!("expected list");
        };
        assert_eq!(list.elements().len(), 2);
    }

    #[test]
    fn empty_list_element_is_rejected() {
        let err = group_src("x = f(a,, b)").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
        assert!(err
            .message()
            .contains("empty expression in the middle of a list"));
    }

    #[test]
    fn unterminated_list_is_rejected() {
        let err = group_src("x = f(a, b").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
        assert!(err.message().contains("matching closing token ')'"));
    }

    #[test]
    fn stray_separator_in_expression_is_rejected() {
        let err = group_src("x = (a; b)").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
        assert!(err.message().contains("Unexpected separator token ';'"));
        assert_eq!(err.notes().len(), 1);
    }
}
