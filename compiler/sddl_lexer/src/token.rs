use std::fmt;

use sddl_diagnostic::SourceLocation;
use sddl_syntax::Symbol;

/// What a token is, independent of where it came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Sym(Symbol),
    Word(String),
    Num(i64),
}

/// One lexed token with its source range.
#[derive(Clone, Debug)]
pub struct Token {
    kind: TokenKind,
    loc: SourceLocation,
}

impl Token {
    pub fn new(kind: TokenKind, loc: SourceLocation) -> Token {
        Token { kind, loc }
    }

    pub fn kind(&self) -> &TokenKind {
        &self.kind
    }

    pub fn into_parts(self) -> (TokenKind, SourceLocation) {
        (self.kind, self.loc)
    }

    pub fn loc(&self) -> &SourceLocation {
        &self.loc
    }

    /// The symbol this token carries, if it is a symbol token.
    pub fn sym(&self) -> Option<Symbol> {
        match self.kind {
            TokenKind::Sym(sym) => Some(sym),
            _ => None,
        }
    }

    /// How the token reads in source, for quoting in diagnostics.
    pub fn repr(&self) -> String {
        match &self.kind {
            TokenKind::Sym(sym) => sym.spelling().to_string(),
            TokenKind::Word(word) => word.clone(),
            TokenKind::Num(num) => num.to_string(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.repr())
    }
}
