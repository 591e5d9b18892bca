//! The tokenizing loop.

use std::sync::Arc;

use sddl_diagnostic::{CompilerError, Result, Source, SourceLocation};
use sddl_syntax::{Symbol, MATCH_TABLE};

use crate::token::{Token, TokenKind};

/// Tokenize the whole source.
pub fn tokenize(src: &Arc<Source>) -> Result<Vec<Token>> {
    let mut lexer = Lexer { src, pos: 0 };
    let mut tokens = Vec::new();
    loop {
        if let Some(nl) = lexer.skip_gap() {
            tokens.push(nl);
        }
        if lexer.rest().is_empty() {
            break;
        }
        tokens.push(lexer.next_token()?);
    }
    Ok(tokens)
}

struct Lexer<'src> {
    src: &'src Arc<Source>,
    pos: usize,
}

fn is_word_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_number_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '.' || c == '_'
}

impl Lexer<'_> {
    fn rest(&self) -> &str {
        &self.src.text()[self.pos..]
    }

    fn loc(&self, start: usize) -> SourceLocation {
        SourceLocation::new(Arc::clone(self.src), start, self.pos)
    }

    /// Skip whitespace and `#` comments. A gap containing any newline,
    /// including one terminating a comment, yields a single newline token
    /// anchored at the first such newline.
    fn skip_gap(&mut self) -> Option<Token> {
        let mut newline_at = None;
        loop {
            match self.rest().chars().next() {
                Some('#') => {
                    let line_end = self
                        .rest()
                        .find('\n')
                        .map_or(self.src.len(), |i| self.pos + i);
                    self.pos = line_end;
                }
                Some('\n') => {
                    newline_at.get_or_insert(self.pos);
                    self.pos += 1;
                }
                Some(c) if c.is_whitespace() => {
                    self.pos += c.len_utf8();
                }
                _ => break,
            }
        }
        newline_at.map(|at| {
            Token::new(
                TokenKind::Sym(Symbol::Nl),
                SourceLocation::new(Arc::clone(self.src), at, at + 1),
            )
        })
    }

    fn next_token(&mut self) -> Result<Token> {
        let c = match self.rest().chars().next() {
            Some(c) => c,
            None => {
                return Err(CompilerError::invariant(
                    "Tokenizer ran past the end of the source.",
                    self.loc(self.pos),
                ))
            }
        };
        if is_word_start(c) {
            Ok(self.word())
        } else if c.is_ascii_digit() {
            self.number()
        } else {
            self.punctuation(c)
        }
    }

    fn word(&mut self) -> Token {
        let start = self.pos;
        let len = self
            .rest()
            .find(|c| !is_word_char(c))
            .unwrap_or(self.rest().len());
        self.pos += len;
        let word = &self.src.text()[start..self.pos];
        // Word-shaped symbols must match the whole word, never a prefix.
        let kind = match MATCH_TABLE.iter().find(|&&(s, _)| s == word) {
            Some(&(_, sym)) => TokenKind::Sym(sym),
            None => TokenKind::Word(word.to_string()),
        };
        Token::new(kind, self.loc(start))
    }

    fn number(&mut self) -> Result<Token> {
        let start = self.pos;
        let len = self
            .rest()
            .find(|c| !is_number_char(c))
            .unwrap_or(self.rest().len());
        self.pos += len;
        let run = &self.src.text()[start..self.pos];
        let parsed = if let Some(hex) = run.strip_prefix("0x").or_else(|| run.strip_prefix("0X")) {
            i64::from_str_radix(hex, 16)
        } else if run.len() > 1 && run.starts_with('0') {
            i64::from_str_radix(&run[1..], 8)
        } else {
            run.parse()
        };
        match parsed {
            Ok(num) => Ok(Token::new(TokenKind::Num(num), self.loc(start))),
            Err(e) if *e.kind() == std::num::IntErrorKind::PosOverflow => Err(
                CompilerError::syntax(format!("Numeric token '{run}' is out of range."), self.loc(start)),
            ),
            Err(_) => Err(CompilerError::syntax(
                format!("Couldn't parse numeric token '{run}'."),
                self.loc(start),
            )),
        }
    }

    fn punctuation(&mut self, lead: char) -> Result<Token> {
        let start = self.pos;
        // First table entry whose spelling is a prefix of the remaining
        // input wins, so multi-byte operators sit before their prefixes.
        for &(s, sym) in MATCH_TABLE {
            if self.rest().starts_with(s) {
                self.pos += s.len();
                return Ok(Token::new(TokenKind::Sym(sym), self.loc(start)));
            }
        }
        self.pos += lead.len_utf8();
        Err(CompilerError::syntax(
            format!("Unrecognized character '{lead}'."),
            self.loc(start),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sddl_diagnostic::ErrorKind;

    fn lex(text: &str) -> Vec<Token> {
        tokenize(&Source::new("[test]", text)).unwrap()
    }

    fn kinds(text: &str) -> Vec<TokenKind> {
        lex(text).into_iter().map(|t| t.kind().clone()).collect()
    }

    #[test]
    fn words_and_symbols() {
        assert_eq!(
            kinds("foo = UInt32LE"),
            vec![
                TokenKind::Word("foo".to_string()),
                TokenKind::Sym(Symbol::Assign),
                TokenKind::Sym(Symbol::U32Le),
            ]
        );
    }

    #[test]
    fn multi_byte_operators_win_over_prefixes() {
        assert_eq!(
            kinds("a == b >= c = d"),
            vec![
                TokenKind::Word("a".to_string()),
                TokenKind::Sym(Symbol::Eq),
                TokenKind::Word("b".to_string()),
                TokenKind::Sym(Symbol::Ge),
                TokenKind::Word("c".to_string()),
                TokenKind::Sym(Symbol::Assign),
                TokenKind::Word("d".to_string()),
            ]
        );
    }

    #[test]
    fn keywords_match_whole_words_only() {
        assert_eq!(
            kinds("diet sizeofx expect"),
            vec![
                TokenKind::Word("diet".to_string()),
                TokenKind::Word("sizeofx".to_string()),
                TokenKind::Sym(Symbol::Expect),
            ]
        );
    }

    #[test]
    fn number_bases() {
        assert_eq!(kinds("10"), vec![TokenKind::Num(10)]);
        assert_eq!(kinds("0x1F"), vec![TokenKind::Num(31)]);
        assert_eq!(kinds("017"), vec![TokenKind::Num(15)]);
        assert_eq!(kinds("0"), vec![TokenKind::Num(0)]);
    }

    #[test]
    fn bad_numbers_are_syntax_errors() {
        for text in ["1.5", "0x", "12abc", "1_000", "99999999999999999999"] {
            let err = tokenize(&Source::new("[test]", text)).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Syntax, "{text}");
        }
    }

    #[test]
    fn gaps_collapse_to_one_newline() {
        let toks = lex("a\n\n  # comment\n\nb");
        assert_eq!(
            toks.iter().map(|t| t.kind().clone()).collect::<Vec<_>>(),
            vec![
                TokenKind::Word("a".to_string()),
                TokenKind::Sym(Symbol::Nl),
                TokenKind::Word("b".to_string()),
            ]
        );
        // The newline token anchors at the first newline of the gap.
        assert_eq!(toks[1].loc().start(), 1);
        assert_eq!(toks[1].loc().size(), 1);
    }

    #[test]
    fn comment_terminating_newline_counts() {
        assert_eq!(
            kinds("a # trailing\nb"),
            vec![
                TokenKind::Word("a".to_string()),
                TokenKind::Sym(Symbol::Nl),
                TokenKind::Word("b".to_string()),
            ]
        );
        // A comment with no newline after it emits nothing.
        assert_eq!(kinds("a # eof"), vec![TokenKind::Word("a".to_string())]);
    }

    #[test]
    fn unrecognized_character() {
        let err = tokenize(&Source::new("[test]", "a @ b")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
        assert!(err.message().contains('@'));
        assert_eq!(err.location().start(), 2);
        assert_eq!(err.location().size(), 1);
    }

    #[test]
    fn locations_cover_token_text() {
        let toks = lex("abc = 0x10");
        assert_eq!(toks[0].loc().text(), "abc");
        assert_eq!(toks[1].loc().text(), "=");
        assert_eq!(toks[2].loc().text(), "0x10");
    }
}
