//! The closed `Symbol` enumeration and its string tables.

use std::fmt;

/// Every lexical symbol in the language: grouping tokens, operators, and
/// keyword field types.
///
/// A handful of symbols (`Nl`, `Atom`, `Record`, `Array`, `Dest`, `Bind`,
/// `Neg`) cannot be produced by the tokenizer; they are synthesized by the
/// grouper or by grammar rules and exist here so they share the same
/// classification and serialization machinery.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    // Grouping
    Nl,
    Semi,
    Comma,
    ParenOpen,
    ParenClose,
    CurlyOpen,
    CurlyClose,
    SquareOpen,
    SquareClose,

    // Operators
    Die,
    Expect,
    Consume,
    Sizeof,
    Send,
    Assign,
    Assume,
    Member,
    Bind,
    Neg,
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    Add,
    Sub,
    Mul,
    Div,
    Mod,

    // Keyword field types
    Byte,
    U8,
    I8,
    U16Le,
    U16Be,
    I16Le,
    I16Be,
    U32Le,
    U32Be,
    I32Le,
    I32Be,
    U64Le,
    U64Be,
    I64Le,
    I64Be,
    F8,
    F16Le,
    F16Be,
    F32Le,
    F32Be,
    F64Le,
    F64Be,
    Bf8,
    Bf16Le,
    Bf16Be,
    Bf32Le,
    Bf32Be,
    Bf64Le,
    Bf64Be,
    Poison,
    Atom,
    Record,
    Array,
    Dest,
}

/// Coarse classification of a symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SymbolType {
    /// Statement/list structure: separators and brackets. Grouping symbols
    /// are consumed by the grouper and never appear inside an expression.
    Grouping,
    /// Expression operators.
    Operator,
    /// Keyword field types (`Byte`, `UInt32LE`, `Poison`, ...).
    Keyword,
}

/// The keyword field-type symbols that have a built-in fixed-width encoding.
pub const BUILTIN_FIELD_SYMS: &[Symbol] = &[
    Symbol::Byte,
    Symbol::U8,
    Symbol::I8,
    Symbol::U16Le,
    Symbol::U16Be,
    Symbol::I16Le,
    Symbol::I16Be,
    Symbol::U32Le,
    Symbol::U32Be,
    Symbol::I32Le,
    Symbol::I32Be,
    Symbol::U64Le,
    Symbol::U64Be,
    Symbol::I64Le,
    Symbol::I64Be,
    Symbol::F8,
    Symbol::F16Le,
    Symbol::F16Be,
    Symbol::F32Le,
    Symbol::F32Be,
    Symbol::F64Le,
    Symbol::F64Be,
    Symbol::Bf8,
    Symbol::Bf16Le,
    Symbol::Bf16Be,
    Symbol::Bf32Le,
    Symbol::Bf32Be,
    Symbol::Bf64Le,
    Symbol::Bf64Be,
];

/// The tokenizer's match table, in match order.
///
/// Order is significant: for punctuation the tokenizer takes the *first*
/// entry whose spelling is a prefix of the remaining input, so multi-byte
/// operators must precede their single-byte prefixes (`==` before `=`,
/// `>=` before `>`, ...). Word-shaped entries (keywords and the word
/// operators `die`/`expect`/`consume`/`sizeof`/`sendto`) are only ever
/// matched exactly against a complete word.
pub const MATCH_TABLE: &[(&str, Symbol)] = &[
    (";", Symbol::Semi),
    (",", Symbol::Comma),
    ("(", Symbol::ParenOpen),
    (")", Symbol::ParenClose),
    ("{", Symbol::CurlyOpen),
    ("}", Symbol::CurlyClose),
    ("[", Symbol::SquareOpen),
    ("]", Symbol::SquareClose),
    ("==", Symbol::Eq),
    ("!=", Symbol::Ne),
    (">=", Symbol::Ge),
    (">", Symbol::Gt),
    ("<=", Symbol::Le),
    ("<", Symbol::Lt),
    ("=", Symbol::Assign),
    ("+", Symbol::Add),
    ("-", Symbol::Sub),
    ("*", Symbol::Mul),
    ("/", Symbol::Div),
    ("%", Symbol::Mod),
    (":", Symbol::Assume),
    (".", Symbol::Member),
    ("die", Symbol::Die),
    ("expect", Symbol::Expect),
    ("consume", Symbol::Consume),
    ("sizeof", Symbol::Sizeof),
    ("sendto", Symbol::Send),
    ("Byte", Symbol::Byte),
    ("UInt8", Symbol::U8),
    ("Int8", Symbol::I8),
    ("UInt16LE", Symbol::U16Le),
    ("UInt16BE", Symbol::U16Be),
    ("Int16LE", Symbol::I16Le),
    ("Int16BE", Symbol::I16Be),
    ("UInt32LE", Symbol::U32Le),
    ("UInt32BE", Symbol::U32Be),
    ("Int32LE", Symbol::I32Le),
    ("Int32BE", Symbol::I32Be),
    ("UInt64LE", Symbol::U64Le),
    ("UInt64BE", Symbol::U64Be),
    ("Int64LE", Symbol::I64Le),
    ("Int64BE", Symbol::I64Be),
    ("Float8", Symbol::F8),
    ("Float16LE", Symbol::F16Le),
    ("Float16BE", Symbol::F16Be),
    ("Float32LE", Symbol::F32Le),
    ("Float32BE", Symbol::F32Be),
    ("Float64LE", Symbol::F64Le),
    ("Float64BE", Symbol::F64Be),
    ("BFloat8", Symbol::Bf8),
    ("BFloat16LE", Symbol::Bf16Le),
    ("BFloat16BE", Symbol::Bf16Be),
    ("BFloat32LE", Symbol::Bf32Le),
    ("BFloat32BE", Symbol::Bf32Be),
    ("BFloat64LE", Symbol::Bf64Le),
    ("BFloat64BE", Symbol::Bf64Be),
    ("Poison", Symbol::Poison),
];

impl Symbol {
    /// Classify this symbol.
    pub fn symbol_type(self) -> SymbolType {
        use Symbol::*;
        match self {
            Nl | Semi | Comma | ParenOpen | ParenClose | CurlyOpen | CurlyClose | SquareOpen
            | SquareClose => SymbolType::Grouping,
            Die | Expect | Consume | Sizeof | Send | Assign | Assume | Member | Bind | Neg | Eq
            | Ne | Gt | Ge | Lt | Le | Add | Sub | Mul | Div | Mod => SymbolType::Operator,
            Byte | U8 | I8 | U16Le | U16Be | I16Le | I16Be | U32Le | U32Be | I32Le | I32Be
            | U64Le | U64Be | I64Le | I64Be | F8 | F16Le | F16Be | F32Le | F32Be | F64Le
            | F64Be | Bf8 | Bf16Le | Bf16Be | Bf32Le | Bf32Be | Bf64Le | Bf64Be | Poison
            | Atom | Record | Array | Dest => SymbolType::Keyword,
        }
    }

    /// Uppercase name used in diagnostics and debug dumps.
    pub fn debug_str(self) -> &'static str {
        use Symbol::*;
        match self {
            Nl => "NL",
            Semi => "SEMI",
            Comma => "COMMA",
            ParenOpen => "PAREN_OPEN",
            ParenClose => "PAREN_CLOSE",
            CurlyOpen => "CURLY_OPEN",
            CurlyClose => "CURLY_CLOSE",
            SquareOpen => "SQUARE_OPEN",
            SquareClose => "SQUARE_CLOSE",
            Die => "DIE",
            Expect => "EXPECT",
            Consume => "CONSUME",
            Sizeof => "SIZEOF",
            Send => "SEND",
            Assign => "ASSIGN",
            Assume => "ASSUME",
            Member => "MEMBER",
            Bind => "BIND",
            Neg => "NEG",
            Eq => "EQ",
            Ne => "NE",
            Gt => "GT",
            Ge => "GE",
            Lt => "LT",
            Le => "LE",
            Add => "ADD",
            Sub => "SUB",
            Mul => "MUL",
            Div => "DIV",
            Mod => "MOD",
            Byte => "BYTE",
            U8 => "U8",
            I8 => "I8",
            U16Le => "U16LE",
            U16Be => "U16BE",
            I16Le => "I16LE",
            I16Be => "I16BE",
            U32Le => "U32LE",
            U32Be => "U32BE",
            I32Le => "I32LE",
            I32Be => "I32BE",
            U64Le => "U64LE",
            U64Be => "U64BE",
            I64Le => "I64LE",
            I64Be => "I64BE",
            F8 => "F8",
            F16Le => "F16LE",
            F16Be => "F16BE",
            F32Le => "F32LE",
            F32Be => "F32BE",
            F64Le => "F64LE",
            F64Be => "F64BE",
            Bf8 => "BF8",
            Bf16Le => "BF16LE",
            Bf16Be => "BF16BE",
            Bf32Le => "BF32LE",
            Bf32Be => "BF32BE",
            Bf64Le => "BF64LE",
            Bf64Be => "BF64BE",
            Poison => "POISON",
            Atom => "ATOM",
            Record => "RECORD",
            Array => "ARRAY",
            Dest => "DEST",
        }
    }

    /// Canonical source spelling, used when quoting a symbol back at the
    /// user. Symbols the tokenizer cannot produce still have a spelling
    /// here for diagnostics (`Nl` renders as `\n`).
    pub fn spelling(self) -> &'static str {
        use Symbol::*;
        match self {
            Nl => "\\n",
            Atom => "Atom",
            Record => "Record",
            Array => "Array",
            Dest => "Dest",
            Bind => "bind",
            Neg => "-",
            _ => {
                // Every remaining symbol has exactly one match-table entry.
                for &(s, sym) in MATCH_TABLE {
                    if sym == self {
                        return s;
                    }
                }
                self.debug_str()
            }
        }
    }

    /// Serialization tag, the wire contract with the dispatch engine.
    ///
    /// Grouping symbols have no serialized form and return `None`.
    pub fn ser_str(self) -> Option<&'static str> {
        use Symbol::*;
        Some(match self {
            Nl | Semi | Comma | ParenOpen | ParenClose | CurlyOpen | CurlyClose | SquareOpen
            | SquareClose => return None,
            Eq => "eq",
            Ne => "ne",
            Gt => "gt",
            Ge => "ge",
            Lt => "lt",
            Le => "le",
            Add => "add",
            Sub => "sub",
            Mul => "mul",
            Div => "div",
            Mod => "mod",
            Die => "die",
            Expect => "expect",
            Consume => "consume",
            Sizeof => "sizeof",
            Send => "send",
            Assign => "assign",
            Assume => "assume",
            Member => "member",
            Bind => "bind",
            Neg => "neg",
            Byte => "byte",
            U8 => "u1",
            I8 => "i1",
            U16Le => "u2l",
            U16Be => "u2b",
            I16Le => "i2l",
            I16Be => "i2b",
            U32Le => "u4l",
            U32Be => "u4b",
            I32Le => "i4l",
            I32Be => "i4b",
            U64Le => "u8l",
            U64Be => "u8b",
            I64Le => "i8l",
            I64Be => "i8b",
            F8 => "f1",
            F16Le => "f2l",
            F16Be => "f2b",
            F32Le => "f4l",
            F32Be => "f4b",
            F64Le => "f8l",
            F64Be => "f8b",
            Bf8 => "bf1",
            Bf16Le => "bf2l",
            Bf16Be => "bf2b",
            Bf32Le => "bf4l",
            Bf32Be => "bf4b",
            Bf64Le => "bf8l",
            Bf64Be => "bf8b",
            Poison => "poison",
            Atom => "atom",
            Record => "record",
            Array => "array",
            Dest => "dest",
        })
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.debug_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn multi_byte_operators_precede_their_prefixes() {
        let pos = |needle: &str| {
            MATCH_TABLE
                .iter()
                .position(|&(s, _)| s == needle)
                .unwrap_or_else(|| panic!("{needle} missing from match table"))
        };
        assert!(pos("==") < pos("="));
        assert!(pos(">=") < pos(">"));
        assert!(pos("<=") < pos("<"));
    }

    #[test]
    fn match_table_spellings_round_trip() {
        for &(s, sym) in MATCH_TABLE {
            assert_eq!(sym.spelling(), s);
        }
    }

    #[test]
    fn grouping_symbols_have_no_ser_tag() {
        assert_eq!(Symbol::Semi.ser_str(), None);
        assert_eq!(Symbol::ParenOpen.ser_str(), None);
        assert_eq!(Symbol::Nl.ser_str(), None);
    }

    #[test]
    fn builtin_field_tags() {
        assert_eq!(Symbol::U8.ser_str(), Some("u1"));
        assert_eq!(Symbol::U32Le.ser_str(), Some("u4l"));
        assert_eq!(Symbol::I64Be.ser_str(), Some("i8b"));
        assert_eq!(Symbol::Bf16Le.ser_str(), Some("bf2l"));
        assert_eq!(Symbol::Byte.ser_str(), Some("byte"));
        for &sym in BUILTIN_FIELD_SYMS {
            assert!(sym.ser_str().is_some());
            assert_eq!(sym.symbol_type(), SymbolType::Keyword);
        }
    }

    #[test]
    fn classification_is_total() {
        assert_eq!(Symbol::Comma.symbol_type(), SymbolType::Grouping);
        assert_eq!(Symbol::Assume.symbol_type(), SymbolType::Operator);
        assert_eq!(Symbol::Neg.symbol_type(), SymbolType::Operator);
        assert_eq!(Symbol::Poison.symbol_type(), SymbolType::Keyword);
        assert_eq!(Symbol::Dest.symbol_type(), SymbolType::Keyword);
    }

    #[test]
    fn unlexable_symbols_have_spellings() {
        assert_eq!(Symbol::Nl.spelling(), "\\n");
        assert_eq!(Symbol::Record.spelling(), "Record");
        assert_eq!(Symbol::Neg.spelling(), "-");
        assert_eq!(Symbol::Bind.spelling(), "bind");
    }
}
