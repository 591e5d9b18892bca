//! The three bracketed list forms and their delimiter symbols.

use crate::symbol::Symbol;

/// Which bracketed list form a grouped list came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ListType {
    Paren,
    Square,
    Curly,
}

/// Delimiters for one list form.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListSymSet {
    pub list_type: ListType,
    pub open: Symbol,
    pub close: Symbol,
    pub sep: Symbol,
}

pub const LIST_SYM_SETS: &[ListSymSet] = &[
    ListSymSet {
        list_type: ListType::Paren,
        open: Symbol::ParenOpen,
        close: Symbol::ParenClose,
        sep: Symbol::Comma,
    },
    ListSymSet {
        list_type: ListType::Square,
        open: Symbol::SquareOpen,
        close: Symbol::SquareClose,
        sep: Symbol::Comma,
    },
    ListSymSet {
        list_type: ListType::Curly,
        open: Symbol::CurlyOpen,
        close: Symbol::CurlyClose,
        sep: Symbol::Semi,
    },
];

impl ListSymSet {
    /// Look up the set whose opening bracket is `sym`.
    pub fn for_open(sym: Symbol) -> Option<&'static ListSymSet> {
        LIST_SYM_SETS.iter().find(|s| s.open == sym)
    }

    /// Look up the set for a list type.
    pub fn for_type(list_type: ListType) -> &'static ListSymSet {
        match list_type {
            ListType::Paren => &LIST_SYM_SETS[0],
            ListType::Square => &LIST_SYM_SETS[1],
            ListType::Curly => &LIST_SYM_SETS[2],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_lookup() {
        assert_eq!(
            ListSymSet::for_open(Symbol::ParenOpen).map(|s| s.list_type),
            Some(ListType::Paren)
        );
        assert_eq!(
            ListSymSet::for_open(Symbol::CurlyOpen).map(|s| s.sep),
            Some(Symbol::Semi)
        );
        assert!(ListSymSet::for_open(Symbol::ParenClose).is_none());
    }

    #[test]
    fn type_lookup_matches_open_lookup() {
        for set in LIST_SYM_SETS {
            assert_eq!(ListSymSet::for_type(set.list_type), set);
        }
    }
}
