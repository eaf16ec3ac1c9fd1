//! Symbol interning.
//!
//! Every symbol name in the grammar is interned once and addressed by a
//! [`SymbolId`] afterwards. The id packs the symbol's [`SymbolKind`] into
//! its low two bits, so the kind can be recovered from the id alone,
//! without consulting the table, and an id is never zero.

use indexmap::map::Entry;
use indexmap::IndexMap;
use smartstring::alias::String;
use std::fmt;
use std::num::NonZeroU32;

/// The role a symbol plays in the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    /// The augmented start symbol. Exactly one per grammar.
    Start,
    /// A symbol that appears as the left-hand side of some production.
    NonTerminal,
    /// A leaf symbol of the grammar.
    Terminal,
}

impl SymbolKind {
    fn tag(self) -> u32 {
        match self {
            SymbolKind::Start => 1,
            SymbolKind::NonTerminal => 2,
            SymbolKind::Terminal => 3,
        }
    }

    fn from_tag(tag: u32) -> SymbolKind {
        match tag {
            1 => SymbolKind::Start,
            2 => SymbolKind::NonTerminal,
            _ => SymbolKind::Terminal,
        }
    }

    pub fn is_start(self) -> bool {
        self == SymbolKind::Start
    }

    pub fn is_non_terminal(self) -> bool {
        self == SymbolKind::NonTerminal
    }

    pub fn is_terminal(self) -> bool {
        self == SymbolKind::Terminal
    }
}

/// Identifier of an interned symbol.
///
/// The low two bits hold the kind tag and the rest the interning sequence
/// number, so [`SymbolId::kind`] is a pure function of the id. Ids print
/// as plain decimal integers; that form is what the artifact files carry.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(NonZeroU32);

impl SymbolId {
    fn new(seq: u32, kind: SymbolKind) -> SymbolId {
        // The kind tag occupies the low bits and is never zero.
        match NonZeroU32::new((seq << 2) | kind.tag()) {
            Some(raw) => SymbolId(raw),
            None => unreachable!(),
        }
    }

    /// The kind this symbol was interned under.
    pub fn kind(self) -> SymbolKind {
        SymbolKind::from_tag(self.0.get() & 0b11)
    }

    fn index(self) -> usize {
        (self.0.get() >> 2) as usize
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SymbolId({}, {:?})", self.0, self.kind())
    }
}

/// A bijection between symbol names and their ids.
///
/// Interning is idempotent per name: a name that is already present keeps
/// its original id and kind whatever the `kind` argument says (first write
/// wins). That is what forbids a terminal and a non-terminal with the same
/// spelling: the position that reaches the table first decides.
///
/// # Example
/// ```rust
/// # use sousa::grammar::{SymbolKind, SymbolTable};
/// let mut st = SymbolTable::new();
/// let e = st.intern("E", SymbolKind::NonTerminal).unwrap();
/// assert_eq!(st.intern("E", SymbolKind::Terminal), Some(e)); // first write wins
/// assert!(e.kind().is_non_terminal());
/// assert_eq!(st.name_of(e), Some("E"));
/// ```
#[derive(Debug, Default)]
pub struct SymbolTable {
    names: IndexMap<String, SymbolId>,
}

impl SymbolTable {
    pub fn new() -> SymbolTable {
        SymbolTable {
            names: IndexMap::new(),
        }
    }

    /// Interns `name` under `kind` and returns its id.
    ///
    /// Returns the pre-existing id on a name collision, and `None` for an
    /// empty name.
    pub fn intern(&mut self, name: &str, kind: SymbolKind) -> Option<SymbolId> {
        if name.is_empty() {
            return None;
        }
        match self.names.entry(String::from(name)) {
            Entry::Occupied(occupied) => Some(*occupied.get()),
            Entry::Vacant(vacant) => {
                let id = SymbolId::new(vacant.index() as u32, kind);
                vacant.insert(id);
                Some(id)
            }
        }
    }

    /// Id of an already interned name.
    pub fn lookup(&self, name: &str) -> Option<SymbolId> {
        self.names.get(name).copied()
    }

    /// Printable name of an interned id.
    pub fn name_of(&self, id: SymbolId) -> Option<&str> {
        self.names.get_index(id.index()).map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
