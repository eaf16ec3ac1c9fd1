//! Error surface of the generator.
//!
//! Library code returns [`Result`] everywhere; the variants of [`Error`]
//! name the pipeline stage that failed. The pipeline aborts at the first
//! error, nothing is retried, and no panic crosses a module boundary.

use crate::lexer::SyntaxError;
use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures across the pipeline, grouped by stage.
#[derive(Debug, Error)]
pub enum Error {
    /// Lexing or parsing of the BNF source failed.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// The grammar has no productions to derive a start symbol from.
    #[error("grammar contains no productions")]
    EmptyGrammar,

    /// The name chosen for the augmented start symbol is already taken.
    #[error("augmented start symbol {name:?} already appears in the grammar")]
    StartClash { name: String },

    /// A production references a symbol with an empty spelling.
    #[error("symbol name is empty")]
    EmptySymbolName,

    /// The parse tree is not shaped like a grammar.
    #[error("malformed syntax tree: production without a left-hand side")]
    MalformedAst,

    /// FIRST was asked for a suffix outside the right-hand side.
    #[error("suffix index {head} out of bounds for production {prod} (rhs length {len})")]
    BadSuffixIndex {
        prod: String,
        head: usize,
        len: usize,
    },

    /// FOLLOW needed a FIRST set that was never computed.
    #[error("no FIRST set for production {prod} at suffix index {head}")]
    MissingFirstSet { prod: String, head: usize },

    /// A reducible item's left-hand side has no FOLLOW set.
    #[error("no FOLLOW set for symbol {symbol}")]
    MissingFollowSet { symbol: String },

    /// An LR(0) item was created with the dot outside the right-hand side.
    #[error("dot position {dot} out of bounds for production {prod} (rhs length {len})")]
    BadDotPosition {
        prod: String,
        dot: usize,
        len: usize,
    },

    /// A derived (non-kernel) item was appended to a kernel.
    #[error("item {item} is not a kernel item")]
    NonKernelItem { item: String },

    /// An item set was created over an empty kernel.
    #[error("kernel of an item set is empty")]
    EmptyKernel,

    /// The automaton was seeded with a symbol that is not the augmented start.
    #[error("symbol {symbol} is not the augmented start symbol")]
    NotStartSymbol { symbol: String },

    /// An initial item was built over a non-start production.
    #[error("production {prod} does not derive from the augmented start")]
    NotStartProduction { prod: String },

    /// The augmented start symbol has no production.
    #[error("no production for the augmented start symbol")]
    MissingStartProduction,

    /// A fingerprint handle did not resolve in the production store.
    #[error("unknown production fingerprint {fingerprint}")]
    UnknownProduction { fingerprint: String },

    /// A fingerprint handle did not resolve to an automaton state.
    #[error("unknown state fingerprint {fingerprint}")]
    UnknownState { fingerprint: String },

    /// A shift action had no goto successor recorded in its state.
    #[error("shift on symbol {symbol} has no goto successor in state {state}")]
    MissingShiftTarget { state: usize, symbol: String },

    /// A non-terminal reached the ACTION table.
    #[error("symbol {symbol} is not a terminal and cannot enter ACTION (state {state})")]
    NonTerminalInAction { state: usize, symbol: String },

    /// A terminal reached the GOTO table.
    #[error("symbol {symbol} is not a non-terminal and cannot enter GOTO (state {state})")]
    TerminalInGoto { state: usize, symbol: String },

    /// The grammar is not SLR(1).
    #[error(transparent)]
    Conflict(#[from] ConflictError),

    /// Reading the grammar or writing an artifact failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Two entries competed for the same parsing-table cell.
///
/// Letting the last write win would silently produce a broken table for a
/// grammar that is not SLR(1), so the collision is reported instead, with
/// the state, the lookahead symbol, and both competing entries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} conflict in state {state} on symbol {symbol}: {existing} vs {incoming}")]
pub struct ConflictError {
    pub kind: ConflictKind,
    pub state: usize,
    pub symbol: String,
    pub existing: String,
    pub incoming: String,
}

/// The flavor of a parsing-table conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    ShiftReduce,
    ReduceReduce,
    AcceptReduce,
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictKind::ShiftReduce => write!(f, "shift/reduce"),
            ConflictKind::ReduceReduce => write!(f, "reduce/reduce"),
            ConflictKind::AcceptReduce => write!(f, "accept/reduce"),
        }
    }
}
