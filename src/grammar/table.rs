//! SLR(1) parsing-table assembly.
//!
//! Walks every state of the LR(0) automaton: reducible items install
//! reductions on the FOLLOW set of their left-hand side (or mark the state
//! accepting when the left-hand side is the augmented start), non-reducible
//! items expecting a terminal install shifts along the state's goto edges,
//! and goto edges on non-terminals become the GOTO table. Competing entries
//! for one cell are a [`ConflictError`], not a silent overwrite.

use crate::error::{ConflictError, ConflictKind, Error, Result};
use crate::grammar::automaton::Lr0Automaton;
use crate::grammar::follow::FollowSets;
use crate::grammar::production::Productions;
use crate::grammar::symbol::SymbolId;
use crate::grammar::Fingerprint;
use indexmap::IndexMap;

/// A terminal-column entry of the ACTION table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Shift and move to the state with this kernel fingerprint.
    Shift(Fingerprint),
    /// Reduce by the production with this fingerprint.
    Reduce(Fingerprint),
}

/// The ACTION entries of one state.
#[derive(Debug, Default)]
pub struct Actions {
    actions: IndexMap<SymbolId, Action>,
    acceptable: bool,
    reduce_by_eof: Option<Fingerprint>,
}

impl Actions {
    /// Per-terminal actions of the state.
    pub fn actions(&self) -> impl Iterator<Item = (SymbolId, Action)> + '_ {
        self.actions.iter().map(|(sym, action)| (*sym, *action))
    }

    pub fn action(&self, sym: SymbolId) -> Option<Action> {
        self.actions.get(&sym).copied()
    }

    /// Whether the state accepts the input on EOF.
    pub fn is_acceptable(&self) -> bool {
        self.acceptable
    }

    /// Production to reduce by on EOF, if any.
    pub fn reduce_by_eof(&self) -> Option<Fingerprint> {
        self.reduce_by_eof
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// The SLR(1) parsing table.
///
/// Both maps are keyed by kernel fingerprint; the `states` snapshot maps
/// fingerprints to the automaton's discovery numbers, which is what the
/// artifact files print.
#[derive(Debug)]
pub struct ParsingTable {
    states: IndexMap<Fingerprint, usize>,
    initial: Fingerprint,
    actions: IndexMap<Fingerprint, Actions>,
    gotos: IndexMap<Fingerprint, IndexMap<SymbolId, Fingerprint>>,
}

impl ParsingTable {
    /// Discovery number of a state.
    pub fn state_number(&self, fp: Fingerprint) -> Option<usize> {
        self.states.get(&fp).copied()
    }

    /// Kernel fingerprint of the start state.
    pub fn initial(&self) -> Fingerprint {
        self.initial
    }

    /// States that have at least one ACTION entry.
    pub fn actions(&self) -> impl Iterator<Item = (Fingerprint, &Actions)> + '_ {
        self.actions.iter().map(|(fp, actions)| (*fp, actions))
    }

    pub fn actions_of(&self, fp: Fingerprint) -> Option<&Actions> {
        self.actions.get(&fp)
    }

    /// States that have at least one GOTO entry.
    pub fn gotos(&self) -> impl Iterator<Item = (Fingerprint, &IndexMap<SymbolId, Fingerprint>)> + '_ {
        self.gotos.iter().map(|(fp, map)| (*fp, map))
    }

    pub fn gotos_of(&self, fp: Fingerprint) -> Option<&IndexMap<SymbolId, Fingerprint>> {
        self.gotos.get(&fp)
    }

    fn render_action(&self, action: Action, prods: &Productions) -> String {
        match action {
            Action::Shift(next) => match self.state_number(next) {
                Some(number) => format!("shift to state {number}"),
                None => format!("shift to {next:?}"),
            },
            Action::Reduce(fp) => match prods.by_fingerprint(fp) {
                Some(prod) => format!("reduce by {prod}"),
                None => format!("reduce by {fp:?}"),
            },
        }
    }

    fn append_action(
        &mut self,
        state: Fingerprint,
        number: usize,
        sym: SymbolId,
        action: Action,
        prods: &Productions,
    ) -> Result<()> {
        if !sym.kind().is_terminal() {
            return Err(Error::NonTerminalInAction {
                state: number,
                symbol: sym.to_string(),
            });
        }
        let existing = self.actions.entry(state).or_default().actions.get(&sym).copied();
        match existing {
            Some(existing) if existing == action => Ok(()),
            Some(existing) => {
                let kind = match (existing, action) {
                    (Action::Reduce(_), Action::Reduce(_)) => ConflictKind::ReduceReduce,
                    _ => ConflictKind::ShiftReduce,
                };
                Err(ConflictError {
                    kind,
                    state: number,
                    symbol: sym.to_string(),
                    existing: self.render_action(existing, prods),
                    incoming: self.render_action(action, prods),
                }
                .into())
            }
            None => {
                match self.actions.get_mut(&state) {
                    Some(actions) => actions.actions.insert(sym, action),
                    None => unreachable!(),
                };
                Ok(())
            }
        }
    }

    fn append_reduce_by_eof(
        &mut self,
        state: Fingerprint,
        number: usize,
        prod: Fingerprint,
        prods: &Productions,
    ) -> Result<()> {
        let (acceptable, reduce_by_eof) = {
            let entry = self.actions.entry(state).or_default();
            (entry.acceptable, entry.reduce_by_eof)
        };
        if acceptable {
            return Err(ConflictError {
                kind: ConflictKind::AcceptReduce,
                state: number,
                symbol: "$".into(),
                existing: "accept".into(),
                incoming: self.render_action(Action::Reduce(prod), prods),
            }
            .into());
        }
        match reduce_by_eof {
            Some(existing) if existing == prod => Ok(()),
            Some(existing) => Err(ConflictError {
                kind: ConflictKind::ReduceReduce,
                state: number,
                symbol: "$".into(),
                existing: self.render_action(Action::Reduce(existing), prods),
                incoming: self.render_action(Action::Reduce(prod), prods),
            }
            .into()),
            None => {
                match self.actions.get_mut(&state) {
                    Some(actions) => actions.reduce_by_eof = Some(prod),
                    None => unreachable!(),
                }
                Ok(())
            }
        }
    }

    fn append_accept(
        &mut self,
        state: Fingerprint,
        number: usize,
        prods: &Productions,
    ) -> Result<()> {
        let reduce_by_eof = self.actions.entry(state).or_default().reduce_by_eof;
        if let Some(existing) = reduce_by_eof {
            return Err(ConflictError {
                kind: ConflictKind::AcceptReduce,
                state: number,
                symbol: "$".into(),
                existing: self.render_action(Action::Reduce(existing), prods),
                incoming: "accept".into(),
            }
            .into());
        }
        match self.actions.get_mut(&state) {
            Some(actions) => actions.acceptable = true,
            None => unreachable!(),
        }
        Ok(())
    }

    fn append_goto(
        &mut self,
        state: Fingerprint,
        number: usize,
        sym: SymbolId,
        next: Fingerprint,
    ) -> Result<()> {
        if !sym.kind().is_non_terminal() {
            return Err(Error::TerminalInGoto {
                state: number,
                symbol: sym.to_string(),
            });
        }
        self.gotos.entry(state).or_default().insert(sym, next);
        Ok(())
    }
}

/// Fills ACTION and GOTO from the automaton and the FOLLOW sets.
///
/// `prods` resolves production fingerprints when a conflict has to be
/// rendered.
pub fn generate_slr_table(
    automaton: &Lr0Automaton,
    follow: &FollowSets,
    prods: &Productions,
) -> Result<ParsingTable> {
    let mut states = IndexMap::new();
    for state in automaton.states() {
        states.insert(state.fingerprint(), states.len());
    }

    let mut table = ParsingTable {
        states,
        initial: automaton.initial(),
        actions: IndexMap::new(),
        gotos: IndexMap::new(),
    };

    for (number, state) in automaton.states().enumerate() {
        let fp = state.fingerprint();
        for item in state.items() {
            if item.is_reducible() {
                if item.lhs().kind().is_start() {
                    table.append_accept(fp, number, prods)?;
                    continue;
                }
                let lhs_follow = follow.get(item.lhs()).ok_or_else(|| {
                    Error::MissingFollowSet {
                        symbol: item.lhs().to_string(),
                    }
                })?;
                for terminal in lhs_follow.terminals() {
                    table.append_action(
                        fp,
                        number,
                        terminal,
                        Action::Reduce(item.production()),
                        prods,
                    )?;
                }
                if lhs_follow.has_eof() {
                    table.append_reduce_by_eof(fp, number, item.production(), prods)?;
                }
            } else {
                let Some(sym) = item.next_symbol() else {
                    continue;
                };
                if !sym.kind().is_terminal() {
                    // transitions on non-terminals are GOTO entries
                    continue;
                }
                let next = state.goto(sym).ok_or_else(|| Error::MissingShiftTarget {
                    state: number,
                    symbol: sym.to_string(),
                })?;
                table.append_action(fp, number, sym, Action::Shift(next), prods)?;
            }
        }

        for (sym, next) in state.gotos() {
            if sym.kind().is_non_terminal() {
                table.append_goto(fp, number, sym, next)?;
            }
        }
    }

    Ok(table)
}
