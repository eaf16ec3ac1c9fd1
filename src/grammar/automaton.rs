//! LR(0) items, kernels, item sets, and the canonical collection.
//!
//! A state is identified by the fingerprint of its kernel. Two states with
//! the same kernel are the same state no matter how they were discovered,
//! which is what deduplicates the collection. Item sets reference their
//! successors by kernel fingerprint, never by pointer; the automaton owns
//! every state and all traversal goes through its index.

use crate::error::{Error, Result};
use crate::grammar::production::{Production, Productions};
use crate::grammar::symbol::SymbolId;
use crate::grammar::Fingerprint;
use indexmap::IndexMap;
use std::collections::VecDeque;

/// An LR(0) item: a production plus a dot marking recognition progress.
///
/// ```text
/// E -> E + T
///
/// dot | item
/// ----+--------------
/// 0   | E -> . E + T
/// 1   | E -> E . + T
/// 3   | E -> E + T .
/// ```
///
/// The item holds the production by fingerprint handle, plus the bits of
/// the production it is asked about constantly: the left-hand side and the
/// symbol after the dot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lr0Item {
    fingerprint: Fingerprint,
    prod: Fingerprint,
    lhs: SymbolId,
    dot: usize,
    next: Option<SymbolId>,
    initial: bool,
}

impl Lr0Item {
    /// Item over `prod` with the dot at `dot`. The dot may sit anywhere
    /// from 0 to the full right-hand-side length, where the item becomes
    /// reducible.
    pub fn new(prod: &Production, dot: usize) -> Result<Lr0Item> {
        if dot > prod.rhs_len() {
            return Err(Error::BadDotPosition {
                prod: prod.fingerprint_text(),
                dot,
                len: prod.rhs_len(),
            });
        }
        Ok(Lr0Item::build(prod, dot, false))
    }

    /// The augmented root item `S' -> . S`.
    pub fn initial(prod: &Production) -> Result<Lr0Item> {
        if !prod.lhs().kind().is_start() {
            return Err(Error::NotStartProduction {
                prod: prod.fingerprint_text(),
            });
        }
        Ok(Lr0Item::build(prod, 0, true))
    }

    fn build(prod: &Production, dot: usize, initial: bool) -> Lr0Item {
        let mut fingerprint = Fingerprint::seed();
        fingerprint.update(&prod.fingerprint().to_bytes());
        fingerprint.update(b"-");
        fingerprint.update(dot.to_string().as_bytes());
        Lr0Item {
            fingerprint,
            prod: prod.fingerprint(),
            lhs: prod.lhs(),
            dot,
            next: prod.rhs().get(dot).copied(),
            initial,
        }
    }

    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    /// Fingerprint handle of the item's production.
    pub fn production(&self) -> Fingerprint {
        self.prod
    }

    pub fn lhs(&self) -> SymbolId {
        self.lhs
    }

    pub fn dot(&self) -> usize {
        self.dot
    }

    /// The symbol immediately after the dot; `None` once the dot has
    /// passed the whole right-hand side.
    pub fn next_symbol(&self) -> Option<SymbolId> {
        self.next
    }

    /// Whether the dot sits at the end of the right-hand side.
    pub fn is_reducible(&self) -> bool {
        self.next.is_none()
    }

    /// Whether this is the augmented root item.
    pub fn is_initial(&self) -> bool {
        self.initial
    }

    /// Kernel items identify a state: the root item, or any item with a
    /// non-zero dot.
    pub fn is_kernel(&self) -> bool {
        self.initial || self.dot > 0
    }

    fn render(&self) -> String {
        if self.is_reducible() {
            format!("{:?}-#", self.prod)
        } else {
            format!("{:?}-{}", self.prod, self.dot)
        }
    }
}

/// The kernel items of a state under construction.
#[derive(Debug, Clone, Default)]
pub struct KernelItems {
    items: IndexMap<Fingerprint, Lr0Item>,
}

impl KernelItems {
    pub fn new() -> KernelItems {
        KernelItems::default()
    }

    /// Adds a kernel item; derived items are rejected.
    pub fn append(&mut self, item: Lr0Item) -> Result<()> {
        if !item.is_kernel() {
            return Err(Error::NonKernelItem {
                item: item.render(),
            });
        }
        self.items.insert(item.fingerprint(), item);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The canonical state identity.
    ///
    /// Items are sorted by (lhs, dot, production fingerprint) and joined;
    /// reducible items contribute a `#` sentinel in place of the dot. The
    /// result is stable under any insertion order.
    pub fn fingerprint(&self) -> Fingerprint {
        let mut items: Vec<&Lr0Item> = self.items.values().collect();
        items.sort_by_key(|item| (item.lhs, item.dot, item.prod));

        let mut fp = Fingerprint::seed();
        for (n, item) in items.iter().enumerate() {
            if n > 0 {
                fp.update(b"/");
            }
            fp.update(&item.prod.to_bytes());
            fp.update(b"-");
            if item.is_reducible() {
                fp.update(b"#");
            } else {
                fp.update(item.dot.to_string().as_bytes());
            }
        }
        fp
    }
}

/// A state of the LR(0) automaton: kernel identity, closed item set, and
/// goto edges to successor states by kernel fingerprint.
#[derive(Debug, Clone)]
pub struct Lr0ItemSet {
    fingerprint: Fingerprint,
    items: IndexMap<Fingerprint, Lr0Item>,
    gotos: IndexMap<SymbolId, Fingerprint>,
}

impl Lr0ItemSet {
    /// State over `kernel`. The item set starts as the kernel items and is
    /// completed by [`Lr0ItemSet::compute_closure`] exactly once, before
    /// the state becomes reachable.
    pub fn new(kernel: KernelItems) -> Result<Lr0ItemSet> {
        if kernel.is_empty() {
            return Err(Error::EmptyKernel);
        }
        let fingerprint = kernel.fingerprint();
        Ok(Lr0ItemSet {
            fingerprint,
            items: kernel.items,
            gotos: IndexMap::new(),
        })
    }

    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    pub fn items(&self) -> impl Iterator<Item = &Lr0Item> + '_ {
        self.items.values()
    }

    pub fn contains_item(&self, fp: Fingerprint) -> bool {
        self.items.contains_key(&fp)
    }

    pub fn items_len(&self) -> usize {
        self.items.len()
    }

    /// Goto edges out of this state.
    pub fn gotos(&self) -> impl Iterator<Item = (SymbolId, Fingerprint)> + '_ {
        self.gotos.iter().map(|(sym, fp)| (*sym, *fp))
    }

    pub fn goto(&self, sym: SymbolId) -> Option<Fingerprint> {
        self.gotos.get(&sym).copied()
    }

    /// Completes the item set: every item expecting a non-terminal X pulls
    /// in the dot-at-start item of every production of X, until a full
    /// pass adds nothing.
    pub fn compute_closure(&mut self, prods: &Productions) -> Result<()> {
        let mut unchecked: Vec<Lr0Item> = self.items.values().cloned().collect();
        while !unchecked.is_empty() {
            let mut next_unchecked = Vec::new();
            for item in &unchecked {
                let Some(next_sym) = item.next_symbol() else {
                    continue;
                };
                if !next_sym.kind().is_non_terminal() {
                    continue;
                }
                for sub in prods.by_lhs(next_sym) {
                    let derived = Lr0Item::new(sub, 0)?;
                    if self.items.contains_key(&derived.fingerprint()) {
                        continue;
                    }
                    next_unchecked.push(derived.clone());
                    self.items.insert(derived.fingerprint(), derived);
                }
            }
            unchecked = next_unchecked;
        }
        Ok(())
    }
}

/// The canonical collection of LR(0) item sets.
///
/// States live in first-discovery order; a state's position in that order
/// is its number in the artifact files.
#[derive(Debug)]
pub struct Lr0Automaton {
    states: IndexMap<Fingerprint, Lr0ItemSet>,
    initial: Fingerprint,
}

impl Lr0Automaton {
    /// Kernel fingerprint of the start state.
    pub fn initial(&self) -> Fingerprint {
        self.initial
    }

    pub fn state(&self, fp: Fingerprint) -> Option<&Lr0ItemSet> {
        self.states.get(&fp)
    }

    /// First-discovery number of a state.
    pub fn state_number(&self, fp: Fingerprint) -> Option<usize> {
        self.states.get_index_of(&fp)
    }

    /// All states in discovery order.
    pub fn states(&self) -> impl Iterator<Item = &Lr0ItemSet> + '_ {
        self.states.values()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

/// Builds the canonical collection for the augmented grammar rooted at
/// `start`.
///
/// Seeds the worklist with the kernel `{S' -> . S}`, then closes each new
/// state and derives successor kernels for every symbol after a dot.
/// Successor symbols are visited in id order so that state numbering is
/// reproducible run to run.
pub fn generate_lr0_automaton(prods: &Productions, start: SymbolId) -> Result<Lr0Automaton> {
    if !start.kind().is_start() {
        return Err(Error::NotStartSymbol {
            symbol: start.to_string(),
        });
    }
    let root_prod = prods
        .by_lhs(start)
        .first()
        .ok_or(Error::MissingStartProduction)?;

    let mut kernel = KernelItems::new();
    kernel.append(Lr0Item::initial(root_prod)?)?;
    let initial_set = Lr0ItemSet::new(kernel)?;
    let initial = initial_set.fingerprint();

    let mut states: IndexMap<Fingerprint, Lr0ItemSet> = IndexMap::new();
    states.insert(initial, initial_set);

    let mut worklist = VecDeque::from([initial]);
    while let Some(fp) = worklist.pop_front() {
        let state = match states.get_mut(&fp) {
            Some(state) => state,
            None => unreachable!(),
        };
        state.compute_closure(prods)?;

        // group advanced items into successor kernels, one per symbol
        // appearing right after a dot
        let state = &states[&fp];
        let mut kernels: IndexMap<SymbolId, KernelItems> = IndexMap::new();
        for item in state.items() {
            let Some(sym) = item.next_symbol() else {
                continue;
            };
            let prod = prods
                .by_fingerprint(item.production())
                .ok_or_else(|| Error::UnknownProduction {
                    fingerprint: format!("{:?}", item.production()),
                })?;
            let advanced = Lr0Item::new(prod, item.dot() + 1)?;
            kernels.entry(sym).or_default().append(advanced)?;
        }

        let mut edges: Vec<(SymbolId, KernelItems)> = kernels.into_iter().collect();
        edges.sort_by_key(|(sym, _)| *sym);

        let mut gotos = Vec::with_capacity(edges.len());
        for (sym, kernel) in edges {
            let successor = Lr0ItemSet::new(kernel)?;
            let successor_fp = successor.fingerprint();
            if !states.contains_key(&successor_fp) {
                states.insert(successor_fp, successor);
                worklist.push_back(successor_fp);
            }
            gotos.push((sym, successor_fp));
        }

        let state = match states.get_mut(&fp) {
            Some(state) => state,
            None => unreachable!(),
        };
        for (sym, successor_fp) in gotos {
            state.gotos.insert(sym, successor_fp);
        }
    }

    log::debug!("LR(0) automaton: {} states", states.len());
    Ok(Lr0Automaton { states, initial })
}
