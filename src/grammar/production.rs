//! Productions and the production store.

use crate::grammar::symbol::SymbolId;
use crate::grammar::Fingerprint;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::fmt;

/// Dense production number in append order; the id the artifact files use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProductionId(usize);

impl ProductionId {
    pub fn as_usize(self) -> usize {
        self.0
    }
}

impl fmt::Display for ProductionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single grammar production `lhs → rhs`. An empty right-hand side is an
/// ε-production.
///
/// The fingerprint hashes the rendering `(lhs->s1,s2,…)` over symbol ids,
/// so textually identical productions share one fingerprint. The id is
/// assigned when the production enters a [`Productions`] store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
    id: ProductionId,
    fingerprint: Fingerprint,
    lhs: SymbolId,
    rhs: Vec<SymbolId>,
}

impl Production {
    pub fn new(lhs: SymbolId, rhs: Vec<SymbolId>) -> Production {
        let fingerprint = Fingerprint::of(render_fingerprint(lhs, &rhs).as_bytes());
        Production {
            id: ProductionId(0),
            fingerprint,
            lhs,
            rhs,
        }
    }

    pub fn id(&self) -> ProductionId {
        self.id
    }

    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    /// The content rendering behind the fingerprint, for diagnostics.
    pub fn fingerprint_text(&self) -> String {
        render_fingerprint(self.lhs, &self.rhs)
    }

    pub fn lhs(&self) -> SymbolId {
        self.lhs
    }

    pub fn rhs(&self) -> &[SymbolId] {
        &self.rhs
    }

    pub fn rhs_len(&self) -> usize {
        self.rhs.len()
    }

    /// Whether this is an ε-production.
    pub fn is_empty(&self) -> bool {
        self.rhs.is_empty()
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} →", self.lhs)?;
        if self.rhs.is_empty() {
            return write!(f, " ε");
        }
        for sym in &self.rhs {
            write!(f, " {sym}")?;
        }
        Ok(())
    }
}

fn render_fingerprint(lhs: SymbolId, rhs: &[SymbolId]) -> String {
    let mut text = format!("({lhs}->");
    for (i, sym) in rhs.iter().enumerate() {
        if i > 0 {
            text.push(',');
        }
        text.push_str(&sym.to_string());
    }
    text.push(')');
    text
}

/// The production store.
///
/// Groups productions by left-hand side in insertion order (that order
/// defines the numbering within a non-terminal), assigns dense ids in
/// append order, and indexes by fingerprint for O(1) lookup. Textually
/// identical productions are recorded faithfully, both of them; whether
/// that is an error is the grammar builder's call, not this store's. The
/// fingerprint index keeps the most recently appended of such twins.
#[derive(Debug, Default)]
pub struct Productions {
    by_lhs: IndexMap<SymbolId, Vec<Production>>,
    by_fp: HashMap<Fingerprint, (SymbolId, usize)>,
    count: usize,
}

impl Productions {
    pub fn new() -> Productions {
        Productions::default()
    }

    /// Appends `prod`, assigning it the next dense id.
    pub fn append(&mut self, mut prod: Production) -> ProductionId {
        let id = ProductionId(self.count);
        self.count += 1;
        prod.id = id;
        let list = self.by_lhs.entry(prod.lhs).or_default();
        self.by_fp.insert(prod.fingerprint, (prod.lhs, list.len()));
        list.push(prod);
        id
    }

    /// Productions of `lhs` in insertion order.
    pub fn by_lhs(&self, lhs: SymbolId) -> &[Production] {
        self.by_lhs.get(&lhs).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn by_fingerprint(&self, fp: Fingerprint) -> Option<&Production> {
        let &(lhs, index) = self.by_fp.get(&fp)?;
        self.by_lhs.get(&lhs)?.get(index)
    }

    /// All `(lhs, productions)` groups, in first-appearance order.
    pub fn all(&self) -> impl Iterator<Item = (SymbolId, &[Production])> + '_ {
        self.by_lhs.iter().map(|(lhs, list)| (*lhs, list.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}
