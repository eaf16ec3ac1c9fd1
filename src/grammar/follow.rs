//! FOLLOW-set computation.
//!
//! For every non-terminal, the terminals that can appear immediately after
//! it in some sentential form, plus an EOF marker. Same discipline as the
//! FIRST engine: memoized recursion with an on-stack guard over the
//! non-terminal being computed, driven from every production by the
//! top-level entry point.

use crate::error::{Error, Result};
use crate::grammar::first::{FirstSet, FirstSets};
use crate::grammar::production::Productions;
use crate::grammar::symbol::SymbolId;
use std::collections::{BTreeSet, HashMap};

/// FOLLOW of one non-terminal: terminals plus an EOF marker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FollowSet {
    symbols: BTreeSet<SymbolId>,
    eof: bool,
}

impl FollowSet {
    /// The terminals of the set, in id order.
    pub fn terminals(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.symbols.iter().copied()
    }

    pub fn contains(&self, sym: SymbolId) -> bool {
        self.symbols.contains(&sym)
    }

    /// Whether the non-terminal can appear at the end of the input.
    pub fn has_eof(&self) -> bool {
        self.eof
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty() && !self.eof
    }

    fn put_eof(&mut self) {
        self.eof = true;
    }

    fn merge_first(&mut self, first: &FirstSet) {
        self.symbols.extend(first.terminals());
    }

    fn merge_follow(&mut self, other: &FollowSet) {
        self.symbols.extend(other.symbols.iter().copied());
        if other.eof {
            self.eof = true;
        }
    }
}

/// All computed FOLLOW sets, keyed by non-terminal id.
#[derive(Debug, Default)]
pub struct FollowSets {
    sets: HashMap<SymbolId, FollowSet>,
}

impl FollowSets {
    pub fn get(&self, sym: SymbolId) -> Option<&FollowSet> {
        self.sets.get(&sym)
    }
}

/// Computes FOLLOW for every left-hand side in `prods`, using the FIRST
/// sets of `first`.
pub fn generate_follow_sets(prods: &Productions, first: &FirstSets) -> Result<FollowSets> {
    let mut cx = FollowContext {
        prods,
        first,
        follow: FollowSets::default(),
        stack: Vec::new(),
    };
    for (lhs, _) in prods.all() {
        cx.follow_of(lhs)?;
    }
    Ok(cx.follow)
}

struct FollowContext<'g> {
    prods: &'g Productions,
    first: &'g FirstSets,
    follow: FollowSets,
    stack: Vec<SymbolId>,
}

impl<'g> FollowContext<'g> {
    fn follow_of(&mut self, sym: SymbolId) -> Result<FollowSet> {
        if let Some(cached) = self.follow.sets.get(&sym) {
            return Ok(cached.clone());
        }
        if self.stack.contains(&sym) {
            log::trace!("follow: cycle on {sym}");
            return Ok(FollowSet::default());
        }

        self.stack.push(sym);
        let computed = self.compute(sym);
        self.stack.pop();

        let set = computed?;
        self.follow.sets.insert(sym, set.clone());
        Ok(set)
    }

    fn compute(&mut self, sym: SymbolId) -> Result<FollowSet> {
        let mut set = FollowSet::default();
        if sym.kind().is_start() {
            set.put_eof();
        }

        let prods = self.prods;
        for (_, group) in prods.all() {
            for prod in group {
                for (i, &rhs_sym) in prod.rhs().iter().enumerate() {
                    if rhs_sym != sym {
                        continue;
                    }
                    if i + 1 < prod.rhs_len() {
                        let first = self.first.get(prod, i + 1).ok_or_else(|| {
                            Error::MissingFirstSet {
                                prod: prod.fingerprint_text(),
                                head: i + 1,
                            }
                        })?;
                        set.merge_first(first);
                        if !first.has_empty() {
                            continue;
                        }
                    }
                    // the occurrence can end the expansion of lhs, so
                    // whatever follows lhs follows sym as well
                    let lhs_follow = self.follow_of(prod.lhs())?;
                    set.merge_follow(&lhs_follow);
                }
            }
        }
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::first::generate_first_sets;
    use crate::testutil::{build_grammar, sym};

    #[test]
    fn classic_expression_grammar() {
        let g = build_grammar(r#"E: E "+" T | T; T: T "*" F | F; F: "(" E ")" | id;"#);
        let first = generate_first_sets(&g.productions).unwrap();
        let follow = generate_follow_sets(&g.productions, &first).unwrap();

        let plus = sym(&g, "+");
        let star = sym(&g, "*");
        let rparen = sym(&g, ")");

        let e = follow.get(sym(&g, "E")).unwrap();
        assert!(e.contains(plus) && e.contains(rparen) && e.has_eof());
        assert_eq!(e.len(), 2);

        let t = follow.get(sym(&g, "T")).unwrap();
        assert!(t.contains(plus) && t.contains(star) && t.contains(rparen) && t.has_eof());
        assert_eq!(t.len(), 3);

        let f = follow.get(sym(&g, "F")).unwrap();
        assert_eq!(f.len(), t.len());
        assert!(f.contains(plus) && f.contains(star) && f.contains(rparen) && f.has_eof());
    }

    #[test]
    fn augmented_start_carries_eof() {
        let g = build_grammar("S: a;");
        let first = generate_first_sets(&g.productions).unwrap();
        let follow = generate_follow_sets(&g.productions, &first).unwrap();

        let augmented = follow.get(g.start).unwrap();
        assert!(augmented.has_eof());
        // and the natural start inherits it from its last-position occurrence
        let natural = follow.get(sym(&g, "S")).unwrap();
        assert!(natural.has_eof());
    }

    #[test]
    fn nullable_occurrence_skips_to_the_lhs_follow() {
        // S: A b; A: a | ;  →  FOLLOW(A) = { b }
        let g = build_grammar(r#"S: A b; A: a | ;"#);
        let first = generate_first_sets(&g.productions).unwrap();
        let follow = generate_follow_sets(&g.productions, &first).unwrap();

        let a = follow.get(sym(&g, "A")).unwrap();
        assert!(a.contains(sym(&g, "b")));
        assert!(!a.has_eof());
        assert_eq!(a.len(), 1);
    }

    #[test]
    fn left_recursive_follow() {
        // L: L "," x | x;  →  FOLLOW(L) = { ",", EOF }
        let g = build_grammar(r#"L: L "," x | x;"#);
        let first = generate_first_sets(&g.productions).unwrap();
        let follow = generate_follow_sets(&g.productions, &first).unwrap();

        let l = follow.get(sym(&g, "L")).unwrap();
        assert!(l.contains(sym(&g, ",")));
        assert!(l.has_eof());
        assert_eq!(l.len(), 1);
    }

    #[test]
    fn every_lhs_gets_a_follow_set() {
        let g = build_grammar(r#"E: E "+" T | T; T: T "*" F | F; F: "(" E ")" | id;"#);
        let first = generate_first_sets(&g.productions).unwrap();
        let follow = generate_follow_sets(&g.productions, &first).unwrap();
        for (lhs, _) in g.productions.all() {
            assert!(follow.get(lhs).is_some(), "missing FOLLOW({lhs})");
        }
    }
}
