//! FIRST-set computation.
//!
//! For every production and every suffix of its right-hand side, the set
//! of terminals that can begin a derivation of that suffix, plus a marker
//! for the empty derivation. The computation is a memoized recursion with
//! an explicit on-stack frame set keyed by (production fingerprint, suffix
//! index); re-entering a frame that is still being computed yields the
//! empty set, which breaks left-recursive cycles without polluting the
//! result. The top-level driver visits every production at every suffix
//! index, so every back edge is eventually seen by an unguarded call.

use crate::error::{Error, Result};
use crate::grammar::production::{Production, Productions};
use crate::grammar::symbol::SymbolId;
use crate::grammar::Fingerprint;
use std::collections::{BTreeSet, HashMap};

/// FIRST of one right-hand-side suffix: terminals plus an ε marker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FirstSet {
    symbols: BTreeSet<SymbolId>,
    empty: bool,
}

impl FirstSet {
    /// The terminals of the set, in id order.
    pub fn terminals(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.symbols.iter().copied()
    }

    pub fn contains(&self, sym: SymbolId) -> bool {
        self.symbols.contains(&sym)
    }

    /// Whether the suffix can derive the empty string.
    pub fn has_empty(&self) -> bool {
        self.empty
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty() && !self.empty
    }

    fn put(&mut self, sym: SymbolId) {
        self.symbols.insert(sym);
    }

    fn put_empty(&mut self) {
        self.empty = true;
    }

    fn merge_terminals(&mut self, other: &FirstSet) {
        self.symbols.extend(other.symbols.iter().copied());
    }
}

/// All computed FIRST sets, keyed by (production fingerprint, suffix index).
#[derive(Debug, Default)]
pub struct FirstSets {
    sets: HashMap<(Fingerprint, usize), FirstSet>,
}

impl FirstSets {
    /// FIRST of `rhs(prod)[head..]`, if it was computed.
    pub fn get(&self, prod: &Production, head: usize) -> Option<&FirstSet> {
        self.sets.get(&(prod.fingerprint(), head))
    }
}

/// Computes FIRST for every suffix of every production in `prods`.
///
/// ε-productions get a single entry at suffix index 0; everything else one
/// entry per suffix index of the right-hand side.
pub fn generate_first_sets(prods: &Productions) -> Result<FirstSets> {
    let mut cx = FirstContext {
        prods,
        first: FirstSets::default(),
        stack: Vec::new(),
    };
    for (_, group) in prods.all() {
        for prod in group {
            if prod.is_empty() {
                cx.first_of(prod, 0)?;
            } else {
                for head in 0..prod.rhs_len() {
                    cx.first_of(prod, head)?;
                }
            }
        }
    }
    Ok(cx.first)
}

struct FirstContext<'g> {
    prods: &'g Productions,
    first: FirstSets,
    stack: Vec<(Fingerprint, usize)>,
}

impl<'g> FirstContext<'g> {
    fn first_of(&mut self, prod: &Production, head: usize) -> Result<FirstSet> {
        if prod.is_empty() {
            if head != 0 {
                return Err(Error::BadSuffixIndex {
                    prod: prod.fingerprint_text(),
                    head,
                    len: 0,
                });
            }
        } else if head > prod.rhs_len() {
            // head == rhs_len is the internal past-the-end case and yields {ε}
            return Err(Error::BadSuffixIndex {
                prod: prod.fingerprint_text(),
                head,
                len: prod.rhs_len(),
            });
        }

        let frame = (prod.fingerprint(), head);
        if let Some(cached) = self.first.sets.get(&frame) {
            return Ok(cached.clone());
        }
        if self.stack.contains(&frame) {
            log::trace!("first: cycle on {}@{head}", prod.fingerprint_text());
            return Ok(FirstSet::default());
        }

        self.stack.push(frame);
        let computed = self.compute(prod, head);
        self.stack.pop();

        let set = computed?;
        self.first.sets.insert(frame, set.clone());
        Ok(set)
    }

    fn compute(&mut self, prod: &Production, head: usize) -> Result<FirstSet> {
        let mut set = FirstSet::default();
        let suffix = &prod.rhs()[head..];
        let Some(&leading) = suffix.first() else {
            set.put_empty();
            return Ok(set);
        };

        if leading.kind().is_terminal() {
            set.put(leading);
            return Ok(set);
        }

        let prods = self.prods;
        for sub in prods.by_lhs(leading) {
            let sub_first = self.first_of(sub, 0)?;
            set.merge_terminals(&sub_first);
            if sub_first.has_empty() {
                // the leading non-terminal is nullable, so the rest of the
                // suffix contributes as well
                let rest = self.first_of(prod, head + 1)?;
                set.merge_terminals(&rest);
                if rest.has_empty() {
                    set.put_empty();
                }
            }
        }
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{build_grammar, prod_at, sym};

    #[test]
    fn terminal_leading_suffixes() {
        // E: E "+" T | T; T: T "*" F | F; F: "(" E ")" | id;
        let g = build_grammar(r#"E: E "+" T | T; T: T "*" F | F; F: "(" E ")" | id;"#);
        let first = generate_first_sets(&g.productions).unwrap();

        let lparen = sym(&g, "(");
        let id = sym(&g, "id");
        let plus = sym(&g, "+");

        // FIRST(E → E + T, 0) = FIRST(E) = { (, id }
        let e_plus_t = prod_at(&g, "E", 0);
        let fs = first.get(e_plus_t, 0).unwrap();
        assert!(fs.contains(lparen) && fs.contains(id));
        assert!(!fs.has_empty());

        // FIRST(E → E + T, 1) = { + }
        let fs = first.get(e_plus_t, 1).unwrap();
        assert!(fs.contains(plus));
        assert_eq!(fs.len(), 1);
    }

    #[test]
    fn nullable_leading_nonterminal_pulls_in_the_rest() {
        // S: A b; A: a | ;
        let g = build_grammar(r#"S: A b; A: a | ;"#);
        let first = generate_first_sets(&g.productions).unwrap();

        let a = sym(&g, "a");
        let b = sym(&g, "b");

        // A's second alternative is ε
        let a_eps = prod_at(&g, "A", 1);
        assert!(a_eps.is_empty());
        assert!(first.get(a_eps, 0).unwrap().has_empty());

        // FIRST(S → A b, 0) = { a, b }, without ε: the suffix is not nullable
        let s_ab = prod_at(&g, "S", 0);
        let fs = first.get(s_ab, 0).unwrap();
        assert!(fs.contains(a) && fs.contains(b));
        assert!(!fs.has_empty());
        assert_eq!(fs.len(), 2);
    }

    #[test]
    fn empty_start_production() {
        // S:;
        let g = build_grammar("S:;");
        let first = generate_first_sets(&g.productions).unwrap();
        let s_eps = prod_at(&g, "S", 0);
        let fs = first.get(s_eps, 0).unwrap();
        assert!(fs.has_empty());
        assert_eq!(fs.len(), 0);
    }

    #[test]
    fn left_recursion_is_cut_by_the_stack_guard() {
        // L: L "," x | x;
        let g = build_grammar(r#"L: L "," x | x;"#);
        let first = generate_first_sets(&g.productions).unwrap();
        let x = sym(&g, "x");

        let l_rec = prod_at(&g, "L", 0);
        let fs = first.get(l_rec, 0).unwrap();
        assert!(fs.contains(x));
        assert!(!fs.has_empty());
        assert_eq!(fs.len(), 1);
    }

    #[test]
    fn every_suffix_of_every_production_is_present() {
        let g = build_grammar(r#"E: E "+" T | T; T: T "*" F | F; F: "(" E ")" | id;"#);
        let first = generate_first_sets(&g.productions).unwrap();
        for (_, group) in g.productions.all() {
            for prod in group {
                if prod.is_empty() {
                    assert!(first.get(prod, 0).is_some());
                } else {
                    for head in 0..prod.rhs_len() {
                        assert!(first.get(prod, head).is_some(), "missing {prod} @{head}");
                    }
                }
            }
        }
    }

    #[test]
    fn bad_suffix_index_is_an_error() {
        let g = build_grammar("S: a;");
        let s_a = prod_at(&g, "S", 0).clone();
        let mut cx = FirstContext {
            prods: &g.productions,
            first: FirstSets::default(),
            stack: Vec::new(),
        };
        let err = cx.first_of(&s_a, 2).unwrap_err();
        assert!(matches!(err, Error::BadSuffixIndex { head: 2, len: 1, .. }));
    }
}
