//! Artifact writers: the `production`, `action`, and `goto` files.
//!
//! All three are line-oriented, comma-separated, decimal, with no header
//! and no quoting. Lines are emitted in a deterministic order: the
//! production list sorted by left-hand-side id, the table files sorted by
//! state number with fields in symbol-id order.

use crate::error::{Error, Result};
use crate::grammar::production::{Production, Productions};
use crate::grammar::table::{Action, ParsingTable};
use crate::grammar::Fingerprint;
use std::io::Write;

/// Writes one `<prod-id>,<lhs-id>,<rhs-length>` line per production,
/// grouped by left-hand side in ascending id order.
pub fn write_productions<W: Write>(out: &mut W, prods: &Productions) -> Result<()> {
    let mut groups: Vec<_> = prods.all().collect();
    groups.sort_by_key(|(lhs, _)| *lhs);
    for (lhs, group) in groups {
        for prod in group {
            writeln!(out, "{},{},{}", prod.id(), lhs, prod.rhs_len())?;
        }
    }
    Ok(())
}

/// Writes the ACTION table, one line per state with at least one entry:
/// the state number, `t`/`f` for acceptability, an optional `$-r<prod-id>`
/// EOF reduction, then `<sym-id>-s<state-id>` shifts and
/// `<sym-id>-r<prod-id>` reductions.
pub fn write_action<W: Write>(
    out: &mut W,
    table: &ParsingTable,
    prods: &Productions,
) -> Result<()> {
    let mut lines = Vec::new();
    for (fp, actions) in table.actions() {
        lines.push((state_number(table, fp)?, actions));
    }
    lines.sort_by_key(|(number, _)| *number);

    for (number, actions) in lines {
        write!(out, "{number}")?;
        write!(out, ",{}", if actions.is_acceptable() { "t" } else { "f" })?;
        if let Some(fp) = actions.reduce_by_eof() {
            write!(out, ",$-r{}", production(prods, fp)?.id())?;
        }
        let mut columns: Vec<_> = actions.actions().collect();
        columns.sort_by_key(|(sym, _)| *sym);
        for (sym, action) in columns {
            match action {
                Action::Shift(next) => {
                    write!(out, ",{sym}-s{}", state_number(table, next)?)?;
                }
                Action::Reduce(fp) => {
                    write!(out, ",{sym}-r{}", production(prods, fp)?.id())?;
                }
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Writes the GOTO table, one line per state with at least one entry: the
/// state number, then `<sym-id>-<state-id>` per non-terminal transition.
pub fn write_goto<W: Write>(out: &mut W, table: &ParsingTable) -> Result<()> {
    let mut lines = Vec::new();
    for (fp, gotos) in table.gotos() {
        lines.push((state_number(table, fp)?, gotos));
    }
    lines.sort_by_key(|(number, _)| *number);

    for (number, gotos) in lines {
        write!(out, "{number}")?;
        let mut columns: Vec<_> = gotos.iter().map(|(sym, next)| (*sym, *next)).collect();
        columns.sort_by_key(|(sym, _)| *sym);
        for (sym, next) in columns {
            write!(out, ",{sym}-{}", state_number(table, next)?)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn state_number(table: &ParsingTable, fp: Fingerprint) -> Result<usize> {
    table.state_number(fp).ok_or_else(|| Error::UnknownState {
        fingerprint: format!("{fp:?}"),
    })
}

fn production(prods: &Productions, fp: Fingerprint) -> Result<&Production> {
    prods
        .by_fingerprint(fp)
        .ok_or_else(|| Error::UnknownProduction {
            fingerprint: format!("{fp:?}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{build_grammar, build_table};
    use std::collections::BTreeSet;

    fn lines(bytes: &[u8]) -> Vec<String> {
        String::from_utf8(bytes.to_vec())
            .unwrap()
            .lines()
            .map(str::to_owned)
            .collect()
    }

    #[test]
    fn production_lines_are_sorted_and_complete() {
        let g = build_grammar(r#"E: E "+" T | T; T: T "*" F | F; F: "(" E ")" | id;"#);
        let mut out = Vec::new();
        write_productions(&mut out, &g.productions).unwrap();
        let lines = lines(&out);
        assert_eq!(lines.len(), 7);

        // first line is the augmented production: id 0, rhs length 1
        let fields: Vec<&str> = lines[0].split(',').collect();
        assert_eq!(fields[0], "0");
        assert_eq!(fields[2], "1");

        // lhs ids are non-decreasing down the file
        let lhs_ids: Vec<u64> = lines
            .iter()
            .map(|line| line.split(',').nth(1).unwrap().parse().unwrap())
            .collect();
        let mut sorted = lhs_ids.clone();
        sorted.sort();
        assert_eq!(lhs_ids, sorted);

        // every production id appears exactly once
        let ids: BTreeSet<u64> = lines
            .iter()
            .map(|line| line.split(',').next().unwrap().parse().unwrap())
            .collect();
        assert_eq!(ids, (0..7u64).collect::<BTreeSet<u64>>());
    }

    #[test]
    fn action_lines_have_the_documented_shape() {
        let g = build_grammar("S:;");
        let (_, table) = build_table(&g);
        let mut out = Vec::new();
        write_action(&mut out, &table, &g.productions).unwrap();
        let lines = lines(&out);
        assert_eq!(lines.len(), 2);

        // state 0 reduces S → ε on EOF; production 1 is S → ε
        assert_eq!(lines[0], "0,f,$-r1");
        // state 1 accepts
        assert_eq!(lines[1], "1,t");
    }

    #[test]
    fn goto_lines_name_nonterminal_transitions() {
        let g = build_grammar("S:;");
        let (automaton, table) = build_table(&g);
        let mut out = Vec::new();
        write_goto(&mut out, &table).unwrap();
        let lines = lines(&out);
        assert_eq!(lines.len(), 1);

        let s = g.symbols.lookup("S").unwrap();
        let start = automaton.state(automaton.initial()).unwrap();
        let target = table.state_number(start.goto(s).unwrap()).unwrap();
        assert_eq!(lines[0], format!("0,{s}-{target}"));
    }

    #[test]
    fn every_referenced_state_and_production_exists() {
        let g = build_grammar(r#"E: E "+" T | T; T: T "*" F | F; F: "(" E ")" | id;"#);
        let (_, table) = build_table(&g);

        let mut production_out = Vec::new();
        let mut action_out = Vec::new();
        let mut goto_out = Vec::new();
        write_productions(&mut production_out, &g.productions).unwrap();
        write_action(&mut action_out, &table, &g.productions).unwrap();
        write_goto(&mut goto_out, &table).unwrap();

        let action_lines = lines(&action_out);
        let goto_lines = lines(&goto_out);

        let mut known_states = BTreeSet::new();
        for line in action_lines.iter().chain(goto_lines.iter()) {
            known_states.insert(line.split(',').next().unwrap().to_owned());
        }
        let known_prods: BTreeSet<String> = lines(&production_out)
            .iter()
            .map(|line| line.split(',').next().unwrap().to_owned())
            .collect();

        for line in &action_lines {
            for field in line.split(',').skip(2) {
                let field = field.strip_prefix("$-").unwrap_or(field);
                if let Some((_, target)) = field.split_once("-s") {
                    assert!(
                        known_states.contains(target),
                        "shift target {target} has no line"
                    );
                } else if let Some((_, prod)) = field.rsplit_once('r') {
                    assert!(known_prods.contains(prod), "production {prod} has no line");
                }
            }
        }
        for line in &goto_lines {
            for field in line.split(',').skip(1) {
                let (_, target) = field.rsplit_once('-').unwrap();
                assert!(known_states.contains(target));
            }
        }
    }

    #[test]
    fn acceptable_state_line_starts_with_t_flag() {
        let g = build_grammar(r#"L: L "," x | x;"#);
        let (automaton, table) = build_table(&g);
        let mut out = Vec::new();
        write_action(&mut out, &table, &g.productions).unwrap();

        let l = g.symbols.lookup("L").unwrap();
        let start = automaton.state(automaton.initial()).unwrap();
        let accept_number = table.state_number(start.goto(l).unwrap()).unwrap();

        let accept_line = lines(&out)
            .into_iter()
            .find(|line| line.starts_with(&format!("{accept_number},")))
            .unwrap();
        assert!(accept_line.starts_with(&format!("{accept_number},t")));
    }
}
