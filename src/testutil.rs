//! Shared builders for the test modules.

use crate::convert::{self, Grammar};
use crate::grammar::automaton::{generate_lr0_automaton, Lr0Automaton};
use crate::grammar::first::generate_first_sets;
use crate::grammar::follow::generate_follow_sets;
use crate::grammar::production::Production;
use crate::grammar::symbol::SymbolId;
use crate::grammar::table::{generate_slr_table, ParsingTable};
use crate::lexer::Lexer;
use crate::parser::Parser;

/// Runs the frontend on `source` and returns the augmented grammar.
pub(crate) fn build_grammar(source: &str) -> Grammar {
    let _ = env_logger::builder().is_test(true).try_init();
    let tokens = Lexer::new(source).tokenize().expect("tokenize");
    let ast = Parser::new(tokens).parse().expect("parse");
    convert::convert(&ast).expect("convert")
}

/// Id of an interned symbol, by name.
pub(crate) fn sym(grammar: &Grammar, name: &str) -> SymbolId {
    match grammar.symbols.lookup(name) {
        Some(id) => id,
        None => panic!("symbol {name:?} is not interned"),
    }
}

/// The `index`-th production of the non-terminal named `lhs`.
pub(crate) fn prod_at<'g>(grammar: &'g Grammar, lhs: &str, index: usize) -> &'g Production {
    let lhs_id = sym(grammar, lhs);
    match grammar.productions.by_lhs(lhs_id).get(index) {
        Some(prod) => prod,
        None => panic!("no production {index} for {lhs}"),
    }
}

/// Runs the whole analysis pipeline on an already built grammar.
pub(crate) fn build_table(grammar: &Grammar) -> (Lr0Automaton, ParsingTable) {
    let first = generate_first_sets(&grammar.productions).expect("first sets");
    let follow = generate_follow_sets(&grammar.productions, &first).expect("follow sets");
    let automaton = generate_lr0_automaton(&grammar.productions, grammar.start).expect("automaton");
    let table = generate_slr_table(&automaton, &follow, &grammar.productions).expect("table");
    (automaton, table)
}
