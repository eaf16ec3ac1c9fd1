//! AST-to-grammar conversion: augmentation and symbol interning.
//!
//! Kind inference happens here, in two passes whose order matters. The
//! first pass declares every left-hand-side name a non-terminal (and spawns
//! the augmented start from the first one); the second interns every
//! right-hand-side token as a terminal, which resolves to the declared
//! non-terminal whenever the spelling was already taken, since first write
//! wins in the symbol table. A quoted token with the spelling of a declared
//! non-terminal therefore maps to that non-terminal as well.

use crate::error::{Error, Result};
use crate::grammar::production::{Production, Productions};
use crate::grammar::symbol::{SymbolId, SymbolKind, SymbolTable};
use crate::parser::{Ast, AstKind};

/// A fully built grammar: frozen symbol table, production store, and the
/// augmented start symbol.
#[derive(Debug)]
pub struct Grammar {
    pub symbols: SymbolTable,
    pub productions: Productions,
    pub start: SymbolId,
}

/// Converts the parsed BNF tree into an augmented grammar.
///
/// The first production's left-hand side `N` names the grammar: `N'` is
/// interned as the start symbol and `N' → N` becomes production 0.
pub fn convert(root: &Ast) -> Result<Grammar> {
    let mut symbols = SymbolTable::new();
    let mut productions = Productions::new();
    let mut start: Option<SymbolId> = None;

    // Pass 1: declare all left-hand sides.
    for production in productions_of(root) {
        let name = lhs_name(production)?;
        if start.is_none() {
            let augmented = format!("{name}'");
            if symbols.lookup(&augmented).is_some() {
                return Err(Error::StartClash { name: augmented });
            }
            let start_id = intern(&mut symbols, &augmented, SymbolKind::Start)?;
            let natural = intern(&mut symbols, name, SymbolKind::NonTerminal)?;
            productions.append(Production::new(start_id, vec![natural]));
            start = Some(start_id);
        }
        intern(&mut symbols, name, SymbolKind::NonTerminal)?;
    }
    let start = start.ok_or(Error::EmptyGrammar)?;

    // Pass 2: intern right-hand sides and build the productions.
    for production in productions_of(root) {
        let lhs = intern(&mut symbols, lhs_name(production)?, SymbolKind::NonTerminal)?;
        let rhs_node = production
            .children
            .get(1)
            .filter(|child| child.kind == AstKind::Rhs)
            .ok_or(Error::MalformedAst)?;
        for alternative in rhs_node
            .children
            .iter()
            .filter(|child| child.kind == AstKind::Alternative)
        {
            let mut rhs = Vec::with_capacity(alternative.tokens.len());
            for token in &alternative.tokens {
                rhs.push(intern(&mut symbols, token.text(), SymbolKind::Terminal)?);
            }
            productions.append(Production::new(lhs, rhs));
        }
    }

    log::debug!(
        "grammar: {} symbols, {} productions",
        symbols.len(),
        productions.len()
    );
    Ok(Grammar {
        symbols,
        productions,
        start,
    })
}

fn productions_of(root: &Ast) -> impl Iterator<Item = &Ast> + '_ {
    root.children
        .iter()
        .filter(|child| child.kind == AstKind::Production)
}

fn lhs_name(production: &Ast) -> Result<&str> {
    production
        .children
        .first()
        .filter(|child| child.kind == AstKind::Lhs)
        .and_then(|lhs| lhs.tokens.first())
        .map(|token| token.text())
        .ok_or(Error::MalformedAst)
}

fn intern(symbols: &mut SymbolTable, name: &str, kind: SymbolKind) -> Result<SymbolId> {
    symbols.intern(name, kind).ok_or(Error::EmptySymbolName)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    fn convert_source(source: &str) -> Result<Grammar> {
        let tokens = Lexer::new(source).tokenize().unwrap();
        let ast = Parser::new(tokens).parse().unwrap();
        convert(&ast)
    }

    #[test]
    fn augments_with_the_first_lhs() {
        let g = convert_source("S: a;").unwrap();
        let augmented = g.symbols.lookup("S'").unwrap();
        assert_eq!(g.start, augmented);
        assert!(augmented.kind().is_start());

        // production 0 is S' → S
        let root_prods = g.productions.by_lhs(augmented);
        assert_eq!(root_prods.len(), 1);
        assert_eq!(root_prods[0].id().as_usize(), 0);
        assert_eq!(root_prods[0].rhs(), &[g.symbols.lookup("S").unwrap()]);
    }

    #[test]
    fn lhs_names_become_non_terminals_and_the_rest_terminals() {
        let g = convert_source(r#"E: E "+" T | T; T: x;"#).unwrap();
        assert!(g.symbols.lookup("E").unwrap().kind().is_non_terminal());
        assert!(g.symbols.lookup("T").unwrap().kind().is_non_terminal());
        assert!(g.symbols.lookup("+").unwrap().kind().is_terminal());
        assert!(g.symbols.lookup("x").unwrap().kind().is_terminal());
    }

    #[test]
    fn bare_rhs_token_resolves_to_a_declared_lhs() {
        // T appears as an LHS further down, so the T in E's body is the
        // same non-terminal, not a terminal
        let g = convert_source("E: T; T: x;").unwrap();
        let t = g.symbols.lookup("T").unwrap();
        assert!(t.kind().is_non_terminal());
        let e = g.symbols.lookup("E").unwrap();
        assert_eq!(g.productions.by_lhs(e)[0].rhs(), &[t]);
    }

    #[test]
    fn quoted_token_with_an_lhs_spelling_keeps_the_first_kind() {
        let g = convert_source(r#"E: "E" x;"#).unwrap();
        let e = g.symbols.lookup("E").unwrap();
        assert!(e.kind().is_non_terminal());
        assert_eq!(g.productions.by_lhs(e)[0].rhs()[0], e);
    }

    #[test]
    fn alternatives_become_separate_productions() {
        let g = convert_source("A: a | b | ;").unwrap();
        let a = g.symbols.lookup("A").unwrap();
        let prods = g.productions.by_lhs(a);
        assert_eq!(prods.len(), 3);
        assert!(prods[2].is_empty());
        // ids continue after the augmented production
        assert_eq!(prods[0].id().as_usize(), 1);
        assert_eq!(prods[2].id().as_usize(), 3);
    }

    #[test]
    fn empty_grammar_is_an_error() {
        assert!(matches!(convert_source(""), Err(Error::EmptyGrammar)));
    }

    #[test]
    fn empty_string_symbol_is_an_error() {
        assert!(matches!(
            convert_source(r#"A: "";"#),
            Err(Error::EmptySymbolName)
        ));
    }
}
