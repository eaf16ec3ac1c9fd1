//! The end-to-end pipeline: a grammar file in, three artifact files out.

use crate::convert;
use crate::grammar::automaton::generate_lr0_automaton;
use crate::grammar::first::generate_first_sets;
use crate::grammar::follow::generate_follow_sets;
use crate::grammar::table::generate_slr_table;
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::writer;
use anyhow::{Context, Result};
use std::fs::File;
use std::path::Path;

/// Runs the whole pipeline on `grammar_path` and writes the `production`,
/// `action`, and `goto` files into the current working directory,
/// truncating any previous contents.
pub fn generate<P: AsRef<Path>>(grammar_path: P) -> Result<()> {
    generate_into(grammar_path.as_ref(), Path::new("."))
}

/// As [`generate`], with an explicit output directory.
pub fn generate_into(grammar_path: &Path, out_dir: &Path) -> Result<()> {
    let source = std::fs::read_to_string(grammar_path)
        .with_context(|| format!("failed to read {}", grammar_path.display()))?;
    let path_text = grammar_path.display().to_string();

    let tokens = Lexer::new(&source)
        .tokenize()
        .map_err(|err| err.with_path(&path_text))?;
    let ast = Parser::new(tokens).with_path(&path_text).parse()?;

    let grammar = convert::convert(&ast)?;
    let first = generate_first_sets(&grammar.productions)?;
    let follow = generate_follow_sets(&grammar.productions, &first)?;
    let automaton = generate_lr0_automaton(&grammar.productions, grammar.start)?;
    let table = generate_slr_table(&automaton, &follow, &grammar.productions)?;

    log::info!(
        "{}: {} productions, {} states",
        path_text,
        grammar.productions.len(),
        automaton.len()
    );

    let production_path = out_dir.join("production");
    let mut out = File::create(&production_path)
        .with_context(|| format!("failed to create {}", production_path.display()))?;
    writer::write_productions(&mut out, &grammar.productions)?;

    let action_path = out_dir.join("action");
    let mut out = File::create(&action_path)
        .with_context(|| format!("failed to create {}", action_path.display()))?;
    writer::write_action(&mut out, &table, &grammar.productions)?;

    let goto_path = out_dir.join("goto");
    let mut out = File::create(&goto_path)
        .with_context(|| format!("failed to create {}", goto_path.display()))?;
    writer::write_goto(&mut out, &table)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("sousa-{}-{name}", std::process::id()));
        if dir.exists() {
            fs::remove_dir_all(&dir).unwrap();
        }
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn writes_the_three_artifacts() {
        let dir = scratch_dir("artifacts");
        let grammar_path = dir.join("expr.bnf");
        fs::write(
            &grammar_path,
            r#"E: E "+" T | T; T: T "*" F | F; F: "(" E ")" | id;"#,
        )
        .unwrap();

        generate_into(&grammar_path, &dir).unwrap();

        let production = fs::read_to_string(dir.join("production")).unwrap();
        let action = fs::read_to_string(dir.join("action")).unwrap();
        let goto = fs::read_to_string(dir.join("goto")).unwrap();

        assert_eq!(production.lines().count(), 7);
        assert!(!action.is_empty() && action.ends_with('\n'));
        assert!(!goto.is_empty() && goto.ends_with('\n'));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn syntax_errors_carry_the_file_path() {
        let dir = scratch_dir("syntax");
        let grammar_path = dir.join("broken.bnf");
        fs::write(&grammar_path, "E: ;;").unwrap();

        let err = generate_into(&grammar_path, &dir).unwrap_err();
        let rendered = format!("{err:#}");
        assert!(rendered.contains("broken.bnf"), "{rendered}");
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_input_file_is_an_error() {
        let dir = scratch_dir("missing");
        let err = generate_into(&dir.join("nope.bnf"), &dir).unwrap_err();
        assert!(format!("{err:#}").contains("failed to read"));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn artifacts_are_truncated_on_rewrite() {
        let dir = scratch_dir("truncate");
        let grammar_path = dir.join("g.bnf");
        fs::write(&grammar_path, "S: a;").unwrap();
        fs::write(dir.join("production"), "stale stale stale stale\n".repeat(8)).unwrap();

        generate_into(&grammar_path, &dir).unwrap();
        let production = fs::read_to_string(dir.join("production")).unwrap();
        assert!(!production.contains("stale"));
        assert_eq!(production.lines().count(), 2);
        fs::remove_dir_all(&dir).unwrap();
    }
}
