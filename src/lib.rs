//! Sousa is an offline SLR(1) parsing-table generator.
//!
//! Given a context-free grammar in a small BNF-like notation, it emits the
//! numbered production list and the ACTION and GOTO tables of the SLR(1)
//! parser for the augmented grammar, as line-oriented text files meant for
//! a separate parser driver.
//!
//! The pipeline: tokenize and parse the BNF source ([`lexer`], [`parser`]),
//! convert the tree into an augmented grammar ([`convert`]), compute FIRST
//! and FOLLOW sets, build the canonical LR(0) collection, and assemble the
//! SLR(1) table ([`grammar`]), then serialize the artifacts ([`writer`]).
//! [`generate()`](crate::generate::generate) drives the whole run; the
//! `sousa` binary is a thin CLI over it.

pub mod convert;
pub mod error;
pub mod generate;
pub mod grammar;
pub mod lexer;
pub mod parser;
pub mod writer;

#[cfg(test)]
pub(crate) mod testutil;

pub use crate::error::{ConflictError, ConflictKind, Error, Result};
pub use crate::generate::{generate, generate_into};
