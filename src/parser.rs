//! Recursive-descent parser for the BNF notation.
//!
//! The meta-grammar, one descent function per rule:
//!
//! ```text
//! start       : production* EOF
//! production  : lhs ":" rhs ";"
//! lhs         : ID
//! rhs         : alternative ("|" alternative)*
//! alternative : (ID | STRING)*
//! ```
//!
//! The output is a plain tree: a `Root` holding `Production` nodes, each
//! with a `Lhs` child (one ID token) and an `Rhs` child whose children are
//! `Alternative` nodes carrying their symbol tokens. Structural tokens are
//! consumed and dropped. All failures are returned as [`SyntaxError`]s;
//! nothing panics across this boundary.

use crate::lexer::{Position, SyntaxError, Token, TokenKind};

/// Node kinds of the parse tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AstKind {
    Root,
    Production,
    Lhs,
    Rhs,
    Alternative,
}

/// A node of the parse tree.
#[derive(Debug, Clone)]
pub struct Ast {
    pub kind: AstKind,
    pub tokens: Vec<Token>,
    pub children: Vec<Ast>,
}

impl Ast {
    fn new(kind: AstKind) -> Ast {
        Ast {
            kind,
            tokens: Vec::new(),
            children: Vec::new(),
        }
    }
}

/// The recursive-descent parser.
pub struct Parser {
    tokens: Vec<Token>,
    cursor: usize,
    path: String,
}

impl Parser {
    /// Parser over a token stream ending in `EOF`, as produced by
    /// [`crate::lexer::Lexer::tokenize`].
    pub fn new(tokens: Vec<Token>) -> Parser {
        Parser {
            tokens,
            cursor: 0,
            path: String::new(),
        }
    }

    /// Source path used when rendering errors.
    pub fn with_path(mut self, path: &str) -> Parser {
        self.path = path.to_owned();
        self
    }

    pub fn parse(mut self) -> Result<Ast, SyntaxError> {
        let mut root = Ast::new(AstKind::Root);
        while !self.next_is(&[TokenKind::Eof]) {
            root.children.push(self.production()?);
        }
        Ok(root)
    }

    fn production(&mut self) -> Result<Ast, SyntaxError> {
        let mut node = Ast::new(AstKind::Production);
        node.children.push(self.lhs()?);
        self.expect(&[TokenKind::Colon])?;
        node.children.push(self.rhs()?);
        self.expect(&[TokenKind::Semicolon])?;
        Ok(node)
    }

    fn lhs(&mut self) -> Result<Ast, SyntaxError> {
        let mut node = Ast::new(AstKind::Lhs);
        node.tokens.push(self.expect(&[TokenKind::Id])?);
        Ok(node)
    }

    fn rhs(&mut self) -> Result<Ast, SyntaxError> {
        let mut node = Ast::new(AstKind::Rhs);
        loop {
            node.children.push(self.alternative()?);
            if !self.next_is(&[TokenKind::VBar]) {
                break;
            }
            self.expect(&[TokenKind::VBar])?;
        }
        Ok(node)
    }

    fn alternative(&mut self) -> Result<Ast, SyntaxError> {
        let mut node = Ast::new(AstKind::Alternative);
        while self.next_is(&[TokenKind::Id, TokenKind::Str]) {
            node.tokens
                .push(self.expect(&[TokenKind::Id, TokenKind::Str])?);
        }
        Ok(node)
    }

    fn next_is(&self, kinds: &[TokenKind]) -> bool {
        self.tokens
            .get(self.cursor)
            .is_some_and(|token| kinds.contains(&token.kind()))
    }

    fn expect(&mut self, kinds: &[TokenKind]) -> Result<Token, SyntaxError> {
        match self.tokens.get(self.cursor) {
            Some(token) if kinds.contains(&token.kind()) => {
                self.cursor += 1;
                Ok(token.clone())
            }
            Some(token) => Err(SyntaxError::new(
                token.position(),
                format!(
                    "unexpected token; expected {}, found {}",
                    expected_list(kinds),
                    token.kind()
                ),
            )
            .with_path(&self.path)),
            None => {
                let position = self
                    .tokens
                    .last()
                    .map(Token::position)
                    .unwrap_or(Position::new(1, 1));
                Err(SyntaxError::new(
                    position,
                    format!("unexpected end of input; expected {}", expected_list(kinds)),
                )
                .with_path(&self.path))
            }
        }
    }
}

fn expected_list(kinds: &[TokenKind]) -> String {
    let rendered: Vec<String> = kinds.iter().map(TokenKind::to_string).collect();
    rendered.join(" or ")
}
