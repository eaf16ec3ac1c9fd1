//! Tokenizer for the BNF grammar notation.
//!
//! Tokens are `:`, `|`, `;`, `ID` (a run of letters), and `STRING` (a
//! double-quoted literal, no escapes). Whitespace separates tokens and is
//! otherwise ignored. Every token carries the 1-based line/column position
//! of its first character, which is what syntax errors report.

use smartstring::alias::String;
use std::fmt;
use std::iter::Peekable;
use std::str::Chars;
use thiserror::Error;

/// 1-based line/column position in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub const fn new(line: usize, column: usize) -> Position {
        Position { line, column }
    }

    fn start() -> Position {
        Position::new(1, 1)
    }

    fn advance(&mut self, c: char) {
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A lexical or syntactic error in the BNF source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("syntax error: {message}\n  {path}:{position}")]
pub struct SyntaxError {
    pub path: String,
    pub position: Position,
    pub message: String,
}

impl SyntaxError {
    pub fn new(position: Position, message: impl Into<String>) -> SyntaxError {
        SyntaxError {
            path: String::new(),
            position,
            message: message.into(),
        }
    }

    /// Attaches the source path used in the rendered message.
    pub fn with_path(mut self, path: &str) -> SyntaxError {
        self.path = path.into();
        self
    }
}

/// Kinds of tokens in the BNF notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Colon,
    VBar,
    Semicolon,
    Id,
    Str,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Colon => write!(f, ":"),
            TokenKind::VBar => write!(f, "|"),
            TokenKind::Semicolon => write!(f, ";"),
            TokenKind::Id => write!(f, "ID"),
            TokenKind::Str => write!(f, "STRING"),
            TokenKind::Eof => write!(f, "EOF"),
        }
    }
}

/// A token with its source text and position.
///
/// For `STRING` tokens the text is the content between the quotes, which
/// may be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    kind: TokenKind,
    text: String,
    position: Position,
}

impl Token {
    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn position(&self) -> Position {
        self.position
    }
}

/// The tokenizer.
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    position: Position,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Lexer<'a> {
        Lexer {
            chars: source.chars().peekable(),
            position: Position::start(),
        }
    }

    /// Tokenizes the whole source; the last token is always `EOF`.
    pub fn tokenize(mut self) -> Result<Vec<Token>, SyntaxError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn next_token(&mut self) -> Result<Token, SyntaxError> {
        self.skip_whitespace();
        let position = self.position;
        let Some(c) = self.bump() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                text: String::new(),
                position,
            });
        };
        match c {
            ':' => Ok(Self::symbol(TokenKind::Colon, position)),
            '|' => Ok(Self::symbol(TokenKind::VBar, position)),
            ';' => Ok(Self::symbol(TokenKind::Semicolon, position)),
            '"' => self.read_string(position),
            c if c.is_alphabetic() => Ok(self.read_id(c, position)),
            c => Err(SyntaxError::new(
                position,
                format!("unexpected character {c:?}"),
            )),
        }
    }

    fn symbol(kind: TokenKind, position: Position) -> Token {
        Token {
            kind,
            text: kind.to_string().into(),
            position,
        }
    }

    fn read_id(&mut self, first: char, position: Position) -> Token {
        let mut text = String::new();
        text.push(first);
        while let Some(&c) = self.chars.peek() {
            if !c.is_alphabetic() {
                break;
            }
            self.bump();
            text.push(c);
        }
        Token {
            kind: TokenKind::Id,
            text,
            position,
        }
    }

    fn read_string(&mut self, position: Position) -> Result<Token, SyntaxError> {
        let mut text = String::new();
        loop {
            match self.bump() {
                None => return Err(SyntaxError::new(position, "unterminated string")),
                Some('"') => {
                    return Ok(Token {
                        kind: TokenKind::Str,
                        text,
                        position,
                    })
                }
                Some(c) => text.push(c),
            }
        }
    }

    fn skip_whitespace(&mut self) {
        while self.chars.peek().is_some_and(|c| c.is_whitespace()) {
            self.bump();
        }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.position.advance(c);
        Some(c)
    }
}
