//! # Jack Tokenizer
//!
//! Tokenizes Jack source code into a stream of tokens.
//!
//! ## Features
//!
//! - **Comments**: line comments (`// ...`), block and doc comments
//!   (`/* ... */`, `/** ... */`), including multi-line
//! - **Integer Constants**: decimal, 0..=32767
//! - **String Literals**: anything between `"` delimiters except newline and `"`
//! - **Keywords vs identifiers**: a reserved word followed by an alphanumeric
//!   character or `_` is part of an identifier (`double` is not `do` + `uble`)
//!
//! Lexing continues past recoverable errors so a single run can report every
//! bad token in the file.

pub mod cursor;
pub mod token;

#[cfg(test)]
mod tests;

use crate::error::{CompileError, ErrorKind};
use cursor::Cursor;
use token::{Keyword, Token, TokenKind};

/// Largest integer constant representable in a Jack program.
pub const MAX_INT_CONST: u32 = 32767;

pub struct LexResult {
    pub tokens: Vec<Token>,
    pub errors: Vec<CompileError>,
}

#[must_use]
pub fn tokenize(source: &str) -> LexResult {
    let mut cursor = Cursor::new(source);
    let mut tokens = Vec::new();
    let mut errors = Vec::new();

    loop {
        if let Err(err) = skip_trivia(&mut cursor) {
            errors.push(err);
        }
        if cursor.is_at_end() {
            break;
        }
        match lex_token(&mut cursor) {
            Ok(token) => tokens.push(token),
            Err(err) => errors.push(err),
        }
    }

    LexResult { tokens, errors }
}

/// Consume whitespace and comments until the next token or end of input.
fn skip_trivia(cursor: &mut Cursor) -> Result<(), CompileError> {
    loop {
        while matches!(cursor.peek(), Some(c) if c.is_ascii_whitespace()) {
            cursor.advance();
        }
        match (cursor.peek(), cursor.peek_next()) {
            (Some('/'), Some('/')) => {
                while !matches!(cursor.peek(), None | Some('\n')) {
                    cursor.advance();
                }
            }
            (Some('/'), Some('*')) => {
                let (sb, sl, sc) = cursor.current_pos();
                cursor.advance();
                cursor.advance();
                // /** doc comments close with the same */ as /* comments
                loop {
                    match (cursor.peek(), cursor.peek_next()) {
                        (Some('*'), Some('/')) => {
                            cursor.advance();
                            cursor.advance();
                            break;
                        }
                        (None, _) => {
                            return Err(CompileError::new(
                                ErrorKind::UnterminatedComment,
                                "Unterminated block comment",
                                cursor.make_span(sb, sl, sc),
                            ));
                        }
                        _ => {
                            cursor.advance();
                        }
                    }
                }
            }
            _ => return Ok(()),
        }
    }
}

fn lex_token(cursor: &mut Cursor) -> Result<Token, CompileError> {
    let (sb, sl, sc) = cursor.current_pos();
    let ch = cursor.peek().unwrap();

    match ch {
        '"' => lex_string(cursor, sb, sl, sc),
        c if c.is_ascii_digit() => lex_int(cursor, sb, sl, sc),
        c if token::is_symbol(c) => {
            cursor.advance();
            Ok(Token {
                kind: TokenKind::Symbol(c),
                span: cursor.make_span(sb, sl, sc),
            })
        }
        c if c.is_ascii_alphabetic() || c == '_' => Ok(lex_word(cursor, sb, sl, sc)),
        _ => {
            cursor.advance();
            Err(CompileError::new(
                ErrorKind::UnexpectedCharacter,
                format!("Unexpected character: '{}'", ch),
                cursor.make_span(sb, sl, sc),
            ))
        }
    }
}

fn lex_string(cursor: &mut Cursor, sb: usize, sl: usize, sc: usize) -> Result<Token, CompileError> {
    cursor.advance();
    let mut value = String::new();

    loop {
        match cursor.peek() {
            None | Some('\n') => {
                return Err(CompileError::new(
                    ErrorKind::UnterminatedString,
                    "Unterminated string literal",
                    cursor.make_span(sb, sl, sc),
                ));
            }
            Some('"') => {
                cursor.advance();
                break;
            }
            Some(c) => {
                cursor.advance();
                value.push(c);
            }
        }
    }

    Ok(Token {
        kind: TokenKind::StringConst(value),
        span: cursor.make_span(sb, sl, sc),
    })
}

fn lex_int(cursor: &mut Cursor, sb: usize, sl: usize, sc: usize) -> Result<Token, CompileError> {
    let mut digits = String::new();
    while matches!(cursor.peek(), Some(c) if c.is_ascii_digit()) {
        digits.push(cursor.advance().unwrap());
    }

    // Long digit strings overflow u32; map them to the same error as 32768.
    let value = digits.parse::<u32>().unwrap_or(u32::MAX);
    if value > MAX_INT_CONST {
        return Err(CompileError::new(
            ErrorKind::IntegerOutOfRange,
            format!("Integer constant {} exceeds {}", digits, MAX_INT_CONST),
            cursor.make_span(sb, sl, sc),
        ));
    }

    Ok(Token {
        kind: TokenKind::IntConst(value as u16),
        span: cursor.make_span(sb, sl, sc),
    })
}

fn lex_word(cursor: &mut Cursor, sb: usize, sl: usize, sc: usize) -> Token {
    let mut word = String::new();
    while matches!(cursor.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
        word.push(cursor.advance().unwrap());
    }

    // Reserved words win only over the exact word; the loop above already
    // consumed any trailing alphanumerics, so `classic` lands here whole.
    let kind = match Keyword::from_word(&word) {
        Some(kw) => TokenKind::Keyword(kw),
        None => TokenKind::Identifier(word),
    };

    Token {
        kind,
        span: cursor.make_span(sb, sl, sc),
    }
}

/// Cursor over a lexed token stream.
///
/// Mirrors the classic nand2tetris tokenizer API: `advance` moves onto the
/// next token, typed accessors return `None` when the current token is of a
/// different kind.
pub struct Tokenizer {
    tokens: Vec<Token>,
    /// Index one past the current token; 0 means "before the first token".
    next: usize,
}

impl Tokenizer {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, next: 0 }
    }

    pub fn has_more_tokens(&self) -> bool {
        self.next < self.tokens.len()
    }

    pub fn advance(&mut self) {
        self.next += 1;
    }

    pub fn current(&self) -> Option<&Token> {
        if self.next == 0 {
            return None;
        }
        self.tokens.get(self.next - 1)
    }

    pub fn keyword(&self) -> Option<Keyword> {
        match self.current()?.kind {
            TokenKind::Keyword(kw) => Some(kw),
            _ => None,
        }
    }

    pub fn symbol(&self) -> Option<char> {
        match self.current()?.kind {
            TokenKind::Symbol(sym) => Some(sym),
            _ => None,
        }
    }

    pub fn identifier(&self) -> Option<&str> {
        match &self.current()?.kind {
            TokenKind::Identifier(name) => Some(name),
            _ => None,
        }
    }

    pub fn int_val(&self) -> Option<u16> {
        match self.current()?.kind {
            TokenKind::IntConst(value) => Some(value),
            _ => None,
        }
    }

    pub fn string_val(&self) -> Option<&str> {
        match &self.current()?.kind {
            TokenKind::StringConst(value) => Some(value),
            _ => None,
        }
    }

    /// Hand the materialized token sequence to the parser.
    pub fn get_tokens(&self) -> &[Token] {
        &self.tokens
    }
}
