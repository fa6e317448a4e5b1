//! Literal values in block headers.
//!
//! `{% if count > 5 %}` and `{% array [1, 2, 3] %}` mix names with literal
//! values. Each header token is first tried as a literal; anything that does
//! not parse completely as one is a context name.
//!
//! # Examples
//!
//! ```
//! use quill_parser::ast::Operand;
//! use quill_parser::literal::eval_expression;
//! use quill_parser::Value;
//!
//! assert_eq!(eval_expression("5"), Operand::Literal(Value::Int(5)));
//! assert_eq!(eval_expression("user.name"), Operand::Name("user.name".into()));
//! ```

use std::collections::BTreeMap;

use crate::ast::Operand;
use crate::value::Value;

/// Classify a header token as a literal or a name. Literal parsing wins.
pub fn eval_expression(expr: &str) -> Operand {
    match parse_literal(expr) {
        Ok(value) => Operand::Literal(value),
        Err(_) => Operand::Name(expr.to_string()),
    }
}

/// Parse `source` as a single literal value, consuming all of it.
pub fn parse_literal(source: &str) -> Result<Value, LiteralError> {
    let tokens = LiteralLexer::tokenize(source)?;
    let mut parser = LiteralParser { tokens, pos: 0 };
    let value = parser.parse_value()?;
    match parser.peek() {
        Tok::Eof => Ok(value),
        other => Err(parser.error(format!("Unexpected trailing {other:?}"))),
    }
}

/// Why a token is not a literal.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Not a literal at position {position}: {message}")]
pub struct LiteralError {
    pub message: String,
    pub position: usize,
}

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    Null,
    LBracket,
    RBracket,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Comma,
    Colon,
    Eof,
}

struct LiteralLexer {
    chars: Vec<char>,
    pos: usize,
}

impl LiteralLexer {
    fn tokenize(source: &str) -> Result<Vec<(Tok, usize)>, LiteralError> {
        let mut lexer = LiteralLexer {
            chars: source.chars().collect(),
            pos: 0,
        };
        let mut tokens = Vec::new();

        loop {
            lexer.skip_whitespace();
            let start = lexer.pos;
            let token = lexer.next_token()?;
            let is_eof = token == Tok::Eof;
            tokens.push((token, start));
            if is_eof {
                break;
            }
        }

        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Tok, LiteralError> {
        if self.is_at_end() {
            return Ok(Tok::Eof);
        }

        let ch = self.current();
        match ch {
            '0'..='9' | '.' => self.read_number(),
            '-' if self.peek().is_some_and(|c| c.is_ascii_digit() || c == '.') => {
                self.read_number()
            }
            '\'' | '"' => self.read_string(),
            c if c.is_alphabetic() || c == '_' => self.read_word(),
            '[' => self.single(Tok::LBracket),
            ']' => self.single(Tok::RBracket),
            '(' => self.single(Tok::LParen),
            ')' => self.single(Tok::RParen),
            '{' => self.single(Tok::LBrace),
            '}' => self.single(Tok::RBrace),
            ',' => self.single(Tok::Comma),
            ':' => self.single(Tok::Colon),
            _ => Err(self.error(format!("Unexpected character: '{ch}'"))),
        }
    }

    fn single(&mut self, token: Tok) -> Result<Tok, LiteralError> {
        self.advance();
        Ok(token)
    }

    fn read_number(&mut self) -> Result<Tok, LiteralError> {
        let start = self.pos;
        let mut is_float = false;

        if self.current() == '-' {
            self.advance();
        }
        while !self.is_at_end() {
            match self.current() {
                '0'..='9' => self.advance(),
                '.' => {
                    is_float = true;
                    self.advance();
                }
                'e' | 'E' => {
                    is_float = true;
                    self.advance();
                    if !self.is_at_end() && matches!(self.current(), '+' | '-') {
                        self.advance();
                    }
                }
                _ => break,
            }
        }

        let text: String = self.chars[start..self.pos].iter().collect();
        let invalid = || LiteralError {
            message: format!("Invalid number: '{text}'"),
            position: start,
        };
        if is_float {
            text.parse().map(Tok::Float).map_err(|_| invalid())
        } else {
            text.parse().map(Tok::Int).map_err(|_| invalid())
        }
    }

    fn read_string(&mut self) -> Result<Tok, LiteralError> {
        let quote = self.current();
        self.advance(); // skip opening quote

        let mut value = String::new();

        while !self.is_at_end() && self.current() != quote {
            if self.current() == '\\' {
                self.advance();
                if self.is_at_end() {
                    return Err(self.error("Unterminated escape sequence".into()));
                }
                match self.current() {
                    'n' => value.push('\n'),
                    't' => value.push('\t'),
                    'r' => value.push('\r'),
                    '\\' => value.push('\\'),
                    '\'' => value.push('\''),
                    '"' => value.push('"'),
                    c => {
                        value.push('\\');
                        value.push(c);
                    }
                }
            } else {
                value.push(self.current());
            }
            self.advance();
        }

        if self.is_at_end() {
            return Err(self.error("Unterminated string".into()));
        }

        self.advance(); // skip closing quote
        Ok(Tok::Str(value))
    }

    fn read_word(&mut self) -> Result<Tok, LiteralError> {
        let start = self.pos;
        while !self.is_at_end() && (self.current().is_alphanumeric() || self.current() == '_') {
            self.advance();
        }

        let text: String = self.chars[start..self.pos].iter().collect();
        match text.as_str() {
            "true" | "True" => Ok(Tok::Bool(true)),
            "false" | "False" => Ok(Tok::Bool(false)),
            "null" | "None" => Ok(Tok::Null),
            _ => Err(LiteralError {
                message: format!("'{text}' is a name"),
                position: start,
            }),
        }
    }

    // --- Helpers ---

    fn skip_whitespace(&mut self) {
        while !self.is_at_end() && self.current().is_whitespace() {
            self.advance();
        }
    }

    fn current(&self) -> char {
        self.chars[self.pos]
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos + 1).copied()
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn error(&self, message: String) -> LiteralError {
        LiteralError {
            message,
            position: self.pos,
        }
    }
}

struct LiteralParser {
    tokens: Vec<(Tok, usize)>,
    pos: usize,
}

impl LiteralParser {
    fn parse_value(&mut self) -> Result<Value, LiteralError> {
        let token = self.peek().clone();
        self.advance();
        match token {
            Tok::Int(n) => Ok(Value::Int(n)),
            Tok::Float(n) => Ok(Value::Float(n)),
            Tok::Str(s) => Ok(Value::Str(s)),
            Tok::Bool(b) => Ok(Value::Bool(b)),
            Tok::Null => Ok(Value::None),
            Tok::LBracket => self.parse_sequence(&Tok::RBracket).map(Value::List),
            Tok::LParen => self.parse_parenthesized(),
            Tok::LBrace => self.parse_map(),
            other => Err(self.error(format!("Expected a value, found {other:?}"))),
        }
    }

    /// Comma separated values up to `close`; a trailing comma is allowed.
    fn parse_sequence(&mut self, close: &Tok) -> Result<Vec<Value>, LiteralError> {
        let mut items = Vec::new();
        while self.peek() != close {
            items.push(self.parse_value()?);
            if !self.eat(&Tok::Comma) {
                break;
            }
        }
        self.expect(close)?;
        Ok(items)
    }

    /// `()` and `(a,)` are tuples, `(a)` is just `a`.
    fn parse_parenthesized(&mut self) -> Result<Value, LiteralError> {
        if self.eat(&Tok::RParen) {
            return Ok(Value::List(Vec::new()));
        }
        let first = self.parse_value()?;
        if self.eat(&Tok::RParen) {
            return Ok(first);
        }
        self.expect(&Tok::Comma)?;
        let mut items = vec![first];
        items.extend(self.parse_sequence(&Tok::RParen)?);
        Ok(Value::List(items))
    }

    fn parse_map(&mut self) -> Result<Value, LiteralError> {
        let mut map = BTreeMap::new();
        while self.peek() != &Tok::RBrace {
            let key = match self.peek().clone() {
                Tok::Str(key) => key,
                other => return Err(self.error(format!("Mapping keys must be strings, found {other:?}"))),
            };
            self.advance();
            self.expect(&Tok::Colon)?;
            let value = self.parse_value()?;
            map.insert(key, value);
            if !self.eat(&Tok::Comma) {
                break;
            }
        }
        self.expect(&Tok::RBrace)?;
        Ok(Value::Map(map))
    }

    // --- Helpers ---

    fn peek(&self) -> &Tok {
        &self.tokens[self.pos.min(self.tokens.len() - 1)].0
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
    }

    fn eat(&mut self, token: &Tok) -> bool {
        if self.peek() == token {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Tok) -> Result<(), LiteralError> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.error(format!("Expected {token:?}, found {:?}", self.peek())))
        }
    }

    fn error(&self, message: String) -> LiteralError {
        LiteralError {
            message,
            position: self.tokens[self.pos.min(self.tokens.len() - 1)].1,
        }
    }
}
