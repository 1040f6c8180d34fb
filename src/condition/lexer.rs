//! Condition tokenizer
//!
//! Splits input into structural tokens (parentheses, AND/OR, comparison
//! operators) and operands. Consecutive plain atoms separated only by
//! whitespace are merged into one operand, so `some label` stays a single
//! value. Quoted operands are unescaped here: a backslash makes the next
//! character literal.

use crate::condition::ast::{ConditionOperator, Operator};
use crate::condition::dialect::OperatorTable;
use crate::error::{ParseError, Result};

const COMPARISON_PREFIXES: [char; 4] = ['!', '*', '^', '$'];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Unquoted operand, trimmed
    Text(String),
    /// Quoted operand with quotes and escapes removed
    Quoted(String),
    Compare(Operator),
    Boolean(ConditionOperator),
    OpenParen,
    CloseParen,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte offset of the token's first character
    pub position: usize,
}

impl Token {
    fn new(kind: TokenKind, position: usize) -> Self {
        Self { kind, position }
    }

    /// Operand text, if this is a key or value
    pub fn operand(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Text(text) | TokenKind::Quoted(text) => Some(text),
            _ => None,
        }
    }
}

/// Tokenize `input` according to `table`
pub fn tokenize(input: &str, table: &OperatorTable) -> Result<Vec<Token>> {
    Lexer::new(input, table).run()
}

struct Lexer<'a> {
    input: &'a str,
    table: &'a OperatorTable,
    position: usize,
    tokens: Vec<Token>,
    /// Byte span of the plain text run not yet emitted
    pending: Option<(usize, usize)>,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str, table: &'a OperatorTable) -> Self {
        Self {
            input,
            table,
            position: 0,
            tokens: Vec::new(),
            pending: None,
        }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.position..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn run(mut self) -> Result<Vec<Token>> {
        while let Some(c) = self.peek() {
            let start = self.position;

            if c.is_whitespace() {
                self.position += c.len_utf8();
            } else if c == '"' {
                self.flush();
                let value = self.quoted()?;
                self.tokens.push(Token::new(TokenKind::Quoted(value), start));
            } else if c == '(' || c == ')' {
                self.flush();
                self.position += 1;
                let kind = if c == '(' {
                    TokenKind::OpenParen
                } else {
                    TokenKind::CloseParen
                };
                self.tokens.push(Token::new(kind, start));
            } else if let Some(op) = self.table.boolean_for_char(c) {
                self.flush();
                self.position += c.len_utf8();
                self.tokens.push(Token::new(TokenKind::Boolean(op), start));
            } else if self.at_comparison() {
                self.flush();
                let op = self.comparison()?;
                self.tokens.push(Token::new(TokenKind::Compare(op), start));
            } else {
                self.atom();
            }
        }

        self.flush();
        Ok(self.tokens)
    }

    /// Emit the pending plain run as one operand
    fn flush(&mut self) {
        if let Some((start, end)) = self.pending.take() {
            let text = self.input[start..end].to_string();
            self.tokens.push(Token::new(TokenKind::Text(text), start));
        }
    }

    fn prefix_supported(&self, prefix: char) -> bool {
        self.table
            .comparisons
            .iter()
            .any(|op| op.symbol().len() == 2 && op.symbol().starts_with(prefix))
    }

    fn at_comparison(&self) -> bool {
        let rest = self.rest();
        match rest.chars().next() {
            Some('=') => true,
            Some(c) if COMPARISON_PREFIXES.contains(&c) => {
                rest[1..].starts_with('=') || self.prefix_supported(c)
            }
            _ => false,
        }
    }

    fn comparison(&mut self) -> Result<Operator> {
        let start = self.position;
        let rest = self.rest();

        let symbol = if rest.starts_with('=') {
            &rest[..1]
        } else if rest[1..].starts_with('=') {
            &rest[..2]
        } else {
            // at_comparison only lets ASCII prefixes through
            let found = rest.chars().next().unwrap_or_default();
            return Err(ParseError::UnexpectedCharacter {
                found,
                position: start,
            });
        };

        let op = Operator::from_symbol(symbol).ok_or(ParseError::UnexpectedCharacter {
            found: '=',
            position: start,
        })?;
        if !self.table.supports(op) {
            return Err(ParseError::UnsupportedOperator {
                operator: op.symbol(),
                dialect: self.table.name,
                position: start,
            });
        }

        self.position += symbol.len();
        Ok(op)
    }

    fn at_delimiter(&self) -> bool {
        match self.peek() {
            None => true,
            Some(c) => {
                c.is_whitespace()
                    || c == '"'
                    || c == '('
                    || c == ')'
                    || self.table.boolean_for_char(c).is_some()
                    || self.at_comparison()
            }
        }
    }

    /// Consume one whitespace-free run of plain characters
    fn atom(&mut self) {
        let start = self.position;
        while !self.at_delimiter() {
            if let Some(c) = self.peek() {
                self.position += c.len_utf8();
            }
        }
        let end = self.position;

        if let Some(op) = self.table.boolean_for_word(&self.input[start..end]) {
            self.flush();
            self.tokens.push(Token::new(TokenKind::Boolean(op), start));
            return;
        }

        self.pending = match self.pending {
            Some((first, _)) => Some((first, end)),
            None => Some((start, end)),
        };
    }

    /// Read a `"..."` operand, resolving backslash escapes
    fn quoted(&mut self) -> Result<String> {
        let start = self.position;
        let mut chars = self.input[start + 1..].char_indices();
        let mut value = String::new();

        while let Some((offset, c)) = chars.next() {
            match c {
                '"' => {
                    self.position = start + 1 + offset + 1;
                    return Ok(value);
                }
                '\\' => match chars.next() {
                    Some((_, escaped)) => value.push(escaped),
                    None => break,
                },
                _ => value.push(c),
            }
        }

        Err(ParseError::UnterminatedQuote { position: start })
    }
}
