//! Canonical text form
//!
//! Every condition is wrapped in `( ... )` and every value is double-quoted,
//! so parsing the output rebuilds the same tree. Keys stay bare unless they
//! would not lex back as a single operand.

use std::fmt::{self, Display, Write};

use crate::condition::ast::{Node, Operator, Rule};
use crate::condition::dialect::OperatorTable;

/// Characters that end a bare operand in at least one dialect
const STRUCTURAL: [char; 10] = ['"', '(', ')', '=', '!', '*', '^', '$', '&', '|'];

/// Render a tree with the boolean spellings of `table`
pub fn render(node: &Node, table: &OperatorTable) -> String {
    Rendered { node, table }.to_string()
}

/// [`Display`] adapter pairing a tree with its dialect
#[derive(Debug, Clone, Copy)]
pub struct Rendered<'a> {
    pub node: &'a Node,
    pub table: &'a OperatorTable,
}

enum Piece<'a> {
    Node(&'a Node),
    Text(&'static str),
}

impl Display for Rendered<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Explicit stack: left-folded trees are as deep as they are long
        let mut stack = vec![Piece::Node(self.node)];

        while let Some(piece) = stack.pop() {
            match piece {
                Piece::Text(text) => f.write_str(text)?,
                Piece::Node(Node::Rule(rule)) => rule.fmt(f)?,
                Piece::Node(Node::Condition(cond)) => {
                    f.write_str("( ")?;
                    stack.push(Piece::Text(" )"));
                    stack.push(Piece::Node(&cond.right));
                    stack.push(Piece::Text(" "));
                    stack.push(Piece::Text(self.table.boolean_symbol(cond.operator)));
                    stack.push(Piece::Text(" "));
                    stack.push(Piece::Node(&cond.left));
                }
            }
        }
        Ok(())
    }
}

impl Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if key_needs_quotes(&self.key) {
            write_quoted(f, &self.key)?;
        } else {
            f.write_str(&self.key)?;
        }
        if self.operator != Operator::Exists {
            write!(f, " {}", self.operator.symbol())?;
        }
        if !self.value.is_empty() {
            f.write_char(' ')?;
            write_quoted(f, &self.value)?;
        }
        Ok(())
    }
}

/// Whether a bare `key` could be split, merged or read as a keyword
fn key_needs_quotes(key: &str) -> bool {
    key.is_empty()
        || key.eq_ignore_ascii_case("and")
        || key.eq_ignore_ascii_case("or")
        || key
            .chars()
            .any(|c| c.is_whitespace() || STRUCTURAL.contains(&c))
}

/// Write `value` in double quotes, escaping `"` and `\`
pub(crate) fn write_quoted(w: &mut impl Write, value: &str) -> fmt::Result {
    w.write_char('"')?;
    for c in value.chars() {
        if c == '"' || c == '\\' {
            w.write_char('\\')?;
        }
        w.write_char(c)?;
    }
    w.write_char('"')
}
