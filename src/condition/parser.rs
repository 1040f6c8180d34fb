//! Condition string parser
//!
//! Boolean operators fold strictly left to right: each AND/OR takes the
//! whole tree built so far as its left operand, so `a & b | c` is
//! `( ( a & b ) | c )` and AND binds no tighter than OR. Parenthesized
//! groups are built on their own and spliced in as single operands.
//!
//! Both the parenthesis nesting and the depth of the resulting tree are
//! capped at [`MAX_DEPTH`].

use crate::condition::ast::{Condition, ConditionOperator, Node, Operator, Rule};
use crate::condition::dialect::OperatorTable;
use crate::condition::lexer::{tokenize, Token, TokenKind};
use crate::error::{ParseError, Result};

/// Deepest accepted parenthesis nesting and tree depth
pub const MAX_DEPTH: usize = 512;

/// Parse a condition string into an AST using the given operator table
pub fn parse(input: &str, table: &OperatorTable) -> Result<Node> {
    let result = tokenize(input, table).and_then(|tokens| {
        let closers = pair_parens(&tokens)?;
        let parser = Parser {
            tokens: &tokens,
            closers: &closers,
            table,
        };
        parser.build(0, tokens.len()).map(|(node, _)| node)
    });

    match &result {
        Ok(node) => tracing::debug!(
            dialect = table.name,
            rules = node.rule_count(),
            "parsed condition"
        ),
        Err(err) => tracing::debug!(dialect = table.name, error = %err, "rejected condition"),
    }

    result
}

/// For every `(`, the index of its `)`, found in one pass
fn pair_parens(tokens: &[Token]) -> Result<Vec<Option<usize>>> {
    let mut closers = vec![None; tokens.len()];
    let mut open: Vec<usize> = Vec::new();

    for (i, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::OpenParen => {
                if open.len() >= MAX_DEPTH {
                    return Err(ParseError::NestingTooDeep {
                        limit: MAX_DEPTH,
                        position: token.position,
                    });
                }
                open.push(i);
            }
            TokenKind::CloseParen => match open.pop() {
                Some(start) => closers[start] = Some(i),
                None => {
                    return Err(ParseError::UnbalancedParenthesis {
                        position: token.position,
                    })
                }
            },
            _ => {}
        }
    }

    match open.pop() {
        Some(start) => Err(ParseError::UnbalancedParenthesis {
            position: tokens[start].position,
        }),
        None => Ok(closers),
    }
}

struct Parser<'t> {
    tokens: &'t [Token],
    closers: &'t [Option<usize>],
    table: &'t OperatorTable,
}

impl Parser<'_> {
    /// Build `tokens[start..end]` into a tree and report its depth.
    /// Recurses once per parenthesis level.
    fn build(&self, start: usize, end: usize) -> Result<(Node, usize)> {
        let mut fold = Fold::default();
        let mut i = start;

        while i < end {
            let token = &self.tokens[i];
            match &token.kind {
                TokenKind::OpenParen => {
                    let close = self.closers[i].ok_or(ParseError::UnbalancedParenthesis {
                        position: token.position,
                    })?;
                    let (group, depth) = self.build(i + 1, close)?;
                    fold.push_operand(group, depth, token.position, "(")?;
                    i = close + 1;
                }
                TokenKind::CloseParen => {
                    return Err(ParseError::UnbalancedParenthesis {
                        position: token.position,
                    });
                }
                TokenKind::Boolean(op) => {
                    fold.push_operator(*op, token.position)?;
                    i += 1;
                }
                TokenKind::Compare(_) => {
                    return Err(ParseError::MissingKey {
                        position: token.position,
                    });
                }
                TokenKind::Text(key) | TokenKind::Quoted(key) => {
                    let (rule, consumed) = self.rule_at(i, end, key)?;
                    fold.push_operand(Node::Rule(rule), 1, token.position, key)?;
                    i += consumed;
                }
            }
        }

        fold.finish()
    }

    /// Build the rule whose key is `tokens[i]`, returning it with the number
    /// of tokens it spans
    fn rule_at(&self, i: usize, end: usize, key: &str) -> Result<(Rule, usize)> {
        let tokens = &self.tokens[..end];
        let position = tokens[i].position;

        if let Some(Token {
            kind: TokenKind::Compare(op),
            position: op_position,
        }) = tokens.get(i + 1)
        {
            if key.is_empty() {
                return Err(ParseError::MissingKey {
                    position: *op_position,
                });
            }
            // A missing value leaves the rule with an empty one
            return Ok(match tokens.get(i + 2).and_then(Token::operand) {
                Some(value) => (op.of(key, value), 3),
                None => (op.of(key, ""), 2),
            });
        }

        if !self.table.supports(Operator::Exists) {
            return Err(ParseError::BareKeyNotSupported {
                key: key.to_string(),
                dialect: self.table.name,
                position,
            });
        }
        if key.is_empty() {
            return Err(ParseError::MissingKey { position });
        }
        Ok((Operator::Exists.of(key, ""), 1))
    }
}

/// Boolean operator still waiting for its right operand
#[derive(Debug)]
struct Pending {
    operator: ConditionOperator,
    left: Node,
    left_depth: usize,
    position: usize,
}

/// Left-fold state owned by a single `build` call
#[derive(Debug, Default)]
struct Fold {
    root: Option<Node>,
    depth: usize,
    pending: Option<Pending>,
}

impl Fold {
    fn push_operand(
        &mut self,
        node: Node,
        depth: usize,
        position: usize,
        found: &str,
    ) -> Result<()> {
        if let Some(Pending {
            operator,
            left,
            left_depth,
            ..
        }) = self.pending.take()
        {
            let depth = 1 + left_depth.max(depth);
            if depth > MAX_DEPTH {
                return Err(ParseError::NestingTooDeep {
                    limit: MAX_DEPTH,
                    position,
                });
            }
            self.root = Some(Node::Condition(Condition::new(operator, left, node)));
            self.depth = depth;
            return Ok(());
        }
        if self.root.is_some() {
            return Err(ParseError::UnexpectedToken {
                found: found.to_string(),
                position,
            });
        }
        self.root = Some(node);
        self.depth = depth;
        Ok(())
    }

    fn push_operator(&mut self, operator: ConditionOperator, position: usize) -> Result<()> {
        if self.pending.is_some() {
            return Err(ParseError::MissingOperand { position });
        }
        match self.root.take() {
            Some(left) => {
                self.pending = Some(Pending {
                    operator,
                    left,
                    left_depth: self.depth,
                    position,
                });
                Ok(())
            }
            None => Err(ParseError::MissingOperand { position }),
        }
    }

    fn finish(self) -> Result<(Node, usize)> {
        if let Some(pending) = self.pending {
            return Err(ParseError::DanglingOperator {
                position: pending.position,
            });
        }
        match self.root {
            Some(root) => Ok((root, self.depth)),
            None => Err(ParseError::EmptyExpression),
        }
    }
}
