//! Operator tables for the two surface syntaxes
//!
//! Both syntaxes share one lexer, parser and serializer. What differs is
//! captured in an [`OperatorTable`]: how AND/OR are spelled, which comparison
//! operators are accepted and whether the matcher applies.

use std::fmt;
use std::hash::Hash;

use crate::condition::ast::{ConditionOperator, Operator};

/// Configuration of one condition-language variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorTable {
    /// Dialect name, used in errors and logs
    pub name: &'static str,
    /// Canonical spelling of AND
    pub and: &'static str,
    /// Canonical spelling of OR
    pub or: &'static str,
    /// Comparison operators accepted by the lexer. Listing
    /// [`Operator::Exists`] allows bare keys.
    pub comparisons: &'static [Operator],
    /// Whether trees of this dialect can be matched against attributes
    pub supports_matching: bool,
}

impl OperatorTable {
    /// Canonical spelling of a boolean operator
    pub fn boolean_symbol(&self, op: ConditionOperator) -> &'static str {
        match op {
            ConditionOperator::And => self.and,
            ConditionOperator::Or => self.or,
        }
    }

    /// AND/OR spelled as words are matched case-insensitively against whole atoms
    pub fn uses_boolean_words(&self) -> bool {
        self.and.chars().all(char::is_alphabetic)
    }

    pub fn supports(&self, op: Operator) -> bool {
        self.comparisons.contains(&op)
    }

    /// Classify a single character as a symbolic AND/OR
    pub(crate) fn boolean_for_char(&self, c: char) -> Option<ConditionOperator> {
        if self.uses_boolean_words() {
            return None;
        }
        let mut buf = [0u8; 4];
        let s: &str = c.encode_utf8(&mut buf);
        if s == self.and {
            Some(ConditionOperator::And)
        } else if s == self.or {
            Some(ConditionOperator::Or)
        } else {
            None
        }
    }

    /// Classify a whole plain atom as a worded AND/OR
    pub(crate) fn boolean_for_word(&self, word: &str) -> Option<ConditionOperator> {
        if !self.uses_boolean_words() {
            return None;
        }
        if word.eq_ignore_ascii_case(self.and) {
            Some(ConditionOperator::And)
        } else if word.eq_ignore_ascii_case(self.or) {
            Some(ConditionOperator::Or)
        } else {
            None
        }
    }
}

/// Type-level selection of an [`OperatorTable`]
pub trait Dialect:
    fmt::Debug + Clone + Copy + Default + PartialEq + Eq + Hash + Send + Sync + 'static
{
    const TABLE: OperatorTable;
}

/// `&`/`|` with the full comparison vocabulary, e.g.
/// `env & ( ip != 1.1.1.1 | tag *= "test" )`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Symbolic;

impl Dialect for Symbolic {
    const TABLE: OperatorTable = OperatorTable {
        name: "symbolic",
        and: "&",
        or: "|",
        comparisons: &[
            Operator::Exists,
            Operator::Equal,
            Operator::NotEqual,
            Operator::Contains,
            Operator::StartsWith,
            Operator::EndsWith,
        ],
        supports_matching: false,
    };
}

/// `AND`/`OR` (any case) with `=` and `!=`, e.g.
/// `tag = ONLINE and ( ip != 1.1.1.1 OR ip = "8.8.8.8" )`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Word;

impl Dialect for Word {
    const TABLE: OperatorTable = OperatorTable {
        name: "word",
        and: "AND",
        or: "OR",
        comparisons: &[Operator::Equal, Operator::NotEqual],
        supports_matching: true,
    };
}
