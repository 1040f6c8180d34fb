//! Condition matcher
//!
//! Evaluates a tree against a set of key/value attributes. Only equality is
//! tested: an `=` rule holds when some attribute has the rule's key and a
//! case-insensitively equal value, and every other operator inverts that.

use serde::{Deserialize, Serialize};

use crate::condition::ast::{ConditionOperator, Node, Operator, Rule};

/// External key/value datum a rule is compared against
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Attribute {
    pub key: String,
    pub value: String,
}

impl Attribute {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Same key, value equal ignoring case
    pub fn is_match(&self, rule: &Rule) -> bool {
        self.key == rule.key && eq_ignore_case(&self.value, &rule.value)
    }
}

impl<K: Into<String>, V: Into<String>> From<(K, V)> for Attribute {
    fn from((key, value): (K, V)) -> Self {
        Attribute::new(key, value)
    }
}

enum Step<'a> {
    Visit(&'a Node),
    Combine(ConditionOperator),
}

/// Evaluate a tree against attributes. An empty attribute set never matches.
pub fn matches(node: &Node, attributes: &[Attribute]) -> bool {
    if attributes.is_empty() {
        return false;
    }

    // Post-order over an explicit stack; left-folded trees are as deep as they are long
    let mut steps = vec![Step::Visit(node)];
    let mut results: Vec<bool> = Vec::new();

    while let Some(step) = steps.pop() {
        match step {
            Step::Visit(Node::Rule(rule)) => results.push(matches_rule(rule, attributes)),
            Step::Visit(Node::Condition(cond)) => {
                steps.push(Step::Combine(cond.operator));
                steps.push(Step::Visit(&cond.right));
                steps.push(Step::Visit(&cond.left));
            }
            Step::Combine(operator) => {
                let right = results.pop().unwrap_or(false);
                let left = results.pop().unwrap_or(false);
                results.push(match operator {
                    ConditionOperator::And => left && right,
                    ConditionOperator::Or => left || right,
                });
            }
        }
    }

    results.pop().unwrap_or(false)
}

fn matches_rule(rule: &Rule, attributes: &[Attribute]) -> bool {
    let otherwise = rule.operator != Operator::Equal;
    if attributes.iter().any(|attr| attr.is_match(rule)) {
        !otherwise
    } else {
        otherwise
    }
}

/// Per-character comparison through simple uppercase mapping. Characters
/// whose uppercase form expands (`ß` to `SS`) only equal themselves.
fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars().map(simple_upper).eq(b.chars().map(simple_upper))
}

fn simple_upper(c: char) -> char {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(single), None) => single,
        _ => c,
    }
}
