//! Abstract Syntax Tree for condition expressions

/// AST node for condition expressions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Single comparison like `ip != "1.1.1.1"`
    Rule(Rule),
    /// Boolean combination of two sub-trees
    Condition(Condition),
}

impl Node {
    /// Combine two trees with AND
    pub fn and(left: impl Into<Node>, right: impl Into<Node>) -> Node {
        Node::Condition(Condition::new(ConditionOperator::And, left, right))
    }

    /// Combine two trees with OR
    pub fn or(left: impl Into<Node>, right: impl Into<Node>) -> Node {
        Node::Condition(Condition::new(ConditionOperator::Or, left, right))
    }

    pub fn as_rule(&self) -> Option<&Rule> {
        match self {
            Node::Rule(rule) => Some(rule),
            Node::Condition(_) => None,
        }
    }

    pub fn as_condition(&self) -> Option<&Condition> {
        match self {
            Node::Rule(_) => None,
            Node::Condition(cond) => Some(cond),
        }
    }
}

impl From<Rule> for Node {
    fn from(rule: Rule) -> Self {
        Node::Rule(rule)
    }
}

impl From<Condition> for Node {
    fn from(cond: Condition) -> Self {
        Node::Condition(cond)
    }
}

/// Leaf comparison of a key against a value.
///
/// Parsed rules always have a non-empty `key`, and an empty `value` for
/// [`Operator::Exists`]. Rules built by hand must keep to the same shape
/// to render as re-parsable text; see [`Rule::is_well_formed`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rule {
    pub operator: Operator,
    pub key: String,
    pub value: String,
}

impl Rule {
    /// Build a rule. `key` must be non-empty, and `value` must be empty
    /// when `operator` is [`Operator::Exists`].
    pub fn new(operator: Operator, key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            operator,
            key: key.into(),
            value: value.into(),
        }
    }

    /// Whether the rule has the shape the parser produces
    pub fn is_well_formed(&self) -> bool {
        !self.key.is_empty() && (self.operator != Operator::Exists || self.value.is_empty())
    }

    fn placeholder() -> Self {
        Rule::new(Operator::Exists, String::new(), String::new())
    }
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Bare key, no symbol
    Exists,
    /// Equal (=)
    Equal,
    /// Not equal (!=)
    NotEqual,
    /// Contains (*=)
    Contains,
    /// Starts with (^=)
    StartsWith,
    /// Ends with ($=)
    EndsWith,
}

impl Operator {
    pub const ALL: [Operator; 6] = [
        Operator::Exists,
        Operator::Equal,
        Operator::NotEqual,
        Operator::Contains,
        Operator::StartsWith,
        Operator::EndsWith,
    ];

    /// Canonical spelling; empty for [`Operator::Exists`]
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Exists => "",
            Operator::Equal => "=",
            Operator::NotEqual => "!=",
            Operator::Contains => "*=",
            Operator::StartsWith => "^=",
            Operator::EndsWith => "$=",
        }
    }

    /// Look up a comparison by its symbol
    pub fn from_symbol(symbol: &str) -> Option<Operator> {
        Operator::ALL
            .into_iter()
            .find(|op| *op != Operator::Exists && op.symbol() == symbol)
    }

    /// Build a rule with this operator; see [`Rule::new`]
    pub fn of(self, key: impl Into<String>, value: impl Into<String>) -> Rule {
        Rule::new(self, key, value)
    }
}

/// Boolean combinators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionOperator {
    And,
    Or,
}

/// Internal node: `left <operator> right`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub operator: ConditionOperator,
    pub left: Box<Node>,
    pub right: Box<Node>,
}

impl Condition {
    pub fn new(
        operator: ConditionOperator,
        left: impl Into<Node>,
        right: impl Into<Node>,
    ) -> Self {
        Self {
            operator,
            left: Box::new(left.into()),
            right: Box::new(right.into()),
        }
    }
}

impl Drop for Condition {
    // Left-folded trees are as deep as they are long, so children are
    // unlinked onto a heap stack instead of dropped recursively
    fn drop(&mut self) {
        let mut stack: Vec<Node> = Vec::new();
        for child in [&mut self.left, &mut self.right] {
            if matches!(**child, Node::Condition(_)) {
                stack.push(std::mem::replace(&mut **child, Node::Rule(Rule::placeholder())));
            }
        }

        while let Some(mut node) = stack.pop() {
            if let Node::Condition(cond) = &mut node {
                for child in [&mut cond.left, &mut cond.right] {
                    if matches!(**child, Node::Condition(_)) {
                        stack.push(std::mem::replace(&mut **child, Node::Rule(Rule::placeholder())));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_symbols_round_trip() {
        for op in Operator::ALL {
            if op == Operator::Exists {
                assert_eq!(Operator::from_symbol(""), None);
                continue;
            }
            assert_eq!(Operator::from_symbol(op.symbol()), Some(op));
        }
    }

    #[test]
    fn test_operator_of_builds_rule() {
        let rule = Operator::StartsWith.of("ip", "8.8");
        assert_eq!(rule.key, "ip");
        assert_eq!(rule.value, "8.8");
        assert_eq!(rule.operator, Operator::StartsWith);
    }

    #[test]
    fn test_rule_shape() {
        assert!(Operator::Equal.of("a", "").is_well_formed());
        assert!(Operator::Exists.of("a", "").is_well_formed());
        assert!(!Operator::Exists.of("a", "1").is_well_formed());
        assert!(!Operator::Equal.of("", "1").is_well_formed());
    }

    #[test]
    fn test_deep_tree_drops() {
        let mut tree = Node::Rule(Operator::Equal.of("a", "1"));
        for i in 0..200_000 {
            tree = if i % 2 == 0 {
                Node::and(tree, Operator::Equal.of("a", "1"))
            } else {
                Node::or(Operator::Equal.of("a", "1"), tree)
            };
        }
        drop(tree);
    }

    #[test]
    fn test_node_constructors() {
        let node = Node::and(Operator::Exists.of("env", ""), Operator::Equal.of("tag", "x"));
        let cond = node.as_condition().unwrap();
        assert_eq!(cond.operator, ConditionOperator::And);
        assert_eq!(cond.left.as_rule().unwrap().key, "env");
        assert_eq!(cond.right.as_rule().unwrap().key, "tag");
        assert!(node.as_rule().is_none());
    }
}
