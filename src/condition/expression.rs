//! Public condition value
//!
//! [`Expression`] owns a parsed tree and knows its dialect. It converts to
//! and from canonical text, including through serde, where it is carried
//! as a plain string.

use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::condition::ast::{Node, Rule};
use crate::condition::dialect::{Dialect, OperatorTable, Symbolic, Word};
use crate::condition::matcher::{self, Attribute};
use crate::condition::parser;
use crate::condition::render::Rendered;
use crate::condition::traversal::Rules;
use crate::error::Result;

/// A parsed condition in dialect `D`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression<D: Dialect> {
    root: Node,
    dialect: PhantomData<D>,
}

/// `&`/`|` conditions, e.g. `env & ( ip != 1.1.1.1 | tag *= "test" )`
pub type KvCondition = Expression<Symbolic>;

/// `AND`/`OR` label queries, e.g. `tag = ONLINE AND ip != 1.1.1.1`
pub type LabelQuery = Expression<Word>;

impl<D: Dialect> Expression<D> {
    /// Wrap an already built tree
    pub fn new(root: Node) -> Self {
        Self {
            root,
            dialect: PhantomData,
        }
    }

    pub fn parse(text: &str) -> Result<Self> {
        parser::parse(text, &D::TABLE).map(Self::new)
    }

    pub fn parse_bytes(data: &[u8]) -> Result<Self> {
        Self::parse(std::str::from_utf8(data)?)
    }

    pub fn table() -> OperatorTable {
        D::TABLE
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn into_root(self) -> Node {
        self.root
    }

    /// Canonical text form
    pub fn to_text(&self) -> String {
        self.to_string()
    }

    pub fn marshal_text(&self) -> Vec<u8> {
        self.to_text().into_bytes()
    }

    /// Replace `self` with the parse of `data`; on error `self` is untouched
    pub fn unmarshal_text(&mut self, data: &[u8]) -> Result<()> {
        *self = Self::parse_bytes(data)?;
        Ok(())
    }

    pub fn rules(&self) -> Rules<'_> {
        self.root.rules()
    }

    pub fn for_each_rule(&self, visit: impl FnMut(&Rule)) {
        self.root.for_each_rule(visit)
    }
}

impl<D: Dialect> Expression<D> {
    /// Match against attributes when the dialect defines matching, `None` otherwise
    pub fn try_matches(&self, attributes: &[Attribute]) -> Option<bool> {
        D::TABLE
            .supports_matching
            .then(|| matcher::matches(&self.root, attributes))
    }
}

impl LabelQuery {
    /// See [`matcher::matches`]
    pub fn matches(&self, attributes: &[Attribute]) -> bool {
        matcher::matches(&self.root, attributes)
    }
}

impl<D: Dialect> fmt::Display for Expression<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = D::TABLE;
        let rendered = Rendered {
            node: &self.root,
            table: &table,
        };
        fmt::Display::fmt(&rendered, f)
    }
}

impl<D: Dialect> FromStr for Expression<D> {
    type Err = crate::error::ParseError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl<D: Dialect> From<Expression<D>> for Node {
    fn from(expr: Expression<D>) -> Self {
        expr.root
    }
}

impl<D: Dialect> Serialize for Expression<D> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de, D: Dialect> Deserialize<'de> for Expression<D> {
    fn deserialize<De: Deserializer<'de>>(
        deserializer: De,
    ) -> std::result::Result<Self, De::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(De::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::ast::Operator;
    use crate::error::ParseError;

    #[test]
    fn test_kv_condition_canonical_form() {
        let rule = r#"env & tag = ONLINE & tag = "some label" & ip & ( ip != 1.1.1.1 | ip ^= "8.8" | tag *= "test\&" ) | ip $= 4.4"#;

        let mut cond = KvCondition::new(Node::Rule(Operator::Exists.of("placeholder", "")));
        cond.unmarshal_text(rule.as_bytes()).unwrap();

        assert_eq!(
            cond.to_text(),
            r#"( ( ( ( ( env & tag = "ONLINE" ) & tag = "some label" ) & ip ) & ( ( ip != "1.1.1.1" | ip ^= "8.8" ) | tag *= "test&" ) ) | ip $= "4.4" )"#
        );

        let reparsed = KvCondition::parse(&cond.to_text()).unwrap();
        assert_eq!(reparsed.to_text(), cond.to_text());

        let rules: Vec<Rule> = reparsed.rules().cloned().collect();
        assert_eq!(
            rules,
            vec![
                Operator::Exists.of("env", ""),
                Operator::Equal.of("tag", "ONLINE"),
                Operator::Equal.of("tag", "some label"),
                Operator::Exists.of("ip", ""),
                Operator::NotEqual.of("ip", "1.1.1.1"),
                Operator::StartsWith.of("ip", "8.8"),
                Operator::Contains.of("tag", "test&"),
                Operator::EndsWith.of("ip", "4.4"),
            ]
        );
    }

    #[test]
    fn test_unmarshal_failure_keeps_previous_value() {
        let mut cond = KvCondition::parse("a = 1").unwrap();
        let before = cond.clone();

        let rule = r#"tag = ONLINE & tag = "some label" & ( ip = 1.1.1.1 | ip = "8.8.8.8" | tag = test & ip = 4.4.4.4"#;
        assert!(cond.unmarshal_text(rule.as_bytes()).is_err());
        assert_eq!(cond, before);

        assert!(matches!(
            cond.unmarshal_text(&[0xff, 0xfe]),
            Err(ParseError::InvalidUtf8(_))
        ));
        assert_eq!(cond, before);
    }

    #[test]
    fn test_label_query_matches() {
        let lql = r#"tag = ONLINE and tag = "some label" AND ( ip != 1.1.1.1 or ip = "8.8.8.8" or tag = test) OR ip = 4.4.4.4"#;
        let query = LabelQuery::parse(lql).unwrap();

        assert_eq!(
            query.to_text(),
            r#"( ( ( tag = "ONLINE" AND tag = "some label" ) AND ( ( ip != "1.1.1.1" OR ip = "8.8.8.8" ) OR tag = "test" ) ) OR ip = "4.4.4.4" )"#
        );

        let reparsed = LabelQuery::parse(&query.to_text()).unwrap();
        assert_eq!(reparsed, query);

        assert!(!query.matches(&[
            Attribute::new("tag", "ONLINE"),
            Attribute::new("tag", "some label"),
            Attribute::new("ip", "1.1.1.1"),
        ]));
        assert!(query.matches(&[
            Attribute::new("tag", "ONLINE"),
            Attribute::new("tag", "some label"),
            Attribute::new("tag", "test"),
        ]));
        assert!(query.matches(&[Attribute::new("ip", "4.4.4.4")]));
        assert!(!query.matches(&[Attribute::new("ip", "8.8.8.8")]));
    }

    #[test]
    fn test_from_str_and_marshal() {
        let cond: KvCondition = "a=1|b".parse().unwrap();
        assert_eq!(cond.marshal_text(), br#"( a = "1" | b )"#.to_vec());
        assert_eq!(Node::from(cond.clone()), cond.into_root());
    }

    #[test]
    fn test_try_matches_follows_dialect() {
        let attrs = [Attribute::new("tag", "online")];
        let query = LabelQuery::parse("tag = ONLINE").unwrap();
        let cond = KvCondition::parse("tag = ONLINE").unwrap();

        assert_eq!(query.try_matches(&attrs), Some(true));
        assert_eq!(cond.try_matches(&attrs), None);
    }

    #[test]
    fn test_quoted_keys_round_trip() {
        let cond = KvCondition::parse(r#""a&b" = 1 | "x y""#).unwrap();
        assert_eq!(cond.to_text(), r#"( "a&b" = "1" | "x y" )"#);
        assert_eq!(KvCondition::parse(&cond.to_text()).unwrap(), cond);

        let query = LabelQuery::parse(r#""and" = 1 AND "a(b" != 2"#).unwrap();
        assert_eq!(query.to_text(), r#"( "and" = "1" AND "a(b" != "2" )"#);
        assert_eq!(LabelQuery::parse(&query.to_text()).unwrap(), query);
    }
}
