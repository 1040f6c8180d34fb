//! KV Condition - boolean key/value condition language
//!
//! This crate parses conditions such as `env & ( ip != 1.1.1.1 | tag *= "x" )`
//! or `tag = ONLINE AND ip != 1.1.1.1` into trees, renders them back to a
//! canonical text form and matches label queries against attributes.
//! Python bindings via PyO3 are available behind the `python` feature.
//!
//! ```
//! use kv_condition::{Attribute, KvCondition, LabelQuery};
//!
//! let cond = KvCondition::parse("a = 1 & b = 2 | c = 3").unwrap();
//! assert_eq!(cond.to_text(), r#"( ( a = "1" & b = "2" ) | c = "3" )"#);
//!
//! let query = LabelQuery::parse("ip != 1.1.1.1").unwrap();
//! assert!(query.matches(&[Attribute::new("ip", "2.2.2.2")]));
//! ```

pub mod condition;
pub mod error;

#[cfg(feature = "python")]
mod python;

pub use condition::{
    Attribute, Condition, ConditionOperator, Dialect, Expression, KvCondition, LabelQuery, Node,
    Operator, OperatorTable, Rule, Rules, Symbolic, Word,
};
pub use error::{ParseError, Result};
