//! Condition parsing cache
//!
//! Trees are cached per dialect and input text, so repeated queries skip
//! tokenizing and folding.

use crate::condition::ast::Node;
use crate::condition::dialect::{Dialect, Word};
use crate::condition::expression::{Expression, LabelQuery};
use crate::condition::matcher::Attribute;
use crate::error::Result;
use ahash::AHashMap;
use once_cell::sync::Lazy;
use parking_lot::RwLock;

type DialectCache = AHashMap<String, Node>;

/// Trees kept per dialect; a full dialect cache is emptied before the next insert
pub const MAX_CACHED_PER_DIALECT: usize = 4096;

/// Global parse cache keyed by dialect name, then input text
static CONDITION_CACHE: Lazy<RwLock<AHashMap<&'static str, DialectCache>>> =
    Lazy::new(|| RwLock::new(AHashMap::with_capacity(2)));

/// Get or parse a condition string, using cache for repeated conditions
pub fn get_or_parse<D: Dialect>(text: &str) -> Result<Expression<D>> {
    let dialect = D::TABLE.name;

    // Fast path: check read lock first
    {
        let cache = CONDITION_CACHE.read();
        if let Some(node) = cache.get(dialect).and_then(|entries| entries.get(text)) {
            tracing::trace!(dialect, "condition cache hit");
            return Ok(Expression::new(node.clone()));
        }
    }

    tracing::trace!(dialect, "condition cache miss");
    let expr = Expression::<D>::parse(text)?;

    {
        let mut cache = CONDITION_CACHE.write();
        let entries = cache
            .entry(dialect)
            .or_insert_with(|| AHashMap::with_capacity(256));
        if entries.len() >= MAX_CACHED_PER_DIALECT && !entries.contains_key(text) {
            tracing::debug!(dialect, evicted = entries.len(), "condition cache full");
            entries.clear();
        }
        entries.insert(text.to_string(), expr.root().clone());
    }

    Ok(expr)
}

/// Match a label query against attributes, using the cached tree.
///
/// A blank query places no constraint and always matches.
pub fn matches_cached(query: &str, attributes: &[Attribute]) -> Result<bool> {
    if query.trim().is_empty() {
        return Ok(true);
    }

    let expr: LabelQuery = get_or_parse::<Word>(query)?;
    Ok(expr.matches(attributes))
}

/// Whether `text` has a cached tree for dialect `D`
pub fn is_cached<D: Dialect>(text: &str) -> bool {
    let cache = CONDITION_CACHE.read();
    cache
        .get(D::TABLE.name)
        .is_some_and(|entries| entries.contains_key(text))
}

/// Clear the condition cache
pub fn clear_cache() {
    let mut cache = CONDITION_CACHE.write();
    cache.clear();
}

/// Number of cached trees across all dialects
pub fn cache_size() -> usize {
    let cache = CONDITION_CACHE.read();
    cache.values().map(|entries| entries.len()).sum()
}

/// Number of cached trees for dialect `D`
pub fn cached_len<D: Dialect>() -> usize {
    let cache = CONDITION_CACHE.read();
    cache.get(D::TABLE.name).map_or(0, |entries| entries.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::dialect::Symbolic;
    use crate::condition::expression::KvCondition;

    // Hit, bound and clear share one test so no other test clears the
    // global cache between steps
    #[test]
    fn test_cache_hit_bound_and_clear() {
        let text = "cache_key = \"hit\" & cache_key_2";

        let first = get_or_parse::<Symbolic>(text).unwrap();
        assert!(is_cached::<Symbolic>(text));
        assert!(!is_cached::<Word>(text));
        assert!(cache_size() >= 1);

        let second = get_or_parse::<Symbolic>(text).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, KvCondition::parse(text).unwrap());

        for i in 0..MAX_CACHED_PER_DIALECT * 2 + 10 {
            get_or_parse::<Symbolic>(&format!("key_{i} = 1")).unwrap();
            assert!(cached_len::<Symbolic>() <= MAX_CACHED_PER_DIALECT);
        }
        assert!(cached_len::<Symbolic>() >= 1);

        clear_cache();
        assert!(!is_cached::<Symbolic>(text));
        assert_eq!(cached_len::<Symbolic>(), 0);
    }

    #[test]
    fn test_errors_are_not_cached() {
        let text = "cache_error = 1 &";
        assert!(get_or_parse::<Symbolic>(text).is_err());
        assert!(!is_cached::<Symbolic>(text));
    }

    #[test]
    fn test_matches_cached() {
        let attrs = [Attribute::new("tag", "online")];
        assert!(matches_cached("tag = ONLINE", &attrs).unwrap());
        assert!(!matches_cached("tag != ONLINE", &attrs).unwrap());
        assert!(matches_cached("", &attrs).unwrap());
        assert!(matches_cached("  ", &[]).unwrap());
        assert!(matches_cached("tag = ONLINE AND", &attrs).is_err());
    }
}
