//! Python bindings
//!
//! Exposes `KvCondition` and `LabelQuery` classes holding parsed trees in
//! Rust memory, plus a cached `matches_query` helper.

use pyo3::prelude::*;

use crate::condition::{cache, Attribute, KvCondition, LabelQuery, Rule};

/// (key, operator symbol, value) triple handed to Python
type RuleTuple = (String, &'static str, String);

fn rule_tuple(rule: &Rule) -> RuleTuple {
    (rule.key.clone(), rule.operator.symbol(), rule.value.clone())
}

fn to_attributes(pairs: Vec<(String, String)>) -> Vec<Attribute> {
    pairs.into_iter().map(Attribute::from).collect()
}

// ============================================================================
// PyClasses
// ============================================================================

/// Parsed `&`/`|` condition
#[pyclass(name = "KvCondition", frozen)]
pub struct PyKvCondition {
    inner: KvCondition,
}

#[pymethods]
impl PyKvCondition {
    #[new]
    fn new(text: &str) -> PyResult<Self> {
        Ok(Self {
            inner: cache::get_or_parse(text)?,
        })
    }

    /// Rules in source order as (key, operator, value)
    fn rules(&self) -> Vec<RuleTuple> {
        self.inner.rules().map(rule_tuple).collect()
    }

    fn __str__(&self) -> String {
        self.inner.to_text()
    }

    fn __repr__(&self) -> String {
        format!("KvCondition('{}')", self.inner)
    }
}

/// Parsed `AND`/`OR` label query
#[pyclass(name = "LabelQuery", frozen)]
pub struct PyLabelQuery {
    inner: LabelQuery,
}

#[pymethods]
impl PyLabelQuery {
    #[new]
    fn new(text: &str) -> PyResult<Self> {
        Ok(Self {
            inner: cache::get_or_parse(text)?,
        })
    }

    fn rules(&self) -> Vec<RuleTuple> {
        self.inner.rules().map(rule_tuple).collect()
    }

    /// Match against a list of (key, value) pairs
    fn matches(&self, attributes: Vec<(String, String)>) -> bool {
        self.inner.matches(&to_attributes(attributes))
    }

    fn __str__(&self) -> String {
        self.inner.to_text()
    }

    fn __repr__(&self) -> String {
        format!("LabelQuery('{}')", self.inner)
    }
}

// ============================================================================
// Python Functions
// ============================================================================

/// Match a label query against (key, value) pairs, caching the parsed query
///
/// # Raises
/// ValueError if the query does not parse
#[pyfunction]
fn matches_query(query: &str, attributes: Vec<(String, String)>) -> PyResult<bool> {
    Ok(cache::matches_cached(query, &to_attributes(attributes))?)
}

/// Drop every cached tree
#[pyfunction]
fn clear_cache() {
    cache::clear_cache();
}

// ============================================================================
// Python Module Definition
// ============================================================================

#[pymodule]
fn kv_condition(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(matches_query, m)?)?;
    m.add_function(wrap_pyfunction!(clear_cache, m)?)?;
    m.add_class::<PyKvCondition>()?;
    m.add_class::<PyLabelQuery>()?;
    Ok(())
}
