//! Condition trees.
//!
//! A [`Q`] is a boolean expression over lookup leaves. Leaves are parsed from
//! Django-style keys (`field__operator`) when the tree is built; the operator
//! is only resolved against a lookup registry when the tree is compiled, so
//! the same tree can be rendered for any dialect.
//!
//! ```rust
//! use querykit_core::{Q, q};
//!
//! let filter = q! { "id" => 1 }.and(Q::any([
//!     q! { "username" => "foo" },
//!     q! { "username" => "bar" },
//! ]));
//! assert!(!filter.is_empty());
//! ```

use std::ops::{BitAnd, BitOr, Not};

use serde_json::Value as JsonValue;

use crate::error::{QueryError, Result};
use crate::value::{FilterValue, SqlValue};

/// Separator between a field name and its lookup operator.
pub const LOOKUP_SEPARATOR: &str = "__";

/// A single `(field, operator, value)` condition.
#[derive(Debug, Clone)]
pub struct Lookup {
    /// Field name, optionally prefixed with a table alias (`alias.field`).
    pub field: String,
    /// Operator suffix. `None` means the registry default (`exact`).
    pub operator: Option<String>,
    /// Value the field is compared against.
    pub value: FilterValue,
}

impl Lookup {
    /// Parses a `field[__operator]` key into a lookup.
    ///
    /// The key is split on the last `__`, so `user__name__contains` yields
    /// field `user__name` and operator `contains`.
    pub fn parse(key: &str, value: impl Into<FilterValue>) -> Self {
        let (field, operator) = match key.rsplit_once(LOOKUP_SEPARATOR) {
            Some((field, op)) if !field.is_empty() && !op.is_empty() => {
                (field.to_string(), Some(op.to_string()))
            }
            _ => (key.to_string(), None),
        };
        Self {
            field,
            operator,
            value: value.into(),
        }
    }
}

/// A boolean condition tree.
#[derive(Debug, Clone)]
pub enum Q {
    /// A lookup leaf.
    Lookup(Lookup),
    /// Raw condition SQL. May use `[[column]]` placeholders.
    Raw(String),
    /// All children must hold.
    And(Vec<Q>),
    /// Any child must hold.
    Or(Vec<Q>),
    /// Negation of the child.
    Not(Box<Q>),
}

impl Q {
    /// Creates a lookup leaf from a `field[__operator]` key.
    pub fn lookup(key: &str, value: impl Into<FilterValue>) -> Self {
        Self::Lookup(Lookup::parse(key, value))
    }

    /// Creates a raw condition.
    pub fn raw(sql: impl Into<String>) -> Self {
        Self::Raw(sql.into())
    }

    /// Builds an implicit AND from `key => value` pairs, preserving order.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<FilterValue>,
    {
        Self::And(
            pairs
                .into_iter()
                .map(|(key, value)| Self::lookup(key.as_ref(), value))
                .collect(),
        )
    }

    /// Explicit AND of the given trees.
    pub fn all(children: impl IntoIterator<Item = Self>) -> Self {
        Self::And(children.into_iter().collect())
    }

    /// Explicit OR of the given trees.
    pub fn any(children: impl IntoIterator<Item = Self>) -> Self {
        Self::Or(children.into_iter().collect())
    }

    /// `NOT (a AND b ...)`.
    pub fn and_not(children: impl IntoIterator<Item = Self>) -> Self {
        Self::all(children).negate()
    }

    /// `NOT (a OR b ...)`.
    pub fn or_not(children: impl IntoIterator<Item = Self>) -> Self {
        Self::any(children).negate()
    }

    /// Combines with AND, flattening nested ANDs.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        match (self, other) {
            (Self::And(mut left), Self::And(right)) => {
                left.extend(right);
                Self::And(left)
            }
            (Self::And(mut left), right) => {
                left.push(right);
                Self::And(left)
            }
            (left, Self::And(mut right)) => {
                right.insert(0, left);
                Self::And(right)
            }
            (left, right) => Self::And(vec![left, right]),
        }
    }

    /// Combines with OR, flattening nested ORs.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        match (self, other) {
            (Self::Or(mut left), Self::Or(right)) => {
                left.extend(right);
                Self::Or(left)
            }
            (Self::Or(mut left), right) => {
                left.push(right);
                Self::Or(left)
            }
            (left, Self::Or(mut right)) => {
                right.insert(0, left);
                Self::Or(right)
            }
            (left, right) => Self::Or(vec![left, right]),
        }
    }

    /// Wraps the tree in one explicit negation.
    ///
    /// No simplification happens: negating twice yields two wrappers.
    #[must_use]
    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Returns true if the tree renders to nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Lookup(_) => false,
            Self::Raw(sql) => sql.trim().is_empty(),
            Self::And(children) | Self::Or(children) => children.iter().all(Self::is_empty),
            Self::Not(child) => child.is_empty(),
        }
    }

    /// Builds a tree from a JSON filter document.
    ///
    /// An object becomes an AND of its `key: value` lookups in key order;
    /// an array becomes an AND of its elements. Arrays used as
    /// values become lists.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidFilter`] for nested objects as values and
    /// for documents that are neither objects nor arrays.
    pub fn from_json(document: &JsonValue) -> Result<Self> {
        match document {
            JsonValue::Object(map) => {
                let mut children = Vec::with_capacity(map.len());
                for (key, value) in map {
                    children.push(Self::lookup(key, json_operand(key, value)?));
                }
                Ok(Self::And(children))
            }
            JsonValue::Array(items) => {
                let children = items.iter().map(Self::from_json).collect::<Result<Vec<_>>>()?;
                Ok(Self::And(children))
            }
            other => Err(QueryError::InvalidFilter(format!(
                "expected an object or array, got {other}"
            ))),
        }
    }
}

fn json_operand(key: &str, value: &JsonValue) -> Result<FilterValue> {
    match value {
        JsonValue::Array(items) => items
            .iter()
            .map(|item| json_scalar(key, item))
            .collect::<Result<Vec<_>>>()
            .map(FilterValue::List),
        scalar => json_scalar(key, scalar).map(FilterValue::Value),
    }
}

fn json_scalar(key: &str, value: &JsonValue) -> Result<SqlValue> {
    match value {
        JsonValue::Null => Ok(SqlValue::Null),
        JsonValue::Bool(b) => Ok(SqlValue::Bool(*b)),
        JsonValue::Number(n) => n
            .as_i64()
            .map(SqlValue::Int)
            .or_else(|| n.as_f64().map(SqlValue::Float))
            .ok_or_else(|| QueryError::InvalidFilter(format!("number out of range for '{key}'"))),
        JsonValue::String(s) => Ok(SqlValue::Text(s.clone())),
        JsonValue::Array(_) | JsonValue::Object(_) => Err(QueryError::InvalidFilter(format!(
            "nested value for '{key}' is not a scalar"
        ))),
    }
}

impl Not for Q {
    type Output = Self;

    fn not(self) -> Self {
        self.negate()
    }
}

impl BitAnd for Q {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        self.and(rhs)
    }
}

impl BitOr for Q {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.or(rhs)
    }
}

impl From<&str> for Q {
    fn from(sql: &str) -> Self {
        Self::raw(sql)
    }
}

impl From<String> for Q {
    fn from(sql: String) -> Self {
        Self::Raw(sql)
    }
}

impl From<Lookup> for Q {
    fn from(lookup: Lookup) -> Self {
        Self::Lookup(lookup)
    }
}

/// Builds an AND-ed condition tree from `key => value` pairs.
///
/// ```rust
/// use querykit_core::q;
///
/// let filter = q! { "id__in" => [1, 2, 3], "price__gte" => 100 };
/// # let _ = filter;
/// ```
#[macro_export]
macro_rules! q {
    ($($key:expr => $value:expr),* $(,)?) => {
        $crate::Q::all([
            $($crate::Q::lookup($key, $value)),*
        ])
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn leaf(q: &Q) -> &Lookup {
        match q {
            Q::Lookup(lookup) => lookup,
            other => panic!("Expected lookup, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_key() {
        let lookup = Lookup::parse("id__in", vec![1, 2]);
        assert_eq!(lookup.field, "id");
        assert_eq!(lookup.operator.as_deref(), Some("in"));

        let lookup = Lookup::parse("t.name", "x");
        assert_eq!(lookup.field, "t.name");
        assert_eq!(lookup.operator, None);

        let lookup = Lookup::parse("user__name__contains", "x");
        assert_eq!(lookup.field, "user__name");
        assert_eq!(lookup.operator.as_deref(), Some("contains"));
    }

    #[test]
    fn test_and_flattens() {
        let tree = Q::lookup("a", 1).and(Q::lookup("b", 2)).and(Q::lookup("c", 3));
        match tree {
            Q::And(children) => assert_eq!(children.len(), 3),
            other => panic!("Expected AND, got {other:?}"),
        }
    }

    #[test]
    fn test_or_does_not_flatten_into_and() {
        let tree = Q::lookup("a", 1).and(Q::lookup("b", 2).or(Q::lookup("c", 3)));
        match tree {
            Q::And(children) => {
                assert_eq!(children.len(), 2);
                assert!(matches!(children[1], Q::Or(ref inner) if inner.len() == 2));
            }
            other => panic!("Expected AND, got {other:?}"),
        }
    }

    #[test]
    fn test_negate_always_wraps() {
        let tree = !!Q::lookup("a", 1);
        match tree {
            Q::Not(inner) => assert!(matches!(*inner, Q::Not(_))),
            other => panic!("Expected NOT, got {other:?}"),
        }
    }

    #[test]
    fn test_is_empty() {
        assert!(Q::And(Vec::new()).is_empty());
        assert!(Q::any([Q::And(Vec::new())]).is_empty());
        assert!(Q::And(Vec::new()).negate().is_empty());
        assert!(!Q::lookup("a", 1).is_empty());
        assert!(Q::raw("  ").is_empty());
    }

    #[test]
    fn test_macro_preserves_order() {
        let tree = q! { "b" => 1, "a__gt" => 2 };
        match tree {
            Q::And(children) => {
                assert_eq!(leaf(&children[0]).field, "b");
                assert_eq!(leaf(&children[1]).field, "a");
            }
            other => panic!("Expected AND, got {other:?}"),
        }
    }

    #[test]
    fn test_from_json() {
        let tree = Q::from_json(&json!({"id__in": [1, 2], "name": "x", "deleted": null}))
            .expect("valid filter");
        match tree {
            Q::And(children) => {
                assert_eq!(children.len(), 3);
                let ids = children
                    .iter()
                    .map(leaf)
                    .find(|l| l.field == "id")
                    .expect("id lookup");
                assert!(matches!(ids.value, FilterValue::List(ref v) if v.len() == 2));
            }
            other => panic!("Expected AND, got {other:?}"),
        }
    }

    #[test]
    fn test_from_json_rejects_nested_objects() {
        let err = Q::from_json(&json!({"id": {"a": 1}})).unwrap_err();
        assert!(matches!(err, QueryError::InvalidFilter(_)));
        let err = Q::from_json(&json!(5)).unwrap_err();
        assert!(matches!(err, QueryError::InvalidFilter(_)));
    }
}
