//! Predicates for listing queries.
//!
//! [`Lookup`] is a single column comparison and [`Q`] composes lookups with
//! AND, OR and NOT. Operands are always carried as [`Value`]s and end up as
//! bound parameters, never spliced into the SQL text.
//!
//! # Examples
//!
//! ```
//! use listq_db::query::lookups::{Lookup, Q};
//! use listq_db::value::Value;
//!
//! // status = 1 AND (title LIKE '%go%' OR summary LIKE '%go%')
//! let fuzzy = Q::filter("title", Lookup::Contains("go".into()))
//!     | Q::filter("summary", Lookup::Contains("go".into()));
//! let q = Q::filter("status", Lookup::Exact(Value::from(1))) & fuzzy;
//! assert!(matches!(q, Q::And(ref children) if children.len() == 2));
//! ```

use crate::value::Value;
use std::ops;

/// A column-level comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    /// Equality (`col = value`, or `col IS NULL` for a NULL operand).
    Exact(Value),
    /// Substring match (`col LIKE '%value%'`).
    Contains(String),
    /// Case-insensitive substring match.
    IContains(String),
    /// Membership (`col IN (values...)`). An empty list matches nothing.
    In(Vec<Value>),
    /// `col > value`.
    Gt(Value),
    /// `col >= value`.
    Gte(Value),
    /// `col < value`.
    Lt(Value),
    /// `col <= value`.
    Lte(Value),
    /// Inclusive range (`col BETWEEN low AND high`).
    Range(Value, Value),
    /// `col IS NULL` when `true`, `col IS NOT NULL` when `false`.
    IsNull(bool),
}

/// A composable filter.
///
/// `Q` values combine with `&` (AND), `|` (OR) and `!` (NOT). Nested groups of
/// the same kind are flattened. An empty `And` is always true and an empty
/// `Or` is always false.
#[derive(Debug, Clone, PartialEq)]
pub enum Q {
    /// A single column lookup.
    Filter {
        /// The column name, optionally table-qualified (`table.column`).
        field: String,
        /// The comparison.
        lookup: Lookup,
    },
    /// Logical AND of conditions.
    And(Vec<Q>),
    /// Logical OR of conditions.
    Or(Vec<Q>),
    /// Logical negation of a condition.
    Not(Box<Q>),
    /// A caller-written SQL fragment with `?` placeholders, one per param.
    ///
    /// The compiler renumbers the placeholders for the target backend and
    /// rejects fragments whose placeholder count differs from `params.len()`.
    /// A `?` inside a single- or double-quoted span is literal text. Any other
    /// `?` is a placeholder, so operators spelled with `?` (PostgreSQL's
    /// `?|` and `?&`) cannot appear in a raw fragment.
    Raw {
        /// The fragment, e.g. `"score > ? AND score < ?"`.
        sql: String,
        /// The bound parameters in placeholder order.
        params: Vec<Value>,
    },
}

impl Q {
    /// Creates a new filter Q object.
    pub fn filter(field: impl Into<String>, lookup: Lookup) -> Self {
        Self::Filter {
            field: field.into(),
            lookup,
        }
    }

    /// Creates a raw SQL fragment with `?` placeholders.
    pub fn raw(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self::Raw {
            sql: sql.into(),
            params,
        }
    }

    /// The always-true predicate (an empty AND).
    pub const fn always() -> Self {
        Self::And(Vec::new())
    }

    /// Returns `true` for an empty `And` or `Or` group.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::And(children) | Self::Or(children) => children.is_empty(),
            _ => false,
        }
    }

    /// Returns `true` if this predicate is trivially true and can be left out
    /// of a conjunction without changing its meaning.
    pub fn is_always_true(&self) -> bool {
        match self {
            Self::And(children) => children.iter().all(Self::is_always_true),
            _ => false,
        }
    }
}

impl ops::BitAnd for Q {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        match (self, rhs) {
            (Self::And(mut left), Self::And(right)) => {
                left.extend(right);
                Self::And(left)
            }
            (Self::And(mut left), other) => {
                left.push(other);
                Self::And(left)
            }
            (other, Self::And(mut right)) => {
                right.insert(0, other);
                Self::And(right)
            }
            (left, right) => Self::And(vec![left, right]),
        }
    }
}

impl ops::BitOr for Q {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        match (self, rhs) {
            (Self::Or(mut left), Self::Or(right)) => {
                left.extend(right);
                Self::Or(left)
            }
            (Self::Or(mut left), other) => {
                left.push(other);
                Self::Or(left)
            }
            (other, Self::Or(mut right)) => {
                right.insert(0, other);
                Self::Or(right)
            }
            (left, right) => Self::Or(vec![left, right]),
        }
    }
}

impl ops::Not for Q {
    type Output = Self;

    fn not(self) -> Self::Output {
        match self {
            Self::Not(inner) => *inner,
            other => Self::Not(Box::new(other)),
        }
    }
}
