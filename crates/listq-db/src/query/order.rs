//! Ordering expressions.
//!
//! An ordering expression is a comma-separated list of terms. Each term is a
//! column name, optionally table-qualified, with either a trailing `asc` /
//! `desc` (any case) or a leading `-` for descending:
//!
//! ```text
//! created_at desc
//! title ASC, -id
//! blog_article.updated_at
//! ```
//!
//! Anything else is rejected before it reaches the store, so an ordering
//! expression can never smuggle SQL into the statement.

use std::sync::LazyLock;

use listq_core::{StoreError, StoreResult};
use regex::Regex;

use super::compiler::OrderBy;

static ORDER_TERM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?P<neg>-)?(?P<col>[A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*)?)(?:\s+(?P<dir>asc|desc))?$",
    )
    .expect("valid regex")
});

/// Parses an ordering expression into [`OrderBy`] terms.
///
/// # Errors
///
/// Returns [`StoreError::InvalidOrder`] for a blank expression, an empty
/// term, a term that is not a plain (optionally qualified) column name, or a
/// term combining `-` with an explicit direction.
///
/// # Examples
///
/// ```
/// use listq_db::query::order::parse_order_expr;
///
/// let terms = parse_order_expr("title asc, -created_at").unwrap();
/// assert_eq!(terms.len(), 2);
/// assert!(!terms[0].descending);
/// assert!(terms[1].descending);
/// assert!(parse_order_expr("id; DROP TABLE users").is_err());
/// ```
pub fn parse_order_expr(expr: &str) -> StoreResult<Vec<OrderBy>> {
    let invalid = |reason: String| StoreError::InvalidOrder {
        expr: expr.to_string(),
        reason,
    };

    if expr.trim().is_empty() {
        return Err(invalid("expression is empty".to_string()));
    }

    expr.split(',')
        .enumerate()
        .map(|(i, raw)| {
            let term = raw.trim();
            if term.is_empty() {
                return Err(invalid(format!("term {} is empty", i + 1)));
            }
            let caps = ORDER_TERM
                .captures(term)
                .ok_or_else(|| invalid(format!("'{term}' is not a column with an optional asc/desc")))?;

            let negated = caps.name("neg").is_some();
            let direction = caps.name("dir").map(|m| m.as_str().to_ascii_lowercase());
            if negated && direction.is_some() {
                return Err(invalid(format!(
                    "'{term}' combines '-' with an explicit direction"
                )));
            }

            let column = caps["col"].to_string();
            let descending = negated || direction.as_deref() == Some("desc");
            Ok(if descending {
                OrderBy::desc(column)
            } else {
                OrderBy::asc(column)
            })
        })
        .collect()
}
