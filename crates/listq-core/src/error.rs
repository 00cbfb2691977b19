//! Error types for listq.
//!
//! Two layers of errors exist:
//!
//! - [`StoreError`] is what a backing store (a `DbExecutor` implementation)
//!   reports. It is also used for request-shaping failures that would only
//!   surface once the statement hits the store, such as an unparseable
//!   ordering expression or an unknown preload path.
//! - [`ListError`] is what callers of the listing engine and the time-range
//!   builder see. Every store failure is wrapped in
//!   [`ListError::QueryExecution`] with the cause preserved as its source.
//!
//! Pagination input is never rejected, so there is no pagination variant.

use std::fmt;

use thiserror::Error;

/// Which side of a time range a value was supplied for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeBound {
    /// The inclusive lower bound.
    Start,
    /// The inclusive upper bound.
    End,
}

impl fmt::Display for RangeBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::End => write!(f, "end"),
        }
    }
}

/// A failure reported by, or destined for, the backing store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store rejected or failed to run a statement.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// The store could not be reached or configured (open, pragma, join).
    #[error("Operational error: {0}")]
    OperationalError(String),

    /// A row value could not be converted into the requested Rust type.
    #[error("Decode error: {0}")]
    Decode(String),

    /// An ordering expression could not be parsed into columns and directions.
    #[error("Invalid order expression '{expr}': {reason}")]
    InvalidOrder {
        /// The expression as supplied by the caller.
        expr: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A predicate cannot be compiled (empty column, placeholder/param mismatch).
    #[error("Invalid predicate: {0}")]
    InvalidPredicate(String),

    /// A preload path does not name a relation of the listed model.
    #[error("Unknown relation '{path}' on '{table}'")]
    UnknownRelation {
        /// The preload path as supplied by the caller.
        path: String,
        /// The table being listed.
        table: String,
    },
}

/// The error type returned by the listing engine and the time-range builder.
#[derive(Error, Debug)]
pub enum ListError {
    /// A time-range bound did not match the fixed timestamp format.
    #[error("Invalid {bound} time '{value}': {reason}")]
    InvalidTimeFormat {
        /// The bound that failed to parse.
        bound: RangeBound,
        /// The raw input.
        value: String,
        /// What was wrong with it.
        reason: String,
        /// The parser's complaint, when parsing itself failed. `None` when
        /// the input parsed but is not written in the exact format.
        #[source]
        source: Option<chrono::ParseError>,
    },

    /// Both bounds parsed but the start is not strictly before the end.
    #[error("Invalid time range: start '{start}' is not before end '{end}'")]
    InvalidTimeRange {
        /// The raw start input.
        start: String,
        /// The raw end input.
        end: String,
    },

    /// Composing or executing the listing query failed.
    #[error("Query execution failed: {0}")]
    QueryExecution(#[from] StoreError),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl ListError {
    /// Returns the store failure behind a [`ListError::QueryExecution`].
    pub const fn store_error(&self) -> Option<&StoreError> {
        match self {
            Self::QueryExecution(inner) => Some(inner),
            _ => None,
        }
    }
}

/// A convenience type alias for `Result<T, ListError>`.
pub type ListResult<T> = Result<T, ListError>;

/// A convenience type alias for `Result<T, StoreError>`.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    fn parse_error() -> chrono::ParseError {
        chrono::NaiveDateTime::parse_from_str("bad-date", "%Y-%m-%d %H:%M:%S").unwrap_err()
    }

    #[test]
    fn test_invalid_time_format_display() {
        let source = parse_error();
        let err = ListError::InvalidTimeFormat {
            bound: RangeBound::Start,
            value: "bad-date".into(),
            reason: source.to_string(),
            source: Some(source),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("Invalid start time 'bad-date'"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_invalid_time_format_without_parse_error() {
        let err = ListError::InvalidTimeFormat {
            bound: RangeBound::End,
            value: "2024-1-2 3:4:5".into(),
            reason: "not written as '%Y-%m-%d %H:%M:%S'".into(),
            source: None,
        };
        assert_eq!(
            err.to_string(),
            "Invalid end time '2024-1-2 3:4:5': not written as '%Y-%m-%d %H:%M:%S'"
        );
        assert!(err.source().is_none());
    }

    #[test]
    fn test_invalid_time_range_display() {
        let err = ListError::InvalidTimeRange {
            start: "2024-01-02 10:00:00".into(),
            end: "2024-01-01 10:00:00".into(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid time range: start '2024-01-02 10:00:00' is not before end '2024-01-01 10:00:00'"
        );
    }

    #[test]
    fn test_store_error_converts_to_query_execution() {
        let err: ListError = StoreError::DatabaseError("no such column: nope".into()).into();
        assert!(matches!(err, ListError::QueryExecution(_)));
        assert!(err.to_string().contains("no such column: nope"));
        assert!(matches!(
            err.store_error(),
            Some(StoreError::DatabaseError(_))
        ));
    }

    #[test]
    fn test_query_execution_keeps_source() {
        let err: ListError = StoreError::InvalidOrder {
            expr: "id;".into(),
            reason: "unexpected character ';'".into(),
        }
        .into();
        let source = err.source().expect("source should be preserved");
        assert!(source.to_string().contains("id;"));
    }

    #[test]
    fn test_store_error_display() {
        let err = StoreError::UnknownRelation {
            path: "Tags".into(),
            table: "blog_article".into(),
        };
        assert_eq!(err.to_string(), "Unknown relation 'Tags' on 'blog_article'");
    }

    #[test]
    fn test_range_bound_display() {
        assert_eq!(RangeBound::Start.to_string(), "start");
        assert_eq!(RangeBound::End.to_string(), "end");
    }
}
