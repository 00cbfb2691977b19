//! Time-range predicates.
//!
//! [`TimeRangeBuilder`] turns an optional start and end timestamp into a
//! [`Q`] restricting one column to the inclusive range between them. The
//! result is meant for the listing engine's custom-predicate slot.

use chrono::NaiveDateTime;
use listq_core::settings::{TimeRangeSettings, DEFAULT_TIME_COLUMN, DEFAULT_TIME_FORMAT};
use listq_core::{ListError, ListResult, RangeBound};

use super::lookups::{Lookup, Q};
use crate::value::Value;

/// Builds inclusive time-range predicates over a timestamp column.
///
/// # Examples
///
/// ```
/// use listq_db::query::time_range::TimeRangeBuilder;
/// use listq_db::query::lookups::Q;
///
/// let builder = TimeRangeBuilder::new("created_at");
/// let q = builder
///     .build(Some("2024-01-01 00:00:00"), Some("2024-02-01 00:00:00"))
///     .unwrap();
/// assert!(matches!(q, Q::Filter { .. }));
///
/// // No bounds: a predicate that filters nothing.
/// assert!(builder.build(None, Some("")).unwrap().is_always_true());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeRangeBuilder {
    column: String,
    format: String,
}

impl Default for TimeRangeBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_TIME_COLUMN)
    }
}

impl TimeRangeBuilder {
    /// Creates a builder for `column` using the `%Y-%m-%d %H:%M:%S` format.
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            format: DEFAULT_TIME_FORMAT.to_string(),
        }
    }

    /// Creates a builder from configured column and format.
    pub fn from_settings(settings: &TimeRangeSettings) -> Self {
        Self {
            column: settings.column.clone(),
            format: settings.format.clone(),
        }
    }

    /// Replaces the timestamp format both bounds must match.
    #[must_use]
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    /// The column the predicate applies to.
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Builds the predicate for the given bounds.
    ///
    /// `None` and `""` count as absent. With both bounds the predicate is
    /// `column BETWEEN start AND end`; with one it is `column >= start` or
    /// `column <= end`; with none it is [`Q::always`].
    ///
    /// # Errors
    ///
    /// - [`ListError::InvalidTimeFormat`] if a present bound does not match
    ///   the format exactly (every field zero-padded, no extra whitespace).
    ///   The start bound is checked first.
    /// - [`ListError::InvalidTimeRange`] if both bounds are present and the
    ///   start is not strictly before the end.
    pub fn build(&self, start: Option<&str>, end: Option<&str>) -> ListResult<Q> {
        let start = present(start);
        let end = present(end);

        let start_at = start
            .map(|raw| self.parse(RangeBound::Start, raw))
            .transpose()?;
        let end_at = end.map(|raw| self.parse(RangeBound::End, raw)).transpose()?;

        let lookup = match (start_at, end_at) {
            (Some(from), Some(to)) => {
                if from >= to {
                    return Err(ListError::InvalidTimeRange {
                        start: start.unwrap_or_default().to_string(),
                        end: end.unwrap_or_default().to_string(),
                    });
                }
                Lookup::Range(Value::DateTime(from), Value::DateTime(to))
            }
            (Some(from), None) => Lookup::Gte(Value::DateTime(from)),
            (None, Some(to)) => Lookup::Lte(Value::DateTime(to)),
            (None, None) => return Ok(Q::always()),
        };

        tracing::trace!(column = %self.column, ?lookup, "built time range");
        Ok(Q::filter(self.column.clone(), lookup))
    }

    fn parse(&self, bound: RangeBound, raw: &str) -> ListResult<NaiveDateTime> {
        let parsed = NaiveDateTime::parse_from_str(raw, &self.format).map_err(|source| {
            ListError::InvalidTimeFormat {
                bound,
                value: raw.to_string(),
                reason: source.to_string(),
                source: Some(source),
            }
        })?;

        // parse_from_str tolerates unpadded fields and stray whitespace.
        if parsed.format(&self.format).to_string() != raw {
            return Err(ListError::InvalidTimeFormat {
                bound,
                value: raw.to_string(),
                reason: format!("not written as '{}'", self.format),
                source: None,
            });
        }
        Ok(parsed)
    }
}

fn present(raw: Option<&str>) -> Option<&str> {
    raw.filter(|s| !s.is_empty())
}
