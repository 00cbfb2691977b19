//! The listable model trait.
//!
//! A [`Model`] names its table, exposes its column values, rebuilds itself
//! from a [`Row`], and declares the [`Relation`]s that can be preloaded
//! alongside a page of results.

use listq_core::settings::DEFAULT_TIME_COLUMN;
use listq_core::StoreResult;

pub use crate::query::compiler::Row;
use crate::value::Value;

/// A relation that can be preloaded for a page of models.
///
/// Preloading runs one `SELECT * FROM related_table WHERE related_column IN
/// (...)` over the distinct `source_column` values of the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    /// The preload path callers use to request this relation.
    pub name: String,
    /// The table holding the related rows.
    pub related_table: String,
    /// The column on the listed model whose values are collected.
    pub source_column: String,
    /// The column on the related table matched against those values.
    pub related_column: String,
}

impl Relation {
    /// Rows of `related_table` whose `foreign_key` points at this model's `id`.
    pub fn has_many(
        name: impl Into<String>,
        related_table: impl Into<String>,
        foreign_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            related_table: related_table.into(),
            source_column: "id".to_string(),
            related_column: foreign_key.into(),
        }
    }

    /// The row of `related_table` whose `id` this model's `foreign_key` holds.
    pub fn belongs_to(
        name: impl Into<String>,
        related_table: impl Into<String>,
        foreign_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            related_table: related_table.into(),
            source_column: foreign_key.into(),
            related_column: "id".to_string(),
        }
    }
}

/// A model the listing engine can page through.
///
/// # Examples
///
/// ```
/// use listq_db::model::{Model, Relation, Row};
/// use listq_db::value::Value;
/// use listq_core::StoreResult;
///
/// struct Article {
///     id: i64,
///     status: i64,
///     title: String,
/// }
///
/// impl Model for Article {
///     fn table_name() -> &'static str { "blog_article" }
///
///     fn field_values(&self) -> Vec<(&'static str, Value)> {
///         vec![
///             ("id", Value::from(self.id)),
///             ("status", Value::from(self.status)),
///             ("title", Value::from(self.title.as_str())),
///         ]
///     }
///
///     fn from_row(row: &Row) -> StoreResult<Self> {
///         Ok(Self {
///             id: row.get("id")?,
///             status: row.get("status")?,
///             title: row.get("title")?,
///         })
///     }
///
///     fn relations() -> Vec<Relation> {
///         vec![Relation::has_many("Tags", "blog_tag", "article_id")]
///     }
/// }
///
/// assert_eq!(Article::table_name(), "blog_article");
/// assert_eq!(Article::created_at_column(), "created_at");
/// ```
pub trait Model: Send + Sync + Sized + 'static {
    /// The database table name.
    fn table_name() -> &'static str;

    /// The creation-timestamp column used for the fallback ordering.
    fn created_at_column() -> &'static str {
        DEFAULT_TIME_COLUMN
    }

    /// Column/value pairs for this instance. Must include the source column
    /// of every declared relation.
    fn field_values(&self) -> Vec<(&'static str, Value)>;

    /// Builds an instance from a result row.
    fn from_row(row: &Row) -> StoreResult<Self>;

    /// Relations that can be preloaded.
    fn relations() -> Vec<Relation> {
        Vec::new()
    }

    /// Looks up a relation by preload path.
    fn relation(name: &str) -> Option<Relation> {
        Self::relations().into_iter().find(|r| r.name == name)
    }

    /// The value of one column of this instance, if the model exposes it.
    fn field_value(&self, column: &str) -> Option<Value> {
        self.field_values()
            .into_iter()
            .find_map(|(name, value)| (name == column).then_some(value))
    }
}
