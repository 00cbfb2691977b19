//! The listing engine.
//!
//! [`ListQuery`] composes one listing call out of an exact-match template
//! and a set of [`ListOptions`], then runs it against a [`DbExecutor`]:
//!
//! 1. exact-match equalities from the template, in enumeration order;
//! 2. one OR-group of `LIKE '%key%'` clauses over the fuzzy columns, only
//!    when a search key was given;
//! 3. the caller's custom predicate, left out when it is always true;
//! 4. preload paths, resolved against [`Model::relations`];
//! 5. `COUNT(*)` over stages 1-3;
//! 6. ordering: the page's expression, else the listing default, else the
//!    model's creation column descending;
//! 7. `LIMIT` / `OFFSET` from the normalized page;
//! 8. the page fetch, then one batch query per preload path.
//!
//! Everything that can be rejected (ordering, preload paths, predicates) is
//! checked while planning, before the first statement is sent.

use std::collections::{HashMap, HashSet};
use std::marker::PhantomData;

use listq_core::logging::{list_span, TRACE_TARGET};
use listq_core::settings::Settings;
use listq_core::{ListResult, StoreError, StoreResult};
use tracing::Instrument;

use super::compiler::{DatabaseBackendType, OrderBy, Query, Row, SqlCompiler, WhereNode};
use super::lookups::{Lookup, Q};
use super::order::parse_order_expr;
use super::page::PageSpec;
use crate::executor::DbExecutor;
use crate::model::{Model, Relation};
use crate::value::Value;

// ============================================================
// Exact-match templates
// ============================================================

/// A source of exact-match equalities for a listing.
///
/// Each `(column, value)` pair becomes `column = value` (or `column IS NULL`
/// for [`Value::Null`]). Implement it on a filter struct with `Option`
/// fields to say "unset" with `None`, or use [`ExactFields`] directly.
pub trait ExactMatch {
    /// The equalities to apply, in order.
    fn exact_fields(&self) -> Vec<(String, Value)>;
}

/// An explicit set of exact-match fields.
///
/// Only fields that were set are filtered on, so zero and empty values can
/// be matched like any other.
///
/// # Examples
///
/// ```
/// use listq_db::query::list::{ExactFields, ExactMatch};
/// use listq_db::value::Value;
///
/// let fields = ExactFields::new().with("status", 0).with("author_id", 7);
/// assert_eq!(
///     fields.exact_fields(),
///     vec![("status".to_string(), Value::Int(0)), ("author_id".to_string(), Value::Int(7))]
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExactFields {
    fields: Vec<(String, Value)>,
}

impl ExactFields {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field, builder style.
    #[must_use]
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(column, value);
        self
    }

    /// Sets a field. Setting a column twice replaces its value in place.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        let column = column.into();
        let value = value.into();
        if let Some(slot) = self.fields.iter_mut().find(|(c, _)| *c == column) {
            slot.1 = value;
        } else {
            self.fields.push((column, value));
        }
    }

    /// Sets a field only when `value` is `Some`.
    pub fn set_opt<V: Into<Value>>(&mut self, column: impl Into<String>, value: Option<V>) {
        if let Some(v) = value {
            self.set(column, v);
        }
    }

    /// Number of fields set.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if no field is set.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl ExactMatch for ExactFields {
    fn exact_fields(&self) -> Vec<(String, Value)> {
        self.fields.clone()
    }
}

impl ExactMatch for () {
    fn exact_fields(&self) -> Vec<(String, Value)> {
        Vec::new()
    }
}

impl<T: ExactMatch + ?Sized> ExactMatch for &T {
    fn exact_fields(&self) -> Vec<(String, Value)> {
        (**self).exact_fields()
    }
}

/// Uses a model instance as its own template, treating every zero, empty or
/// NULL field as unset.
///
/// This cannot express "filter for zero"; prefer [`ExactFields`] or an
/// `Option`-based filter type.
pub struct ZeroAsUnset<'a, M: Model>(pub &'a M);

impl<M: Model> ExactMatch for ZeroAsUnset<'_, M> {
    fn exact_fields(&self) -> Vec<(String, Value)> {
        self.0
            .field_values()
            .into_iter()
            .filter(|(_, value)| !value.is_zero())
            .map(|(column, value)| (column.to_string(), value))
            .collect()
    }
}

// ============================================================
// Options and results
// ============================================================

/// Options for one listing call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListOptions {
    /// Pagination, search key and ordering input.
    pub page: PageSpec,
    /// Columns the search key is matched against with `LIKE '%key%'`.
    pub fuzzy_columns: Vec<String>,
    /// Relations to preload, by name.
    pub preload_paths: Vec<String>,
    /// An extra predicate ANDed into the filter.
    pub custom_predicate: Option<Q>,
    /// Emit every statement at INFO instead of DEBUG.
    pub debug_trace: bool,
    /// Ordering used when the page carries none.
    pub default_order_expr: Option<String>,
}

impl ListOptions {
    /// Creates options for the given page.
    pub fn new(page: PageSpec) -> Self {
        Self {
            page,
            ..Self::default()
        }
    }

    /// Creates options for the given page with the page normalized against
    /// `settings.pagination` and query tracing following `settings.debug`.
    pub fn from_settings(mut page: PageSpec, settings: &Settings) -> Self {
        page.normalize_with(&settings.pagination);
        Self {
            page,
            debug_trace: settings.debug,
            ..Self::default()
        }
    }

    /// Sets the fuzzy-match columns.
    #[must_use]
    pub fn fuzzy_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fuzzy_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Adds a preload path.
    #[must_use]
    pub fn preload(mut self, path: impl Into<String>) -> Self {
        self.preload_paths.push(path.into());
        self
    }

    /// Sets the custom predicate.
    #[must_use]
    pub fn custom_predicate(mut self, predicate: Q) -> Self {
        self.custom_predicate = Some(predicate);
        self
    }

    /// Turns statement tracing at INFO on or off.
    #[must_use]
    pub fn debug_trace(mut self, enabled: bool) -> Self {
        self.debug_trace = enabled;
        self
    }

    /// Sets the ordering used when the page carries none.
    #[must_use]
    pub fn default_order(mut self, expr: impl Into<String>) -> Self {
        self.default_order_expr = Some(expr.into());
        self
    }
}

/// Pagination metadata for a [`ListPage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct PageInfo {
    /// The normalized page number.
    pub page: i64,
    /// The normalized page size.
    pub limit: i64,
    /// Rows matching the filter, across all pages.
    pub total_count: i64,
    /// Number of pages; an empty result still has one.
    pub num_pages: i64,
    /// Whether a later page exists.
    pub has_next: bool,
    /// Whether an earlier page exists.
    pub has_previous: bool,
}

/// One page of a listing.
#[derive(Debug)]
pub struct ListPage<M> {
    /// The models on this page, at most `limit` of them.
    pub items: Vec<M>,
    /// Rows matching the filter before windowing.
    pub total_count: i64,
    /// Preloaded related rows, keyed by preload path.
    pub preloaded: HashMap<String, Vec<Row>>,
    /// The normalized page number used.
    pub page: i64,
    /// The normalized page size used.
    pub limit: i64,
}

impl<M: Model> ListPage<M> {
    /// Pagination metadata for this page.
    pub fn page_info(&self) -> PageInfo {
        let total = self.total_count.max(0);
        let limit = self.limit.max(1);
        let num_pages = if total == 0 { 1 } else { (total - 1) / limit + 1 };
        PageInfo {
            page: self.page,
            limit: self.limit,
            total_count: self.total_count,
            num_pages,
            has_next: self.page < num_pages,
            has_previous: self.page > 1,
        }
    }

    /// The rows preloaded under `path`; empty if nothing was preloaded.
    pub fn preloaded(&self, path: &str) -> &[Row] {
        self.preloaded.get(path).map_or(&[], Vec::as_slice)
    }

    /// The preloaded rows under `path` that belong to `item`.
    pub fn related_to(&self, item: &M, path: &str) -> Vec<&Row> {
        let Some(relation) = M::relation(path) else {
            return Vec::new();
        };
        let Some(key) = item.field_value(&relation.source_column) else {
            return Vec::new();
        };
        self.preloaded(path)
            .iter()
            .filter(|row| row.get_value(&relation.related_column) == Some(&key))
            .collect()
    }

    /// Number of items on this page.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if this page has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// ============================================================
// Engine
// ============================================================

/// A fully checked listing call, ready to run.
struct Plan {
    count: Query,
    select: Query,
    relations: Vec<Relation>,
}

/// A listing query over model `M`.
///
/// # Examples
///
/// ```
/// use listq_db::query::compiler::DatabaseBackendType;
/// use listq_db::query::list::{ExactFields, ListOptions, ListQuery};
/// use listq_db::query::page::PageSpec;
/// # use listq_db::model::{Model, Row};
/// # use listq_db::value::Value;
/// # use listq_core::StoreResult;
/// # struct Article;
/// # impl Model for Article {
/// #     fn table_name() -> &'static str { "blog_article" }
/// #     fn field_values(&self) -> Vec<(&'static str, Value)> { vec![] }
/// #     fn from_row(_: &Row) -> StoreResult<Self> { Ok(Self) }
/// # }
///
/// let options = ListOptions::new(PageSpec::new(1, 10).with_search("go"))
///     .fuzzy_columns(["title", "summary"]);
/// let query = ListQuery::<Article>::new(&ExactFields::new().with("status", 1), options);
/// let (sql, params) = query.to_sql(DatabaseBackendType::PostgreSQL).unwrap();
/// assert_eq!(
///     sql,
///     "SELECT * FROM \"blog_article\" WHERE (\"status\" = $1 AND (\"title\" LIKE $2 OR \"summary\" LIKE $3)) ORDER BY \"created_at\" DESC LIMIT 10 OFFSET 0"
/// );
/// assert_eq!(params.len(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct ListQuery<M: Model> {
    exact: Vec<(String, Value)>,
    options: ListOptions,
    _model: PhantomData<fn() -> M>,
}

impl<M: Model> ListQuery<M> {
    /// Creates a listing query from an exact-match template and options.
    pub fn new<T: ExactMatch + ?Sized>(template: &T, options: ListOptions) -> Self {
        Self {
            exact: template.exact_fields(),
            options,
            _model: PhantomData,
        }
    }

    /// The options this query was built with.
    pub const fn options(&self) -> &ListOptions {
        &self.options
    }

    /// The composed filter of stages 1-3, or `None` if nothing filters.
    pub fn filter(&self) -> Option<Q> {
        let mut parts: Vec<Q> = self
            .exact
            .iter()
            .map(|(column, value)| Q::filter(column.clone(), Lookup::Exact(value.clone())))
            .collect();

        if let Some(fuzzy) = self.fuzzy_group() {
            parts.push(fuzzy);
        }

        if let Some(custom) = &self.options.custom_predicate {
            if !custom.is_always_true() {
                parts.push(custom.clone());
            }
        }

        match parts.len() {
            0 => None,
            1 => parts.pop(),
            _ => Some(Q::And(parts)),
        }
    }

    fn fuzzy_group(&self) -> Option<Q> {
        let page = &self.options.page;
        if !page.has_search() || self.options.fuzzy_columns.is_empty() {
            return None;
        }
        let mut seen = HashSet::new();
        let clauses: Vec<Q> = self
            .options
            .fuzzy_columns
            .iter()
            .filter(|column| seen.insert(column.as_str()))
            .map(|column| Q::filter(column.clone(), Lookup::Contains(page.search_key.clone())))
            .collect();
        Some(Q::Or(clauses))
    }

    fn order_by(&self) -> StoreResult<Vec<OrderBy>> {
        let page_order = self.options.page.order_expr.trim();
        if !page_order.is_empty() {
            return parse_order_expr(page_order);
        }
        match self.options.default_order_expr.as_deref().map(str::trim) {
            Some(default) if !default.is_empty() => parse_order_expr(default),
            _ => Ok(vec![OrderBy::desc(M::created_at_column())]),
        }
    }

    fn relations(&self) -> StoreResult<Vec<Relation>> {
        let mut seen = HashSet::new();
        self.options
            .preload_paths
            .iter()
            .filter(|path| seen.insert(path.as_str()))
            .map(|path| {
                M::relation(path).ok_or_else(|| StoreError::UnknownRelation {
                    path: path.clone(),
                    table: M::table_name().to_string(),
                })
            })
            .collect()
    }

    fn plan(&self) -> StoreResult<Plan> {
        let mut count = Query::new(M::table_name());
        if let Some(filter) = self.filter() {
            count.add_where(WhereNode::from_q(&filter));
        }

        let relations = self.relations()?;

        let mut select = count.clone();
        select.order_by = self.order_by()?;
        select.limit = Some(self.options.page.limit().unsigned_abs());
        select.offset = Some(self.options.page.offset().unsigned_abs());

        Ok(Plan {
            count: count.to_count(),
            select,
            relations,
        })
    }

    /// The page-fetch SQL and parameters execution would send.
    pub fn to_sql(&self, backend: DatabaseBackendType) -> ListResult<(String, Vec<Value>)> {
        let plan = self.plan()?;
        Ok(SqlCompiler::new(backend).compile_select(&plan.select)?)
    }

    /// The count SQL and parameters execution would send.
    pub fn count_sql(&self, backend: DatabaseBackendType) -> ListResult<(String, Vec<Value>)> {
        let plan = self.plan()?;
        Ok(SqlCompiler::new(backend).compile_select(&plan.count)?)
    }

    /// Runs the listing: count, page fetch, then one query per preload path.
    ///
    /// # Errors
    ///
    /// Every failure is a [`ListError::QueryExecution`](listq_core::ListError::QueryExecution):
    /// an invalid ordering expression, an unknown preload path, an
    /// uncompilable predicate, an undecodable row, or a store error.
    pub async fn execute(&self, db: &dyn DbExecutor) -> ListResult<ListPage<M>> {
        self.run(db)
            .instrument(list_span(M::table_name()))
            .await
            .map_err(Into::into)
    }

    async fn run(&self, db: &dyn DbExecutor) -> StoreResult<ListPage<M>> {
        let plan = self.plan()?;
        let compiler = SqlCompiler::new(db.backend_type());
        let (count_sql, count_params) = compiler.compile_select(&plan.count)?;
        let (select_sql, select_params) = compiler.compile_select(&plan.select)?;

        self.trace("count", &count_sql, &count_params);
        let count_rows = db.query(&count_sql, &count_params).await?;
        let total_count: i64 = count_rows
            .first()
            .ok_or_else(|| StoreError::Decode("COUNT(*) returned no rows".to_string()))?
            .get("count")?;

        self.trace("select", &select_sql, &select_params);
        let rows = db.query(&select_sql, &select_params).await?;
        let items = rows.iter().map(M::from_row).collect::<StoreResult<Vec<_>>>()?;

        let mut preloaded = HashMap::with_capacity(plan.relations.len());
        for relation in &plan.relations {
            let related = if items.is_empty() {
                Vec::new()
            } else {
                let query = preload_query(relation, &items)?;
                let (sql, params) = compiler.compile_select(&query)?;
                self.trace("preload", &sql, &params);
                db.query(&sql, &params).await?
            };
            preloaded.insert(relation.name.clone(), related);
        }

        tracing::debug!(
            total_count,
            items = items.len(),
            preloads = preloaded.len(),
            "listing complete"
        );

        Ok(ListPage {
            items,
            total_count,
            preloaded,
            page: self.options.page.page(),
            limit: self.options.page.limit(),
        })
    }

    fn trace(&self, stage: &'static str, sql: &str, params: &[Value]) {
        if self.options.debug_trace {
            tracing::info!(target: TRACE_TARGET, stage, sql, ?params, "listq statement");
        } else {
            tracing::debug!(target: TRACE_TARGET, stage, sql, ?params, "listq statement");
        }
    }
}

/// Builds the batch query for one relation over the distinct, non-NULL
/// source-column values of `items`.
fn preload_query<M: Model>(relation: &Relation, items: &[M]) -> StoreResult<Query> {
    let mut seen = HashSet::new();
    let mut keys = Vec::new();
    for item in items {
        let value = item.field_value(&relation.source_column).ok_or_else(|| {
            StoreError::InvalidPredicate(format!(
                "'{}' does not expose column '{}' needed to preload '{}'",
                M::table_name(),
                relation.source_column,
                relation.name
            ))
        })?;
        if !value.is_null() && seen.insert(value.group_key()) {
            keys.push(value);
        }
    }

    let mut query = Query::new(relation.related_table.clone());
    query.add_where(WhereNode::Condition {
        column: relation.related_column.clone(),
        lookup: Lookup::In(keys),
    });
    Ok(query)
}

/// Runs a listing in one call.
///
/// Equivalent to `ListQuery::<M>::new(template, options).execute(db)`.
pub async fn execute_list<M, T>(
    db: &dyn DbExecutor,
    template: &T,
    options: ListOptions,
) -> ListResult<ListPage<M>>
where
    M: Model,
    T: ExactMatch + ?Sized,
{
    ListQuery::<M>::new(template, options).execute(db).await
}
