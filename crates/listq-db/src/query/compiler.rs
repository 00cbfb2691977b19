//! SQL query AST and compiler.
//!
//! [`Query`] describes one SELECT over a single table and [`SqlCompiler`]
//! turns it into parameterized SQL. PostgreSQL gets `$1, $2, ...`
//! placeholders; SQLite and MySQL get `?`.
//!
//! Identifiers are always double-quoted. A dotted name such as
//! `blog_article.created_at` is quoted per segment.

use super::lookups::{Lookup, Q};
use crate::value::Value;
use listq_core::{StoreError, StoreResult};

/// The type of database backend, used by the compiler to generate
/// backend-specific SQL syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseBackendType {
    /// PostgreSQL (uses `$1, $2, ...` placeholders).
    PostgreSQL,
    /// SQLite (uses `?` placeholders).
    SQLite,
    /// MySQL (uses `?` placeholders).
    MySQL,
}

/// A column ordering direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    /// The column to order by, optionally table-qualified.
    pub column: String,
    /// Whether to sort in descending order.
    pub descending: bool,
}

impl OrderBy {
    /// Creates an ascending order.
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: false,
        }
    }

    /// Creates a descending order.
    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: true,
        }
    }
}

/// A column to select in a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectColumn {
    /// All columns (`*`).
    Star,
    /// `COUNT(*)`, aliased as `count`.
    CountStar,
}

/// A WHERE clause node in the query AST.
#[derive(Debug, Clone, PartialEq)]
pub enum WhereNode {
    /// A single condition.
    Condition {
        /// The column name.
        column: String,
        /// The lookup type.
        lookup: Lookup,
    },
    /// Logical AND of conditions.
    And(Vec<WhereNode>),
    /// Logical OR of conditions.
    Or(Vec<WhereNode>),
    /// Logical NOT of a condition.
    Not(Box<WhereNode>),
    /// A raw fragment with `?` placeholders.
    Raw {
        /// The fragment.
        sql: String,
        /// Its parameters.
        params: Vec<Value>,
    },
}

impl WhereNode {
    /// Converts a `Q` object into a `WhereNode`.
    pub fn from_q(q: &Q) -> Self {
        match q {
            Q::Filter { field, lookup } => Self::Condition {
                column: field.clone(),
                lookup: lookup.clone(),
            },
            Q::And(children) => Self::And(children.iter().map(Self::from_q).collect()),
            Q::Or(children) => Self::Or(children.iter().map(Self::from_q).collect()),
            Q::Not(inner) => Self::Not(Box::new(Self::from_q(inner))),
            Q::Raw { sql, params } => Self::Raw {
                sql: sql.clone(),
                params: params.clone(),
            },
        }
    }
}

/// A SELECT statement over one table.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// The table name.
    pub table: String,
    /// Columns to select.
    pub select: Vec<SelectColumn>,
    /// WHERE clause.
    pub where_clause: Option<WhereNode>,
    /// ORDER BY clauses.
    pub order_by: Vec<OrderBy>,
    /// LIMIT.
    pub limit: Option<u64>,
    /// OFFSET.
    pub offset: Option<u64>,
}

impl Query {
    /// Creates a new `SELECT *` query for the given table.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            select: vec![SelectColumn::Star],
            where_clause: None,
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// ANDs a node into the WHERE clause.
    pub fn add_where(&mut self, node: WhereNode) {
        self.where_clause = Some(match self.where_clause.take() {
            None => node,
            Some(WhereNode::And(mut children)) => {
                children.push(node);
                WhereNode::And(children)
            }
            Some(existing) => WhereNode::And(vec![existing, node]),
        });
    }

    /// The counting form of this query: same table and WHERE clause, no
    /// ordering or windowing.
    pub fn to_count(&self) -> Self {
        Self {
            table: self.table.clone(),
            select: vec![SelectColumn::CountStar],
            where_clause: self.where_clause.clone(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }
}

/// A generic database row for passing data between backends and the engine.
///
/// `Row` holds a list of column names and their corresponding values. It
/// provides typed access via the [`get`](Row::get) method.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    /// Creates a new row from column names and values.
    ///
    /// # Panics
    ///
    /// Panics if the number of columns does not match the number of values.
    pub fn new(columns: Vec<String>, values: Vec<Value>) -> Self {
        assert_eq!(
            columns.len(),
            values.len(),
            "Row column count must match value count"
        );
        Self { columns, values }
    }

    /// Returns the column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` if the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Gets a typed value by column name.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Decode`] if the column does not exist or the
    /// value cannot be converted to the requested type.
    pub fn get<T: FromValue>(&self, column: &str) -> StoreResult<T> {
        let value = self
            .get_value(column)
            .ok_or_else(|| StoreError::Decode(format!("Column '{column}' not found in row")))?;
        T::from_value(value).map_err(|e| match e {
            StoreError::Decode(msg) => StoreError::Decode(format!("Column '{column}': {msg}")),
            other => other,
        })
    }

    /// Returns a reference to the raw Value at the given column name.
    pub fn get_value(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|idx| &self.values[idx])
    }
}

/// Trait for converting a [`Value`] to a concrete Rust type.
pub trait FromValue: Sized {
    /// Attempts to convert a value reference to this type.
    fn from_value(value: &Value) -> StoreResult<Self>;
}

fn mismatch(expected: &str, value: &Value) -> StoreError {
    StoreError::Decode(format!("Expected {expected}, got {value:?}"))
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> StoreResult<Self> {
        match value {
            Value::Int(i) => Ok(*i),
            _ => Err(mismatch("Int", value)),
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> StoreResult<Self> {
        match value {
            Value::Int(i) => i32::try_from(*i)
                .map_err(|e| StoreError::Decode(format!("Int value out of i32 range: {e}"))),
            _ => Err(mismatch("Int", value)),
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> StoreResult<Self> {
        match value {
            Value::Float(f) => Ok(*f),
            Value::Int(i) => Ok(*i as f64),
            _ => Err(mismatch("Float", value)),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> StoreResult<Self> {
        match value {
            Value::Bool(b) => Ok(*b),
            // SQLite has no boolean storage class.
            Value::Int(i) => Ok(*i != 0),
            _ => Err(mismatch("Bool", value)),
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> StoreResult<Self> {
        match value {
            Value::String(s) => Ok(s.clone()),
            _ => Err(mismatch("String", value)),
        }
    }
}

impl FromValue for uuid::Uuid {
    fn from_value(value: &Value) -> StoreResult<Self> {
        match value {
            Value::Uuid(u) => Ok(*u),
            Value::String(s) => uuid::Uuid::parse_str(s)
                .map_err(|e| StoreError::Decode(format!("Invalid UUID '{s}': {e}"))),
            _ => Err(mismatch("Uuid", value)),
        }
    }
}

/// Text layouts a store may hand back for a timestamp column.
const DATETIME_TEXT_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

impl FromValue for chrono::NaiveDateTime {
    fn from_value(value: &Value) -> StoreResult<Self> {
        match value {
            Value::DateTime(dt) => Ok(*dt),
            Value::DateTimeTz(dt) => Ok(dt.naive_utc()),
            Value::String(s) => DATETIME_TEXT_FORMATS
                .iter()
                .find_map(|fmt| Self::parse_from_str(s, fmt).ok())
                .ok_or_else(|| StoreError::Decode(format!("Invalid datetime '{s}'"))),
            _ => Err(mismatch("DateTime", value)),
        }
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> StoreResult<Self> {
        Ok(value.clone())
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> StoreResult<Self> {
        match value {
            Value::Null => Ok(None),
            _ => T::from_value(value).map(Some),
        }
    }
}

/// The SQL compiler translates a [`Query`] AST into parameterized SQL.
///
/// # Examples
///
/// ```
/// use listq_db::query::compiler::{DatabaseBackendType, Query, SqlCompiler, WhereNode};
/// use listq_db::query::lookups::Lookup;
/// use listq_db::value::Value;
///
/// let mut query = Query::new("blog_article");
/// query.add_where(WhereNode::Condition {
///     column: "status".into(),
///     lookup: Lookup::Exact(Value::from(1)),
/// });
/// let (sql, params) = SqlCompiler::new(DatabaseBackendType::PostgreSQL)
///     .compile_select(&query)
///     .unwrap();
/// assert_eq!(sql, "SELECT * FROM \"blog_article\" WHERE \"status\" = $1");
/// assert_eq!(params, vec![Value::Int(1)]);
/// ```
pub struct SqlCompiler {
    backend: DatabaseBackendType,
}

impl SqlCompiler {
    /// Creates a new compiler for the given backend type.
    pub const fn new(backend: DatabaseBackendType) -> Self {
        Self { backend }
    }

    /// Returns a parameter placeholder for the given 1-based index.
    fn placeholder(&self, index: usize) -> String {
        match self.backend {
            DatabaseBackendType::PostgreSQL => format!("${index}"),
            DatabaseBackendType::SQLite | DatabaseBackendType::MySQL => "?".to_string(),
        }
    }

    /// Quotes an identifier, segment by segment for dotted names.
    pub fn quote_ident(name: &str) -> String {
        name.split('.')
            .map(|part| format!("\"{}\"", part.replace('"', "\"\"")))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Compiles a SELECT query into SQL and parameters.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidPredicate`] if a WHERE node cannot be
    /// compiled.
    pub fn compile_select(&self, query: &Query) -> StoreResult<(String, Vec<Value>)> {
        let mut params: Vec<Value> = Vec::new();
        let mut sql = String::from("SELECT ");

        let select_parts: Vec<String> = if query.select.is_empty() {
            vec!["*".to_string()]
        } else {
            query
                .select
                .iter()
                .map(|col| match col {
                    SelectColumn::Star => "*".to_string(),
                    SelectColumn::CountStar => "COUNT(*) AS \"count\"".to_string(),
                })
                .collect()
        };
        sql.push_str(&select_parts.join(", "));

        sql.push_str(&format!(" FROM {}", Self::quote_ident(&query.table)));

        if let Some(ref where_clause) = query.where_clause {
            sql.push_str(" WHERE ");
            self.compile_where_node(where_clause, &mut sql, &mut params)?;
        }

        if !query.order_by.is_empty() {
            let orders: Vec<String> = query
                .order_by
                .iter()
                .map(|o| {
                    let dir = if o.descending { "DESC" } else { "ASC" };
                    format!("{} {dir}", Self::quote_ident(&o.column))
                })
                .collect();
            sql.push_str(&format!(" ORDER BY {}", orders.join(", ")));
        }

        if let Some(limit) = query.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        if let Some(offset) = query.offset {
            sql.push_str(&format!(" OFFSET {offset}"));
        }

        Ok((sql, params))
    }

    /// Compiles the `COUNT(*)` form of a query.
    pub fn compile_count(&self, query: &Query) -> StoreResult<(String, Vec<Value>)> {
        self.compile_select(&query.to_count())
    }

    /// Compiles a `WhereNode` into SQL, appending to the provided string.
    fn compile_where_node(
        &self,
        node: &WhereNode,
        sql: &mut String,
        params: &mut Vec<Value>,
    ) -> StoreResult<()> {
        match node {
            WhereNode::Condition { column, lookup } => {
                self.compile_lookup(column, lookup, sql, params)?;
            }
            WhereNode::And(children) => {
                if children.is_empty() {
                    sql.push_str("1=1");
                    return Ok(());
                }
                sql.push('(');
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        sql.push_str(" AND ");
                    }
                    self.compile_where_node(child, sql, params)?;
                }
                sql.push(')');
            }
            WhereNode::Or(children) => {
                if children.is_empty() {
                    sql.push_str("1=0");
                    return Ok(());
                }
                sql.push('(');
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        sql.push_str(" OR ");
                    }
                    self.compile_where_node(child, sql, params)?;
                }
                sql.push(')');
            }
            WhereNode::Not(inner) => {
                sql.push_str("NOT (");
                self.compile_where_node(inner, sql, params)?;
                sql.push(')');
            }
            WhereNode::Raw {
                sql: fragment,
                params: fragment_params,
            } => self.compile_raw(fragment, fragment_params, sql, params)?,
        }
        Ok(())
    }

    fn compile_raw(
        &self,
        fragment: &str,
        fragment_params: &[Value],
        sql: &mut String,
        params: &mut Vec<Value>,
    ) -> StoreResult<()> {
        if fragment.trim().is_empty() {
            return Err(StoreError::InvalidPredicate(
                "raw fragment is empty".to_string(),
            ));
        }
        let positions = placeholder_positions(fragment);
        if positions.len() != fragment_params.len() {
            return Err(StoreError::InvalidPredicate(format!(
                "raw fragment '{fragment}' has {} placeholder(s) but {} param(s)",
                positions.len(),
                fragment_params.len()
            )));
        }

        sql.push('(');
        let mut rest = 0;
        for (pos, value) in positions.into_iter().zip(fragment_params) {
            sql.push_str(&fragment[rest..pos]);
            params.push(value.clone());
            sql.push_str(&self.placeholder(params.len()));
            rest = pos + 1;
        }
        sql.push_str(&fragment[rest..]);
        sql.push(')');
        Ok(())
    }

    /// Compiles a single lookup into SQL.
    fn compile_lookup(
        &self,
        column: &str,
        lookup: &Lookup,
        sql: &mut String,
        params: &mut Vec<Value>,
    ) -> StoreResult<()> {
        if column.trim().is_empty() {
            return Err(StoreError::InvalidPredicate(
                "lookup has an empty column name".to_string(),
            ));
        }
        let col = Self::quote_ident(column);

        match lookup {
            Lookup::Exact(val) => {
                if val.is_null() {
                    sql.push_str(&format!("{col} IS NULL"));
                } else {
                    params.push(val.clone());
                    let ph = self.placeholder(params.len());
                    sql.push_str(&format!("{col} = {ph}"));
                }
            }
            Lookup::Contains(val) => {
                params.push(Value::String(format!("%{val}%")));
                let ph = self.placeholder(params.len());
                sql.push_str(&format!("{col} LIKE {ph}"));
            }
            Lookup::IContains(val) => {
                params.push(Value::String(format!("%{val}%")));
                let ph = self.placeholder(params.len());
                match self.backend {
                    DatabaseBackendType::PostgreSQL => {
                        sql.push_str(&format!("{col} ILIKE {ph}"));
                    }
                    _ => {
                        sql.push_str(&format!("LOWER({col}) LIKE LOWER({ph})"));
                    }
                }
            }
            Lookup::In(vals) => {
                if vals.is_empty() {
                    sql.push_str("1=0");
                    return Ok(());
                }
                let placeholders: Vec<String> = vals
                    .iter()
                    .map(|v| {
                        params.push(v.clone());
                        self.placeholder(params.len())
                    })
                    .collect();
                sql.push_str(&format!("{col} IN ({})", placeholders.join(", ")));
            }
            Lookup::Gt(val) => self.push_comparison(&col, ">", val, sql, params),
            Lookup::Gte(val) => self.push_comparison(&col, ">=", val, sql, params),
            Lookup::Lt(val) => self.push_comparison(&col, "<", val, sql, params),
            Lookup::Lte(val) => self.push_comparison(&col, "<=", val, sql, params),
            Lookup::Range(low, high) => {
                params.push(low.clone());
                let ph_low = self.placeholder(params.len());
                params.push(high.clone());
                let ph_high = self.placeholder(params.len());
                sql.push_str(&format!("{col} BETWEEN {ph_low} AND {ph_high}"));
            }
            Lookup::IsNull(is_null) => {
                if *is_null {
                    sql.push_str(&format!("{col} IS NULL"));
                } else {
                    sql.push_str(&format!("{col} IS NOT NULL"));
                }
            }
        }
        Ok(())
    }

    fn push_comparison(
        &self,
        col: &str,
        op: &str,
        val: &Value,
        sql: &mut String,
        params: &mut Vec<Value>,
    ) {
        params.push(val.clone());
        let ph = self.placeholder(params.len());
        sql.push_str(&format!("{col} {op} {ph}"));
    }
}

/// Byte offsets of the `?` placeholders in a raw fragment, skipping quoted
/// spans. A doubled quote inside a span is an escaped quote.
fn placeholder_positions(fragment: &str) -> Vec<usize> {
    let mut positions = Vec::new();
    let mut quote: Option<char> = None;
    let mut chars = fragment.char_indices().peekable();
    while let Some((i, ch)) = chars.next() {
        match (quote, ch) {
            (None, '?') => positions.push(i),
            (None, '\'' | '"') => quote = Some(ch),
            (Some(q), c) if c == q => {
                if chars.peek().map(|&(_, next)| next) == Some(q) {
                    chars.next();
                } else {
                    quote = None;
                }
            }
            _ => {}
        }
    }
    positions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pg() -> SqlCompiler {
        SqlCompiler::new(DatabaseBackendType::PostgreSQL)
    }

    fn sqlite() -> SqlCompiler {
        SqlCompiler::new(DatabaseBackendType::SQLite)
    }

    fn cond(column: &str, lookup: Lookup) -> WhereNode {
        WhereNode::Condition {
            column: column.to_string(),
            lookup,
        }
    }

    // ── Row tests ────────────────────────────────────────────────────

    #[test]
    fn test_row_get_typed() {
        let row = Row::new(
            vec!["id".into(), "title".into(), "active".into()],
            vec![Value::Int(42), Value::from("Go tips"), Value::Int(1)],
        );
        assert_eq!(row.get::<i64>("id").unwrap(), 42);
        assert_eq!(row.get::<String>("title").unwrap(), "Go tips");
        assert!(row.get::<bool>("active").unwrap());
        assert_eq!(row.len(), 3);
    }

    #[test]
    fn test_row_get_missing_column() {
        let row = Row::new(vec!["id".into()], vec![Value::Int(1)]);
        let err = row.get::<i64>("missing").unwrap_err();
        assert!(matches!(err, StoreError::Decode(_)));
    }

    #[test]
    fn test_row_get_wrong_type_names_column() {
        let row = Row::new(vec!["id".into()], vec![Value::from("x")]);
        let err = row.get::<i64>("id").unwrap_err();
        assert!(err.to_string().contains("Column 'id'"));
    }

    #[test]
    fn test_row_get_optional() {
        let row = Row::new(vec!["summary".into()], vec![Value::Null]);
        assert_eq!(row.get::<Option<String>>("summary").unwrap(), None);
    }

    #[test]
    fn test_row_get_datetime_from_text() {
        let row = Row::new(
            vec!["created_at".into()],
            vec![Value::from("2024-01-02 10:00:00")],
        );
        let dt: chrono::NaiveDateTime = row.get("created_at").unwrap();
        assert_eq!(dt.to_string(), "2024-01-02 10:00:00");
    }

    #[test]
    fn test_row_get_datetime_invalid_text() {
        let row = Row::new(vec!["created_at".into()], vec![Value::from("yesterday")]);
        assert!(row.get::<chrono::NaiveDateTime>("created_at").is_err());
    }

    // ── SELECT compilation ───────────────────────────────────────────

    #[test]
    fn test_simple_select() {
        let (sql, params) = pg().compile_select(&Query::new("blog_article")).unwrap();
        assert_eq!(sql, "SELECT * FROM \"blog_article\"");
        assert!(params.is_empty());
    }

    #[test]
    fn test_select_with_order_limit_offset() {
        let mut query = Query::new("blog_article");
        query.order_by = vec![OrderBy::desc("created_at"), OrderBy::asc("id")];
        query.limit = Some(10);
        query.offset = Some(20);
        let (sql, _) = sqlite().compile_select(&query).unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM \"blog_article\" ORDER BY \"created_at\" DESC, \"id\" ASC LIMIT 10 OFFSET 20"
        );
    }

    #[test]
    fn test_count_drops_order_and_window() {
        let mut query = Query::new("blog_article");
        query.add_where(cond("status", Lookup::Exact(Value::from(1))));
        query.order_by = vec![OrderBy::desc("created_at")];
        query.limit = Some(10);
        query.offset = Some(10);
        let (sql, params) = pg().compile_count(&query).unwrap();
        assert_eq!(
            sql,
            "SELECT COUNT(*) AS \"count\" FROM \"blog_article\" WHERE \"status\" = $1"
        );
        assert_eq!(params, vec![Value::Int(1)]);
    }

    #[test]
    fn test_pg_param_numbering_across_groups() {
        let mut query = Query::new("blog_article");
        query.add_where(cond("status", Lookup::Exact(Value::from(1))));
        query.add_where(WhereNode::Or(vec![
            cond("title", Lookup::Contains("go".into())),
            cond("summary", Lookup::Contains("go".into())),
        ]));
        let (sql, params) = pg().compile_select(&query).unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM \"blog_article\" WHERE (\"status\" = $1 AND (\"title\" LIKE $2 OR \"summary\" LIKE $3))"
        );
        assert_eq!(
            params,
            vec![Value::Int(1), Value::from("%go%"), Value::from("%go%")]
        );
    }

    #[test]
    fn test_sqlite_question_marks() {
        let mut query = Query::new("t");
        query.add_where(cond("a", Lookup::Range(Value::from(1), Value::from(5))));
        let (sql, params) = sqlite().compile_select(&query).unwrap();
        assert_eq!(sql, "SELECT * FROM \"t\" WHERE \"a\" BETWEEN ? AND ?");
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_add_where_flattens() {
        let mut query = Query::new("t");
        query.add_where(cond("a", Lookup::Exact(Value::from(1))));
        query.add_where(cond("b", Lookup::Exact(Value::from(2))));
        query.add_where(cond("c", Lookup::Exact(Value::from(3))));
        assert!(matches!(query.where_clause, Some(WhereNode::And(ref c)) if c.len() == 3));
    }

    // ── Lookups ──────────────────────────────────────────────────────

    #[test]
    fn test_exact_null_is_is_null() {
        let mut query = Query::new("t");
        query.add_where(cond("deleted_at", Lookup::Exact(Value::Null)));
        let (sql, params) = pg().compile_select(&query).unwrap();
        assert_eq!(sql, "SELECT * FROM \"t\" WHERE \"deleted_at\" IS NULL");
        assert!(params.is_empty());
    }

    #[test]
    fn test_icontains_per_backend() {
        let mut query = Query::new("t");
        query.add_where(cond("title", Lookup::IContains("Go".into())));
        let (pg_sql, _) = pg().compile_select(&query).unwrap();
        let (lite_sql, _) = sqlite().compile_select(&query).unwrap();
        assert!(pg_sql.ends_with("\"title\" ILIKE $1"));
        assert!(lite_sql.ends_with("LOWER(\"title\") LIKE LOWER(?)"));
    }

    #[test]
    fn test_in_and_empty_in() {
        let mut query = Query::new("t");
        query.add_where(cond("id", Lookup::In(vec![Value::from(1), Value::from(2)])));
        let (sql, _) = pg().compile_select(&query).unwrap();
        assert!(sql.ends_with("\"id\" IN ($1, $2)"));

        let mut empty = Query::new("t");
        empty.add_where(cond("id", Lookup::In(vec![])));
        let (sql, params) = pg().compile_select(&empty).unwrap();
        assert!(sql.ends_with("WHERE 1=0"));
        assert!(params.is_empty());
    }

    #[test]
    fn test_comparisons_and_is_not_null() {
        let mut query = Query::new("t");
        query.add_where(cond("a", Lookup::Gte(Value::from(1))));
        query.add_where(cond("b", Lookup::Lt(Value::from(2))));
        query.add_where(cond("c", Lookup::IsNull(false)));
        let (sql, _) = pg().compile_select(&query).unwrap();
        assert!(sql.contains("\"a\" >= $1 AND \"b\" < $2 AND \"c\" IS NOT NULL"));
    }

    #[test]
    fn test_empty_groups() {
        let mut query = Query::new("t");
        query.where_clause = Some(WhereNode::And(vec![]));
        assert!(pg().compile_select(&query).unwrap().0.ends_with("WHERE 1=1"));
        query.where_clause = Some(WhereNode::Or(vec![]));
        assert!(pg().compile_select(&query).unwrap().0.ends_with("WHERE 1=0"));
    }

    #[test]
    fn test_not() {
        let mut query = Query::new("t");
        query.add_where(WhereNode::from_q(&!Q::filter(
            "status",
            Lookup::Exact(Value::from(0)),
        )));
        let (sql, _) = pg().compile_select(&query).unwrap();
        assert!(sql.ends_with("WHERE NOT (\"status\" = $1)"));
    }

    #[test]
    fn test_empty_column_rejected() {
        let mut query = Query::new("t");
        query.add_where(cond("  ", Lookup::Exact(Value::from(1))));
        let err = pg().compile_select(&query).unwrap_err();
        assert!(matches!(err, StoreError::InvalidPredicate(_)));
    }

    // ── Raw fragments ────────────────────────────────────────────────

    #[test]
    fn test_raw_renumbered_for_pg() {
        let mut query = Query::new("t");
        query.add_where(cond("status", Lookup::Exact(Value::from(1))));
        query.add_where(WhereNode::from_q(&Q::raw(
            "score > ? AND score < ?",
            vec![Value::from(3), Value::from(9)],
        )));
        let (sql, params) = pg().compile_select(&query).unwrap();
        assert!(sql.ends_with("(\"status\" = $1 AND (score > $2 AND score < $3))"));
        assert_eq!(params, vec![Value::Int(1), Value::Int(3), Value::Int(9)]);
    }

    #[test]
    fn test_raw_placeholder_mismatch() {
        let mut query = Query::new("t");
        query.add_where(WhereNode::from_q(&Q::raw("a = ? OR b = ?", vec![Value::from(1)])));
        let err = sqlite().compile_select(&query).unwrap_err();
        assert!(err.to_string().contains("2 placeholder(s) but 1 param(s)"));
    }

    #[test]
    fn test_raw_question_mark_in_literal_is_not_a_placeholder() {
        let mut query = Query::new("t");
        query.add_where(WhereNode::from_q(&Q::raw(
            "title <> 'why?' AND note <> 'it''s ?' AND \"odd?col\" = ?",
            vec![Value::from(5)],
        )));
        let (sql, params) = pg().compile_select(&query).unwrap();
        assert!(sql.ends_with("(title <> 'why?' AND note <> 'it''s ?' AND \"odd?col\" = $1)"));
        assert_eq!(params, vec![Value::Int(5)]);
    }

    #[test]
    fn test_placeholder_positions() {
        assert_eq!(placeholder_positions("a = ? AND b = ?"), vec![4, 14]);
        assert_eq!(placeholder_positions("a = '?' AND b = ?"), vec![16]);
        assert_eq!(placeholder_positions("a = 'x''?' OR ?"), vec![14]);
        assert!(placeholder_positions("a = \"?\"").is_empty());
    }

    #[test]
    fn test_raw_empty_rejected() {
        let mut query = Query::new("t");
        query.add_where(WhereNode::from_q(&Q::raw(" ", vec![])));
        assert!(sqlite().compile_select(&query).is_err());
    }

    // ── Identifiers ──────────────────────────────────────────────────

    #[test]
    fn test_quote_ident() {
        assert_eq!(SqlCompiler::quote_ident("created_at"), "\"created_at\"");
        assert_eq!(
            SqlCompiler::quote_ident("blog_article.created_at"),
            "\"blog_article\".\"created_at\""
        );
        assert_eq!(SqlCompiler::quote_ident("a\"b"), "\"a\"\"b\"");
    }
}
