//! SQLite store backend using `rusqlite`.
//!
//! [`SqliteBackend`] implements [`DbExecutor`] by running each statement on
//! a blocking thread via `tokio::task::spawn_blocking`, with the single
//! connection guarded by an async mutex.
//!
//! Timestamps are bound as `YYYY-MM-DD HH:MM:SS` text, so `TEXT` timestamp
//! columns written in the same format compare correctly in range filters.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use listq_core::{StoreError, StoreResult};
use listq_db::query::compiler::{DatabaseBackendType, Row};
use listq_db::value::Value;
use listq_db::DbExecutor;
use rusqlite::types::ValueRef;
use tokio::sync::Mutex;

/// A SQLite store.
pub struct SqliteBackend {
    path: PathBuf,
    conn: Arc<Mutex<rusqlite::Connection>>,
}

impl std::fmt::Debug for SqliteBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteBackend")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl SqliteBackend {
    /// Opens a SQLite database at the given path, or an in-memory database
    /// for `:memory:`.
    ///
    /// WAL journaling and foreign keys are switched on.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::OperationalError`] if the database cannot be
    /// opened or configured.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let conn = if path.to_str() == Some(":memory:") {
            rusqlite::Connection::open_in_memory()
        } else {
            rusqlite::Connection::open(&path)
        }
        .map_err(|e| StoreError::OperationalError(format!("SQLite open failed: {e}")))?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .map_err(|e| StoreError::OperationalError(format!("Failed to set pragmas: {e}")))?;

        tracing::debug!(path = %path.display(), "opened sqlite store");
        Ok(Self {
            path,
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Opens an in-memory database.
    pub fn memory() -> StoreResult<Self> {
        Self::open(":memory:")
    }

    /// The database file path (or `:memory:`).
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Runs several `;`-separated statements without parameters. Meant for
    /// schema setup and fixtures.
    pub async fn execute_batch(&self, sql: &str) -> StoreResult<()> {
        let conn = self.conn.clone();
        let sql = sql.to_string();
        tokio::task::spawn_blocking(move || {
            conn.blocking_lock()
                .execute_batch(&sql)
                .map_err(|e| StoreError::DatabaseError(format!("{e}")))
        })
        .await
        .map_err(join_error)?
    }

    fn bind_params(stmt: &mut rusqlite::Statement<'_>, params: &[Value]) -> StoreResult<()> {
        for (i, param) in params.iter().enumerate() {
            let idx = i + 1;
            match param {
                Value::Null => stmt.raw_bind_parameter(idx, rusqlite::types::Null),
                Value::Bool(b) => stmt.raw_bind_parameter(idx, b),
                Value::Int(v) => stmt.raw_bind_parameter(idx, v),
                Value::Float(v) => stmt.raw_bind_parameter(idx, v),
                Value::String(s) => stmt.raw_bind_parameter(idx, s.as_str()),
                Value::Bytes(b) => stmt.raw_bind_parameter(idx, b.as_slice()),
                Value::Date(d) => stmt.raw_bind_parameter(idx, d.to_string().as_str()),
                Value::DateTime(dt) => stmt.raw_bind_parameter(idx, dt.to_string().as_str()),
                Value::DateTimeTz(dt) => stmt.raw_bind_parameter(idx, dt.to_rfc3339().as_str()),
                Value::Uuid(u) => stmt.raw_bind_parameter(idx, u.to_string().as_str()),
                Value::Json(j) => stmt.raw_bind_parameter(idx, j.to_string().as_str()),
                Value::List(vals) => {
                    let json = serde_json::to_string(
                        &vals.iter().map(ToString::to_string).collect::<Vec<_>>(),
                    )
                    .unwrap_or_default();
                    stmt.raw_bind_parameter(idx, json.as_str())
                }
            }
            .map_err(|e| StoreError::DatabaseError(format!("Bind error: {e}")))?;
        }
        Ok(())
    }

    fn convert_row(sqlite_row: &rusqlite::Row<'_>, column_names: &[String]) -> StoreResult<Row> {
        let values = column_names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let value_ref = sqlite_row.get_ref(i).map_err(|e| {
                    StoreError::Decode(format!("Failed to read column '{name}': {e}"))
                })?;
                Ok(convert_value(value_ref))
            })
            .collect::<StoreResult<Vec<_>>>()?;
        Ok(Row::new(column_names.to_vec(), values))
    }
}

fn convert_value(value_ref: ValueRef<'_>) -> Value {
    match value_ref {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(v) => Value::Int(v),
        ValueRef::Real(v) => Value::Float(v),
        ValueRef::Text(b) => Value::String(String::from_utf8_lossy(b).into_owned()),
        ValueRef::Blob(b) => Value::Bytes(b.to_vec()),
    }
}

fn join_error(e: tokio::task::JoinError) -> StoreError {
    StoreError::OperationalError(format!("Task join error: {e}"))
}

#[async_trait::async_trait]
impl DbExecutor for SqliteBackend {
    fn backend_type(&self) -> DatabaseBackendType {
        DatabaseBackendType::SQLite
    }

    async fn execute_sql(&self, sql: &str, params: &[Value]) -> StoreResult<u64> {
        let conn = self.conn.clone();
        let sql = sql.to_string();
        let params = params.to_vec();

        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            let mut stmt = conn
                .prepare(&sql)
                .map_err(|e| StoreError::DatabaseError(format!("{e}")))?;
            Self::bind_params(&mut stmt, &params)?;
            let count = stmt
                .raw_execute()
                .map_err(|e| StoreError::DatabaseError(format!("{e}")))?;
            Ok(u64::try_from(count).unwrap_or(u64::MAX))
        })
        .await
        .map_err(join_error)?
    }

    async fn query(&self, sql: &str, params: &[Value]) -> StoreResult<Vec<Row>> {
        let conn = self.conn.clone();
        let sql = sql.to_string();
        let params = params.to_vec();

        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            let mut stmt = conn
                .prepare(&sql)
                .map_err(|e| StoreError::DatabaseError(format!("{e}")))?;
            let column_names: Vec<String> =
                stmt.column_names().iter().map(ToString::to_string).collect();
            Self::bind_params(&mut stmt, &params)?;

            let mut rows = stmt.raw_query();
            let mut result = Vec::new();
            while let Some(row) = rows
                .next()
                .map_err(|e| StoreError::DatabaseError(format!("{e}")))?
            {
                result.push(Self::convert_row(row, &column_names)?);
            }
            Ok(result)
        })
        .await
        .map_err(join_error)?
    }
}
