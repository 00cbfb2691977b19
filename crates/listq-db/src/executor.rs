//! The store seam.
//!
//! The listing engine never talks to a database directly. It compiles SQL and
//! hands it to a [`DbExecutor`], which concrete backends (such as
//! `SqliteBackend` in `listq-db-backends`) and test doubles implement.

use crate::query::compiler::{DatabaseBackendType, Row};
use crate::value::Value;
use listq_core::{StoreError, StoreResult};

/// Minimal async database executor trait.
///
/// Engine operations accept `&dyn DbExecutor`, so the store handle is always
/// passed explicitly.
#[async_trait::async_trait]
pub trait DbExecutor: Send + Sync {
    /// Returns the backend type for SQL compilation.
    fn backend_type(&self) -> DatabaseBackendType;

    /// Runs a SQL statement that does not return rows.
    /// Returns the number of rows affected.
    async fn execute_sql(&self, sql: &str, params: &[Value]) -> StoreResult<u64>;

    /// Runs a SQL query and returns all result rows.
    async fn query(&self, sql: &str, params: &[Value]) -> StoreResult<Vec<Row>>;

    /// Runs a SQL query that must return exactly one row.
    async fn query_one(&self, sql: &str, params: &[Value]) -> StoreResult<Row> {
        let mut rows = self.query(sql, params).await?;
        match rows.len() {
            1 => Ok(rows.remove(0)),
            n => Err(StoreError::DatabaseError(format!(
                "Expected exactly one row, got {n}"
            ))),
        }
    }
}
