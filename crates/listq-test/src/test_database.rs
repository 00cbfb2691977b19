//! An in-memory test store.
//!
//! [`TestDatabase`] wraps a fresh `:memory:` [`SqliteBackend`] and counts
//! every statement that goes through its [`DbExecutor`] implementation. The
//! SQL of each statement is recorded too, so tests can check what a listing
//! sent as well as how often.
//!
//! ## Example
//!
//! ```rust,no_run
//! use listq_test::TestDatabase;
//!
//! async fn example() {
//!     let db = TestDatabase::new();
//!     db.load_fixture("CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT)")
//!         .await
//!         .unwrap();
//!     assert_eq!(db.query_count(), 0);
//! }
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use listq_core::StoreResult;
use listq_db::query::compiler::{DatabaseBackendType, Row};
use listq_db::value::Value;
use listq_db::DbExecutor;
use listq_db_backends::sqlite::SqliteBackend;

/// An in-memory SQLite database for testing.
///
/// Clones share the same database and counters.
#[derive(Clone)]
pub struct TestDatabase {
    backend: Arc<SqliteBackend>,
    query_count: Arc<AtomicUsize>,
    statements: Arc<Mutex<Vec<String>>>,
}

impl TestDatabase {
    /// Creates a new, empty in-memory test database.
    ///
    /// # Panics
    ///
    /// Panics if the in-memory database cannot be created.
    pub fn new() -> Self {
        let backend = SqliteBackend::memory().expect("Failed to create in-memory SQLite database");
        Self {
            backend: Arc::new(backend),
            query_count: Arc::new(AtomicUsize::new(0)),
            statements: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Runs `;`-separated setup SQL. Not counted.
    pub async fn load_fixture(&self, sql: &str) -> StoreResult<()> {
        self.backend.execute_batch(sql).await
    }

    /// Executes a raw SQL string with no parameters. Counted.
    pub async fn execute_raw(&self, sql: &str) -> StoreResult<u64> {
        self.record(sql);
        self.backend.execute_sql(sql, &[]).await
    }

    /// Drops every user table.
    pub async fn teardown(&self) -> StoreResult<()> {
        let rows = self
            .backend
            .query(
                "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
                &[],
            )
            .await?;

        for row in &rows {
            let table_name: String = row.get("name")?;
            self.backend
                .execute_sql(&format!("DROP TABLE IF EXISTS \"{table_name}\""), &[])
                .await?;
        }
        Ok(())
    }

    /// Number of statements run since creation or the last reset.
    pub fn query_count(&self) -> usize {
        self.query_count.load(Ordering::Relaxed)
    }

    /// The SQL of every statement run since creation or the last reset.
    pub fn queries(&self) -> Vec<String> {
        self.statements
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Resets the statement counter and log.
    pub fn reset_query_count(&self) {
        self.query_count.store(0, Ordering::Relaxed);
        self.statements
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// The wrapped backend. Statements sent to it directly are not counted.
    pub fn backend(&self) -> &SqliteBackend {
        &self.backend
    }

    fn record(&self, sql: &str) {
        self.query_count.fetch_add(1, Ordering::Relaxed);
        self.statements
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(sql.to_string());
        tracing::trace!(sql, "test database statement");
    }
}

impl Default for TestDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TestDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestDatabase")
            .field("query_count", &self.query_count())
            .finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl DbExecutor for TestDatabase {
    fn backend_type(&self) -> DatabaseBackendType {
        DatabaseBackendType::SQLite
    }

    async fn execute_sql(&self, sql: &str, params: &[Value]) -> StoreResult<u64> {
        self.record(sql);
        self.backend.execute_sql(sql, params).await
    }

    async fn query(&self, sql: &str, params: &[Value]) -> StoreResult<Vec<Row>> {
        self.record(sql);
        self.backend.query(sql, params).await
    }

    async fn query_one(&self, sql: &str, params: &[Value]) -> StoreResult<Row> {
        self.record(sql);
        self.backend.query_one(sql, params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fixture_not_counted() {
        let db = TestDatabase::new();
        db.load_fixture("CREATE TABLE t (id INTEGER PRIMARY KEY); INSERT INTO t VALUES (1);")
            .await
            .unwrap();
        assert_eq!(db.query_count(), 0);
        assert!(db.queries().is_empty());
    }

    #[tokio::test]
    async fn test_statements_counted_and_recorded() {
        let db = TestDatabase::new();
        db.execute_raw("CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT)")
            .await
            .unwrap();
        db.execute_sql("INSERT INTO t (name) VALUES (?)", &[Value::from("a")])
            .await
            .unwrap();
        let rows = db.query("SELECT * FROM t", &[]).await.unwrap();
        assert_eq!(rows.len(), 1);

        assert_eq!(db.query_count(), 3);
        assert_eq!(db.queries()[2], "SELECT * FROM t");
    }

    #[tokio::test]
    async fn test_query_one_counts_once() {
        let db = TestDatabase::new();
        db.query_one("SELECT 1 AS one", &[]).await.unwrap();
        assert_eq!(db.query_count(), 1);
    }

    #[tokio::test]
    async fn test_reset_clears_count_and_log() {
        let db = TestDatabase::new();
        db.query("SELECT 1", &[]).await.unwrap();
        db.reset_query_count();
        assert_eq!(db.query_count(), 0);
        assert!(db.queries().is_empty());
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let db = TestDatabase::new();
        let other = db.clone();
        db.load_fixture("CREATE TABLE shared (id INTEGER)").await.unwrap();
        other.execute_raw("INSERT INTO shared VALUES (1)").await.unwrap();
        assert_eq!(db.query_count(), 1);
        assert_eq!(db.query("SELECT * FROM shared", &[]).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_teardown_drops_tables() {
        let db = TestDatabase::new();
        db.load_fixture("CREATE TABLE a (id INTEGER); CREATE TABLE b (id INTEGER);")
            .await
            .unwrap();
        db.teardown().await.unwrap();
        let rows = db
            .backend()
            .query("SELECT name FROM sqlite_master WHERE type='table'", &[])
            .await
            .unwrap();
        assert!(rows.is_empty());
    }
}
