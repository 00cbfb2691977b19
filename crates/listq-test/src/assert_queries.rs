//! Statement-count assertions.
//!
//! [`assert_num_queries`] resets a [`TestDatabase`]'s counter, runs an async
//! closure, and asserts how many statements it sent. A listing without
//! preloads should cost exactly two (count, page fetch), plus one per preload
//! path; these helpers catch regressions toward N+1 patterns.
//!
//! ## Example
//!
//! ```rust,no_run
//! use listq_test::{assert_num_queries, TestDatabase};
//! use listq_db::DbExecutor;
//!
//! async fn example() {
//!     let db = TestDatabase::new();
//!     assert_num_queries(&db, 1, || async {
//!         db.query("SELECT 1", &[]).await.unwrap();
//!     })
//!     .await;
//! }
//! ```

use std::future::Future;

use crate::test_database::TestDatabase;

/// Asserts that exactly `expected_count` statements run during `f`.
///
/// # Panics
///
/// Panics if the count differs. The message lists the statements sent.
pub async fn assert_num_queries<F, Fut>(db: &TestDatabase, expected_count: usize, f: F)
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = ()>,
{
    db.reset_query_count();
    f().await;
    let actual = db.query_count();
    assert_eq!(
        actual,
        expected_count,
        "Expected {expected_count} SQL queries, but {actual} were executed: {:#?}",
        db.queries()
    );
}

/// Asserts that at most `max_count` statements run during `f`.
///
/// # Panics
///
/// Panics if more than `max_count` statements run.
pub async fn assert_max_queries<F, Fut>(db: &TestDatabase, max_count: usize, f: F)
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = ()>,
{
    db.reset_query_count();
    f().await;
    let actual = db.query_count();
    assert!(
        actual <= max_count,
        "Expected at most {max_count} SQL queries, but {actual} were executed: {:#?}",
        db.queries()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use listq_db::value::Value;
    use listq_db::DbExecutor;

    async fn with_table() -> TestDatabase {
        let db = TestDatabase::new();
        db.load_fixture("CREATE TABLE nq (id INTEGER PRIMARY KEY, val TEXT)")
            .await
            .unwrap();
        db
    }

    #[tokio::test]
    async fn test_assert_num_queries_passes() {
        let db = with_table().await;
        assert_num_queries(&db, 2, || async {
            db.execute_sql("INSERT INTO nq (val) VALUES (?)", &[Value::from("a")])
                .await
                .unwrap();
            db.query("SELECT * FROM nq", &[]).await.unwrap();
        })
        .await;
    }

    #[tokio::test]
    async fn test_assert_num_queries_zero() {
        let db = TestDatabase::new();
        assert_num_queries(&db, 0, || async {}).await;
    }

    #[tokio::test]
    #[should_panic(expected = "Expected 1 SQL queries, but 2 were executed")]
    async fn test_assert_num_queries_fails_too_many() {
        let db = with_table().await;
        assert_num_queries(&db, 1, || async {
            db.query("SELECT * FROM nq", &[]).await.unwrap();
            db.query("SELECT * FROM nq", &[]).await.unwrap();
        })
        .await;
    }

    #[tokio::test]
    #[should_panic(expected = "Expected 3 SQL queries, but 1 were executed")]
    async fn test_assert_num_queries_fails_too_few() {
        let db = with_table().await;
        assert_num_queries(&db, 3, || async {
            db.query("SELECT * FROM nq", &[]).await.unwrap();
        })
        .await;
    }

    #[tokio::test]
    async fn test_assert_max_queries_passes() {
        let db = with_table().await;
        assert_max_queries(&db, 3, || async {
            db.query("SELECT * FROM nq", &[]).await.unwrap();
        })
        .await;
    }

    #[tokio::test]
    #[should_panic(expected = "Expected at most 1 SQL queries, but 2 were executed")]
    async fn test_assert_max_queries_fails() {
        let db = with_table().await;
        assert_max_queries(&db, 1, || async {
            db.query("SELECT * FROM nq", &[]).await.unwrap();
            db.query("SELECT * FROM nq", &[]).await.unwrap();
        })
        .await;
    }

    #[tokio::test]
    async fn test_counter_resets_between_assertions() {
        let db = with_table().await;
        assert_num_queries(&db, 1, || async {
            db.query("SELECT * FROM nq", &[]).await.unwrap();
        })
        .await;
        assert_num_queries(&db, 1, || async {
            db.query("SELECT * FROM nq", &[]).await.unwrap();
        })
        .await;
    }
}
