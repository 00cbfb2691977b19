//! Round-trip counts for listings run against the test database.

use listq_core::{ListError, StoreError, StoreResult};
use listq_db::model::{Model, Relation, Row};
use listq_db::query::list::{execute_list, ExactFields, ListOptions};
use listq_db::query::page::PageSpec;
use listq_db::query::time_range::TimeRangeBuilder;
use listq_db::value::Value;
use listq_test::{assert_max_queries, assert_num_queries, TestDatabase};

#[derive(Debug, Clone, PartialEq)]
struct Post {
    id: i64,
    board: String,
    body: String,
}

impl Model for Post {
    fn table_name() -> &'static str {
        "forum_post"
    }

    fn field_values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", Value::from(self.id)),
            ("board", Value::from(self.board.as_str())),
            ("body", Value::from(self.body.as_str())),
        ]
    }

    fn from_row(row: &Row) -> StoreResult<Self> {
        Ok(Self {
            id: row.get("id")?,
            board: row.get("board")?,
            body: row.get("body")?,
        })
    }

    fn relations() -> Vec<Relation> {
        vec![
            Relation::has_many("Replies", "forum_reply", "post_id"),
            Relation::has_many("Likes", "forum_like", "post_id"),
        ]
    }
}

async fn forum() -> TestDatabase {
    let db = TestDatabase::new();
    db.load_fixture(
        "CREATE TABLE forum_post (id INTEGER PRIMARY KEY, board TEXT, body TEXT, created_at TEXT);
         CREATE TABLE forum_reply (id INTEGER PRIMARY KEY, post_id INTEGER, body TEXT);
         CREATE TABLE forum_like (id INTEGER PRIMARY KEY, post_id INTEGER);
         INSERT INTO forum_post VALUES
             (1, 'rust', 'lifetimes again', '2024-03-01 08:00:00'),
             (2, 'rust', 'async traits', '2024-03-02 08:00:00'),
             (3, 'go', 'generics', '2024-03-03 08:00:00');
         INSERT INTO forum_reply (post_id, body) VALUES (1, 'a'), (1, 'b'), (2, 'c');
         INSERT INTO forum_like (post_id) VALUES (2), (3);",
    )
    .await
    .unwrap();
    db
}

#[tokio::test]
async fn test_listing_without_preload_is_two_statements() {
    let db = forum().await;
    assert_num_queries(&db, 2, || async {
        let page = execute_list::<Post, _>(
            &db,
            &ExactFields::new().with("board", "rust"),
            ListOptions::new(PageSpec::new(1, 10)),
        )
        .await
        .unwrap();
        assert_eq!(page.len(), 2);
    })
    .await;

    let sent = db.queries();
    assert!(sent[0].starts_with("SELECT COUNT(*)"));
    assert!(sent[1].contains("ORDER BY \"created_at\" DESC LIMIT 10 OFFSET 0"));
}

#[tokio::test]
async fn test_one_statement_per_preload_path() {
    let db = forum().await;
    assert_num_queries(&db, 4, || async {
        let page = execute_list::<Post, _>(
            &db,
            &(),
            ListOptions::new(PageSpec::new(1, 10))
                .preload("Replies")
                .preload("Likes"),
        )
        .await
        .unwrap();
        assert_eq!(page.preloaded("Replies").len(), 3);
        assert_eq!(page.preloaded("Likes").len(), 2);
    })
    .await;

    let sent = db.queries();
    assert!(sent[2].contains("FROM \"forum_reply\""));
    assert!(sent[3].contains("FROM \"forum_like\""));
}

#[tokio::test]
async fn test_preload_cost_does_not_grow_with_page_size() {
    let db = forum().await;
    for limit in [1, 2, 3] {
        assert_num_queries(&db, 3, || async {
            execute_list::<Post, _>(
                &db,
                &(),
                ListOptions::new(PageSpec::new(1, limit)).preload("Replies"),
            )
            .await
            .unwrap();
        })
        .await;
    }
}

#[tokio::test]
async fn test_empty_page_skips_preload_statements() {
    let db = forum().await;
    assert_max_queries(&db, 2, || async {
        let page = execute_list::<Post, _>(
            &db,
            &ExactFields::new().with("board", "python"),
            ListOptions::new(PageSpec::new(1, 10)).preload("Replies"),
        )
        .await
        .unwrap();
        assert!(page.is_empty());
        assert_eq!(page.total_count, 0);
        assert!(page.preloaded("Replies").is_empty());
    })
    .await;
}

#[tokio::test]
async fn test_rejected_listing_sends_nothing() {
    let db = forum().await;
    assert_num_queries(&db, 0, || async {
        let err = execute_list::<Post, _>(
            &db,
            &(),
            ListOptions::new(PageSpec::new(1, 10).with_order("body desc nulls last")),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            ListError::QueryExecution(StoreError::InvalidOrder { .. })
        ));

        let err = execute_list::<Post, _>(
            &db,
            &(),
            ListOptions::new(PageSpec::new(1, 10)).preload("Author"),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            ListError::QueryExecution(StoreError::UnknownRelation { .. })
        ));
    })
    .await;
}

#[tokio::test]
async fn test_time_range_and_fuzzy_share_the_two_statements() {
    let db = forum().await;
    let range = TimeRangeBuilder::default()
        .build(Some("2024-03-01 12:00:00"), None)
        .unwrap();
    assert_num_queries(&db, 2, || async {
        let page = execute_list::<Post, _>(
            &db,
            &(),
            ListOptions::new(PageSpec::new(1, 10).with_search("ic"))
                .fuzzy_columns(["body", "board"])
                .custom_predicate(range),
        )
        .await
        .unwrap();
        let ids: Vec<i64> = page.items.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![3]);
    })
    .await;
}
