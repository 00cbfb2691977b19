//! # listq
//!
//! A listing query engine. One call turns a page request, an exact-match
//! template, fuzzy-search columns, a custom predicate (such as a time range)
//! and preload paths into a `COUNT(*)`, a page fetch, and one batch query per
//! preload.
//!
//! This is the meta-crate that re-exports the sub-crates. Depend on the
//! individual crates for finer-grained control.
//!
//! ```
//! use listq::prelude::*;
//!
//! let range = TimeRangeBuilder::default()
//!     .build(Some("2024-01-01 00:00:00"), None)
//!     .unwrap();
//! let options = ListOptions::new(PageSpec::new(2, 20).with_search("rust"))
//!     .fuzzy_columns(["title", "body"])
//!     .custom_predicate(range);
//! assert_eq!(options.page.offset(), 20);
//! ```

/// Errors, settings, settings loading and logging setup.
pub use listq_core as core;

/// Values, models, predicates, SQL compilation and the listing engine.
pub use listq_db as db;

/// Store backends.
pub use listq_db_backends as db_backends;

/// Test database and statement-count assertions.
#[cfg(feature = "testing")]
pub use listq_test as test;

pub use async_trait;
pub use chrono;
pub use serde;
pub use serde_json;
pub use tokio;
pub use tracing;
pub use tracing_subscriber;

/// The items most listings need.
pub mod prelude {
    pub use listq_core::logging::setup_logging;
    pub use listq_core::settings_loader;
    pub use listq_core::{ListError, ListResult, Settings, StoreError, StoreResult};
    pub use listq_db::model::{Model, Relation, Row};
    pub use listq_db::query::list::{
        execute_list, ExactFields, ExactMatch, ListOptions, ListPage, ListQuery, PageInfo,
        ZeroAsUnset,
    };
    pub use listq_db::query::lookups::{Lookup, Q};
    pub use listq_db::query::page::PageSpec;
    pub use listq_db::query::time_range::TimeRangeBuilder;
    pub use listq_db::value::Value;
    pub use listq_db::DbExecutor;
    pub use listq_db_backends::DatabaseConfig;

    #[cfg(feature = "sqlite")]
    pub use listq_db_backends::SqliteBackend;
}

/// Loads settings, installs logging and opens the configured store.
///
/// Settings come from `path` (TOML or JSON by extension) merged over the
/// defaults, then `LISTQ_*` environment overrides.
///
/// # Errors
///
/// Returns [`ListError::ConfigurationError`](listq_core::ListError::ConfigurationError)
/// for unreadable settings or an unsupported engine, and
/// [`ListError::QueryExecution`](listq_core::ListError::QueryExecution) if
/// the store cannot be opened.
pub fn bootstrap(
    path: Option<&std::path::Path>,
) -> listq_core::ListResult<(listq_core::Settings, std::sync::Arc<dyn listq_db::DbExecutor>)> {
    let settings = match path {
        Some(path) if path.extension().is_some_and(|ext| ext == "json") => {
            let mut settings = listq_core::settings_loader::from_json_file(path)?;
            listq_core::settings_loader::apply_env_overrides(&mut settings);
            settings
        }
        Some(path) => listq_core::settings_loader::from_toml_file_with_env(path)?,
        None => listq_core::settings_loader::from_env(),
    };
    listq_core::logging::setup_logging(&settings);
    let db = listq_db_backends::DatabaseConfig::from_settings(&settings.database)?.connect()?;
    tracing::info!(engine = %settings.database.engine, name = %settings.database.name, "listq ready");
    Ok((settings, db))
}
