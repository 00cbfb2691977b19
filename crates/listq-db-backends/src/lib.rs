//! # listq-db-backends
//!
//! Concrete stores for the listq engine. Each backend implements
//! [`listq_db::DbExecutor`], so a [`ListQuery`](listq_db::ListQuery) can run
//! against it directly.
//!
//! ## Available Backends
//!
//! - **SQLite** (feature `sqlite`, on by default) - uses `rusqlite` with
//!   `spawn_blocking`; `:memory:` databases make it the store of choice for
//!   tests.
//!
//! [`DatabaseConfig`] describes which store to open and can be built from the
//! `[database]` section of [`Settings`](listq_core::Settings).

pub mod base;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use base::DatabaseConfig;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteBackend;
