//! Store configuration.
//!
//! [`DatabaseConfig`] names the backend and the database to open. It is
//! usually built from the `[database]` section of the settings file via
//! [`DatabaseConfig::from_settings`].

use std::sync::Arc;

use listq_core::settings::DatabaseSettings;
use listq_core::{ListError, ListResult};
use listq_db::query::compiler::DatabaseBackendType;
use listq_db::DbExecutor;

/// Which store to open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// The backend engine.
    pub backend: DatabaseBackendType,
    /// The database name, or file path for SQLite.
    pub name: String,
}

impl DatabaseConfig {
    /// Creates a configuration for an in-memory SQLite database.
    pub fn sqlite_memory() -> Self {
        Self::sqlite_file(":memory:")
    }

    /// Creates a configuration for a SQLite file database.
    pub fn sqlite_file(path: impl Into<String>) -> Self {
        Self {
            backend: DatabaseBackendType::SQLite,
            name: path.into(),
        }
    }

    /// Builds a configuration from the `[database]` settings section.
    ///
    /// The engine name is matched case-insensitively against `sqlite`,
    /// `postgresql` (or `postgres`) and `mysql`.
    pub fn from_settings(settings: &DatabaseSettings) -> ListResult<Self> {
        let backend = match settings.engine.trim().to_ascii_lowercase().as_str() {
            "sqlite" | "sqlite3" => DatabaseBackendType::SQLite,
            "postgresql" | "postgres" => DatabaseBackendType::PostgreSQL,
            "mysql" => DatabaseBackendType::MySQL,
            other => {
                return Err(ListError::ConfigurationError(format!(
                    "unknown database engine '{other}'"
                )))
            }
        };
        if settings.name.trim().is_empty() {
            return Err(ListError::ConfigurationError(
                "database name must not be empty".to_string(),
            ));
        }
        Ok(Self {
            backend,
            name: settings.name.clone(),
        })
    }

    /// Opens the configured store.
    ///
    /// # Errors
    ///
    /// Returns [`ListError::ConfigurationError`] when no driver for the
    /// backend is compiled in, or [`ListError::QueryExecution`] when the
    /// driver fails to open the database.
    pub fn connect(&self) -> ListResult<Arc<dyn DbExecutor>> {
        match self.backend {
            #[cfg(feature = "sqlite")]
            DatabaseBackendType::SQLite => {
                let backend = crate::sqlite::SqliteBackend::open(&self.name)?;
                Ok(Arc::new(backend))
            }
            other => Err(ListError::ConfigurationError(format!(
                "no driver compiled in for {other:?}"
            ))),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::sqlite_memory()
    }
}
