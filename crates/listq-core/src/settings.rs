//! Settings for listq.
//!
//! [`Settings`] holds everything the listing layer can be configured with:
//! logging, pagination bounds, the time-range column and format, and the
//! default database. Settings are plain values passed to whoever needs them;
//! there is no global instance.

use serde::{Deserialize, Serialize};

/// The page size used when the caller supplies none, or an out-of-range one.
pub const DEFAULT_LIMIT: i64 = 10;

/// The largest page size a caller may request.
pub const MAX_LIMIT: i64 = 100;

/// The fixed timestamp format accepted by the time-range builder.
pub const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The timestamp column used for default ordering and time ranges.
pub const DEFAULT_TIME_COLUMN: &str = "created_at";

/// Pagination bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationSettings {
    /// Page size applied when the requested one is unset or out of range.
    pub default_limit: i64,
    /// Largest accepted page size.
    pub max_limit: i64,
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            max_limit: MAX_LIMIT,
        }
    }
}

/// Time-range filter configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRangeSettings {
    /// The column the range applies to.
    pub column: String,
    /// The `chrono` format both bounds must match.
    pub format: String,
}

impl Default for TimeRangeSettings {
    fn default() -> Self {
        Self {
            column: DEFAULT_TIME_COLUMN.to_string(),
            format: DEFAULT_TIME_FORMAT.to_string(),
        }
    }
}

/// Database connection configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// The backend engine (`sqlite`, `postgresql`, `mysql`).
    pub engine: String,
    /// The database name, or file path for SQLite (`:memory:` for in-memory).
    pub name: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            engine: "sqlite".to_string(),
            name: ":memory:".to_string(),
        }
    }
}

/// The complete set of listq settings.
///
/// # Examples
///
/// ```
/// use listq_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert_eq!(settings.pagination.default_limit, 10);
/// assert_eq!(settings.time_range.column, "created_at");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Whether debug mode is enabled. Selects pretty logs and turns on
    /// query tracing for options built from these settings.
    pub debug: bool,
    /// The log filter directive (e.g. "info", "listq=debug").
    pub log_level: String,
    /// Pagination bounds.
    pub pagination: PaginationSettings,
    /// Time-range filter configuration.
    pub time_range: TimeRangeSettings,
    /// The default database.
    pub database: DatabaseSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: false,
            log_level: "info".to_string(),
            pagination: PaginationSettings::default(),
            time_range: TimeRangeSettings::default(),
            database: DatabaseSettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let s = Settings::default();
        assert!(!s.debug);
        assert_eq!(s.log_level, "info");
        assert_eq!(s.pagination.default_limit, 10);
        assert_eq!(s.pagination.max_limit, 100);
        assert_eq!(s.time_range.column, "created_at");
        assert_eq!(s.time_range.format, "%Y-%m-%d %H:%M:%S");
    }

    #[test]
    fn test_default_database() {
        let s = Settings::default();
        assert_eq!(s.database.engine, "sqlite");
        assert_eq!(s.database.name, ":memory:");
    }

    #[test]
    fn test_settings_json_shape() {
        let json = serde_json::to_value(Settings::default()).unwrap();
        assert_eq!(json["pagination"]["max_limit"], 100);
        assert_eq!(json["time_range"]["column"], "created_at");
    }
}
