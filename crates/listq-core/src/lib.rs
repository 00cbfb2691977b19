//! # listq-core
//!
//! Core types, settings, and error types for the listq workspace.
//! This crate has no dependency on the query engine and provides the
//! foundation for all other crates.
//!
//! ## Modules
//!
//! - [`error`] - Error taxonomy and result aliases
//! - [`settings`] - Pagination, time-range, logging, and database settings
//! - [`settings_loader`] - Loading settings from TOML/JSON and the environment
//! - [`logging`] - Tracing-based logging integration

pub mod error;
pub mod logging;
pub mod settings;
pub mod settings_loader;

// Re-export the most commonly used types at the crate root.
pub use error::{ListError, ListResult, RangeBound, StoreError, StoreResult};
pub use settings::{PaginationSettings, Settings, TimeRangeSettings};
