//! Query building, compilation, and execution.
//!
//! - [`lookups`] - `Q` predicates and column lookups
//! - [`compiler`] - Query AST, rows, and SQL compilation
//! - [`page`] - `PageSpec` pagination input
//! - [`order`] - Ordering expression parsing
//! - [`time_range`] - `TimeRangeBuilder` predicates
//! - [`list`] - The listing engine

pub mod compiler;
pub mod list;
pub mod lookups;
pub mod order;
pub mod page;
pub mod time_range;

pub use compiler::{
    DatabaseBackendType, FromValue, OrderBy, Query, Row, SelectColumn, SqlCompiler, WhereNode,
};
pub use list::{
    execute_list, ExactFields, ExactMatch, ListOptions, ListPage, ListQuery, PageInfo,
    ZeroAsUnset,
};
pub use lookups::{Lookup, Q};
pub use order::parse_order_expr;
pub use page::PageSpec;
pub use time_range::TimeRangeBuilder;
