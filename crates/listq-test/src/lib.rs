//! # listq-test
//!
//! Testing utilities for listq. [`TestDatabase`] is a fresh in-memory SQLite
//! store that counts and records every statement it runs, and
//! [`assert_num_queries`] / [`assert_max_queries`] turn those counts into
//! assertions, so a test can pin how many round trips a listing makes.

pub mod assert_queries;
pub mod test_database;

pub use assert_queries::{assert_max_queries, assert_num_queries};
pub use test_database::TestDatabase;
