//! Database layer for sub-store
//!
//! SQLite persistence for the key-value mappings the registry owns.
//!
//! ## Submodules
//!
//! Methods on [`Database`] are organized by domain:
//! - [`migrations`] — Database lifecycle, schema migrations
//! - [`kv`] — [`KeyValueStore`](crate::kv::KeyValueStore) implementation

use sqlx::sqlite::SqlitePool;

mod kv;
mod migrations;

/// Database handle for sub-store
pub struct Database {
    pool: SqlitePool,
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
