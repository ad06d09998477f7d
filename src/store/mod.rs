/// This module provides a process-local store, useful for tests and dry runs.
pub mod memory;

#[cfg(feature = "rdbc-sqlite")]
/// This module provides a SQLite store built on SQLx.
pub mod sqlite;
