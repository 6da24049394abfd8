//! Repository layer implementing the core `LogStore` seam on SQLite

pub mod sqlite_log_store;

pub use sqlite_log_store::SqliteLogStore;
