//! HealthLog Store - SQLite persistence for per-user health logs
//!
//! Provides:
//! - Connection management
//! - Embedded, checksummed migrations
//! - `SqliteLogStore`, a `LogStore` with atomic amend

pub mod db;
pub mod errors;
pub mod migrations;
pub mod repo;

pub use errors::Result;
pub use repo::SqliteLogStore;
