//! SQLite backend for the muster report-tracking store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Provisioning is explicit: opening a
//! connection never mutates the schema — callers choose between the additive
//! [`SqliteStore::provision`] and the destructive [`SqliteStore::reset`].

mod encode;
mod seed;
mod store;

pub mod error;
pub mod schema;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
