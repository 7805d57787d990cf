//! SQLite backend implementation for silt.
//!
//! This crate provides a SQLite-based implementation of the `StoreBackend`
//! trait: one table per collection with the fixed `(id, deleted, payload)`
//! schema, documents stored as JSON text, and compiled filter queries
//! translated into fully parameterized SQL.
//!
//! # Features
//!
//! - **Embedded persistence** - Data lives in a single database file (or in
//!   memory for development and tests); the engine is bundled, no server
//!   needed
//! - **Implicit provisioning** - Collections are created on first use
//! - **Soft deletes** - Deleted documents are flagged, never removed
//! - **Safe dynamic filtering** - Filter values and payload paths are bound
//!   as parameters; collection names are allow-listed
//!
//! # Concurrency
//!
//! The store owns a single persistent connection behind an async mutex.
//! Operations are serialized on that connection and commit before returning;
//! there is no multi-statement transaction spanning two store operations.
//!
//! # Example
//!
//! ```ignore
//! use silt::{backend::StoreBackendBuilder, sqlite::SqliteStore};
//!
//! let store = SqliteStore::builder("/data/app.db")
//!     .build()
//!     .await?;
//! ```

#[allow(unused_extern_crates)]
extern crate self as silt_sqlite;

pub mod store;
pub mod query;
pub mod ident;

pub use store::{SqliteStore, SqliteStoreBuilder};
