//! Main silt crate providing a unified interface for schema-less document storage.
//!
//! This crate is the primary entry point for users of silt. It re-exports the
//! core types from the sub-crates and provides access to the SQLite storage
//! backend.
//!
//! # Features
//!
//! - **Schema-less collections** - Named collections of JSON documents,
//!   provisioned automatically on first use
//! - **Soft deletes** - Documents are flagged as deleted and excluded from
//!   default reads, never physically removed
//! - **Dynamic filtering** - Untrusted `filter__field__op__type` tokens are
//!   compiled into typed, fully parameterized queries
//! - **Typed or untyped access** - Work with raw JSON payloads or with serde
//!   types through typed collections
//!
//! # Quick Start
//!
//! ```ignore
//! use silt::{prelude::*, sqlite::SqliteStore};
//! use serde_json::json;
//!
//! # async fn example() -> StoreResult<()> {
//! // Open an in-memory store (use SqliteStore::builder(path) for a file).
//! let store = DocumentStore::new(SqliteStore::in_memory()?);
//! let pets = store.collection("pets");
//!
//! // Insert documents; identities are assigned by the store.
//! let milo = pets.insert(json!({"name": "Milo", "age": 3})).await?;
//! let luna = pets.insert(json!({"name": "Luna", "age": 7})).await?;
//!
//! // Compile caller-supplied filter tokens into a query.
//! let adults = pets
//!     .query(Query::compile(
//!         [("filter__age__gt__int", "5")],
//!         QueryOptions {
//!             sort_field: Some("id"),
//!             sort_direction: Some("DESC"),
//!             ..QueryOptions::default()
//!         },
//!     )?)
//!     .await?;
//! assert_eq!(adults.len(), 1);
//!
//! // Soft-delete: gone from default reads, still counted on request.
//! pets.soft_delete(milo).await?;
//! assert_eq!(pets.count(false).await?, 1);
//! assert_eq!(pets.count(true).await?, 2);
//! # Ok(()) }
//! ```
//!
//! # Typed Collections
//!
//! ```ignore
//! use silt::{prelude::*, sqlite::SqliteStore};
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! pub struct Pet {
//!     pub name: String,
//!     pub age: i64,
//! }
//!
//! impl Record for Pet {
//!     fn collection_name() -> &'static str { "pets" }
//! }
//!
//! # async fn example() -> StoreResult<()> {
//! let store = DocumentStore::new(SqliteStore::in_memory()?);
//! let pets = store.typed_collection::<Pet>();
//!
//! let id = pets.insert(&Pet { name: "Milo".into(), age: 3 }).await?;
//! let milo = pets.get(id).await?;
//! assert_eq!(milo.payload.age, 3);
//! # Ok(()) }
//! ```
//!
//! # Dynamic Dispatch
//!
//! When the backend type is not known at compile time, convert a store with
//! [`IntoDynDocumentStore::into_dyn`](store::IntoDynDocumentStore) and use the
//! dynamically dispatched handles; the API surface is the same.
//!
//! # Backends
//!
//! - [`sqlite`] - Embedded SQLite storage, on disk or in memory

pub mod prelude;

pub use silt_core::{backend, collection, document, error, query, store};

/// SQLite storage backend implementations.
pub mod sqlite {
    pub use silt_sqlite::{SqliteStore, SqliteStoreBuilder};
}
