//! A schema-less JSON document store core: collections of soft-deletable
//! documents behind a pluggable storage backend.
//!
//! This crate is the core of the silt project and provides:
//!
//! - **Document model** ([`document`]) - Store-assigned identities, soft-delete flags, JSON payloads
//! - **Store backend abstraction** ([`backend`]) - Traits for implementing storage backends
//! - **Query and filter compiler** ([`query`]) - Untrusted filter tokens compiled into typed, validated queries
//! - **Collections interface** ([`collection`]) - Handles scoping operations to one named collection
//! - **Document store** ([`store`]) - Main interface for collection lifecycle and handle access
//! - **Error handling** ([`error`]) - Error taxonomy and result types
//!
//! Collections are provisioned on first use, documents are soft-deleted
//! rather than removed, and every caller-supplied filter token is validated
//! and typed before a backend translates it into an engine query.
//!
//! # Example
//!
//! ```ignore
//! use silt::{store::DocumentStore, query::{Query, QueryOptions}};
//! use serde_json::json;
//!
//! let store = DocumentStore::new(backend);
//! let pets = store.collection("pets");
//!
//! let id = pets.insert(json!({"name": "Milo", "age": 3})).await?;
//! let adults = pets
//!     .query(Query::compile(
//!         [("filter__age__gt__int", "5")],
//!         QueryOptions::default(),
//!     )?)
//!     .await?;
//! ```

#[allow(unused_extern_crates)]
extern crate self as silt_core;

pub mod backend;
pub mod collection;
pub mod document;
pub mod error;
pub mod query;
pub mod store;
