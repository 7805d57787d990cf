//! Convenient re-exports of commonly used types from silt.
//!
//! Import this prelude module to quickly access the most frequently used
//! types and traits without needing to import from multiple sub-modules:
//!
//! ```ignore
//! use silt::prelude::*;
//! ```
//!
//! This provides access to:
//! - The document model and record traits
//! - Store backends and builders
//! - Query compilation and filter construction
//! - Collection handles
//! - Error types

pub use silt_core::{
    backend::{DynStoreBackend, StoreBackend, StoreBackendBuilder, UpsertOutcome},
    collection::{Collection, DynCollection, DynTypedCollection, TypedCollection},
    document::{DocId, Document, Record, RecordExt},
    error::{StoreError, StoreResult},
    query::{
        Combinator, FieldRef, Filter, FilterOp, FilterValue, Query, QueryBuilder, QueryOptions,
        Sort, SortDirection,
    },
    store::{
        AsDynDocumentStore, DocumentStore, DynDocumentStore, DynDocumentStoreRef,
        IntoDynDocumentStore,
    },
};
