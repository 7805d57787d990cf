//! Storage backend abstraction for the document store.
//!
//! This module defines the traits that abstract over concrete storage
//! engines. A backend owns the persistent storage handle and implements the
//! full document-engine contract: collection provisioning, CRUD with
//! soft-delete semantics, counting, listing, and compiled-query execution.
//!
//! # Traits
//!
//! - [`StoreBackend`]: the core trait for storage backends
//! - [`DynStoreBackend`]: a trait for dynamic dispatch over backend implementations
//! - [`StoreBackendBuilder`]: factory trait for creating backend instances
//!
//! # Contract
//!
//! Collections are created implicitly on first use: no operation fails merely
//! because a collection was never explicitly created. All mutating operations
//! commit before returning; there is no deferred or batched write path, and
//! no retry anywhere. Implementations must be thread-safe (`Send + Sync`);
//! the concrete locking model is implementation-specific.

use async_trait::async_trait;
use serde_json::Value;
use std::{any::Any, fmt::Debug};

use crate::{
    document::{DocId, Document},
    error::StoreResult,
    query::Query,
};

/// Outcome of an upsert-style modify.
///
/// Callers need not branch on existence before writing; the outcome reports
/// which path was actually taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// No document with the identity existed; one was created.
    Created,
    /// The payload of the existing document was replaced.
    Updated,
}

/// Abstract interface for document storage backends.
///
/// Implementers provide the concrete storage strategy behind the document
/// engine. All methods are async and return [`StoreResult`]; engine failures
/// are reported through [`StoreError::Backend`](crate::error::StoreError::Backend)
/// or, on the query path, [`StoreError::QueryExecution`](crate::error::StoreError::QueryExecution).
#[async_trait]
pub trait StoreBackend: Send + Sync + Debug {
    /// Provisions a collection if it does not exist yet.
    ///
    /// Idempotent: provisioning an existing collection is not an error. The
    /// side effect is a persistent schema change.
    ///
    /// # Errors
    ///
    /// Rejects names outside the identifier allow-list; propagates engine
    /// failures.
    async fn create_collection(&self, name: &str) -> StoreResult<()>;

    /// Returns whether a collection with that exact name has been provisioned.
    async fn collection_exists(&self, name: &str) -> StoreResult<bool>;

    /// Lists the names of all provisioned collections.
    ///
    /// Engine-internal tables are excluded.
    async fn list_collections(&self) -> StoreResult<Vec<String>>;

    /// Inserts a new document and returns its identity.
    ///
    /// The document is created with `deleted = false`. With `id: None` the
    /// store assigns the next identity; with an explicit identity the insert
    /// fails if that identity is already occupied (upsert semantics live in
    /// [`upsert_document`](StoreBackend::upsert_document) instead).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DocumentAlreadyExists`](crate::error::StoreError::DocumentAlreadyExists)
    /// for an occupied explicit identity.
    async fn insert_document(
        &self,
        collection: &str,
        id: Option<DocId>,
        payload: Value,
    ) -> StoreResult<DocId>;

    /// Fetches a document by identity.
    ///
    /// Soft-deleted documents are not visible here.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DocumentNotFound`](crate::error::StoreError::DocumentNotFound)
    /// if the document is absent or soft-deleted.
    async fn get_document(&self, collection: &str, id: DocId) -> StoreResult<Document>;

    /// Replaces a document's payload, creating the document if absent.
    ///
    /// Existence is judged ignoring the soft-delete state: modifying a
    /// soft-deleted document replaces its payload and leaves the flag set.
    /// The identity never changes.
    async fn upsert_document(
        &self,
        collection: &str,
        id: DocId,
        payload: Value,
    ) -> StoreResult<UpsertOutcome>;

    /// Marks a document as deleted.
    ///
    /// Idempotent: deleting an already-deleted or nonexistent identity is not
    /// an error. Documents are never physically removed.
    async fn soft_delete_document(&self, collection: &str, id: DocId) -> StoreResult<()>;

    /// Counts documents, excluding soft-deleted ones unless told otherwise.
    async fn count_documents(&self, collection: &str, include_deleted: bool) -> StoreResult<u64>;

    /// Lists documents ordered by identity descending, most recent first.
    async fn list_documents(
        &self,
        collection: &str,
        include_deleted: bool,
    ) -> StoreResult<Vec<Document>>;

    /// Executes a compiled query against a collection.
    ///
    /// The backend builds one scoped read from the query's filter group,
    /// sort, soft-delete scope, and row limit, and maps the rows back into
    /// documents. No implicit error correction: an unevaluable predicate
    /// surfaces as [`StoreError::QueryExecution`](crate::error::StoreError::QueryExecution).
    async fn query_documents(&self, query: Query, collection: &str) -> StoreResult<Vec<Document>>;

    /// Cleanly shuts down the backend, releasing all resources.
    ///
    /// The default implementation is a no-op; backends with persistent
    /// storage or external connections should override this.
    async fn shutdown(self) -> StoreResult<()>
    where
        Self: Sized,
    {
        Ok(())
    }
}

/// Object-safe mirror of [`StoreBackend`] for dynamic dispatch.
///
/// Automatically implemented for every `StoreBackend`; use it through
/// [`DynDocumentStore`](crate::store::DynDocumentStore) when the backend type
/// is selected at runtime.
#[async_trait]
pub trait DynStoreBackend: Send + Sync + Debug {
    async fn create_collection(&self, name: &str) -> StoreResult<()>;
    async fn collection_exists(&self, name: &str) -> StoreResult<bool>;
    async fn list_collections(&self) -> StoreResult<Vec<String>>;
    async fn insert_document(
        &self,
        collection: &str,
        id: Option<DocId>,
        payload: Value,
    ) -> StoreResult<DocId>;
    async fn get_document(&self, collection: &str, id: DocId) -> StoreResult<Document>;
    async fn upsert_document(
        &self,
        collection: &str,
        id: DocId,
        payload: Value,
    ) -> StoreResult<UpsertOutcome>;
    async fn soft_delete_document(&self, collection: &str, id: DocId) -> StoreResult<()>;
    async fn count_documents(&self, collection: &str, include_deleted: bool) -> StoreResult<u64>;
    async fn list_documents(
        &self,
        collection: &str,
        include_deleted: bool,
    ) -> StoreResult<Vec<Document>>;
    async fn query_documents(&self, query: Query, collection: &str) -> StoreResult<Vec<Document>>;
    async fn shutdown_boxed(self: Box<Self>) -> StoreResult<()>;

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

#[async_trait]
impl<B: StoreBackend + Send + Sync + 'static> DynStoreBackend for B {
    async fn create_collection(&self, name: &str) -> StoreResult<()> {
        StoreBackend::create_collection(self, name).await
    }

    async fn collection_exists(&self, name: &str) -> StoreResult<bool> {
        StoreBackend::collection_exists(self, name).await
    }

    async fn list_collections(&self) -> StoreResult<Vec<String>> {
        StoreBackend::list_collections(self).await
    }

    async fn insert_document(
        &self,
        collection: &str,
        id: Option<DocId>,
        payload: Value,
    ) -> StoreResult<DocId> {
        StoreBackend::insert_document(self, collection, id, payload).await
    }

    async fn get_document(&self, collection: &str, id: DocId) -> StoreResult<Document> {
        StoreBackend::get_document(self, collection, id).await
    }

    async fn upsert_document(
        &self,
        collection: &str,
        id: DocId,
        payload: Value,
    ) -> StoreResult<UpsertOutcome> {
        StoreBackend::upsert_document(self, collection, id, payload).await
    }

    async fn soft_delete_document(&self, collection: &str, id: DocId) -> StoreResult<()> {
        StoreBackend::soft_delete_document(self, collection, id).await
    }

    async fn count_documents(&self, collection: &str, include_deleted: bool) -> StoreResult<u64> {
        StoreBackend::count_documents(self, collection, include_deleted).await
    }

    async fn list_documents(
        &self,
        collection: &str,
        include_deleted: bool,
    ) -> StoreResult<Vec<Document>> {
        StoreBackend::list_documents(self, collection, include_deleted).await
    }

    async fn query_documents(&self, query: Query, collection: &str) -> StoreResult<Vec<Document>> {
        StoreBackend::query_documents(self, query, collection).await
    }

    async fn shutdown_boxed(self: Box<Self>) -> StoreResult<()> {
        StoreBackend::shutdown(*self).await
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// Factory trait for creating backend instances.
#[async_trait]
pub trait StoreBackendBuilder {
    /// The backend type this builder produces.
    type Backend: StoreBackend;

    /// Builds and returns the backend.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Initialization`](crate::error::StoreError::Initialization)
    /// if the storage handle cannot be opened.
    async fn build(self) -> StoreResult<Self::Backend>;
}
