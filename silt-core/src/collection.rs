//! Collection handles for document store operations.
//!
//! A collection handle scopes every operation to one named collection. Both
//! untyped handles (payloads as raw [`serde_json::Value`] trees) and typed
//! handles (payloads as a concrete [`Record`] type) are available, each in a
//! statically dispatched and a dynamically dispatched flavor:
//!
//! - [`Collection`] - untyped collection over a concrete backend
//! - [`TypedCollection`] - type-safe collection for a specific record type
//! - [`DynCollection`] - dynamic dispatch version of the untyped collection
//! - [`DynTypedCollection`] - dynamic dispatch version of the typed collection
//!
//! Collections are provisioned implicitly: the first operation through a
//! handle creates the collection if needed.

use serde_json::Value;
use std::marker::PhantomData;

use crate::{
    backend::{DynStoreBackend, StoreBackend, UpsertOutcome},
    document::{DocId, Document, Record, RecordExt},
    error::StoreResult,
    query::Query,
};

/// An untyped collection handle with a reference to a storage backend.
///
/// Payloads are raw JSON values, providing maximum flexibility without
/// compile-time knowledge of their shape.
#[derive(Debug)]
pub struct Collection<'a, B: StoreBackend> {
    name: String,
    backend: &'a B,
}

impl<'a, B: StoreBackend> Collection<'a, B> {
    /// Creates a new collection handle (internal use).
    pub(crate) fn new(name: String, backend: &'a B) -> Self {
        Self { name, backend }
    }

    /// Returns the name of this collection.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Inserts a new document with a store-assigned identity.
    ///
    /// # Arguments
    ///
    /// * `payload` - The JSON payload to store
    ///
    /// # Returns
    ///
    /// The identity assigned to the new document.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`](crate::error::StoreError) if the operation fails.
    pub async fn insert(&self, payload: Value) -> StoreResult<DocId> {
        self.backend
            .insert_document(self.name(), None, payload)
            .await
    }

    /// Inserts a new document with a caller-supplied identity.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DocumentAlreadyExists`](crate::error::StoreError::DocumentAlreadyExists)
    /// if the identity is already occupied; use [`modify`](Collection::modify)
    /// for upsert semantics.
    pub async fn insert_with_id(&self, id: DocId, payload: Value) -> StoreResult<DocId> {
        self.backend
            .insert_document(self.name(), Some(id), payload)
            .await
    }

    /// Fetches a document by identity.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DocumentNotFound`](crate::error::StoreError::DocumentNotFound)
    /// if the document is absent or soft-deleted.
    pub async fn get(&self, id: DocId) -> StoreResult<Document> {
        self.backend.get_document(self.name(), id).await
    }

    /// Replaces a document's payload, creating the document with that exact
    /// identity if absent.
    ///
    /// # Returns
    ///
    /// [`UpsertOutcome::Created`] or [`UpsertOutcome::Updated`], reporting
    /// which path was taken.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`](crate::error::StoreError) if the operation fails.
    pub async fn modify(&self, id: DocId, payload: Value) -> StoreResult<UpsertOutcome> {
        self.backend
            .upsert_document(self.name(), id, payload)
            .await
    }

    /// Marks a document as deleted. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`](crate::error::StoreError) if the operation fails.
    pub async fn soft_delete(&self, id: DocId) -> StoreResult<()> {
        self.backend
            .soft_delete_document(self.name(), id)
            .await
    }

    /// Counts documents, excluding soft-deleted ones unless told otherwise.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`](crate::error::StoreError) if the operation fails.
    pub async fn count(&self, include_deleted: bool) -> StoreResult<u64> {
        self.backend
            .count_documents(self.name(), include_deleted)
            .await
    }

    /// Lists documents ordered by identity descending, most recent first.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`](crate::error::StoreError) if the operation fails.
    pub async fn list(&self, include_deleted: bool) -> StoreResult<Vec<Document>> {
        self.backend
            .list_documents(self.name(), include_deleted)
            .await
    }

    /// Executes a compiled query against this collection.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`](crate::error::StoreError) if the operation fails.
    pub async fn query(&self, query: Query) -> StoreResult<Vec<Document>> {
        self.backend
            .query_documents(query, self.name())
            .await
    }
}

/// A dynamic (type-erased) untyped collection handle.
///
/// Same surface as [`Collection`], but backed by a backend trait object for
/// runtime backend selection.
#[derive(Debug)]
pub struct DynCollection<'a> {
    name: String,
    backend: &'a dyn DynStoreBackend,
}

impl<'a> DynCollection<'a> {
    /// Creates a new dynamic collection handle (internal use).
    pub(crate) fn new(name: String, backend: &'a dyn DynStoreBackend) -> Self {
        Self { name, backend }
    }

    /// Returns the name of this collection.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Inserts a new document with a store-assigned identity.
    pub async fn insert(&self, payload: Value) -> StoreResult<DocId> {
        self.backend
            .insert_document(self.name(), None, payload)
            .await
    }

    /// Inserts a new document with a caller-supplied identity.
    pub async fn insert_with_id(&self, id: DocId, payload: Value) -> StoreResult<DocId> {
        self.backend
            .insert_document(self.name(), Some(id), payload)
            .await
    }

    /// Fetches a document by identity.
    pub async fn get(&self, id: DocId) -> StoreResult<Document> {
        self.backend.get_document(self.name(), id).await
    }

    /// Replaces a document's payload, creating the document if absent.
    pub async fn modify(&self, id: DocId, payload: Value) -> StoreResult<UpsertOutcome> {
        self.backend
            .upsert_document(self.name(), id, payload)
            .await
    }

    /// Marks a document as deleted. Idempotent.
    pub async fn soft_delete(&self, id: DocId) -> StoreResult<()> {
        self.backend
            .soft_delete_document(self.name(), id)
            .await
    }

    /// Counts documents, excluding soft-deleted ones unless told otherwise.
    pub async fn count(&self, include_deleted: bool) -> StoreResult<u64> {
        self.backend
            .count_documents(self.name(), include_deleted)
            .await
    }

    /// Lists documents ordered by identity descending.
    pub async fn list(&self, include_deleted: bool) -> StoreResult<Vec<Document>> {
        self.backend
            .list_documents(self.name(), include_deleted)
            .await
    }

    /// Executes a compiled query against this collection.
    pub async fn query(&self, query: Query) -> StoreResult<Vec<Document>> {
        self.backend
            .query_documents(query, self.name())
            .await
    }
}

/// A type-safe collection handle for a specific record type.
///
/// Payloads are serialized from and deserialized into `R`; identities and the
/// soft-delete flag are carried alongside in the returned [`Document<R>`].
#[derive(Debug)]
pub struct TypedCollection<'a, B: StoreBackend, R: Record> {
    name: String,
    backend: &'a B,
    _marker: PhantomData<R>,
}

impl<'a, B: StoreBackend, R: Record> TypedCollection<'a, B, R> {
    pub(crate) fn new(name: String, backend: &'a B) -> Self {
        Self { name, backend, _marker: PhantomData }
    }

    /// Returns the name of this collection.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Converts this typed collection to a different record type.
    ///
    /// The collection name is kept; only the payload type changes.
    pub fn with_type<T: Record>(&self) -> TypedCollection<'a, B, T> {
        TypedCollection {
            name: self.name.clone(),
            backend: self.backend,
            _marker: PhantomData,
        }
    }

    /// Inserts a record with a store-assigned identity.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`](crate::error::StoreError) if serialization or
    /// insertion fails.
    pub async fn insert(&self, record: &R) -> StoreResult<DocId> {
        self.backend
            .insert_document(self.name(), None, record.to_json()?)
            .await
    }

    /// Inserts a record with a caller-supplied identity.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DocumentAlreadyExists`](crate::error::StoreError::DocumentAlreadyExists)
    /// if the identity is already occupied.
    pub async fn insert_with_id(&self, id: DocId, record: &R) -> StoreResult<DocId> {
        self.backend
            .insert_document(self.name(), Some(id), record.to_json()?)
            .await
    }

    /// Fetches a record by identity.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DocumentNotFound`](crate::error::StoreError::DocumentNotFound)
    /// if the document is absent or soft-deleted, or a serialization error if
    /// the stored payload does not match `R`.
    pub async fn get(&self, id: DocId) -> StoreResult<Document<R>> {
        self.backend
            .get_document(self.name(), id)
            .await?
            .decode()
    }

    /// Replaces a record's payload, creating the document if absent.
    pub async fn modify(&self, id: DocId, record: &R) -> StoreResult<UpsertOutcome> {
        self.backend
            .upsert_document(self.name(), id, record.to_json()?)
            .await
    }

    /// Marks a document as deleted. Idempotent.
    pub async fn soft_delete(&self, id: DocId) -> StoreResult<()> {
        self.backend
            .soft_delete_document(self.name(), id)
            .await
    }

    /// Counts documents, excluding soft-deleted ones unless told otherwise.
    pub async fn count(&self, include_deleted: bool) -> StoreResult<u64> {
        self.backend
            .count_documents(self.name(), include_deleted)
            .await
    }

    /// Lists records ordered by identity descending.
    pub async fn list(&self, include_deleted: bool) -> StoreResult<Vec<Document<R>>> {
        self.backend
            .list_documents(self.name(), include_deleted)
            .await?
            .into_iter()
            .map(Document::decode)
            .collect()
    }

    /// Executes a compiled query, decoding matches into `R`.
    pub async fn query(&self, query: Query) -> StoreResult<Vec<Document<R>>> {
        self.backend
            .query_documents(query, self.name())
            .await?
            .into_iter()
            .map(Document::decode)
            .collect()
    }
}

/// Dynamic dispatch version of [`TypedCollection`].
#[derive(Debug)]
pub struct DynTypedCollection<'a, R: Record> {
    name: String,
    backend: &'a dyn DynStoreBackend,
    _marker: PhantomData<R>,
}

impl<'a, R: Record> DynTypedCollection<'a, R> {
    pub(crate) fn new(name: String, backend: &'a dyn DynStoreBackend) -> Self {
        Self { name, backend, _marker: PhantomData }
    }

    /// Returns the name of this collection.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Converts this typed collection to a different record type.
    pub fn with_type<T: Record>(&self) -> DynTypedCollection<'a, T> {
        DynTypedCollection {
            name: self.name.clone(),
            backend: self.backend,
            _marker: PhantomData,
        }
    }

    /// Inserts a record with a store-assigned identity.
    pub async fn insert(&self, record: &R) -> StoreResult<DocId> {
        self.backend
            .insert_document(self.name(), None, record.to_json()?)
            .await
    }

    /// Inserts a record with a caller-supplied identity.
    pub async fn insert_with_id(&self, id: DocId, record: &R) -> StoreResult<DocId> {
        self.backend
            .insert_document(self.name(), Some(id), record.to_json()?)
            .await
    }

    /// Fetches a record by identity.
    pub async fn get(&self, id: DocId) -> StoreResult<Document<R>> {
        self.backend
            .get_document(self.name(), id)
            .await?
            .decode()
    }

    /// Replaces a record's payload, creating the document if absent.
    pub async fn modify(&self, id: DocId, record: &R) -> StoreResult<UpsertOutcome> {
        self.backend
            .upsert_document(self.name(), id, record.to_json()?)
            .await
    }

    /// Marks a document as deleted. Idempotent.
    pub async fn soft_delete(&self, id: DocId) -> StoreResult<()> {
        self.backend
            .soft_delete_document(self.name(), id)
            .await
    }

    /// Counts documents, excluding soft-deleted ones unless told otherwise.
    pub async fn count(&self, include_deleted: bool) -> StoreResult<u64> {
        self.backend
            .count_documents(self.name(), include_deleted)
            .await
    }

    /// Lists records ordered by identity descending.
    pub async fn list(&self, include_deleted: bool) -> StoreResult<Vec<Document<R>>> {
        self.backend
            .list_documents(self.name(), include_deleted)
            .await?
            .into_iter()
            .map(Document::decode)
            .collect()
    }

    /// Executes a compiled query, decoding matches into `R`.
    pub async fn query(&self, query: Query) -> StoreResult<Vec<Document<R>>> {
        self.backend
            .query_documents(query, self.name())
            .await?
            .into_iter()
            .map(Document::decode)
            .collect()
    }
}
