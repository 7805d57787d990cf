//! Main document store interface for interacting with document backends.
//!
//! This module provides the primary API for working with document stores:
//!
//! - [`DocumentStore`] - typed store bound to a specific backend implementation
//! - [`DynDocumentStore`] - dynamic dispatch store for runtime backend selection
//! - [`DynDocumentStoreRef`] - reference-based store for temporary use
//!
//! The store hands out collection handles and owns the collection lifecycle
//! operations (ensure, existence check, listing). Collections have no destroy
//! operation; once provisioned they stay provisioned.

use crate::{
    backend::{DynStoreBackend, StoreBackend},
    collection::{Collection, DynCollection, DynTypedCollection, TypedCollection},
    document::Record,
    error::StoreResult,
};

/// A strongly-typed document store bound to a specific backend implementation.
///
/// # Example
///
/// ```ignore
/// let store = DocumentStore::new(backend);
/// store.ensure_collection("pets").await?;
/// let pets = store.collection("pets");
/// ```
#[derive(Debug)]
pub struct DocumentStore<B: StoreBackend> {
    backend: B,
}

impl<B: StoreBackend> DocumentStore<B> {
    /// Creates a new document store with the given backend.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Gets a typed collection handle for the specified record type.
    ///
    /// The collection name is determined by the record type's
    /// `collection_name()` method.
    pub fn typed_collection<'a, R: Record>(&'a self) -> TypedCollection<'a, B, R> {
        TypedCollection::new(R::collection_name().to_string(), &self.backend)
    }

    /// Gets an untyped collection handle with the given name.
    pub fn collection<'a>(&'a self, name: &str) -> Collection<'a, B> {
        Collection::new(name.to_string(), &self.backend)
    }

    /// Ensures a collection exists, provisioning it if absent.
    ///
    /// Idempotent; every document operation also ensures its collection, so
    /// calling this explicitly is only needed to provision ahead of time.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`](crate::error::StoreError) if the name is
    /// invalid or provisioning fails.
    pub async fn ensure_collection(&self, name: &str) -> StoreResult<()> {
        self.backend.create_collection(name).await
    }

    /// Returns whether a collection with that exact name has been provisioned.
    pub async fn collection_exists(&self, name: &str) -> StoreResult<bool> {
        self.backend.collection_exists(name).await
    }

    /// Lists all collections in the store.
    pub async fn list_collections(&self) -> StoreResult<Vec<String>> {
        self.backend.list_collections().await
    }

    /// Shuts down the store and releases backend resources.
    ///
    /// This consumes the store and should be called when no longer needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the shutdown operation fails.
    pub async fn shutdown(self) -> StoreResult<()> {
        self.backend.shutdown().await?;

        Ok(())
    }
}

/// A document store over a boxed backend trait object.
#[derive(Debug)]
pub struct DynDocumentStore {
    backend: Box<dyn DynStoreBackend>,
}

impl DynDocumentStore {
    /// Creates a new dynamic document store with the given backend trait object.
    pub fn new(backend: Box<dyn DynStoreBackend>) -> Self {
        Self { backend }
    }

    /// Gets a typed collection handle for the specified record type.
    pub fn typed_collection<'a, R: Record>(&'a self) -> DynTypedCollection<'a, R> {
        DynTypedCollection::new(R::collection_name().to_string(), &*self.backend)
    }

    /// Gets an untyped collection handle with the given name.
    pub fn collection<'a>(&'a self, name: &str) -> DynCollection<'a> {
        DynCollection::new(name.to_string(), &*self.backend)
    }

    /// Ensures a collection exists, provisioning it if absent.
    pub async fn ensure_collection(&self, name: &str) -> StoreResult<()> {
        self.backend.create_collection(name).await
    }

    /// Returns whether a collection with that exact name has been provisioned.
    pub async fn collection_exists(&self, name: &str) -> StoreResult<bool> {
        self.backend.collection_exists(name).await
    }

    /// Lists all collections in the store.
    pub async fn list_collections(&self) -> StoreResult<Vec<String>> {
        self.backend.list_collections().await
    }

    /// Shuts down the store and releases backend resources.
    pub async fn shutdown(self) -> StoreResult<()> {
        self.backend.shutdown_boxed().await
    }
}

/// A borrowed view of a document store as a backend trait object.
#[derive(Debug)]
pub struct DynDocumentStoreRef<'a> {
    backend: &'a dyn DynStoreBackend,
}

impl<'a> DynDocumentStoreRef<'a> {
    /// Creates a reference to a dynamic document store.
    pub fn new(backend: &'a dyn DynStoreBackend) -> Self {
        Self { backend }
    }

    /// Gets a typed collection handle for the specified record type.
    pub fn typed_collection<R: Record>(&'a self) -> DynTypedCollection<'a, R> {
        DynTypedCollection::new(R::collection_name().to_string(), self.backend)
    }

    /// Gets an untyped collection handle with the given name.
    pub fn collection(&'a self, name: &str) -> DynCollection<'a> {
        DynCollection::new(name.to_string(), self.backend)
    }

    /// Ensures a collection exists, provisioning it if absent.
    pub async fn ensure_collection(&self, name: &str) -> StoreResult<()> {
        self.backend.create_collection(name).await
    }

    /// Returns whether a collection with that exact name has been provisioned.
    pub async fn collection_exists(&self, name: &str) -> StoreResult<bool> {
        self.backend.collection_exists(name).await
    }

    /// Lists all collections in the store.
    pub async fn list_collections(&self) -> StoreResult<Vec<String>> {
        self.backend.list_collections().await
    }
}

/// Conversion trait for viewing a document store as a dynamic reference.
pub trait AsDynDocumentStore {
    /// Converts this store to a dynamic reference.
    fn as_dyn<'a>(&'a self) -> DynDocumentStoreRef<'a>;
}

/// Conversion trait for converting a document store into a dynamic owned store.
pub trait IntoDynDocumentStore {
    /// Converts this store into a dynamic owned store.
    fn into_dyn(self) -> DynDocumentStore;
}

impl<B: StoreBackend + 'static> AsDynDocumentStore for DocumentStore<B> {
    fn as_dyn<'a>(&'a self) -> DynDocumentStoreRef<'a> {
        DynDocumentStoreRef::new(&self.backend)
    }
}

impl AsDynDocumentStore for DynDocumentStore {
    fn as_dyn<'a>(&'a self) -> DynDocumentStoreRef<'a> {
        DynDocumentStoreRef::new(&*self.backend)
    }
}

impl<'a> AsDynDocumentStore for DynDocumentStoreRef<'a> {
    fn as_dyn<'b>(&'b self) -> DynDocumentStoreRef<'b> {
        DynDocumentStoreRef::new(self.backend)
    }
}

impl<B: StoreBackend + 'static> IntoDynDocumentStore for DocumentStore<B> {
    fn into_dyn(self) -> DynDocumentStore {
        DynDocumentStore::new(Box::new(self.backend))
    }
}

impl IntoDynDocumentStore for DynDocumentStore {
    fn into_dyn(self) -> DynDocumentStore {
        self
    }
}
