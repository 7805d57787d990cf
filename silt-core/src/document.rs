//! Core types for document representation and serialization.
//!
//! Every stored record is a [`Document`]: a store-assigned integer identity,
//! a soft-delete flag, and an arbitrary JSON payload. The payload is opaque
//! to the store except where filters and sorts address into it by path.

use serde::{Deserialize, Serialize};
use serde_json::{Value, from_value, to_value};

use crate::error::StoreResult;

/// Integer identity of a document, unique within its collection.
///
/// Assigned by the store on insert unless the caller supplies one explicitly;
/// immutable after creation.
pub type DocId = i64;

/// A single stored record: identity, soft-delete flag, and payload.
///
/// `P` is the payload representation. Untyped APIs work with
/// [`serde_json::Value`] (the default); typed collections substitute a
/// concrete [`Record`] type.
///
/// A document with `deleted = true` is excluded from all default reads,
/// counts, and queries; it is never physically removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document<P = Value> {
    /// Identity within the collection.
    pub id: DocId,
    /// Soft-delete flag; `false` on creation.
    pub deleted: bool,
    /// The stored payload tree.
    pub payload: P,
}

impl Document<Value> {
    /// Decodes the raw payload into a concrete record type.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the payload does not match `R`.
    pub fn decode<R: Record>(self) -> StoreResult<Document<R>> {
        Ok(Document {
            id: self.id,
            deleted: self.deleted,
            payload: from_value(self.payload)?,
        })
    }
}

impl<P: Serialize> Document<P> {
    /// Encodes the payload back into a raw JSON value, erasing its type.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the payload fails to serialize.
    pub fn encode(self) -> StoreResult<Document<Value>> {
        Ok(Document {
            id: self.id,
            deleted: self.deleted,
            payload: to_value(self.payload)?,
        })
    }
}

/// Payload types bound to a named collection.
///
/// Implement this for a serde-serializable struct to use the typed collection
/// API. Identity and the soft-delete flag live outside the payload, so a
/// record type describes the payload alone.
///
/// # Example
///
/// ```ignore
/// use silt::document::Record;
/// use serde::{Serialize, Deserialize};
///
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// pub struct Pet {
///     pub name: String,
///     pub age: i64,
/// }
///
/// impl Record for Pet {
///     fn collection_name() -> &'static str {
///         "pets"
///     }
/// }
/// ```
pub trait Record: Serialize + for<'de> Deserialize<'de> + Send + Sync + Clone + 'static {
    /// Returns the name of the collection this record belongs to.
    ///
    /// Must be a safe identifier (letters, digits, underscores, not starting
    /// with a digit). The collection is created automatically on first use.
    fn collection_name() -> &'static str;
}

/// Extension trait providing serialization utilities for records.
///
/// This trait is automatically implemented for all types that implement
/// [`Record`].
pub trait RecordExt: Record {
    /// Converts this record to a JSON payload for storage.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn to_json(&self) -> StoreResult<Value>;

    /// Creates a record from a stored JSON payload.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails or the structure is invalid.
    fn from_json(value: Value) -> StoreResult<Self>;
}

impl<R: Record> RecordExt for R {
    fn to_json(&self) -> StoreResult<Value> {
        Ok(to_value(self)?)
    }

    fn from_json(value: Value) -> StoreResult<Self> {
        Ok(from_value(value)?)
    }
}
