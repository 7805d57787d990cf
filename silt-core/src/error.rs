//! Error types and result types for document store operations.
//!
//! This module provides error handling for all document store operations.
//! Use [`StoreResult<T>`] as the return type for fallible operations.
//!
//! Caller-input errors (the filter-compiler variants and the identifier
//! guards) are reported directly and never retried. Engine failures are
//! wrapped at the backend boundary as [`StoreError::Backend`] or, on the
//! query path, [`StoreError::QueryExecution`].

use serde_json::Error as SerdeJsonError;
use thiserror::Error;

use crate::document::DocId;

/// Represents all possible errors that can occur when interacting with a document store.
///
/// This enum covers payload serialization errors, document lifecycle issues,
/// the filter-compiler taxonomy, identifier validation, and backend-specific
/// errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Serialization/deserialization error when encoding or decoding a payload.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Error during store initialization or connection setup.
    #[error("Initialization error: {0}")]
    Initialization(String),
    /// A filter token name does not split into the `filter__field__op[__type]` shape.
    #[error("Malformed filter token: {0}")]
    MalformedFilter(String),
    /// The operator part of a filter token is outside the fixed vocabulary.
    #[error("Unknown filter operator: {0}")]
    UnknownOperator(String),
    /// A filter token arrived without a value.
    #[error("Missing value for filter: {0}")]
    MissingValue(String),
    /// The declared type of a filter token is not `str`, `int` or `float`.
    #[error("Unknown filter type: {0}")]
    UnknownType(String),
    /// A raw value did not parse as its declared numeric type.
    #[error("Value {value:?} does not parse as {expected}")]
    TypeMismatch {
        /// The raw value as supplied by the caller.
        value: String,
        /// The declared type the value failed to parse as.
        expected: &'static str,
    },
    /// The filter combination is neither `AND` nor `OR`.
    #[error("Invalid filter combination: {0}")]
    InvalidCombination(String),
    /// The sort direction is neither `ASC` nor `DESC`.
    #[error("Invalid sort direction: {0}")]
    InvalidSortDirection(String),
    /// A collection name failed the identifier allow-list.
    #[error("Invalid collection name: {0}")]
    InvalidCollectionName(String),
    /// A filter or sort field failed the identifier allow-list.
    #[error("Invalid field name: {0}")]
    InvalidFieldName(String),
    /// The requested document was not found in the collection (or is soft-deleted).
    /// The first argument is the document identity, the second the collection name.
    #[error("Document {0} not found in collection {1}")]
    DocumentNotFound(DocId, String),
    /// An insert supplied an identity that is already occupied.
    /// The first argument is the document identity, the second the collection name.
    #[error("Document {0} already exists in collection {1}")]
    DocumentAlreadyExists(DocId, String),
    /// The storage engine rejected a compiled query.
    #[error("Query execution failed: {0}")]
    QueryExecution(String),
    /// An error occurred in the underlying storage engine.
    #[error("Backend error: {0}")]
    Backend(String),
}

/// A specialized `Result` type for document store operations.
///
/// This type alias is used throughout the crate to indicate operations that
/// may fail with a [`StoreError`].
pub type StoreResult<T> = Result<T, StoreError>;

impl From<SerdeJsonError> for StoreError {
    fn from(err: SerdeJsonError) -> Self {
        StoreError::Serialization(err.to_string())
    }
}
