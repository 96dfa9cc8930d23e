//! # Query Errors
//!
//! Error types for field resolution and query building. Every failure names
//! the offending record type, field, relationship, or field set, so callers
//! never have to parse messages.

use thiserror::Error;

use crate::access::AccessError;

/// Result type for query construction and rendering
pub type QueryResult<T> = Result<T, QueryError>;

/// Field-resolution and query-configuration failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// Record type not present in the schema catalog
    #[error("unknown record type '{0}'")]
    UnknownObject(String),

    /// Path segment does not name a field on the current record type
    #[error("unknown field '{field}' on record type '{object}'")]
    UnknownField {
        /// Record type searched
        object: String,
        /// Missing field name
        field: String,
    },

    /// Non-terminal path segment is not a single-target relationship
    #[error("field '{field}' on record type '{object}' is not a single-target relationship")]
    NotARelationship {
        /// Record type owning the field
        object: String,
        /// Field that cannot be traversed
        field: String,
    },

    /// Field set rejected for this builder
    #[error("field set '{field_set}' is invalid for record type '{object}': {reason}")]
    InvalidFieldSet {
        /// Field set name
        field_set: String,
        /// Record type the builder targets
        object: String,
        /// Why the set was rejected
        reason: String,
    },

    /// Sub-query relationship rejected for this builder
    #[error("cannot build sub-query '{relationship}' on record type '{object}': {reason}")]
    InvalidRelationship {
        /// Record type the builder targets
        object: String,
        /// Requested relationship name
        relationship: String,
        /// Why the sub-query was rejected
        reason: String,
    },

    /// Read access denied by the access-control collaborator
    #[error(transparent)]
    AccessDenied(#[from] AccessError),
}
