//! # Access Errors
//!
//! Error types for the read-access policy boundary.

use thiserror::Error;

/// Result type for access checks
pub type AccessResult = Result<(), AccessError>;

/// Read-access denials, split by the level at which access was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    /// Field-level read access denied
    #[error("read access to field '{field}' on record type '{object}' is denied")]
    FieldNotReadable {
        /// Record type owning the field
        object: String,
        /// Field whose read was refused
        field: String,
    },

    /// Object-level read access denied
    #[error("read access to record type '{object}' is denied")]
    ObjectNotReadable {
        /// Record type whose read was refused
        object: String,
    },
}
