//! # Unit-of-Work Errors
//!
//! Registration precondition violations and commit-phase failures. Engine
//! errors pass through untouched so callers see the original failure after
//! rollback.

use thiserror::Error;

use crate::engine::EngineError;

/// Result type for unit-of-work operations
pub type UowResult<T> = Result<T, UowError>;

/// Unit-of-work failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UowError {
    /// Record type was not pre-registered with the coordinator
    #[error("record type '{0}' is not registered with this unit of work")]
    TypeNotRegistered(String),

    /// A record with a persisted identifier was registered as new
    #[error("record of type '{record_type}' already has id '{id}' and cannot be registered as new")]
    AlreadyPersisted {
        /// Record type
        record_type: String,
        /// The identifier the record already carries
        id: String,
    },

    /// A record without a persisted identifier was registered as dirty or deleted
    #[error("record of type '{0}' has no id and cannot be registered as dirty or deleted")]
    NotPersisted(String),

    /// Registration after commit, or a repeated commit
    #[error("unit of work is no longer accepting calls (state: {0})")]
    InvalidState(&'static str),

    /// A deferred relationship's target never received an identifier
    #[error(
        "deferred relationship on field '{field}' targets a record of type \
         '{target_type}' that was never persisted"
    )]
    UnresolvedRelationship {
        /// Foreign-key field awaiting the identifier
        field: String,
        /// Type of the unpersisted target record
        target_type: String,
    },

    /// A registered work unit failed
    #[error("work unit failed: {0}")]
    Work(String),

    /// Engine failure, re-raised verbatim after rollback
    #[error(transparent)]
    Engine(#[from] EngineError),
}
