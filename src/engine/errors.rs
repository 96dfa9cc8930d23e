//! # Engine Errors
//!
//! Error types surfaced by execution-engine implementations. The unit of
//! work re-raises these verbatim after rollback; they are never wrapped or
//! downgraded.

use thiserror::Error;

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Failures surfaced by the execution engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Query string could not be executed
    #[error("query execution failed: {0}")]
    Query(String),

    /// A persistence batch failed
    #[error("persist failed for record type '{object}': {message}")]
    Persist {
        /// Record type of the failing batch
        object: String,
        /// Engine-provided failure detail
        message: String,
    },

    /// No savepoint could be acquired
    #[error("savepoint unavailable: {0}")]
    Savepoint(String),

    /// Rollback to a savepoint failed
    #[error("rollback failed: {0}")]
    Rollback(String),
}
