//! The execution-engine collaborator contract.
//!
//! recordflow builds query strings and orders persistence batches; an
//! [`ExecutionEngine`] actually runs them. Engines own savepoint semantics:
//! a [`Savepoint`] is an opaque token whose meaning only its engine knows.

use super::errors::EngineResult;
use super::record::Record;

/// An opaque transactional rollback point issued by an engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Savepoint {
    token: u64,
}

impl Savepoint {
    /// Wrap an engine-assigned token
    pub fn new(token: u64) -> Self {
        Self { token }
    }

    /// The engine-assigned token
    pub fn token(&self) -> u64 {
        self.token
    }
}

/// Which persistence operation a batch performs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistOp {
    /// Create new records; the engine assigns identifiers
    Insert,
    /// Rewrite existing records by identifier
    Update,
    /// Remove existing records by identifier
    Delete,
}

/// Batch failure semantics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistMode {
    /// A single failing record fails the whole batch
    AllOrNothing,
    /// Failing records are reported per-result; the rest apply
    AllowPartial,
}

/// Outcome of persisting one record of a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistResult {
    /// Identifier of the persisted record (assigned on insert)
    pub id: Option<String>,
    /// Whether this record was applied
    pub success: bool,
    /// Failure detail when `success` is false
    pub message: Option<String>,
}

impl PersistResult {
    /// A successful result carrying the record's identifier
    pub fn ok(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            success: true,
            message: None,
        }
    }

    /// A failed result with detail
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            id: None,
            success: false,
            message: Some(message.into()),
        }
    }
}

/// The record store this layer drives.
///
/// Runs rendered query strings, hands out savepoints, and applies
/// persistence batches. All operations are synchronous.
pub trait ExecutionEngine {
    /// Execute a rendered query string
    fn run_query(&mut self, query: &str) -> EngineResult<Vec<Record>>;

    /// Acquire a rollback point
    fn savepoint(&mut self) -> EngineResult<Savepoint>;

    /// Roll state back to a previously acquired savepoint
    fn rollback(&mut self, savepoint: Savepoint) -> EngineResult<()>;

    /// Apply one persistence batch for one record type
    fn persist(
        &mut self,
        record_type: &str,
        records: &[Record],
        op: PersistOp,
        mode: PersistMode,
    ) -> EngineResult<Vec<PersistResult>>;
}
