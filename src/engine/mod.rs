//! Execution-engine boundary for recordflow
//!
//! The store itself is a collaborator: this subsystem defines the record
//! value, the [`ExecutionEngine`] contract the unit of work drives, and an
//! in-memory engine for tests and demos.
//!
//! # Invariants
//!
//! - A savepoint token is meaningful only to the engine that issued it
//! - `AllOrNothing` batches apply nothing when any record fails
//! - Identifiers are assigned by the engine, never by this layer

mod errors;
mod memory;
mod record;
mod traits;

pub use errors::{EngineError, EngineResult};
pub use memory::MemoryEngine;
pub use record::{Record, RecordData};
pub use traits::{ExecutionEngine, PersistMode, PersistOp, PersistResult, Savepoint};
