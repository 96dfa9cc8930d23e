//! Unit-of-work subsystem for recordflow
//!
//! Registers pending creations, updates, and deletions per record type,
//! defers cross-record foreign keys until their targets persist, and
//! commits everything in dependency order inside a single rollback-capable
//! transaction with lifecycle hooks around each phase.
//!
//! # Invariants
//!
//! - A type must be registered at construction before its records enlist
//! - New records carry no identifier; dirty and deleted records must
//! - Ledger entries are consumed exactly once; a coordinator is single-use
//! - Commit failures roll back, then re-raise the original error unmodified
//! - `on_commit_finished` fires exactly once per commit attempt

mod coordinator;
mod errors;
mod ledger;
mod listener;
mod work;

pub use coordinator::UnitOfWork;
pub use errors::{UowError, UowResult};
pub use ledger::{DeferredRelationship, Ledger};
pub use listener::{CommitListener, NoopListener};
pub use work::Work;
