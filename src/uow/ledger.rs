//! Per-type ledgers of pending persistence.
//!
//! One [`Ledger`] per registered record type, created during registration
//! and consumed exactly once during commit. Dirty and deleted entries are
//! keyed by identifier with insertion order kept; re-registering an
//! identifier overwrites the prior entry in place (last write wins).

use serde_json::Value;

use crate::engine::Record;

use super::errors::{UowError, UowResult};

/// A pending foreign-key assignment awaiting persistence of its target
#[derive(Debug, Clone)]
pub struct DeferredRelationship {
    /// Record whose foreign key will be patched
    pub record: Record,
    /// Foreign-key field on the source record
    pub foreign_key: String,
    /// The not-yet-persisted related record
    pub target: Record,
}

impl DeferredRelationship {
    /// Copy the target's now-known identifier onto the source record.
    ///
    /// Fails when the target still has no identifier, which means the
    /// registration order did not reflect dependency order.
    pub fn resolve(&self) -> UowResult<()> {
        let id = self
            .target
            .id()
            .ok_or_else(|| UowError::UnresolvedRelationship {
                field: self.foreign_key.clone(),
                target_type: self.target.record_type(),
            })?;
        self.record.set(&self.foreign_key, Value::String(id));
        Ok(())
    }
}

/// Pending work for one record type
#[derive(Debug, Default)]
pub struct Ledger {
    /// Records to insert, in registration order
    pub new_records: Vec<Record>,
    /// Records to update, keyed by id, insertion-ordered
    pub dirty: Vec<(String, Record)>,
    /// Records to delete, keyed by id, insertion-ordered
    pub deleted: Vec<(String, Record)>,
    /// Deferred foreign-key assignments, in registration order
    pub relationships: Vec<DeferredRelationship>,
}

impl Ledger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an update; a prior entry for the same id is overwritten in place
    pub fn upsert_dirty(&mut self, id: String, record: Record) {
        match self.dirty.iter_mut().find(|(existing, _)| *existing == id) {
            Some((_, slot)) => *slot = record,
            None => self.dirty.push((id, record)),
        }
    }

    /// Record a deletion; a prior entry for the same id is overwritten in place
    pub fn upsert_deleted(&mut self, id: String, record: Record) {
        match self.deleted.iter_mut().find(|(existing, _)| *existing == id) {
            Some((_, slot)) => *slot = record,
            None => self.deleted.push((id, record)),
        }
    }
}
