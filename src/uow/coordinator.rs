//! The unit-of-work coordinator.
//!
//! Batches creations, updates, and deletions across record types, defers
//! cross-record foreign keys until their targets persist, and commits
//! everything in dependency order inside one rollback-capable transaction.
//! A coordinator is single-use: one `commit_work` per instance.

use std::collections::HashMap;

use crate::engine::{ExecutionEngine, PersistMode, PersistOp, Record};

use super::errors::{UowError, UowResult};
use super::ledger::{DeferredRelationship, Ledger};
use super::listener::{CommitListener, NoopListener};
use super::work::Work;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Open,
    Committing,
    Committed,
    RolledBack,
}

impl State {
    fn name(&self) -> &'static str {
        match self {
            State::Open => "open",
            State::Committing => "committing",
            State::Committed => "committed",
            State::RolledBack => "rolled-back",
        }
    }
}

/// Coordinates one transaction's worth of record persistence.
///
/// Record types are registered at construction, in dependency order:
/// parents before the children that reference them. Insert and update
/// phases walk that order; the delete phase walks it in reverse so children
/// are removed before the parents they depend on.
pub struct UnitOfWork<E: ExecutionEngine> {
    engine: E,
    types: Vec<String>,
    ledgers: HashMap<String, Ledger>,
    work: Vec<Box<dyn Work>>,
    listener: Box<dyn CommitListener>,
    state: State,
}

impl<E: ExecutionEngine> UnitOfWork<E> {
    /// Create a coordinator with the default no-op listener
    pub fn new(record_types: &[&str], engine: E) -> Self {
        Self::with_listener(record_types, engine, Box::new(NoopListener))
    }

    /// Create a coordinator with a lifecycle listener.
    ///
    /// Seeds an empty ledger per type and fires `on_type_registered` for
    /// each; duplicate names in the list are ignored.
    pub fn with_listener(
        record_types: &[&str],
        engine: E,
        mut listener: Box<dyn CommitListener>,
    ) -> Self {
        let mut types = Vec::with_capacity(record_types.len());
        let mut ledgers = HashMap::with_capacity(record_types.len());
        for record_type in record_types {
            if ledgers.contains_key(*record_type) {
                continue;
            }
            types.push(record_type.to_string());
            ledgers.insert(record_type.to_string(), Ledger::new());
            listener.on_type_registered(record_type);
        }
        Self {
            engine,
            types,
            ledgers,
            work: Vec::new(),
            listener,
            state: State::Open,
        }
    }

    /// Registered record types, in dependency order
    pub fn registered_types(&self) -> &[String] {
        &self.types
    }

    /// The engine collaborator
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// The engine collaborator, mutably
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Consume the coordinator and recover its engine
    pub fn into_engine(self) -> E {
        self.engine
    }

    /// Enlist a record for insertion.
    ///
    /// Fails when the record already carries a persisted identifier or its
    /// type was not registered at construction.
    pub fn register_new(&mut self, record: &Record) -> UowResult<()> {
        self.ensure_open()?;
        if let Some(id) = record.id() {
            return Err(UowError::AlreadyPersisted {
                record_type: record.record_type(),
                id,
            });
        }
        let record_type = record.record_type();
        self.ledger_mut(&record_type)?.new_records.push(record.clone());
        Ok(())
    }

    /// Enlist a record for insertion along with a deferred relationship to
    /// a parent that has not been persisted yet
    pub fn register_new_with_parent(
        &mut self,
        record: &Record,
        foreign_key: &str,
        parent: &Record,
    ) -> UowResult<()> {
        self.register_new(record)?;
        self.register_relationship(record, foreign_key, parent)
    }

    /// Enlist a deferred foreign-key assignment independent of insertion.
    ///
    /// Resolved immediately before the source record's type persists; the
    /// target must have persisted by then.
    pub fn register_relationship(
        &mut self,
        record: &Record,
        foreign_key: &str,
        related: &Record,
    ) -> UowResult<()> {
        self.ensure_open()?;
        let record_type = record.record_type();
        self.ledger_mut(&record_type)?
            .relationships
            .push(DeferredRelationship {
                record: record.clone(),
                foreign_key: foreign_key.to_string(),
                target: related.clone(),
            });
        Ok(())
    }

    /// Enlist a record for update.
    ///
    /// Keyed by identifier: re-registering the same id overwrites the prior
    /// entry (last write wins). Fails without a persisted identifier.
    pub fn register_dirty(&mut self, record: &Record) -> UowResult<()> {
        self.ensure_open()?;
        let record_type = record.record_type();
        let id = record
            .id()
            .ok_or_else(|| UowError::NotPersisted(record_type.clone()))?;
        self.ledger_mut(&record_type)?.upsert_dirty(id, record.clone());
        Ok(())
    }

    /// Enlist several records for update
    pub fn register_dirty_all(&mut self, records: &[Record]) -> UowResult<()> {
        for record in records {
            self.register_dirty(record)?;
        }
        Ok(())
    }

    /// Enlist a record for deletion; same preconditions as dirty
    pub fn register_deleted(&mut self, record: &Record) -> UowResult<()> {
        self.ensure_open()?;
        let record_type = record.record_type();
        let id = record
            .id()
            .ok_or_else(|| UowError::NotPersisted(record_type.clone()))?;
        self.ledger_mut(&record_type)?.upsert_deleted(id, record.clone());
        Ok(())
    }

    /// Enlist several records for deletion
    pub fn register_deleted_all(&mut self, records: &[Record]) -> UowResult<()> {
        for record in records {
            self.register_deleted(record)?;
        }
        Ok(())
    }

    /// Enlist a generic work unit, run after all record persistence
    pub fn register_work(&mut self, unit: Box<dyn Work>) -> UowResult<()> {
        self.ensure_open()?;
        self.work.push(unit);
        Ok(())
    }

    /// Commit everything registered, in one transaction.
    ///
    /// Phases: insert per type in registration order (deferred
    /// relationships resolve just before their type's batch), update per
    /// type in registration order, delete per type in reverse order, then
    /// work units. Any failure rolls back to the pre-commit savepoint and
    /// re-raises the original error unmodified. The listener's
    /// `on_commit_finished` fires exactly once on both paths.
    pub fn commit_work(&mut self) -> UowResult<()> {
        if self.state != State::Open {
            return Err(UowError::InvalidState(self.state.name()));
        }
        self.state = State::Committing;
        self.listener.on_commit_starting();

        // a savepoint failure precedes the transaction scope: nothing to
        // roll back yet
        let savepoint = match self.engine.savepoint() {
            Ok(savepoint) => savepoint,
            Err(err) => {
                self.state = State::RolledBack;
                return Err(err.into());
            }
        };

        match self.run_commit_phases() {
            Ok(()) => {
                self.state = State::Committed;
                tracing::debug!(types = self.types.len(), "unit of work committed");
                self.listener.on_commit_finished(true);
                Ok(())
            }
            Err(original) => {
                if let Err(rollback_err) = self.engine.rollback(savepoint) {
                    tracing::warn!(error = %rollback_err, "rollback after failed commit also failed");
                }
                self.state = State::RolledBack;
                tracing::debug!(error = %original, "unit of work rolled back");
                self.listener.on_commit_finished(false);
                Err(original)
            }
        }
    }

    fn run_commit_phases(&mut self) -> UowResult<()> {
        self.listener.on_db_starting();

        // insert phase, registration order; each type's deferred
        // relationships resolve first, against targets persisted by earlier
        // iterations
        for index in 0..self.types.len() {
            let record_type = self.types[index].clone();
            let (relationships, new_records) = match self.ledgers.get(&record_type) {
                Some(ledger) => (ledger.relationships.clone(), ledger.new_records.clone()),
                None => continue,
            };
            for deferred in &relationships {
                deferred.resolve()?;
            }
            if new_records.is_empty() {
                continue;
            }
            tracing::debug!(record_type = %record_type, batch = new_records.len(), "insert phase");
            let results = self.engine.persist(
                &record_type,
                &new_records,
                PersistOp::Insert,
                PersistMode::AllOrNothing,
            )?;
            for (record, result) in new_records.iter().zip(&results) {
                if let Some(id) = &result.id {
                    record.set_id(id.clone());
                }
            }
        }

        // update phase, registration order
        for index in 0..self.types.len() {
            let record_type = self.types[index].clone();
            let dirty: Vec<Record> = match self.ledgers.get(&record_type) {
                Some(ledger) => ledger.dirty.iter().map(|(_, r)| r.clone()).collect(),
                None => continue,
            };
            if dirty.is_empty() {
                continue;
            }
            tracing::debug!(record_type = %record_type, batch = dirty.len(), "update phase");
            self.engine.persist(
                &record_type,
                &dirty,
                PersistOp::Update,
                PersistMode::AllOrNothing,
            )?;
        }

        // delete phase, reverse registration order: children before parents
        for index in (0..self.types.len()).rev() {
            let record_type = self.types[index].clone();
            let deleted: Vec<Record> = match self.ledgers.get(&record_type) {
                Some(ledger) => ledger.deleted.iter().map(|(_, r)| r.clone()).collect(),
                None => continue,
            };
            if deleted.is_empty() {
                continue;
            }
            tracing::debug!(record_type = %record_type, batch = deleted.len(), "delete phase");
            self.engine.persist(
                &record_type,
                &deleted,
                PersistOp::Delete,
                PersistMode::AllOrNothing,
            )?;
        }

        self.listener.on_db_finished();
        self.listener.on_work_starting();
        for unit in &mut self.work {
            unit.execute()?;
        }
        self.listener.on_work_finished();
        self.listener.on_commit_finishing();
        Ok(())
    }

    fn ensure_open(&self) -> UowResult<()> {
        if self.state != State::Open {
            return Err(UowError::InvalidState(self.state.name()));
        }
        Ok(())
    }

    fn ledger_mut(&mut self, record_type: &str) -> UowResult<&mut Ledger> {
        self.ledgers
            .get_mut(record_type)
            .ok_or_else(|| UowError::TypeNotRegistered(record_type.to_string()))
    }
}
