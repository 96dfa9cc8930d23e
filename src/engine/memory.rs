//! In-process execution engine.
//!
//! Backs the engine contract with a plain in-memory store: savepoints are
//! whole-store snapshots, inserts mint uuid identifiers, and `run_query`
//! supports the type projection (`FROM <type>`, with an optional `LIMIT`)
//! that integration tests and demos need. Anything fancier belongs to a
//! real store behind the same trait.

use std::collections::HashMap;

use uuid::Uuid;

use super::errors::{EngineError, EngineResult};
use super::record::{Record, RecordData};
use super::traits::{ExecutionEngine, PersistMode, PersistOp, PersistResult, Savepoint};

type Store = HashMap<String, Vec<RecordData>>;

/// An engine holding all records in memory
#[derive(Debug, Default)]
pub struct MemoryEngine {
    store: Store,
    snapshots: Vec<(u64, Store)>,
    next_token: u64,
}

impl MemoryEngine {
    /// Create an empty engine
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records of a type
    pub fn count(&self, record_type: &str) -> usize {
        self.store.get(record_type).map_or(0, Vec::len)
    }

    /// Snapshot copies of every stored record of a type
    pub fn stored(&self, record_type: &str) -> Vec<RecordData> {
        self.store.get(record_type).cloned().unwrap_or_default()
    }

    /// A stored record by identifier
    pub fn find(&self, record_type: &str, id: &str) -> Option<RecordData> {
        self.store
            .get(record_type)?
            .iter()
            .find(|r| r.id.as_deref() == Some(id))
            .cloned()
    }

    /// The query text with parenthesized sections removed, so outer-clause
    /// keywords can be located without tripping over sub-queries.
    fn outer_text(query: &str) -> String {
        let mut depth = 0u32;
        let mut outer = String::with_capacity(query.len());
        for ch in query.chars() {
            match ch {
                '(' => depth += 1,
                ')' => depth = depth.saturating_sub(1),
                _ if depth == 0 => outer.push(ch),
                _ => {}
            }
        }
        outer
    }

    fn keyword_value(outer: &str, keyword: &str) -> Option<String> {
        let mut tokens = outer.split_whitespace();
        while let Some(token) = tokens.next() {
            if token.eq_ignore_ascii_case(keyword) {
                return tokens.next().map(str::to_string);
            }
        }
        None
    }

    fn validate(
        &self,
        record_type: &str,
        record: &Record,
        op: PersistOp,
    ) -> Result<(), String> {
        match op {
            PersistOp::Insert => {
                if record.id().is_some() {
                    return Err("record already has an identifier".to_string());
                }
            }
            PersistOp::Update | PersistOp::Delete => {
                let id = match record.id() {
                    Some(id) => id,
                    None => return Err("record has no identifier".to_string()),
                };
                if self.find(record_type, &id).is_none() {
                    return Err(format!("no stored record with id '{id}'"));
                }
            }
        }
        Ok(())
    }

    fn apply(&mut self, record_type: &str, record: &Record, op: PersistOp) -> PersistResult {
        let rows = self.store.entry(record_type.to_string()).or_default();
        match op {
            PersistOp::Insert => {
                let id = Uuid::new_v4().to_string();
                let mut data = record.snapshot();
                data.id = Some(id.clone());
                rows.push(data);
                PersistResult::ok(id)
            }
            PersistOp::Update => {
                // validated: id present and stored
                let data = record.snapshot();
                let id = data.id.clone().unwrap_or_default();
                if let Some(row) = rows.iter_mut().find(|r| r.id == data.id) {
                    *row = data;
                }
                PersistResult::ok(id)
            }
            PersistOp::Delete => {
                let id = record.id().unwrap_or_default();
                rows.retain(|r| r.id.as_deref() != Some(&id));
                PersistResult::ok(id)
            }
        }
    }
}

impl ExecutionEngine for MemoryEngine {
    fn run_query(&mut self, query: &str) -> EngineResult<Vec<Record>> {
        let outer = Self::outer_text(query);
        let record_type = Self::keyword_value(&outer, "FROM")
            .ok_or_else(|| EngineError::Query(format!("no FROM clause in '{query}'")))?;
        let mut rows = self.stored(&record_type);
        if let Some(limit) = Self::keyword_value(&outer, "LIMIT") {
            let limit: usize = limit
                .parse()
                .map_err(|_| EngineError::Query(format!("bad LIMIT in '{query}'")))?;
            rows.truncate(limit);
        }
        Ok(rows.into_iter().map(Record::from_data).collect())
    }

    fn savepoint(&mut self) -> EngineResult<Savepoint> {
        let token = self.next_token;
        self.next_token += 1;
        self.snapshots.push((token, self.store.clone()));
        Ok(Savepoint::new(token))
    }

    fn rollback(&mut self, savepoint: Savepoint) -> EngineResult<()> {
        let position = self
            .snapshots
            .iter()
            .position(|(token, _)| *token == savepoint.token())
            .ok_or_else(|| {
                EngineError::Rollback(format!("unknown savepoint {}", savepoint.token()))
            })?;
        let (_, snapshot) = self.snapshots.drain(position..).next().ok_or_else(|| {
            EngineError::Rollback(format!("unknown savepoint {}", savepoint.token()))
        })?;
        self.store = snapshot;
        Ok(())
    }

    fn persist(
        &mut self,
        record_type: &str,
        records: &[Record],
        op: PersistOp,
        mode: PersistMode,
    ) -> EngineResult<Vec<PersistResult>> {
        // validate the whole batch up front so AllOrNothing applies nothing
        let mut failures: Vec<Option<String>> = Vec::with_capacity(records.len());
        for record in records {
            failures.push(self.validate(record_type, record, op).err());
        }

        if mode == PersistMode::AllOrNothing {
            if let Some(message) = failures.iter().flatten().next() {
                return Err(EngineError::Persist {
                    object: record_type.to_string(),
                    message: message.clone(),
                });
            }
        }

        let mut results = Vec::with_capacity(records.len());
        for (record, failure) in records.iter().zip(failures) {
            match failure {
                Some(message) => results.push(PersistResult::failed(message)),
                None => results.push(self.apply(record_type, record, op)),
            }
        }
        tracing::trace!(
            record_type,
            batch = records.len(),
            op = ?op,
            "persist batch applied"
        );
        Ok(results)
    }
}
