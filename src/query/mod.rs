//! Dynamic query building subsystem for recordflow
//!
//! Turns dotted field paths into validated, access-checked references and
//! assembles them into a canonical query string with deterministic field
//! ordering.
//!
//! # Invariants
//!
//! - A `FieldRef` is never empty and is immutable once constructed
//! - Non-terminal path segments must be single-target relationships
//! - Existence is checked before access: renames surface ahead of permissions
//! - Rendering never mutates the builder
//! - Selected fields are a set; ordering clauses are a list (duplicates kept)
//! - Sub-queries nest exactly one level, enforced by construction

mod builder;
mod errors;
mod field_ref;
mod ordering;

pub use builder::QueryBuilder;
pub use errors::{QueryError, QueryResult};
pub use field_ref::FieldRef;
pub use ordering::{OrderClause, SortDirection};
