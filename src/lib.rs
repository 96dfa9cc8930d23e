//! recordflow - schema-aware query building and unit-of-work persistence
//! for record stores
//!
//! Two cooperating subsystems over a schema-described, permission-gated
//! record store: a dynamic query builder that resolves dotted field paths
//! (including relationship hops) into validated references and renders a
//! canonical query string, and a unit-of-work coordinator that batches
//! record creations, updates, and deletions across types and commits them
//! in dependency order inside one rollback-capable transaction.
//!
//! The store itself is a collaborator behind [`engine::ExecutionEngine`];
//! schema metadata comes from [`schema::SchemaCatalog`]; read-access policy
//! from [`access::AccessChecker`]. Execution is single-threaded and
//! synchronous throughout: callers serialize access to each instance.

pub mod access;
pub mod engine;
pub mod query;
pub mod schema;
pub mod selector;
pub mod uow;
