//! Record-type metadata subsystem for recordflow
//!
//! Describes what fields and relationships each record type has, and whether
//! the calling context may touch them. Everything downstream (field
//! resolution, query building, selectors) consults this subsystem through
//! the [`SchemaCatalog`] trait only.
//!
//! # Design Principles
//!
//! - Describe metadata is immutable once registered
//! - Lookup is by exact name; misses are `None`, never panics
//! - Caching is explicit and resettable, never implicit global state

mod catalog;
mod types;

pub use catalog::{CachedCatalog, InMemoryCatalog, SchemaCatalog};
pub use types::{ChildRelationship, FieldHandle, FieldSet, FieldType, ObjectType};
