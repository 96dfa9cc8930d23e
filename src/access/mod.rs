//! Read-access policy subsystem for recordflow
//!
//! Answers "may the caller read this field / this record type" as a typed
//! result, so the query layer can distinguish access denial from a missing
//! field without string matching.
//!
//! # Invariants
//!
//! - Checks are pure: a checker never mutates state while answering
//! - Denials always carry the offending object (and field) by name
//! - The bypass flag suppresses policy wholesale, for privileged contexts

mod checker;
mod errors;

pub use checker::{AccessChecker, AllowAll, PolicyChecker};
pub use errors::{AccessError, AccessResult};
