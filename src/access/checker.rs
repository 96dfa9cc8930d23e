//! Read-access checker implementations.
//!
//! The query layer consumes [`AccessChecker`] only; which policy backs it is
//! the application's business. [`PolicyChecker`] covers the common case of
//! explicit deny lists plus the per-field `readable` flag, with a global
//! bypass for privileged internal contexts.

use std::collections::HashSet;

use crate::schema::FieldHandle;

use super::errors::{AccessError, AccessResult};

/// Read-access policy consulted during field resolution and query rendering
pub trait AccessChecker {
    /// Fails when the caller may not read the given field
    fn check_field_readable(&self, object: &str, field: &FieldHandle) -> AccessResult;

    /// Fails when the caller may not read the given record type at all
    fn check_object_readable(&self, object: &str) -> AccessResult;
}

/// A checker that permits everything
#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAll;

impl AccessChecker for AllowAll {
    fn check_field_readable(&self, _object: &str, _field: &FieldHandle) -> AccessResult {
        Ok(())
    }

    fn check_object_readable(&self, _object: &str) -> AccessResult {
        Ok(())
    }
}

/// A checker backed by explicit deny lists and schema `readable` flags.
///
/// With `bypass` set, every check passes regardless of policy. Intended for
/// privileged internal contexts that must read past the caller's grants.
#[derive(Debug, Default)]
pub struct PolicyChecker {
    hidden_objects: HashSet<String>,
    hidden_fields: HashSet<(String, String)>,
    bypass: bool,
}

impl PolicyChecker {
    /// Create a checker that denies nothing beyond schema flags
    pub fn new() -> Self {
        Self::default()
    }

    /// Deny object-level reads on a record type
    pub fn hide_object(&mut self, object: impl Into<String>) {
        self.hidden_objects.insert(object.into());
    }

    /// Deny field-level reads on one field of a record type
    pub fn hide_field(&mut self, object: impl Into<String>, field: impl Into<String>) {
        self.hidden_fields.insert((object.into(), field.into()));
    }

    /// Suppress all checks
    pub fn set_bypass(&mut self, bypass: bool) {
        self.bypass = bypass;
    }
}

impl AccessChecker for PolicyChecker {
    fn check_field_readable(&self, object: &str, field: &FieldHandle) -> AccessResult {
        if self.bypass {
            return Ok(());
        }
        let denied = !field.readable
            || self
                .hidden_fields
                .contains(&(object.to_string(), field.name.clone()));
        if denied {
            return Err(AccessError::FieldNotReadable {
                object: object.to_string(),
                field: field.name.clone(),
            });
        }
        Ok(())
    }

    fn check_object_readable(&self, object: &str) -> AccessResult {
        if self.bypass {
            return Ok(());
        }
        if self.hidden_objects.contains(object) {
            return Err(AccessError::ObjectNotReadable {
                object: object.to_string(),
            });
        }
        Ok(())
    }
}
