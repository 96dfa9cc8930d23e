//! Resolved field references.
//!
//! A [`FieldRef`] is the validated form of a dotted field path: an ordered,
//! non-empty chain of schema field handles from a root record type to a
//! terminal field, with relationship hops already rewritten to their
//! traversal names. Construction is the only place validation happens; a
//! `FieldRef` in hand is known-good.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::access::AccessChecker;
use crate::schema::{FieldHandle, SchemaCatalog};

use super::errors::{QueryError, QueryResult};

/// A validated, access-checked path of one or more field handles.
///
/// Equality compares the canonical rendered form; ordering compares path
/// length first, then the rendered form. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct FieldRef {
    segments: Vec<FieldHandle>,
    rendered: String,
}

impl FieldRef {
    /// Resolve a dotted field path against the catalog.
    ///
    /// Walks segments left to right. Each segment must name a field on the
    /// current record type (checked before access, so renames surface ahead
    /// of permissions); with `enforce_security` every traversed field must
    /// also pass the checker. Non-terminal segments must be single-target
    /// relationships; the hop re-derives the current type from the field's
    /// target. The terminal segment may be any field type.
    pub fn resolve(
        catalog: &dyn SchemaCatalog,
        checker: &dyn AccessChecker,
        root_type: &str,
        path: &str,
        enforce_security: bool,
    ) -> QueryResult<Self> {
        let mut current = catalog
            .object_type(root_type)
            .ok_or_else(|| QueryError::UnknownObject(root_type.to_string()))?;

        let names: Vec<&str> = path.split('.').collect();
        let mut segments = Vec::with_capacity(names.len());
        let mut rendered = Vec::with_capacity(names.len());

        for (position, name) in names.iter().enumerate() {
            let handle = current
                .field(name)
                .ok_or_else(|| QueryError::UnknownField {
                    object: current.name.clone(),
                    field: name.to_string(),
                })?
                .clone();

            if enforce_security {
                checker.check_field_readable(&current.name, &handle)?;
            }

            let terminal = position + 1 == names.len();
            if terminal {
                rendered.push(handle.name.clone());
            } else {
                let target = handle
                    .target_type()
                    .ok_or_else(|| QueryError::NotARelationship {
                        object: current.name.clone(),
                        field: handle.name.clone(),
                    })?
                    .to_string();
                rendered.push(handle.relationship_path());
                current = catalog
                    .object_type(&target)
                    .ok_or(QueryError::UnknownObject(target))?;
            }
            segments.push(handle);
        }

        Ok(Self {
            segments,
            rendered: rendered.join("."),
        })
    }

    /// Resolve a direct schema handle to a single-element reference.
    ///
    /// The same access check applies as for a one-segment path.
    pub fn from_handle(
        checker: &dyn AccessChecker,
        root_type: &str,
        handle: &FieldHandle,
        enforce_security: bool,
    ) -> QueryResult<Self> {
        if enforce_security {
            checker.check_field_readable(root_type, handle)?;
        }
        Ok(Self {
            rendered: handle.name.clone(),
            segments: vec![handle.clone()],
        })
    }

    /// The canonical rendered form: hop names and the terminal field name
    /// joined with `.`
    pub fn rendered(&self) -> &str {
        &self.rendered
    }

    /// Number of path segments (always at least one)
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false: a reference holds at least one segment
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// True when the path crosses at least one relationship
    pub fn is_cross_object(&self) -> bool {
        self.segments.len() > 1
    }

    /// The terminal field's handle
    pub fn terminal(&self) -> &FieldHandle {
        // construction guarantees non-empty
        &self.segments[self.segments.len() - 1]
    }

    /// All traversed handles, root first
    pub fn segments(&self) -> &[FieldHandle] {
        &self.segments
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rendered)
    }
}

// Field names never contain '.', so the rendered form determines both the
// path length and the traversed names; comparing it is structural.
impl PartialEq for FieldRef {
    fn eq(&self, other: &Self) -> bool {
        self.rendered == other.rendered
    }
}

impl Eq for FieldRef {}

impl Hash for FieldRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rendered.hash(state);
    }
}

impl PartialOrd for FieldRef {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FieldRef {
    fn cmp(&self, other: &Self) -> Ordering {
        self.segments
            .len()
            .cmp(&other.segments.len())
            .then_with(|| self.rendered.cmp(&other.rendered))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::{AllowAll, PolicyChecker};
    use crate::schema::{ChildRelationship, InMemoryCatalog, ObjectType};

    fn sample_catalog() -> InMemoryCatalog {
        let mut catalog = InMemoryCatalog::new();
        catalog.register(
            ObjectType::new("Order")
                .with_field(FieldHandle::text("Name"))
                .with_field(FieldHandle::number("Amount"))
                .with_field(FieldHandle::reference("AccountId", "Account"))
                .with_field(FieldHandle::polymorphic("OwnerId"))
                .with_child(ChildRelationship::new("Items", "OrderItem")),
        );
        catalog.register(
            ObjectType::new("Account")
                .with_field(FieldHandle::text("Name"))
                .with_field(FieldHandle::reference("ParentId", "Account")),
        );
        catalog
    }

    #[test]
    fn test_resolve_single_segment() {
        let catalog = sample_catalog();
        let fref = FieldRef::resolve(&catalog, &AllowAll, "Order", "Amount", false).unwrap();
        assert_eq!(fref.rendered(), "Amount");
        assert_eq!(fref.len(), 1);
        assert!(!fref.is_cross_object());
    }

    #[test]
    fn test_resolve_relationship_hop_rewrites_segment() {
        let catalog = sample_catalog();
        let fref =
            FieldRef::resolve(&catalog, &AllowAll, "Order", "AccountId.Name", false).unwrap();
        assert_eq!(fref.rendered(), "Account.Name");
        assert_eq!(fref.len(), 2);
        assert!(fref.is_cross_object());
    }

    #[test]
    fn test_resolve_multi_hop() {
        let catalog = sample_catalog();
        let fref = FieldRef::resolve(
            &catalog,
            &AllowAll,
            "Order",
            "AccountId.ParentId.Name",
            false,
        )
        .unwrap();
        assert_eq!(fref.rendered(), "Account.Parent.Name");
        assert_eq!(fref.len(), 3);
    }

    #[test]
    fn test_unknown_field_names_the_hop_type() {
        let catalog = sample_catalog();
        let err =
            FieldRef::resolve(&catalog, &AllowAll, "Order", "AccountId.Missing", false)
                .unwrap_err();
        assert_eq!(
            err,
            QueryError::UnknownField {
                object: "Account".into(),
                field: "Missing".into()
            }
        );
    }

    #[test]
    fn test_non_relationship_hop_rejected() {
        let catalog = sample_catalog();
        let err = FieldRef::resolve(&catalog, &AllowAll, "Order", "Name.Length", false)
            .unwrap_err();
        assert_eq!(
            err,
            QueryError::NotARelationship {
                object: "Order".into(),
                field: "Name".into()
            }
        );
    }

    #[test]
    fn test_polymorphic_hop_rejected() {
        let catalog = sample_catalog();
        let err = FieldRef::resolve(&catalog, &AllowAll, "Order", "OwnerId.Name", false)
            .unwrap_err();
        assert!(matches!(err, QueryError::NotARelationship { .. }));
    }

    #[test]
    fn test_polymorphic_terminal_accepted() {
        let catalog = sample_catalog();
        let fref = FieldRef::resolve(&catalog, &AllowAll, "Order", "OwnerId", false).unwrap();
        assert_eq!(fref.rendered(), "OwnerId");
    }

    #[test]
    fn test_existence_checked_before_access() {
        let catalog = sample_catalog();
        let mut checker = PolicyChecker::new();
        checker.hide_field("Order", "Missing");
        let err = FieldRef::resolve(&catalog, &checker, "Order", "Missing", true).unwrap_err();
        assert!(matches!(err, QueryError::UnknownField { .. }));
    }

    #[test]
    fn test_access_checked_on_traversed_fields() {
        let catalog = sample_catalog();
        let mut checker = PolicyChecker::new();
        checker.hide_field("Order", "AccountId");
        let err = FieldRef::resolve(&catalog, &checker, "Order", "AccountId.Name", true)
            .unwrap_err();
        assert!(matches!(err, QueryError::AccessDenied(_)));
        // without enforcement the same path resolves
        assert!(FieldRef::resolve(&catalog, &checker, "Order", "AccountId.Name", false).is_ok());
    }

    #[test]
    fn test_ordering_is_length_then_lexical() {
        let catalog = sample_catalog();
        let amount = FieldRef::resolve(&catalog, &AllowAll, "Order", "Amount", false).unwrap();
        let name = FieldRef::resolve(&catalog, &AllowAll, "Order", "Name", false).unwrap();
        let cross =
            FieldRef::resolve(&catalog, &AllowAll, "Order", "AccountId.Name", false).unwrap();

        let mut refs = vec![cross.clone(), name.clone(), amount.clone()];
        refs.sort();
        assert_eq!(refs, vec![amount, name, cross]);
    }

    #[test]
    fn test_from_handle_applies_access_check() {
        let checker = PolicyChecker::new();
        let hidden = FieldHandle::text("Secret").unreadable();
        assert!(FieldRef::from_handle(&checker, "Order", &hidden, true).is_err());
        let fref = FieldRef::from_handle(&checker, "Order", &hidden, false).unwrap();
        assert_eq!(fref.rendered(), "Secret");
    }
}
