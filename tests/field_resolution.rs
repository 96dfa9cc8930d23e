//! Field Resolution Invariant Tests
//!
//! Properties of dotted-path resolution:
//! - One rendered segment per hop, relationship hops rewritten by the
//!   suffix rule
//! - Existence is checked before access (renames surface ahead of
//!   permissions)
//! - Non-terminal segments must be single-target relationships
//! - Errors name the offending record type and field

use recordflow::access::{AccessError, AllowAll, PolicyChecker};
use recordflow::query::{FieldRef, QueryError};
use recordflow::schema::{FieldHandle, InMemoryCatalog, ObjectType};

// =============================================================================
// Helper Functions
// =============================================================================

fn sales_catalog() -> InMemoryCatalog {
    let mut catalog = InMemoryCatalog::new();
    catalog.register(
        ObjectType::new("Order")
            .with_field(FieldHandle::text("Name"))
            .with_field(FieldHandle::currency("Amount"))
            .with_field(FieldHandle::reference("AccountId", "Account"))
            .with_field(FieldHandle::reference("Distributor__c", "Distributor"))
            .with_field(FieldHandle::polymorphic("OwnerId")),
    );
    catalog.register(
        ObjectType::new("Account")
            .with_field(FieldHandle::text("Name"))
            .with_field(FieldHandle::reference("ParentId", "Account")),
    );
    catalog.register(ObjectType::new("Distributor").with_field(FieldHandle::text("Region")));
    catalog
}

// =============================================================================
// Round-Trip Rendering
// =============================================================================

/// Each hop contributes exactly one `.`-joined segment.
#[test]
fn test_segment_count_matches_hops() {
    let catalog = sales_catalog();
    for (path, expected) in [
        ("Amount", "Amount"),
        ("AccountId.Name", "Account.Name"),
        ("AccountId.ParentId.ParentId.Name", "Account.Parent.Parent.Name"),
    ] {
        let fref = FieldRef::resolve(&catalog, &AllowAll, "Order", path, false).unwrap();
        assert_eq!(fref.rendered(), expected);
        assert_eq!(fref.len(), path.split('.').count());
    }
}

/// Custom-suffix relationships rewrite `__c` to `__r` when traversed.
#[test]
fn test_custom_suffix_rewrite() {
    let catalog = sales_catalog();
    let fref =
        FieldRef::resolve(&catalog, &AllowAll, "Order", "Distributor__c.Region", false).unwrap();
    assert_eq!(fref.rendered(), "Distributor__r.Region");
}

/// A traversed field selected terminally keeps its plain name.
#[test]
fn test_terminal_reference_keeps_plain_name() {
    let catalog = sales_catalog();
    let fref = FieldRef::resolve(&catalog, &AllowAll, "Order", "AccountId", false).unwrap();
    assert_eq!(fref.rendered(), "AccountId");
}

// =============================================================================
// Error Taxonomy
// =============================================================================

#[test]
fn test_unknown_root_type() {
    let catalog = sales_catalog();
    let err = FieldRef::resolve(&catalog, &AllowAll, "Invoice", "Amount", false).unwrap_err();
    assert_eq!(err, QueryError::UnknownObject("Invoice".to_string()));
}

#[test]
fn test_unknown_field_names_current_type() {
    let catalog = sales_catalog();
    let err = FieldRef::resolve(&catalog, &AllowAll, "Order", "AccountId.Budget", false)
        .unwrap_err();
    assert_eq!(
        err,
        QueryError::UnknownField {
            object: "Account".to_string(),
            field: "Budget".to_string(),
        }
    );
}

#[test]
fn test_scalar_hop_rejected() {
    let catalog = sales_catalog();
    let err = FieldRef::resolve(&catalog, &AllowAll, "Order", "Amount.Value", false).unwrap_err();
    assert_eq!(
        err,
        QueryError::NotARelationship {
            object: "Order".to_string(),
            field: "Amount".to_string(),
        }
    );
}

/// Polymorphic references have no single target and cannot be traversed.
#[test]
fn test_polymorphic_hop_rejected() {
    let catalog = sales_catalog();
    let err = FieldRef::resolve(&catalog, &AllowAll, "Order", "OwnerId.Name", false).unwrap_err();
    assert_eq!(
        err,
        QueryError::NotARelationship {
            object: "Order".to_string(),
            field: "OwnerId".to_string(),
        }
    );
}

// =============================================================================
// Access Enforcement
// =============================================================================

/// A hidden but nonexistent field reports UnknownField, not AccessDenied.
#[test]
fn test_existence_precedes_access() {
    let catalog = sales_catalog();
    let mut checker = PolicyChecker::new();
    checker.hide_field("Order", "Budget");
    let err = FieldRef::resolve(&catalog, &checker, "Order", "Budget", true).unwrap_err();
    assert!(matches!(err, QueryError::UnknownField { .. }));
}

/// Every traversed field is access-checked, not just the terminal one.
#[test]
fn test_intermediate_hop_access_denied() {
    let catalog = sales_catalog();
    let mut checker = PolicyChecker::new();
    checker.hide_field("Order", "AccountId");
    let err = FieldRef::resolve(&catalog, &checker, "Order", "AccountId.Name", true).unwrap_err();
    assert_eq!(
        err,
        QueryError::AccessDenied(AccessError::FieldNotReadable {
            object: "Order".to_string(),
            field: "AccountId".to_string(),
        })
    );
}

/// Without enforcement the same denied path resolves.
#[test]
fn test_enforcement_flag_gates_checks() {
    let catalog = sales_catalog();
    let mut checker = PolicyChecker::new();
    checker.hide_field("Order", "AccountId");
    assert!(FieldRef::resolve(&catalog, &checker, "Order", "AccountId.Name", false).is_ok());
}

/// The bypass flag suppresses field checks even under enforcement.
#[test]
fn test_bypass_overrides_enforcement() {
    let catalog = sales_catalog();
    let mut checker = PolicyChecker::new();
    checker.hide_field("Order", "AccountId");
    checker.set_bypass(true);
    assert!(FieldRef::resolve(&catalog, &checker, "Order", "AccountId.Name", true).is_ok());
}

// =============================================================================
// Structural Ordering
// =============================================================================

/// Shorter paths sort before longer; equal lengths compare lexically.
#[test]
fn test_structural_order() {
    let catalog = sales_catalog();
    let resolve = |path: &str| FieldRef::resolve(&catalog, &AllowAll, "Order", path, false).unwrap();

    let mut refs = vec![
        resolve("AccountId.ParentId.Name"),
        resolve("Name"),
        resolve("AccountId.Name"),
        resolve("Amount"),
    ];
    refs.sort();
    let rendered: Vec<&str> = refs.iter().map(|r| r.rendered()).collect();
    assert_eq!(
        rendered,
        ["Amount", "Name", "Account.Name", "Account.Parent.Name"]
    );
}
