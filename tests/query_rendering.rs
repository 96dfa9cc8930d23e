//! Query Rendering Invariant Tests
//!
//! Properties of the builder's canonical serialization:
//! - Rendering is deterministic and never mutates the builder
//! - The sort flag makes field order insertion-independent
//! - An empty selection renders the identifier field alone
//! - Sub-query instances are stable across repeat calls
//! - Clauses are omitted entirely when unset

use std::rc::Rc;

use recordflow::access::{AllowAll, PolicyChecker};
use recordflow::query::{QueryBuilder, QueryError, SortDirection};
use recordflow::schema::{ChildRelationship, FieldHandle, InMemoryCatalog, ObjectType};

// =============================================================================
// Helper Functions
// =============================================================================

fn sales_catalog() -> Rc<InMemoryCatalog> {
    let mut catalog = InMemoryCatalog::new();
    catalog.register(
        ObjectType::new("Order")
            .with_field(FieldHandle::text("Name"))
            .with_field(FieldHandle::currency("Amount"))
            .with_field(FieldHandle::reference("AccountId", "Account"))
            .with_child(ChildRelationship::new("Items", "OrderItem")),
    );
    catalog.register(ObjectType::new("Account").with_field(FieldHandle::text("Name")));
    catalog.register(
        ObjectType::new("OrderItem")
            .with_field(FieldHandle::number("Quantity"))
            .with_field(FieldHandle::currency("UnitPrice")),
    );
    Rc::new(catalog)
}

fn order_builder() -> QueryBuilder {
    QueryBuilder::new(sales_catalog(), Rc::new(AllowAll), "Order").unwrap()
}

// =============================================================================
// Determinism
// =============================================================================

/// Re-rendering an unchanged builder yields an identical string.
#[test]
fn test_render_is_repeatable() {
    let mut builder = order_builder();
    builder
        .select_fields(["Name", "Amount"])
        .unwrap()
        .set_condition("Amount > 100")
        .set_limit(10);
    let first = builder.render().unwrap();
    for _ in 0..10 {
        assert_eq!(builder.render().unwrap(), first);
    }
}

/// With the sort flag, insertion order stops mattering.
#[test]
fn test_sorted_rendering_is_insertion_independent() {
    let mut forward = order_builder();
    forward.set_sort_selected(true);
    forward.select_fields(["Name", "Amount", "AccountId.Name"]).unwrap();

    let mut reversed = order_builder();
    reversed.set_sort_selected(true);
    reversed.select_fields(["AccountId.Name", "Amount", "Name"]).unwrap();

    assert_eq!(forward.render().unwrap(), reversed.render().unwrap());
}

/// Without the sort flag, insertion order is the rendered order.
#[test]
fn test_unsorted_rendering_is_insertion_ordered() {
    let mut forward = order_builder();
    forward.select_fields(["Name", "Amount"]).unwrap();
    let mut reversed = order_builder();
    reversed.select_fields(["Amount", "Name"]).unwrap();

    assert_eq!(forward.render().unwrap(), "SELECT Name, Amount FROM Order");
    assert_eq!(reversed.render().unwrap(), "SELECT Amount, Name FROM Order");
}

// =============================================================================
// Clause Assembly
// =============================================================================

/// The worked example: sorted fields, descending ordering, limit, no WHERE.
#[test]
fn test_full_clause_example() {
    let mut builder = order_builder();
    builder.set_sort_selected(true);
    builder
        .select_fields(["Name", "Amount"])
        .unwrap()
        .add_ordering("Amount", SortDirection::Descending, false)
        .unwrap()
        .set_limit(10);
    assert_eq!(
        builder.render().unwrap(),
        "SELECT Amount, Name FROM Order ORDER BY Amount DESC NULLS FIRST LIMIT 10"
    );
}

#[test]
fn test_where_clause_rendered_when_set() {
    let mut builder = order_builder();
    builder.select_field("Name").unwrap().set_condition("Amount > 100");
    assert_eq!(
        builder.render().unwrap(),
        "SELECT Name FROM Order WHERE Amount > 100"
    );
}

#[test]
fn test_multiple_orderings_render_in_call_order() {
    let mut builder = order_builder();
    builder
        .select_field("Name")
        .unwrap()
        .add_ordering("Amount", SortDirection::Descending, false)
        .unwrap()
        .add_ordering("Name", SortDirection::Ascending, true)
        .unwrap();
    assert_eq!(
        builder.render().unwrap(),
        "SELECT Name FROM Order ORDER BY Amount DESC NULLS FIRST, Name ASC NULLS LAST"
    );
}

/// Selecting zero fields renders exactly the identifier field alone.
#[test]
fn test_empty_selection_identifier_fallback() {
    let builder = order_builder();
    assert_eq!(builder.render().unwrap(), "SELECT Id FROM Order");
}

/// The identifier fallback is still subject to field-level security.
#[test]
fn test_identifier_fallback_access_checked() {
    let mut checker = PolicyChecker::new();
    checker.hide_field("Order", "Id");
    let mut builder = QueryBuilder::new(sales_catalog(), Rc::new(checker), "Order").unwrap();
    builder.set_enforce_security(true);
    let err = builder.render().unwrap_err();
    assert!(matches!(err, QueryError::AccessDenied(_)));
}

// =============================================================================
// Sub-Queries
// =============================================================================

/// Repeat calls return the same child; mutation through one call site is
/// visible through the other.
#[test]
fn test_sub_query_instance_stability() {
    let mut builder = order_builder();
    builder
        .sub_query("Items")
        .unwrap()
        .select_field("Quantity")
        .unwrap();
    builder
        .sub_query("Items")
        .unwrap()
        .select_field("UnitPrice")
        .unwrap();

    assert_eq!(builder.sub_query("Items").unwrap().selected().len(), 2);
    assert_eq!(
        builder.render().unwrap(),
        "SELECT Id, (SELECT Quantity, UnitPrice FROM Items) FROM Order"
    );
}

#[test]
fn test_unknown_relationship_rejected() {
    let mut builder = order_builder();
    let err = builder.sub_query("Widgets").unwrap_err();
    assert!(matches!(err, QueryError::InvalidRelationship { .. }));
}

/// One nesting level is the structural limit.
#[test]
fn test_sub_query_cannot_nest() {
    let mut builder = order_builder();
    let child = builder.sub_query("Items").unwrap();
    assert!(child.sub_query("Items").is_err());
}

/// A deep clone carries the sub-query tree but shares nothing afterward.
#[test]
fn test_deep_clone_independence() {
    let mut original = order_builder();
    original.select_field("Name").unwrap();
    original
        .sub_query("Items")
        .unwrap()
        .select_field("Quantity")
        .unwrap();

    let mut copy = original.deep_clone();
    assert_eq!(copy.render().unwrap(), original.render().unwrap());

    copy.sub_query("Items")
        .unwrap()
        .select_field("UnitPrice")
        .unwrap();
    assert_ne!(copy.render().unwrap(), original.render().unwrap());
}

// =============================================================================
// Builder Equality
// =============================================================================

/// Equality is observable output, not internal structure.
#[test]
fn test_equality_by_rendered_output() {
    let mut a = order_builder();
    let mut b = order_builder();
    a.set_sort_selected(true);
    b.set_sort_selected(true);
    a.select_fields(["Name", "Amount"]).unwrap();
    b.select_fields(["Amount", "Name"]).unwrap();
    assert_eq!(a, b);

    b.set_limit(1);
    assert_ne!(a, b);
}
