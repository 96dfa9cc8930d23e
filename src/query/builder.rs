//! Dynamic query builder.
//!
//! Accumulates validated field references, an opaque condition, ordering,
//! paging, and one level of nested sub-queries, then renders the canonical
//! query string. All mutators fail fast: a call that errors leaves the
//! builder exactly as it was.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::access::AccessChecker;
use crate::schema::{FieldHandle, FieldSet, ObjectType, SchemaCatalog};

use super::errors::{QueryError, QueryResult};
use super::field_ref::FieldRef;
use super::ordering::{OrderClause, SortDirection};

/// A query under construction against one record type.
///
/// Mutators return the builder for chaining (`?` on the fallible ones).
/// Rendering never mutates state, so a builder may be rendered, further
/// configured, and rendered again.
#[derive(Clone)]
pub struct QueryBuilder {
    catalog: Rc<dyn SchemaCatalog>,
    checker: Rc<dyn AccessChecker>,
    describe: Rc<ObjectType>,
    /// Set when this builder is a sub-query of a parent
    relationship: Option<String>,
    /// Selected fields; set semantics, insertion order preserved
    fields: Vec<FieldRef>,
    condition: Option<String>,
    /// Ordering clauses in call order. Deliberately NOT deduplicated,
    /// unlike the field set; duplicate orderings are the caller's to avoid.
    orderings: Vec<OrderClause>,
    limit: Option<usize>,
    sub_queries: BTreeMap<String, QueryBuilder>,
    enforce_security: bool,
    sort_selected: bool,
}

impl QueryBuilder {
    /// Create a builder for a record type.
    ///
    /// Fails with [`QueryError::UnknownObject`] when the catalog has no
    /// describe for the type.
    pub fn new(
        catalog: Rc<dyn SchemaCatalog>,
        checker: Rc<dyn AccessChecker>,
        record_type: &str,
    ) -> QueryResult<Self> {
        let describe = catalog
            .object_type(record_type)
            .ok_or_else(|| QueryError::UnknownObject(record_type.to_string()))?;
        Ok(Self {
            catalog,
            checker,
            describe,
            relationship: None,
            fields: Vec::new(),
            condition: None,
            orderings: Vec::new(),
            limit: None,
            sub_queries: BTreeMap::new(),
            enforce_security: false,
            sort_selected: false,
        })
    }

    /// The record type this builder targets
    pub fn record_type(&self) -> &str {
        &self.describe.name
    }

    /// The relationship name, when this builder is a sub-query
    pub fn relationship(&self) -> Option<&str> {
        self.relationship.as_deref()
    }

    /// Enable or disable field-level security on subsequent resolution and
    /// on rendering's identifier fallback
    pub fn set_enforce_security(&mut self, enforce: bool) -> &mut Self {
        self.enforce_security = enforce;
        self
    }

    /// Whether field-level security is enforced
    pub fn enforces_security(&self) -> bool {
        self.enforce_security
    }

    /// Render selected fields in structural order instead of insertion order
    pub fn set_sort_selected(&mut self, sort: bool) -> &mut Self {
        self.sort_selected = sort;
        self
    }

    /// Whether selected fields render in structural order
    pub fn sorts_selected(&self) -> bool {
        self.sort_selected
    }

    /// Resolve a dotted field path and add it to the selection.
    ///
    /// Idempotent: structurally equal references collapse.
    pub fn select_field(&mut self, path: &str) -> QueryResult<&mut Self> {
        let fref = FieldRef::resolve(
            self.catalog.as_ref(),
            self.checker.as_ref(),
            &self.describe.name,
            path,
            self.enforce_security,
        )?;
        self.insert_field(fref);
        Ok(self)
    }

    /// Resolve a direct schema handle and add it to the selection
    pub fn select_handle(&mut self, handle: &FieldHandle) -> QueryResult<&mut Self> {
        let fref = FieldRef::from_handle(
            self.checker.as_ref(),
            &self.describe.name,
            handle,
            self.enforce_security,
        )?;
        self.insert_field(fref);
        Ok(self)
    }

    /// Resolve and add every path in the collection.
    ///
    /// Fails without partial mutation: either every path resolves or the
    /// selection is untouched.
    pub fn select_fields<I, S>(&mut self, paths: I) -> QueryResult<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut resolved = Vec::new();
        for path in paths {
            resolved.push(FieldRef::resolve(
                self.catalog.as_ref(),
                self.checker.as_ref(),
                &self.describe.name,
                path.as_ref(),
                self.enforce_security,
            )?);
        }
        for fref in resolved {
            self.insert_field(fref);
        }
        Ok(self)
    }

    /// Expand a named field set into the selection.
    ///
    /// Fails with [`QueryError::InvalidFieldSet`] when the set belongs to a
    /// different record type, or when `allow_cross_object` is false and a
    /// member path crosses a relationship. No partial mutation on failure.
    pub fn select_field_set(
        &mut self,
        field_set: &FieldSet,
        allow_cross_object: bool,
    ) -> QueryResult<&mut Self> {
        if field_set.object_type != self.describe.name {
            return Err(QueryError::InvalidFieldSet {
                field_set: field_set.name.clone(),
                object: self.describe.name.clone(),
                reason: format!("field set belongs to record type '{}'", field_set.object_type),
            });
        }
        let mut resolved = Vec::new();
        for path in &field_set.paths {
            if !allow_cross_object && path.contains('.') {
                return Err(QueryError::InvalidFieldSet {
                    field_set: field_set.name.clone(),
                    object: self.describe.name.clone(),
                    reason: format!("member path '{path}' crosses a relationship"),
                });
            }
            resolved.push(FieldRef::resolve(
                self.catalog.as_ref(),
                self.checker.as_ref(),
                &self.describe.name,
                path,
                self.enforce_security,
            )?);
        }
        for fref in resolved {
            self.insert_field(fref);
        }
        Ok(self)
    }

    /// Currently selected fields, in insertion order
    pub fn selected(&self) -> &[FieldRef] {
        &self.fields
    }

    /// Set the opaque filter expression rendered after `WHERE`
    pub fn set_condition(&mut self, expr: impl Into<String>) -> &mut Self {
        self.condition = Some(expr.into());
        self
    }

    /// The filter expression, if set
    pub fn condition(&self) -> Option<&str> {
        self.condition.as_deref()
    }

    /// Set the row limit
    pub fn set_limit(&mut self, limit: usize) -> &mut Self {
        self.limit = Some(limit);
        self
    }

    /// The row limit, if set
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Append an ordering clause; clauses render in call order and repeat
    /// calls for the same field are kept as-is
    pub fn add_ordering(
        &mut self,
        path: &str,
        direction: SortDirection,
        nulls_last: bool,
    ) -> QueryResult<&mut Self> {
        let fref = FieldRef::resolve(
            self.catalog.as_ref(),
            self.checker.as_ref(),
            &self.describe.name,
            path,
            self.enforce_security,
        )?;
        self.orderings.push(OrderClause::new(fref, direction, nulls_last));
        Ok(self)
    }

    /// Ordering clauses in call order
    pub fn orderings(&self) -> &[OrderClause] {
        &self.orderings
    }

    /// Fails when the target record type is not readable; otherwise a no-op
    /// pass-through for chaining
    pub fn assert_accessible(&mut self) -> QueryResult<&mut Self> {
        self.checker.check_object_readable(&self.describe.name)?;
        Ok(self)
    }

    /// The cached or newly created child builder for a one-to-many
    /// relationship.
    ///
    /// One nesting level is the structural limit: calling this on a builder
    /// that is itself a sub-query fails with
    /// [`QueryError::InvalidRelationship`], as does an unknown relationship
    /// name. Repeat calls return the same child, so configuration through
    /// either call site is visible to both.
    pub fn sub_query(&mut self, relationship: &str) -> QueryResult<&mut QueryBuilder> {
        if self.relationship.is_some() {
            return Err(QueryError::InvalidRelationship {
                object: self.describe.name.clone(),
                relationship: relationship.to_string(),
                reason: "sub-queries cannot register further sub-queries".to_string(),
            });
        }
        match self.sub_queries.entry(relationship.to_string()) {
            Entry::Occupied(occupied) => Ok(occupied.into_mut()),
            Entry::Vacant(vacant) => {
                let child_rel = self
                    .describe
                    .child_relationship(relationship)
                    .ok_or_else(|| QueryError::InvalidRelationship {
                        object: self.describe.name.clone(),
                        relationship: relationship.to_string(),
                        reason: "no such child relationship".to_string(),
                    })?;
                let mut child = QueryBuilder::new(
                    self.catalog.clone(),
                    self.checker.clone(),
                    &child_rel.child_type,
                )?;
                child.relationship = Some(child_rel.name.clone());
                child.enforce_security = self.enforce_security;
                child.sort_selected = self.sort_selected;
                Ok(vacant.insert(child))
            }
        }
    }

    /// Like [`sub_query`](Self::sub_query), additionally asserting the child
    /// record type is readable
    pub fn sub_query_checked(&mut self, relationship: &str) -> QueryResult<&mut QueryBuilder> {
        let child = self.sub_query(relationship)?;
        child.assert_accessible()?;
        Ok(child)
    }

    /// An independent structural copy, sub-queries included
    pub fn deep_clone(&self) -> QueryBuilder {
        self.clone()
    }

    /// Render the canonical query string.
    ///
    /// Deterministic for a given configuration: with `sort_selected` the
    /// field list renders in structural order (shorter paths first, then
    /// lexical); otherwise in insertion order. An empty selection falls back
    /// to the identifier field alone. Sub-queries render recursively in
    /// parentheses after the field list. `WHERE`, `ORDER BY`, and `LIMIT`
    /// are each omitted entirely when unset.
    pub fn render(&self) -> QueryResult<String> {
        let mut parts = self.rendered_field_list()?;
        for child in self.sub_queries.values() {
            parts.push(format!("({})", child.render()?));
        }

        let source = self.relationship.as_deref().unwrap_or(&self.describe.name);
        let mut query = format!("SELECT {} FROM {}", parts.join(", "), source);

        if let Some(condition) = &self.condition {
            query.push_str(" WHERE ");
            query.push_str(condition);
        }
        if !self.orderings.is_empty() {
            let clauses: Vec<String> = self.orderings.iter().map(OrderClause::render).collect();
            query.push_str(" ORDER BY ");
            query.push_str(&clauses.join(", "));
        }
        if let Some(limit) = self.limit {
            query.push_str(" LIMIT ");
            query.push_str(&limit.to_string());
        }

        tracing::debug!(record_type = %self.describe.name, query = %query, "query rendered");
        Ok(query)
    }

    fn insert_field(&mut self, fref: FieldRef) {
        if !self.fields.contains(&fref) {
            self.fields.push(fref);
        }
    }

    fn rendered_field_list(&self) -> QueryResult<Vec<String>> {
        if self.fields.is_empty() {
            let name = match self.describe.id_handle() {
                Some(handle) => {
                    if self.enforce_security {
                        self.checker
                            .check_field_readable(&self.describe.name, handle)?;
                    }
                    handle.name.clone()
                }
                None => self.describe.id_field.clone(),
            };
            return Ok(vec![name]);
        }
        if self.sort_selected {
            let mut sorted = self.fields.clone();
            sorted.sort();
            Ok(sorted.iter().map(|f| f.rendered().to_string()).collect())
        } else {
            Ok(self
                .fields
                .iter()
                .map(|f| f.rendered().to_string())
                .collect())
        }
    }
}

impl std::fmt::Debug for QueryBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryBuilder")
            .field("record_type", &self.describe.name)
            .field("relationship", &self.relationship)
            .field("fields", &self.fields)
            .field("condition", &self.condition)
            .field("orderings", &self.orderings)
            .field("limit", &self.limit)
            .field("sub_queries", &self.sub_queries)
            .field("enforce_security", &self.enforce_security)
            .field("sort_selected", &self.sort_selected)
            .finish()
    }
}

/// Equality in terms of observable output: same target type, same number of
/// selected fields, identical rendered strings.
impl PartialEq for QueryBuilder {
    fn eq(&self, other: &Self) -> bool {
        self.describe.name == other.describe.name
            && self.fields.len() == other.fields.len()
            && self.render().ok() == other.render().ok()
    }
}
