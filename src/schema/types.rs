//! Schema metadata types for the record catalog.
//!
//! A record type is described by an [`ObjectType`]: an ordered set of
//! [`FieldHandle`]s plus the child relationships that other record types
//! declare back to it. Handles carry the per-field access flags the query
//! layer consults when field-level security is enforced.

use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

fn default_id_field() -> String {
    "Id".to_string()
}

fn default_created_date_field() -> String {
    "CreatedDate".to_string()
}

/// Supported field data types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// UTF-8 text
    Text,
    /// Numeric value
    Number,
    /// Boolean
    Boolean,
    /// Point in time
    DateTime,
    /// Currency amount
    Currency,
    /// Foreign key to another record type
    Reference,
}

impl FieldType {
    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::DateTime => "datetime",
            FieldType::Currency => "currency",
            FieldType::Reference => "reference",
        }
    }
}

/// Metadata for one field of a record type.
///
/// A `Reference` field with `reference_to: Some(..)` is a single-target
/// relationship and may be traversed in a dotted field path. A `Reference`
/// field with `reference_to: None` models a polymorphic foreign key: it can
/// be selected as a terminal field but never traversed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldHandle {
    /// Field name as selected and rendered
    pub name: String,
    /// Field data type
    pub field_type: FieldType,
    /// Relationship target type, when this is a single-target reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_to: Option<String>,
    /// Explicit relationship traversal name, overriding the suffix rule
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship_name: Option<String>,
    /// Whether the current caller may read this field
    #[serde(default = "default_true")]
    pub readable: bool,
    /// Whether the current caller may set this field on insert
    #[serde(default = "default_true")]
    pub creatable: bool,
    /// Whether the current caller may set this field on update
    #[serde(default = "default_true")]
    pub updatable: bool,
}

impl FieldHandle {
    fn with_type(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            reference_to: None,
            relationship_name: None,
            readable: true,
            creatable: true,
            updatable: true,
        }
    }

    /// Create a text field
    pub fn text(name: impl Into<String>) -> Self {
        Self::with_type(name, FieldType::Text)
    }

    /// Create a numeric field
    pub fn number(name: impl Into<String>) -> Self {
        Self::with_type(name, FieldType::Number)
    }

    /// Create a boolean field
    pub fn boolean(name: impl Into<String>) -> Self {
        Self::with_type(name, FieldType::Boolean)
    }

    /// Create a datetime field
    pub fn datetime(name: impl Into<String>) -> Self {
        Self::with_type(name, FieldType::DateTime)
    }

    /// Create a currency field
    pub fn currency(name: impl Into<String>) -> Self {
        Self::with_type(name, FieldType::Currency)
    }

    /// Create a single-target reference field
    pub fn reference(name: impl Into<String>, target: impl Into<String>) -> Self {
        let mut handle = Self::with_type(name, FieldType::Reference);
        handle.reference_to = Some(target.into());
        handle
    }

    /// Create a polymorphic reference field (no single target type)
    pub fn polymorphic(name: impl Into<String>) -> Self {
        Self::with_type(name, FieldType::Reference)
    }

    /// Marks the field unreadable for the current caller
    pub fn unreadable(mut self) -> Self {
        self.readable = false;
        self
    }

    /// Sets an explicit relationship traversal name
    pub fn with_relationship_name(mut self, name: impl Into<String>) -> Self {
        self.relationship_name = Some(name.into());
        self
    }

    /// Returns true if this field is a foreign key
    pub fn is_reference(&self) -> bool {
        self.field_type == FieldType::Reference
    }

    /// Relationship target type, present only for single-target references
    pub fn target_type(&self) -> Option<&str> {
        if self.is_reference() {
            self.reference_to.as_deref()
        } else {
            None
        }
    }

    /// The name used when this field is traversed as a relationship hop.
    ///
    /// An explicit `relationship_name` wins. Otherwise the conventional
    /// suffix rule applies: a trailing `__c` is rewritten to `__r`, else a
    /// trailing `Id` is stripped. Keeps the rendered path syntactically
    /// valid for relationship traversal in the query language.
    pub fn relationship_path(&self) -> String {
        if let Some(rel) = &self.relationship_name {
            return rel.clone();
        }
        if let Some(stem) = self.name.strip_suffix("__c") {
            return format!("{stem}__r");
        }
        if let Some(stem) = self.name.strip_suffix("Id") {
            if !stem.is_empty() {
                return stem.to_string();
            }
        }
        self.name.clone()
    }
}

/// A one-to-many relationship from a parent record type to a child type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildRelationship {
    /// Relationship name, as used in sub-queries
    pub name: String,
    /// Child record type
    pub child_type: String,
}

impl ChildRelationship {
    /// Create a child relationship
    pub fn new(name: impl Into<String>, child_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            child_type: child_type.into(),
        }
    }
}

/// An externally defined named group of field paths for one record type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSet {
    /// Field set name
    pub name: String,
    /// Record type the set belongs to
    pub object_type: String,
    /// Member field paths (may cross relationships with `.`)
    pub paths: Vec<String>,
}

impl FieldSet {
    /// Create a field set
    pub fn new(
        name: impl Into<String>,
        object_type: impl Into<String>,
        paths: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            object_type: object_type.into(),
            paths,
        }
    }
}

/// Describe metadata for one record type.
///
/// Fields keep declaration order; lookup is by exact name. The identifier
/// field is always present: `new` seeds it as a readable text field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectType {
    /// Record type name
    pub name: String,
    /// Field handles in declaration order
    pub fields: Vec<FieldHandle>,
    /// One-to-many relationships to child record types
    #[serde(default)]
    pub child_relationships: Vec<ChildRelationship>,
    /// Identifier field name
    #[serde(default = "default_id_field")]
    pub id_field: String,
    /// Designated display-name field, if the type declares one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_field: Option<String>,
    /// Creation-timestamp field name
    #[serde(default = "default_created_date_field")]
    pub created_date_field: String,
}

impl ObjectType {
    /// Create a describe with the identifier field pre-seeded
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: vec![FieldHandle::text(default_id_field())],
            child_relationships: Vec::new(),
            id_field: default_id_field(),
            name_field: None,
            created_date_field: default_created_date_field(),
        }
    }

    /// Add a field (builder style)
    pub fn with_field(mut self, field: FieldHandle) -> Self {
        self.fields.push(field);
        self
    }

    /// Add a child relationship (builder style)
    pub fn with_child(mut self, child: ChildRelationship) -> Self {
        self.child_relationships.push(child);
        self
    }

    /// Declare the display-name field (builder style)
    pub fn with_name_field(mut self, field: impl Into<String>) -> Self {
        self.name_field = Some(field.into());
        self
    }

    /// Look up a field handle by exact name
    pub fn field(&self, name: &str) -> Option<&FieldHandle> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Look up a child relationship by exact name
    pub fn child_relationship(&self, name: &str) -> Option<&ChildRelationship> {
        self.child_relationships.iter().find(|r| r.name == name)
    }

    /// The identifier field's handle, when declared
    pub fn id_handle(&self) -> Option<&FieldHandle> {
        self.field(&self.id_field)
    }
}
