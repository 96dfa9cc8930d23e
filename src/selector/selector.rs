//! Declarative per-record-type query configuration.
//!
//! A [`Selector`] is pure configuration over [`QueryBuilder`]'s public
//! contract: it never resolves fields or checks access itself, it only
//! drives the builder that does.

use std::rc::Rc;

use crate::access::AccessChecker;
use crate::query::{QueryBuilder, QueryError, QueryResult, SortDirection};
use crate::schema::{FieldSet, ObjectType, SchemaCatalog};

/// The per-record currency qualifier field injected on multi-currency
/// deployments
pub const CURRENCY_FIELD: &str = "CurrencyIsoCode";

/// Record types exempt from currency-qualifier injection. These types are
/// stored without a per-record currency column, so selecting the qualifier
/// against them is a store-level error.
pub const CURRENCY_FIELD_EXCLUSIONS: &[&str] = &["AsyncJob", "RecordSnapshot", "SetupAuditEntry"];

/// Declarative configuration for one record type's selector
#[derive(Debug, Clone)]
pub struct SelectorConfig {
    /// Record type this selector serves
    pub object_type: String,
    /// Field paths selected on every builder
    pub default_fields: Vec<String>,
    /// Named field groups optionally folded into the selection
    pub field_sets: Vec<FieldSet>,
    /// Fold `field_sets` into every builder
    pub include_field_sets: bool,
    /// Assert object-level read access when building
    pub enforce_crud: bool,
    /// Enforce field-level read access during resolution
    pub enforce_fls: bool,
    /// Render selected fields in structural order
    pub sort_selected: bool,
}

impl SelectorConfig {
    /// Defaults: object access enforced, field-level security off, sorted
    /// field rendering on, no field sets
    pub fn new(object_type: impl Into<String>) -> Self {
        Self {
            object_type: object_type.into(),
            default_fields: Vec::new(),
            field_sets: Vec::new(),
            include_field_sets: false,
            enforce_crud: true,
            enforce_fls: false,
            sort_selected: true,
        }
    }

    /// Set the default field list (builder style)
    pub fn with_default_fields<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_fields = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Add a field set (builder style)
    pub fn with_field_set(mut self, field_set: FieldSet) -> Self {
        self.field_sets.push(field_set);
        self
    }

    /// Fold field sets into every builder (builder style)
    pub fn including_field_sets(mut self) -> Self {
        self.include_field_sets = true;
        self
    }

    /// Set object-level access enforcement (builder style)
    pub fn enforcing_crud(mut self, enforce: bool) -> Self {
        self.enforce_crud = enforce;
        self
    }

    /// Set field-level access enforcement (builder style)
    pub fn enforcing_fls(mut self, enforce: bool) -> Self {
        self.enforce_fls = enforce;
        self
    }

    /// Set structural-order field rendering (builder style)
    pub fn sorting_selected(mut self, sort: bool) -> Self {
        self.sort_selected = sort;
        self
    }
}

/// Produces pre-configured query builders for one record type
pub struct Selector {
    config: SelectorConfig,
    catalog: Rc<dyn SchemaCatalog>,
    checker: Rc<dyn AccessChecker>,
    describe: Rc<ObjectType>,
    ordering: Option<(String, SortDirection, bool)>,
}

impl Selector {
    /// Create a selector; fails when the configured record type is unknown
    pub fn new(
        config: SelectorConfig,
        catalog: Rc<dyn SchemaCatalog>,
        checker: Rc<dyn AccessChecker>,
    ) -> QueryResult<Self> {
        let describe = catalog
            .object_type(&config.object_type)
            .ok_or_else(|| QueryError::UnknownObject(config.object_type.clone()))?;
        Ok(Self {
            config,
            catalog,
            checker,
            describe,
            ordering: None,
        })
    }

    /// The selector's configuration
    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    /// Override the default ordering for builders this selector produces
    pub fn set_ordering(&mut self, path: impl Into<String>, direction: SortDirection, nulls_last: bool) {
        self.ordering = Some((path.into(), direction, nulls_last));
    }

    /// The ordering candidate used when no override is set: the describe's
    /// designated name field ascending, else its creation-timestamp field.
    /// Builders apply it only when the describe declares that field.
    pub fn default_ordering(&self) -> (String, SortDirection, bool) {
        let path = self
            .describe
            .name_field
            .clone()
            .unwrap_or_else(|| self.describe.created_date_field.clone());
        (path, SortDirection::Ascending, false)
    }

    /// A builder pre-configured with this selector's defaults
    pub fn new_builder(&self) -> QueryResult<QueryBuilder> {
        let mut builder = QueryBuilder::new(
            self.catalog.clone(),
            self.checker.clone(),
            &self.config.object_type,
        )?;
        self.configure(&mut builder)?;
        Ok(builder)
    }

    /// Configure a parent builder's sub-query for a relationship whose
    /// child type this selector serves
    pub fn add_sub_query<'a>(
        &self,
        parent: &'a mut QueryBuilder,
        relationship: &str,
    ) -> QueryResult<&'a mut QueryBuilder> {
        let child = parent.sub_query(relationship)?;
        if child.record_type() != self.config.object_type {
            return Err(QueryError::InvalidRelationship {
                object: child.record_type().to_string(),
                relationship: relationship.to_string(),
                reason: format!(
                    "selector serves record type '{}'",
                    self.config.object_type
                ),
            });
        }
        self.configure(child)?;
        Ok(child)
    }

    fn configure(&self, builder: &mut QueryBuilder) -> QueryResult<()> {
        builder.set_enforce_security(self.config.enforce_fls);
        builder.set_sort_selected(self.config.sort_selected);
        if self.config.enforce_crud {
            builder.assert_accessible()?;
        }
        builder.select_fields(&self.config.default_fields)?;
        if self.config.include_field_sets {
            for field_set in &self.config.field_sets {
                builder.select_field_set(field_set, true)?;
            }
        }
        if self.catalog.is_multi_currency()
            && !CURRENCY_FIELD_EXCLUSIONS.contains(&self.config.object_type.as_str())
        {
            builder.select_field(CURRENCY_FIELD)?;
        }
        match &self.ordering {
            Some((path, direction, nulls_last)) => {
                builder.add_ordering(path, *direction, *nulls_last)?;
            }
            None => {
                // the default ordering is best-effort: a type declaring
                // neither a name field nor its created-date field renders
                // unordered
                let (path, direction, nulls_last) = self.default_ordering();
                if self.describe.field(&path).is_some() {
                    builder.add_ordering(&path, direction, nulls_last)?;
                }
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Selector")
            .field("config", &self.config)
            .field("ordering", &self.ordering)
            .finish()
    }
}
