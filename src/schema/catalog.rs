//! Schema catalog: the collaborator that answers "what does record type X
//! look like".
//!
//! The query layer only ever consumes the [`SchemaCatalog`] trait.
//! [`InMemoryCatalog`] is the reference implementation; [`CachedCatalog`]
//! wraps any catalog with an explicit, resettable memoization layer for
//! deployments where describe lookups are expensive.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde::Deserialize;

use super::types::ObjectType;

/// Read-only access to record-type metadata
pub trait SchemaCatalog {
    /// Describe metadata for a record type, or None if unknown
    fn object_type(&self, name: &str) -> Option<Rc<ObjectType>>;

    /// Whether the deployment tracks per-record currency
    fn is_multi_currency(&self) -> bool {
        false
    }
}

/// A catalog backed by an in-process registry of describes
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    types: HashMap<String, Rc<ObjectType>>,
    multi_currency: bool,
}

/// Serialized form of a catalog: a flat list of describes
#[derive(Debug, Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    multi_currency: bool,
    types: Vec<ObjectType>,
}

impl InMemoryCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a record type describe, replacing any prior registration
    pub fn register(&mut self, object_type: ObjectType) {
        self.types
            .insert(object_type.name.clone(), Rc::new(object_type));
    }

    /// Enable per-record currency tracking
    pub fn set_multi_currency(&mut self, enabled: bool) {
        self.multi_currency = enabled;
    }

    /// Load a catalog from its JSON document form
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let doc: CatalogDocument = serde_json::from_str(json)?;
        let mut catalog = Self::new();
        catalog.set_multi_currency(doc.multi_currency);
        for object_type in doc.types {
            catalog.register(object_type);
        }
        Ok(catalog)
    }

    /// Number of registered record types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true when no types are registered
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl SchemaCatalog for InMemoryCatalog {
    fn object_type(&self, name: &str) -> Option<Rc<ObjectType>> {
        self.types.get(name).cloned()
    }

    fn is_multi_currency(&self) -> bool {
        self.multi_currency
    }
}

/// A memoizing wrapper around another catalog.
///
/// Lookup results (including misses) are cached on first access; `reset`
/// drops the cache. This is the process-scoped describe cache, made explicit
/// and construction-injectable instead of global.
pub struct CachedCatalog<C: SchemaCatalog> {
    inner: C,
    cache: RefCell<HashMap<String, Option<Rc<ObjectType>>>>,
}

impl<C: SchemaCatalog> CachedCatalog<C> {
    /// Wrap a catalog with a fresh cache
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Drop every memoized lookup
    pub fn reset(&self) {
        self.cache.borrow_mut().clear();
    }

    /// The wrapped catalog
    pub fn inner(&self) -> &C {
        &self.inner
    }
}

impl<C: SchemaCatalog> SchemaCatalog for CachedCatalog<C> {
    fn object_type(&self, name: &str) -> Option<Rc<ObjectType>> {
        if let Some(hit) = self.cache.borrow().get(name) {
            return hit.clone();
        }
        let looked_up = self.inner.object_type(name);
        self.cache
            .borrow_mut()
            .insert(name.to_string(), looked_up.clone());
        looked_up
    }

    fn is_multi_currency(&self) -> bool {
        self.inner.is_multi_currency()
    }
}
