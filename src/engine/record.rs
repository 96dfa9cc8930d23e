//! Record values.
//!
//! A [`Record`] is a cheap-to-clone shared handle over one record's data.
//! The unit of work back-patches foreign keys and engine-assigned ids onto
//! records the caller still holds, so the handle shares state by design.
//! The crate's execution model is single-threaded; handles are `!Send`.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The owned data behind a record handle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordData {
    /// Record type name
    pub record_type: String,
    /// Persisted identifier, absent until the store assigns one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Field values
    #[serde(default)]
    pub fields: Map<String, Value>,
}

/// A shared handle to one record
#[derive(Debug, Clone)]
pub struct Record {
    inner: Rc<RefCell<RecordData>>,
}

impl Record {
    /// Create an empty, unpersisted record of a type
    pub fn new(record_type: impl Into<String>) -> Self {
        Self::from_data(RecordData {
            record_type: record_type.into(),
            id: None,
            fields: Map::new(),
        })
    }

    /// Create an unpersisted record with initial field values.
    ///
    /// Non-object `fields` values are treated as empty.
    pub fn with_fields(record_type: impl Into<String>, fields: Value) -> Self {
        let fields = match fields {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self::from_data(RecordData {
            record_type: record_type.into(),
            id: None,
            fields,
        })
    }

    /// Wrap existing record data in a handle
    pub fn from_data(data: RecordData) -> Self {
        Self {
            inner: Rc::new(RefCell::new(data)),
        }
    }

    /// The record's type name
    pub fn record_type(&self) -> String {
        self.inner.borrow().record_type.clone()
    }

    /// The persisted identifier, if any
    pub fn id(&self) -> Option<String> {
        self.inner.borrow().id.clone()
    }

    /// Set the persisted identifier
    pub fn set_id(&self, id: impl Into<String>) {
        self.inner.borrow_mut().id = Some(id.into());
    }

    /// A field value, cloned out of the record
    pub fn get(&self, field: &str) -> Option<Value> {
        self.inner.borrow().fields.get(field).cloned()
    }

    /// Set a field value
    pub fn set(&self, field: impl Into<String>, value: Value) {
        self.inner.borrow_mut().fields.insert(field.into(), value);
    }

    /// A snapshot copy of the record's data
    pub fn snapshot(&self) -> RecordData {
        self.inner.borrow().clone()
    }

    /// True when both handles refer to the same record
    pub fn same_handle(&self, other: &Record) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}
