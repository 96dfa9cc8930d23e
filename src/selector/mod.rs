//! Selector subsystem for recordflow
//!
//! Per-record-type declarative configuration (default field list, optional
//! field sets, security flags, default ordering) that produces
//! pre-configured query builders on demand. Thin by design: it drives the
//! query builder's public contract and nothing else.

#[allow(clippy::module_inception)]
mod selector;

pub use selector::{Selector, SelectorConfig, CURRENCY_FIELD, CURRENCY_FIELD_EXCLUSIONS};
