//! Generic work units.
//!
//! Arbitrary caller logic executed after all record persistence, inside the
//! same transaction: a failing work unit rolls the whole commit back.

use super::errors::UowResult;

/// An opaque unit of deferred work
pub trait Work {
    /// Run the unit. Any error aborts the commit and triggers rollback.
    fn execute(&mut self) -> UowResult<()>;
}

/// Adapter so closures can be registered as work units
impl<F> Work for F
where
    F: FnMut() -> UowResult<()>,
{
    fn execute(&mut self) -> UowResult<()> {
        self()
    }
}
