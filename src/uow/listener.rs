//! Commit lifecycle hooks.
//!
//! A [`CommitListener`] is injected at construction and invoked at the
//! documented commit-phase boundaries. Every method has a no-op default, so
//! implementations override only the boundaries they care about.

/// Observer of unit-of-work lifecycle boundaries
pub trait CommitListener {
    /// A record type was registered with the coordinator
    fn on_type_registered(&mut self, _record_type: &str) {}

    /// `commit_work` was entered
    fn on_commit_starting(&mut self) {}

    /// Persistence phases are about to run
    fn on_db_starting(&mut self) {}

    /// All persistence phases completed
    fn on_db_finished(&mut self) {}

    /// Registered work units are about to run
    fn on_work_starting(&mut self) {}

    /// All registered work units completed
    fn on_work_finished(&mut self) {}

    /// The commit is about to be marked successful
    fn on_commit_finishing(&mut self) {}

    /// The commit attempt ended; fires exactly once per `commit_work`,
    /// on success and on the rollback path alike
    fn on_commit_finished(&mut self, _success: bool) {}
}

/// The default listener: observes nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopListener;

impl CommitListener for NoopListener {}
