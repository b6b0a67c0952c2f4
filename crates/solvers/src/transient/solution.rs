use roller_core::Snapshot;

/// Indicates how the solver terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Completed all requested steps.
    Complete,

    /// Stopped early due to an observer action.
    StoppedByObserver,
}

/// The result of a transient integration.
#[derive(Debug, Clone)]
pub struct Solution<const N: usize> {
    /// How the solver terminated.
    pub status: Status,

    /// Snapshots from each step, including the initial state.
    pub history: Vec<Snapshot<N>>,

    /// Number of integration steps completed.
    pub steps: usize,
}

impl<const N: usize> Solution<N> {
    /// Returns the last accepted snapshot.
    #[must_use]
    pub fn last(&self) -> Option<&Snapshot<N>> {
        self.history.last()
    }
}
