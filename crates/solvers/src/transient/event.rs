use roller_core::Snapshot;

/// Event emitted by the transient solver for each accepted state.
///
/// Step 0 is the initial state before any integration.
/// Steps 1..N are emitted after each integration step.
#[derive(Debug, Clone, Copy)]
pub struct Event<const N: usize> {
    /// The step number (0 for initial, 1..N for integration steps).
    pub step: usize,

    /// Time and state at this step.
    pub snapshot: Snapshot<N>,
}
