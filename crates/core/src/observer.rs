/// Receives events from a solver and optionally returns a control action.
///
/// Solvers call [`Observer::observe`] at well-defined points (for the
/// transient solvers, once per accepted step). Returning `None` lets the
/// solver continue; returning `Some(action)` asks it to react, for example by
/// stopping early.
///
/// The unit type `()` is the no-op observer, and any `FnMut(&E) -> Option<A>`
/// closure is an observer.
pub trait Observer<E, A> {
    /// Observes an event and optionally returns an action.
    fn observe(&mut self, event: &E) -> Option<A>;
}

impl<E, A> Observer<E, A> for () {
    fn observe(&mut self, _event: &E) -> Option<A> {
        None
    }
}

impl<E, A, F> Observer<E, A> for F
where
    F: FnMut(&E) -> Option<A>,
{
    fn observe(&mut self, event: &E) -> Option<A> {
        self(event)
    }
}
