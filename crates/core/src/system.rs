/// A continuous-time system with `N` state variables.
///
/// This is the callback contract between a dynamics model and an integration
/// driver. The driver owns and allocates the state, calls
/// [`DynamicSystem::derivative`] as many times per step as its method
/// requires, and advances time itself.
///
/// Implementations write into the caller-provided `derivative` buffer and
/// must leave it untouched when they return an error, so a driver never
/// consumes a partial derivative.
pub trait DynamicSystem<const N: usize> {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Evaluates the state derivative at `time`.
    ///
    /// Takes `&mut self` so that systems can own and reuse scratch space
    /// across calls. Evaluation is strictly sequential.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if no derivative can be produced for this state.
    fn derivative(
        &mut self,
        time: f64,
        state: &[f64; N],
        derivative: &mut [f64; N],
    ) -> Result<(), Self::Error>;

    /// Finalizes the state after a step has been accepted by the driver.
    ///
    /// This hook runs once per accepted step, never for intermediate stages,
    /// and may adjust the state in place (for example to apply a discrete
    /// control). The default implementation leaves the state unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if finalization fails.
    fn finalize_step(&mut self, _time: f64, _state: &mut [f64; N]) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// A captured time and state pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot<const N: usize> {
    pub time: f64,
    pub state: [f64; N],
}

impl<const N: usize> Snapshot<N> {
    /// Creates a new snapshot.
    pub fn new(time: f64, state: [f64; N]) -> Self {
        Self { time, state }
    }
}
