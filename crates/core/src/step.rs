/// A trait for state types that can be advanced along their derivative.
///
/// Integrators use this to form intermediate and final states as
/// `state + derivative * delta`. The derivative is taken by reference so that
/// multi-stage methods can reuse a stage derivative for several combinations.
pub trait StepIntegrable<Delta> {
    /// The derivative of the type with respect to `Delta`.
    type Derivative;

    /// Returns the value after stepping along `derivative` by `delta`.
    #[must_use]
    fn step(&self, derivative: &Self::Derivative, delta: Delta) -> Self;
}

/// Type alias for the derivative of a `StepIntegrable` type.
pub type DerivativeOf<T, Delta> = <T as StepIntegrable<Delta>>::Derivative;

/// Fixed-length state vectors step element by element.
impl<const N: usize> StepIntegrable<f64> for [f64; N] {
    type Derivative = [f64; N];

    fn step(&self, derivative: &[f64; N], delta: f64) -> Self {
        std::array::from_fn(|i| self[i] + derivative[i] * delta)
    }
}
