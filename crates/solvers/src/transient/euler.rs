use roller_core::{DynamicSystem, StepIntegrable};

use super::Method;

/// Explicit forward Euler: `state + derivative(t, state) * dt`.
///
/// One derivative evaluation per step. First-order accurate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Euler;

impl Method for Euler {
    fn step<S, const N: usize>(
        &mut self,
        system: &mut S,
        time: f64,
        state: &[f64; N],
        dt: f64,
    ) -> Result<[f64; N], S::Error>
    where
        S: DynamicSystem<N>,
    {
        let mut derivative = [0.0; N];
        system.derivative(time, state, &mut derivative)?;
        Ok(state.step(&derivative, dt))
    }

    fn evaluations_per_step(&self) -> usize {
        1
    }
}
