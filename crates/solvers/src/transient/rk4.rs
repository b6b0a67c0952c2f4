use roller_core::{DynamicSystem, StepIntegrable};

use super::Method;

/// Classic fixed-step fourth-order Runge–Kutta.
///
/// Four derivative evaluations per step, at the start, twice at the midpoint,
/// and at the end of the interval.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rk4;

impl Method for Rk4 {
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
        let half = 0.5 * dt;

        let mut k1 = [0.0; N];
        let mut k2 = [0.0; N];
        let mut k3 = [0.0; N];
        let mut k4 = [0.0; N];

        system.derivative(time, state, &mut k1)?;
        system.derivative(time + half, &state.step(&k1, half), &mut k2)?;
        system.derivative(time + half, &state.step(&k2, half), &mut k3)?;
        system.derivative(time + dt, &state.step(&k3, dt), &mut k4)?;

        let slope: [f64; N] = std::array::from_fn(|i| (k1[i] + 2.0 * (k2[i] + k3[i]) + k4[i]) / 6.0);
        Ok(state.step(&slope, dt))
    }

    fn evaluations_per_step(&self) -> usize {
        4
    }
}
