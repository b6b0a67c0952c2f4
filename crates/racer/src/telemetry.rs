//! Sampling observables from a running transient solve.

use roller_solvers::transient::{Action, Event};
use uom::si::f64::{Angle, Energy, Time, Velocity};
use uom::si::time::second;

use crate::{
    observables::Observables,
    params::Parameters,
    state::{STATE_LEN, State},
};

/// Observables recorded at one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetrySample {
    pub step: usize,
    pub time: Time,
    pub speed: Velocity,
    pub kinetic_energy: Energy,
    pub slip_rate_rear: Velocity,
    pub slip_rate_front: Velocity,
    pub heading: Angle,
    pub steer_angle: Angle,
}

/// Records a [`TelemetrySample`] every `every` steps.
///
/// Observables are computed against a copy of the parameters taken when the
/// recorder is created.
#[derive(Debug, Clone)]
pub struct Telemetry {
    params: Parameters,
    every: usize,
    samples: Vec<TelemetrySample>,
}

impl Telemetry {
    /// Creates a recorder sampling every `every` steps (at least every step).
    #[must_use]
    pub fn new(params: &Parameters, every: usize) -> Self {
        Self {
            params: params.clone(),
            every: every.max(1),
            samples: Vec::new(),
        }
    }

    /// Records the event if its step is due.
    pub fn record(&mut self, event: &Event<STATE_LEN>) {
        if event.step % self.every != 0 {
            return;
        }

        let state = State::from(event.snapshot.state);
        let observed = Observables::new(&self.params, &state);

        self.samples.push(TelemetrySample {
            step: event.step,
            time: Time::new::<second>(event.snapshot.time),
            speed: observed.speed(),
            kinetic_energy: observed.kinetic_energy(),
            slip_rate_rear: observed.slip_rate_rear(),
            slip_rate_front: observed.slip_rate_front(),
            heading: observed.heading(),
            steer_angle: observed.steer_angle(),
        });
    }

    /// Returns an observer that records into this telemetry and never stops
    /// the solve.
    pub fn observer(&mut self) -> impl FnMut(&Event<STATE_LEN>) -> Option<Action> + '_ {
        move |event: &Event<STATE_LEN>| {
            self.record(event);
            None
        }
    }

    #[must_use]
    pub fn samples(&self) -> &[TelemetrySample] {
        &self.samples
    }

    /// Consumes the recorder and returns its samples.
    #[must_use]
    pub fn into_samples(self) -> Vec<TelemetrySample> {
        self.samples
    }
}
