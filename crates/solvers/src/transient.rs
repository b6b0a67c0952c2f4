//! Fixed-step time integration of dynamic systems.
//!
//! The driver owns the state, repeatedly asks a [`DynamicSystem`] for its
//! derivative, and advances time. How a step is formed is delegated to a
//! [`Method`], so integrators can be swapped without touching the model:
//!
//! - [`Euler`]: explicit forward Euler, one evaluation per step
//! - [`Rk4`]: classic fourth-order Runge–Kutta, four evaluations per step
//!
//! ```text
//! state_{n+1} = method.step(system, t_n, state_n, dt)
//! t_{n+1}     = t_0 + (n + 1) * dt
//! ```
//!
//! # Example
//!
//! ```ignore
//! use roller_solvers::transient::{self, Config, Rk4};
//!
//! let config = Config::new(1e-3, 1000)?;
//! let solution = transient::solve_unobserved(&mut Rk4, &mut system, initial, &config)?;
//!
//! for snapshot in &solution.history {
//!     println!("t={}: {:?}", snapshot.time, snapshot.state);
//! }
//! ```

mod action;
mod config;
mod error;
mod euler;
mod event;
mod rk4;
mod solution;


pub use action::Action;
pub use config::{Config, ConfigError};
pub use error::Error;
pub use euler::Euler;
pub use event::Event;
pub use rk4::Rk4;
pub use solution::{Solution, Status};

use roller_core::{DynamicSystem, Observer, Snapshot};
use tracing::{debug, warn};

/// A one-step integration scheme.
///
/// Implementations may call [`DynamicSystem::derivative`] any number of times
/// per step but must not call [`DynamicSystem::finalize_step`]; the driver
/// does that once the step is accepted.
pub trait Method {
    /// Returns the state after one step of size `dt` starting at `time`.
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by the system.
    fn step<S, const N: usize>(
        &mut self,
        system: &mut S,
        time: f64,
        state: &[f64; N],
        dt: f64,
    ) -> Result<[f64; N], S::Error>
    where
        S: DynamicSystem<N>;

    /// Returns how many derivative evaluations one step performs.
    fn evaluations_per_step(&self) -> usize;
}

/// Advances a snapshot by a single accepted step.
///
/// The method forms the next state, which is checked for finiteness and then
/// passed through [`DynamicSystem::finalize_step`].
///
/// # Errors
///
/// Returns an error if `dt` is invalid, the system fails, or the stepped
/// state is not finite. The input snapshot is never modified.
pub fn advance<M, S, const N: usize>(
    method: &mut M,
    system: &mut S,
    current: &Snapshot<N>,
    dt: f64,
) -> Result<Snapshot<N>, Error>
where
    M: Method,
    S: DynamicSystem<N>,
{
    config::check_time_step(dt)?;
    step_from(method, system, current, current.time + dt, dt, 1)
}

/// Integrates a dynamic system with a fixed step.
///
/// # Algorithm
///
/// 1. Emit the initial snapshot as step 0.
/// 2. For each step:
///    - Form the next state with the method.
///    - Reject non-finite states.
///    - Finalize the step on the system.
///    - Emit an [`Event`] to the observer.
///    - If the observer returns `StopEarly`, terminate.
/// 3. Return the solution with the full history.
///
/// # Errors
///
/// Returns an error if the system fails at any point or the state becomes
/// non-finite.
pub fn solve<M, S, Obs, const N: usize>(
    method: &mut M,
    system: &mut S,
    initial: Snapshot<N>,
    config: &Config,
    mut observer: Obs,
) -> Result<Solution<N>, Error>
where
    M: Method,
    S: DynamicSystem<N>,
    Obs: Observer<Event<N>, Action>,
{
    let mut history = Vec::with_capacity(config.steps() + 1);
    history.push(initial);

    let event = Event {
        step: 0,
        snapshot: initial,
    };
    if let Some(Action::StopEarly) = observer.observe(&event) {
        debug!(step = 0, "transient solve stopped by observer");
        return Ok(Solution {
            status: Status::StoppedByObserver,
            history,
            steps: 0,
        });
    }

    let mut current = initial;

    for step in 1..=config.steps() {
        // Time is recomputed from the start to avoid accumulating rounding.
        #[allow(clippy::cast_precision_loss)]
        let next_time = initial.time + config.dt() * step as f64;

        let next = step_from(method, system, &current, next_time, config.dt(), step)?;
        history.push(next);

        let event = Event {
            step,
            snapshot: next,
        };
        if let Some(Action::StopEarly) = observer.observe(&event) {
            debug!(step, time = next.time, "transient solve stopped by observer");
            return Ok(Solution {
                status: Status::StoppedByObserver,
                history,
                steps: step,
            });
        }

        current = next;
    }

    Ok(Solution {
        status: Status::Complete,
        history,
        steps: config.steps(),
    })
}

/// Integrates a dynamic system without observation.
///
/// This is a convenience wrapper around [`solve`] that discards events.
///
/// # Errors
///
/// Returns an error if the system fails at any point or the state becomes
/// non-finite.
pub fn solve_unobserved<M, S, const N: usize>(
    method: &mut M,
    system: &mut S,
    initial: Snapshot<N>,
    config: &Config,
) -> Result<Solution<N>, Error>
where
    M: Method,
    S: DynamicSystem<N>,
{
    solve(method, system, initial, config, ())
}

fn step_from<M, S, const N: usize>(
    method: &mut M,
    system: &mut S,
    current: &Snapshot<N>,
    next_time: f64,
    dt: f64,
    step: usize,
) -> Result<Snapshot<N>, Error>
where
    M: Method,
    S: DynamicSystem<N>,
{
    let mut state = method
        .step(system, current.time, &current.state, dt)
        .map_err(Error::system)?;

    if !state.iter().all(|v| v.is_finite()) {
        warn!(step, time = next_time, "state became non-finite");
        return Err(Error::NonFinite { step });
    }

    system
        .finalize_step(next_time, &mut state)
        .map_err(Error::system)?;

    Ok(Snapshot::new(next_time, state))
}
