use roller_core::{Observer, Snapshot};
use roller_solvers::transient::{self, Action, Config, Event, Method, Rk4, Solution};
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    config::VehicleConfig,
    dynamics::{DynamicsError, Evaluation, RollerRacer},
    observables::Observables,
    params::{GeometrySpec, Gains, InertiaSpec, ParamError, Parameters, SteerCommand},
    state::{STATE_LEN, State},
};

/// Errors returned by [`Simulation`].
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("initial conditions are locked once the simulation has begun")]
    AlreadyBegun,

    #[error("invalid parameter: {0}")]
    Param(#[from] ParamError),

    #[error(transparent)]
    Dynamics(#[from] DynamicsError),

    #[error("integration failed: {0}")]
    Transient(#[from] transient::Error),
}

/// A roller racer together with its current time and state.
///
/// The simulation owns the state and advances it with an integration
/// [`Method`], classic RK4 unless another is given. Parameters can be changed
/// at any time; initial conditions only until the dynamics are first
/// evaluated.
#[derive(Debug, Clone)]
pub struct Simulation<M: Method = Rk4> {
    racer: RollerRacer,
    method: M,
    time: f64,
    state: State,
}

impl Default for Simulation<Rk4> {
    fn default() -> Self {
        Self::new(RollerRacer::default())
    }
}

impl Simulation<Rk4> {
    /// Creates a simulation at rest at the origin, integrated with RK4.
    #[must_use]
    pub fn new(racer: RollerRacer) -> Self {
        Self::with_method(racer, Rk4)
    }

    /// Creates a simulation from a configuration, including its initial
    /// speed.
    ///
    /// # Errors
    ///
    /// Returns the first rejected setting.
    pub fn from_config(config: &VehicleConfig) -> Result<Self, SimulationError> {
        let mut simulation = Self::new(RollerRacer::from_config(config)?);
        simulation.set_initial_speed(config.initial_speed)?;
        Ok(simulation)
    }
}

impl<M: Method> Simulation<M> {
    /// Creates a simulation at rest at the origin, integrated with `method`.
    #[must_use]
    pub fn with_method(racer: RollerRacer, method: M) -> Self {
        Self {
            racer,
            method,
            time: 0.0,
            state: State::zero(),
        }
    }

    #[must_use]
    pub fn time(&self) -> f64 {
        self.time
    }

    #[must_use]
    pub fn state(&self) -> &State {
        &self.state
    }

    #[must_use]
    pub fn racer(&self) -> &RollerRacer {
        &self.racer
    }

    #[must_use]
    pub fn parameters(&self) -> &Parameters {
        self.racer.parameters()
    }

    /// Derived quantities at the current state.
    #[must_use]
    pub fn observables(&self) -> Observables<'_> {
        Observables::new(self.racer.parameters(), &self.state)
    }

    /// Evaluates the dynamics at the current time and state.
    ///
    /// This counts as the first evaluation and locks initial conditions.
    ///
    /// # Errors
    ///
    /// Returns an error if the constraint system cannot be solved.
    pub fn evaluate(&mut self) -> Result<Evaluation, SimulationError> {
        Ok(self.racer.evaluate(self.time, &self.state)?)
    }

    /// See [`Parameters::set_inertia`].
    ///
    /// # Errors
    ///
    /// Returns an error, changing nothing, if the inertia is out of bounds.
    pub fn set_inertia(&mut self, inertia: &InertiaSpec) -> Result<(), SimulationError> {
        Ok(self.racer.parameters_mut().set_inertia(inertia)?)
    }

    /// See [`Parameters::set_geometry`].
    ///
    /// # Errors
    ///
    /// Returns an error, changing nothing, if the geometry is out of bounds.
    pub fn set_geometry(&mut self, geometry: &GeometrySpec) -> Result<(), SimulationError> {
        Ok(self.racer.parameters_mut().set_geometry(geometry)?)
    }

    /// See [`Parameters::set_gains`].
    ///
    /// # Errors
    ///
    /// Returns an error if any gain is negative or not finite.
    pub fn set_gains(&mut self, gains: Gains) -> Result<(), SimulationError> {
        Ok(self.racer.parameters_mut().set_gains(gains)?)
    }

    /// See [`Parameters::set_steer_setpoint`].
    ///
    /// # Errors
    ///
    /// Returns an error if the angle is not finite.
    pub fn set_steer_setpoint(&mut self, angle: f64) -> Result<(), SimulationError> {
        Ok(self.racer.parameters_mut().set_steer_setpoint(angle)?)
    }

    /// See [`Parameters::set_steer_command`].
    ///
    /// # Errors
    ///
    /// Returns an error if the command is not well formed.
    pub fn set_steer_command(&mut self, command: SteerCommand) -> Result<(), SimulationError> {
        Ok(self.racer.parameters_mut().set_steer_command(command)?)
    }

    /// See [`Parameters::set_brake_command`].
    ///
    /// # Errors
    ///
    /// Returns an error if the signal is NaN.
    pub fn set_brake_command(&mut self, signal: f64) -> Result<f64, SimulationError> {
        Ok(self.racer.parameters_mut().set_brake_command(signal)?)
    }

    /// Sets the initial velocity along world x (m/s).
    ///
    /// # Errors
    ///
    /// Returns an error if the simulation has begun or the speed is not
    /// finite.
    pub fn set_initial_speed(&mut self, speed: f64) -> Result<(), SimulationError> {
        self.check_not_begun()?;
        if !speed.is_finite() {
            warn!(speed, "rejected non-finite initial speed");
            return Err(ParamError::NonFinite("initial speed").into());
        }

        self.state = self.state.x_dot_si(speed);
        Ok(())
    }

    /// Replaces the whole initial state.
    ///
    /// # Errors
    ///
    /// Returns an error if the simulation has begun or any component is not
    /// finite.
    pub fn set_initial_state(&mut self, state: State) -> Result<(), SimulationError> {
        self.check_not_begun()?;
        if !state.is_finite() {
            warn!(?state, "rejected non-finite initial state");
            return Err(ParamError::NonFinite("initial state").into());
        }

        self.state = state;
        Ok(())
    }

    /// Advances the simulation by one step of size `dt`.
    ///
    /// # Errors
    ///
    /// Returns an error if `dt` is invalid or the step fails; the current
    /// time and state are then left unchanged.
    pub fn advance(&mut self, dt: f64) -> Result<(), SimulationError> {
        let current = Snapshot::new(self.time, self.state.into_array());
        let next = transient::advance(&mut self.method, &mut self.racer, &current, dt)?;

        self.time = next.time;
        self.state = State::from(next.state);
        Ok(())
    }

    /// Integrates `steps` fixed steps of size `dt`, reporting every accepted
    /// state to `observer`.
    ///
    /// On success the simulation moves to the last accepted state, which is
    /// earlier than requested if the observer stopped the run.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or integration fails;
    /// the current time and state are then left unchanged.
    pub fn run<Obs>(
        &mut self,
        dt: f64,
        steps: usize,
        observer: Obs,
    ) -> Result<Solution<STATE_LEN>, SimulationError>
    where
        Obs: Observer<Event<STATE_LEN>, Action>,
    {
        let config = Config::new(dt, steps).map_err(transient::Error::from)?;
        let initial = Snapshot::new(self.time, self.state.into_array());

        let solution = transient::solve(
            &mut self.method,
            &mut self.racer,
            initial,
            &config,
            observer,
        )?;

        if let Some(last) = solution.last() {
            self.time = last.time;
            self.state = State::from(last.state);
        }
        info!(
            steps = solution.steps,
            status = ?solution.status,
            time = self.time,
            "simulation run finished"
        );

        Ok(solution)
    }

    fn check_not_begun(&self) -> Result<(), SimulationError> {
        if self.racer.has_begun() {
            warn!("rejected initial condition change after the simulation began");
            return Err(SimulationError::AlreadyBegun);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use roller_solvers::transient::{Euler, Status};

    #[test]
    fn initial_speed_locks_after_first_evaluation() {
        let mut simulation = Simulation::default();

        simulation.set_initial_speed(1.5).unwrap();
        assert_eq!(simulation.state().x_dot(), 1.5);

        simulation.advance(1e-3).unwrap();

        assert!(matches!(
            simulation.set_initial_speed(3.0),
            Err(SimulationError::AlreadyBegun)
        ));
        assert!(matches!(
            simulation.set_initial_state(State::zero()),
            Err(SimulationError::AlreadyBegun)
        ));
        assert_relative_eq!(simulation.state().x_dot(), 1.5, epsilon = 1e-9);
    }

    #[test]
    fn parameters_stay_configurable_while_running() {
        let mut simulation = Simulation::default();
        simulation.advance(1e-3).unwrap();

        simulation.set_brake_command(1.0).unwrap();
        simulation.set_steer_setpoint(0.1).unwrap();

        assert_eq!(simulation.parameters().brake().signal(), 1.0);
        assert_eq!(simulation.parameters().steer_command().setpoint(0.0), 0.1);
    }

    #[test]
    fn run_moves_to_the_last_state() {
        let mut simulation = Simulation::with_method(RollerRacer::new(), Euler);
        simulation.set_initial_speed(1.0).unwrap();

        let solution = simulation.run(0.01, 100, ()).unwrap();

        assert_eq!(solution.status, Status::Complete);
        assert_relative_eq!(simulation.time(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(simulation.state().x(), 1.0, epsilon = 1e-12);
        assert_eq!(simulation.state().z(), 0.0);
    }

    #[test]
    fn observer_stop_leaves_simulation_at_stop_point() {
        let mut simulation = Simulation::default();
        simulation.set_initial_speed(1.0).unwrap();

        let solution = simulation
            .run(0.1, 50, |event: &Event<STATE_LEN>| {
                (event.step == 3).then_some(Action::StopEarly)
            })
            .unwrap();

        assert_eq!(solution.status, Status::StoppedByObserver);
        assert_relative_eq!(simulation.time(), 0.3, epsilon = 1e-12);
    }

    #[test]
    fn invalid_time_step_changes_nothing() {
        let mut simulation = Simulation::default();

        assert!(matches!(
            simulation.run(-1.0, 10, ()),
            Err(SimulationError::Transient(transient::Error::InvalidConfig(_)))
        ));
        assert!(matches!(
            simulation.advance(f64::NAN),
            Err(SimulationError::Transient(_))
        ));
        assert_eq!(simulation.time(), 0.0);
        assert!(!simulation.racer().has_begun());
    }

    #[test]
    fn config_sets_initial_speed() {
        let config = VehicleConfig {
            initial_speed: 2.0,
            ..VehicleConfig::default()
        };

        let simulation = Simulation::from_config(&config).unwrap();

        assert_eq!(simulation.state().x_dot(), 2.0);
        assert_eq!(simulation.observables().speed().get::<uom::si::velocity::meter_per_second>(), 2.0);
    }

    #[test]
    fn non_finite_initial_conditions_are_rejected() {
        let mut simulation = Simulation::default();

        assert!(matches!(
            simulation.set_initial_speed(f64::NAN),
            Err(SimulationError::Param(ParamError::NonFinite(_)))
        ));
        assert_eq!(*simulation.state(), State::zero());
    }
}
