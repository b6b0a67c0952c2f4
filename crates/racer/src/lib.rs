//! Planar dynamics of a three-wheeled roller racer.
//!
//! The vehicle is a rigid chassis on two fixed rear wheels and one steered,
//! castered front wheel. Both contacts roll without lateral slip, enforced as
//! stabilized constraints; the steer angle follows a PD servo and a brake
//! acts along the chassis axis.
//!
//! - [`Parameters`] holds the validated vehicle description
//! - [`RollerRacer`] evaluates the equations of motion as a
//!   [`roller_core::DynamicSystem`]
//! - [`Observables`] derives speed, energy and slip rates from a state
//! - [`Simulation`] owns a running state and advances it
//!
//! # Example
//!
//! ```no_run
//! use roller_racer::{Simulation, SteerCommand, Telemetry};
//!
//! let mut simulation = Simulation::default();
//! simulation.set_steer_command(SteerCommand::Sinusoid {
//!     amplitude: 0.4,
//!     frequency: 0.5,
//!     offset: 0.0,
//! })?;
//!
//! let mut telemetry = Telemetry::new(simulation.parameters(), 100);
//! simulation.run(1e-3, 10_000, telemetry.observer())?;
//!
//! for sample in telemetry.samples() {
//!     println!("{:?}: {:?}", sample.time, sample.speed);
//! }
//! # Ok::<(), roller_racer::SimulationError>(())
//! ```

mod config;
mod control;
mod dynamics;
mod kinematics;
mod observables;
mod params;
mod simulation;
mod state;
mod telemetry;

pub use config::VehicleConfig;
pub use control::{Brake, BrakeRegime, Damping, SteeringServo};
pub use dynamics::{ContactForces, DynamicsError, Evaluation, RollerRacer};
pub use kinematics::{Attitude, ContactVelocities};
pub use observables::{Observables, WheelAngles};
pub use params::{
    GeometrySpec, Gains, Geometry, InertiaSpec, ParamError, Parameters, SteerCommand,
};
pub use simulation::{Simulation, SimulationError};
pub use state::{STATE_LEN, State, StateIndex};
pub use telemetry::{Telemetry, TelemetrySample};
