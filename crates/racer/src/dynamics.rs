//! The constrained equations of motion.
//!
//! Each evaluation runs the steering servo and the brake law, then solves a
//! 5×5 system for the chassis accelerations and the lateral contact forces:
//!
//! ```text
//! unknowns y = [ẍ, z̈, ψ̈, λ_R, λ_F]
//!
//! m ẍ  − sψ λ_R − s(ψ+δ) λ_F          =  F_b cψ
//! m z̈  − cψ λ_R − c(ψ+δ) λ_F          = −F_b sψ
//! I_g ψ̈ − b λ_R − (d − h cδ) λ_F       =  0
//! sψ ẍ + cψ z̈ + b ψ̈                  = −ψ̇ v_axle − k_slip σ_R
//! s(ψ+δ) ẍ + c(ψ+δ) z̈ + (d − h cδ) ψ̈ = −(ψ̇+δ̇) v_front − h ψ̇ δ̇ sδ − d δ̈ − k_slip σ_F
//! ```
//!
//! The last two rows are the time derivatives of the rear and front no-slip
//! conditions, with each slip rate `σ` fed back so violations decay instead
//! of drifting.

use roller_core::DynamicSystem;
use roller_solvers::linear::{self, DenseSystem};
use thiserror::Error;
use tracing::{debug, error, trace};

use crate::{
    config::VehicleConfig,
    control::BrakeRegime,
    kinematics::{Attitude, ContactVelocities},
    params::{ParamError, Parameters},
    state::{STATE_LEN, State, StateIndex},
};

/// Errors that can occur while evaluating the dynamics.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DynamicsError {
    #[error("constraint system could not be solved: {0}")]
    Singular(#[from] linear::Error),
}

/// Lateral forces the ground exerts through each contact (N).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactForces {
    pub rear: f64,
    pub front: f64,
}

/// Everything one evaluation computes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub derivative: State,
    pub contact: ContactForces,
    /// Brake force along the chassis axis (N).
    pub brake_force: f64,
    pub brake_regime: BrakeRegime,
    /// Steer angle the servo was driving toward.
    pub steer_setpoint: f64,
    pub slip_rate_rear: f64,
    pub slip_rate_front: f64,
}

/// The roller racer as a dynamic system.
///
/// Owns the parameters and the constraint system workspace. Evaluation is
/// a function of time, state and parameters, except that the first call
/// marks the simulation as begun.
#[derive(Debug, Clone, Default)]
pub struct RollerRacer {
    params: Parameters,
    workspace: DenseSystem<5>,
    begun: bool,
}

impl RollerRacer {
    /// Creates a racer with the default vehicle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a racer with the given parameters.
    #[must_use]
    pub fn with_parameters(params: Parameters) -> Self {
        Self {
            params,
            ..Self::default()
        }
    }

    /// Creates a racer configured from a [`VehicleConfig`].
    ///
    /// # Errors
    ///
    /// Returns the first rejected setting.
    pub fn from_config(config: &VehicleConfig) -> Result<Self, ParamError> {
        Ok(Self::with_parameters(config.parameters()?))
    }

    #[must_use]
    pub fn parameters(&self) -> &Parameters {
        &self.params
    }

    /// Returns the parameters for reconfiguration.
    ///
    /// Parameters may change at any time, including between steps.
    pub fn parameters_mut(&mut self) -> &mut Parameters {
        &mut self.params
    }

    /// Returns true once the dynamics have been evaluated.
    #[must_use]
    pub fn has_begun(&self) -> bool {
        self.begun
    }

    /// Evaluates the state derivative and the quantities behind it.
    ///
    /// # Errors
    ///
    /// Returns an error if the constraint system is singular or contains
    /// non-finite values. No valid geometry produces a singular system.
    pub fn evaluate(&mut self, time: f64, state: &State) -> Result<Evaluation, DynamicsError> {
        if !self.begun {
            debug!(time, "first dynamics evaluation, initial conditions locked");
            self.begun = true;
        }

        let params = &self.params;
        let geometry = *params.geometry();
        let (b, d, h) = (geometry.b, geometry.d, geometry.h);
        let m = params.mass();
        let k_slip = params.gains().slip_p;

        let x_dot = state.x_dot();
        let z_dot = state.z_dot();
        let psi_dot = state.yaw_rate();
        let delta_dot = state.steer_rate();

        let attitude = Attitude::of(state);
        let Attitude {
            sin_psi,
            cos_psi,
            sin_delta,
            cos_delta,
            sin_front,
            cos_front,
        } = attitude;

        let steer_setpoint = params.steer_command().setpoint(time);
        let delta_ddot =
            params
                .gains()
                .servo()
                .acceleration(state.steer_angle(), delta_dot, steer_setpoint);

        let contact = ContactVelocities::new(&geometry, &attitude, state);
        let (brake_force, brake_regime) = params.brake().force(contact.axle);

        // Front lever arm of the lateral contact force about the cg.
        let arm = d - h * cos_delta;
        let front_travel = x_dot * cos_front - z_dot * sin_front;

        let system = &mut self.workspace;
        system.set_row(0, [m, 0.0, 0.0, -sin_psi, -sin_front], brake_force * cos_psi);
        system.set_row(1, [0.0, m, 0.0, -cos_psi, -cos_front], -brake_force * sin_psi);
        system.set_row(2, [0.0, 0.0, params.yaw_inertia(), -b, -arm], 0.0);
        system.set_row(
            3,
            [sin_psi, cos_psi, b, 0.0, 0.0],
            -psi_dot * contact.axle - k_slip * contact.slip_rear,
        );
        system.set_row(
            4,
            [sin_front, cos_front, arm, 0.0, 0.0],
            -(psi_dot + delta_dot) * front_travel
                - h * psi_dot * delta_dot * sin_delta
                - d * delta_ddot
                - k_slip * contact.slip_front,
        );

        let [x_ddot, z_ddot, psi_ddot, lambda_rear, lambda_front] =
            system.solve().inspect_err(|err| {
                error!(%err, time, ?state, "constraint system solve failed");
            })?;

        let (theta_l_dot, theta_r_dot, theta_f_dot) = contact.wheel_rates(&geometry, psi_dot);

        let mut derivative = State::zero();
        derivative[StateIndex::X] = x_dot;
        derivative[StateIndex::XDot] = x_ddot;
        derivative[StateIndex::Z] = z_dot;
        derivative[StateIndex::ZDot] = z_ddot;
        derivative[StateIndex::Psi] = psi_dot;
        derivative[StateIndex::PsiDot] = psi_ddot;
        derivative[StateIndex::ThetaL] = theta_l_dot;
        derivative[StateIndex::ThetaR] = theta_r_dot;
        derivative[StateIndex::ThetaF] = theta_f_dot;
        derivative[StateIndex::Delta] = delta_dot;
        derivative[StateIndex::DeltaDot] = delta_ddot;

        trace!(time, ?derivative, "dynamics evaluated");

        Ok(Evaluation {
            derivative,
            contact: ContactForces {
                rear: lambda_rear,
                front: lambda_front,
            },
            brake_force,
            brake_regime,
            steer_setpoint,
            slip_rate_rear: contact.slip_rear,
            slip_rate_front: contact.slip_front,
        })
    }
}

impl DynamicSystem<STATE_LEN> for RollerRacer {
    type Error = DynamicsError;

    fn derivative(
        &mut self,
        time: f64,
        state: &[f64; STATE_LEN],
        derivative: &mut [f64; STATE_LEN],
    ) -> Result<(), Self::Error> {
        let evaluation = self.evaluate(time, &State::from(*state))?;
        *derivative = evaluation.derivative.into_array();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::params::GeometrySpec;

    #[test]
    fn first_evaluation_marks_begun() {
        let mut racer = RollerRacer::new();
        assert!(!racer.has_begun());

        racer.evaluate(0.0, &State::zero()).unwrap();
        assert!(racer.has_begun());
    }

    #[test]
    fn rest_is_an_equilibrium() {
        let mut racer = RollerRacer::new();

        let evaluation = racer.evaluate(0.0, &State::zero()).unwrap();

        assert_eq!(evaluation.derivative.into_array(), [0.0; STATE_LEN]);
        assert_eq!(evaluation.contact.rear, 0.0);
        assert_eq!(evaluation.contact.front, 0.0);
    }

    #[test]
    fn callback_writes_the_same_derivative() {
        let mut racer = RollerRacer::new();
        racer.parameters_mut().set_steer_setpoint(0.2).unwrap();
        let state = State::zero().x_dot_si(1.5).psi(0.3).delta(0.1).psi_dot(0.2);

        let evaluation = racer.evaluate(0.0, &state).unwrap();

        let mut buffer = [f64::NAN; STATE_LEN];
        racer.derivative(0.0, state.as_array(), &mut buffer).unwrap();

        assert_eq!(buffer, evaluation.derivative.into_array());
    }

    #[test]
    fn servo_drives_steer_only_through_its_own_row() {
        let mut racer = RollerRacer::new();
        racer.parameters_mut().set_steer_setpoint(0.1).unwrap();

        let evaluation = racer.evaluate(0.0, &State::zero()).unwrap();
        let derivative = evaluation.derivative;

        assert_relative_eq!(derivative[StateIndex::DeltaDot], 100.0 * 0.1);
        assert_eq!(derivative[StateIndex::Delta], 0.0);
    }

    #[test]
    fn steering_from_rest_pushes_the_chassis() {
        let mut racer = RollerRacer::new();
        let state = State::zero().delta(0.2).delta_dot(1.0);

        let derivative = racer.evaluate(0.0, &state).unwrap().derivative;

        // A moving caster drags the front contact sideways, which the
        // constraint turns into chassis motion.
        assert!(derivative[StateIndex::PsiDot].abs() > 1e-6);
        assert!(derivative.as_array().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn constraints_hold_to_first_order() {
        let mut racer = RollerRacer::new();
        racer.parameters_mut().set_steer_setpoint(0.3).unwrap();
        let params = racer.parameters().clone();

        // A rolling state: rear and front contacts move without slip.
        let psi: f64 = 0.4;
        let speed = 1.2;
        let state = State::zero()
            .psi(psi)
            .x_dot_si(speed * psi.cos())
            .z_dot_si(-speed * psi.sin());

        let evaluation = racer.evaluate(0.0, &state).unwrap();
        assert_relative_eq!(evaluation.slip_rate_rear, 0.0, epsilon = 1e-12);
        assert_relative_eq!(evaluation.slip_rate_front, 0.0, epsilon = 1e-12);

        // After a tiny Euler step the slip rates stay second-order small.
        let dt = 1e-6;
        let mut next = State::zero();
        for index in StateIndex::ALL {
            next[index] = state[index] + dt * evaluation.derivative[index];
        }
        let v = ContactVelocities::new(params.geometry(), &Attitude::of(&next), &next);
        assert!(v.slip_rear.abs() < 1e-9);
        assert!(v.slip_front.abs() < 1e-9);
    }

    #[test]
    fn slip_decays_through_feedback() {
        let mut racer = RollerRacer::new();
        let k_slip = racer.parameters().gains().slip_p;

        // Pure sideways drift at ψ = 0 with the steer straight.
        let state = State::zero().z_dot_si(0.5);
        let evaluation = racer.evaluate(0.0, &state).unwrap();
        let derivative = evaluation.derivative;

        // d/dt σ_R = −k_slip σ_R while ψ̇ = 0.
        let slip_rate_change = derivative[StateIndex::ZDot] + 0.6 * derivative[StateIndex::PsiDot];
        assert_relative_eq!(
            slip_rate_change,
            -k_slip * evaluation.slip_rate_rear,
            epsilon = 1e-9
        );
    }

    #[test]
    fn geometry_changes_take_effect_between_evaluations() {
        let mut racer = RollerRacer::new();
        let state = State::zero().x_dot_si(1.0);

        let before = racer.evaluate(0.0, &state).unwrap().derivative;
        racer
            .parameters_mut()
            .set_geometry(&GeometrySpec::from_si(1.3, 0.6, 0.3, 1.0, 0.25, 0.15))
            .unwrap();
        let after = racer.evaluate(0.0, &state).unwrap().derivative;

        assert_relative_eq!(before[StateIndex::ThetaR], 1.0 / 0.375);
        assert_relative_eq!(after[StateIndex::ThetaR], 1.0 / 0.25);
    }

    #[test]
    fn non_finite_state_is_a_solver_error_and_buffer_is_untouched() {
        let mut racer = RollerRacer::new();
        let state = State::zero().psi(f64::NAN);

        let mut buffer = [7.0; STATE_LEN];
        let result = racer.derivative(0.0, state.as_array(), &mut buffer);

        assert_eq!(
            result,
            Err(DynamicsError::Singular(linear::Error::NonFinite))
        );
        assert_eq!(buffer, [7.0; STATE_LEN]);
    }
}
