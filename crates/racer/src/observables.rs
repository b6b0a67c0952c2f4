//! Read-only quantities derived from a state, for monitoring.
//!
//! Slip rates are computed by the same kinematics the dynamics use, so an
//! observed slip rate always matches the one the evaluator fed back.

use uom::si::{
    angle::radian,
    energy::joule,
    f64::{Angle, Energy, Length, Velocity},
    length::meter,
    velocity::meter_per_second,
};

use crate::{
    kinematics::{Attitude, ContactVelocities},
    params::Parameters,
    state::State,
};

/// Rotation angles of the three wheels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelAngles {
    pub left: Angle,
    pub right: Angle,
    pub front: Angle,
}

/// Derived quantities for one state under one parameter set.
#[derive(Debug, Clone, Copy)]
pub struct Observables<'a> {
    params: &'a Parameters,
    state: &'a State,
    contact: ContactVelocities,
}

impl<'a> Observables<'a> {
    #[must_use]
    pub fn new(params: &'a Parameters, state: &'a State) -> Self {
        let contact = ContactVelocities::new(params.geometry(), &Attitude::of(state), state);
        Self {
            params,
            state,
            contact,
        }
    }

    /// Speed of the center of mass.
    #[must_use]
    pub fn speed(&self) -> Velocity {
        Velocity::new::<meter_per_second>(self.state.x_dot().hypot(self.state.z_dot()))
    }

    /// Translational plus rotational kinetic energy of the chassis.
    #[must_use]
    pub fn kinetic_energy(&self) -> Energy {
        let x_dot = self.state.x_dot();
        let z_dot = self.state.z_dot();
        let psi_dot = self.state.yaw_rate();

        Energy::new::<joule>(
            0.5 * self.params.mass() * (x_dot * x_dot + z_dot * z_dot)
                + 0.5 * self.params.yaw_inertia() * psi_dot * psi_dot,
        )
    }

    #[must_use]
    pub fn slip_rate_rear(&self) -> Velocity {
        Velocity::new::<meter_per_second>(self.contact.slip_rear)
    }

    #[must_use]
    pub fn slip_rate_front(&self) -> Velocity {
        Velocity::new::<meter_per_second>(self.contact.slip_front)
    }

    /// Velocity of the rear axle midpoint along the chassis axis.
    #[must_use]
    pub fn axle_velocity(&self) -> Velocity {
        Velocity::new::<meter_per_second>(self.contact.axle)
    }

    /// Heading, unwrapped.
    #[must_use]
    pub fn heading(&self) -> Angle {
        Angle::new::<radian>(self.state.heading())
    }

    #[must_use]
    pub fn steer_angle(&self) -> Angle {
        Angle::new::<radian>(self.state.steer_angle())
    }

    #[must_use]
    pub fn wheel_angles(&self) -> WheelAngles {
        WheelAngles {
            left: Angle::new::<radian>(self.state.theta_left()),
            right: Angle::new::<radian>(self.state.theta_right()),
            front: Angle::new::<radian>(self.state.theta_front()),
        }
    }

    /// World position `(x, z)` of the center of mass.
    #[must_use]
    pub fn position(&self) -> (Length, Length) {
        (
            Length::new::<meter>(self.state.x()),
            Length::new::<meter>(self.state.z()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::state::StateIndex;

    #[test]
    fn speed_and_energy() {
        let params = Parameters::default();
        let state = State::zero().x_dot_si(3.0).z_dot_si(-4.0).psi_dot(2.0);

        let observed = Observables::new(&params, &state);

        assert_relative_eq!(observed.speed().get::<meter_per_second>(), 5.0);
        assert_relative_eq!(
            observed.kinetic_energy().get::<joule>(),
            0.5 * 25.0 * 25.0 + 0.5 * 2.25 * 4.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn direct_state_reads() {
        let params = Parameters::default();
        let state = State::zero()
            .with(StateIndex::X, 1.0)
            .with(StateIndex::Z, -2.0)
            .with(StateIndex::ThetaL, 3.0)
            .with(StateIndex::ThetaR, 4.0)
            .with(StateIndex::ThetaF, 5.0)
            .psi(7.0)
            .delta(-0.25);

        let observed = Observables::new(&params, &state);

        let (x, z) = observed.position();
        assert_eq!(x.get::<meter>(), 1.0);
        assert_eq!(z.get::<meter>(), -2.0);

        // Heading is never wrapped.
        assert_eq!(observed.heading().get::<radian>(), 7.0);
        assert_eq!(observed.steer_angle().get::<radian>(), -0.25);

        let wheels = observed.wheel_angles();
        assert_eq!(wheels.left.get::<radian>(), 3.0);
        assert_eq!(wheels.right.get::<radian>(), 4.0);
        assert_eq!(wheels.front.get::<radian>(), 5.0);
    }

    #[test]
    fn slip_rates_follow_the_formulas() {
        let params = Parameters::default();
        let state = State::zero()
            .x_dot_si(0.8)
            .z_dot_si(0.3)
            .psi(0.5)
            .psi_dot(-0.4)
            .delta(0.2)
            .delta_dot(0.7);

        let observed = Observables::new(&params, &state);

        let (psi, delta) = (0.5_f64, 0.2_f64);
        let rear = 0.8 * psi.sin() + 0.3 * psi.cos() + 0.6 * -0.4;
        let front = 0.8 * (psi + delta).sin() + 0.3 * (psi + delta).cos()
            - 0.7 * -0.4 * delta.cos()
            + (-0.4 + 0.7) * 0.3;

        assert_relative_eq!(
            observed.slip_rate_rear().get::<meter_per_second>(),
            rear,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            observed.slip_rate_front().get::<meter_per_second>(),
            front,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            observed.axle_velocity().get::<meter_per_second>(),
            0.8 * psi.cos() - 0.3 * psi.sin(),
            epsilon = 1e-12
        );
    }
}
