//! Contact-point velocities shared by the dynamics and the observables.
//!
//! Directions in the world frame, with `ψ` the heading and `δ` the steer
//! angle:
//!
//! ```text
//! chassis axis   e₁ = ( cos ψ,     −sin ψ    )
//! chassis normal e₂ = ( sin ψ,      cos ψ    )
//! front normal   f₂ = ( sin(ψ+δ),   cos(ψ+δ) )
//! ```
//!
//! The rear contact sits a distance `b` behind the center of mass along `e₁`.
//! The steer axis sits `h` ahead of it, and the front contact trails the
//! steer axis by the caster length `d`.

use crate::{params::Geometry, state::State};

/// Trigonometry of the heading and steer angles, computed once per state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attitude {
    pub sin_psi: f64,
    pub cos_psi: f64,
    pub sin_delta: f64,
    pub cos_delta: f64,
    pub sin_front: f64,
    pub cos_front: f64,
}

impl Attitude {
    #[must_use]
    pub fn new(psi: f64, delta: f64) -> Self {
        let (sin_psi, cos_psi) = psi.sin_cos();
        let (sin_delta, cos_delta) = delta.sin_cos();
        let (sin_front, cos_front) = (psi + delta).sin_cos();

        Self {
            sin_psi,
            cos_psi,
            sin_delta,
            cos_delta,
            sin_front,
            cos_front,
        }
    }

    #[must_use]
    pub fn of(state: &State) -> Self {
        Self::new(state.heading(), state.steer_angle())
    }
}

/// Velocities of the wheel contact points for one state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactVelocities {
    /// Rear axle midpoint velocity along the chassis axis.
    pub axle: f64,
    /// Lateral velocity of the rear contact.
    pub slip_rear: f64,
    /// Lateral velocity of the front contact.
    pub slip_front: f64,
    /// Front contact velocity along the front wheel's rolling direction.
    pub front_rolling: f64,
}

impl ContactVelocities {
    #[must_use]
    pub fn new(geometry: &Geometry, attitude: &Attitude, state: &State) -> Self {
        let Geometry { b, d, h, .. } = *geometry;
        let Attitude {
            sin_psi,
            cos_psi,
            sin_delta,
            cos_delta,
            sin_front,
            cos_front,
        } = *attitude;

        let x_dot = state.x_dot();
        let z_dot = state.z_dot();
        let psi_dot = state.yaw_rate();
        let delta_dot = state.steer_rate();

        Self {
            axle: x_dot * cos_psi - z_dot * sin_psi,
            slip_rear: x_dot * sin_psi + z_dot * cos_psi + b * psi_dot,
            slip_front: x_dot * sin_front + z_dot * cos_front - h * psi_dot * cos_delta
                + (psi_dot + delta_dot) * d,
            front_rolling: x_dot * cos_front - z_dot * sin_front + h * psi_dot * sin_delta,
        }
    }

    /// Returns `(θ̇_L, θ̇_R, θ̇_F)` for rolling without slip.
    ///
    /// The left wheel is mounted mirrored, so forward motion turns it
    /// negatively.
    #[must_use]
    pub fn wheel_rates(&self, geometry: &Geometry, yaw_rate: f64) -> (f64, f64, f64) {
        let spin = geometry.c * yaw_rate;
        (
            -(self.axle - spin) / geometry.rear_wheel_radius,
            (self.axle + spin) / geometry.rear_wheel_radius,
            self.front_rolling / geometry.steer_wheel_radius,
        )
    }
}
