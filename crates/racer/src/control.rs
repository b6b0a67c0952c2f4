//! Control laws: the steering servo and the brake.
//!
//! Both laws are pure functions of the current state and their parameters.
//! The steering servo is a second-order system of its own and never sees the
//! constraint forces; the brake produces a force along the chassis axis that
//! the dynamics resolve into world components.

/// Fraction of vehicle weight available as maximum brake force.
pub const BRAKE_FORCE_RATIO: f64 = 0.3;

/// Axle speed below which braking switches to the viscous regime (m/s).
pub const DEFAULT_BRAKE_VELOCITY_THRESHOLD: f64 = 0.1;

/// PD servo driving the steer angle toward its setpoint:
///
/// ```text
/// δ̈ = −k_D·δ̇ − k_P·(δ − δ_des)
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteeringServo {
    k_p: f64,
    k_d: f64,
}

/// Qualitative damping of the steering servo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Damping {
    /// `k_D² < 4·k_P`: decaying oscillation around the setpoint.
    Under,
    /// `k_D² = 4·k_P`: fastest approach without overshoot.
    Critical,
    /// `k_D² > 4·k_P`: slow approach without overshoot.
    Over,
}

impl SteeringServo {
    #[must_use]
    pub fn new(k_p: f64, k_d: f64) -> Self {
        Self { k_p, k_d }
    }

    /// Returns the steer acceleration for the given angle, rate and setpoint.
    #[must_use]
    pub fn acceleration(&self, delta: f64, delta_dot: f64, setpoint: f64) -> f64 {
        -self.k_d * delta_dot - self.k_p * (delta - setpoint)
    }

    #[must_use]
    pub fn damping(&self) -> Damping {
        let discriminant = self.k_d * self.k_d - 4.0 * self.k_p;
        if discriminant < 0.0 {
            Damping::Under
        } else if discriminant == 0.0 {
            Damping::Critical
        } else {
            Damping::Over
        }
    }

    /// Closed-form response to a setpoint step of size `step`, starting at rest
    /// from zero steer angle.
    #[must_use]
    pub fn step_response(&self, step: f64, t: f64) -> f64 {
        if self.k_p == 0.0 {
            // No restoring term: a servo at rest stays put.
            return 0.0;
        }

        let sigma = 0.5 * self.k_d;
        let discriminant = self.k_d * self.k_d - 4.0 * self.k_p;

        let fraction = match self.damping() {
            Damping::Critical => 1.0 - (1.0 + sigma * t) * (-sigma * t).exp(),
            Damping::Under => {
                let omega = 0.5 * (-discriminant).sqrt();
                let decay = (-sigma * t).exp();
                1.0 - decay * ((omega * t).cos() + sigma / omega * (omega * t).sin())
            }
            Damping::Over => {
                let root = 0.5 * discriminant.sqrt();
                let (r1, r2) = (-sigma + root, -sigma - root);
                1.0 + (r2 * (r1 * t).exp() - r1 * (r2 * t).exp()) / (r1 - r2)
            }
        };

        step * fraction
    }
}

/// Brake actuator parameters and command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Brake {
    max_force: f64,
    velocity_threshold: f64,
    signal: f64,
}

/// Which branch of the brake force law is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrakeRegime {
    /// Constant-magnitude force opposing motion.
    Coulomb,
    /// Force proportional to axle speed, through zero at stand-still.
    Viscous,
}

impl Brake {
    /// Returns a released brake sized for a vehicle of the given mass.
    ///
    /// Maximum force is [`BRAKE_FORCE_RATIO`] of the vehicle weight.
    #[must_use]
    pub fn for_mass(mass: f64, gravity: f64) -> Self {
        Self {
            max_force: BRAKE_FORCE_RATIO * mass * gravity,
            velocity_threshold: DEFAULT_BRAKE_VELOCITY_THRESHOLD,
            signal: 0.0,
        }
    }

    #[must_use]
    pub fn max_force(&self) -> f64 {
        self.max_force
    }

    #[must_use]
    pub fn velocity_threshold(&self) -> f64 {
        self.velocity_threshold
    }

    /// Returns the current command in `[0, 1]`.
    #[must_use]
    pub fn signal(&self) -> f64 {
        self.signal
    }

    /// Sets the command, clamped to `[0, 1]`, and returns the applied value.
    ///
    /// The caller is responsible for rejecting NaN.
    pub(crate) fn set_signal(&mut self, signal: f64) -> f64 {
        self.signal = signal.clamp(0.0, 1.0);
        self.signal
    }

    /// Returns the brake force along the chassis axis for the given axle speed.
    ///
    /// Above the velocity threshold the full force opposes motion; below it
    /// the force ramps linearly through zero. The result is scaled by the
    /// command signal.
    #[must_use]
    pub fn force(&self, axle_velocity: f64) -> (f64, BrakeRegime) {
        let (force, regime) = if axle_velocity.abs() > self.velocity_threshold {
            (
                -axle_velocity.signum() * self.max_force,
                BrakeRegime::Coulomb,
            )
        } else {
            (
                -self.max_force * axle_velocity / self.velocity_threshold,
                BrakeRegime::Viscous,
            )
        };

        (self.signal * force, regime)
    }
}
