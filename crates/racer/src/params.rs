//! Physical parameters, controller gains and setpoints of the roller racer.
//!
//! Every setter validates its whole input before touching anything, so a
//! rejected call leaves [`Parameters`] exactly as it was. Rejections are
//! returned as [`ParamError`] and logged at `warn` level.

#[cfg(feature = "serde-derive")]
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use uom::si::{
    f64::{Length, Mass},
    length::meter,
    mass::kilogram,
};

use crate::control::{Brake, SteeringServo};

/// Mass must be strictly greater than this (kg).
pub const MIN_MASS: f64 = 0.1;

/// Smallest accepted radius of gyration (m).
pub const MIN_RADIUS_OF_GYRATION: f64 = 0.03;

/// Smallest accepted wheelbase (m).
pub const MIN_WHEELBASE: f64 = 0.01;

/// Smallest accepted rear track width (m).
pub const MIN_TRACK_WIDTH: f64 = 0.05;

/// Smallest accepted wheel radius, rear or steered (m).
pub const MIN_WHEEL_RADIUS: f64 = 0.05;

/// Standard gravitational acceleration (m/s²).
pub const STANDARD_GRAVITY: f64 = 9.81;

/// Default static friction coefficient at the tire contacts.
pub const DEFAULT_STATIC_FRICTION: f64 = 0.8;

/// Errors returned when a configuration call is rejected.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum ParamError {
    #[error("{0} must be finite")]
    NonFinite(&'static str),

    #[error("mass must exceed 0.1 kg, got {0} kg")]
    MassTooSmall(f64),

    #[error("radius of gyration must be at least 0.03 m, got {0} m")]
    RadiusOfGyrationTooSmall(f64),

    #[error("wheelbase must be at least 0.01 m, got {0} m")]
    WheelbaseTooShort(f64),

    #[error("cg distance from the rear axle must be positive, got {0} m")]
    CgDistanceNotPositive(f64),

    #[error("caster length must not be negative, got {0} m")]
    NegativeCasterLength(f64),

    #[error("track width must be at least 0.05 m, got {0} m")]
    TrackTooNarrow(f64),

    #[error("rear wheel radius must be at least 0.05 m, got {0} m")]
    RearWheelTooSmall(f64),

    #[error("steer wheel radius must be at least 0.05 m, got {0} m")]
    SteerWheelTooSmall(f64),

    #[error(
        "cg ({cg_distance} m from the axle) lies beyond the steer contact point \
         (wheelbase − caster = {limit} m)"
    )]
    CgBeyondSteerContact { cg_distance: f64, limit: f64 },

    #[error("{0} gain must be finite and non-negative")]
    InvalidGain(&'static str),

    #[error("steer command frequency must be finite and non-negative")]
    InvalidSteerCommand,
}

/// Mass properties of the chassis.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde-derive",
    derive(Serialize, Deserialize),
    serde(default, deny_unknown_fields)
)]
pub struct InertiaSpec {
    pub mass: Mass,
    pub radius_of_gyration: Length,
}

impl InertiaSpec {
    /// Creates an inertia spec from SI values (kg, m).
    #[must_use]
    pub fn from_si(mass: f64, radius_of_gyration: f64) -> Self {
        Self {
            mass: Mass::new::<kilogram>(mass),
            radius_of_gyration: Length::new::<meter>(radius_of_gyration),
        }
    }

    /// Returns `(m, I_g)` in SI units if the spec is physically valid.
    fn validate(&self) -> Result<(f64, f64), ParamError> {
        let mass = self.mass.get::<kilogram>();
        let radius = self.radius_of_gyration.get::<meter>();

        finite("mass", mass)?;
        finite("radius of gyration", radius)?;
        if mass <= MIN_MASS {
            return Err(ParamError::MassTooSmall(mass));
        }
        if radius < MIN_RADIUS_OF_GYRATION {
            return Err(ParamError::RadiusOfGyrationTooSmall(radius));
        }

        Ok((mass, mass * radius * radius))
    }
}

impl Default for InertiaSpec {
    fn default() -> Self {
        Self::from_si(25.0, 0.3)
    }
}

/// Chassis and wheel dimensions as measured on the vehicle.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde-derive",
    derive(Serialize, Deserialize),
    serde(default, deny_unknown_fields)
)]
pub struct GeometrySpec {
    /// Rear axle to steer axis.
    pub wheelbase: Length,
    /// Rear axle to center of mass.
    pub cg_distance: Length,
    /// Steer axis to front wheel contact point.
    pub caster_length: Length,
    /// Distance between the rear wheels.
    pub track_width: Length,
    pub rear_wheel_radius: Length,
    pub steer_wheel_radius: Length,
}

impl GeometrySpec {
    /// Creates a geometry spec from SI lengths (m).
    #[must_use]
    pub fn from_si(
        wheelbase: f64,
        cg_distance: f64,
        caster_length: f64,
        track_width: f64,
        rear_wheel_radius: f64,
        steer_wheel_radius: f64,
    ) -> Self {
        Self {
            wheelbase: Length::new::<meter>(wheelbase),
            cg_distance: Length::new::<meter>(cg_distance),
            caster_length: Length::new::<meter>(caster_length),
            track_width: Length::new::<meter>(track_width),
            rear_wheel_radius: Length::new::<meter>(rear_wheel_radius),
            steer_wheel_radius: Length::new::<meter>(steer_wheel_radius),
        }
    }

    /// Checks every bound and derives the model geometry.
    ///
    /// # Errors
    ///
    /// Returns the first violated bound.
    pub fn validate(&self) -> Result<Geometry, ParamError> {
        let wheelbase = self.wheelbase.get::<meter>();
        let cg_distance = self.cg_distance.get::<meter>();
        let caster = self.caster_length.get::<meter>();
        let track = self.track_width.get::<meter>();
        let rear_radius = self.rear_wheel_radius.get::<meter>();
        let steer_radius = self.steer_wheel_radius.get::<meter>();

        finite("wheelbase", wheelbase)?;
        finite("cg distance", cg_distance)?;
        finite("caster length", caster)?;
        finite("track width", track)?;
        finite("rear wheel radius", rear_radius)?;
        finite("steer wheel radius", steer_radius)?;

        if wheelbase < MIN_WHEELBASE {
            return Err(ParamError::WheelbaseTooShort(wheelbase));
        }
        if cg_distance <= 0.0 {
            return Err(ParamError::CgDistanceNotPositive(cg_distance));
        }
        if caster < 0.0 {
            return Err(ParamError::NegativeCasterLength(caster));
        }
        if track < MIN_TRACK_WIDTH {
            return Err(ParamError::TrackTooNarrow(track));
        }
        if rear_radius < MIN_WHEEL_RADIUS {
            return Err(ParamError::RearWheelTooSmall(rear_radius));
        }
        if steer_radius < MIN_WHEEL_RADIUS {
            return Err(ParamError::SteerWheelTooSmall(steer_radius));
        }
        if wheelbase - caster < cg_distance {
            return Err(ParamError::CgBeyondSteerContact {
                cg_distance,
                limit: wheelbase - caster,
            });
        }

        Ok(Geometry {
            b: cg_distance,
            c: 0.5 * track,
            d: caster,
            h: wheelbase - cg_distance,
            rear_wheel_radius: rear_radius,
            steer_wheel_radius: steer_radius,
        })
    }
}

impl Default for GeometrySpec {
    fn default() -> Self {
        Self::from_si(1.3, 0.6, 0.3, 1.0, 0.375, 0.15)
    }
}

/// Geometry in the form the dynamics use it (all SI lengths).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    /// Center of mass to rear axle.
    pub b: f64,
    /// Half the rear track width.
    pub c: f64,
    /// Caster length.
    pub d: f64,
    /// Steer axis to center of mass.
    pub h: f64,
    pub rear_wheel_radius: f64,
    pub steer_wheel_radius: f64,
}

/// Controller gains.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde-derive",
    derive(Serialize, Deserialize),
    serde(default, deny_unknown_fields)
)]
pub struct Gains {
    /// Steering servo proportional gain `k_Pδ` (s⁻²).
    pub steer_p: f64,
    /// Steering servo derivative gain `k_Dδ` (s⁻¹).
    pub steer_d: f64,
    /// Slip stabilization gain `k_Pslip` (s⁻¹).
    pub slip_p: f64,
}

impl Gains {
    fn validate(&self) -> Result<(), ParamError> {
        for (name, gain) in [
            ("steer proportional", self.steer_p),
            ("steer derivative", self.steer_d),
            ("slip proportional", self.slip_p),
        ] {
            if !gain.is_finite() || gain < 0.0 {
                return Err(ParamError::InvalidGain(name));
            }
        }
        Ok(())
    }

    /// Returns the steering servo these gains describe.
    #[must_use]
    pub fn servo(&self) -> SteeringServo {
        SteeringServo::new(self.steer_p, self.steer_d)
    }
}

impl Default for Gains {
    /// A critically damped servo with a 10 rad/s natural frequency.
    fn default() -> Self {
        Self {
            steer_p: 100.0,
            steer_d: 20.0,
            slip_p: 10.0,
        }
    }
}

/// Desired steer angle, possibly varying in time.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde-derive",
    derive(Serialize, Deserialize),
    serde(tag = "kind", rename_all = "snake_case")
)]
pub enum SteerCommand {
    /// Hold a fixed angle (rad).
    Constant { angle: f64 },

    /// `offset + amplitude · sin(2π · frequency · t)`, angles in rad and
    /// frequency in Hz. Oscillating the steer angle is how a roller racer
    /// propels itself.
    Sinusoid {
        amplitude: f64,
        frequency: f64,
        offset: f64,
    },
}

impl SteerCommand {
    /// Returns the setpoint at time `t`.
    #[must_use]
    pub fn setpoint(&self, t: f64) -> f64 {
        match *self {
            Self::Constant { angle } => angle,
            Self::Sinusoid {
                amplitude,
                frequency,
                offset,
            } => offset + amplitude * (std::f64::consts::TAU * frequency * t).sin(),
        }
    }

    fn validate(&self) -> Result<(), ParamError> {
        match *self {
            Self::Constant { angle } => finite("steer setpoint", angle),
            Self::Sinusoid {
                amplitude,
                frequency,
                offset,
            } => {
                finite("steer amplitude", amplitude)?;
                finite("steer offset", offset)?;
                if !frequency.is_finite() || frequency < 0.0 {
                    return Err(ParamError::InvalidSteerCommand);
                }
                Ok(())
            }
        }
    }
}

impl Default for SteerCommand {
    fn default() -> Self {
        Self::Constant { angle: 0.0 }
    }
}

/// The full parameter set read by the dynamics.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    mass: f64,
    yaw_inertia: f64,
    geometry: Geometry,
    gains: Gains,
    brake: Brake,
    steer: SteerCommand,
    gravity: f64,
    static_friction: f64,
}

impl Default for Parameters {
    fn default() -> Self {
        let mass = 25.0;

        Self {
            mass,
            yaw_inertia: mass * 0.3 * 0.3,
            geometry: Geometry {
                b: 0.6,
                c: 0.5,
                d: 0.3,
                h: 1.3 - 0.6,
                rear_wheel_radius: 0.375,
                steer_wheel_radius: 0.15,
            },
            gains: Gains::default(),
            brake: Brake::for_mass(mass, STANDARD_GRAVITY),
            steer: SteerCommand::default(),
            gravity: STANDARD_GRAVITY,
            static_friction: DEFAULT_STATIC_FRICTION,
        }
    }
}

impl Parameters {
    /// Sets mass and yaw inertia (`I_g = m·r²`).
    ///
    /// On success the brake is re-sized for the new mass and released.
    ///
    /// # Errors
    ///
    /// Returns an error, leaving every parameter unchanged, if the mass is not
    /// above 0.1 kg or the radius of gyration is below 0.03 m.
    pub fn set_inertia(&mut self, inertia: &InertiaSpec) -> Result<(), ParamError> {
        let (mass, yaw_inertia) = inertia.validate().inspect_err(|error| {
            warn!(%error, "rejected inertia update");
        })?;

        self.mass = mass;
        self.yaw_inertia = yaw_inertia;
        self.brake = Brake::for_mass(mass, self.gravity);
        debug!(mass, yaw_inertia, "inertia updated");
        Ok(())
    }

    /// Sets the vehicle geometry.
    ///
    /// # Errors
    ///
    /// Returns an error, leaving every parameter unchanged, if any dimension
    /// is out of bounds or the center of mass lies beyond the steer contact.
    pub fn set_geometry(&mut self, geometry: &GeometrySpec) -> Result<(), ParamError> {
        let geometry = geometry.validate().inspect_err(|error| {
            warn!(%error, "rejected geometry update");
        })?;

        self.geometry = geometry;
        debug!(?geometry, "geometry updated");
        Ok(())
    }

    /// Sets the controller gains.
    ///
    /// # Errors
    ///
    /// Returns an error if any gain is negative or not finite.
    pub fn set_gains(&mut self, gains: Gains) -> Result<(), ParamError> {
        gains.validate().inspect_err(|error| {
            warn!(%error, "rejected gains update");
        })?;

        self.gains = gains;
        Ok(())
    }

    /// Holds the steer angle at `angle` (rad).
    ///
    /// # Errors
    ///
    /// Returns an error if the angle is not finite.
    pub fn set_steer_setpoint(&mut self, angle: f64) -> Result<(), ParamError> {
        self.set_steer_command(SteerCommand::Constant { angle })
    }

    /// Sets a possibly time-varying steer command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command has non-finite terms or a negative
    /// frequency.
    pub fn set_steer_command(&mut self, command: SteerCommand) -> Result<(), ParamError> {
        command.validate().inspect_err(|error| {
            warn!(%error, "rejected steer command");
        })?;

        self.steer = command;
        Ok(())
    }

    /// Sets the brake command, clamped to `[0, 1]`, and returns the applied
    /// value.
    ///
    /// # Errors
    ///
    /// Returns an error if the signal is NaN.
    pub fn set_brake_command(&mut self, signal: f64) -> Result<f64, ParamError> {
        if signal.is_nan() {
            warn!("rejected NaN brake command");
            return Err(ParamError::NonFinite("brake command"));
        }
        Ok(self.brake.set_signal(signal))
    }

    /// Mass `m` (kg).
    #[must_use]
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Yaw inertia about the center of mass `I_g` (kg·m²).
    #[must_use]
    pub fn yaw_inertia(&self) -> f64 {
        self.yaw_inertia
    }

    #[must_use]
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    #[must_use]
    pub fn gains(&self) -> &Gains {
        &self.gains
    }

    #[must_use]
    pub fn brake(&self) -> &Brake {
        &self.brake
    }

    #[must_use]
    pub fn steer_command(&self) -> &SteerCommand {
        &self.steer
    }

    /// Gravitational acceleration `g` (m/s²).
    #[must_use]
    pub fn gravity(&self) -> f64 {
        self.gravity
    }

    /// Static friction coefficient `μ_s`.
    ///
    /// Carried for friction-margin estimates; the dynamics do not read it.
    #[must_use]
    pub fn static_friction(&self) -> f64 {
        self.static_friction
    }
}

fn finite(name: &'static str, value: f64) -> Result<(), ParamError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ParamError::NonFinite(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn defaults_match_reference_vehicle() {
        let params = Parameters::default();

        assert_eq!(params.mass(), 25.0);
        assert_relative_eq!(params.yaw_inertia(), 2.25, epsilon = 1e-12);

        let g = params.geometry();
        assert_eq!(g.b, 0.6);
        assert_eq!(g.c, 0.5);
        assert_eq!(g.d, 0.3);
        assert_relative_eq!(g.h, 0.7, epsilon = 1e-12);
        assert_eq!(g.rear_wheel_radius, 0.375);
        assert_eq!(g.steer_wheel_radius, 0.15);

        assert_relative_eq!(params.brake().max_force(), 0.3 * 25.0 * 9.81);
        assert_eq!(params.brake().velocity_threshold(), 0.1);
        assert_eq!(params.brake().signal(), 0.0);
    }

    #[test]
    fn inertia_update_derives_everything() {
        let mut params = Parameters::default();
        params.set_brake_command(0.7).unwrap();

        params
            .set_inertia(&InertiaSpec::from_si(40.0, 0.5))
            .unwrap();

        assert_eq!(params.mass(), 40.0);
        assert_relative_eq!(params.yaw_inertia(), 10.0);
        assert_relative_eq!(params.brake().max_force(), 0.3 * 40.0 * 9.81);
        assert_eq!(params.brake().velocity_threshold(), 0.1);
        assert_eq!(params.brake().signal(), 0.0);
    }

    #[test]
    fn invalid_inertia_changes_nothing() {
        let mut params = Parameters::default();
        params.set_brake_command(0.7).unwrap();
        let before = params.clone();

        for (spec, expected) in [
            (
                InertiaSpec::from_si(0.1, 0.3),
                ParamError::MassTooSmall(0.1),
            ),
            (
                InertiaSpec::from_si(5.0, 0.029),
                ParamError::RadiusOfGyrationTooSmall(0.029),
            ),
            (
                InertiaSpec::from_si(f64::NAN, 0.3),
                ParamError::NonFinite("mass"),
            ),
        ] {
            assert_eq!(params.set_inertia(&spec), Err(expected));
            assert_eq!(params, before);
        }
    }

    #[test]
    fn inertia_bounds_are_inclusive_where_stated() {
        let mut params = Parameters::default();
        assert!(params.set_inertia(&InertiaSpec::from_si(0.11, 0.03)).is_ok());
    }

    #[test]
    fn geometry_update_derives_lengths() {
        let mut params = Parameters::default();

        params
            .set_geometry(&GeometrySpec::from_si(2.0, 0.8, 0.4, 1.2, 0.3, 0.1))
            .unwrap();

        let g = params.geometry();
        assert_eq!(g.b, 0.8);
        assert_relative_eq!(g.c, 0.6);
        assert_eq!(g.d, 0.4);
        assert_relative_eq!(g.h, 1.2, epsilon = 1e-12);
        assert_eq!(g.rear_wheel_radius, 0.3);
        assert_eq!(g.steer_wheel_radius, 0.1);
    }

    #[test]
    fn default_parameters_agree_with_default_specs() {
        let mut params = Parameters::default();
        let before = params.clone();

        params.set_inertia(&InertiaSpec::default()).unwrap();
        params.set_geometry(&GeometrySpec::default()).unwrap();

        assert_eq!(params, before);
    }

    #[test]
    fn invalid_geometry_changes_nothing() {
        let mut params = Parameters::default();
        let before = params.clone();

        let cases = [
            (
                GeometrySpec::from_si(0.005, 0.001, 0.0, 1.0, 0.3, 0.1),
                ParamError::WheelbaseTooShort(0.005),
            ),
            (
                GeometrySpec::from_si(1.3, 0.0, 0.3, 1.0, 0.3, 0.1),
                ParamError::CgDistanceNotPositive(0.0),
            ),
            (
                GeometrySpec::from_si(1.3, 0.6, -0.1, 1.0, 0.3, 0.1),
                ParamError::NegativeCasterLength(-0.1),
            ),
            (
                GeometrySpec::from_si(1.3, 0.6, 0.3, 0.04, 0.3, 0.1),
                ParamError::TrackTooNarrow(0.04),
            ),
            (
                GeometrySpec::from_si(1.3, 0.6, 0.3, 1.0, 0.04, 0.1),
                ParamError::RearWheelTooSmall(0.04),
            ),
            (
                GeometrySpec::from_si(1.3, 0.6, 0.3, 1.0, 0.3, 0.04),
                ParamError::SteerWheelTooSmall(0.04),
            ),
            (
                GeometrySpec::from_si(1.0, 0.8, 0.3, 1.0, 0.3, 0.1),
                ParamError::CgBeyondSteerContact {
                    cg_distance: 0.8,
                    limit: 1.0 - 0.3,
                },
            ),
        ];

        for (spec, expected) in cases {
            assert_eq!(params.set_geometry(&spec), Err(expected));
            assert_eq!(params, before);
        }
    }

    #[test]
    fn cg_exactly_at_steer_contact_is_accepted() {
        let mut params = Parameters::default();
        assert!(
            params
                .set_geometry(&GeometrySpec::from_si(1.0, 0.5, 0.5, 1.0, 0.3, 0.1))
                .is_ok()
        );
        assert_eq!(params.geometry().h, 0.5);
    }

    #[test]
    fn gains_are_validated() {
        let mut params = Parameters::default();

        let bad = Gains {
            slip_p: -1.0,
            ..Gains::default()
        };
        assert_eq!(
            params.set_gains(bad),
            Err(ParamError::InvalidGain("slip proportional"))
        );
        assert_eq!(*params.gains(), Gains::default());

        let good = Gains {
            steer_p: 25.0,
            steer_d: 4.0,
            slip_p: 0.0,
        };
        params.set_gains(good).unwrap();
        assert_eq!(*params.gains(), good);
    }

    #[test]
    fn brake_command_is_clamped() {
        let mut params = Parameters::default();

        assert_eq!(params.set_brake_command(2.0), Ok(1.0));
        assert_eq!(params.set_brake_command(-1.0), Ok(0.0));
        assert_eq!(params.set_brake_command(0.25), Ok(0.25));
        assert_eq!(params.brake().signal(), 0.25);

        assert!(params.set_brake_command(f64::NAN).is_err());
        assert_eq!(params.brake().signal(), 0.25);
    }

    #[test]
    fn steer_commands() {
        let mut params = Parameters::default();

        params.set_steer_setpoint(0.2).unwrap();
        assert_eq!(params.steer_command().setpoint(123.0), 0.2);

        let sinusoid = SteerCommand::Sinusoid {
            amplitude: 0.3,
            frequency: 0.5,
            offset: 0.1,
        };
        params.set_steer_command(sinusoid).unwrap();
        assert_relative_eq!(params.steer_command().setpoint(0.0), 0.1);
        assert_relative_eq!(params.steer_command().setpoint(0.5), 0.4, epsilon = 1e-12);

        assert!(params.set_steer_setpoint(f64::INFINITY).is_err());
        assert!(
            params
                .set_steer_command(SteerCommand::Sinusoid {
                    amplitude: 0.3,
                    frequency: -1.0,
                    offset: 0.0,
                })
                .is_err()
        );
        assert_eq!(*params.steer_command(), sinusoid);
    }
}
