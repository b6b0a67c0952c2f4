//! A complete vehicle description in one value.
//!
//! With the `serde-derive` feature a [`VehicleConfig`] can be read from any
//! serde format. Every field is optional and falls back to the reference
//! vehicle; quantities are given in SI base units.
//!
//! ```toml
//! brake_command = 0.0
//! initial_speed = 1.0
//!
//! [inertia]
//! mass = 25.0
//! radius_of_gyration = 0.3
//!
//! [steer]
//! kind = "sinusoid"
//! amplitude = 0.4
//! frequency = 0.5
//! offset = 0.0
//! ```

#[cfg(feature = "serde-derive")]
use serde::{Deserialize, Serialize};

use crate::params::{GeometrySpec, Gains, InertiaSpec, ParamError, Parameters, SteerCommand};

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde-derive",
    derive(Serialize, Deserialize),
    serde(default, deny_unknown_fields)
)]
pub struct VehicleConfig {
    pub inertia: InertiaSpec,
    pub geometry: GeometrySpec,
    pub gains: Gains,
    pub steer: SteerCommand,
    /// Brake command, clamped to `[0, 1]` when applied.
    pub brake_command: f64,
    /// Initial velocity along world x (m/s).
    pub initial_speed: f64,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            inertia: InertiaSpec::default(),
            geometry: GeometrySpec::default(),
            gains: Gains::default(),
            steer: SteerCommand::default(),
            brake_command: 0.0,
            initial_speed: 0.0,
        }
    }
}

impl VehicleConfig {
    /// Builds the parameter set this configuration describes.
    ///
    /// The brake command is applied after the inertia, which releases the
    /// brake when it re-sizes it.
    ///
    /// # Errors
    ///
    /// Returns the first rejected setting.
    pub fn parameters(&self) -> Result<Parameters, ParamError> {
        let mut params = Parameters::default();
        self.apply(&mut params)?;
        Ok(params)
    }

    /// Applies every setting to `params`, or none of them.
    ///
    /// The initial speed is not a parameter and is ignored here.
    ///
    /// # Errors
    ///
    /// Returns the first rejected setting, leaving `params` unchanged.
    pub fn apply(&self, params: &mut Parameters) -> Result<(), ParamError> {
        let mut staged = params.clone();

        staged.set_inertia(&self.inertia)?;
        staged.set_geometry(&self.geometry)?;
        staged.set_gains(self.gains)?;
        staged.set_steer_command(self.steer)?;
        staged.set_brake_command(self.brake_command)?;

        *params = staged;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_the_default_vehicle() {
        assert_eq!(VehicleConfig::default().parameters(), Ok(Parameters::default()));
    }

    #[test]
    fn brake_survives_inertia_reset() {
        let config = VehicleConfig {
            brake_command: 0.5,
            ..VehicleConfig::default()
        };

        let params = config.parameters().unwrap();
        assert_eq!(params.brake().signal(), 0.5);
    }

    #[test]
    fn rejected_setting_applies_nothing() {
        let mut params = Parameters::default();
        let before = params.clone();

        let config = VehicleConfig {
            inertia: InertiaSpec::from_si(50.0, 0.4),
            geometry: GeometrySpec::from_si(1.0, 0.9, 0.3, 1.0, 0.3, 0.15),
            ..VehicleConfig::default()
        };

        assert!(matches!(
            config.apply(&mut params),
            Err(ParamError::CgBeyondSteerContact { .. })
        ));
        assert_eq!(params, before);
    }

    #[cfg(feature = "serde-derive")]
    #[test]
    fn reads_partial_toml() {
        let text = r#"
            brake_command = 0.25

            [inertia]
            mass = 30.0
            radius_of_gyration = 0.4

            [steer]
            kind = "sinusoid"
            amplitude = 0.4
            frequency = 0.5
            offset = 0.0
        "#;

        let config: VehicleConfig = toml::from_str(text).unwrap();

        assert_eq!(config.inertia, InertiaSpec::from_si(30.0, 0.4));
        assert_eq!(config.geometry, GeometrySpec::default());
        assert_eq!(config.gains, Gains::default());
        assert_eq!(
            config.steer,
            SteerCommand::Sinusoid {
                amplitude: 0.4,
                frequency: 0.5,
                offset: 0.0,
            }
        );
        assert_eq!(config.brake_command, 0.25);
        assert_eq!(config.initial_speed, 0.0);

        let params = config.parameters().unwrap();
        assert_eq!(params.mass(), 30.0);
        assert_eq!(params.brake().signal(), 0.25);
    }

    #[cfg(feature = "serde-derive")]
    #[test]
    fn rejects_unknown_keys() {
        assert!(toml::from_str::<VehicleConfig>("top_speed = 3.0").is_err());
    }
}
