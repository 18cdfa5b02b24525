//! Simulation settings.
//!
//! The six tunables recognised by the physics engine. Loaded from defaults,
//! a JSON file, and/or environment variables, then validated once before an
//! engine is built:
//!
//! ```json
//! {
//!   "max_velocity": 50.0,
//!   "gravity_constant": 5.0,
//!   "bounds": 100.0,
//!   "mass_exponent": 4.0,
//!   "absorb_rate": 0.15,
//!   "time_scale": 3.75
//! }
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::bodies::{mass_for_radius, MAX_SPAWN_RADIUS};
use crate::error::SettingsError;

/// Largest radius a spawn request is clamped to; mass must stay finite well
/// past it for a configuration to be usable.
pub const REFERENCE_RADIUS: f32 = MAX_SPAWN_RADIUS;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct SimulationSettings {
    pub max_velocity: f32,     // clamp for both summed force and velocity
    pub gravity_constant: f32, // g
    pub bounds: f32,           // eviction radius around the origin
    pub mass_exponent: f32,    // mass = (1 + r) ^ mass_exponent
    pub absorb_rate: f32,      // share of the absorbed radius added to the survivor
    pub time_scale: f32,       // multiplier applied to dt before integration
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            max_velocity: 50.0,
            gravity_constant: 5.0,
            bounds: 100.0,
            mass_exponent: 4.0,
            absorb_rate: 0.15,
            time_scale: 3.75,
        }
    }
}

impl SimulationSettings {
    pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Overrides fields from `MAX_VELOCITY`, `GRAVITY`, `MAX_BOUNDS`,
    /// `MASS_SCALE`, `ABSORB_RATE` and `TIME_SCALE` when set.
    pub fn with_env_overrides(self) -> Result<Self, SettingsError> {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SettingsError> {
        let fields: [(&'static str, &mut f32); 6] = [
            ("MAX_VELOCITY", &mut self.max_velocity),
            ("GRAVITY", &mut self.gravity_constant),
            ("MAX_BOUNDS", &mut self.bounds),
            ("MASS_SCALE", &mut self.mass_exponent),
            ("ABSORB_RATE", &mut self.absorb_rate),
            ("TIME_SCALE", &mut self.time_scale),
        ];
        for (name, field) in fields {
            let Some(value) = lookup(name).filter(|v| !v.trim().is_empty()) else {
                continue;
            };
            *field = value
                .trim()
                .parse()
                .map_err(|_| SettingsError::Env { name, value: value.clone() })?;
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        let values = [
            ("max_velocity", self.max_velocity),
            ("gravity_constant", self.gravity_constant),
            ("bounds", self.bounds),
            ("mass_exponent", self.mass_exponent),
            ("absorb_rate", self.absorb_rate),
            ("time_scale", self.time_scale),
        ];
        for (name, value) in values {
            if !value.is_finite() {
                return Err(SettingsError::NonFinite { name });
            }
        }

        if self.max_velocity <= 0.0 {
            return Err(SettingsError::OutOfRange { name: "max_velocity", value: self.max_velocity });
        }
        if self.bounds <= 0.0 {
            return Err(SettingsError::OutOfRange { name: "bounds", value: self.bounds });
        }
        if self.absorb_rate < 0.0 {
            return Err(SettingsError::OutOfRange { name: "absorb_rate", value: self.absorb_rate });
        }
        if self.time_scale < 0.0 {
            return Err(SettingsError::OutOfRange { name: "time_scale", value: self.time_scale });
        }

        let mass = mass_for_radius(REFERENCE_RADIUS, self.mass_exponent);
        if !mass.is_finite() || mass <= 0.0 {
            return Err(SettingsError::DegenerateMass { exponent: self.mass_exponent });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(SimulationSettings::default().validate().is_ok());
    }

    #[test]
    fn json_fills_missing_fields_from_defaults() {
        let settings = SimulationSettings::from_json_str(r#"{ "gravity_constant": 0.0, "bounds": 20.0 }"#).unwrap();
        assert_eq!(settings.gravity_constant, 0.0);
        assert_eq!(settings.bounds, 20.0);
        assert_eq!(settings.max_velocity, SimulationSettings::default().max_velocity);
    }

    #[test]
    fn overrides_replace_only_set_values() {
        let settings = SimulationSettings::default()
            .with_overrides(|name| match name {
                "GRAVITY" => Some("2.5".to_string()),
                "TIME_SCALE" => Some(" ".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(settings.gravity_constant, 2.5);
        assert_eq!(settings.time_scale, 3.75);
    }

    #[test]
    fn unparsable_override_is_an_error() {
        let err = SimulationSettings::default()
            .with_overrides(|name| (name == "MAX_BOUNDS").then(|| "far".to_string()))
            .unwrap_err();
        assert!(matches!(err, SettingsError::Env { name: "MAX_BOUNDS", .. }));
    }

    #[test]
    fn degenerate_mass_exponent_is_rejected() {
        let settings = SimulationSettings {
            mass_exponent: 1000.0,
            ..Default::default()
        };
        assert!(matches!(settings.validate(), Err(SettingsError::DegenerateMass { .. })));

        let settings = SimulationSettings {
            bounds: f32::NAN,
            ..Default::default()
        };
        assert!(matches!(settings.validate(), Err(SettingsError::NonFinite { name: "bounds" })));
    }
}
