use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors raised while loading or validating simulation parameters.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid parameter {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Per-tick tuning for the car. All quantities are per frame, not per second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleParams {
    /// Speed gained per tick while forward (or back) is held.
    pub acceleration: f32,
    /// Speed lost per tick while coasting.
    pub friction: f32,
    /// Heading change per tick, radians.
    pub turn_speed: f32,
    /// Speed bound in both directions.
    pub max_speed: f32,
    /// Height of the car's centre above the ground. Never changed by stepping.
    pub ride_height: f32,
}

impl Default for VehicleParams {
    fn default() -> Self {
        Self {
            acceleration: 0.01,
            friction: 0.005,
            turn_speed: 0.03,
            max_speed: 0.5,
            ride_height: 0.5,
        }
    }
}

impl VehicleParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        finite("vehicle.acceleration", self.acceleration)?;
        finite("vehicle.friction", self.friction)?;
        finite("vehicle.turn_speed", self.turn_speed)?;
        finite("vehicle.max_speed", self.max_speed)?;
        finite("vehicle.ride_height", self.ride_height)?;
        if self.acceleration < 0.0 {
            return Err(invalid("vehicle.acceleration", "must not be negative"));
        }
        if self.friction < 0.0 {
            return Err(invalid("vehicle.friction", "must not be negative"));
        }
        if self.max_speed <= 0.0 {
            return Err(invalid("vehicle.max_speed", "must be positive"));
        }
        Ok(())
    }
}

/// How the camera trails the car.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FollowParams {
    /// Horizontal distance behind the car.
    pub distance: f32,
    /// Height above the car.
    pub height: f32,
    /// Fraction of the remaining distance covered each tick.
    pub smoothing: f32,
}

impl Default for FollowParams {
    fn default() -> Self {
        Self {
            distance: 10.0,
            height: 5.0,
            smoothing: 0.05,
        }
    }
}

impl FollowParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        finite("follow.distance", self.distance)?;
        finite("follow.height", self.height)?;
        finite("follow.smoothing", self.smoothing)?;
        if !(0.0..=1.0).contains(&self.smoothing) {
            return Err(invalid("follow.smoothing", "must be within [0, 1]"));
        }
        Ok(())
    }
}

/// Full tuning set, as loaded from an optional JSON file.
///
/// ```json
/// { "vehicle": { "max_speed": 0.8 }, "follow": { "smoothing": 0.1 } }
/// ```
///
/// Missing sections and fields fall back to their defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub vehicle: VehicleParams,
    pub follow: FollowParams,
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.vehicle.validate()?;
        self.follow.validate()
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json(&text)?;
        tracing::info!("loaded parameters from {}", path.display());
        Ok(config)
    }

    /// Load from `path` if given, otherwise use the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn finite(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(invalid(name, "must be finite"))
    }
}

fn invalid(name: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        name,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_the_demo_tuning() {
        let p = VehicleParams::default();
        assert_eq!(p.acceleration, 0.01);
        assert_eq!(p.friction, 0.005);
        assert_eq!(p.turn_speed, 0.03);
        assert_eq!(p.max_speed, 0.5);
        let f = FollowParams::default();
        assert_eq!((f.distance, f.height, f.smoothing), (10.0, 5.0, 0.05));
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let c = SimConfig::from_json(r#"{ "vehicle": { "max_speed": 0.8 } }"#).unwrap();
        assert_eq!(c.vehicle.max_speed, 0.8);
        assert_eq!(c.vehicle.friction, 0.005);
        assert_eq!(c.follow, FollowParams::default());
    }

    #[test]
    fn rejects_negative_friction() {
        let err = SimConfig::from_json(r#"{ "vehicle": { "friction": -1.0 } }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                name: "vehicle.friction",
                ..
            }
        ));
    }

    #[test]
    fn rejects_zero_max_speed() {
        let p = VehicleParams {
            max_speed: 0.0,
            ..VehicleParams::default()
        };
        assert!(p.validate().is_err());
    }

    #[test]
    fn rejects_smoothing_out_of_range() {
        let err = SimConfig::from_json(r#"{ "follow": { "smoothing": 1.5 } }"#).unwrap_err();
        assert!(err.to_string().contains("follow.smoothing"));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = SimConfig::from_json("{ vehicle: ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "follow": {{ "distance": 12.0 }} }}"#).unwrap();
        let c = SimConfig::load(file.path()).unwrap();
        assert_eq!(c.follow.distance, 12.0);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SimConfig::load(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn json_round_trip_of_defaults() {
        let text = SimConfig::default().to_json_pretty().unwrap();
        assert_eq!(SimConfig::from_json(&text).unwrap(), SimConfig::default());
    }

    #[test]
    fn load_or_default_without_path() {
        assert_eq!(SimConfig::load_or_default(None).unwrap(), SimConfig::default());
    }
}
