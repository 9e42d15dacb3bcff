// Timeouts, topics, link and controller configuration
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::motor::hex::{field_max, BYTE_WIDTH};
use crate::motor::{DEFAULT_RAMP, DEFAULT_SPEED};

// Runtime loop frequency
pub const LOOP_HZ: u64 = 20;

// Intent timeout for watchdog
pub const INTENT_TIMEOUT: Duration = Duration::from_millis(500);

// Zenoh topics
pub const TOPIC_CMD_DRIVE: &str = "droid/cmd/drive"; // drive intents
pub const TOPIC_CMD_HEAD: &str = "droid/cmd/head"; // head commands
pub const TOPIC_RT_MOTOR: &str = "droid/rt/motor"; // encoded payloads
pub const TOPIC_MOTOR_EVENTS: &str = "droid/state/motor_event"; // telemetry codes
pub const TOPIC_HEALTH: &str = "droid/state/health"; // health status

// Serial port of the BLE bridge board
pub const BRIDGE_PORT: &str = "/dev/ttyUSB0";

/// What to do with a value wider than its wire field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldOverflow {
    /// Fail with a validation error
    #[default]
    Reject,
    /// Clamp to the field maximum and log a warning
    Saturate,
}

/// Tunables for the motor controller, loadable from JSON.
///
/// `default_speed` and `default_ramp` fill in head rotations that omit them;
/// `default_ramp` is also the ramp of translated drive intents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub default_speed: u32,
    pub default_ramp: u32,
    pub overflow: FieldOverflow,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            default_speed: DEFAULT_SPEED,
            default_ramp: DEFAULT_RAMP,
            overflow: FieldOverflow::Reject,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(#[from] ValidationError),
}

impl ControllerConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults must fit their wire fields whatever the overflow policy
    pub fn validate(&self) -> Result<(), ValidationError> {
        let max = field_max(BYTE_WIDTH);
        for (field, value) in [
            ("default_speed", self.default_speed),
            ("default_ramp", self.default_ramp),
        ] {
            if value > max {
                return Err(ValidationError::OutOfRange { field, value, max });
            }
        }
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ControllerConfig::default();
        assert_eq!(config.default_speed, 160);
        assert_eq!(config.default_ramp, 0xFF);
        assert_eq!(config.overflow, FieldOverflow::Reject);
    }

    #[test]
    fn test_partial_json() {
        let config = ControllerConfig::from_json(r#"{"overflow": "saturate"}"#).unwrap();
        assert_eq!(config.overflow, FieldOverflow::Saturate);
        assert_eq!(config.default_speed, 160);

        let config = ControllerConfig::from_json(r#"{"default_ramp": 48}"#).unwrap();
        assert_eq!(config.default_ramp, 48);
    }

    #[test]
    fn test_rejects_defaults_wider_than_a_byte() {
        let err = ControllerConfig::from_json(r#"{"default_ramp": 300}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid(ValidationError::OutOfRange {
                field: "default_ramp",
                value: 300,
                max: 0xFF
            })
        ));

        // Saturation does not excuse a bad default
        let err = ControllerConfig::from_json(r#"{"default_speed": 256, "overflow": "saturate"}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        assert!(ControllerConfig::from_json(r#"{"default_speed": 255, "default_ramp": 255}"#).is_ok());
    }

    #[test]
    fn test_bad_json() {
        assert!(ControllerConfig::from_json(r#"{"overflow": "wrap"}"#).is_err());
    }
}
