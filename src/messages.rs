// Define message types for the runtime

use serde::{Deserialize, Serialize};

use crate::motor::{RotationSide, DEFAULT_CENTER_OFFSET, DEFAULT_CENTER_SPEED};

pub use crate::motor::DriveIntent;

fn default_center_speed() -> u32 {
    DEFAULT_CENTER_SPEED
}

fn default_center_offset() -> u32 {
    DEFAULT_CENTER_OFFSET
}

// Head command from teleop/scripts -> runtime
// e.g. {"action": "rotate", "direction": "left"} or {"action": "center"}
// A rotation without speed/ramp uses the controller's configured defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum HeadCommand {
    Rotate {
        direction: RotationSide,
        #[serde(default)]
        speed: Option<u32>,
        #[serde(default)]
        ramp: Option<u32>,
    },
    Center {
        #[serde(default = "default_center_speed")]
        speed: u32,
        #[serde(default = "default_center_offset")]
        offset: u32,
    },
}

/// Health status published by runtime
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeHealth {
    Ok,
    IntentStale,
    LinkError,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drive_intent_json() {
        let intent: DriveIntent = serde_json::from_str(r#"{"speed": -40, "angle": 25}"#).unwrap();
        assert_eq!(intent, DriveIntent { speed: -40, angle: 25 });
    }

    #[test]
    fn test_head_command_defaults() {
        let cmd: HeadCommand =
            serde_json::from_str(r#"{"action": "rotate", "direction": "right"}"#).unwrap();
        assert_eq!(
            cmd,
            HeadCommand::Rotate {
                direction: RotationSide::Right,
                speed: None,
                ramp: None
            }
        );

        let cmd: HeadCommand = serde_json::from_str(
            r#"{"action": "rotate", "direction": "left", "speed": 80, "ramp": 48}"#,
        )
        .unwrap();
        assert_eq!(
            cmd,
            HeadCommand::Rotate {
                direction: RotationSide::Left,
                speed: Some(80),
                ramp: Some(48)
            }
        );

        let cmd: HeadCommand = serde_json::from_str(r#"{"action": "center"}"#).unwrap();
        assert_eq!(
            cmd,
            HeadCommand::Center {
                speed: 255,
                offset: 0
            }
        );
    }

    #[test]
    fn test_health_json() {
        assert_eq!(
            serde_json::to_string(&RuntimeHealth::IntentStale).unwrap(),
            r#""intent_stale""#
        );
    }
}
