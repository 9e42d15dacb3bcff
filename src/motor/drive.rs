// Differential drive translation for the droid base
// Converts a (speed, angle) intent into left/right motor speeds.

use serde::{Deserialize, Serialize};

use super::codec::Direction;
use crate::error::ValidationError;

/// Application-level speed/angle bounds
pub const INTENT_MIN: i32 = -100;
pub const INTENT_MAX: i32 = 100;

/// Gain from the [-100, 100] application range onto the device speed scale
pub const MOTOR_SPEED_GAIN: f64 = 1.6;

/// Requested motion: both axes in [-100, 100].
/// Positive angle turns right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DriveIntent {
    pub speed: i32,
    pub angle: i32,
}

impl DriveIntent {
    /// Build an intent, rejecting out-of-range axes
    pub fn new(speed: i32, angle: i32) -> Result<Self, ValidationError> {
        let intent = Self { speed, angle };
        intent.validate()?;
        Ok(intent)
    }

    /// Build an intent, saturating raw input into range
    pub fn clamped(speed: i32, angle: i32) -> Self {
        Self {
            speed: speed.clamp(INTENT_MIN, INTENT_MAX),
            angle: angle.clamp(INTENT_MIN, INTENT_MAX),
        }
    }

    pub fn stop() -> Self {
        Self::default()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [("speed", self.speed), ("angle", self.angle)] {
            if !(INTENT_MIN..=INTENT_MAX).contains(&value) {
                return Err(ValidationError::Intent { field, value });
            }
        }
        Ok(())
    }
}

impl Direction {
    /// Direction for a signed side speed: negative drives backwards
    pub fn from_signed(speed: i32) -> Self {
        if speed < 0 {
            Self::Backwards
        } else {
            Self::Forward
        }
    }
}

/// Mix speed and angle into saturated (left, right) side speeds
pub fn calculate_motor_speeds(speed: i32, angle: i32) -> (i32, i32) {
    let mut left = speed;
    let mut right = speed;

    // Turning right slows the left side and speeds up the right
    if angle > 0 {
        left = left.saturating_sub(angle);
        right = right.saturating_add(angle);
    } else if angle < 0 {
        let turn = angle.saturating_abs();
        left = left.saturating_add(turn);
        right = right.saturating_sub(turn);
    }

    (
        left.clamp(INTENT_MIN, INTENT_MAX),
        right.clamp(INTENT_MIN, INTENT_MAX),
    )
}

/// Scale one side onto the device speed scale. Truncates toward zero and drops the sign.
fn scale_to_motor(speed: i32) -> u32 {
    let scaled = (f64::from(speed) * MOTOR_SPEED_GAIN) as i64;
    scaled.unsigned_abs() as u32
}

/// Map signed side speeds onto unsigned device magnitudes.
///
/// The sign is lost here, so take [`Direction::from_signed`] of the inputs first.
pub fn normalize_values_to_motor(left: i32, right: i32) -> (u32, u32) {
    (scale_to_motor(left), scale_to_motor(right))
}

/// Per-side direction and device magnitude for one intent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SideSpeeds {
    pub left: (Direction, u32),
    pub right: (Direction, u32),
}

/// Translate an intent into per-side direction and magnitude
pub fn translate(intent: DriveIntent) -> SideSpeeds {
    let (left, right) = calculate_motor_speeds(intent.speed, intent.angle);

    // Direction comes from the signed values, before normalization drops the sign
    let left_dir = Direction::from_signed(left);
    let right_dir = Direction::from_signed(right);

    let (left_mag, right_mag) = normalize_values_to_motor(left, right);

    SideSpeeds {
        left: (left_dir, left_mag),
        right: (right_dir, right_mag),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_straight_ahead() {
        assert_eq!(calculate_motor_speeds(50, 0), (50, 50));
        assert_eq!(calculate_motor_speeds(0, 0), (0, 0));
        assert_eq!(calculate_motor_speeds(-40, 0), (-40, -40));
    }

    #[test]
    fn test_turning() {
        assert_eq!(calculate_motor_speeds(50, 30), (20, 80));
        assert_eq!(calculate_motor_speeds(50, -30), (80, 20));
        // Pure rotation from standstill
        assert_eq!(calculate_motor_speeds(0, 40), (-40, 40));
    }

    #[test]
    fn test_saturation() {
        // Left saturates at -100 rather than wrapping to 0
        assert_eq!(calculate_motor_speeds(90, 90), (0, 100));
        assert_eq!(calculate_motor_speeds(-90, 90), (-100, 0));
        assert_eq!(calculate_motor_speeds(100, -100), (100, 0));
        assert_eq!(calculate_motor_speeds(-100, -100), (0, -100));
        assert_eq!(calculate_motor_speeds(i32::MAX, i32::MIN), (100, 0));
    }

    #[test]
    fn test_outputs_stay_in_range() {
        for speed in (INTENT_MIN..=INTENT_MAX).step_by(5) {
            for angle in (INTENT_MIN..=INTENT_MAX).step_by(5) {
                let (left, right) = calculate_motor_speeds(speed, angle);
                assert!((INTENT_MIN..=INTENT_MAX).contains(&left));
                assert!((INTENT_MIN..=INTENT_MAX).contains(&right));
            }
        }
    }

    #[test]
    fn test_normalization() {
        assert_eq!(normalize_values_to_motor(-50, 50), (80, 80));
        // Truncation, not rounding: 63 * 1.6 = 100.8
        assert_eq!(normalize_values_to_motor(63, 63), (100, 100));
        assert_eq!(normalize_values_to_motor(-63, 0), (100, 0));
        assert_eq!(normalize_values_to_motor(100, -100), (160, 160));
        assert_eq!(normalize_values_to_motor(1, -1), (1, 1));
    }

    #[test]
    fn test_direction_from_signed_values() {
        let (left, right) = (-50, 50);
        assert_eq!(Direction::from_signed(left), Direction::Backwards);
        assert_eq!(Direction::from_signed(right), Direction::Forward);
        assert_eq!(Direction::from_signed(0), Direction::Forward);
    }

    #[test]
    fn test_translate() {
        let sides = translate(DriveIntent::new(0, 50).unwrap());
        assert_eq!(sides.left, (Direction::Backwards, 80));
        assert_eq!(sides.right, (Direction::Forward, 80));

        let sides = translate(DriveIntent::new(-100, 0).unwrap());
        assert_eq!(sides.left, (Direction::Backwards, 160));
        assert_eq!(sides.right, (Direction::Backwards, 160));
    }

    #[test]
    fn test_intent_validation() {
        assert!(DriveIntent::new(100, -100).is_ok());
        assert_eq!(
            DriveIntent::new(101, 0),
            Err(ValidationError::Intent {
                field: "speed",
                value: 101
            })
        );
        assert_eq!(
            DriveIntent::new(0, -150),
            Err(ValidationError::Intent {
                field: "angle",
                value: -150
            })
        );
        assert_eq!(
            DriveIntent::clamped(250, -250),
            DriveIntent {
                speed: 100,
                angle: -100
            }
        );
    }
}
