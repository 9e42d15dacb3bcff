// Droid motor command codec
//
// Payload layouts (hex, no separators):
//   Motor speed:    direction(1) motor(1) speed(2) ramp(2) delay(4)
//   Head rotation:  dir(2, "00"/"FF") speed(2) ramp(2) "0000"
//   Head centering: speed(2) offset(2)

use std::fmt;

use serde::{Deserialize, Serialize};

use super::hex::{decode_hex, encode_hex, field_max, BYTE_WIDTH, DELAY_WIDTH};
use crate::error::{CommandError, DecodeError, EncodingOverflowError, ValidationError};

/// Default drive speed on the device scale
pub const DEFAULT_SPEED: u32 = 160;

/// Default ramp. The widest value a 2-digit ramp field can carry.
pub const DEFAULT_RAMP: u32 = 0xFF;

pub const DEFAULT_DELAY: u32 = 0;

pub const DEFAULT_CENTER_SPEED: u32 = 255;
pub const DEFAULT_CENTER_OFFSET: u32 = 0;

/// Length of an encoded motor speed payload
pub const MOTOR_PAYLOAD_LEN: usize = 2 + 2 * BYTE_WIDTH + DELAY_WIDTH;

const HEAD_FORWARD: &str = "00";
const HEAD_BACKWARDS: &str = "FF";
const HEAD_TRAILER: &str = "0000";

const CODE_FORWARD: u8 = 0;
const CODE_BACKWARDS: u8 = 8;

/// Translation direction of a drive motor
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Forward = CODE_FORWARD,
    Backwards = CODE_BACKWARDS,
}

/// Side a rotation turns towards.
///
/// Shares its wire codes with [`Direction`] (Left = Forward = 0, Right = Backwards = 8)
/// but is a separate axis: it only appears in in-place rotation and head commands.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationSide {
    Left = CODE_FORWARD,
    Right = CODE_BACKWARDS,
}

impl RotationSide {
    pub fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// Anything that can be written into the direction nibble of a payload.
///
/// Raw `u8` codes are accepted for callers that receive numeric directions;
/// they are validated when the payload is built.
pub trait WireDirection: Copy + fmt::Debug + Send {
    fn wire_code(self) -> u8;
}

impl WireDirection for Direction {
    fn wire_code(self) -> u8 {
        self as u8
    }
}

impl WireDirection for RotationSide {
    fn wire_code(self) -> u8 {
        self as u8
    }
}

impl WireDirection for u8 {
    fn wire_code(self) -> u8 {
        self
    }
}

/// Check that a direction code is one the device understands
pub fn validate_direction(direction: impl WireDirection) -> Result<u8, ValidationError> {
    match direction.wire_code() {
        code @ (CODE_FORWARD | CODE_BACKWARDS) => Ok(code),
        code => Err(ValidationError::Direction(code)),
    }
}

impl TryFrom<u8> for Direction {
    type Error = ValidationError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match validate_direction(code)? {
            CODE_FORWARD => Ok(Self::Forward),
            _ => Ok(Self::Backwards),
        }
    }
}

impl TryFrom<u8> for RotationSide {
    type Error = ValidationError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match validate_direction(code)? {
            CODE_FORWARD => Ok(Self::Left),
            _ => Ok(Self::Right),
        }
    }
}

/// Motors addressable with a speed command
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MotorIdentifier {
    LeftMotor = 0,
    RightMotor = 1,
    HeadMotor = 2,
}

impl MotorIdentifier {
    /// All motors in ascending identifier order
    pub const ALL: [MotorIdentifier; 3] = [Self::LeftMotor, Self::RightMotor, Self::HeadMotor];
}

impl TryFrom<u8> for MotorIdentifier {
    type Error = ValidationError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|motor| *motor as u8 == id)
            .ok_or(ValidationError::MotorId(id))
    }
}

/// Command identifiers handed to the transport together with a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandId {
    SetMotorSpeed,
    RotateBUnitHead,
    RotateRUnitHead,
    CenterRUnitHead,
}

impl CommandId {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SetMotorSpeed => "set_motor_speed",
            Self::RotateBUnitHead => "rotate_b_unit_head",
            Self::RotateRUnitHead => "rotate_r_unit_head",
            Self::CenterRUnitHead => "center_r_unit_head",
        }
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ensure `value` fits a field of `width` hex digits
pub(crate) fn check_field(
    field: &'static str,
    value: u32,
    width: usize,
) -> Result<u32, ValidationError> {
    let max = field_max(width);
    if value > max {
        return Err(ValidationError::OutOfRange { field, value, max });
    }
    Ok(value)
}

/// A validated motor speed command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotorCommand {
    direction: u8,
    motor: MotorIdentifier,
    speed: u8,
    ramp: u8,
    delay: u16,
}

impl MotorCommand {
    pub fn new(
        direction: impl WireDirection,
        motor: MotorIdentifier,
        speed: u32,
        ramp: u32,
        delay: u32,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            direction: validate_direction(direction)?,
            motor,
            speed: check_field("speed", speed, BYTE_WIDTH)? as u8,
            ramp: check_field("ramp", ramp, BYTE_WIDTH)? as u8,
            delay: check_field("delay", delay, DELAY_WIDTH)? as u16,
        })
    }

    /// Parse a motor speed payload (hex digits in either case)
    pub fn parse(payload: &str) -> Result<Self, DecodeError> {
        if !payload.is_ascii() {
            return Err(DecodeError::MalformedHex(payload.to_string()));
        }
        if payload.len() != MOTOR_PAYLOAD_LEN {
            return Err(DecodeError::Length {
                expected: MOTOR_PAYLOAD_LEN,
                actual: payload.len(),
            });
        }

        let direction = decode_hex(&payload[0..1])? as u8;
        let motor = MotorIdentifier::try_from(decode_hex(&payload[1..2])? as u8)?;
        let speed = decode_hex(&payload[2..4])?;
        let ramp = decode_hex(&payload[4..6])?;
        let delay = decode_hex(&payload[6..10])?;

        Ok(Self::new(direction, motor, speed, ramp, delay)?)
    }

    /// Wire code of the direction nibble (0 or 8)
    pub fn direction_code(&self) -> u8 {
        self.direction
    }

    /// Direction nibble read as a translation direction
    pub fn direction(&self) -> Direction {
        match self.direction {
            CODE_FORWARD => Direction::Forward,
            _ => Direction::Backwards,
        }
    }

    /// Direction nibble read as a rotation side
    pub fn rotation_side(&self) -> RotationSide {
        match self.direction {
            CODE_FORWARD => RotationSide::Left,
            _ => RotationSide::Right,
        }
    }

    pub fn motor(&self) -> MotorIdentifier {
        self.motor
    }

    pub fn speed(&self) -> u8 {
        self.speed
    }

    pub fn ramp(&self) -> u8 {
        self.ramp
    }

    pub fn delay(&self) -> u16 {
        self.delay
    }

    /// Serialize to the motor speed payload
    pub fn encode(&self) -> Result<String, EncodingOverflowError> {
        Ok(format!(
            "{}{}{}{}",
            motor_select(self.direction, self.motor),
            encode_hex(u32::from(self.speed), BYTE_WIDTH)?,
            encode_hex(u32::from(self.ramp), BYTE_WIDTH)?,
            encode_hex(u32::from(self.delay), DELAY_WIDTH)?,
        ))
    }
}

fn motor_select(code: u8, motor: MotorIdentifier) -> String {
    format!("{:X}{:X}", code, motor as u8)
}

/// Two-digit token selecting direction and motor
pub fn build_motor_select(
    direction: impl WireDirection,
    motor: MotorIdentifier,
) -> Result<String, ValidationError> {
    let code = validate_direction(direction)?;
    Ok(motor_select(code, motor))
}

/// Payload for a single motor speed command
pub fn build_speed_command(
    direction: impl WireDirection,
    motor: MotorIdentifier,
    speed: u32,
    ramp: u32,
    delay: u32,
) -> Result<String, CommandError> {
    let command = MotorCommand::new(direction, motor, speed, ramp, delay)?;
    Ok(command.encode()?)
}

/// Payload for a head rotation command.
///
/// The direction is carried as a whole byte ("00" / "FF"), not as the
/// motor-select nibble used by drive motors.
pub fn build_head_command(
    direction: impl WireDirection,
    speed: u32,
    ramp: u32,
) -> Result<String, CommandError> {
    let dir = match validate_direction(direction)? {
        CODE_FORWARD => HEAD_FORWARD,
        _ => HEAD_BACKWARDS,
    };
    let speed = check_field("speed", speed, BYTE_WIDTH)?;
    let ramp = check_field("ramp", ramp, BYTE_WIDTH)?;

    Ok(format!(
        "{}{}{}{}",
        dir,
        encode_hex(speed, BYTE_WIDTH)?,
        encode_hex(ramp, BYTE_WIDTH)?,
        HEAD_TRAILER
    ))
}

/// Payload for the head centering command
pub fn build_center_head_command(speed: u32, offset: u32) -> Result<String, CommandError> {
    let speed = check_field("speed", speed, BYTE_WIDTH)?;
    let offset = check_field("offset", offset, BYTE_WIDTH)?;

    Ok(format!(
        "{}{}",
        encode_hex(speed, BYTE_WIDTH)?,
        encode_hex(offset, BYTE_WIDTH)?
    ))
}
