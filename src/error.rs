// Error types for command encoding and transmission

use crate::motor::CommandId;

/// A value fell outside its documented domain. Raised before any payload is built.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid direction code {0}: expected 0 (Forward/Left) or 8 (Backwards/Right)")]
    Direction(u8),

    #[error("Invalid motor identifier {0}")]
    MotorId(u8),

    #[error("{field} {value} is out of range 0..={max}")]
    OutOfRange {
        field: &'static str,
        value: u32,
        max: u32,
    },

    #[error("Drive intent {field} {value} is out of range -100..=100")]
    Intent { field: &'static str, value: i32 },

    #[error("Unknown motor event code {0}")]
    UnknownEvent(u8),
}

/// A value does not fit the fixed hex width of its field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Value {value} does not fit in {width} hex digits")]
pub struct EncodingOverflowError {
    pub value: u32,
    pub width: usize,
}

/// Failure to parse a motor speed payload back into a command.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("Payload has {actual} characters, expected {expected}")]
    Length { expected: usize, actual: usize },

    #[error("Malformed hex field {0:?}")]
    MalformedHex(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Errors raised by a transport link. Passed through untouched by the controller.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Zenoh publish failed: {0}")]
    Zenoh(String),

    #[error("Failed to serialize frame: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Link closed")]
    Closed,
}

/// Errors surfaced by the controller's operations.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Encoding(#[from] EncodingOverflowError),

    #[error("Command {step} ({command:?} {payload}) failed: {source}")]
    Transport {
        /// 1-based position of the failed command within its operation
        step: usize,
        command: CommandId,
        payload: String,
        #[source]
        source: TransportError,
    },
}

pub type Result<T> = std::result::Result<T, CommandError>;
