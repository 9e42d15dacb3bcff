// Motor command layer for the droid
//
// Provides:
// - Fixed-width hex field encoding
// - Motor speed / head rotation / head centering payload codec
// - Differential drive translation (speed + angle -> left/right)
// - Motor telemetry event registry
// - High-level controller issuing commands over a transport link

pub mod codec;
mod controller;
pub mod drive;
pub mod events;
pub mod hex;

pub use codec::{
    CommandId, Direction, MotorCommand, MotorIdentifier, RotationSide, WireDirection,
    DEFAULT_CENTER_OFFSET, DEFAULT_CENTER_SPEED, DEFAULT_DELAY, DEFAULT_RAMP, DEFAULT_SPEED,
};
pub use controller::MotorController;
pub use drive::{calculate_motor_speeds, normalize_values_to_motor, DriveIntent};
pub use events::{MotorEvent, MotorEventHandler, MotorEvents};
