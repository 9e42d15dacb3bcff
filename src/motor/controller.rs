// High-level motor controller for the droid
//
// Builds command payloads and hands them to a transport link, one command at a
// time and in order. Every payload of an operation is built and validated
// before the first write, so a bad argument never reaches the link.

use tracing::{debug, info, warn};

use super::codec::{
    build_center_head_command, build_head_command, build_speed_command, CommandId, Direction,
    MotorIdentifier, RotationSide, WireDirection, DEFAULT_DELAY, DEFAULT_RAMP,
};
use super::drive::{translate, DriveIntent};
use super::events::{MotorEvent, MotorEventHandler, MotorEvents};
use super::hex::{field_max, BYTE_WIDTH, DELAY_WIDTH};
use crate::config::{ControllerConfig, FieldOverflow};
use crate::error::{CommandError, Result, ValidationError};
use crate::transport::Transport;

type Frame = (CommandId, String);

/// Stateless command issuer plus the motor event registry
#[derive(Debug, Clone, Default)]
pub struct MotorController {
    config: ControllerConfig,
    events: MotorEvents,
}

impl MotorController {
    pub fn new(config: ControllerConfig) -> Self {
        Self {
            config,
            events: MotorEvents::new(),
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn events(&self) -> &MotorEvents {
        &self.events
    }

    /// Apply the overflow policy to a field value
    fn fit(
        &self,
        field: &'static str,
        value: u32,
        width: usize,
    ) -> std::result::Result<u32, ValidationError> {
        let max = field_max(width);
        if value <= max {
            return Ok(value);
        }
        match self.config.overflow {
            FieldOverflow::Reject => Err(ValidationError::OutOfRange { field, value, max }),
            FieldOverflow::Saturate => {
                warn!("{} {} does not fit its field, sending {}", field, value, max);
                Ok(max)
            }
        }
    }

    fn speed_frame(
        &self,
        direction: impl WireDirection,
        motor: MotorIdentifier,
        speed: u32,
        ramp: u32,
        delay: u32,
    ) -> Result<Frame> {
        let payload = build_speed_command(
            direction,
            motor,
            self.fit("speed", speed, BYTE_WIDTH)?,
            self.fit("ramp", ramp, BYTE_WIDTH)?,
            self.fit("delay", delay, DELAY_WIDTH)?,
        )?;
        Ok((CommandId::SetMotorSpeed, payload))
    }

    /// Send frames in order, stopping at the first failure
    async fn issue<T: Transport>(link: &mut T, frames: Vec<Frame>) -> Result<()> {
        let total = frames.len();
        for (index, (command, payload)) in frames.into_iter().enumerate() {
            debug!("Sending {} {} ({}/{})", command, payload, index + 1, total);
            if let Err(source) = link.send(command, &payload).await {
                warn!(
                    "{} {} failed ({}/{}): {}",
                    command,
                    payload,
                    index + 1,
                    total,
                    source
                );
                return Err(CommandError::Transport {
                    step: index + 1,
                    command,
                    payload,
                    source,
                });
            }
        }
        Ok(())
    }

    /// Send a speed command to a single motor
    pub async fn set_motor_speed<T: Transport>(
        &self,
        link: &mut T,
        direction: impl WireDirection,
        motor: MotorIdentifier,
        speed: u32,
        ramp: u32,
        delay: u32,
    ) -> Result<()> {
        let frame = self.speed_frame(direction, motor, speed, ramp, delay)?;
        Self::issue(link, vec![frame]).await
    }

    /// Drive both wheels the same way: LeftMotor then RightMotor
    pub async fn set_drive_speed<T: Transport>(
        &self,
        link: &mut T,
        direction: Direction,
        speed: u32,
        ramp: u32,
    ) -> Result<()> {
        let frames = vec![
            self.speed_frame(direction, MotorIdentifier::LeftMotor, speed, ramp, DEFAULT_DELAY)?,
            self.speed_frame(direction, MotorIdentifier::RightMotor, speed, ramp, DEFAULT_DELAY)?,
        ];
        Self::issue(link, frames).await
    }

    /// Rotate in place: the right wheel gets the opposite side of the left
    pub async fn set_rotation_speed<T: Transport>(
        &self,
        link: &mut T,
        side: RotationSide,
        speed: u32,
        ramp: u32,
    ) -> Result<()> {
        let frames = vec![
            self.speed_frame(side, MotorIdentifier::LeftMotor, speed, ramp, DEFAULT_DELAY)?,
            self.speed_frame(
                side.opposite(),
                MotorIdentifier::RightMotor,
                speed,
                ramp,
                DEFAULT_DELAY,
            )?,
        ];
        Self::issue(link, frames).await
    }

    /// Rotate the head. Both head units get the same payload, B unit first.
    pub async fn set_head_speed<T: Transport>(
        &self,
        link: &mut T,
        direction: impl WireDirection,
        speed: u32,
        ramp: u32,
    ) -> Result<()> {
        let payload = build_head_command(
            direction,
            self.fit("speed", speed, BYTE_WIDTH)?,
            self.fit("ramp", ramp, BYTE_WIDTH)?,
        )?;
        let frames = vec![
            (CommandId::RotateBUnitHead, payload.clone()),
            (CommandId::RotateRUnitHead, payload),
        ];
        Self::issue(link, frames).await
    }

    /// Bring the head back to center, optionally offset
    pub async fn center_head<T: Transport>(
        &self,
        link: &mut T,
        speed: u32,
        offset: u32,
    ) -> Result<()> {
        let payload = build_center_head_command(
            self.fit("speed", speed, BYTE_WIDTH)?,
            self.fit("offset", offset, BYTE_WIDTH)?,
        )?;
        Self::issue(link, vec![(CommandId::CenterRUnitHead, payload)]).await
    }

    /// Zero speed to every motor, in ascending identifier order.
    /// Uses the fixed default ramp so no configuration can block a stop.
    pub async fn stop_all_motors<T: Transport>(&self, link: &mut T) -> Result<()> {
        info!("Stopping all motors");
        let frames = MotorIdentifier::ALL
            .into_iter()
            .map(|motor| {
                self.speed_frame(RotationSide::Left, motor, 0, DEFAULT_RAMP, DEFAULT_DELAY)
            })
            .collect::<Result<Vec<_>>>()?;
        Self::issue(link, frames).await
    }

    /// Translate a drive intent and send it to both wheels
    pub async fn drive<T: Transport>(&self, link: &mut T, intent: DriveIntent) -> Result<()> {
        intent.validate()?;
        let sides = translate(intent);
        debug!(
            "Drive speed={} angle={}: left={:?} right={:?}",
            intent.speed, intent.angle, sides.left, sides.right
        );

        let ramp = self.config.default_ramp;
        let (left_dir, left_speed) = sides.left;
        let (right_dir, right_speed) = sides.right;
        let frames = vec![
            self.speed_frame(left_dir, MotorIdentifier::LeftMotor, left_speed, ramp, DEFAULT_DELAY)?,
            self.speed_frame(
                right_dir,
                MotorIdentifier::RightMotor,
                right_speed,
                ramp,
                DEFAULT_DELAY,
            )?,
        ];
        Self::issue(link, frames).await
    }

    pub fn subscribe_motor_events(&self, handler: &MotorEventHandler) -> bool {
        self.events.subscribe(handler)
    }

    pub fn unsubscribe_motor_events(&self, handler: &MotorEventHandler) -> bool {
        self.events.unsubscribe(handler)
    }

    /// Decode a telemetry code reported by the droid and notify subscribers
    pub fn process_motor_event(
        &self,
        code: u8,
    ) -> std::result::Result<MotorEvent, ValidationError> {
        let event = MotorEvent::try_from(code)?;
        debug!("Motor event {:?}", event);
        self.events.dispatch(event);
        Ok(event)
    }
}
