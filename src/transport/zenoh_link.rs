// Zenoh link: publishes command frames for a BLE bridge node to pick up

use tracing::debug;
use zenoh::pubsub::Publisher;

use super::{CommandFrame, Transport};
use crate::config::TOPIC_RT_MOTOR;
use crate::error::TransportError;
use crate::motor::CommandId;

pub struct ZenohTransport {
    publisher: Publisher<'static>,
}

impl ZenohTransport {
    /// Declare the actuation publisher on an open session
    pub async fn declare(session: &zenoh::Session) -> Result<Self, TransportError> {
        let publisher = session
            .declare_publisher(TOPIC_RT_MOTOR)
            .await
            .map_err(|e| TransportError::Zenoh(e.to_string()))?;
        Ok(Self { publisher })
    }
}

impl Transport for ZenohTransport {
    async fn send(&mut self, command: CommandId, payload: &str) -> Result<(), TransportError> {
        let frame = serde_json::to_string(&CommandFrame::new(command, payload))?;
        debug!("Publishing to {}: {}", TOPIC_RT_MOTOR, frame);
        self.publisher
            .put(frame)
            .await
            .map_err(|e| TransportError::Zenoh(e.to_string()))
    }
}
