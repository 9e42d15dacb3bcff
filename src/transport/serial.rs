// Serial link to a BLE bridge board
//
// The bridge forwards each line `<command>:<payload>\n` as one characteristic write.

use serialport::{self, SerialPort};
use std::io::Write;
use std::time::Duration;
use tracing::debug;

use super::{CommandFrame, Transport};
use crate::error::TransportError;
use crate::motor::CommandId;

/// Default serial configuration for the bridge
pub const DEFAULT_BAUDRATE: u32 = 115_200;
pub const DEFAULT_TIMEOUT_MS: u64 = 100;

pub struct SerialTransport {
    port: Box<dyn SerialPort>,
}

impl SerialTransport {
    /// Open a new connection to the bridge
    pub fn open(port_name: &str) -> Result<Self, TransportError> {
        Self::open_with_baudrate(port_name, DEFAULT_BAUDRATE)
    }

    /// Open with custom baudrate
    pub fn open_with_baudrate(port_name: &str, baudrate: u32) -> Result<Self, TransportError> {
        let port = serialport::new(port_name, baudrate)
            .timeout(Duration::from_millis(DEFAULT_TIMEOUT_MS))
            .open()?;

        Ok(Self { port })
    }
}

impl std::fmt::Debug for SerialTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialTransport")
            .field("port", &self.port.name())
            .finish()
    }
}

impl Transport for SerialTransport {
    async fn send(&mut self, command: CommandId, payload: &str) -> Result<(), TransportError> {
        let line = CommandFrame::new(command, payload).to_line();
        debug!("Serial write: {}", line.trim_end());
        self.port.write_all(line.as_bytes())?;
        self.port.flush()?;
        Ok(())
    }
}
