// Link that only logs, for running without hardware

use tracing::info;

use super::Transport;
use crate::error::TransportError;
use crate::motor::CommandId;

#[derive(Debug, Default)]
pub struct DryRunTransport {
    sent: u64,
}

impl DryRunTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of payloads accepted so far
    pub fn sent(&self) -> u64 {
        self.sent
    }
}

impl Transport for DryRunTransport {
    async fn send(&mut self, command: CommandId, payload: &str) -> Result<(), TransportError> {
        self.sent += 1;
        info!("[dry-run] {} {}", command, payload);
        Ok(())
    }
}
