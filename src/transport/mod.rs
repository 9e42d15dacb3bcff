// Links that carry encoded command payloads to the droid
//
// A link is a single logical connection and is not shared between concurrent
// writers; `send` takes `&mut self` so callers serialize writes themselves
// (wrap the link in a `tokio::sync::Mutex` to share it).

use serde::{Deserialize, Serialize};

use crate::error::TransportError;
use crate::motor::CommandId;

mod dry_run;
mod serial;
mod zenoh_link;

pub use dry_run::DryRunTransport;
pub use serial::{SerialTransport, DEFAULT_BAUDRATE};
pub use zenoh_link::ZenohTransport;

/// Consumer of encoded payloads
pub trait Transport {
    /// Write one payload. Completes once the link accepted it.
    fn send(
        &mut self,
        command: CommandId,
        payload: &str,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;
}

/// A command as it travels over message-based links
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandFrame {
    pub command: CommandId,
    pub payload: String,
}

impl CommandFrame {
    pub fn new(command: CommandId, payload: &str) -> Self {
        Self {
            command,
            payload: payload.to_string(),
        }
    }

    /// Line form used by the serial bridge: `<command>:<payload>\n`
    pub fn to_line(&self) -> String {
        format!("{}:{}\n", self.command.as_str(), self.payload)
    }
}
