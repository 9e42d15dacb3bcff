// Drive loop with watchdog
// Note: the watchdog stops the droid once when drive intents stop arriving
// Eg. if teleop crashes mid-turn, the droid does not keep spinning

use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::ValueEnum;
use tokio::time::interval;
use tracing::{info, warn};

use crate::config::{
    ControllerConfig, BRIDGE_PORT, INTENT_TIMEOUT, LOOP_HZ, TOPIC_CMD_DRIVE, TOPIC_CMD_HEAD,
    TOPIC_HEALTH, TOPIC_MOTOR_EVENTS, TOPIC_RT_MOTOR,
};
use crate::error::Result;
use crate::messages::{DriveIntent, HeadCommand, RuntimeHealth};
use crate::motor::{MotorController, MotorEvent, MotorEventHandler};
use crate::transport::{
    DryRunTransport, SerialTransport, Transport, ZenohTransport, DEFAULT_BAUDRATE,
};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Which link carries payloads to the droid
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Link {
    /// Publish frames on zenoh for a bridge node
    Zenoh,
    /// Write lines to a serial BLE bridge
    Serial,
    /// Log payloads only
    DryRun,
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub link: Link,
    pub port: String,
    pub baud: u32,
    pub controller: ControllerConfig,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            link: Link::DryRun,
            port: BRIDGE_PORT.to_string(),
            baud: DEFAULT_BAUDRATE,
            controller: ControllerConfig::default(),
        }
    }
}

pub struct Runtime<T> {
    controller: MotorController,
    link: T,
    latest_intent: Option<DriveIntent>,
    intent_received_at: Instant,
    intent_timeout: Duration,
    last_sent: Option<DriveIntent>,
    health: RuntimeHealth,
}

impl<T: Transport> Runtime<T> {
    pub fn new(controller: MotorController, link: T) -> Self {
        Self {
            controller,
            link,
            latest_intent: None,
            intent_received_at: Instant::now(),
            intent_timeout: INTENT_TIMEOUT,
            last_sent: None,
            health: RuntimeHealth::IntentStale, // Start stale until first intent
        }
    }

    pub fn controller(&self) -> &MotorController {
        &self.controller
    }

    pub fn link(&self) -> &T {
        &self.link
    }

    pub fn health(&self) -> RuntimeHealth {
        self.health
    }

    /// Process incoming drive intent. Raw input is saturated into range.
    pub fn on_intent(&mut self, intent: DriveIntent) {
        let intent = DriveIntent::clamped(intent.speed, intent.angle);
        info!("Received intent: {:?}", &intent);
        self.latest_intent = Some(intent);
        self.intent_received_at = Instant::now();
    }

    /// Head commands are sent immediately
    pub async fn on_head(&mut self, cmd: HeadCommand) -> Result<()> {
        info!("Received head command: {:?}", &cmd);
        let result = match cmd {
            HeadCommand::Rotate {
                direction,
                speed,
                ramp,
            } => {
                let config = self.controller.config();
                let speed = speed.unwrap_or(config.default_speed);
                let ramp = ramp.unwrap_or(config.default_ramp);
                self.controller
                    .set_head_speed(&mut self.link, direction, speed, ramp)
                    .await
            }
            HeadCommand::Center { speed, offset } => {
                self.controller
                    .center_head(&mut self.link, speed, offset)
                    .await
            }
        };
        self.track(result)
    }

    /// Apply the latest intent, or stop if it went stale
    pub async fn apply(&mut self) -> Result<()> {
        self.apply_at(Instant::now()).await
    }

    async fn apply_at(&mut self, now: Instant) -> Result<()> {
        let age = now.saturating_duration_since(self.intent_received_at);
        let fresh = self.latest_intent.filter(|_| age <= self.intent_timeout);

        let result = match fresh {
            Some(intent) => self.send_intent(intent).await,
            None => self.stop_stale(age).await,
        };
        self.track(result)
    }

    async fn send_intent(&mut self, intent: DriveIntent) -> Result<()> {
        // Only changes go over the link
        if self.last_sent != Some(intent) {
            self.controller.drive(&mut self.link, intent).await?;
            self.last_sent = Some(intent);
        }
        self.health = RuntimeHealth::Ok;
        Ok(())
    }

    async fn stop_stale(&mut self, age: Duration) -> Result<()> {
        if self.last_sent.is_some() {
            warn!("Drive intent stale ({:?} old), stopping droid", age);
            self.controller.stop_all_motors(&mut self.link).await?;
            self.last_sent = None;
        }
        self.health = RuntimeHealth::IntentStale;
        Ok(())
    }

    fn track(&mut self, result: Result<()>) -> Result<()> {
        if result.is_err() {
            self.health = RuntimeHealth::LinkError;
        }
        result
    }

    /// Stop everything before exiting
    pub async fn shutdown(&mut self) -> Result<()> {
        self.latest_intent = None;
        self.last_sent = None;
        self.controller.stop_all_motors(&mut self.link).await
    }
}

pub async fn run(options: RunOptions) -> std::result::Result<(), BoxError> {
    info!("Opening Zenoh session...");
    let session = zenoh::open(zenoh::Config::default()).await?;
    let controller = MotorController::new(options.controller);

    match options.link {
        Link::Zenoh => {
            let link = ZenohTransport::declare(&session).await?;
            info!("Publishing payloads to: {}", TOPIC_RT_MOTOR);
            serve(&session, Runtime::new(controller, link)).await
        }
        Link::Serial => {
            info!("Opening bridge on {} at {} baud", options.port, options.baud);
            let link = SerialTransport::open_with_baudrate(&options.port, options.baud)?;
            serve(&session, Runtime::new(controller, link)).await
        }
        Link::DryRun => {
            info!("Dry run: payloads are logged, not sent");
            serve(&session, Runtime::new(controller, DryRunTransport::new())).await
        }
    }
}

async fn serve<T: Transport>(
    session: &zenoh::Session,
    mut runtime: Runtime<T>,
) -> std::result::Result<(), BoxError> {
    info!("Setting up publishers and subscribers...");
    let sub_drive = session.declare_subscriber(TOPIC_CMD_DRIVE).await?;
    let sub_head = session.declare_subscriber(TOPIC_CMD_HEAD).await?;
    let sub_events = session.declare_subscriber(TOPIC_MOTOR_EVENTS).await?;
    let pub_health = session.declare_publisher(TOPIC_HEALTH).await?;

    let log_events: MotorEventHandler =
        Arc::new(|event: MotorEvent| info!("Motor event: {:?}", event));
    runtime.controller().subscribe_motor_events(&log_events);

    let mut tick = interval(Duration::from_millis(1000 / LOOP_HZ));

    info!(
        "Runtime started: {}Hz loop, {}ms watchdog timeout",
        LOOP_HZ,
        INTENT_TIMEOUT.as_millis()
    );
    info!(
        "Subscribed to: {}, {}, {}",
        TOPIC_CMD_DRIVE, TOPIC_CMD_HEAD, TOPIC_MOTOR_EVENTS
    );
    info!("Publishing to: {}", TOPIC_HEALTH);

    loop {
        tokio::select! {
            _ = tick.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupt received, stopping...");
                runtime.shutdown().await?;
                return Ok(());
            }
        }

        // 1. Drain pending drive intents (non-blocking), keep latest
        while let Ok(Some(sample)) = sub_drive.try_recv() {
            let payload = sample.payload().to_bytes();
            match serde_json::from_slice::<DriveIntent>(&payload) {
                Ok(intent) => runtime.on_intent(intent),
                Err(e) => warn!("Failed to parse drive intent: {}", e),
            }
        }

        // 2. Head commands go out in arrival order
        while let Ok(Some(sample)) = sub_head.try_recv() {
            let payload = sample.payload().to_bytes();
            match serde_json::from_slice::<HeadCommand>(&payload) {
                Ok(cmd) => {
                    if let Err(e) = runtime.on_head(cmd).await {
                        warn!("Head command failed: {}", e);
                    }
                }
                Err(e) => warn!("Failed to parse head command: {}", e),
            }
        }

        // 3. Telemetry from the droid
        while let Ok(Some(sample)) = sub_events.try_recv() {
            let payload = sample.payload().to_bytes();
            match serde_json::from_slice::<u8>(&payload) {
                Ok(code) => {
                    if let Err(e) = runtime.controller().process_motor_event(code) {
                        warn!("{}", e);
                    }
                }
                Err(e) => warn!("Failed to parse motor event: {}", e),
            }
        }

        // 4. Drive (includes watchdog logic)
        if let Err(e) = runtime.apply().await {
            warn!("Drive update failed: {}", e);
        }

        // 5. Publish health
        let health_json = serde_json::to_string(&runtime.health())?;
        pub_health.put(health_json).await?;
    }
}
