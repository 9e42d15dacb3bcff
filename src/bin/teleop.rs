// Keyboard teleop: W/S throttle, A/D steer, J/L head, C center head, R/F speed, Q quit
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use std::time::{Duration, Instant};
use tracing::info;

use droid_drive_runtime::config::{TOPIC_CMD_DRIVE, TOPIC_CMD_HEAD};
use droid_drive_runtime::messages::{DriveIntent, HeadCommand};
use droid_drive_runtime::motor::{
    RotationSide, DEFAULT_CENTER_OFFSET, DEFAULT_CENTER_SPEED, DEFAULT_RAMP,
};

const SPEEDS: [i32; 3] = [30, 60, 100]; // intent scale
const ANGLES: [i32; 3] = [20, 40, 60];
const HEAD_SPEEDS: [u32; 3] = [80, 160, 255];
const INPUT_TIMEOUT_MS: u64 = 150; // Reset intent after this much time with no input

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    info!("Opening Zenoh session...");
    let session = zenoh::open(zenoh::Config::default()).await?;
    let pub_drive = session.declare_publisher(TOPIC_CMD_DRIVE).await?;
    let pub_head = session.declare_publisher(TOPIC_CMD_HEAD).await?;

    info!("Controls: W/S=throttle, A/D=steer, J/L=head, C=center head, R/F=speed, Q=quit");
    info!("Speed: LOW");

    enable_raw_mode()?;
    let result = run_teleop(&pub_drive, &pub_head).await;
    disable_raw_mode()?;

    result
}

async fn run_teleop(
    pub_drive: &zenoh::pubsub::Publisher<'_>,
    pub_head: &zenoh::pubsub::Publisher<'_>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut speed_idx: usize = 0;

    // Persistent intent state
    let mut speed = 0;
    let mut angle = 0;
    let mut last_movement_input = Instant::now();

    loop {
        // Poll for key with 20ms timeout (50Hz effective rate)
        if event::poll(Duration::from_millis(20))? {
            if let Event::Key(KeyEvent { code, kind, .. }) = event::read()? {
                let pressed = kind == KeyEventKind::Press || kind == KeyEventKind::Repeat;

                match code {
                    // Movement - update intent and refresh timestamp
                    KeyCode::Char('w') if pressed => {
                        speed = SPEEDS[speed_idx];
                        last_movement_input = Instant::now();
                    }
                    KeyCode::Char('s') if pressed => {
                        speed = -SPEEDS[speed_idx];
                        last_movement_input = Instant::now();
                    }
                    KeyCode::Char('a') if pressed => {
                        angle = -ANGLES[speed_idx];
                        last_movement_input = Instant::now();
                    }
                    KeyCode::Char('d') if pressed => {
                        angle = ANGLES[speed_idx];
                        last_movement_input = Instant::now();
                    }

                    // Head
                    KeyCode::Char('j') if pressed => {
                        rotate_head(pub_head, RotationSide::Left, speed_idx).await?;
                    }
                    KeyCode::Char('l') if pressed => {
                        rotate_head(pub_head, RotationSide::Right, speed_idx).await?;
                    }
                    KeyCode::Char('c') if pressed => {
                        let cmd = HeadCommand::Center {
                            speed: DEFAULT_CENTER_SPEED,
                            offset: DEFAULT_CENTER_OFFSET,
                        };
                        pub_head.put(serde_json::to_string(&cmd)?).await?;
                    }

                    // Speed control
                    KeyCode::Char('r') if pressed => {
                        speed_idx = (speed_idx + 1).min(2);
                        print_speed(speed_idx);
                    }
                    KeyCode::Char('f') if pressed => {
                        speed_idx = speed_idx.saturating_sub(1);
                        print_speed(speed_idx);
                    }

                    // Quit
                    KeyCode::Char('q') | KeyCode::Esc if pressed => break,

                    _ => {}
                }
            }
        }

        // Reset intent if no movement input for INPUT_TIMEOUT_MS
        if last_movement_input.elapsed() > Duration::from_millis(INPUT_TIMEOUT_MS) {
            speed = 0;
            angle = 0;
        }

        // Always publish at ~50Hz
        let intent = DriveIntent::clamped(speed, angle);
        pub_drive.put(serde_json::to_string(&intent)?).await?;
    }

    // Leave the droid stopped
    pub_drive
        .put(serde_json::to_string(&DriveIntent::stop())?)
        .await?;
    Ok(())
}

async fn rotate_head(
    pub_head: &zenoh::pubsub::Publisher<'_>,
    direction: RotationSide,
    speed_idx: usize,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cmd = HeadCommand::Rotate {
        direction,
        speed: Some(HEAD_SPEEDS[speed_idx]),
        ramp: Some(DEFAULT_RAMP),
    };
    pub_head.put(serde_json::to_string(&cmd)?).await?;
    Ok(())
}

fn print_speed(idx: usize) {
    let label = ["LOW", "MED", "HIGH"][idx];
    info!("Speed: {}", label);
}
