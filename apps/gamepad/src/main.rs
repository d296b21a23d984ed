use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use gamepad_core::{
    input::{InputEvent, Viewport},
    Gamepad, GamepadEvent, GamepadSettings, Haptics,
};
use serde_json::Map;
use shared::domain::{ButtonZone, DeviceCapabilities, PlayerId};
use statesync::{SyncChannel, SyncClient};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

mod config;

use config::load_settings;

/// Stand-in viewport for the terminal driver; real embedders report the
/// actual screen on every tilt sample.
const TERMINAL_VIEWPORT: Viewport = Viewport {
    width: 1280.0,
    height: 720.0,
};

#[derive(Parser, Debug)]
#[command(about = "Terminal driver for the remote pong gamepad")]
struct Args {
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    player: Option<String>,
    /// Pretend to be a touch device with a motion sensor, selecting tilt
    /// input mode for the whole session.
    #[arg(long)]
    tilt: bool,
    #[arg(long)]
    acceleration_threshold: Option<f64>,
    #[arg(long)]
    tilt_factor: Option<f64>,
}

/// The terminal has no vibration motor, so the haptic patterns are printed
/// instead of played.
struct LogHaptics;

impl Haptics for LogHaptics {
    fn vibrate(&self, pattern: &[u64]) {
        println!("bzzt {pattern:?}");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(v) = args.server_url {
        settings.server_url = v;
    }
    if let Some(v) = args.player {
        settings.player = v;
    }
    if let Some(v) = args.acceleration_threshold {
        settings.acceleration_threshold = v;
    }
    if let Some(v) = args.tilt_factor {
        settings.tilt_factor = v;
    }

    let channel = SyncClient::connect(&settings.server_url, Map::new())
        .await
        .context("could not connect to the sync server")?;

    let capabilities = DeviceCapabilities {
        touch: args.tilt,
        motion: args.tilt,
    };
    let gamepad = Gamepad::attach(
        channel as Arc<dyn SyncChannel>,
        PlayerId::new(settings.player.clone()),
        capabilities,
        GamepadSettings {
            acceleration_threshold: settings.acceleration_threshold,
            tilt_factor: settings.tilt_factor,
            ..GamepadSettings::default()
        },
        Arc::new(LogHaptics),
    )
    .await;

    let mut events = gamepad.subscribe_events();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                GamepadEvent::PresenceChanged { online } => {
                    println!("{}", if online { "joined" } else { "left" });
                }
                GamepadEvent::DirectionChanged { direction } => {
                    info!(?direction, "direction published");
                }
                GamepadEvent::PositionChanged { percentage } => {
                    info!(percentage, "position published");
                }
                GamepadEvent::IndicatorMoved { margin_px } => {
                    info!(margin_px, "indicator moved");
                }
                GamepadEvent::GoalScored { last_goal } => {
                    println!("goal! (lastGoal: {last_goal})");
                }
            }
        }
    });

    println!("commands: up | down | release | key <c> | lift | tilt <value> | toggle | quit");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let mut words = line.split_whitespace();
        match (words.next(), words.next()) {
            (Some("up"), _) => {
                gamepad
                    .handle_input(InputEvent::ButtonPressed {
                        zone: ButtonZone::Up,
                    })
                    .await;
            }
            (Some("down"), _) => {
                gamepad
                    .handle_input(InputEvent::ButtonPressed {
                        zone: ButtonZone::Down,
                    })
                    .await;
            }
            (Some("release"), _) => {
                gamepad.handle_input(InputEvent::ButtonReleased).await;
            }
            (Some("key"), Some(word)) => {
                if let Some(key) = word.chars().next() {
                    gamepad
                        .handle_input(InputEvent::KeyChanged { key, pressed: true })
                        .await;
                }
            }
            (Some("lift"), word) => {
                let key = word.and_then(|w| w.chars().next()).unwrap_or(' ');
                gamepad
                    .handle_input(InputEvent::KeyChanged {
                        key,
                        pressed: false,
                    })
                    .await;
            }
            (Some("tilt"), Some(value)) => match value.parse::<f64>() {
                Ok(value) => {
                    gamepad
                        .handle_input(InputEvent::TiltSample {
                            x: Some(value),
                            y: Some(value),
                            viewport: TERMINAL_VIEWPORT,
                        })
                        .await;
                }
                Err(_) => println!("tilt needs a number"),
            },
            (Some("toggle"), _) => gamepad.toggle_presence().await,
            (Some("quit"), _) => break,
            (None, _) => {}
            (Some(other), _) => println!("unknown command '{other}'"),
        }
    }

    Ok(())
}
