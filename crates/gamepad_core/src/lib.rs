//! Remote gamepad core: turns local input into a continuously synchronized
//! directional command on the shared-state service, toggles the player's
//! presence flag, and reacts to goal notifications with haptic feedback.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use serde_json::{json, Map, Value};
use shared::domain::{
    DeviceCapabilities, Direction, GoalNotice, InputMode, PlayerId, STATUS_RECORD,
};
use statesync::{SharedRecord, SyncChannel};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info};

pub mod input;
pub mod tilt;

use input::{key_direction, zone_direction, InputEvent, Viewport};
use tilt::{indicator_margin, select_axis, tilt_percentage, TiltFilter};

/// Long celebratory buzz for a scored goal.
pub const GOAL_CELEBRATION_PATTERN: &[u64] = &[100, 300, 100, 300, 100];
/// Single short pulse for any other goal-field delivery.
pub const GOAL_ACK_PULSE: &[u64] = &[100];

/// Vibration capability. Feature-detected by the embedder; when the device
/// has none, wire in [`NoopHaptics`] and the effect is skipped, never an
/// error.
pub trait Haptics: Send + Sync {
    fn vibrate(&self, pattern: &[u64]);
}

pub struct NoopHaptics;

impl Haptics for NoopHaptics {
    fn vibrate(&self, _pattern: &[u64]) {}
}

pub fn goal_pattern(notice: &GoalNotice) -> &'static [u64] {
    if notice.last_goal {
        GOAL_CELEBRATION_PATTERN
    } else {
        GOAL_ACK_PULSE
    }
}

/// Observable side effects of the gamepad, for whatever surface renders them.
#[derive(Debug, Clone, PartialEq)]
pub enum GamepadEvent {
    /// This player's presence flag, delivered once at attach time and on
    /// every subsequent change.
    PresenceChanged { online: bool },
    DirectionChanged { direction: Option<Direction> },
    /// Continuous paddle position published in tilt mode.
    PositionChanged { percentage: f64 },
    /// Tilt indicator placement for the rendering surface.
    IndicatorMoved { margin_px: i64 },
    GoalScored { last_goal: bool },
}

#[derive(Debug, Clone)]
pub struct GamepadSettings {
    pub acceleration_threshold: f64,
    pub tilt_factor: f64,
    pub indicator_height: f64,
}

impl Default for GamepadSettings {
    fn default() -> Self {
        Self {
            acceleration_threshold: tilt::DEFAULT_ACCELERATION_THRESHOLD,
            tilt_factor: tilt::DEFAULT_TILT_FACTOR,
            indicator_height: tilt::DEFAULT_INDICATOR_HEIGHT,
        }
    }
}

/// The attached controller session. Input events flow in through
/// [`Gamepad::handle_input`]; everything observable flows out through the
/// shared-state channel and the event broadcast.
pub struct Gamepad {
    player: PlayerId,
    mode: InputMode,
    settings: GamepadSettings,
    player_record: Arc<dyn SharedRecord>,
    status_record: Arc<dyn SharedRecord>,
    haptics: Arc<dyn Haptics>,
    tilt: Mutex<TiltFilter>,
    online: AtomicBool,
    events: broadcast::Sender<GamepadEvent>,
}

impl Gamepad {
    /// Wire the controller to an authenticated sync channel. The input mode
    /// is selected here, once, and never re-evaluated. Seeds the player
    /// record with this client's identity and a cleared direction, then
    /// starts the presence and goal listeners.
    pub async fn attach(
        channel: Arc<dyn SyncChannel>,
        player: PlayerId,
        capabilities: DeviceCapabilities,
        settings: GamepadSettings,
        haptics: Arc<dyn Haptics>,
    ) -> Arc<Gamepad> {
        let mode = InputMode::select(capabilities);

        let player_record = channel.record(&player.record_key()).await;
        player_record.when_ready().await;
        let mut seed = Map::new();
        seed.insert("name".to_string(), Value::String(player.0.clone()));
        seed.insert("direction".to_string(), Value::Null);
        player_record.set(seed).await;

        let status_record = channel.record(STATUS_RECORD).await;

        let (events, _) = broadcast::channel(64);
        let gamepad = Arc::new(Gamepad {
            player,
            mode,
            tilt: Mutex::new(TiltFilter::new(settings.acceleration_threshold)),
            settings,
            player_record,
            status_record,
            haptics,
            online: AtomicBool::new(false),
            events,
        });

        gamepad.spawn_presence_listener().await;
        gamepad.spawn_goal_listener().await;

        info!(player = %gamepad.player, mode = ?gamepad.mode, "gamepad attached");
        gamepad
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    /// Last presence value delivered for this player; false until the first
    /// delivery arrives.
    pub fn online(&self) -> bool {
        self.online.load(Ordering::Relaxed)
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<GamepadEvent> {
        self.events.subscribe()
    }

    /// Presence flag observer, subscribed with immediate delivery so the
    /// initial state is surfaced even when nothing has changed yet.
    async fn spawn_presence_listener(self: &Arc<Self>) {
        let mut deliveries = self
            .status_record
            .subscribe(&self.player.online_field(), true)
            .await;
        let gamepad = Arc::clone(self);
        tokio::spawn(async move {
            while let Some(value) = deliveries.recv().await {
                let online = value.as_bool().unwrap_or(false);
                gamepad.online.store(online, Ordering::Relaxed);
                let _ = gamepad.events.send(GamepadEvent::PresenceChanged { online });
            }
        });
    }

    /// Goal observer: a plain subscription, no immediate delivery and no
    /// de-duplication: every delivered payload re-triggers the haptics.
    async fn spawn_goal_listener(self: &Arc<Self>) {
        let mut deliveries = self
            .status_record
            .subscribe(&self.player.goals_field(), false)
            .await;
        let gamepad = Arc::clone(self);
        tokio::spawn(async move {
            while let Some(value) = deliveries.recv().await {
                let notice: GoalNotice = serde_json::from_value(value).unwrap_or_default();
                gamepad.haptics.vibrate(goal_pattern(&notice));
                let _ = gamepad.events.send(GamepadEvent::GoalScored {
                    last_goal: notice.last_goal,
                });
            }
        });
    }

    /// Single entry point for all input sources. Events belonging to the
    /// inactive mode are ignored.
    pub async fn handle_input(&self, event: InputEvent) {
        match (self.mode, event) {
            (InputMode::Discrete, InputEvent::ButtonPressed { zone }) => {
                self.publish_direction(zone_direction(zone)).await;
            }
            (InputMode::Discrete, InputEvent::ButtonReleased) => {
                self.publish_direction(None).await;
            }
            (InputMode::Discrete, InputEvent::KeyChanged { key, pressed }) => {
                if pressed {
                    if let Some(direction) = key_direction(key) {
                        self.publish_direction(Some(direction)).await;
                    }
                } else {
                    // No per-key release tracking: any key going up clears
                    // the direction, even one that was never mapped.
                    self.publish_direction(None).await;
                }
            }
            (InputMode::Tilt, InputEvent::TiltSample { x, y, viewport }) => {
                self.handle_tilt(x, y, viewport).await;
            }
            (mode, event) => {
                debug!(?mode, ?event, "ignoring event for inactive input mode");
            }
        }
    }

    /// Presence toggle: read-negate-write on this player's own status field,
    /// treating an absent field as offline. Single-writer on the field, so
    /// last-write-wins is fine.
    pub async fn toggle_presence(&self) {
        self.status_record.when_ready().await;
        let field = self.player.online_field();
        let online = self
            .status_record
            .get(&field)
            .await
            .and_then(|value| value.as_bool())
            .unwrap_or(false);
        self.status_record.set_field(&field, json!(!online)).await;
    }

    async fn publish_direction(&self, direction: Option<Direction>) {
        let value = match direction {
            Some(direction) => json!(direction.as_str()),
            None => Value::Null,
        };
        self.player_record.set_field("direction", value).await;
        let _ = self
            .events
            .send(GamepadEvent::DirectionChanged { direction });
    }

    /// Tilt mode publishes the continuous `position` field, never the
    /// discrete `direction` the button/key sources write. The consumer side
    /// reads `position` for tilt sessions; this branch is deliberate.
    async fn handle_tilt(&self, x: Option<f64>, y: Option<f64>, viewport: Viewport) {
        let Some(value) = select_axis(x, y, viewport) else {
            // Partial sensor reading; drop the sample, the next may be whole.
            return;
        };
        let accepted = self.tilt.lock().await.accept(value);
        let Some(value) = accepted else {
            return;
        };

        let percentage = tilt_percentage(value);
        let margin_px = indicator_margin(
            percentage,
            viewport.height,
            self.settings.indicator_height,
            self.settings.tilt_factor,
        );

        self.player_record
            .set_field("position", json!(percentage))
            .await;
        let _ = self
            .events
            .send(GamepadEvent::PositionChanged { percentage });
        let _ = self.events.send(GamepadEvent::IndicatorMoved { margin_px });
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
