use serde::{Deserialize, Serialize};

/// Record key of the global status record shared by every player.
pub const STATUS_RECORD: &str = "status";

/// Opaque player identity taken from the launch context. Immutable for the
/// lifetime of the session; namespaces every shared-state key this client
/// touches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Key of the per-player record (`player/<id>`).
    pub fn record_key(&self) -> String {
        format!("player/{}", self.0)
    }

    /// Status-record field holding this player's presence flag.
    pub fn online_field(&self) -> String {
        format!("player{}-online", self.0)
    }

    /// Status-record field carrying goal notifications for this player.
    pub fn goals_field(&self) -> String {
        format!("player{}-goals", self.0)
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self("1".to_string())
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

/// Capability flags probed once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeviceCapabilities {
    pub touch: bool,
    pub motion: bool,
}

/// Mutually exclusive input wiring, selected exactly once at construction and
/// never re-evaluated during the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Tilt,
    Discrete,
}

impl InputMode {
    /// Tilt mode requires both a touch surface and a motion sensor; any
    /// missing capability falls back to discrete input. No error path.
    pub fn select(capabilities: DeviceCapabilities) -> Self {
        if capabilities.touch && capabilities.motion {
            InputMode::Tilt
        } else {
            InputMode::Discrete
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonZone {
    Up,
    Down,
}

/// Payload of the `player<id>-goals` status field. The producer writes
/// `lastGoal`; anything missing or malformed reads as `false`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct GoalNotice {
    #[serde(rename = "lastGoal", default)]
    pub last_goal: bool,
}
