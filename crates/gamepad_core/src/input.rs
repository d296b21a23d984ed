//! Typed input events and the direction resolver.
//!
//! All input sources funnel into [`InputEvent`]; the resolver reduces the
//! active source's raw signal to one `Option<Direction>` per event. Last
//! writer wins, there is no queuing or priority between sources; only one
//! source type is ever active in a session.

use shared::domain::{ButtonZone, Direction};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_landscape(&self) -> bool {
        self.width / self.height > 1.0
    }
}

/// One event from any input source. Button and key events come from the
/// discrete sources; tilt samples from the motion sensor, carrying the
/// viewport they were observed under.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    ButtonPressed { zone: ButtonZone },
    ButtonReleased,
    KeyChanged { key: char, pressed: bool },
    TiltSample {
        x: Option<f64>,
        y: Option<f64>,
        viewport: Viewport,
    },
}

/// Reduce the "up active" / "down active" flags of a discrete source to a
/// direction: exactly one active zone wins, both-or-neither clears.
pub fn resolve_zones(up_active: bool, down_active: bool) -> Option<Direction> {
    match (up_active, down_active) {
        (true, false) => Some(Direction::Up),
        (false, true) => Some(Direction::Down),
        _ => None,
    }
}

pub fn zone_direction(zone: ButtonZone) -> Option<Direction> {
    resolve_zones(zone == ButtonZone::Up, zone == ButtonZone::Down)
}

/// Key bindings of the discrete keyboard source. Unmapped keys produce no
/// direction on press; releases are handled by the caller and clear the
/// direction regardless of which key went up.
pub fn key_direction(key: char) -> Option<Direction> {
    match key.to_ascii_lowercase() {
        'q' => Some(Direction::Up),
        'a' => Some(Direction::Down),
        _ => None,
    }
}

#[cfg(test)]
#[path = "tests/input_tests.rs"]
mod tests;
