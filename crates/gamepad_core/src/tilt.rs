//! Deadband filtering and indicator mapping for the continuous tilt source.

use crate::input::Viewport;

pub const DEFAULT_ACCELERATION_THRESHOLD: f64 = 1.0;
pub const DEFAULT_TILT_FACTOR: f64 = 0.5;
pub const DEFAULT_INDICATOR_HEIGHT: f64 = 40.0;

/// Deadband memory for the accelerometer stream. Holds the last *accepted*
/// raw sample; readings are compared against it, not against a continuously
/// updated one.
#[derive(Debug, Clone)]
pub struct TiltFilter {
    threshold: f64,
    last_accepted: f64,
}

impl TiltFilter {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            last_accepted: 0.0,
        }
    }

    /// Accept a raw reading if it moved beyond the deadband, updating the
    /// reference to the raw new value. Rejected readings change nothing.
    pub fn accept(&mut self, value: f64) -> Option<f64> {
        if (self.last_accepted - value).abs() <= self.threshold {
            return None;
        }
        self.last_accepted = value;
        Some(value)
    }

    pub fn last_accepted(&self) -> f64 {
        self.last_accepted
    }
}

/// Orientation-dependent axis selection: landscape viewports read the X axis,
/// portrait the Y axis. A missing selected axis drops the sample.
pub fn select_axis(x: Option<f64>, y: Option<f64>, viewport: Viewport) -> Option<f64> {
    if viewport.is_landscape() {
        x
    } else {
        y
    }
}

/// Affine remap of the assumed [-10, 10] sensor range to [0, 1], inverted so
/// tilting toward the top of the screen moves the indicator up.
pub fn tilt_percentage(value: f64) -> f64 {
    1.0 - ((value / 10.0) + 1.0) / 2.0
}

/// Screen offset of the tilt indicator in pixels, amplified by `tilt_factor`
/// and clamped so the indicator never leaves the viewport.
pub fn indicator_margin(
    percentage: f64,
    viewport_height: f64,
    indicator_height: f64,
    tilt_factor: f64,
) -> i64 {
    let amplified = viewport_height * (1.0 + tilt_factor);
    let margin =
        (percentage * amplified - viewport_height * tilt_factor / 2.0 - indicator_height).round();
    let limit = viewport_height - indicator_height;
    if margin < 0.0 {
        0
    } else if margin > limit {
        limit as i64
    } else {
        margin as i64
    }
}

#[cfg(test)]
#[path = "tests/tilt_tests.rs"]
mod tests;
