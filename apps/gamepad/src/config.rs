use std::{collections::HashMap, fs};

use gamepad_core::tilt::{DEFAULT_ACCELERATION_THRESHOLD, DEFAULT_TILT_FACTOR};

#[derive(Debug, Clone)]
pub struct Settings {
    pub server_url: String,
    pub player: String,
    pub acceleration_threshold: f64,
    pub tilt_factor: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "ws://127.0.0.1:6020".into(),
            player: "1".into(),
            acceleration_threshold: DEFAULT_ACCELERATION_THRESHOLD,
            tilt_factor: DEFAULT_TILT_FACTOR,
        }
    }
}

/// Defaults, overlaid by `gamepad.toml` if present, overlaid by environment
/// variables. Command-line flags are applied on top by the caller.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("gamepad.toml") {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(&raw) {
            if let Some(v) = file_cfg.get("server_url") {
                settings.server_url = v.clone();
            }
            if let Some(v) = file_cfg.get("player") {
                settings.player = v.clone();
            }
            if let Some(v) = file_cfg.get("acceleration_threshold") {
                if let Ok(parsed) = v.parse::<f64>() {
                    settings.acceleration_threshold = parsed;
                }
            }
            if let Some(v) = file_cfg.get("tilt_factor") {
                if let Ok(parsed) = v.parse::<f64>() {
                    settings.tilt_factor = parsed;
                }
            }
        }
    }

    if let Ok(v) = std::env::var("GAMEPAD_SERVER") {
        settings.server_url = v;
    }
    if let Ok(v) = std::env::var("GAMEPAD_PLAYER") {
        settings.player = v;
    }
    if let Ok(v) = std::env::var("GAMEPAD_ACCELERATION_THRESHOLD") {
        if let Ok(parsed) = v.parse::<f64>() {
            settings.acceleration_threshold = parsed;
        }
    }
    if let Ok(v) = std::env::var("GAMEPAD_TILT_FACTOR") {
        if let Ok(parsed) = v.parse::<f64>() {
            settings.tilt_factor = parsed;
        }
    }

    settings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_knob() {
        let settings = Settings::default();
        assert_eq!(settings.server_url, "ws://127.0.0.1:6020");
        assert_eq!(settings.player, "1");
        assert_eq!(settings.acceleration_threshold, 1.0);
        assert_eq!(settings.tilt_factor, 0.5);
    }

    #[test]
    fn environment_overrides_defaults() {
        std::env::set_var("GAMEPAD_SERVER", "ws://example.test:6020");
        std::env::set_var("GAMEPAD_ACCELERATION_THRESHOLD", "2.5");
        let settings = load_settings();
        std::env::remove_var("GAMEPAD_SERVER");
        std::env::remove_var("GAMEPAD_ACCELERATION_THRESHOLD");

        assert_eq!(settings.server_url, "ws://example.test:6020");
        assert_eq!(settings.acceleration_threshold, 2.5);
    }

    #[test]
    fn unparseable_threshold_is_ignored() {
        std::env::set_var("GAMEPAD_TILT_FACTOR", "not-a-number");
        let settings = load_settings();
        std::env::remove_var("GAMEPAD_TILT_FACTOR");

        assert_eq!(settings.tilt_factor, 0.5);
    }
}
