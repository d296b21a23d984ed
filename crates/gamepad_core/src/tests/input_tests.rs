use shared::domain::{ButtonZone, DeviceCapabilities, Direction, InputMode};

use super::*;

#[test]
fn zone_flags_resolve_exclusively() {
    assert_eq!(resolve_zones(true, false), Some(Direction::Up));
    assert_eq!(resolve_zones(false, true), Some(Direction::Down));
    assert_eq!(resolve_zones(true, true), None);
    assert_eq!(resolve_zones(false, false), None);
}

#[test]
fn button_zones_map_to_their_direction() {
    assert_eq!(zone_direction(ButtonZone::Up), Some(Direction::Up));
    assert_eq!(zone_direction(ButtonZone::Down), Some(Direction::Down));
}

#[test]
fn key_bindings_cover_both_cases() {
    assert_eq!(key_direction('q'), Some(Direction::Up));
    assert_eq!(key_direction('Q'), Some(Direction::Up));
    assert_eq!(key_direction('a'), Some(Direction::Down));
    assert_eq!(key_direction('A'), Some(Direction::Down));
}

#[test]
fn unmapped_keys_produce_no_direction() {
    assert_eq!(key_direction('x'), None);
    assert_eq!(key_direction(' '), None);
}

#[test]
fn viewport_orientation() {
    assert!(Viewport::new(800.0, 600.0).is_landscape());
    assert!(!Viewport::new(600.0, 800.0).is_landscape());
    // A square viewport counts as portrait.
    assert!(!Viewport::new(600.0, 600.0).is_landscape());
}

#[test]
fn tilt_mode_requires_touch_and_motion() {
    let select = |touch, motion| InputMode::select(DeviceCapabilities { touch, motion });
    assert_eq!(select(true, true), InputMode::Tilt);
    assert_eq!(select(true, false), InputMode::Discrete);
    assert_eq!(select(false, true), InputMode::Discrete);
    assert_eq!(select(false, false), InputMode::Discrete);
}
