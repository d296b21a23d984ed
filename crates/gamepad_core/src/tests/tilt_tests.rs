use crate::input::Viewport;

use super::*;

#[test]
fn deadband_rejects_motion_within_threshold() {
    let mut filter = TiltFilter::new(1.0);
    assert_eq!(filter.accept(0.5), None);
    assert_eq!(filter.last_accepted(), 0.0);
    // Exactly at the threshold still counts as jitter.
    assert_eq!(filter.accept(1.0), None);
    assert_eq!(filter.last_accepted(), 0.0);
}

#[test]
fn acceptance_updates_reference_to_the_raw_sample() {
    let mut filter = TiltFilter::new(1.0);
    assert_eq!(filter.accept(2.0), Some(2.0));
    assert_eq!(filter.last_accepted(), 2.0);
    // Comparisons now run against the accepted 2.0, not a smoothed value.
    assert_eq!(filter.accept(2.9), None);
    assert_eq!(filter.accept(3.1), Some(3.1));
    assert_eq!(filter.last_accepted(), 3.1);
}

#[test]
fn quiet_stream_after_first_acceptance_stays_quiet() {
    let mut filter = TiltFilter::new(1.0);
    assert_eq!(filter.accept(5.0), Some(5.0));
    for value in [4.5, 5.5, 4.2, 5.9, 5.0] {
        assert_eq!(filter.accept(value), None);
    }
    assert_eq!(filter.last_accepted(), 5.0);
}

#[test]
fn percentage_remaps_and_inverts_the_sensor_range() {
    assert_eq!(tilt_percentage(0.0), 0.5);
    assert_eq!(tilt_percentage(10.0), 0.0);
    assert_eq!(tilt_percentage(-10.0), 1.0);
    assert!((tilt_percentage(2.0) - 0.4).abs() < 1e-12);
}

#[test]
fn axis_selection_follows_orientation() {
    let landscape = Viewport::new(800.0, 600.0);
    let portrait = Viewport::new(600.0, 800.0);
    assert_eq!(select_axis(Some(1.5), Some(-3.0), landscape), Some(1.5));
    assert_eq!(select_axis(Some(1.5), Some(-3.0), portrait), Some(-3.0));
    // The unselected axis cannot stand in for a missing one.
    assert_eq!(select_axis(None, Some(-3.0), landscape), None);
    assert_eq!(select_axis(Some(1.5), None, portrait), None);
}

#[test]
fn margin_maps_in_range_percentages() {
    // percentage 0.5, 600px viewport, 40px indicator, factor 0.5:
    // 0.5 * 900 - 150 - 40 = 260
    assert_eq!(indicator_margin(0.5, 600.0, 40.0, 0.5), 260);
}

#[test]
fn margin_clamps_for_out_of_range_acceleration() {
    // value 50 maps to percentage -2.0, far below the viewport.
    let low = indicator_margin(tilt_percentage(50.0), 600.0, 40.0, 0.5);
    assert_eq!(low, 0);
    // value -50 maps to percentage 3.0, far above it.
    let high = indicator_margin(tilt_percentage(-50.0), 600.0, 40.0, 0.5);
    assert_eq!(high, 560);
}

#[test]
fn margin_never_escapes_the_viewport() {
    for value in (-100..=100).map(|v| v as f64) {
        let margin = indicator_margin(tilt_percentage(value), 600.0, 40.0, 0.5);
        assert!((0..=560).contains(&margin), "value {value} gave {margin}");
    }
}
