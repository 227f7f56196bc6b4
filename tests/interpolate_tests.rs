//! Integration tests for schedule interpolation

mod common;
use common::*;

use aqua_schedule::interpolate::{Bracket, desired_percent, percent_to_output};
use aqua_schedule::{SECONDS_PER_DAY, Target};

#[test]
fn equal_targets_hold_constant_all_day() {
    let targets = [Target::at(7, 0, 40), Target::at(13, 0, 40), Target::at(21, 30, 40)];

    for now in (0..SECONDS_PER_DAY).step_by(613) {
        assert!(approx_eq(desired_percent(&targets, now as f32), 40.0));
    }
    assert!(approx_eq(desired_percent(&targets, 86_399.9), 40.0));
}

#[test]
fn value_stays_within_bracket_envelope() {
    let targets = [
        Target::at(6, 0, 10),
        Target::at(9, 0, 90),
        Target::at(9, 30, 90),
        Target::at(14, 0, 35),
        Target::at(23, 0, 0),
    ];

    for now in (0..SECONDS_PER_DAY).step_by(97) {
        let now = now as f32;
        let bracket = Bracket::find(&targets, now).unwrap();
        let lo = bracket.last.value.min(bracket.current.value);
        let hi = bracket.last.value.max(bracket.current.value);
        let value = bracket.value_at(now);

        assert!(bracket.last.time <= now && now < bracket.current.time);
        assert!(value >= lo - 0.001 && value <= hi + 0.001, "{} at {}", value, now);
    }
}

#[test]
fn day_wrap_interpolates_across_midnight() {
    let targets = [Target::at(1, 0, 20), Target::at(23, 0, 80)];

    // Midnight is halfway between 23:00 and 01:00
    assert!(approx_eq(desired_percent(&targets, 0.0), 50.0));
    assert!(approx_eq(desired_percent(&targets, 84_600.0), 65.0));
    assert!(approx_eq(desired_percent(&targets, 1_800.0), 35.0));

    let before_first = Bracket::find(&targets, 0.0).unwrap();
    assert!(approx_eq(before_first.last.time, -3_600.0));
    assert!(approx_eq(before_first.current.time, 3_600.0));

    let after_last = Bracket::find(&targets, 84_600.0).unwrap();
    assert!(approx_eq(after_last.last.time, 82_800.0));
    assert!(approx_eq(after_last.current.time, 90_000.0));
}

#[test]
fn daylight_schedule_shape() {
    let targets = daylight_schedule();

    assert!(approx_eq(desired_percent(&targets, 32_400.0), 50.0));
    assert!(approx_eq(desired_percent(&targets, 43_200.0), 100.0));
    assert!(approx_eq(desired_percent(&targets, 75_600.0), 50.0));
    assert!(approx_eq(desired_percent(&targets, 3_600.0), 0.0));
    assert_eq!(percent_to_output(desired_percent(&targets, 32_400.0), 4095), 2047);
}

#[test]
fn single_target_is_flat() {
    let targets = [Target::at(12, 0, 70)];

    assert!(approx_eq(desired_percent(&targets, 0.0), 70.0));
    assert!(approx_eq(desired_percent(&targets, 43_200.0), 70.0));
    assert!(approx_eq(desired_percent(&targets, 86_000.0), 70.0));
}

#[test]
fn empty_schedule_is_off() {
    assert_eq!(desired_percent(&[], 12_345.0), 0.0);
    assert!(Bracket::find(&[], 0.0).is_none());
}

#[test]
fn output_scaling_covers_full_range() {
    assert_eq!(percent_to_output(0.0, 4095), 0);
    assert_eq!(percent_to_output(100.0, 4095), 4095);
    assert_eq!(percent_to_output(150.0, 4095), 4095);
    assert_eq!(percent_to_output(-5.0, 4095), 0);
    assert_eq!(percent_to_output(50.0, 1000), 500);
}
