//! Gestures recognized from raw touch samples through the whole pipeline.

use std::f32::consts::{FRAC_PI_4, SQRT_2};
use std::time::Duration;

use approx::assert_relative_eq;
use glam::Vec2;
use kinesis_input::{
    CompositeConfig, CompositeEvent, GestureData, GestureEvent, GestureState, LongPressConfig,
    TapConfig, TapEvent,
};
use kinesis_test::InputHarness;

fn taps(events: &[GestureEvent]) -> Vec<TapEvent> {
    events
        .iter()
        .filter_map(|event| match event.data {
            GestureData::Tap(tap) => Some(tap),
            _ => None,
        })
        .collect()
}

fn composites(events: &[GestureEvent]) -> Vec<(GestureState, CompositeEvent)> {
    events
        .iter()
        .filter_map(|event| match event.data {
            GestureData::Composite(c) => Some((event.state, c)),
            _ => None,
        })
        .collect()
}

#[test]
fn single_tap_reports_one_tap() {
    let mut harness = InputHarness::default();
    let tap = harness.input_mut().add_gesture(TapConfig::default());
    let touch = harness.touch_surface("touch");

    touch.down(0, Vec2::new(0.5, 0.5), harness.now());
    let mut events = harness.step().unwrap();
    touch.up(0, Vec2::new(0.5, 0.5), harness.now());
    events.extend(harness.step().unwrap());
    assert!(taps(&events).is_empty(), "a second tap may still follow");

    events.extend(harness.step_for(Duration::from_millis(500)).unwrap());
    let reported = taps(&events);
    assert_eq!(reported.len(), 1);
    assert_eq!(reported[0].number_of_taps, 1);
    assert_eq!(reported[0].number_of_fingers, 1);
    assert!(events.iter().all(|e| e.gesture == tap && e.state == GestureState::Occurred));
}

#[test]
fn double_tap_counts_instead_of_repeating() {
    let mut harness = InputHarness::default();
    harness.input_mut().add_gesture(TapConfig::default());
    let touch = harness.touch_surface("touch");

    let mut events = Vec::new();
    for _ in 0..2 {
        touch.down(0, Vec2::new(0.5, 0.5), harness.now());
        events.extend(harness.step().unwrap());
        touch.up(0, Vec2::new(0.51, 0.5), harness.now());
        events.extend(harness.step_n(3).unwrap());
    }
    events.extend(harness.step_for(Duration::from_secs(1)).unwrap());

    let reported = taps(&events);
    assert_eq!(reported.len(), 1);
    assert_eq!(reported[0].number_of_taps, 2);
}

#[test]
fn long_press_fires_once_while_held() {
    let mut harness = InputHarness::default();
    let config = LongPressConfig::default().with_press_time(Duration::from_millis(200));
    harness.input_mut().add_gesture(config);
    let touch = harness.touch_surface("touch");

    touch.down(0, Vec2::new(0.3, 0.3), harness.now());
    let mut events = harness.step().unwrap();
    events.extend(harness.step_for(Duration::from_millis(600)).unwrap());
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].state, GestureState::Occurred);
    assert!(events[0].total_time >= Duration::from_millis(200));

    touch.up(0, Vec2::new(0.3, 0.3), harness.now());
    assert!(harness.step_n(5).unwrap().is_empty());
}

#[test]
fn two_finger_rotate_and_spread() {
    let mut harness = InputHarness::default();
    harness.input_mut().add_gesture(CompositeConfig::default());
    let touch = harness.touch_surface("touch");

    touch.down(0, Vec2::new(0.4, 0.5), harness.now());
    touch.down(1, Vec2::new(0.6, 0.5), harness.now());
    assert!(harness.step().unwrap().is_empty());

    touch.moved(0, Vec2::new(0.4, 0.4), harness.now());
    touch.moved(1, Vec2::new(0.6, 0.6), harness.now());
    let started = composites(&harness.step().unwrap());
    assert_eq!(started.len(), 1);
    let (state, c) = started[0];
    assert_eq!(state, GestureState::Started);
    assert_relative_eq!(c.total_rotation, FRAC_PI_4, epsilon = 1e-4);
    assert_relative_eq!(c.total_scale, SQRT_2, epsilon = 1e-4);
    assert_relative_eq!(c.total_translation.length(), 0.0, epsilon = 1e-5);
    assert_relative_eq!(c.center_begin.x, 0.5, epsilon = 1e-5);
    assert_relative_eq!(c.center_begin.y, 0.5, epsilon = 1e-5);

    touch.up(1, Vec2::new(0.6, 0.6), harness.now());
    let mut rest = harness.step().unwrap();
    touch.up(0, Vec2::new(0.4, 0.4), harness.now());
    rest.extend(harness.step_n(3).unwrap());

    let ended = composites(&rest);
    assert_eq!(ended.len(), 1);
    assert_eq!(ended[0].0, GestureState::Ended);
    assert_relative_eq!(ended[0].1.total_rotation, FRAC_PI_4, epsilon = 1e-4);
}

#[test]
fn small_two_finger_motion_stays_quiet() {
    let mut harness = InputHarness::default();
    harness.input_mut().add_gesture(CompositeConfig::default());
    let touch = harness.touch_surface("touch");

    touch.down(0, Vec2::new(0.4, 0.5), harness.now());
    touch.down(1, Vec2::new(0.6, 0.5), harness.now());
    harness.step().unwrap();
    touch.moved(0, Vec2::new(0.402, 0.5), harness.now());
    touch.moved(1, Vec2::new(0.602, 0.5), harness.now());
    let mut events = harness.step().unwrap();
    touch.up(0, Vec2::new(0.402, 0.5), harness.now());
    touch.up(1, Vec2::new(0.602, 0.5), harness.now());
    events.extend(harness.step().unwrap());
    assert!(events.is_empty());
}
