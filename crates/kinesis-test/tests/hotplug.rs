//! Devices leaving mid-interaction let go of what they held.

use glam::Vec2;
use kinesis_input::{
    DragConfig, GestureData, GestureState, KeyCode, MouseButton, TapConfig,
};
use kinesis_test::InputHarness;

#[test]
fn unplugged_touch_surface_does_not_block_taps() {
    let mut harness = InputHarness::default();
    harness
        .input_mut()
        .add_gesture(TapConfig::default().with_max_taps(1));

    let first = harness.touch_surface("first");
    first.down(0, Vec2::new(0.3, 0.3), harness.now());
    harness.step().unwrap();
    harness.handle().remove_device(first.device());
    harness.step().unwrap();

    let second = harness.touch_surface("second");
    second.down(0, Vec2::new(0.6, 0.6), harness.now());
    harness.step().unwrap();
    second.up(0, Vec2::new(0.6, 0.6), harness.now());
    let events = harness.step().unwrap();

    let taps: Vec<_> = events
        .iter()
        .filter_map(|event| match event.data {
            GestureData::Tap(tap) => Some(tap),
            _ => None,
        })
        .collect();
    assert_eq!(taps.len(), 1);
    assert_eq!(taps[0].number_of_taps, 1);
    assert_eq!(taps[0].position, Vec2::new(0.6, 0.6));
}

#[test]
fn unplugging_mid_drag_ends_the_drag() {
    let mut harness = InputHarness::default();
    harness.input_mut().add_gesture(DragConfig::default());

    let touch = harness.touch_surface("touch");
    touch.down(0, Vec2::new(0.2, 0.5), harness.now());
    harness.step().unwrap();
    touch.moved(0, Vec2::new(0.4, 0.5), harness.now());
    let started = harness.step().unwrap();
    assert_eq!(started.len(), 1);
    assert_eq!(started[0].state, GestureState::Started);

    harness.handle().remove_device(touch.device());
    let ended = harness.step().unwrap();
    assert_eq!(ended.len(), 1);
    assert_eq!(ended[0].state, GestureState::Ended);
    assert!(harness.step_n(5).unwrap().is_empty());
}

#[test]
fn unplugged_keyboard_and_mouse_release_their_buttons() {
    let mut harness = InputHarness::default();
    let keyboard = harness.keyboard("kb");
    let mouse = harness.mouse("mouse");
    keyboard.key(KeyCode::KeyW, true);
    mouse.button(MouseButton::Left, true, harness.now());
    harness.step().unwrap();
    assert!(harness.input().is_key_down(KeyCode::KeyW));
    assert!(harness.input().is_mouse_button_down(MouseButton::Left));

    harness.handle().remove_device(keyboard.device());
    harness.handle().remove_device(mouse.device());
    harness.step().unwrap();
    assert!(!harness.input().is_key_down(KeyCode::KeyW));
    assert!(harness.input().is_key_released(KeyCode::KeyW));
    assert!(!harness.input().is_mouse_button_down(MouseButton::Left));

    harness.step().unwrap();
    assert!(!harness.input().is_key_released(KeyCode::KeyW));
}

#[test]
fn directly_unregistered_device_is_released_next_frame() {
    let mut harness = InputHarness::default();
    let keyboard = harness.keyboard("kb");
    keyboard.key(KeyCode::Space, true);
    harness.step().unwrap();

    harness
        .input_mut()
        .unregister_device(keyboard.device())
        .unwrap();
    harness.step().unwrap();
    assert!(harness.input().is_key_released(KeyCode::Space));
    assert!(!harness.input().is_key_down(KeyCode::Space));
}
