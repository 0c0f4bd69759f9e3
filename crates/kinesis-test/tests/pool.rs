//! Pooled events are recycled frame after frame.

use glam::Vec2;
use kinesis_input::{GamePadButton, GamePadIndexPolicy, KeyCode, MouseButton, TapConfig};
use kinesis_test::InputHarness;

#[test]
fn thousand_busy_frames_do_not_grow_the_pools() {
    let mut harness = InputHarness::default();
    harness.input_mut().add_gesture(TapConfig::default());
    let keyboard = harness.keyboard("kb");
    let mouse = harness.mouse("mouse");
    let touch = harness.touch_surface("touch");
    let pad = harness.gamepad("pad", GamePadIndexPolicy::Assignable);

    let mut warm_capacity = 0;
    for frame in 0..1000_u32 {
        let t = harness.now();
        let x = (frame % 100) as f32 / 100.0;
        let down = frame % 2 == 0;

        keyboard.key(KeyCode::KeyW, down);
        mouse.moved(Vec2::new(x, 0.5), t);
        mouse.button(MouseButton::Left, down, t);
        if down {
            touch.down(0, Vec2::new(x, 0.5), t);
            touch.moved(0, Vec2::new(x, 0.6), t);
        } else {
            touch.up(0, Vec2::new(x, 0.6), t);
        }
        pad.modify(|state| state.buttons.set(GamePadButton::A, down));

        harness.step().unwrap();
        harness.expect_no_leaks().unwrap();

        let capacity = harness.input().event_store().total_capacity();
        if frame == 10 {
            warm_capacity = capacity;
        } else if frame > 10 {
            assert_eq!(capacity, warm_capacity, "pool grew at frame {frame}");
        }
    }
}

#[test]
fn events_are_released_on_the_next_update() {
    let mut harness = InputHarness::default();
    let keyboard = harness.keyboard("kb");
    keyboard.key(KeyCode::Space, true);
    keyboard.text("a");
    harness.step().unwrap();
    assert!(harness.input().event_store().total_active() >= 2);

    harness.step().unwrap();
    assert_eq!(harness.input().event_store().total_active(), 0);
    assert_eq!(harness.input().events().count(), 0);
}
