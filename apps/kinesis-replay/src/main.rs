//! Kinesis Input Replay
//!
//! Drives the input pipeline with a scripted session: a tap, a double tap,
//! a drag, a two-finger pinch and a gamepad that is unplugged halfway through.
//! Every gesture, action edge and device change is logged.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p kinesis-replay -- [OPTIONS]
//! ```
//!
//! ## Options
//!
//! - `--frame-ms <N>`: Simulated frame time in milliseconds (default: 16)
//! - `-h, --help`: Print help message
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: Set log level (e.g., info, debug, trace)

use std::time::Duration;

use anyhow::{bail, Context};
use glam::Vec2;
use kinesis_core::DeviceId;
use kinesis_input::{
    ActionMap, CompositeConfig, DeviceInfo, DragConfig, GamePadButton, GamePadFeed,
    GamePadIndexPolicy, GestureData, GestureEvent, InputConfig, InputManager, PointerEventType,
    QueueSource, TapConfig, TouchFeed,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const SURFACE: Vec2 = Vec2::new(1280.0, 720.0);
const DEFAULT_FRAME_MS: u64 = 16;

/// One scripted input, applied at the start of a frame.
#[derive(Debug, Clone, Copy)]
enum Cue {
    Touch(u32, Vec2, PointerEventType),
    Pad(GamePadButton, bool),
    Unplug,
}

fn timeline() -> Vec<(u32, Cue)> {
    use PointerEventType::{Moved, Pressed, Released};

    let mut cues = vec![
        // Single tap
        (2, Cue::Touch(0, Vec2::new(0.2, 0.2), Pressed)),
        (5, Cue::Touch(0, Vec2::new(0.2, 0.2), Released)),
        // Double tap
        (60, Cue::Touch(0, Vec2::new(0.7, 0.3), Pressed)),
        (63, Cue::Touch(0, Vec2::new(0.7, 0.3), Released)),
        (70, Cue::Touch(0, Vec2::new(0.71, 0.3), Pressed)),
        (73, Cue::Touch(0, Vec2::new(0.71, 0.3), Released)),
        // Gamepad
        (80, Cue::Pad(GamePadButton::A, true)),
        (84, Cue::Pad(GamePadButton::A, false)),
    ];

    // Drag to the right
    cues.push((120, Cue::Touch(0, Vec2::new(0.1, 0.6), Pressed)));
    for step in 1..=10_u8 {
        let x = 0.1 + f32::from(step) * 0.05;
        cues.push((120 + u32::from(step), Cue::Touch(0, Vec2::new(x, 0.6), Moved)));
    }
    cues.push((131, Cue::Touch(0, Vec2::new(0.6, 0.6), Released)));

    // Pinch open while turning
    cues.push((160, Cue::Touch(0, Vec2::new(0.45, 0.5), Pressed)));
    cues.push((160, Cue::Touch(1, Vec2::new(0.55, 0.5), Pressed)));
    for step in 1..=8_u8 {
        let t = f32::from(step) / 8.0;
        let half = Vec2::from_angle(t * 0.6) * (0.05 + 0.1 * t);
        let center = Vec2::new(0.5, 0.5);
        let frame = 160 + u32::from(step);
        cues.push((frame, Cue::Touch(0, center - half, Moved)));
        cues.push((frame, Cue::Touch(1, center + half, Moved)));
    }
    cues.push((170, Cue::Touch(1, Vec2::new(0.6, 0.5), Released)));
    cues.push((171, Cue::Touch(0, Vec2::new(0.4, 0.5), Released)));

    cues.push((200, Cue::Unplug));
    cues
}

struct Session {
    input: InputManager,
    touch: TouchFeed,
    pad: GamePadFeed,
    frame_time: Duration,
    now: Duration,
}

impl Session {
    fn new(frame_time: Duration) -> Self {
        let actions = ActionMap::builder()
            .bind("confirm", GamePadButton::A)
            .build();
        let mut input = InputManager::new(InputConfig::default().with_surface_size(SURFACE))
            .with_actions(actions);
        input.add_gesture(TapConfig::default());
        input.add_gesture(DragConfig::default());
        input.add_gesture(CompositeConfig::default());

        let source = QueueSource::new("replay");
        let handle = source.handle().clone();
        let touch = handle.add_touch_surface(
            DeviceInfo::new(DeviceId::from_name("replay-touch"), "Replay touch screen"),
            SURFACE,
        );
        let pad = handle.add_gamepad(
            DeviceInfo::new(DeviceId::from_name("replay-pad"), "Replay gamepad"),
            GamePadIndexPolicy::Assignable,
        );
        input.add_source(source);

        Self {
            input,
            touch,
            pad,
            frame_time,
            now: Duration::ZERO,
        }
    }

    fn apply(&self, cue: Cue) {
        match cue {
            Cue::Touch(id, position, event_type) => {
                self.touch.sample(id, position, event_type, self.now);
            }
            Cue::Pad(button, down) => self.pad.modify(|state| state.buttons.set(button, down)),
            Cue::Unplug => self.pad.fail("unplugged by script"),
        }
    }

    fn run(&mut self, cues: &[(u32, Cue)]) -> anyhow::Result<()> {
        let last = cues.iter().map(|&(frame, _)| frame).max().unwrap_or(0) + 30;
        for frame in 0..=last {
            for &(_, cue) in cues.iter().filter(|&&(at, _)| at == frame) {
                self.apply(cue);
            }

            self.input
                .update(self.frame_time)
                .with_context(|| format!("frame {frame}"))?;
            self.now += self.frame_time;

            for change in self.input.changes() {
                info!(frame, ?change, "Device change");
            }
            for event in self.input.gesture_events() {
                log_gesture(frame, &event);
            }
            if self.input.is_action_just_pressed("confirm") {
                info!(frame, "Action confirm pressed");
            }
            if self.input.is_action_just_released("confirm") {
                info!(frame, "Action confirm released");
            }
        }

        let store = self.input.event_store();
        info!(
            frames = last + 1,
            live = store.total_active(),
            capacity = store.total_capacity(),
            "Replay finished"
        );
        Ok(())
    }
}

fn log_gesture(frame: u32, event: &GestureEvent) {
    let state = event.state;
    match event.data {
        GestureData::Tap(tap) => info!(
            frame,
            ?state,
            taps = tap.number_of_taps,
            position = ?tap.position,
            "Tap"
        ),
        GestureData::LongPress(press) => info!(frame, ?state, position = ?press.position, "Long press"),
        GestureData::Drag(drag) => info!(
            frame,
            ?state,
            total = ?drag.total_translation,
            "Drag"
        ),
        GestureData::Flick(flick) => info!(frame, ?state, speed = flick.average_speed, "Flick"),
        GestureData::Composite(c) => info!(
            frame,
            ?state,
            rotation = c.total_rotation,
            scale = c.total_scale,
            translation = ?c.total_translation,
            "Composite"
        ),
    }
}

fn parse_frame_time() -> anyhow::Result<Duration> {
    let mut args = std::env::args().skip(1);
    let mut millis = DEFAULT_FRAME_MS;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--frame-ms" => {
                let value = args.next().context("--frame-ms needs a value")?;
                millis = value
                    .parse()
                    .with_context(|| format!("invalid frame time: {value}"))?;
                if millis == 0 {
                    bail!("frame time must be positive");
                }
            }
            other => warn!(arg = other, "Ignoring unknown argument"),
        }
    }
    Ok(Duration::from_millis(millis))
}

fn print_help() {
    eprintln!(
        "Kinesis input replay

USAGE:
    cargo run -p kinesis-replay -- [OPTIONS]

OPTIONS:
    --frame-ms <N>    Simulated frame time in milliseconds (default: {DEFAULT_FRAME_MS})
    -h, --help        Print this help message

ENVIRONMENT:
    RUST_LOG          Log filter (e.g. info, kinesis_input=debug)"
    );
}

fn main() -> anyhow::Result<()> {
    if std::env::args().any(|arg| arg == "-h" || arg == "--help") {
        print_help();
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let frame_time = parse_frame_time()?;
    info!(?frame_time, "Kinesis input replay");
    Session::new(frame_time).run(&timeline())
}
