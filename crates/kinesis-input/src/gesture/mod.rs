//! Gesture recognition from pointer events.
//!
//! A [`GestureSet`] listens to pointer events like any other router listener,
//! buffers them as [`TouchSample`]s during dispatch and evaluates every active
//! recognizer once per frame in [`GestureSet::update`].
//!
//! Continuous gestures (drag, composite) report `Started`, any number of
//! `Changed` and one `Ended`. Discrete gestures (tap, long press, flick)
//! report a single `Occurred`.

mod composite;
mod config;
mod drag;
mod flick;
mod long_press;
mod tap;
mod tracker;

use std::time::Duration;

use glam::Vec2;
use kinesis_core::math::ScreenRatio;
use kinesis_core::DeviceId;

pub use composite::CompositeEvent;
pub use config::{
    CompositeConfig, DragConfig, FlickConfig, GestureConfig, GestureShape, LongPressConfig,
    TapConfig,
};
pub use drag::DragEvent;
pub use flick::FlickEvent;
pub use long_press::LongPressEvent;
pub use tap::TapEvent;
pub use tracker::{FingerId, FingerTracker, TouchSample, TrackedFinger};

use crate::event::{EventKind, InputEvent, PointerEventType};
use crate::router::InputEventListener;

use composite::CompositeRecognizer;
use drag::DragRecognizer;
use flick::FlickRecognizer;
use long_press::LongPressRecognizer;
use tap::TapRecognizer;

/// Identifies a gesture added to a [`GestureSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GestureId(u32);

impl GestureId {
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureKind {
    Tap,
    LongPress,
    Drag,
    Flick,
    Composite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureState {
    Started,
    Changed,
    Ended,
    /// A discrete gesture was recognized.
    Occurred,
}

/// Kind-specific gesture payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureData {
    Tap(TapEvent),
    LongPress(LongPressEvent),
    Drag(DragEvent),
    Flick(FlickEvent),
    Composite(CompositeEvent),
}

impl GestureData {
    #[must_use]
    pub const fn kind(&self) -> GestureKind {
        match self {
            Self::Tap(_) => GestureKind::Tap,
            Self::LongPress(_) => GestureKind::LongPress,
            Self::Drag(_) => GestureKind::Drag,
            Self::Flick(_) => GestureKind::Flick,
            Self::Composite(_) => GestureKind::Composite,
        }
    }
}

/// A recognized gesture transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureEvent {
    pub gesture: GestureId,
    pub state: GestureState,
    /// Time since the gesture began.
    pub total_time: Duration,
    /// Time since the previous event of the same gesture.
    pub delta_time: Duration,
    pub data: GestureData,
}

impl GestureEvent {
    #[must_use]
    pub const fn kind(&self) -> GestureKind {
        self.data.kind()
    }
}

/// Running time of one recognizer.
#[derive(Debug, Default)]
pub(crate) struct GestureClock {
    now: Duration,
    began_at: Duration,
    last_event_at: Duration,
}

impl GestureClock {
    fn tick(&mut self, dt: Duration) {
        self.now += dt;
    }

    pub(crate) const fn now(&self) -> Duration {
        self.now
    }

    /// Mark the start of a gesture at the current time.
    pub(crate) fn begin(&mut self) {
        self.begin_at(self.now);
    }

    pub(crate) fn begin_at(&mut self, at: Duration) {
        self.began_at = at;
        self.last_event_at = at;
    }

    pub(crate) const fn since_beginning(&self) -> Duration {
        self.now.saturating_sub(self.began_at)
    }

    /// Time since beginning and since the last event, then restart the latter.
    fn stamp(&mut self) -> (Duration, Duration) {
        let stamp = (
            self.since_beginning(),
            self.now.saturating_sub(self.last_event_at),
        );
        self.last_event_at = self.now;
        stamp
    }
}

/// Per-frame context handed to a recognizer.
pub(crate) struct Frame<'a> {
    gesture: GestureId,
    ratio: ScreenRatio,
    events: &'a mut Vec<GestureEvent>,
}

impl Frame<'_> {
    pub(crate) const fn ratio(&self) -> ScreenRatio {
        self.ratio
    }

    pub(crate) fn emit(
        &mut self,
        clock: &mut GestureClock,
        state: GestureState,
        data: impl Into<GestureData>,
    ) {
        let data = data.into();
        let (total_time, delta_time) = clock.stamp();
        if state == GestureState::Changed {
            tracing::trace!(gesture = self.gesture.0, kind = ?data.kind(), "gesture changed");
        } else {
            tracing::debug!(gesture = self.gesture.0, kind = ?data.kind(), ?state, "gesture");
        }
        self.events.push(GestureEvent {
            gesture: self.gesture,
            state,
            total_time,
            delta_time,
            data,
        });
    }
}

#[derive(Debug)]
enum Recognizer {
    Tap(TapRecognizer),
    LongPress(LongPressRecognizer),
    Drag(DragRecognizer),
    Flick(FlickRecognizer),
    Composite(CompositeRecognizer),
}

impl Recognizer {
    fn new(config: GestureConfig) -> Self {
        match config {
            GestureConfig::Tap(c) => Self::Tap(TapRecognizer::new(c)),
            GestureConfig::LongPress(c) => Self::LongPress(LongPressRecognizer::new(c)),
            GestureConfig::Drag(c) => Self::Drag(DragRecognizer::new(c)),
            GestureConfig::Flick(c) => Self::Flick(FlickRecognizer::new(c)),
            GestureConfig::Composite(c) => Self::Composite(CompositeRecognizer::new(c)),
        }
    }

    const fn config(&self) -> GestureConfig {
        match self {
            Self::Tap(r) => GestureConfig::Tap(r.config),
            Self::LongPress(r) => GestureConfig::LongPress(r.config),
            Self::Drag(r) => GestureConfig::Drag(r.config),
            Self::Flick(r) => GestureConfig::Flick(r.config),
            Self::Composite(r) => GestureConfig::Composite(r.config),
        }
    }

    fn update(&mut self, dt: Duration, samples: &[TouchSample], frame: &mut Frame<'_>) {
        match self {
            Self::Tap(r) => r.update(dt, samples, frame),
            Self::LongPress(r) => r.update(dt, samples, frame),
            Self::Drag(r) => r.update(dt, samples, frame),
            Self::Flick(r) => r.update(dt, samples, frame),
            Self::Composite(r) => r.update(dt, samples, frame),
        }
    }
}

/// The set of active gestures.
///
/// Register it with the router for [`EventKind::Pointer`]; call
/// [`pre_update`](Self::pre_update) before dispatch and
/// [`update`](Self::update) after it. Removing a gesture drops its state.
/// Fingers of a device that goes away are closed with
/// [`cancel_device`](Self::cancel_device).
#[derive(Debug, Default)]
pub struct GestureSet {
    gestures: Vec<(GestureId, Recognizer)>,
    samples: Vec<TouchSample>,
    down: Vec<(FingerId, Vec2)>,
    events: Vec<GestureEvent>,
    next_id: u32,
}

impl GestureSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start recognizing a gesture.
    pub fn add(&mut self, config: impl Into<GestureConfig>) -> GestureId {
        let id = GestureId(self.next_id);
        self.next_id += 1;
        self.gestures.push((id, Recognizer::new(config.into())));
        id
    }

    /// Stop recognizing a gesture. Returns `false` for unknown ids.
    pub fn remove(&mut self, id: GestureId) -> bool {
        let before = self.gestures.len();
        self.gestures.retain(|(gesture, _)| *gesture != id);
        self.gestures.len() != before
    }

    #[must_use]
    pub fn contains(&self, id: GestureId) -> bool {
        self.gestures.iter().any(|(gesture, _)| *gesture == id)
    }

    #[must_use]
    pub fn config(&self, id: GestureId) -> Option<GestureConfig> {
        self.gestures
            .iter()
            .find(|(gesture, _)| *gesture == id)
            .map(|(_, recognizer)| recognizer.config())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.gestures.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.gestures.is_empty()
    }

    /// Forget the previous frame's samples and events.
    pub fn pre_update(&mut self) {
        self.samples.clear();
        self.events.clear();
    }

    /// Cancel every finger of `device` that is still down. Must run between
    /// [`pre_update`](Self::pre_update) and [`update`](Self::update).
    ///
    /// Returns the number of fingers canceled.
    pub fn cancel_device(&mut self, device: DeviceId) -> usize {
        let before = self.samples.len();
        let samples = &mut self.samples;
        self.down.retain(|&(finger, position)| {
            if finger.device != device {
                return true;
            }
            samples.push(TouchSample {
                finger,
                position,
                event_type: PointerEventType::Canceled,
            });
            false
        });
        self.samples.len() - before
    }

    /// Evaluate every gesture against the samples received since
    /// [`pre_update`](Self::pre_update).
    pub fn update(&mut self, dt: Duration, ratio: ScreenRatio) {
        for (id, recognizer) in &mut self.gestures {
            let mut frame = Frame {
                gesture: *id,
                ratio,
                events: &mut self.events,
            };
            recognizer.update(dt, &self.samples, &mut frame);
        }
    }

    /// Gesture events produced by the last [`update`](Self::update).
    #[must_use]
    pub fn events(&self) -> &[GestureEvent] {
        &self.events
    }
}

impl InputEventListener for GestureSet {
    fn event_kinds(&self) -> &'static [EventKind] {
        &[EventKind::Pointer]
    }

    fn process_event(&mut self, event: &InputEvent<'_>) {
        if let InputEvent::Pointer(e) = event {
            let finger = FingerId {
                device: e.device,
                pointer: e.pointer_id,
            };
            let tracked = self.down.iter().position(|(id, _)| *id == finger);
            match (e.event_type, tracked) {
                (PointerEventType::Pressed, None) => self.down.push((finger, e.position)),
                (PointerEventType::Pressed | PointerEventType::Moved, Some(i)) => {
                    self.down[i].1 = e.position;
                }
                (PointerEventType::Released | PointerEventType::Canceled, Some(i)) => {
                    self.down.swap_remove(i);
                }
                _ => {}
            }
            self.samples.push(TouchSample {
                finger,
                position: e.position,
                event_type: e.event_type,
            });
        }
    }
}

#[cfg(test)]
pub(crate) mod test_util {
    use glam::Vec2;
    use kinesis_core::DeviceId;

    use super::*;
    use crate::event::PointerEventType;

    pub const DT: Duration = Duration::from_millis(20);

    /// Drives a [`GestureSet`] with raw samples of a single touch device.
    pub struct Script {
        pub set: GestureSet,
        device: DeviceId,
    }

    impl Script {
        pub fn new(config: impl Into<GestureConfig>) -> Self {
            let mut set = GestureSet::new();
            set.add(config);
            Self {
                set,
                device: DeviceId::from_name("touch"),
            }
        }

        /// Run one frame with `samples` and return its events.
        pub fn frame(&mut self, samples: &[(u32, f32, f32, PointerEventType)]) -> Vec<GestureEvent> {
            self.set.pre_update();
            for &(pointer, x, y, event_type) in samples {
                self.set.samples.push(TouchSample {
                    finger: FingerId {
                        device: self.device,
                        pointer,
                    },
                    position: Vec2::new(x, y),
                    event_type,
                });
            }
            self.set.update(DT, ScreenRatio::SQUARE);
            self.set.events().to_vec()
        }

        /// Run `count` frames without samples and collect their events.
        pub fn idle(&mut self, count: usize) -> Vec<GestureEvent> {
            (0..count).flat_map(|_| self.frame(&[])).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;
    use kinesis_core::DeviceId;

    use super::*;
    use crate::event::{PointerEvent, PointerEventType};

    #[test]
    fn ids_are_unique_and_removable() {
        let mut set = GestureSet::new();
        let tap = set.add(TapConfig::default());
        let drag = set.add(DragConfig::default());
        assert_ne!(tap, drag);
        assert_eq!(set.len(), 2);
        assert!(matches!(set.config(drag), Some(GestureConfig::Drag(_))));

        assert!(set.remove(tap));
        assert!(!set.remove(tap));
        assert!(!set.contains(tap));
        assert!(set.config(tap).is_none());
    }

    #[test]
    fn pointer_events_become_samples() {
        let mut set = GestureSet::new();
        let event = PointerEvent {
            device: DeviceId::from_name("touch"),
            pointer_id: 4,
            position: Vec2::new(0.5, 0.5),
            delta_position: Vec2::ZERO,
            delta_time: Duration::ZERO,
            event_type: PointerEventType::Pressed,
            is_down: true,
            surface_size: Vec2::new(100.0, 100.0),
        };
        set.process_event(&InputEvent::Pointer(&event));
        assert_eq!(set.samples.len(), 1);
        assert_eq!(set.samples[0].finger.pointer, 4);

        set.pre_update();
        assert!(set.samples.is_empty());
    }

    fn pointer(device: DeviceId, pointer_id: u32, x: f32, event_type: PointerEventType) -> PointerEvent {
        PointerEvent {
            device,
            pointer_id,
            position: Vec2::new(x, 0.5),
            delta_position: Vec2::ZERO,
            delta_time: Duration::ZERO,
            event_type,
            is_down: event_type != PointerEventType::Released,
            surface_size: Vec2::new(100.0, 100.0),
        }
    }

    #[test]
    fn removed_device_cancels_its_fingers() {
        let gone = DeviceId::from_name("gone");
        let kept = DeviceId::from_name("kept");
        let mut set = GestureSet::new();
        set.add(DragConfig::default());

        set.pre_update();
        set.process_event(&InputEvent::Pointer(&pointer(gone, 0, 0.2, PointerEventType::Pressed)));
        set.process_event(&InputEvent::Pointer(&pointer(gone, 1, 0.3, PointerEventType::Pressed)));
        set.process_event(&InputEvent::Pointer(&pointer(kept, 0, 0.6, PointerEventType::Pressed)));
        set.process_event(&InputEvent::Pointer(&pointer(gone, 1, 0.4, PointerEventType::Moved)));
        set.update(Duration::from_millis(16), ScreenRatio::SQUARE);

        set.pre_update();
        assert_eq!(set.cancel_device(gone), 2);
        assert!(set
            .samples
            .iter()
            .all(|s| s.finger.device == gone && s.event_type == PointerEventType::Canceled));
        assert_eq!(
            set.samples.iter().find(|s| s.finger.pointer == 1).map(|s| s.position),
            Some(Vec2::new(0.4, 0.5))
        );
        assert_eq!(set.cancel_device(gone), 0);
    }

    #[test]
    fn drag_ends_when_its_device_goes_away() {
        let device = DeviceId::from_name("touch");
        let dt = Duration::from_millis(16);
        let mut set = GestureSet::new();
        set.add(DragConfig::default());

        set.pre_update();
        set.process_event(&InputEvent::Pointer(&pointer(device, 0, 0.2, PointerEventType::Pressed)));
        set.update(dt, ScreenRatio::SQUARE);
        set.pre_update();
        set.process_event(&InputEvent::Pointer(&pointer(device, 0, 0.4, PointerEventType::Moved)));
        set.update(dt, ScreenRatio::SQUARE);
        assert_eq!(set.events().len(), 1);
        assert_eq!(set.events()[0].state, GestureState::Started);

        set.pre_update();
        set.cancel_device(device);
        set.update(dt, ScreenRatio::SQUARE);
        assert_eq!(set.events().len(), 1);
        assert_eq!(set.events()[0].state, GestureState::Ended);
    }

    #[test]
    fn released_fingers_are_not_canceled_again() {
        let device = DeviceId::from_name("touch");
        let mut set = GestureSet::new();
        set.process_event(&InputEvent::Pointer(&pointer(device, 0, 0.2, PointerEventType::Pressed)));
        set.process_event(&InputEvent::Pointer(&pointer(device, 0, 0.2, PointerEventType::Released)));
        set.pre_update();
        assert_eq!(set.cancel_device(device), 0);
        assert!(set.samples.is_empty());
    }

    #[test]
    fn clock_stamps_restart_delta() {
        let mut clock = GestureClock::default();
        clock.tick(Duration::from_millis(10));
        clock.begin();
        clock.tick(Duration::from_millis(30));
        assert_eq!(
            clock.stamp(),
            (Duration::from_millis(30), Duration::from_millis(30))
        );
        clock.tick(Duration::from_millis(5));
        assert_eq!(
            clock.stamp(),
            (Duration::from_millis(35), Duration::from_millis(5))
        );
    }
}
