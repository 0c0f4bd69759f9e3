use std::time::Duration;

use glam::Vec2;
use kinesis_core::constants::EPSILON;
use kinesis_core::math::{ratio_or_zero, signed_angle, ScreenRatio};

use super::config::CompositeConfig;
use super::tracker::{self, FingerHandler, FingerTracker, TouchSample, TrackedFinger};
use super::{Frame, GestureClock, GestureData, GestureState};

const REQUIRED_FINGERS: usize = 2;

/// Two-finger transform.
///
/// Delta fields compare against the previous event of the gesture, total
/// fields against the moment the second finger touched. Rotation is in
/// radians, positive from the x axis towards the y axis; scale is the ratio
/// of finger distances; translations are of the fingers' midpoint in
/// normalized coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositeEvent {
    pub center_begin: Vec2,
    pub center_current: Vec2,
    pub delta_rotation: f32,
    pub total_rotation: f32,
    pub delta_scale: f32,
    pub total_scale: f32,
    pub delta_translation: Vec2,
    pub total_translation: Vec2,
}

impl From<CompositeEvent> for GestureData {
    fn from(event: CompositeEvent) -> Self {
        Self::Composite(event)
    }
}

/// Finger layout at one instant.
#[derive(Debug, Clone, Copy, Default)]
struct Pose {
    /// Second finger minus first, ratio-corrected.
    vector: Vec2,
    /// Midpoint, normalized.
    center: Vec2,
}

impl Pose {
    fn of(fingers: &[TrackedFinger], ratio: ScreenRatio) -> Self {
        match fingers {
            [a, b] => Self {
                vector: ratio.to_isotropic(b.current - a.current),
                center: (a.current + b.current) * 0.5,
            },
            _ => Self::default(),
        }
    }

    /// Signed angle turning `self` onto `other`; zero if either is degenerate.
    fn rotation_to(self, other: Self) -> f32 {
        if self.vector.length() < EPSILON || other.vector.length() < EPSILON {
            return 0.0;
        }
        signed_angle(self.vector.normalize(), other.vector.normalize())
    }

    /// Distance ratio from `self` to `other`; zero if `self` is degenerate.
    fn scale_to(self, other: Self) -> f32 {
        ratio_or_zero(other.vector.length(), self.vector.length())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    /// Two fingers are down; waiting for a threshold to be crossed.
    Tracking,
    Active,
}

/// Rotation, scale and translation of exactly two fingers.
#[derive(Debug)]
pub(super) struct CompositeRecognizer {
    pub(super) config: CompositeConfig,
    tracker: FingerTracker,
    clock: GestureClock,
    phase: Phase,
    begin: Pose,
    last: Pose,
    current: Pose,
    dirty: bool,
}

impl CompositeRecognizer {
    pub(super) fn new(config: CompositeConfig) -> Self {
        Self {
            config,
            tracker: FingerTracker::default(),
            clock: GestureClock::default(),
            phase: Phase::Idle,
            begin: Pose::default(),
            last: Pose::default(),
            current: Pose::default(),
            dirty: false,
        }
    }

    pub(super) fn update(&mut self, dt: Duration, samples: &[TouchSample], frame: &mut Frame<'_>) {
        self.clock.tick(dt);
        tracker::feed(self, samples, frame);

        if !std::mem::take(&mut self.dirty) {
            return;
        }
        match self.phase {
            Phase::Idle => {}
            Phase::Tracking => {
                if self.crossed_threshold(frame.ratio()) {
                    self.phase = Phase::Active;
                    self.emit(GestureState::Started, frame);
                }
            }
            Phase::Active => self.emit(GestureState::Changed, frame),
        }
    }

    fn crossed_threshold(&self, ratio: ScreenRatio) -> bool {
        let rotation = self.begin.rotation_to(self.current);
        let scale = self.begin.scale_to(self.current);
        let translation = ratio.to_isotropic(self.current.center - self.begin.center);
        rotation.abs() >= self.config.min_rotation
            || (scale - 1.0).abs() >= self.config.min_scale
            || translation.length() >= self.config.min_translation
    }

    fn emit(&mut self, state: GestureState, frame: &mut Frame<'_>) {
        let event = CompositeEvent {
            center_begin: self.begin.center,
            center_current: self.current.center,
            delta_rotation: self.last.rotation_to(self.current),
            total_rotation: self.begin.rotation_to(self.current),
            delta_scale: self.last.scale_to(self.current),
            total_scale: self.begin.scale_to(self.current),
            delta_translation: self.current.center - self.last.center,
            total_translation: self.current.center - self.begin.center,
        };
        self.last = self.current;
        frame.emit(&mut self.clock, state, event);
    }

    fn end(&mut self, frame: &mut Frame<'_>) {
        if self.phase == Phase::Active {
            self.emit(GestureState::Ended, frame);
        }
        self.phase = Phase::Idle;
        self.dirty = false;
    }

    fn track(&mut self, ratio: ScreenRatio) {
        self.begin = Pose::of(self.tracker.fingers(), ratio);
        self.last = self.begin;
        self.current = self.begin;
        self.phase = Phase::Tracking;
        self.clock.begin();
    }
}

impl FingerHandler for CompositeRecognizer {
    fn tracker(&mut self) -> &mut FingerTracker {
        &mut self.tracker
    }

    fn on_down(&mut self, frame: &mut Frame<'_>) {
        if self.tracker.count() == REQUIRED_FINGERS {
            self.track(frame.ratio());
        } else {
            self.end(frame);
        }
    }

    fn on_moved(&mut self, frame: &mut Frame<'_>) {
        if self.phase != Phase::Idle {
            self.current = Pose::of(self.tracker.fingers(), frame.ratio());
            self.dirty = true;
        }
    }

    fn on_up(&mut self, _finger: TrackedFinger, _canceled: bool, frame: &mut Frame<'_>) {
        self.end(frame);
        if self.tracker.count() == REQUIRED_FINGERS {
            self.track(frame.ratio());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::PointerEventType::{Canceled, Moved, Pressed, Released};
    use crate::gesture::test_util::Script;
    use crate::gesture::GestureEvent;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_4;

    fn composite(event: &GestureEvent) -> CompositeEvent {
        match event.data {
            GestureData::Composite(c) => c,
            _ => panic!("expected a composite gesture"),
        }
    }

    fn touch_pair(script: &mut Script) {
        script.frame(&[(0, 0.4, 0.5, Pressed), (1, 0.6, 0.5, Pressed)]);
    }

    #[test]
    fn rotate_and_spread() {
        let mut script = Script::new(CompositeConfig::default());
        touch_pair(&mut script);
        let events = script.frame(&[(0, 0.4, 0.4, Moved), (1, 0.6, 0.6, Moved)]);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].state, GestureState::Started);

        let c = composite(&events[0]);
        assert_relative_eq!(c.total_scale, std::f32::consts::SQRT_2, epsilon = 1e-4);
        assert_relative_eq!(c.total_rotation, FRAC_PI_4, epsilon = 1e-4);
        assert_relative_eq!(c.total_translation.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(c.total_translation.y, 0.0, epsilon = 1e-5);
        assert_relative_eq!(c.delta_rotation, c.total_rotation, epsilon = 1e-6);
        assert_relative_eq!(c.center_begin.x, 0.5, epsilon = 1e-5);
    }

    #[test]
    fn clockwise_rotation_is_negative() {
        let mut script = Script::new(CompositeConfig::default());
        touch_pair(&mut script);
        let events = script.frame(&[(0, 0.4, 0.6, Moved), (1, 0.6, 0.4, Moved)]);
        assert_relative_eq!(composite(&events[0]).total_rotation, -FRAC_PI_4, epsilon = 1e-4);
    }

    #[test]
    fn midpoint_translation() {
        let mut script = Script::new(CompositeConfig::default());
        touch_pair(&mut script);
        let events = script.frame(&[(0, 0.4, 0.55, Moved), (1, 0.6, 0.55, Moved)]);
        assert_eq!(events.len(), 1);
        let c = composite(&events[0]);
        assert_relative_eq!(c.total_translation.y, 0.05, epsilon = 1e-5);
        assert_relative_eq!(c.total_scale, 1.0, epsilon = 1e-5);
        assert_relative_eq!(c.total_rotation, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn nothing_starts_below_thresholds() {
        let mut script = Script::new(CompositeConfig::default());
        touch_pair(&mut script);
        assert!(script.frame(&[(0, 0.401, 0.5, Moved), (1, 0.601, 0.501, Moved)]).is_empty());
        assert!(script.frame(&[(0, 0.401, 0.5, Released)]).is_empty());
    }

    #[test]
    fn deltas_are_frame_to_frame() {
        let mut script = Script::new(CompositeConfig::default());
        touch_pair(&mut script);
        script.frame(&[(1, 0.7, 0.5, Moved)]);
        let events = script.frame(&[(1, 0.8, 0.5, Moved)]);
        assert_eq!(events[0].state, GestureState::Changed);
        let c = composite(&events[0]);
        assert_relative_eq!(c.total_scale, 2.0, epsilon = 1e-4);
        assert_relative_eq!(c.delta_scale, 4.0 / 3.0, epsilon = 1e-4);
        assert_relative_eq!(c.delta_translation.x, 0.05, epsilon = 1e-5);
        assert_relative_eq!(c.total_translation.x, 0.1, epsilon = 1e-5);
    }

    #[test]
    fn lifting_a_finger_ends_once_with_final_deltas() {
        let mut script = Script::new(CompositeConfig::default());
        touch_pair(&mut script);
        script.frame(&[(1, 0.7, 0.5, Moved)]);

        let events = script.frame(&[(1, 0.8, 0.5, Moved), (1, 0.8, 0.5, Released)]);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].state, GestureState::Ended);
        let c = composite(&events[0]);
        assert_relative_eq!(c.delta_scale, 4.0 / 3.0, epsilon = 1e-4);
        assert_relative_eq!(c.total_scale, 2.0, epsilon = 1e-4);

        assert!(script.frame(&[(0, 0.2, 0.5, Moved)]).is_empty());
        assert!(script.frame(&[(0, 0.2, 0.5, Released)]).is_empty());
    }

    #[test]
    fn cancel_also_ends() {
        let mut script = Script::new(CompositeConfig::default());
        touch_pair(&mut script);
        script.frame(&[(1, 0.7, 0.5, Moved)]);
        let events = script.frame(&[(0, 0.4, 0.5, Canceled)]);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].state, GestureState::Ended);
        assert_relative_eq!(composite(&events[0]).delta_scale, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn third_finger_ends_and_lifting_it_restarts_tracking() {
        let mut script = Script::new(CompositeConfig::default());
        touch_pair(&mut script);
        script.frame(&[(1, 0.7, 0.5, Moved)]);
        let events = script.frame(&[(2, 0.1, 0.1, Pressed)]);
        assert_eq!(events[0].state, GestureState::Ended);

        assert!(script.frame(&[(2, 0.1, 0.1, Released)]).is_empty());
        let events = script.frame(&[(1, 0.9, 0.5, Moved)]);
        assert_eq!(events[0].state, GestureState::Started);
        assert_relative_eq!(composite(&events[0]).total_scale, 5.0 / 3.0, epsilon = 1e-4);
    }

    #[test]
    fn non_square_surface_measures_rotation_isotropically() {
        let begin = Pose::of(
            &[
                finger(0, Vec2::new(0.4, 0.5)),
                finger(1, Vec2::new(0.6, 0.5)),
            ],
            ScreenRatio::from_size(Vec2::new(200.0, 100.0)),
        );
        let current = Pose::of(
            &[
                finger(0, Vec2::new(0.4, 0.4)),
                finger(1, Vec2::new(0.6, 0.6)),
            ],
            ScreenRatio::from_size(Vec2::new(200.0, 100.0)),
        );
        let expected = 0.1_f32.atan2(0.2);
        assert_relative_eq!(begin.rotation_to(current), expected, epsilon = 1e-5);
    }

    #[test]
    fn degenerate_begin_reports_zero_scale() {
        let point = Pose::default();
        let spread = Pose {
            vector: Vec2::new(0.2, 0.0),
            center: Vec2::ZERO,
        };
        assert_eq!(point.scale_to(spread), 0.0);
        assert_eq!(point.rotation_to(spread), 0.0);
    }

    fn finger(pointer: u32, position: Vec2) -> TrackedFinger {
        TrackedFinger {
            id: crate::gesture::FingerId {
                device: kinesis_core::DeviceId::from_name("touch"),
                pointer,
            },
            begin: position,
            current: position,
        }
    }
}
