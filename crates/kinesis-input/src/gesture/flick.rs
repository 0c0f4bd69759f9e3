use std::time::Duration;

use glam::Vec2;
use kinesis_core::math::ratio_or_zero;

use super::config::FlickConfig;
use super::tracker::{self, FingerHandler, FingerTracker, TouchSample, TrackedFinger};
use super::{Frame, GestureClock, GestureData, GestureState};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlickEvent {
    pub number_of_fingers: usize,
    pub start_position: Vec2,
    pub current_position: Vec2,
    /// Stroke from start to lift-off, in normalized coordinates.
    pub translation: Vec2,
    /// Stroke length over stroke duration, per second.
    pub average_speed: f32,
}

impl From<FlickEvent> for GestureData {
    fn from(event: FlickEvent) -> Self {
        Self::Flick(event)
    }
}

/// Reports a fast stroke when the fingers lift.
#[derive(Debug)]
pub(super) struct FlickRecognizer {
    pub(super) config: FlickConfig,
    tracker: FingerTracker,
    clock: GestureClock,
    tracking: bool,
    blocked: bool,
    start: Vec2,
    current: Vec2,
}

impl FlickRecognizer {
    pub(super) fn new(config: FlickConfig) -> Self {
        Self {
            config,
            tracker: FingerTracker::default(),
            clock: GestureClock::default(),
            tracking: false,
            blocked: false,
            start: Vec2::ZERO,
            current: Vec2::ZERO,
        }
    }

    pub(super) fn update(&mut self, dt: Duration, samples: &[TouchSample], frame: &mut Frame<'_>) {
        self.clock.tick(dt);
        tracker::feed(self, samples, frame);
    }

    fn abandon(&mut self) {
        self.tracking = false;
        self.blocked = true;
    }

    fn finish(&mut self, frame: &mut Frame<'_>) {
        let translation = self.current - self.start;
        let length = frame.ratio().to_isotropic(translation).length();
        let average_speed = ratio_or_zero(length, self.clock.since_beginning().as_secs_f32());
        if length >= self.config.min_length && average_speed >= self.config.min_average_speed {
            let event = FlickEvent {
                number_of_fingers: self.config.required_fingers,
                start_position: self.start,
                current_position: self.current,
                translation,
                average_speed,
            };
            frame.emit(&mut self.clock, GestureState::Occurred, event);
        }
    }
}

impl FingerHandler for FlickRecognizer {
    fn tracker(&mut self) -> &mut FingerTracker {
        &mut self.tracker
    }

    fn on_down(&mut self, _frame: &mut Frame<'_>) {
        let count = self.tracker.count();
        let required = self.config.required_fingers;
        if self.blocked {
            return;
        }
        if count > required {
            self.abandon();
        } else if count == required {
            self.tracking = true;
            self.start = self.tracker.centroid();
            self.current = self.start;
            self.clock.begin();
        }
    }

    fn on_moved(&mut self, frame: &mut Frame<'_>) {
        if !self.tracking {
            return;
        }
        self.current = self.tracker.centroid();
        let total = frame.ratio().to_isotropic(self.current - self.start);
        if !self.config.shape.accepts(total, self.config.allowed_error_margin) {
            self.abandon();
        }
    }

    fn on_up(&mut self, _finger: TrackedFinger, canceled: bool, frame: &mut Frame<'_>) {
        if self.tracking && !canceled {
            self.finish(frame);
        }
        self.tracking = false;
        self.blocked = self.tracker.count() > 0;
    }
}
