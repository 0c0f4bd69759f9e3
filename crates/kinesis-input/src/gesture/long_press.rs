use std::time::Duration;

use glam::Vec2;

use super::config::LongPressConfig;
use super::tracker::{self, FingerHandler, FingerTracker, TouchSample, TrackedFinger};
use super::{Frame, GestureClock, GestureData, GestureState};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LongPressEvent {
    pub number_of_fingers: usize,
    /// Centroid of the fingers when the press was recognized.
    pub position: Vec2,
}

impl From<LongPressEvent> for GestureData {
    fn from(event: LongPressEvent) -> Self {
        Self::LongPress(event)
    }
}

/// Reports a press held long enough without drifting.
#[derive(Debug)]
pub(super) struct LongPressRecognizer {
    pub(super) config: LongPressConfig,
    tracker: FingerTracker,
    clock: GestureClock,
    pressing: bool,
    blocked: bool,
}

impl LongPressRecognizer {
    pub(super) fn new(config: LongPressConfig) -> Self {
        Self {
            config,
            tracker: FingerTracker::default(),
            clock: GestureClock::default(),
            pressing: false,
            blocked: false,
        }
    }

    pub(super) fn update(&mut self, dt: Duration, samples: &[TouchSample], frame: &mut Frame<'_>) {
        self.clock.tick(dt);
        tracker::feed(self, samples, frame);

        if self.pressing && self.clock.since_beginning() >= self.config.press_time {
            let event = LongPressEvent {
                number_of_fingers: self.tracker.count(),
                position: self.tracker.centroid(),
            };
            frame.emit(&mut self.clock, GestureState::Occurred, event);
            self.abandon();
        }
    }

    fn abandon(&mut self) {
        self.pressing = false;
        self.blocked = true;
    }
}

impl FingerHandler for LongPressRecognizer {
    fn tracker(&mut self) -> &mut FingerTracker {
        &mut self.tracker
    }

    fn on_down(&mut self, _frame: &mut Frame<'_>) {
        let count = self.tracker.count();
        if self.blocked {
            return;
        }
        if count > self.config.required_fingers {
            self.abandon();
        } else if count == self.config.required_fingers {
            self.pressing = true;
            self.clock.begin();
        }
    }

    fn on_moved(&mut self, frame: &mut Frame<'_>) {
        if !self.pressing {
            return;
        }
        let ratio = frame.ratio();
        let drifted = self.tracker.fingers().iter().any(|f| {
            ratio.to_isotropic(f.current - f.begin).length() > self.config.max_translation
        });
        if drifted {
            self.abandon();
        }
    }

    fn on_up(&mut self, _finger: TrackedFinger, _canceled: bool, _frame: &mut Frame<'_>) {
        self.pressing = false;
        self.blocked = self.tracker.count() > 0;
    }
}
