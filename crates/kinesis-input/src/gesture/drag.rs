use std::time::Duration;

use glam::Vec2;

use super::config::{DragConfig, GestureShape};
use super::tracker::{self, FingerHandler, FingerTracker, TouchSample, TrackedFinger};
use super::{Frame, GestureClock, GestureData, GestureState};

/// Movement of the finger centroid, in normalized coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragEvent {
    pub number_of_fingers: usize,
    pub shape: GestureShape,
    pub start_position: Vec2,
    pub current_position: Vec2,
    /// Movement since the previous event of this drag.
    pub delta_translation: Vec2,
    pub total_translation: Vec2,
}

impl From<DragEvent> for GestureData {
    fn from(event: DragEvent) -> Self {
        Self::Drag(event)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    /// Required fingers are down; waiting for the minimum distance.
    Tracking,
    Active,
}

/// Continuous drag of the required number of fingers.
#[derive(Debug)]
pub(super) struct DragRecognizer {
    pub(super) config: DragConfig,
    tracker: FingerTracker,
    clock: GestureClock,
    phase: Phase,
    blocked: bool,
    start: Vec2,
    last: Vec2,
    current: Vec2,
    dirty: bool,
}

impl DragRecognizer {
    pub(super) fn new(config: DragConfig) -> Self {
        Self {
            config,
            tracker: FingerTracker::default(),
            clock: GestureClock::default(),
            phase: Phase::Idle,
            blocked: false,
            start: Vec2::ZERO,
            last: Vec2::ZERO,
            current: Vec2::ZERO,
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
                let travelled = frame.ratio().to_isotropic(self.current - self.start).length();
                if travelled >= self.config.min_distance {
                    self.phase = Phase::Active;
                    self.emit(GestureState::Started, frame);
                }
            }
            Phase::Active => self.emit(GestureState::Changed, frame),
        }
    }

    fn emit(&mut self, state: GestureState, frame: &mut Frame<'_>) {
        let event = DragEvent {
            number_of_fingers: self.config.required_fingers,
            shape: self.config.shape,
            start_position: self.start,
            current_position: self.current,
            delta_translation: self.current - self.last,
            total_translation: self.current - self.start,
        };
        self.last = self.current;
        frame.emit(&mut self.clock, state, event);
    }

    /// Close an active drag with the movement not yet reported.
    fn end(&mut self, frame: &mut Frame<'_>) {
        if self.phase == Phase::Active {
            self.emit(GestureState::Ended, frame);
        }
        self.phase = Phase::Idle;
        self.dirty = false;
    }
}

impl FingerHandler for DragRecognizer {
    fn tracker(&mut self) -> &mut FingerTracker {
        &mut self.tracker
    }

    fn on_down(&mut self, frame: &mut Frame<'_>) {
        let count = self.tracker.count();
        let required = self.config.required_fingers;
        if self.phase != Phase::Idle {
            self.end(frame);
            self.blocked = true;
        } else if !self.blocked && count == required {
            self.phase = Phase::Tracking;
            self.start = self.tracker.centroid();
            self.last = self.start;
            self.current = self.start;
            self.clock.begin();
        } else if count > required {
            self.blocked = true;
        }
    }

    fn on_moved(&mut self, frame: &mut Frame<'_>) {
        if self.phase == Phase::Idle {
            return;
        }
        self.current = self.tracker.centroid();
        self.dirty = true;
        if self.phase == Phase::Tracking {
            let total = frame.ratio().to_isotropic(self.current - self.start);
            if !self.config.shape.accepts(total, self.config.allowed_error_margin) {
                self.phase = Phase::Idle;
                self.blocked = true;
                self.dirty = false;
            }
        }
    }

    fn on_up(&mut self, _finger: TrackedFinger, _canceled: bool, frame: &mut Frame<'_>) {
        self.end(frame);
        self.blocked = self.tracker.count() > 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::PointerEventType::{Moved, Pressed, Released};
    use crate::gesture::test_util::Script;
    use crate::gesture::GestureEvent;

    fn drag(event: &GestureEvent) -> DragEvent {
        match event.data {
            GestureData::Drag(drag) => drag,
            _ => panic!("expected a drag"),
        }
    }

    fn close(a: Vec2, b: Vec2) -> bool {
        a.abs_diff_eq(b, 1e-5)
    }

    #[test]
    fn starts_after_minimum_distance() {
        let mut script = Script::new(DragConfig::default());
        script.frame(&[(0, 0.5, 0.5, Pressed)]);
        assert!(script.frame(&[(0, 0.51, 0.5, Moved)]).is_empty());

        let started = script.frame(&[(0, 0.53, 0.5, Moved)]);
        assert_eq!(started.len(), 1);
        assert_eq!(started[0].state, GestureState::Started);
        assert!(close(drag(&started[0]).delta_translation, Vec2::new(0.03, 0.0)));

        let changed = script.frame(&[(0, 0.55, 0.5, Moved), (0, 0.6, 0.5, Moved)]);
        assert_eq!(changed.len(), 1);
        assert_eq!(changed[0].state, GestureState::Changed);
        assert!(close(drag(&changed[0]).delta_translation, Vec2::new(0.07, 0.0)));
        assert!(close(drag(&changed[0]).total_translation, Vec2::new(0.1, 0.0)));

        assert!(script.idle(3).is_empty());
    }

    #[test]
    fn release_ends_with_final_movement() {
        let mut script = Script::new(DragConfig::default());
        script.frame(&[(0, 0.5, 0.5, Pressed)]);
        script.frame(&[(0, 0.6, 0.5, Moved)]);
        let ended = script.frame(&[(0, 0.6, 0.55, Moved), (0, 0.6, 0.6, Released)]);
        assert_eq!(ended.len(), 1);
        assert_eq!(ended[0].state, GestureState::Ended);
        assert!(close(drag(&ended[0]).delta_translation, Vec2::new(0.0, 0.1)));
        assert!(close(drag(&ended[0]).total_translation, Vec2::new(0.1, 0.1)));
    }

    #[test]
    fn horizontal_drag_rejects_vertical_motion() {
        let config = DragConfig::default().with_shape(GestureShape::Horizontal);
        let mut script = Script::new(config);
        script.frame(&[(0, 0.5, 0.5, Pressed)]);
        assert!(script.frame(&[(0, 0.5, 0.6, Moved)]).is_empty());
        assert!(script.frame(&[(0, 0.7, 0.6, Moved)]).is_empty());
        script.frame(&[(0, 0.7, 0.6, Released)]);

        script.frame(&[(0, 0.5, 0.5, Pressed)]);
        let events = script.frame(&[(0, 0.6, 0.51, Moved)]);
        assert_eq!(events.len(), 1);
        assert_eq!(drag(&events[0]).shape, GestureShape::Horizontal);
    }

    #[test]
    fn extra_finger_ends_the_drag() {
        let mut script = Script::new(DragConfig::default());
        script.frame(&[(0, 0.5, 0.5, Pressed)]);
        script.frame(&[(0, 0.6, 0.5, Moved)]);
        let events = script.frame(&[(1, 0.2, 0.2, Pressed)]);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].state, GestureState::Ended);
        assert!(script.frame(&[(0, 0.8, 0.5, Moved)]).is_empty());
    }
}
