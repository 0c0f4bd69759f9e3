use std::time::Duration;

use glam::Vec2;

use super::config::TapConfig;
use super::tracker::{self, FingerHandler, FingerTracker, TouchSample, TrackedFinger};
use super::{Frame, GestureClock, GestureData, GestureState};

/// One or more taps grouped together.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TapEvent {
    pub number_of_fingers: usize,
    pub number_of_taps: u32,
    /// Centroid of the fingers when the first tap of the group began.
    pub position: Vec2,
}

impl From<TapEvent> for GestureData {
    fn from(event: TapEvent) -> Self {
        Self::Tap(event)
    }
}

#[derive(Debug, Clone, Copy)]
struct Press {
    pressed_at: Duration,
    position: Vec2,
}

#[derive(Debug, Clone, Copy)]
struct TapGroup {
    taps: u32,
    position: Vec2,
    last_tap_at: Duration,
}

/// Groups quick presses of the required finger count.
///
/// A press fails when it lasts too long, drifts too far or gains an extra
/// finger; after a press ends, a new one can only begin once every finger
/// is up. A group is reported when it reaches the maximum tap count or when
/// no new press starts in time.
#[derive(Debug)]
pub(super) struct TapRecognizer {
    pub(super) config: TapConfig,
    tracker: FingerTracker,
    clock: GestureClock,
    press: Option<Press>,
    blocked: bool,
    group: Option<TapGroup>,
}

impl TapRecognizer {
    pub(super) fn new(config: TapConfig) -> Self {
        Self {
            config,
            tracker: FingerTracker::default(),
            clock: GestureClock::default(),
            press: None,
            blocked: false,
            group: None,
        }
    }

    pub(super) fn update(&mut self, dt: Duration, samples: &[TouchSample], frame: &mut Frame<'_>) {
        self.clock.tick(dt);
        tracker::feed(self, samples, frame);

        let now = self.clock.now();
        if let Some(press) = self.press {
            if now - press.pressed_at > self.config.max_press_time {
                self.fail_press();
            }
        }
        if self.press.is_none() && self.group_expired(now) {
            self.report(frame);
        }
    }

    fn group_expired(&self, now: Duration) -> bool {
        self.group
            .is_some_and(|group| now - group.last_tap_at > self.config.max_time_between_taps)
    }

    fn fail_press(&mut self) {
        self.press = None;
        self.blocked = true;
    }

    fn record_tap(&mut self, press: Press, frame: &mut Frame<'_>) {
        let now = self.clock.now();
        let ratio = frame.ratio();
        let max_distance = self.config.max_distance;
        let joins_group = self.group.is_some_and(|group| {
            ratio.to_isotropic(press.position - group.position).length() <= max_distance
        });

        if joins_group {
            if let Some(group) = &mut self.group {
                group.taps += 1;
                group.last_tap_at = now;
            }
        } else {
            self.report(frame);
            self.clock.begin_at(press.pressed_at);
            self.group = Some(TapGroup {
                taps: 1,
                position: press.position,
                last_tap_at: now,
            });
        }

        if self.group.is_some_and(|group| group.taps >= self.config.max_taps) {
            self.report(frame);
        }
    }

    fn report(&mut self, frame: &mut Frame<'_>) {
        if let Some(group) = self.group.take() {
            let event = TapEvent {
                number_of_fingers: self.config.required_fingers,
                number_of_taps: group.taps,
                position: group.position,
            };
            frame.emit(&mut self.clock, GestureState::Occurred, event);
        }
    }
}

impl FingerHandler for TapRecognizer {
    fn tracker(&mut self) -> &mut FingerTracker {
        &mut self.tracker
    }

    fn on_down(&mut self, frame: &mut Frame<'_>) {
        let count = self.tracker.count();
        let required = self.config.required_fingers;
        if self.blocked {
            return;
        }
        if self.press.is_some() {
            if count > required {
                self.fail_press();
            }
            return;
        }
        if count == required {
            let now = self.clock.now();
            if self.group_expired(now) {
                self.report(frame);
            }
            if self.group.is_none() {
                self.clock.begin();
            }
            self.press = Some(Press {
                pressed_at: now,
                position: self.tracker.begin_centroid(),
            });
        } else if count > required {
            self.blocked = true;
        }
    }

    fn on_moved(&mut self, frame: &mut Frame<'_>) {
        if self.press.is_none() {
            return;
        }
        let ratio = frame.ratio();
        let drifted = self.tracker.fingers().iter().any(|f| {
            ratio.to_isotropic(f.current - f.begin).length() > self.config.max_distance
        });
        if drifted {
            self.fail_press();
        }
    }

    fn on_up(&mut self, _finger: TrackedFinger, canceled: bool, frame: &mut Frame<'_>) {
        if let Some(press) = self.press.take() {
            let held = self.clock.now() - press.pressed_at;
            if !canceled && held <= self.config.max_press_time {
                self.record_tap(press, frame);
            }
            self.blocked = true;
        }
        if self.tracker.count() == 0 {
            self.blocked = false;
        }
    }
}
