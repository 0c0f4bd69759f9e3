//! Finger bookkeeping shared by every recognizer.

use glam::Vec2;
use kinesis_core::DeviceId;

use crate::event::PointerEventType;
use crate::gesture::Frame;

/// A finger is one pointer of one device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FingerId {
    pub device: DeviceId,
    pub pointer: u32,
}

/// A pointer event reduced to what recognizers need.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchSample {
    pub finger: FingerId,
    /// Normalized position.
    pub position: Vec2,
    pub event_type: PointerEventType,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackedFinger {
    pub id: FingerId,
    pub begin: Vec2,
    pub current: Vec2,
}

/// Fingers currently down, in the order they touched.
///
/// Moves are buffered and only applied on [`flush`](Self::flush), so a
/// frame with many moves of one finger yields a single position update.
#[derive(Debug, Default)]
pub struct FingerTracker {
    fingers: Vec<TrackedFinger>,
    pending: Vec<(FingerId, Vec2)>,
}

impl FingerTracker {
    #[must_use]
    pub fn fingers(&self) -> &[TrackedFinger] {
        &self.fingers
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.fingers.len()
    }

    /// Mean current position, or zero with no fingers down.
    #[must_use]
    pub fn centroid(&self) -> Vec2 {
        mean(self.fingers.iter().map(|f| f.current))
    }

    /// Mean begin position, or zero with no fingers down.
    #[must_use]
    pub fn begin_centroid(&self) -> Vec2 {
        mean(self.fingers.iter().map(|f| f.begin))
    }

    /// Start tracking a finger. Returns `false` if it is already down.
    pub fn press(&mut self, id: FingerId, position: Vec2) -> bool {
        if self.fingers.iter().any(|f| f.id == id) {
            return false;
        }
        self.fingers.push(TrackedFinger {
            id,
            begin: position,
            current: position,
        });
        true
    }

    /// Buffer a move. Untracked fingers are ignored.
    pub fn buffer_move(&mut self, id: FingerId, position: Vec2) {
        if !self.fingers.iter().any(|f| f.id == id) {
            return;
        }
        match self.pending.iter_mut().find(|(pending, _)| *pending == id) {
            Some((_, latest)) => *latest = position,
            None => self.pending.push((id, position)),
        }
    }

    /// Apply buffered moves. Returns `true` if any finger changed position.
    pub fn flush(&mut self) -> bool {
        let mut moved = false;
        for (id, position) in self.pending.drain(..) {
            if let Some(finger) = self.fingers.iter_mut().find(|f| f.id == id) {
                if finger.current != position {
                    finger.current = position;
                    moved = true;
                }
            }
        }
        moved
    }

    /// Stop tracking a finger.
    pub fn release(&mut self, id: FingerId) -> Option<TrackedFinger> {
        self.pending.retain(|(pending, _)| *pending != id);
        let index = self.fingers.iter().position(|f| f.id == id)?;
        Some(self.fingers.remove(index))
    }
}

fn mean(points: impl ExactSizeIterator<Item = Vec2>) -> Vec2 {
    let count = points.len();
    if count == 0 {
        return Vec2::ZERO;
    }
    points.sum::<Vec2>() / count as f32
}

/// Per-recognizer reactions to finger changes.
pub(super) trait FingerHandler {
    fn tracker(&mut self) -> &mut FingerTracker;

    /// A finger was added; the tracker already contains it.
    fn on_down(&mut self, frame: &mut Frame<'_>);

    /// Buffered moves were applied.
    fn on_moved(&mut self, frame: &mut Frame<'_>);

    /// A finger was removed; the tracker no longer contains it.
    fn on_up(&mut self, finger: TrackedFinger, canceled: bool, frame: &mut Frame<'_>);
}

/// Run one frame of samples through `handler`.
///
/// Moves are applied before any press or release so that every handler
/// callback sees positions in sample order. A release also counts its own
/// position as a final move.
pub(super) fn feed<H: FingerHandler>(handler: &mut H, samples: &[TouchSample], frame: &mut Frame<'_>) {
    for sample in samples {
        match sample.event_type {
            PointerEventType::Moved => handler.tracker().buffer_move(sample.finger, sample.position),
            PointerEventType::Pressed => {
                flush(handler, frame);
                if handler.tracker().press(sample.finger, sample.position) {
                    handler.on_down(frame);
                }
            }
            PointerEventType::Released | PointerEventType::Canceled => {
                let canceled = sample.event_type == PointerEventType::Canceled;
                if !canceled {
                    handler.tracker().buffer_move(sample.finger, sample.position);
                }
                flush(handler, frame);
                if let Some(finger) = handler.tracker().release(sample.finger) {
                    handler.on_up(finger, canceled, frame);
                }
            }
        }
    }
    flush(handler, frame);
}

fn flush<H: FingerHandler>(handler: &mut H, frame: &mut Frame<'_>) {
    if handler.tracker().flush() {
        handler.on_moved(frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finger(pointer: u32) -> FingerId {
        FingerId {
            device: DeviceId::from_name("touch"),
            pointer,
        }
    }

    #[test]
    fn moves_are_coalesced_until_flush() {
        let mut tracker = FingerTracker::default();
        assert!(tracker.press(finger(0), Vec2::ZERO));
        tracker.buffer_move(finger(0), Vec2::new(0.1, 0.0));
        tracker.buffer_move(finger(0), Vec2::new(0.2, 0.0));
        assert_eq!(tracker.fingers()[0].current, Vec2::ZERO);

        assert!(tracker.flush());
        assert_eq!(tracker.fingers()[0].current, Vec2::new(0.2, 0.0));
        assert_eq!(tracker.fingers()[0].begin, Vec2::ZERO);
        assert!(!tracker.flush());
    }

    #[test]
    fn untracked_and_duplicate_fingers_are_ignored() {
        let mut tracker = FingerTracker::default();
        tracker.buffer_move(finger(3), Vec2::ONE);
        assert!(!tracker.flush());

        assert!(tracker.press(finger(0), Vec2::ZERO));
        assert!(!tracker.press(finger(0), Vec2::ONE));
        assert_eq!(tracker.count(), 1);
        assert!(tracker.release(finger(1)).is_none());
    }

    #[test]
    fn centroids() {
        let mut tracker = FingerTracker::default();
        assert_eq!(tracker.centroid(), Vec2::ZERO);
        tracker.press(finger(0), Vec2::new(0.25, 0.25));
        tracker.press(finger(1), Vec2::new(0.5, 0.75));
        tracker.buffer_move(finger(1), Vec2::new(0.75, 0.75));
        tracker.flush();
        assert_eq!(tracker.begin_centroid(), Vec2::new(0.375, 0.5));
        assert_eq!(tracker.centroid(), Vec2::new(0.5, 0.5));
    }

    #[test]
    fn release_drops_pending_move() {
        let mut tracker = FingerTracker::default();
        tracker.press(finger(0), Vec2::ZERO);
        tracker.buffer_move(finger(0), Vec2::ONE);
        let released = tracker.release(finger(0));
        assert_eq!(released.map(|f| f.current), Some(Vec2::ZERO));
        assert!(!tracker.flush());
    }
}
