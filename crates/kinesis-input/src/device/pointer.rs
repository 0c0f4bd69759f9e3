//! Pointer state synthesis and touch surfaces.

use std::time::Duration;

use glam::Vec2;
use kinesis_core::DeviceId;

use crate::device::{DeviceCapabilities, DeviceInfo, DeviceStatus, InputDevice, PointerDevice};
use crate::event::{PointerEvent, PointerEventType};
use crate::pool::EventSink;
use crate::queue::RawQueue;

/// One raw contact sample from a platform callback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub id: u32,
    /// Position normalized to `[0, 1]`.
    pub position: Vec2,
    pub event_type: PointerEventType,
    /// Time the platform observed the sample.
    pub timestamp: Duration,
}

/// Tracking record of one finger or mouse pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerPoint {
    pub id: u32,
    /// Last known normalized position.
    pub position: Vec2,
    /// Movement accumulated this frame.
    pub delta: Vec2,
    pub is_down: bool,
    pub device: DeviceId,
    last_timestamp: Duration,
}

/// Turns raw samples into [`PointerEvent`]s and keeps per-pointer state.
///
/// Points are created lazily the first time an id is seen, persist across
/// frames while the contact is active, and are pruned one frame after release.
/// A retained pointer (the mouse cursor) is never pruned.
#[derive(Debug, Clone)]
pub struct PointerState {
    device: DeviceId,
    surface_size: Vec2,
    points: Vec<PointerPoint>,
    retained: Option<u32>,
    pressed: Vec<u32>,
    released: Vec<u32>,
    down: Vec<u32>,
}

impl PointerState {
    /// Create the state for `device` with a surface size in device units.
    #[must_use]
    pub const fn new(device: DeviceId, surface_size: Vec2) -> Self {
        Self {
            device,
            surface_size,
            points: Vec::new(),
            retained: None,
            pressed: Vec::new(),
            released: Vec::new(),
            down: Vec::new(),
        }
    }

    /// Keep `id` tracked for the lifetime of this state, starting idle at
    /// `position`.
    pub fn retain_pointer(&mut self, id: u32, position: Vec2) {
        self.retained = Some(id);
        if self.point(id).is_none() {
            self.points.push(PointerPoint {
                id,
                position,
                delta: Vec2::ZERO,
                is_down: false,
                device: self.device,
                last_timestamp: Duration::ZERO,
            });
        }
    }

    /// Clear per-frame lists, reset deltas and drop pointers released last
    /// frame.
    pub fn begin_frame(&mut self) {
        let retained = self.retained;
        let released = &self.released;
        self.points
            .retain(|p| p.is_down || Some(p.id) == retained || !released.contains(&p.id));
        self.pressed.clear();
        self.released.clear();
        for point in &mut self.points {
            point.delta = Vec2::ZERO;
        }
    }

    /// Surface size in device units.
    #[must_use]
    pub const fn surface_size(&self) -> Vec2 {
        self.surface_size
    }

    /// Update the surface size after a resize.
    pub fn set_surface_size(&mut self, size: Vec2) {
        self.surface_size = size;
    }

    /// Tracked pointers.
    #[must_use]
    pub fn points(&self) -> &[PointerPoint] {
        &self.points
    }

    /// Tracked pointer by id.
    #[must_use]
    pub fn point(&self, id: u32) -> Option<&PointerPoint> {
        self.points.iter().find(|p| p.id == id)
    }

    /// Ids that went down this frame.
    #[must_use]
    pub fn pressed(&self) -> &[u32] {
        &self.pressed
    }

    /// Ids that came up this frame.
    #[must_use]
    pub fn released(&self) -> &[u32] {
        &self.released
    }

    /// Ids currently in contact.
    #[must_use]
    pub fn down(&self) -> &[u32] {
        &self.down
    }

    /// Apply a sample and write the resulting event into `out`.
    pub fn apply(&mut self, sample: &PointerSample, out: &mut PointerEvent) {
        let device = self.device;
        let index = match self.points.iter().position(|p| p.id == sample.id) {
            Some(index) => index,
            None => {
                self.points.push(PointerPoint {
                    id: sample.id,
                    position: sample.position,
                    delta: Vec2::ZERO,
                    is_down: false,
                    device,
                    last_timestamp: sample.timestamp,
                });
                self.points.len() - 1
            }
        };

        let point = &mut self.points[index];
        let was_down = point.is_down;
        let delta = if sample.event_type == PointerEventType::Pressed && !was_down {
            Vec2::ZERO
        } else {
            sample.position - point.position
        };
        let delta_time = sample.timestamp.saturating_sub(point.last_timestamp);

        point.position = sample.position;
        point.delta += delta;
        point.last_timestamp = sample.timestamp;

        match sample.event_type {
            PointerEventType::Pressed => {
                point.is_down = true;
                self.pressed.push(sample.id);
                if !self.down.contains(&sample.id) {
                    self.down.push(sample.id);
                }
            }
            PointerEventType::Released | PointerEventType::Canceled => {
                point.is_down = false;
                self.released.push(sample.id);
                self.down.retain(|&id| id != sample.id);
            }
            PointerEventType::Moved => {}
        }
        let is_down = self.points[index].is_down;

        out.pointer_id = sample.id;
        out.position = sample.position;
        out.delta_position = delta;
        out.delta_time = delta_time;
        out.event_type = sample.event_type;
        out.is_down = is_down;
        out.surface_size = self.surface_size;
    }
}

/// Raw input accepted by a [`TouchSurface`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TouchInput {
    Sample(PointerSample),
    SurfaceResized(Vec2),
}

/// Multi-touch surface fed by a raw sample queue.
#[derive(Debug)]
pub struct TouchSurface {
    info: DeviceInfo,
    state: PointerState,
    queue: RawQueue<TouchInput>,
    scratch: Vec<TouchInput>,
}

impl TouchSurface {
    /// Create a touch surface reading from `queue`.
    #[must_use]
    pub fn new(info: DeviceInfo, surface_size: Vec2, queue: RawQueue<TouchInput>) -> Self {
        Self {
            state: PointerState::new(info.id, surface_size),
            info,
            queue,
            scratch: Vec::new(),
        }
    }

    /// Pointer state of this surface.
    #[must_use]
    pub const fn state(&self) -> &PointerState {
        &self.state
    }
}

impl InputDevice for TouchSurface {
    fn info(&self) -> &DeviceInfo {
        &self.info
    }

    fn capabilities(&self) -> DeviceCapabilities {
        DeviceCapabilities::POINTER
    }

    fn update(&mut self, events: &mut EventSink<'_>) -> DeviceStatus {
        self.state.begin_frame();
        self.queue.drain_into(&mut self.scratch);
        for input in &self.scratch {
            match input {
                TouchInput::Sample(sample) => {
                    let state = &mut self.state;
                    events.emit::<PointerEvent>(self.info.id, |e| state.apply(sample, e));
                }
                TouchInput::SurfaceResized(size) => self.state.set_surface_size(*size),
            }
        }
        DeviceStatus::Connected
    }

    fn as_pointer(&self) -> Option<&dyn PointerDevice> {
        Some(self)
    }
}

impl PointerDevice for TouchSurface {
    fn surface_size(&self) -> Vec2 {
        self.state.surface_size()
    }

    fn pointers(&self) -> &[PointerPoint] {
        self.state.points()
    }
}
