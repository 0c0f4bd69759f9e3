//! A source driven by feed handles pushed from any thread.

use std::sync::Arc;
use std::time::Duration;

use crossbeam::channel::{self, Receiver, Sender};
use glam::Vec2;
use kinesis_core::{DeviceId, Error};
use parking_lot::Mutex;
use winit::keyboard::KeyCode;

use crate::device::controller::{GameController, GameControllerState};
use crate::device::gamepad::{GamePad, GamePadBackend, GamePadIndexPolicy, GamePadState};
use crate::device::keyboard::{Keyboard, KeyboardInput};
use crate::device::mouse::{Mouse, MouseButton, MouseInput};
use crate::device::pointer::{PointerSample, TouchInput, TouchSurface};
use crate::device::sensor::{Sensor, SensorKind, SensorValue};
use crate::device::{DeviceInfo, InputDevice};
use crate::event::PointerEventType;
use crate::queue::RawQueue;
use crate::source::{DeviceChanges, InputSource};

enum Request {
    Add(Box<dyn InputDevice>),
    Remove(DeviceId),
}

/// Cloneable, `Send` handle used to plug devices into a [`QueueSource`].
///
/// Every `add_*` call queues the new device and returns the feed that
/// platform callbacks push raw samples into. The device becomes visible to
/// the manager on the next frame.
#[derive(Clone)]
pub struct SourceHandle {
    requests: Sender<Request>,
}

impl std::fmt::Debug for SourceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceHandle")
            .field("pending", &self.requests.len())
            .finish()
    }
}

impl SourceHandle {
    /// Queue an arbitrary device for registration.
    pub fn add_device(&self, device: Box<dyn InputDevice>) {
        // The receiver lives as long as the source; once it is gone nobody
        // could observe the device anyway.
        let _ = self.requests.send(Request::Add(device));
    }

    /// Queue a device for removal.
    pub fn remove_device(&self, id: DeviceId) {
        let _ = self.requests.send(Request::Remove(id));
    }

    pub fn add_keyboard(&self, info: DeviceInfo) -> KeyboardFeed {
        let queue = RawQueue::new();
        let feed = KeyboardFeed {
            device: info.id,
            queue: queue.clone(),
        };
        self.add_device(Box::new(Keyboard::new(info, queue)));
        feed
    }

    pub fn add_mouse(&self, info: DeviceInfo, surface_size: Vec2) -> MouseFeed {
        let queue = RawQueue::new();
        let feed = MouseFeed {
            device: info.id,
            queue: queue.clone(),
        };
        self.add_device(Box::new(Mouse::new(info, surface_size, queue)));
        feed
    }

    pub fn add_touch_surface(&self, info: DeviceInfo, surface_size: Vec2) -> TouchFeed {
        let queue = RawQueue::new();
        let feed = TouchFeed {
            device: info.id,
            queue: queue.clone(),
        };
        self.add_device(Box::new(TouchSurface::new(info, surface_size, queue)));
        feed
    }

    pub fn add_controller(&self, info: DeviceInfo) -> ControllerFeed {
        let queue = RawQueue::new();
        let feed = ControllerFeed {
            device: info.id,
            queue: queue.clone(),
        };
        self.add_device(Box::new(GameController::new(info, queue)));
        feed
    }

    pub fn add_gamepad(&self, info: DeviceInfo, policy: GamePadIndexPolicy) -> GamePadFeed {
        let feed = GamePadFeed {
            device: info.id,
            shared: Arc::new(Mutex::new(SharedPad::default())),
        };
        let backend = SharedPadBackend(Arc::clone(&feed.shared));
        self.add_device(Box::new(GamePad::new(info, policy, backend)));
        feed
    }

    pub fn add_sensor(&self, info: DeviceInfo, kind: SensorKind) -> SensorFeed {
        let queue = RawQueue::new();
        let feed = SensorFeed {
            device: info.id,
            queue: queue.clone(),
        };
        self.add_device(Box::new(Sensor::new(info, kind, queue)));
        feed
    }
}

/// Source whose devices are fed through [`SourceHandle`] feeds.
pub struct QueueSource {
    name: String,
    handle: SourceHandle,
    requests: Receiver<Request>,
}

impl std::fmt::Debug for QueueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueSource")
            .field("name", &self.name)
            .field("pending", &self.requests.len())
            .finish()
    }
}

impl QueueSource {
    /// Create a source with no devices.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let (tx, rx) = channel::unbounded();
        Self {
            name: name.into(),
            handle: SourceHandle { requests: tx },
            requests: rx,
        }
    }

    /// Handle for adding and removing devices, cloneable across threads.
    #[must_use]
    pub const fn handle(&self) -> &SourceHandle {
        &self.handle
    }
}

impl InputSource for QueueSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn update(&mut self, changes: &mut DeviceChanges) {
        for request in self.requests.try_iter() {
            match request {
                Request::Add(device) => changes.added.push(device),
                Request::Remove(id) => changes.removed.push(id),
            }
        }
    }
}

/// Raw keyboard samples.
#[derive(Debug, Clone)]
pub struct KeyboardFeed {
    device: DeviceId,
    queue: RawQueue<KeyboardInput>,
}

impl KeyboardFeed {
    #[must_use]
    pub const fn device(&self) -> DeviceId {
        self.device
    }

    /// A key went down, auto-repeated or came up.
    pub fn key(&self, key: KeyCode, pressed: bool) {
        self.queue.push(KeyboardInput::Key { key, pressed });
    }

    /// Committed text.
    pub fn text(&self, text: impl Into<String>) {
        self.queue.push(KeyboardInput::Text(text.into()));
    }

    /// IME composition update.
    pub fn composition(&self, text: impl Into<String>, start: usize, length: usize) {
        self.queue.push(KeyboardInput::Composition {
            text: text.into(),
            start,
            length,
        });
    }
}

/// Raw mouse samples.
#[derive(Debug, Clone)]
pub struct MouseFeed {
    device: DeviceId,
    queue: RawQueue<MouseInput>,
}

impl MouseFeed {
    #[must_use]
    pub const fn device(&self) -> DeviceId {
        self.device
    }

    #[cfg(test)]
    pub(crate) const fn queue(&self) -> &RawQueue<MouseInput> {
        &self.queue
    }

    /// Cursor moved to a normalized position.
    pub fn moved(&self, position: Vec2, timestamp: Duration) {
        self.queue.push(MouseInput::Moved {
            position,
            timestamp,
        });
    }

    pub fn button(&self, button: MouseButton, pressed: bool, timestamp: Duration) {
        self.queue.push(MouseInput::Button {
            button,
            pressed,
            timestamp,
        });
    }

    /// Wheel turned by `delta` notches.
    pub fn wheel(&self, delta: f32) {
        self.queue.push(MouseInput::Wheel { delta });
    }

    pub fn resize(&self, size: Vec2) {
        self.queue.push(MouseInput::SurfaceResized(size));
    }
}

/// Raw touch samples.
#[derive(Debug, Clone)]
pub struct TouchFeed {
    device: DeviceId,
    queue: RawQueue<TouchInput>,
}

impl TouchFeed {
    #[must_use]
    pub const fn device(&self) -> DeviceId {
        self.device
    }

    /// Push one contact sample at a normalized position.
    pub fn sample(&self, id: u32, position: Vec2, event_type: PointerEventType, timestamp: Duration) {
        self.queue.push(TouchInput::Sample(PointerSample {
            id,
            position,
            event_type,
            timestamp,
        }));
    }

    pub fn down(&self, id: u32, position: Vec2, timestamp: Duration) {
        self.sample(id, position, PointerEventType::Pressed, timestamp);
    }

    pub fn moved(&self, id: u32, position: Vec2, timestamp: Duration) {
        self.sample(id, position, PointerEventType::Moved, timestamp);
    }

    pub fn up(&self, id: u32, position: Vec2, timestamp: Duration) {
        self.sample(id, position, PointerEventType::Released, timestamp);
    }

    pub fn cancel(&self, id: u32, position: Vec2, timestamp: Duration) {
        self.sample(id, position, PointerEventType::Canceled, timestamp);
    }

    pub fn resize(&self, size: Vec2) {
        self.queue.push(TouchInput::SurfaceResized(size));
    }
}

/// Generic controller snapshots.
#[derive(Debug, Clone)]
pub struct ControllerFeed {
    device: DeviceId,
    queue: RawQueue<GameControllerState>,
}

impl ControllerFeed {
    #[must_use]
    pub const fn device(&self) -> DeviceId {
        self.device
    }

    pub fn push(&self, state: GameControllerState) {
        self.queue.push(state);
    }
}

#[derive(Debug, Default)]
struct SharedPad {
    state: GamePadState,
    fault: Option<String>,
}

#[derive(Debug)]
struct SharedPadBackend(Arc<Mutex<SharedPad>>);

impl GamePadBackend for SharedPadBackend {
    fn poll(&mut self) -> kinesis_core::Result<GamePadState> {
        let pad = self.0.lock();
        match &pad.fault {
            Some(reason) => Err(Error::DeviceUnreachable(reason.clone())),
            None => Ok(pad.state),
        }
    }
}

/// Latest gamepad state, read by the device when it polls.
#[derive(Debug, Clone)]
pub struct GamePadFeed {
    device: DeviceId,
    shared: Arc<Mutex<SharedPad>>,
}

impl GamePadFeed {
    #[must_use]
    pub const fn device(&self) -> DeviceId {
        self.device
    }

    /// Replace the whole state.
    pub fn set_state(&self, state: GamePadState) {
        self.shared.lock().state = state;
    }

    /// Edit the state in place.
    pub fn modify(&self, edit: impl FnOnce(&mut GamePadState)) {
        edit(&mut self.shared.lock().state);
    }

    /// Make the next poll fail, as if the pad was unplugged mid-frame.
    pub fn fail(&self, reason: impl Into<String>) {
        self.shared.lock().fault = Some(reason.into());
    }
}

/// Sensor readings.
#[derive(Debug, Clone)]
pub struct SensorFeed {
    device: DeviceId,
    queue: RawQueue<SensorValue>,
}

impl SensorFeed {
    #[must_use]
    pub const fn device(&self) -> DeviceId {
        self.device
    }

    pub fn push(&self, value: SensorValue) {
        self.queue.push(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn requests_from_other_threads_arrive_in_order() {
        let mut source = QueueSource::new("test");
        let handle = source.handle().clone();
        let feed = thread::spawn(move || {
            handle.add_touch_surface(DeviceInfo::new(DeviceId::from_name("touch"), "Touch"), Vec2::ONE)
        })
        .join()
        .unwrap();
        source.handle().remove_device(feed.device());

        let mut changes = DeviceChanges::default();
        source.update(&mut changes);
        assert_eq!(changes.added.len(), 1);
        assert_eq!(changes.added[0].id(), feed.device());
        assert_eq!(changes.removed, vec![feed.device()]);

        let mut changes = DeviceChanges::default();
        source.update(&mut changes);
        assert!(changes.is_empty());
    }

    #[test]
    fn gamepad_feed_fault_fails_poll() {
        let feed = GamePadFeed {
            device: DeviceId::from_name("pad"),
            shared: Arc::new(Mutex::new(SharedPad::default())),
        };
        let mut backend = SharedPadBackend(Arc::clone(&feed.shared));
        feed.modify(|s| s.left_trigger = 1.0);
        assert_eq!(backend.poll().map(|s| s.left_trigger), Ok(1.0));

        feed.fail("cable pulled");
        assert_eq!(
            backend.poll(),
            Err(Error::DeviceUnreachable("cable pulled".into()))
        );
    }
}
