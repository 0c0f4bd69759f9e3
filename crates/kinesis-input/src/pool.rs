//! Generation-indexed event pools.
//!
//! Each event kind owns an [`EventPool`], a slab of reusable instances. Acquiring
//! returns a typed [`EventHandle`] carrying the slot index and its generation;
//! releasing bumps the generation, so handles kept past release resolve to
//! `None` instead of aliasing the next event that reuses the slot.

use std::fmt;
use std::marker::PhantomData;
use std::time::Duration;

use glam::Vec2;
use kinesis_core::DeviceId;
use winit::keyboard::KeyCode;

use crate::button_state::ButtonTransition;
use crate::device::gamepad::{GamePadAxis, GamePadButton};
use crate::device::mouse::MouseButton;
use crate::event::{
    EventKind, GameControllerAxisEvent, GameControllerButtonEvent, GamePadAxisEvent,
    GamePadButtonEvent, InputEvent, KeyEvent, MouseButtonEvent, MouseWheelEvent, PointerEvent,
    PointerEventType, PovControllerEvent, TextInputEvent, TextInputEventType,
};

/// An event type that can live in an [`EventStore`].
pub trait PooledEvent: Sized + 'static {
    /// Kind tag used for routing.
    const KIND: EventKind;

    /// Construct a blank instance for a fresh pool slot.
    fn blank(device: DeviceId) -> Self;

    /// Stamp a recycled instance with its new originating device.
    fn stamp(&mut self, device: DeviceId);

    /// The pool holding this kind.
    fn pool(store: &EventStore) -> &EventPool<Self>;

    /// The pool holding this kind, mutably.
    fn pool_mut(store: &mut EventStore) -> &mut EventPool<Self>;

    /// Wrap a typed handle into a kind-tagged reference.
    fn into_ref(handle: EventHandle<Self>) -> EventRef;
}

/// Typed reference to a pooled event.
pub struct EventHandle<T> {
    index: u32,
    generation: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> EventHandle<T> {
    const fn new(index: u32, generation: u32) -> Self {
        Self {
            index,
            generation,
            _marker: PhantomData,
        }
    }

    /// Slot index inside the pool.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Generation of the slot when this handle was issued.
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl<T> Clone for EventHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for EventHandle<T> {}

impl<T> PartialEq for EventHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}

impl<T> Eq for EventHandle<T> {}

impl<T> fmt::Debug for EventHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventHandle({}v{})", self.index, self.generation)
    }
}

#[derive(Debug)]
struct Slot<T> {
    value: T,
    generation: u32,
    live: bool,
}

/// Slab of reusable instances of one event kind.
#[derive(Debug)]
pub struct EventPool<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    active: usize,
}

impl<T> Default for EventPool<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            active: 0,
        }
    }
}

impl<T: PooledEvent> EventPool<T> {
    /// Create an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a recycled instance, or construct one if none is free.
    ///
    /// Recycled instances keep the payload of their previous use; callers
    /// populate every field before dispatch.
    #[allow(clippy::cast_possible_truncation)]
    pub fn acquire(&mut self, device: DeviceId) -> EventHandle<T> {
        self.active += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.live = true;
            slot.value.stamp(device);
            return EventHandle::new(index, slot.generation);
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            value: T::blank(device),
            generation: 0,
            live: true,
        });
        EventHandle::new(index, 0)
    }

    /// Return an instance to the pool.
    ///
    /// Returns `false` if the handle is stale (already released).
    pub fn release(&mut self, handle: EventHandle<T>) -> bool {
        let Some(slot) = self.slots.get_mut(handle.index as usize) else {
            return false;
        };
        if !slot.live || slot.generation != handle.generation {
            return false;
        }
        slot.live = false;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.active -= 1;
        true
    }

    /// Resolve a handle. Stale handles resolve to `None`.
    #[must_use]
    pub fn get(&self, handle: EventHandle<T>) -> Option<&T> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.live && slot.generation == handle.generation)
            .map(|slot| &slot.value)
    }

    /// Resolve a handle mutably. Stale handles resolve to `None`.
    pub fn get_mut(&mut self, handle: EventHandle<T>) -> Option<&mut T> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.live && slot.generation == handle.generation)
            .map(|slot| &mut slot.value)
    }

    /// Number of acquired-not-released instances.
    ///
    /// Growth of this count across frames means a caller forgot to release.
    #[must_use]
    pub const fn active_count(&self) -> usize {
        self.active
    }

    /// Number of instances ever constructed by this pool.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

/// Kind-tagged handle to a pooled event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventRef {
    Key(EventHandle<KeyEvent>),
    Pointer(EventHandle<PointerEvent>),
    MouseButton(EventHandle<MouseButtonEvent>),
    MouseWheel(EventHandle<MouseWheelEvent>),
    GameControllerButton(EventHandle<GameControllerButtonEvent>),
    GameControllerAxis(EventHandle<GameControllerAxisEvent>),
    PovController(EventHandle<PovControllerEvent>),
    GamePadButton(EventHandle<GamePadButtonEvent>),
    GamePadAxis(EventHandle<GamePadAxisEvent>),
    TextInput(EventHandle<TextInputEvent>),
}

impl EventRef {
    /// Kind tag of the referenced event.
    #[must_use]
    pub const fn kind(self) -> EventKind {
        match self {
            Self::Key(_) => EventKind::Key,
            Self::Pointer(_) => EventKind::Pointer,
            Self::MouseButton(_) => EventKind::MouseButton,
            Self::MouseWheel(_) => EventKind::MouseWheel,
            Self::GameControllerButton(_) => EventKind::GameControllerButton,
            Self::GameControllerAxis(_) => EventKind::GameControllerAxis,
            Self::PovController(_) => EventKind::PovController,
            Self::GamePadButton(_) => EventKind::GamePadButton,
            Self::GamePadAxis(_) => EventKind::GamePadAxis,
            Self::TextInput(_) => EventKind::TextInput,
        }
    }
}

/// One pool per event kind.
#[derive(Debug, Default)]
pub struct EventStore {
    keys: EventPool<KeyEvent>,
    pointers: EventPool<PointerEvent>,
    mouse_buttons: EventPool<MouseButtonEvent>,
    mouse_wheels: EventPool<MouseWheelEvent>,
    controller_buttons: EventPool<GameControllerButtonEvent>,
    controller_axes: EventPool<GameControllerAxisEvent>,
    povs: EventPool<PovControllerEvent>,
    gamepad_buttons: EventPool<GamePadButtonEvent>,
    gamepad_axes: EventPool<GamePadAxisEvent>,
    text: EventPool<TextInputEvent>,
}

impl EventStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire an instance of kind `T` stamped with `device`.
    pub fn acquire<T: PooledEvent>(&mut self, device: DeviceId) -> EventHandle<T> {
        T::pool_mut(self).acquire(device)
    }

    /// Resolve a typed handle.
    #[must_use]
    pub fn get<T: PooledEvent>(&self, handle: EventHandle<T>) -> Option<&T> {
        T::pool(self).get(handle)
    }

    /// Resolve a typed handle mutably.
    pub fn get_mut<T: PooledEvent>(&mut self, handle: EventHandle<T>) -> Option<&mut T> {
        T::pool_mut(self).get_mut(handle)
    }

    /// Resolve a tagged reference into a borrowed event view.
    #[must_use]
    pub fn resolve(&self, event: EventRef) -> Option<InputEvent<'_>> {
        Some(match event {
            EventRef::Key(h) => InputEvent::Key(self.keys.get(h)?),
            EventRef::Pointer(h) => InputEvent::Pointer(self.pointers.get(h)?),
            EventRef::MouseButton(h) => InputEvent::MouseButton(self.mouse_buttons.get(h)?),
            EventRef::MouseWheel(h) => InputEvent::MouseWheel(self.mouse_wheels.get(h)?),
            EventRef::GameControllerButton(h) => {
                InputEvent::GameControllerButton(self.controller_buttons.get(h)?)
            }
            EventRef::GameControllerAxis(h) => {
                InputEvent::GameControllerAxis(self.controller_axes.get(h)?)
            }
            EventRef::PovController(h) => InputEvent::PovController(self.povs.get(h)?),
            EventRef::GamePadButton(h) => InputEvent::GamePadButton(self.gamepad_buttons.get(h)?),
            EventRef::GamePadAxis(h) => InputEvent::GamePadAxis(self.gamepad_axes.get(h)?),
            EventRef::TextInput(h) => InputEvent::TextInput(self.text.get(h)?),
        })
    }

    /// Return an event to its pool. Returns `false` for stale references.
    pub fn release(&mut self, event: EventRef) -> bool {
        match event {
            EventRef::Key(h) => self.keys.release(h),
            EventRef::Pointer(h) => self.pointers.release(h),
            EventRef::MouseButton(h) => self.mouse_buttons.release(h),
            EventRef::MouseWheel(h) => self.mouse_wheels.release(h),
            EventRef::GameControllerButton(h) => self.controller_buttons.release(h),
            EventRef::GameControllerAxis(h) => self.controller_axes.release(h),
            EventRef::PovController(h) => self.povs.release(h),
            EventRef::GamePadButton(h) => self.gamepad_buttons.release(h),
            EventRef::GamePadAxis(h) => self.gamepad_axes.release(h),
            EventRef::TextInput(h) => self.text.release(h),
        }
    }

    /// Live instance count for one kind.
    #[must_use]
    pub const fn active_count(&self, kind: EventKind) -> usize {
        match kind {
            EventKind::Key => self.keys.active_count(),
            EventKind::Pointer => self.pointers.active_count(),
            EventKind::MouseButton => self.mouse_buttons.active_count(),
            EventKind::MouseWheel => self.mouse_wheels.active_count(),
            EventKind::GameControllerButton => self.controller_buttons.active_count(),
            EventKind::GameControllerAxis => self.controller_axes.active_count(),
            EventKind::PovController => self.povs.active_count(),
            EventKind::GamePadButton => self.gamepad_buttons.active_count(),
            EventKind::GamePadAxis => self.gamepad_axes.active_count(),
            EventKind::TextInput => self.text.active_count(),
        }
    }

    /// Live instance count over every kind.
    #[must_use]
    pub fn total_active(&self) -> usize {
        EventKind::ALL.iter().map(|&kind| self.active_count(kind)).sum()
    }

    /// Instances constructed over every kind.
    #[must_use]
    pub fn total_capacity(&self) -> usize {
        self.keys.capacity()
            + self.pointers.capacity()
            + self.mouse_buttons.capacity()
            + self.mouse_wheels.capacity()
            + self.controller_buttons.capacity()
            + self.controller_axes.capacity()
            + self.povs.capacity()
            + self.gamepad_buttons.capacity()
            + self.gamepad_axes.capacity()
            + self.text.capacity()
    }
}

/// Write side of a frame's event list, handed to devices during update.
pub struct EventSink<'a> {
    store: &'a mut EventStore,
    frame: &'a mut Vec<EventRef>,
}

impl<'a> EventSink<'a> {
    /// Create a sink appending to `frame`.
    pub fn new(store: &'a mut EventStore, frame: &'a mut Vec<EventRef>) -> Self {
        Self { store, frame }
    }

    /// Acquire an event of kind `T`, populate it and append it to the frame.
    pub fn emit<T: PooledEvent>(&mut self, device: DeviceId, fill: impl FnOnce(&mut T)) {
        let handle = self.store.acquire::<T>(device);
        if let Some(event) = self.store.get_mut(handle) {
            fill(event);
        }
        self.frame.push(T::into_ref(handle));
    }

    /// Number of events appended so far this frame.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frame.len()
    }

    /// Returns `true` if nothing was appended yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frame.is_empty()
    }
}

macro_rules! pooled_event {
    ($ty:ty, $kind:ident, $field:ident, |$device:ident| $blank:expr) => {
        impl PooledEvent for $ty {
            const KIND: EventKind = EventKind::$kind;

            fn blank($device: DeviceId) -> Self {
                $blank
            }

            fn stamp(&mut self, device: DeviceId) {
                self.device = device;
            }

            fn pool(store: &EventStore) -> &EventPool<Self> {
                &store.$field
            }

            fn pool_mut(store: &mut EventStore) -> &mut EventPool<Self> {
                &mut store.$field
            }

            fn into_ref(handle: EventHandle<Self>) -> EventRef {
                EventRef::$kind(handle)
            }
        }
    };
}

pooled_event!(KeyEvent, Key, keys, |device| KeyEvent {
    device,
    key: KeyCode::Escape,
    state: ButtonTransition::Up,
    repeat_count: 0,
});

pooled_event!(PointerEvent, Pointer, pointers, |device| PointerEvent {
    device,
    pointer_id: 0,
    position: Vec2::ZERO,
    delta_position: Vec2::ZERO,
    delta_time: Duration::ZERO,
    event_type: PointerEventType::Moved,
    is_down: false,
    surface_size: Vec2::ONE,
});

pooled_event!(MouseButtonEvent, MouseButton, mouse_buttons, |device| {
    MouseButtonEvent {
        device,
        button: MouseButton::Left,
        state: ButtonTransition::Up,
    }
});

pooled_event!(MouseWheelEvent, MouseWheel, mouse_wheels, |device| {
    MouseWheelEvent {
        device,
        wheel_delta: 0.0,
    }
});

pooled_event!(
    GameControllerButtonEvent,
    GameControllerButton,
    controller_buttons,
    |device| GameControllerButtonEvent {
        device,
        index: 0,
        state: ButtonTransition::Up,
    }
);

pooled_event!(
    GameControllerAxisEvent,
    GameControllerAxis,
    controller_axes,
    |device| GameControllerAxisEvent {
        device,
        index: 0,
        value: 0.0,
    }
);

pooled_event!(PovControllerEvent, PovController, povs, |device| {
    PovControllerEvent {
        device,
        index: 0,
        value: 0.0,
        enabled: false,
    }
});

pooled_event!(GamePadButtonEvent, GamePadButton, gamepad_buttons, |device| {
    GamePadButtonEvent {
        device,
        button: GamePadButton::empty(),
        state: ButtonTransition::Up,
    }
});

pooled_event!(GamePadAxisEvent, GamePadAxis, gamepad_axes, |device| {
    GamePadAxisEvent {
        device,
        axis: GamePadAxis::LeftThumbX,
        value: 0.0,
    }
});

pooled_event!(TextInputEvent, TextInput, text, |device| TextInputEvent {
    device,
    text: String::new(),
    event_type: TextInputEventType::Input,
    composition_start: 0,
    composition_length: 0,
});

#[cfg(test)]
mod tests {
    use super::*;

    fn device() -> DeviceId {
        DeviceId::from_name("pool-test")
    }

    #[test]
    fn acquire_reuses_released_slots() {
        let mut pool = EventPool::<MouseWheelEvent>::new();
        let a = pool.acquire(device());
        assert!(pool.release(a));

        let b = pool.acquire(device());
        assert_eq!(b.index(), a.index());
        assert_ne!(b.generation(), a.generation());
        assert_eq!(pool.capacity(), 1);
    }

    #[test]
    fn stale_handles_do_not_resolve() {
        let mut pool = EventPool::<MouseWheelEvent>::new();
        let handle = pool.acquire(device());
        pool.release(handle);

        assert!(pool.get(handle).is_none());
        assert!(!pool.release(handle), "double release must be rejected");
        assert_eq!(pool.active_count(), 0);

        let reused = pool.acquire(device());
        assert!(pool.get(handle).is_none());
        assert!(pool.get(reused).is_some());
    }

    #[test]
    fn acquire_stamps_device() {
        let mut store = EventStore::new();
        let first = DeviceId::from_name("first");
        let second = DeviceId::from_name("second");

        let handle = store.acquire::<KeyEvent>(first);
        assert_eq!(store.get(handle).map(|e| e.device), Some(first));
        store.release(KeyEvent::into_ref(handle));

        let handle = store.acquire::<KeyEvent>(second);
        assert_eq!(store.get(handle).map(|e| e.device), Some(second));
    }

    #[test]
    fn sink_appends_to_frame() {
        let mut store = EventStore::new();
        let mut frame = Vec::new();
        {
            let mut sink = EventSink::new(&mut store, &mut frame);
            sink.emit::<MouseWheelEvent>(device(), |e| e.wheel_delta = 2.0);
            sink.emit::<TextInputEvent>(device(), |e| {
                e.text.clear();
                e.text.push_str("hi");
            });
            assert_eq!(sink.len(), 2);
        }

        assert_eq!(frame[0].kind(), EventKind::MouseWheel);
        match store.resolve(frame[1]) {
            Some(InputEvent::TextInput(text)) => assert_eq!(text.text, "hi"),
            other => panic!("unexpected event {other:?}"),
        }
        assert_eq!(store.total_active(), 2);

        for event in frame.drain(..) {
            assert!(store.release(event));
        }
        assert_eq!(store.total_active(), 0);
        assert_eq!(store.total_capacity(), 2);
    }
}
