//! Main input manager driving the per-frame pipeline.

use std::sync::Arc;
use std::time::Duration;

use glam::Vec2;
use kinesis_core::math::ScreenRatio;
use kinesis_core::{DeviceId, Result};
use parking_lot::{Mutex, MutexGuard};
use tracing::{debug, trace, warn};
use winit::keyboard::KeyCode;

use crate::action::{ActionMap, InputBinding};
use crate::device::{InputDevice, MouseButton};
use crate::event::InputEvent;
use crate::gesture::{GestureConfig, GestureEvent, GestureId, GestureSet};
use crate::pool::{EventRef, EventSink, EventStore};
use crate::registry::{DeviceChange, DeviceRegistry};
use crate::router::{EventRouter, SharedListener};
use crate::source::{DeviceChanges, InputSource};
use crate::state::InputState;

/// Input pipeline configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputConfig {
    /// Surface size used for gesture thresholds while no pointer device is registered.
    pub surface_size: Vec2,
    /// Pooled events still live after the frame release above which a warning is logged.
    pub pool_leak_threshold: usize,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            surface_size: Vec2::new(1280.0, 720.0),
            pool_leak_threshold: 0,
        }
    }
}

impl InputConfig {
    #[must_use]
    pub const fn with_surface_size(mut self, size: Vec2) -> Self {
        self.surface_size = size;
        self
    }

    #[must_use]
    pub const fn with_pool_leak_threshold(mut self, threshold: usize) -> Self {
        self.pool_leak_threshold = threshold;
        self
    }
}

/// Input manager combining devices, event routing, gestures and actions.
///
/// # Usage
///
/// ```ignore
/// let mut input = InputManager::new(InputConfig::default())
///     .with_actions(ActionMap::builder().bind("jump", KeyCode::Space).build());
/// let source = QueueSource::new("platform");
/// let handle = source.handle().clone();
/// input.add_source(source);
///
/// // Platform thread
/// let keyboard = handle.add_keyboard(DeviceInfo::new(DeviceId::from_name("kb"), "Keyboard"));
/// keyboard.key(KeyCode::Space, true);
///
/// // Frame thread, once per tick
/// input.update(dt)?;
/// if input.is_action_just_pressed("jump") {
///     // ...
/// }
/// ```
pub struct InputManager {
    config: InputConfig,
    registry: DeviceRegistry,
    sources: Vec<Box<dyn InputSource>>,
    store: EventStore,
    /// Events emitted during the current frame, in emission order.
    frame: Vec<EventRef>,
    router: Arc<EventRouter>,
    state: Arc<Mutex<InputState>>,
    gestures: Arc<Mutex<GestureSet>>,
    actions: ActionMap,
    /// Devices unregistered directly since the last frame.
    detached: Vec<DeviceId>,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new(InputConfig::default())
    }
}

impl std::fmt::Debug for InputManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sources: Vec<_> = self.sources.iter().map(|s| s.name()).collect();
        f.debug_struct("InputManager")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("sources", &sources)
            .field("frame_events", &self.frame.len())
            .finish_non_exhaustive()
    }
}

impl InputManager {
    /// Create a manager with no devices or sources.
    ///
    /// The global [`InputState`] and the [`GestureSet`] are registered with
    /// the router before any other listener.
    #[must_use]
    pub fn new(config: InputConfig) -> Self {
        let router = Arc::new(EventRouter::new());
        let state = Arc::new(Mutex::new(InputState::new()));
        let gestures = Arc::new(Mutex::new(GestureSet::new()));

        let listener: SharedListener = state.clone();
        router.add_listener(&listener);
        let listener: SharedListener = gestures.clone();
        router.add_listener(&listener);

        Self {
            config,
            registry: DeviceRegistry::new(),
            sources: Vec::new(),
            store: EventStore::new(),
            frame: Vec::new(),
            router,
            state,
            gestures,
            actions: ActionMap::new(),
            detached: Vec::new(),
        }
    }

    /// Replace the action map.
    #[must_use]
    pub fn with_actions(mut self, actions: ActionMap) -> Self {
        self.actions = actions;
        self
    }

    #[must_use]
    pub const fn config(&self) -> &InputConfig {
        &self.config
    }

    /// Advance the pipeline by one frame.
    ///
    /// Order: clear per-frame state, release last frame's events, apply
    /// source hot-plug changes, update devices, reset gesture buffers,
    /// let go of removed devices, dispatch the frame's events, then evaluate
    /// gestures and actions.
    ///
    /// # Errors
    ///
    /// Returns the first hot-plug request that could not be applied (for
    /// example a duplicate device id). The rest of the frame still runs.
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn update(&mut self, dt: Duration) -> Result<()> {
        self.registry.clear_changes();
        self.state.lock().begin_frame();

        for event in self.frame.drain(..) {
            self.store.release(event);
        }
        let live = self.store.total_active();
        if live > self.config.pool_leak_threshold {
            warn!(
                live,
                threshold = self.config.pool_leak_threshold,
                "Pooled events still live after frame release"
            );
        }

        let result = self.apply_source_changes();

        let mut sink = EventSink::new(&mut self.store, &mut self.frame);
        self.registry.update_devices(&mut sink);

        self.gestures.lock().pre_update();
        self.release_removed_devices();

        self.state.lock().set_mouse_devices(self.registry.mouse_ids());
        for &event in &self.frame {
            if let Some(event) = self.store.resolve(event) {
                self.router.dispatch(&event);
            }
        }
        trace!(events = self.frame.len(), "Dispatched frame events");

        let ratio = self.screen_ratio();
        self.gestures.lock().update(dt, ratio);

        let state = self.state.lock();
        let pad = self
            .registry
            .default_gamepad_id()
            .zip(self.registry.default_gamepad());
        self.actions.update(&state, pad);

        result
    }

    /// Cancel the fingers and release the keys and buttons of every device
    /// removed since the last frame.
    fn release_removed_devices(&mut self) {
        let removed = self.registry.changes().iter().filter_map(|change| match change {
            DeviceChange::Removed(id) => Some(*id),
            _ => None,
        });
        let removed: Vec<DeviceId> = self.detached.drain(..).chain(removed).collect();
        if removed.is_empty() {
            return;
        }

        let mut gestures = self.gestures.lock();
        let mut state = self.state.lock();
        for id in removed {
            let fingers = gestures.cancel_device(id);
            let released = state.release_device(id);
            if fingers > 0 || released > 0 {
                debug!(device = %id, fingers, released, "Released input held by removed device");
            }
        }
    }

    fn apply_source_changes(&mut self) -> Result<()> {
        let mut result = Ok(());
        let mut changes = DeviceChanges::default();
        for source in &mut self.sources {
            source.update(&mut changes);
        }
        for id in changes.removed {
            if let Err(err) = self.registry.unregister(id) {
                warn!(%err, "Source removed an unknown device");
                result = result.and(Err(err));
            }
        }
        for device in changes.added {
            if let Err(err) = self.registry.register(device) {
                warn!(%err, "Source added a device that cannot be registered");
                result = result.and(Err(err));
            }
        }
        result
    }

    /// Aspect ratio used for gesture thresholds this frame.
    #[must_use]
    pub fn screen_ratio(&self) -> ScreenRatio {
        let size = self
            .registry
            .pointer()
            .map_or(self.config.surface_size, |p| p.surface_size());
        ScreenRatio::from_size(size)
    }

    // ===== Devices =====

    /// Add a source polled at the start of every frame.
    pub fn add_source(&mut self, source: impl InputSource + 'static) {
        self.sources.push(Box::new(source));
    }

    /// Register a device directly.
    ///
    /// # Errors
    ///
    /// Fails if a device with the same id is already registered.
    pub fn register_device(&mut self, device: Box<dyn InputDevice>) -> Result<()> {
        self.registry.register(device)
    }

    /// Unregister a device directly.
    ///
    /// # Errors
    ///
    /// Fails if no device has this id.
    pub fn unregister_device(&mut self, id: DeviceId) -> Result<Box<dyn InputDevice>> {
        let device = self.registry.unregister(id)?;
        self.detached.push(id);
        Ok(device)
    }

    /// Ask for a gamepad to move to another slot.
    ///
    /// # Errors
    ///
    /// Fails for unknown devices, devices that are not gamepads and gamepads
    /// with a fixed hardware index.
    pub fn request_gamepad_index(&mut self, id: DeviceId, index: usize) -> Result<()> {
        self.registry.request_gamepad_index(id, index)
    }

    #[must_use]
    pub const fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut DeviceRegistry {
        &mut self.registry
    }

    /// Device changes applied during the last [`update`](Self::update).
    #[must_use]
    pub fn changes(&self) -> &[DeviceChange] {
        self.registry.changes()
    }

    // ===== Events =====

    /// Router for registering additional listeners.
    #[must_use]
    pub const fn router(&self) -> &Arc<EventRouter> {
        &self.router
    }

    /// Events of the last frame, in emission order.
    pub fn events(&self) -> impl Iterator<Item = InputEvent<'_>> + '_ {
        self.frame.iter().filter_map(|&event| self.store.resolve(event))
    }

    /// Event pools, for diagnostics.
    #[must_use]
    pub const fn event_store(&self) -> &EventStore {
        &self.store
    }

    /// Global input state resolved during the last frame.
    pub fn state(&self) -> MutexGuard<'_, InputState> {
        self.state.lock()
    }

    // ===== Gestures =====

    /// Start recognizing a gesture from the next frame on.
    pub fn add_gesture(&mut self, config: impl Into<GestureConfig>) -> GestureId {
        self.gestures.lock().add(config)
    }

    /// Stop recognizing a gesture, dropping its state.
    pub fn remove_gesture(&mut self, id: GestureId) -> bool {
        self.gestures.lock().remove(id)
    }

    pub fn gestures(&self) -> MutexGuard<'_, GestureSet> {
        self.gestures.lock()
    }

    /// Gesture events recognized during the last frame.
    #[must_use]
    pub fn gesture_events(&self) -> Vec<GestureEvent> {
        self.gestures.lock().events().to_vec()
    }

    // ===== Keyboard and mouse shortcuts =====

    /// Returns `true` if the key is held.
    #[must_use]
    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.state.lock().is_key_down(key)
    }

    /// Returns `true` if the key went down this frame.
    #[must_use]
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.state.lock().is_key_pressed(key)
    }

    /// Returns `true` if the key came up this frame.
    #[must_use]
    pub fn is_key_released(&self, key: KeyCode) -> bool {
        self.state.lock().is_key_released(key)
    }

    #[must_use]
    pub fn is_mouse_button_down(&self, button: MouseButton) -> bool {
        self.state.lock().is_mouse_button_down(button)
    }

    /// Normalized mouse movement this frame.
    #[must_use]
    pub fn mouse_delta(&self) -> Vec2 {
        self.state.lock().mouse_delta()
    }

    // ===== Action shortcuts =====

    #[must_use]
    pub const fn actions(&self) -> &ActionMap {
        &self.actions
    }

    /// Get a mutable reference to the action map for runtime rebinding.
    pub fn actions_mut(&mut self) -> &mut ActionMap {
        &mut self.actions
    }

    /// Bind an input to an action.
    pub fn bind_action(&mut self, action: impl Into<String>, binding: impl Into<InputBinding>) {
        self.actions.bind(action, binding);
    }

    /// Returns `true` if the action is currently pressed.
    #[must_use]
    pub fn is_action_pressed(&self, action: &str) -> bool {
        self.actions.is_pressed(action)
    }

    /// Returns `true` if the action was just pressed this frame.
    #[must_use]
    pub fn is_action_just_pressed(&self, action: &str) -> bool {
        self.actions.is_just_pressed(action)
    }

    /// Returns `true` if the action was just released this frame.
    #[must_use]
    pub fn is_action_just_released(&self, action: &str) -> bool {
        self.actions.is_just_released(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DeviceInfo;
    use crate::event::EventKind;
    use crate::gesture::{GestureState, TapConfig};
    use crate::source::QueueSource;
    use kinesis_core::Error;

    const DT: Duration = Duration::from_millis(16);

    fn manager() -> (InputManager, crate::source::SourceHandle) {
        let source = QueueSource::new("test");
        let handle = source.handle().clone();
        let mut input = InputManager::default();
        input.add_source(source);
        (input, handle)
    }

    #[test]
    fn hot_plugged_keyboard_drives_actions() {
        let (input, handle) = manager();
        let mut input = input.with_actions(ActionMap::builder().bind("jump", KeyCode::Space).build());
        let keyboard = handle.add_keyboard(DeviceInfo::new(DeviceId::from_name("kb"), "Keyboard"));
        keyboard.key(KeyCode::Space, true);

        input.update(DT).unwrap();
        assert_eq!(input.changes(), &[DeviceChange::Added(keyboard.device())]);
        assert!(input.is_key_pressed(KeyCode::Space));
        assert!(input.is_action_just_pressed("jump"));

        input.update(DT).unwrap();
        assert!(input.changes().is_empty());
        assert!(input.is_key_down(KeyCode::Space));
        assert!(!input.is_key_pressed(KeyCode::Space));
        assert!(input.is_action_pressed("jump"));
    }

    #[test]
    fn previous_frame_events_are_released() {
        let (mut input, handle) = manager();
        let keyboard = handle.add_keyboard(DeviceInfo::new(DeviceId::from_name("kb"), "Keyboard"));
        keyboard.key(KeyCode::KeyA, true);
        keyboard.key(KeyCode::KeyB, true);

        input.update(DT).unwrap();
        assert_eq!(input.events().count(), 2);
        assert_eq!(input.event_store().active_count(EventKind::Key), 2);

        input.update(DT).unwrap();
        assert_eq!(input.events().count(), 0);
        assert_eq!(input.event_store().total_active(), 0);
    }

    #[test]
    fn duplicate_hot_plug_is_reported_but_frame_runs() {
        let (mut input, handle) = manager();
        let id = DeviceId::from_name("kb");
        handle.add_keyboard(DeviceInfo::new(id, "Keyboard"));
        input.update(DT).unwrap();

        let second = handle.add_keyboard(DeviceInfo::new(id, "Keyboard again"));
        second.key(KeyCode::KeyA, true);
        assert!(matches!(input.update(DT), Err(Error::DuplicateDevice(d)) if d == id));
        assert_eq!(input.registry().len(), 1);
    }

    #[test]
    fn touch_tap_reaches_gestures() {
        let (mut input, handle) = manager();
        let tap = input.add_gesture(TapConfig::default().with_max_taps(1));
        let touch = handle.add_touch_surface(
            DeviceInfo::new(DeviceId::from_name("touch"), "Touch"),
            Vec2::new(800.0, 600.0),
        );
        touch.down(0, Vec2::new(0.5, 0.5), Duration::ZERO);
        input.update(DT).unwrap();
        touch.up(0, Vec2::new(0.5, 0.5), Duration::from_millis(50));
        input.update(DT).unwrap();

        let events = input.gesture_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].gesture, tap);
        assert_eq!(events[0].state, GestureState::Occurred);
        assert!(input.remove_gesture(tap));
    }

    #[test]
    fn screen_ratio_follows_primary_pointer() {
        let (mut input, handle) = manager();
        assert_eq!(input.screen_ratio(), ScreenRatio::from_size(Vec2::new(1280.0, 720.0)));
        handle.add_touch_surface(
            DeviceInfo::new(DeviceId::from_name("touch"), "Touch"),
            Vec2::new(100.0, 200.0),
        );
        input.update(DT).unwrap();
        assert_eq!(input.screen_ratio().value(), 2.0);
    }
}
