//! Input event pipeline and gesture recognition for the Kinesis engine.
//!
//! Raw samples from platform callbacks land in per-device queues. Once per
//! frame the [`InputManager`] drains them into typed, pooled events, routes
//! those events to listeners by kind, and derives gestures and action states.
//!
//! # Core Types
//!
//! - [`InputManager`]: Main entry point running the per-frame pipeline
//! - [`DeviceRegistry`]: Live devices, classified by capability, plus gamepad slots
//! - [`EventRouter`]: Dispatches pooled events to [`InputEventListener`]s
//! - [`GestureSet`]: Tap, long press, drag, flick and two-finger composite recognizers
//! - [`InputState`]: Per-frame keyboard, mouse and gamepad state
//! - [`ActionMap`]: Maps named actions to input bindings
//!
//! # Usage
//!
//! ```ignore
//! use kinesis_input::{ActionMap, DeviceInfo, InputConfig, InputManager, QueueSource, TapConfig};
//! use kinesis_core::DeviceId;
//! use winit::keyboard::KeyCode;
//!
//! let actions = ActionMap::builder()
//!     .bind("jump", KeyCode::Space)
//!     .build();
//! let mut input = InputManager::new(InputConfig::default()).with_actions(actions);
//! let tap = input.add_gesture(TapConfig::default());
//!
//! let source = QueueSource::new("platform");
//! let touch = source.handle().add_touch_surface(
//!     DeviceInfo::new(DeviceId::from_name("touch"), "Touch screen"),
//!     glam::Vec2::new(1920.0, 1080.0),
//! );
//! input.add_source(source);
//!
//! // In the update loop
//! input.update(dt)?;
//! for event in input.gesture_events() {
//!     if event.gesture == tap {
//!         // ...
//!     }
//! }
//! ```

mod action;
mod button_state;
pub mod device;
pub mod event;
mod gamepad_slots;
pub mod gesture;
mod input;
mod modifiers;
pub mod pool;
mod queue;
mod registry;
pub mod router;
pub mod source;
mod state;

pub use action::{ActionMap, ActionMapBuilder, InputBinding};
pub use button_state::{ButtonState, ButtonTransition};
pub use device::{
    DeviceCapabilities, DeviceInfo, DeviceStatus, GameControllerDevice, GameControllerState,
    GamePadAxis, GamePadBackend, GamePadButton, GamePadDevice, GamePadIndexPolicy, GamePadState,
    InputDevice, KeyboardDevice, MouseButton, MouseDevice, PointerDevice, Pov, SensorDevice,
    SensorKind, SensorValue,
};
pub use event::{EventKind, InputEvent, PointerEvent, PointerEventType};
pub use gamepad_slots::{GamePadSlots, SlotChange};
pub use gesture::{
    CompositeConfig, CompositeEvent, DragConfig, DragEvent, FlickConfig, FlickEvent,
    GestureConfig, GestureData, GestureEvent, GestureId, GestureKind, GestureSet, GestureShape,
    GestureState, LongPressConfig, LongPressEvent, TapConfig, TapEvent,
};
pub use input::{InputConfig, InputManager};
pub use modifiers::Modifiers;
pub use pool::{EventRef, EventSink, EventStore};
pub use queue::RawQueue;
pub use registry::{DeviceChange, DeviceRegistry};
pub use router::{EventRouter, InputEventListener, SharedListener};
pub use source::{
    ControllerFeed, DeviceChanges, GamePadFeed, InputSource, KeyboardFeed, MouseFeed,
    QueueSource, SensorFeed, SourceHandle, TouchFeed, WinitInput,
};
pub use state::InputState;

// Re-export winit types commonly used with input
pub use winit::event::WindowEvent;
pub use winit::keyboard::KeyCode;
