//! Translation of winit window events into raw samples.

use std::time::Instant;

use glam::Vec2;
use kinesis_core::DeviceId;
use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, Ime, MouseScrollDelta, Touch, TouchPhase, WindowEvent};
use winit::keyboard::PhysicalKey;

use crate::device::mouse::MouseButton;
use crate::device::DeviceInfo;
use crate::event::PointerEventType;
use crate::source::queue_source::{KeyboardFeed, MouseFeed, SourceHandle, TouchFeed};

/// Feeds a keyboard, a mouse and a touch surface from one window.
///
/// Call [`WinitInput::handle_window_event`] from the event loop; the devices
/// are registered through the given [`SourceHandle`] on construction.
#[derive(Debug)]
pub struct WinitInput {
    keyboard: KeyboardFeed,
    mouse: MouseFeed,
    touch: TouchFeed,
    surface_size: Vec2,
    epoch: Instant,
}

impl WinitInput {
    /// Register the window's devices. Ids are derived from `window_name`, so
    /// they are stable across runs.
    #[must_use]
    pub fn new(handle: &SourceHandle, window_name: &str, surface_size: Vec2) -> Self {
        let id = |suffix: &str| DeviceId::from_name(&format!("{window_name}/{suffix}"));
        Self {
            keyboard: handle.add_keyboard(DeviceInfo::new(id("keyboard"), "Keyboard")),
            mouse: handle.add_mouse(DeviceInfo::new(id("mouse"), "Mouse"), surface_size),
            touch: handle.add_touch_surface(
                DeviceInfo::new(id("touch"), "Touch Screen"),
                surface_size,
            ),
            surface_size,
            epoch: Instant::now(),
        }
    }

    #[must_use]
    pub const fn keyboard(&self) -> &KeyboardFeed {
        &self.keyboard
    }

    #[must_use]
    pub const fn mouse(&self) -> &MouseFeed {
        &self.mouse
    }

    #[must_use]
    pub const fn touch(&self) -> &TouchFeed {
        &self.touch
    }

    #[allow(clippy::cast_possible_truncation)]
    fn normalize(&self, position: PhysicalPosition<f64>) -> Vec2 {
        let pixels = Vec2::new(position.x as f32, position.y as f32);
        if self.surface_size.x > 0.0 && self.surface_size.y > 0.0 {
            pixels / self.surface_size
        } else {
            Vec2::ZERO
        }
    }

    /// Process a window event.
    ///
    /// Returns `true` if the event was consumed.
    #[allow(clippy::cast_possible_truncation)]
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        let now = self.epoch.elapsed();
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                let PhysicalKey::Code(key) = event.physical_key else {
                    return false;
                };
                let pressed = event.state == ElementState::Pressed;
                self.keyboard.key(key, pressed);
                if pressed {
                    if let Some(text) = &event.text {
                        self.keyboard.text(text.as_str());
                    }
                }
                true
            }
            WindowEvent::Ime(Ime::Preedit(text, cursor)) => {
                let (start, end) = cursor.unwrap_or((0, 0));
                self.keyboard
                    .composition(text.as_str(), start, end.saturating_sub(start));
                true
            }
            WindowEvent::Ime(Ime::Commit(text)) => {
                self.keyboard.text(text.as_str());
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.mouse.moved(self.normalize(*position), now);
                true
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let Ok(button) = MouseButton::try_from(*button) else {
                    return false;
                };
                self.mouse
                    .button(button, *state == ElementState::Pressed, now);
                true
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let notches = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    // Convert pixel delta to line delta (approximate)
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 100.0,
                };
                self.mouse.wheel(notches);
                true
            }
            WindowEvent::Touch(Touch {
                phase,
                location,
                id,
                ..
            }) => {
                let event_type = match phase {
                    TouchPhase::Started => PointerEventType::Pressed,
                    TouchPhase::Moved => PointerEventType::Moved,
                    TouchPhase::Ended => PointerEventType::Released,
                    TouchPhase::Cancelled => PointerEventType::Canceled,
                };
                self.touch
                    .sample(*id as u32, self.normalize(*location), event_type, now);
                true
            }
            WindowEvent::Resized(size) => {
                let size = Vec2::new(size.width as f32, size.height as f32);
                self.surface_size = size;
                self.mouse.resize(size);
                self.touch.resize(size);
                false
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::mouse::MouseInput;
    use crate::source::{DeviceChanges, InputSource, QueueSource};
    use winit::dpi::PhysicalSize;
    use winit::event::{DeviceId as WinitDeviceId, MouseButton as WinitMouseButton};

    fn dummy() -> WinitDeviceId {
        // SAFETY: only used as an opaque tag in tests.
        unsafe { WinitDeviceId::dummy() }
    }

    #[test]
    fn registers_three_devices() {
        let mut source = QueueSource::new("window");
        let _input = WinitInput::new(source.handle(), "main", Vec2::new(800.0, 600.0));
        let mut changes = DeviceChanges::default();
        source.update(&mut changes);
        assert_eq!(changes.added.len(), 3);
    }

    #[test]
    fn cursor_positions_are_normalized() {
        let source = QueueSource::new("window");
        let mut input = WinitInput::new(source.handle(), "main", Vec2::new(800.0, 600.0));

        assert!(!input.handle_window_event(&WindowEvent::Resized(PhysicalSize::new(400, 200))));
        assert!(input.handle_window_event(&WindowEvent::CursorMoved {
            device_id: dummy(),
            position: PhysicalPosition::new(100.0, 50.0),
        }));
        assert!(!input.handle_window_event(&WindowEvent::MouseInput {
            device_id: dummy(),
            state: ElementState::Pressed,
            button: WinitMouseButton::Other(9),
        }));

        let mut drained = Vec::new();
        input.mouse.queue().drain_into(&mut drained);
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0], MouseInput::SurfaceResized(Vec2::new(400.0, 200.0)));
        match drained[1] {
            MouseInput::Moved { position, .. } => assert_eq!(position, Vec2::new(0.25, 0.25)),
            other => panic!("unexpected {other:?}"),
        }
    }
}
