//! Queue-fed keyboard device.

use winit::keyboard::KeyCode;

use crate::button_state::ButtonTransition;
use crate::device::{DeviceCapabilities, DeviceInfo, DeviceStatus, InputDevice, KeyboardDevice};
use crate::event::{KeyEvent, TextInputEvent, TextInputEventType};
use crate::pool::EventSink;
use crate::queue::RawQueue;

/// Raw input accepted by a [`Keyboard`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyboardInput {
    /// A key went down (or auto-repeated) or came up.
    Key { key: KeyCode, pressed: bool },
    /// Committed text.
    Text(String),
    /// IME composition in progress.
    Composition {
        text: String,
        start: usize,
        length: usize,
    },
}

/// Keyboard fed by a raw sample queue.
#[derive(Debug)]
pub struct Keyboard {
    info: DeviceInfo,
    down: Vec<KeyCode>,
    repeats: Vec<u32>,
    queue: RawQueue<KeyboardInput>,
    scratch: Vec<KeyboardInput>,
}

impl Keyboard {
    /// Create a keyboard reading from `queue`.
    #[must_use]
    pub const fn new(info: DeviceInfo, queue: RawQueue<KeyboardInput>) -> Self {
        Self {
            info,
            down: Vec::new(),
            repeats: Vec::new(),
            queue,
            scratch: Vec::new(),
        }
    }

    fn apply_key(&mut self, key: KeyCode, pressed: bool, events: &mut EventSink<'_>) {
        let held = self.down.iter().position(|&k| k == key);
        let repeat_count = match (pressed, held) {
            (true, Some(i)) => {
                self.repeats[i] += 1;
                self.repeats[i]
            }
            (true, None) => {
                self.down.push(key);
                self.repeats.push(0);
                0
            }
            (false, Some(i)) => {
                self.down.remove(i);
                self.repeats.remove(i);
                0
            }
            // Release of a key we never saw go down.
            (false, None) => return,
        };

        events.emit::<KeyEvent>(self.info.id, |e| {
            e.key = key;
            e.state = ButtonTransition::from_pressed(pressed);
            e.repeat_count = repeat_count;
        });
    }

    fn emit_text(
        &self,
        events: &mut EventSink<'_>,
        text: &str,
        event_type: TextInputEventType,
        start: usize,
        length: usize,
    ) {
        events.emit::<TextInputEvent>(self.info.id, |e| {
            e.text.clear();
            e.text.push_str(text);
            e.event_type = event_type;
            e.composition_start = start;
            e.composition_length = length;
        });
    }
}

impl InputDevice for Keyboard {
    fn info(&self) -> &DeviceInfo {
        &self.info
    }

    fn capabilities(&self) -> DeviceCapabilities {
        DeviceCapabilities::KEYBOARD | DeviceCapabilities::TEXT_INPUT
    }

    fn update(&mut self, events: &mut EventSink<'_>) -> DeviceStatus {
        let mut inputs = std::mem::take(&mut self.scratch);
        self.queue.drain_into(&mut inputs);
        for input in inputs.drain(..) {
            match input {
                KeyboardInput::Key { key, pressed } => self.apply_key(key, pressed, events),
                KeyboardInput::Text(text) => {
                    self.emit_text(events, &text, TextInputEventType::Input, 0, 0);
                }
                KeyboardInput::Composition {
                    text,
                    start,
                    length,
                } => {
                    self.emit_text(events, &text, TextInputEventType::Composition, start, length);
                }
            }
        }
        self.scratch = inputs;
        DeviceStatus::Connected
    }

    fn as_keyboard(&self) -> Option<&dyn KeyboardDevice> {
        Some(self)
    }
}

impl KeyboardDevice for Keyboard {
    fn down_keys(&self) -> &[KeyCode] {
        &self.down
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::InputEvent;
    use crate::pool::EventStore;
    use kinesis_core::DeviceId;

    fn keyboard() -> (Keyboard, RawQueue<KeyboardInput>) {
        let queue = RawQueue::new();
        let info = DeviceInfo::new(DeviceId::from_name("keyboard"), "Keyboard");
        (Keyboard::new(info, queue.clone()), queue)
    }

    fn key_events(store: &EventStore, frame: &[crate::pool::EventRef]) -> Vec<(KeyCode, bool, u32)> {
        frame
            .iter()
            .filter_map(|&r| match store.resolve(r) {
                Some(InputEvent::Key(k)) => Some((k.key, k.state.is_down(), k.repeat_count)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn repeats_count_up_without_duplicating_down_keys() {
        let (mut keyboard, queue) = keyboard();
        for pressed in [true, true, true, false] {
            queue.push(KeyboardInput::Key {
                key: KeyCode::KeyA,
                pressed,
            });
        }
        queue.push(KeyboardInput::Key {
            key: KeyCode::KeyB,
            pressed: true,
        });

        let mut store = EventStore::new();
        let mut frame = Vec::new();
        keyboard.update(&mut EventSink::new(&mut store, &mut frame));

        assert_eq!(
            key_events(&store, &frame),
            vec![
                (KeyCode::KeyA, true, 0),
                (KeyCode::KeyA, true, 1),
                (KeyCode::KeyA, true, 2),
                (KeyCode::KeyA, false, 0),
                (KeyCode::KeyB, true, 0),
            ]
        );
        assert_eq!(keyboard.down_keys(), &[KeyCode::KeyB]);
        assert!(keyboard.is_key_down(KeyCode::KeyB));
        assert!(!keyboard.is_key_down(KeyCode::KeyA));
    }

    #[test]
    fn stray_release_is_dropped() {
        let (mut keyboard, queue) = keyboard();
        queue.push(KeyboardInput::Key {
            key: KeyCode::Space,
            pressed: false,
        });
        let mut store = EventStore::new();
        let mut frame = Vec::new();
        keyboard.update(&mut EventSink::new(&mut store, &mut frame));
        assert!(frame.is_empty());
    }

    #[test]
    fn text_and_composition() {
        let (mut keyboard, queue) = keyboard();
        queue.push(KeyboardInput::Composition {
            text: "ka".into(),
            start: 2,
            length: 0,
        });
        queue.push(KeyboardInput::Text("か".into()));

        let mut store = EventStore::new();
        let mut frame = Vec::new();
        keyboard.update(&mut EventSink::new(&mut store, &mut frame));

        let texts: Vec<_> = frame
            .iter()
            .filter_map(|&r| match store.resolve(r) {
                Some(InputEvent::TextInput(t)) => {
                    Some((t.text.clone(), t.event_type, t.composition_start))
                }
                _ => None,
            })
            .collect();
        assert_eq!(
            texts,
            vec![
                ("ka".to_string(), TextInputEventType::Composition, 2),
                ("か".to_string(), TextInputEventType::Input, 0),
            ]
        );
    }
}
