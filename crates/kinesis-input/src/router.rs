//! Routing of events to listeners keyed by event kind.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::event::{EventKind, InputEvent};

/// Something that observes dispatched input events.
pub trait InputEventListener: Send {
    /// Kinds this listener wants when registered with
    /// [`EventRouter::add_listener`].
    fn event_kinds(&self) -> &'static [EventKind];

    /// Observe one event. Only kinds the listener is registered for arrive here.
    fn process_event(&mut self, event: &InputEvent<'_>);
}

/// A listener shared between the router and its owner.
pub type SharedListener = Arc<Mutex<dyn InputEventListener>>;

type ListenerTable = Arc<[SharedListener]>;

fn same_listener(a: &SharedListener, b: &SharedListener) -> bool {
    std::ptr::eq(Arc::as_ptr(a).cast::<()>(), Arc::as_ptr(b).cast::<()>())
}

/// Dispatches events to the listeners registered for their kind.
///
/// Each kind owns an immutable listener table that is replaced wholesale on
/// registration changes. Dispatch clones the table pointer before invoking
/// anything, so listeners may add or remove listeners (themselves included)
/// while an event is being delivered; the change applies to the next event.
pub struct EventRouter {
    tables: [RwLock<ListenerTable>; EventKind::COUNT],
}

impl Default for EventRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: Vec<_> = EventKind::ALL
            .iter()
            .map(|&kind| (kind, self.listener_count(kind)))
            .collect();
        f.debug_struct("EventRouter").field("listeners", &counts).finish()
    }
}

impl EventRouter {
    /// Create a router with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tables: std::array::from_fn(|_| RwLock::new(Arc::from(Vec::new()))),
        }
    }

    /// Register `listener` for one kind. Registering twice is a no-op.
    pub fn register_listener(&self, kind: EventKind, listener: &SharedListener) {
        let mut table = self.tables[kind.index()].write();
        if table.iter().any(|l| same_listener(l, listener)) {
            return;
        }
        let mut next: Vec<SharedListener> = table.iter().cloned().collect();
        next.push(Arc::clone(listener));
        *table = Arc::from(next);
    }

    /// Unregister `listener` from one kind.
    ///
    /// Returns `false` if it was not registered for that kind.
    pub fn unregister_listener(&self, kind: EventKind, listener: &SharedListener) -> bool {
        let mut table = self.tables[kind.index()].write();
        if !table.iter().any(|l| same_listener(l, listener)) {
            return false;
        }
        let next: Vec<SharedListener> = table
            .iter()
            .filter(|l| !same_listener(l, listener))
            .cloned()
            .collect();
        *table = Arc::from(next);
        true
    }

    /// Register `listener` for every kind it declares.
    pub fn add_listener(&self, listener: &SharedListener) {
        let kinds = listener.lock().event_kinds();
        for &kind in kinds {
            self.register_listener(kind, listener);
        }
    }

    /// Unregister `listener` from every kind.
    pub fn remove_listener(&self, listener: &SharedListener) {
        for kind in EventKind::ALL {
            self.unregister_listener(kind, listener);
        }
    }

    /// Number of listeners registered for `kind`.
    #[must_use]
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.tables[kind.index()].read().len()
    }

    /// Deliver one event to the listeners of its kind.
    pub fn dispatch(&self, event: &InputEvent<'_>) {
        let snapshot = Arc::clone(&self.tables[event.kind().index()].read());
        for listener in snapshot.iter() {
            listener.lock().process_event(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::MouseWheelEvent;
    use kinesis_core::DeviceId;

    #[derive(Default)]
    struct Counter {
        seen: usize,
    }

    impl InputEventListener for Counter {
        fn event_kinds(&self) -> &'static [EventKind] {
            &[EventKind::MouseWheel, EventKind::Key]
        }

        fn process_event(&mut self, _event: &InputEvent<'_>) {
            self.seen += 1;
        }
    }

    /// Removes itself and registers a fresh counter from inside dispatch.
    struct SelfRemover {
        router: Arc<EventRouter>,
        me: Option<SharedListener>,
        spawned: Arc<Mutex<Counter>>,
        calls: usize,
    }

    impl InputEventListener for SelfRemover {
        fn event_kinds(&self) -> &'static [EventKind] {
            &[EventKind::MouseWheel]
        }

        fn process_event(&mut self, _event: &InputEvent<'_>) {
            self.calls += 1;
            if let Some(me) = self.me.take() {
                self.router.unregister_listener(EventKind::MouseWheel, &me);
                let spawned: SharedListener = self.spawned.clone();
                self.router.register_listener(EventKind::MouseWheel, &spawned);
            }
        }
    }

    fn wheel() -> MouseWheelEvent {
        MouseWheelEvent {
            device: DeviceId::from_name("router-test"),
            wheel_delta: 1.0,
        }
    }

    #[test]
    fn dispatch_reaches_only_registered_kind() {
        let router = EventRouter::new();
        let counter = Arc::new(Mutex::new(Counter::default()));
        let shared: SharedListener = counter.clone();
        router.register_listener(EventKind::MouseWheel, &shared);
        router.register_listener(EventKind::MouseWheel, &shared);
        assert_eq!(router.listener_count(EventKind::MouseWheel), 1);

        let event = wheel();
        router.dispatch(&InputEvent::MouseWheel(&event));
        assert_eq!(counter.lock().seen, 1);

        assert!(router.unregister_listener(EventKind::MouseWheel, &shared));
        assert!(!router.unregister_listener(EventKind::MouseWheel, &shared));
        router.dispatch(&InputEvent::MouseWheel(&event));
        assert_eq!(counter.lock().seen, 1);
    }

    #[test]
    fn add_listener_uses_declared_kinds() {
        let router = EventRouter::new();
        let shared: SharedListener = Arc::new(Mutex::new(Counter::default()));
        router.add_listener(&shared);
        assert_eq!(router.listener_count(EventKind::MouseWheel), 1);
        assert_eq!(router.listener_count(EventKind::Key), 1);
        assert_eq!(router.listener_count(EventKind::Pointer), 0);

        router.remove_listener(&shared);
        assert_eq!(router.listener_count(EventKind::Key), 0);
    }

    #[test]
    fn self_modification_during_dispatch_is_deferred() {
        let router = Arc::new(EventRouter::new());
        let spawned = Arc::new(Mutex::new(Counter::default()));
        let remover = Arc::new(Mutex::new(SelfRemover {
            router: Arc::clone(&router),
            me: None,
            spawned: Arc::clone(&spawned),
            calls: 0,
        }));
        let shared: SharedListener = remover.clone();
        remover.lock().me = Some(Arc::clone(&shared));
        router.register_listener(EventKind::MouseWheel, &shared);

        let event = wheel();
        router.dispatch(&InputEvent::MouseWheel(&event));
        // The snapshot taken at dispatch start did not include the new counter.
        assert_eq!(remover.lock().calls, 1);
        assert_eq!(spawned.lock().seen, 0);

        router.dispatch(&InputEvent::MouseWheel(&event));
        assert_eq!(remover.lock().calls, 1);
        assert_eq!(spawned.lock().seen, 1);
    }
}
