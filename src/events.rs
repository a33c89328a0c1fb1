// Listener registry keyed by event kind. Owned by the viewer; hosts subscribe and unsubscribe.

use std::rc::Rc;

use crate::types::{EventKind, ViewerEvent};

pub type Listener = Rc<dyn Fn(&ViewerEvent)>;

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u32);

impl ListenerId {
    pub fn as_u32(&self) -> u32 {
        self.0
    }

    pub fn from_u32(id: u32) -> Self {
        ListenerId(id)
    }
}

#[derive(Default)]
pub struct EventBus {
    next_id: u32,
    listeners: Vec<(ListenerId, EventKind, Listener)>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(
        &mut self,
        kind: EventKind,
        listener: impl Fn(&ViewerEvent) + 'static,
    ) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.listeners.push((id, kind, Rc::new(listener)));
        id
    }

    /// Returns `false` if the id was unknown.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _, _)| *existing != id);
        self.listeners.len() != before
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    #[cfg(test)]
    fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners.iter().filter(|(_, k, _)| *k == kind).count()
    }

    /// Snapshot of the listeners for a kind, in subscription order.
    /// Callers holding the bus behind a `RefCell` release the borrow before invoking them.
    pub fn listeners_for(&self, kind: EventKind) -> Vec<Listener> {
        self.listeners
            .iter()
            .filter(|(_, k, _)| *k == kind)
            .map(|(_, _, listener)| Rc::clone(listener))
            .collect()
    }

    pub fn emit(&self, event: &ViewerEvent) {
        for listener in self.listeners_for(event.kind()) {
            listener(event);
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn delivers_only_matching_kind() {
        let mut bus = EventBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        bus.subscribe(EventKind::Index, move |event| sink.borrow_mut().push(event.clone()));

        bus.emit(&ViewerEvent::Press);
        bus.emit(&ViewerEvent::Index(3));

        assert_eq!(*seen.borrow(), vec![ViewerEvent::Index(3)]);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let mut bus = EventBus::new();
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        let id = bus.subscribe(EventKind::Press, move |_| *sink.borrow_mut() += 1);

        bus.emit(&ViewerEvent::Press);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.emit(&ViewerEvent::Press);

        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn listeners_run_in_subscription_order() {
        let mut bus = EventBus::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        for tag in ["first", "second"] {
            let sink = Rc::clone(&order);
            bus.subscribe(EventKind::Loaded, move |_| sink.borrow_mut().push(tag));
        }
        bus.emit(&ViewerEvent::Loaded);
        assert_eq!(*order.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn ids_are_unique_and_counted() {
        let mut bus = EventBus::new();
        let a = bus.subscribe(EventKind::Delta, |_| {});
        let b = bus.subscribe(EventKind::Delta, |_| {});
        assert_ne!(a, b);
        assert_eq!(bus.listener_count(EventKind::Delta), 2);
        bus.clear();
        assert_eq!(bus.listener_count(EventKind::Delta), 0);
    }
}
