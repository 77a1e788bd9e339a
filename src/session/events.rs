//! # Event Registry
//!
//! Listeners per [`EventKind`], called in the order they were added.
//!
//! A listener is an `Rc` closure, optionally tagged with a [`ScopeId`]. It can
//! be removed either with the [`ListenerHandle`] returned by
//! [`EventRegistry::on`], or by presenting the same `Rc` and scope again to
//! [`EventRegistry::un`]. Identity is the pointer of the `Rc`, never the
//! closure's behaviour, so a freshly built closure never matches.

use std::collections::HashMap;
use std::rc::Rc;

use log::trace;

use super::input::PointerEvent;
use crate::interaction::FaceKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Animate,
    RenderBefore,
    RenderAfter,
    Click,
    DoubleClick,
    MouseMove,
    MouseDown,
    MouseUp,
}

/// Payload handed to listeners
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionEvent {
    Animate { delta_seconds: f64 },
    RenderBefore,
    RenderAfter,
    Pointer {
        kind: EventKind,
        pointer: PointerEvent,
        /// Classified face under the pointer, when face picking is enabled
        face: Option<FaceKey>,
    },
}

impl SessionEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            SessionEvent::Animate { .. } => EventKind::Animate,
            SessionEvent::RenderBefore => EventKind::RenderBefore,
            SessionEvent::RenderAfter => EventKind::RenderAfter,
            SessionEvent::Pointer { kind, .. } => *kind,
        }
    }
}

pub type Listener = Rc<dyn Fn(&SessionEvent)>;

/// Caller-chosen tag distinguishing registrations of the same listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(pub u64);

/// Returned by [`EventRegistry::on`]; removes exactly that registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerHandle {
    kind: EventKind,
    id: u64,
}

struct Registration {
    id: u64,
    listener: Listener,
    scope: Option<ScopeId>,
}

#[derive(Default)]
pub struct EventRegistry {
    listeners: HashMap<EventKind, Vec<Registration>>,
    next_id: u64,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a listener at the end of `kind`'s dispatch order
    pub fn on(&mut self, kind: EventKind, listener: Listener, scope: Option<ScopeId>) -> ListenerHandle {
        let id = self.next_id;
        self.next_id += 1;
        self.listeners
            .entry(kind)
            .or_default()
            .push(Registration { id, listener, scope });
        ListenerHandle { kind, id }
    }

    /// Remove the first registration of `listener` with exactly `scope`.
    ///
    /// Returns false, leaving the registry untouched, when nothing matches.
    pub fn un(&mut self, kind: EventKind, listener: &Listener, scope: Option<ScopeId>) -> bool {
        let Some(list) = self.listeners.get_mut(&kind) else {
            return false;
        };
        let found = list
            .iter()
            .position(|r| std::ptr::addr_eq(Rc::as_ptr(&r.listener), Rc::as_ptr(listener)) && r.scope == scope);
        match found {
            Some(index) => {
                list.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn off(&mut self, handle: ListenerHandle) -> bool {
        let Some(list) = self.listeners.get_mut(&handle.kind) else {
            return false;
        };
        let before = list.len();
        list.retain(|r| r.id != handle.id);
        list.len() != before
    }

    /// Call every listener of the event's kind in registration order
    pub fn emit(&self, event: &SessionEvent) {
        let Some(list) = self.listeners.get(&event.kind()) else {
            return;
        };
        trace!("emit {:?} to {} listeners", event.kind(), list.len());
        for registration in list {
            (registration.listener)(event);
        }
    }

    pub fn len(&self, kind: EventKind) -> usize {
        self.listeners.get(&kind).map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.values().all(Vec::is_empty)
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn recorder(log: &Rc<RefCell<Vec<&'static str>>>, name: &'static str) -> Listener {
        let log = Rc::clone(log);
        Rc::new(move |_: &SessionEvent| log.borrow_mut().push(name))
    }

    #[test]
    fn test_dispatch_follows_insertion_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut registry = EventRegistry::new();
        registry.on(EventKind::RenderBefore, recorder(&log, "a"), None);
        registry.on(EventKind::RenderBefore, recorder(&log, "b"), None);
        registry.on(EventKind::RenderAfter, recorder(&log, "after"), None);
        registry.on(EventKind::RenderBefore, recorder(&log, "c"), None);

        registry.emit(&SessionEvent::RenderBefore);
        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_mismatched_removal_is_noop() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut registry = EventRegistry::new();
        let listener = recorder(&log, "x");
        registry.on(EventKind::Click, Rc::clone(&listener), Some(ScopeId(1)));

        // Wrong scope, wrong kind, and an identical-looking but distinct closure.
        assert!(!registry.un(EventKind::Click, &listener, Some(ScopeId(2))));
        assert!(!registry.un(EventKind::Click, &listener, None));
        assert!(!registry.un(EventKind::MouseUp, &listener, Some(ScopeId(1))));
        assert!(!registry.un(EventKind::Click, &recorder(&log, "x"), Some(ScopeId(1))));
        assert_eq!(registry.len(EventKind::Click), 1);

        assert!(registry.un(EventKind::Click, &listener, Some(ScopeId(1))));
        assert_eq!(registry.len(EventKind::Click), 0);
    }

    #[test]
    fn test_removal_takes_exactly_the_matching_duplicate() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut registry = EventRegistry::new();
        let listener = recorder(&log, "dup");
        registry.on(EventKind::Animate, Rc::clone(&listener), Some(ScopeId(1)));
        registry.on(EventKind::Animate, Rc::clone(&listener), Some(ScopeId(2)));
        registry.on(EventKind::Animate, Rc::clone(&listener), Some(ScopeId(1)));

        assert!(registry.un(EventKind::Animate, &listener, Some(ScopeId(2))));
        assert_eq!(registry.len(EventKind::Animate), 2);

        assert!(registry.un(EventKind::Animate, &listener, Some(ScopeId(1))));
        assert_eq!(registry.len(EventKind::Animate), 1);

        registry.emit(&SessionEvent::Animate { delta_seconds: 0.016 });
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_off_by_handle() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut registry = EventRegistry::new();
        let handle = registry.on(EventKind::MouseMove, recorder(&log, "m"), None);
        registry.on(EventKind::MouseMove, recorder(&log, "n"), None);

        assert!(registry.off(handle));
        assert!(!registry.off(handle));
        assert_eq!(registry.len(EventKind::MouseMove), 1);
        assert!(!registry.is_empty());

        registry.clear();
        assert!(registry.is_empty());
    }
}
