//! Signal subscriptions and map/unmap emission hooks.
//!
//! Every object carries a [`SignalTable`]. `connect` returns an opaque
//! [`HandlerId`]; subscribing twice yields two ids. Emission snapshots the
//! matching handlers before running any of them, so a handler may disconnect
//! itself (or others) mid-emission.
//!
//! Map and unmap go through a thread-local hook table instead: widgets call
//! [`notify_map_observers`] after their mapped flag flips, and whoever wants to
//! see every widget map (the inspector) installs a [`MapObserver`] once.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use super::handle::{Object, ObjectId};
use super::widget::{Allocation, StateFlags};

// ---------------------------------------------------------------------------
// Ids
// ---------------------------------------------------------------------------

thread_local! {
    static NEXT_HANDLER: Cell<u64> = const { Cell::new(1) };
    static HOOKS: RefCell<HookTable> = RefCell::new(HookTable::default());
}

/// Token returned by `connect`; consumed by `disconnect`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(u64);

impl HandlerId {
    pub(crate) fn next() -> Self {
        NEXT_HANDLER.with(|next| {
            let id = next.get();
            next.set(id + 1);
            HandlerId(id)
        })
    }
}

/// Token returned by [`install_map_observer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookId(u64);

// ---------------------------------------------------------------------------
// Signals
// ---------------------------------------------------------------------------

/// The signals an object can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    Destroy,
    StateFlagsChanged,
    SizeAllocate,
    SetFocus,
    /// A property changed; the payload names it.
    Notify,
    /// A frame clock advanced.
    Tick,
}

/// Data delivered with an emission.
#[derive(Debug, Clone, PartialEq)]
pub enum SignalPayload {
    None,
    Notify(String),
    StateFlags { old: StateFlags, new: StateFlags },
    Allocation(Allocation),
    Focus(Option<ObjectId>),
    Tick { frame: u64, timestamp_us: i64 },
}

type Callback = Rc<dyn Fn(&Object, &SignalPayload)>;

struct HandlerEntry {
    id: HandlerId,
    kind: SignalKind,
    callback: Callback,
}

/// Per-object handler list.
#[derive(Default)]
pub struct SignalTable {
    handlers: Vec<HandlerEntry>,
}

impl SignalTable {
    pub(crate) fn connect(&mut self, kind: SignalKind, callback: Callback) -> HandlerId {
        let id = HandlerId::next();
        self.handlers.push(HandlerEntry { id, kind, callback });
        id
    }

    /// Returns `true` if the handler was connected.
    pub(crate) fn disconnect(&mut self, id: HandlerId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|h| h.id != id);
        self.handlers.len() != before
    }

    pub(crate) fn snapshot(&self, kind: SignalKind) -> Vec<Callback> {
        self.handlers
            .iter()
            .filter(|h| h.kind == kind)
            .map(|h| Rc::clone(&h.callback))
            .collect()
    }

    pub(crate) fn is_connected(&self, id: HandlerId) -> bool {
        self.handlers.iter().any(|h| h.id == id)
    }

    pub(crate) fn len(&self) -> usize {
        self.handlers.len()
    }

    pub(crate) fn clear(&mut self) {
        self.handlers.clear();
    }
}

impl fmt::Debug for SignalTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.handlers.iter().map(|h| (h.id, h.kind)))
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Map/unmap hooks
// ---------------------------------------------------------------------------

/// Observer of every widget map/unmap in the thread.
pub trait MapObserver {
    /// Called after `object`'s mapped flag has flipped to `mapped`.
    fn map_changed(&self, object: &Object, mapped: bool);
}

#[derive(Default)]
struct HookTable {
    next: u64,
    observers: Vec<(HookId, Rc<dyn MapObserver>)>,
}

/// Install a map/unmap observer. Returns the id to uninstall it with.
pub fn install_map_observer(observer: Rc<dyn MapObserver>) -> HookId {
    HOOKS.with(|hooks| {
        let mut hooks = hooks.borrow_mut();
        hooks.next += 1;
        let id = HookId(hooks.next);
        hooks.observers.push((id, observer));
        id
    })
}

/// Uninstall a map/unmap observer. Returns `false` if it was not installed.
pub fn remove_map_observer(id: HookId) -> bool {
    HOOKS.with(|hooks| {
        let mut hooks = hooks.borrow_mut();
        let before = hooks.observers.len();
        hooks.observers.retain(|(hook, _)| *hook != id);
        hooks.observers.len() != before
    })
}

/// Number of installed map observers.
pub fn map_observer_count() -> usize {
    HOOKS.with(|hooks| hooks.borrow().observers.len())
}

/// Deliver a map/unmap notification to every installed observer.
pub(crate) fn notify_map_observers(object: &Object, mapped: bool) {
    let observers: Vec<_> = HOOKS.with(|hooks| {
        hooks
            .borrow()
            .observers
            .iter()
            .map(|(_, o)| Rc::clone(o))
            .collect()
    });
    for observer in observers {
        observer.map_changed(object, mapped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{ClassTag, Object};
    use std::cell::Cell;

    #[test]
    fn handler_ids_are_unique() {
        let a = HandlerId::next();
        let b = HandlerId::next();
        assert_ne!(a, b);
    }

    #[test]
    fn connect_twice_yields_two_handles() {
        let obj = Object::new(ClassTag::Object);
        let a = obj.connect(SignalKind::Notify, |_, _| {});
        let b = obj.connect(SignalKind::Notify, |_, _| {});
        assert_ne!(a, b);
        assert_eq!(obj.handler_count(), 2);
    }

    #[test]
    fn emit_reaches_matching_handlers_only() {
        let obj = Object::new(ClassTag::Object);
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        obj.connect(SignalKind::Notify, move |_, _| h.set(h.get() + 1));
        obj.connect(SignalKind::Tick, |_, _| panic!("wrong signal"));
        obj.emit(SignalKind::Notify, &SignalPayload::Notify("x".into()));
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn disconnect_stops_delivery() {
        let obj = Object::new(ClassTag::Object);
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        let id = obj.connect(SignalKind::Notify, move |_, _| h.set(h.get() + 1));
        assert!(obj.disconnect(id));
        assert!(!obj.disconnect(id));
        obj.emit(SignalKind::Notify, &SignalPayload::None);
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn handler_may_disconnect_itself() {
        let obj = Object::new(ClassTag::Object);
        let slot: Rc<Cell<Option<HandlerId>>> = Rc::new(Cell::new(None));
        let s = slot.clone();
        let id = obj.connect(SignalKind::Notify, move |o, _| {
            if let Some(id) = s.get() {
                o.disconnect(id);
            }
        });
        slot.set(Some(id));
        obj.emit(SignalKind::Notify, &SignalPayload::None);
        assert_eq!(obj.handler_count(), 0);
    }

    struct Counter(Cell<usize>);

    impl MapObserver for Counter {
        fn map_changed(&self, _object: &Object, _mapped: bool) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn map_observer_install_and_remove() {
        let counter = Rc::new(Counter(Cell::new(0)));
        let before = map_observer_count();
        let id = install_map_observer(counter.clone());
        assert_eq!(map_observer_count(), before + 1);

        let label = Object::new(ClassTag::Label);
        label.map();
        label.unmap();
        assert_eq!(counter.0.get(), 2);

        assert!(remove_map_observer(id));
        assert!(!remove_map_observer(id));
        label.map();
        assert_eq!(counter.0.get(), 2);
    }
}
