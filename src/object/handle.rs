//! Object identity, strong/weak handles, properties, relations and weak
//! notifications.
//!
//! Objects are reference counted (`Rc`). Containers own their children and
//! typed relation slots own their targets; every back-edge (parent, owning
//! widget, focus widget) is weak. When the last strong reference goes away the
//! object's weak notifications fire from `Drop`, each receiving only the
//! [`ObjectId`] of the dying object.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use super::cell_layout::CellAttribute;
use super::class::ClassTag;
use super::frame_clock::FrameClockState;
use super::property::{Property, PropertyError, Value};
use super::signal::{HandlerId, SignalKind, SignalPayload, SignalTable};
use super::size_group::SizeGroupState;
use super::widget::{ControllerState, WidgetState};

thread_local! {
    static NEXT_OBJECT: Cell<u64> = const { Cell::new(1) };
    static NEXT_WEAK_NOTIFY: Cell<u64> = const { Cell::new(1) };
}

/// Strong handle to an object.
pub type ObjectRef = Rc<Object>;

// ---------------------------------------------------------------------------
// Ids
// ---------------------------------------------------------------------------

/// Stable identity of an object for as long as it lives. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u64);

impl ObjectId {
    fn next() -> Self {
        NEXT_OBJECT.with(|next| {
            let id = next.get();
            next.set(id + 1);
            ObjectId(id)
        })
    }

    /// The raw numeric value, for display.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

/// Token returned by [`Object::add_weak_notify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeakNotifyId(u64);

// ---------------------------------------------------------------------------
// WeakObject
// ---------------------------------------------------------------------------

/// Observer-only reference. Never keeps the object alive; remembers the id so
/// callers can still name the object after it died.
#[derive(Clone, Default)]
pub struct WeakObject {
    inner: Weak<Object>,
    id: Option<ObjectId>,
}

impl WeakObject {
    /// An empty handle that never upgrades.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upgrade(&self) -> Option<ObjectRef> {
        self.inner.upgrade()
    }

    pub fn id(&self) -> Option<ObjectId> {
        self.id
    }

    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}

impl fmt::Debug for WeakObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakObject")
            .field("id", &self.id)
            .field("alive", &self.is_alive())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Slots
// ---------------------------------------------------------------------------

/// Typed single-object relations an object may own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Model,
    Selection,
    Buffer,
    TagTable,
    Popup,
    Submenu,
    AppMenu,
    Menubar,
    /// The wrapped model of a sort/filter model.
    ChildModel,
    CellArea,
    FrameClock,
}

impl Slot {
    /// The relation label the inspector shows for children in this slot.
    pub fn label(self) -> &'static str {
        match self {
            Slot::Model | Slot::ChildModel => "model",
            Slot::Selection => "selection",
            Slot::Buffer => "buffer",
            Slot::TagTable => "tag-table",
            Slot::Popup => "popup",
            Slot::Submenu => "submenu",
            Slot::AppMenu => "app-menu",
            Slot::Menubar => "menubar",
            Slot::CellArea => "cell-area",
            Slot::FrameClock => "frame-clock",
        }
    }
}

// ---------------------------------------------------------------------------
// Object
// ---------------------------------------------------------------------------

#[derive(Default)]
pub(crate) struct ObjectState {
    pub(crate) buildable_id: Option<String>,
    pub(crate) properties: Vec<Property>,
    pub(crate) slots: Vec<(Slot, ObjectRef)>,
    /// Container children, tag-table tags, tree-view columns, cell-area
    /// renderers: the meaning depends on the class.
    pub(crate) items: Vec<ObjectRef>,
    pub(crate) attributes: Vec<CellAttribute>,
    pub(crate) widget: WidgetState,
    pub(crate) controller: Option<ControllerState>,
    pub(crate) frame_clock: Option<FrameClockState>,
    pub(crate) size_group: Option<SizeGroupState>,
}

type WeakNotify = Box<dyn FnOnce(ObjectId)>;

/// A toolkit object.
pub struct Object {
    id: ObjectId,
    class: ClassTag,
    this: Weak<Object>,
    pub(crate) state: RefCell<ObjectState>,
    signals: RefCell<SignalTable>,
    weak_notifies: RefCell<Vec<(WeakNotifyId, WeakNotify)>>,
    destroyed: Cell<bool>,
}

impl Object {
    /// Create a bare object of the given class with its default properties.
    pub fn new(class: ClassTag) -> ObjectRef {
        super::builder::ObjectBuilder::new(class).build()
    }

    /// Start building an object.
    pub fn builder(class: ClassTag) -> super::builder::ObjectBuilder {
        super::builder::ObjectBuilder::new(class)
    }

    pub(crate) fn with_state(class: ClassTag, state: ObjectState) -> ObjectRef {
        Rc::new_cyclic(|this| Object {
            id: ObjectId::next(),
            class,
            this: this.clone(),
            state: RefCell::new(state),
            signals: RefCell::new(SignalTable::default()),
            weak_notifies: RefCell::new(Vec::new()),
            destroyed: Cell::new(false),
        })
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn class(&self) -> ClassTag {
        self.class
    }

    pub fn is_a(&self, class: ClassTag) -> bool {
        self.class.is_a(class)
    }

    /// A weak handle to this object.
    pub fn downgrade(&self) -> WeakObject {
        WeakObject {
            inner: self.this.clone(),
            id: Some(self.id),
        }
    }

    /// A new strong handle, if the object is not already being finalized.
    pub fn to_ref(&self) -> Option<ObjectRef> {
        self.this.upgrade()
    }

    /// Number of strong references currently held.
    pub fn ref_count(&self) -> usize {
        self.this.strong_count()
    }

    /// The buildable id (the `#id` the object was created with), if any.
    pub fn buildable_id(&self) -> Option<String> {
        self.state.borrow().buildable_id.clone()
    }

    pub fn set_buildable_id(&self, id: impl Into<String>) {
        self.state.borrow_mut().buildable_id = Some(id.into());
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.get()
    }

    // ── Weak notifications ────────────────────────────────────────────

    /// Register a callback that runs when the object is finalized.
    pub fn add_weak_notify(&self, notify: impl FnOnce(ObjectId) + 'static) -> WeakNotifyId {
        let id = NEXT_WEAK_NOTIFY.with(|next| {
            let id = next.get();
            next.set(id + 1);
            WeakNotifyId(id)
        });
        self.weak_notifies.borrow_mut().push((id, Box::new(notify)));
        id
    }

    /// Unregister a weak notification. Returns `false` if it was not present.
    pub fn remove_weak_notify(&self, id: WeakNotifyId) -> bool {
        let mut notifies = self.weak_notifies.borrow_mut();
        let before = notifies.len();
        notifies.retain(|(n, _)| *n != id);
        notifies.len() != before
    }

    pub fn weak_notify_count(&self) -> usize {
        self.weak_notifies.borrow().len()
    }

    // ── Signals ───────────────────────────────────────────────────────

    /// Subscribe to `kind`. Every call yields a fresh handle.
    pub fn connect(
        &self,
        kind: SignalKind,
        handler: impl Fn(&Object, &SignalPayload) + 'static,
    ) -> HandlerId {
        self.signals.borrow_mut().connect(kind, Rc::new(handler))
    }

    pub fn disconnect(&self, id: HandlerId) -> bool {
        self.signals.borrow_mut().disconnect(id)
    }

    pub fn is_connected(&self, id: HandlerId) -> bool {
        self.signals.borrow().is_connected(id)
    }

    pub fn handler_count(&self) -> usize {
        self.signals.borrow().len()
    }

    /// Run every handler connected to `kind`. Emissions on a destroyed object
    /// are dropped.
    pub fn emit(&self, kind: SignalKind, payload: &SignalPayload) {
        if self.destroyed.get() && kind != SignalKind::Destroy {
            return;
        }
        let handlers = self.signals.borrow().snapshot(kind);
        for handler in handlers {
            handler(self, payload);
        }
    }

    // ── Properties ────────────────────────────────────────────────────

    /// Snapshot of every property, in installation order.
    pub fn properties(&self) -> Vec<Property> {
        self.state.borrow().properties.clone()
    }

    pub fn property(&self, name: &str) -> Option<Value> {
        self.state
            .borrow()
            .properties
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.clone())
    }

    pub(crate) fn str_property(&self, name: &str) -> Option<String> {
        match self.property(name) {
            Some(Value::Str(s)) => Some(s),
            _ => None,
        }
    }

    /// Set a writable property and emit `Notify(name)`.
    pub fn set_property(&self, name: &str, value: Value) -> Result<(), PropertyError> {
        {
            let mut state = self.state.borrow_mut();
            let prop = state
                .properties
                .iter_mut()
                .find(|p| p.name == name)
                .ok_or_else(|| PropertyError::UnknownProperty(name.to_owned()))?;
            if !prop.writable {
                return Err(PropertyError::ReadOnly(name.to_owned()));
            }
            if !prop.value.same_type(&value) {
                return Err(PropertyError::TypeMismatch {
                    property: name.to_owned(),
                    expected: prop.value.type_name(),
                    actual: value.type_name(),
                });
            }
            prop.value = value;
        }
        self.notify(name);
        Ok(())
    }

    /// Store a property value without the writability check. Installs the
    /// property if it does not exist yet. Emits `Notify(name)` when the value
    /// changed.
    pub(crate) fn store_property(&self, name: &str, value: Value) {
        let changed = {
            let mut state = self.state.borrow_mut();
            match state.properties.iter_mut().find(|p| p.name == name) {
                Some(prop) if prop.value == value => false,
                Some(prop) => {
                    prop.value = value;
                    true
                }
                None => {
                    state
                        .properties
                        .push(Property::new(name, value, self.class).read_only());
                    true
                }
            }
        };
        if changed {
            self.notify(name);
        }
    }

    pub(crate) fn install_property(&self, property: Property) {
        let mut state = self.state.borrow_mut();
        if !state.properties.iter().any(|p| p.name == property.name) {
            state.properties.push(property);
        }
    }

    /// Emit `Notify(name)`.
    pub fn notify(&self, name: &str) {
        self.emit(SignalKind::Notify, &SignalPayload::Notify(name.to_owned()));
    }

    // ── Relations ─────────────────────────────────────────────────────

    pub fn slot(&self, slot: Slot) -> Option<ObjectRef> {
        self.state
            .borrow()
            .slots
            .iter()
            .find(|(s, _)| *s == slot)
            .map(|(_, obj)| Rc::clone(obj))
    }

    /// Replace (or clear) the object held in `slot`. Returns the old one.
    pub fn set_slot(&self, slot: Slot, target: Option<&ObjectRef>) -> Option<ObjectRef> {
        let old = {
            let mut state = self.state.borrow_mut();
            let old = state
                .slots
                .iter()
                .position(|(s, _)| *s == slot)
                .map(|pos| state.slots.remove(pos).1);
            if let Some(target) = target {
                state.slots.push((slot, Rc::clone(target)));
            }
            old
        };
        self.notify(slot.label());
        old
    }

    /// Owned member objects (children, tags, columns, renderers).
    pub fn items(&self) -> Vec<ObjectRef> {
        self.state.borrow().items.clone()
    }

    /// Append a non-widget member (a tag to a table, a column to a tree view,
    /// a renderer to a cell area).
    pub fn append_item(&self, item: &ObjectRef) {
        self.state.borrow_mut().items.push(Rc::clone(item));
    }

    /// Remove a member. Returns the owned handle so the caller decides whether
    /// it lives on.
    pub fn remove_item(&self, item: &Object) -> Option<ObjectRef> {
        let mut state = self.state.borrow_mut();
        let pos = state.items.iter().position(|i| i.id() == item.id())?;
        Some(state.items.remove(pos))
    }

    // ── Destruction ───────────────────────────────────────────────────

    /// Emit `Destroy`, detach from the parent and release every owned
    /// reference. Further emissions are dropped.
    pub fn destroy(&self) {
        if self.destroyed.replace(true) {
            return;
        }
        self.emit(SignalKind::Destroy, &SignalPayload::None);

        let parent = self.state.borrow().widget.parent.upgrade();
        // Keep ourselves alive until the end of this call even if the parent
        // held the last reference.
        let _guard = self.to_ref();
        if let Some(parent) = parent {
            parent.remove(self);
        }

        let released = {
            let mut state = self.state.borrow_mut();
            state.widget.parent = WeakObject::new();
            state.widget.controllers.clear();
            (
                std::mem::take(&mut state.items),
                std::mem::take(&mut state.slots),
            )
        };
        for child in &released.0 {
            child.destroy();
        }
        self.signals.borrow_mut().clear();
        drop(released);
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Object {}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("id", &self.id)
            .field("class", &self.class)
            .field("buildable_id", &self.state.borrow().buildable_id)
            .finish()
    }
}

impl Drop for Object {
    fn drop(&mut self) {
        let notifies = std::mem::take(self.weak_notifies.get_mut());
        for (_, notify) in notifies {
            notify(self.id);
        }
    }
}
