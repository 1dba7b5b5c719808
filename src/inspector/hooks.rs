//! Observers the inspector installs on tracked objects.
//!
//! Every closure captures a weak handle to the inspector plus the object's
//! identity. Nothing here holds a tracked object or the inspector alive.

use std::rc::{Rc, Weak};

use tracing::trace;

use crate::object::{
    HandlerId, MapObserver, Object, SignalKind, SignalPayload, WeakNotifyId, WeakObject,
};
use crate::object_tree::{Binding, Row};
use crate::pages::ObjectChange;

use super::lifecycle::{Pending, Shared};

/// Global map/unmap observer. Installed once per inspector.
pub(crate) struct MapHook {
    pub(crate) shared: Weak<Shared>,
}

impl MapObserver for MapHook {
    fn map_changed(&self, object: &Object, mapped: bool) {
        trace!(object = %object.id(), mapped, "map hook");
        schedule(&self.shared, Pending::Changed(object.id(), ObjectChange::Mapped(mapped)));
    }
}

fn schedule(shared: &Weak<Shared>, pending: Pending) {
    if let Some(shared) = shared.upgrade() {
        shared.schedule(pending);
    }
}

fn on_signal(
    object: &Object,
    weak: &Weak<Shared>,
    kind: SignalKind,
    change: ObjectChange,
) -> Binding {
    let weak = Weak::clone(weak);
    let id = object.id();
    Binding::Signal(object.connect(kind, move |_, _| {
        schedule(&weak, Pending::Changed(id, change.clone()));
    }))
}

/// Attach the per-row observers for `object`.
pub(crate) fn bind_row(shared: &Rc<Shared>, object: &Object) -> Vec<Binding> {
    let weak = Rc::downgrade(shared);
    let id = object.id();
    let mut bindings = Vec::new();

    let finalized = Weak::clone(&weak);
    bindings.push(Binding::WeakNotify(object.add_weak_notify(move |id| {
        schedule(&finalized, Pending::Finalized(id));
    })));

    let notified = Weak::clone(&weak);
    bindings.push(Binding::Signal(object.connect(
        SignalKind::Notify,
        move |_, payload| {
            if let SignalPayload::Notify(name) = payload {
                schedule(&notified, Pending::Changed(id, ObjectChange::Notify(name.clone())));
            }
        },
    )));

    let class = object.class();
    if class.is_widget() {
        bindings.push(on_signal(object, &weak, SignalKind::StateFlagsChanged, ObjectChange::StateFlags));
        bindings.push(on_signal(object, &weak, SignalKind::SizeAllocate, ObjectChange::Allocation));

        let destroyed = Weak::clone(&weak);
        bindings.push(Binding::Signal(object.connect(SignalKind::Destroy, move |_, _| {
            schedule(&destroyed, Pending::Finalized(id));
        })));

        if let Some(node) = object.css_node() {
            let styled = Weak::clone(&weak);
            let handler = node.connect_style_changed(move |_, _| {
                schedule(&styled, Pending::Changed(id, ObjectChange::Style));
            });
            bindings.push(Binding::Style {
                node: Rc::downgrade(&node),
                handler,
            });
        }
    }
    if class.is_toplevel() {
        bindings.push(on_signal(object, &weak, SignalKind::SetFocus, ObjectChange::Focus));
    }
    bindings
}

/// Observers on the selected object, tracked or not. Finalizing or
/// destroying it drops the selection.
pub(crate) struct SelectionWatch {
    object: WeakObject,
    notify: WeakNotifyId,
    destroy: HandlerId,
}

impl SelectionWatch {
    pub(crate) fn new(shared: &Rc<Shared>, object: &Object) -> Self {
        let finalized = Rc::downgrade(shared);
        let notify = object.add_weak_notify(move |id| {
            schedule(&finalized, Pending::Deselect(id));
        });
        let destroyed = Rc::downgrade(shared);
        let id = object.id();
        let destroy = object.connect(SignalKind::Destroy, move |_, _| {
            schedule(&destroyed, Pending::Deselect(id));
        });
        Self {
            object: object.downgrade(),
            notify,
            destroy,
        }
    }

    /// Disconnect from the object, if it is still alive.
    pub(crate) fn release(self) {
        if let Some(object) = self.object.upgrade() {
            object.remove_weak_notify(self.notify);
            object.disconnect(self.destroy);
        }
    }
}

/// Release the bindings of removed rows. Objects already in finalization
/// are skipped; their handlers die with them.
pub(crate) fn unbind_rows(rows: &[Row]) {
    for row in rows {
        let object = row.object.upgrade();
        for binding in row.bindings() {
            match binding {
                Binding::Signal(handler) => {
                    if let Some(object) = &object {
                        object.disconnect(*handler);
                    }
                }
                Binding::WeakNotify(notify) => {
                    if let Some(object) = &object {
                        object.remove_weak_notify(*notify);
                    }
                }
                Binding::Style { node, handler } => {
                    if let Some(node) = node.upgrade() {
                        node.disconnect(*handler);
                    }
                }
            }
        }
    }
}
