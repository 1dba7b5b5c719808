//! Shared inspector state and the deferred work queue.
//!
//! Weak callbacks, signal handlers and the map hook never touch the model
//! directly. They push a [`Pending`] item and ask for a flush. A flush that
//! finds the model already borrowed (the callback fired from inside another
//! operation) leaves the item queued; the outer operation flushes again once
//! its borrow is released.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::config::InspectorConfig;
use crate::object::{HookId, Object, ObjectId};
use crate::object_tree::{ObjectTree, Row, RowField, RowId, TreeEvent};
use crate::pages::{ObjectChange, PageContext};
use crate::tree::TreeWalker;

use super::hooks::{self, SelectionWatch};
use super::selection::SelectionBinder;

/// Work deferred from a callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Pending {
    /// The object is being finalized or was destroyed.
    Finalized(ObjectId),
    Changed(ObjectId, ObjectChange),
    /// The selected object is being finalized or was destroyed.
    Deselect(ObjectId),
}

pub(crate) type SearchWalker = TreeWalker<ObjectTree, String>;

pub(crate) struct Shared {
    pub(crate) config: InspectorConfig,
    pub(crate) tree: RefCell<ObjectTree>,
    pub(crate) walker: RefCell<SearchWalker>,
    pub(crate) selection: RefCell<SelectionBinder>,
    pub(crate) map_hook: Cell<Option<HookId>>,
    selection_watch: RefCell<Option<SelectionWatch>>,
    queue: RefCell<VecDeque<Pending>>,
    events: RefCell<Vec<TreeEvent>>,
    flushing: Cell<bool>,
}

/// Matches rows whose name, type name or label contains the search text.
#[allow(clippy::ptr_arg)]
pub(crate) fn text_search(tree: &ObjectTree, row: RowId, needle: &String) -> bool {
    tree.get(row).is_some_and(|r| r.matches_text(needle))
}

impl Shared {
    pub(crate) fn new(config: InspectorConfig) -> Self {
        Self {
            config,
            tree: RefCell::new(ObjectTree::new()),
            walker: RefCell::new(TreeWalker::new(text_search, String::new())),
            selection: RefCell::new(SelectionBinder::new()),
            map_hook: Cell::new(None),
            selection_watch: RefCell::new(None),
            queue: RefCell::new(VecDeque::new()),
            events: RefCell::new(Vec::new()),
            flushing: Cell::new(false),
        }
    }

    /// Queue `pending` and try to process it right away.
    pub(crate) fn schedule(self: &Rc<Self>, pending: Pending) {
        trace!(?pending, "scheduled");
        self.queue.borrow_mut().push_back(pending);
        self.flush();
    }

    /// Process queued work until the queue is empty or the model is busy.
    pub(crate) fn flush(self: &Rc<Self>) {
        if self.flushing.replace(true) {
            return;
        }
        loop {
            let Some(next) = self.queue.borrow_mut().pop_front() else {
                break;
            };
            let Ok(mut tree) = self.tree.try_borrow_mut() else {
                self.queue.borrow_mut().push_front(next);
                break;
            };
            match next {
                Pending::Finalized(id) => self.finalize(&mut tree, id),
                Pending::Changed(id, change) => self.apply_change(&mut tree, id, change),
                Pending::Deselect(id) => self.deselect(&tree, id),
            }
            self.absorb_events(&mut tree);
        }
        self.flushing.set(false);
    }

    pub(crate) fn queued(&self) -> usize {
        self.queue.borrow().len()
    }

    fn finalize(&self, tree: &mut ObjectTree, id: ObjectId) {
        // A parent's removal already took this row with it.
        let Some(row) = tree.find_id(id) else {
            return;
        };
        debug!(object = %id, "tracked object finalized");
        self.remove_rows(tree, row);
    }

    /// Remove `row` and its subtree, releasing bindings, the walker cursor
    /// and the selection as needed. Returns the number of rows removed.
    pub(crate) fn remove_rows(&self, tree: &mut ObjectTree, row: RowId) -> usize {
        self.walker.borrow_mut().forget_subtree(tree, row);
        let removed = tree.remove(row);
        hooks::unbind_rows(&removed);
        self.drop_selection_if_removed(tree, &removed);
        removed.len()
    }

    /// Bind the pages to `object` and watch it for finalization.
    pub(crate) fn select(self: &Rc<Self>, tree: &ObjectTree, object: Option<&Object>) {
        if let Some(watch) = self.selection_watch.take() {
            watch.release();
        }
        self.selection
            .borrow_mut()
            .set_selection(object, &PageContext::new(tree));
        if let Some(object) = object {
            *self.selection_watch.borrow_mut() = Some(SelectionWatch::new(self, object));
        }
    }

    /// Back to idle: no selection, all pages hidden.
    fn clear_selection(&self, tree: &ObjectTree) {
        let Ok(mut selection) = self.selection.try_borrow_mut() else {
            return;
        };
        if let Some(watch) = self.selection_watch.take() {
            watch.release();
        }
        selection.set_selection(None, &PageContext::new(tree));
        selection.set_scroll_target(None);
    }

    fn deselect(&self, tree: &ObjectTree, id: ObjectId) {
        let selected = self.selection.try_borrow().ok().and_then(|s| s.selected_id());
        if selected == Some(id) {
            debug!(object = %id, "selected object finalized");
            self.clear_selection(tree);
        }
    }

    pub(crate) fn drop_selection_if_removed(&self, tree: &ObjectTree, removed: &[Row]) {
        let selected = self.selection.try_borrow().ok().and_then(|s| s.selected_id());
        let Some(selected) = selected else {
            return;
        };
        if removed.iter().any(|r| r.object_id == selected) {
            self.clear_selection(tree);
        }
    }

    fn apply_change(&self, tree: &mut ObjectTree, id: ObjectId, change: ObjectChange) {
        let Some(row) = tree.find_id(id) else {
            return;
        };
        match &change {
            ObjectChange::Mapped(mapped) => {
                tree.update_field(row, RowField::Sensitive(*mapped));
            }
            ObjectChange::Notify(_) | ObjectChange::Style | ObjectChange::StateFlags => {
                tree.refresh(row);
            }
            ObjectChange::Allocation | ObjectChange::Focus => {}
        }

        let Ok(mut selection) = self.selection.try_borrow_mut() else {
            return;
        };
        if selection.selected_id() != Some(id) {
            return;
        }
        // Benign race: the signal outlived the object.
        let Some(object) = tree.get(row).and_then(|r| r.object.upgrade()) else {
            return;
        };
        selection.object_changed(&object, &change, &PageContext::new(tree));
    }

    /// Bind freshly inserted rows and keep every event for
    /// [`Inspector::take_events`](super::Inspector::take_events).
    pub(crate) fn absorb_events(self: &Rc<Self>, tree: &mut ObjectTree) {
        let events = tree.drain_events();
        for event in &events {
            let TreeEvent::Inserted(row) = *event else {
                continue;
            };
            let Some(object) = tree.get(row).and_then(|r| r.object.upgrade()) else {
                continue;
            };
            let bindings = hooks::bind_row(self, &object);
            if let Some(slot) = tree.bindings_mut(row) {
                slot.extend(bindings);
            }
        }
        self.events.borrow_mut().extend(events);
    }

    pub(crate) fn take_events(&self) -> Vec<TreeEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }
}
