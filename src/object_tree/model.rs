//! The live object tree.
//!
//! Rows are snapshots of tracked objects held in a [`Forest`]. Each object
//! appears at most once; an identity index gives O(1) lookup. The model never
//! holds a strong reference to a tracked object.

use std::collections::HashMap;

use tracing::debug;

use crate::object::{Object, ObjectId, ObjectRef};
use crate::tree::{Forest, TreeNavigation};

use super::registry;
use super::row::{Row, RowField, RowId};
use super::side_tables::SideTables;

/// Structural change notifications, drained by whoever mirrors the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeEvent {
    Inserted(RowId),
    Changed(RowId),
    Removed { row: RowId, object: ObjectId },
}

#[derive(Debug, Default)]
pub struct ObjectTree {
    rows: Forest<RowId, Row>,
    index: HashMap<ObjectId, RowId>,
    tables: SideTables,
    events: Vec<TreeEvent>,
}

impl ObjectTree {
    /// Create an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Append every root in order.
    pub fn seed(&mut self, roots: &[ObjectRef]) -> Vec<RowId> {
        roots
            .iter()
            .map(|root| self.append_under(None, root, None))
            .collect()
    }

    /// Register `object` under `parent` (or as a root) and recursively
    /// register its logical children. An object already in the tree keeps
    /// its row, which is returned unchanged.
    ///
    /// # Panics
    ///
    /// Panics if `parent` is not a row of this tree.
    pub fn append_under(&mut self, parent: Option<RowId>, object: &Object, name: Option<&str>) -> RowId {
        if let Some(&row) = self.index.get(&object.id()) {
            return row;
        }
        if let Some(parent) = parent {
            assert!(self.rows.contains(parent), "parent row does not exist");
        }
        let row = self.insert_row(parent, object, name);
        self.append_children(row, object);
        row
    }

    fn insert_row(&mut self, parent: Option<RowId>, object: &Object, name: Option<&str>) -> RowId {
        let data = Row::snapshot(object, name, registry::sensitive(object));
        debug!(object = %object.id(), title = %data.title, "row inserted");
        let row = match parent {
            Some(parent) => self.rows.insert_child(parent, data),
            None => self.rows.insert_root(data),
        };
        self.index.insert(object.id(), row);
        self.events.push(TreeEvent::Inserted(row));
        row
    }

    fn append_children(&mut self, row: RowId, object: &Object) {
        for (child, label) in registry::children(object, &mut self.tables) {
            // Shared objects stay under whichever parent listed them first.
            if self.index.contains_key(&child.id()) {
                continue;
            }
            self.tables.set_synthetic_parent(&child, object);
            let child_row = self.insert_row(Some(row), &child, label.as_deref());
            self.append_children(child_row, &child);
        }
    }

    /// Remove `row` and its subtree. Returns the removed rows in pre-order;
    /// empty if `row` does not exist.
    pub fn remove(&mut self, row: RowId) -> Vec<Row> {
        let removed = self.rows.remove(row);
        removed
            .into_iter()
            .map(|(id, data)| {
                if self.index.get(&data.object_id) == Some(&id) {
                    self.index.remove(&data.object_id);
                }
                self.tables.forget(data.object_id);
                debug!(object = %data.object_id, title = %data.title, "row removed");
                self.events.push(TreeEvent::Removed {
                    row: id,
                    object: data.object_id,
                });
                data
            })
            .collect()
    }

    /// Remove the row tracking `id`, if any.
    pub fn remove_object(&mut self, id: ObjectId) -> Vec<Row> {
        match self.find_id(id) {
            Some(row) => self.remove(row),
            None => Vec::new(),
        }
    }

    /// Remove every row.
    pub fn clear(&mut self) -> Vec<Row> {
        let roots = self.rows.roots().to_vec();
        let removed = roots.into_iter().flat_map(|r| self.remove(r)).collect();
        self.tables.clear();
        removed
    }

    /// Overwrite one cached field. Emits [`TreeEvent::Changed`] when the value
    /// differs. Returns whether it did.
    pub fn update_field(&mut self, row: RowId, field: RowField) -> bool {
        let Some(data) = self.rows.get_mut(row) else {
            return false;
        };
        let changed = field.apply(data);
        if changed {
            self.events.push(TreeEvent::Changed(row));
        }
        changed
    }

    /// Re-read label, style classes and sensitivity from the live object.
    pub fn refresh(&mut self, row: RowId) -> bool {
        let Some(object) = self.rows.get(row).and_then(|r| r.object.upgrade()) else {
            return false;
        };
        let fields = [
            RowField::Label(object.text_content().unwrap_or_default()),
            RowField::StyleClasses(object.style_classes().join(" ")),
            RowField::Sensitive(registry::sensitive(&object)),
        ];
        let mut changed = false;
        for field in fields {
            changed |= self.update_field(row, field);
        }
        changed
    }

    pub(crate) fn bindings_mut(&mut self, row: RowId) -> Option<&mut Vec<super::row::Binding>> {
        self.rows.get_mut(row).map(|r| &mut r.bindings)
    }

    /// Take the pending change notifications.
    pub fn drain_events(&mut self) -> Vec<TreeEvent> {
        std::mem::take(&mut self.events)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// The row tracking `object`, if any.
    pub fn find(&self, object: &Object) -> Option<RowId> {
        self.find_id(object.id())
    }

    /// The row tracking the object with identity `id`. Works after the
    /// object died, until its row is removed.
    pub fn find_id(&self, id: ObjectId) -> Option<RowId> {
        self.index.get(&id).copied()
    }

    /// Get a row's cached fields, if it exists.
    pub fn get(&self, row: RowId) -> Option<&Row> {
        self.rows.get(row)
    }

    /// Check whether `row` is still in the model.
    pub fn contains(&self, row: RowId) -> bool {
        self.rows.contains(row)
    }

    /// Number of tracked objects.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// `true` if nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Top-level rows in insertion order.
    pub fn roots(&self) -> &[RowId] {
        self.rows.roots()
    }

    /// Get the parent row. `None` for roots and removed rows.
    pub fn parent(&self, row: RowId) -> Option<RowId> {
        self.rows.parent(row)
    }

    /// Child rows in registry order. Empty if `row` has none or was removed.
    pub fn children(&self, row: RowId) -> &[RowId] {
        self.rows.children(row)
    }

    /// Number of ancestors: roots have depth 0.
    pub fn depth(&self, row: RowId) -> usize {
        self.rows.depth(row)
    }

    /// Sibling indices from the root down to `row`.
    pub fn path(&self, row: RowId) -> Vec<usize> {
        self.rows.path(row)
    }

    /// Whether `ancestor` is `row` or one of its ancestors.
    pub fn is_ancestor_or_self(&self, ancestor: RowId, row: RowId) -> bool {
        self.rows.is_ancestor_or_self(ancestor, row)
    }

    /// Visit `row` and its descendants in depth-first pre-order.
    pub fn for_each_descendant(&self, row: RowId, mut visit: impl FnMut(RowId, &Row)) {
        for id in self.rows.walk_depth_first(row) {
            if let Some(data) = self.rows.get(id) {
                visit(id, data);
            }
        }
    }

    /// Every row in depth-first pre-order.
    pub fn iter(&self) -> impl Iterator<Item = (RowId, &Row)> + '_ {
        self.rows
            .walk_all()
            .into_iter()
            .filter_map(move |id| self.rows.get(id).map(|data| (id, data)))
    }

    /// Side tables filled in while appending rows.
    pub fn tables(&self) -> &SideTables {
        &self.tables
    }

    /// The logical parent of `object` per the registry and side tables.
    pub fn logical_parent(&self, object: &Object) -> Option<ObjectRef> {
        registry::parent(object, &self.tables)
    }

    /// Flatten to `(parent index, name)` pairs in depth-first pre-order.
    pub fn to_pairs(&self) -> Vec<(Option<usize>, String)> {
        let order = self.rows.walk_all();
        let position: HashMap<RowId, usize> =
            order.iter().enumerate().map(|(i, &row)| (row, i)).collect();
        order
            .iter()
            .filter_map(|&row| {
                let data = self.rows.get(row)?;
                let parent = self.rows.parent(row).and_then(|p| position.get(&p).copied());
                Some((parent, data.name.clone()))
            })
            .collect()
    }
}

impl TreeNavigation for ObjectTree {
    type Row = RowId;

    fn first_root(&self) -> Option<RowId> {
        self.rows.first_root()
    }

    fn last_root(&self) -> Option<RowId> {
        self.rows.last_root()
    }

    fn first_child(&self, row: RowId) -> Option<RowId> {
        self.rows.first_child(row)
    }

    fn last_child(&self, row: RowId) -> Option<RowId> {
        self.rows.last_child(row)
    }

    fn next_sibling(&self, row: RowId) -> Option<RowId> {
        self.rows.next_sibling(row)
    }

    fn prev_sibling(&self, row: RowId) -> Option<RowId> {
        self.rows.prev_sibling(row)
    }

    fn parent_row(&self, row: RowId) -> Option<RowId> {
        self.rows.parent(row)
    }

    fn contains_row(&self, row: RowId) -> bool {
        self.rows.contains(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{ClassTag, Slot};
    use std::rc::Rc;

    fn names(tree: &ObjectTree, row: RowId) -> Vec<String> {
        let mut out = Vec::new();
        tree.for_each_descendant(row, |_, r| out.push(r.name.clone()));
        out
    }

    #[test]
    fn append_recurses_through_registry() {
        let window = Object::builder(ClassTag::Window).id("main").build();
        let label = Object::builder(ClassTag::Label).label("hi").build();
        window.add(&label);

        let mut tree = ObjectTree::new();
        let root = tree.append_under(None, &window, None);
        assert_eq!(names(&tree, root), vec!["main", "frame-clock", "GiltLabel"]);
        let label_row = tree.find(&label).unwrap();
        assert_eq!(tree.get(label_row).unwrap().label, "hi");
        assert_eq!(tree.parent(label_row), Some(root));
        assert_eq!(tree.depth(label_row), 1);
    }

    #[test]
    fn append_is_idempotent() {
        let store = Object::new(ClassTag::ListStore);
        let mut tree = ObjectTree::new();
        let a = tree.append_under(None, &store, None);
        let before = tree.to_pairs();
        let b = tree.append_under(None, &store, None);
        assert_eq!(a, b);
        assert_eq!(tree.to_pairs(), before);
    }

    #[test]
    fn shared_model_stays_with_first_parent() {
        let store = Object::new(ClassTag::ListStore);
        let first = Object::new(ClassTag::TreeView);
        let second = Object::new(ClassTag::TreeView);
        first.set_slot(Slot::Model, Some(&store));
        second.set_slot(Slot::Model, Some(&store));

        let mut tree = ObjectTree::new();
        let a = tree.append_under(None, &first, None);
        let b = tree.append_under(None, &second, None);
        let store_row = tree.find(&store).unwrap();
        assert_eq!(tree.parent(store_row), Some(a));
        assert!(tree.children(b).is_empty());
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn remove_takes_subtree_and_index() {
        let window = Object::new(ClassTag::Window);
        let label = Object::new(ClassTag::Label);
        window.add(&label);
        let mut tree = ObjectTree::new();
        let root = tree.append_under(None, &window, None);
        tree.drain_events();

        let removed = tree.remove(root);
        assert_eq!(removed.len(), 3);
        assert!(tree.is_empty());
        assert!(tree.find(&label).is_none());
        assert!(tree.tables().is_empty());
        assert_eq!(tree.drain_events().len(), 3);
        assert!(tree.remove(root).is_empty());
    }

    #[test]
    fn synthetic_parents_recorded_for_non_widgets() {
        let view = Object::new(ClassTag::TreeView);
        let store = Object::new(ClassTag::ListStore);
        view.set_slot(Slot::Model, Some(&store));
        let mut tree = ObjectTree::new();
        tree.append_under(None, &view, None);
        assert_eq!(tree.logical_parent(&store).unwrap().id(), view.id());
        assert_eq!(tree.get(tree.find(&store).unwrap()).unwrap().name, "model");
    }

    #[test]
    fn update_field_emits_changed_once() {
        let label = Object::new(ClassTag::Label);
        let mut tree = ObjectTree::new();
        let row = tree.append_under(None, &label, None);
        tree.drain_events();
        assert!(tree.update_field(row, RowField::Label("x".into())));
        assert!(!tree.update_field(row, RowField::Label("x".into())));
        assert_eq!(tree.drain_events(), vec![TreeEvent::Changed(row)]);
    }

    #[test]
    fn refresh_reads_live_object() {
        let label = Object::builder(ClassTag::Label).label("a").build();
        let mut tree = ObjectTree::new();
        let row = tree.append_under(None, &label, None);
        label.set_label("b");
        label.add_style_class("dim");
        assert!(tree.refresh(row));
        let data = tree.get(row).unwrap();
        assert_eq!(data.label, "b");
        assert_eq!(data.style_classes, "dim");
    }

    #[test]
    fn model_never_holds_strong_refs() {
        let window = Object::new(ClassTag::Window);
        let mut tree = ObjectTree::new();
        tree.append_under(None, &window, None);
        assert_eq!(Rc::strong_count(&window), 1);
    }

    #[test]
    fn pairs_follow_pre_order() {
        let window = Object::builder(ClassTag::Window).id("w").build();
        let label = Object::builder(ClassTag::Label).id("l").build();
        window.add(&label);
        let mut tree = ObjectTree::new();
        tree.append_under(None, &window, None);
        assert_eq!(
            tree.to_pairs(),
            vec![
                (None, "w".to_string()),
                (Some(0), "frame-clock".to_string()),
                (Some(0), "l".to_string()),
            ]
        );
    }
}
