//! Typed per-object relations the tree attaches while scanning.
//!
//! One table per relation, keyed by object identity. Values are weak. The
//! third relation, object → row, lives in [`ObjectTree`](super::ObjectTree).

use std::collections::HashMap;

use crate::object::{Object, ObjectId, ObjectRef, WeakObject};

#[derive(Debug, Default)]
pub struct SideTables {
    synthetic_parent: HashMap<ObjectId, WeakObject>,
    cell_layout_owner: HashMap<ObjectId, WeakObject>,
}

impl SideTables {
    /// Remember the object that enumerated `child`.
    pub fn set_synthetic_parent(&mut self, child: &Object, parent: &Object) {
        self.synthetic_parent.insert(child.id(), parent.downgrade());
    }

    pub fn synthetic_parent(&self, child: &Object) -> Option<ObjectRef> {
        self.synthetic_parent.get(&child.id())?.upgrade()
    }

    /// Record the cell layout an area or renderer belongs to.
    pub fn set_cell_layout_owner(&mut self, cell: &Object, layout: &Object) {
        self.cell_layout_owner.insert(cell.id(), layout.downgrade());
    }

    pub fn cell_layout_owner(&self, cell: &Object) -> Option<ObjectRef> {
        self.cell_layout_owner.get(&cell.id())?.upgrade()
    }

    /// Drop every entry keyed by `id`.
    pub fn forget(&mut self, id: ObjectId) {
        self.synthetic_parent.remove(&id);
        self.cell_layout_owner.remove(&id);
    }

    pub fn clear(&mut self) {
        self.synthetic_parent.clear();
        self.cell_layout_owner.clear();
    }

    pub fn len(&self) -> usize {
        self.synthetic_parent.len() + self.cell_layout_owner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::ClassTag;

    #[test]
    fn entries_are_weak() {
        let mut tables = SideTables::default();
        let child = Object::new(ClassTag::ListStore);
        let parent = Object::new(ClassTag::TreeView);
        tables.set_synthetic_parent(&child, &parent);
        assert_eq!(tables.synthetic_parent(&child).unwrap().id(), parent.id());
        drop(parent);
        assert!(tables.synthetic_parent(&child).is_none());
    }

    #[test]
    fn forget_clears_both_relations() {
        let mut tables = SideTables::default();
        let renderer = Object::new(ClassTag::CellRendererText);
        let column = Object::new(ClassTag::TreeViewColumn);
        tables.set_synthetic_parent(&renderer, &column);
        tables.set_cell_layout_owner(&renderer, &column);
        assert_eq!(tables.len(), 2);
        tables.forget(renderer.id());
        assert!(tables.is_empty());
    }
}
