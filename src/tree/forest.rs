//! Slotmap-backed ordered forest.
//!
//! Rows live in a single `SlotMap`; parent and child edges are kept in
//! secondary maps so removing a subtree is O(subtree) and lookups are O(1).
//! Sibling order is insertion order. Several roots are allowed.

use slotmap::{Key, SecondaryMap, SlotMap};

use super::walker::TreeNavigation;

/// An ordered forest keyed by `K`.
#[derive(Debug, Clone)]
pub struct Forest<K: Key, T> {
    rows: SlotMap<K, T>,
    children: SecondaryMap<K, Vec<K>>,
    parent: SecondaryMap<K, K>,
    roots: Vec<K>,
}

impl<K: Key, T> Forest<K, T> {
    /// Create an empty forest.
    pub fn new() -> Self {
        Self {
            rows: SlotMap::with_key(),
            children: SecondaryMap::new(),
            parent: SecondaryMap::new(),
            roots: Vec::new(),
        }
    }

    /// Append a row after the last root.
    pub fn insert_root(&mut self, data: T) -> K {
        let id = self.rows.insert(data);
        self.children.insert(id, Vec::new());
        self.roots.push(id);
        id
    }

    /// Append a row after the last child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if `parent` is not in the forest.
    pub fn insert_child(&mut self, parent: K, data: T) -> K {
        assert!(self.rows.contains_key(parent), "parent row does not exist");
        let id = self.rows.insert(data);
        self.children.insert(id, Vec::new());
        self.parent.insert(id, parent);
        if let Some(siblings) = self.children.get_mut(parent) {
            siblings.push(id);
        }
        id
    }

    /// Remove `id` and its whole subtree. Returns the removed rows in
    /// depth-first pre-order; empty if `id` does not exist.
    pub fn remove(&mut self, id: K) -> Vec<(K, T)> {
        if !self.rows.contains_key(id) {
            return Vec::new();
        }
        match self.parent.get(id).copied() {
            Some(parent) => {
                if let Some(siblings) = self.children.get_mut(parent) {
                    siblings.retain(|&c| c != id);
                }
            }
            None => self.roots.retain(|&r| r != id),
        }

        let order = self.walk_depth_first(id);
        let mut removed = Vec::with_capacity(order.len());
        for row in order {
            self.children.remove(row);
            self.parent.remove(row);
            if let Some(data) = self.rows.remove(row) {
                removed.push((row, data));
            }
        }
        removed
    }

    /// Remove every row. Returns them in depth-first pre-order.
    pub fn clear(&mut self) -> Vec<(K, T)> {
        let roots = self.roots.clone();
        roots.into_iter().flat_map(|r| self.remove(r)).collect()
    }

    /// Get a reference to a row's data, if it exists.
    pub fn get(&self, id: K) -> Option<&T> {
        self.rows.get(id)
    }

    /// Get a mutable reference to a row's data, if it exists.
    pub fn get_mut(&mut self, id: K) -> Option<&mut T> {
        self.rows.get_mut(id)
    }

    /// Check whether `id` is a live row.
    pub fn contains(&self, id: K) -> bool {
        self.rows.contains_key(id)
    }

    /// Total number of rows, at every depth.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// `true` if the forest has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Top-level rows in insertion order.
    pub fn roots(&self) -> &[K] {
        &self.roots
    }

    /// Get the parent of a row. `None` for roots and unknown rows.
    pub fn parent(&self, id: K) -> Option<K> {
        self.parent.get(id).copied()
    }

    /// Children of `id`; empty if it has none or does not exist.
    pub fn children(&self, id: K) -> &[K] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Ancestors from the immediate parent up to the root.
    pub fn ancestors(&self, id: K) -> Vec<K> {
        std::iter::successors(self.parent(id), |&p| self.parent(p)).collect()
    }

    /// Number of ancestors: roots have depth 0.
    pub fn depth(&self, id: K) -> usize {
        self.ancestors(id).len()
    }

    /// Whether `ancestor` is `id` or one of its ancestors.
    pub fn is_ancestor_or_self(&self, ancestor: K, id: K) -> bool {
        id == ancestor || self.ancestors(id).contains(&ancestor)
    }

    fn siblings(&self, id: K) -> &[K] {
        match self.parent(id) {
            Some(parent) => self.children(parent),
            None => &self.roots,
        }
    }

    /// Index of `id` among its siblings.
    pub fn position(&self, id: K) -> Option<usize> {
        self.siblings(id).iter().position(|&s| s == id)
    }

    /// Sibling indices from the root down to `id`.
    pub fn path(&self, id: K) -> Vec<usize> {
        let mut path: Vec<usize> = std::iter::once(id)
            .chain(self.ancestors(id))
            .filter_map(|row| self.position(row))
            .collect();
        path.reverse();
        path
    }

    /// Depth-first pre-order from `start`, inclusive.
    pub fn walk_depth_first(&self, start: K) -> Vec<K> {
        let mut result = Vec::new();
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            if !self.rows.contains_key(current) {
                continue;
            }
            result.push(current);
            for &child in self.children(current).iter().rev() {
                stack.push(child);
            }
        }
        result
    }

    /// Depth-first pre-order over every root.
    pub fn walk_all(&self) -> Vec<K> {
        self.roots
            .iter()
            .flat_map(|&r| self.walk_depth_first(r))
            .collect()
    }
}

impl<K: Key, T> Default for Forest<K, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Key, T> TreeNavigation for Forest<K, T> {
    type Row = K;

    fn first_root(&self) -> Option<K> {
        self.roots.first().copied()
    }

    fn last_root(&self) -> Option<K> {
        self.roots.last().copied()
    }

    fn first_child(&self, row: K) -> Option<K> {
        self.children(row).first().copied()
    }

    fn last_child(&self, row: K) -> Option<K> {
        self.children(row).last().copied()
    }

    fn next_sibling(&self, row: K) -> Option<K> {
        let siblings = self.siblings(row);
        let pos = siblings.iter().position(|&s| s == row)?;
        siblings.get(pos + 1).copied()
    }

    fn prev_sibling(&self, row: K) -> Option<K> {
        let siblings = self.siblings(row);
        let pos = siblings.iter().position(|&s| s == row)?;
        pos.checked_sub(1).and_then(|p| siblings.get(p).copied())
    }

    fn parent_row(&self, row: K) -> Option<K> {
        self.parent(row)
    }

    fn contains_row(&self, row: K) -> bool {
        self.contains(row)
    }
}
