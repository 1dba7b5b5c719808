//! Stateful pre-order cursor over any ordered tree.
//!
//! The walker does not borrow its tree between calls: every step takes the
//! tree by reference, so the tree can change while a cursor is held. Callers
//! that remove rows must call [`TreeWalker::forget_subtree`] first.

/// Read-only ordered-tree navigation the walker needs.
pub trait TreeNavigation {
    type Row: Copy + Eq;

    fn first_root(&self) -> Option<Self::Row>;
    fn last_root(&self) -> Option<Self::Row>;
    fn first_child(&self, row: Self::Row) -> Option<Self::Row>;
    fn last_child(&self, row: Self::Row) -> Option<Self::Row>;
    fn next_sibling(&self, row: Self::Row) -> Option<Self::Row>;
    fn prev_sibling(&self, row: Self::Row) -> Option<Self::Row>;
    fn parent_row(&self, row: Self::Row) -> Option<Self::Row>;
    fn contains_row(&self, row: Self::Row) -> bool;

    /// Pre-order successor of `row`.
    fn pre_order_next(&self, row: Self::Row) -> Option<Self::Row> {
        if let Some(child) = self.first_child(row) {
            return Some(child);
        }
        let mut current = row;
        loop {
            if let Some(next) = self.next_sibling(current) {
                return Some(next);
            }
            current = self.parent_row(current)?;
        }
    }

    /// Pre-order predecessor of `row`: the previous sibling's deepest last
    /// descendant, else the parent.
    fn pre_order_prev(&self, row: Self::Row) -> Option<Self::Row> {
        match self.prev_sibling(row) {
            Some(prev) => Some(self.deepest_last(prev)),
            None => self.parent_row(row),
        }
    }

    /// The last row in pre-order under (and including) `row`.
    fn deepest_last(&self, row: Self::Row) -> Self::Row {
        let mut current = row;
        while let Some(last) = self.last_child(current) {
            current = last;
        }
        current
    }
}

type Predicate<T, D> = Box<dyn Fn(&T, <T as TreeNavigation>::Row, &D) -> bool>;

/// A cursor plus a match predicate.
pub struct TreeWalker<T: TreeNavigation, D = ()> {
    cursor: Option<T::Row>,
    visited: bool,
    predicate: Predicate<T, D>,
    data: D,
}

impl<T: TreeNavigation, D> TreeWalker<T, D> {
    pub fn new(predicate: impl Fn(&T, T::Row, &D) -> bool + 'static, data: D) -> Self {
        Self {
            cursor: None,
            visited: false,
            predicate: Box::new(predicate),
            data,
        }
    }

    pub fn set_predicate(&mut self, predicate: impl Fn(&T, T::Row, &D) -> bool + 'static) {
        self.predicate = Box::new(predicate);
    }

    pub fn data(&self) -> &D {
        &self.data
    }

    pub fn set_data(&mut self, data: D) {
        self.data = data;
    }

    /// The current row, if the walker has visited one.
    pub fn cursor(&self) -> Option<T::Row> {
        if self.visited {
            self.cursor
        } else {
            None
        }
    }

    /// Place the cursor at `row` (marked visited) or clear it.
    pub fn reset(&mut self, row: Option<T::Row>) {
        self.visited = row.is_some();
        self.cursor = row;
    }

    /// Clear the cursor if it sits at `removed` or anywhere beneath it.
    pub fn forget_subtree(&mut self, tree: &T, removed: T::Row) {
        let Some(cursor) = self.cursor() else {
            return;
        };
        let mut current = Some(cursor);
        while let Some(row) = current {
            if row == removed {
                self.reset(None);
                return;
            }
            current = tree.parent_row(row);
        }
    }

    fn live_cursor(&mut self, tree: &T) -> Option<T::Row> {
        let cursor = self.cursor()?;
        if tree.contains_row(cursor) {
            Some(cursor)
        } else {
            self.reset(None);
            None
        }
    }

    /// Advance one row in pre-order. An unvisited walker seeds at the first
    /// root. Returns `false` (cursor unchanged) at the end of the tree.
    pub fn step_forward(&mut self, tree: &T) -> bool {
        let next = match self.live_cursor(tree) {
            None => tree.first_root(),
            Some(row) => tree.pre_order_next(row),
        };
        self.land(next)
    }

    /// Retreat one row in pre-order. An unvisited walker seeds at the last
    /// row of the tree. Returns `false` (cursor unchanged) at the start.
    pub fn step_back(&mut self, tree: &T) -> bool {
        let prev = match self.live_cursor(tree) {
            None => tree.last_root().map(|root| tree.deepest_last(root)),
            Some(row) => tree.pre_order_prev(row),
        };
        self.land(prev)
    }

    fn land(&mut self, row: Option<T::Row>) -> bool {
        match row {
            Some(row) => {
                self.reset(Some(row));
                true
            }
            None => false,
        }
    }

    /// Find the next row satisfying the predicate.
    ///
    /// Without `force_move` the current row is tested first. With
    /// `backwards` the search runs in reverse pre-order. On failure the
    /// cursor is left where it was.
    pub fn next_match(&mut self, tree: &T, force_move: bool, backwards: bool) -> Option<T::Row> {
        let saved = (self.cursor, self.visited);

        if !force_move {
            if let Some(row) = self.live_cursor(tree) {
                if (self.predicate)(tree, row, &self.data) {
                    return Some(row);
                }
            }
        }

        loop {
            let moved = if backwards {
                self.step_back(tree)
            } else {
                self.step_forward(tree)
            };
            if !moved {
                (self.cursor, self.visited) = saved;
                return None;
            }
            let row = self.cursor?;
            if (self.predicate)(tree, row, &self.data) {
                return Some(row);
            }
        }
    }
}

impl<T: TreeNavigation, D: std::fmt::Debug> std::fmt::Debug for TreeWalker<T, D>
where
    T::Row: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeWalker")
            .field("cursor", &self.cursor)
            .field("visited", &self.visited)
            .field("data", &self.data)
            .finish_non_exhaustive()
    }
}
