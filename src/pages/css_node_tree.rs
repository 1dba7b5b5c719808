//! CSS node page: a secondary tree over the selected widget's style nodes
//! plus the computed style of one of them.
//!
//! Every tracked node carries a `style-changed` subscription. When it fires
//! the node's row is re-read, its child rows are resynced if the node's
//! children changed, and if the node is the one whose style is shown every
//! property row is rewritten in place. Property rows are created once,
//! sorted by name, and never inserted or removed afterwards.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use slotmap::new_key_type;
use tracing::trace;

use crate::object::{HandlerId, Object, StateFlags};
use crate::style::property::{self, PROPERTIES};
use crate::style::{ComputedStyle, CssNode, CssNodeId, CssNodeRef, StyleChange, StylePropertyId};
use crate::tree::Forest;

use super::{Page, PageContext};

new_key_type! {
    pub struct CssRowId;
}

/// Cached fields of one style node.
#[derive(Debug, Clone)]
pub struct CssRow {
    pub node_id: CssNodeId,
    pub name: String,
    pub visible: bool,
    pub classes: Vec<String>,
    pub id: Option<String>,
    pub state: StateFlags,
    node: Weak<CssNode>,
    handler: Option<HandlerId>,
}

impl CssRow {
    fn snapshot(node: &CssNodeRef) -> Self {
        Self {
            node_id: node.node_id(),
            name: node.name(),
            visible: node.visible(),
            classes: node.classes(),
            id: node.id(),
            state: node.state(),
            node: Rc::downgrade(node),
            handler: None,
        }
    }

    pub fn node(&self) -> Option<CssNodeRef> {
        self.node.upgrade()
    }

    /// `name#id.class:state`, as a selector would spell it.
    pub fn selector(&self) -> String {
        let mut out = self.name.clone();
        if let Some(id) = &self.id {
            out.push('#');
            out.push_str(id);
        }
        for class in &self.classes {
            out.push('.');
            out.push_str(class);
        }
        for state in self.state.names() {
            out.push(':');
            out.push_str(state);
        }
        out
    }
}

/// One computed style property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StylePropertyRow {
    pub id: StylePropertyId,
    pub name: &'static str,
    pub value: String,
    /// `file:line` of the winning declaration.
    pub location: Option<String>,
}

type Shared = Rc<RefCell<CssTreeState>>;

#[derive(Debug)]
struct CssTreeState {
    rows: Forest<CssRowId, CssRow>,
    index: HashMap<CssNodeId, CssRowId>,
    selected: Option<CssRowId>,
    properties: Vec<StylePropertyRow>,
    rewrites: u64,
}

impl CssTreeState {
    fn new() -> Self {
        let mut properties: Vec<StylePropertyRow> = (0..property::property_count())
            .map(|i| StylePropertyRow {
                id: StylePropertyId(i),
                name: PROPERTIES[i].name,
                value: String::new(),
                location: None,
            })
            .collect();
        properties.sort_by_key(|p| p.name);
        let mut state = Self {
            rows: Forest::new(),
            index: HashMap::new(),
            selected: None,
            properties,
            rewrites: 0,
        };
        state.rewrite(&ComputedStyle::initial());
        state
    }

    fn append_under(&mut self, this: &Weak<RefCell<Self>>, parent: Option<CssRowId>, node: &CssNodeRef) -> CssRowId {
        if let Some(&row) = self.index.get(&node.node_id()) {
            return row;
        }
        let mut data = CssRow::snapshot(node);
        let weak = Weak::clone(this);
        data.handler = Some(node.connect_style_changed(move |node, change| {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            let Ok(mut state) = shared.try_borrow_mut() else {
                trace!("css page busy, style change dropped");
                return;
            };
            state.style_changed(&weak, node, change);
        }));
        let row = match parent {
            Some(parent) => self.rows.insert_child(parent, data),
            None => self.rows.insert_root(data),
        };
        self.index.insert(node.node_id(), row);
        for child in node.children() {
            self.append_under(this, Some(row), &child);
        }
        row
    }

    fn remove(&mut self, row: CssRowId) -> usize {
        let removed = self.rows.remove(row);
        for (id, data) in &removed {
            if let (Some(node), Some(handler)) = (data.node.upgrade(), data.handler) {
                node.disconnect(handler);
            }
            self.index.remove(&data.node_id);
            if self.selected == Some(*id) {
                self.selected = None;
            }
        }
        if self.selected.is_none() {
            self.rewrite(&ComputedStyle::initial());
        }
        removed.len()
    }

    fn clear(&mut self) {
        let roots = self.rows.roots().to_vec();
        for root in roots {
            self.remove(root);
        }
    }

    fn update_row(&mut self, row: CssRowId) -> bool {
        let Some(data) = self.rows.get_mut(row) else {
            return false;
        };
        let Some(node) = data.node.upgrade() else {
            return false;
        };
        let fresh = CssRow {
            handler: data.handler,
            ..CssRow::snapshot(&node)
        };
        let changed = fresh.name != data.name
            || fresh.visible != data.visible
            || fresh.classes != data.classes
            || fresh.id != data.id
            || fresh.state != data.state;
        *data = fresh;
        changed
    }

    /// Re-append the children of `row` if the node's children changed.
    fn resync_children(&mut self, this: &Weak<RefCell<Self>>, row: CssRowId, node: &CssNodeRef) {
        let current: Vec<CssNodeId> = node.children().iter().map(|c| c.node_id()).collect();
        let tracked: Vec<CssNodeId> = self
            .rows
            .children(row)
            .iter()
            .filter_map(|&r| self.rows.get(r).map(|d| d.node_id))
            .collect();
        if current == tracked {
            return;
        }
        for child in self.rows.children(row).to_vec() {
            self.remove(child);
        }
        for child in node.children() {
            self.append_under(this, Some(row), &child);
        }
    }

    fn style_changed(&mut self, this: &Weak<RefCell<Self>>, node: &CssNode, change: &StyleChange) {
        let Some(&row) = self.index.get(&node.node_id()) else {
            return;
        };
        self.update_row(row);
        if let Some(node) = self.rows.get(row).and_then(CssRow::node) {
            self.resync_children(this, row, &node);
        }
        if self.selected == Some(row) {
            self.rewrite(&change.new);
        }
    }

    fn select(&mut self, row: CssRowId) -> bool {
        let Some(node) = self.rows.get(row).and_then(CssRow::node) else {
            return false;
        };
        self.selected = Some(row);
        self.rewrite(&node.style());
        true
    }

    fn rewrite(&mut self, style: &ComputedStyle) {
        for row in &mut self.properties {
            row.value = style.value(row.id).to_string();
            row.location = style.source(row.id).map(ToString::to_string);
        }
        self.rewrites += 1;
    }
}

/// Accepts widgets that own a CSS node.
#[derive(Debug)]
pub struct CssNodePage {
    state: Shared,
}

impl CssNodePage {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(CssTreeState::new())),
        }
    }

    /// Track `widget`'s node tree as a new top-level row. Returns `None` if
    /// the widget has no CSS node.
    pub fn observe(&self, widget: &Object) -> Option<CssRowId> {
        let node = widget.css_node()?;
        let this = Rc::downgrade(&self.state);
        Some(self.state.borrow_mut().append_under(&this, None, &node))
    }

    /// Register `node` (and its subtree) under `parent`.
    pub fn append_under(&self, parent: Option<CssRowId>, node: &CssNodeRef) -> CssRowId {
        let this = Rc::downgrade(&self.state);
        self.state.borrow_mut().append_under(&this, parent, node)
    }

    /// Remove `row` and its subtree. Returns the number of rows removed.
    pub fn remove(&self, row: CssRowId) -> usize {
        self.state.borrow_mut().remove(row)
    }

    pub fn clear(&self) {
        self.state.borrow_mut().clear();
    }

    pub fn find(&self, node: &CssNode) -> Option<CssRowId> {
        self.state.borrow().index.get(&node.node_id()).copied()
    }

    pub fn row(&self, row: CssRowId) -> Option<CssRow> {
        self.state.borrow().rows.get(row).cloned()
    }

    pub fn roots(&self) -> Vec<CssRowId> {
        self.state.borrow().rows.roots().to_vec()
    }

    pub fn children(&self, row: CssRowId) -> Vec<CssRowId> {
        self.state.borrow().rows.children(row).to_vec()
    }

    pub fn len(&self) -> usize {
        self.state.borrow().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Visit `row` and its descendants in depth-first pre-order.
    pub fn for_each_descendant(&self, row: CssRowId, mut visit: impl FnMut(CssRowId, &CssRow)) {
        let state = self.state.borrow();
        for id in state.rows.walk_depth_first(row) {
            if let Some(data) = state.rows.get(id) {
                visit(id, data);
            }
        }
    }

    /// Re-read the cached fields of `row`. Returns whether anything changed.
    pub fn update_row(&self, row: CssRowId) -> bool {
        self.state.borrow_mut().update_row(row)
    }

    /// Show the computed style of `row`.
    pub fn select(&self, row: CssRowId) -> bool {
        self.state.borrow_mut().select(row)
    }

    pub fn selected(&self) -> Option<CssRowId> {
        self.state.borrow().selected
    }

    /// Property rows, sorted by name.
    pub fn properties(&self) -> Vec<StylePropertyRow> {
        self.state.borrow().properties.clone()
    }

    pub fn property(&self, name: &str) -> Option<StylePropertyRow> {
        self.state
            .borrow()
            .properties
            .iter()
            .find(|p| p.name == name)
            .cloned()
    }

    /// Number of times the property rows have been rewritten.
    pub fn rewrite_count(&self) -> u64 {
        self.state.borrow().rewrites
    }
}

impl Default for CssNodePage {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CssNodePage {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.try_borrow_mut() {
            state.clear();
        }
    }
}

impl Page for CssNodePage {
    fn name(&self) -> &'static str {
        "css-nodes"
    }

    fn set_object(&mut self, object: Option<&Object>, _ctx: &PageContext<'_>) -> bool {
        self.clear();
        let Some(root) = object.and_then(|o| self.observe(o)) else {
            return false;
        };
        self.select(root);
        true
    }
}
