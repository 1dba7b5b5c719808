//! CSS nodes and computed style snapshots.
//!
//! A [`CssNode`] is the style engine's view of (part of) a widget. Nodes form
//! their own tree, parallel to but distinct from the widget tree: a widget may
//! own several nodes. Changing a node's name, id, classes or state marks it and
//! its descendants dirty; [`StyleEngine::validate`](super::StyleEngine::validate)
//! recomputes dirty nodes and emits `style-changed`.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use super::property::{self, StylePropertyId, StyleValue, PROPERTIES};
use crate::object::{HandlerId, StateFlags};

thread_local! {
    static NEXT_NODE: Cell<u64> = const { Cell::new(1) };
}

/// Strong handle to a CSS node.
pub type CssNodeRef = Rc<CssNode>;

/// Identity of a CSS node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CssNodeId(u64);

// ---------------------------------------------------------------------------
// Computed style
// ---------------------------------------------------------------------------

/// Where a computed value was declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// One property's computed value.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedValue {
    pub value: StyleValue,
    /// `None` for initial and inherited values.
    pub source: Option<SourceLocation>,
}

/// Snapshot of every property's computed value, indexed by property id.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedStyle {
    values: Vec<ComputedValue>,
}

impl ComputedStyle {
    /// Every property at its initial value.
    pub fn initial() -> Self {
        let values = PROPERTIES
            .iter()
            .map(|p| ComputedValue {
                value: StyleValue::parse(p.kind, p.initial).unwrap_or(StyleValue::Opaque),
                source: None,
            })
            .collect();
        Self { values }
    }

    pub(crate) fn from_values(values: Vec<ComputedValue>) -> Self {
        debug_assert_eq!(values.len(), property::property_count());
        Self { values }
    }

    pub fn get(&self, id: StylePropertyId) -> &ComputedValue {
        &self.values[id.0]
    }

    pub fn value(&self, id: StylePropertyId) -> &StyleValue {
        &self.values[id.0].value
    }

    pub fn source(&self, id: StylePropertyId) -> Option<&SourceLocation> {
        self.values[id.0].source.as_ref()
    }

    /// Look a value up by property name.
    pub fn value_by_name(&self, name: &str) -> Option<&StyleValue> {
        property::lookup(name).map(|id| self.value(id))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self::initial()
    }
}

/// Payload of `style-changed`.
#[derive(Debug, Clone)]
pub struct StyleChange {
    pub old: Rc<ComputedStyle>,
    pub new: Rc<ComputedStyle>,
}

// ---------------------------------------------------------------------------
// CssNode
// ---------------------------------------------------------------------------

struct NodeState {
    name: String,
    id: Option<String>,
    classes: Vec<String>,
    visible: bool,
    state: StateFlags,
    parent: Weak<CssNode>,
    children: Vec<CssNodeRef>,
    style: Rc<ComputedStyle>,
    dirty: bool,
}

type StyleHandler = Rc<dyn Fn(&CssNode, &StyleChange)>;

/// A node in the style tree.
pub struct CssNode {
    node_id: CssNodeId,
    this: Weak<CssNode>,
    state: RefCell<NodeState>,
    handlers: RefCell<Vec<(HandlerId, StyleHandler)>>,
}

impl CssNode {
    /// Create a detached, dirty node.
    pub fn new(name: impl Into<String>) -> CssNodeRef {
        let node_id = NEXT_NODE.with(|next| {
            let id = next.get();
            next.set(id + 1);
            CssNodeId(id)
        });
        Rc::new_cyclic(|this| CssNode {
            node_id,
            this: this.clone(),
            state: RefCell::new(NodeState {
                name: name.into(),
                id: None,
                classes: Vec::new(),
                visible: true,
                state: StateFlags::NORMAL,
                parent: Weak::new(),
                children: Vec::new(),
                style: Rc::new(ComputedStyle::initial()),
                dirty: true,
            }),
            handlers: RefCell::new(Vec::new()),
        })
    }

    pub fn node_id(&self) -> CssNodeId {
        self.node_id
    }

    pub fn name(&self) -> String {
        self.state.borrow().name.clone()
    }

    pub fn set_name(&self, name: &str) {
        self.state.borrow_mut().name = name.to_owned();
        self.invalidate();
    }

    pub fn id(&self) -> Option<String> {
        self.state.borrow().id.clone()
    }

    pub fn set_id(&self, id: Option<&str>) {
        self.state.borrow_mut().id = id.map(str::to_owned);
        self.invalidate();
    }

    /// Classes in insertion order.
    pub fn classes(&self) -> Vec<String> {
        self.state.borrow().classes.clone()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.state.borrow().classes.iter().any(|c| c == class)
    }

    /// Add a class. No-op if already present.
    pub fn add_class(&self, class: &str) {
        if self.has_class(class) {
            return;
        }
        self.state.borrow_mut().classes.push(class.to_owned());
        self.invalidate();
    }

    /// Remove a class. No-op if absent.
    pub fn remove_class(&self, class: &str) {
        if !self.has_class(class) {
            return;
        }
        self.state.borrow_mut().classes.retain(|c| c != class);
        self.invalidate();
    }

    pub fn visible(&self) -> bool {
        self.state.borrow().visible
    }

    pub fn set_visible(&self, visible: bool) {
        self.state.borrow_mut().visible = visible;
    }

    pub fn state(&self) -> StateFlags {
        self.state.borrow().state
    }

    pub fn set_state(&self, state: StateFlags) {
        let changed = {
            let mut s = self.state.borrow_mut();
            std::mem::replace(&mut s.state, state) != state
        };
        if changed {
            self.invalidate();
        }
    }

    // ── Tree ──────────────────────────────────────────────────────────

    pub fn parent(&self) -> Option<CssNodeRef> {
        self.state.borrow().parent.upgrade()
    }

    pub fn children(&self) -> Vec<CssNodeRef> {
        self.state.borrow().children.clone()
    }

    /// Append `child`, detaching it from any previous parent.
    pub fn append_child(&self, child: &CssNodeRef) {
        child.detach();
        child.state.borrow_mut().parent = self.this.clone();
        self.state.borrow_mut().children.push(Rc::clone(child));
        child.invalidate();
    }

    /// Detach from the parent, if any.
    pub fn detach(&self) {
        let parent = std::mem::take(&mut self.state.borrow_mut().parent);
        if let Some(parent) = parent.upgrade() {
            parent
                .state
                .borrow_mut()
                .children
                .retain(|c| c.node_id != self.node_id);
        }
    }

    // ── Style ─────────────────────────────────────────────────────────

    pub fn style(&self) -> Rc<ComputedStyle> {
        Rc::clone(&self.state.borrow().style)
    }

    pub fn is_dirty(&self) -> bool {
        self.state.borrow().dirty
    }

    /// Mark this node and its descendants for restyling.
    pub fn invalidate(&self) {
        self.state.borrow_mut().dirty = true;
        for child in self.children() {
            child.invalidate();
        }
    }

    /// Install a new style. Emits `style-changed` if it differs from the old
    /// one. Clears the dirty flag.
    pub(crate) fn set_style(&self, style: ComputedStyle) {
        let old = {
            let mut s = self.state.borrow_mut();
            s.dirty = false;
            if *s.style == style {
                return;
            }
            std::mem::replace(&mut s.style, Rc::new(style))
        };
        let change = StyleChange {
            old,
            new: self.style(),
        };
        let handlers: Vec<_> = self
            .handlers
            .borrow()
            .iter()
            .map(|(_, h)| Rc::clone(h))
            .collect();
        for handler in handlers {
            handler(self, &change);
        }
    }

    /// Subscribe to `style-changed`.
    pub fn connect_style_changed(
        &self,
        handler: impl Fn(&CssNode, &StyleChange) + 'static,
    ) -> HandlerId {
        let id = HandlerId::next();
        self.handlers.borrow_mut().push((id, Rc::new(handler)));
        id
    }

    pub fn disconnect(&self, id: HandlerId) -> bool {
        let mut handlers = self.handlers.borrow_mut();
        let before = handlers.len();
        handlers.retain(|(h, _)| *h != id);
        handlers.len() != before
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.borrow().len()
    }
}

impl fmt::Debug for CssNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.state.borrow();
        f.debug_struct("CssNode")
            .field("node_id", &self.node_id)
            .field("name", &s.name)
            .field("id", &s.id)
            .field("classes", &s.classes)
            .field("state", &s.state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_node_is_dirty_with_initial_style() {
        let node = CssNode::new("label");
        assert!(node.is_dirty());
        assert_eq!(*node.style(), ComputedStyle::initial());
        assert_eq!(
            node.style().value_by_name("color"),
            Some(&StyleValue::Color("black".into()))
        );
    }

    #[test]
    fn classes_keep_insertion_order() {
        let node = CssNode::new("button");
        node.add_class("b");
        node.add_class("a");
        node.add_class("b");
        assert_eq!(node.classes(), vec!["b", "a"]);
        node.remove_class("b");
        assert_eq!(node.classes(), vec!["a"]);
    }

    #[test]
    fn append_and_detach() {
        let parent = CssNode::new("box");
        let other = CssNode::new("box");
        let child = CssNode::new("label");
        parent.append_child(&child);
        assert_eq!(child.parent().unwrap().node_id(), parent.node_id());
        other.append_child(&child);
        assert!(parent.children().is_empty());
        assert_eq!(other.children().len(), 1);
        child.detach();
        assert!(child.parent().is_none());
        assert!(other.children().is_empty());
    }

    #[test]
    fn changes_invalidate_descendants() {
        let parent = CssNode::new("box");
        let child = CssNode::new("label");
        parent.append_child(&child);
        parent.set_style(ComputedStyle::initial());
        child.set_style(ComputedStyle::initial());
        assert!(!child.is_dirty());
        parent.add_class("x");
        assert!(parent.is_dirty());
        assert!(child.is_dirty());
    }

    #[test]
    fn style_changed_only_on_difference() {
        let node = CssNode::new("label");
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        let id = node.connect_style_changed(move |_, change| {
            assert_ne!(change.old, change.new);
            h.set(h.get() + 1);
        });
        node.set_style(ComputedStyle::initial());
        assert_eq!(hits.get(), 0);

        let mut values: Vec<_> = (0..property::property_count())
            .map(|i| node.style().get(StylePropertyId(i)).clone())
            .collect();
        values[0].value = StyleValue::Color("red".into());
        node.set_style(ComputedStyle::from_values(values));
        assert_eq!(hits.get(), 1);

        assert!(node.disconnect(id));
        assert_eq!(node.handler_count(), 0);
    }

    #[test]
    fn source_location_display() {
        let loc = SourceLocation {
            file: "app.css".into(),
            line: 12,
        };
        assert_eq!(loc.to_string(), "app.css:12");
    }
}
