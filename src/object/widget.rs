//! Widget behaviour on [`Object`]: containment, mapping, state flags,
//! allocation, focus and event controllers.

use std::fmt;
use std::ops::{BitAnd, BitOr};
use std::rc::Rc;

use super::class::ClassTag;
use super::handle::{Object, ObjectRef, WeakObject};
use super::property::Value;
use super::signal::{notify_map_observers, SignalKind, SignalPayload};
use crate::style::CssNodeRef;

// ---------------------------------------------------------------------------
// StateFlags
// ---------------------------------------------------------------------------

/// Widget state bitmask. Mirrored onto the widget's CSS node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StateFlags(pub u32);

impl StateFlags {
    pub const NORMAL: StateFlags = StateFlags(0);
    pub const ACTIVE: StateFlags = StateFlags(1);
    pub const PRELIGHT: StateFlags = StateFlags(1 << 1);
    pub const SELECTED: StateFlags = StateFlags(1 << 2);
    pub const INSENSITIVE: StateFlags = StateFlags(1 << 3);
    pub const FOCUSED: StateFlags = StateFlags(1 << 4);
    pub const CHECKED: StateFlags = StateFlags(1 << 5);
    pub const BACKDROP: StateFlags = StateFlags(1 << 6);

    const NAMES: [(StateFlags, &'static str); 7] = [
        (StateFlags::ACTIVE, "active"),
        (StateFlags::PRELIGHT, "hover"),
        (StateFlags::SELECTED, "selected"),
        (StateFlags::INSENSITIVE, "disabled"),
        (StateFlags::FOCUSED, "focus"),
        (StateFlags::CHECKED, "checked"),
        (StateFlags::BACKDROP, "backdrop"),
    ];

    pub fn contains(self, other: StateFlags) -> bool {
        (self.0 & other.0) == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// The pseudo-class names of the set bits, in bit order.
    pub fn names(self) -> Vec<&'static str> {
        Self::NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect()
    }

    /// Look up a flag by pseudo-class name.
    pub fn from_name(name: &str) -> Option<StateFlags> {
        Self::NAMES
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(flag, _)| *flag)
    }
}

impl BitOr for StateFlags {
    type Output = StateFlags;
    fn bitor(self, rhs: Self) -> Self::Output {
        StateFlags(self.0 | rhs.0)
    }
}

impl BitAnd for StateFlags {
    type Output = StateFlags;
    fn bitand(self, rhs: Self) -> Self::Output {
        StateFlags(self.0 & rhs.0)
    }
}

impl fmt::Display for StateFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            f.write_str("normal")
        } else {
            f.write_str(&self.names().join(" | "))
        }
    }
}

// ---------------------------------------------------------------------------
// Allocation
// ---------------------------------------------------------------------------

/// A widget's allocated rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Allocation {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Allocation {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

impl fmt::Display for Allocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}×{} +{} +{}", self.width, self.height, self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Controllers
// ---------------------------------------------------------------------------

/// Event propagation phase of a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Capture,
    Bubble,
    Target,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::Capture, Phase::Bubble, Phase::Target];

    pub fn label(self) -> &'static str {
        match self {
            Phase::Capture => "capture",
            Phase::Bubble => "bubble",
            Phase::Target => "target",
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ControllerState {
    pub(crate) phase: Phase,
    pub(crate) widget: WeakObject,
}

// ---------------------------------------------------------------------------
// WidgetState
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub(crate) struct WidgetState {
    pub(crate) parent: WeakObject,
    pub(crate) mapped: bool,
    pub(crate) realized: bool,
    pub(crate) state_flags: StateFlags,
    pub(crate) allocation: Allocation,
    pub(crate) baseline: i32,
    pub(crate) clip: Allocation,
    pub(crate) focus: WeakObject,
    pub(crate) controllers: Vec<ObjectRef>,
    pub(crate) css_node: Option<CssNodeRef>,
    pub(crate) size_groups: Vec<WeakObject>,
    pub(crate) tick_callbacks: Vec<u32>,
    pub(crate) next_tick_callback: u32,
}

impl Object {
    fn assert_widget(&self) {
        debug_assert!(self.class().is_widget(), "{} is not a widget", self.class());
    }

    // ── Containment ───────────────────────────────────────────────────

    /// Add `child` to this container. The container owns the child.
    ///
    /// # Panics
    ///
    /// Panics (debug) if `self` is not a container or `child` already has a
    /// parent.
    pub fn add(&self, child: &ObjectRef) {
        debug_assert!(self.class().is_container(), "{} is not a container", self.class());
        debug_assert!(
            child.parent().is_none(),
            "{} already has a parent",
            child.class()
        );
        {
            let mut state = self.state.borrow_mut();
            state.items.push(Rc::clone(child));
        }
        child.state.borrow_mut().widget.parent = self.downgrade();
        if let (Some(parent_node), Some(child_node)) = (self.css_node(), child.css_node()) {
            parent_node.append_child(&child_node);
        }
        if self.is_mapped() && child.is_visible() {
            child.map();
        }
    }

    /// Remove `child` from this container. Returns the owned handle.
    pub fn remove(&self, child: &Object) -> Option<ObjectRef> {
        let removed = self.remove_item(child)?;
        removed.state.borrow_mut().widget.parent = WeakObject::new();
        if let Some(node) = removed.css_node() {
            node.detach();
        }
        if removed.is_mapped() {
            removed.unmap();
        }
        Some(removed)
    }

    /// The widget parent, if any.
    pub fn parent(&self) -> Option<ObjectRef> {
        self.state.borrow().widget.parent.upgrade()
    }

    /// Container children in insertion order. Non-widget members (a tree
    /// view's columns) are not children.
    pub fn children(&self) -> Vec<ObjectRef> {
        if !self.class().is_container() {
            return Vec::new();
        }
        self.items()
            .into_iter()
            .filter(|item| item.class().is_widget())
            .collect()
    }

    /// The root of this widget's parent chain.
    pub fn toplevel(&self) -> Option<ObjectRef> {
        let mut current = self.to_ref()?;
        while let Some(parent) = current.parent() {
            current = parent;
        }
        Some(current)
    }

    // ── Mapping ───────────────────────────────────────────────────────

    pub fn is_mapped(&self) -> bool {
        self.state.borrow().widget.mapped
    }

    pub fn is_realized(&self) -> bool {
        self.state.borrow().widget.realized
    }

    pub fn is_visible(&self) -> bool {
        !matches!(self.property("visible"), Some(Value::Bool(false)))
    }

    /// Map this widget and its visible children. Observers run after each
    /// widget's flag flips.
    pub fn map(&self) {
        self.assert_widget();
        if self.is_mapped() {
            return;
        }
        {
            let mut state = self.state.borrow_mut();
            state.widget.mapped = true;
            state.widget.realized = true;
        }
        notify_map_observers(self, true);
        for child in self.children() {
            if child.is_visible() {
                child.map();
            }
        }
    }

    /// Unmap this widget and all its children.
    pub fn unmap(&self) {
        self.assert_widget();
        if !self.is_mapped() {
            return;
        }
        for child in self.children() {
            child.unmap();
        }
        self.state.borrow_mut().widget.mapped = false;
        notify_map_observers(self, false);
    }

    // ── State ─────────────────────────────────────────────────────────

    pub fn state_flags(&self) -> StateFlags {
        self.state.borrow().widget.state_flags
    }

    /// Replace the state flags, mirror them onto the CSS node and emit
    /// `StateFlagsChanged`.
    pub fn set_state_flags(&self, flags: StateFlags) {
        let old = {
            let mut state = self.state.borrow_mut();
            std::mem::replace(&mut state.widget.state_flags, flags)
        };
        if old == flags {
            return;
        }
        if let Some(node) = self.css_node() {
            node.set_state(flags);
        }
        self.emit(
            SignalKind::StateFlagsChanged,
            &SignalPayload::StateFlags { old, new: flags },
        );
    }

    // ── Allocation ────────────────────────────────────────────────────

    pub fn allocation(&self) -> Allocation {
        self.state.borrow().widget.allocation
    }

    pub fn baseline(&self) -> i32 {
        self.state.borrow().widget.baseline
    }

    pub fn clip(&self) -> Allocation {
        self.state.borrow().widget.clip
    }

    /// Assign a new allocation and emit `SizeAllocate`.
    pub fn size_allocate(&self, allocation: Allocation, baseline: i32) {
        {
            let mut state = self.state.borrow_mut();
            state.widget.allocation = allocation;
            state.widget.baseline = baseline;
            state.widget.clip = allocation;
        }
        self.emit(SignalKind::SizeAllocate, &SignalPayload::Allocation(allocation));
    }

    // ── Focus ─────────────────────────────────────────────────────────

    /// The focus widget of a window.
    pub fn focus(&self) -> Option<ObjectRef> {
        self.state.borrow().widget.focus.upgrade()
    }

    /// Set a window's focus widget and emit `SetFocus`.
    pub fn set_focus(&self, widget: Option<&ObjectRef>) {
        debug_assert!(self.class().is_toplevel(), "{} is not a window", self.class());
        let weak = widget.map(|w| w.downgrade()).unwrap_or_default();
        self.state.borrow_mut().widget.focus = weak;
        self.emit(
            SignalKind::SetFocus,
            &SignalPayload::Focus(widget.map(|w| w.id())),
        );
    }

    // ── Controllers ───────────────────────────────────────────────────

    /// Attach an event controller in the given phase. The widget owns it; the
    /// controller refers back weakly.
    pub fn add_controller(&self, controller: &ObjectRef, phase: Phase) {
        self.assert_widget();
        debug_assert!(controller.is_a(ClassTag::EventController));
        controller.state.borrow_mut().controller = Some(ControllerState {
            phase,
            widget: self.downgrade(),
        });
        self.state
            .borrow_mut()
            .widget
            .controllers
            .push(Rc::clone(controller));
    }

    /// Controllers attached in `phase`, in attachment order.
    pub fn controllers(&self, phase: Phase) -> Vec<ObjectRef> {
        self.state
            .borrow()
            .widget
            .controllers
            .iter()
            .filter(|c| c.propagation_phase() == Some(phase))
            .cloned()
            .collect()
    }

    pub fn propagation_phase(&self) -> Option<Phase> {
        self.state.borrow().controller.as_ref().map(|c| c.phase)
    }

    /// The widget a controller is attached to.
    pub fn controller_widget(&self) -> Option<ObjectRef> {
        self.state
            .borrow()
            .controller
            .as_ref()
            .and_then(|c| c.widget.upgrade())
    }

    // ── Style ─────────────────────────────────────────────────────────

    pub fn css_node(&self) -> Option<CssNodeRef> {
        self.state.borrow().widget.css_node.clone()
    }

    pub(crate) fn set_css_node(&self, node: CssNodeRef) {
        self.state.borrow_mut().widget.css_node = Some(node);
    }

    /// Style classes in insertion order, read from the CSS node.
    pub fn style_classes(&self) -> Vec<String> {
        self.css_node().map(|n| n.classes()).unwrap_or_default()
    }

    pub fn add_style_class(&self, class: &str) {
        if let Some(node) = self.css_node() {
            node.add_class(class);
        }
    }

    pub fn remove_style_class(&self, class: &str) {
        if let Some(node) = self.css_node() {
            node.remove_class(class);
        }
    }

    // ── Text ──────────────────────────────────────────────────────────

    /// The dominant textual content: a label's text, a button's label, a
    /// window or column title.
    pub fn text_content(&self) -> Option<String> {
        match self.class() {
            ClassTag::Window | ClassTag::TreeViewColumn => self.str_property("title"),
            c if c.is_a(ClassTag::Label) || c.is_a(ClassTag::Button) || c.is_a(ClassTag::MenuItem) => {
                self.str_property("label")
            }
            _ => None,
        }
    }

    pub fn set_label(&self, text: &str) {
        self.store_property("label", Value::Str(text.to_owned()));
    }

    pub fn set_title(&self, text: &str) {
        self.store_property("title", Value::Str(text.to_owned()));
    }

    // ── Frame clock & tick callbacks ──────────────────────────────────

    /// The frame clock of this widget's toplevel.
    pub fn frame_clock(&self) -> Option<ObjectRef> {
        self.toplevel()
            .and_then(|top| top.slot(super::handle::Slot::FrameClock))
    }

    /// Register a tick callback. Returns its id.
    pub fn add_tick_callback(&self) -> u32 {
        let mut state = self.state.borrow_mut();
        state.widget.next_tick_callback += 1;
        let id = state.widget.next_tick_callback;
        state.widget.tick_callbacks.push(id);
        id
    }

    pub fn remove_tick_callback(&self, id: u32) {
        self.state
            .borrow_mut()
            .widget
            .tick_callbacks
            .retain(|&cb| cb != id);
    }

    pub fn has_tick_callback(&self) -> bool {
        !self.state.borrow().widget.tick_callbacks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_flag_names() {
        let flags = StateFlags::PRELIGHT | StateFlags::FOCUSED;
        assert_eq!(flags.names(), vec!["hover", "focus"]);
        assert_eq!(flags.to_string(), "hover | focus");
        assert_eq!(StateFlags::NORMAL.to_string(), "normal");
        assert_eq!(StateFlags::from_name("checked"), Some(StateFlags::CHECKED));
    }

    #[test]
    fn add_sets_parent_and_order() {
        let window = Object::new(ClassTag::Window);
        let a = Object::new(ClassTag::Label);
        let b = Object::new(ClassTag::Button);
        window.add(&a);
        window.add(&b);
        assert_eq!(a.parent().unwrap().id(), window.id());
        let ids: Vec<_> = window.children().iter().map(|c| c.id()).collect();
        assert_eq!(ids, vec![a.id(), b.id()]);
    }

    #[test]
    fn remove_returns_owned_child() {
        let window = Object::new(ClassTag::Window);
        let label = Object::new(ClassTag::Label);
        window.add(&label);
        let removed = window.remove(&label).unwrap();
        assert_eq!(removed.id(), label.id());
        assert!(label.parent().is_none());
        assert!(window.children().is_empty());
        assert!(window.remove(&label).is_none());
    }

    #[test]
    fn map_recurses_into_visible_children() {
        let window = Object::new(ClassTag::Window);
        let shown = Object::new(ClassTag::Label);
        let hidden = Object::builder(ClassTag::Label).visible(false).build();
        window.add(&shown);
        window.add(&hidden);
        window.map();
        assert!(window.is_mapped());
        assert!(shown.is_mapped());
        assert!(!hidden.is_mapped());
        window.unmap();
        assert!(!shown.is_mapped());
    }

    #[test]
    fn adding_to_mapped_container_maps_child() {
        let window = Object::new(ClassTag::Window);
        window.map();
        let label = Object::new(ClassTag::Label);
        window.add(&label);
        assert!(label.is_mapped());
    }

    #[test]
    fn controllers_by_phase() {
        let button = Object::new(ClassTag::Button);
        let click = Object::new(ClassTag::GestureClick);
        let key = Object::new(ClassTag::EventController);
        button.add_controller(&click, Phase::Bubble);
        button.add_controller(&key, Phase::Capture);
        assert_eq!(button.controllers(Phase::Bubble).len(), 1);
        assert_eq!(button.controllers(Phase::Capture)[0].id(), key.id());
        assert!(button.controllers(Phase::Target).is_empty());
        assert_eq!(click.controller_widget().unwrap().id(), button.id());
    }

    #[test]
    fn controller_back_link_is_weak() {
        let click = Object::new(ClassTag::GestureClick);
        {
            let button = Object::new(ClassTag::Button);
            button.add_controller(&click, Phase::Bubble);
        }
        assert!(click.controller_widget().is_none());
    }

    #[test]
    fn text_content_by_class() {
        let label = Object::builder(ClassTag::Label).label("hello").build();
        let window = Object::builder(ClassTag::Window).title("Main").build();
        let store = Object::new(ClassTag::ListStore);
        assert_eq!(label.text_content().as_deref(), Some("hello"));
        assert_eq!(window.text_content().as_deref(), Some("Main"));
        assert_eq!(store.text_content(), None);
    }

    #[test]
    fn size_allocate_emits() {
        let label = Object::new(ClassTag::Label);
        let seen = Rc::new(std::cell::Cell::new(None));
        let s = seen.clone();
        label.connect(SignalKind::SizeAllocate, move |_, payload| {
            if let SignalPayload::Allocation(a) = payload {
                s.set(Some(*a));
            }
        });
        let alloc = Allocation::new(0, 0, 40, 10);
        label.size_allocate(alloc, 7);
        assert_eq!(seen.get(), Some(alloc));
        assert_eq!(label.baseline(), 7);
        assert_eq!(label.clip(), alloc);
    }

    #[test]
    fn state_flags_mirror_to_css_node() {
        let button = Object::new(ClassTag::Button);
        button.set_state_flags(StateFlags::PRELIGHT);
        assert_eq!(button.css_node().unwrap().state(), StateFlags::PRELIGHT);
    }

    #[test]
    fn tick_callbacks() {
        let window = Object::new(ClassTag::Window);
        assert!(!window.has_tick_callback());
        let id = window.add_tick_callback();
        assert!(window.has_tick_callback());
        window.remove_tick_callback(id);
        assert!(!window.has_tick_callback());
    }

    #[test]
    fn frame_clock_comes_from_toplevel() {
        let window = Object::new(ClassTag::Window);
        let label = Object::new(ClassTag::Label);
        window.add(&label);
        let clock = label.frame_clock().unwrap();
        assert_eq!(clock.class(), ClassTag::FrameClock);
    }
}
