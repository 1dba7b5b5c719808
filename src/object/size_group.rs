//! Size groups: sets of widgets that share a requested size.

use super::class::ClassTag;
use super::handle::{Object, ObjectRef, WeakObject};
use super::property::Value;
use super::signal::{SignalKind, SignalPayload};

/// `Notify` name emitted on a widget when it joins or leaves a size group.
pub const MEMBERSHIP_NOTIFY: &str = "size-groups";

/// Which dimension a size group equalizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizeGroupMode {
    None,
    #[default]
    Horizontal,
    Vertical,
    Both,
}

impl SizeGroupMode {
    pub fn nick(self) -> &'static str {
        match self {
            SizeGroupMode::None => "none",
            SizeGroupMode::Horizontal => "horizontal",
            SizeGroupMode::Vertical => "vertical",
            SizeGroupMode::Both => "both",
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct SizeGroupState {
    mode: SizeGroupMode,
    widgets: Vec<WeakObject>,
}

impl Object {
    /// Add `widget` to this size group. Membership is weak on both sides.
    pub fn add_widget(&self, widget: &ObjectRef) {
        debug_assert_eq!(self.class(), ClassTag::SizeGroup);
        debug_assert!(widget.class().is_widget());
        if let Some(group) = self.state.borrow_mut().size_group.as_mut() {
            if group.widgets.iter().any(|w| w.id() == Some(widget.id())) {
                return;
            }
            group.widgets.push(widget.downgrade());
        }
        widget
            .state
            .borrow_mut()
            .widget
            .size_groups
            .push(self.downgrade());
        widget.notify_membership();
    }

    pub fn remove_widget(&self, widget: &Object) {
        if let Some(group) = self.state.borrow_mut().size_group.as_mut() {
            group.widgets.retain(|w| w.id() != Some(widget.id()));
        }
        widget
            .state
            .borrow_mut()
            .widget
            .size_groups
            .retain(|g| g.id() != Some(self.id()));
        widget.notify_membership();
    }

    fn notify_membership(&self) {
        self.emit(
            SignalKind::Notify,
            &SignalPayload::Notify(MEMBERSHIP_NOTIFY.to_owned()),
        );
    }

    /// Live members of a size group.
    pub fn group_widgets(&self) -> Vec<ObjectRef> {
        self.state
            .borrow()
            .size_group
            .as_ref()
            .map(|g| g.widgets.iter().filter_map(WeakObject::upgrade).collect())
            .unwrap_or_default()
    }

    pub fn size_group_mode(&self) -> SizeGroupMode {
        self.state
            .borrow()
            .size_group
            .as_ref()
            .map(|g| g.mode)
            .unwrap_or_default()
    }

    pub fn set_size_group_mode(&self, mode: SizeGroupMode) {
        if let Some(group) = self.state.borrow_mut().size_group.as_mut() {
            group.mode = mode;
        }
        self.store_property("mode", Value::Enum(mode.nick()));
    }

    /// Live size groups a widget belongs to.
    pub fn size_groups(&self) -> Vec<ObjectRef> {
        self.state
            .borrow()
            .widget
            .size_groups
            .iter()
            .filter_map(WeakObject::upgrade)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn membership_is_symmetric() {
        let group = Object::new(ClassTag::SizeGroup);
        let a = Object::new(ClassTag::Button);
        let b = Object::new(ClassTag::Button);
        group.add_widget(&a);
        group.add_widget(&b);
        group.add_widget(&a);
        assert_eq!(group.group_widgets().len(), 2);
        assert_eq!(a.size_groups()[0].id(), group.id());

        group.remove_widget(&a);
        assert_eq!(group.group_widgets().len(), 1);
        assert!(a.size_groups().is_empty());
    }

    #[test]
    fn membership_changes_notify_the_widget() {
        let group = Object::new(ClassTag::SizeGroup);
        let label = Object::new(ClassTag::Label);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        label.connect(SignalKind::Notify, move |_, payload| {
            if let SignalPayload::Notify(name) = payload {
                s.borrow_mut().push(name.clone());
            }
        });
        group.add_widget(&label);
        group.add_widget(&label);
        group.remove_widget(&label);
        assert_eq!(*seen.borrow(), vec![MEMBERSHIP_NOTIFY, MEMBERSHIP_NOTIFY]);
    }

    #[test]
    fn dead_members_are_skipped() {
        let group = Object::new(ClassTag::SizeGroup);
        {
            let a = Object::new(ClassTag::Label);
            group.add_widget(&a);
        }
        assert!(group.group_widgets().is_empty());
    }

    #[test]
    fn mode_updates_property() {
        let group = Object::new(ClassTag::SizeGroup);
        assert_eq!(group.size_group_mode(), SizeGroupMode::Horizontal);
        group.set_size_group_mode(SizeGroupMode::Both);
        assert_eq!(group.size_group_mode(), SizeGroupMode::Both);
        assert_eq!(group.property("mode"), Some(Value::Enum("both")));
    }
}
