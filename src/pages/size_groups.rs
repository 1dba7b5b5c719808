//! Size-group membership page.

use crate::object::size_group::MEMBERSHIP_NOTIFY;
use crate::object::{Object, ObjectRef, WeakObject};

use super::{ObjectChange, Page, PageContext};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeGroupRow {
    pub group: String,
    pub mode: &'static str,
    /// Display names of the live members, in join order.
    pub members: Vec<String>,
}

/// Lists the size groups a widget belongs to. Declines non-widgets and
/// widgets in no group.
#[derive(Debug, Default)]
pub struct SizeGroupsPage {
    object: WeakObject,
    groups: Vec<SizeGroupRow>,
}

impl SizeGroupsPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn groups(&self) -> &[SizeGroupRow] {
        &self.groups
    }

    /// The bound widget, while it is alive.
    pub fn widget(&self) -> Option<ObjectRef> {
        self.object.upgrade()
    }

    /// Re-read the bound widget's groups.
    pub fn refresh(&mut self, ctx: &PageContext<'_>) {
        self.groups = self
            .widget()
            .map(|widget| Self::collect(&widget, ctx))
            .unwrap_or_default();
    }

    fn collect(object: &Object, ctx: &PageContext<'_>) -> Vec<SizeGroupRow> {
        object
            .size_groups()
            .iter()
            .map(|group| SizeGroupRow {
                group: ctx.display_name(group),
                mode: group.size_group_mode().nick(),
                members: group
                    .group_widgets()
                    .iter()
                    .map(|w| ctx.display_name(w))
                    .collect(),
            })
            .collect()
    }
}

impl Page for SizeGroupsPage {
    fn name(&self) -> &'static str {
        "size-groups"
    }

    fn set_object(&mut self, object: Option<&Object>, ctx: &PageContext<'_>) -> bool {
        self.groups.clear();
        self.object = WeakObject::new();
        let Some(object) = object.filter(|o| o.class().is_widget()) else {
            return false;
        };
        self.groups = Self::collect(object, ctx);
        if self.groups.is_empty() {
            return false;
        }
        self.object = object.downgrade();
        true
    }

    fn object_changed(&mut self, _object: &Object, change: &ObjectChange, ctx: &PageContext<'_>) {
        match change {
            ObjectChange::Mapped(_) => self.refresh(ctx),
            ObjectChange::Notify(name) if name == MEMBERSHIP_NOTIFY => self.refresh(ctx),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{ClassTag, SizeGroupMode};
    use crate::object_tree::ObjectTree;

    #[test]
    fn declines_widget_without_groups() {
        let tree = ObjectTree::new();
        let label = Object::new(ClassTag::Label);
        let mut page = SizeGroupsPage::new();
        assert!(!page.set_object(Some(&*label), &PageContext::new(&tree)));
        assert!(!page.set_object(Some(&Object::new(ClassTag::ListStore)), &PageContext::new(&tree)));
    }

    #[test]
    fn lists_groups_and_members() {
        let tree = ObjectTree::new();
        let group = Object::builder(ClassTag::SizeGroup).id("labels").build();
        group.set_size_group_mode(SizeGroupMode::Both);
        let a = Object::builder(ClassTag::Label).id("a").build();
        let b = Object::builder(ClassTag::Label).id("b").build();
        group.add_widget(&a);
        group.add_widget(&b);

        let mut page = SizeGroupsPage::new();
        assert!(page.set_object(Some(&*a), &PageContext::new(&tree)));
        assert_eq!(
            page.groups(),
            &[SizeGroupRow {
                group: "labels".into(),
                mode: "both",
                members: vec!["a".into(), "b".into()],
            }]
        );
    }

    #[test]
    fn membership_notify_recollects_groups() {
        let tree = ObjectTree::new();
        let ctx = PageContext::new(&tree);
        let first = Object::builder(ClassTag::SizeGroup).id("first").build();
        let second = Object::builder(ClassTag::SizeGroup).id("second").build();
        let label = Object::new(ClassTag::Label);
        first.add_widget(&label);

        let mut page = SizeGroupsPage::new();
        assert!(page.set_object(Some(&*label), &ctx));
        assert_eq!(page.widget().map(|w| w.id()), Some(label.id()));
        second.add_widget(&label);
        assert_eq!(page.groups().len(), 1);

        page.object_changed(&label, &ObjectChange::Notify(MEMBERSHIP_NOTIFY.into()), &ctx);
        let names: Vec<_> = page.groups().iter().map(|g| g.group.as_str()).collect();
        assert_eq!(names, vec!["first", "second"]);

        page.object_changed(&label, &ObjectChange::Notify("label".into()), &ctx);
        assert_eq!(page.groups().len(), 2);
    }
}
