//! One row of the live object tree.

use std::rc::Weak;

use slotmap::new_key_type;

use crate::object::{ClassTag, HandlerId, Object, ObjectId, WeakNotifyId, WeakObject};
use crate::style::CssNode;

new_key_type! {
    /// Handle to a row of the object tree. Stale handles never alias a newer row.
    pub struct RowId;
}

/// A subscription owned by a row; released when the row goes away.
#[derive(Debug, Clone)]
pub enum Binding {
    Signal(HandlerId),
    Style {
        node: Weak<CssNode>,
        handler: HandlerId,
    },
    WeakNotify(WeakNotifyId),
}

/// Cached display fields for one tracked object.
#[derive(Debug, Clone)]
pub struct Row {
    pub object: WeakObject,
    pub object_id: ObjectId,
    pub class: ClassTag,
    /// Caller-supplied relation name, else buildable id, else type name.
    pub name: String,
    pub type_name: &'static str,
    pub label: String,
    /// Space-joined style classes in insertion order.
    pub style_classes: String,
    pub sensitive: bool,
    /// `"{type} — {name}"`, reused as the page header.
    pub title: String,
    pub(crate) bindings: Vec<Binding>,
}

impl Row {
    pub(crate) fn snapshot(object: &Object, name: Option<&str>, sensitive: bool) -> Self {
        let type_name = object.class().name();
        let name = name
            .map(str::to_owned)
            .or_else(|| object.buildable_id())
            .unwrap_or_else(|| type_name.to_owned());
        Self {
            object: object.downgrade(),
            object_id: object.id(),
            class: object.class(),
            title: format!("{type_name} — {name}"),
            name,
            type_name,
            label: object.text_content().unwrap_or_default(),
            style_classes: object.style_classes().join(" "),
            sensitive,
            bindings: Vec::new(),
        }
    }

    /// Whether the name, type name or label contains `needle`, ignoring case.
    pub fn matches_text(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        [self.name.as_str(), self.type_name, self.label.as_str()]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }
}

/// A cached field to overwrite with [`ObjectTree::update_field`](super::ObjectTree::update_field).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowField {
    Name(String),
    Label(String),
    StyleClasses(String),
    Sensitive(bool),
}

impl RowField {
    /// Store the value; `true` if it differed.
    pub(crate) fn apply(self, row: &mut Row) -> bool {
        match self {
            RowField::Name(name) if row.name != name => {
                row.title = format!("{} — {}", row.type_name, name);
                row.name = name;
            }
            RowField::Label(label) if row.label != label => row.label = label,
            RowField::StyleClasses(classes) if row.style_classes != classes => {
                row.style_classes = classes
            }
            RowField::Sensitive(sensitive) if row.sensitive != sensitive => {
                row.sensitive = sensitive
            }
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_prefers_caller_then_id_then_type() {
        let label = Object::builder(ClassTag::Label).id("greeting").label("hi").build();
        assert_eq!(Row::snapshot(&label, Some("model"), true).name, "model");
        assert_eq!(Row::snapshot(&label, None, true).name, "greeting");
        let bare = Object::new(ClassTag::ListStore);
        assert_eq!(Row::snapshot(&bare, None, true).name, "GiltListStore");
    }

    #[test]
    fn snapshot_reads_label_and_classes() {
        let button = Object::builder(ClassTag::Button)
            .label("OK")
            .style_class("suggested")
            .style_class("flat")
            .build();
        let row = Row::snapshot(&button, None, false);
        assert_eq!(row.label, "OK");
        assert_eq!(row.style_classes, "suggested flat");
        assert_eq!(row.title, "GiltButton — GiltButton");
        assert!(!row.sensitive);
    }

    #[test]
    fn text_match_is_case_insensitive() {
        let label = Object::builder(ClassTag::Label).label("Hello").build();
        let row = Row::snapshot(&label, None, true);
        assert!(row.matches_text("hell"));
        assert!(row.matches_text("giltlab"));
        assert!(!row.matches_text("window"));
    }

    #[test]
    fn apply_reports_change() {
        let label = Object::new(ClassTag::Label);
        let mut row = Row::snapshot(&label, None, true);
        assert!(RowField::Name("x".into()).apply(&mut row));
        assert_eq!(row.title, "GiltLabel — x");
        assert!(!RowField::Name("x".into()).apply(&mut row));
        assert!(RowField::Sensitive(false).apply(&mut row));
    }
}
