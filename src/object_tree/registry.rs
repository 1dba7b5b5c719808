//! Ordered type-dispatch table: how to find an object's logical parent,
//! enumerate its logical children and decide whether its row is sensitive.
//!
//! Families are tried most-specific first; the first whose class predicate
//! matches wins. [`Family::Object`] matches everything and sits last.

use std::rc::Rc;

use crate::object::{ClassTag, Object, ObjectRef, Phase, Slot};

use super::side_tables::SideTables;

/// Callback receiving `(child, relation label)`.
pub type ChildVisitor<'a> = dyn FnMut(&ObjectRef, Option<&str>) + 'a;

/// Built-in object families, in lookup order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    Application,
    TagTable,
    TextBuffer,
    TextView,
    IconView,
    TreeView,
    ComboBox,
    MenuItem,
    Container,
    Widget,
    SortFilterModel,
    CellArea,
    /// Cell layouts that are not themselves cell areas.
    CellLayout,
    /// Fallback: no parent, no children, always sensitive.
    Object,
}

impl Family {
    pub const ORDER: [Family; 14] = [
        Family::Application,
        Family::TagTable,
        Family::TextBuffer,
        Family::TextView,
        Family::IconView,
        Family::TreeView,
        Family::ComboBox,
        Family::MenuItem,
        Family::Container,
        Family::Widget,
        Family::SortFilterModel,
        Family::CellArea,
        Family::CellLayout,
        Family::Object,
    ];

    /// Controller phases in enumeration order.
    const PHASES: [Phase; 3] = [Phase::Capture, Phase::Target, Phase::Bubble];

    /// The first family in [`Family::ORDER`] matching `class`.
    pub fn lookup(class: ClassTag) -> Family {
        Self::ORDER
            .into_iter()
            .find(|family| family.matches(class))
            .unwrap_or(Family::Object)
    }

    pub fn for_object(object: &Object) -> Family {
        Self::lookup(object.class())
    }

    pub fn matches(self, class: ClassTag) -> bool {
        match self {
            Family::Application => class.is_a(ClassTag::Application),
            Family::TagTable => class.is_a(ClassTag::TextTagTable),
            Family::TextBuffer => class.is_a(ClassTag::TextBuffer),
            Family::TextView => class.is_a(ClassTag::TextView),
            Family::IconView => class.is_a(ClassTag::IconView),
            Family::TreeView => class.is_a(ClassTag::TreeView),
            Family::ComboBox => class.is_a(ClassTag::ComboBox),
            Family::MenuItem => class.is_a(ClassTag::MenuItem),
            Family::Container => class.is_container(),
            Family::Widget => class.is_widget(),
            Family::SortFilterModel => {
                class.is_a(ClassTag::TreeModelSort) || class.is_a(ClassTag::TreeModelFilter)
            }
            Family::CellArea => class.is_a(ClassTag::CellArea),
            Family::CellLayout => class.is_cell_layout(),
            Family::Object => true,
        }
    }

    fn is_widget_family(self) -> bool {
        matches!(
            self,
            Family::TextView
                | Family::IconView
                | Family::TreeView
                | Family::ComboBox
                | Family::MenuItem
                | Family::Container
                | Family::Widget
        )
    }

    /// The logical parent of `object`.
    pub fn parent(self, object: &Object, tables: &SideTables) -> Option<ObjectRef> {
        if self.is_widget_family() {
            return object.parent().or_else(|| tables.synthetic_parent(object));
        }
        match self {
            Family::Object => object
                .controller_widget()
                .or_else(|| tables.synthetic_parent(object)),
            _ => tables.synthetic_parent(object),
        }
    }

    /// Visit every logical child of `object` with its relation label.
    pub fn for_each_child(self, object: &Object, tables: &mut SideTables, visit: &mut ChildVisitor<'_>) {
        match self {
            Family::Application => {
                visit_slot(object, Slot::AppMenu, visit);
                visit_slot(object, Slot::Menubar, visit);
            }
            Family::TagTable => {
                for tag in object.items() {
                    let name = tag.str_property("name");
                    visit(&tag, name.as_deref());
                }
            }
            Family::TextBuffer => visit_slot(object, Slot::TagTable, visit),
            Family::TextView => {
                visit_slot(object, Slot::Buffer, visit);
                Family::Container.for_each_child(object, tables, visit);
            }
            Family::IconView => {
                visit_slot(object, Slot::Model, visit);
                Family::Container.for_each_child(object, tables, visit);
            }
            Family::TreeView => {
                visit_slot(object, Slot::Model, visit);
                visit_slot(object, Slot::Selection, visit);
                for column in object.items() {
                    if !column.class().is_widget() {
                        visit(&column, None);
                    }
                }
                Family::Container.for_each_child(object, tables, visit);
            }
            Family::ComboBox => {
                visit_slot(object, Slot::Popup, visit);
                visit_slot(object, Slot::Model, visit);
                Family::Container.for_each_child(object, tables, visit);
            }
            Family::MenuItem => {
                visit_slot(object, Slot::Submenu, visit);
                Family::Container.for_each_child(object, tables, visit);
            }
            Family::Container => {
                Family::Widget.for_each_child(object, tables, visit);
                for child in object.children() {
                    visit(&child, None);
                }
            }
            Family::Widget => {
                for phase in Self::PHASES {
                    for controller in object.controllers(phase) {
                        visit(&controller, Some(phase.label()));
                    }
                }
                if object.class().is_toplevel() {
                    visit_slot(object, Slot::FrameClock, visit);
                }
            }
            Family::SortFilterModel => visit_slot(object, Slot::ChildModel, visit),
            Family::CellArea => {
                let owner = tables.cell_layout_owner(object);
                for renderer in object.items() {
                    match &owner {
                        Some(layout) => tables.set_cell_layout_owner(&renderer, layout),
                        None => tables.set_cell_layout_owner(&renderer, object),
                    }
                    visit(&renderer, None);
                }
            }
            Family::CellLayout => {
                if let Some(area) = object.slot(Slot::CellArea) {
                    tables.set_cell_layout_owner(&area, object);
                    visit(&area, Some(Slot::CellArea.label()));
                }
            }
            Family::Object => {}
        }
    }

    /// Whether the row for `object` renders as active.
    pub fn sensitive(self, object: &Object) -> bool {
        if self.is_widget_family() {
            object.is_mapped()
        } else {
            true
        }
    }
}

fn visit_slot(object: &Object, slot: Slot, visit: &mut ChildVisitor<'_>) {
    if let Some(child) = object.slot(slot) {
        visit(&child, Some(slot.label()));
    }
}

// ---------------------------------------------------------------------------
// Convenience entry points
// ---------------------------------------------------------------------------

pub fn parent(object: &Object, tables: &SideTables) -> Option<ObjectRef> {
    Family::for_object(object).parent(object, tables)
}

pub fn for_each_child(object: &Object, tables: &mut SideTables, visit: &mut ChildVisitor<'_>) {
    Family::for_object(object).for_each_child(object, tables, visit)
}

/// Children with owned labels, in enumeration order.
pub fn children(object: &Object, tables: &mut SideTables) -> Vec<(ObjectRef, Option<String>)> {
    let mut out = Vec::new();
    for_each_child(object, tables, &mut |child, label| {
        out.push((Rc::clone(child), label.map(str::to_owned)));
    });
    out
}

pub fn sensitive(object: &Object) -> bool {
    Family::for_object(object).sensitive(object)
}
