//! Inspector pages: view models bound to the current selection.
//!
//! - [`properties`] — property list with live refresh
//! - [`css_node_tree`] — style node tree and computed style rows
//! - [`size_groups`] — size-group membership
//! - [`gestures`] — event controllers by propagation phase
//! - [`misc_info`] — identity, geometry and frame statistics with a 1 Hz refresher
//! - [`resources`] — resource bundle browser (not selection-bound)

pub mod css_node_tree;
pub mod gestures;
pub mod misc_info;
pub mod properties;
pub mod resources;
pub mod size_groups;

pub use css_node_tree::{CssNodePage, CssRow, CssRowId, StylePropertyRow};
pub use gestures::{GestureRow, GesturesPage};
pub use misc_info::{MiscInfo, MiscInfoPage};
pub use properties::{PropertiesPage, PropertyRow};
pub use resources::{ResourceBrowser, ResourceBundle, ResourceEntry, ResourceId};
pub use size_groups::{SizeGroupRow, SizeGroupsPage};

use crate::object::Object;
use crate::object_tree::ObjectTree;

/// What changed on the selected object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectChange {
    /// A property changed.
    Notify(String),
    StateFlags,
    Allocation,
    Focus,
    /// The object's CSS node restyled.
    Style,
    Mapped(bool),
}

/// Read-only view of the inspector a page may consult while binding.
#[derive(Clone, Copy)]
pub struct PageContext<'a> {
    pub tree: &'a ObjectTree,
}

impl<'a> PageContext<'a> {
    pub fn new(tree: &'a ObjectTree) -> Self {
        Self { tree }
    }

    /// How the tree names `object`: its row name if tracked, else its
    /// buildable id, else its type name.
    pub fn display_name(&self, object: &Object) -> String {
        self.tree
            .find(object)
            .and_then(|row| self.tree.get(row))
            .map(|row| row.name.clone())
            .or_else(|| object.buildable_id())
            .unwrap_or_else(|| object.class().name().to_owned())
    }

    /// The `"{type} — {name}"` header of a tracked object.
    pub fn title(&self, object: &Object) -> Option<String> {
        let row = self.tree.find(object)?;
        self.tree.get(row).map(|row| row.title.clone())
    }
}

/// A view bound to the selected object.
pub trait Page {
    /// Stable page name.
    fn name(&self) -> &'static str;

    /// Bind to `object` (or unbind with `None`). Returning `false` declines;
    /// the binder hides declining pages.
    fn set_object(&mut self, object: Option<&Object>, ctx: &PageContext<'_>) -> bool;

    /// The bound object changed.
    fn object_changed(&mut self, _object: &Object, _change: &ObjectChange, _ctx: &PageContext<'_>) {}
}
