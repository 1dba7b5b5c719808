//! Cell layouts: packing renderers into a cell area and mapping renderer
//! properties to model columns.

use super::class::ClassTag;
use super::handle::{Object, ObjectId, ObjectRef, Slot};

/// One `renderer.property ← model column` mapping on a cell layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CellAttribute {
    pub(crate) renderer: ObjectId,
    pub(crate) property: String,
    pub(crate) column: i32,
}

impl Object {
    /// The cell area of a cell layout, creating a box area on first use.
    pub fn cell_area(&self) -> Option<ObjectRef> {
        if !self.class().is_cell_layout() {
            return None;
        }
        if self.is_a(ClassTag::CellArea) {
            return self.to_ref();
        }
        if let Some(area) = self.slot(Slot::CellArea) {
            return Some(area);
        }
        let area = Object::new(ClassTag::CellAreaBox);
        self.set_slot(Slot::CellArea, Some(&area));
        Some(area)
    }

    /// Pack `renderer` at the end of this layout's cell area.
    pub fn pack_renderer(&self, renderer: &ObjectRef) {
        debug_assert!(renderer.is_a(ClassTag::CellRenderer));
        if let Some(area) = self.cell_area() {
            area.append_item(renderer);
        }
    }

    /// Renderers packed into this layout, in packing order.
    pub fn renderers(&self) -> Vec<ObjectRef> {
        self.cell_area().map(|area| area.items()).unwrap_or_default()
    }

    /// Bind `property` of `renderer` to model column `column`.
    pub fn add_attribute(&self, renderer: &Object, property: &str, column: i32) {
        let mut state = self.state.borrow_mut();
        state
            .attributes
            .retain(|a| !(a.renderer == renderer.id() && a.property == property));
        state.attributes.push(CellAttribute {
            renderer: renderer.id(),
            property: property.to_owned(),
            column,
        });
    }

    /// Model column bound to `property` of `renderer` on this layout.
    pub fn attribute_column(&self, renderer: &Object, property: &str) -> Option<i32> {
        self.state
            .borrow()
            .attributes
            .iter()
            .find(|a| a.renderer == renderer.id() && a.property == property)
            .map(|a| a.column)
    }

    pub fn clear_attributes(&self, renderer: &Object) {
        self.state
            .borrow_mut()
            .attributes
            .retain(|a| a.renderer != renderer.id());
    }

    /// Whether `renderer` is packed into this layout.
    pub fn has_renderer(&self, renderer: &Object) -> bool {
        self.renderers().iter().any(|r| r.id() == renderer.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_gets_box_area_lazily() {
        let column = Object::new(ClassTag::TreeViewColumn);
        assert!(column.slot(Slot::CellArea).is_none());
        let area = column.cell_area().unwrap();
        assert_eq!(area.class(), ClassTag::CellAreaBox);
        assert_eq!(column.cell_area().unwrap().id(), area.id());
    }

    #[test]
    fn area_is_its_own_layout() {
        let area = Object::new(ClassTag::CellAreaBox);
        assert_eq!(area.cell_area().unwrap().id(), area.id());
    }

    #[test]
    fn non_layouts_have_no_area() {
        let label = Object::new(ClassTag::Label);
        assert!(label.cell_area().is_none());
    }

    #[test]
    fn attributes_replace_per_property() {
        let column = Object::new(ClassTag::TreeViewColumn);
        let text = Object::new(ClassTag::CellRendererText);
        column.pack_renderer(&text);
        column.add_attribute(&text, "text", 0);
        column.add_attribute(&text, "text", 2);
        assert_eq!(column.attribute_column(&text, "text"), Some(2));
        assert_eq!(column.attribute_column(&text, "visible"), None);
        assert!(column.has_renderer(&text));
        column.clear_attributes(&text);
        assert_eq!(column.attribute_column(&text, "text"), None);
    }
}
