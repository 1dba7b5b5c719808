//! Property list page.

use crate::inspector::InspectorError;
use crate::object::{ClassTag, Object, Property, Value, WeakObject};

use super::{ObjectChange, Page, PageContext};

/// One line of the property list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyRow {
    pub name: String,
    pub value: String,
    pub type_name: &'static str,
    /// Class that defines the property.
    pub defined_at: &'static str,
    pub writable: bool,
    /// Model column bound to this property through the renderer's cell layout.
    pub attribute: Option<i32>,
}

impl PropertyRow {
    fn new(property: &Property, attribute: Option<i32>) -> Self {
        Self {
            name: property.name.clone(),
            value: property.value.to_string(),
            type_name: property.value.type_name(),
            defined_at: property.owner.name(),
            writable: property.writable,
            attribute,
        }
    }
}

/// Lists every property of the selected object. Accepts any object.
#[derive(Debug, Default)]
pub struct PropertiesPage {
    object: WeakObject,
    rows: Vec<PropertyRow>,
}

impl PropertiesPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows in installation order.
    pub fn rows(&self) -> &[PropertyRow] {
        &self.rows
    }

    pub fn row(&self, name: &str) -> Option<&PropertyRow> {
        self.rows.iter().find(|r| r.name == name)
    }

    pub fn object(&self) -> Option<crate::object::ObjectRef> {
        self.object.upgrade()
    }

    /// Write a property on the bound object and refresh its row.
    pub fn set_value(&mut self, name: &str, value: Value) -> Result<(), InspectorError> {
        let object = self.object.upgrade().ok_or(InspectorError::ObjectGone)?;
        object.set_property(name, value)?;
        self.refresh_row(&object, name);
        Ok(())
    }

    fn attribute(object: &Object, name: &str, ctx: &PageContext<'_>) -> Option<i32> {
        if !object.is_a(ClassTag::CellRenderer) {
            return None;
        }
        ctx.tree
            .tables()
            .cell_layout_owner(object)?
            .attribute_column(object, name)
    }

    fn refresh_row(&mut self, object: &Object, name: &str) {
        let Some(row) = self.rows.iter_mut().find(|r| r.name == name) else {
            return;
        };
        if let Some(value) = object.property(name) {
            row.value = value.to_string();
        }
    }
}

impl Page for PropertiesPage {
    fn name(&self) -> &'static str {
        "properties"
    }

    fn set_object(&mut self, object: Option<&Object>, ctx: &PageContext<'_>) -> bool {
        self.rows.clear();
        let Some(object) = object else {
            self.object = WeakObject::new();
            return false;
        };
        self.object = object.downgrade();
        self.rows = object
            .properties()
            .iter()
            .map(|p| PropertyRow::new(p, Self::attribute(object, &p.name, ctx)))
            .collect();
        true
    }

    fn object_changed(&mut self, object: &Object, change: &ObjectChange, ctx: &PageContext<'_>) {
        let ObjectChange::Notify(name) = change else {
            return;
        };
        if self.row(name).is_some() {
            self.refresh_row(object, name);
        } else if let Some(property) = object.properties().iter().find(|p| &p.name == name) {
            self.rows
                .push(PropertyRow::new(property, Self::attribute(object, name, ctx)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::PropertyError;
    use crate::object_tree::ObjectTree;

    #[test]
    fn lists_properties_with_owner() {
        let tree = ObjectTree::new();
        let label = Object::builder(ClassTag::Label).label("hi").build();
        let mut page = PropertiesPage::new();
        assert!(page.set_object(Some(&*label), &PageContext::new(&tree)));

        let row = page.row("label").unwrap();
        assert_eq!(row.value, "hi");
        assert_eq!(row.type_name, "gchararray");
        assert_eq!(row.defined_at, "GiltLabel");
        assert!(row.writable);
        assert_eq!(page.row("visible").unwrap().defined_at, "GiltWidget");
    }

    #[test]
    fn declines_nothing() {
        let tree = ObjectTree::new();
        let mut page = PropertiesPage::new();
        assert!(!page.set_object(None, &PageContext::new(&tree)));
        assert!(page.rows().is_empty());
    }

    #[test]
    fn notify_refreshes_in_place() {
        let tree = ObjectTree::new();
        let ctx = PageContext::new(&tree);
        let label = Object::builder(ClassTag::Label).label("a").build();
        let mut page = PropertiesPage::new();
        page.set_object(Some(&*label), &ctx);
        let count = page.rows().len();

        label.set_label("b");
        page.object_changed(&label, &ObjectChange::Notify("label".into()), &ctx);
        assert_eq!(page.row("label").unwrap().value, "b");
        assert_eq!(page.rows().len(), count);
    }

    #[test]
    fn set_value_reports_errors() {
        let tree = ObjectTree::new();
        let label = Object::new(ClassTag::Label);
        let mut page = PropertiesPage::new();
        page.set_object(Some(&*label), &PageContext::new(&tree));

        page.set_value("label", Value::Str("new".into())).unwrap();
        assert_eq!(page.row("label").unwrap().value, "new");
        assert!(matches!(
            page.set_value("label", Value::Bool(true)),
            Err(InspectorError::Property(PropertyError::TypeMismatch { .. }))
        ));
        drop(label);
        assert!(matches!(
            page.set_value("label", Value::Str("x".into())),
            Err(InspectorError::ObjectGone)
        ));
    }

    #[test]
    fn renderer_attribute_column() {
        let view = Object::new(ClassTag::TreeView);
        let column = Object::new(ClassTag::TreeViewColumn);
        let text = Object::builder(ClassTag::CellRendererText)
            .property(Property::new("text", Value::Str(String::new()), ClassTag::CellRendererText))
            .build();
        view.append_item(&column);
        column.pack_renderer(&text);
        column.add_attribute(&text, "text", 3);

        let mut tree = ObjectTree::new();
        tree.append_under(None, &view, None);
        let mut page = PropertiesPage::new();
        page.set_object(Some(&*text), &PageContext::new(&tree));
        assert_eq!(page.row("text").unwrap().attribute, Some(3));
    }
}
