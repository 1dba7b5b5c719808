//! Object construction with per-class default properties.

use super::class::ClassTag;
use super::frame_clock::FrameClockState;
use super::handle::{Object, ObjectRef, ObjectState, Slot};
use super::property::{Property, Value};
use super::size_group::{SizeGroupMode, SizeGroupState};
use crate::style::CssNode;

/// Builder for [`Object`]s.
///
/// Widgets get a CSS node named after their class; toplevels get a frame
/// clock.
#[derive(Debug, Clone)]
pub struct ObjectBuilder {
    class: ClassTag,
    id: Option<String>,
    label: Option<String>,
    title: Option<String>,
    style_classes: Vec<String>,
    visible: bool,
    extra: Vec<Property>,
}

impl ObjectBuilder {
    pub fn new(class: ClassTag) -> Self {
        Self {
            class,
            id: None,
            label: None,
            title: None,
            style_classes: Vec::new(),
            visible: true,
            extra: Vec::new(),
        }
    }

    /// Buildable id; also the CSS `#id` of widgets.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Add a style class. Duplicates are ignored.
    pub fn style_class(mut self, class: impl Into<String>) -> Self {
        let class = class.into();
        if !self.style_classes.contains(&class) {
            self.style_classes.push(class);
        }
        self
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Install an additional property.
    pub fn property(mut self, property: Property) -> Self {
        self.extra.push(property);
        self
    }

    pub fn build(self) -> ObjectRef {
        let class = self.class;
        let state = ObjectState {
            buildable_id: self.id.clone(),
            frame_clock: (class == ClassTag::FrameClock).then(FrameClockState::default),
            size_group: (class == ClassTag::SizeGroup).then(SizeGroupState::default),
            ..ObjectState::default()
        };
        let object = Object::with_state(class, state);

        for property in default_properties(class, &self) {
            object.install_property(property);
        }
        for property in self.extra {
            object.install_property(property);
        }

        if class.is_widget() {
            let node = CssNode::new(class.css_name());
            if let Some(id) = &self.id {
                node.set_id(Some(id));
            }
            for style_class in &self.style_classes {
                node.add_class(style_class);
            }
            node.set_visible(self.visible);
            object.set_css_node(node);
        }
        if class.is_toplevel() {
            let clock = Object::new(ClassTag::FrameClock);
            object.set_slot(Slot::FrameClock, Some(&clock));
        }
        object
    }
}

fn default_properties(class: ClassTag, builder: &ObjectBuilder) -> Vec<Property> {
    let text = |value: &Option<String>| Value::Str(value.clone().unwrap_or_default());
    let mut props = Vec::new();

    if class.is_widget() {
        let owner = ClassTag::Widget;
        props.push(Property::new("name", text(&builder.id), owner));
        props.push(Property::new("visible", Value::Bool(builder.visible), owner));
        props.push(Property::new("sensitive", Value::Bool(true), owner));
        props.push(Property::new("can-focus", Value::Bool(false), owner));
    }
    if class.is_a(ClassTag::Label) {
        props.push(Property::new("label", text(&builder.label), ClassTag::Label));
        props.push(Property::new("use-markup", Value::Bool(false), ClassTag::Label));
    }
    if class.is_a(ClassTag::Button) || class.is_a(ClassTag::MenuItem) {
        props.push(Property::new("label", text(&builder.label), class));
    }
    if class.is_toplevel() {
        props.push(Property::new("title", text(&builder.title), ClassTag::Window));
        props.push(Property::new("resizable", Value::Bool(true), ClassTag::Window));
    }
    match class {
        ClassTag::TreeViewColumn => {
            props.push(Property::new("title", text(&builder.title), class));
            props.push(Property::new("expand", Value::Bool(false), class));
        }
        ClassTag::TextTag => {
            props.push(Property::new("name", text(&builder.id), class).read_only());
        }
        ClassTag::TextBuffer => {
            props.push(Property::new("text", text(&builder.label), class));
        }
        ClassTag::Application => {
            props.push(Property::new("application-id", text(&builder.id), class).read_only());
        }
        ClassTag::Settings => {
            props.push(Property::new("theme-name", Value::Str("Default".into()), class));
            props.push(Property::new("font-name", Value::Str("Sans 10".into()), class));
        }
        ClassTag::SizeGroup => {
            props.push(Property::new(
                "mode",
                Value::Enum(SizeGroupMode::Horizontal.nick()),
                class,
            ));
        }
        ClassTag::Adjustment => {
            props.push(Property::new("value", Value::Float(0.0), class));
            props.push(Property::new("upper", Value::Float(100.0), class));
        }
        _ => {}
    }
    props
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widget_defaults() {
        let label = Object::builder(ClassTag::Label)
            .id("greeting")
            .label("hi")
            .style_class("dim")
            .build();
        assert_eq!(label.buildable_id().as_deref(), Some("greeting"));
        assert_eq!(label.property("name"), Some(Value::Str("greeting".into())));
        assert_eq!(label.property("label"), Some(Value::Str("hi".into())));
        assert_eq!(label.style_classes(), vec!["dim"]);
        let node = label.css_node().unwrap();
        assert_eq!(node.name(), "label");
        assert_eq!(node.id().as_deref(), Some("greeting"));
    }

    #[test]
    fn non_widgets_have_no_css_node() {
        let store = Object::new(ClassTag::ListStore);
        assert!(store.css_node().is_none());
        assert!(store.properties().is_empty());
    }

    #[test]
    fn toplevel_gets_frame_clock() {
        let window = Object::builder(ClassTag::Window).title("Main").build();
        let clock = window.slot(Slot::FrameClock).unwrap();
        assert_eq!(clock.class(), ClassTag::FrameClock);
        assert_eq!(clock.frame_counter(), 0);
    }

    #[test]
    fn tag_name_is_read_only() {
        let tag = Object::builder(ClassTag::TextTag).id("bold").build();
        assert!(tag.set_property("name", Value::Str("x".into())).is_err());
    }

    #[test]
    fn extra_properties_are_installed() {
        let obj = Object::builder(ClassTag::Object)
            .property(Property::new("answer", Value::Int(42), ClassTag::Object))
            .build();
        assert_eq!(obj.property("answer"), Some(Value::Int(42)));
    }
}
