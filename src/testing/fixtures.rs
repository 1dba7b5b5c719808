//! Small object hierarchies for tests.

use crate::object::{ClassTag, Object, ObjectRef};

/// `[Settings#1, App#1, Window#W1, Window#W2]`, in that order.
pub fn seed_roots() -> Vec<ObjectRef> {
    vec![
        Object::builder(ClassTag::Settings).id("Settings#1").build(),
        Object::builder(ClassTag::Application).id("App#1").build(),
        Object::builder(ClassTag::Window).id("W1").build(),
        Object::builder(ClassTag::Window).id("W2").build(),
    ]
}

/// A window holding a box with a label and a button:
/// `W1 → B → [L("hello"), Btn("OK")]`.
#[derive(Debug, Clone)]
pub struct Scene {
    pub window: ObjectRef,
    pub boxed: ObjectRef,
    pub label: ObjectRef,
    pub button: ObjectRef,
}

impl Scene {
    pub fn new() -> Self {
        let window = Object::builder(ClassTag::Window).id("W1").title("Main").build();
        let boxed = Object::builder(ClassTag::Box).id("B").build();
        let label = Object::builder(ClassTag::Label).id("L").label("hello").build();
        let button = Object::builder(ClassTag::Button)
            .id("Btn")
            .label("OK")
            .style_class("suggested")
            .build();
        boxed.add(&label);
        boxed.add(&button);
        window.add(&boxed);
        Self {
            window,
            boxed,
            label,
            button,
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

/// Top-level labels, one per `(id, text)` pair.
pub fn flat_labels(labels: &[(&str, &str)]) -> Vec<ObjectRef> {
    labels
        .iter()
        .map(|(id, text)| Object::builder(ClassTag::Label).id(*id).label(*text).build())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_is_wired() {
        let scene = Scene::new();
        assert_eq!(scene.boxed.parent().map(|p| p.id()), Some(scene.window.id()));
        assert_eq!(scene.boxed.children().len(), 2);
        assert_eq!(scene.button.text_content().as_deref(), Some("OK"));
    }

    #[test]
    fn roots_in_order() {
        let ids: Vec<_> = seed_roots()
            .iter()
            .filter_map(|o| o.buildable_id())
            .collect();
        assert_eq!(ids, vec!["Settings#1", "App#1", "W1", "W2"]);
    }
}
