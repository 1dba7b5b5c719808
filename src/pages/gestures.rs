//! Event controllers of a widget, grouped by propagation phase.

use crate::object::{Object, Phase};

use super::{Page, PageContext};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GestureRow {
    pub phase: Phase,
    pub type_name: &'static str,
    pub name: String,
}

/// Declines non-widgets and widgets without controllers.
#[derive(Debug, Default)]
pub struct GesturesPage {
    rows: Vec<GestureRow>,
}

impl GesturesPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows ordered capture, bubble, target; attachment order within a phase.
    pub fn rows(&self) -> &[GestureRow] {
        &self.rows
    }

    pub fn phase(&self, phase: Phase) -> impl Iterator<Item = &GestureRow> + '_ {
        self.rows.iter().filter(move |r| r.phase == phase)
    }
}

impl Page for GesturesPage {
    fn name(&self) -> &'static str {
        "gestures"
    }

    fn set_object(&mut self, object: Option<&Object>, ctx: &PageContext<'_>) -> bool {
        self.rows.clear();
        let Some(object) = object.filter(|o| o.class().is_widget()) else {
            return false;
        };
        for phase in Phase::ALL {
            for controller in object.controllers(phase) {
                self.rows.push(GestureRow {
                    phase,
                    type_name: controller.class().name(),
                    name: ctx.display_name(&controller),
                });
            }
        }
        !self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::ClassTag;
    use crate::object_tree::ObjectTree;

    #[test]
    fn groups_by_phase() {
        let tree = ObjectTree::new();
        let button = Object::new(ClassTag::Button);
        let target = Object::new(ClassTag::EventController);
        let click = Object::new(ClassTag::GestureClick);
        let capture = Object::new(ClassTag::Gesture);
        button.add_controller(&target, Phase::Target);
        button.add_controller(&click, Phase::Bubble);
        button.add_controller(&capture, Phase::Capture);

        let mut page = GesturesPage::new();
        assert!(page.set_object(Some(&*button), &PageContext::new(&tree)));
        let order: Vec<_> = page.rows().iter().map(|r| (r.phase, r.type_name)).collect();
        assert_eq!(
            order,
            vec![
                (Phase::Capture, "GiltGesture"),
                (Phase::Bubble, "GiltGestureClick"),
                (Phase::Target, "GiltEventController"),
            ]
        );
        assert_eq!(page.phase(Phase::Bubble).count(), 1);
    }

    #[test]
    fn declines_without_controllers() {
        let tree = ObjectTree::new();
        let mut page = GesturesPage::new();
        let label = Object::new(ClassTag::Label);
        assert!(!page.set_object(Some(&*label), &PageContext::new(&tree)));
        assert!(!page.set_object(None, &PageContext::new(&tree)));
    }
}
