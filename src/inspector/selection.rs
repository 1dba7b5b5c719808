//! The selected object and the pages bound to it.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::object::{Object, ObjectId, ObjectRef, WeakObject};
use crate::object_tree::RowId;
use crate::pages::{ObjectChange, Page, PageContext};

struct PageSlot {
    name: &'static str,
    page: Rc<RefCell<dyn Page>>,
    visible: bool,
}

impl PageSlot {
    fn bind(&mut self, object: Option<&Object>, ctx: &PageContext<'_>) {
        let Ok(mut page) = self.page.try_borrow_mut() else {
            trace!(page = self.name, "page busy, binding skipped");
            return;
        };
        let accepted = page.set_object(object, ctx);
        self.visible = object.is_some() && accepted;
    }
}

/// Holds at most one selected object and fans it out to an ordered list of
/// pages. Pages that decline the selection are hidden.
#[derive(Default)]
pub struct SelectionBinder {
    pages: Vec<PageSlot>,
    selected: WeakObject,
    details_expanded: bool,
    scroll_target: Option<RowId>,
}

impl SelectionBinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a page and bind it to the current selection. Returns whether it
    /// is visible.
    pub fn add_page(&mut self, page: Rc<RefCell<dyn Page>>, ctx: &PageContext<'_>) -> bool {
        let name = page.borrow().name();
        let mut slot = PageSlot {
            name,
            page,
            visible: false,
        };
        let selected = self.selected();
        slot.bind(selected.as_deref(), ctx);
        let visible = slot.visible;
        self.pages.push(slot);
        visible
    }

    /// Bind every page to `object`, or unbind them all with `None`.
    pub fn set_selection(&mut self, object: Option<&Object>, ctx: &PageContext<'_>) {
        debug!(object = ?object.map(Object::id), "selection changed");
        self.selected = object.map(Object::downgrade).unwrap_or_default();
        for slot in &mut self.pages {
            slot.bind(object, ctx);
        }
    }

    pub fn selected(&self) -> Option<ObjectRef> {
        self.selected.upgrade()
    }

    /// Identity of the selection, even after it died.
    pub fn selected_id(&self) -> Option<ObjectId> {
        self.selected.id()
    }

    /// Forward a change on the selected object to the visible pages.
    pub fn object_changed(&mut self, object: &Object, change: &ObjectChange, ctx: &PageContext<'_>) {
        for slot in self.pages.iter().filter(|s| s.visible) {
            match slot.page.try_borrow_mut() {
                Ok(mut page) => page.object_changed(object, change, ctx),
                Err(_) => trace!(page = slot.name, ?change, "page busy, change dropped"),
            }
        }
    }

    /// `None` if no page has that name.
    pub fn is_page_visible(&self, name: &str) -> Option<bool> {
        self.pages.iter().find(|s| s.name == name).map(|s| s.visible)
    }

    pub fn visible_pages(&self) -> Vec<&'static str> {
        self.pages
            .iter()
            .filter(|s| s.visible)
            .map(|s| s.name)
            .collect()
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn details_expanded(&self) -> bool {
        self.details_expanded
    }

    pub fn set_details_expanded(&mut self, expanded: bool) {
        self.details_expanded = expanded;
    }

    /// The row the tree view should scroll to.
    pub fn scroll_target(&self) -> Option<RowId> {
        self.scroll_target
    }

    pub fn set_scroll_target(&mut self, row: Option<RowId>) {
        self.scroll_target = row;
    }
}

impl fmt::Debug for SelectionBinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionBinder")
            .field("selected", &self.selected)
            .field("visible", &self.visible_pages())
            .field("details_expanded", &self.details_expanded)
            .finish_non_exhaustive()
    }
}
