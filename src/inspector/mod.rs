//! The inspector: a live object tree, a search walker over it, and the
//! pages bound to the selected object.
//!
//! - [`Inspector`] — public handle; every operation runs to completion on the
//!   calling thread and then drains deferred work
//! - [`SelectionBinder`] — selection fan-out to pages
//! - [`InspectorError`] — errors from row and property operations
//!
//! Lifecycle: every tracked object gets a weak notification and a set of
//! signal subscriptions when its row is inserted. They are released when the
//! row is removed, whichever side goes first.

mod error;
mod hooks;
mod lifecycle;
mod selection;

pub use error::InspectorError;
pub use selection::SelectionBinder;

use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::Rc;

use tracing::{debug, warn};

use crate::config::InspectorConfig;
use crate::object::{install_map_observer, remove_map_observer, Object, ObjectRef};
use crate::object_tree::{ObjectTree, RowId, TreeEvent};
use crate::pages::{
    CssNodePage, GesturesPage, MiscInfoPage, Page, PageContext, PropertiesPage, SizeGroupsPage,
};

use hooks::MapHook;
use lifecycle::Shared;

/// Handles to the built-in pages, in display order.
#[derive(Debug, Clone)]
pub struct DefaultPages {
    pub properties: Rc<RefCell<PropertiesPage>>,
    pub css_nodes: Rc<RefCell<CssNodePage>>,
    pub size_groups: Rc<RefCell<SizeGroupsPage>>,
    pub gestures: Rc<RefCell<GesturesPage>>,
    pub misc: Rc<RefCell<MiscInfoPage>>,
}

pub struct Inspector {
    shared: Rc<Shared>,
}

impl Inspector {
    /// Create an inspector. Installs the map/unmap observer unless the
    /// config disables it.
    pub fn new(config: InspectorConfig) -> Self {
        let install = config.install_map_hooks;
        let shared = Rc::new(Shared::new(config));
        if install {
            let hook = install_map_observer(Rc::new(MapHook {
                shared: Rc::downgrade(&shared),
            }));
            shared.map_hook.set(Some(hook));
        }
        debug!(display = ?shared.config.display, map_hooks = install, "inspector started");
        Self { shared }
    }

    pub fn config(&self) -> &InspectorConfig {
        &self.shared.config
    }

    // -----------------------------------------------------------------------
    // Object tree
    // -----------------------------------------------------------------------

    /// Append each root in order.
    pub fn seed(&self, roots: &[ObjectRef]) -> Vec<RowId> {
        let rows = {
            let mut tree = self.shared.tree.borrow_mut();
            let rows = tree.seed(roots);
            self.shared.absorb_events(&mut tree);
            rows
        };
        self.shared.flush();
        rows
    }

    /// Drop every row and seed again from `roots`.
    pub fn rescan(&self, roots: &[ObjectRef]) -> Vec<RowId> {
        self.clear();
        self.seed(roots)
    }

    /// Register `object` under `parent`, or as a root. Returns the existing
    /// row if the object is already tracked.
    ///
    /// # Panics
    ///
    /// Panics if `parent` is not a row of the tree.
    pub fn append_under(&self, parent: Option<RowId>, object: &Object, name: Option<&str>) -> RowId {
        let row = {
            let mut tree = self.shared.tree.borrow_mut();
            let row = tree.append_under(parent, object, name);
            self.shared.absorb_events(&mut tree);
            row
        };
        self.shared.flush();
        row
    }

    /// Remove `row` and its subtree. Returns the number of rows removed; zero
    /// for a row that no longer exists.
    pub fn remove(&self, row: RowId) -> usize {
        let removed = {
            let mut tree = self.shared.tree.borrow_mut();
            let removed = self.shared.remove_rows(&mut tree, row);
            self.shared.absorb_events(&mut tree);
            removed
        };
        self.shared.flush();
        removed
    }

    /// Remove every row.
    pub fn clear(&self) {
        {
            let mut tree = self.shared.tree.borrow_mut();
            let roots = tree.roots().to_vec();
            for root in roots {
                self.shared.remove_rows(&mut tree, root);
            }
            tree.clear();
            self.shared.absorb_events(&mut tree);
        }
        self.shared.flush();
    }

    pub fn find(&self, object: &Object) -> Option<RowId> {
        self.shared.flush();
        self.shared.tree.borrow().find(object)
    }

    pub fn len(&self) -> usize {
        self.shared.flush();
        self.shared.tree.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrow the model. The borrow must not be held across calls back into
    /// the inspector. Objects finalized while it is held stay in the model
    /// until the next call.
    pub fn tree(&self) -> Ref<'_, ObjectTree> {
        self.shared.flush();
        self.shared.tree.borrow()
    }

    pub fn with_tree<R>(&self, f: impl FnOnce(&ObjectTree) -> R) -> R {
        self.shared.flush();
        f(&self.shared.tree.borrow())
    }

    /// Structural and field changes since the last call.
    pub fn take_events(&self) -> Vec<TreeEvent> {
        self.shared.take_events()
    }

    /// Deferred callbacks still waiting for the model.
    pub fn pending(&self) -> usize {
        self.shared.queued()
    }

    /// Process deferred callbacks.
    pub fn flush(&self) {
        self.shared.flush();
    }

    // -----------------------------------------------------------------------
    // Search
    // -----------------------------------------------------------------------

    /// Search for rows whose name, type name or label contains `text`.
    pub fn set_search_text(&self, text: &str) {
        let mut walker = self.shared.walker.borrow_mut();
        walker.set_predicate(lifecycle::text_search);
        walker.set_data(text.to_owned());
    }

    /// Replace the search predicate. `data` is the current search text.
    pub fn set_search_predicate(&self, predicate: impl Fn(&ObjectTree, RowId, &String) -> bool + 'static) {
        self.shared.walker.borrow_mut().set_predicate(predicate);
    }

    pub fn reset_walker(&self, row: Option<RowId>) {
        self.shared.walker.borrow_mut().reset(row);
    }

    pub fn walker_cursor(&self) -> Option<RowId> {
        self.shared.flush();
        self.shared.walker.borrow().cursor()
    }

    pub fn step_forward(&self) -> bool {
        self.shared.flush();
        let tree = self.shared.tree.borrow();
        self.shared.walker.borrow_mut().step_forward(&tree)
    }

    pub fn step_back(&self) -> bool {
        self.shared.flush();
        let tree = self.shared.tree.borrow();
        self.shared.walker.borrow_mut().step_back(&tree)
    }

    /// Step until the predicate matches. `None` (cursor unchanged) if nothing
    /// further matches; there is no wrap-around.
    pub fn next_match(&self, force_move: bool, backwards: bool) -> Option<RowId> {
        self.shared.flush();
        let tree = self.shared.tree.borrow();
        self.shared
            .walker
            .borrow_mut()
            .next_match(&tree, force_move, backwards)
    }

    // -----------------------------------------------------------------------
    // Selection and pages
    // -----------------------------------------------------------------------

    /// Append a page. It is bound to the current selection immediately.
    pub fn add_page<P: Page + 'static>(&self, page: P) -> Rc<RefCell<P>> {
        let page = Rc::new(RefCell::new(page));
        {
            let tree = self.shared.tree.borrow();
            self.shared
                .selection
                .borrow_mut()
                .add_page(Rc::clone(&page) as Rc<RefCell<dyn Page>>, &PageContext::new(&tree));
        }
        self.shared.flush();
        page
    }

    /// Add the built-in pages.
    pub fn add_default_pages(&self) -> DefaultPages {
        let config = &self.shared.config;
        DefaultPages {
            properties: self.add_page(PropertiesPage::new()),
            css_nodes: self.add_page(CssNodePage::new()),
            size_groups: self.add_page(SizeGroupsPage::new()),
            gestures: self.add_page(GesturesPage::new()),
            misc: self.add_page(
                MiscInfoPage::new(config.refresh_interval).with_frame_window(config.frame_history),
            ),
        }
    }

    /// Select `object`, or clear the selection.
    pub fn set_selection(&self, object: Option<&Object>) {
        {
            let tree = self.shared.tree.borrow();
            self.shared.select(&tree, object);
        }
        self.shared.flush();
    }

    /// Select the object behind `row`.
    pub fn select_row(&self, row: RowId) -> Result<(), InspectorError> {
        let object = {
            let tree = self.shared.tree.borrow();
            let data = tree.get(row).ok_or(InspectorError::UnknownRow)?;
            data.object.upgrade().ok_or(InspectorError::ObjectGone)?
        };
        self.set_selection(Some(&*object));
        Ok(())
    }

    pub fn selected(&self) -> Option<ObjectRef> {
        self.shared.flush();
        self.shared.selection.borrow().selected()
    }

    /// `None` if no page has that name.
    pub fn is_page_visible(&self, name: &str) -> Option<bool> {
        self.shared.flush();
        self.shared.selection.borrow().is_page_visible(name)
    }

    pub fn visible_pages(&self) -> Vec<&'static str> {
        self.shared.flush();
        self.shared.selection.borrow().visible_pages()
    }

    pub fn details_expanded(&self) -> bool {
        self.shared.selection.borrow().details_expanded()
    }

    pub fn scroll_target(&self) -> Option<RowId> {
        self.shared.selection.borrow().scroll_target()
    }

    /// Locate `object` in the tree, appending it under its logical parent's
    /// row if needed. Returns `None` (and changes nothing) when neither the
    /// object nor its parent is tracked.
    pub fn find_or_insert(&self, object: &Object) -> Option<RowId> {
        let row = {
            let mut tree = self.shared.tree.borrow_mut();
            if let Some(row) = tree.find(object) {
                return Some(row);
            }
            let Some(parent) = tree.logical_parent(object) else {
                warn!(object = %object.id(), class = %object.class(), "no parent to insert under");
                return None;
            };
            let Some(parent_row) = tree.find(&parent) else {
                warn!(
                    object = %object.id(),
                    parent = %parent.id(),
                    "parent is not in the tree"
                );
                return None;
            };
            let row = tree.append_under(Some(parent_row), object, None);
            self.shared.absorb_events(&mut tree);
            row
        };
        self.shared.flush();
        Some(row)
    }

    /// Show `object`: select it, expand the details view and scroll the tree
    /// to its row. Returns the row, if the object could be placed.
    pub fn activate(&self, object: &Object) -> Option<RowId> {
        let row = self.find_or_insert(object);
        self.set_selection(Some(object));
        {
            let mut selection = self.shared.selection.borrow_mut();
            selection.set_details_expanded(true);
            selection.set_scroll_target(row);
        }
        row
    }

    // -----------------------------------------------------------------------
    // Shutdown
    // -----------------------------------------------------------------------

    /// Uninstall the map observer, release every binding and clear the
    /// selection. Idempotent.
    pub fn shutdown(&self) {
        if let Some(hook) = self.shared.map_hook.take() {
            remove_map_observer(hook);
        }
        self.set_selection(None);
        self.clear();
        self.shared.walker.borrow_mut().reset(None);
        debug!("inspector shut down");
    }
}

impl Default for Inspector {
    fn default() -> Self {
        Self::new(InspectorConfig::default())
    }
}

impl Drop for Inspector {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl fmt::Debug for Inspector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inspector")
            .field("rows", &self.shared.tree.borrow().len())
            .field("selection", &*self.shared.selection.borrow())
            .field("walker", &*self.shared.walker.borrow())
            .finish_non_exhaustive()
    }
}
