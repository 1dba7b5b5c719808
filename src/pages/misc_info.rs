//! Misc-info page: identity, geometry, mapping and frame statistics.
//!
//! While the page is mapped a local tokio task re-reads the bound object once
//! per refresh interval. Unmapping (or dropping the page) aborts the task.
//! [`MiscInfoPage::map`] must run inside a [`tokio::task::LocalSet`].

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::trace;

use crate::object::frame_clock::FRAME_HISTORY;
use crate::object::{ClassTag, Object, ObjectRef, WeakObject};

use super::{ObjectChange, Page, PageContext};

/// Snapshot of the bound object.
#[derive(Debug, Clone, PartialEq)]
pub struct MiscInfo {
    pub type_name: &'static str,
    pub address: String,
    /// Strong references, not counting the one used to take the snapshot.
    pub ref_count: usize,
    pub buildable_id: Option<String>,
    pub state: Option<String>,
    pub focus_widget: Option<String>,
    pub allocation: Option<String>,
    pub baseline: Option<i32>,
    pub clip: Option<String>,
    pub mapped: bool,
    pub realized: bool,
    pub visible: bool,
    pub is_toplevel: bool,
    pub frame_count: Option<u64>,
    pub fps: Option<String>,
    pub tick_callback: bool,
}

impl MiscInfo {
    /// Read everything through `object`.
    pub fn capture(object: &ObjectRef, frame_window: usize) -> Self {
        let widget = object.class().is_widget();
        let clock = if object.class() == ClassTag::FrameClock {
            Some(Rc::clone(object))
        } else if widget {
            object.frame_clock()
        } else {
            None
        };
        Self {
            type_name: object.class().name(),
            address: object.id().to_string(),
            ref_count: Rc::strong_count(object).saturating_sub(1),
            buildable_id: object.buildable_id(),
            state: widget.then(|| object.state_flags().to_string()),
            focus_widget: object
                .focus()
                .map(|focus| format!("{} {}", focus.class().name(), focus.id())),
            allocation: widget.then(|| object.allocation().to_string()),
            baseline: widget.then(|| object.baseline()),
            clip: widget.then(|| object.clip().to_string()),
            mapped: widget && object.is_mapped(),
            realized: widget && object.is_realized(),
            visible: widget && object.is_visible(),
            is_toplevel: object.class().is_toplevel(),
            frame_count: clock.as_ref().map(|c| c.frame_counter()),
            fps: clock.as_ref().map(|c| format!("{:.2}", c.fps_over(frame_window))),
            tick_callback: widget && object.has_tick_callback(),
        }
    }
}

#[derive(Debug)]
struct MiscState {
    object: WeakObject,
    info: Option<MiscInfo>,
    refreshes: u64,
    frame_window: usize,
}

impl MiscState {
    fn refresh(&mut self) {
        self.info = self
            .object
            .upgrade()
            .map(|object| MiscInfo::capture(&object, self.frame_window));
        self.refreshes += 1;
    }
}

/// Accepts any object.
#[derive(Debug)]
pub struct MiscInfoPage {
    state: Rc<RefCell<MiscState>>,
    interval: Duration,
    refresher: Option<JoinHandle<()>>,
}

impl MiscInfoPage {
    pub fn new(interval: Duration) -> Self {
        Self {
            state: Rc::new(RefCell::new(MiscState {
                object: WeakObject::new(),
                info: None,
                refreshes: 0,
                frame_window: FRAME_HISTORY,
            })),
            interval,
            refresher: None,
        }
    }

    /// Use the last `frames` frame timestamps for the fps estimate. Clamped
    /// to `2..=FRAME_HISTORY`.
    pub fn with_frame_window(self, frames: usize) -> Self {
        self.state.borrow_mut().frame_window = frames.clamp(2, FRAME_HISTORY);
        self
    }

    pub fn info(&self) -> Option<MiscInfo> {
        self.state.borrow().info.clone()
    }

    /// Number of snapshots taken since creation.
    pub fn refresh_count(&self) -> u64 {
        self.state.borrow().refreshes
    }

    pub fn refresh(&self) {
        self.state.borrow_mut().refresh();
    }

    pub fn is_mapped(&self) -> bool {
        self.refresher.is_some()
    }

    /// Refresh now and start the periodic refresher.
    ///
    /// ```
    /// # tokio_test::block_on(tokio::task::LocalSet::new().run_until(async {
    /// use gilt_inspector::pages::MiscInfoPage;
    ///
    /// let mut page = MiscInfoPage::default();
    /// page.map();
    /// assert!(page.is_mapped());
    /// assert_eq!(page.refresh_count(), 1);
    /// page.unmap();
    /// assert!(!page.is_mapped());
    /// # }));
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if called outside a `LocalSet`.
    pub fn map(&mut self) {
        if self.refresher.is_some() {
            return;
        }
        self.refresh();
        let state: Weak<RefCell<MiscState>> = Rc::downgrade(&self.state);
        let period = self.interval;
        self.refresher = Some(tokio::task::spawn_local(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(state) = state.upgrade() else {
                    break;
                };
                trace!("misc info refresh");
                state.borrow_mut().refresh();
            }
        }));
    }

    /// Stop the refresher.
    pub fn unmap(&mut self) {
        if let Some(task) = self.refresher.take() {
            task.abort();
        }
    }
}

impl Default for MiscInfoPage {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl Drop for MiscInfoPage {
    fn drop(&mut self) {
        self.unmap();
    }
}

impl Page for MiscInfoPage {
    fn name(&self) -> &'static str {
        "misc"
    }

    fn set_object(&mut self, object: Option<&Object>, _ctx: &PageContext<'_>) -> bool {
        let mut state = self.state.borrow_mut();
        state.object = object.map(Object::downgrade).unwrap_or_default();
        state.refresh();
        object.is_some()
    }

    fn object_changed(&mut self, _object: &Object, change: &ObjectChange, _ctx: &PageContext<'_>) {
        if matches!(
            change,
            ObjectChange::StateFlags | ObjectChange::Allocation | ObjectChange::Focus | ObjectChange::Mapped(_)
        ) {
            self.refresh();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{Allocation, StateFlags};
    use crate::object_tree::ObjectTree;
    use tokio::task::LocalSet;

    #[test]
    fn snapshot_of_widget() {
        let window = Object::builder(ClassTag::Window).id("main").build();
        let button = Object::new(ClassTag::Button);
        window.add(&button);
        window.set_focus(Some(&button));
        button.size_allocate(Allocation::new(1, 2, 30, 40), 12);
        button.set_state_flags(StateFlags::PRELIGHT);

        let info = MiscInfo::capture(&button, 64);
        assert_eq!(info.type_name, "GiltButton");
        assert_eq!(info.ref_count, 1);
        assert_eq!(info.state.as_deref(), Some("hover"));
        assert_eq!(info.allocation.as_deref(), Some("30×40 +1 +2"));
        assert_eq!(info.baseline, Some(12));
        assert_eq!(info.frame_count, Some(0));
        assert!(!info.mapped);

        let info = MiscInfo::capture(&window, 64);
        assert!(info.is_toplevel);
        assert_eq!(info.buildable_id.as_deref(), Some("main"));
        assert!(info.focus_widget.unwrap().starts_with("GiltButton 0x"));
    }

    #[test]
    fn snapshot_of_plain_object() {
        let store = Object::new(ClassTag::ListStore);
        let info = MiscInfo::capture(&store, 64);
        assert_eq!(info.state, None);
        assert_eq!(info.allocation, None);
        assert_eq!(info.frame_count, None);
        assert!(!info.tick_callback);
    }

    #[test]
    fn change_refreshes_snapshot() {
        let tree = ObjectTree::new();
        let ctx = PageContext::new(&tree);
        let label = Object::new(ClassTag::Label);
        let mut page = MiscInfoPage::default();
        assert!(page.set_object(Some(&*label), &ctx));
        label.set_state_flags(StateFlags::SELECTED);
        page.object_changed(&label, &ObjectChange::StateFlags, &ctx);
        assert_eq!(page.info().unwrap().state.as_deref(), Some("selected"));
        assert!(!page.set_object(None, &ctx));
        assert_eq!(page.info(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn refresher_runs_only_while_mapped() {
        let local = LocalSet::new();
        local
            .run_until(async {
                let tree = ObjectTree::new();
                let clock = Object::new(ClassTag::FrameClock);
                let mut page = MiscInfoPage::new(Duration::from_secs(1));
                page.set_object(Some(&*clock), &PageContext::new(&tree));
                let bound = page.refresh_count();

                page.map();
                assert!(page.is_mapped());
                assert_eq!(page.refresh_count(), bound + 1);

                clock.tick(0);
                clock.tick(500_000);
                tokio::time::sleep(Duration::from_millis(3500)).await;
                assert_eq!(page.refresh_count(), bound + 4);
                let info = page.info().unwrap();
                assert_eq!(info.frame_count, Some(2));
                assert_eq!(info.fps.as_deref(), Some("2.00"));

                page.unmap();
                tokio::time::sleep(Duration::from_secs(5)).await;
                assert_eq!(page.refresh_count(), bound + 4);
            })
            .await;
    }
}
