//! Runtime class tags and the static `is_a` hierarchy.
//!
//! The set of object families the inspector understands is closed, so classes
//! are a plain enum. Each tag knows its parent class; `is_a` walks that chain.

use std::fmt;

/// Runtime class of an [`Object`](super::Object).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassTag {
    /// Root of the hierarchy. Anything not listed below is a plain object.
    Object,

    // ── Singletons ───────────────────────────────────────────────────
    Settings,
    Application,

    // ── Widgets ──────────────────────────────────────────────────────
    Widget,
    Container,
    Bin,
    Window,
    Box,
    Label,
    Button,
    Entry,
    TextView,
    IconView,
    TreeView,
    ComboBox,
    MenuShell,
    Menu,
    MenuBar,
    MenuItem,
    CellView,

    // ── Text ─────────────────────────────────────────────────────────
    TextBuffer,
    TextTagTable,
    TextTag,

    // ── Models ───────────────────────────────────────────────────────
    ListStore,
    TreeModelSort,
    TreeModelFilter,
    TreeSelection,
    TreeViewColumn,

    // ── Cells ────────────────────────────────────────────────────────
    CellArea,
    CellAreaBox,
    CellRenderer,
    CellRendererText,

    // ── Input ────────────────────────────────────────────────────────
    EventController,
    Gesture,
    GestureClick,

    // ── Misc ─────────────────────────────────────────────────────────
    FrameClock,
    SizeGroup,
    Adjustment,
}

impl ClassTag {
    /// The direct parent class, or `None` for [`ClassTag::Object`].
    pub fn parent_class(self) -> Option<ClassTag> {
        use ClassTag::*;
        let parent = match self {
            Object => return None,
            Settings | Application | Widget | TextBuffer | TextTagTable | TextTag
            | ListStore | TreeModelSort | TreeModelFilter | TreeSelection
            | TreeViewColumn | CellArea | CellRenderer | EventController | FrameClock
            | SizeGroup | Adjustment => Object,
            Container | Label | Entry | CellView => Widget,
            Bin | Box | TextView | IconView | TreeView | MenuShell => Container,
            Window | Button | ComboBox | MenuItem => Bin,
            Menu | MenuBar => MenuShell,
            CellAreaBox => CellArea,
            CellRendererText => CellRenderer,
            Gesture => EventController,
            GestureClick => Gesture,
        };
        Some(parent)
    }

    /// Whether `self` is `ancestor` or derives from it.
    pub fn is_a(self, ancestor: ClassTag) -> bool {
        self.lineage().any(|class| class == ancestor)
    }

    /// Iterate from `self` up to [`ClassTag::Object`], inclusive.
    pub fn lineage(self) -> impl Iterator<Item = ClassTag> {
        std::iter::successors(Some(self), |class| class.parent_class())
    }

    pub fn is_widget(self) -> bool {
        self.is_a(ClassTag::Widget)
    }

    pub fn is_container(self) -> bool {
        self.is_a(ClassTag::Container)
    }

    /// Toplevels own a frame clock.
    pub fn is_toplevel(self) -> bool {
        self.is_a(ClassTag::Window)
    }

    /// Classes implementing the cell-layout interface (packing renderers
    /// through a cell area).
    pub fn is_cell_layout(self) -> bool {
        use ClassTag::*;
        matches!(self, CellView | ComboBox | IconView | TreeViewColumn) || self.is_a(CellArea)
    }

    /// The type name shown in the inspector.
    pub fn name(self) -> &'static str {
        use ClassTag::*;
        match self {
            Object => "GiltObject",
            Settings => "GiltSettings",
            Application => "GiltApplication",
            Widget => "GiltWidget",
            Container => "GiltContainer",
            Bin => "GiltBin",
            Window => "GiltWindow",
            Box => "GiltBox",
            Label => "GiltLabel",
            Button => "GiltButton",
            Entry => "GiltEntry",
            TextView => "GiltTextView",
            IconView => "GiltIconView",
            TreeView => "GiltTreeView",
            ComboBox => "GiltComboBox",
            MenuShell => "GiltMenuShell",
            Menu => "GiltMenu",
            MenuBar => "GiltMenuBar",
            MenuItem => "GiltMenuItem",
            CellView => "GiltCellView",
            TextBuffer => "GiltTextBuffer",
            TextTagTable => "GiltTextTagTable",
            TextTag => "GiltTextTag",
            ListStore => "GiltListStore",
            TreeModelSort => "GiltTreeModelSort",
            TreeModelFilter => "GiltTreeModelFilter",
            TreeSelection => "GiltTreeSelection",
            TreeViewColumn => "GiltTreeViewColumn",
            CellArea => "GiltCellArea",
            CellAreaBox => "GiltCellAreaBox",
            CellRenderer => "GiltCellRenderer",
            CellRendererText => "GiltCellRendererText",
            EventController => "GiltEventController",
            Gesture => "GiltGesture",
            GestureClick => "GiltGestureClick",
            FrameClock => "GiltFrameClock",
            SizeGroup => "GiltSizeGroup",
            Adjustment => "GiltAdjustment",
        }
    }

    /// The CSS node name widgets of this class get by default.
    pub fn css_name(self) -> &'static str {
        use ClassTag::*;
        match self {
            Window => "window",
            Box => "box",
            Label => "label",
            Button => "button",
            Entry => "entry",
            TextView => "textview",
            IconView => "iconview",
            TreeView => "treeview",
            ComboBox => "combobox",
            Menu => "menu",
            MenuBar => "menubar",
            MenuItem => "menuitem",
            CellView => "cellview",
            _ => "widget",
        }
    }
}

impl fmt::Display for ClassTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_has_no_parent() {
        assert_eq!(ClassTag::Object.parent_class(), None);
    }

    #[test]
    fn window_lineage() {
        let chain: Vec<_> = ClassTag::Window.lineage().collect();
        assert_eq!(
            chain,
            vec![
                ClassTag::Window,
                ClassTag::Bin,
                ClassTag::Container,
                ClassTag::Widget,
                ClassTag::Object,
            ]
        );
    }

    #[test]
    fn is_a_reflexive_and_transitive() {
        assert!(ClassTag::Button.is_a(ClassTag::Button));
        assert!(ClassTag::Button.is_a(ClassTag::Container));
        assert!(ClassTag::Button.is_a(ClassTag::Object));
        assert!(!ClassTag::Label.is_a(ClassTag::Container));
        assert!(!ClassTag::ListStore.is_a(ClassTag::Widget));
    }

    #[test]
    fn family_helpers() {
        assert!(ClassTag::Label.is_widget());
        assert!(!ClassTag::Label.is_container());
        assert!(ClassTag::Box.is_container());
        assert!(ClassTag::Window.is_toplevel());
        assert!(!ClassTag::Button.is_toplevel());
    }

    #[test]
    fn cell_layouts() {
        assert!(ClassTag::TreeViewColumn.is_cell_layout());
        assert!(ClassTag::CellAreaBox.is_cell_layout());
        assert!(ClassTag::ComboBox.is_cell_layout());
        assert!(!ClassTag::TreeView.is_cell_layout());
    }

    #[test]
    fn every_class_reaches_object() {
        let all = [
            ClassTag::GestureClick,
            ClassTag::CellRendererText,
            ClassTag::MenuBar,
            ClassTag::TreeModelFilter,
        ];
        for class in all {
            assert_eq!(class.lineage().last(), Some(ClassTag::Object));
        }
    }

    #[test]
    fn display_uses_type_name() {
        assert_eq!(ClassTag::Label.to_string(), "GiltLabel");
    }
}
