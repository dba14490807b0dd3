//! The typed widget tree: kinds, nodes, flags, arena and identifier registry.
//!
//! Every widget the compiler can produce is one variant of the closed
//! [`WidgetKind`] sum type; runtime capability checks are plain pattern
//! matches over the variant tag (no downcasting). Kind-specific data lives in
//! the variant payload, shared state (identifier, option flags) lives on
//! [`WidgetNode`].

pub mod registry;
pub mod tree;

pub use registry::IdRegistry;
pub use tree::{WidgetId, WidgetTree};

use crate::item::{Item, StatusDef, TableHeader};
use crate::term::Value;

/// Layout direction for boxes, spacings and progress meters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Horiz,
    Vert,
}

/// Alignment of a child within an alignment container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    /// Leave the child's alignment in this dimension untouched.
    Unchanged,
    Begin,
    Center,
    End,
}

/// Semantic role of a push button, used for platform button ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonRole {
    Custom,
    Ok,
    Apply,
    Cancel,
    Help,
    RelNotes,
}

/// Wizard side panel mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardMode {
    Standard,
    Steps,
    Tree,
    TitleOnLeft,
}

/// One segment of a bar graph: an integer value and a label that may contain
/// a `%1` placeholder for the value.
#[derive(Debug, Clone, PartialEq)]
pub struct BarSegment {
    pub value: i64,
    pub label: String,
}

/// Start-up filter modes for the package selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PkgSelectorModes {
    pub online_update: bool,
    pub update: bool,
    pub search: bool,
    pub summary: bool,
    pub repo: bool,
    pub test: bool,
    pub repo_mgr: bool,
    pub confirm_unsupported: bool,
    pub online_search: bool,
}

/// Boolean/integer flags shared by all widgets, filled from the generic
/// entries of a term's `opt(...)` argument.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WidgetFlags {
    pub disabled: bool,
    pub notify: bool,
    pub notify_context_menu: bool,
    pub hstretch: bool,
    pub vstretch: bool,
    pub auto_shortcut: bool,
    pub key_events: bool,
    pub bold_font: bool,
    /// Function key number activating this widget; `Some(-1)` is an explicit
    /// "no function key".
    pub function_key: Option<i32>,
    /// Layout weights, set by the weight pseudo-widgets.
    pub hweight: Option<i64>,
    pub vweight: Option<i64>,
}

/// The closed set of widget kinds with their kind-specific data.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetKind {
    /// `Left`/`Right`/`Top`/`Bottom`/`HCenter`/`VCenter`/`HVCenter`.
    Alignment {
        horiz: Align,
        vert: Align,
        background: Option<String>,
    },
    BarGraph {
        segments: Vec<BarSegment>,
    },
    BusyIndicator {
        label: String,
        timeout_ms: i64,
        alive: bool,
    },
    ButtonBox {
        relaxed: bool,
    },
    /// `checked` is tri-state: `None` is the "don't care" state.
    CheckBox {
        label: String,
        checked: Option<bool>,
    },
    CheckBoxFrame {
        label: String,
        checked: bool,
        auto_enable: bool,
        invert_auto_enable: bool,
    },
    ComboBox {
        label: String,
        editable: bool,
        items: Vec<Item>,
        /// Free text, meaningful for editable combo boxes.
        text: String,
    },
    DateField {
        label: String,
        value: String,
    },
    DownloadProgress {
        label: String,
        file_name: String,
        expected_size: i64,
    },
    DumbTab {
        items: Vec<Item>,
    },
    DummySpecial,
    Empty,
    Frame {
        label: String,
    },
    Graph {
        file_name: String,
        layout_algorithm: String,
    },
    Image {
        file_name: String,
        animated: bool,
        zero_width: bool,
        zero_height: bool,
        auto_scale: bool,
    },
    InputField {
        label: String,
        password: bool,
        text: String,
        shrinkable: bool,
    },
    IntField {
        label: String,
        min: i64,
        max: i64,
        value: i64,
    },
    /// `SingleItemSelector`/`MultiItemSelector`/`CustomStatusItemSelector`.
    ItemSelector {
        single: bool,
        custom_states: Vec<StatusDef>,
        items: Vec<Item>,
    },
    /// `Label` and `Heading`.
    Label {
        text: String,
        heading: bool,
        output_field: bool,
        auto_wrap: bool,
    },
    /// `HBox`/`VBox`.
    LayoutBox {
        dim: Dimension,
        debug_layout: bool,
    },
    LogView {
        label: String,
        visible_lines: i64,
        max_lines: i64,
        text: String,
    },
    MarginBox {
        left: f64,
        right: f64,
        top: f64,
        bottom: f64,
    },
    MenuBar {
        items: Vec<Item>,
    },
    MenuButton {
        label: String,
        items: Vec<Item>,
    },
    /// `MinWidth`/`MinHeight`/`MinSize`.
    MinSize {
        min_width: f64,
        min_height: f64,
    },
    MultiLineEdit {
        label: String,
        text: String,
    },
    /// `HMultiProgressMeter`/`VMultiProgressMeter`.
    MultiProgressMeter {
        dim: Dimension,
        max_values: Vec<f64>,
        current_values: Vec<f64>,
    },
    MultiSelectionBox {
        label: String,
        items: Vec<Item>,
        shrinkable: bool,
        /// Index of the keyboard-focused item, distinct from selection.
        current: Option<usize>,
    },
    PackageSelector {
        modes: PkgSelectorModes,
        floppy_device: String,
    },
    PartitionSplitter {
        used_size: i64,
        total_free_size: i64,
        new_part_size: i64,
        min_new_part_size: i64,
        min_free_size: i64,
        used_label: String,
        free_label: String,
        new_part_label: String,
        free_field_label: String,
        new_part_field_label: String,
    },
    PatternSelector,
    PkgSpecial {
        subwidget: String,
    },
    ProgressBar {
        label: String,
        max_value: i64,
        value: i64,
    },
    /// `PushButton` and `IconButton`.
    PushButton {
        label: String,
        icon: Option<String>,
        role: ButtonRole,
        /// True when the role was pinned with the `customButton` option;
        /// pinned roles are exempt from id- and function-key-based guessing.
        role_pinned: bool,
        is_default: bool,
    },
    RadioButton {
        label: String,
        checked: bool,
    },
    RadioButtonGroup,
    ReplacePoint,
    RichText {
        text: String,
        plain_text: bool,
        auto_scroll_down: bool,
        shrinkable: bool,
    },
    SelectionBox {
        label: String,
        items: Vec<Item>,
        shrinkable: bool,
        immediate: bool,
    },
    SimplePatchSelector,
    Slider {
        label: String,
        min: i64,
        max: i64,
        value: i64,
    },
    /// `HSpacing`/`VSpacing`/`HStretch`/`VStretch`.
    Spacing {
        dim: Dimension,
        stretchable: bool,
        size: f64,
    },
    /// `HSquash`/`VSquash`/`HVSquash`.
    Squash {
        horiz: bool,
        vert: bool,
    },
    Table {
        header: TableHeader,
        items: Vec<Item>,
        multi_selection: bool,
        keep_sorting: bool,
        immediate: bool,
    },
    TimeField {
        label: String,
        value: String,
    },
    TimezoneSelector {
        pixmap: String,
        timezones: Vec<(String, String)>,
    },
    Tree {
        label: String,
        items: Vec<Item>,
        multi_selection: bool,
        recursive_selection: bool,
        immediate: bool,
    },
    Wizard {
        mode: WizardMode,
    },
}

/// One node of the compiled widget tree.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetNode {
    pub kind: WidgetKind,
    /// Optional identifier; any value kind is legal, uniqueness is enforced
    /// per dialog by the [`IdRegistry`].
    pub id: Option<Value>,
    pub flags: WidgetFlags,
}

impl WidgetNode {
    pub fn new(kind: WidgetKind) -> Self {
        Self {
            kind,
            id: None,
            flags: WidgetFlags::default(),
        }
    }

    pub fn has_id(&self) -> bool {
        self.id.is_some()
    }

    /// The widget class name for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        self.kind.name()
    }

    /// A short human-readable identification for diagnostics: the label if
    /// the kind has one, the kind name otherwise.
    pub fn debug_label(&self) -> String {
        match self.kind.label() {
            Some(label) if !label.is_empty() => label.to_owned(),
            _ => self.kind_name().to_owned(),
        }
    }
}

impl WidgetKind {
    /// The widget class name for diagnostics and `NoHandler` errors.
    pub fn name(&self) -> &'static str {
        match self {
            WidgetKind::Alignment { .. } => "Alignment",
            WidgetKind::BarGraph { .. } => "BarGraph",
            WidgetKind::BusyIndicator { .. } => "BusyIndicator",
            WidgetKind::ButtonBox { .. } => "ButtonBox",
            WidgetKind::CheckBox { .. } => "CheckBox",
            WidgetKind::CheckBoxFrame { .. } => "CheckBoxFrame",
            WidgetKind::ComboBox { .. } => "ComboBox",
            WidgetKind::DateField { .. } => "DateField",
            WidgetKind::DownloadProgress { .. } => "DownloadProgress",
            WidgetKind::DumbTab { .. } => "DumbTab",
            WidgetKind::DummySpecial => "DummySpecialWidget",
            WidgetKind::Empty => "Empty",
            WidgetKind::Frame { .. } => "Frame",
            WidgetKind::Graph { .. } => "Graph",
            WidgetKind::Image { .. } => "Image",
            WidgetKind::InputField { .. } => "InputField",
            WidgetKind::IntField { .. } => "IntField",
            WidgetKind::ItemSelector { .. } => "ItemSelector",
            WidgetKind::Label { .. } => "Label",
            WidgetKind::LayoutBox { .. } => "LayoutBox",
            WidgetKind::LogView { .. } => "LogView",
            WidgetKind::MarginBox { .. } => "MarginBox",
            WidgetKind::MenuBar { .. } => "MenuBar",
            WidgetKind::MenuButton { .. } => "MenuButton",
            WidgetKind::MinSize { .. } => "MinSize",
            WidgetKind::MultiLineEdit { .. } => "MultiLineEdit",
            WidgetKind::MultiProgressMeter { .. } => "MultiProgressMeter",
            WidgetKind::MultiSelectionBox { .. } => "MultiSelectionBox",
            WidgetKind::PackageSelector { .. } => "PackageSelector",
            WidgetKind::PartitionSplitter { .. } => "PartitionSplitter",
            WidgetKind::PatternSelector => "PatternSelector",
            WidgetKind::PkgSpecial { .. } => "PkgSpecial",
            WidgetKind::ProgressBar { .. } => "ProgressBar",
            WidgetKind::PushButton { .. } => "PushButton",
            WidgetKind::RadioButton { .. } => "RadioButton",
            WidgetKind::RadioButtonGroup => "RadioButtonGroup",
            WidgetKind::ReplacePoint => "ReplacePoint",
            WidgetKind::RichText { .. } => "RichText",
            WidgetKind::SelectionBox { .. } => "SelectionBox",
            WidgetKind::SimplePatchSelector => "SimplePatchSelector",
            WidgetKind::Slider { .. } => "Slider",
            WidgetKind::Spacing { .. } => "Spacing",
            WidgetKind::Squash { .. } => "Squash",
            WidgetKind::Table { .. } => "Table",
            WidgetKind::TimeField { .. } => "TimeField",
            WidgetKind::TimezoneSelector { .. } => "TimezoneSelector",
            WidgetKind::Tree { .. } => "Tree",
            WidgetKind::Wizard { .. } => "Wizard",
        }
    }

    /// The item list of an item-bearing widget, `None` for all other kinds.
    pub fn items(&self) -> Option<&[Item]> {
        match self {
            WidgetKind::ComboBox { items, .. }
            | WidgetKind::DumbTab { items }
            | WidgetKind::ItemSelector { items, .. }
            | WidgetKind::MenuBar { items }
            | WidgetKind::MenuButton { items, .. }
            | WidgetKind::MultiSelectionBox { items, .. }
            | WidgetKind::SelectionBox { items, .. }
            | WidgetKind::Table { items, .. }
            | WidgetKind::Tree { items, .. } => Some(items),
            _ => None,
        }
    }

    /// Mutable variant of [`WidgetKind::items`].
    pub fn items_mut(&mut self) -> Option<&mut Vec<Item>> {
        match self {
            WidgetKind::ComboBox { items, .. }
            | WidgetKind::DumbTab { items }
            | WidgetKind::ItemSelector { items, .. }
            | WidgetKind::MenuBar { items }
            | WidgetKind::MenuButton { items, .. }
            | WidgetKind::MultiSelectionBox { items, .. }
            | WidgetKind::SelectionBox { items, .. }
            | WidgetKind::Table { items, .. }
            | WidgetKind::Tree { items, .. } => Some(items),
            _ => None,
        }
    }

    /// Whether this kind hosts menu items (`MenuBar`, `MenuButton`).
    pub fn is_menu(&self) -> bool {
        matches!(
            self,
            WidgetKind::MenuBar { .. } | WidgetKind::MenuButton { .. }
        )
    }

    /// The user-visible label of labeled kinds.
    pub fn label(&self) -> Option<&str> {
        match self {
            WidgetKind::BusyIndicator { label, .. }
            | WidgetKind::CheckBox { label, .. }
            | WidgetKind::CheckBoxFrame { label, .. }
            | WidgetKind::ComboBox { label, .. }
            | WidgetKind::DateField { label, .. }
            | WidgetKind::DownloadProgress { label, .. }
            | WidgetKind::Frame { label }
            | WidgetKind::InputField { label, .. }
            | WidgetKind::IntField { label, .. }
            | WidgetKind::LogView { label, .. }
            | WidgetKind::MenuButton { label, .. }
            | WidgetKind::MultiLineEdit { label, .. }
            | WidgetKind::MultiSelectionBox { label, .. }
            | WidgetKind::ProgressBar { label, .. }
            | WidgetKind::PushButton { label, .. }
            | WidgetKind::RadioButton { label, .. }
            | WidgetKind::SelectionBox { label, .. }
            | WidgetKind::Slider { label, .. }
            | WidgetKind::TimeField { label, .. }
            | WidgetKind::Tree { label, .. } => Some(label),
            WidgetKind::Label { text, .. } => Some(text),
            _ => None,
        }
    }

    /// Mutable variant of [`WidgetKind::label`].
    pub fn label_mut(&mut self) -> Option<&mut String> {
        match self {
            WidgetKind::BusyIndicator { label, .. }
            | WidgetKind::CheckBox { label, .. }
            | WidgetKind::CheckBoxFrame { label, .. }
            | WidgetKind::ComboBox { label, .. }
            | WidgetKind::DateField { label, .. }
            | WidgetKind::DownloadProgress { label, .. }
            | WidgetKind::Frame { label }
            | WidgetKind::InputField { label, .. }
            | WidgetKind::IntField { label, .. }
            | WidgetKind::LogView { label, .. }
            | WidgetKind::MenuButton { label, .. }
            | WidgetKind::MultiLineEdit { label, .. }
            | WidgetKind::MultiSelectionBox { label, .. }
            | WidgetKind::ProgressBar { label, .. }
            | WidgetKind::PushButton { label, .. }
            | WidgetKind::RadioButton { label, .. }
            | WidgetKind::SelectionBox { label, .. }
            | WidgetKind::Slider { label, .. }
            | WidgetKind::TimeField { label, .. }
            | WidgetKind::Tree { label, .. } => Some(label),
            WidgetKind::Label { text, .. } => Some(text),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_label_prefers_label_text() {
        let node = WidgetNode::new(WidgetKind::PushButton {
            label: "&OK".into(),
            icon: None,
            role: ButtonRole::Ok,
            role_pinned: false,
            is_default: false,
        });
        assert_eq!(node.debug_label(), "&OK");
        assert_eq!(WidgetNode::new(WidgetKind::Empty).debug_label(), "Empty");
    }

    #[test]
    fn items_accessor_covers_selection_kinds() {
        let kind = WidgetKind::SelectionBox {
            label: String::new(),
            items: vec![Item::new(crate::item::ItemKind::Plain, "x")],
            shrinkable: false,
            immediate: false,
        };
        assert_eq!(kind.items().unwrap().len(), 1);
        assert!(WidgetKind::Empty.items().is_none());
    }

    #[test]
    fn menu_kinds() {
        assert!(WidgetKind::MenuBar { items: vec![] }.is_menu());
        assert!(!WidgetKind::DumbTab { items: vec![] }.is_menu());
    }
}
