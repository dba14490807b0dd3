//! Item model: the auxiliary hierarchy attached to selection-style widgets.
//!
//! Selection boxes, combo boxes, item selectors, trees, tables and menus all
//! carry items. Rather than a class hierarchy, every item is one flattened
//! struct with an [`ItemKind`] tag and optional fields (description,
//! children, cells); kind-specific behavior lives in pattern-matched
//! functions in [`parser`] and [`writer`].

pub mod parser;
pub mod writer;

use crate::term::Value;

/// Which item family an [`Item`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    /// Selection box / combo box / dumb tab item: id, icon, label, selected.
    Plain,
    /// Item selector item: additionally carries a description block.
    Described,
    /// Tree item: the flag means "open", children nest arbitrarily.
    Tree,
    /// Menu item: children form submenus, empty label is a separator.
    Menu,
    /// Table row: per-column cells instead of a single label.
    Table,
}

/// One node in an item hierarchy.
///
/// Insertion order is preserved and semantically significant; nothing here
/// sorts. Child items inherit no state from their parents.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub kind: ItemKind,
    /// Optional identifier; any value kind is legal.
    pub id: Option<Value>,
    /// True when the id was defaulted from the label rather than assigned
    /// via `id(...)`. The serializer omits synthetic ids (round-trip
    /// transparency).
    pub synthetic_id: bool,
    pub label: String,
    /// Only meaningful for [`ItemKind::Described`].
    pub description: String,
    pub icon: Option<String>,
    /// Selected state (selection widgets).
    pub selected: bool,
    /// Open state (tree items with children).
    pub open: bool,
    /// Item status for status-cycling selectors; selected items read as 1.
    pub status: i32,
    /// Only meaningful for menu items.
    pub enabled: bool,
    /// Sub-items (trees and menus only).
    pub children: Vec<Item>,
    /// Per-column cells (tables only).
    pub cells: Vec<Cell>,
}

/// One table cell: a label, an optional icon, an optional explicit sort key.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub label: String,
    pub icon: Option<String>,
    pub sort_key: Option<String>,
}

/// One entry of a custom status definition for status-cycling selectors.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusDef {
    pub icon: String,
    /// Text equivalent of the status indicator, e.g. `"[ ]"` or `"[x]"`.
    pub indicator: String,
    /// Status to cycle to on activation; -1 means the application handles it.
    pub next_status: i32,
}

/// Parsed table header: one column per entry.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableHeader {
    pub columns: Vec<TableColumn>,
}

/// One table column: header text and alignment.
#[derive(Debug, Clone, PartialEq)]
pub struct TableColumn {
    pub label: String,
    pub alignment: ColumnAlignment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnAlignment {
    #[default]
    Begin,
    Center,
    End,
}

impl Item {
    /// Create an item with the given kind and label; everything else is
    /// defaulted.
    pub fn new(kind: ItemKind, label: impl Into<String>) -> Self {
        Self {
            kind,
            id: None,
            synthetic_id: false,
            label: label.into(),
            description: String::new(),
            icon: None,
            selected: false,
            open: false,
            status: 0,
            enabled: true,
            children: Vec::new(),
            cells: Vec::new(),
        }
    }

    pub fn has_id(&self) -> bool {
        self.id.is_some()
    }

    /// The map key this item is reported under: its id if present, its
    /// label otherwise.
    pub fn key(&self) -> Value {
        match &self.id {
            Some(id) => id.clone(),
            None => Value::str(self.label.clone()),
        }
    }

    /// Set the status, keeping the selected flag in sync.
    pub fn set_status(&mut self, status: i32) {
        self.status = status;
        self.selected = status != 0;
    }

    /// Mark selected, keeping the status in sync.
    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
        self.status = i32::from(selected);
    }
}

impl Cell {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            icon: None,
            sort_key: None,
        }
    }

    /// An empty cell, used to pad rows with fewer columns than the header.
    pub fn empty() -> Self {
        Self::new("")
    }
}

impl TableHeader {
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}

/// Depth-first search over an item forest for an item with the wanted id,
/// comparing identifiers with the value model's structural equality. An
/// `id(x)` wrapper around the wanted value is unwrapped first.
pub fn find_item<'a>(items: &'a [Item], wanted: &Value) -> Option<&'a Item> {
    let wanted = unwrap_id(wanted);
    find_item_raw(items, wanted)
}

/// Mutable variant of [`find_item`].
pub fn find_item_mut<'a>(items: &'a mut [Item], wanted: &Value) -> Option<&'a mut Item> {
    let wanted = unwrap_id(wanted).clone();
    find_item_raw_mut(items, &wanted)
}

fn unwrap_id(wanted: &Value) -> &Value {
    match wanted.as_term() {
        Some(t) if t.name() == "id" && t.len() == 1 => &t.args()[0],
        _ => wanted,
    }
}

fn find_item_raw<'a>(items: &'a [Item], wanted: &Value) -> Option<&'a Item> {
    for item in items {
        if item.id.as_ref() == Some(wanted) {
            return Some(item);
        }
        if let Some(found) = find_item_raw(&item.children, wanted) {
            return Some(found);
        }
    }
    None
}

/// Clear the selected state of a whole item forest, nested items included.
pub fn deselect_all(items: &mut [Item]) {
    for item in items {
        item.set_selected(false);
        deselect_all(&mut item.children);
    }
}

/// The first selected item in depth-first order.
pub fn first_selected(items: &[Item]) -> Option<&Item> {
    for item in items {
        if item.selected {
            return Some(item);
        }
        if let Some(found) = first_selected(&item.children) {
            return Some(found);
        }
    }
    None
}

/// The identifiers of all selected items in depth-first order. Selected
/// items without an identifier are reported through `skipped`.
pub fn selected_ids(items: &[Item], skipped: &mut Vec<String>) -> Vec<Value> {
    let mut ids = Vec::new();
    collect_selected_ids(items, &mut ids, skipped);
    ids
}

fn collect_selected_ids(items: &[Item], ids: &mut Vec<Value>, skipped: &mut Vec<String>) {
    for item in items {
        if item.selected {
            match &item.id {
                Some(id) => ids.push(id.clone()),
                None => skipped.push(item.label.clone()),
            }
        }
        collect_selected_ids(&item.children, ids, skipped);
    }
}

/// The root-to-leaf path of items leading to the first selected item.
pub fn selection_path(items: &[Item]) -> Option<Vec<&Item>> {
    for item in items {
        if item.selected {
            return Some(vec![item]);
        }
        if let Some(mut path) = selection_path(&item.children) {
            path.insert(0, item);
            return Some(path);
        }
    }
    None
}

fn find_item_raw_mut<'a>(items: &'a mut [Item], wanted: &Value) -> Option<&'a mut Item> {
    for item in items {
        if item.id.as_ref() == Some(wanted) {
            return Some(item);
        }
        if !item.children.is_empty() {
            if let Some(found) = find_item_raw_mut(&mut item.children, wanted) {
                return Some(found);
            }
        }
    }
    None
}
