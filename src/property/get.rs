//! Get-direction property handlers.
//!
//! Mirrors of the setters in [`super::set`]; item collections are rendered
//! back into terms through the item serializers, so a get of `Items`
//! round-trips with the term the widget was compiled from.

use tracing::{error, warn};

use crate::item::{self, writer, Item};
use crate::term::{Term, Value};
use crate::widget::{WidgetId, WidgetKind, WidgetTree};

use super::Probe;

/// `Value`.
pub(super) fn value(tree: &WidgetTree, widget: WidgetId) -> Probe<Value> {
    let node = tree.get(widget)?;

    match &node.kind {
        WidgetKind::CheckBox { checked, .. } => Some(Ok(match checked {
            Some(b) => Value::Bool(*b),
            None => Value::Nil,
        })),
        WidgetKind::SelectionBox { items, .. }
        | WidgetKind::ItemSelector { items, .. }
        | WidgetKind::Tree { items, .. }
        | WidgetKind::Table { items, .. }
        | WidgetKind::DumbTab { items } => Some(Ok(selected_item_id(items))),
        WidgetKind::ComboBox { items, text, .. } => {
            let selected = selected_item_id(items);
            Some(Ok(if selected.is_nil() {
                Value::str(text.clone())
            } else {
                selected
            }))
        }
        WidgetKind::RadioButtonGroup => current_button(tree, widget),
        WidgetKind::InputField { text, .. }
        | WidgetKind::MultiLineEdit { text, .. }
        | WidgetKind::RichText { text, .. }
        | WidgetKind::LogView { text, .. } => Some(Ok(Value::str(text.clone()))),
        WidgetKind::DateField { value, .. } | WidgetKind::TimeField { value, .. } => {
            Some(Ok(Value::str(value.clone())))
        }
        WidgetKind::IntField { value, .. }
        | WidgetKind::Slider { value, .. }
        | WidgetKind::ProgressBar { value, .. } => Some(Ok(Value::Int(*value))),
        WidgetKind::BusyIndicator { alive, .. } => Some(Ok(Value::Bool(*alive))),
        _ => None,
    }
}

/// `CurrentItem`.
pub(super) fn current_item(tree: &WidgetTree, widget: WidgetId) -> Probe<Value> {
    let node = tree.get(widget)?;

    match &node.kind {
        WidgetKind::SelectionBox { items, .. }
        | WidgetKind::ItemSelector { items, .. }
        | WidgetKind::Tree { items, .. }
        | WidgetKind::Table { items, .. }
        | WidgetKind::DumbTab { items } => Some(Ok(selected_item_id(items))),
        WidgetKind::ComboBox { items, text, .. } => {
            let selected = selected_item_id(items);
            Some(Ok(if selected.is_nil() {
                Value::str(text.clone())
            } else {
                selected
            }))
        }
        WidgetKind::MultiSelectionBox { items, current, .. } => Some(Ok(current
            .and_then(|index| items.get(index))
            .and_then(|item| item.id.clone())
            .unwrap_or(Value::Nil))),
        _ => None,
    }
}

/// `CurrentButton`: the id of the checked radio button inside a group.
pub(super) fn current_button(tree: &WidgetTree, widget: WidgetId) -> Probe<Value> {
    if !matches!(tree.get(widget)?.kind, WidgetKind::RadioButtonGroup) {
        return None;
    }

    for id in tree.walk_depth_first(widget) {
        let Some(node) = tree.get(id) else { continue };
        if let WidgetKind::RadioButton { checked: true, .. } = node.kind {
            match &node.id {
                Some(button_id) => return Some(Ok(button_id.clone())),
                None => {
                    warn!(
                        widget = "RadioButton",
                        label = %node.debug_label(),
                        "current radio button has no id"
                    );
                    return Some(Ok(Value::Nil));
                }
            }
        }
    }

    Some(Ok(Value::Nil))
}

/// `Items`: serialize the item collection back into terms.
pub(super) fn items(tree: &WidgetTree, widget: WidgetId) -> Probe<Value> {
    let node = tree.get(widget)?;

    match &node.kind {
        WidgetKind::MenuBar { items } | WidgetKind::MenuButton { items, .. } => {
            Some(Ok(writer::write_menu_items(items)))
        }
        WidgetKind::Table { items, .. } => Some(Ok(writer::write_table_items(items))),
        WidgetKind::Tree { items, .. } => Some(Ok(writer::write_tree_items(items))),
        WidgetKind::ItemSelector { items, .. } => Some(Ok(writer::write_described_items(items))),
        WidgetKind::SelectionBox { items, .. }
        | WidgetKind::MultiSelectionBox { items, .. }
        | WidgetKind::ComboBox { items, .. }
        | WidgetKind::DumbTab { items } => Some(Ok(writer::write_items(items))),
        _ => None,
    }
}

/// `SelectedItems`: the ids of all selected items, in depth-first order.
pub(super) fn selected_items(tree: &WidgetTree, widget: WidgetId) -> Probe<Value> {
    let node = tree.get(widget)?;
    if !matches!(
        node.kind,
        WidgetKind::MultiSelectionBox { .. }
            | WidgetKind::ItemSelector { .. }
            | WidgetKind::Table { .. }
            | WidgetKind::Tree { .. }
    ) {
        return None;
    }

    let items = node.kind.items().expect("selection kinds carry items");
    let mut skipped = Vec::new();
    let ids = item::selected_ids(items, &mut skipped);
    for label in skipped {
        error!(
            widget = node.kind_name(),
            item = %label,
            "selected item has no id"
        );
    }

    Some(Ok(Value::List(ids)))
}

/// `ItemStatus`: a map over the top-level items, keyed by id (label when an
/// item has none).
pub(super) fn item_status(tree: &WidgetTree, widget: WidgetId) -> Probe<Value> {
    let node = tree.get(widget)?;
    let items = node.kind.items()?;

    let pairs = items
        .iter()
        .map(|item| (item.key(), Value::Int(i64::from(item.status))))
        .collect();

    Some(Ok(Value::Map(pairs)))
}

/// `EnabledItems`: a map over all menu items that carry an id, nested
/// submenus included.
pub(super) fn enabled_items(tree: &WidgetTree, widget: WidgetId) -> Probe<Value> {
    let node = tree.get(widget)?;
    if !node.kind.is_menu() {
        return None;
    }

    let mut pairs = Vec::new();
    collect_enabled(node.kind.items().expect("menu kinds carry items"), &mut pairs);

    Some(Ok(Value::Map(pairs)))
}

fn collect_enabled(items: &[Item], pairs: &mut Vec<(Value, Value)>) {
    for item in items {
        if let Some(id) = &item.id {
            pairs.push((id.clone(), Value::Bool(item.enabled)));
        }
        collect_enabled(&item.children, pairs);
    }
}

/// `OpenItems`: a map of all open tree items; items with an id map
/// id → "ID", the rest map label → "Text".
pub(super) fn open_items(tree: &WidgetTree, widget: WidgetId) -> Probe<Value> {
    let node = tree.get(widget)?;
    let WidgetKind::Tree { items, .. } = &node.kind else {
        return None;
    };

    let mut pairs = Vec::new();
    collect_open(items, &mut pairs);

    Some(Ok(Value::Map(pairs)))
}

fn collect_open(items: &[Item], pairs: &mut Vec<(Value, Value)>) {
    for item in items {
        if item.open {
            match &item.id {
                Some(id) => pairs.push((id.clone(), Value::str("ID"))),
                None => pairs.push((Value::str(item.label.clone()), Value::str("Text"))),
            }
        }
        collect_open(&item.children, pairs);
    }
}

/// `CurrentBranch`: the path from the root to the currently selected tree
/// item as a list of ids (labels for items without an id), root first.
pub(super) fn current_branch(tree: &WidgetTree, widget: WidgetId) -> Probe<Value> {
    let node = tree.get(widget)?;
    let WidgetKind::Tree { items, .. } = &node.kind else {
        return None;
    };

    let branch = item::selection_path(items)
        .unwrap_or_default()
        .iter()
        .map(|item| match &item.id {
            Some(id) => id.clone(),
            None => Value::str(item.label.clone()),
        })
        .collect();

    Some(Ok(Value::List(branch)))
}

/// `Values`: bar graph segment values.
pub(super) fn values(tree: &WidgetTree, widget: WidgetId) -> Probe<Value> {
    let node = tree.get(widget)?;
    let WidgetKind::BarGraph { segments } = &node.kind else {
        return None;
    };

    Some(Ok(Value::List(
        segments.iter().map(|s| Value::Int(s.value)).collect(),
    )))
}

/// `Labels`: bar graph segment labels.
pub(super) fn labels(tree: &WidgetTree, widget: WidgetId) -> Probe<Value> {
    let node = tree.get(widget)?;
    let WidgetKind::BarGraph { segments } = &node.kind else {
        return None;
    };

    Some(Ok(Value::List(
        segments.iter().map(|s| Value::str(s.label.clone())).collect(),
    )))
}

/// `Label`.
pub(super) fn label(tree: &WidgetTree, widget: WidgetId) -> Probe<Value> {
    let node = tree.get(widget)?;
    let label = node.kind.label()?;
    Some(Ok(Value::str(label)))
}

/// `Alive`.
pub(super) fn alive(tree: &WidgetTree, widget: WidgetId) -> Probe<Value> {
    let node = tree.get(widget)?;
    let WidgetKind::BusyIndicator { alive, .. } = &node.kind else {
        return None;
    };
    Some(Ok(Value::Bool(*alive)))
}

/// `Enabled`.
pub(super) fn enabled(tree: &WidgetTree, widget: WidgetId) -> Probe<Value> {
    let node = tree.get(widget)?;
    Some(Ok(Value::Bool(!node.flags.disabled)))
}

/// `Notify`.
pub(super) fn notify(tree: &WidgetTree, widget: WidgetId) -> Probe<Value> {
    let node = tree.get(widget)?;
    Some(Ok(Value::Bool(node.flags.notify)))
}

/// Term-keyed get on a table: `item(itemId)` returns the whole row as a
/// term, `cell(itemId, column)` one cell value. Unresolved items or columns
/// are logged and read as nil.
pub(super) fn table_cell(tree: &WidgetTree, widget: WidgetId, key: &Term) -> Probe<Value> {
    let node = tree.get(widget)?;
    let debug_label = node.debug_label();
    let WidgetKind::Table { items, .. } = &node.kind else {
        return None;
    };

    match key.args() {
        // item(itemId): the whole row.
        [wanted] => Some(Ok(match item::find_item(items, wanted) {
            Some(found) => writer::table_item_term(found),
            None => {
                error!(widget = "Table", label = %debug_label, id = %wanted, "no item with this id");
                Value::Nil
            }
        })),
        // cell(itemId, column): one cell.
        [wanted, Value::Int(column)] if *column >= 0 => {
            let Some(found) = item::find_item(items, wanted) else {
                error!(widget = "Table", label = %debug_label, id = %wanted, "no item with this id");
                return Some(Ok(Value::Nil));
            };
            Some(Ok(match found.cells.get(*column as usize) {
                Some(cell) => writer::cell_value(cell),
                None => {
                    error!(widget = "Table", id = %wanted, column, "item has no such column");
                    Value::Nil
                }
            }))
        }
        _ => Some(Err(crate::error::PropertyError::bad_value(
            "Table",
            key.name(),
            "item(itemId) or cell(itemId, column)",
            &Value::Term(key.clone()),
        ))),
    }
}

/// The id of the first selected item, nil when nothing is selected or the
/// selected item carries no id.
fn selected_item_id(items: &[Item]) -> Value {
    item::first_selected(items)
        .and_then(|item| item.id.clone())
        .unwrap_or(Value::Nil)
}
