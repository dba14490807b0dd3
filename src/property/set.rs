//! Set-direction property handlers.
//!
//! Each handler declines (`None`) when the widget is not of its kind and
//! commits otherwise. Once committed, a wrong value shape is an error;
//! an identifier that resolves to no item is logged and skipped.

use tracing::error;

use crate::error::PropertyError;
use crate::item::{self, parser as items_parser};
use crate::term::{Term, Value};
use crate::widget::{IdRegistry, WidgetId, WidgetKind, WidgetTree};

use super::Probe;

/// `Value`: checkbox state, selection, combo text, radio group, or the
/// plain value of a single-value widget — probed in that order.
pub(super) fn value(
    tree: &mut WidgetTree,
    registry: &IdRegistry,
    widget: WidgetId,
    prop: &str,
    val: &Value,
) -> Probe<()> {
    if let Some(r) = check_box_value(tree, widget, prop, val) {
        return Some(r);
    }
    if let Some(r) = selection_value(tree, widget, val) {
        return Some(r);
    }
    if let Some(r) = combo_box_value(tree, widget, val) {
        return Some(r);
    }
    if let Some(r) = current_button(tree, registry, widget, prop, val) {
        return Some(r);
    }
    simple_value(tree, widget, prop, val)
}

/// `CurrentItem`: like the selection part of `Value`, plus the focused item
/// of a multi selection box.
pub(super) fn current_item(
    tree: &mut WidgetTree,
    widget: WidgetId,
    prop: &str,
    val: &Value,
) -> Probe<()> {
    if let Some(r) = selection_value(tree, widget, val) {
        return Some(r);
    }
    multi_selection_current(tree, widget, prop, val)
}

fn check_box_value(
    tree: &mut WidgetTree,
    widget: WidgetId,
    prop: &str,
    val: &Value,
) -> Probe<()> {
    let node = tree.get_mut(widget)?;
    let WidgetKind::CheckBox { checked, .. } = &mut node.kind else {
        return None;
    };

    Some(match val {
        Value::Bool(b) => {
            *checked = Some(*b);
            Ok(())
        }
        // nil is the tri-state "don't care" state.
        Value::Nil => {
            *checked = None;
            Ok(())
        }
        other => Err(PropertyError::bad_value(
            "CheckBox",
            prop,
            "boolean or nil",
            other,
        )),
    })
}

/// Generic selection semantics: nil deselects everything, any other value is
/// an identifier resolved by depth-first search over the item tree. An
/// unmatched identifier is logged but the operation still succeeds.
fn selection_value(tree: &mut WidgetTree, widget: WidgetId, val: &Value) -> Probe<()> {
    let node = tree.get_mut(widget)?;
    if !matches!(
        node.kind,
        WidgetKind::SelectionBox { .. }
            | WidgetKind::ItemSelector { .. }
            | WidgetKind::Tree { .. }
            | WidgetKind::Table { .. }
            | WidgetKind::DumbTab { .. }
    ) {
        return None;
    }

    let kind_name = node.kind_name();
    let debug_label = node.debug_label();
    let items = node.kind.items_mut().expect("selection kinds carry items");

    if val.is_nil() {
        item::deselect_all(items);
        return Some(Ok(()));
    }

    if item::find_item(items, val).is_some() {
        item::deselect_all(items);
        let found = item::find_item_mut(items, val).expect("item was just found");
        found.set_selected(true);
    } else {
        error!(
            widget = kind_name,
            label = %debug_label,
            id = %val,
            "no item with this id"
        );
    }

    Some(Ok(()))
}

fn combo_box_value(tree: &mut WidgetTree, widget: WidgetId, val: &Value) -> Probe<()> {
    let node = tree.get_mut(widget)?;
    let debug_label = node.debug_label();
    let WidgetKind::ComboBox {
        editable,
        items,
        text,
        ..
    } = &mut node.kind
    else {
        return None;
    };

    if item::find_item(items, val).is_some() {
        item::deselect_all(items);
        let found = item::find_item_mut(items, val).expect("item was just found");
        found.set_selected(true);
        *text = found.label.clone();
        return Some(Ok(()));
    }

    // An editable combo box accepts free text when no item matches.
    if *editable {
        match val {
            Value::Str(s) => {
                item::deselect_all(items);
                *text = s.clone();
                return Some(Ok(()));
            }
            Value::Int(n) => {
                item::deselect_all(items);
                *text = n.to_string();
                return Some(Ok(()));
            }
            _ => {}
        }
    }

    error!(
        widget = "ComboBox",
        label = %debug_label,
        id = %val,
        "no item with this id"
    );

    Some(Ok(()))
}

/// `CurrentButton` (also the tail of the `Value` chain): select one radio
/// button of a group by widget id.
pub(super) fn current_button(
    tree: &mut WidgetTree,
    registry: &IdRegistry,
    widget: WidgetId,
    prop: &str,
    val: &Value,
) -> Probe<()> {
    if !matches!(tree.get(widget)?.kind, WidgetKind::RadioButtonGroup) {
        return None;
    }

    let wanted = unwrap_id(val);
    let subtree = tree.walk_depth_first(widget);

    let target = match registry.resolve(wanted) {
        Some(target) if subtree.contains(&target) => target,
        _ => return Some(Err(PropertyError::UnknownWidget(wanted.to_string()))),
    };

    if !matches!(
        tree.get(target).map(|n| &n.kind),
        Some(WidgetKind::RadioButton { .. })
    ) {
        return Some(Err(PropertyError::bad_value(
            "RadioButtonGroup",
            prop,
            "the id of a RadioButton",
            val,
        )));
    }

    // One-out-of-many: checking the target unchecks its group siblings.
    for id in subtree {
        if let Some(WidgetKind::RadioButton { checked, .. }) =
            tree.get_mut(id).map(|n| &mut n.kind)
        {
            *checked = id == target;
        }
    }

    Some(Ok(()))
}

fn multi_selection_current(
    tree: &mut WidgetTree,
    widget: WidgetId,
    _prop: &str,
    val: &Value,
) -> Probe<()> {
    let node = tree.get_mut(widget)?;
    let debug_label = node.debug_label();
    let WidgetKind::MultiSelectionBox { items, current, .. } = &mut node.kind else {
        return None;
    };

    if val.is_nil() {
        *current = None;
        return Some(Ok(()));
    }

    let wanted = unwrap_id(val);
    match items.iter().position(|item| item.id.as_ref() == Some(wanted)) {
        Some(index) => *current = Some(index),
        None => error!(
            widget = "MultiSelectionBox",
            label = %debug_label,
            id = %val,
            "no item with this id"
        ),
    }

    Some(Ok(()))
}

fn simple_value(tree: &mut WidgetTree, widget: WidgetId, prop: &str, val: &Value) -> Probe<()> {
    let node = tree.get_mut(widget)?;
    let kind_name = node.kind_name();

    match &mut node.kind {
        WidgetKind::InputField { text, .. }
        | WidgetKind::MultiLineEdit { text, .. }
        | WidgetKind::RichText { text, .. }
        | WidgetKind::LogView { text, .. } => Some(match val {
            Value::Str(s) => {
                *text = s.clone();
                Ok(())
            }
            other => Err(PropertyError::bad_value(kind_name, prop, "a string", other)),
        }),
        WidgetKind::DateField { value, .. } | WidgetKind::TimeField { value, .. } => {
            Some(match val {
                Value::Str(s) => {
                    *value = s.clone();
                    Ok(())
                }
                other => Err(PropertyError::bad_value(kind_name, prop, "a string", other)),
            })
        }
        WidgetKind::IntField {
            min, max, value, ..
        }
        | WidgetKind::Slider {
            min, max, value, ..
        } => Some(match val {
            Value::Int(n) => {
                *value = (*n).clamp(*min, *max);
                Ok(())
            }
            other => Err(PropertyError::bad_value(kind_name, prop, "an integer", other)),
        }),
        WidgetKind::ProgressBar {
            max_value, value, ..
        } => Some(match val {
            Value::Int(n) => {
                *value = (*n).clamp(0, *max_value);
                Ok(())
            }
            other => Err(PropertyError::bad_value(kind_name, prop, "an integer", other)),
        }),
        WidgetKind::BusyIndicator { alive, .. } => Some(match val {
            Value::Bool(b) => {
                *alive = *b;
                Ok(())
            }
            other => Err(PropertyError::bad_value(kind_name, prop, "a boolean", other)),
        }),
        _ => None,
    }
}

/// `Items`: wholesale replacement of a widget's item collection, parsed with
/// the parser matching the widget's item family.
pub(super) fn items(tree: &mut WidgetTree, widget: WidgetId, prop: &str, val: &Value) -> Probe<()> {
    let node = tree.get_mut(widget)?;
    if node.kind.items().is_none() {
        return None;
    }
    let kind_name = node.kind_name();

    let Some(list) = val.as_list() else {
        return Some(Err(PropertyError::bad_value(
            kind_name,
            prop,
            "a list of items",
            val,
        )));
    };

    let result = match &mut node.kind {
        WidgetKind::MenuBar { items } | WidgetKind::MenuButton { items, .. } => {
            items_parser::parse_menu_items(list).map(|parsed| *items = parsed)
        }
        WidgetKind::Tree { items, .. } => {
            items_parser::parse_tree_items(list).map(|parsed| *items = parsed)
        }
        WidgetKind::Table { header, items, .. } => {
            items_parser::parse_table_items(list, header.column_count())
                .map(|parsed| *items = parsed)
        }
        WidgetKind::ItemSelector { items, .. } => {
            items_parser::parse_items(list, true).map(|parsed| *items = parsed)
        }
        WidgetKind::ComboBox { items, text, .. } => {
            items_parser::parse_items(list, false).map(|parsed| {
                *items = parsed;
                *text = items
                    .iter()
                    .find(|item| item.selected)
                    .map(|item| item.label.clone())
                    .unwrap_or_default();
            })
        }
        WidgetKind::MultiSelectionBox { items, current, .. } => {
            items_parser::parse_items(list, false).map(|parsed| {
                *items = parsed;
                *current = None;
            })
        }
        WidgetKind::SelectionBox { items, .. } | WidgetKind::DumbTab { items } => {
            items_parser::parse_items(list, false).map(|parsed| *items = parsed)
        }
        _ => unreachable!("items() returned Some for a non-item kind"),
    };

    Some(result.map_err(PropertyError::from))
}

/// `SelectedItems`: clear the selection, then select each identifier in the
/// given order. Unresolved identifiers are logged, not fatal.
pub(super) fn selected_items(
    tree: &mut WidgetTree,
    widget: WidgetId,
    prop: &str,
    val: &Value,
) -> Probe<()> {
    let node = tree.get_mut(widget)?;
    if !matches!(
        node.kind,
        WidgetKind::MultiSelectionBox { .. }
            | WidgetKind::ItemSelector { .. }
            | WidgetKind::Table { .. }
            | WidgetKind::Tree { .. }
    ) {
        return None;
    }

    let kind_name = node.kind_name();
    let debug_label = node.debug_label();

    let Some(wanted_ids) = val.as_list() else {
        return Some(Err(PropertyError::bad_value(
            kind_name,
            prop,
            "a list of item ids",
            val,
        )));
    };

    let items = node.kind.items_mut().expect("selection kinds carry items");
    item::deselect_all(items);

    for wanted in wanted_ids {
        match item::find_item_mut(items, wanted) {
            Some(found) => found.set_selected(true),
            None => error!(
                widget = kind_name,
                label = %debug_label,
                id = %wanted,
                "no item with this id"
            ),
        }
    }

    Some(Ok(()))
}

/// `ItemStatus`: a map from item identifier to an integer (or boolean)
/// status. A malformed status value fails the whole operation; an
/// unresolved identifier is a skipped key.
pub(super) fn item_status(
    tree: &mut WidgetTree,
    widget: WidgetId,
    prop: &str,
    val: &Value,
) -> Probe<()> {
    let node = tree.get_mut(widget)?;
    node.kind.items()?;

    let kind_name = node.kind_name();
    let debug_label = node.debug_label();

    let Some(status_map) = val.as_map() else {
        return Some(Err(PropertyError::bad_value(
            kind_name,
            prop,
            "a map of item ids to statuses",
            val,
        )));
    };

    let items = node.kind.items_mut().expect("checked above");

    for (wanted, raw_status) in status_map {
        let status = match raw_status {
            Value::Int(n) => *n as i32,
            Value::Bool(b) => i32::from(*b),
            other => {
                return Some(Err(PropertyError::bad_value(
                    kind_name,
                    prop,
                    "an integer or boolean status",
                    other,
                )))
            }
        };

        match item::find_item_mut(items, wanted) {
            Some(found) => found.set_status(status),
            None => error!(
                widget = kind_name,
                label = %debug_label,
                id = %wanted,
                "no item with this id"
            ),
        }
    }

    Some(Ok(()))
}

/// `EnabledItems`: a map from menu item identifier to a boolean. Same
/// asymmetry as `ItemStatus`.
pub(super) fn enabled_items(
    tree: &mut WidgetTree,
    widget: WidgetId,
    prop: &str,
    val: &Value,
) -> Probe<()> {
    let node = tree.get_mut(widget)?;
    if !node.kind.is_menu() {
        return None;
    }

    let kind_name = node.kind_name();
    let debug_label = node.debug_label();

    let Some(enabled_map) = val.as_map() else {
        return Some(Err(PropertyError::bad_value(
            kind_name,
            prop,
            "a map of item ids to booleans",
            val,
        )));
    };

    let items = node.kind.items_mut().expect("menu kinds carry items");

    for (wanted, raw_enabled) in enabled_map {
        let Value::Bool(enabled) = raw_enabled else {
            return Some(Err(PropertyError::bad_value(
                kind_name,
                prop,
                "a boolean",
                raw_enabled,
            )));
        };

        match item::find_item_mut(items, wanted) {
            Some(found) => found.enabled = *enabled,
            None => error!(
                widget = kind_name,
                label = %debug_label,
                id = %wanted,
                "no item with this id"
            ),
        }
    }

    Some(Ok(()))
}

/// `Values`: current values of a multi progress meter, or the segment
/// values of a bar graph.
pub(super) fn values(tree: &mut WidgetTree, widget: WidgetId, prop: &str, val: &Value) -> Probe<()> {
    let node = tree.get_mut(widget)?;
    let kind_name = node.kind_name();

    match &mut node.kind {
        WidgetKind::MultiProgressMeter { current_values, .. } => {
            let Some(list) = val.as_list() else {
                return Some(Err(PropertyError::bad_value(
                    kind_name,
                    prop,
                    "a list of integers or floats",
                    val,
                )));
            };
            let mut parsed = Vec::with_capacity(list.len());
            for entry in list {
                match entry.as_num() {
                    Some(n) => parsed.push(n),
                    None => {
                        return Some(Err(PropertyError::bad_value(
                            kind_name,
                            prop,
                            "a list of integers or floats",
                            entry,
                        )))
                    }
                }
            }
            *current_values = parsed;
            Some(Ok(()))
        }
        WidgetKind::BarGraph { segments } => {
            let Some(list) = val.as_list() else {
                return Some(Err(PropertyError::bad_value(
                    kind_name,
                    prop,
                    "a list of integers",
                    val,
                )));
            };
            for (i, entry) in list.iter().enumerate() {
                let Value::Int(n) = entry else {
                    return Some(Err(PropertyError::bad_value(
                        kind_name,
                        prop,
                        "a list of integers",
                        entry,
                    )));
                };
                match segments.get_mut(i) {
                    Some(segment) => segment.value = *n,
                    None => error!(index = i, "ignoring excess bar graph value"),
                }
            }
            Some(Ok(()))
        }
        _ => None,
    }
}

/// `Labels`: the segment labels of a bar graph.
pub(super) fn labels(tree: &mut WidgetTree, widget: WidgetId, prop: &str, val: &Value) -> Probe<()> {
    let node = tree.get_mut(widget)?;
    let WidgetKind::BarGraph { segments } = &mut node.kind else {
        return None;
    };

    let Some(list) = val.as_list() else {
        return Some(Err(PropertyError::bad_value(
            "BarGraph",
            prop,
            "a list of strings",
            val,
        )));
    };

    for (i, entry) in list.iter().enumerate() {
        let Value::Str(s) = entry else {
            return Some(Err(PropertyError::bad_value(
                "BarGraph",
                prop,
                "a list of strings",
                entry,
            )));
        };
        match segments.get_mut(i) {
            Some(segment) => segment.label = s.clone(),
            None => error!(index = i, "ignoring excess bar graph label"),
        }
    }

    Some(Ok(()))
}

/// `Label`: the user-visible label of any labeled widget.
pub(super) fn label(tree: &mut WidgetTree, widget: WidgetId, prop: &str, val: &Value) -> Probe<()> {
    let node = tree.get_mut(widget)?;
    let kind_name = node.kind_name();
    let label = node.kind.label_mut()?;

    Some(match val {
        Value::Str(s) => {
            *label = s.clone();
            Ok(())
        }
        other => Err(PropertyError::bad_value(kind_name, prop, "a string", other)),
    })
}

/// `LastLine`: append output to a log view.
pub(super) fn last_line(
    tree: &mut WidgetTree,
    widget: WidgetId,
    prop: &str,
    val: &Value,
) -> Probe<()> {
    let node = tree.get_mut(widget)?;
    let WidgetKind::LogView { text, .. } = &mut node.kind else {
        return None;
    };

    Some(match val {
        Value::Str(s) => {
            text.push_str(s);
            Ok(())
        }
        other => Err(PropertyError::bad_value("LogView", prop, "a string", other)),
    })
}

/// `Alive`: busy indicator keep-alive.
pub(super) fn alive(tree: &mut WidgetTree, widget: WidgetId, prop: &str, val: &Value) -> Probe<()> {
    let node = tree.get_mut(widget)?;
    let WidgetKind::BusyIndicator { alive, .. } = &mut node.kind else {
        return None;
    };

    Some(match val {
        Value::Bool(b) => {
            *alive = *b;
            Ok(())
        }
        other => Err(PropertyError::bad_value(
            "BusyIndicator",
            prop,
            "a boolean",
            other,
        )),
    })
}

/// `Enabled`: every widget supports enabling/disabling.
pub(super) fn enabled(tree: &mut WidgetTree, widget: WidgetId, prop: &str, val: &Value) -> Probe<()> {
    let node = tree.get_mut(widget)?;
    let kind_name = node.kind_name();

    Some(match val {
        Value::Bool(b) => {
            node.flags.disabled = !*b;
            Ok(())
        }
        other => Err(PropertyError::bad_value(kind_name, prop, "a boolean", other)),
    })
}

/// `Notify`: every widget supports toggling event notification.
pub(super) fn notify(tree: &mut WidgetTree, widget: WidgetId, prop: &str, val: &Value) -> Probe<()> {
    let node = tree.get_mut(widget)?;
    let kind_name = node.kind_name();

    Some(match val {
        Value::Bool(b) => {
            node.flags.notify = *b;
            Ok(())
        }
        other => Err(PropertyError::bad_value(kind_name, prop, "a boolean", other)),
    })
}

/// Term-keyed `cell(itemId, column)` set on a table: a string/integer/nil
/// value replaces the cell label, an `icon(name)` term replaces the icon.
pub(super) fn table_cell(
    tree: &mut WidgetTree,
    widget: WidgetId,
    key: &Term,
    val: &Value,
) -> Probe<()> {
    let node = tree.get_mut(widget)?;
    let debug_label = node.debug_label();
    let WidgetKind::Table { items, .. } = &mut node.kind else {
        return None;
    };

    let prop = key.name();
    let (wanted, column) = match key.args() {
        [wanted, Value::Int(column)] if *column >= 0 => (wanted, *column as usize),
        _ => {
            return Some(Err(PropertyError::bad_value(
                "Table",
                prop,
                "cell(itemId, column)",
                &Value::Term(key.clone()),
            )))
        }
    };

    let Some(found) = item::find_item_mut(items, wanted) else {
        error!(widget = "Table", label = %debug_label, id = %wanted, "no item with this id");
        return Some(Ok(()));
    };

    let Some(cell) = found.cells.get_mut(column) else {
        error!(widget = "Table", id = %wanted, column, "item has no such column");
        return Some(Ok(()));
    };

    Some(match val {
        Value::Str(s) => {
            cell.label = s.clone();
            Ok(())
        }
        Value::Int(n) => {
            cell.label = n.to_string();
            Ok(())
        }
        Value::Nil => {
            cell.label.clear();
            Ok(())
        }
        Value::Term(t) if t.name() == "icon" && t.len() == 1 && t.args()[0].as_str().is_some() => {
            cell.icon = Some(t.args()[0].as_str().unwrap().to_owned());
            Ok(())
        }
        other => Err(PropertyError::bad_value(
            "Table",
            prop,
            "string, integer, nil, or icon(name)",
            other,
        )),
    })
}

/// Unwrap an `id(x)` wrapper around an identifier value.
fn unwrap_id(value: &Value) -> &Value {
    match value.as_term() {
        Some(t) if t.name() == "id" && t.len() == 1 => &t.args()[0],
        _ => value,
    }
}
