//! The property bridge: routing named get/set requests to widget-kind
//! handlers.
//!
//! For every property name there is a fixed, ordered list of candidate
//! handlers, probed most-specific first (a menu widget is tried before the
//! generic item-list fallback, because a menu kind is structurally also
//! selection-capable). A candidate declines when the widget is not of its
//! kind; the first candidate whose kind matches commits — a bad value shape
//! after that point is a typed error, never a fall-through. No match across
//! all candidates is a caller bug and reported as [`PropertyError::NoHandler`]
//! naming the concrete kind and the property.
//!
//! Preserved asymmetry (load-bearing, do not "fix"): an identifier that
//! resolves to no item is logged and skipped while the operation succeeds; a
//! value of the wrong shape fails the whole operation.

mod get;
mod set;

use crate::error::PropertyError;
use crate::term::{Term, Value};
use crate::widget::{IdRegistry, WidgetId, WidgetTree};

/// The result of probing one candidate handler: `None` declines (wrong
/// kind), `Some(result)` commits.
type Probe<T> = Option<Result<T, PropertyError>>;

/// Route a named set request. Returns an error if no candidate matches the
/// widget's kind or the committed candidate rejects the value's shape.
pub(crate) fn set_property(
    tree: &mut WidgetTree,
    registry: &IdRegistry,
    widget: WidgetId,
    property: &str,
    value: &Value,
) -> Result<(), PropertyError> {
    let probed = match property {
        "Value" => set::value(tree, registry, widget, property, value),
        "CurrentItem" => set::current_item(tree, widget, property, value),
        "CurrentButton" => set::current_button(tree, registry, widget, property, value),
        "Items" => set::items(tree, widget, property, value),
        "SelectedItems" => set::selected_items(tree, widget, property, value),
        "ItemStatus" => set::item_status(tree, widget, property, value),
        "EnabledItems" => set::enabled_items(tree, widget, property, value),
        "Values" => set::values(tree, widget, property, value),
        "Labels" => set::labels(tree, widget, property, value),
        "Label" => set::label(tree, widget, property, value),
        "LastLine" => set::last_line(tree, widget, property, value),
        "Alive" => set::alive(tree, widget, property, value),
        "Enabled" => set::enabled(tree, widget, property, value),
        "Notify" => set::notify(tree, widget, property, value),
        _ => None,
    };

    commit(tree, widget, property, probed)
}

/// Route a named get request.
pub(crate) fn get_property(
    tree: &WidgetTree,
    widget: WidgetId,
    property: &str,
) -> Result<Value, PropertyError> {
    let probed = match property {
        "Value" => get::value(tree, widget),
        "CurrentItem" => get::current_item(tree, widget),
        "CurrentButton" => get::current_button(tree, widget),
        "Items" => get::items(tree, widget),
        "SelectedItems" => get::selected_items(tree, widget),
        "ItemStatus" => get::item_status(tree, widget),
        "EnabledItems" => get::enabled_items(tree, widget),
        "OpenItems" => get::open_items(tree, widget),
        "CurrentBranch" => get::current_branch(tree, widget),
        "Values" => get::values(tree, widget),
        "Labels" => get::labels(tree, widget),
        "Label" => get::label(tree, widget),
        "Alive" => get::alive(tree, widget),
        "Enabled" => get::enabled(tree, widget),
        "Notify" => get::notify(tree, widget),
        _ => None,
    };

    commit(tree, widget, property, probed)
}

/// Route a term-keyed set request, e.g. `cell(itemId, column)`.
pub(crate) fn set_keyed_property(
    tree: &mut WidgetTree,
    widget: WidgetId,
    key: &Term,
    value: &Value,
) -> Result<(), PropertyError> {
    let probed = match key.name() {
        "Cell" | "cell" | "Item" | "item" => set::table_cell(tree, widget, key, value),
        _ => None,
    };

    commit(tree, widget, key.name(), probed)
}

/// Route a term-keyed get request: `cell(itemId, column)` for one cell,
/// `item(itemId)` for a whole row.
pub(crate) fn get_keyed_property(
    tree: &WidgetTree,
    widget: WidgetId,
    key: &Term,
) -> Result<Value, PropertyError> {
    let probed = match key.name() {
        "Cell" | "cell" | "Item" | "item" => get::table_cell(tree, widget, key),
        _ => None,
    };

    commit(tree, widget, key.name(), probed)
}

fn commit<T>(
    tree: &WidgetTree,
    widget: WidgetId,
    property: &str,
    probed: Probe<T>,
) -> Result<T, PropertyError> {
    match probed {
        Some(result) => result,
        None => Err(PropertyError::NoHandler {
            kind: tree.get(widget).map(|n| n.kind_name()).unwrap_or("?"),
            property: property.to_owned(),
        }),
    }
}
