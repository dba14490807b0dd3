//! Item serializers: the structural inverse of [`crate::item::parser`].
//!
//! For any parser-produced collection `x`, parsing the serialized form
//! reproduces `x` exactly. Identifiers that were defaulted from the label
//! (synthetic) are never written back out, so a fresh parse followed by a
//! serialize does not introduce a spurious `id(...)`.

use crate::term::{Term, Value};

use super::{Cell, Item};

/// Serialize a plain item list (selection boxes, combo boxes, dumb tabs).
pub fn write_items(items: &[Item]) -> Value {
    write_item_list(items, false)
}

/// Serialize a described item list (item selectors).
pub fn write_described_items(items: &[Item]) -> Value {
    write_item_list(items, true)
}

fn write_item_list(items: &[Item], with_description: bool) -> Value {
    Value::List(
        items
            .iter()
            .map(|item| write_item(item, with_description))
            .collect(),
    )
}

fn write_item(item: &Item, with_description: bool) -> Value {
    let mut term = item_term_head(item);

    term = term.arg(Value::str(item.label.clone()));

    if with_description {
        term = term.arg(Value::str(item.description.clone()));
    }

    if item.selected {
        term = term.arg(Value::Bool(true));
    }

    Value::Term(term)
}

/// Serialize a tree item list, recursively.
pub fn write_tree_items(items: &[Item]) -> Value {
    Value::List(items.iter().map(write_tree_item).collect())
}

fn write_tree_item(item: &Item) -> Value {
    let mut term = item_term_head(item);

    term = term.arg(Value::str(item.label.clone()));

    if item.open {
        term = term.arg(Value::Bool(true));
    }

    if !item.children.is_empty() {
        term = term.arg(write_tree_items(&item.children));
    }

    Value::Term(term)
}

/// Serialize a menu item list, recursively. Submenus serialize as `item(...)`
/// terms with a trailing sub-item list, which the parser accepts as well.
pub fn write_menu_items(items: &[Item]) -> Value {
    Value::List(items.iter().map(write_menu_item).collect())
}

fn write_menu_item(item: &Item) -> Value {
    let mut term = item_term_head(item);

    term = term.arg(Value::str(item.label.clone()));

    if !item.children.is_empty() {
        term = term.arg(write_menu_items(&item.children));
    }

    Value::Term(term)
}

/// Serialize a table item list.
pub fn write_table_items(items: &[Item]) -> Value {
    Value::List(items.iter().map(write_table_item).collect())
}

/// Serialize one table row as an `item(...)` term.
pub fn table_item_term(item: &Item) -> Value {
    write_table_item(item)
}

fn write_table_item(item: &Item) -> Value {
    let mut term = match (&item.id, item.synthetic_id) {
        (Some(id), false) => Term::new("item").arg(Value::Term(Term::new("id").arg(id.clone()))),
        _ => Term::new("item"),
    };

    for cell in &item.cells {
        term = term.arg(cell_value(cell));
    }

    Value::Term(term)
}

/// Serialize one table cell: a plain label string when it carries neither
/// icon nor sort key, a `cell(...)` term otherwise.
pub fn cell_value(cell: &Cell) -> Value {
    if cell.icon.is_none() && cell.sort_key.is_none() {
        return Value::str(cell.label.clone());
    }

    let mut term = Term::new("cell");
    if let Some(icon) = &cell.icon {
        term = term.arg(Value::Term(Term::new("icon").arg(Value::str(icon.clone()))));
    }
    if let Some(key) = &cell.sort_key {
        term = term.arg(Value::Term(
            Term::new("sortKey").arg(Value::str(key.clone())),
        ));
    }
    Value::Term(term.arg(Value::str(cell.label.clone())))
}

/// Emit `item(` with the id and icon sub-terms that every item family
/// shares. Synthetic ids are skipped.
fn item_term_head(item: &Item) -> Term {
    let mut term = Term::new("item");

    if let (Some(id), false) = (&item.id, item.synthetic_id) {
        term = term.arg(Value::Term(Term::new("id").arg(id.clone())));
    }

    if let Some(icon) = &item.icon {
        term = term.arg(Value::Term(Term::new("icon").arg(Value::str(icon.clone()))));
    }

    term
}
