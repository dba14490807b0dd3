//! Item parsers: plain, described, tree, menu, and table item lists, plus
//! custom status definitions and table headers.
//!
//! Every parser is strict about required sub-arguments (a missing label, a
//! repeated `id(...)`) and recursive for the nested kinds. Nesting is capped
//! at [`MAX_ITEM_DEPTH`]; exceeding the cap is a syntax error rather than a
//! stack overflow.

use tracing::warn;

use crate::error::CompileError;
use crate::term::{Term, Value};

use super::{Cell, ColumnAlignment, Item, ItemKind, StatusDef, TableColumn, TableHeader};

/// Upper bound on item nesting (trees, menus). The serializers only ever see
/// parser-produced collections, so their recursion is bounded by the same cap.
pub const MAX_ITEM_DEPTH: usize = 64;

const ITEM_USAGE: &str = r#"item(id(myID), icon("my_icon.png"), "MyItemText", true)"#;
const DESCRIBED_ITEM_USAGE: &str =
    r#"item(id(myID), icon("my_icon.png"), "MyItemText", "Description", true)"#;
const TREE_ITEM_USAGE: &str =
    r#"item(id(myID), icon("my_icon.png"), "MyItemText", true, subItemList)"#;
const MENU_ITEM_USAGE: &str = r#"item(id(myID), icon("my_icon.png"), "MyItemText", subItemList)"#;
const TABLE_ITEM_USAGE: &str =
    r#"item(id(myID), "cell text", cell(icon("my_icon.png"), sortKey("key"), "cell text"))"#;
const STATUS_DEF_USAGE: &str = r#"[["iconName1", "textIndicator1", nextStatus1], [...], ...]"#;

/// Parse an item list for selection boxes, combo boxes, dumb tabs and item
/// selectors:
///
/// ```text
/// [
///     item(id(myID1), "Label1"),
///     item(id(myID2), icon("icon2.png"), "Label2", true),
///     "Label3",
/// ]
/// ```
///
/// With `allow_description`, a second string per item is accepted as the
/// item's description block.
pub fn parse_items(list: &[Value], allow_description: bool) -> Result<Vec<Item>, CompileError> {
    let kind = if allow_description {
        ItemKind::Described
    } else {
        ItemKind::Plain
    };

    list.iter()
        .map(|raw| parse_item(kind, raw, allow_description))
        .collect()
}

/// Parse one plain or described item: a bare string shorthand, or an
/// `item(...)` term.
fn parse_item(kind: ItemKind, raw: &Value, allow_description: bool) -> Result<Item, CompileError> {
    let usage = if allow_description {
        DESCRIBED_ITEM_USAGE
    } else {
        ITEM_USAGE
    };

    if let Some(label) = raw.as_str() {
        // Bare string shorthand: the label doubles as the identifier.
        let mut item = Item::new(kind, label);
        item.id = Some(Value::str(label));
        item.synthetic_id = true;
        return Ok(item);
    }

    let term = match raw.as_term() {
        Some(t) if t.name() == "item" => t,
        _ => return Err(CompileError::syntax(usage, raw)),
    };

    let mut id = None;
    let mut icon = None;
    let mut label = None;
    let mut description = None;
    let mut selected = None;

    for arg in term.args() {
        match arg {
            Value::Term(sub) if sub.name() == "id" && id.is_none() && sub.len() == 1 => {
                id = Some(sub.args()[0].clone());
            }
            Value::Term(sub)
                if sub.name() == "icon"
                    && icon.is_none()
                    && sub.len() == 1
                    && sub.args()[0].as_str().is_some() =>
            {
                icon = Some(sub.args()[0].as_str().unwrap().to_owned());
            }
            Value::Str(s) if label.is_none() => label = Some(s.clone()),
            Value::Str(s) if allow_description && description.is_none() => {
                description = Some(s.clone())
            }
            Value::Bool(b) if selected.is_none() => selected = Some(*b),
            _ => return Err(CompileError::syntax(usage, raw)),
        }
    }

    let label = label.ok_or_else(|| CompileError::syntax(usage, raw))?;

    let mut item = Item::new(kind, label.clone());
    if id.is_none() {
        // No id(...): default to the label, marked synthetic so the
        // serializer won't emit a spurious id.
        item.id = Some(Value::str(label));
        item.synthetic_id = true;
    } else {
        item.id = id;
    }
    item.icon = icon;
    item.description = description.unwrap_or_default();
    item.set_selected(selected.unwrap_or(false));

    Ok(item)
}

/// Parse a tree item list. Tree items may carry an "open" flag and a nested
/// sub-item list, recursively:
///
/// ```text
/// [
///     item(id(root), "Root", true, [
///         "Leaf",
///         item(id(sub), "Subtree", [item("Deep")]),
///     ]),
/// ]
/// ```
pub fn parse_tree_items(list: &[Value]) -> Result<Vec<Item>, CompileError> {
    parse_tree_item_list(list, 0)
}

fn parse_tree_item_list(list: &[Value], depth: usize) -> Result<Vec<Item>, CompileError> {
    list.iter()
        .map(|raw| parse_tree_item(raw, depth))
        .collect()
}

fn parse_tree_item(raw: &Value, depth: usize) -> Result<Item, CompileError> {
    if depth >= MAX_ITEM_DEPTH {
        return Err(CompileError::TooDeep {
            max: MAX_ITEM_DEPTH,
            term: raw.to_string(),
        });
    }

    if let Some(label) = raw.as_str() {
        return Ok(Item::new(ItemKind::Tree, label));
    }

    let term = match raw.as_term() {
        Some(t) if t.name() == "item" => t,
        _ => return Err(CompileError::syntax(TREE_ITEM_USAGE, raw)),
    };

    let mut id = None;
    let mut icon = None;
    let mut label = None;
    let mut open = None;
    let mut children = None;

    for arg in term.args() {
        match arg {
            Value::Term(sub) if sub.name() == "id" && id.is_none() && sub.len() == 1 => {
                id = Some(sub.args()[0].clone());
            }
            Value::Term(sub)
                if sub.name() == "icon"
                    && icon.is_none()
                    && sub.len() == 1
                    && sub.args()[0].as_str().is_some() =>
            {
                icon = Some(sub.args()[0].as_str().unwrap().to_owned());
            }
            Value::Str(s) if label.is_none() => label = Some(s.clone()),
            Value::Bool(b) if open.is_none() => open = Some(*b),
            Value::List(sub) if children.is_none() => {
                children = Some(parse_tree_item_list(sub, depth + 1)?);
            }
            _ => return Err(CompileError::syntax(TREE_ITEM_USAGE, raw)),
        }
    }

    let label = label.ok_or_else(|| CompileError::syntax(TREE_ITEM_USAGE, raw))?;

    let mut item = Item::new(ItemKind::Tree, label);
    item.id = id;
    item.icon = icon;
    item.open = open.unwrap_or(false);
    item.children = children.unwrap_or_default();

    Ok(item)
}

/// Parse a menu item list. Menu items are `item(...)` or `menu(...)` terms
/// (no bare strings); a label starting with `---` is normalized to an empty
/// label and stands for a separator; a missing id defaults to the
/// shortcut-cleaned label.
pub fn parse_menu_items(list: &[Value]) -> Result<Vec<Item>, CompileError> {
    parse_menu_item_list(list, 0)
}

fn parse_menu_item_list(list: &[Value], depth: usize) -> Result<Vec<Item>, CompileError> {
    list.iter()
        .map(|raw| parse_menu_item(raw, depth))
        .collect()
}

fn parse_menu_item(raw: &Value, depth: usize) -> Result<Item, CompileError> {
    if depth >= MAX_ITEM_DEPTH {
        return Err(CompileError::TooDeep {
            max: MAX_ITEM_DEPTH,
            term: raw.to_string(),
        });
    }

    let term = match raw.as_term() {
        Some(t) if t.name() == "item" || t.name() == "menu" => t,
        _ => return Err(CompileError::syntax(MENU_ITEM_USAGE, raw)),
    };

    let mut id = None;
    let mut icon = None;
    let mut label: Option<String> = None;
    let mut children = None;

    for arg in term.args() {
        match arg {
            Value::Term(sub) if sub.name() == "id" && id.is_none() && sub.len() == 1 => {
                id = Some(sub.args()[0].clone());
            }
            Value::Term(sub)
                if sub.name() == "icon"
                    && icon.is_none()
                    && sub.len() == 1
                    && sub.args()[0].as_str().is_some() =>
            {
                icon = Some(sub.args()[0].as_str().unwrap().to_owned());
            }
            Value::Str(s) if label.is_none() => label = Some(s.clone()),
            Value::List(sub) if children.is_none() => {
                children = Some(parse_menu_item_list(sub, depth + 1)?);
            }
            _ => return Err(CompileError::syntax(MENU_ITEM_USAGE, raw)),
        }
    }

    let mut label = label.ok_or_else(|| CompileError::syntax(MENU_ITEM_USAGE, raw))?;

    if label.starts_with("---") {
        // Separator convention.
        label.clear();
    }

    let mut item = Item::new(ItemKind::Menu, label.clone());
    if id.is_none() && !label.is_empty() {
        item.id = Some(Value::str(clean_shortcut(&label)));
        item.synthetic_id = true;
    } else {
        item.id = id;
    }
    item.icon = icon;
    item.children = children.unwrap_or_default();

    Ok(item)
}

/// Strip keyboard shortcut markers (`&`) from a label.
pub fn clean_shortcut(label: &str) -> String {
    label.chars().filter(|&c| c != '&').collect()
}

/// Parse a table item list. Each positional argument after the optional id
/// is one column's cell: a bare string or number, or a
/// `cell(icon(...), sortKey(...), label)` term. Rows are padded with empty
/// cells up to `columns` and excess cells beyond it are dropped.
pub fn parse_table_items(list: &[Value], columns: usize) -> Result<Vec<Item>, CompileError> {
    list.iter()
        .map(|raw| parse_table_item(raw, columns))
        .collect()
}

fn parse_table_item(raw: &Value, columns: usize) -> Result<Item, CompileError> {
    let term = match raw.as_term() {
        Some(t) if t.name() == "item" => t,
        _ => return Err(CompileError::syntax(TABLE_ITEM_USAGE, raw)),
    };

    let mut id = None;
    let mut cells = Vec::new();

    for (i, arg) in term.args().iter().enumerate() {
        match arg {
            Value::Term(sub) if sub.name() == "id" => {
                if i != 0 || sub.len() != 1 || id.is_some() {
                    return Err(CompileError::syntax(TABLE_ITEM_USAGE, raw));
                }
                id = Some(sub.args()[0].clone());
            }
            Value::Term(sub) if sub.name() == "cell" => cells.push(parse_cell(sub, raw)?),
            Value::Str(s) => cells.push(Cell::new(s.clone())),
            Value::Int(n) => cells.push(Cell::new(n.to_string())),
            Value::Float(_) => cells.push(Cell::new(arg.to_string())),
            Value::Nil => cells.push(Cell::empty()),
            _ => return Err(CompileError::syntax(TABLE_ITEM_USAGE, raw)),
        }
    }

    if cells.len() > columns {
        warn!(
            row = %raw,
            columns,
            "ignoring excess table cells beyond the declared header"
        );
        cells.truncate(columns);
    }
    while cells.len() < columns {
        cells.push(Cell::empty());
    }

    let mut item = Item::new(ItemKind::Table, "");
    item.id = id;
    item.cells = cells;

    Ok(item)
}

/// Parse one `cell(...)` term: optional `icon(...)`, optional `sortKey(...)`,
/// required label (string or number).
fn parse_cell(term: &Term, context: &Value) -> Result<Cell, CompileError> {
    let mut icon = None;
    let mut sort_key = None;
    let mut label: Option<String> = None;

    for arg in term.args() {
        match arg {
            Value::Term(sub)
                if sub.name() == "icon"
                    && icon.is_none()
                    && sub.len() == 1
                    && sub.args()[0].as_str().is_some() =>
            {
                icon = Some(sub.args()[0].as_str().unwrap().to_owned());
            }
            Value::Term(sub) if sub.name() == "sortKey" && sort_key.is_none() && sub.len() == 1 => {
                sort_key = Some(match &sub.args()[0] {
                    Value::Str(s) => s.clone(),
                    Value::Int(n) => n.to_string(),
                    v @ Value::Float(_) => v.to_string(),
                    _ => return Err(CompileError::syntax(TABLE_ITEM_USAGE, context)),
                });
            }
            Value::Str(s) if label.is_none() => label = Some(s.clone()),
            Value::Int(n) if label.is_none() => label = Some(n.to_string()),
            v @ Value::Float(_) if label.is_none() => label = Some(v.to_string()),
            _ => return Err(CompileError::syntax(TABLE_ITEM_USAGE, context)),
        }
    }

    let mut cell = Cell::new(label.ok_or_else(|| CompileError::syntax(TABLE_ITEM_USAGE, context))?);
    cell.icon = icon;
    cell.sort_key = sort_key;

    Ok(cell)
}

/// Parse a custom status definition list (minimum 2 entries):
///
/// ```text
/// [
///     ["iconDontInstall", "[  ]", 1],
///     ["iconInstall",     "[++]", 0],
///     ["iconAutoInstall", "[a+]"   ],
/// ]
/// ```
pub fn parse_status_defs(list: &[Value]) -> Result<Vec<StatusDef>, CompileError> {
    let mut defs = Vec::with_capacity(list.len());

    for raw in list {
        let entry = raw
            .as_list()
            .ok_or_else(|| CompileError::syntax(STATUS_DEF_USAGE, raw))?;

        let (icon, indicator) = match entry {
            [Value::Str(icon), Value::Str(ind)] => (icon, ind),
            [Value::Str(icon), Value::Str(ind), Value::Int(_)] => (icon, ind),
            _ => return Err(CompileError::syntax(STATUS_DEF_USAGE, raw)),
        };

        let next_status = match entry.get(2) {
            Some(Value::Int(n)) => *n as i32,
            _ => -1,
        };

        if next_status > list.len() as i32 - 1 {
            return Err(CompileError::Syntax {
                expected: format!("nextStatus <= {}", list.len() - 1),
                found: raw.to_string(),
            });
        }

        defs.push(StatusDef {
            icon: icon.clone(),
            indicator: indicator.clone(),
            next_status,
        });
    }

    if defs.len() < 2 {
        return Err(CompileError::Syntax {
            expected: "at least 2 custom status values".to_owned(),
            found: Value::List(list.to_vec()).to_string(),
        });
    }

    Ok(defs)
}

/// Parse a `header(...)` term into a [`TableHeader`]. Column entries are
/// strings or `Left|Center|Right(string)` alignment terms; malformed entries
/// are logged, never fatal.
pub fn parse_table_header(term: &Term) -> TableHeader {
    let mut header = TableHeader::default();

    for arg in term.args() {
        match arg {
            Value::Str(s) => header.columns.push(TableColumn {
                label: s.clone(),
                alignment: ColumnAlignment::Begin,
            }),
            Value::Term(col) => {
                let alignment = match col.name() {
                    "Left" => ColumnAlignment::Begin,
                    "Right" => ColumnAlignment::End,
                    "Center" => ColumnAlignment::Center,
                    other => {
                        warn!(alignment = other, "unknown table header alignment");
                        ColumnAlignment::Begin
                    }
                };

                let label = match col.get(0) {
                    Some(Value::Str(s)) => s.clone(),
                    Some(other) => {
                        warn!(value = %other, "expected string for table header");
                        String::new()
                    }
                    None => String::new(),
                };
                if col.len() > 1 {
                    warn!(term = %col, "ignoring extra table header parameters");
                }

                header.columns.push(TableColumn { label, alignment });
            }
            other => warn!(value = %other, "ignoring malformed table header entry"),
        }
    }

    header
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::parser::parse_value;

    fn list(input: &str) -> Vec<Value> {
        parse_value(input).unwrap().as_list().unwrap().to_vec()
    }

    // ── Plain and described items ────────────────────────────────────

    #[test]
    fn bare_string_shorthand() {
        let items = parse_items(&list(r#"["Tomato"]"#), false).unwrap();
        assert_eq!(items[0].label, "Tomato");
        assert_eq!(items[0].id, Some(Value::str("Tomato")));
        assert!(items[0].synthetic_id);
        assert!(!items[0].selected);
    }

    #[test]
    fn full_item_term() {
        let items = parse_items(
            &list(r#"[item(id(x), icon("x.png"), "X", true)]"#),
            false,
        )
        .unwrap();
        assert_eq!(items[0].id, Some(Value::sym("x")));
        assert!(!items[0].synthetic_id);
        assert_eq!(items[0].icon.as_deref(), Some("x.png"));
        assert!(items[0].selected);
        assert_eq!(items[0].status, 1);
    }

    #[test]
    fn description_needs_opt_in() {
        let raw = list(r#"[item(id(x), "X", "long text")]"#);
        assert!(parse_items(&raw, false).is_err());

        let items = parse_items(&raw, true).unwrap();
        assert_eq!(items[0].description, "long text");
    }

    #[test]
    fn duplicate_id_rejected() {
        let raw = list(r#"[item(id(x), id(y), "X")]"#);
        assert!(parse_items(&raw, false).is_err());
    }

    #[test]
    fn duplicate_label_rejected() {
        let raw = list(r#"[item("X", "Y")]"#);
        assert!(parse_items(&raw, false).is_err());
    }

    #[test]
    fn missing_label_rejected() {
        let raw = list(r#"[item(id(x), true)]"#);
        assert!(parse_items(&raw, false).is_err());
    }

    // ── Tree items ───────────────────────────────────────────────────

    #[test]
    fn nested_tree_items() {
        let raw = list(r#"[item(id(a), "A", true, ["leaf", item(id(b), "B")])]"#);
        let items = parse_tree_items(&raw).unwrap();
        assert!(items[0].open);
        assert_eq!(items[0].children.len(), 2);
        assert_eq!(items[0].children[0].label, "leaf");
        assert_eq!(items[0].children[1].id, Some(Value::sym("b")));
    }

    #[test]
    fn tree_item_term_has_no_synthetic_id() {
        let items = parse_tree_items(&list(r#"[item("A")]"#)).unwrap();
        assert_eq!(items[0].id, None);
    }

    #[test]
    fn tree_depth_is_capped() {
        let mut text = String::from(r#"item("x""#);
        for _ in 0..MAX_ITEM_DEPTH {
            text.push_str(r#", [item("x""#);
        }
        text.push(')');
        for _ in 0..MAX_ITEM_DEPTH {
            text.push_str("])");
        }
        let raw = vec![parse_value(&text).unwrap()];
        assert!(matches!(
            parse_tree_items(&raw),
            Err(CompileError::TooDeep { .. })
        ));
    }

    // ── Menu items ───────────────────────────────────────────────────

    #[test]
    fn menu_items_reject_bare_strings() {
        assert!(parse_menu_items(&list(r#"["plain"]"#)).is_err());
    }

    #[test]
    fn menu_submenu_and_separator() {
        let raw = list(r#"[menu("&File", [item(id(open), "&Open"), item("--------")])]"#);
        let items = parse_menu_items(&raw).unwrap();
        assert_eq!(items[0].label, "&File");
        // Synthetic id uses the shortcut-cleaned label.
        assert_eq!(items[0].id, Some(Value::str("File")));
        assert!(items[0].synthetic_id);

        let sub = &items[0].children;
        assert_eq!(sub[0].id, Some(Value::sym("open")));
        assert_eq!(sub[1].label, "");
        assert_eq!(sub[1].id, None); // separators get no id
    }

    // ── Table items ──────────────────────────────────────────────────

    #[test]
    fn table_cells_pad_and_truncate() {
        let raw = list(r#"[item(id(r), "a", "b", "c", "d")]"#);
        let items = parse_table_items(&raw, 3).unwrap();
        assert_eq!(items[0].cells.len(), 3);

        let short = parse_table_items(&list(r#"[item(id(r), "a")]"#), 3).unwrap();
        assert_eq!(short[0].cells.len(), 3);
        assert_eq!(short[0].cells[1], Cell::empty());
    }

    #[test]
    fn table_cell_term() {
        let raw = list(r#"[item(id(r), cell(icon("i.png"), sortKey("07"), "seven"), 42)]"#);
        let items = parse_table_items(&raw, 2).unwrap();
        let cells = &items[0].cells;
        assert_eq!(cells[0].icon.as_deref(), Some("i.png"));
        assert_eq!(cells[0].sort_key.as_deref(), Some("07"));
        assert_eq!(cells[0].label, "seven");
        assert_eq!(cells[1].label, "42");
        assert_eq!(cells[1].icon, None);
    }

    #[test]
    fn table_id_must_lead() {
        let raw = list(r#"[item("a", id(r))]"#);
        assert!(parse_table_items(&raw, 2).is_err());
    }

    // ── Custom status definitions ────────────────────────────────────

    #[test]
    fn status_defs() {
        let raw = list(r#"[["off.png", "[ ]", 1], ["on.png", "[x]", 0], ["auto.png", "[a]"]]"#);
        let defs = parse_status_defs(&raw).unwrap();
        assert_eq!(defs.len(), 3);
        assert_eq!(defs[0].next_status, 1);
        assert_eq!(defs[2].next_status, -1);
    }

    #[test]
    fn status_defs_need_two_entries() {
        let raw = list(r#"[["only.png", "[ ]"]]"#);
        assert!(parse_status_defs(&raw).is_err());
    }

    #[test]
    fn status_defs_reject_out_of_range_next() {
        let raw = list(r#"[["a.png", "[ ]", 2], ["b.png", "[x]"]]"#);
        assert!(parse_status_defs(&raw).is_err());
    }

    // ── Table header ─────────────────────────────────────────────────

    #[test]
    fn header_columns_and_alignment() {
        let term = parse_value(r#"header("Name", Right("Size"), Center("Type"))"#).unwrap();
        let header = parse_table_header(term.as_term().unwrap());
        assert_eq!(header.column_count(), 3);
        assert_eq!(header.columns[0].alignment, ColumnAlignment::Begin);
        assert_eq!(header.columns[1].alignment, ColumnAlignment::End);
        assert_eq!(header.columns[1].label, "Size");
        assert_eq!(header.columns[2].alignment, ColumnAlignment::Center);
    }
}
