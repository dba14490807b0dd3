//! Integration tests for loom-ui.
//!
//! These tests exercise the public API from outside the crate: compiling
//! dialog description terms, reading and writing properties through the
//! bridge, and round-tripping item collections through the serializers.

use loom_ui::item::parser::parse_items;
use loom_ui::item::writer::write_items;
use loom_ui::term::parser::parse_value;
use loom_ui::{parse_term, CompileError, Dialog, PropertyError, Term, Value, WidgetKind};
use pretty_assertions::assert_eq;

fn sym(s: &str) -> Value {
    Value::sym(s)
}

// ---------------------------------------------------------------------------
// Compilation
// ---------------------------------------------------------------------------

#[test]
fn compile_simple_label() {
    let dialog = Dialog::from_text(r#"Label("hi")"#).unwrap();
    let node = dialog.widget(dialog.root()).unwrap();

    match &node.kind {
        WidgetKind::Label { text, heading, .. } => {
            assert_eq!(text, "hi");
            assert!(!heading);
        }
        other => panic!("expected a label, got {other:?}"),
    }
    assert_eq!(node.id, None);
}

#[test]
fn label_with_two_arguments_fails() {
    let err = Dialog::from_text(r#"Label("a", "b")"#).unwrap_err();
    assert!(matches!(err, CompileError::BadWidgetArgs { kind, .. } if kind == "Label"));
}

#[test]
fn unknown_option_is_tolerated() {
    // opt(foo) logs a diagnostic but compilation succeeds.
    let dialog = Dialog::from_text(r#"Label(opt(foo), "hi")"#).unwrap();
    assert!(matches!(
        dialog.widget(dialog.root()).unwrap().kind,
        WidgetKind::Label { .. }
    ));
}

#[test]
fn duplicate_sibling_ids_fail() {
    let err = Dialog::from_text(r#"VBox(Empty(id(x)), Empty(id(x)))"#).unwrap_err();
    assert!(matches!(err, CompileError::DuplicateId { .. }));
}

#[test]
fn unknown_widget_kind_fails() {
    let err = Dialog::from_text(r#"FancyKnob(42)"#).unwrap_err();
    assert!(matches!(err, CompileError::UnknownWidgetKind(name) if name == "FancyKnob"));
}

#[test]
fn representative_dialog_compiles() {
    let dialog = Dialog::from_text(
        r#"VBox(
            Heading("Settings"),
            HBox(
                Frame("Network", VBox(
                    InputField(id(host), "&Hostname", "localhost"),
                    IntField(id(port), "&Port", 1, 65535, 22),
                    CheckBox(id(ssh), "Enable &SSH", true)
                )),
                VSpacing(1.5),
                Tree(id(tree), "Branches", [item(id(root_item), "Root", true, ["Leaf"])])
            ),
            Table(id(tbl), opt(keepSorting), header("Name", Right("Size")), [
                item(id(r1), "foo", 10),
                item(id(r2), "bar", cell(icon("bar.png"), sortKey("002"), "20"))
            ]),
            MenuButton(id(actions), "&Actions", [
                item(id(new_file), "&New"),
                menu("&More", [item(id(deep), "Deep")])
            ]),
            ButtonBox(
                PushButton(id(ok), "&OK"),
                PushButton(id(cancel), "&Cancel")
            )
        )"#,
    )
    .unwrap();

    assert!(dialog.find_widget(&sym("host")).is_some());
    assert!(dialog.find_widget(&sym("tbl")).is_some());
    assert!(dialog.find_widget(&sym("deep")).is_none()); // item ids are not widget ids
}

// ---------------------------------------------------------------------------
// CheckBox Value: boolean, tri-state nil, wrong shape
// ---------------------------------------------------------------------------

#[test]
fn checkbox_value_shapes() {
    let mut dialog = Dialog::from_text(r#"CheckBox(id(c), "check me")"#).unwrap();

    dialog.change_widget(&sym("c"), "Value", &Value::Bool(true)).unwrap();
    assert_eq!(dialog.query_widget(&sym("c"), "Value").unwrap(), Value::Bool(true));

    // nil is the tri-state "don't care" state.
    dialog.change_widget(&sym("c"), "Value", &Value::Nil).unwrap();
    assert_eq!(dialog.query_widget(&sym("c"), "Value").unwrap(), Value::Nil);

    // A string commits to the CheckBox handler and fails there; it never
    // falls through to another candidate.
    let err = dialog
        .change_widget(&sym("c"), "Value", &Value::str("yes"))
        .unwrap_err();
    assert!(matches!(err, PropertyError::BadValueShape { kind, .. } if kind == "CheckBox"));
}

// ---------------------------------------------------------------------------
// Selection semantics
// ---------------------------------------------------------------------------

#[test]
fn selection_value_and_nil_deselect() {
    let mut dialog = Dialog::from_text(
        r#"SelectionBox(id(s), "Pick:", ["Tomato", item(id(c), "Cucumber")])"#,
    )
    .unwrap();

    dialog.change_widget(&sym("s"), "Value", &sym("c")).unwrap();
    assert_eq!(dialog.query_widget(&sym("s"), "Value").unwrap(), sym("c"));

    // Bare-string items default their id to the label.
    dialog
        .change_widget(&sym("s"), "Value", &Value::str("Tomato"))
        .unwrap();
    assert_eq!(
        dialog.query_widget(&sym("s"), "Value").unwrap(),
        Value::str("Tomato")
    );

    dialog.change_widget(&sym("s"), "Value", &Value::Nil).unwrap();
    assert_eq!(dialog.query_widget(&sym("s"), "Value").unwrap(), Value::Nil);
}

#[test]
fn unmatched_selection_id_is_a_noop() {
    let mut dialog =
        Dialog::from_text(r#"SelectionBox(id(s), "Pick:", [item(id(a), "A", true)])"#).unwrap();

    // The unknown id is logged, the operation reports success, and the
    // previous selection stays put.
    dialog.change_widget(&sym("s"), "Value", &sym("zzz")).unwrap();
    assert_eq!(dialog.query_widget(&sym("s"), "Value").unwrap(), sym("a"));
}

#[test]
fn selected_items_skips_unknown_ids() {
    let mut dialog = Dialog::from_text(
        r#"MultiSelectionBox(id(m), "Pick:", [item(id(x), "X"), item(id(z), "Z", true)])"#,
    )
    .unwrap();

    // y does not exist: one diagnostic, x selected, operation succeeds.
    let wanted = Value::List(vec![sym("x"), sym("y")]);
    dialog.change_widget(&sym("m"), "SelectedItems", &wanted).unwrap();

    assert_eq!(
        dialog.query_widget(&sym("m"), "SelectedItems").unwrap(),
        Value::List(vec![sym("x")])
    );
}

#[test]
fn editable_combo_accepts_free_text() {
    let mut dialog =
        Dialog::from_text(r#"ComboBox(id(cb), opt(editable), "C:", [item(id(a), "A")])"#).unwrap();

    dialog.change_widget(&sym("cb"), "Value", &sym("a")).unwrap();
    assert_eq!(dialog.query_widget(&sym("cb"), "Value").unwrap(), sym("a"));

    // No matching item: the value becomes free text.
    dialog
        .change_widget(&sym("cb"), "Value", &Value::str("custom"))
        .unwrap();
    assert_eq!(
        dialog.query_widget(&sym("cb"), "Value").unwrap(),
        Value::str("custom")
    );
}

#[test]
fn non_editable_combo_ignores_free_text() {
    let mut dialog =
        Dialog::from_text(r#"ComboBox(id(cb), "C:", [item(id(a), "A", true)])"#).unwrap();

    dialog
        .change_widget(&sym("cb"), "Value", &Value::str("custom"))
        .unwrap();
    // Logged, no-op: the selection is untouched.
    assert_eq!(dialog.query_widget(&sym("cb"), "Value").unwrap(), sym("a"));
}

#[test]
fn current_branch_of_depth_three_tree() {
    let mut dialog = Dialog::from_text(
        r#"Tree(id(t), "T", [
            item(id(a), "A", [item(id(b), "B", [item(id(c), "C")])])
        ])"#,
    )
    .unwrap();

    dialog.change_widget(&sym("t"), "Value", &sym("c")).unwrap();

    assert_eq!(
        dialog.query_widget(&sym("t"), "CurrentBranch").unwrap(),
        Value::List(vec![sym("a"), sym("b"), sym("c")])
    );
}

// ---------------------------------------------------------------------------
// Status maps
// ---------------------------------------------------------------------------

#[test]
fn item_status_bad_shape_fails_whole_operation() {
    let mut dialog = Dialog::from_text(
        r#"MultiItemSelector([item(id(a), "A", "first"), item(id(b), "B", "second")])"#,
    )
    .unwrap();
    let selector = dialog.root();

    let good = Value::Map(vec![(sym("a"), Value::Int(1)), (sym("b"), Value::Bool(false))]);
    dialog.set_property(selector, "ItemStatus", &good).unwrap();

    let status = dialog.get_property(selector, "ItemStatus").unwrap();
    assert_eq!(status.map_get(&sym("a")), Some(&Value::Int(1)));
    assert_eq!(status.map_get(&sym("b")), Some(&Value::Int(0)));

    // A string status is a bad value shape: the whole set fails.
    let bad = Value::Map(vec![(sym("a"), Value::str("on"))]);
    assert!(matches!(
        dialog.set_property(selector, "ItemStatus", &bad),
        Err(PropertyError::BadValueShape { .. })
    ));

    // An unresolved identifier is only a skipped key.
    let unknown = Value::Map(vec![(sym("ghost"), Value::Int(1))]);
    dialog.set_property(selector, "ItemStatus", &unknown).unwrap();
}

#[test]
fn enabled_items_on_menus() {
    let mut dialog = Dialog::from_text(
        r#"MenuButton(id(m), "&Edit", [item(id(cut), "Cut"), menu("More", [item(id(deep), "Deep")])])"#,
    )
    .unwrap();

    let update = Value::Map(vec![(sym("deep"), Value::Bool(false))]);
    dialog.change_widget(&sym("m"), "EnabledItems", &update).unwrap();

    let enabled = dialog.query_widget(&sym("m"), "EnabledItems").unwrap();
    assert_eq!(enabled.map_get(&sym("cut")), Some(&Value::Bool(true)));
    assert_eq!(enabled.map_get(&sym("deep")), Some(&Value::Bool(false)));

    // Non-boolean values fail, unknown ids are skipped.
    let bad = Value::Map(vec![(sym("cut"), Value::Int(1))]);
    assert!(dialog.change_widget(&sym("m"), "EnabledItems", &bad).is_err());
    let unknown = Value::Map(vec![(sym("ghost"), Value::Bool(true))]);
    dialog.change_widget(&sym("m"), "EnabledItems", &unknown).unwrap();
}

// ---------------------------------------------------------------------------
// Custom status definitions
// ---------------------------------------------------------------------------

#[test]
fn custom_status_needs_two_entries() {
    let err =
        Dialog::from_text(r#"CustomStatusItemSelector([["a.png", "[ ]"]], [])"#).unwrap_err();
    assert!(matches!(err, CompileError::Syntax { .. }));
}

#[test]
fn custom_status_next_index_is_bounded() {
    let err = Dialog::from_text(
        r#"CustomStatusItemSelector([["a.png", "[ ]", 2], ["b.png", "[x]"]], [])"#,
    )
    .unwrap_err();
    assert!(matches!(err, CompileError::Syntax { .. }));

    Dialog::from_text(r#"CustomStatusItemSelector([["a.png", "[ ]", 1], ["b.png", "[x]", 0]], [])"#)
        .unwrap();
}

// ---------------------------------------------------------------------------
// Radio button groups
// ---------------------------------------------------------------------------

#[test]
fn radio_button_group_current_button() {
    let mut dialog = Dialog::from_text(
        r#"RadioButtonGroup(id(g), VBox(
            RadioButton(id(r1), "one", true),
            RadioButton(id(r2), "two")
        ))"#,
    )
    .unwrap();

    assert_eq!(
        dialog.query_widget(&sym("g"), "CurrentButton").unwrap(),
        sym("r1")
    );

    dialog.change_widget(&sym("g"), "CurrentButton", &sym("r2")).unwrap();
    assert_eq!(
        dialog.query_widget(&sym("g"), "CurrentButton").unwrap(),
        sym("r2")
    );
    // One-out-of-many: r1 is no longer checked.
    assert_eq!(dialog.query_widget(&sym("g"), "Value").unwrap(), sym("r2"));

    // Resolving to a non-radio-button widget is a bad value shape.
    let err = dialog
        .change_widget(&sym("g"), "CurrentButton", &sym("g"))
        .unwrap_err();
    assert!(matches!(err, PropertyError::BadValueShape { .. }));

    // An id outside the dialog is a caller error.
    assert!(matches!(
        dialog.change_widget(&sym("g"), "CurrentButton", &sym("ghost")),
        Err(PropertyError::UnknownWidget(_))
    ));
}

// ---------------------------------------------------------------------------
// Table cells
// ---------------------------------------------------------------------------

#[test]
fn table_cell_keyed_access() {
    let mut dialog = Dialog::from_text(
        r#"Table(id(tbl), header("Name", "Size"), [
            item(id(r1), "foo", 10),
            item(id(r2), "bar", cell(icon("bar.png"), "20"))
        ])"#,
    )
    .unwrap();
    let table = dialog.find_widget(&sym("tbl")).unwrap();

    let cell_key = |id: &str, col: i64| Term::new("cell").arg(sym(id)).arg(Value::Int(col));

    assert_eq!(
        dialog.get_keyed_property(table, &cell_key("r1", 1)).unwrap(),
        Value::str("10")
    );

    // Replace a label.
    dialog
        .set_keyed_property(table, &cell_key("r1", 0), &Value::str("baz"))
        .unwrap();
    assert_eq!(
        dialog.get_keyed_property(table, &cell_key("r1", 0)).unwrap(),
        Value::str("baz")
    );

    // icon(...) updates only the icon; the label survives.
    let icon = Value::Term(Term::new("icon").arg(Value::str("new.png")));
    dialog.set_keyed_property(table, &cell_key("r1", 1), &icon).unwrap();
    assert_eq!(
        dialog
            .get_keyed_property(table, &cell_key("r1", 1))
            .unwrap()
            .to_string(),
        r#"cell(icon("new.png"), "10")"#
    );

    // A whole row reads back as an item term.
    let row = dialog
        .get_keyed_property(table, &Term::new("item").arg(sym("r2")))
        .unwrap();
    assert_eq!(
        row.to_string(),
        r#"item(id(r2), "bar", cell(icon("bar.png"), "20"))"#
    );

    // Unknown item or column: logged, reads as nil.
    assert_eq!(
        dialog.get_keyed_property(table, &cell_key("ghost", 0)).unwrap(),
        Value::Nil
    );
    assert_eq!(
        dialog.get_keyed_property(table, &cell_key("r1", 7)).unwrap(),
        Value::Nil
    );

    // A bad value shape for a committed cell is an error.
    let err = dialog
        .set_keyed_property(table, &cell_key("r1", 0), &Value::Bool(true))
        .unwrap_err();
    assert!(matches!(err, PropertyError::BadValueShape { .. }));
}

// ---------------------------------------------------------------------------
// Items round trips
// ---------------------------------------------------------------------------

#[test]
fn items_property_round_trips() {
    let mut dialog = Dialog::from_text(
        r#"MenuButton(id(m), "&File", [
            item(id(open), icon("open.png"), "&Open"),
            menu("&Recent", [item(id(one), "one"), item("-------")])
        ])"#,
    )
    .unwrap();

    let items = dialog.query_widget(&sym("m"), "Items").unwrap();
    dialog.change_widget(&sym("m"), "Items", &items).unwrap();
    let again = dialog.query_widget(&sym("m"), "Items").unwrap();

    assert_eq!(again, items);
}

#[test]
fn parse_serialize_parse_is_identity() {
    let raw = parse_value(
        r#"[
            item(id(a), icon("a.png"), "A", true),
            "Bare",
            item("Defaulted", false)
        ]"#,
    )
    .unwrap();

    let items = parse_items(raw.as_list().unwrap(), false).unwrap();
    let written = write_items(&items);
    let reparsed = parse_items(written.as_list().unwrap(), false).unwrap();

    assert_eq!(reparsed, items);
    // Round-trip transparency: no spurious id(...) for defaulted ids.
    assert_eq!(
        written.to_string(),
        r#"[item(id(a), icon("a.png"), "A", true), item("Bare"), item("Defaulted")]"#
    );
}

#[test]
fn replacing_items_resets_selection_state() {
    let mut dialog =
        Dialog::from_text(r#"SelectionBox(id(s), "Pick:", [item(id(a), "A", true)])"#).unwrap();

    let new_items = parse_value(r#"[item(id(x), "X"), item(id(y), "Y", true)]"#).unwrap();
    dialog.change_widget(&sym("s"), "Items", &new_items).unwrap();

    assert_eq!(dialog.query_widget(&sym("s"), "Value").unwrap(), sym("y"));
    assert_eq!(dialog.query_widget(&sym("s"), "Items").unwrap(), new_items);
}

// ---------------------------------------------------------------------------
// Bar graphs and meters
// ---------------------------------------------------------------------------

#[test]
fn bar_graph_values_and_labels() {
    let mut dialog =
        Dialog::from_text(r#"BarGraph(id(bg), [450, 100], ["used %1", "free %1"])"#).unwrap();

    dialog
        .change_widget(&sym("bg"), "Values", &Value::List(vec![Value::Int(1), Value::Int(2)]))
        .unwrap();
    assert_eq!(
        dialog.query_widget(&sym("bg"), "Values").unwrap(),
        Value::List(vec![Value::Int(1), Value::Int(2)])
    );

    // Excess values are logged and ignored, not fatal.
    dialog
        .change_widget(
            &sym("bg"),
            "Values",
            &Value::List(vec![Value::Int(7), Value::Int(8), Value::Int(9)]),
        )
        .unwrap();
    assert_eq!(
        dialog.query_widget(&sym("bg"), "Values").unwrap(),
        Value::List(vec![Value::Int(7), Value::Int(8)])
    );

    // A non-integer value is a bad shape.
    assert!(dialog
        .change_widget(&sym("bg"), "Values", &Value::List(vec![Value::str("x")]))
        .is_err());
}

// ---------------------------------------------------------------------------
// Bridge dispatch
// ---------------------------------------------------------------------------

#[test]
fn no_handler_names_kind_and_property() {
    let mut dialog = Dialog::from_text(r#"Label(id(l), "hi")"#).unwrap();

    let err = dialog
        .change_widget(&sym("l"), "Items", &Value::List(vec![]))
        .unwrap_err();
    match err {
        PropertyError::NoHandler { kind, property } => {
            assert_eq!(kind, "Label");
            assert_eq!(property, "Items");
        }
        other => panic!("expected NoHandler, got {other:?}"),
    }
}

#[test]
fn generic_enabled_and_label_properties() {
    let mut dialog = Dialog::from_text(r#"PushButton(id(b), "&Go")"#).unwrap();

    assert_eq!(
        dialog.query_widget(&sym("b"), "Enabled").unwrap(),
        Value::Bool(true)
    );
    dialog.change_widget(&sym("b"), "Enabled", &Value::Bool(false)).unwrap();
    assert_eq!(
        dialog.query_widget(&sym("b"), "Enabled").unwrap(),
        Value::Bool(false)
    );

    dialog.change_widget(&sym("b"), "Label", &Value::str("&Run")).unwrap();
    assert_eq!(
        dialog.query_widget(&sym("b"), "Label").unwrap(),
        Value::str("&Run")
    );
}

#[test]
fn input_and_log_values() {
    let mut dialog = Dialog::from_text(
        r#"VBox(
            InputField(id(name), "Name", "initial"),
            LogView(id(log), "Log", 5, 0),
            IntField(id(n), "N", 0, 10, 5)
        )"#,
    )
    .unwrap();

    assert_eq!(
        dialog.query_widget(&sym("name"), "Value").unwrap(),
        Value::str("initial")
    );

    dialog.change_widget(&sym("log"), "LastLine", &Value::str("one\n")).unwrap();
    dialog.change_widget(&sym("log"), "LastLine", &Value::str("two\n")).unwrap();
    assert_eq!(
        dialog.query_widget(&sym("log"), "Value").unwrap(),
        Value::str("one\ntwo\n")
    );

    // Integer values clamp to the declared range.
    dialog.change_widget(&sym("n"), "Value", &Value::Int(99)).unwrap();
    assert_eq!(dialog.query_widget(&sym("n"), "Value").unwrap(), Value::Int(10));
}

// ---------------------------------------------------------------------------
// Canonical rendering
// ---------------------------------------------------------------------------

#[test]
fn canonical_term_rendering() {
    let term = parse_term(r#"VBox(Label(id(l),"hi"),HSpacing(1.5),CheckBox("c",true))"#).unwrap();
    insta::assert_snapshot!(
        term.to_string(),
        @r#"VBox(Label(id(l), "hi"), HSpacing(1.5), CheckBox("c", true))"#
    );
}

#[test]
fn rendering_reparses_to_the_same_value() {
    let source = r#"item(id(a), icon("a.png"), "A", true, [item("B"), item(id(7), "C")])"#;
    let value = parse_value(source).unwrap();
    assert_eq!(parse_value(&value.to_string()).unwrap(), value);
}
