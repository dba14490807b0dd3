//! The widget-tree compiler.
//!
//! Entry point for turning a dialog description term into a typed widget
//! tree. Every compile step runs the same pipeline: extract the optional
//! leading `id(...)`, extract the optional `opt(...)`, dispatch on the term
//! name to exactly one kind-specific sub-parser, then post-process the
//! produced widget (apply option flags, assign the identifier).
//!
//! Any error aborts the entire enclosing compile; callers discard the arena,
//! so no partial widget tree ever becomes visible.

pub mod options;
mod widgets;

use tracing::debug;

use crate::error::CompileError;
use crate::term::Term;
use crate::widget::{ButtonRole, Dimension, IdRegistry, WidgetFlags, WidgetId, WidgetKind, WidgetTree};

use options::OptionSet;

/// Upper bound on widget nesting. Exceeding it is a syntax error rather
/// than a stack overflow.
pub const MAX_WIDGET_DEPTH: usize = 64;

/// One compilation run over a dialog's tree and identifier registry.
pub struct Compiler<'a> {
    pub(crate) tree: &'a mut WidgetTree,
    pub(crate) registry: &'a mut IdRegistry,
    depth: usize,
}

impl<'a> Compiler<'a> {
    pub fn new(tree: &'a mut WidgetTree, registry: &'a mut IdRegistry) -> Self {
        Self {
            tree,
            registry,
            depth: 0,
        }
    }

    /// Compile `term` into a widget under `parent` (`None` for the root).
    pub fn compile(
        &mut self,
        parent: Option<WidgetId>,
        term: &Term,
    ) -> Result<WidgetId, CompileError> {
        if self.depth >= MAX_WIDGET_DEPTH {
            return Err(CompileError::TooDeep {
                max: MAX_WIDGET_DEPTH,
                term: term.to_string(),
            });
        }

        self.depth += 1;
        let result = self.compile_inner(parent, term);
        self.depth -= 1;
        result
    }

    fn compile_inner(
        &mut self,
        parent: Option<WidgetId>,
        term: &Term,
    ) -> Result<WidgetId, CompileError> {
        let (id, mut argnr) = options::widget_id(term, self.registry)?;
        let opts = options::widget_options(term, &mut argnr);
        let flags = opts.flags.clone();

        let widget = self.dispatch(parent, term, opts, argnr)?;

        // Don't overwrite an identifier the recursive call already set: for
        // pseudo-widgets like HWeight the id would otherwise land on the
        // wrong node. First assignment wins.
        if let Some(id) = id {
            let unassigned = self.tree.get(widget).is_some_and(|node| !node.has_id());
            if unassigned {
                self.registry.register(id.clone(), widget)?;
                if let Some(node) = self.tree.get_mut(widget) {
                    node.id = Some(id);
                }
            }
        }

        if let Some(node) = self.tree.get_mut(widget) {
            apply_flags(&mut node.flags, &flags);

            if let Some(fkey) = flags.function_key {
                if fkey > 0 {
                    if let WidgetKind::PushButton {
                        role, role_pinned, ..
                    } = &mut node.kind
                    {
                        if *role == ButtonRole::Custom && !*role_pinned {
                            if let Some(guessed) = function_key_role(fkey) {
                                debug!(fkey, ?guessed, "assigned button role from function key");
                                *role = guessed;
                            }
                        }
                    }
                }
            }
        }

        Ok(widget)
    }

    /// Select the kind-specific sub-parser by exact, case-sensitive match
    /// against the widget symbol table.
    fn dispatch(
        &mut self,
        p: Option<WidgetId>,
        term: &Term,
        opts: OptionSet,
        n: usize,
    ) -> Result<WidgetId, CompileError> {
        use crate::widget::Align::{Begin, Center, End, Unchanged};
        use Dimension::{Horiz, Vert};

        match term.name() {
            "Bottom" => self.parse_alignment(p, term, opts, n, Unchanged, End),
            "BusyIndicator" => self.parse_busy_indicator(p, term, opts, n),
            "ButtonBox" => self.parse_button_box(p, term, opts, n),
            "CheckBox" => self.parse_check_box(p, term, opts, n),
            "CheckBoxFrame" => self.parse_check_box_frame(p, term, opts, n),
            "ComboBox" => self.parse_combo_box(p, term, opts, n),
            "CustomStatusItemSelector" => self.parse_custom_status_item_selector(p, term, opts, n),
            "Empty" => self.parse_empty(p, term, opts, n),
            "Frame" => self.parse_frame(p, term, opts, n),
            "HBox" => self.parse_layout_box(p, term, opts, n, Horiz),
            "HCenter" => self.parse_alignment(p, term, opts, n, Center, Unchanged),
            "HSpacing" => self.parse_spacing(p, term, opts, n, Horiz, false),
            "HSquash" => self.parse_squash(p, term, opts, n, true, false),
            "HStretch" => self.parse_spacing(p, term, opts, n, Horiz, true),
            "HVCenter" => self.parse_alignment(p, term, opts, n, Center, Center),
            "HVSquash" => self.parse_squash(p, term, opts, n, true, true),
            "HWeight" => self.parse_weight(p, term, opts, n, Horiz),
            "Heading" => self.parse_label(p, term, opts, n, true),
            "IconButton" => self.parse_push_button(p, term, opts, n, true),
            "Image" => self.parse_image(p, term, opts, n),
            "InputField" => self.parse_input_field(p, term, opts, n, false, false),
            "IntField" => self.parse_int_field(p, term, opts, n),
            "Label" => self.parse_label(p, term, opts, n, false),
            "Left" => self.parse_alignment(p, term, opts, n, Begin, Unchanged),
            "LogView" => self.parse_log_view(p, term, opts, n),
            "MarginBox" => self.parse_margin_box(p, term, opts, n),
            "MenuBar" => self.parse_menu_bar(p, term, opts, n),
            "MenuButton" => self.parse_menu_button(p, term, opts, n),
            "MinHeight" => self.parse_min_size(p, term, opts, n, false, true),
            "MinSize" => self.parse_min_size(p, term, opts, n, true, true),
            "MinWidth" => self.parse_min_size(p, term, opts, n, true, false),
            "MultiItemSelector" => self.parse_item_selector(p, term, opts, n, false),
            "MultiLineEdit" => self.parse_multi_line_edit(p, term, opts, n),
            "MultiSelectionBox" => self.parse_multi_selection_box(p, term, opts, n),
            "PackageSelector" => self.parse_package_selector(p, term, opts, n),
            "Password" => self.parse_input_field(p, term, opts, n, true, false),
            "PkgSpecial" => self.parse_pkg_special(p, term, opts, n),
            "ProgressBar" => self.parse_progress_bar(p, term, opts, n),
            "PushButton" => self.parse_push_button(p, term, opts, n, false),
            "RadioButton" => self.parse_radio_button(p, term, opts, n),
            "RadioButtonGroup" => self.parse_radio_button_group(p, term, opts, n),
            "ReplacePoint" => self.parse_replace_point(p, term, opts, n),
            "RichText" => self.parse_rich_text(p, term, opts, n),
            "Right" => self.parse_alignment(p, term, opts, n, End, Unchanged),
            "SelectionBox" => self.parse_selection_box(p, term, opts, n),
            "SingleItemSelector" => self.parse_item_selector(p, term, opts, n, true),
            "Table" => self.parse_table(p, term, opts, n),
            // Bug compatibility: TextEntry is InputField plus implicit hstretch.
            "TextEntry" => self.parse_input_field(p, term, opts, n, false, true),
            "Top" => self.parse_alignment(p, term, opts, n, Unchanged, Begin),
            "Tree" => self.parse_tree(p, term, opts, n),
            "VBox" => self.parse_layout_box(p, term, opts, n, Vert),
            "VCenter" => self.parse_alignment(p, term, opts, n, Unchanged, Center),
            "VSpacing" => self.parse_spacing(p, term, opts, n, Vert, false),
            "VSquash" => self.parse_squash(p, term, opts, n, false, true),
            "VStretch" => self.parse_spacing(p, term, opts, n, Vert, true),
            "VWeight" => self.parse_weight(p, term, opts, n, Vert),

            // Special widgets: availability depends on the realizing toolkit.
            "BarGraph" => self.parse_bar_graph(p, term, opts, n),
            "DateField" => self.parse_date_field(p, term, opts, n),
            "DownloadProgress" => self.parse_download_progress(p, term, opts, n),
            "DumbTab" => self.parse_dumb_tab(p, term, opts, n),
            "DummySpecialWidget" => self.parse_dummy_special(p, term, opts, n),
            "Graph" => self.parse_graph(p, term, opts, n),
            "HMultiProgressMeter" => self.parse_multi_progress_meter(p, term, opts, n, Horiz),
            "PartitionSplitter" => self.parse_partition_splitter(p, term, opts, n),
            "PatternSelector" => self.parse_pattern_selector(p, term, opts, n),
            "SimplePatchSelector" => self.parse_simple_patch_selector(p, term, opts, n),
            "Slider" => self.parse_slider(p, term, opts, n),
            "TimeField" => self.parse_time_field(p, term, opts, n),
            "TimezoneSelector" => self.parse_timezone_selector(p, term, opts, n),
            "VMultiProgressMeter" => self.parse_multi_progress_meter(p, term, opts, n, Vert),
            "Wizard" => self.parse_wizard(p, term, opts, n),

            other => Err(CompileError::UnknownWidgetKind(other.to_owned())),
        }
    }
}

/// OR-merge option flags onto a widget. Only set flags are applied, so a
/// recursively compiled child keeps its own flags.
fn apply_flags(target: &mut WidgetFlags, opts: &WidgetFlags) {
    target.disabled |= opts.disabled;
    target.notify |= opts.notify;
    target.notify_context_menu |= opts.notify_context_menu;
    target.hstretch |= opts.hstretch;
    target.vstretch |= opts.vstretch;
    target.auto_shortcut |= opts.auto_shortcut;
    target.key_events |= opts.key_events;
    target.bold_font |= opts.bold_font;
    if opts.function_key.is_some() {
        target.function_key = opts.function_key;
    }
}

/// Conventional button roles for function keys: F1 is help, F9 is cancel,
/// F10 is ok.
fn function_key_role(fkey: i32) -> Option<ButtonRole> {
    match fkey {
        1 => Some(ButtonRole::Help),
        9 => Some(ButtonRole::Cancel),
        10 => Some(ButtonRole::Ok),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::parser::parse_term;
    use crate::term::Value;

    fn compile_str(input: &str) -> Result<(WidgetTree, IdRegistry, WidgetId), CompileError> {
        let term = parse_term(input).unwrap();
        let mut tree = WidgetTree::new();
        let mut registry = IdRegistry::new();
        let root = Compiler::new(&mut tree, &mut registry).compile(None, &term)?;
        Ok((tree, registry, root))
    }

    #[test]
    fn unknown_widget_kind() {
        assert!(matches!(
            compile_str(r#"Blorb("hi")"#),
            Err(CompileError::UnknownWidgetKind(name)) if name == "Blorb"
        ));
    }

    #[test]
    fn dispatch_is_case_sensitive() {
        assert!(matches!(
            compile_str(r#"label("hi")"#),
            Err(CompileError::UnknownWidgetKind(_))
        ));
    }

    #[test]
    fn id_registered_on_compile() {
        let (tree, registry, root) = compile_str(r#"Label(id(greeting), "hi")"#).unwrap();
        assert_eq!(registry.resolve(&Value::sym("greeting")), Some(root));
        assert_eq!(tree.get(root).unwrap().id, Some(Value::sym("greeting")));
    }

    #[test]
    fn duplicate_sibling_ids_fail() {
        let err = compile_str(r#"VBox(Label(id(x), "a"), Label(id(x), "b"))"#).unwrap_err();
        assert!(matches!(err, CompileError::DuplicateId { .. }));
    }

    #[test]
    fn generic_flags_applied() {
        let (tree, _, root) = compile_str(r#"Label(opt(disabled, hvstretch), "hi")"#).unwrap();
        let node = tree.get(root).unwrap();
        assert!(node.flags.disabled);
        assert!(node.flags.hstretch && node.flags.vstretch);
    }

    #[test]
    fn unknown_option_does_not_fail() {
        let (tree, _, root) = compile_str(r#"Label(opt(foo), "hi")"#).unwrap();
        assert!(matches!(
            tree.get(root).unwrap().kind,
            WidgetKind::Label { .. }
        ));
    }

    #[test]
    fn weight_id_lands_on_child_first() {
        // The id of the inner Label must win over the HWeight id.
        let (tree, registry, child) =
            compile_str(r#"HWeight(id(w), 2, Label(id(inner), "hi"))"#).unwrap();
        let node = tree.get(child).unwrap();
        assert_eq!(node.id, Some(Value::sym("inner")));
        assert_eq!(node.flags.hweight, Some(2));
        assert_eq!(registry.resolve(&Value::sym("inner")), Some(child));
        assert_eq!(registry.resolve(&Value::sym("w")), None);
    }

    #[test]
    fn weight_id_used_when_child_has_none() {
        let (tree, registry, child) = compile_str(r#"VWeight(id(w), 3, Empty())"#).unwrap();
        assert_eq!(tree.get(child).unwrap().id, Some(Value::sym("w")));
        assert_eq!(registry.resolve(&Value::sym("w")), Some(child));
    }

    #[test]
    fn function_key_assigns_role() {
        let (tree, _, root) = compile_str(r#"PushButton(opt(key_F10), "Go")"#).unwrap();
        match &tree.get(root).unwrap().kind {
            WidgetKind::PushButton { role, .. } => assert_eq!(*role, ButtonRole::Ok),
            other => panic!("expected a push button, got {other:?}"),
        }
    }

    #[test]
    fn pinned_role_resists_function_key() {
        let (tree, _, root) =
            compile_str(r#"PushButton(opt(key_F10, customButton), "Go")"#).unwrap();
        match &tree.get(root).unwrap().kind {
            WidgetKind::PushButton { role, .. } => assert_eq!(*role, ButtonRole::Custom),
            other => panic!("expected a push button, got {other:?}"),
        }
    }

    #[test]
    fn depth_cap() {
        let mut input = String::new();
        for _ in 0..=MAX_WIDGET_DEPTH {
            input.push_str("VBox(");
        }
        input.push_str("Empty()");
        for _ in 0..=MAX_WIDGET_DEPTH {
            input.push(')');
        }
        assert!(matches!(
            compile_str(&input),
            Err(CompileError::TooDeep { .. })
        ));
    }
}
