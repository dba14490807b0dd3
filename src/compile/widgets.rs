//! Kind-specific sub-parsers.
//!
//! One function per widget family, each validating the exact or ranged
//! argument count and per-position type, recursing into the compiler for
//! child-widget positions, and consuming its own options. Positional
//! violations are fatal; leftover options are logged and ignored.

use tracing::warn;

use crate::error::CompileError;
use crate::item::parser as items;
use crate::term::{Term, Value};
use crate::widget::{
    Align, BarSegment, ButtonRole, Dimension, PkgSelectorModes, WidgetId, WidgetKind, WidgetNode,
    WizardMode,
};

use super::options::OptionSet;
use super::Compiler;

impl Compiler<'_> {
    fn insert(&mut self, parent: Option<WidgetId>, kind: WidgetKind) -> WidgetId {
        match parent {
            Some(parent) => self.tree.insert_child(parent, WidgetNode::new(kind)),
            None => self.tree.insert(WidgetNode::new(kind)),
        }
    }

    // ── Containers and layout helpers ────────────────────────────────

    pub(super) fn parse_alignment(
        &mut self,
        parent: Option<WidgetId>,
        term: &Term,
        opts: OptionSet,
        argnr: usize,
        horiz: Align,
        vert: Align,
    ) -> Result<WidgetId, CompileError> {
        let rest = &term.args()[argnr..];

        let (background, child_term) = match rest {
            [Value::Term(child)] => (None, child),
            [Value::Term(bg), Value::Term(child)]
                if bg.name() == "BackgroundPixmap"
                    && bg.len() == 1
                    && bg.args()[0].as_str().is_some() =>
            {
                (Some(bg.args()[0].as_str().unwrap().to_owned()), child)
            }
            _ => return Err(CompileError::bad_args(term.name(), term)),
        };

        opts.reject_all(term);

        let alignment = self.insert(
            parent,
            WidgetKind::Alignment {
                horiz,
                vert,
                background,
            },
        );
        self.compile(Some(alignment), child_term)?;

        Ok(alignment)
    }

    pub(super) fn parse_min_size(
        &mut self,
        parent: Option<WidgetId>,
        term: &Term,
        opts: OptionSet,
        argnr: usize,
        hor: bool,
        vert: bool,
    ) -> Result<WidgetId, CompileError> {
        let rest = &term.args()[argnr..];

        let (min_width, min_height, child_term) = if hor && vert {
            match rest {
                [w, h, Value::Term(child)] if w.as_num().is_some() && h.as_num().is_some() => {
                    (w.as_num().unwrap(), h.as_num().unwrap(), child)
                }
                _ => return Err(CompileError::bad_args(term.name(), term)),
            }
        } else {
            match rest {
                [size, Value::Term(child)] if size.as_num().is_some() => {
                    let size = size.as_num().unwrap();
                    if hor {
                        (size, 0.0, child)
                    } else {
                        (0.0, size, child)
                    }
                }
                _ => return Err(CompileError::bad_args(term.name(), term)),
            }
        };

        opts.reject_all(term);

        let min_size = self.insert(
            parent,
            WidgetKind::MinSize {
                min_width,
                min_height,
            },
        );
        self.compile(Some(min_size), child_term)?;

        Ok(min_size)
    }

    pub(super) fn parse_margin_box(
        &mut self,
        parent: Option<WidgetId>,
        term: &Term,
        opts: OptionSet,
        argnr: usize,
    ) -> Result<WidgetId, CompileError> {
        let rest = &term.args()[argnr..];

        // Short form: MarginBox(horMargin, vertMargin, child).
        let parsed = match rest {
            [h, v, Value::Term(child)] if h.as_num().is_some() && v.as_num().is_some() => {
                let h = h.as_num().unwrap();
                let v = v.as_num().unwrap();
                Some((h, h, v, v, child))
            }
            // Long form: one term per margin, in any order, then the child.
            [m0, m1, m2, m3, Value::Term(child)] => {
                let mut left = 0.0;
                let mut right = 0.0;
                let mut top = 0.0;
                let mut bottom = 0.0;
                let mut ok = true;

                for margin in [m0, m1, m2, m3] {
                    match margin.as_term() {
                        Some(sub) if sub.len() == 1 && sub.args()[0].as_num().is_some() => {
                            let size = sub.args()[0].as_num().unwrap();
                            match sub.name() {
                                "leftMargin" => left = size,
                                "rightMargin" => right = size,
                                "topMargin" => top = size,
                                "bottomMargin" => bottom = size,
                                _ => ok = false,
                            }
                        }
                        _ => ok = false,
                    }
                    if !ok {
                        warn!(margin = %margin, "bad margin specification");
                        break;
                    }
                }

                ok.then_some((left, right, top, bottom, child))
            }
            _ => None,
        };

        let Some((left, right, top, bottom, child_term)) = parsed else {
            return Err(CompileError::bad_args(term.name(), term));
        };

        opts.reject_all(term);

        let margin_box = self.insert(
            parent,
            WidgetKind::MarginBox {
                left,
                right,
                top,
                bottom,
            },
        );
        self.compile(Some(margin_box), child_term)?;

        Ok(margin_box)
    }

    pub(super) fn parse_frame(
        &mut self,
        parent: Option<WidgetId>,
        term: &Term,
        opts: OptionSet,
        argnr: usize,
    ) -> Result<WidgetId, CompileError> {
        let rest = &term.args()[argnr..];
        let [Value::Str(label), Value::Term(child_term)] = rest else {
            return Err(CompileError::bad_args(term.name(), term));
        };

        opts.reject_all(term);

        let frame = self.insert(
            parent,
            WidgetKind::Frame {
                label: label.clone(),
            },
        );
        self.compile(Some(frame), child_term)?;

        Ok(frame)
    }

    pub(super) fn parse_squash(
        &mut self,
        parent: Option<WidgetId>,
        term: &Term,
        opts: OptionSet,
        argnr: usize,
        horiz: bool,
        vert: bool,
    ) -> Result<WidgetId, CompileError> {
        let rest = &term.args()[argnr..];
        let [Value::Term(child_term)] = rest else {
            return Err(CompileError::bad_args(term.name(), term));
        };

        opts.reject_all(term);

        let squash = self.insert(parent, WidgetKind::Squash { horiz, vert });
        self.compile(Some(squash), child_term)?;

        Ok(squash)
    }

    /// No widget node is created for weights; the weight value lands on the
    /// recursively compiled child.
    pub(super) fn parse_weight(
        &mut self,
        parent: Option<WidgetId>,
        term: &Term,
        opts: OptionSet,
        argnr: usize,
        dim: Dimension,
    ) -> Result<WidgetId, CompileError> {
        let rest = &term.args()[argnr..];
        let [Value::Int(weight), Value::Term(child_term)] = rest else {
            return Err(CompileError::bad_args(term.name(), term));
        };

        opts.reject_all(term);

        let child = self.compile(parent, child_term)?;
        if let Some(node) = self.tree.get_mut(child) {
            match dim {
                Dimension::Horiz => node.flags.hweight = Some(*weight),
                Dimension::Vert => node.flags.vweight = Some(*weight),
            }
        }

        Ok(child)
    }

    pub(super) fn parse_layout_box(
        &mut self,
        parent: Option<WidgetId>,
        term: &Term,
        opts: OptionSet,
        argnr: usize,
        dim: Dimension,
    ) -> Result<WidgetId, CompileError> {
        let mut debug_layout = false;
        opts.consume_symbols(term, |sym| {
            sym == "debugLayout" && {
                debug_layout = true;
                true
            }
        });

        let layout_box = self.insert(parent, WidgetKind::LayoutBox { dim, debug_layout });

        for arg in &term.args()[argnr..] {
            let child_term = arg
                .as_term()
                .ok_or_else(|| CompileError::bad_args(term.name(), term))?;
            self.compile(Some(layout_box), child_term)?;
        }

        Ok(layout_box)
    }

    pub(super) fn parse_button_box(
        &mut self,
        parent: Option<WidgetId>,
        term: &Term,
        opts: OptionSet,
        argnr: usize,
    ) -> Result<WidgetId, CompileError> {
        let mut relaxed = false;
        opts.consume_symbols(term, |sym| {
            sym == "relaxSanityCheck" && {
                relaxed = true;
                true
            }
        });

        let button_box = self.insert(parent, WidgetKind::ButtonBox { relaxed });

        for arg in &term.args()[argnr..] {
            let child_term = arg
                .as_term()
                .ok_or_else(|| CompileError::bad_args(term.name(), term))?;
            let child = self.compile(Some(button_box), child_term)?;

            let node = self
                .tree
                .get_mut(child)
                .expect("compiled child must exist");
            let id = node.id.clone();

            match &mut node.kind {
                WidgetKind::PushButton {
                    role, role_pinned, ..
                } => {
                    // A custom-role button with an id gets a role guessed
                    // from the id's textual prefix; an explicit role always
                    // wins.
                    if *role == ButtonRole::Custom && !*role_pinned {
                        if let Some(guessed) = id.as_ref().and_then(role_from_id) {
                            *role = guessed;
                        }
                    }
                }
                _ => {
                    return Err(CompileError::Syntax {
                        expected: "only PushButton children inside a ButtonBox".to_owned(),
                        found: child_term.to_string(),
                    })
                }
            }
        }

        if !relaxed {
            self.button_box_sanity_check(button_box, term)?;
        }

        Ok(button_box)
    }

    /// A ButtonBox with more than one button needs exactly one ok-role and
    /// one cancel-role button.
    fn button_box_sanity_check(
        &self,
        button_box: WidgetId,
        term: &Term,
    ) -> Result<(), CompileError> {
        let children = self.tree.children(button_box);
        if children.len() <= 1 {
            return Ok(());
        }

        let mut ok_buttons = 0;
        let mut cancel_buttons = 0;
        for &child in children {
            if let Some(WidgetKind::PushButton { role, .. }) = self.tree.get(child).map(|n| &n.kind)
            {
                match role {
                    ButtonRole::Ok => ok_buttons += 1,
                    ButtonRole::Cancel => cancel_buttons += 1,
                    _ => {}
                }
            }
        }

        if ok_buttons == 1 && cancel_buttons == 1 {
            Ok(())
        } else {
            Err(CompileError::Syntax {
                expected: "one ok and one cancel button in a multi-button ButtonBox".to_owned(),
                found: term.to_string(),
            })
        }
    }

    pub(super) fn parse_replace_point(
        &mut self,
        parent: Option<WidgetId>,
        term: &Term,
        opts: OptionSet,
        argnr: usize,
    ) -> Result<WidgetId, CompileError> {
        let rest = &term.args()[argnr..];
        let [Value::Term(child_term)] = rest else {
            return Err(CompileError::bad_args(term.name(), term));
        };

        opts.reject_all(term);

        let replace_point = self.insert(parent, WidgetKind::ReplacePoint);
        self.compile(Some(replace_point), child_term)?;

        Ok(replace_point)
    }

    pub(super) fn parse_empty(
        &mut self,
        parent: Option<WidgetId>,
        term: &Term,
        opts: OptionSet,
        argnr: usize,
    ) -> Result<WidgetId, CompileError> {
        if term.len() != argnr {
            return Err(CompileError::bad_args(term.name(), term));
        }

        opts.reject_all(term);

        Ok(self.insert(parent, WidgetKind::Empty))
    }

    pub(super) fn parse_spacing(
        &mut self,
        parent: Option<WidgetId>,
        term: &Term,
        opts: OptionSet,
        argnr: usize,
        dim: Dimension,
        stretchable: bool,
    ) -> Result<WidgetId, CompileError> {
        let rest = &term.args()[argnr..];

        let size = match rest {
            [] => {
                if stretchable {
                    0.0
                } else {
                    1.0
                }
            }
            [size] if size.as_num().is_some() => size.as_num().unwrap(),
            _ => return Err(CompileError::bad_args(term.name(), term)),
        };

        opts.reject_all(term);

        Ok(self.insert(
            parent,
            WidgetKind::Spacing {
                dim,
                stretchable,
                size,
            },
        ))
    }

    pub(super) fn parse_radio_button_group(
        &mut self,
        parent: Option<WidgetId>,
        term: &Term,
        opts: OptionSet,
        argnr: usize,
    ) -> Result<WidgetId, CompileError> {
        let rest = &term.args()[argnr..];
        let [Value::Term(child_term)] = rest else {
            return Err(CompileError::bad_args(term.name(), term));
        };

        opts.reject_all(term);

        let group = self.insert(parent, WidgetKind::RadioButtonGroup);
        self.compile(Some(group), child_term)?;

        Ok(group)
    }

    pub(super) fn parse_check_box_frame(
        &mut self,
        parent: Option<WidgetId>,
        term: &Term,
        opts: OptionSet,
        argnr: usize,
    ) -> Result<WidgetId, CompileError> {
        let rest = &term.args()[argnr..];
        let [Value::Str(label), Value::Bool(checked), Value::Term(child_term)] = rest else {
            return Err(CompileError::bad_args(term.name(), term));
        };

        let mut auto_enable = true;
        let mut invert_auto_enable = false;
        opts.consume_symbols(term, |sym| match sym {
            "noAutoEnable" => {
                auto_enable = false;
                true
            }
            "invertAutoEnable" => {
                invert_auto_enable = true;
                true
            }
            _ => false,
        });

        if invert_auto_enable && !auto_enable {
            warn!("opt(noAutoEnable) automatically disables opt(invertAutoEnable)");
            invert_auto_enable = false;
        }

        let frame = self.insert(
            parent,
            WidgetKind::CheckBoxFrame {
                label: label.clone(),
                checked: *checked,
                auto_enable,
                invert_auto_enable,
            },
        );
        self.compile(Some(frame), child_term)?;

        Ok(frame)
    }

    // ── Simple content widgets ───────────────────────────────────────

    pub(super) fn parse_label(
        &mut self,
        parent: Option<WidgetId>,
        term: &Term,
        opts: OptionSet,
        argnr: usize,
        heading: bool,
    ) -> Result<WidgetId, CompileError> {
        let rest = &term.args()[argnr..];
        let [Value::Str(text)] = rest else {
            return Err(CompileError::bad_args(term.name(), term));
        };

        let mut output_field = false;
        let mut auto_wrap = false;
        opts.consume_symbols(term, |sym| match sym {
            "outputField" => {
                output_field = true;
                true
            }
            "autoWrap" => {
                auto_wrap = true;
                true
            }
            _ => false,
        });

        if heading {
            output_field = false;
        }

        Ok(self.insert(
            parent,
            WidgetKind::Label {
                text: text.clone(),
                heading,
                output_field,
                auto_wrap,
            },
        ))
    }

    pub(super) fn parse_rich_text(
        &mut self,
        parent: Option<WidgetId>,
        term: &Term,
        opts: OptionSet,
        argnr: usize,
    ) -> Result<WidgetId, CompileError> {
        let rest = &term.args()[argnr..];
        let [Value::Str(text)] = rest else {
            return Err(CompileError::bad_args(term.name(), term));
        };

        let mut plain_text = false;
        let mut auto_scroll_down = false;
        let mut shrinkable = false;
        opts.consume_symbols(term, |sym| match sym {
            "plainText" => {
                plain_text = true;
                true
            }
            "autoScrollDown" => {
                auto_scroll_down = true;
                true
            }
            "shrinkable" => {
                shrinkable = true;
                true
            }
            _ => false,
        });

        Ok(self.insert(
            parent,
            WidgetKind::RichText {
                text: text.clone(),
                plain_text,
                auto_scroll_down,
                shrinkable,
            },
        ))
    }

    pub(super) fn parse_log_view(
        &mut self,
        parent: Option<WidgetId>,
        term: &Term,
        opts: OptionSet,
        argnr: usize,
    ) -> Result<WidgetId, CompileError> {
        let rest = &term.args()[argnr..];
        let [Value::Str(label), Value::Int(visible_lines), Value::Int(max_lines)] = rest else {
            return Err(CompileError::bad_args(term.name(), term));
        };

        opts.reject_all(term);

        Ok(self.insert(
            parent,
            WidgetKind::LogView {
                label: label.clone(),
                visible_lines: *visible_lines,
                max_lines: *max_lines,
                text: String::new(),
            },
        ))
    }

    pub(super) fn parse_push_button(
        &mut self,
        parent: Option<WidgetId>,
        term: &Term,
        opts: OptionSet,
        argnr: usize,
        icon_button: bool,
    ) -> Result<WidgetId, CompileError> {
        let rest = &term.args()[argnr..];

        let (icon, label) = if icon_button {
            let [Value::Str(icon), Value::Str(label)] = rest else {
                return Err(CompileError::bad_args(term.name(), term));
            };
            (Some(icon.clone()), label.clone())
        } else {
            let [Value::Str(label)] = rest else {
                return Err(CompileError::bad_args(term.name(), term));
            };
            (None, label.clone())
        };

        let mut role = ButtonRole::Custom;
        let mut role_pinned = false;
        let mut is_default = false;
        opts.consume_symbols(term, |sym| match sym {
            "default" => {
                is_default = true;
                true
            }
            "okButton" => {
                role = ButtonRole::Ok;
                true
            }
            "cancelButton" => {
                role = ButtonRole::Cancel;
                true
            }
            "applyButton" => {
                role = ButtonRole::Apply;
                true
            }
            "helpButton" => {
                role = ButtonRole::Help;
                true
            }
            "relNotesButton" => {
                role = ButtonRole::RelNotes;
                true
            }
            "customButton" => {
                role_pinned = true;
                true
            }
            _ => false,
        });

        Ok(self.insert(
            parent,
            WidgetKind::PushButton {
                label,
                icon,
                role,
                role_pinned,
                is_default,
            },
        ))
    }

    pub(super) fn parse_check_box(
        &mut self,
        parent: Option<WidgetId>,
        term: &Term,
        opts: OptionSet,
        argnr: usize,
    ) -> Result<WidgetId, CompileError> {
        let rest = &term.args()[argnr..];

        let (label, checked) = match rest {
            [Value::Str(label)] => (label.clone(), false),
            [Value::Str(label), Value::Bool(checked)] => (label.clone(), *checked),
            _ => return Err(CompileError::bad_args(term.name(), term)),
        };

        opts.reject_all(term);

        Ok(self.insert(
            parent,
            WidgetKind::CheckBox {
                label,
                checked: Some(checked),
            },
        ))
    }

    pub(super) fn parse_radio_button(
        &mut self,
        parent: Option<WidgetId>,
        term: &Term,
        opts: OptionSet,
        argnr: usize,
    ) -> Result<WidgetId, CompileError> {
        let rest = &term.args()[argnr..];

        let (label, checked) = match rest {
            [Value::Str(label)] => (label.clone(), false),
            [Value::Str(label), Value::Bool(checked)] => (label.clone(), *checked),
            _ => return Err(CompileError::bad_args(term.name(), term)),
        };

        opts.reject_all(term);

        Ok(self.insert(parent, WidgetKind::RadioButton { label, checked }))
    }

    pub(super) fn parse_input_field(
        &mut self,
        parent: Option<WidgetId>,
        term: &Term,
        opts: OptionSet,
        argnr: usize,
        password: bool,
        bug_compat: bool,
    ) -> Result<WidgetId, CompileError> {
        let rest = &term.args()[argnr..];

        let (label, text) = match rest {
            [Value::Str(label)] => (label.clone(), String::new()),
            [Value::Str(label), Value::Str(text)] => (label.clone(), text.clone()),
            _ => return Err(CompileError::bad_args(term.name(), term)),
        };

        let mut shrinkable = false;
        opts.consume_symbols(term, |sym| {
            sym == "shrinkable" && {
                shrinkable = true;
                true
            }
        });

        let field = self.insert(
            parent,
            WidgetKind::InputField {
                label,
                password,
                text,
                shrinkable,
            },
        );

        if bug_compat && !shrinkable {
            // TextEntry() used to be horizontally stretchable; keep old
            // dialogs intact.
            if let Some(node) = self.tree.get_mut(field) {
                node.flags.hstretch = true;
            }
        }

        Ok(field)
    }

    pub(super) fn parse_multi_line_edit(
        &mut self,
        parent: Option<WidgetId>,
        term: &Term,
        opts: OptionSet,
        argnr: usize,
    ) -> Result<WidgetId, CompileError> {
        let rest = &term.args()[argnr..];

        let (label, text) = match rest {
            [Value::Str(label)] => (label.clone(), String::new()),
            [Value::Str(label), Value::Str(text)] => (label.clone(), text.clone()),
            _ => return Err(CompileError::bad_args(term.name(), term)),
        };

        opts.reject_all(term);

        Ok(self.insert(parent, WidgetKind::MultiLineEdit { label, text }))
    }

    pub(super) fn parse_int_field(
        &mut self,
        parent: Option<WidgetId>,
        term: &Term,
        opts: OptionSet,
        argnr: usize,
    ) -> Result<WidgetId, CompileError> {
        let rest = &term.args()[argnr..];
        let [Value::Str(label), Value::Int(min), Value::Int(max), Value::Int(value)] = rest else {
            return Err(CompileError::bad_args(term.name(), term));
        };

        opts.reject_all(term);

        Ok(self.insert(
            parent,
            WidgetKind::IntField {
                label: label.clone(),
                min: *min,
                max: *max,
                value: *value,
            },
        ))
    }

    pub(super) fn parse_progress_bar(
        &mut self,
        parent: Option<WidgetId>,
        term: &Term,
        opts: OptionSet,
        argnr: usize,
    ) -> Result<WidgetId, CompileError> {
        let rest = &term.args()[argnr..];

        let (label, max_value, value) = match rest {
            [Value::Str(label)] => (label.clone(), 100, 0),
            [Value::Str(label), Value::Int(max)] => (label.clone(), *max, 0),
            [Value::Str(label), Value::Int(max), Value::Int(progress)] => {
                (label.clone(), *max, *progress)
            }
            _ => return Err(CompileError::bad_args(term.name(), term)),
        };

        opts.reject_all(term);

        Ok(self.insert(
            parent,
            WidgetKind::ProgressBar {
                label,
                max_value,
                value,
            },
        ))
    }

    pub(super) fn parse_busy_indicator(
        &mut self,
        parent: Option<WidgetId>,
        term: &Term,
        opts: OptionSet,
        argnr: usize,
    ) -> Result<WidgetId, CompileError> {
        let rest = &term.args()[argnr..];

        let (label, timeout_ms) = match rest {
            [Value::Str(label)] => (label.clone(), 1000),
            [Value::Str(label), Value::Int(timeout)] => (label.clone(), *timeout),
            _ => return Err(CompileError::bad_args(term.name(), term)),
        };

        opts.reject_all(term);

        Ok(self.insert(
            parent,
            WidgetKind::BusyIndicator {
                label,
                timeout_ms,
                alive: true,
            },
        ))
    }

    pub(super) fn parse_image(
        &mut self,
        parent: Option<WidgetId>,
        term: &Term,
        opts: OptionSet,
        argnr: usize,
    ) -> Result<WidgetId, CompileError> {
        let rest = &term.args()[argnr..];

        let file_name = match rest {
            [Value::Str(file_name)] => file_name.clone(),
            // Two string args is the historic form; the second is ignored.
            [Value::Str(file_name), Value::Str(_)] => file_name.clone(),
            _ => return Err(CompileError::bad_args(term.name(), term)),
        };

        let mut animated = false;
        let mut zero_width = false;
        let mut zero_height = false;
        let mut auto_scale = false;
        opts.consume_symbols(term, |sym| match sym {
            "animated" => {
                animated = true;
                true
            }
            "zeroWidth" => {
                zero_width = true;
                true
            }
            "zeroHeight" => {
                zero_height = true;
                true
            }
            "scaleToFit" => {
                auto_scale = true;
                true
            }
            _ => false,
        });

        if auto_scale {
            zero_width = true;
            zero_height = true;
        }

        Ok(self.insert(
            parent,
            WidgetKind::Image {
                file_name,
                animated,
                zero_width,
                zero_height,
                auto_scale,
            },
        ))
    }

    // ── Selection widgets ────────────────────────────────────────────

    pub(super) fn parse_selection_box(
        &mut self,
        parent: Option<WidgetId>,
        term: &Term,
        opts: OptionSet,
        argnr: usize,
    ) -> Result<WidgetId, CompileError> {
        let rest = &term.args()[argnr..];

        let (label, item_list) = match rest {
            [Value::Str(label)] => (label.clone(), None),
            [Value::Str(label), Value::List(item_list)] => (label.clone(), Some(item_list)),
            _ => return Err(CompileError::bad_args(term.name(), term)),
        };

        let mut shrinkable = false;
        let mut immediate = false;
        opts.consume_symbols(term, |sym| match sym {
            "shrinkable" => {
                shrinkable = true;
                true
            }
            "immediate" => {
                immediate = true;
                true
            }
            _ => false,
        });

        let item_vec = match item_list {
            Some(list) => items::parse_items(list, false)?,
            None => Vec::new(),
        };

        let sel_box = self.insert(
            parent,
            WidgetKind::SelectionBox {
                label,
                items: item_vec,
                shrinkable,
                immediate,
            },
        );

        if immediate {
            // Immediate mode implies notify.
            if let Some(node) = self.tree.get_mut(sel_box) {
                node.flags.notify = true;
            }
        }

        Ok(sel_box)
    }

    pub(super) fn parse_multi_selection_box(
        &mut self,
        parent: Option<WidgetId>,
        term: &Term,
        opts: OptionSet,
        argnr: usize,
    ) -> Result<WidgetId, CompileError> {
        let rest = &term.args()[argnr..];

        let (label, item_list) = match rest {
            [Value::Str(label)] => (label.clone(), None),
            [Value::Str(label), Value::List(item_list)] => (label.clone(), Some(item_list)),
            _ => return Err(CompileError::bad_args(term.name(), term)),
        };

        let mut shrinkable = false;
        opts.consume_symbols(term, |sym| {
            sym == "shrinkable" && {
                shrinkable = true;
                true
            }
        });

        let item_vec = match item_list {
            Some(list) => items::parse_items(list, false)?,
            None => Vec::new(),
        };

        Ok(self.insert(
            parent,
            WidgetKind::MultiSelectionBox {
                label,
                items: item_vec,
                shrinkable,
                current: None,
            },
        ))
    }

    pub(super) fn parse_combo_box(
        &mut self,
        parent: Option<WidgetId>,
        term: &Term,
        opts: OptionSet,
        argnr: usize,
    ) -> Result<WidgetId, CompileError> {
        let rest = &term.args()[argnr..];

        let (label, item_list) = match rest {
            [Value::Str(label)] => (label.clone(), None),
            [Value::Str(label), Value::List(item_list)] => (label.clone(), Some(item_list)),
            _ => return Err(CompileError::bad_args(term.name(), term)),
        };

        let mut editable = false;
        opts.consume_symbols(term, |sym| {
            sym == "editable" && {
                editable = true;
                true
            }
        });

        let item_vec = match item_list {
            Some(list) => items::parse_items(list, false)?,
            None => Vec::new(),
        };

        // The visible text follows the initially selected item.
        let text = item_vec
            .iter()
            .find(|item| item.selected)
            .map(|item| item.label.clone())
            .unwrap_or_default();

        Ok(self.insert(
            parent,
            WidgetKind::ComboBox {
                label,
                editable,
                items: item_vec,
                text,
            },
        ))
    }

    pub(super) fn parse_item_selector(
        &mut self,
        parent: Option<WidgetId>,
        term: &Term,
        opts: OptionSet,
        argnr: usize,
        single: bool,
    ) -> Result<WidgetId, CompileError> {
        let rest = &term.args()[argnr..];

        let item_list = match rest {
            [] => None,
            [Value::List(item_list)] => Some(item_list),
            _ => return Err(CompileError::bad_args(term.name(), term)),
        };

        opts.reject_all(term);

        let item_vec = match item_list {
            Some(list) => items::parse_items(list, true)?,
            None => Vec::new(),
        };

        Ok(self.insert(
            parent,
            WidgetKind::ItemSelector {
                single,
                custom_states: Vec::new(),
                items: item_vec,
            },
        ))
    }

    pub(super) fn parse_custom_status_item_selector(
        &mut self,
        parent: Option<WidgetId>,
        term: &Term,
        opts: OptionSet,
        argnr: usize,
    ) -> Result<WidgetId, CompileError> {
        let rest = &term.args()[argnr..];

        let (states_list, item_list) = match rest {
            [Value::List(states)] => (states, None),
            [Value::List(states), Value::List(item_list)] => (states, Some(item_list)),
            _ => return Err(CompileError::bad_args(term.name(), term)),
        };

        opts.reject_all(term);

        let custom_states = items::parse_status_defs(states_list)?;
        let item_vec = match item_list {
            Some(list) => items::parse_items(list, true)?,
            None => Vec::new(),
        };

        Ok(self.insert(
            parent,
            WidgetKind::ItemSelector {
                single: false,
                custom_states,
                items: item_vec,
            },
        ))
    }

    pub(super) fn parse_tree(
        &mut self,
        parent: Option<WidgetId>,
        term: &Term,
        opts: OptionSet,
        argnr: usize,
    ) -> Result<WidgetId, CompileError> {
        let rest = &term.args()[argnr..];

        if rest.is_empty() || rest.len() > 3 {
            return Err(CompileError::bad_args(term.name(), term));
        }
        let Some(label) = rest[0].as_str() else {
            return Err(CompileError::bad_args(term.name(), term));
        };
        let item_list = match rest.get(1) {
            None => None,
            Some(Value::List(item_list)) => Some(item_list),
            Some(_) => return Err(CompileError::bad_args(term.name(), term)),
        };

        let mut immediate = false;
        let mut multi_selection = false;
        let mut recursive_selection = false;
        opts.consume_symbols(term, |sym| match sym {
            "immediate" => {
                immediate = true;
                true
            }
            "multiSelection" => {
                multi_selection = true;
                true
            }
            "recursiveSelection" => {
                recursive_selection = true;
                true
            }
            _ => false,
        });

        let mut item_vec = match item_list {
            Some(list) => items::parse_tree_items(list)?,
            None => Vec::new(),
        };

        // Single-selection trees start with their first item selected.
        if !multi_selection {
            if let Some(first) = item_vec.first_mut() {
                first.set_selected(true);
            }
        }

        let tree = self.insert(
            parent,
            WidgetKind::Tree {
                label: label.to_owned(),
                items: item_vec,
                multi_selection,
                recursive_selection,
                immediate,
            },
        );

        if immediate {
            if let Some(node) = self.tree.get_mut(tree) {
                node.flags.notify = true;
            }
        }

        Ok(tree)
    }

    pub(super) fn parse_table(
        &mut self,
        parent: Option<WidgetId>,
        term: &Term,
        opts: OptionSet,
        argnr: usize,
    ) -> Result<WidgetId, CompileError> {
        let rest = &term.args()[argnr..];

        let (header_term, item_list) = match rest {
            [Value::Term(header)] if header.name() == "header" => (header, None),
            [Value::Term(header), Value::List(item_list)] if header.name() == "header" => {
                (header, Some(item_list))
            }
            _ => return Err(CompileError::bad_args(term.name(), term)),
        };

        let mut immediate = false;
        let mut keep_sorting = false;
        let mut multi_selection = false;
        opts.consume_symbols(term, |sym| match sym {
            "immediate" => {
                immediate = true;
                true
            }
            "keepSorting" => {
                keep_sorting = true;
                true
            }
            "multiSelection" => {
                multi_selection = true;
                true
            }
            _ => false,
        });

        let header = items::parse_table_header(header_term);
        let item_vec = match item_list {
            Some(list) => items::parse_table_items(list, header.column_count())?,
            None => Vec::new(),
        };

        let table = self.insert(
            parent,
            WidgetKind::Table {
                header,
                items: item_vec,
                multi_selection,
                keep_sorting,
                immediate,
            },
        );

        if immediate {
            if let Some(node) = self.tree.get_mut(table) {
                node.flags.notify = true;
            }
        }

        Ok(table)
    }

    pub(super) fn parse_menu_bar(
        &mut self,
        parent: Option<WidgetId>,
        term: &Term,
        opts: OptionSet,
        argnr: usize,
    ) -> Result<WidgetId, CompileError> {
        let rest = &term.args()[argnr..];

        let item_list = match rest {
            [] => None,
            [Value::List(item_list)] => Some(item_list),
            _ => return Err(CompileError::bad_args(term.name(), term)),
        };

        opts.reject_all(term);

        let item_vec = match item_list {
            Some(list) => items::parse_menu_items(list)?,
            None => Vec::new(),
        };

        Ok(self.insert(parent, WidgetKind::MenuBar { items: item_vec }))
    }

    pub(super) fn parse_menu_button(
        &mut self,
        parent: Option<WidgetId>,
        term: &Term,
        opts: OptionSet,
        argnr: usize,
    ) -> Result<WidgetId, CompileError> {
        let rest = &term.args()[argnr..];

        let (label, item_list) = match rest {
            [Value::Str(label)] => (label.clone(), None),
            [Value::Str(label), Value::List(item_list)] => (label.clone(), Some(item_list)),
            _ => return Err(CompileError::bad_args(term.name(), term)),
        };

        opts.reject_all(term);

        let item_vec = match item_list {
            Some(list) => items::parse_menu_items(list)?,
            None => Vec::new(),
        };

        Ok(self.insert(
            parent,
            WidgetKind::MenuButton {
                label,
                items: item_vec,
            },
        ))
    }

    pub(super) fn parse_dumb_tab(
        &mut self,
        parent: Option<WidgetId>,
        term: &Term,
        opts: OptionSet,
        argnr: usize,
    ) -> Result<WidgetId, CompileError> {
        let rest = &term.args()[argnr..];
        let [Value::List(item_list), Value::Term(child_term)] = rest else {
            return Err(CompileError::bad_args(term.name(), term));
        };

        opts.reject_all(term);

        let item_vec = items::parse_items(item_list, false)?;
        let dumb_tab = self.insert(parent, WidgetKind::DumbTab { items: item_vec });
        self.compile(Some(dumb_tab), child_term)?;

        Ok(dumb_tab)
    }

    // ── Special widgets ──────────────────────────────────────────────

    pub(super) fn parse_bar_graph(
        &mut self,
        parent: Option<WidgetId>,
        term: &Term,
        opts: OptionSet,
        argnr: usize,
    ) -> Result<WidgetId, CompileError> {
        let rest = &term.args()[argnr..];

        let (values, labels): (&[Value], &[Value]) = match rest {
            [Value::List(values)] => (values.as_slice(), &[]),
            [Value::List(values), Value::List(labels)] => (values.as_slice(), labels.as_slice()),
            _ => return Err(CompileError::bad_args(term.name(), term)),
        };

        opts.reject_all(term);

        let count = values.len().max(labels.len());
        let mut segments = Vec::with_capacity(count);
        for i in 0..count {
            let value = match values.get(i) {
                Some(Value::Int(n)) => *n,
                Some(other) => {
                    warn!(index = i, value = %other, "bar graph value should be an integer");
                    0
                }
                None => 0,
            };
            let label = match labels.get(i) {
                Some(Value::Str(s)) => s.clone(),
                Some(other) => {
                    warn!(index = i, value = %other, "bar graph label should be a string");
                    String::new()
                }
                None => String::new(),
            };
            segments.push(BarSegment { value, label });
        }

        Ok(self.insert(parent, WidgetKind::BarGraph { segments }))
    }

    pub(super) fn parse_download_progress(
        &mut self,
        parent: Option<WidgetId>,
        term: &Term,
        opts: OptionSet,
        argnr: usize,
    ) -> Result<WidgetId, CompileError> {
        let rest = &term.args()[argnr..];
        let [Value::Str(label), Value::Str(file_name), Value::Int(expected_size)] = rest else {
            return Err(CompileError::bad_args(term.name(), term));
        };

        opts.reject_all(term);

        Ok(self.insert(
            parent,
            WidgetKind::DownloadProgress {
                label: label.clone(),
                file_name: file_name.clone(),
                expected_size: *expected_size,
            },
        ))
    }

    pub(super) fn parse_multi_progress_meter(
        &mut self,
        parent: Option<WidgetId>,
        term: &Term,
        opts: OptionSet,
        argnr: usize,
        dim: Dimension,
    ) -> Result<WidgetId, CompileError> {
        let rest = &term.args()[argnr..];
        let [Value::List(raw_values)] = rest else {
            return Err(CompileError::bad_args(term.name(), term));
        };

        let max_values = parse_num_list(raw_values)?;
        if max_values.is_empty() {
            return Err(CompileError::Syntax {
                expected: "list<integer> or list<float>".to_owned(),
                found: term.to_string(),
            });
        }

        opts.reject_all(term);

        Ok(self.insert(
            parent,
            WidgetKind::MultiProgressMeter {
                dim,
                current_values: vec![0.0; max_values.len()],
                max_values,
            },
        ))
    }

    pub(super) fn parse_slider(
        &mut self,
        parent: Option<WidgetId>,
        term: &Term,
        opts: OptionSet,
        argnr: usize,
    ) -> Result<WidgetId, CompileError> {
        let rest = &term.args()[argnr..];
        let [Value::Str(label), Value::Int(min), Value::Int(max), Value::Int(value)] = rest else {
            return Err(CompileError::bad_args(term.name(), term));
        };

        opts.reject_all(term);

        Ok(self.insert(
            parent,
            WidgetKind::Slider {
                label: label.clone(),
                min: *min,
                max: *max,
                value: *value,
            },
        ))
    }

    pub(super) fn parse_partition_splitter(
        &mut self,
        parent: Option<WidgetId>,
        term: &Term,
        opts: OptionSet,
        argnr: usize,
    ) -> Result<WidgetId, CompileError> {
        let rest = &term.args()[argnr..];
        let [Value::Int(used_size), Value::Int(total_free_size), Value::Int(new_part_size), Value::Int(min_new_part_size), Value::Int(min_free_size), Value::Str(used_label), Value::Str(free_label), Value::Str(new_part_label), Value::Str(free_field_label), Value::Str(new_part_field_label)] =
            rest
        else {
            return Err(CompileError::bad_args(term.name(), term));
        };

        opts.reject_all(term);

        Ok(self.insert(
            parent,
            WidgetKind::PartitionSplitter {
                used_size: *used_size,
                total_free_size: *total_free_size,
                new_part_size: *new_part_size,
                min_new_part_size: *min_new_part_size,
                min_free_size: *min_free_size,
                used_label: used_label.clone(),
                free_label: free_label.clone(),
                new_part_label: new_part_label.clone(),
                free_field_label: free_field_label.clone(),
                new_part_field_label: new_part_field_label.clone(),
            },
        ))
    }

    pub(super) fn parse_date_field(
        &mut self,
        parent: Option<WidgetId>,
        term: &Term,
        opts: OptionSet,
        argnr: usize,
    ) -> Result<WidgetId, CompileError> {
        let rest = &term.args()[argnr..];

        let (label, value) = match rest {
            [Value::Str(label)] => (label.clone(), String::new()),
            [Value::Str(label), Value::Str(value)] => (label.clone(), value.clone()),
            _ => return Err(CompileError::bad_args(term.name(), term)),
        };

        opts.reject_all(term);

        Ok(self.insert(parent, WidgetKind::DateField { label, value }))
    }

    pub(super) fn parse_time_field(
        &mut self,
        parent: Option<WidgetId>,
        term: &Term,
        opts: OptionSet,
        argnr: usize,
    ) -> Result<WidgetId, CompileError> {
        let rest = &term.args()[argnr..];

        let (label, value) = match rest {
            [Value::Str(label)] => (label.clone(), String::new()),
            [Value::Str(label), Value::Str(value)] => (label.clone(), value.clone()),
            _ => return Err(CompileError::bad_args(term.name(), term)),
        };

        opts.reject_all(term);

        Ok(self.insert(parent, WidgetKind::TimeField { label, value }))
    }

    pub(super) fn parse_timezone_selector(
        &mut self,
        parent: Option<WidgetId>,
        term: &Term,
        opts: OptionSet,
        argnr: usize,
    ) -> Result<WidgetId, CompileError> {
        let rest = &term.args()[argnr..];
        let [Value::Str(pixmap), Value::Map(raw_zones)] = rest else {
            return Err(CompileError::bad_args(term.name(), term));
        };

        let mut timezones = Vec::with_capacity(raw_zones.len());
        for (key, value) in raw_zones {
            let (Some(zone), Some(tooltip)) = (key.as_str(), value.as_str()) else {
                return Err(CompileError::bad_args(term.name(), term));
            };
            timezones.push((zone.to_owned(), tooltip.to_owned()));
        }

        opts.reject_all(term);

        Ok(self.insert(
            parent,
            WidgetKind::TimezoneSelector {
                pixmap: pixmap.clone(),
                timezones,
            },
        ))
    }

    pub(super) fn parse_graph(
        &mut self,
        parent: Option<WidgetId>,
        term: &Term,
        opts: OptionSet,
        argnr: usize,
    ) -> Result<WidgetId, CompileError> {
        let rest = &term.args()[argnr..];
        let [Value::Str(file_name), Value::Str(layout_algorithm)] = rest else {
            return Err(CompileError::bad_args(term.name(), term));
        };

        opts.reject_all(term);

        Ok(self.insert(
            parent,
            WidgetKind::Graph {
                file_name: file_name.clone(),
                layout_algorithm: layout_algorithm.clone(),
            },
        ))
    }

    pub(super) fn parse_package_selector(
        &mut self,
        parent: Option<WidgetId>,
        term: &Term,
        opts: OptionSet,
        argnr: usize,
    ) -> Result<WidgetId, CompileError> {
        let rest = &term.args()[argnr..];

        let floppy_device = match rest {
            [] => String::new(),
            [Value::Str(device)] => device.clone(),
            _ => return Err(CompileError::bad_args(term.name(), term)),
        };

        let mut modes = PkgSelectorModes::default();
        opts.consume_symbols(term, |sym| match sym {
            "youMode" => {
                modes.online_update = true;
                true
            }
            "updateMode" => {
                modes.update = true;
                true
            }
            "searchMode" => {
                modes.search = true;
                true
            }
            "summaryMode" => {
                modes.summary = true;
                true
            }
            "repoMode" => {
                modes.repo = true;
                true
            }
            "testMode" => {
                modes.test = true;
                true
            }
            "repoMgr" => {
                modes.repo_mgr = true;
                true
            }
            "confirmUnsupported" => {
                modes.confirm_unsupported = true;
                true
            }
            "onlineSearch" => {
                modes.online_search = true;
                true
            }
            _ => false,
        });

        Ok(self.insert(
            parent,
            WidgetKind::PackageSelector {
                modes,
                floppy_device,
            },
        ))
    }

    pub(super) fn parse_pkg_special(
        &mut self,
        parent: Option<WidgetId>,
        term: &Term,
        opts: OptionSet,
        argnr: usize,
    ) -> Result<WidgetId, CompileError> {
        let rest = &term.args()[argnr..];
        let [Value::Str(subwidget)] = rest else {
            return Err(CompileError::bad_args(term.name(), term));
        };

        opts.reject_all(term);

        Ok(self.insert(
            parent,
            WidgetKind::PkgSpecial {
                subwidget: subwidget.clone(),
            },
        ))
    }

    pub(super) fn parse_pattern_selector(
        &mut self,
        parent: Option<WidgetId>,
        term: &Term,
        opts: OptionSet,
        argnr: usize,
    ) -> Result<WidgetId, CompileError> {
        if term.len() != argnr {
            return Err(CompileError::bad_args(term.name(), term));
        }
        opts.reject_all(term);
        Ok(self.insert(parent, WidgetKind::PatternSelector))
    }

    pub(super) fn parse_simple_patch_selector(
        &mut self,
        parent: Option<WidgetId>,
        term: &Term,
        opts: OptionSet,
        argnr: usize,
    ) -> Result<WidgetId, CompileError> {
        if term.len() != argnr {
            return Err(CompileError::bad_args(term.name(), term));
        }
        opts.reject_all(term);
        Ok(self.insert(parent, WidgetKind::SimplePatchSelector))
    }

    pub(super) fn parse_dummy_special(
        &mut self,
        parent: Option<WidgetId>,
        term: &Term,
        opts: OptionSet,
        argnr: usize,
    ) -> Result<WidgetId, CompileError> {
        if term.len() != argnr {
            return Err(CompileError::bad_args(term.name(), term));
        }
        opts.reject_all(term);
        Ok(self.insert(parent, WidgetKind::DummySpecial))
    }

    pub(super) fn parse_wizard(
        &mut self,
        parent: Option<WidgetId>,
        term: &Term,
        opts: OptionSet,
        argnr: usize,
    ) -> Result<WidgetId, CompileError> {
        let rest = &term.args()[argnr..];

        if rest.len() != 6 {
            return Err(CompileError::bad_args(term.name(), term));
        }
        for (i, arg) in rest.iter().enumerate() {
            let ok = if i % 2 == 0 {
                is_symbol_or_id(arg)
            } else {
                arg.as_str().is_some()
            };
            if !ok {
                return Err(CompileError::bad_args(term.name(), term));
            }
        }

        let mut mode = WizardMode::Standard;
        opts.consume_symbols(term, |sym| match sym {
            "stepsEnabled" => {
                mode = WizardMode::Steps;
                true
            }
            "treeEnabled" => {
                mode = WizardMode::Tree;
                true
            }
            "titleOnLeft" => {
                mode = WizardMode::TitleOnLeft;
                true
            }
            _ => false,
        });

        let wizard = self.insert(parent, WidgetKind::Wizard { mode });

        // Every wizard has the fixed id `wizard`; its content replace point
        // has the fixed id `contents`.
        self.registry.register(Value::sym("wizard"), wizard)?;
        if let Some(node) = self.tree.get_mut(wizard) {
            node.id = Some(Value::sym("wizard"));
        }

        for i in [0, 2, 4] {
            let button_id = unwrap_id_term(&rest[i]);
            let label = rest[i + 1].as_str().unwrap_or_default().to_owned();
            let button = self.insert(
                Some(wizard),
                WidgetKind::PushButton {
                    label,
                    icon: None,
                    role: ButtonRole::Custom,
                    role_pinned: false,
                    is_default: false,
                },
            );
            if !button_id.is_nil() {
                self.registry.register(button_id.clone(), button)?;
                if let Some(node) = self.tree.get_mut(button) {
                    node.id = Some(button_id);
                }
            }
        }

        let contents = self.insert(Some(wizard), WidgetKind::ReplacePoint);
        self.registry.register(Value::sym("contents"), contents)?;
        if let Some(node) = self.tree.get_mut(contents) {
            node.id = Some(Value::sym("contents"));
        }
        self.insert(Some(contents), WidgetKind::Empty);

        Ok(wizard)
    }
}

/// A list of numbers (ints promote to float), or a syntax error.
fn parse_num_list(list: &[Value]) -> Result<Vec<f64>, CompileError> {
    list.iter()
        .map(|v| {
            v.as_num().ok_or_else(|| CompileError::Syntax {
                expected: "list<integer> or list<float>".to_owned(),
                found: v.to_string(),
            })
        })
        .collect()
}

/// Wizard button ids may be bare symbols or `id(...)` wrapped values.
fn is_symbol_or_id(value: &Value) -> bool {
    match value.as_term() {
        Some(t) if t.name() == "id" => t.len() == 1,
        _ => value.as_sym().is_some(),
    }
}

fn unwrap_id_term(value: &Value) -> Value {
    match value.as_term() {
        Some(t) if t.name() == "id" && t.len() == 1 => t.args()[0].clone(),
        _ => value.clone(),
    }
}

/// Guess a button role from the textual prefix of its identifier,
/// case-insensitively.
fn role_from_id(id: &Value) -> Option<ButtonRole> {
    let text = match id {
        Value::Sym(s) | Value::Str(s) => s.clone(),
        other => other.to_string(),
    };
    let text = text.to_lowercase();

    for (prefix, role) in [
        ("ok", ButtonRole::Ok),
        ("yes", ButtonRole::Ok),
        ("continue", ButtonRole::Ok),
        ("accept", ButtonRole::Ok),
        ("cancel", ButtonRole::Cancel),
        ("no", ButtonRole::Cancel),
        ("apply", ButtonRole::Apply),
        ("help", ButtonRole::Help),
    ] {
        if text.starts_with(prefix) {
            return Some(role);
        }
    }

    None
}
