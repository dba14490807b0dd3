//! Leading `id(...)`/`opt(...)` extraction and the option set.
//!
//! The compiler is deliberately lenient about options (an unrecognized
//! option is logged and the term proceeds) but strict about required
//! positional arguments. Generic option symbols are consumed here; every
//! other option is passed through to the kind-specific sub-parser, which
//! must consume or log each one.

use tracing::warn;

use crate::error::CompileError;
use crate::term::{Term, Value};
use crate::widget::{IdRegistry, WidgetFlags};

/// Option flags extracted from a term's `opt(...)` argument.
///
/// Single-use per compile step: the kind-specific sub-parser consumes the
/// pass-through options by value, so a raw option list can never be applied
/// twice.
pub struct OptionSet {
    /// Generic flags, applied to the produced widget in post-processing.
    pub flags: WidgetFlags,
    /// Options the compiler itself does not understand; the kind handler
    /// must consume or log each of these.
    passthrough: Vec<Value>,
}

/// Extract the optional leading `id(value)` argument.
///
/// Returns the identifier (already checked for uniqueness) and the index of
/// the first positional argument. An explicit `id(nil)` counts as "no id".
pub fn widget_id(
    term: &Term,
    registry: &IdRegistry,
) -> Result<(Option<Value>, usize), CompileError> {
    let id_term = match term.get(0).and_then(Value::as_term) {
        Some(sub) if sub.name() == "id" => sub,
        _ => return Ok((None, 0)),
    };

    if id_term.len() != 1 {
        return Err(CompileError::Syntax {
            expected: "id(any value) with exactly one argument".to_owned(),
            found: id_term.to_string(),
        });
    }

    let id = id_term.args()[0].clone();
    if id.is_nil() {
        return Ok((None, 1));
    }

    if registry.contains(&id) {
        return Err(CompileError::DuplicateId { id: id.to_string() });
    }

    Ok((Some(id), 1))
}

/// Extract the optional `opt(...)` argument at `*argnr`, advancing past it.
///
/// Generic symbols (disabled, stretch and notify flags, function keys, bold
/// font, key events) are consumed into the flag set; all other symbols and
/// terms are passed through unmodified. Options that are neither symbols nor
/// terms are logged and dropped.
pub fn widget_options(term: &Term, argnr: &mut usize) -> OptionSet {
    let mut set = OptionSet {
        flags: WidgetFlags::default(),
        passthrough: Vec::new(),
    };

    let opt_term = match term.get(*argnr).and_then(Value::as_term) {
        Some(sub) if sub.name() == "opt" => sub,
        _ => return set,
    };
    *argnr += 1;

    for option in opt_term.args() {
        match option {
            Value::Sym(sym) => {
                if !consume_generic(&mut set.flags, sym) {
                    set.passthrough.push(option.clone());
                }
            }
            Value::Term(_) => set.passthrough.push(option.clone()),
            other => {
                warn!(
                    option = %other,
                    widget = term.name(),
                    "invalid widget option; options must be symbols or terms"
                );
            }
        }
    }

    set
}

/// Try to consume one generic option symbol into the flag set.
fn consume_generic(flags: &mut WidgetFlags, sym: &str) -> bool {
    match sym {
        "notify" => flags.notify = true,
        "notifyContextMenu" => flags.notify_context_menu = true,
        "disabled" => flags.disabled = true,
        "hstretch" => flags.hstretch = true,
        "vstretch" => flags.vstretch = true,
        "hvstretch" => {
            flags.hstretch = true;
            flags.vstretch = true;
        }
        "autoShortcut" => flags.auto_shortcut = true,
        "boldFont" => flags.bold_font = true,
        "keyEvents" => flags.key_events = true,
        "key_none" => flags.function_key = Some(-1),
        _ => {
            if let Some(n) = function_key_number(sym) {
                flags.function_key = Some(n);
            } else {
                return false;
            }
        }
    }
    true
}

/// `key_F1`..`key_F24` → the function key number.
fn function_key_number(sym: &str) -> Option<i32> {
    let n: i32 = sym.strip_prefix("key_F")?.parse().ok()?;
    (1..=24).contains(&n).then_some(n)
}

impl OptionSet {
    /// Hand every leftover option symbol to `accept`; symbols it declines
    /// and non-symbol options are logged as unknown. Consumes the set.
    pub fn consume_symbols(self, term: &Term, mut accept: impl FnMut(&str) -> bool) {
        for option in &self.passthrough {
            match option.as_sym() {
                Some(sym) if accept(sym) => {}
                _ => log_unknown_option(term, option),
            }
        }
    }

    /// Log every leftover option as unknown. For widgets that take no
    /// options of their own.
    pub fn reject_all(self, term: &Term) {
        for option in &self.passthrough {
            log_unknown_option(term, option);
        }
    }
}

fn log_unknown_option(term: &Term, option: &Value) {
    warn!(option = %option, widget = term.name(), "unknown widget option");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::parser::parse_term;
    use crate::widget::{WidgetKind, WidgetNode, WidgetTree};

    #[test]
    fn no_id_no_opt() {
        let term = parse_term(r#"Label("hi")"#).unwrap();
        let registry = IdRegistry::new();
        let (id, argnr) = widget_id(&term, &registry).unwrap();
        assert_eq!(id, None);
        assert_eq!(argnr, 0);
    }

    #[test]
    fn id_then_opt() {
        let term = parse_term(r#"Label(id(x), opt(disabled, boldFont), "hi")"#).unwrap();
        let registry = IdRegistry::new();
        let (id, mut argnr) = widget_id(&term, &registry).unwrap();
        assert_eq!(id, Some(Value::sym("x")));
        assert_eq!(argnr, 1);

        let opts = widget_options(&term, &mut argnr);
        assert_eq!(argnr, 2);
        assert!(opts.flags.disabled);
        assert!(opts.flags.bold_font);
        assert!(opts.passthrough.is_empty());
    }

    #[test]
    fn id_with_wrong_arity_is_syntax_error() {
        let term = parse_term(r#"Label(id(a, b), "hi")"#).unwrap();
        let registry = IdRegistry::new();
        assert!(widget_id(&term, &registry).is_err());
    }

    #[test]
    fn nil_id_counts_as_none() {
        let term = parse_term(r#"Label(id(nil), "hi")"#).unwrap();
        let registry = IdRegistry::new();
        let (id, argnr) = widget_id(&term, &registry).unwrap();
        assert_eq!(id, None);
        assert_eq!(argnr, 1);
    }

    #[test]
    fn duplicate_id_detected_at_extraction() {
        let mut tree = WidgetTree::new();
        let w = tree.insert(WidgetNode::new(WidgetKind::Empty));
        let mut registry = IdRegistry::new();
        registry.register(Value::sym("x"), w).unwrap();

        let term = parse_term(r#"Label(id(x), "hi")"#).unwrap();
        assert!(matches!(
            widget_id(&term, &registry),
            Err(CompileError::DuplicateId { .. })
        ));
    }

    #[test]
    fn hvstretch_sets_both() {
        let term = parse_term(r#"Empty(opt(hvstretch))"#).unwrap();
        let mut argnr = 0;
        let opts = widget_options(&term, &mut argnr);
        assert!(opts.flags.hstretch && opts.flags.vstretch);
    }

    #[test]
    fn function_keys() {
        assert_eq!(function_key_number("key_F1"), Some(1));
        assert_eq!(function_key_number("key_F24"), Some(24));
        assert_eq!(function_key_number("key_F25"), None);
        assert_eq!(function_key_number("key_Fx"), None);

        let term = parse_term(r#"Empty(opt(key_F10))"#).unwrap();
        let mut argnr = 0;
        let opts = widget_options(&term, &mut argnr);
        assert_eq!(opts.flags.function_key, Some(10));
    }

    #[test]
    fn unknown_symbols_pass_through() {
        let term = parse_term(r#"Empty(opt(editable, foo))"#).unwrap();
        let mut argnr = 0;
        let opts = widget_options(&term, &mut argnr);
        assert_eq!(opts.passthrough.len(), 2);

        let mut seen = Vec::new();
        opts.consume_symbols(&term, |sym| {
            seen.push(sym.to_owned());
            sym == "editable"
        });
        assert_eq!(seen, vec!["editable", "foo"]);
    }
}
