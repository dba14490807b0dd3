//! Crate-wide error types.
//!
//! Fatal conditions unwind to the nearest compiler or bridge entry point with
//! the offending term's rendered text; "logged but not raised" conditions
//! (unknown options, unresolved item identifiers) go through `tracing`
//! instead and never appear here.

use crate::term::Value;

/// Errors from compiling a term into a widget tree or an item collection.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// Wrong arity, type, or shape at a term position.
    #[error("invalid arguments for the {kind} widget: {term}")]
    BadWidgetArgs { kind: String, term: String },

    /// Malformed item, cell, status, or structural sub-term.
    #[error("syntax error: expected {expected}, got {found}")]
    Syntax { expected: String, found: String },

    /// A widget identifier was assigned twice within one dialog.
    #[error("widget id {id} is not unique")]
    DuplicateId { id: String },

    /// The term name matched no entry in the widget symbol table.
    #[error("unknown widget type {0}")]
    UnknownWidgetKind(String),

    /// Nesting beyond the fixed recursion cap.
    #[error("nesting deeper than {max} levels: {term}")]
    TooDeep { max: usize, term: String },

    /// The textual term grammar failed to parse.
    #[error(transparent)]
    Term(#[from] crate::term::ParseError),
}

impl CompileError {
    pub(crate) fn bad_args(kind: &str, term: &crate::term::Term) -> Self {
        CompileError::BadWidgetArgs {
            kind: kind.to_owned(),
            term: term.to_string(),
        }
    }

    pub(crate) fn syntax(expected: impl Into<String>, found: &Value) -> Self {
        CompileError::Syntax {
            expected: expected.into(),
            found: found.to_string(),
        }
    }
}

/// Errors from the property bridge.
#[derive(Debug, thiserror::Error)]
pub enum PropertyError {
    /// The identifier resolves to no widget in this dialog.
    #[error("no widget with id {0}")]
    UnknownWidget(String),

    /// An item list passed across the property boundary failed to parse.
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// No candidate handler matched the widget's kind: a caller bug, not a
    /// recoverable condition.
    #[error("the {kind} widget has no property {property}")]
    NoHandler { kind: &'static str, property: String },

    /// A candidate committed to the widget's kind but the value's shape is
    /// invalid for it. Never falls through to later candidates.
    #[error("bad value for {kind} property {property}: expected {expected}, got {found}")]
    BadValueShape {
        kind: &'static str,
        property: String,
        expected: &'static str,
        found: String,
    },
}

impl PropertyError {
    pub(crate) fn bad_value(
        kind: &'static str,
        property: &str,
        expected: &'static str,
        found: &Value,
    ) -> Self {
        PropertyError::BadValueShape {
            kind,
            property: property.to_owned(),
            expected,
            found: found.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::Term;

    #[test]
    fn messages_carry_rendered_term() {
        let term = Term::new("Label").arg(Value::str("a")).arg(Value::str("b"));
        let err = CompileError::bad_args("Label", &term);
        assert_eq!(
            err.to_string(),
            "invalid arguments for the Label widget: Label(\"a\", \"b\")"
        );
    }

    #[test]
    fn bad_value_shape_names_kind_and_property() {
        let err = PropertyError::bad_value("CheckBox", "Value", "boolean or nil", &Value::str("x"));
        assert!(err.to_string().contains("CheckBox"));
        assert!(err.to_string().contains("Value"));
        assert!(err.to_string().contains("\"x\""));
    }
}
