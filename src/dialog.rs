//! Dialog: a compiled widget tree plus its identifier registry.
//!
//! The dialog is the unit of compilation and property access. Compilation is
//! all-or-nothing: any error discards the arena, so a partially built tree
//! never becomes visible. Property access resolves widgets either directly
//! by [`WidgetId`] or, like external callers do, by widget identifier.

use crate::compile::Compiler;
use crate::error::{CompileError, PropertyError};
use crate::property;
use crate::term::{parser, Term, Value};
use crate::widget::{IdRegistry, WidgetId, WidgetKind, WidgetNode, WidgetTree};

/// A live dialog: the compiled widget tree and its id registry.
#[derive(Debug)]
pub struct Dialog {
    tree: WidgetTree,
    registry: IdRegistry,
    root: WidgetId,
}

impl Dialog {
    /// Compile a dialog description term into a widget tree.
    pub fn from_term(term: &Term) -> Result<Self, CompileError> {
        let mut tree = WidgetTree::new();
        let mut registry = IdRegistry::new();

        let root = Compiler::new(&mut tree, &mut registry).compile(None, term)?;

        Ok(Self {
            tree,
            registry,
            root,
        })
    }

    /// Compile a dialog from term text.
    pub fn from_text(input: &str) -> Result<Self, CompileError> {
        let term = parser::parse_term(input)?;
        Self::from_term(&term)
    }

    /// The root widget.
    pub fn root(&self) -> WidgetId {
        self.root
    }

    /// The underlying widget tree.
    pub fn tree(&self) -> &WidgetTree {
        &self.tree
    }

    /// Access a widget node.
    pub fn widget(&self, id: WidgetId) -> Option<&WidgetNode> {
        self.tree.get(id)
    }

    /// Resolve a widget identifier, unwrapping an `id(x)` wrapper first.
    pub fn find_widget(&self, id: &Value) -> Option<WidgetId> {
        self.registry.resolve(unwrap_id(id))
    }

    /// Set a named property on a widget.
    pub fn set_property(
        &mut self,
        widget: WidgetId,
        property: &str,
        value: &Value,
    ) -> Result<(), PropertyError> {
        property::set_property(&mut self.tree, &self.registry, widget, property, value)
    }

    /// Read a named property of a widget.
    pub fn get_property(&self, widget: WidgetId, property: &str) -> Result<Value, PropertyError> {
        property::get_property(&self.tree, widget, property)
    }

    /// Set a term-keyed property, e.g. `cell(itemId, column)` on a table.
    pub fn set_keyed_property(
        &mut self,
        widget: WidgetId,
        key: &Term,
        value: &Value,
    ) -> Result<(), PropertyError> {
        property::set_keyed_property(&mut self.tree, widget, key, value)
    }

    /// Read a term-keyed property, e.g. `cell(itemId, column)` or
    /// `item(itemId)` on a table.
    pub fn get_keyed_property(&self, widget: WidgetId, key: &Term) -> Result<Value, PropertyError> {
        property::get_keyed_property(&self.tree, widget, key)
    }

    /// Set a named property on the widget with the given identifier.
    pub fn change_widget(
        &mut self,
        id: &Value,
        property: &str,
        value: &Value,
    ) -> Result<(), PropertyError> {
        let widget = self
            .find_widget(id)
            .ok_or_else(|| PropertyError::UnknownWidget(id.to_string()))?;
        self.set_property(widget, property, value)
    }

    /// Read a named property of the widget with the given identifier.
    pub fn query_widget(&self, id: &Value, property: &str) -> Result<Value, PropertyError> {
        let widget = self
            .find_widget(id)
            .ok_or_else(|| PropertyError::UnknownWidget(id.to_string()))?;
        self.get_property(widget, property)
    }

    /// Replace the content of the ReplacePoint with the given identifier by
    /// a freshly compiled widget tree.
    ///
    /// The old subtree is removed (and its identifiers released) first; if
    /// the new term fails to compile, the replace point is left with an
    /// `Empty` placeholder and the error propagates.
    pub fn replace_widget(&mut self, id: &Value, term: &Term) -> Result<WidgetId, CompileError> {
        let target = self.find_widget(id);
        let replace_point = match target {
            Some(w) if matches!(self.tree.get(w).map(|n| &n.kind), Some(WidgetKind::ReplacePoint)) => {
                w
            }
            _ => {
                return Err(CompileError::Syntax {
                    expected: "the id of a ReplacePoint".to_owned(),
                    found: id.to_string(),
                })
            }
        };

        for child in self.tree.children(replace_point).to_vec() {
            let removed = self.tree.remove(child);
            self.registry.unregister_widgets(&removed);
        }

        let result =
            Compiler::new(&mut self.tree, &mut self.registry).compile(Some(replace_point), term);

        if result.is_err() {
            self.tree
                .insert_child(replace_point, WidgetNode::new(WidgetKind::Empty));
        }

        result
    }
}

fn unwrap_id(value: &Value) -> &Value {
    match value.as_term() {
        Some(t) if t.name() == "id" && t.len() == 1 => &t.args()[0],
        _ => value,
    }
}
