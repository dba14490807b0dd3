//! Dialog-scoped identifier registry.
//!
//! Maps widget identifiers (arbitrary values) to their nodes in the arena.
//! Uniqueness across the dialog is an invariant: registering an identifier
//! twice is a hard error. Identifiers are compared with the value model's
//! structural equality, so they need not be hashable; lookup is a linear
//! scan, which is fine at dialog sizes.

use crate::error::CompileError;
use crate::term::Value;

use super::WidgetId;

/// Identifier → widget registry with dialog-scoped lifetime.
#[derive(Debug, Default)]
pub struct IdRegistry {
    entries: Vec<(Value, WidgetId)>,
}

impl IdRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether some widget already carries this identifier.
    pub fn contains(&self, id: &Value) -> bool {
        self.entries.iter().any(|(known, _)| known == id)
    }

    /// Register `id` for `widget`. Fails with [`CompileError::DuplicateId`]
    /// if the identifier is already taken.
    pub fn register(&mut self, id: Value, widget: WidgetId) -> Result<(), CompileError> {
        if self.contains(&id) {
            return Err(CompileError::DuplicateId { id: id.to_string() });
        }
        self.entries.push((id, widget));
        Ok(())
    }

    /// Resolve an identifier to its widget.
    pub fn resolve(&self, id: &Value) -> Option<WidgetId> {
        self.entries
            .iter()
            .find(|(known, _)| known == id)
            .map(|(_, widget)| *widget)
    }

    /// Drop the entries of all listed widgets (after a subtree removal).
    pub fn unregister_widgets(&mut self, removed: &[WidgetId]) {
        self.entries.retain(|(_, widget)| !removed.contains(widget));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
