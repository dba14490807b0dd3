//! Widget tree operations: insert, remove, walk.
//!
//! All widget nodes live in a single slotmap arena. Parent/child
//! relationships are stored in secondary maps so that node removal is
//! O(subtree size) and lookup is O(1). Each widget exclusively owns its
//! children: removing a widget removes its whole subtree.

use std::collections::VecDeque;

use slotmap::{new_key_type, SecondaryMap, SlotMap};

use super::WidgetNode;

new_key_type! {
    /// Unique identifier for a widget node. Copy, lightweight (u64).
    pub struct WidgetId;
}

/// Empty slice constant for returning when a node has no children.
const EMPTY_CHILDREN: &[WidgetId] = &[];

/// The widget tree arena.
#[derive(Debug)]
pub struct WidgetTree {
    nodes: SlotMap<WidgetId, WidgetNode>,
    children: SecondaryMap<WidgetId, Vec<WidgetId>>,
    parent: SecondaryMap<WidgetId, WidgetId>,
    root: Option<WidgetId>,
}

impl WidgetTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            children: SecondaryMap::new(),
            parent: SecondaryMap::new(),
            root: None,
        }
    }

    /// Insert a root-level node. If no root has been set yet, this node
    /// becomes the root.
    pub fn insert(&mut self, node: WidgetNode) -> WidgetId {
        let id = self.nodes.insert(node);
        self.children.insert(id, Vec::new());
        if self.root.is_none() {
            self.root = Some(id);
        }
        id
    }

    /// Insert a node as the last child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics (debug) if `parent` does not exist in the tree.
    pub fn insert_child(&mut self, parent: WidgetId, node: WidgetNode) -> WidgetId {
        debug_assert!(
            self.nodes.contains_key(parent),
            "parent node does not exist"
        );
        let id = self.nodes.insert(node);
        self.children.insert(id, Vec::new());
        self.parent.insert(id, parent);
        self.children
            .get_mut(parent)
            .expect("parent must have children vec")
            .push(id);
        id
    }

    /// Remove a node and all its descendants. Returns the ids of every
    /// removed node (for identifier registry cleanup), or an empty vec if
    /// the node didn't exist.
    pub fn remove(&mut self, id: WidgetId) -> Vec<WidgetId> {
        if !self.nodes.contains_key(id) {
            return Vec::new();
        }

        // Detach from parent's children list.
        if let Some(parent_id) = self.parent.remove(id) {
            if let Some(siblings) = self.children.get_mut(parent_id) {
                siblings.retain(|&child| child != id);
            }
        }

        if self.root == Some(id) {
            self.root = None;
        }

        let mut removed = Vec::new();
        let mut queue = VecDeque::new();
        queue.push_back(id);

        while let Some(current) = queue.pop_front() {
            if let Some(kids) = self.children.remove(current) {
                for &child in &kids {
                    queue.push_back(child);
                }
            }
            self.parent.remove(current);
            if self.nodes.remove(current).is_some() {
                removed.push(current);
            }
        }

        removed
    }

    /// Get the parent of a node, if it has one.
    pub fn parent(&self, id: WidgetId) -> Option<WidgetId> {
        self.parent.get(id).copied()
    }

    /// Get the children of a node. Returns an empty slice if the node has no
    /// children or does not exist.
    pub fn children(&self, id: WidgetId) -> &[WidgetId] {
        self.children
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or(EMPTY_CHILDREN)
    }

    /// Immutable access to a node.
    pub fn get(&self, id: WidgetId) -> Option<&WidgetNode> {
        self.nodes.get(id)
    }

    /// Mutable access to a node.
    pub fn get_mut(&mut self, id: WidgetId) -> Option<&mut WidgetNode> {
        self.nodes.get_mut(id)
    }

    /// The current root node, if set.
    pub fn root(&self) -> Option<WidgetId> {
        self.root
    }

    /// Number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether the tree contains a node with the given id.
    pub fn contains(&self, id: WidgetId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Pre-order depth-first traversal starting from `start`.
    pub fn walk_depth_first(&self, start: WidgetId) -> Vec<WidgetId> {
        let mut result = Vec::new();
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            if !self.nodes.contains_key(current) {
                continue;
            }
            result.push(current);
            // Push children in reverse so the first child is visited first.
            for &child in self.children(current).iter().rev() {
                stack.push(child);
            }
        }
        result
    }
}

impl Default for WidgetTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::WidgetKind;

    fn node() -> WidgetNode {
        WidgetNode::new(WidgetKind::Empty)
    }

    /// Build a small test tree:
    /// ```text
    ///       root
    ///      /    \
    ///    a        b
    ///   / \
    ///  c   d
    /// ```
    fn build_tree() -> (WidgetTree, WidgetId, WidgetId, WidgetId, WidgetId, WidgetId) {
        let mut tree = WidgetTree::new();
        let root = tree.insert(node());
        let a = tree.insert_child(root, node());
        let b = tree.insert_child(root, node());
        let c = tree.insert_child(a, node());
        let d = tree.insert_child(a, node());
        (tree, root, a, b, c, d)
    }

    #[test]
    fn insert_sets_root() {
        let mut tree = WidgetTree::new();
        let id = tree.insert(node());
        assert_eq!(tree.root(), Some(id));
    }

    #[test]
    fn parent_child_links() {
        let (tree, root, a, _b, c, d) = build_tree();
        assert_eq!(tree.parent(a), Some(root));
        assert_eq!(tree.parent(c), Some(a));
        assert_eq!(tree.parent(root), None);
        assert_eq!(tree.children(a), &[c, d]);
    }

    #[test]
    fn remove_subtree_returns_all_ids() {
        let (mut tree, root, a, b, c, d) = build_tree();
        let removed = tree.remove(a);
        assert_eq!(removed.len(), 3);
        assert!(removed.contains(&a) && removed.contains(&c) && removed.contains(&d));
        assert!(!tree.contains(c));
        assert!(tree.contains(b));
        assert_eq!(tree.children(root), &[b]);
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn remove_root_empties_tree() {
        let (mut tree, root, ..) = build_tree();
        tree.remove(root);
        assert!(tree.is_empty());
        assert_eq!(tree.root(), None);
    }

    #[test]
    fn remove_nonexistent_is_noop() {
        let mut tree = WidgetTree::new();
        let id = tree.insert(node());
        tree.remove(id);
        assert!(tree.remove(id).is_empty());
    }

    #[test]
    fn walk_depth_first_preorder() {
        let (tree, root, a, b, c, d) = build_tree();
        assert_eq!(tree.walk_depth_first(root), vec![root, a, c, d, b]);
        assert_eq!(tree.walk_depth_first(a), vec![a, c, d]);
    }
}
