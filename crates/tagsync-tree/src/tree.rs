//! Arena-backed tag tree
//!
//! Provides [`TagTree`], the specification tree walked by every traversal
//! pass. All nodes live in one `Vec`; children are index lists and the
//! parent back-reference is an optional index.
//!
//! Accessors taking a [`NodeId`] panic if the handle was issued by a
//! different tree, the same way slice indexing does.

use crate::node::{NodeId, TagNode};

/// Ordered, rooted tree of required tags
#[derive(Debug, Clone)]
pub struct TagTree<E> {
    nodes: Vec<TagNode<E>>,
    root: NodeId,
}

impl<E> TagTree<E> {
    /// Create a tree holding only a root node
    ///
    /// The root is a synthetic container; it carries no sources and is
    /// never reported as unvisited.
    #[must_use]
    pub fn new(root_tag: impl Into<String>) -> Self {
        Self {
            nodes: vec![TagNode::new(root_tag, Vec::new())],
            root: NodeId::new(0),
        }
    }

    /// Root handle
    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes in the arena, detached nodes included
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree holds nothing but its root
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Node by handle, `None` for a handle out of range
    #[inline]
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&TagNode<E>> {
        self.nodes.get(id.index())
    }

    /// Node by handle
    #[inline]
    #[must_use]
    pub fn node(&self, id: NodeId) -> &TagNode<E> {
        &self.nodes[id.index()]
    }

    /// Tag of a node
    #[inline]
    #[must_use]
    pub fn tag(&self, id: NodeId) -> &str {
        &self.node(id).tag
    }

    /// Parent of a node
    #[inline]
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Children of a node in insertion order
    #[inline]
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Sources of a node
    #[inline]
    #[must_use]
    pub fn sources(&self, id: NodeId) -> &[E] {
        &self.node(id).sources
    }

    /// Mutable sources of a node
    #[inline]
    pub fn sources_mut(&mut self, id: NodeId) -> &mut Vec<E> {
        &mut self.nodes[id.index()].sources
    }

    /// Create a node that is not yet part of the tree
    pub fn insert_detached(&mut self, tag: impl Into<String>, sources: Vec<E>) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(TagNode::new(tag, sources));
        id
    }

    /// Append a detached node to `parent`'s children and set its back-reference
    ///
    /// # Errors
    /// - `TreeError::UnknownNode` if either handle is out of range
    /// - `TreeError::IsRoot` if `child` is the root
    /// - `TreeError::AlreadyAttached` if `child` already has a parent
    /// - `TreeError::DuplicateTag` if `parent` already has a child with the same tag
    /// - `TreeError::WouldCycle` if `parent` lies inside `child`'s subtree
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        for id in [parent, child] {
            if self.get(id).is_none() {
                return Err(TreeError::UnknownNode(id));
            }
        }
        if child == self.root {
            return Err(TreeError::IsRoot);
        }
        if let Some(existing) = self.node(child).parent {
            return Err(TreeError::AlreadyAttached {
                tag: self.tag(child).to_string(),
                parent: existing,
            });
        }
        if self.lookup(parent, self.tag(child)).is_some() {
            return Err(TreeError::DuplicateTag {
                tag: self.tag(child).to_string(),
                parent: self.tag(parent).to_string(),
            });
        }
        let mut cursor = Some(parent);
        while let Some(id) = cursor {
            if id == child {
                return Err(TreeError::WouldCycle(self.tag(child).to_string()));
            }
            cursor = self.node(id).parent;
        }

        self.nodes[child.index()].parent = Some(parent);
        self.nodes[parent.index()].children.push(child);
        Ok(())
    }

    /// Create a node and attach it under `parent` in one step
    ///
    /// # Errors
    /// Same as [`TagTree::add_child`]. On error the created node stays detached.
    pub fn push_child(
        &mut self,
        parent: NodeId,
        tag: impl Into<String>,
        sources: Vec<E>,
    ) -> Result<NodeId, TreeError> {
        let child = self.insert_detached(tag, sources);
        self.add_child(parent, child)?;
        Ok(child)
    }

    /// Find the child of `parent` carrying `tag`
    ///
    /// Linear scan; fan-out is small.
    #[must_use]
    pub fn lookup(&self, parent: NodeId, tag: &str) -> Option<NodeId> {
        self.node(parent)
            .children
            .iter()
            .copied()
            .find(|&c| self.nodes[c.index()].tag == tag)
    }

    /// Clear every visited flag; run once at the start of each pass
    pub fn reset_visited(&mut self) {
        for node in &mut self.nodes {
            node.visited = false;
        }
    }

    /// Mark a node visited
    ///
    /// Returns `true` only on the first transition, so callers can count
    /// completed work without double counting repeated matches.
    pub fn mark_visited(&mut self, id: NodeId) -> bool {
        let node = &mut self.nodes[id.index()];
        let first = !node.visited;
        node.visited = true;
        first
    }

    /// Whether a node was visited in the current pass
    #[inline]
    #[must_use]
    pub fn is_visited(&self, id: NodeId) -> bool {
        self.node(id).visited
    }

    /// Immediate children of `id` that are still unvisited
    #[must_use]
    pub fn unvisited(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|&c| !self.is_visited(c))
            .collect()
    }

    /// Every unvisited node of the tree, transitively, root excluded
    ///
    /// Descendants are included even when their ancestor was visited.
    #[must_use]
    pub fn all_unvisited(&self) -> Vec<NodeId> {
        self.iter()
            .filter(|&id| id != self.root && !self.is_visited(id))
            .collect()
    }

    /// Unvisited immediate children of the root or of any visited node
    ///
    /// These are the gaps generation can fill directly: their container
    /// either exists in source or is the project itself.
    #[must_use]
    pub fn frontier(&self) -> Vec<NodeId> {
        self.iter()
            .filter(|&id| {
                !self.is_visited(id)
                    && self
                        .parent(id)
                        .is_some_and(|p| p == self.root || self.is_visited(p))
            })
            .collect()
    }

    /// Number of visited nodes reachable from the root
    #[must_use]
    pub fn visited_count(&self) -> usize {
        self.iter().filter(|&id| self.is_visited(id)).count()
    }

    /// Tags from the root's first child down to `id`
    #[must_use]
    pub fn tag_path(&self, id: NodeId) -> Vec<&str> {
        let mut path = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if current == self.root {
                break;
            }
            path.push(self.tag(current));
            cursor = self.parent(current);
        }
        path.reverse();
        path
    }

    /// Distance from the root (root is 0)
    #[must_use]
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut cursor = self.parent(id);
        while let Some(current) = cursor {
            depth += 1;
            cursor = self.parent(current);
        }
        depth
    }

    /// Pre-order iteration over nodes reachable from the root
    #[must_use]
    pub fn iter(&self) -> PreOrder<'_, E> {
        self.descendants(self.root)
    }

    /// Pre-order iteration over `id` and its subtree
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> PreOrder<'_, E> {
        PreOrder {
            tree: self,
            stack: vec![id],
        }
    }
}

/// Pre-order node iterator
#[derive(Debug)]
pub struct PreOrder<'a, E> {
    tree: &'a TagTree<E>,
    stack: Vec<NodeId>,
}

impl<E> Iterator for PreOrder<'_, E> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}

/// Tree construction errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// Handle not issued by this tree
    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    /// The root cannot become a child
    #[error("the root node cannot be attached as a child")]
    IsRoot,

    /// Node already has a parent
    #[error("node '{tag}' is already attached under {parent}")]
    AlreadyAttached { tag: String, parent: NodeId },

    /// Sibling tags must be unique
    #[error("duplicate tag '{tag}' under '{parent}'")]
    DuplicateTag { tag: String, parent: String },

    /// Attaching would make a node its own ancestor
    #[error("attaching '{0}' would create a cycle")]
    WouldCycle(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (TagTree<()>, NodeId, NodeId, NodeId) {
        let mut tree = TagTree::new("root");
        let root = tree.root();
        let iface = tree.push_child(root, "IfaceX", vec![]).unwrap();
        let method = tree.push_child(iface, "MethodA", vec![]).unwrap();
        let model = tree.push_child(root, "Model", vec![]).unwrap();
        (tree, iface, method, model)
    }

    #[test]
    fn add_child_sets_back_reference() {
        let (tree, iface, method, _) = sample();
        assert_eq!(tree.parent(method), Some(iface));
        assert_eq!(tree.parent(iface), Some(tree.root()));
        assert_eq!(tree.children(iface), &[method]);
    }

    #[test]
    fn add_child_rejects_attached_node() {
        let (mut tree, _, method, model) = sample();
        let err = tree.add_child(model, method).unwrap_err();
        assert!(matches!(err, TreeError::AlreadyAttached { .. }));
    }

    #[test]
    fn add_child_rejects_duplicate_sibling_tag() {
        let (mut tree, _, _, _) = sample();
        let root = tree.root();
        let err = tree.push_child(root, "Model", vec![]).unwrap_err();
        assert!(matches!(err, TreeError::DuplicateTag { .. }));
    }

    #[test]
    fn same_tag_allowed_in_different_branches() {
        let (mut tree, _, _, model) = sample();
        assert!(tree.push_child(model, "MethodA", vec![]).is_ok());
    }

    #[test]
    fn add_child_rejects_root_and_cycles() {
        let mut tree: TagTree<()> = TagTree::new("root");
        let root = tree.root();
        let a = tree.insert_detached("a", vec![]);
        let b = tree.insert_detached("b", vec![]);
        tree.add_child(a, b).unwrap();
        assert_eq!(tree.add_child(a, root), Err(TreeError::IsRoot));
        assert!(matches!(tree.add_child(b, a), Err(TreeError::WouldCycle(_))));
        assert!(tree.add_child(root, a).is_ok());
    }

    #[test]
    fn lookup_scans_only_direct_children() {
        let (tree, iface, method, _) = sample();
        assert_eq!(tree.lookup(tree.root(), "IfaceX"), Some(iface));
        assert_eq!(tree.lookup(tree.root(), "MethodA"), None);
        assert_eq!(tree.lookup(iface, "MethodA"), Some(method));
    }

    #[test]
    fn mark_visited_reports_first_transition_only() {
        let (mut tree, iface, _, _) = sample();
        assert!(tree.mark_visited(iface));
        assert!(!tree.mark_visited(iface));
        assert!(tree.is_visited(iface));
    }

    #[test]
    fn reset_clears_all_flags() {
        let (mut tree, iface, method, _) = sample();
        tree.mark_visited(iface);
        tree.mark_visited(method);
        tree.reset_visited();
        assert_eq!(tree.visited_count(), 0);
    }

    #[test]
    fn immediate_and_transitive_unvisited_differ() {
        let (mut tree, iface, method, model) = sample();
        tree.mark_visited(iface);

        assert_eq!(tree.unvisited(tree.root()), vec![model]);
        assert_eq!(tree.all_unvisited(), vec![method, model]);
    }

    #[test]
    fn frontier_stops_below_unvisited_nodes() {
        let (mut tree, iface, method, model) = sample();
        assert_eq!(tree.frontier(), vec![iface, model]);

        tree.mark_visited(iface);
        assert_eq!(tree.frontier(), vec![method, model]);
    }

    #[test]
    fn detached_nodes_are_ignored() {
        let (mut tree, _, method, model) = sample();
        let iface = tree.lookup(tree.root(), "IfaceX").unwrap();
        tree.mark_visited(iface);
        tree.insert_detached("floating", vec![]);
        assert_eq!(tree.all_unvisited(), vec![method, model]);
    }

    #[test]
    fn tag_path_and_depth() {
        let (tree, _, method, _) = sample();
        assert_eq!(tree.tag_path(method), vec!["IfaceX", "MethodA"]);
        assert_eq!(tree.depth(method), 2);
        assert_eq!(tree.depth(tree.root()), 0);
    }
}
