//! Tag nodes and their arena handles

use smallvec::SmallVec;
use std::fmt::{self, Display, Formatter};

/// Handle of a node inside one [`TagTree`](crate::TagTree)
///
/// Handles are only meaningful for the tree that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    #[inline]
    pub(crate) const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Arena index of this node
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One required structural slot
///
/// `sources` holds the expected source-level realizations of this tag. A
/// method slot may carry several (a declaration plus the invocation it
/// must perform, for example).
#[derive(Debug, Clone)]
pub struct TagNode<E> {
    pub(crate) tag: String,
    pub(crate) children: SmallVec<[NodeId; 8]>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) visited: bool,
    pub(crate) sources: Vec<E>,
}

impl<E> TagNode<E> {
    pub(crate) fn new(tag: impl Into<String>, sources: Vec<E>) -> Self {
        Self {
            tag: tag.into(),
            children: SmallVec::new(),
            parent: None,
            visited: false,
            sources,
        }
    }

    /// Tag key, unique among the parent's children
    #[inline]
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Children in insertion order
    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Parent handle; `None` for the root and for detached nodes
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Whether a matching source element was found in the current pass
    #[inline]
    #[must_use]
    pub fn is_visited(&self) -> bool {
        self.visited
    }

    /// Expected source-level realizations
    #[inline]
    #[must_use]
    pub fn sources(&self) -> &[E] {
        &self.sources
    }
}
