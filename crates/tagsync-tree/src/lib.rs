//! tagsync Tag Tree
//!
//! Ordered, rooted tree of required tags with per-node visitation state.
//!
//! # Overview
//!
//! - [`TagTree`]: arena of [`TagNode`]s addressed by [`NodeId`] handles
//! - [`TagNode`]: one required structural slot (tag, children, parent, visited, sources)
//! - [`TreeError`]: precondition violations while building the tree
//!
//! Parent links are plain indices into the arena, so the tree never forms
//! ownership cycles between a node and its children.
//!
//! # Example
//!
//! ```rust
//! use tagsync_tree::TagTree;
//!
//! let mut tree: TagTree<&str> = TagTree::new("mvc");
//! let root = tree.root();
//! let iface = tree.push_child(root, "DataInterface", vec!["interface"]).unwrap();
//! let method = tree.push_child(iface, "getData", vec!["declaration"]).unwrap();
//!
//! assert_eq!(tree.lookup(root, "DataInterface"), Some(iface));
//! assert!(tree.mark_visited(iface));
//! assert_eq!(tree.all_unvisited(), vec![method]);
//! ```

#![warn(missing_docs)]

pub mod node;
pub mod tree;

pub use node::{NodeId, TagNode};
pub use tree::{TagTree, TreeError};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
