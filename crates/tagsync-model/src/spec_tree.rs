//! Specification tree: a tag tree carrying tagged elements

use crate::element::{MethodKind, TaggedElement};
use crate::finding::{Finding, FindingKind};
use tagsync_tree::{NodeId, TagTree};

/// Tag tree whose nodes describe their source realization
pub type SpecTree = TagTree<TaggedElement>;

/// Clear node and element visitation before a pass
pub fn reset_pass(tree: &mut SpecTree) {
    tree.reset_visited();
    let ids: Vec<NodeId> = tree.iter().collect();
    for id in ids {
        for element in tree.sources_mut(id) {
            element.set_visited(false);
        }
    }
}

/// Mark a node and all of its elements visited
///
/// Returns `true` only when the node itself was not visited before.
pub fn visit(tree: &mut SpecTree, id: NodeId) -> bool {
    let first = tree.mark_visited(id);
    for element in tree.sources_mut(id) {
        element.set_visited(true);
    }
    first
}

/// Whether every element of the node is optional
///
/// Nodes without elements are never optional.
#[must_use]
pub fn is_optional(tree: &SpecTree, id: NodeId) -> bool {
    let sources = tree.sources(id);
    !sources.is_empty() && sources.iter().all(TaggedElement::is_optional)
}

/// Finding reporting that no source realizes `id`
///
/// Class-like nodes report a missing type. Method-like nodes report a
/// missing method and name the containing class when all of the node's
/// non-invocation elements agree on it.
#[must_use]
pub fn missing_finding(tree: &SpecTree, id: NodeId, pattern: &str) -> Finding {
    let tag = tree.tag(id);
    let sources = tree.sources(id);

    if let Some(class) = sources.iter().find_map(TaggedElement::as_class) {
        return Finding::new(
            FindingKind::MissingType,
            pattern,
            &class.name,
            format!("missing {} {} (tag '{tag}')", class.kind, class.name),
        );
    }

    let methods: Vec<_> = sources
        .iter()
        .filter_map(TaggedElement::as_method)
        .collect();
    let Some(first) = methods.first() else {
        return Finding::new(
            FindingKind::MissingElement,
            pattern,
            tag,
            format!("missing element for tag '{tag}'"),
        );
    };

    let declared: Vec<_> = methods
        .iter()
        .filter(|m| m.kind != MethodKind::Invocation)
        .collect();
    let name = declared.first().map_or(&first.name, |m| &m.name);
    let owner = declared
        .first()
        .map(|m| &m.owner)
        .filter(|owner| declared.iter().all(|m| &m.owner == *owner));

    let message = match owner {
        Some(owner) => format!("missing method {name} in {}", owner.name),
        None => format!("missing method {name}"),
    };
    Finding::new(FindingKind::MissingMethod, pattern, name, message)
}
