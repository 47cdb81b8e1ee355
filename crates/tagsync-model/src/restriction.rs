//! Names reserved for tagged elements
//!
//! Untagged code may not call a method that a tagged invocation element
//! requires, nor extend or implement a supertype that a tagged class
//! element requires. The table is built once per pass from the whole tree,
//! so the check is independent of the traversal cursor.

use crate::element::{MethodKind, TaggedElement};
use crate::finding::{Finding, FindingKind};
use crate::spec_tree::SpecTree;
use indexmap::IndexMap;
use tagsync_syntax::{simple_type_name, Invocation, TypeDecl};

/// Reserved call names and supertypes, each mapped to the reserving tag
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Restrictions {
    calls: IndexMap<String, String>,
    supertypes: IndexMap<String, String>,
}

impl Restrictions {
    /// Collect reservations from every node of `tree`
    #[must_use]
    pub fn from_tree(tree: &SpecTree) -> Self {
        let mut restrictions = Self::default();
        for id in tree.iter() {
            let tag = tree.tag(id);
            for element in tree.sources(id) {
                match element {
                    TaggedElement::Method(m) if m.kind == MethodKind::Invocation => {
                        restrictions
                            .calls
                            .entry(m.name.clone())
                            .or_insert_with(|| tag.to_string());
                    }
                    TaggedElement::Class(c) => {
                        let names = c
                            .superclass
                            .iter()
                            .chain(&c.interfaces)
                            .map(|s| simple_type_name(&s.name).to_string());
                        for name in names {
                            restrictions
                                .supertypes
                                .entry(name)
                                .or_insert_with(|| tag.to_string());
                        }
                    }
                    TaggedElement::Method(_) => {}
                }
            }
        }
        tracing::debug!(
            calls = restrictions.calls.len(),
            supertypes = restrictions.supertypes.len(),
            "restriction table built"
        );
        restrictions
    }

    /// Tag reserving the call name, if any
    #[must_use]
    pub fn reserved_call(&self, name: &str) -> Option<&str> {
        self.calls.get(name).map(String::as_str)
    }

    /// Tag reserving the supertype, if any
    #[must_use]
    pub fn reserved_supertype(&self, name: &str) -> Option<&str> {
        self.supertypes
            .get(simple_type_name(name))
            .map(String::as_str)
    }

    /// Reserved call names in insertion order
    pub fn calls(&self) -> impl Iterator<Item = &str> {
        self.calls.keys().map(String::as_str)
    }

    /// Reserved supertypes in insertion order
    pub fn supertypes(&self) -> impl Iterator<Item = &str> {
        self.supertypes.keys().map(String::as_str)
    }

    /// Whether nothing is reserved
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty() && self.supertypes.is_empty()
    }

    /// Findings for an untagged type that extends or implements reserved supertypes
    ///
    /// One finding per reserved supertype used.
    #[must_use]
    pub fn check_type(&self, decl: &TypeDecl, pattern: &str) -> Vec<Finding> {
        decl.superclass
            .iter()
            .chain(&decl.interfaces)
            .filter_map(|supertype| {
                let tag = self.reserved_supertype(supertype)?;
                Some(Finding::new(
                    FindingKind::RestrictedUse,
                    pattern,
                    &decl.name,
                    format!(
                        "untagged type uses {} which is reserved for tag '{tag}'",
                        simple_type_name(supertype)
                    ),
                ))
            })
            .collect()
    }

    /// Finding for a call from the untagged method `caller` to a reserved name
    #[must_use]
    pub fn check_invocation(&self, caller: &str, invocation: &Invocation, pattern: &str) -> Option<Finding> {
        let tag = self.reserved_call(&invocation.name)?;
        Some(Finding::new(
            FindingKind::RestrictedUse,
            pattern,
            caller,
            format!(
                "method without a resolved tag calls {}(), reserved for tag '{tag}'",
                invocation.name
            ),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{ClassElement, ClassRef, MethodElement, SupertypeRef};
    use pretty_assertions::assert_eq;
    use tagsync_syntax::TypeKind;

    fn tree() -> SpecTree {
        let mut tree = SpecTree::new("mvc");
        let root = tree.root();
        tree.push_child(
            root,
            "Model",
            vec![ClassElement::class("app", "Model")
                .with_interface(SupertypeRef::required("DataInterface"))
                .into()],
        )
        .unwrap();
        let view = tree
            .push_child(root, "View", vec![ClassElement::class("app", "View").into()])
            .unwrap();
        tree.push_child(
            view,
            "update",
            vec![
                MethodElement::implementation("update", ClassRef::new("app", "View")).into(),
                MethodElement::invocation("getData", ClassRef::new("app", "DataInterface")).into(),
            ],
        )
        .unwrap();
        tree
    }

    #[test]
    fn collects_calls_and_supertypes() {
        let restrictions = Restrictions::from_tree(&tree());
        assert_eq!(restrictions.calls().collect::<Vec<_>>(), vec!["getData"]);
        assert_eq!(restrictions.supertypes().collect::<Vec<_>>(), vec!["DataInterface"]);
        assert_eq!(restrictions.reserved_call("getData"), Some("update"));
        assert_eq!(restrictions.reserved_supertype("app.DataInterface"), Some("Model"));
        assert_eq!(restrictions.reserved_call("update"), None);
    }

    #[test]
    fn untagged_implementor_is_flagged_once() {
        let restrictions = Restrictions::from_tree(&tree());
        let mut decl = TypeDecl::new("Rogue", TypeKind::Class);
        decl.interfaces.push("DataInterface".into());
        decl.interfaces.push("Runnable".into());

        let findings = restrictions.check_type(&decl, "mvc");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, FindingKind::RestrictedUse);
        assert_eq!(findings[0].element, "Rogue");
    }

    #[test]
    fn reserved_call_is_flagged() {
        let restrictions = Restrictions::from_tree(&tree());
        let call = Invocation::new(Some("d".into()), "getData");
        let finding = restrictions.check_invocation("helper", &call, "mvc").unwrap();
        assert_eq!(finding.element, "helper");

        let other = Invocation::new(None, "toString");
        assert!(restrictions.check_invocation("helper", &other, "mvc").is_none());
    }
}
