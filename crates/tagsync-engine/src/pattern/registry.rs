//! Pattern registry
//!
//! Provides [`PatternRegistry`] for selecting a pattern profile by name.

use super::{MvcPattern, ObserverPattern, Pattern};
use crate::error::PatternError;
use indexmap::IndexMap;

/// Registry of pattern profiles keyed by name, in registration order
#[derive(Default)]
pub struct PatternRegistry {
    patterns: IndexMap<String, Box<dyn Pattern>>,
}

impl std::fmt::Debug for PatternRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternRegistry")
            .field("patterns", &self.names())
            .finish()
    }
}

impl PatternRegistry {
    /// Create new empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create registry with built-in profiles
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(MvcPattern));
        registry.register(Box::new(ObserverPattern));
        registry
    }

    /// Register a profile, replacing any profile of the same name
    pub fn register(&mut self, pattern: Box<dyn Pattern>) {
        self.patterns.insert(pattern.name().to_string(), pattern);
    }

    /// Look up a profile
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn Pattern> {
        self.patterns.get(name).map(|p| &**p)
    }

    /// Look up a profile, failing for unknown names
    ///
    /// # Errors
    /// Returns `PatternError::UnknownProfile` if nothing is registered under `name`.
    pub fn resolve(&self, name: &str) -> Result<&dyn Pattern, PatternError> {
        self.get(name)
            .ok_or_else(|| PatternError::UnknownProfile(name.to_string()))
    }

    /// Check if a profile exists
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.patterns.contains_key(name)
    }

    /// Registered names
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.patterns.keys().map(String::as_str).collect()
    }

    /// Iterate over profiles
    pub fn iter(&self) -> impl Iterator<Item = &dyn Pattern> {
        self.patterns.values().map(|p| &**p)
    }

    /// Number of registered profiles
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DesignModelError;
    use crate::pattern::PatternSettings;
    use crate::ports::DesignModel;
    use pretty_assertions::assert_eq;
    use tagsync_model::TaggedElement;

    struct Names(&'static [(&'static str, &'static [&'static str])]);

    impl DesignModel for Names {
        fn element_name(&self, role: &str) -> Option<String> {
            self.element_names(role).into_iter().next()
        }

        fn element_names(&self, role: &str) -> Vec<String> {
            self.0
                .iter()
                .filter(|(r, _)| *r == role)
                .flat_map(|(_, names)| names.iter().map(|n| (*n).to_string()))
                .collect()
        }

        fn record_element(&self, _name: &str, _container_tag: &str) -> Result<(), DesignModelError> {
            Ok(())
        }
    }

    #[test]
    fn defaults_are_registered_in_order() {
        let registry = PatternRegistry::with_defaults();
        assert_eq!(registry.names(), vec!["mvc", "observer"]);
        assert!(registry.contains("observer"));
        assert!(matches!(
            registry.resolve("singleton"),
            Err(PatternError::UnknownProfile(name)) if name == "singleton"
        ));
    }

    #[test]
    fn mvc_uses_model_names_with_role_fallback() {
        let model = Names(&[("View", &["CustomerView", "OrderView"]), ("Model", &["Store"])]);
        let tree = MvcPattern
            .tag_tree(&model, &PatternSettings::default())
            .unwrap();
        let root = tree.root();
        let tags: Vec<&str> = tree.children(root).iter().map(|id| tree.tag(*id)).collect();
        assert_eq!(
            tags,
            vec![
                "DataInterface",
                "Model",
                "View:CustomerView",
                "View:OrderView",
                "Controller:Controller"
            ]
        );

        let model_node = tree.lookup(root, "Model").unwrap();
        match &tree.sources(model_node)[0] {
            TaggedElement::Class(c) => {
                assert_eq!(c.name, "Store");
                assert_eq!(c.interfaces[0].name, "DataInterface");
            }
            TaggedElement::Method(_) => panic!("expected class element"),
        }
        assert_eq!(MvcPattern.estimate_tasks(&tree), 10);
    }

    #[test]
    fn duplicate_names_fail_tree_construction() {
        let model = Names(&[("View", &["Same", "Same"])]);
        let result = MvcPattern.tag_tree(&model, &PatternSettings::default());
        assert!(matches!(result, Err(PatternError::Tree(_))));
    }

    #[test]
    fn observer_tree_shape() {
        let model = Names(&[("ConcreteSubject", &["Feed"]), ("ConcreteObserver", &["Reader"])]);
        let settings = PatternSettings {
            package: "news".into(),
        };
        let tree = ObserverPattern.tag_tree(&model, &settings).unwrap();
        let root = tree.root();
        let feed = tree.lookup(root, "ConcreteSubject:Feed").unwrap();
        let slots: Vec<&str> = tree.children(feed).iter().map(|id| tree.tag(*id)).collect();
        assert_eq!(slots, vec!["attach", "detach", "notifyObservers"]);

        let class = tree.sources(feed)[0].as_class().unwrap();
        assert_eq!(class.package, "news");
        assert_eq!(class.imports, vec!["java.util.List", "java.util.ArrayList"]);
    }
}
