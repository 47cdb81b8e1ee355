//! Pattern profiles
//!
//! A pattern turns the design model into the tag tree a source tree is
//! reconciled against. Profiles are independent structs behind one trait
//! and are selected by name through [`PatternRegistry`].

mod mvc;
mod observer;
mod registry;

pub use mvc::MvcPattern;
pub use observer::ObserverPattern;
pub use registry::PatternRegistry;

use crate::config::SyncConfig;
use crate::error::PatternError;
use crate::inspector::SourceInspector;
use crate::ports::{DesignModel, ProgressMonitor, Workspace};
use tagsync_model::{ClassKind, MethodElement, Report, SpecTree, TaggedElement};

/// Values patterns need besides the design model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternSettings {
    /// Package every element of the pattern lives in
    pub package: String,
}

impl Default for PatternSettings {
    fn default() -> Self {
        Self {
            package: "app".to_string(),
        }
    }
}

/// Generator capability shared by all profiles
pub trait Pattern: Send + Sync {
    /// Profile name
    fn name(&self) -> &str;

    /// One-line description
    fn description(&self) -> &str;

    /// Build the tag tree from the design model
    ///
    /// # Errors
    /// Returns `PatternError` if the model yields an inconsistent tree,
    /// e.g. two elements of one role with the same name.
    fn tag_tree(&self, model: &dyn DesignModel, settings: &PatternSettings) -> Result<SpecTree, PatternError>;

    /// Number of work units a generation pass may take
    fn estimate_tasks(&self, tree: &SpecTree) -> usize {
        tree.iter().count().saturating_sub(1)
    }

    /// Inspector over this pattern's freshly built tree
    ///
    /// # Errors
    /// Returns `PatternError` if the tag tree cannot be built.
    fn inspector<'a>(
        &self,
        model: &'a dyn DesignModel,
        workspace: &'a dyn Workspace,
        config: &SyncConfig,
    ) -> Result<SourceInspector<'a>, PatternError> {
        let mut tree = self.tag_tree(model, &config.pattern_settings())?;
        attach_recorded(&mut tree, model)?;
        tracing::debug!(pattern = self.name(), tags = self.estimate_tasks(&tree), "tag tree built");
        Ok(SourceInspector::new(self.name(), tree, model, workspace, config))
    }

    /// Synthesize missing source
    ///
    /// # Errors
    /// Returns `PatternError` if the tag tree cannot be built.
    fn generate(
        &self,
        model: &dyn DesignModel,
        workspace: &dyn Workspace,
        config: &SyncConfig,
        monitor: &dyn ProgressMonitor,
    ) -> Result<Report, PatternError> {
        Ok(self.inspector(model, workspace, config)?.update_source(monitor))
    }

    /// Validate source against the tag tree
    ///
    /// # Errors
    /// Returns `PatternError` if the tag tree cannot be built.
    fn validate(
        &self,
        model: &dyn DesignModel,
        workspace: &dyn Workspace,
        config: &SyncConfig,
        monitor: &dyn ProgressMonitor,
    ) -> Result<Report, PatternError> {
        Ok(self.inspector(model, workspace, config)?.validate_source(monitor))
    }

    /// Back-propagate untagged methods into the design model
    ///
    /// # Errors
    /// Returns `PatternError` if the tag tree cannot be built.
    fn update(
        &self,
        model: &dyn DesignModel,
        workspace: &dyn Workspace,
        config: &SyncConfig,
        monitor: &dyn ProgressMonitor,
    ) -> Result<Report, PatternError> {
        Ok(self.inspector(model, workspace, config)?.update_model(monitor))
    }
}

/// Names playing `role`, or the role itself when the model lists none
pub(crate) fn names_or_role(model: &dyn DesignModel, role: &str) -> Vec<String> {
    let names = model.element_names(role);
    if names.is_empty() {
        vec![role.to_string()]
    } else {
        names
    }
}

/// Name of the single element playing `role`, or the role itself
pub(crate) fn name_or_role(model: &dyn DesignModel, role: &str) -> String {
    model.element_name(role).unwrap_or_else(|| role.to_string())
}

/// Hang methods recorded by earlier update passes under their container tag
///
/// Recorded methods become optional nodes: a tagged declaration satisfies
/// them, absence is never reported or synthesized.
pub(crate) fn attach_recorded(tree: &mut SpecTree, model: &dyn DesignModel) -> Result<(), PatternError> {
    let root = tree.root();
    let containers: Vec<_> = tree.children(root).to_vec();
    for container in containers {
        let Some(class) = tree.sources(container).iter().find_map(TaggedElement::as_class) else {
            continue;
        };
        let owner = class.class_ref();
        let kind = class.kind;
        let tag = tree.tag(container).to_string();

        for name in model.recorded_elements(&tag) {
            if tree.lookup(container, &name).is_some() {
                continue;
            }
            let element = match kind {
                ClassKind::Interface => MethodElement::declaration(&name, owner.clone()),
                ClassKind::Class => MethodElement::implementation(&name, owner.clone()),
            }
            .with_optional(true);
            tracing::debug!(container = %tag, method = %name, "recorded method attached");
            tree.push_child(container, name, vec![element.into()])?;
        }
    }
    Ok(())
}
