//! Project-level orchestration of traversal passes
//!
//! # Overview
//!
//! - [`SourceInspector::update_source`]: generate pass, then synthesize every
//!   gap on the frontier of the visited tree, re-traversing each touched file
//! - [`SourceInspector::validate_source`]: validate pass, then report every
//!   transitively unvisited tag as missing
//! - [`SourceInspector::update_model`]: update pass only
//!
//! Files are visited one at a time in container listing order; a container
//! or file that cannot be accessed is skipped and recorded in the report.
//! Cancellation is polled before each file and each synthesis step.

use crate::ast_engine::AstEngine;
use crate::config::SyncConfig;
use crate::context::{Mode, PassContext};
use crate::error::EngineError;
use crate::ports::{DesignModel, ProgressMonitor, Resource, Workspace};
use std::collections::HashSet;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use tagsync_model::{
    is_optional, missing_finding, reset_pass, Finding, FindingKind, Report, SpecTree,
};
use tagsync_tree::NodeId;

/// Runs passes of one pattern's tag tree over a source tree
pub struct SourceInspector<'a> {
    pattern: String,
    tree: SpecTree,
    model: &'a dyn DesignModel,
    engine: AstEngine<'a>,
    source_root: PathBuf,
}

impl std::fmt::Debug for SourceInspector<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceInspector")
            .field("pattern", &self.pattern)
            .field("tags", &self.tree.len())
            .field("source_root", &self.source_root)
            .finish_non_exhaustive()
    }
}

impl<'a> SourceInspector<'a> {
    /// Create an inspector for a Java source tree
    #[must_use]
    pub fn new(
        pattern: impl Into<String>,
        tree: SpecTree,
        model: &'a dyn DesignModel,
        workspace: &'a dyn Workspace,
        config: &SyncConfig,
    ) -> Self {
        Self::with_engine(
            pattern,
            tree,
            model,
            AstEngine::java(workspace, config.extractor()).with_extension(&config.extension),
            &config.source_root,
        )
    }

    /// Create an inspector over an explicit engine
    #[must_use]
    pub fn with_engine(
        pattern: impl Into<String>,
        tree: SpecTree,
        model: &'a dyn DesignModel,
        engine: AstEngine<'a>,
        source_root: &Path,
    ) -> Self {
        Self {
            pattern: pattern.into(),
            tree,
            model,
            engine,
            source_root: source_root.to_path_buf(),
        }
    }

    /// Tag tree with the visitation state of the last pass
    #[inline]
    #[must_use]
    pub fn tree(&self) -> &SpecTree {
        &self.tree
    }

    /// Pattern name
    #[inline]
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Generate pass followed by synthesis of missing elements
    pub fn update_source(&mut self, monitor: &dyn ProgressMonitor) -> Report {
        reset_pass(&mut self.tree);
        let estimate = self.tree.iter().count().saturating_sub(1);
        monitor.begin("generate", estimate);
        tracing::info!(pattern = %self.pattern, "update source started");

        let mut ctx = PassContext::new(
            Mode::Generate,
            &self.pattern,
            &mut self.tree,
            self.engine.extractor(),
            self.model,
        );
        if traverse_container(&self.engine, &self.source_root, &mut ctx, monitor).is_break() {
            return finish(ctx);
        }

        let mut attempted: HashSet<NodeId> = HashSet::new();
        loop {
            let next = ctx
                .tree()
                .frontier()
                .into_iter()
                .find(|id| !attempted.contains(id) && !is_optional(ctx.tree(), *id));
            let Some(id) = next else { break };

            if monitor.is_cancelled() {
                tracing::info!("update source cancelled before synthesis");
                ctx.cancel();
                break;
            }
            attempted.insert(id);

            match synthesize(&self.engine, &self.source_root, &ctx, id) {
                Ok(file) => {
                    let tag = ctx.tree().tag(id).to_string();
                    let finding = Finding::new(
                        FindingKind::Synthesized,
                        ctx.pattern(),
                        &tag,
                        format!("generated '{tag}'"),
                    )
                    .with_file(&file);
                    ctx.report_mut().push(finding);
                    if let Err(err) = self.engine.traverse_file(&file, &mut ctx) {
                        tracing::warn!(file = %file.display(), error = %err, "re-traversal failed");
                        ctx.report_mut().skip(&file);
                    }
                }
                Err(err) => {
                    let finding = synthesis_failure(&ctx, id, &err);
                    ctx.report_mut().push(finding);
                }
            }
            monitor.worked(1);
        }

        finish(ctx)
    }

    /// Validate pass followed by missing-element reporting
    pub fn validate_source(&mut self, monitor: &dyn ProgressMonitor) -> Report {
        reset_pass(&mut self.tree);
        monitor.begin("validate", 0);
        tracing::info!(pattern = %self.pattern, "validate source started");

        let mut ctx = PassContext::new(
            Mode::Validate,
            &self.pattern,
            &mut self.tree,
            self.engine.extractor(),
            self.model,
        );
        if traverse_container(&self.engine, &self.source_root, &mut ctx, monitor).is_break() {
            return finish(ctx);
        }

        let missing: Vec<Finding> = ctx
            .tree()
            .all_unvisited()
            .into_iter()
            .filter(|id| !is_optional(ctx.tree(), *id))
            .map(|id| missing_finding(ctx.tree(), id, ctx.pattern()))
            .collect();
        ctx.report_mut().extend(missing);

        finish(ctx)
    }

    /// Update pass; the effect is the elements recorded in the design model
    pub fn update_model(&mut self, monitor: &dyn ProgressMonitor) -> Report {
        reset_pass(&mut self.tree);
        monitor.begin("update model", 0);
        tracing::info!(pattern = %self.pattern, "update model started");

        let mut ctx = PassContext::new(
            Mode::Update,
            &self.pattern,
            &mut self.tree,
            self.engine.extractor(),
            self.model,
        );
        // Cancellation only truncates; recorded elements stay recorded.
        let _ = traverse_container(&self.engine, &self.source_root, &mut ctx, monitor);
        finish(ctx)
    }
}

fn finish(ctx: PassContext<'_>) -> Report {
    let report = ctx.finish();
    tracing::info!(
        status = %report.status(),
        findings = report.findings.len(),
        skipped = report.skipped.len(),
        cancelled = report.cancelled,
        "pass finished"
    );
    report
}

/// Depth-first walk of containers; breaks on cancellation
fn traverse_container(
    engine: &AstEngine<'_>,
    container: &Path,
    ctx: &mut PassContext<'_>,
    monitor: &dyn ProgressMonitor,
) -> ControlFlow<()> {
    let members = match engine.workspace().list_members(container) {
        Ok(members) => members,
        Err(err) => {
            tracing::warn!(container = %container.display(), error = %err, "container skipped");
            ctx.report_mut().skip(container);
            return ControlFlow::Continue(());
        }
    };

    for member in members {
        match member {
            Resource::Container(path) => traverse_container(engine, &path, ctx, monitor)?,
            Resource::File(path) if engine.handles(&path) => {
                if monitor.is_cancelled() {
                    tracing::info!(file = %path.display(), "pass cancelled");
                    ctx.cancel();
                    return ControlFlow::Break(());
                }
                if let Err(err) = engine.traverse_file(&path, ctx) {
                    tracing::warn!(file = %path.display(), error = %err, "file skipped");
                    ctx.report_mut().skip(&path);
                }
                monitor.worked(1);
            }
            Resource::File(_) => {}
        }
    }
    ControlFlow::Continue(())
}

/// Create the source for one frontier node
fn synthesize(
    engine: &AstEngine<'_>,
    source_root: &Path,
    ctx: &PassContext<'_>,
    id: NodeId,
) -> Result<PathBuf, EngineError> {
    let tree = ctx.tree();
    let tag = tree.tag(id);
    let sources = tree.sources(id);
    let parent = tree.parent(id);

    if parent == Some(tree.root()) {
        let class = sources
            .iter()
            .find_map(|e| e.as_class())
            .ok_or_else(|| EngineError::NotSynthesizable(tag.to_string()))?;
        return engine.create_type_file(source_root, class, tag);
    }

    let owner = parent
        .and_then(|p| ctx.location(p))
        .ok_or_else(|| EngineError::MissingLocation(tag.to_string()))?;
    engine.insert_member(owner, sources, tag)
}

fn synthesis_failure(ctx: &PassContext<'_>, id: NodeId, err: &EngineError) -> Finding {
    let tag = ctx.tree().tag(id);
    tracing::warn!(tag, error = %err, "synthesis failed");
    let kind = if err.is_existing_untagged() {
        FindingKind::ExistingUntagged
    } else {
        FindingKind::SynthesisFailed
    };
    Finding::new(kind, ctx.pattern(), tag, err.to_string())
}
