//! Syntax-tree correlation
//!
//! A single pre-order walk over the [`SyntaxRef`] variants of a unit. On
//! entering a declaration its tag is looked up among the children of the
//! cursor; a hit runs the mode action, marks the node visited and moves
//! the cursor down. Leaving the declaration moves the cursor back only
//! through the [`Descent`] the entry produced.

use crate::context::{Descent, Location, MethodFrame, Mode, PassContext, TypeFrame};
use std::collections::HashSet;
use tagsync_model::{visit, ClassRef, Finding, FindingKind, TaggedElement};
use tagsync_syntax::{CompilationUnit, Invocation, MethodDecl, SyntaxRef, TypeDecl};
use tagsync_tree::NodeId;

/// Correlate every declaration of `unit` against the context's tag tree
pub fn correlate(unit: &CompilationUnit, ctx: &mut PassContext<'_>) {
    for root in unit.roots() {
        walk(root, unit, ctx);
    }
}

fn walk(node: SyntaxRef<'_>, unit: &CompilationUnit, ctx: &mut PassContext<'_>) {
    let descent = enter(node, unit, ctx);
    for child in node.children() {
        walk(child, unit, ctx);
    }
    leave(node, descent, ctx);
}

fn enter(node: SyntaxRef<'_>, unit: &CompilationUnit, ctx: &mut PassContext<'_>) -> Option<Descent> {
    let decl_tag = match node {
        SyntaxRef::Invocation(inv) => {
            check_call(inv, ctx);
            return None;
        }
        SyntaxRef::Type(_) | SyntaxRef::Method(_) => ctx.extractor.extract(node.doc()),
    };

    let resolved = decl_tag
        .as_deref()
        .and_then(|tag| ctx.tree.lookup(ctx.cursor, tag));

    let descent = match (decl_tag.as_deref(), resolved) {
        (Some(_), Some(id)) => Some(descend(node, id, unit, ctx)),
        (Some(tag), None) => {
            misplaced(node, tag, ctx);
            None
        }
        (None, _) => {
            untagged(node, ctx);
            None
        }
    };

    // Only a resolved tag exempts the body from the reserved-call check.
    if let SyntaxRef::Method(method) = node {
        ctx.methods.push(MethodFrame {
            name: method.name.clone(),
            tagged: descent.is_some(),
            reported: HashSet::new(),
        });
    }

    if let SyntaxRef::Type(decl) = node {
        ctx.types.push(TypeFrame {
            name: decl.name.clone(),
            node: descent.as_ref().map(|d| d.to),
        });
    }

    descent
}

fn leave(node: SyntaxRef<'_>, descent: Option<Descent>, ctx: &mut PassContext<'_>) {
    match node {
        SyntaxRef::Type(_) => {
            ctx.types.pop();
        }
        SyntaxRef::Method(_) => {
            ctx.methods.pop();
        }
        SyntaxRef::Invocation(_) => {}
    }

    if let Some(Descent { from, to }) = descent {
        tracing::trace!(tag = ctx.tree.tag(to), "cursor up");
        ctx.cursor = from;
    }
}

fn descend(node: SyntaxRef<'_>, id: NodeId, unit: &CompilationUnit, ctx: &mut PassContext<'_>) -> Descent {
    if ctx.mode() == Mode::Validate {
        let findings: Vec<Finding> = ctx
            .tree
            .sources(id)
            .iter()
            .flat_map(|element| element.compare(node, unit, ctx.pattern()))
            .map(|f| with_file(f, ctx))
            .collect();
        ctx.report.extend(findings);
    }

    if let SyntaxRef::Type(decl) = node {
        record_location(decl, id, ctx);
    }

    if visit(ctx.tree, id) {
        tracing::debug!(tag = ctx.tree.tag(id), mode = %ctx.mode(), "tag satisfied");
    }

    tracing::trace!(tag = ctx.tree.tag(id), "cursor down");
    let from = ctx.cursor;
    ctx.cursor = id;
    Descent { from, to: id }
}

fn record_location(decl: &TypeDecl, id: NodeId, ctx: &mut PassContext<'_>) {
    let Some(file) = ctx.file.clone() else { return };
    ctx.locations.insert(
        id,
        Location {
            file,
            body_close: decl.body_close,
            column: decl.column,
            kind: decl.kind,
            name: decl.name.clone(),
        },
    );
}

/// Tagged declaration whose tag is not a child of the cursor
fn misplaced(node: SyntaxRef<'_>, tag: &str, ctx: &mut PassContext<'_>) {
    let cursor_tag = ctx.tree.tag(ctx.cursor).to_string();
    tracing::debug!(tag, cursor = %cursor_tag, "tag not expected here");
    if ctx.mode() == Mode::Validate {
        let finding = Finding::new(
            FindingKind::UnexpectedTag,
            ctx.pattern(),
            node.name(),
            format!("tag '{tag}' is not expected inside '{cursor_tag}'"),
        );
        let finding = with_file(finding, ctx);
        ctx.report.push(finding);
    }
}

fn untagged(node: SyntaxRef<'_>, ctx: &mut PassContext<'_>) {
    match (ctx.mode(), node) {
        (Mode::Validate, SyntaxRef::Type(decl)) => {
            let findings: Vec<Finding> = ctx
                .restrictions
                .check_type(decl, ctx.pattern())
                .into_iter()
                .map(|f| with_file(f, ctx))
                .collect();
            ctx.report.extend(findings);
        }
        (Mode::Update, SyntaxRef::Method(method)) => record_method(method, ctx),
        _ => {}
    }
}

/// Call from an untagged method to a reserved name, reported once per method and name
fn check_call(inv: &Invocation, ctx: &mut PassContext<'_>) {
    if ctx.mode() != Mode::Validate {
        return;
    }
    let Some(frame) = ctx.methods.last() else { return };
    if frame.tagged || frame.reported.contains(&inv.name) {
        return;
    }
    let Some(finding) = ctx
        .restrictions
        .check_invocation(&frame.name, inv, ctx.pattern())
    else {
        return;
    };
    let finding = with_file(finding, ctx);
    if let Some(frame) = ctx.methods.last_mut() {
        frame.reported.insert(inv.name.clone());
    }
    ctx.report.push(finding);
}

/// Back-propagate an untagged method declared directly in a tagged container
fn record_method(method: &MethodDecl, ctx: &mut PassContext<'_>) {
    let Some(owner) = ctx.types.last() else { return };
    let Some(container) = owner.node.filter(|n| *n == ctx.cursor) else {
        return;
    };

    let owner_ref = ClassRef::new(&ctx.package, &owner.name);
    let arg_types = method.param_types();
    let known = ctx.tree.children(container).iter().any(|child| {
        ctx.tree.sources(*child).iter().any(|element| match element {
            TaggedElement::Method(m) => m.matches(&method.name, &owner_ref, &arg_types),
            TaggedElement::Class(_) => false,
        })
    });
    if known {
        return;
    }

    let container_tag = ctx.tree.tag(container).to_string();
    if !ctx.recorded.insert((container_tag.clone(), method.name.clone())) {
        return;
    }

    match ctx.model.record_element(&method.name, &container_tag) {
        Ok(()) => {
            tracing::info!(method = %method.name, container = %container_tag, "element recorded");
            let finding = Finding::new(
                FindingKind::Recorded,
                ctx.pattern(),
                &method.name,
                format!("recorded in design model under '{container_tag}'"),
            );
            let finding = with_file(finding, ctx);
            ctx.report.push(finding);
        }
        Err(err) => {
            tracing::warn!(method = %method.name, error = %err, "design model rejected element");
        }
    }
}

fn with_file(finding: Finding, ctx: &PassContext<'_>) -> Finding {
    match ctx.file() {
        Some(file) => finding.with_file(file),
        None => finding,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DesignModelError;
    use crate::ports::DesignModel;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use std::path::Path;
    use tagsync_model::{reset_pass, ClassElement, MethodElement, SpecTree, SupertypeRef};
    use tagsync_syntax::{JavaParser, SourceParser, TagExtractor};

    #[derive(Default)]
    struct Sink(Mutex<Vec<(String, String)>>);

    impl DesignModel for Sink {
        fn element_name(&self, _role: &str) -> Option<String> {
            None
        }

        fn element_names(&self, _role: &str) -> Vec<String> {
            Vec::new()
        }

        fn record_element(&self, name: &str, container_tag: &str) -> Result<(), DesignModelError> {
            self.0.lock().push((name.to_string(), container_tag.to_string()));
            Ok(())
        }
    }

    fn tree() -> (SpecTree, NodeId, NodeId) {
        let mut tree = SpecTree::new("mvc");
        let root = tree.root();
        let iface = tree
            .push_child(
                root,
                "DataInterface",
                vec![ClassElement::interface("app", "DataInterface").into()],
            )
            .unwrap();
        let method = tree
            .push_child(
                iface,
                "getData",
                vec![MethodElement::declaration("getData", ClassRef::new("app", "DataInterface"))
                    .with_return("Object")
                    .into()],
            )
            .unwrap();
        let model = tree
            .push_child(
                root,
                "Model",
                vec![ClassElement::class("app", "Model")
                    .with_interface(SupertypeRef::required("DataInterface"))
                    .into()],
            )
            .unwrap();
        tree.push_child(
            model,
            "getData",
            vec![MethodElement::implementation("getData", ClassRef::new("app", "Model"))
                .with_return("Object")
                .into()],
        )
        .unwrap();
        (tree, iface, method)
    }

    fn run(mode: Mode, tree: &mut SpecTree, source: &str, sink: &Sink) -> tagsync_model::Report {
        let unit = JavaParser::new().parse(source).unwrap();
        let extractor = TagExtractor::default();
        reset_pass(tree);
        let mut ctx = PassContext::new(mode, "mvc", tree, &extractor, sink);
        ctx.begin_file(Path::new("src/app/X.java"), unit.package_name());
        correlate(&unit, &mut ctx);
        assert_eq!(ctx.cursor(), ctx.tree().root());
        ctx.finish()
    }

    const INTERFACE: &str = "package app;\n/**\n * @pattern DataInterface\n */\npublic interface DataInterface {\n    /**\n     * @pattern getData\n     */\n    Object getData();\n}\n";

    #[test]
    fn nested_tags_resolve_through_the_cursor() {
        let (mut tree, iface, method) = tree();
        let report = run(Mode::Generate, &mut tree, INTERFACE, &Sink::default());
        assert!(report.is_clean());
        assert!(tree.is_visited(iface));
        assert!(tree.is_visited(method));
        assert_eq!(tree.visited_count(), 2);
    }

    #[test]
    fn tag_outside_its_parent_does_not_resolve() {
        let (mut tree, _, method) = tree();
        let source = "package app;\nclass Loose {\n    /** @pattern getData */\n    Object getData() { return null; }\n}\n";
        let report = run(Mode::Validate, &mut tree, source, &Sink::default());
        assert!(!tree.is_visited(method));
        assert_eq!(report.of_kind(FindingKind::UnexpectedTag).count(), 1);
    }

    #[test]
    fn validate_compares_every_element() {
        let (mut tree, iface, _) = tree();
        let source = INTERFACE.replace("public interface", "public class");
        let report = run(Mode::Validate, &mut tree, &source, &Sink::default());
        assert!(tree.is_visited(iface));
        let errors: Vec<_> = report.of_kind(FindingKind::KindMismatch).collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].element, "DataInterface");
        assert_eq!(errors[0].file.as_deref(), Some(Path::new("src/app/X.java")));
    }

    #[test]
    fn untagged_implementor_is_restricted() {
        let (mut tree, _, _) = tree();
        let source = "package app;\nclass Rogue implements DataInterface {\n    public Object getData() { return null; }\n}\n";
        let report = run(Mode::Validate, &mut tree, source, &Sink::default());
        assert_eq!(report.of_kind(FindingKind::RestrictedUse).count(), 1);
    }

    #[test]
    fn update_records_unknown_methods_once() {
        let (mut tree, _, _) = tree();
        let source = "package app;\n/** @pattern Model */\nclass Model implements DataInterface {\n    /** @pattern getData */\n    public Object getData() { return null; }\n    public void refresh() {}\n    public Object getData(int page) { return null; }\n    class Inner { void hidden() {} }\n}\n";
        let sink = Sink::default();
        let report = run(Mode::Update, &mut tree, source, &sink);

        assert_eq!(
            *sink.0.lock(),
            vec![
                ("refresh".to_string(), "Model".to_string()),
                ("getData".to_string(), "Model".to_string()),
            ]
        );
        assert_eq!(report.of_kind(FindingKind::Recorded).count(), 2);
    }

    #[test]
    fn matching_untagged_method_is_not_recorded() {
        let (mut tree, _, _) = tree();
        let source = "package app;\n/** @pattern Model */\nclass Model implements DataInterface {\n    public Object getData() { return null; }\n}\n";
        let sink = Sink::default();
        let report = run(Mode::Update, &mut tree, source, &sink);
        assert!(sink.0.lock().is_empty());
        assert!(report.is_clean());
    }

    #[test]
    fn unresolved_tag_does_not_exempt_reserved_calls() {
        let (mut tree, _, _) = tree();
        let root = tree.root();
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
        let source = "package app;\nclass Helper {\n    /** @pattern update */\n    void run() {\n        DataInterface data = null;\n        data.getData();\n    }\n}\n";
        let report = run(Mode::Validate, &mut tree, source, &Sink::default());
        assert_eq!(report.of_kind(FindingKind::UnexpectedTag).count(), 1);
        let restricted: Vec<_> = report.of_kind(FindingKind::RestrictedUse).collect();
        assert_eq!(restricted.len(), 1);
        assert_eq!(restricted[0].element, "run");
    }
}
