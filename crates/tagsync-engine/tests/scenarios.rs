use pretty_assertions::assert_eq;
use std::path::{Path, PathBuf};
use tagsync_engine::{
    FindingKind, MvcPattern, NullMonitor, Pattern, Severity, SourceInspector, Status, Workspace,
};
use tagsync_model::{ClassElement, ClassRef, MethodElement, SpecTree};
use tagsync_test_utils::{config, fixtures, mvc_model, mvc_project, CancelAfter, MemoryDesignModel, MemoryWorkspace};

/// root -> IfaceX -> methodA
fn iface_tree() -> SpecTree {
    let mut tree = SpecTree::new("demo");
    let root = tree.root();
    let iface = tree
        .push_child(root, "IfaceX", vec![ClassElement::interface("app", "IfaceX").into()])
        .unwrap();
    tree.push_child(
        iface,
        "methodA",
        vec![MethodElement::declaration("methodA", ClassRef::new("app", "IfaceX")).into()],
    )
    .unwrap();
    tree
}

fn data_interface_tree() -> SpecTree {
    let mut tree = SpecTree::new("demo");
    let root = tree.root();
    let iface = tree
        .push_child(
            root,
            "DataInterface",
            vec![ClassElement::interface("app", "DataInterface").into()],
        )
        .unwrap();
    tree.push_child(
        iface,
        "getData",
        vec![MethodElement::declaration("getData", ClassRef::new("app", "DataInterface"))
            .with_return("Object")
            .into()],
    )
    .unwrap();
    tree
}

fn inspector<'a>(
    tree: SpecTree,
    model: &'a MemoryDesignModel,
    ws: &'a MemoryWorkspace,
) -> SourceInspector<'a> {
    SourceInspector::new("demo", tree, model, ws, &config("demo"))
}

#[test]
fn test_tagged_interface_validates_clean() {
    let ws = MemoryWorkspace::new().with_file(
        "src/app/IfaceX.java",
        "package app;\n\n/** @pattern IfaceX */\npublic interface IfaceX {\n    /** @pattern methodA */\n    void methodA();\n}\n",
    );
    let model = MemoryDesignModel::new();

    let report = inspector(iface_tree(), &model, &ws).validate_source(&NullMonitor);
    assert!(report.is_clean(), "unexpected findings: {:?}", report.findings);
    assert_eq!(report.status(), Status::Clean);
}

#[test]
fn test_class_declared_for_interface_is_one_error() {
    let ws = MemoryWorkspace::new().with_file(
        "src/app/IfaceX.java",
        "package app;\n\n/** @pattern IfaceX */\npublic class IfaceX {\n    /** @pattern methodA */\n    public void methodA() {}\n}\n",
    );
    let model = MemoryDesignModel::new();

    let report = inspector(iface_tree(), &model, &ws).validate_source(&NullMonitor);
    assert_eq!(report.findings.len(), 1);
    let finding = &report.findings[0];
    assert_eq!(finding.severity, Severity::Error);
    assert_eq!(finding.kind, FindingKind::KindMismatch);
    assert_eq!(finding.pattern, "demo");
    assert_eq!(finding.element, "IfaceX");
    assert!(finding.message.contains("should be an interface"));
    assert_eq!(finding.file.as_deref(), Some(Path::new("src/app/IfaceX.java")));
}

#[test]
fn test_missing_interface_is_synthesized_then_clean() {
    let ws = MemoryWorkspace::new();
    ws.find_or_create_container(Path::new("src"), "app").unwrap();
    let model = MemoryDesignModel::new();

    let mut inspector = inspector(data_interface_tree(), &model, &ws);
    let generated = inspector.update_source(&NullMonitor);
    assert_eq!(ws.paths(), vec![PathBuf::from("src/app/DataInterface.java")]);
    assert_eq!(generated.of_kind(FindingKind::Synthesized).count(), 2);
    assert_eq!(generated.status(), Status::Info);

    let text = ws.file("src/app/DataInterface.java").unwrap();
    assert!(text.starts_with("package app;"));
    assert!(text.contains("public interface DataInterface {"));
    assert!(text.contains("Object getData();"));

    let report = inspector.validate_source(&NullMonitor);
    assert!(report.is_clean(), "unexpected findings: {:?}", report.findings);
}

#[test]
fn test_missing_invocation_names_the_caller() {
    let ws = mvc_project();
    ws.insert("src/app/CustomerView.java", fixtures::CUSTOMER_VIEW_NO_CALL);
    let model = mvc_model();

    let report = MvcPattern
        .validate(&model, &ws, &config("mvc"), &NullMonitor)
        .unwrap();
    let missing: Vec<_> = report.of_kind(FindingKind::MissingInvocation).collect();
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].severity, Severity::Error);
    assert_eq!(missing[0].element, "update");
    assert!(missing[0].message.contains("DataInterface.getData()"));
    assert_eq!(report.status(), Status::Error);
}

#[test]
fn test_complete_project_validates_clean() {
    let ws = mvc_project();
    let model = mvc_model();
    let report = MvcPattern
        .validate(&model, &ws, &config("mvc"), &NullMonitor)
        .unwrap();
    assert!(report.is_clean(), "unexpected findings: {:?}", report.findings);
    assert!(report.skipped.is_empty());
}

#[test]
fn test_malformed_tag_reads_as_untagged() {
    let ws = mvc_project();
    ws.insert(
        "src/app/Model.java",
        "package app;\n\n/** @pattern */\npublic class Model implements DataInterface {\n    public Object getData() { return null; }\n}\n",
    );
    let model = mvc_model();

    let report = MvcPattern
        .validate(&model, &ws, &config("mvc"), &NullMonitor)
        .unwrap();
    assert!(report.skipped.is_empty());
    let missing: Vec<_> = report.of_kind(FindingKind::MissingType).collect();
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].element, "Model");
    assert_eq!(report.of_kind(FindingKind::MissingMethod).count(), 1);
    assert_eq!(report.of_kind(FindingKind::RestrictedUse).count(), 1);
}

#[test]
fn test_inaccessible_container_is_skipped() {
    let ws = MemoryWorkspace::new()
        .with_file("src/app/DataInterface.java", fixtures::DATA_INTERFACE)
        .with_file("src/app/Model.java", fixtures::MODEL)
        .with_file("src/app/OrderController.java", fixtures::ORDER_CONTROLLER)
        .with_file("src/ui/CustomerView.java", fixtures::CUSTOMER_VIEW);
    ws.fail("src/ui");
    let model = mvc_model();

    let report = MvcPattern
        .validate(&model, &ws, &config("mvc"), &NullMonitor)
        .unwrap();
    assert_eq!(report.skipped, vec![PathBuf::from("src/ui")]);
    let missing: Vec<&str> = report
        .of_kind(FindingKind::MissingType)
        .map(|f| f.element.as_str())
        .collect();
    assert_eq!(missing, vec!["CustomerView"]);
}

#[test]
fn test_cancel_before_first_file() {
    let ws = mvc_project();
    let model = mvc_model();
    let monitor = CancelAfter::new(0);

    let report = MvcPattern
        .generate(&model, &ws, &config("mvc"), &monitor)
        .unwrap();
    assert!(report.cancelled);
    assert!(report.findings.is_empty());
    assert_eq!(ws.write_count(), 0);
    assert_eq!(monitor.worked_units(), 0);
}

#[test]
fn test_cancel_mid_pass_keeps_partial_results() {
    let ws = mvc_project();
    ws.insert(
        "src/app/CustomerView.java",
        "package app;\n\n/** @pattern View:CustomerView */\npublic interface CustomerView {\n}\n",
    );
    let model = mvc_model();
    let monitor = CancelAfter::new(1);

    let report = MvcPattern
        .validate(&model, &ws, &config("mvc"), &monitor)
        .unwrap();
    assert!(report.cancelled);
    assert_eq!(monitor.worked_units(), 1);
    assert_eq!(report.of_kind(FindingKind::KindMismatch).count(), 1);
    assert_eq!(report.of_kind(FindingKind::MissingType).count(), 0);
}

#[test]
fn test_update_records_only_unknown_methods() {
    let ws = mvc_project();
    ws.insert(
        "src/app/Model.java",
        "package app;\n\n/** @pattern Model */\npublic class Model implements DataInterface {\n    public Object getData() { return null; }\n\n    public void refresh() {}\n}\n",
    );
    let model = mvc_model();

    let report = MvcPattern
        .update(&model, &ws, &config("mvc"), &NullMonitor)
        .unwrap();
    assert_eq!(model.recorded(), vec![("refresh".to_string(), "Model".to_string())]);
    assert_eq!(report.of_kind(FindingKind::Recorded).count(), 1);
    assert_eq!(report.status(), Status::Info);
}

#[test]
fn test_existing_untagged_file_is_not_overwritten() {
    let untagged = "package app;\n\npublic interface DataInterface {\n    Object getData();\n}\n";
    let ws = MemoryWorkspace::new().with_file("src/app/DataInterface.java", untagged);
    let model = MemoryDesignModel::new();

    let report = inspector(data_interface_tree(), &model, &ws).update_source(&NullMonitor);
    assert_eq!(ws.file("src/app/DataInterface.java").as_deref(), Some(untagged));
    assert_eq!(ws.write_count(), 0);
    let existing: Vec<_> = report.of_kind(FindingKind::ExistingUntagged).collect();
    assert_eq!(existing.len(), 1);
    assert_eq!(existing[0].element, "DataInterface");
    assert_eq!(report.of_kind(FindingKind::Synthesized).count(), 0);
}

#[test]
fn test_untagged_member_is_not_duplicated() {
    let ws = mvc_project();
    ws.insert(
        "src/app/Model.java",
        "package app;\n\n/** @pattern Model */\npublic class Model implements DataInterface {\n    public Object getData() { return null; }\n}\n",
    );
    let before = ws.file("src/app/Model.java");
    let model = mvc_model();

    let report = MvcPattern
        .generate(&model, &ws, &config("mvc"), &NullMonitor)
        .unwrap();
    assert_eq!(ws.file("src/app/Model.java"), before);
    assert_eq!(ws.write_count(), 0);
    assert_eq!(report.of_kind(FindingKind::Synthesized).count(), 0);
    let existing: Vec<_> = report.of_kind(FindingKind::ExistingUntagged).collect();
    assert_eq!(existing.len(), 1);
    assert_eq!(existing[0].element, "getData");
    assert!(existing[0].message.contains("Model.getData"));
}

#[test]
fn test_cancel_between_synthesized_elements() {
    let ws = MemoryWorkspace::new();
    ws.find_or_create_container(Path::new("src"), "app").unwrap();
    let model = mvc_model();
    let monitor = CancelAfter::new(1);

    let report = MvcPattern
        .generate(&model, &ws, &config("mvc"), &monitor)
        .unwrap();
    assert!(report.cancelled);
    assert_eq!(report.of_kind(FindingKind::Synthesized).count(), 1);
    assert_eq!(ws.write_count(), 1);
}

#[test]
fn test_recorded_method_is_known_on_next_pass() {
    let ws = mvc_project();
    ws.insert(
        "src/app/Model.java",
        "package app;\n\n/** @pattern Model */\npublic class Model implements DataInterface {\n    /** @pattern getData */\n    public Object getData() { return null; }\n\n    public void refresh() {}\n}\n",
    );
    let model = mvc_model();
    let config = config("mvc");

    let first = MvcPattern.update(&model, &ws, &config, &NullMonitor).unwrap();
    assert_eq!(first.of_kind(FindingKind::Recorded).count(), 1);
    let second = MvcPattern.update(&model, &ws, &config, &NullMonitor).unwrap();
    assert_eq!(second.of_kind(FindingKind::Recorded).count(), 0);

    ws.insert(
        "src/app/Model.java",
        "package app;\n\n/** @pattern Model */\npublic class Model implements DataInterface {\n    /** @pattern getData */\n    public Object getData() { return null; }\n\n    /** @pattern refresh */\n    public void refresh() {}\n}\n",
    );
    let report = MvcPattern.validate(&model, &ws, &config, &NullMonitor).unwrap();
    assert!(report.is_clean(), "unexpected findings: {:?}", report.findings);

    ws.insert("src/app/Model.java", fixtures::MODEL);
    let writes = ws.write_count();
    let generated = MvcPattern.generate(&model, &ws, &config, &NullMonitor).unwrap();
    assert_eq!(generated.of_kind(FindingKind::Synthesized).count(), 0);
    assert_eq!(ws.write_count(), writes);
}
