use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::path::Path;
use tagsync_engine::{FindingKind, MvcPattern, NullMonitor, ObserverPattern, Pattern, Workspace};
use tagsync_test_utils::{config, fixtures, mvc_model, mvc_project, MemoryDesignModel, MemoryWorkspace};

fn empty_source_tree() -> MemoryWorkspace {
    let ws = MemoryWorkspace::new();
    ws.find_or_create_container(Path::new("src"), "app").unwrap();
    ws
}

#[test]
fn test_generate_twice_synthesizes_nothing_new() {
    let ws = empty_source_tree();
    let model = mvc_model();
    let config = config("mvc");

    let first = MvcPattern.generate(&model, &ws, &config, &NullMonitor).unwrap();
    assert_eq!(first.of_kind(FindingKind::Synthesized).count(), 8);
    assert_eq!(first.of_kind(FindingKind::SynthesisFailed).count(), 0);
    let writes = ws.write_count();

    let second = MvcPattern.generate(&model, &ws, &config, &NullMonitor).unwrap();
    assert_eq!(second.of_kind(FindingKind::Synthesized).count(), 0);
    assert_eq!(ws.write_count(), writes);

    let report = MvcPattern.validate(&model, &ws, &config, &NullMonitor).unwrap();
    assert!(report.is_clean(), "unexpected findings: {:?}", report.findings);
}

#[test]
fn test_generated_observer_project_validates_clean() {
    let ws = empty_source_tree();
    let model = MemoryDesignModel::new()
        .with_role("ConcreteSubject", &["Feed"])
        .with_role("ConcreteObserver", &["Reader", "Archive"]);
    let config = config("observer");

    let generated = ObserverPattern.generate(&model, &ws, &config, &NullMonitor).unwrap();
    assert_eq!(generated.of_kind(FindingKind::SynthesisFailed).count(), 0);

    let feed = ws.file("src/app/Feed.java").unwrap();
    assert!(feed.contains("import java.util.List;"));
    assert!(feed.contains("public class Feed implements Subject {"));

    let report = ObserverPattern.validate(&model, &ws, &config, &NullMonitor).unwrap();
    assert!(report.is_clean(), "unexpected findings: {:?}", report.findings);
}

#[test]
fn test_reserved_call_reported_once_per_method() {
    let ws = mvc_project().with_file("src/app/Report.java", fixtures::UNTAGGED_CALLER);
    let model = mvc_model();

    let report = MvcPattern
        .validate(&model, &ws, &config("mvc"), &NullMonitor)
        .unwrap();
    let restricted: Vec<_> = report.of_kind(FindingKind::RestrictedUse).collect();
    assert_eq!(restricted.len(), 1);
    assert_eq!(restricted[0].element, "print");
    assert_eq!(report.findings.len(), 1);
}

const FILES: [(&str, &str, &str); 4] = [
    ("DataInterface.java", fixtures::DATA_INTERFACE, "DataInterface"),
    ("Model.java", fixtures::MODEL, "Model"),
    ("CustomerView.java", fixtures::CUSTOMER_VIEW, "View:CustomerView"),
    ("OrderController.java", fixtures::ORDER_CONTROLLER, "Controller:OrderController"),
];

proptest! {
    #[test]
    fn prop_present_declarations_are_covered(
        present in proptest::collection::vec(any::<bool>(), 4),
        nested in proptest::collection::vec(any::<bool>(), 4),
    ) {
        let ws = MemoryWorkspace::new();
        ws.find_or_create_container(Path::new("src"), "app").unwrap();
        for (i, (file, text, _)) in FILES.iter().enumerate() {
            if present[i] {
                let dir = if nested[i] { "src/app/deep" } else { "src/app" };
                ws.insert(format!("{dir}/{file}"), text);
            }
        }
        let model = mvc_model();
        let config = config("mvc");

        let mut inspector = MvcPattern.inspector(&model, &ws, &config).unwrap();
        let report = inspector.validate_source(&NullMonitor);
        let tree = inspector.tree();
        let unvisited = tree.all_unvisited();

        for (i, (_, _, tag)) in FILES.iter().enumerate() {
            let id = tree.lookup(tree.root(), tag).unwrap();
            if present[i] {
                prop_assert!(!unvisited.contains(&id), "{} left unvisited", tag);
                for child in tree.children(id) {
                    prop_assert!(!unvisited.contains(child));
                }
            } else {
                prop_assert!(unvisited.contains(&id));
            }
        }
        prop_assert_eq!(report.skipped.len(), 0);
    }
}
