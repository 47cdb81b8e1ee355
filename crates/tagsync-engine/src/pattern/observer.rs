use super::{name_or_role, names_or_role, Pattern, PatternSettings};
use crate::error::PatternError;
use crate::ports::DesignModel;
use tagsync_model::{ClassElement, ClassRef, MethodElement, SpecTree, SupertypeRef};
use tagsync_tree::NodeId;

/// Observer profile
///
/// `Subject` and `Observer` are interfaces; every `ConcreteSubject:<name>`
/// keeps a list of observers and notifies them through `update()`, every
/// `ConcreteObserver:<name>` implements it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObserverPattern;

impl Pattern for ObserverPattern {
    fn name(&self) -> &str {
        "observer"
    }

    fn description(&self) -> &str {
        "subjects notifying registered observers of state changes"
    }

    fn tag_tree(&self, model: &dyn DesignModel, settings: &PatternSettings) -> Result<SpecTree, PatternError> {
        let pkg = settings.package.as_str();
        let subject = name_or_role(model, "Subject");
        let observer = name_or_role(model, "Observer");

        let mut tree = SpecTree::new(self.name());
        let root = tree.root();

        let subject_node = tree.push_child(
            root,
            "Subject",
            vec![ClassElement::interface(pkg, &subject).into()],
        )?;
        let owner = ClassRef::new(pkg, &subject);
        subscriptions(&mut tree, subject_node, &owner, &observer, false)?;
        tree.push_child(
            subject_node,
            "notifyObservers",
            vec![MethodElement::declaration("notifyObservers", owner).into()],
        )?;

        let observer_node = tree.push_child(
            root,
            "Observer",
            vec![ClassElement::interface(pkg, &observer).into()],
        )?;
        tree.push_child(
            observer_node,
            "update",
            vec![MethodElement::declaration("update", ClassRef::new(pkg, &observer)).into()],
        )?;

        for name in names_or_role(model, "ConcreteSubject") {
            let node = tree.push_child(
                root,
                format!("ConcreteSubject:{name}"),
                vec![ClassElement::class(pkg, &name)
                    .with_interface(SupertypeRef::required(&subject))
                    .with_import("java.util.List")
                    .with_import("java.util.ArrayList")
                    .into()],
            )?;
            let owner = ClassRef::new(pkg, &name);
            subscriptions(&mut tree, node, &owner, &observer, true)?;
            tree.push_child(
                node,
                "notifyObservers",
                vec![
                    MethodElement::implementation("notifyObservers", owner).into(),
                    MethodElement::invocation("update", ClassRef::new(pkg, &observer)).into(),
                ],
            )?;
        }

        for name in names_or_role(model, "ConcreteObserver") {
            let node = tree.push_child(
                root,
                format!("ConcreteObserver:{name}"),
                vec![ClassElement::class(pkg, &name)
                    .with_interface(SupertypeRef::required(&observer))
                    .into()],
            )?;
            tree.push_child(
                node,
                "update",
                vec![MethodElement::implementation("update", ClassRef::new(pkg, &name)).into()],
            )?;
        }

        Ok(tree)
    }
}

/// `attach`/`detach` slots taking an observer
fn subscriptions(
    tree: &mut SpecTree,
    parent: NodeId,
    owner: &ClassRef,
    observer: &str,
    implemented: bool,
) -> Result<(), PatternError> {
    for name in ["attach", "detach"] {
        let element = if implemented {
            MethodElement::implementation(name, owner.clone())
        } else {
            MethodElement::declaration(name, owner.clone())
        };
        tree.push_child(parent, name, vec![element.with_args([observer]).into()])?;
    }
    Ok(())
}
