use super::{name_or_role, names_or_role, Pattern, PatternSettings};
use crate::error::PatternError;
use crate::ports::DesignModel;
use tagsync_model::{ClassElement, ClassRef, MethodElement, SpecTree, SupertypeRef};

/// Model-View-Controller profile
///
/// ```text
/// mvc
/// ├── DataInterface        interface
/// │   └── getData          declaration
/// ├── Model                class implementing DataInterface
/// │   └── getData          implementation
/// ├── View:<name>          class, one per view
/// │   └── update           implementation calling DataInterface.getData()
/// └── Controller:<name>    class, one per controller
///     └── handleRequest    implementation
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MvcPattern;

impl Pattern for MvcPattern {
    fn name(&self) -> &str {
        "mvc"
    }

    fn description(&self) -> &str {
        "model exposing a data interface to views, driven by controllers"
    }

    fn tag_tree(&self, model: &dyn DesignModel, settings: &PatternSettings) -> Result<SpecTree, PatternError> {
        let pkg = settings.package.as_str();
        let data = name_or_role(model, "DataInterface");
        let model_name = name_or_role(model, "Model");

        let mut tree = SpecTree::new(self.name());
        let root = tree.root();

        let iface = tree.push_child(
            root,
            "DataInterface",
            vec![ClassElement::interface(pkg, &data)
                .with_doc("Data supplied to views.")
                .into()],
        )?;
        tree.push_child(
            iface,
            "getData",
            vec![MethodElement::declaration("getData", ClassRef::new(pkg, &data))
                .with_return("Object")
                .into()],
        )?;

        let model_node = tree.push_child(
            root,
            "Model",
            vec![ClassElement::class(pkg, &model_name)
                .with_interface(SupertypeRef::required(&data))
                .with_doc("Holds application state.")
                .into()],
        )?;
        tree.push_child(
            model_node,
            "getData",
            vec![MethodElement::implementation("getData", ClassRef::new(pkg, &model_name))
                .with_return("Object")
                .into()],
        )?;

        for view in names_or_role(model, "View") {
            let node = tree.push_child(
                root,
                format!("View:{view}"),
                vec![ClassElement::class(pkg, &view).into()],
            )?;
            tree.push_child(
                node,
                "update",
                vec![
                    MethodElement::implementation("update", ClassRef::new(pkg, &view)).into(),
                    MethodElement::invocation("getData", ClassRef::new(pkg, &data)).into(),
                ],
            )?;
        }

        for controller in names_or_role(model, "Controller") {
            let node = tree.push_child(
                root,
                format!("Controller:{controller}"),
                vec![ClassElement::class(pkg, &controller).into()],
            )?;
            tree.push_child(
                node,
                "handleRequest",
                vec![MethodElement::implementation("handleRequest", ClassRef::new(pkg, &controller)).into()],
            )?;
        }

        Ok(tree)
    }
}
