//! Boundary between the engine and the parser/persistence collaborators
//!
//! Turns "traverse this file", "create this type" and "insert this member"
//! into workspace reads and writes plus parser/printer calls. Correlation
//! itself lives in [`crate::correlator`].

use crate::context::{Location, PassContext};
use crate::correlator::correlate;
use crate::error::EngineError;
use crate::ports::Workspace;
use std::path::{Path, PathBuf};
use tagsync_model::{ClassElement, ClassRef, MethodElement, MethodKind, TaggedElement};
use tagsync_syntax::{
    apply_edits, simple_type_name, Block, CompilationUnit, Invocation, JavaParser, JavaPrinter,
    Member, MethodDecl, Param, SourceParser, SourcePrinter, Statement, TagExtractor, TextEdit, TypeDecl,
    TypeKind,
};

const INDENT_WIDTH: usize = 4;

/// Parser, printer and workspace bundled for traversal and synthesis
pub struct AstEngine<'a> {
    workspace: &'a dyn Workspace,
    parser: Box<dyn SourceParser>,
    printer: Box<dyn SourcePrinter>,
    extractor: TagExtractor,
    extension: String,
}

impl std::fmt::Debug for AstEngine<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AstEngine")
            .field("extractor", &self.extractor)
            .field("extension", &self.extension)
            .finish_non_exhaustive()
    }
}

impl<'a> AstEngine<'a> {
    /// Java engine over `workspace`
    #[must_use]
    pub fn java(workspace: &'a dyn Workspace, extractor: TagExtractor) -> Self {
        Self::new(
            workspace,
            Box::new(JavaParser::new()),
            Box::new(JavaPrinter::new()),
            extractor,
        )
    }

    /// Engine with explicit collaborators
    #[must_use]
    pub fn new(
        workspace: &'a dyn Workspace,
        parser: Box<dyn SourceParser>,
        printer: Box<dyn SourcePrinter>,
        extractor: TagExtractor,
    ) -> Self {
        let extension = printer.extension().to_string();
        Self {
            workspace,
            parser,
            printer,
            extractor,
            extension,
        }
    }

    /// Use `extension` (without dot) for traversed and created files
    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Tag extractor used for traversal and synthesized documentation
    #[inline]
    #[must_use]
    pub fn extractor(&self) -> &TagExtractor {
        &self.extractor
    }

    /// Workspace collaborator
    #[inline]
    #[must_use]
    pub fn workspace(&self) -> &'a dyn Workspace {
        self.workspace
    }

    /// Whether `path` is a source file this engine handles
    #[must_use]
    pub fn handles(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| ext == self.extension)
    }

    /// Read, parse and correlate one file
    ///
    /// # Errors
    /// Returns `EngineError` if the file cannot be read or parsed; the
    /// context is left untouched in that case.
    pub fn traverse_file(&self, file: &Path, ctx: &mut PassContext<'_>) -> Result<(), EngineError> {
        let text = self.workspace.read_source(file)?;
        let unit = self.parser.parse(&text)?;
        tracing::debug!(file = %file.display(), types = unit.types.len(), mode = %ctx.mode(), "traversing");
        ctx.begin_file(file, unit.package_name());
        correlate(&unit, ctx);
        Ok(())
    }

    /// Create `Name.<ext>` for a top-level class-like tag in its package container
    ///
    /// # Errors
    /// Returns `EngineError::ExistingUntagged` when the file already declares
    /// the element, `EngineError::FileExists` when it holds something else,
    /// or an access error.
    pub fn create_type_file(
        &self,
        root: &Path,
        element: &ClassElement,
        tag: &str,
    ) -> Result<PathBuf, EngineError> {
        let container = self
            .workspace
            .find_or_create_container(root, &element.package)?;
        let file = container.join(format!("{}.{}", element.name, self.extension));

        if self.workspace.exists(&file) {
            let text = self.workspace.read_source(&file)?;
            let unit = self.parser.parse(&text)?;
            let occupied = unit
                .types
                .iter()
                .any(|decl| element.matches(&decl.name, unit.package_name()));
            return Err(if occupied {
                EngineError::ExistingUntagged {
                    file,
                    element: element.name.clone(),
                }
            } else {
                EngineError::FileExists(file)
            });
        }

        let package = (!element.package.is_empty()).then(|| element.package.clone());
        let unit = CompilationUnit {
            package,
            imports: element.imports.clone(),
            types: vec![self.type_decl(element, tag)],
        };
        let text = self.printer.render_unit(&unit);
        self.workspace.write_source(&file, &text)?;
        tracing::info!(file = %file.display(), tag, "type file created");
        Ok(file)
    }

    /// Render the elements of a tag node as a member of the type at `owner`
    ///
    /// Class elements become nested types; method elements become one
    /// method whose body realizes any invocation elements.
    ///
    /// # Errors
    /// Returns `EngineError::ExistingUntagged` when the owner already
    /// declares the member, `EngineError::NotSynthesizable` if there is
    /// nothing to render, or an access or edit error.
    pub fn insert_member(
        &self,
        owner: &Location,
        sources: &[TaggedElement],
        tag: &str,
    ) -> Result<PathBuf, EngineError> {
        let text = self.workspace.read_source(&owner.file)?;
        let unit = self.parser.parse(&text)?;
        let declared = unit.types.iter().find_map(|decl| find_type(decl, owner));

        let level = owner.column / INDENT_WIDTH + 1;
        let rendered = if let Some(class) = sources.iter().find_map(TaggedElement::as_class) {
            if declared.is_some_and(|decl| declares_type(decl, class, unit.package_name())) {
                return Err(occupied(owner, &class.name));
            }
            self.printer.render_type(&self.type_decl(class, tag), level)
        } else {
            let method = self
                .method_decl(sources, tag)
                .ok_or_else(|| EngineError::NotSynthesizable(tag.to_string()))?;
            let owner_ref = ClassRef::new(unit.package_name(), &owner.name);
            if declared.is_some_and(|decl| declares_method(decl, &method, &owner_ref)) {
                return Err(occupied(owner, &method.name));
            }
            self.printer
                .render_method(&method, level, owner.kind == TypeKind::Interface)
        };

        let edit = member_edit(&text, owner, &rendered);
        let updated = apply_edits(&text, &[edit])?;
        self.workspace.write_source(&owner.file, &updated)?;
        tracing::info!(file = %owner.file.display(), owner = %owner.name, tag, "member inserted");
        Ok(owner.file.clone())
    }

    fn type_decl(&self, element: &ClassElement, tag: &str) -> TypeDecl {
        let mut decl = TypeDecl::new(&element.name, element.kind.type_kind());
        decl.is_abstract = element.is_abstract;
        decl.superclass = element
            .superclass
            .as_ref()
            .filter(|s| !s.optional)
            .map(|s| s.name.clone());
        decl.interfaces = element
            .interfaces
            .iter()
            .filter(|i| !i.optional)
            .map(|i| i.name.clone())
            .collect();
        decl.doc = Some(self.extractor.document(tag, element.doc.as_deref()));
        decl
    }

    fn method_decl(&self, sources: &[TaggedElement], tag: &str) -> Option<MethodDecl> {
        let methods: Vec<&MethodElement> = sources.iter().filter_map(TaggedElement::as_method).collect();
        let primary = methods
            .iter()
            .find(|m| m.kind != MethodKind::Invocation)
            .or_else(|| methods.first())?;

        let mut decl = MethodDecl::new(tag_method_name(primary, tag), &primary.return_type);
        decl.params = primary
            .arg_types
            .iter()
            .enumerate()
            .map(|(i, ty)| Param::new(ty, param_name(ty, i)))
            .collect();
        decl.doc = Some(self.extractor.document(tag, primary.doc.as_deref()));

        if primary.kind != MethodKind::Declaration {
            let mut statements = Vec::new();
            for call in methods.iter().filter(|m| m.kind == MethodKind::Invocation) {
                let var = lower_first(simple_type_name(&call.owner.name));
                statements.push(Statement::LocalVariable {
                    ty: call.owner.name.clone(),
                    name: var.clone(),
                    init: Some("null".to_string()),
                });
                statements.push(Statement::Invocation(Invocation::new(Some(var), &call.name)));
            }
            if let Some(value) = default_value(&primary.return_type) {
                statements.push(Statement::Verbatim(format!("return {value};")));
            }
            decl.body = Some(Block { statements });
        }

        Some(decl)
    }
}

/// Name of the synthesized method: the caller for invocation-only nodes is the tag itself
fn tag_method_name(primary: &MethodElement, tag: &str) -> String {
    if primary.kind == MethodKind::Invocation {
        tag.to_string()
    } else {
        primary.name.clone()
    }
}

fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn param_name(ty: &str, index: usize) -> String {
    let simple = simple_type_name(ty);
    if simple.starts_with(char::is_uppercase) {
        lower_first(simple)
    } else {
        format!("arg{index}")
    }
}

fn default_value(return_type: &str) -> Option<&'static str> {
    match return_type.trim() {
        "void" => None,
        "boolean" => Some("false"),
        "byte" | "short" | "int" | "long" | "float" | "double" => Some("0"),
        "char" => Some("'\\0'"),
        _ => Some("null"),
    }
}

fn occupied(owner: &Location, member: &str) -> EngineError {
    tracing::debug!(file = %owner.file.display(), owner = %owner.name, member, "member already declared");
    EngineError::ExistingUntagged {
        file: owner.file.clone(),
        element: format!("{}.{member}", owner.name),
    }
}

/// Declaration at `owner`, searching nested types as well
fn find_type<'t>(decl: &'t TypeDecl, owner: &Location) -> Option<&'t TypeDecl> {
    if decl.name == owner.name && decl.body_close == owner.body_close {
        return Some(decl);
    }
    decl.members.iter().find_map(|member| match member {
        Member::Type(nested) => find_type(nested, owner),
        Member::Method(_) => None,
    })
}

fn declares_type(decl: &TypeDecl, class: &ClassElement, package: &str) -> bool {
    decl.members.iter().any(|member| match member {
        Member::Type(nested) => class.matches(&nested.name, package),
        Member::Method(_) => false,
    })
}

fn declares_method(decl: &TypeDecl, method: &MethodDecl, owner: &ClassRef) -> bool {
    let wanted = MethodElement::declaration(&method.name, owner.clone())
        .with_args(method.params.iter().map(|p| p.ty.clone()));
    decl.methods().any(|existing| {
        let args: Vec<&str> = existing.params.iter().map(|p| p.ty.as_str()).collect();
        wanted.matches(&existing.name, owner, &args)
    })
}

/// Insertion that places `rendered` as the last member before the closing brace
fn member_edit(text: &str, owner: &Location, rendered: &str) -> TextEdit {
    let close = owner.body_close.min(text.len());
    let line_start = text[..close].rfind('\n').map_or(0, |i| i + 1);
    let before = text[..line_start].trim_end();
    let separator = if before.ends_with('{') { "" } else { "\n" };

    if text[line_start..close].trim().is_empty() {
        TextEdit::insert(line_start, format!("{separator}{rendered}"))
    } else {
        let pad = " ".repeat(owner.column);
        TextEdit::insert(close, format!("\n{rendered}{pad}"))
    }
}
