//! Tagged elements: the expected shape of a tag's source realization
//!
//! Identity ([`ClassElement::matches`], [`MethodElement::matches`]) is kept
//! apart from correctness (`compare`): a declaration that carries the right
//! tag satisfies its slot even when misshapen, and only the structural diff
//! reports what is wrong with it.

use crate::finding::{Finding, FindingKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use tagsync_syntax::{simple_type_name, CompilationUnit, MethodDecl, Statement, SyntaxRef, TypeDecl, TypeKind};

/// Expected kind of a class-like element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassKind {
    /// Value type
    Class,
    /// Interface
    Interface,
}

impl ClassKind {
    /// Whether a parsed declaration kind realizes this kind
    #[inline]
    #[must_use]
    pub fn accepts(self, kind: TypeKind) -> bool {
        matches!(
            (self, kind),
            (ClassKind::Class, TypeKind::Class) | (ClassKind::Interface, TypeKind::Interface)
        )
    }

    /// Declaration kind used when synthesizing this element
    #[inline]
    #[must_use]
    pub fn type_kind(self) -> TypeKind {
        match self {
            ClassKind::Class => TypeKind::Class,
            ClassKind::Interface => TypeKind::Interface,
        }
    }
}

impl fmt::Display for ClassKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassKind::Class => write!(f, "class"),
            ClassKind::Interface => write!(f, "interface"),
        }
    }
}

/// Required superclass or interface
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SupertypeRef {
    pub name: String,
    /// Absence is not reported
    #[serde(default)]
    pub optional: bool,
}

impl SupertypeRef {
    /// Required supertype
    #[must_use]
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            optional: false,
        }
    }

    /// Optional supertype
    #[must_use]
    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            optional: true,
        }
    }
}

/// Reference to an owning class-like element
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ClassRef {
    pub package: String,
    pub name: String,
}

impl ClassRef {
    /// Create a reference
    #[must_use]
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.package.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}.{}", self.package, self.name)
        }
    }
}

/// Expected class or interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassElement {
    pub package: String,
    pub name: String,
    pub kind: ClassKind,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub superclass: Option<SupertypeRef>,
    #[serde(default)]
    pub interfaces: Vec<SupertypeRef>,
    #[serde(default)]
    pub imports: Vec<String>,
    /// Summary line written into synthesized documentation
    #[serde(default)]
    pub doc: Option<String>,
    #[serde(skip)]
    pub visited: bool,
    #[serde(default)]
    pub optional: bool,
}

impl ClassElement {
    fn with_kind(package: impl Into<String>, name: impl Into<String>, kind: ClassKind) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
            kind,
            is_abstract: false,
            superclass: None,
            interfaces: Vec::new(),
            imports: Vec::new(),
            doc: None,
            visited: false,
            optional: false,
        }
    }

    /// Expected class
    #[must_use]
    pub fn class(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self::with_kind(package, name, ClassKind::Class)
    }

    /// Expected interface
    #[must_use]
    pub fn interface(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self::with_kind(package, name, ClassKind::Interface)
    }

    /// Require a superclass
    #[must_use]
    pub fn with_superclass(mut self, superclass: SupertypeRef) -> Self {
        self.superclass = Some(superclass);
        self
    }

    /// Require an interface
    #[must_use]
    pub fn with_interface(mut self, interface: SupertypeRef) -> Self {
        self.interfaces.push(interface);
        self
    }

    /// Require an import
    #[must_use]
    pub fn with_import(mut self, import: impl Into<String>) -> Self {
        self.imports.push(import.into());
        self
    }

    /// Set the documentation summary
    #[must_use]
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Mark abstract
    #[must_use]
    pub fn with_abstract(mut self, is_abstract: bool) -> Self {
        self.is_abstract = is_abstract;
        self
    }

    /// Mark optional
    #[must_use]
    pub fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    /// Reference to this element as an owner
    #[must_use]
    pub fn class_ref(&self) -> ClassRef {
        ClassRef::new(&self.package, &self.name)
    }

    /// Whether a declaration named `name` in `package` is meant to realize this element
    #[must_use]
    pub fn matches(&self, name: &str, package: &str) -> bool {
        simple_type_name(name) == self.name && package == self.package
    }

    /// Structural diff against a declaration found in `unit`
    #[must_use]
    pub fn compare(&self, decl: &TypeDecl, unit: &CompilationUnit, pattern: &str) -> Vec<Finding> {
        let mut findings = Vec::new();
        let mut push = |kind, message: String| {
            findings.push(Finding::new(kind, pattern, &decl.name, message));
        };

        if !self.kind.accepts(decl.kind) {
            push(
                FindingKind::KindMismatch,
                format!("is declared as {} but should be {}", decl.kind, article(self.kind)),
            );
        }

        if let Some(superclass) = &self.superclass {
            if !superclass.optional && !decl.extends(&superclass.name) {
                push(
                    FindingKind::MissingSuperclass,
                    format!("should extend {}", superclass.name),
                );
            }
        }

        for interface in self.interfaces.iter().filter(|i| !i.optional) {
            if !decl.implements(&interface.name) {
                let verb = match decl.kind {
                    TypeKind::Class => "implement",
                    TypeKind::Interface => "extend",
                };
                push(
                    FindingKind::MissingInterface,
                    format!("should {verb} {}", interface.name),
                );
            }
        }

        if unit.package_name() != self.package {
            push(
                FindingKind::PackageMismatch,
                format!(
                    "is in package '{}' but should be in '{}'",
                    unit.package_name(),
                    self.package
                ),
            );
        }

        for import in &self.imports {
            if !unit.imports_name(import) {
                push(FindingKind::MissingImport, format!("should import {import}"));
            }
        }

        findings
    }
}

fn article(kind: ClassKind) -> &'static str {
    match kind {
        ClassKind::Class => "a class",
        ClassKind::Interface => "an interface",
    }
}

/// Expected kind of a method-like element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodKind {
    /// Bodiless declaration
    Declaration,
    /// Method with a body
    Implementation,
    /// Call to `name` on a local of the owner type, inside the tagged method
    Invocation,
}

impl fmt::Display for MethodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodKind::Declaration => write!(f, "declaration"),
            MethodKind::Implementation => write!(f, "implementation"),
            MethodKind::Invocation => write!(f, "invocation"),
        }
    }
}

/// Expected method, or expected call for [`MethodKind::Invocation`]
///
/// For invocations `name` is the invoked method and `owner` the receiver
/// type; the calling method is described by a sibling element on the same
/// tag node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodElement {
    pub name: String,
    pub kind: MethodKind,
    pub owner: ClassRef,
    #[serde(default)]
    pub arg_types: Vec<String>,
    #[serde(default = "default_return_type")]
    pub return_type: String,
    #[serde(default)]
    pub doc: Option<String>,
    #[serde(skip)]
    pub visited: bool,
    #[serde(default)]
    pub optional: bool,
}

fn default_return_type() -> String {
    "void".to_string()
}

impl MethodElement {
    /// Create a method element returning `void`
    #[must_use]
    pub fn new(name: impl Into<String>, kind: MethodKind, owner: ClassRef) -> Self {
        Self {
            name: name.into(),
            kind,
            owner,
            arg_types: Vec::new(),
            return_type: default_return_type(),
            doc: None,
            visited: false,
            optional: false,
        }
    }

    /// Bodiless declaration in `owner`
    #[must_use]
    pub fn declaration(name: impl Into<String>, owner: ClassRef) -> Self {
        Self::new(name, MethodKind::Declaration, owner)
    }

    /// Implementation in `owner`
    #[must_use]
    pub fn implementation(name: impl Into<String>, owner: ClassRef) -> Self {
        Self::new(name, MethodKind::Implementation, owner)
    }

    /// Call of `name` on a local of type `receiver`
    #[must_use]
    pub fn invocation(name: impl Into<String>, receiver: ClassRef) -> Self {
        Self::new(name, MethodKind::Invocation, receiver)
    }

    /// Set argument types
    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arg_types = args.into_iter().map(Into::into).collect();
        self
    }

    /// Set the return type
    #[must_use]
    pub fn with_return(mut self, return_type: impl Into<String>) -> Self {
        self.return_type = return_type.into();
        self
    }

    /// Set the documentation summary
    #[must_use]
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Mark optional
    #[must_use]
    pub fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    /// Whether a method `name(arg_types)` declared in `owner` is meant to realize this element
    #[must_use]
    pub fn matches(&self, name: &str, owner: &ClassRef, arg_types: &[&str]) -> bool {
        self.name == name
            && simple_type_name(&self.owner.name) == simple_type_name(&owner.name)
            && self.arg_types.len() == arg_types.len()
            && self
                .arg_types
                .iter()
                .zip(arg_types)
                .all(|(expected, actual)| simple_type_name(expected) == simple_type_name(actual))
    }

    /// Structural diff against a method declaration
    ///
    /// Declarations and implementations are satisfied by the tag match
    /// alone; invocations need a local of the receiver type that is then
    /// used to call `name`.
    #[must_use]
    pub fn compare(&self, decl: &MethodDecl, pattern: &str) -> Vec<Finding> {
        if self.kind != MethodKind::Invocation || self.has_invocation(decl) {
            return Vec::new();
        }
        vec![Finding::new(
            FindingKind::MissingInvocation,
            pattern,
            &decl.name,
            format!("missing invocation of {}.{}()", self.owner.name, self.name),
        )]
    }

    fn has_invocation(&self, decl: &MethodDecl) -> bool {
        let receiver_type = simple_type_name(&self.owner.name);
        let mut locals: Vec<&str> = Vec::new();
        for statement in decl.statements() {
            match statement {
                Statement::LocalVariable { ty, name, .. } if simple_type_name(ty) == receiver_type => {
                    locals.push(name);
                }
                Statement::Invocation(inv) if inv.name == self.name => {
                    if inv
                        .receiver
                        .as_deref()
                        .is_some_and(|r| locals.contains(&r.trim()))
                    {
                        return true;
                    }
                }
                _ => {}
            }
        }
        false
    }
}

/// Element descriptor stored on a tag node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "element", rename_all = "snake_case")]
pub enum TaggedElement {
    /// Class-like element
    Class(ClassElement),
    /// Method-like element
    Method(MethodElement),
}

impl TaggedElement {
    /// Element name
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            TaggedElement::Class(c) => &c.name,
            TaggedElement::Method(m) => &m.name,
        }
    }

    /// Whether absence of this element goes unreported
    #[must_use]
    pub fn is_optional(&self) -> bool {
        match self {
            TaggedElement::Class(c) => c.optional,
            TaggedElement::Method(m) => m.optional,
        }
    }

    /// Visitation flag
    #[must_use]
    pub fn is_visited(&self) -> bool {
        match self {
            TaggedElement::Class(c) => c.visited,
            TaggedElement::Method(m) => m.visited,
        }
    }

    /// Set the visitation flag
    pub fn set_visited(&mut self, visited: bool) {
        match self {
            TaggedElement::Class(c) => c.visited = visited,
            TaggedElement::Method(m) => m.visited = visited,
        }
    }

    /// Class element, if this is one
    #[must_use]
    pub fn as_class(&self) -> Option<&ClassElement> {
        match self {
            TaggedElement::Class(c) => Some(c),
            TaggedElement::Method(_) => None,
        }
    }

    /// Method element, if this is one
    #[must_use]
    pub fn as_method(&self) -> Option<&MethodElement> {
        match self {
            TaggedElement::Method(m) => Some(m),
            TaggedElement::Class(_) => None,
        }
    }

    /// Structural diff against the declaration that resolved this element's tag
    #[must_use]
    pub fn compare(&self, decl: SyntaxRef<'_>, unit: &CompilationUnit, pattern: &str) -> Vec<Finding> {
        match (self, decl) {
            (TaggedElement::Class(expected), SyntaxRef::Type(actual)) => {
                expected.compare(actual, unit, pattern)
            }
            (TaggedElement::Method(expected), SyntaxRef::Method(actual)) => {
                expected.compare(actual, pattern)
            }
            (TaggedElement::Class(expected), SyntaxRef::Method(actual)) => vec![Finding::new(
                FindingKind::ElementMismatch,
                pattern,
                &actual.name,
                format!("is a method but should be the {} {}", expected.kind, expected.name),
            )],
            (TaggedElement::Method(expected), SyntaxRef::Type(actual)) => vec![Finding::new(
                FindingKind::ElementMismatch,
                pattern,
                &actual.name,
                format!("is a {} but should be the method {}", actual.kind, expected.name),
            )],
            (_, SyntaxRef::Invocation(_)) => Vec::new(),
        }
    }
}

impl From<ClassElement> for TaggedElement {
    fn from(element: ClassElement) -> Self {
        TaggedElement::Class(element)
    }
}

impl From<MethodElement> for TaggedElement {
    fn from(element: MethodElement) -> Self {
        TaggedElement::Method(element)
    }
}
