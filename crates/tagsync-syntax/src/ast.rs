//! Declaration-level syntax tree
//!
//! Only the shapes reconciliation cares about are kept: type-like and
//! method-like declarations with their documentation, and the local
//! variables and invocations found in method bodies.

use crate::doc::DocComment;
use std::ops::Range;

/// One parsed source file
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompilationUnit {
    /// Declared package, `None` for the default package
    pub package: Option<String>,
    /// Imported names as written (`java.util.List`, `java.util.*`)
    pub imports: Vec<String>,
    /// Top-level type declarations in source order
    pub types: Vec<TypeDecl>,
}

impl CompilationUnit {
    /// Package name, empty for the default package
    #[inline]
    #[must_use]
    pub fn package_name(&self) -> &str {
        self.package.as_deref().unwrap_or("")
    }

    /// Whether `name` is imported, directly or through a wildcard
    #[must_use]
    pub fn imports_name(&self, name: &str) -> bool {
        self.imports.iter().any(|import| {
            import == name
                || import.strip_suffix(".*").is_some_and(|prefix| {
                    name.rsplit_once('.').is_some_and(|(pkg, _)| pkg == prefix)
                })
        })
    }

    /// Top-level types as walk roots
    pub fn roots(&self) -> impl Iterator<Item = SyntaxRef<'_>> {
        self.types.iter().map(SyntaxRef::Type)
    }
}

/// Class-like declaration kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    /// Concrete or abstract class
    Class,
    /// Interface
    Interface,
}

impl std::fmt::Display for TypeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeKind::Class => write!(f, "class"),
            TypeKind::Interface => write!(f, "interface"),
        }
    }
}

/// Class or interface declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    pub name: String,
    pub kind: TypeKind,
    pub is_abstract: bool,
    pub superclass: Option<String>,
    /// Implemented interfaces for classes, extended interfaces for interfaces
    pub interfaces: Vec<String>,
    pub doc: Option<DocComment>,
    pub members: Vec<Member>,
    /// Byte range of the whole declaration, doc comment excluded
    pub span: Range<usize>,
    /// Byte offset of the closing brace of the body
    pub body_close: usize,
    /// Column the declaration starts at
    pub column: usize,
}

impl TypeDecl {
    /// Create an empty declaration, as used by synthesis
    #[must_use]
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            is_abstract: false,
            superclass: None,
            interfaces: Vec::new(),
            doc: None,
            members: Vec::new(),
            span: 0..0,
            body_close: 0,
            column: 0,
        }
    }

    /// Whether `name` appears among the implemented/extended interfaces
    #[must_use]
    pub fn implements(&self, name: &str) -> bool {
        let wanted = simple_type_name(name);
        self.interfaces
            .iter()
            .any(|i| simple_type_name(i) == wanted)
    }

    /// Whether the superclass is `name`
    #[must_use]
    pub fn extends(&self, name: &str) -> bool {
        self.superclass
            .as_deref()
            .is_some_and(|s| simple_type_name(s) == simple_type_name(name))
    }

    /// Methods declared directly in this type
    pub fn methods(&self) -> impl Iterator<Item = &MethodDecl> {
        self.members.iter().filter_map(|m| match m {
            Member::Method(method) => Some(method),
            Member::Type(_) => None,
        })
    }
}

/// Member of a type body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Member {
    /// Nested class or interface
    Type(TypeDecl),
    /// Method
    Method(MethodDecl),
}

/// Method declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDecl {
    pub name: String,
    pub return_type: String,
    pub params: Vec<Param>,
    pub is_abstract: bool,
    pub doc: Option<DocComment>,
    /// `None` for bodiless declarations
    pub body: Option<Block>,
    pub span: Range<usize>,
    pub column: usize,
}

impl MethodDecl {
    /// Create a bodiless method, as used by synthesis
    #[must_use]
    pub fn new(name: impl Into<String>, return_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            return_type: return_type.into(),
            params: Vec::new(),
            is_abstract: false,
            doc: None,
            body: None,
            span: 0..0,
            column: 0,
        }
    }

    /// Parameter types by simple name
    #[must_use]
    pub fn param_types(&self) -> Vec<&str> {
        self.params.iter().map(|p| simple_type_name(&p.ty)).collect()
    }

    /// Statements of the body, empty when there is none
    #[must_use]
    pub fn statements(&self) -> &[Statement] {
        self.body
            .as_ref()
            .map_or(&[][..], |b| b.statements.as_slice())
    }

    /// Invocations in body order
    pub fn invocations(&self) -> impl Iterator<Item = &Invocation> {
        self.statements().iter().filter_map(|s| match s {
            Statement::Invocation(inv) => Some(inv),
            _ => None,
        })
    }
}

/// Formal parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub ty: String,
    pub name: String,
}

impl Param {
    /// Create a parameter
    #[must_use]
    pub fn new(ty: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            ty: ty.into(),
            name: name.into(),
        }
    }
}

/// Method body flattened to the statements reconciliation inspects
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Block {
    pub statements: Vec<Statement>,
}

/// Flattened body statement, in source order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// Local variable declaration
    LocalVariable {
        ty: String,
        name: String,
        init: Option<String>,
    },
    /// Method call anywhere in the body, nested calls included
    Invocation(Invocation),
    /// Raw statement text; only produced by synthesis
    Verbatim(String),
}

/// Method invocation expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Receiver expression text, `None` for unqualified calls
    pub receiver: Option<String>,
    pub name: String,
    pub arguments: Vec<String>,
    pub span: Range<usize>,
}

impl Invocation {
    /// Create an invocation, as used by synthesis
    #[must_use]
    pub fn new(receiver: Option<String>, name: impl Into<String>) -> Self {
        Self {
            receiver,
            name: name.into(),
            arguments: Vec::new(),
            span: 0..0,
        }
    }
}

/// Walk variant over the closed set of nodes the correlator visits
#[derive(Debug, Clone, Copy)]
pub enum SyntaxRef<'a> {
    /// Type-like declaration
    Type(&'a TypeDecl),
    /// Method-like declaration
    Method(&'a MethodDecl),
    /// Invocation expression; always a leaf
    Invocation(&'a Invocation),
}

impl<'a> SyntaxRef<'a> {
    /// Declared or invoked name
    #[must_use]
    pub fn name(&self) -> &'a str {
        match *self {
            SyntaxRef::Type(t) => &t.name,
            SyntaxRef::Method(m) => &m.name,
            SyntaxRef::Invocation(i) => &i.name,
        }
    }

    /// Documentation block, invocations have none
    #[must_use]
    pub fn doc(&self) -> Option<&'a DocComment> {
        match *self {
            SyntaxRef::Type(t) => t.doc.as_ref(),
            SyntaxRef::Method(m) => m.doc.as_ref(),
            SyntaxRef::Invocation(_) => None,
        }
    }

    /// Children in pre-order walk order
    #[must_use]
    pub fn children(&self) -> Vec<SyntaxRef<'a>> {
        match *self {
            SyntaxRef::Type(t) => t
                .members
                .iter()
                .map(|m| match m {
                    Member::Type(nested) => SyntaxRef::Type(nested),
                    Member::Method(method) => SyntaxRef::Method(method),
                })
                .collect(),
            SyntaxRef::Method(m) => m.invocations().map(SyntaxRef::Invocation).collect(),
            SyntaxRef::Invocation(_) => Vec::new(),
        }
    }
}

/// Simple name of a type reference
///
/// Drops generic arguments, array or varargs suffixes and the package qualifier:
/// `java.util.List<String>` becomes `List`.
#[must_use]
pub fn simple_type_name(ty: &str) -> &str {
    let base = ty.split('<').next().unwrap_or(ty);
    let base = base.trim_end_matches("[]").trim_end_matches("...").trim();
    base.rsplit('.').next().unwrap_or(base)
}
