//! Pretty-printing of synthesized declarations

use crate::ast::{CompilationUnit, MethodDecl, Member, Statement, TypeDecl, TypeKind};
use crate::doc::DocComment;

const INDENT: &str = "    ";

/// Renders syntax-tree nodes back to source text
pub trait SourcePrinter: Send + Sync {
    /// Render a whole file
    fn render_unit(&self, unit: &CompilationUnit) -> String;

    /// Render a type declaration at nesting level `level`
    fn render_type(&self, decl: &TypeDecl, level: usize) -> String;

    /// Render a method at nesting level `level`
    fn render_method(&self, method: &MethodDecl, level: usize, in_interface: bool) -> String;

    /// File extension of rendered units (without dot)
    fn extension(&self) -> &str;
}

/// Java source printer
#[derive(Debug, Clone, Copy, Default)]
pub struct JavaPrinter;

impl JavaPrinter {
    /// Create a printer
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn pad(level: usize) -> String {
    INDENT.repeat(level)
}

fn render_doc(out: &mut String, doc: Option<&DocComment>, level: usize) {
    let Some(doc) = doc else { return };
    let pad = pad(level);
    for line in doc.raw().lines() {
        let line = line.trim();
        if line.starts_with('*') {
            out.push_str(&format!("{pad} {line}\n"));
        } else {
            out.push_str(&format!("{pad}{line}\n"));
        }
    }
}

fn render_statement(statement: &Statement) -> String {
    match statement {
        Statement::LocalVariable { ty, name, init } => match init {
            Some(init) => format!("{ty} {name} = {init};"),
            None => format!("{ty} {name};"),
        },
        Statement::Invocation(inv) => {
            let args = inv.arguments.join(", ");
            match &inv.receiver {
                Some(receiver) => format!("{receiver}.{}({args});", inv.name),
                None => format!("{}({args});", inv.name),
            }
        }
        Statement::Verbatim(text) => text.clone(),
    }
}

impl SourcePrinter for JavaPrinter {
    fn render_unit(&self, unit: &CompilationUnit) -> String {
        let mut out = String::new();
        if let Some(package) = &unit.package {
            out.push_str(&format!("package {package};\n\n"));
        }
        if !unit.imports.is_empty() {
            for import in &unit.imports {
                out.push_str(&format!("import {import};\n"));
            }
            out.push('\n');
        }
        let types: Vec<String> = unit.types.iter().map(|t| self.render_type(t, 0)).collect();
        out.push_str(&types.join("\n"));
        out
    }

    fn render_type(&self, decl: &TypeDecl, level: usize) -> String {
        let mut out = String::new();
        render_doc(&mut out, decl.doc.as_ref(), level);

        let mut header = String::from("public ");
        if level > 0 && decl.kind == TypeKind::Class {
            header.push_str("static ");
        }
        if decl.is_abstract && decl.kind == TypeKind::Class {
            header.push_str("abstract ");
        }
        header.push_str(&format!("{} {}", decl.kind, decl.name));

        match decl.kind {
            TypeKind::Class => {
                if let Some(superclass) = &decl.superclass {
                    header.push_str(&format!(" extends {superclass}"));
                }
                if !decl.interfaces.is_empty() {
                    header.push_str(&format!(" implements {}", decl.interfaces.join(", ")));
                }
            }
            TypeKind::Interface => {
                if !decl.interfaces.is_empty() {
                    header.push_str(&format!(" extends {}", decl.interfaces.join(", ")));
                }
            }
        }

        let pad = pad(level);
        out.push_str(&format!("{pad}{header} {{\n"));

        let in_interface = decl.kind == TypeKind::Interface;
        let members: Vec<String> = decl
            .members
            .iter()
            .map(|m| match m {
                Member::Type(nested) => self.render_type(nested, level + 1),
                Member::Method(method) => self.render_method(method, level + 1, in_interface),
            })
            .collect();
        out.push_str(&members.join("\n"));

        out.push_str(&format!("{pad}}}\n"));
        out
    }

    fn render_method(&self, method: &MethodDecl, level: usize, in_interface: bool) -> String {
        let mut out = String::new();
        render_doc(&mut out, method.doc.as_ref(), level);

        let pad = pad(level);
        let params = method
            .params
            .iter()
            .map(|p| format!("{} {}", p.ty, p.name))
            .collect::<Vec<_>>()
            .join(", ");
        let signature = format!("{} {}({params})", method.return_type, method.name);

        if in_interface {
            out.push_str(&format!("{pad}{signature};\n"));
        } else if method.is_abstract || method.body.is_none() {
            out.push_str(&format!("{pad}public abstract {signature};\n"));
        } else {
            out.push_str(&format!("{pad}public {signature} {{\n"));
            let inner = self::pad(level + 1);
            for statement in method.statements() {
                out.push_str(&format!("{inner}{}\n", render_statement(statement)));
            }
            out.push_str(&format!("{pad}}}\n"));
        }
        out
    }

    fn extension(&self) -> &str {
        "java"
    }
}
