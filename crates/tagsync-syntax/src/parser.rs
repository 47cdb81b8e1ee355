//! Source parsers
//!
//! [`SourceParser`] is the seam the engine traverses through; [`JavaParser`]
//! is the tree-sitter backed implementation for Java sources.

use crate::ast::{
    Block, CompilationUnit, Invocation, Member, MethodDecl, Param, Statement, TypeDecl, TypeKind,
};
use crate::doc::DocComment;
use crate::error::SyntaxError;
use std::path::Path;
use tree_sitter::Node;

/// Parser trait for turning source text into a [`CompilationUnit`]
pub trait SourceParser: Send + Sync {
    /// Parse source text
    ///
    /// # Errors
    /// Returns `SyntaxError` only when no tree can be produced at all;
    /// recoverable syntax errors still yield a unit.
    fn parse(&self, text: &str) -> Result<CompilationUnit, SyntaxError>;

    /// Supported file extensions (without dot)
    fn extensions(&self) -> &[&str];

    /// Check if this parser handles `path`
    fn can_parse(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions().contains(&ext))
    }
}

/// Java parser backed by tree-sitter-java
#[derive(Debug, Clone, Copy, Default)]
pub struct JavaParser;

impl JavaParser {
    /// Create a parser
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl SourceParser for JavaParser {
    fn parse(&self, text: &str) -> Result<CompilationUnit, SyntaxError> {
        let language: tree_sitter::Language = tree_sitter_java::LANGUAGE.into();

        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&language)
            .map_err(|e| SyntaxError::ParserInit(e.to_string()))?;

        let tree = parser.parse(text, None).ok_or(SyntaxError::ParseFailed)?;
        let root = tree.root_node();
        if root.has_error() {
            tracing::debug!("source contains syntax errors; using recovered tree");
        }

        Ok(build_unit(root, text))
    }

    fn extensions(&self) -> &[&str] {
        &["java"]
    }
}

fn text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

fn children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    (0..node.child_count())
        .filter_map(|i| node.child(i))
        .collect()
}

fn named_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    children(node).into_iter().filter(Node::is_named).collect()
}

fn field_text(node: Node<'_>, field: &str, source: &str) -> Option<String> {
    node.child_by_field_name(field)
        .map(|n| text(n, source).to_string())
}

fn build_unit(root: Node<'_>, source: &str) -> CompilationUnit {
    let mut unit = CompilationUnit::default();

    for child in children(root) {
        match child.kind() {
            "package_declaration" => {
                unit.package = named_children(child)
                    .into_iter()
                    .find(|n| matches!(n.kind(), "scoped_identifier" | "identifier"))
                    .map(|n| text(n, source).to_string());
            }
            "import_declaration" => unit.imports.push(import_name(text(child, source))),
            "class_declaration" | "interface_declaration" => {
                if let Some(decl) = type_decl(child, source) {
                    unit.types.push(decl);
                }
            }
            _ => {}
        }
    }

    unit
}

fn import_name(raw: &str) -> String {
    let raw = raw.trim();
    let name = raw.strip_prefix("import").unwrap_or(raw).trim_end_matches(';').trim();
    let name = name.strip_prefix("static ").unwrap_or(name);
    name.chars().filter(|c| !c.is_whitespace()).collect()
}

fn has_modifier(node: Node<'_>, keyword: &str) -> bool {
    children(node)
        .into_iter()
        .filter(|c| c.kind() == "modifiers")
        .any(|m| children(m).iter().any(|k| k.kind() == keyword))
}

/// Leading `/** ... */` block, skipping line comments in between
fn doc_comment(node: Node<'_>, source: &str) -> Option<DocComment> {
    let mut prev = node.prev_sibling();
    while let Some(p) = prev {
        match p.kind() {
            "line_comment" => prev = p.prev_sibling(),
            "block_comment" => {
                let raw = text(p, source);
                return raw.starts_with("/**").then(|| DocComment::parse(raw));
            }
            _ => return None,
        }
    }
    None
}

fn type_list(node: Node<'_>, source: &str) -> Vec<String> {
    named_children(node)
        .into_iter()
        .filter(|n| n.kind() == "type_list")
        .flat_map(named_children)
        .map(|t| text(t, source).to_string())
        .collect()
}

fn type_decl(node: Node<'_>, source: &str) -> Option<TypeDecl> {
    let name = field_text(node, "name", source)?;
    let kind = if node.kind() == "interface_declaration" {
        TypeKind::Interface
    } else {
        TypeKind::Class
    };

    let superclass = node.child_by_field_name("superclass").and_then(|s| {
        named_children(s)
            .first()
            .map(|t| text(*t, source).to_string())
    });

    let interfaces = match kind {
        TypeKind::Class => node
            .child_by_field_name("interfaces")
            .map(|i| type_list(i, source))
            .unwrap_or_default(),
        TypeKind::Interface => children(node)
            .into_iter()
            .filter(|c| c.kind() == "extends_interfaces")
            .flat_map(|c| type_list(c, source))
            .collect(),
    };

    let mut members = Vec::new();
    let mut body_close = node.end_byte();
    if let Some(body) = node.child_by_field_name("body") {
        let end = body.end_byte();
        body_close = if end > 0 && source.as_bytes().get(end - 1) == Some(&b'}') {
            end - 1
        } else {
            end
        };

        for member in children(body) {
            match member.kind() {
                "method_declaration" => {
                    if let Some(method) = method_decl(member, source) {
                        members.push(Member::Method(method));
                    }
                }
                "class_declaration" | "interface_declaration" => {
                    if let Some(nested) = type_decl(member, source) {
                        members.push(Member::Type(nested));
                    }
                }
                _ => {}
            }
        }
    }

    Some(TypeDecl {
        name,
        kind,
        is_abstract: has_modifier(node, "abstract"),
        superclass,
        interfaces,
        doc: doc_comment(node, source),
        members,
        span: node.byte_range(),
        body_close,
        column: node.start_position().column,
    })
}

fn method_decl(node: Node<'_>, source: &str) -> Option<MethodDecl> {
    let name = field_text(node, "name", source)?;
    let return_type = field_text(node, "type", source).unwrap_or_else(|| "void".to_string());

    let params = node
        .child_by_field_name("parameters")
        .map(|p| parameters(p, source))
        .unwrap_or_default();

    let body = node.child_by_field_name("body").map(|b| {
        let mut statements = Vec::new();
        flatten(b, source, &mut statements);
        Block { statements }
    });

    Some(MethodDecl {
        name,
        return_type,
        params,
        is_abstract: has_modifier(node, "abstract"),
        doc: doc_comment(node, source),
        body,
        span: node.byte_range(),
        column: node.start_position().column,
    })
}

fn parameters(node: Node<'_>, source: &str) -> Vec<Param> {
    named_children(node)
        .into_iter()
        .filter_map(|p| match p.kind() {
            "formal_parameter" => Some(Param::new(
                field_text(p, "type", source)?,
                field_text(p, "name", source)?,
            )),
            "spread_parameter" => {
                let parts = named_children(p);
                let ty = parts
                    .iter()
                    .find(|n| !matches!(n.kind(), "modifiers" | "variable_declarator"))?;
                let declarator = parts.iter().find(|n| n.kind() == "variable_declarator")?;
                Some(Param::new(
                    format!("{}...", text(*ty, source)),
                    field_text(*declarator, "name", source)?,
                ))
            }
            _ => None,
        })
        .collect()
}

/// Collect locals and invocations in pre-order
fn flatten(node: Node<'_>, source: &str, out: &mut Vec<Statement>) {
    match node.kind() {
        // Local types have their own members; they are not part of this body
        "class_declaration" | "interface_declaration" => return,
        "local_variable_declaration" => {
            let ty = field_text(node, "type", source).unwrap_or_default();
            for declarator in children(node)
                .into_iter()
                .filter(|c| c.kind() == "variable_declarator")
            {
                if let Some(name) = field_text(declarator, "name", source) {
                    out.push(Statement::LocalVariable {
                        ty: ty.clone(),
                        name,
                        init: field_text(declarator, "value", source),
                    });
                }
            }
        }
        "method_invocation" => {
            if let Some(name) = field_text(node, "name", source) {
                let arguments = node
                    .child_by_field_name("arguments")
                    .map(|args| {
                        named_children(args)
                            .into_iter()
                            .map(|a| text(a, source).to_string())
                            .collect()
                    })
                    .unwrap_or_default();
                out.push(Statement::Invocation(Invocation {
                    receiver: field_text(node, "object", source),
                    name,
                    arguments,
                    span: node.byte_range(),
                }));
            }
        }
        _ => {}
    }

    for child in children(node) {
        flatten(child, source, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc::TagExtractor;
    use pretty_assertions::assert_eq;

    const VIEW: &str = r#"package app.ui;

import java.util.List;
import app.model.*;

/**
 * Renders customer data.
 *
 * @pattern View
 */
public class CustomerView extends BaseView implements Observer, Comparable<CustomerView> {
    // refreshed on every change
    /**
     * @pattern update
     */
    public void update(String reason, int count) {
        DataInterface data = locate();
        data.getData(format(reason));
    }

    private DataInterface locate() { return null; }

    static abstract class Inner {
        abstract void hidden();
    }
}
"#;

    #[test]
    fn parses_package_imports_and_type_header() {
        let unit = JavaParser::new().parse(VIEW).unwrap();
        assert_eq!(unit.package.as_deref(), Some("app.ui"));
        assert_eq!(unit.imports, vec!["java.util.List".to_string(), "app.model.*".to_string()]);
        assert_eq!(unit.types.len(), 1);

        let view = &unit.types[0];
        assert_eq!(view.name, "CustomerView");
        assert_eq!(view.kind, TypeKind::Class);
        assert_eq!(view.superclass.as_deref(), Some("BaseView"));
        assert!(view.implements("Observer"));
        assert!(view.implements("Comparable"));
        assert_eq!(&VIEW[view.body_close..=view.body_close], "}");
    }

    #[test]
    fn extracts_tags_from_leading_doc_blocks() {
        let unit = JavaParser::new().parse(VIEW).unwrap();
        let extractor = TagExtractor::default();
        let view = &unit.types[0];
        assert_eq!(extractor.extract(view.doc.as_ref()).as_deref(), Some("View"));

        let methods: Vec<_> = view.methods().collect();
        assert_eq!(methods.len(), 2);
        assert_eq!(extractor.extract(methods[0].doc.as_ref()).as_deref(), Some("update"));
        assert_eq!(extractor.extract(methods[1].doc.as_ref()), None);
    }

    #[test]
    fn flattens_body_locals_and_invocations() {
        let unit = JavaParser::new().parse(VIEW).unwrap();
        let update = unit.types[0].methods().next().unwrap();
        assert_eq!(update.param_types(), vec!["String", "int"]);

        let statements = update.statements();
        assert!(matches!(
            &statements[0],
            Statement::LocalVariable { ty, name, .. } if ty == "DataInterface" && name == "data"
        ));
        let calls: Vec<_> = update.invocations().map(|i| i.name.as_str()).collect();
        assert_eq!(calls, vec!["locate", "getData", "format"]);

        let get_data = update.invocations().nth(1).unwrap();
        assert_eq!(get_data.receiver.as_deref(), Some("data"));
    }

    #[test]
    fn nested_types_and_abstract_modifier() {
        let unit = JavaParser::new().parse(VIEW).unwrap();
        let nested = unit.types[0]
            .members
            .iter()
            .find_map(|m| match m {
                Member::Type(t) => Some(t),
                Member::Method(_) => None,
            })
            .unwrap();
        assert_eq!(nested.name, "Inner");
        assert!(nested.is_abstract);
        let hidden = nested.methods().next().unwrap();
        assert!(hidden.is_abstract);
        assert!(hidden.body.is_none());
    }

    #[test]
    fn interface_extends_list() {
        let unit = JavaParser::new()
            .parse("interface Sub extends Base, java.io.Serializable { void m(); }")
            .unwrap();
        let sub = &unit.types[0];
        assert_eq!(sub.kind, TypeKind::Interface);
        assert!(sub.implements("Base"));
        assert!(sub.implements("Serializable"));
        assert!(unit.package.is_none());
    }

    #[test]
    fn broken_source_still_parses() {
        let unit = JavaParser::new()
            .parse("class Broken { void m() { int x = ; } }")
            .unwrap();
        assert_eq!(unit.types.len(), 1);
        assert_eq!(unit.types[0].name, "Broken");
    }

    #[test]
    fn can_parse_by_extension() {
        let parser = JavaParser::new();
        assert!(parser.can_parse(Path::new("src/app/Model.java")));
        assert!(!parser.can_parse(Path::new("src/app/model.rs")));
        assert!(!parser.can_parse(Path::new("Makefile")));
    }
}
