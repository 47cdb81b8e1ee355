//! tagsync Syntax Boundary
//!
//! Declaration-level view of parsed source files and the pieces needed to
//! read and write them.
//!
//! # Overview
//!
//! - [`ast`]: compilation units, type and method declarations, and the
//!   [`SyntaxRef`] walk variant
//! - [`doc`]: `/** ... */` blocks and [`TagExtractor`] tag recovery
//! - [`parser`]: [`SourceParser`] trait, tree-sitter backed [`JavaParser`]
//! - [`printer`]: [`SourcePrinter`] trait, [`JavaPrinter`]
//! - [`edit`]: byte-offset insertions into existing text
//!
//! # Example
//!
//! ```rust
//! use tagsync_syntax::{JavaParser, SourceParser, TagExtractor};
//!
//! let unit = JavaParser::new()
//!     .parse("/** @pattern Model */\nclass Model implements DataInterface {}")
//!     .unwrap();
//! let tag = TagExtractor::default().extract(unit.types[0].doc.as_ref());
//! assert_eq!(tag.as_deref(), Some("Model"));
//! ```

#![warn(missing_docs)]

pub mod ast;
pub mod doc;
pub mod edit;
pub mod error;
pub mod parser;
pub mod printer;

pub use ast::{
    simple_type_name, Block, CompilationUnit, Invocation, Member, MethodDecl, Param, Statement,
    SyntaxRef, TypeDecl, TypeKind,
};
pub use doc::{DocComment, DocTag, TagExtractor, TagRule, DEFAULT_MARKER};
pub use edit::{apply_edits, TextEdit};
pub use error::SyntaxError;
pub use parser::{JavaParser, SourceParser};
pub use printer::{JavaPrinter, SourcePrinter};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
