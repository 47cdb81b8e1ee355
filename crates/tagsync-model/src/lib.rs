//! tagsync Element Model
//!
//! Describes what must exist for each tag and how real declarations are
//! compared against it.
//!
//! # Overview
//!
//! - [`element`]: [`ClassElement`], [`MethodElement`] and the [`TaggedElement`] sum
//! - [`spec_tree`]: [`SpecTree`] plus per-pass helpers (reset, visit, missing findings)
//! - [`finding`]: [`Severity`], [`Finding`] and the aggregate [`Report`]
//! - [`restriction`]: names reserved for tagged elements
//!
//! # Example
//!
//! ```rust
//! use tagsync_model::{ClassElement, FindingKind};
//! use tagsync_syntax::{CompilationUnit, TypeDecl, TypeKind};
//!
//! let expected = ClassElement::interface("app", "DataInterface");
//! let actual = TypeDecl::new("DataInterface", TypeKind::Class);
//! let unit = CompilationUnit { package: Some("app".into()), ..Default::default() };
//!
//! let findings = expected.compare(&actual, &unit, "mvc");
//! assert_eq!(findings[0].kind, FindingKind::KindMismatch);
//! ```

#![warn(missing_docs)]

pub mod element;
pub mod finding;
pub mod restriction;
pub mod spec_tree;

pub use element::{
    ClassElement, ClassKind, ClassRef, MethodElement, MethodKind, SupertypeRef, TaggedElement,
};
pub use finding::{Finding, FindingKind, Report, Severity, Status};
pub use restriction::Restrictions;
pub use spec_tree::{is_optional, missing_finding, reset_pass, visit, SpecTree};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
