//! tagsync Engine
//!
//! Reconciles a source tree with the tag tree a pattern profile builds from
//! the design model.
//!
//! # Overview
//!
//! - [`correlator`]: resolves tagged declarations onto the tag tree during one pass
//! - [`inspector`]: [`SourceInspector`] drives generate, validate and update passes
//! - [`ast_engine`]: parser and printer boundary, file creation and member insertion
//! - [`pattern`]: the [`Pattern`] trait, built-in profiles and [`PatternRegistry`]
//! - [`ports`]: workspace, design-model and progress collaborators
//! - [`fs`], [`design_model`]: filesystem workspace and YAML design model
//!
//! # Example
//!
//! ```rust,no_run
//! use tagsync_engine::{FsWorkspace, NullMonitor, PatternRegistry, SyncConfig, YamlDesignModel};
//!
//! let config = SyncConfig::default();
//! let model = YamlDesignModel::from_yaml_str("elements:\n  View: [CustomerView]\n")?;
//! let workspace = FsWorkspace::new(".");
//!
//! let registry = PatternRegistry::with_defaults();
//! let pattern = registry.resolve(&config.profile)?;
//! let report = pattern.validate(&model, &workspace, &config, &NullMonitor)?;
//! println!("{}", report.status());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]

pub mod ast_engine;
pub mod config;
pub mod context;
pub mod correlator;
pub mod design_model;
pub mod error;
pub mod fs;
pub mod inspector;
pub mod pattern;
pub mod ports;

pub use ast_engine::AstEngine;
pub use config::{SyncConfig, TagConfig};
pub use context::{Location, Mode, PassContext};
pub use design_model::{RecordedElement, RoleNames, YamlDesignModel};
pub use error::{AccessError, ConfigError, DesignModelError, EngineError, PatternError};
pub use fs::FsWorkspace;
pub use inspector::SourceInspector;
pub use pattern::{MvcPattern, ObserverPattern, Pattern, PatternRegistry, PatternSettings};
pub use ports::{CancellationToken, DesignModel, NullMonitor, ProgressMonitor, Resource, Workspace};
pub use tagsync_model::{Finding, FindingKind, Report, Severity, Status};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
