//! Error types for the engine
//!
//! None of these abort a pass: access failures skip a subtree and
//! synthesis failures become findings. `Err` reaches callers only from
//! setup (configuration, design model, pattern construction).

use std::path::{Path, PathBuf};
use tagsync_syntax::SyntaxError;
use tagsync_tree::TreeError;

/// Container or file access failure
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    /// I/O failure on a path
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Resource does not exist
    #[error("'{0}' not found")]
    NotFound(PathBuf),

    /// Resource exists but may not be read or written
    #[error("access to '{0}' denied")]
    Denied(PathBuf),
}

impl AccessError {
    /// Wrap an I/O error for `path`
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            return Self::NotFound(path.as_ref().to_path_buf());
        }
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

/// Design-model reader or sink failure
#[derive(Debug, thiserror::Error)]
pub enum DesignModelError {
    /// I/O failure on the model file
    #[error("design model I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed YAML
    #[error("design model YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Model was not loaded from a file and cannot be saved in place
    #[error("design model has no backing file")]
    NoPath,

    /// Sink refused the element
    #[error("element rejected: {0}")]
    Rejected(String),
}

/// Configuration loading failure
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file unreadable
    #[error("cannot read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed TOML
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),

    /// Well-formed but unusable value
    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Pattern lookup or tag-tree construction failure
#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    /// No pattern registered under the profile name
    #[error("unknown pattern profile '{0}'")]
    UnknownProfile(String),

    /// Tag tree could not be assembled
    #[error("tag tree construction failed: {0}")]
    Tree(#[from] TreeError),

    /// Design model could not be read
    #[error(transparent)]
    DesignModel(#[from] DesignModelError),
}

/// Failure of a single file traversal or synthesis step
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Workspace access failed
    #[error(transparent)]
    Access(#[from] AccessError),

    /// Source could not be parsed or edited
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// An untagged declaration already occupies the target file
    #[error("'{file}' already declares {element} without its tag")]
    ExistingUntagged { file: PathBuf, element: String },

    /// Target file exists with unrelated content
    #[error("'{0}' already exists")]
    FileExists(PathBuf),

    /// Owner of a member was never located in source
    #[error("no source location known for '{0}'")]
    MissingLocation(String),

    /// Node carries nothing that can be rendered
    #[error("tag '{0}' has no element that can be synthesized")]
    NotSynthesizable(String),
}

impl EngineError {
    /// Whether the failure is an untagged declaration blocking synthesis
    #[inline]
    #[must_use]
    pub fn is_existing_untagged(&self) -> bool {
        matches!(self, EngineError::ExistingUntagged { .. })
    }
}
