//! Run configuration
//!
//! Loaded from TOML:
//!
//! ```toml
//! profile = "mvc"
//! source_root = "src"
//! package = "app"
//! design_model = "design.yaml"
//!
//! [tags]
//! marker = "@pattern"
//! rule = { strip_leading = 1 }
//! ```

use crate::error::ConfigError;
use crate::pattern::PatternSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tagsync_syntax::{TagExtractor, TagRule, DEFAULT_MARKER};

/// Tag recovery settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagConfig {
    /// Block-tag marker
    pub marker: String,
    /// Recovery rule applied to each fragment
    pub rule: TagRule,
}

impl Default for TagConfig {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER.to_string(),
            rule: TagRule::default(),
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Pattern profile name
    pub profile: String,
    /// Root container of the source tree
    pub source_root: PathBuf,
    /// Package synthesized types are placed in
    pub package: String,
    /// Extension of source files (without dot)
    pub extension: String,
    /// YAML design model
    pub design_model: Option<PathBuf>,
    /// Tag recovery
    pub tags: TagConfig,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            profile: "mvc".to_string(),
            source_root: PathBuf::from("src"),
            package: "app".to_string(),
            extension: "java".to_string(),
            design_model: None,
            tags: TagConfig::default(),
        }
    }
}

impl SyncConfig {
    /// Parse TOML text
    ///
    /// # Errors
    /// Returns `ConfigError` on malformed TOML or unusable values.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML file
    ///
    /// # Errors
    /// Returns `ConfigError` if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loading config");
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.profile.trim().is_empty() {
            return Err(ConfigError::Invalid("profile must not be empty".into()));
        }
        if self.extension.trim().is_empty() || self.extension.starts_with('.') {
            return Err(ConfigError::Invalid(format!(
                "extension '{}' must be non-empty and given without a dot",
                self.extension
            )));
        }
        if !self.tags.marker.starts_with('@') || self.tags.marker.len() < 2 {
            return Err(ConfigError::Invalid(format!(
                "tag marker '{}' must start with '@'",
                self.tags.marker
            )));
        }
        Ok(())
    }

    /// Set the pattern profile
    #[inline]
    #[must_use]
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    /// Set the source root
    #[inline]
    #[must_use]
    pub fn with_source_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.source_root = root.into();
        self
    }

    /// Set the target package
    #[inline]
    #[must_use]
    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = package.into();
        self
    }

    /// Set the design model file
    #[inline]
    #[must_use]
    pub fn with_design_model(mut self, path: impl Into<PathBuf>) -> Self {
        self.design_model = Some(path.into());
        self
    }

    /// Set the tag recovery rule
    #[inline]
    #[must_use]
    pub fn with_tag_rule(mut self, rule: TagRule) -> Self {
        self.tags.rule = rule;
        self
    }

    /// Extractor for the configured marker and rule
    #[must_use]
    pub fn extractor(&self) -> TagExtractor {
        TagExtractor::new(&self.tags.marker, self.tags.rule)
    }

    /// Settings handed to pattern profiles
    #[must_use]
    pub fn pattern_settings(&self) -> PatternSettings {
        PatternSettings {
            package: self.package.clone(),
        }
    }
}
