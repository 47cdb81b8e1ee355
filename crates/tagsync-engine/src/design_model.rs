//! YAML design model
//!
//! ```yaml
//! elements:
//!   Model: Store
//!   View: [CustomerView, OrderView]
//! recorded:
//!   - name: refresh
//!     container: Model
//! ```
//!
//! `elements` maps a role to one name or a list of names. `recorded` is the
//! back-propagation sink of update passes; [`YamlDesignModel::save`] writes
//! it back next to the elements, and later passes read it back as optional
//! methods of the named container.

use crate::error::DesignModelError;
use crate::ports::DesignModel;
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One name or several for a role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoleNames {
    /// Single element
    One(String),
    /// Several elements
    Many(Vec<String>),
}

impl RoleNames {
    fn as_slice(&self) -> &[String] {
        match self {
            RoleNames::One(name) => std::slice::from_ref(name),
            RoleNames::Many(names) => names,
        }
    }
}

/// Element discovered by an update pass
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordedElement {
    /// Element name
    pub name: String,
    /// Tag of the enclosing tagged container
    pub container: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Document {
    #[serde(default)]
    elements: IndexMap<String, RoleNames>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    recorded: Vec<RecordedElement>,
}

#[derive(Debug, Default)]
struct State {
    doc: Document,
    dirty: bool,
}

/// Design model read from and saved to a YAML file
#[derive(Debug, Default)]
pub struct YamlDesignModel {
    path: Option<PathBuf>,
    state: RwLock<State>,
}

impl YamlDesignModel {
    /// Load from a file
    ///
    /// # Errors
    /// Returns `DesignModelError` if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DesignModelError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| DesignModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut model = Self::from_yaml_str(&text)?;
        model.path = Some(path.to_path_buf());
        tracing::debug!(path = %path.display(), roles = model.state.read().doc.elements.len(), "design model loaded");
        Ok(model)
    }

    /// Parse from YAML text; the result has no backing file
    ///
    /// # Errors
    /// Returns `DesignModelError::Yaml` if the text is malformed.
    pub fn from_yaml_str(text: &str) -> Result<Self, DesignModelError> {
        let doc: Document = if text.trim().is_empty() {
            Document::default()
        } else {
            serde_yaml::from_str(text)?
        };
        Ok(Self {
            path: None,
            state: RwLock::new(State { doc, dirty: false }),
        })
    }

    /// Backing file, if loaded from one
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Elements recorded so far
    #[must_use]
    pub fn recorded(&self) -> Vec<RecordedElement> {
        self.state.read().doc.recorded.clone()
    }

    /// Whether elements were recorded since the last load or save
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.state.read().dirty
    }

    /// Serialize the current model
    ///
    /// # Errors
    /// Returns `DesignModelError::Yaml` if serialization fails.
    pub fn to_yaml_string(&self) -> Result<String, DesignModelError> {
        Ok(serde_yaml::to_string(&self.state.read().doc)?)
    }

    /// Write back to the backing file
    ///
    /// # Errors
    /// Returns `DesignModelError::NoPath` without a backing file, or an I/O
    /// or YAML error.
    pub fn save(&self) -> Result<(), DesignModelError> {
        let path = self.path.as_deref().ok_or(DesignModelError::NoPath)?;
        self.save_to(path)
    }

    /// Write to `path`
    ///
    /// # Errors
    /// Returns `DesignModelError` if serialization or the write fails.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), DesignModelError> {
        let path = path.as_ref();
        let text = self.to_yaml_string()?;
        std::fs::write(path, text).map_err(|source| DesignModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.state.write().dirty = false;
        tracing::info!(path = %path.display(), "design model saved");
        Ok(())
    }
}

impl DesignModel for YamlDesignModel {
    fn element_name(&self, role: &str) -> Option<String> {
        self.state
            .read()
            .doc
            .elements
            .get(role)
            .and_then(|names| names.as_slice().first().cloned())
    }

    fn element_names(&self, role: &str) -> Vec<String> {
        self.state
            .read()
            .doc
            .elements
            .get(role)
            .map(|names| names.as_slice().to_vec())
            .unwrap_or_default()
    }

    fn record_element(&self, name: &str, container_tag: &str) -> Result<(), DesignModelError> {
        if name.is_empty() {
            return Err(DesignModelError::Rejected("empty element name".to_string()));
        }
        let element = RecordedElement {
            name: name.to_string(),
            container: container_tag.to_string(),
        };
        let mut state = self.state.write();
        if !state.doc.recorded.contains(&element) {
            state.doc.recorded.push(element);
            state.dirty = true;
        }
        Ok(())
    }

    fn recorded_elements(&self, container_tag: &str) -> Vec<String> {
        self.state
            .read()
            .doc
            .recorded
            .iter()
            .filter(|e| e.container == container_tag)
            .map(|e| e.name.clone())
            .collect()
    }
}
