//! Filesystem-backed workspace

use crate::error::AccessError;
use crate::ports::{Resource, Workspace};
use std::path::{Path, PathBuf};

/// Workspace over a directory tree
///
/// Relative paths resolve against `base`; absolute paths are used as given.
#[derive(Debug, Clone)]
pub struct FsWorkspace {
    base: PathBuf,
}

impl FsWorkspace {
    /// Create a workspace rooted at `base`
    #[must_use]
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Base directory
    #[inline]
    #[must_use]
    pub fn base(&self) -> &Path {
        &self.base
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base.join(path)
        }
    }
}

impl Workspace for FsWorkspace {
    fn read_source(&self, file: &Path) -> Result<String, AccessError> {
        let path = self.resolve(file);
        std::fs::read_to_string(&path).map_err(|e| AccessError::io(file, e))
    }

    fn write_source(&self, file: &Path, text: &str) -> Result<(), AccessError> {
        let path = self.resolve(file);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AccessError::io(parent, e))?;
        }
        std::fs::write(&path, text).map_err(|e| AccessError::io(file, e))?;
        tracing::debug!(file = %file.display(), bytes = text.len(), "source written");
        Ok(())
    }

    fn find_or_create_container(&self, root: &Path, package: &str) -> Result<PathBuf, AccessError> {
        let mut container = root.to_path_buf();
        container.extend(package.split('.').filter(|s| !s.is_empty()));
        let path = self.resolve(&container);
        std::fs::create_dir_all(&path).map_err(|e| AccessError::io(&container, e))?;
        Ok(container)
    }

    fn list_members(&self, container: &Path) -> Result<Vec<Resource>, AccessError> {
        let path = self.resolve(container);
        let entries = std::fs::read_dir(&path).map_err(|e| AccessError::io(container, e))?;

        let mut members = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| AccessError::io(container, e))?;
            let name = entry.file_name();
            if name.to_string_lossy().starts_with('.') {
                continue;
            }
            let file_type = entry.file_type().map_err(|e| AccessError::io(container, e))?;
            let member = container.join(&name);
            if file_type.is_dir() {
                members.push(Resource::Container(member));
            } else if file_type.is_file() {
                members.push(Resource::File(member));
            }
        }
        members.sort_by(|a, b| a.path().cmp(b.path()));
        Ok(members)
    }

    fn exists(&self, file: &Path) -> bool {
        self.resolve(file).is_file()
    }
}
