//! Collaborator boundaries
//!
//! The engine never touches a filesystem, a design model or a UI directly;
//! everything goes through these traits. Methods take `&self`, so
//! implementations that record state use interior mutability.

use crate::error::{AccessError, DesignModelError};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Reader and back-propagation sink for the design model
pub trait DesignModel {
    /// Name of the single element playing `role`, if the model has one
    fn element_name(&self, role: &str) -> Option<String>;

    /// Names of all elements playing `role`
    fn element_names(&self, role: &str) -> Vec<String>;

    /// Record a newly discovered element under the tag of its container
    ///
    /// # Errors
    /// Returns `DesignModelError` if the sink rejects the element.
    fn record_element(&self, name: &str, container_tag: &str) -> Result<(), DesignModelError>;

    /// Names recorded so far under `container_tag`
    fn recorded_elements(&self, _container_tag: &str) -> Vec<String> {
        Vec::new()
    }
}

/// Member of a container
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Resource {
    /// Nested container (directory, package folder)
    Container(PathBuf),
    /// Source file
    File(PathBuf),
}

impl Resource {
    /// Path of the resource
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Resource::Container(p) | Resource::File(p) => p,
        }
    }
}

/// Persistence and container access
pub trait Workspace {
    /// Read a file's text
    ///
    /// # Errors
    /// Returns `AccessError` if the file cannot be read.
    fn read_source(&self, file: &Path) -> Result<String, AccessError>;

    /// Replace a file's text, creating the file if needed
    ///
    /// # Errors
    /// Returns `AccessError` if the file cannot be written.
    fn write_source(&self, file: &Path, text: &str) -> Result<(), AccessError>;

    /// Container for a dotted package below `root`, created if missing
    ///
    /// # Errors
    /// Returns `AccessError` if the container cannot be created.
    fn find_or_create_container(&self, root: &Path, package: &str) -> Result<PathBuf, AccessError>;

    /// Direct members of a container, in a stable order
    ///
    /// # Errors
    /// Returns `AccessError` if the container cannot be listed.
    fn list_members(&self, container: &Path) -> Result<Vec<Resource>, AccessError>;

    /// Whether a file exists
    fn exists(&self, file: &Path) -> bool {
        self.read_source(file).is_ok()
    }
}

/// Progress reporting and cooperative cancellation
pub trait ProgressMonitor {
    /// Start a task of `total` units
    fn begin(&self, task: &str, total: usize);

    /// Report completed units
    fn worked(&self, units: usize);

    /// Whether the caller asked to stop
    fn is_cancelled(&self) -> bool;
}

/// Monitor that reports nothing and never cancels
#[derive(Debug, Clone, Copy, Default)]
pub struct NullMonitor;

impl ProgressMonitor for NullMonitor {
    fn begin(&self, _task: &str, _total: usize) {}

    fn worked(&self, _units: usize) {}

    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Shared cancellation flag usable as a monitor
///
/// Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create an uncancelled token
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
}

impl ProgressMonitor for CancellationToken {
    fn begin(&self, task: &str, total: usize) {
        tracing::debug!(task, total, "task started");
    }

    fn worked(&self, units: usize) {
        tracing::trace!(units, "progress");
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
