//! Testing utilities for tagsync workspace
//!
//! In-memory collaborators, monitors and Java fixtures.

#![allow(missing_docs)]

use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tagsync_engine::{
    AccessError, DesignModel, DesignModelError, ProgressMonitor, Resource, SyncConfig, Workspace,
};

/// Workspace holding files in a map keyed by relative path
///
/// Containers exist implicitly for every prefix of a stored file and
/// explicitly once created. Paths marked as failing deny every access at
/// or below them.
#[derive(Debug, Default)]
pub struct MemoryWorkspace {
    files: RwLock<BTreeMap<PathBuf, String>>,
    containers: RwLock<BTreeSet<PathBuf>>,
    failing: RwLock<BTreeSet<PathBuf>>,
    writes: AtomicUsize,
}

impl MemoryWorkspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: impl Into<PathBuf>, text: &str) -> Self {
        self.insert(path, text);
        self
    }

    pub fn insert(&self, path: impl Into<PathBuf>, text: &str) {
        self.files.write().insert(path.into(), text.to_string());
    }

    pub fn fail(&self, path: impl Into<PathBuf>) {
        self.failing.write().insert(path.into());
    }

    pub fn file(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files.read().get(path.as_ref()).cloned()
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.read().keys().cloned().collect()
    }

    /// Number of successful writes so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn check(&self, path: &Path) -> Result<(), AccessError> {
        if self.failing.read().iter().any(|f| path.starts_with(f)) {
            return Err(AccessError::Denied(path.to_path_buf()));
        }
        Ok(())
    }
}

impl Workspace for MemoryWorkspace {
    fn read_source(&self, file: &Path) -> Result<String, AccessError> {
        self.check(file)?;
        self.file(file)
            .ok_or_else(|| AccessError::NotFound(file.to_path_buf()))
    }

    fn write_source(&self, file: &Path, text: &str) -> Result<(), AccessError> {
        self.check(file)?;
        self.insert(file, text);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn find_or_create_container(&self, root: &Path, package: &str) -> Result<PathBuf, AccessError> {
        let mut container = root.to_path_buf();
        container.extend(package.split('.').filter(|s| !s.is_empty()));
        self.check(&container)?;
        self.containers.write().insert(container.clone());
        Ok(container)
    }

    fn list_members(&self, container: &Path) -> Result<Vec<Resource>, AccessError> {
        self.check(container)?;
        let mut members = BTreeSet::new();
        let mut known = self.containers.read().contains(container);

        for path in self.files.read().keys() {
            let Ok(rest) = path.strip_prefix(container) else { continue };
            known = true;
            let mut parts = rest.components();
            match (parts.next(), parts.next()) {
                (Some(first), None) => {
                    members.insert(Resource::File(container.join(first)));
                }
                (Some(first), Some(_)) => {
                    members.insert(Resource::Container(container.join(first)));
                }
                (None, _) => {}
            }
        }
        for dir in self.containers.read().iter() {
            if let Ok(rest) = dir.strip_prefix(container) {
                known = true;
                if let Some(first) = rest.components().next() {
                    members.insert(Resource::Container(container.join(first)));
                }
            }
        }

        if !known {
            return Err(AccessError::NotFound(container.to_path_buf()));
        }
        let mut members: Vec<Resource> = members.into_iter().collect();
        members.sort_by(|a, b| a.path().cmp(b.path()));
        Ok(members)
    }

    fn exists(&self, file: &Path) -> bool {
        self.files.read().contains_key(file)
    }
}

/// Design model held in memory; records land in a list
#[derive(Debug, Default)]
pub struct MemoryDesignModel {
    roles: IndexMap<String, Vec<String>>,
    recorded: Mutex<Vec<(String, String)>>,
}

impl MemoryDesignModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_role(mut self, role: &str, names: &[&str]) -> Self {
        self.roles
            .insert(role.to_string(), names.iter().map(|n| (*n).to_string()).collect());
        self
    }

    /// `(name, container tag)` pairs in recording order
    pub fn recorded(&self) -> Vec<(String, String)> {
        self.recorded.lock().clone()
    }
}

impl DesignModel for MemoryDesignModel {
    fn element_name(&self, role: &str) -> Option<String> {
        self.roles.get(role).and_then(|names| names.first().cloned())
    }

    fn element_names(&self, role: &str) -> Vec<String> {
        self.roles.get(role).cloned().unwrap_or_default()
    }

    fn record_element(&self, name: &str, container_tag: &str) -> Result<(), DesignModelError> {
        self.recorded
            .lock()
            .push((name.to_string(), container_tag.to_string()));
        Ok(())
    }

    fn recorded_elements(&self, container_tag: &str) -> Vec<String> {
        self.recorded
            .lock()
            .iter()
            .filter(|(_, container)| container == container_tag)
            .map(|(name, _)| name.clone())
            .collect()
    }
}

/// Monitor that reports cancelled from the `n`-th poll on
#[derive(Debug)]
pub struct CancelAfter {
    remaining: AtomicUsize,
    worked: AtomicUsize,
}

impl CancelAfter {
    /// `CancelAfter::new(0)` is cancelled from the start
    pub fn new(polls: usize) -> Self {
        Self {
            remaining: AtomicUsize::new(polls),
            worked: AtomicUsize::new(0),
        }
    }

    pub fn worked_units(&self) -> usize {
        self.worked.load(Ordering::SeqCst)
    }
}

impl ProgressMonitor for CancelAfter {
    fn begin(&self, _task: &str, _total: usize) {}

    fn worked(&self, units: usize) {
        self.worked.fetch_add(units, Ordering::SeqCst);
    }

    fn is_cancelled(&self) -> bool {
        self.remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_err()
    }
}

/// Config over `src/` with package `app` and the default tag rule
pub fn config(profile: &str) -> SyncConfig {
    SyncConfig::default()
        .with_profile(profile)
        .with_source_root("src")
        .with_package("app")
}

/// Design model naming one view and one controller
pub fn mvc_model() -> MemoryDesignModel {
    MemoryDesignModel::new()
        .with_role("View", &["CustomerView"])
        .with_role("Controller", &["OrderController"])
}

/// Complete, correctly tagged MVC project for [`mvc_model`]
pub fn mvc_project() -> MemoryWorkspace {
    MemoryWorkspace::new()
        .with_file("src/app/DataInterface.java", fixtures::DATA_INTERFACE)
        .with_file("src/app/Model.java", fixtures::MODEL)
        .with_file("src/app/CustomerView.java", fixtures::CUSTOMER_VIEW)
        .with_file("src/app/OrderController.java", fixtures::ORDER_CONTROLLER)
}

pub mod fixtures {
    pub const DATA_INTERFACE: &str = r"package app;

/**
 * @pattern DataInterface
 */
public interface DataInterface {
    /**
     * @pattern getData
     */
    Object getData();
}
";

    pub const MODEL: &str = r"package app;

/**
 * @pattern Model
 */
public class Model implements DataInterface {
    /**
     * @pattern getData
     */
    public Object getData() {
        return null;
    }
}
";

    pub const CUSTOMER_VIEW: &str = r"package app;

/**
 * @pattern View:CustomerView
 */
public class CustomerView {
    /**
     * @pattern update
     */
    public void update() {
        DataInterface source = null;
        source.getData();
    }
}
";

    /// View whose `update` never calls `getData`
    pub const CUSTOMER_VIEW_NO_CALL: &str = r"package app;

/**
 * @pattern View:CustomerView
 */
public class CustomerView {
    /**
     * @pattern update
     */
    public void update() {
        render();
    }

    private void render() {
    }
}
";

    pub const ORDER_CONTROLLER: &str = r"package app;

/**
 * @pattern Controller:OrderController
 */
public class OrderController {
    /**
     * @pattern handleRequest
     */
    public void handleRequest() {
    }
}
";

    /// Untagged helper that calls the reserved `getData`
    pub const UNTAGGED_CALLER: &str = r"package app;

public class Report {
    public void print() {
        DataInterface data = null;
        data.getData();
        data.getData();
    }
}
";
}
