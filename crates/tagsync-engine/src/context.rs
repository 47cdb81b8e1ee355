//! Per-pass traversal state
//!
//! One [`PassContext`] is built for every pass and threaded by reference
//! through the correlator, so there is no process-wide state. The tag tree
//! and the report live for the whole pass and accumulate across files; the
//! cursor and declaration stacks only matter within one file.

use crate::ports::DesignModel;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use tagsync_model::{Report, Restrictions, SpecTree};
use tagsync_syntax::{TagExtractor, TypeKind};
use tagsync_tree::NodeId;

/// Traversal behavior, fixed for a pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Mark matched tags visited; synthesis runs afterwards
    Generate,
    /// Compare matched declarations and check restrictions
    Validate,
    /// Back-propagate untagged methods into the design model
    Update,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Generate => write!(f, "generate"),
            Mode::Validate => write!(f, "validate"),
            Mode::Update => write!(f, "update"),
        }
    }
}

/// Where a matched type declaration was last seen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// File holding the declaration
    pub file: PathBuf,
    /// Byte offset of the closing brace of the body
    pub body_close: usize,
    /// Column the declaration starts at
    pub column: usize,
    /// Class or interface
    pub kind: TypeKind,
    /// Declared name
    pub name: String,
}

/// Proof that entering a declaration moved the cursor
///
/// Only the holder of a descent can move the cursor back, so unrelated
/// nesting never shifts it.
#[derive(Debug)]
#[must_use]
pub struct Descent {
    pub(crate) from: NodeId,
    pub(crate) to: NodeId,
}

#[derive(Debug)]
pub(crate) struct TypeFrame {
    pub(crate) name: String,
    /// Node this declaration moved the cursor to
    pub(crate) node: Option<NodeId>,
}

#[derive(Debug)]
pub(crate) struct MethodFrame {
    pub(crate) name: String,
    pub(crate) tagged: bool,
    pub(crate) reported: HashSet<String>,
}

/// Explicit context for one traversal pass
pub struct PassContext<'p> {
    mode: Mode,
    pattern: &'p str,
    pub(crate) tree: &'p mut SpecTree,
    pub(crate) extractor: &'p TagExtractor,
    pub(crate) model: &'p dyn DesignModel,
    pub(crate) restrictions: Restrictions,
    pub(crate) cursor: NodeId,
    pub(crate) report: Report,
    pub(crate) file: Option<PathBuf>,
    pub(crate) package: String,
    pub(crate) types: Vec<TypeFrame>,
    pub(crate) methods: Vec<MethodFrame>,
    pub(crate) locations: HashMap<NodeId, Location>,
    pub(crate) recorded: HashSet<(String, String)>,
}

impl fmt::Debug for PassContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PassContext")
            .field("mode", &self.mode)
            .field("pattern", &self.pattern)
            .field("cursor", &self.cursor)
            .field("file", &self.file)
            .field("findings", &self.report.findings.len())
            .finish_non_exhaustive()
    }
}

impl<'p> PassContext<'p> {
    /// Create a context positioned at the root of `tree`
    ///
    /// The restriction table is only built for validation.
    pub fn new(
        mode: Mode,
        pattern: &'p str,
        tree: &'p mut SpecTree,
        extractor: &'p TagExtractor,
        model: &'p dyn DesignModel,
    ) -> Self {
        let restrictions = match mode {
            Mode::Validate => Restrictions::from_tree(tree),
            Mode::Generate | Mode::Update => Restrictions::default(),
        };
        let cursor = tree.root();
        Self {
            mode,
            pattern,
            tree,
            extractor,
            model,
            restrictions,
            cursor,
            report: Report::new(),
            file: None,
            package: String::new(),
            types: Vec::new(),
            methods: Vec::new(),
            locations: HashMap::new(),
            recorded: HashSet::new(),
        }
    }

    /// Pass mode
    #[inline]
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Pattern name findings are keyed by
    #[inline]
    #[must_use]
    pub fn pattern(&self) -> &str {
        self.pattern
    }

    /// Current cursor node
    #[inline]
    #[must_use]
    pub fn cursor(&self) -> NodeId {
        self.cursor
    }

    /// Tag tree being reconciled
    #[inline]
    #[must_use]
    pub fn tree(&self) -> &SpecTree {
        &*self.tree
    }

    /// Report accumulated so far
    #[inline]
    #[must_use]
    pub fn report(&self) -> &Report {
        &self.report
    }

    /// Mutable report, for orchestration-level findings
    #[inline]
    pub fn report_mut(&mut self) -> &mut Report {
        &mut self.report
    }

    /// File being traversed
    #[must_use]
    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    /// Last known location of a matched type node
    #[must_use]
    pub fn location(&self, id: NodeId) -> Option<&Location> {
        self.locations.get(&id)
    }

    /// Start traversing `file` declared in `package`
    ///
    /// The cursor returns to the root; visitation and findings carry over.
    pub fn begin_file(&mut self, file: &Path, package: &str) {
        self.file = Some(file.to_path_buf());
        self.package = package.to_string();
        self.cursor = self.tree.root();
        self.types.clear();
        self.methods.clear();
    }

    /// Mark the pass as cancelled
    pub fn cancel(&mut self) {
        self.report.cancelled = true;
    }

    /// Finish the pass and hand back its report
    #[must_use]
    pub fn finish(self) -> Report {
        self.report
    }
}
