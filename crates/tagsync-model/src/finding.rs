//! Severity-leveled findings and the per-pass aggregate report

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Finding severity, ordered `Info < Warning < Error`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational, e.g. a synthesized or recorded element
    Info,
    /// Non-fatal deviation from the expected shape
    Warning,
    /// Missing element or kind mismatch
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "INFO"),
            Severity::Warning => write!(f, "WARNING"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// Overall outcome of a pass
///
/// `Clean` means no findings at all and is distinct from `Info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Zero findings
    Clean,
    /// Only informational findings
    Info,
    /// At least one warning, no errors
    Warning,
    /// At least one error
    Error,
}

impl From<Severity> for Status {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Info => Status::Info,
            Severity::Warning => Status::Warning,
            Severity::Error => Status::Error,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Clean => write!(f, "CLEAN"),
            Status::Info => write!(f, "INFO"),
            Status::Warning => write!(f, "WARNING"),
            Status::Error => write!(f, "ERROR"),
        }
    }
}

/// What a finding is about; each kind has a fixed severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    /// Class declared where an interface is expected, or the reverse
    KindMismatch,
    /// Type declaration tagged for a method slot, or the reverse
    ElementMismatch,
    /// Required interface not implemented
    MissingInterface,
    /// Required superclass not extended
    MissingSuperclass,
    /// Declared in another package
    PackageMismatch,
    /// Required import absent
    MissingImport,
    /// Method body lacks the required call
    MissingInvocation,
    /// No source realizes a class-like tag
    MissingType,
    /// No source realizes a method-like tag
    MissingMethod,
    /// No source realizes a tag without element descriptors
    MissingElement,
    /// Untagged code reuses a name reserved for a tagged element
    RestrictedUse,
    /// Tagged declaration outside the slot its tag belongs to
    UnexpectedTag,
    /// Untagged file already occupies the name a synthesis needs
    ExistingUntagged,
    /// Synthesis could not be carried out
    SynthesisFailed,
    /// Element was generated
    Synthesized,
    /// Element was back-propagated to the design model
    Recorded,
}

impl FindingKind {
    /// Severity this kind is reported with
    #[must_use]
    pub const fn severity(self) -> Severity {
        match self {
            FindingKind::KindMismatch
            | FindingKind::ElementMismatch
            | FindingKind::MissingInvocation
            | FindingKind::MissingType
            | FindingKind::MissingMethod
            | FindingKind::MissingElement => Severity::Error,
            FindingKind::MissingInterface
            | FindingKind::MissingSuperclass
            | FindingKind::PackageMismatch
            | FindingKind::MissingImport
            | FindingKind::RestrictedUse
            | FindingKind::UnexpectedTag
            | FindingKind::ExistingUntagged
            | FindingKind::SynthesisFailed => Severity::Warning,
            FindingKind::Synthesized | FindingKind::Recorded => Severity::Info,
        }
    }
}

/// One report entry keyed by pattern and offending element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub severity: Severity,
    pub kind: FindingKind,
    /// Pattern (profile) name
    pub pattern: String,
    /// Offending or affected element
    pub element: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Finding {
    /// Create a finding; severity follows from `kind`
    #[must_use]
    pub fn new(
        kind: FindingKind,
        pattern: impl Into<String>,
        element: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity: kind.severity(),
            kind,
            pattern: pattern.into(),
            element: element.into(),
            message: message.into(),
            file: None,
        }
    }

    /// Attach the file the finding was raised in
    #[must_use]
    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}: {}",
            self.severity, self.pattern, self.element, self.message
        )
    }
}

/// Aggregate result of one pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Findings in the order they were recorded
    pub findings: Vec<Finding>,
    /// Containers or files skipped after an access failure
    #[serde(default)]
    pub skipped: Vec<PathBuf>,
    /// Pass was truncated by cancellation
    #[serde(default)]
    pub cancelled: bool,
}

impl Report {
    /// Create an empty report
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finding
    pub fn push(&mut self, finding: Finding) {
        tracing::debug!(%finding, "finding recorded");
        self.findings.push(finding);
    }

    /// Record a skipped container or file
    pub fn skip(&mut self, path: impl Into<PathBuf>) {
        self.skipped.push(path.into());
    }

    /// Append another report
    pub fn merge(&mut self, other: Report) {
        self.findings.extend(other.findings);
        self.skipped.extend(other.skipped);
        self.cancelled |= other.cancelled;
    }

    /// Maximum severity over all findings, `Clean` when there are none
    #[must_use]
    pub fn status(&self) -> Status {
        self.findings
            .iter()
            .map(|f| f.severity)
            .max()
            .map_or(Status::Clean, Status::from)
    }

    /// Whether the report holds no findings
    #[inline]
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }

    /// Number of findings with `severity`
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == severity)
            .count()
    }

    /// Findings of `kind`
    pub fn of_kind(&self, kind: FindingKind) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.kind == kind)
    }
}

impl Extend<Finding> for Report {
    fn extend<I: IntoIterator<Item = Finding>>(&mut self, iter: I) {
        for finding in iter {
            self.push(finding);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_report_is_clean_not_info() {
        let report = Report::new();
        assert_eq!(report.status(), Status::Clean);
        assert!(report.is_clean());

        let mut info = Report::new();
        info.push(Finding::new(FindingKind::Synthesized, "mvc", "Model", "created Model.java"));
        assert_eq!(info.status(), Status::Info);
        assert!(!info.is_clean());
    }

    #[test]
    fn status_is_maximum_severity() {
        let mut report = Report::new();
        report.push(Finding::new(FindingKind::MissingImport, "mvc", "Model", "missing import"));
        assert_eq!(report.status(), Status::Warning);
        report.push(Finding::new(FindingKind::Recorded, "mvc", "helper", "recorded"));
        assert_eq!(report.status(), Status::Warning);
        report.push(Finding::new(FindingKind::MissingType, "mvc", "View", "missing"));
        assert_eq!(report.status(), Status::Error);
        assert_eq!(report.count(Severity::Warning), 1);
        assert_eq!(report.of_kind(FindingKind::MissingType).count(), 1);
    }

    #[test]
    fn display_names_pattern_and_element() {
        let finding = Finding::new(
            FindingKind::KindMismatch,
            "mvc",
            "DataInterface",
            "should be an interface",
        );
        assert_eq!(
            finding.to_string(),
            "[ERROR] mvc: DataInterface: should be an interface"
        );
    }

    #[test]
    fn merge_keeps_order_and_flags() {
        let mut first = Report::new();
        first.push(Finding::new(FindingKind::MissingMethod, "mvc", "getData", "missing"));
        let mut second = Report::new();
        second.skip("src/broken");
        second.cancelled = true;
        second.push(Finding::new(FindingKind::RestrictedUse, "mvc", "helper", "reserved"));

        first.merge(second);
        assert_eq!(first.findings.len(), 2);
        assert_eq!(first.findings[1].kind, FindingKind::RestrictedUse);
        assert_eq!(first.skipped, vec![PathBuf::from("src/broken")]);
        assert!(first.cancelled);
    }

    #[test]
    fn serializes_severity_lowercase() {
        let finding = Finding::new(FindingKind::MissingInterface, "mvc", "Model", "x")
            .with_file("src/app/Model.java");
        let json = serde_json::to_value(&finding).unwrap();
        assert_eq!(json["severity"], "warning");
        assert_eq!(json["kind"], "missing_interface");
        assert_eq!(json["file"], "src/app/Model.java");
    }
}
