//! Inspection report schema (stable v1)
//!
//! This schema is STABLE and VERSIONED.
//! Breaking changes require a new version.

use serde::{Deserialize, Serialize};
use crate::diagnostic::{Diagnostic, Severity};
use crate::model::{ColumnProjection, ObjectIdentifier, ObjectKind, SourceReference, TableOptions};

/// Report schema version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportVersion {
    /// Major version (breaking changes)
    pub major: u32,

    /// Minor version (backward-compatible additions)
    pub minor: u32,
}

impl ReportVersion {
    /// Current report schema version
    pub const CURRENT: ReportVersion = ReportVersion { major: 1, minor: 0 };
}

impl std::fmt::Display for ReportVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Summary statistics for a report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Number of select-list candidates seen
    pub candidates: usize,

    /// Number of candidates decomposed into projections
    pub recognized: usize,

    /// Number of errors
    pub errors: usize,

    /// Number of warnings
    pub warnings: usize,

    /// Number of info messages
    pub info: usize,
}

/// Everything recovered from one CREATE statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectionReport {
    /// Schema version
    pub version: ReportVersion,

    /// Timestamp (ISO 8601)
    pub timestamp: String,

    /// Object the statement was fetched for, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object: Option<ObjectIdentifier>,

    /// Object kind, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ObjectKind>,

    /// Recovered output columns
    pub projections: Vec<ColumnProjection>,

    /// Select-list items that could not be decomposed
    pub unrecognized: Vec<String>,

    /// Upstream object
    pub source: Option<SourceReference>,

    /// Statement tail options
    pub options: TableOptions,

    /// Summary statistics
    pub summary: ReportSummary,

    /// All diagnostics
    pub diagnostics: Vec<Diagnostic>,
}

impl InspectionReport {
    /// Create an empty report
    pub fn new() -> Self {
        Self {
            version: ReportVersion::CURRENT,
            timestamp: chrono::Utc::now().to_rfc3339(),
            object: None,
            kind: None,
            projections: Vec::new(),
            unrecognized: Vec::new(),
            source: None,
            options: TableOptions::default(),
            summary: ReportSummary::default(),
            diagnostics: Vec::new(),
        }
    }

    /// Tag the report with the inspected object
    pub fn for_object(mut self, object: ObjectIdentifier, kind: ObjectKind) -> Self {
        self.object = Some(object);
        self.kind = Some(kind);
        self
    }

    /// Record a recognized projection
    pub fn add_projection(&mut self, projection: ColumnProjection) {
        self.summary.candidates += 1;
        self.summary.recognized += 1;
        self.projections.push(projection);
    }

    /// Record a candidate that could not be decomposed
    pub fn add_unrecognized(&mut self, raw: impl Into<String>) {
        self.summary.candidates += 1;
        self.unrecognized.push(raw.into());
    }

    /// Add a diagnostic to the report
    pub fn add_diagnostic(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Error => self.summary.errors += 1,
            Severity::Warn => self.summary.warnings += 1,
            Severity::Info => self.summary.info += 1,
        }

        self.diagnostics.push(diagnostic);
    }

    /// Check if the report has any errors
    pub fn has_errors(&self) -> bool {
        self.summary.errors > 0
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Save to file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let json = self.to_json()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(path, json)
    }
}

impl Default for InspectionReport {
    fn default() -> Self {
        Self::new()
    }
}
