//! Diagnostic codes and error reporting
//!
//! IMPORTANT: Diagnostic codes are versioned and stable.
//! NEVER rename or remove codes - they are part of the public API.
//! Add new codes with new names only.

use serde::{Deserialize, Serialize};

/// Diagnostic code registry (v1)
///
/// These codes are STABLE and VERSIONED.
/// Do NOT rename or remove codes - only add new ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticCode {
    // DDL reverse engineering (1xxx)
    /// A keyword required to locate a clause (SELECT, FROM) is missing
    DdlMissingKeyword,

    /// Parentheses in a select list do not balance
    DdlUnbalancedParentheses,

    /// A select-list item does not have the `expr::TYPE AS alias` shape
    DdlUnrecognizedProjection,

    /// FROM clause is not a single 2- or 3-part table reference
    DdlUnsupportedSource,

    // Generation (2xxx)
    /// Generated DDL failed to parse
    DdlValidationError,

    // Warehouse access (3xxx)
    /// Catalog query failed
    CatalogError,

    // General warnings (9xxx)
    /// General informational message
    Info,

    /// General warning message
    Warning,
}

impl DiagnosticCode {
    /// Get the diagnostic code as a stable string identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DdlMissingKeyword => "DDL_MISSING_KEYWORD",
            Self::DdlUnbalancedParentheses => "DDL_UNBALANCED_PARENTHESES",
            Self::DdlUnrecognizedProjection => "DDL_UNRECOGNIZED_PROJECTION",
            Self::DdlUnsupportedSource => "DDL_UNSUPPORTED_SOURCE",
            Self::DdlValidationError => "DDL_VALIDATION_ERROR",
            Self::CatalogError => "CATALOG_ERROR",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
        }
    }
}

impl std::fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message
    Info,

    /// Warning - result is usable but incomplete
    Warn,

    /// Error - nothing could be recovered
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Where in a statement a diagnostic applies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Object the statement belongs to (`SCHEMA.NAME`), or the input path
    pub object: String,

    /// Optional byte offset into the statement text
    pub offset: Option<usize>,
}

impl Location {
    /// Create a new location with just an object name
    pub fn new(object: impl Into<String>) -> Self {
        Self {
            object: object.into(),
            offset: None,
        }
    }

    /// Create a location pointing at a byte offset
    pub fn with_offset(object: impl Into<String>, offset: usize) -> Self {
        Self {
            object: object.into(),
            offset: Some(offset),
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.offset {
            Some(offset) => write!(f, "{}@{}", self.object, offset),
            None => write!(f, "{}", self.object),
        }
    }
}

/// A diagnostic message with structured metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Stable diagnostic code
    pub code: DiagnosticCode,

    /// Severity level
    pub severity: Severity,

    /// Human-readable message
    pub message: String,

    /// Source location (best-effort)
    pub location: Option<Location>,

    /// Raw statement fragment the diagnostic refers to
    pub snippet: Option<String>,
}

impl Diagnostic {
    /// Create a new diagnostic with minimal fields
    pub fn new(code: DiagnosticCode, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            code,
            severity,
            message: message.into(),
            location: None,
            snippet: None,
        }
    }

    /// Set the location
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Attach the offending fragment
    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = Some(snippet.into());
        self
    }
}
