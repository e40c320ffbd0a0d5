//! Errors of the diagnosable extraction functions

use ddlsmith_core::{Diagnostic, DiagnosticCode, Location, Severity};
use crate::splitter::SplitError;

/// Why a statement could not be decomposed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    #[error("Keyword {0} not found")]
    MissingKeyword(&'static str),

    #[error("Unbalanced parentheses at offset {position} (depth {depth})")]
    UnbalancedParentheses { position: usize, depth: i32 },

    #[error("FROM clause selects from a derived table")]
    DerivedTable,

    #[error("FROM clause combines several sources: {0}")]
    MultipleSources(String),

    #[error("Qualified name '{name}' has {parts} parts, expected 2 or 3")]
    QualifiedNameArity { name: String, parts: usize },
}

impl From<SplitError> for ExtractError {
    fn from(err: SplitError) -> Self {
        match err {
            SplitError::UnbalancedParentheses { position, depth } => {
                Self::UnbalancedParentheses { position, depth }
            }
        }
    }
}

impl ExtractError {
    /// Stable diagnostic code for this error
    pub fn code(&self) -> DiagnosticCode {
        match self {
            Self::MissingKeyword(_) => DiagnosticCode::DdlMissingKeyword,
            Self::UnbalancedParentheses { .. } => DiagnosticCode::DdlUnbalancedParentheses,
            Self::DerivedTable | Self::MultipleSources(_) | Self::QualifiedNameArity { .. } => {
                DiagnosticCode::DdlUnsupportedSource
            }
        }
    }

    /// Convert to a diagnostic
    ///
    /// `object` names the statement's object for the location; offsets are
    /// attached when the error carries one.
    pub fn to_diagnostic(&self, severity: Severity, object: Option<&str>) -> Diagnostic {
        let mut diag = Diagnostic::new(self.code(), severity, self.to_string());

        if let Some(object) = object {
            let location = match self {
                Self::UnbalancedParentheses { position, .. } => {
                    Location::with_offset(object, *position)
                }
                _ => Location::new(object),
            };
            diag = diag.with_location(location);
        }

        match self {
            Self::MultipleSources(clause) => diag.with_snippet(clause.clone()),
            Self::QualifiedNameArity { name, .. } => diag.with_snippet(name.clone()),
            _ => diag,
        }
    }
}
