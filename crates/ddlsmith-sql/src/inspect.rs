//! Full decomposition of one statement into an inspection report

use ddlsmith_core::{
    Diagnostic, DiagnosticCode, InspectionReport, Location, ObjectIdentifier, ObjectKind,
    ProjectionItem, Severity,
};

use crate::options::parse_table_options;
use crate::projection::parse_projection_items;
use crate::source::resolve_source;

/// Run every extractor over `ddl` and collect results and diagnostics
///
/// Statements of kinds without a query (standard tables) skip the
/// projection and source extractors.
pub fn inspect_statement(
    ddl: &str,
    object: Option<ObjectIdentifier>,
    kind: Option<ObjectKind>,
) -> InspectionReport {
    let mut report = InspectionReport::new();
    let object_name = object.as_ref().map(ObjectIdentifier::fqn);
    report.object = object;
    report.kind = kind;

    report.options = parse_table_options(ddl);

    if kind.map_or(false, |k| !k.has_query()) {
        let mut diag = Diagnostic::new(
            DiagnosticCode::Info,
            Severity::Info,
            "Object has no defining query; only options were extracted",
        );
        if let Some(name) = object_name {
            diag = diag.with_location(Location::new(name));
        }
        report.add_diagnostic(diag);
        return report;
    }

    match parse_projection_items(ddl) {
        Ok(items) => {
            for item in items {
                match item {
                    ProjectionItem::Recognized(projection) => report.add_projection(projection),
                    ProjectionItem::Unrecognized { raw } => {
                        let mut diag = Diagnostic::new(
                            DiagnosticCode::DdlUnrecognizedProjection,
                            Severity::Warn,
                            format!("Select item '{}' is not of the form expr::TYPE AS alias", raw),
                        )
                        .with_snippet(raw.clone());
                        if let Some(name) = &object_name {
                            diag = diag.with_location(Location::new(name.clone()));
                        }
                        report.add_diagnostic(diag);
                        report.add_unrecognized(raw);
                    }
                }
            }
        }
        Err(err) => {
            report.add_diagnostic(err.to_diagnostic(Severity::Error, object_name.as_deref()));
        }
    }

    match resolve_source(ddl) {
        Ok(source) => report.source = Some(source),
        Err(err) => {
            report.add_diagnostic(err.to_diagnostic(Severity::Warn, object_name.as_deref()));
        }
    }

    report
}
