//! ddlsmith Core
//!
//! Value types shared by the parser, the generator and the catalog layer.
//! Never rename diagnostic codes - they are part of the public API.

pub mod diagnostic;
pub mod model;
pub mod registry;
pub mod report;
pub mod config;

pub use diagnostic::{Diagnostic, DiagnosticCode, Severity, Location};
pub use model::{
    ColumnProjection, ProjectionItem, SourceReference, TableOptions, ColumnDefinition,
    ObjectKind, ObjectIdentifier,
};
pub use registry::TypeRegistry;
pub use report::{InspectionReport, ReportSummary, ReportVersion};
pub use config::{Config, ConfigError, ConnectionConfig, DefaultsConfig, DialectConfig};
