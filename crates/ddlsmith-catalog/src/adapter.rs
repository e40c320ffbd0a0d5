//! Warehouse catalog trait for listing objects and fetching their DDL

use ddlsmith_core::{ColumnDefinition, Diagnostic, DiagnosticCode, Location, ObjectIdentifier, ObjectKind, Severity};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Schemas hidden from `list_schemas` unless configured otherwise
pub const DEFAULT_EXCLUDED_SCHEMAS: &[&str] = &["INFORMATION_SCHEMA", "PUBLIC"];

/// Which tables `list_tables` returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableFilter {
    /// Every table, dynamic or not
    #[default]
    All,

    /// Tables that are not dynamic tables
    Standard,

    /// Dynamic tables only
    Dynamic,
}

impl fmt::Display for TableFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Standard => write!(f, "standard"),
            Self::Dynamic => write!(f, "dynamic"),
        }
    }
}

impl FromStr for TableFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "standard" | "normal" => Ok(Self::Standard),
            "dynamic" => Ok(Self::Dynamic),
            other => Err(format!("unknown table filter: {}", other)),
        }
    }
}

/// Errors that can occur when talking to a warehouse
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CatalogError {
    /// Classify a warehouse error message
    ///
    /// Missing objects and privilege failures get their own variants; anything
    /// else is a query failure.
    pub fn from_message(object: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_lowercase();

        if lower.contains("does not exist") || lower.contains("not found") {
            Self::ObjectNotFound(object.to_string())
        } else if lower.contains("insufficient privileges") || lower.contains("permission") {
            Self::PermissionDenied(format!("Cannot access {}: {}", object, message))
        } else {
            Self::Query(message)
        }
    }

    /// Convert to a diagnostic
    pub fn to_diagnostic(&self, object: Option<&str>) -> Diagnostic {
        let diag = Diagnostic::new(DiagnosticCode::CatalogError, Severity::Error, self.to_string());
        match object {
            Some(object) => diag.with_location(Location::new(object)),
            None => diag,
        }
    }
}

/// Trait for warehouse catalogs that expose object metadata and DDL
#[async_trait::async_trait]
pub trait WarehouseCatalog: Send + Sync {
    /// Get the catalog name (e.g., "Snowflake", "Mock")
    fn name(&self) -> &'static str;

    /// Test the connection to the warehouse
    ///
    /// Useful for validating credentials before running other queries.
    async fn test_connection(&self) -> Result<(), CatalogError>;

    /// Schemas of a database, without excluded system schemas
    async fn list_schemas(&self, database: &str) -> Result<Vec<String>, CatalogError>;

    /// Tables of a schema, narrowed by `filter`
    async fn list_tables(&self, schema: &str, filter: TableFilter) -> Result<Vec<String>, CatalogError>;

    /// Views of a schema
    async fn list_views(&self, schema: &str) -> Result<Vec<String>, CatalogError>;

    /// Output columns of an object, as `DESCRIBE` reports them
    async fn describe_columns(
        &self,
        object: &ObjectIdentifier,
        kind: ObjectKind,
    ) -> Result<Vec<ColumnDefinition>, CatalogError>;

    /// Full DDL of an object, as `GET_DDL` returns it
    async fn get_ddl(&self, object: &ObjectIdentifier, kind: ObjectKind) -> Result<String, CatalogError>;

    /// Execute a statement, returning its status rows
    async fn execute(&self, sql: &str) -> Result<Vec<String>, CatalogError>;
}

/// `SELECT GET_DDL(...)` query for an object
pub fn get_ddl_query(object: &ObjectIdentifier, kind: ObjectKind) -> String {
    format!("SELECT GET_DDL('{}', '{}')", kind.ddl_object_type(), object.fqn())
}

/// `DESCRIBE TABLE|VIEW` query for an object
pub fn describe_query(object: &ObjectIdentifier, kind: ObjectKind) -> String {
    format!("DESCRIBE {} {}", kind.ddl_object_type(), object)
}

/// Drop excluded schemas, comparing case-insensitively
pub fn filter_schemas<S: AsRef<str>>(schemas: Vec<String>, excluded: &[S]) -> Vec<String> {
    schemas
        .into_iter()
        .filter(|schema| !excluded.iter().any(|ex| ex.as_ref().eq_ignore_ascii_case(schema)))
        .collect()
}

/// Narrow a table listing by filter, given the names of dynamic tables
///
/// Standard tables are all tables minus the dynamic ones, in listing order.
pub fn apply_table_filter(all: Vec<String>, dynamic: Vec<String>, filter: TableFilter) -> Vec<String> {
    match filter {
        TableFilter::All => all,
        TableFilter::Dynamic => dynamic,
        TableFilter::Standard => all.into_iter().filter(|t| !dynamic.contains(t)).collect(),
    }
}
