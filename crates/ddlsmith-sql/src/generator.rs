//! CREATE statement generation
//!
//! Renders tables, views and dynamic tables from column lists. Generated
//! view and dynamic table statements use the `expr::TYPE AS alias` shape, so
//! they can be read back with the extractors in this crate.

use ddlsmith_core::config::DefaultsConfig;
use ddlsmith_core::{ColumnDefinition, ColumnProjection, ObjectIdentifier, ObjectKind, SourceReference};
use serde::{Deserialize, Serialize};

/// Why a definition cannot be rendered
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error("{0} has no columns")]
    NoColumns(String),

    #[error("{object} is missing required option {option}")]
    MissingOption { object: String, option: &'static str },

    #[error("{object} has an invalid {option} value: {value}")]
    InvalidOption { object: String, option: &'static str, value: String },
}

/// An object definition that renders to a CREATE statement
pub trait CreateStatement {
    /// Kind of object created
    fn kind(&self) -> ObjectKind;

    /// Object being created
    fn identifier(&self) -> ObjectIdentifier;

    /// Render the `CREATE OR REPLACE` statement
    fn create_ddl(&self) -> Result<String, GenerationError>;

    /// SQL handed to the syntax validator
    ///
    /// Defaults to the full statement.
    fn validation_sql(&self) -> Result<String, GenerationError> {
        self.create_ddl()
    }
}

/// A standard table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDefinition {
    pub schema: String,
    pub name: String,
    #[serde(default)]
    pub columns: Vec<ColumnDefinition>,
}

impl TableDefinition {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
            columns: Vec::new(),
        }
    }

    pub fn with_column(mut self, column: ColumnDefinition) -> Self {
        self.columns.push(column);
        self
    }

    pub fn with_columns(mut self, columns: Vec<ColumnDefinition>) -> Self {
        self.columns = columns;
        self
    }
}

impl CreateStatement for TableDefinition {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Table
    }

    fn identifier(&self) -> ObjectIdentifier {
        ObjectIdentifier::new(self.schema.clone(), self.name.clone())
    }

    fn create_ddl(&self) -> Result<String, GenerationError> {
        // rows without a name are placeholders
        let columns: Vec<String> = self
            .columns
            .iter()
            .filter(|c| !c.name.trim().is_empty())
            .map(ColumnDefinition::to_column_sql)
            .collect();

        if columns.is_empty() {
            return Err(GenerationError::NoColumns(self.identifier().fqn()));
        }

        Ok(format!(
            "CREATE OR REPLACE TABLE {} (\n\t{}\n);",
            self.identifier(),
            columns.join(",\n\t")
        ))
    }
}

/// A view over a single source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewDefinition {
    pub schema: String,
    pub name: String,
    pub source: SourceReference,
    #[serde(default)]
    pub projections: Vec<ColumnProjection>,
}

impl ViewDefinition {
    pub fn new(schema: impl Into<String>, name: impl Into<String>, source: SourceReference) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
            source,
            projections: Vec::new(),
        }
    }

    pub fn with_projection(mut self, projection: ColumnProjection) -> Self {
        self.projections.push(projection);
        self
    }

    pub fn with_projections(mut self, projections: Vec<ColumnProjection>) -> Self {
        self.projections = projections;
        self
    }
}

impl CreateStatement for ViewDefinition {
    fn kind(&self) -> ObjectKind {
        ObjectKind::View
    }

    fn identifier(&self) -> ObjectIdentifier {
        ObjectIdentifier::new(self.schema.clone(), self.name.clone())
    }

    fn create_ddl(&self) -> Result<String, GenerationError> {
        let query = select_statement(&self.identifier(), &self.source, &self.projections)?;
        Ok(format!("CREATE OR REPLACE VIEW {} AS\n{};", self.identifier(), query))
    }
}

/// A dynamic table refreshed from a single source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicTableDefinition {
    pub schema: String,
    pub name: String,
    #[serde(default)]
    pub target_lag: Option<String>,
    #[serde(default)]
    pub warehouse: Option<String>,
    pub source: SourceReference,
    #[serde(default)]
    pub projections: Vec<ColumnProjection>,
}

impl DynamicTableDefinition {
    pub fn new(schema: impl Into<String>, name: impl Into<String>, source: SourceReference) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
            target_lag: None,
            warehouse: None,
            source,
            projections: Vec::new(),
        }
    }

    pub fn with_target_lag(mut self, target_lag: impl Into<String>) -> Self {
        self.target_lag = Some(target_lag.into());
        self
    }

    pub fn with_warehouse(mut self, warehouse: impl Into<String>) -> Self {
        self.warehouse = Some(warehouse.into());
        self
    }

    pub fn with_projection(mut self, projection: ColumnProjection) -> Self {
        self.projections.push(projection);
        self
    }

    pub fn with_projections(mut self, projections: Vec<ColumnProjection>) -> Self {
        self.projections = projections;
        self
    }

    /// Fill unset options from configured defaults
    pub fn with_defaults(mut self, defaults: &DefaultsConfig) -> Self {
        if self.target_lag.is_none() {
            self.target_lag = defaults.target_lag.clone();
        }
        if self.warehouse.is_none() {
            self.warehouse = defaults.warehouse.clone();
        }
        self
    }

    fn require(&self, value: &Option<String>, option: &'static str) -> Result<String, GenerationError> {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .ok_or_else(|| GenerationError::MissingOption {
                object: self.identifier().fqn(),
                option,
            })
    }
}

impl CreateStatement for DynamicTableDefinition {
    fn kind(&self) -> ObjectKind {
        ObjectKind::DynamicTable
    }

    fn identifier(&self) -> ObjectIdentifier {
        ObjectIdentifier::new(self.schema.clone(), self.name.clone())
    }

    fn create_ddl(&self) -> Result<String, GenerationError> {
        let target_lag = self.require(&self.target_lag, "TARGET_LAG")?;
        // rendered inside a string literal
        if target_lag.contains('\'') {
            return Err(GenerationError::InvalidOption {
                object: self.identifier().fqn(),
                option: "TARGET_LAG",
                value: target_lag,
            });
        }
        let warehouse = self.require(&self.warehouse, "WAREHOUSE")?;
        let query = select_statement(&self.identifier(), &self.source, &self.projections)?;

        Ok(format!(
            "CREATE OR REPLACE DYNAMIC TABLE {}\n\tTARGET_LAG = '{}'\n\tWAREHOUSE = {}\nAS\n{};",
            self.identifier(),
            target_lag,
            warehouse,
            query
        ))
    }

    // The dialect parser has no dynamic table grammar; check the query only.
    fn validation_sql(&self) -> Result<String, GenerationError> {
        select_statement(&self.identifier(), &self.source, &self.projections)
    }
}

fn select_statement(
    object: &ObjectIdentifier,
    source: &SourceReference,
    projections: &[ColumnProjection],
) -> Result<String, GenerationError> {
    let items: Vec<String> = projections
        .iter()
        .filter(|p| !p.transformation.trim().is_empty())
        .map(ColumnProjection::to_select_item)
        .collect();

    if items.is_empty() {
        return Err(GenerationError::NoColumns(object.fqn()));
    }

    Ok(format!("SELECT\n\t{}\nFROM {}", items.join(",\n\t"), source))
}

/// Any definition, tagged by kind, as read from an object spec file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ObjectSpec {
    Table(TableDefinition),
    View(ViewDefinition),
    DynamicTable(DynamicTableDefinition),
}

impl ObjectSpec {
    /// Parse an object spec from TOML
    pub fn from_toml(toml: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml)
    }

    /// Render as TOML, in the form [`ObjectSpec::from_toml`] reads
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Apply configured defaults to options the TOML leaves unset
    pub fn with_defaults(self, defaults: &DefaultsConfig) -> Self {
        match self {
            Self::DynamicTable(dt) => Self::DynamicTable(dt.with_defaults(defaults)),
            other => other,
        }
    }

    /// Borrow the definition as a statement
    pub fn as_statement(&self) -> &dyn CreateStatement {
        match self {
            Self::Table(t) => t,
            Self::View(v) => v,
            Self::DynamicTable(dt) => dt,
        }
    }
}
