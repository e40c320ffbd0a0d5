//! Value records recovered from, or rendered into, warehouse DDL

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of warehouse object a statement creates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    /// Standard table
    Table,

    /// Logical view
    View,

    /// Auto-refreshing table defined by a query
    DynamicTable,
}

impl ObjectKind {
    /// Object type argument for `GET_DDL`
    ///
    /// Snowflake reports dynamic tables under `TABLE`.
    pub fn ddl_object_type(&self) -> &'static str {
        match self {
            Self::Table | Self::DynamicTable => "TABLE",
            Self::View => "VIEW",
        }
    }

    /// Whether statements of this kind carry a `SELECT ... FROM` body
    pub fn has_query(&self) -> bool {
        matches!(self, Self::View | Self::DynamicTable)
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table => write!(f, "Table"),
            Self::View => write!(f, "View"),
            Self::DynamicTable => write!(f, "Dynamic Table"),
        }
    }
}

impl FromStr for ObjectKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', '_'], " ").as_str() {
            "table" => Ok(Self::Table),
            "view" => Ok(Self::View),
            "dynamic table" | "dynamic" => Ok(Self::DynamicTable),
            other => Err(format!("unknown object kind: {}", other)),
        }
    }
}

/// Identifies an object in the warehouse
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectIdentifier {
    /// Database name, when qualified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,

    /// Schema name
    pub schema: String,

    /// Object name
    pub name: String,
}

impl ObjectIdentifier {
    /// Create a schema-qualified identifier
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            database: None,
            schema: schema.into(),
            name: name.into(),
        }
    }

    /// Set the database qualifier
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Parse `SCHEMA.NAME` or `DATABASE.SCHEMA.NAME`
    pub fn parse(qualified: &str) -> Option<Self> {
        let parts: Vec<&str> = qualified.trim().split('.').map(str::trim).collect();
        if parts.iter().any(|p| p.is_empty()) {
            return None;
        }

        match parts.as_slice() {
            [schema, name] => Some(Self::new(*schema, *name)),
            [database, schema, name] => Some(Self::new(*schema, *name).with_database(*database)),
            _ => None,
        }
    }

    /// Get fully qualified name
    pub fn fqn(&self) -> String {
        match &self.database {
            Some(db) => format!("{}.{}.{}", db, self.schema, self.name),
            None => format!("{}.{}", self.schema, self.name),
        }
    }
}

impl fmt::Display for ObjectIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fqn())
    }
}

/// One output column recovered from a SELECT list
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnProjection {
    /// Column name after `AS`
    pub alias: String,

    /// Target type of an explicit `::TYPE` cast
    pub output_type: Option<String>,

    /// Expression producing the value (may be a bare column reference)
    pub transformation: String,
}

impl ColumnProjection {
    /// Create a projection
    pub fn new(
        transformation: impl Into<String>,
        output_type: Option<String>,
        alias: impl Into<String>,
    ) -> Self {
        Self {
            alias: alias.into(),
            output_type,
            transformation: transformation.into(),
        }
    }

    /// Create a cast projection (`expr::TYPE AS alias`)
    pub fn cast(
        transformation: impl Into<String>,
        output_type: impl Into<String>,
        alias: impl Into<String>,
    ) -> Self {
        Self::new(transformation, Some(output_type.into()), alias)
    }

    /// Render as a select-list item
    pub fn to_select_item(&self) -> String {
        match &self.output_type {
            Some(ty) => format!("{}::{} AS {}", self.transformation, ty, self.alias),
            None if self.alias.is_empty() || self.alias == self.transformation => {
                self.transformation.clone()
            }
            None => format!("{} AS {}", self.transformation, self.alias),
        }
    }
}

/// A select-list candidate, tagged by whether it could be decomposed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ProjectionItem {
    /// `expr::TYPE AS alias`
    Recognized(ColumnProjection),

    /// Anything else, kept verbatim
    Unrecognized { raw: String },
}

impl ProjectionItem {
    /// Whether this candidate was decomposed
    pub fn is_recognized(&self) -> bool {
        matches!(self, Self::Recognized(_))
    }
}

/// Upstream object named in a FROM clause
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceReference {
    /// Schema qualifier
    pub schema: String,

    /// Table or view name
    pub object_name: String,
}

impl SourceReference {
    pub fn new(schema: impl Into<String>, object_name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            object_name: object_name.into(),
        }
    }

    /// `SCHEMA.OBJECT`
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.schema, self.object_name)
    }
}

impl fmt::Display for SourceReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.qualified_name())
    }
}

/// Options found in a CREATE statement tail
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableOptions {
    /// Compute resource assigned with `WAREHOUSE = name`
    pub warehouse: Option<String>,

    /// Refresh interval from `TARGET_LAG = '...'`
    pub target_lag: Option<String>,
}

impl TableOptions {
    /// True when neither option was found
    pub fn is_empty(&self) -> bool {
        self.warehouse.is_none() && self.target_lag.is_none()
    }
}

/// A physical column as reported by `DESCRIBE` or entered for a new table
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnDefinition {
    /// Column name
    pub name: String,

    /// Warehouse type, e.g. `NUMBER(38,0)`
    pub data_type: String,

    /// Whether NULLs are allowed
    #[serde(default = "default_nullable")]
    pub nullable: bool,
}

fn default_nullable() -> bool {
    true
}

impl ColumnDefinition {
    /// Create a nullable column
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable: true,
        }
    }

    /// Set nullability
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Build from a `DESCRIBE` row (`name`, `type`, `null?`)
    pub fn from_describe_row(name: &str, data_type: &str, null_flag: &str) -> Self {
        Self::new(name, data_type).with_nullable(parse_nullable_flag(null_flag))
    }

    /// Render as a column definition inside `CREATE TABLE`
    pub fn to_column_sql(&self) -> String {
        if self.nullable {
            format!("{} {}", self.name, self.data_type)
        } else {
            format!("{} {} NOT NULL", self.name, self.data_type)
        }
    }
}

/// Interpret the `null?` column of `DESCRIBE` output
///
/// `N`, `NO` and `FALSE` mean NOT NULL; anything else is nullable.
pub fn parse_nullable_flag(flag: &str) -> bool {
    !matches!(flag.trim().to_uppercase().as_str(), "N" | "NO" | "FALSE")
}
