//! Mock warehouse catalog for testing
//!
//! This catalog serves predefined objects without connecting to any warehouse.
//! It's useful for:
//! - Unit testing the inspector and deployer
//! - Offline development of the CLI (`ddlsmith --mock`)
//! - Simulating various error conditions
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ddlsmith_catalog::{MockCatalog, WarehouseCatalog, TableFilter};
//!
//! let catalog = MockCatalog::sample();
//! let tables = catalog.list_tables("BRONZE", TableFilter::All).await?;
//! ```
//!
//! ## Simulating Failures
//!
//! ```rust,ignore
//! let catalog = MockCatalog::new().with_connection_failure();
//! assert!(catalog.test_connection().await.is_err());
//!
//! let catalog = MockCatalog::new().with_latency(100); // 100ms delay
//! ```

use crate::adapter::{
    apply_table_filter, filter_schemas, CatalogError, TableFilter, WarehouseCatalog,
    DEFAULT_EXCLUDED_SCHEMAS,
};
use ddlsmith_core::{ColumnDefinition, ObjectIdentifier, ObjectKind};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Status row returned for every executed statement
pub const EXECUTE_STATUS: &str = "Statement executed successfully.";

/// An object stored in the mock catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockObject {
    pub identifier: ObjectIdentifier,
    pub kind: ObjectKind,
    pub columns: Vec<ColumnDefinition>,

    /// DDL returned by `get_ddl`; tables without one get a rendered column list
    pub ddl: Option<String>,
}

impl MockObject {
    pub fn new(identifier: ObjectIdentifier, kind: ObjectKind, columns: Vec<ColumnDefinition>) -> Self {
        Self {
            identifier,
            kind,
            columns,
            ddl: None,
        }
    }

    pub fn with_ddl(mut self, ddl: impl Into<String>) -> Self {
        self.ddl = Some(ddl.into());
        self
    }

    fn matches(&self, object: &ObjectIdentifier) -> bool {
        self.identifier.schema.eq_ignore_ascii_case(&object.schema)
            && self.identifier.name.eq_ignore_ascii_case(&object.name)
    }

    fn table_ddl(&self) -> String {
        let columns: Vec<String> = self.columns.iter().map(ColumnDefinition::to_column_sql).collect();
        format!(
            "create or replace TABLE {} (\n\t{}\n);",
            self.identifier,
            columns.join(",\n\t")
        )
    }
}

/// Mock warehouse catalog for testing
///
/// Objects are kept in memory, shared between clones.
///
/// # Features
///
/// - Store schemas, tables, views and dynamic tables
/// - Record executed statements
/// - Simulate connection failures and latency
/// - Simulate specific error conditions per object
pub struct MockCatalog {
    /// Schemas, in creation order
    schemas: Arc<RwLock<Vec<String>>>,

    /// Objects, in creation order
    objects: Arc<RwLock<Vec<MockObject>>>,

    /// Errors to return for specific objects, keyed by `SCHEMA.NAME`
    errors: Arc<RwLock<HashMap<String, CatalogError>>>,

    /// Statements passed to `execute`
    executed: Arc<RwLock<Vec<String>>>,

    /// Error returned by `execute`, if any
    execute_error: Option<CatalogError>,

    excluded_schemas: Vec<String>,

    /// Simulate connection failure
    fail_connection: bool,

    /// Simulate query latency (milliseconds)
    latency_ms: u64,

    catalog_name: &'static str,
}

impl MockCatalog {
    /// Create an empty mock catalog
    pub fn new() -> Self {
        Self {
            schemas: Arc::new(RwLock::new(Vec::new())),
            objects: Arc::new(RwLock::new(Vec::new())),
            errors: Arc::new(RwLock::new(HashMap::new())),
            executed: Arc::new(RwLock::new(Vec::new())),
            execute_error: None,
            excluded_schemas: DEFAULT_EXCLUDED_SCHEMAS.iter().map(|s| s.to_string()).collect(),
            fail_connection: false,
            latency_ms: 0,
            catalog_name: "Mock",
        }
    }

    /// Catalog with a small medallion layout (BRONZE, SILVER, GOLD)
    pub fn sample() -> Self {
        MockCatalogBuilder::new()
            .with_schema("BRONZE")
            .with_schema("SILVER")
            .with_schema("GOLD")
            .with_table("BRONZE", "LANDING_USERS", user_columns())
            .with_table("BRONZE", "LANDING_ORDERS", order_columns())
            .with_table("BRONZE", "RAW_LOGS", generic_columns())
            .with_table(
                "SILVER",
                "DIM_CUSTOMERS",
                vec![
                    ColumnDefinition::new("CUSTOMER_ID", "NUMBER(38,0)").with_nullable(false),
                    ColumnDefinition::new("EMAIL", "VARCHAR(256)"),
                    ColumnDefinition::new("SEGMENT", "VARCHAR"),
                ],
            )
            .with_dynamic_table("SILVER", "FACT_ORDERS", order_columns(), SAMPLE_FACT_ORDERS_DDL)
            .with_view(
                "SILVER",
                "V_USERS",
                vec![
                    ColumnDefinition::new("ID", "NUMBER"),
                    ColumnDefinition::new("NAME_UP", "VARCHAR"),
                    ColumnDefinition::new("ID_PREFIX", "VARCHAR"),
                ],
                SAMPLE_V_USERS_DDL,
            )
            .with_table("GOLD", "UNKNOWN_TABLE", generic_columns())
            .build()
    }

    /// Add a schema, if not already present
    pub async fn add_schema(&self, schema: impl Into<String>) {
        let schema = schema.into();
        let mut schemas = self.schemas.write().await;
        if !schemas.iter().any(|s| s.eq_ignore_ascii_case(&schema)) {
            schemas.push(schema);
        }
    }

    /// Add or replace an object, creating its schema if needed
    pub async fn add_object(&self, object: MockObject) {
        self.add_schema(object.identifier.schema.clone()).await;

        let mut objects = self.objects.write().await;
        objects.retain(|o| !o.matches(&object.identifier));
        objects.push(object);
    }

    /// Configure an error to be returned for a specific object
    pub async fn add_error_for_object(&self, object: &ObjectIdentifier, error: CatalogError) {
        self.errors.write().await.insert(error_key(object), error);
    }

    /// Configure to fail all connection tests
    pub fn with_connection_failure(mut self) -> Self {
        self.fail_connection = true;
        self
    }

    /// Configure `execute` to fail with `error`
    pub fn with_execute_failure(mut self, error: CatalogError) -> Self {
        self.execute_error = Some(error);
        self
    }

    /// Configure simulated latency for all operations
    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    /// Replace the schemas hidden from `list_schemas`
    pub fn with_excluded_schemas(mut self, excluded: Vec<String>) -> Self {
        self.excluded_schemas = excluded;
        self
    }

    /// Set a custom catalog name
    pub fn with_name(mut self, name: &'static str) -> Self {
        self.catalog_name = name;
        self
    }

    /// Statements executed so far, oldest first
    pub async fn executed(&self) -> Vec<String> {
        self.executed.read().await.clone()
    }

    /// Get the number of objects stored in the catalog
    pub async fn object_count(&self) -> usize {
        self.objects.read().await.len()
    }

    /// Clear all stored errors
    pub async fn clear_errors(&self) {
        self.errors.write().await.clear();
    }

    /// Find an object of a compatible kind
    ///
    /// Dynamic tables are also tables, so `GET_DDL('TABLE', ...)` style
    /// lookups match both.
    async fn find(&self, object: &ObjectIdentifier, kind: ObjectKind) -> Result<MockObject, CatalogError> {
        if let Some(error) = self.errors.read().await.get(&error_key(object)) {
            return Err(error.clone());
        }

        self.objects
            .read()
            .await
            .iter()
            .find(|o| o.matches(object) && o.kind.ddl_object_type() == kind.ddl_object_type())
            .cloned()
            .ok_or_else(|| CatalogError::ObjectNotFound(object.fqn()))
    }

    async fn names_in(&self, schema: &str, pred: impl Fn(ObjectKind) -> bool) -> Vec<String> {
        self.objects
            .read()
            .await
            .iter()
            .filter(|o| o.identifier.schema.eq_ignore_ascii_case(schema) && pred(o.kind))
            .map(|o| o.identifier.name.clone())
            .collect()
    }

    async fn check_schema(&self, schema: &str) -> Result<(), CatalogError> {
        if self.schemas.read().await.iter().any(|s| s.eq_ignore_ascii_case(schema)) {
            Ok(())
        } else {
            Err(CatalogError::ObjectNotFound(format!("Schema '{}'", schema)))
        }
    }

    /// Simulate latency if configured
    async fn simulate_latency(&self) {
        if self.latency_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.latency_ms)).await;
        }
    }
}

fn error_key(object: &ObjectIdentifier) -> String {
    format!("{}.{}", object.schema, object.name).to_uppercase()
}

impl Default for MockCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MockCatalog {
    fn clone(&self) -> Self {
        Self {
            schemas: Arc::clone(&self.schemas),
            objects: Arc::clone(&self.objects),
            errors: Arc::clone(&self.errors),
            executed: Arc::clone(&self.executed),
            execute_error: self.execute_error.clone(),
            excluded_schemas: self.excluded_schemas.clone(),
            fail_connection: self.fail_connection,
            latency_ms: self.latency_ms,
            catalog_name: self.catalog_name,
        }
    }
}

#[async_trait::async_trait]
impl WarehouseCatalog for MockCatalog {
    fn name(&self) -> &'static str {
        self.catalog_name
    }

    async fn test_connection(&self) -> Result<(), CatalogError> {
        self.simulate_latency().await;

        if self.fail_connection {
            Err(CatalogError::Network("Simulated connection failure".to_string()))
        } else {
            Ok(())
        }
    }

    async fn list_schemas(&self, _database: &str) -> Result<Vec<String>, CatalogError> {
        self.simulate_latency().await;

        let schemas = self.schemas.read().await.clone();
        Ok(filter_schemas(schemas, &self.excluded_schemas))
    }

    async fn list_tables(&self, schema: &str, filter: TableFilter) -> Result<Vec<String>, CatalogError> {
        self.simulate_latency().await;
        self.check_schema(schema).await?;

        let all = self.names_in(schema, |k| k != ObjectKind::View).await;
        let dynamic = self.names_in(schema, |k| k == ObjectKind::DynamicTable).await;
        Ok(apply_table_filter(all, dynamic, filter))
    }

    async fn list_views(&self, schema: &str) -> Result<Vec<String>, CatalogError> {
        self.simulate_latency().await;
        self.check_schema(schema).await?;

        Ok(self.names_in(schema, |k| k == ObjectKind::View).await)
    }

    async fn describe_columns(
        &self,
        object: &ObjectIdentifier,
        kind: ObjectKind,
    ) -> Result<Vec<ColumnDefinition>, CatalogError> {
        self.simulate_latency().await;
        Ok(self.find(object, kind).await?.columns)
    }

    async fn get_ddl(&self, object: &ObjectIdentifier, kind: ObjectKind) -> Result<String, CatalogError> {
        self.simulate_latency().await;

        let found = self.find(object, kind).await?;
        match (&found.ddl, found.kind) {
            (Some(ddl), _) => Ok(ddl.clone()),
            (None, ObjectKind::Table) => Ok(found.table_ddl()),
            (None, _) => Err(CatalogError::InvalidResponse(format!(
                "No DDL recorded for {}",
                object.fqn()
            ))),
        }
    }

    async fn execute(&self, sql: &str) -> Result<Vec<String>, CatalogError> {
        self.simulate_latency().await;

        if let Some(error) = &self.execute_error {
            return Err(error.clone());
        }

        self.executed.write().await.push(sql.to_string());
        Ok(vec![EXECUTE_STATUS.to_string()])
    }
}

/// Builder for creating a MockCatalog with predefined objects
///
/// ```rust,ignore
/// let catalog = MockCatalogBuilder::new()
///     .with_table("BRONZE", "USERS", vec![ColumnDefinition::new("ID", "NUMBER")])
///     .with_latency(50)
///     .build();
/// ```
pub struct MockCatalogBuilder {
    schemas: Vec<String>,
    objects: Vec<MockObject>,
    errors: HashMap<String, CatalogError>,
    fail_connection: bool,
    latency_ms: u64,
}

impl MockCatalogBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            schemas: Vec::new(),
            objects: Vec::new(),
            errors: HashMap::new(),
            fail_connection: false,
            latency_ms: 0,
        }
    }

    /// Add an empty schema
    pub fn with_schema(mut self, schema: &str) -> Self {
        if !self.schemas.iter().any(|s| s.eq_ignore_ascii_case(schema)) {
            self.schemas.push(schema.to_string());
        }
        self
    }

    /// Add any object
    pub fn with_object(self, object: MockObject) -> Self {
        let mut builder = self.with_schema(&object.identifier.schema.clone());
        builder.objects.retain(|o| !o.matches(&object.identifier));
        builder.objects.push(object);
        builder
    }

    /// Add a standard table
    pub fn with_table(self, schema: &str, name: &str, columns: Vec<ColumnDefinition>) -> Self {
        self.with_object(MockObject::new(ObjectIdentifier::new(schema, name), ObjectKind::Table, columns))
    }

    /// Add a view with its DDL
    pub fn with_view(self, schema: &str, name: &str, columns: Vec<ColumnDefinition>, ddl: &str) -> Self {
        self.with_object(
            MockObject::new(ObjectIdentifier::new(schema, name), ObjectKind::View, columns).with_ddl(ddl),
        )
    }

    /// Add a dynamic table with its DDL
    pub fn with_dynamic_table(self, schema: &str, name: &str, columns: Vec<ColumnDefinition>, ddl: &str) -> Self {
        self.with_object(
            MockObject::new(ObjectIdentifier::new(schema, name), ObjectKind::DynamicTable, columns)
                .with_ddl(ddl),
        )
    }

    /// Configure an error for an object
    pub fn with_error(mut self, schema: &str, name: &str, error: CatalogError) -> Self {
        self.errors.insert(error_key(&ObjectIdentifier::new(schema, name)), error);
        self
    }

    /// Configure connection failure
    pub fn with_connection_failure(mut self) -> Self {
        self.fail_connection = true;
        self
    }

    /// Configure simulated latency
    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    /// Build the MockCatalog
    pub fn build(self) -> MockCatalog {
        MockCatalog {
            schemas: Arc::new(RwLock::new(self.schemas)),
            objects: Arc::new(RwLock::new(self.objects)),
            errors: Arc::new(RwLock::new(self.errors)),
            fail_connection: self.fail_connection,
            latency_ms: self.latency_ms,
            ..MockCatalog::new()
        }
    }
}

impl Default for MockCatalogBuilder {
    fn default() -> Self {
        Self::new()
    }
}

const SAMPLE_V_USERS_DDL: &str = "create or replace view SILVER.V_USERS(\n\tID,\n\tNAME_UP,\n\tID_PREFIX\n) as\nSELECT\n\tID::NUMBER AS ID,\n\tUPPER(NAME)::VARCHAR AS NAME_UP,\n\tLEFT(ID, 2)::VARCHAR AS ID_PREFIX\nFROM BRONZE.LANDING_USERS;";

const SAMPLE_FACT_ORDERS_DDL: &str = "create or replace dynamic table SILVER.FACT_ORDERS(\n\tORDER_ID,\n\tUSER_ID,\n\tAMOUNT\n) target_lag = '1 minute' refresh_mode = AUTO initialize = ON_CREATE warehouse = ETL_WH\n as\nSELECT\n\tORDER_ID::NUMBER AS ORDER_ID,\n\tUSER_ID::NUMBER AS USER_ID,\n\tROUND(AMOUNT, 2)::FLOAT AS AMOUNT\nFROM ANALYTICS.BRONZE.LANDING_ORDERS;";

fn user_columns() -> Vec<ColumnDefinition> {
    vec![
        ColumnDefinition::new("ID", "NUMBER").with_nullable(false),
        ColumnDefinition::new("NAME", "VARCHAR"),
        ColumnDefinition::new("CREATED_AT", "TIMESTAMP"),
    ]
}

fn order_columns() -> Vec<ColumnDefinition> {
    vec![
        ColumnDefinition::new("ORDER_ID", "NUMBER").with_nullable(false),
        ColumnDefinition::new("USER_ID", "NUMBER"),
        ColumnDefinition::new("AMOUNT", "FLOAT"),
    ]
}

fn generic_columns() -> Vec<ColumnDefinition> {
    vec![
        ColumnDefinition::new("COL_1", "VARCHAR"),
        ColumnDefinition::new("COL_2", "NUMBER"),
    ]
}
