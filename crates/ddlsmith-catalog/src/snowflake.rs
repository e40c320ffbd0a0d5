//! Snowflake catalog using SHOW, DESCRIBE and GET_DDL
//!
//! Requires USAGE on the database and schemas being listed, and ownership or
//! a role with access to object definitions for `GET_DDL`.
//!
//! ## Authentication Methods
//!
//! 1. Password authentication (username/password)
//! 2. Key-pair authentication (private key PEM)
//!
//! ## Usage
//!
//! ```rust,ignore
//! let catalog = SnowflakeCatalog::with_password("xy12345.us-east-1", "username", "password")
//!     .with_warehouse("COMPUTE_WH")
//!     .with_role("SYSADMIN")
//!     .build()?;
//! ```
//!
//! Reference: https://docs.snowflake.com/en/sql-reference/functions/get_ddl

use crate::adapter::{
    describe_query, get_ddl_query, CatalogError, TableFilter, WarehouseCatalog,
    DEFAULT_EXCLUDED_SCHEMAS,
};
use ddlsmith_core::{ColumnDefinition, ConnectionConfig, ObjectIdentifier, ObjectKind};

#[cfg(feature = "snowflake")]
use crate::adapter::{apply_table_filter, filter_schemas};

#[cfg(feature = "snowflake")]
use snowflake_api::{QueryResult, SnowflakeApi};

#[cfg(feature = "snowflake")]
use arrow_array::cast::AsArray;

#[cfg(feature = "snowflake")]
use arrow_array::Array;

#[cfg(not(feature = "snowflake"))]
const NOT_COMPILED: &str = "Snowflake support not compiled. Rebuild with: cargo build --features snowflake";

#[derive(Clone)]
pub enum SnowflakeCredentials {
    /// Password-based authentication
    Password(String),
    /// Key-pair authentication (PEM format private key)
    PrivateKey(String),
}

impl SnowflakeCredentials {
    /// Read credentials from the environment
    ///
    /// A private key takes precedence over a password.
    pub fn from_env() -> Result<Self, CatalogError> {
        if let Ok(key) = std::env::var(ConnectionConfig::PRIVATE_KEY_ENV) {
            return Ok(Self::PrivateKey(key));
        }

        std::env::var(ConnectionConfig::PASSWORD_ENV)
            .map(Self::Password)
            .map_err(|_| {
                CatalogError::Config(format!(
                    "Set {} or {} to connect to Snowflake",
                    ConnectionConfig::PASSWORD_ENV,
                    ConnectionConfig::PRIVATE_KEY_ENV
                ))
            })
    }
}

/// Builder for SnowflakeCatalog
pub struct SnowflakeCatalogBuilder {
    account: String,
    username: String,
    credentials: SnowflakeCredentials,
    warehouse: Option<String>,
    role: Option<String>,
    database: Option<String>,
    excluded_schemas: Vec<String>,
}

impl SnowflakeCatalogBuilder {
    /// Create a builder with explicit credentials
    pub fn new(account: impl Into<String>, username: impl Into<String>, credentials: SnowflakeCredentials) -> Self {
        Self {
            account: account.into(),
            username: username.into(),
            credentials,
            warehouse: None,
            role: None,
            database: None,
            excluded_schemas: DEFAULT_EXCLUDED_SCHEMAS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Create a builder from connection settings
    pub fn from_config(config: &ConnectionConfig, credentials: SnowflakeCredentials) -> Self {
        let mut builder = Self::new(&config.account, &config.user, credentials);
        builder.warehouse = config.warehouse.clone();
        builder.role = config.role.clone();
        builder.database = config.database.clone();
        builder
    }

    /// Set the warehouse to use
    pub fn with_warehouse(mut self, warehouse: impl Into<String>) -> Self {
        self.warehouse = Some(warehouse.into());
        self
    }

    /// Set the role to use
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Set the default database
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Replace the schemas hidden from `list_schemas`
    pub fn with_excluded_schemas(mut self, excluded: Vec<String>) -> Self {
        self.excluded_schemas = excluded;
        self
    }

    /// Build the catalog
    #[cfg(feature = "snowflake")]
    pub fn build(self) -> Result<SnowflakeCatalog, CatalogError> {
        let api = match &self.credentials {
            SnowflakeCredentials::Password(password) => SnowflakeApi::with_password_auth(
                &self.account,
                self.warehouse.as_deref(),
                self.database.as_deref(),
                None, // schema
                &self.username,
                self.role.as_deref(),
                password,
            )
            .map_err(|e| {
                CatalogError::Authentication(format!("Failed to authenticate with Snowflake: {}", e))
            })?,
            SnowflakeCredentials::PrivateKey(private_key_pem) => SnowflakeApi::with_certificate_auth(
                &self.account,
                self.warehouse.as_deref(),
                self.database.as_deref(),
                None, // schema
                &self.username,
                self.role.as_deref(),
                private_key_pem,
            )
            .map_err(|e| {
                CatalogError::Authentication(format!("Failed to authenticate with key-pair: {}", e))
            })?,
        };

        tracing::info!(account = %self.account, "connected to Snowflake");

        Ok(SnowflakeCatalog {
            api,
            excluded_schemas: self.excluded_schemas,
        })
    }

    /// Build without snowflake feature
    #[cfg(not(feature = "snowflake"))]
    pub fn build(self) -> Result<SnowflakeCatalog, CatalogError> {
        Err(CatalogError::Config(NOT_COMPILED.to_string()))
    }
}

/// Snowflake warehouse catalog
pub struct SnowflakeCatalog {
    #[cfg(feature = "snowflake")]
    api: SnowflakeApi,

    #[cfg_attr(not(feature = "snowflake"), allow(dead_code))]
    excluded_schemas: Vec<String>,
}

impl SnowflakeCatalog {
    /// Builder with password authentication
    pub fn with_password(
        account: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> SnowflakeCatalogBuilder {
        SnowflakeCatalogBuilder::new(account, username, SnowflakeCredentials::Password(password.into()))
    }

    /// Builder with key-pair authentication
    pub fn with_key_pair(
        account: impl Into<String>,
        username: impl Into<String>,
        private_key_pem: impl Into<String>,
    ) -> SnowflakeCatalogBuilder {
        SnowflakeCatalogBuilder::new(
            account,
            username,
            SnowflakeCredentials::PrivateKey(private_key_pem.into()),
        )
    }
}

#[cfg(feature = "snowflake")]
impl SnowflakeCatalog {
    async fn query(&self, sql: &str, object: &str) -> Result<QueryResult, CatalogError> {
        tracing::debug!(sql = %sql, "running Snowflake query");
        self.api
            .exec(sql)
            .await
            .map_err(|e| CatalogError::from_message(object, e.to_string()))
    }

    /// Run `sql` and read the named columns of every row as strings
    ///
    /// An empty name reads the first column.
    async fn rows(&self, sql: &str, object: &str, columns: &[&str]) -> Result<Vec<Vec<String>>, CatalogError> {
        match self.query(sql, object).await? {
            QueryResult::Arrow(batches) => {
                let mut rows = Vec::new();
                for batch in batches {
                    let schema = batch.schema();
                    let mut arrays = Vec::with_capacity(columns.len());
                    for column in columns {
                        let idx = if column.is_empty() {
                            0
                        } else {
                            schema.index_of(column).map_err(|_| {
                                CatalogError::InvalidResponse(format!("Missing {} column", column))
                            })?
                        };
                        let array = batch.column(idx).as_string_opt::<i32>().ok_or_else(|| {
                            CatalogError::InvalidResponse(format!("Column {} is not a string", column))
                        })?;
                        arrays.push(array);
                    }

                    for row_idx in 0..batch.num_rows() {
                        rows.push(
                            arrays
                                .iter()
                                .map(|a| if a.is_null(row_idx) { String::new() } else { a.value(row_idx).to_string() })
                                .collect(),
                        );
                    }
                }
                Ok(rows)
            }
            QueryResult::Json(json) => {
                let indices = columns
                    .iter()
                    .map(|column| {
                        if column.is_empty() {
                            return Ok(0);
                        }
                        json.schema
                            .iter()
                            .position(|f| f.name.eq_ignore_ascii_case(column))
                            .ok_or_else(|| CatalogError::InvalidResponse(format!("Missing {} column", column)))
                    })
                    .collect::<Result<Vec<_>, _>>()?;

                let rows = json
                    .value
                    .as_array()
                    .ok_or_else(|| CatalogError::InvalidResponse("Expected a row array".to_string()))?;

                Ok(rows
                    .iter()
                    .map(|row| {
                        indices
                            .iter()
                            .map(|&idx| match row.get(idx) {
                                Some(serde_json::Value::String(s)) => s.clone(),
                                Some(serde_json::Value::Null) | None => String::new(),
                                Some(other) => other.to_string(),
                            })
                            .collect()
                    })
                    .collect())
            }
            QueryResult::Empty => Ok(Vec::new()),
        }
    }

    async fn names(&self, sql: &str, object: &str) -> Result<Vec<String>, CatalogError> {
        Ok(self
            .rows(sql, object, &["name"])
            .await?
            .into_iter()
            .filter_map(|row| row.into_iter().next())
            .collect())
    }
}

#[async_trait::async_trait]
impl WarehouseCatalog for SnowflakeCatalog {
    fn name(&self) -> &'static str {
        "Snowflake"
    }

    #[cfg(feature = "snowflake")]
    async fn test_connection(&self) -> Result<(), CatalogError> {
        self.api
            .exec("SELECT 1")
            .await
            .map_err(|e| CatalogError::Network(format!("Connection test failed: {}", e)))?;
        Ok(())
    }

    #[cfg(feature = "snowflake")]
    async fn list_schemas(&self, database: &str) -> Result<Vec<String>, CatalogError> {
        let schemas = self
            .names(&format!("SHOW SCHEMAS IN DATABASE {}", database), database)
            .await?;
        Ok(filter_schemas(schemas, &self.excluded_schemas))
    }

    #[cfg(feature = "snowflake")]
    async fn list_tables(&self, schema: &str, filter: TableFilter) -> Result<Vec<String>, CatalogError> {
        let all = match filter {
            TableFilter::Dynamic => Vec::new(),
            _ => self.names(&format!("SHOW TABLES IN SCHEMA {}", schema), schema).await?,
        };
        if filter == TableFilter::All {
            return Ok(all);
        }

        let dynamic = self
            .names(&format!("SHOW DYNAMIC TABLES IN SCHEMA {}", schema), schema)
            .await?;
        Ok(apply_table_filter(all, dynamic, filter))
    }

    #[cfg(feature = "snowflake")]
    async fn list_views(&self, schema: &str) -> Result<Vec<String>, CatalogError> {
        self.names(&format!("SHOW VIEWS IN SCHEMA {}", schema), schema).await
    }

    #[cfg(feature = "snowflake")]
    async fn describe_columns(
        &self,
        object: &ObjectIdentifier,
        kind: ObjectKind,
    ) -> Result<Vec<ColumnDefinition>, CatalogError> {
        let rows = self
            .rows(&describe_query(object, kind), &object.fqn(), &["name", "type", "null?"])
            .await?;

        if rows.is_empty() {
            return Err(CatalogError::ObjectNotFound(object.fqn()));
        }

        Ok(rows
            .iter()
            .map(|row| ColumnDefinition::from_describe_row(&row[0], &row[1], &row[2]))
            .collect())
    }

    #[cfg(feature = "snowflake")]
    async fn get_ddl(&self, object: &ObjectIdentifier, kind: ObjectKind) -> Result<String, CatalogError> {
        self.rows(&get_ddl_query(object, kind), &object.fqn(), &[""])
            .await?
            .into_iter()
            .next()
            .and_then(|row| row.into_iter().next())
            .ok_or_else(|| CatalogError::ObjectNotFound(object.fqn()))
    }

    #[cfg(feature = "snowflake")]
    async fn execute(&self, sql: &str) -> Result<Vec<String>, CatalogError> {
        tracing::info!("executing statement on Snowflake");
        Ok(self
            .rows(sql, "statement", &[""])
            .await?
            .into_iter()
            .filter_map(|row| row.into_iter().next())
            .collect())
    }

    #[cfg(not(feature = "snowflake"))]
    async fn test_connection(&self) -> Result<(), CatalogError> {
        Err(CatalogError::Config(NOT_COMPILED.to_string()))
    }

    #[cfg(not(feature = "snowflake"))]
    async fn list_schemas(&self, _database: &str) -> Result<Vec<String>, CatalogError> {
        Err(CatalogError::Config(NOT_COMPILED.to_string()))
    }

    #[cfg(not(feature = "snowflake"))]
    async fn list_tables(&self, _schema: &str, _filter: TableFilter) -> Result<Vec<String>, CatalogError> {
        Err(CatalogError::Config(NOT_COMPILED.to_string()))
    }

    #[cfg(not(feature = "snowflake"))]
    async fn list_views(&self, _schema: &str) -> Result<Vec<String>, CatalogError> {
        Err(CatalogError::Config(NOT_COMPILED.to_string()))
    }

    #[cfg(not(feature = "snowflake"))]
    async fn describe_columns(
        &self,
        object: &ObjectIdentifier,
        kind: ObjectKind,
    ) -> Result<Vec<ColumnDefinition>, CatalogError> {
        tracing::debug!(query = %describe_query(object, kind), "snowflake feature disabled");
        Err(CatalogError::Config(NOT_COMPILED.to_string()))
    }

    #[cfg(not(feature = "snowflake"))]
    async fn get_ddl(&self, object: &ObjectIdentifier, kind: ObjectKind) -> Result<String, CatalogError> {
        tracing::debug!(query = %get_ddl_query(object, kind), "snowflake feature disabled");
        Err(CatalogError::Config(NOT_COMPILED.to_string()))
    }

    #[cfg(not(feature = "snowflake"))]
    async fn execute(&self, _sql: &str) -> Result<Vec<String>, CatalogError> {
        Err(CatalogError::Config(NOT_COMPILED.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_from_config() {
        let config = ConnectionConfig {
            account: "xy12345.us-east-1".to_string(),
            user: "ETL_USER".to_string(),
            warehouse: Some("COMPUTE_WH".to_string()),
            role: None,
            database: Some("ANALYTICS".to_string()),
        };
        let builder = SnowflakeCatalogBuilder::from_config(&config, SnowflakeCredentials::Password("pw".to_string()))
            .with_role("SYSADMIN");

        assert_eq!(builder.account, "xy12345.us-east-1");
        assert_eq!(builder.warehouse.as_deref(), Some("COMPUTE_WH"));
        assert_eq!(builder.role.as_deref(), Some("SYSADMIN"));
        assert_eq!(builder.excluded_schemas, vec!["INFORMATION_SCHEMA", "PUBLIC"]);
    }

    #[cfg(not(feature = "snowflake"))]
    #[test]
    fn test_build_without_feature() {
        let result = SnowflakeCatalog::with_password("account", "user", "pass").build();
        assert!(matches!(result, Err(CatalogError::Config(_))));
    }
}
