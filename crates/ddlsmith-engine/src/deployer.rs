//! Deployment of DDL: validate first, then execute against the catalog

use ddlsmith_catalog::{CatalogError, WarehouseCatalog};
use ddlsmith_core::{Diagnostic, ObjectIdentifier, ObjectKind};
use ddlsmith_sql::{CreateStatement, DdlValidator, ValidationError};
use serde::Serialize;
use std::sync::Arc;

/// Why a deployment did not happen or failed
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Execution failed: {0}")]
    Catalog(#[from] CatalogError),
}

impl DeployError {
    /// Convert to a diagnostic, located at `object` when given
    pub fn to_diagnostic(&self, object: Option<&str>) -> Diagnostic {
        match self {
            Self::Validation(err) => err.to_diagnostic(object),
            Self::Catalog(err) => err.to_diagnostic(object),
        }
    }
}

/// Result of an executed statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeployOutcome {
    /// Object created, when known
    pub object: Option<ObjectIdentifier>,

    pub kind: Option<ObjectKind>,

    /// Statement as executed
    pub statement: String,

    /// Status rows reported by the warehouse
    pub status: Vec<String>,
}

/// Validates DDL and executes it through a catalog
pub struct Deployer {
    catalog: Arc<dyn WarehouseCatalog>,
    validator: DdlValidator,
}

impl Deployer {
    pub fn new(catalog: Arc<dyn WarehouseCatalog>) -> Self {
        Self {
            catalog,
            validator: DdlValidator::default(),
        }
    }

    /// Use a specific validator (e.g. for another dialect)
    pub fn with_validator(mut self, validator: DdlValidator) -> Self {
        self.validator = validator;
        self
    }

    /// Render, validate and execute a definition
    ///
    /// Nothing is executed when rendering or validation fails.
    pub async fn deploy(&self, statement: &dyn CreateStatement) -> Result<DeployOutcome, DeployError> {
        let object = statement.identifier();
        let ddl = self.validator.validate_statement(statement).map_err(|err| {
            tracing::warn!(object = %object, error = %err, "refusing to deploy invalid DDL");
            err
        })?;

        let status = self.execute(&ddl).await?;
        tracing::info!(object = %object, kind = %statement.kind(), "deployed");

        Ok(DeployOutcome {
            object: Some(object),
            kind: Some(statement.kind()),
            statement: ddl,
            status,
        })
    }

    /// Validate and execute hand-written DDL
    pub async fn deploy_sql(&self, sql: &str) -> Result<DeployOutcome, DeployError> {
        let sql = sql.trim();
        self.validator.validate_ddl(sql).map_err(|err| {
            tracing::warn!(error = %err, "refusing to deploy invalid DDL");
            err
        })?;

        let status = self.execute(sql).await?;
        tracing::info!("deployed statement");

        Ok(DeployOutcome {
            object: None,
            kind: None,
            statement: sql.to_string(),
            status,
        })
    }

    async fn execute(&self, sql: &str) -> Result<Vec<String>, CatalogError> {
        self.catalog.execute(sql).await.map_err(|err| {
            tracing::warn!(catalog = self.catalog.name(), error = %err, "execution failed");
            err
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ddlsmith_catalog::MockCatalog;
    use ddlsmith_core::{ColumnDefinition, ColumnProjection, DiagnosticCode, SourceReference};
    use ddlsmith_sql::{DynamicTableDefinition, TableDefinition, ViewDefinition};

    #[tokio::test]
    async fn test_deploy_valid_table() {
        let catalog = MockCatalog::new();
        let deployer = Deployer::new(Arc::new(catalog.clone()));

        let table = TableDefinition::new("BRONZE", "LANDING_EVENTS")
            .with_column(ColumnDefinition::new("ID", "NUMBER").with_nullable(false));
        let outcome = deployer.deploy(&table).await.unwrap();

        assert_eq!(outcome.object, Some(ObjectIdentifier::new("BRONZE", "LANDING_EVENTS")));
        assert_eq!(outcome.status.len(), 1);
        assert_eq!(catalog.executed().await, vec![outcome.statement]);
    }

    #[tokio::test]
    async fn test_invalid_ddl_is_not_executed() {
        let catalog = MockCatalog::new();
        let deployer = Deployer::new(Arc::new(catalog.clone()));

        let view = ViewDefinition::new("S", "V", SourceReference::new("S", "T"))
            .with_projection(ColumnProjection::cast("UPPER(NAME", "VARCHAR", "N"));

        let err = deployer.deploy(&view).await.unwrap_err();
        assert!(matches!(err, DeployError::Validation(_)));
        assert_eq!(err.to_diagnostic(Some("S.V")).code, DiagnosticCode::DdlValidationError);
        assert!(catalog.executed().await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_options_are_not_executed() {
        let catalog = MockCatalog::new();
        let deployer = Deployer::new(Arc::new(catalog.clone()));

        let dt = DynamicTableDefinition::new("S", "DT", SourceReference::new("S", "T"))
            .with_projection(ColumnProjection::cast("ID", "NUMBER", "ID"));

        assert!(matches!(deployer.deploy(&dt).await, Err(DeployError::Validation(_))));
        assert!(catalog.executed().await.is_empty());
    }

    #[tokio::test]
    async fn test_deploy_sql() {
        let catalog = MockCatalog::new();
        let deployer = Deployer::new(Arc::new(catalog.clone()));

        let outcome = deployer
            .deploy_sql("  CREATE OR REPLACE DYNAMIC TABLE S.DT TARGET_LAG = '1 minute' WAREHOUSE = WH AS SELECT ID::NUMBER AS ID FROM S.T;\n")
            .await
            .unwrap();
        assert!(outcome.statement.starts_with("CREATE OR REPLACE DYNAMIC TABLE"));
        assert_eq!(catalog.executed().await.len(), 1);

        assert!(deployer.deploy_sql("CREATE TABLE (").await.is_err());
        assert_eq!(catalog.executed().await.len(), 1);
    }

    #[tokio::test]
    async fn test_catalog_failure() {
        let catalog = MockCatalog::new().with_execute_failure(CatalogError::PermissionDenied("role".to_string()));
        let deployer = Deployer::new(Arc::new(catalog));

        let err = deployer.deploy_sql("CREATE OR REPLACE TABLE S.T (ID NUMBER);").await.unwrap_err();
        assert!(matches!(err, DeployError::Catalog(CatalogError::PermissionDenied(_))));
        assert_eq!(err.to_diagnostic(None).code, DiagnosticCode::CatalogError);
    }
}
