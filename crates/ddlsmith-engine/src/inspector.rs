//! Object inspection: fetch DDL from a catalog and decompose it
//!
//! Each lookup fetches the current definition, so results always reflect
//! the warehouse rather than a cached copy.

use ddlsmith_catalog::{CatalogError, WarehouseCatalog};
use ddlsmith_core::{
    ColumnDefinition, ColumnProjection, InspectionReport, ObjectIdentifier, ObjectKind,
    SourceReference, TableOptions, TypeRegistry,
};
use ddlsmith_sql::{
    find_transformation_by_alias, inspect_statement, parse_projections, parse_source, parse_table_options,
    resolve_source, DynamicTableDefinition, ObjectSpec, TableDefinition, ViewDefinition,
};
use std::sync::Arc;

/// Decomposes warehouse objects fetched through a catalog
#[derive(Clone)]
pub struct ObjectInspector {
    catalog: Arc<dyn WarehouseCatalog>,
}

impl ObjectInspector {
    pub fn new(catalog: Arc<dyn WarehouseCatalog>) -> Self {
        Self { catalog }
    }

    /// The catalog objects are read from
    pub fn catalog(&self) -> &dyn WarehouseCatalog {
        self.catalog.as_ref()
    }

    /// DDL of an object with a defining query
    ///
    /// Returns `None` for kinds without one (standard tables).
    async fn query_ddl(&self, object: &ObjectIdentifier, kind: ObjectKind) -> Result<Option<String>, CatalogError> {
        if !kind.has_query() {
            tracing::debug!(object = %object, kind = %kind, "object kind has no defining query");
            return Ok(None);
        }

        self.catalog.get_ddl(object, kind).await.map(Some)
    }

    /// Cast projections of a view or dynamic table
    pub async fn transformations(
        &self,
        object: &ObjectIdentifier,
        kind: ObjectKind,
    ) -> Result<Vec<ColumnProjection>, CatalogError> {
        Ok(self
            .query_ddl(object, kind)
            .await?
            .map(|ddl| parse_projections(&ddl))
            .unwrap_or_default())
    }

    /// Transformation behind one output column, upper-cased
    pub async fn transformation_by_alias(
        &self,
        object: &ObjectIdentifier,
        kind: ObjectKind,
        alias: &str,
    ) -> Result<Option<String>, CatalogError> {
        Ok(self
            .query_ddl(object, kind)
            .await?
            .and_then(|ddl| find_transformation_by_alias(&ddl, alias)))
    }

    /// Upstream object of a view or dynamic table
    pub async fn source(
        &self,
        object: &ObjectIdentifier,
        kind: ObjectKind,
    ) -> Result<Option<SourceReference>, CatalogError> {
        let source = self
            .query_ddl(object, kind)
            .await?
            .and_then(|ddl| parse_source(&ddl));

        if source.is_none() && kind.has_query() {
            tracing::warn!(object = %object, "could not resolve a single source");
        }

        Ok(source)
    }

    /// `TARGET_LAG` and `WAREHOUSE` of a dynamic table
    pub async fn dynamic_table_config(&self, object: &ObjectIdentifier) -> Result<TableOptions, CatalogError> {
        let ddl = self.catalog.get_ddl(object, ObjectKind::DynamicTable).await?;
        Ok(parse_table_options(&ddl))
    }

    /// Output columns of an object
    ///
    /// Data types not yet known to `registry` are registered, so they can be
    /// offered when editing.
    pub async fn columns(
        &self,
        object: &ObjectIdentifier,
        kind: ObjectKind,
        registry: &mut TypeRegistry,
    ) -> Result<Vec<ColumnDefinition>, CatalogError> {
        let columns = self.catalog.describe_columns(object, kind).await?;

        let added = registry.register_all(columns.iter().map(|c| c.data_type.as_str()));
        if !added.is_empty() {
            tracing::info!(object = %object, types = ?added, "registered new data types");
        }

        Ok(columns)
    }

    /// Editable definition of an existing object
    ///
    /// Tables are rebuilt from their described columns, keeping NOT NULL.
    /// Views and dynamic tables are rebuilt from their DDL and need a single
    /// resolvable source.
    pub async fn definition(&self, object: &ObjectIdentifier, kind: ObjectKind) -> Result<ObjectSpec, CatalogError> {
        if !kind.has_query() {
            let columns = self.catalog.describe_columns(object, kind).await?;
            return Ok(ObjectSpec::Table(
                TableDefinition::new(object.schema.clone(), object.name.clone()).with_columns(columns),
            ));
        }

        let ddl = self.catalog.get_ddl(object, kind).await?;
        let source = resolve_source(&ddl).map_err(|err| {
            CatalogError::InvalidResponse(format!("Cannot rebuild {}: {}", object, err))
        })?;
        let projections = parse_projections(&ddl);

        let spec = match kind {
            ObjectKind::DynamicTable => {
                let options = parse_table_options(&ddl);
                ObjectSpec::DynamicTable(DynamicTableDefinition {
                    schema: object.schema.clone(),
                    name: object.name.clone(),
                    target_lag: options.target_lag,
                    warehouse: options.warehouse,
                    source,
                    projections,
                })
            }
            _ => ObjectSpec::View(
                ViewDefinition::new(object.schema.clone(), object.name.clone(), source)
                    .with_projections(projections),
            ),
        };

        tracing::debug!(object = %object, kind = %kind, "rebuilt definition");
        Ok(spec)
    }

    /// Full decomposition of an object with diagnostics
    pub async fn inspect(&self, object: &ObjectIdentifier, kind: ObjectKind) -> Result<InspectionReport, CatalogError> {
        let ddl = self.catalog.get_ddl(object, kind).await?;
        let report = inspect_statement(&ddl, Some(object.clone()), Some(kind));

        tracing::info!(
            object = %object,
            kind = %kind,
            recognized = report.summary.recognized,
            candidates = report.summary.candidates,
            "inspected object"
        );

        Ok(report)
    }
}
