//! Warehouse catalogs for listing objects and fetching their DDL
//!
//! This crate provides the [`WarehouseCatalog`] trait and its implementations:
//! an in-memory [`MockCatalog`] for tests and offline work, and a
//! [`SnowflakeCatalog`] backed by `SHOW`, `DESCRIBE` and `GET_DDL`.
//!
//! ## Features
//!
//! - `snowflake` - Snowflake support
//!
//! ## Example
//!
//! ```rust,ignore
//! use ddlsmith_catalog::{SnowflakeCatalog, WarehouseCatalog};
//! use ddlsmith_core::{ObjectIdentifier, ObjectKind};
//!
//! let catalog = SnowflakeCatalog::with_password("xy12345", "user", "pass").build()?;
//! let ddl = catalog.get_ddl(&ObjectIdentifier::new("SILVER", "V_USERS"), ObjectKind::View).await?;
//! ```

pub mod adapter;
pub mod mock;
pub mod snowflake;

pub use adapter::{
    apply_table_filter, describe_query, filter_schemas, get_ddl_query, CatalogError, TableFilter,
    WarehouseCatalog, DEFAULT_EXCLUDED_SCHEMAS,
};
pub use mock::{MockCatalog, MockCatalogBuilder, MockObject};
pub use snowflake::{SnowflakeCatalog, SnowflakeCatalogBuilder, SnowflakeCredentials};
