//! Integration tests for warehouse catalogs
//!
//! Mock catalog tests run without credentials. Tests against a real account
//! are marked with `#[ignore]` and can be run with `cargo test -- --ignored`.
//!
//! ## Running Tests
//!
//! ```bash
//! # Run all non-ignored tests (no credentials required)
//! cargo test -p ddlsmith-catalog --test integration_tests
//!
//! # Run Snowflake integration tests
//! SNOWFLAKE_ACCOUNT=xy12345 \
//! SNOWFLAKE_USER=user \
//! DDLSMITH_PASSWORD=pass \
//! DDLSMITH_TEST_VIEW=SILVER.V_USERS \
//! cargo test -p ddlsmith-catalog --features snowflake --test integration_tests -- --ignored
//! ```

mod fixtures;

use ddlsmith_catalog::{CatalogError, MockCatalog, MockCatalogBuilder, TableFilter, WarehouseCatalog};
use ddlsmith_core::{ObjectIdentifier, ObjectKind, SourceReference, TableOptions};
use ddlsmith_sql::{parse_projections, parse_source, parse_table_options};
use pretty_assertions::assert_eq;

/// Check if Snowflake credentials are available
fn has_snowflake_credentials() -> bool {
    std::env::var("SNOWFLAKE_ACCOUNT").is_ok()
}

// =============================================================================
// Mock Catalog Tests (No credentials required)
// =============================================================================

#[tokio::test]
async fn test_mock_catalog_listing_workflow() {
    let catalog = fixtures::reporting_catalog();

    let schemas = catalog.list_schemas("ANALYTICS").await.unwrap();
    assert_eq!(schemas, vec!["GOLD"]);

    for (filter, expected) in [
        (TableFilter::All, vec!["DT_REVENUE", "EXPORTS"]),
        (TableFilter::Standard, vec!["EXPORTS"]),
        (TableFilter::Dynamic, vec!["DT_REVENUE"]),
    ] {
        assert_eq!(catalog.list_tables("GOLD", filter).await.unwrap(), expected, "{}", filter);
    }
    assert_eq!(catalog.list_views("GOLD").await.unwrap(), vec!["V_CUSTOMERS"]);
}

#[tokio::test]
async fn test_mock_catalog_ddl_parses() {
    let catalog = fixtures::reporting_catalog();
    let view = ObjectIdentifier::new("GOLD", "V_CUSTOMERS");

    let ddl = catalog.get_ddl(&view, ObjectKind::View).await.unwrap();
    let aliases: Vec<String> = parse_projections(&ddl).into_iter().map(|p| p.alias).collect();
    assert_eq!(aliases, vec!["CUSTOMER_ID", "EMAIL_DOMAIN"]);
    assert_eq!(parse_source(&ddl), Some(SourceReference::new("SILVER", "DIM_CUSTOMERS")));

    let dt = ObjectIdentifier::new("GOLD", "DT_REVENUE");
    let ddl = catalog.get_ddl(&dt, ObjectKind::DynamicTable).await.unwrap();
    assert_eq!(
        parse_table_options(&ddl),
        TableOptions {
            warehouse: Some("REPORTING_WH".to_string()),
            target_lag: Some("1 hour".to_string()),
        }
    );
    assert_eq!(parse_source(&ddl), Some(SourceReference::new("SILVER", "FACT_ORDERS")));
}

#[tokio::test]
async fn test_mock_catalog_describe_matches_fixture() {
    let catalog = fixtures::reporting_catalog();
    let columns = catalog
        .describe_columns(&ObjectIdentifier::new("GOLD", "DT_REVENUE"), ObjectKind::DynamicTable)
        .await
        .unwrap();
    assert_eq!(columns, fixtures::revenue_columns());
}

#[tokio::test]
async fn test_mock_catalog_object_not_found() {
    let catalog = MockCatalog::sample();
    let result = catalog
        .get_ddl(&ObjectIdentifier::new("SILVER", "MISSING"), ObjectKind::View)
        .await;

    match result {
        Err(CatalogError::ObjectNotFound(name)) => assert_eq!(name, "SILVER.MISSING"),
        other => panic!("expected ObjectNotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn test_mock_catalog_custom_error() {
    let catalog = MockCatalogBuilder::new()
        .with_view("S", "SECRET", Vec::new(), "create view S.SECRET as select 1 from S.T;")
        .with_error("S", "SECRET", CatalogError::PermissionDenied("Access denied".to_string()))
        .build();

    let result = catalog
        .describe_columns(&ObjectIdentifier::new("S", "SECRET"), ObjectKind::View)
        .await;
    assert!(matches!(result, Err(CatalogError::PermissionDenied(_))));
}

#[tokio::test]
async fn test_mock_catalog_latency_simulation() {
    let catalog = MockCatalog::sample().with_latency(50);

    let start = std::time::Instant::now();
    catalog.list_schemas("ANALYTICS").await.unwrap();
    assert!(start.elapsed().as_millis() >= 50);
}

#[tokio::test]
async fn test_mock_catalog_clone_shares_state() {
    let catalog = MockCatalog::new();
    let clone = catalog.clone();

    clone.execute("CREATE OR REPLACE TABLE S.T (ID NUMBER);").await.unwrap();
    catalog.add_schema("S").await;

    assert_eq!(catalog.executed().await.len(), 1);
    assert_eq!(clone.list_schemas("DB").await.unwrap(), vec!["S"]);
}

#[tokio::test]
async fn test_catalog_as_trait_object() {
    let catalog: Box<dyn WarehouseCatalog> = Box::new(MockCatalog::sample().with_name("Sample"));
    assert_eq!(catalog.name(), "Sample");
    assert!(catalog.test_connection().await.is_ok());
    assert_eq!(catalog.list_views("SILVER").await.unwrap(), vec!["V_USERS"]);
}

// =============================================================================
// Snowflake Integration Tests (require credentials)
// =============================================================================

#[tokio::test]
#[ignore]
async fn test_snowflake_connection() {
    if !has_snowflake_credentials() {
        eprintln!("Skipping Snowflake test: no credentials available");
        eprintln!("Set SNOWFLAKE_ACCOUNT, SNOWFLAKE_USER, and DDLSMITH_PASSWORD");
        return;
    }

    #[cfg(feature = "snowflake")]
    {
        use ddlsmith_catalog::{SnowflakeCatalogBuilder, SnowflakeCredentials};

        let account = std::env::var("SNOWFLAKE_ACCOUNT").expect("SNOWFLAKE_ACCOUNT must be set");
        let username = std::env::var("SNOWFLAKE_USER").expect("SNOWFLAKE_USER must be set");
        let credentials = SnowflakeCredentials::from_env().expect("credentials must be set");

        let mut builder = SnowflakeCatalogBuilder::new(&account, &username, credentials);
        if let Ok(wh) = std::env::var("SNOWFLAKE_WAREHOUSE") {
            builder = builder.with_warehouse(wh);
        }
        if let Ok(role) = std::env::var("SNOWFLAKE_ROLE") {
            builder = builder.with_role(role);
        }

        let catalog = builder.build().expect("Failed to create Snowflake catalog");
        catalog.test_connection().await.expect("Connection test failed");

        println!("Snowflake connection successful for account: {}", account);
    }

    #[cfg(not(feature = "snowflake"))]
    {
        eprintln!("Snowflake feature not enabled. Rebuild with --features snowflake");
    }
}

#[tokio::test]
#[ignore]
async fn test_snowflake_view_ddl() {
    if !has_snowflake_credentials() {
        return;
    }

    #[cfg(feature = "snowflake")]
    {
        use ddlsmith_catalog::{SnowflakeCatalogBuilder, SnowflakeCredentials};

        let account = std::env::var("SNOWFLAKE_ACCOUNT").expect("SNOWFLAKE_ACCOUNT must be set");
        let username = std::env::var("SNOWFLAKE_USER").expect("SNOWFLAKE_USER must be set");
        let view = std::env::var("DDLSMITH_TEST_VIEW").expect("DDLSMITH_TEST_VIEW must be set");
        let view = ObjectIdentifier::parse(&view).expect("DDLSMITH_TEST_VIEW must be SCHEMA.NAME");

        let catalog = SnowflakeCatalogBuilder::new(
            &account,
            &username,
            SnowflakeCredentials::from_env().expect("credentials must be set"),
        )
        .build()
        .expect("Failed to create catalog");

        let ddl = catalog.get_ddl(&view, ObjectKind::View).await.expect("Failed to fetch DDL");
        let columns = catalog
            .describe_columns(&view, ObjectKind::View)
            .await
            .expect("Failed to describe view");

        assert!(!columns.is_empty());
        println!("{} has {} columns and {} cast projections", view, columns.len(), parse_projections(&ddl).len());
    }
}
