//! Test fixtures for catalog integration tests
//!
//! Objects shaped like what a Snowflake account returns: `GET_DDL` output is
//! lower-case `create or replace` with a column list and the query body
//! normalized to `expr::TYPE AS alias` items.

use ddlsmith_catalog::{MockCatalog, MockCatalogBuilder};
use ddlsmith_core::ColumnDefinition;

/// DDL of a view with one item that is not cast
pub const CUSTOMER_VIEW_DDL: &str = "create or replace view GOLD.V_CUSTOMERS(\n\tCUSTOMER_ID,\n\tEMAIL_DOMAIN,\n\tSEGMENT\n) as\nSELECT\n\tCUSTOMER_ID::NUMBER(38,0) AS CUSTOMER_ID,\n\tSPLIT_PART(EMAIL, '@', 2)::VARCHAR AS EMAIL_DOMAIN,\n\tSEGMENT\nFROM SILVER.DIM_CUSTOMERS\nWHERE SEGMENT IS NOT NULL;";

/// DDL of a dynamic table reading a three-part name
pub const REVENUE_DT_DDL: &str = "create or replace dynamic table GOLD.DT_REVENUE(\n\tUSER_ID,\n\tREVENUE\n) target_lag = '1 hour' refresh_mode = INCREMENTAL initialize = ON_CREATE warehouse = REPORTING_WH\n as\nSELECT\n\tUSER_ID::NUMBER AS USER_ID,\n\tSUM(AMOUNT)::NUMBER(14,2) AS REVENUE\nFROM ANALYTICS.SILVER.FACT_ORDERS\nGROUP BY USER_ID;";

pub fn customer_view_columns() -> Vec<ColumnDefinition> {
    vec![
        ColumnDefinition::new("CUSTOMER_ID", "NUMBER(38,0)").with_nullable(false),
        ColumnDefinition::new("EMAIL_DOMAIN", "VARCHAR"),
        ColumnDefinition::new("SEGMENT", "VARCHAR"),
    ]
}

pub fn revenue_columns() -> Vec<ColumnDefinition> {
    vec![
        ColumnDefinition::new("USER_ID", "NUMBER"),
        ColumnDefinition::new("REVENUE", "NUMBER(14,2)"),
    ]
}

/// A reporting schema with one view and one dynamic table
pub fn reporting_catalog() -> MockCatalog {
    MockCatalogBuilder::new()
        .with_schema("INFORMATION_SCHEMA")
        .with_view("GOLD", "V_CUSTOMERS", customer_view_columns(), CUSTOMER_VIEW_DDL)
        .with_dynamic_table("GOLD", "DT_REVENUE", revenue_columns(), REVENUE_DT_DDL)
        .with_table("GOLD", "EXPORTS", vec![ColumnDefinition::new("PAYLOAD", "VARIANT")])
        .build()
}
