//! ddlsmith engine - catalog-backed workflows
//!
//! This crate combines the catalog with the DDL parser and generator:
//! - Object inspection (transformations, sources, dynamic table options)
//! - Deployment of validated DDL

pub mod inspector;
pub mod deployer;

pub use inspector::ObjectInspector;
pub use deployer::{DeployError, DeployOutcome, Deployer};
