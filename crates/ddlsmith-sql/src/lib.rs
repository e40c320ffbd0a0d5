//! DDL reverse engineering and generation
//!
//! This crate handles:
//! - Scanning SQL text for keywords outside literals and comments
//! - Splitting select lists on top-level commas
//! - Recovering `expr::TYPE AS alias` projections, the upstream source and
//!   dynamic table options from CREATE statements
//! - Rendering CREATE statements for tables, views and dynamic tables
//! - Validating generated DDL with datafusion-sqlparser-rs

pub mod lexer;
pub mod splitter;
pub mod error;
pub mod projection;
pub mod source;
pub mod options;
pub mod generator;
pub mod validator;
pub mod inspect;

pub use splitter::{split_top_level, split_top_level_checked, SplitError};
pub use error::ExtractError;
pub use projection::{
    decompose_projection, find_transformation_by_alias, parse_projection_items, parse_projections,
};
pub use source::{parse_source, resolve_source};
pub use options::{extract_option, parse_table_options};
pub use generator::{
    CreateStatement, DynamicTableDefinition, GenerationError, ObjectSpec, TableDefinition,
    ViewDefinition,
};
pub use validator::{DdlValidator, ValidationError};
pub use inspect::inspect_statement;
