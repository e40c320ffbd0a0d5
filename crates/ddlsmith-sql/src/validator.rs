//! Syntax validation of generated DDL using datafusion-sqlparser-rs
//!
//! Generated statements are parsed before they are shown or deployed, so
//! malformed user input surfaces as a diagnostic instead of a warehouse error.

use ddlsmith_core::{Diagnostic, DiagnosticCode, DialectConfig, Location, Severity};
use sqlparser::ast::Statement;
use sqlparser::dialect::{AnsiDialect, Dialect, GenericDialect, SnowflakeDialect};
use sqlparser::parser::{Parser, ParserError};

use crate::generator::{CreateStatement, GenerationError};
use crate::lexer::SqlScanner;

/// DDL validator with configurable dialect
pub struct DdlValidator {
    dialect: Box<dyn Dialect>,
}

impl DdlValidator {
    /// Create a validator with the generic (ANSI) dialect
    pub fn new() -> Self {
        Self {
            dialect: Box::new(GenericDialect {}),
        }
    }

    /// Create a validator for Snowflake
    pub fn snowflake() -> Self {
        Self {
            dialect: Box::new(SnowflakeDialect {}),
        }
    }

    /// Create a validator for strict ANSI SQL
    pub fn ansi() -> Self {
        Self {
            dialect: Box::new(AnsiDialect {}),
        }
    }

    /// Create a validator from a dialect config
    pub fn from_dialect(dialect: &DialectConfig) -> Self {
        match dialect {
            DialectConfig::Snowflake => Self::snowflake(),
            DialectConfig::Ansi => Self::ansi(),
        }
    }

    /// Parse `sql`, returning its statements
    pub fn validate(&self, sql: &str) -> Result<Vec<Statement>, ValidationError> {
        Parser::parse_sql(&*self.dialect, sql).map_err(|error| ValidationError::Syntax {
            sql: sql.to_string(),
            error,
        })
    }

    /// Parse hand-written DDL
    ///
    /// Dynamic table statements are checked from their `SELECT` onward, since
    /// the dialect has no grammar for their options.
    pub fn validate_ddl(&self, sql: &str) -> Result<Vec<Statement>, ValidationError> {
        let scanner = SqlScanner::new(sql);
        let dynamic = scanner
            .find_keyword(0, "DYNAMIC")
            .map(|pos| scanner.skip_whitespace(pos + "DYNAMIC".len()))
            .and_then(|pos| scanner.find_keyword(pos, "TABLE").filter(|&table| table == pos))
            .is_some();

        let checked = match (dynamic, scanner.find_keyword(0, "SELECT")) {
            (true, Some(select)) => &sql[select..],
            _ => sql,
        };

        let parsed = self.validate(checked)?;
        if parsed.is_empty() {
            return Err(ValidationError::Empty);
        }
        Ok(parsed)
    }

    /// Render a definition and check the part the dialect can parse
    ///
    /// Returns the full CREATE statement on success.
    pub fn validate_statement(&self, statement: &dyn CreateStatement) -> Result<String, ValidationError> {
        let ddl = statement.create_ddl()?;
        let checked = statement.validation_sql()?;

        let parsed = self.validate(&checked)?;
        if parsed.is_empty() {
            return Err(ValidationError::Empty);
        }

        tracing::debug!(
            object = %statement.identifier(),
            kind = %statement.kind(),
            statements = parsed.len(),
            "generated DDL validated"
        );

        Ok(ddl)
    }
}

impl Default for DdlValidator {
    fn default() -> Self {
        Self::snowflake()
    }
}

/// Why generated DDL was rejected
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Failed to generate DDL: {0}")]
    Generation(#[from] GenerationError),

    #[error("SQL parse error: {error}")]
    Syntax { sql: String, error: ParserError },

    #[error("No statement to validate")]
    Empty,
}

impl ValidationError {
    /// Convert to a diagnostic, located at `object` when given
    pub fn to_diagnostic(&self, object: Option<&str>) -> Diagnostic {
        let mut diag = Diagnostic::new(
            DiagnosticCode::DdlValidationError,
            Severity::Error,
            self.to_string(),
        );

        if let Some(object) = object {
            diag = diag.with_location(Location::new(object));
        }

        if let Self::Syntax { sql, .. } = self {
            diag = diag.with_snippet(sql.clone());
        }

        diag
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{DynamicTableDefinition, TableDefinition, ViewDefinition};
    use ddlsmith_core::{ColumnDefinition, ColumnProjection, SourceReference};

    #[test]
    fn accepts_generated_table() {
        let table = TableDefinition::new("BRONZE", "LANDING_USERS")
            .with_column(ColumnDefinition::new("ID", "NUMBER").with_nullable(false))
            .with_column(ColumnDefinition::new("NAME", "VARCHAR"));

        let ddl = DdlValidator::snowflake().validate_statement(&table).unwrap();
        assert!(ddl.starts_with("CREATE OR REPLACE TABLE BRONZE.LANDING_USERS"));
    }

    #[test]
    fn accepts_generated_view_with_casts() {
        let view = ViewDefinition::new("SILVER", "V_USERS", SourceReference::new("BRONZE", "LANDING_USERS"))
            .with_projection(ColumnProjection::cast("UPPER(NAME)", "VARCHAR", "NAME_UP"))
            .with_projection(ColumnProjection::cast("ID", "NUMBER", "ID"));

        assert!(DdlValidator::snowflake().validate_statement(&view).is_ok());
    }

    #[test]
    fn dynamic_table_validates_its_query() {
        let dt = DynamicTableDefinition::new("SILVER", "DT", SourceReference::new("BRONZE", "T"))
            .with_target_lag("1 minute")
            .with_warehouse("ETL_WH")
            .with_projection(ColumnProjection::cast("ID", "NUMBER", "ID"));

        let ddl = DdlValidator::snowflake().validate_statement(&dt).unwrap();
        assert!(ddl.contains("TARGET_LAG = '1 minute'"));
    }

    #[test]
    fn rejects_malformed_sql() {
        let err = DdlValidator::snowflake().validate("CREATE TABLE (").unwrap_err();
        assert!(matches!(err, ValidationError::Syntax { .. }));

        let diag = err.to_diagnostic(Some("S.T"));
        assert_eq!(diag.code, DiagnosticCode::DdlValidationError);
        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(diag.snippet.as_deref(), Some("CREATE TABLE ("));
    }

    #[test]
    fn rejects_broken_transformation() {
        let view = ViewDefinition::new("S", "V", SourceReference::new("S", "T"))
            .with_projection(ColumnProjection::cast("UPPER(NAME", "VARCHAR", "N"));

        assert!(matches!(
            DdlValidator::snowflake().validate_statement(&view),
            Err(ValidationError::Syntax { .. })
        ));
    }

    #[test]
    fn generation_errors_pass_through() {
        let table = TableDefinition::new("S", "EMPTY");
        assert!(matches!(
            DdlValidator::default().validate_statement(&table),
            Err(ValidationError::Generation(GenerationError::NoColumns(_)))
        ));
    }

    #[test]
    fn hand_written_dynamic_table_checks_its_query() {
        let validator = DdlValidator::snowflake();
        let ddl = "CREATE OR REPLACE DYNAMIC TABLE S.DT\n\tTARGET_LAG = '1 minute'\n\tWAREHOUSE = WH\nAS\nSELECT ID::NUMBER AS ID FROM S.T;";
        assert!(validator.validate_ddl(ddl).is_ok());

        let broken = "CREATE OR REPLACE DYNAMIC TABLE S.DT TARGET_LAG = '1 minute' AS SELECT (ID FROM S.T";
        assert!(validator.validate_ddl(broken).is_err());

        assert!(validator.validate_ddl("CREATE OR REPLACE TABLE S.T (ID NUMBER);").is_ok());
        assert!(matches!(validator.validate_ddl("  "), Err(ValidationError::Empty)));
    }

    #[test]
    fn dialects_accept_simple_queries() {
        let sql = "SELECT ID::NUMBER AS ID FROM S.T";
        assert!(DdlValidator::new().validate(sql).is_ok());
        assert!(DdlValidator::from_dialect(&DialectConfig::Snowflake).validate(sql).is_ok());
        assert!(DdlValidator::from_dialect(&DialectConfig::Ansi).validate("SELECT ID AS ID FROM S.T").is_ok());
    }

    #[test]
    fn ansi_config_uses_ansi_dialect() {
        assert!(DdlValidator::from_dialect(&DialectConfig::Ansi).dialect.is::<AnsiDialect>());
        assert!(DdlValidator::from_dialect(&DialectConfig::Snowflake).dialect.is::<SnowflakeDialect>());
        assert!(DdlValidator::new().dialect.is::<GenericDialect>());
    }
}
