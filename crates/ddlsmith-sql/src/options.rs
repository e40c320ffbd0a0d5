//! Option assignments in a CREATE statement tail
//!
//! Dynamic tables carry `TARGET_LAG = '1 minute'` and `WAREHOUSE = ETL_WH`
//! style assignments between the object name and `AS SELECT`.

use ddlsmith_core::TableOptions;
use crate::lexer::{ByteClass, SqlScanner};

/// Where the value of a `KEYWORD = value` assignment begins
struct Assignment {
    value_start: usize,
}

/// Find the first occurrence of `keyword` used as an assignment
///
/// The keyword must be followed by `=` (comments and whitespace allowed in
/// between). With `allow_bare_literal`, a string literal directly after the
/// keyword also counts. Occurrences that are not assignments (e.g. a column
/// of the same name) are skipped.
fn find_assignment(scanner: &SqlScanner<'_>, keyword: &str, allow_bare_literal: bool) -> Option<Assignment> {
    let bytes = scanner.text().as_bytes();
    let mut from = 0;

    while let Some(kw) = scanner.find_keyword(from, keyword) {
        let after_kw = scanner.skip_whitespace(kw + keyword.len());

        if scanner.is_code(after_kw) && bytes[after_kw] == b'=' {
            return Some(Assignment {
                value_start: scanner.skip_whitespace(after_kw + 1),
            });
        }

        if allow_bare_literal && bytes.get(after_kw) == Some(&b'\'') {
            return Some(Assignment { value_start: after_kw });
        }

        from = kw + keyword.len();
    }

    None
}

/// Text of a single-quoted literal starting at `start`, without the quotes
fn quoted_value<'a>(scanner: &SqlScanner<'a>, start: usize) -> Option<&'a str> {
    let text = scanner.text();
    if scanner.class_at(start) != Some(ByteClass::Quoted) || text.as_bytes()[start] != b'\'' {
        return None;
    }

    let close = text[start + 1..].find('\'')?;
    Some(&text[start + 1..start + 1 + close])
}

/// Unquoted token starting at `start`, ending at whitespace, `;` or `,`
fn bare_value(text: &str, start: usize) -> Option<&str> {
    let rest = &text[start..];
    let end = rest
        .find(|c: char| c.is_whitespace() || c == ';' || c == ',')
        .unwrap_or(rest.len());

    let token = &rest[..end];
    (!token.is_empty()).then_some(token)
}

/// Extract the `TARGET_LAG` and `WAREHOUSE` options of a statement
///
/// Each lookup is independent; a missing keyword only leaves its own field
/// empty. A quoted warehouse keeps its quotes.
pub fn parse_table_options(ddl: &str) -> TableOptions {
    let scanner = SqlScanner::new(ddl);

    let target_lag = find_assignment(&scanner, "TARGET_LAG", true).and_then(|a| {
        quoted_value(&scanner, a.value_start)
            .or_else(|| bare_value(ddl, a.value_start))
            .map(str::to_string)
    });

    let warehouse = find_assignment(&scanner, "WAREHOUSE", false)
        .and_then(|a| bare_value(ddl, a.value_start))
        .map(str::to_string);

    TableOptions { warehouse, target_lag }
}

/// Value of any `KEYWORD = value` or `KEYWORD = 'value'` assignment
///
/// Quoted values are returned without their quotes.
pub fn extract_option(ddl: &str, keyword: &str) -> Option<String> {
    let scanner = SqlScanner::new(ddl);
    let assignment = find_assignment(&scanner, keyword, false)?;

    quoted_value(&scanner, assignment.value_start)
        .or_else(|| bare_value(ddl, assignment.value_start))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DYNAMIC_DDL: &str = "create or replace dynamic table SILVER.DT_USERS(\n\tID\n) target_lag = '1 minute' refresh_mode = AUTO initialize = ON_CREATE warehouse = ETL_WH\n as SELECT ID::NUMBER AS ID FROM BRONZE.LANDING_USERS;";

    #[test]
    fn both_options_found() {
        assert_eq!(
            parse_table_options("... WAREHOUSE = ETL_WH TARGET_LAG = '1 minute' ..."),
            TableOptions {
                warehouse: Some("ETL_WH".to_string()),
                target_lag: Some("1 minute".to_string()),
            }
        );
    }

    #[test]
    fn no_options() {
        let options = parse_table_options("CREATE VIEW S.V AS SELECT ID::NUMBER AS ID FROM S.T");
        assert_eq!(options, TableOptions::default());
        assert!(options.is_empty());
    }

    #[test]
    fn options_are_independent() {
        assert_eq!(
            parse_table_options("CREATE DYNAMIC TABLE S.T TARGET_LAG = '5 minutes' AS SELECT 1 FROM S.X"),
            TableOptions { warehouse: None, target_lag: Some("5 minutes".to_string()) }
        );
        assert_eq!(
            parse_table_options("CREATE DYNAMIC TABLE S.T WAREHOUSE=WH AS SELECT 1 FROM S.X"),
            TableOptions { warehouse: Some("WH".to_string()), target_lag: None }
        );
    }

    #[test]
    fn rendered_dynamic_table() {
        assert_eq!(
            parse_table_options(DYNAMIC_DDL),
            TableOptions {
                warehouse: Some("ETL_WH".to_string()),
                target_lag: Some("1 minute".to_string()),
            }
        );
        assert_eq!(extract_option(DYNAMIC_DDL, "REFRESH_MODE").as_deref(), Some("AUTO"));
        assert_eq!(extract_option(DYNAMIC_DDL, "initialize").as_deref(), Some("ON_CREATE"));
        assert_eq!(extract_option(DYNAMIC_DDL, "CLUSTER_BY"), None);
    }

    #[test]
    fn warehouse_keeps_quotes() {
        let options = parse_table_options("CREATE DYNAMIC TABLE S.T WAREHOUSE = 'ETL_WH' AS SELECT 1 FROM S.X");
        assert_eq!(options.warehouse.as_deref(), Some("'ETL_WH'"));
        assert_eq!(
            extract_option("CREATE DYNAMIC TABLE S.T WAREHOUSE = 'ETL_WH'", "WAREHOUSE").as_deref(),
            Some("ETL_WH")
        );
    }

    #[test]
    fn unquoted_target_lag() {
        let options = parse_table_options("CREATE DYNAMIC TABLE S.T TARGET_LAG = DOWNSTREAM WAREHOUSE = WH AS SELECT 1 FROM S.X");
        assert_eq!(options.target_lag.as_deref(), Some("DOWNSTREAM"));
    }

    #[test]
    fn non_assignment_occurrences_are_skipped() {
        let ddl = "CREATE VIEW S.V AS SELECT WAREHOUSE::VARCHAR AS WAREHOUSE, TARGET_LAG::VARCHAR AS LAG FROM S.T WHERE X = 1";
        assert_eq!(parse_table_options(ddl), TableOptions::default());

        let ddl = "CREATE VIEW S.V COMMENT = 'WAREHOUSE = FAKE' AS SELECT 1 FROM S.T";
        assert_eq!(parse_table_options(ddl).warehouse, None);
    }

    #[test]
    fn trailing_semicolon_is_not_part_of_value() {
        assert_eq!(
            parse_table_options("ALTER DYNAMIC TABLE S.T SET WAREHOUSE = WH2;").warehouse.as_deref(),
            Some("WH2")
        );
    }
}
