//! Source reference resolution
//!
//! Recovers the upstream `SCHEMA.OBJECT` of a single-source statement from
//! the first token of its FROM clause.

use ddlsmith_core::SourceReference;
use crate::error::ExtractError;
use crate::lexer::{ByteClass, SqlScanner};
use crate::splitter::split_top_level;

/// Keywords that end a FROM clause
const CLAUSE_TERMINATORS: &[&str] = &[
    "WHERE", "GROUP", "HAVING", "QUALIFY", "ORDER", "LIMIT", "UNION", "EXCEPT", "MINUS", "INTERSECT",
];

/// Upstream schema and object of a statement, or `None`
///
/// Statements without FROM, with a name of other than 2 or 3 parts, or that
/// read from joins or derived tables all yield `None`.
pub fn parse_source(ddl: &str) -> Option<SourceReference> {
    match resolve_source(ddl) {
        Ok(source) => Some(source),
        Err(err) => {
            tracing::debug!(error = %err, "no source reference");
            None
        }
    }
}

/// Resolve the upstream reference, explaining failures
pub fn resolve_source(ddl: &str) -> Result<SourceReference, ExtractError> {
    let scanner = SqlScanner::new(ddl);
    let from = scanner
        .find_keyword(0, "FROM")
        .ok_or(ExtractError::MissingKeyword("FROM"))?;

    let start = scanner.skip_whitespace(from + "FROM".len());
    let rest = &ddl[start..];

    if rest.starts_with('(') {
        return Err(ExtractError::DerivedTable);
    }

    check_single_source(rest)?;

    let token = &ddl[start..token_end(&scanner, start)];

    let parts = split_qualified_name(token);
    match parts.as_slice() {
        [schema, object] if !schema.is_empty() && !object.is_empty() => {
            Ok(SourceReference::new(*schema, *object))
        }
        [_, schema, object] if !schema.is_empty() && !object.is_empty() => {
            Ok(SourceReference::new(*schema, *object))
        }
        _ => Err(ExtractError::QualifiedNameArity {
            name: token.to_string(),
            parts: if token.is_empty() { 0 } else { parts.len() },
        }),
    }
}

/// Reject FROM clauses that combine several relations
fn check_single_source(clause: &str) -> Result<(), ExtractError> {
    let scanner = SqlScanner::new(clause);

    let end = CLAUSE_TERMINATORS
        .iter()
        .filter_map(|kw| scanner.find_keyword(0, kw))
        .chain(scanner.find_code_byte(0, b';'))
        .min()
        .unwrap_or(clause.len());
    let clause = clause[..end].trim();

    let joined = scanner
        .find_keyword(0, "JOIN")
        .map_or(false, |pos| pos < end);
    let listed = split_top_level(clause).len() > 1;

    if joined || listed {
        return Err(ExtractError::MultipleSources(clause.to_string()));
    }

    Ok(())
}

/// End of the name starting at `start`: whitespace, `;` or a comment
fn token_end(scanner: &SqlScanner<'_>, start: usize) -> usize {
    let bytes = scanner.text().as_bytes();
    (start..bytes.len())
        .find(|&pos| match scanner.class_at(pos) {
            Some(ByteClass::Comment) => true,
            Some(ByteClass::Code) => bytes[pos].is_ascii_whitespace() || bytes[pos] == b';',
            _ => false,
        })
        .unwrap_or(bytes.len())
}

/// Split on dots that are not inside double-quoted identifiers
fn split_qualified_name(name: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;

    for (pos, c) in name.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            '.' if !in_quotes => {
                parts.push(&name[start..pos]);
                start = pos + 1;
            }
            _ => {}
        }
    }
    parts.push(&name[start..]);

    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn three_part_name_drops_database() {
        assert_eq!(
            parse_source("CREATE VIEW S.V AS SELECT X FROM DB.SCHEMA.TABLE WHERE x=1"),
            Some(SourceReference::new("SCHEMA", "TABLE"))
        );
    }

    #[test]
    fn two_part_name_with_semicolon() {
        assert_eq!(
            parse_source("CREATE VIEW S.V AS SELECT X FROM SCHEMA.TABLE;"),
            Some(SourceReference::new("SCHEMA", "TABLE"))
        );
    }

    #[test]
    fn other_arity_is_absent() {
        assert_eq!(parse_source("SELECT X FROM A.B.C.D"), None);
        assert_eq!(parse_source("SELECT X FROM T"), None);
        assert_eq!(
            resolve_source("SELECT X FROM A.B.C.D"),
            Err(ExtractError::QualifiedNameArity { name: "A.B.C.D".to_string(), parts: 4 })
        );
    }

    #[test]
    fn missing_from_is_absent() {
        assert_eq!(parse_source("CREATE TABLE S.T (ID NUMBER)"), None);
        assert_eq!(resolve_source(""), Err(ExtractError::MissingKeyword("FROM")));
        assert_eq!(
            resolve_source("SELECT 1 FROM"),
            Err(ExtractError::QualifiedNameArity { name: String::new(), parts: 0 })
        );
    }

    #[test]
    fn comments_before_the_name_are_skipped() {
        assert_eq!(
            parse_source("SELECT ID::NUMBER AS ID FROM /* upstream */ BRONZE.T"),
            Some(SourceReference::new("BRONZE", "T"))
        );
        assert_eq!(
            parse_source("SELECT ID::NUMBER AS ID FROM\n-- upstream\nBRONZE.T;"),
            Some(SourceReference::new("BRONZE", "T"))
        );
        assert_eq!(
            parse_source("SELECT ID::NUMBER AS ID FROM BRONZE.T-- landing, raw\n"),
            Some(SourceReference::new("BRONZE", "T"))
        );
    }

    #[test]
    fn alias_after_table_is_ignored() {
        assert_eq!(
            parse_source("SELECT u.ID::NUMBER AS ID FROM BRONZE.LANDING_USERS u\nWHERE u.ID > 0"),
            Some(SourceReference::new("BRONZE", "LANDING_USERS"))
        );
    }

    #[test]
    fn from_prefixed_column_is_not_the_clause() {
        assert_eq!(
            parse_source("SELECT FROM_DATE::DATE AS D FROM SILVER.EVENTS"),
            Some(SourceReference::new("SILVER", "EVENTS"))
        );
    }

    #[test]
    fn quoted_identifiers_keep_inner_dots() {
        assert_eq!(
            parse_source("SELECT A FROM \"MY.SCHEMA\".\"T\""),
            Some(SourceReference::new("\"MY.SCHEMA\"", "\"T\""))
        );
    }

    #[test]
    fn joins_and_lists_are_rejected() {
        let join = "SELECT A FROM S.A a JOIN S.B b ON a.ID = b.ID";
        assert_eq!(parse_source(join), None);
        assert!(matches!(resolve_source(join), Err(ExtractError::MultipleSources(_))));

        let listed = "SELECT A FROM S.A, S.B WHERE S.A.ID = S.B.ID";
        assert!(matches!(resolve_source(listed), Err(ExtractError::MultipleSources(_))));

        // a join keyword after the clause ends does not count
        let filtered = "SELECT A FROM S.A WHERE B IN (SELECT B FROM S.B JOIN S.C ON TRUE)";
        assert_eq!(parse_source(filtered), Some(SourceReference::new("S", "A")));
    }

    #[test]
    fn derived_tables_are_rejected() {
        assert_eq!(
            resolve_source("SELECT A FROM (SELECT A FROM S.T) x"),
            Err(ExtractError::DerivedTable)
        );
    }
}
