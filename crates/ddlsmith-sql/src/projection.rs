//! Column projection recovery
//!
//! Warehouses normalize view definitions to `expr::TYPE AS alias` items.
//! Only that shape is decomposed; anything else is reported as unrecognized
//! (or dropped by [`parse_projections`]), which avoids false positives from
//! nested `AS` at the cost of ignoring un-cast columns.

use ddlsmith_core::{ColumnProjection, ProjectionItem};
use crate::error::ExtractError;
use crate::lexer::SqlScanner;
use crate::splitter::{split_top_level, split_top_level_checked};

/// Locate the select list: text between the first `SELECT` and the next `FROM`
///
/// Returns the trimmed list and its byte offset in `ddl`.
pub fn select_list(ddl: &str) -> Result<(usize, &str), ExtractError> {
    let scanner = SqlScanner::new(ddl);

    let select = scanner
        .find_keyword(0, "SELECT")
        .ok_or(ExtractError::MissingKeyword("SELECT"))?;
    let list_start = select + "SELECT".len();

    let from = scanner
        .find_keyword(list_start, "FROM")
        .ok_or(ExtractError::MissingKeyword("FROM"))?;

    let raw = &ddl[list_start..from];
    let trimmed = raw.trim_start();
    let offset = list_start + (raw.len() - trimmed.len());

    Ok((offset, trimmed.trim_end()))
}

/// Recover the `expr::TYPE AS alias` projections of a statement, in source order
///
/// Items of any other shape are silently left out, and a statement without
/// `SELECT` or `FROM` yields an empty vector. Use [`parse_projection_items`]
/// to see what was skipped.
pub fn parse_projections(ddl: &str) -> Vec<ColumnProjection> {
    let Ok((_, list)) = select_list(ddl) else {
        return Vec::new();
    };

    split_top_level(list)
        .iter()
        .filter(|candidate| !candidate.is_empty())
        .filter_map(|candidate| {
            let projection = decompose_projection(candidate);
            if projection.is_none() {
                tracing::debug!(candidate = %candidate, "skipping select item without cast and alias");
            }
            projection
        })
        .collect()
}

/// Classify every select-list item of a statement
///
/// Fails when `SELECT`/`FROM` is missing or when the select list has
/// unbalanced parentheses; otherwise every non-empty candidate is returned,
/// recognized or not.
pub fn parse_projection_items(ddl: &str) -> Result<Vec<ProjectionItem>, ExtractError> {
    let (offset, list) = select_list(ddl)?;

    let candidates = split_top_level_checked(list).map_err(|err| match ExtractError::from(err) {
        ExtractError::UnbalancedParentheses { position, depth } => {
            ExtractError::UnbalancedParentheses { position: offset + position, depth }
        }
        other => other,
    })?;

    Ok(candidates
        .into_iter()
        .filter(|candidate| !candidate.is_empty())
        .map(|candidate| match decompose_projection(&candidate) {
            Some(projection) => ProjectionItem::Recognized(projection),
            None => ProjectionItem::Unrecognized { raw: candidate },
        })
        .collect())
}

/// Decompose one select-list item of the form `expr::TYPE AS alias`
///
/// The alias follows the last whitespace-delimited `AS`; the expression and
/// type are split at the last `::` before it. Both markers must sit outside
/// literals and at parenthesis depth zero.
pub fn decompose_projection(candidate: &str) -> Option<ColumnProjection> {
    let candidate = candidate.trim();
    let scanner = SqlScanner::new(candidate);
    let depths = paren_depths(&scanner);
    let bytes = candidate.as_bytes();

    let mut end = candidate.len();
    let as_pos = loop {
        let pos = scanner.rfind_keyword(0..end, "AS")?;
        let spaced_before = pos > 0 && bytes[pos - 1].is_ascii_whitespace();
        let spaced_after = bytes.get(pos + 2).map_or(false, |b| b.is_ascii_whitespace());
        if spaced_before && spaced_after && depths[pos] == 0 {
            break pos;
        }
        end = pos;
    };

    let alias = code_before_comment(&scanner, as_pos + 2, candidate.len());
    if alias.is_empty() {
        return None;
    }

    let mut end = as_pos;
    let cast_pos = loop {
        let pos = scanner.rfind_code_str(0..end, "::")?;
        if depths[pos] == 0 {
            break pos;
        }
        end = pos;
    };

    let transformation = candidate[scanner.skip_whitespace(0).min(cast_pos)..cast_pos].trim();
    let output_type = code_before_comment(&scanner, cast_pos + 2, as_pos);
    if transformation.is_empty() || output_type.is_empty() {
        return None;
    }

    Some(ColumnProjection::cast(transformation, output_type, alias))
}

/// Transformation of the first projection whose alias matches, upper-cased
///
/// Alias comparison is case-insensitive.
pub fn find_transformation_by_alias(ddl: &str, alias: &str) -> Option<String> {
    let wanted = alias.trim().to_uppercase();

    parse_projections(ddl)
        .into_iter()
        .find(|p| p.alias.to_uppercase() == wanted)
        .map(|p| p.transformation.to_uppercase())
}

/// Text of `start..end`, cut at the first comment and trimmed
fn code_before_comment<'a>(scanner: &SqlScanner<'a>, start: usize, end: usize) -> &'a str {
    let end = scanner.find_comment(start..end).unwrap_or(end);
    scanner.text()[start..end].trim()
}

/// Parenthesis depth before each byte
fn paren_depths(scanner: &SqlScanner<'_>) -> Vec<i32> {
    let bytes = scanner.text().as_bytes();
    let mut depths = Vec::with_capacity(bytes.len());
    let mut depth = 0;

    for (pos, &b) in bytes.iter().enumerate() {
        if scanner.is_code(pos) && b == b')' {
            depth -= 1;
        }
        depths.push(depth);
        if scanner.is_code(pos) && b == b'(' {
            depth += 1;
        }
    }

    depths
}
