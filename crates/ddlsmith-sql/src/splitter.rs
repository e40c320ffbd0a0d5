//! Depth-aware comma splitting
//!
//! Splits a comma-separated expression list into its top-level items, so
//! that `LEFT(ID, 2), NAME` yields two items rather than three. Commas inside
//! string literals, quoted identifiers and comments never split.

use crate::lexer::SqlScanner;

/// Splitting failure reported by [`split_top_level_checked`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SplitError {
    /// A `)` closed nothing, or a `(` was never closed
    #[error("Unbalanced parentheses at offset {position} (depth {depth})")]
    UnbalancedParentheses {
        /// Offset of the stray `)`, or the input length for an unclosed `(`
        position: usize,

        /// Depth at that point
        depth: i32,
    },
}

struct Split {
    segments: Vec<String>,
    first_negative: Option<usize>,
    final_depth: i32,
}

fn split(expr: &str) -> Split {
    let scanner = SqlScanner::new(expr);
    let bytes = expr.as_bytes();

    let mut segments = Vec::new();
    let mut depth: i32 = 0;
    let mut first_negative = None;
    let mut start = 0;

    for (pos, &b) in bytes.iter().enumerate() {
        if !scanner.is_code(pos) {
            continue;
        }

        match b {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth < 0 && first_negative.is_none() {
                    first_negative = Some(pos);
                }
            }
            b',' if depth == 0 => {
                segments.push(expr[start..pos].trim().to_string());
                start = pos + 1;
            }
            _ => {}
        }
    }

    // The final segment is always emitted, even when empty.
    segments.push(expr[start..].trim().to_string());

    Split {
        segments,
        first_negative,
        final_depth: depth,
    }
}

/// Split `expr` at commas that sit at parenthesis depth zero
///
/// Every segment is trimmed. The trailing segment is always present, so an
/// empty input yields one empty segment; callers filter empties. Unbalanced
/// parentheses never abort the split.
pub fn split_top_level(expr: &str) -> Vec<String> {
    split(expr).segments
}

/// Like [`split_top_level`], but fails when parentheses do not balance
pub fn split_top_level_checked(expr: &str) -> Result<Vec<String>, SplitError> {
    let result = split(expr);

    if let Some(position) = result.first_negative {
        return Err(SplitError::UnbalancedParentheses { position, depth: -1 });
    }

    if result.final_depth != 0 {
        return Err(SplitError::UnbalancedParentheses {
            position: expr.len(),
            depth: result.final_depth,
        });
    }

    Ok(result.segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_commas_do_not_split() {
        assert_eq!(split_top_level("LEFT(ID,2), NAME"), vec!["LEFT(ID,2)", "NAME"]);
        assert_eq!(
            split_top_level("COALESCE(A, NVL(B, C)), D , E"),
            vec!["COALESCE(A, NVL(B, C))", "D", "E"]
        );
    }

    #[test]
    fn empty_input_yields_one_empty_segment() {
        assert_eq!(split_top_level(""), vec![""]);
        assert_eq!(split_top_level("   "), vec![""]);
    }

    #[test]
    fn trailing_comma_yields_empty_tail() {
        assert_eq!(split_top_level("A, B,"), vec!["A", "B", ""]);
    }

    #[test]
    fn quoted_commas_do_not_split() {
        assert_eq!(
            split_top_level("CONCAT(A, ', ')::VARCHAR AS X, 'a,b' AS Y, \"c,d\""),
            vec!["CONCAT(A, ', ')::VARCHAR AS X", "'a,b' AS Y", "\"c,d\""]
        );
    }

    #[test]
    fn quoted_parentheses_do_not_change_depth() {
        assert_eq!(split_top_level("'(' AS A, B"), vec!["'(' AS A", "B"]);
    }

    #[test]
    fn unbalanced_input_still_splits() {
        // an unclosed paren swallows the rest of the list
        assert_eq!(split_top_level("F(A, B, C"), vec!["F(A, B, C"]);
        // a stray close paren drives depth negative and stops splitting
        assert_eq!(split_top_level("A), B, C"), vec!["A), B, C"]);
    }

    #[test]
    fn checked_split_reports_imbalance() {
        assert_eq!(
            split_top_level_checked("F(A, B"),
            Err(SplitError::UnbalancedParentheses { position: 6, depth: 1 })
        );
        assert_eq!(
            split_top_level_checked("A), B"),
            Err(SplitError::UnbalancedParentheses { position: 1, depth: -1 })
        );
        assert_eq!(split_top_level_checked("F(A), B").unwrap(), vec!["F(A)", "B"]);
    }

    #[test]
    fn rejoining_reconstructs_balanced_input() {
        let exprs = [
            "LEFT(ID,2), NAME",
            "A",
            "F(G(H(1, 2), 3)), X::NUMBER AS Y, Z",
            "IFF(A > 0, 'pos', 'neg')::VARCHAR AS SIGN, B",
        ];

        for expr in exprs {
            let rejoined = split_top_level(expr).join(",");
            let normalize = |s: &str| s.split(',').map(str::trim).collect::<Vec<_>>().join(",");
            assert_eq!(normalize(&rejoined), normalize(expr.trim()));
        }
    }
}
