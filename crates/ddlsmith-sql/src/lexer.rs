//! Minimal SQL-aware scanner
//!
//! Classifies every byte of a statement as code or as part of a string
//! literal, quoted identifier or comment, so that keyword and delimiter
//! searches only ever match real syntax. All delimiters are ASCII, so every
//! position returned here is a valid `str` slice boundary.

use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Code,
    SingleQuoted,
    DoubleQuoted,
    DollarQuoted,
    LineComment,
    BlockComment,
}

/// What a byte belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteClass {
    /// Plain SQL
    Code,

    /// String literal or quoted identifier, including its quotes
    Quoted,

    /// Line or block comment, including its markers
    Comment,
}

/// A statement with its byte classification
#[derive(Debug, Clone)]
pub struct SqlScanner<'a> {
    text: &'a str,
    classes: Vec<ByteClass>,
}

impl<'a> SqlScanner<'a> {
    /// Scan a statement
    pub fn new(text: &'a str) -> Self {
        let bytes = text.as_bytes();
        let mut classes = vec![ByteClass::Quoted; bytes.len()];
        let mut state = State::Code;
        let mut i = 0;

        while i < bytes.len() {
            let b = bytes[i];
            let next = bytes.get(i + 1).copied();

            match state {
                State::Code => match b {
                    b'\'' => state = State::SingleQuoted,
                    b'"' => state = State::DoubleQuoted,
                    b'-' if next == Some(b'-') => {
                        state = State::LineComment;
                        classes[i] = ByteClass::Comment;
                        classes[i + 1] = ByteClass::Comment;
                        i += 1;
                    }
                    b'/' if next == Some(b'*') => {
                        state = State::BlockComment;
                        classes[i] = ByteClass::Comment;
                        classes[i + 1] = ByteClass::Comment;
                        i += 1;
                    }
                    b'$' if next == Some(b'$') && (i == 0 || !is_ident_byte(bytes[i - 1])) => {
                        state = State::DollarQuoted;
                        i += 1;
                    }
                    _ => classes[i] = ByteClass::Code,
                },
                State::SingleQuoted => match b {
                    b'\\' => i += 1,
                    b'\'' => state = State::Code,
                    _ => {}
                },
                State::DoubleQuoted => {
                    if b == b'"' {
                        state = State::Code;
                    }
                }
                State::DollarQuoted => {
                    if b == b'$' && next == Some(b'$') {
                        state = State::Code;
                        i += 1;
                    }
                }
                State::LineComment => {
                    if b == b'\n' {
                        state = State::Code;
                        classes[i] = ByteClass::Code;
                    } else {
                        classes[i] = ByteClass::Comment;
                    }
                }
                State::BlockComment => {
                    classes[i] = ByteClass::Comment;
                    if b == b'*' && next == Some(b'/') {
                        state = State::Code;
                        classes[i + 1] = ByteClass::Comment;
                        i += 1;
                    }
                }
            }

            i += 1;
        }

        Self { text, classes }
    }

    /// The scanned text
    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Whether the byte at `pos` is outside literals and comments
    pub fn is_code(&self, pos: usize) -> bool {
        self.class_at(pos) == Some(ByteClass::Code)
    }

    /// Classification of the byte at `pos`
    pub fn class_at(&self, pos: usize) -> Option<ByteClass> {
        self.classes.get(pos).copied()
    }

    /// First occurrence of `keyword` at or after `from`, as a whole word in code
    ///
    /// Matching is ASCII case-insensitive. Returns the start offset.
    pub fn find_keyword(&self, from: usize, keyword: &str) -> Option<usize> {
        let kw = keyword.as_bytes();
        if kw.is_empty() || kw.len() > self.len() {
            return None;
        }

        (from..=self.len() - kw.len()).find(|&pos| self.keyword_at(pos, kw))
    }

    /// Last occurrence of `keyword` starting inside `range`, as a whole word in code
    pub fn rfind_keyword(&self, range: Range<usize>, keyword: &str) -> Option<usize> {
        let kw = keyword.as_bytes();
        if kw.is_empty() || kw.len() > self.len() {
            return None;
        }

        let end = range.end.min(self.len() - kw.len() + 1);
        (range.start..end).rev().find(|&pos| self.keyword_at(pos, kw))
    }

    /// First code byte equal to `byte` at or after `from`
    pub fn find_code_byte(&self, from: usize, byte: u8) -> Option<usize> {
        let bytes = self.text.as_bytes();
        (from..bytes.len()).find(|&pos| bytes[pos] == byte && self.is_code(pos))
    }

    /// Last occurrence of `pattern` lying entirely in code within `range`
    pub fn rfind_code_str(&self, range: Range<usize>, pattern: &str) -> Option<usize> {
        let pat = pattern.as_bytes();
        let end = range.end.min(self.len());
        if pat.is_empty() || end < range.start + pat.len() {
            return None;
        }

        let bytes = self.text.as_bytes();
        (range.start..=end - pat.len()).rev().find(|&pos| {
            bytes[pos..pos + pat.len()] == *pat
                && (pos..pos + pat.len()).all(|i| self.is_code(i))
        })
    }

    /// First comment byte inside `range`
    pub fn find_comment(&self, range: Range<usize>) -> Option<usize> {
        let end = range.end.min(self.len());
        (range.start..end).find(|&pos| self.classes[pos] == ByteClass::Comment)
    }

    /// Next position at or after `from` that is neither whitespace nor comment
    pub fn skip_whitespace(&self, from: usize) -> usize {
        let bytes = self.text.as_bytes();
        let mut pos = from;
        while pos < bytes.len() {
            match self.classes[pos] {
                ByteClass::Comment => pos += 1,
                ByteClass::Code if bytes[pos].is_ascii_whitespace() => pos += 1,
                _ => break,
            }
        }
        pos
    }

    fn keyword_at(&self, pos: usize, kw: &[u8]) -> bool {
        let bytes = self.text.as_bytes();
        if !self.is_code(pos) || !bytes[pos..pos + kw.len()].eq_ignore_ascii_case(kw) {
            return false;
        }

        let before_ok = pos == 0 || !is_ident_byte(bytes[pos - 1]);
        let after_ok = bytes
            .get(pos + kw.len())
            .map_or(true, |&b| !is_ident_byte(b));

        before_ok && after_ok
    }
}

/// Bytes that may continue an unquoted identifier
pub fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || b >= 0x80
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_requires_word_boundaries() {
        let scanner = SqlScanner::new("SELECT FROM_DATE, X FROM S.T");
        assert_eq!(scanner.find_keyword(0, "from"), Some(20));
        assert_eq!(scanner.find_keyword(0, "SELECT"), Some(0));
    }

    #[test]
    fn keywords_inside_literals_are_ignored() {
        let scanner = SqlScanner::new("SELECT 'from here' AS A, \"FROM\" FROM T");
        let pos = scanner.find_keyword(0, "FROM").unwrap();
        assert_eq!(&scanner.text()[pos..], "FROM T");
    }

    #[test]
    fn comments_are_not_code() {
        let sql = "SELECT A -- from nowhere\n, B /* FROM x */ FROM T";
        let scanner = SqlScanner::new(sql);
        let pos = scanner.find_keyword(0, "FROM").unwrap();
        assert_eq!(&sql[pos..], "FROM T");
    }

    #[test]
    fn escaped_quotes_stay_inside_literal() {
        let sql = "SELECT 'it''s from' AS A, 'a\\' from' AS B FROM T";
        let scanner = SqlScanner::new(sql);
        let pos = scanner.find_keyword(0, "FROM").unwrap();
        assert_eq!(&sql[pos..], "FROM T");
    }

    #[test]
    fn dollar_quoted_body_is_literal() {
        let sql = "SELECT $$ from $$ AS A FROM T";
        let scanner = SqlScanner::new(sql);
        let pos = scanner.find_keyword(0, "FROM").unwrap();
        assert_eq!(&sql[pos..], "FROM T");
    }

    #[test]
    fn rfind_helpers() {
        let sql = "CAST(A AS INT)::NUMBER AS ID";
        let scanner = SqlScanner::new(sql);
        assert_eq!(scanner.rfind_keyword(0..sql.len(), "AS"), Some(23));
        assert_eq!(scanner.rfind_keyword(0..23, "AS"), Some(7));
        assert_eq!(scanner.rfind_code_str(0..23, "::"), Some(14));

        let quoted = SqlScanner::new("'a::b' AS X");
        assert_eq!(quoted.rfind_code_str(0..6, "::"), None);
    }

    #[test]
    fn find_comment_in_range() {
        let scanner = SqlScanner::new("A AS B -- note\n/* x */ C");
        assert_eq!(scanner.find_comment(0..20), Some(7));
        assert_eq!(scanner.find_comment(0..6), None);
        assert_eq!(scanner.find_comment(15..100), Some(15));
    }

    #[test]
    fn find_code_byte_skips_literals() {
        let scanner = SqlScanner::new("COMMENT = 'a=b' WAREHOUSE = WH");
        assert_eq!(scanner.find_code_byte(10, b'='), Some(26));
    }

    #[test]
    fn skip_whitespace_stops_at_literal() {
        let scanner = SqlScanner::new("=   '1 minute'");
        assert_eq!(scanner.skip_whitespace(1), 4);

        let commented = SqlScanner::new("= /* lag */ '1 minute'");
        assert_eq!(commented.skip_whitespace(1), 12);
    }
}
