//! Decoder for the list-literal encoding of the `genres` column,
//! e.g. `['Action', "Sci-Fi"]`.
//!
//! Only a flat list of quoted strings is accepted. Anything else is
//! rejected with the byte offset where decoding stopped.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenreParseError {
    #[error("expected '[' at offset {0}")]
    MissingOpenBracket(usize),
    #[error("expected a quoted string at offset {0}")]
    ExpectedString(usize),
    #[error("expected ',' or ']' at offset {0}")]
    ExpectedSeparator(usize),
    #[error("unterminated string starting at offset {0}")]
    UnterminatedString(usize),
    #[error("unknown escape '\\{1}' at offset {0}")]
    BadEscape(usize, char),
    #[error("unexpected trailing input at offset {0}")]
    TrailingInput(usize),
}

/// Decode a list literal into its ordered string items.
pub fn decode_genres(text: &str) -> Result<Vec<String>, GenreParseError> {
    let mut cursor = Cursor::new(text);
    cursor.skip_ws();
    if !cursor.eat('[') {
        return Err(GenreParseError::MissingOpenBracket(cursor.pos));
    }

    let mut items = Vec::new();
    loop {
        cursor.skip_ws();
        if cursor.eat(']') {
            break;
        }
        items.push(cursor.quoted()?);
        cursor.skip_ws();
        if cursor.eat(',') {
            continue;
        }
        if cursor.eat(']') {
            break;
        }
        return Err(GenreParseError::ExpectedSeparator(cursor.pos));
    }

    cursor.skip_ws();
    if cursor.peek().is_some() {
        return Err(GenreParseError::TrailingInput(cursor.pos));
    }
    Ok(items)
}

struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn quoted(&mut self) -> Result<String, GenreParseError> {
        let start = self.pos;
        let quote = match self.peek() {
            Some(q @ ('\'' | '"')) => q,
            _ => return Err(GenreParseError::ExpectedString(start)),
        };
        self.bump();

        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(GenreParseError::UnterminatedString(start)),
                Some(c) if c == quote => return Ok(out),
                Some('\\') => {
                    let at = self.pos;
                    match self.bump() {
                        Some('\\') => out.push('\\'),
                        Some('\'') => out.push('\''),
                        Some('"') => out.push('"'),
                        Some('n') => out.push('\n'),
                        Some('t') => out.push('\t'),
                        Some(other) => return Err(GenreParseError::BadEscape(at, other)),
                        None => return Err(GenreParseError::UnterminatedString(start)),
                    }
                }
                Some(c) => out.push(c),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_single_and_double_quoted_items() {
        assert_eq!(
            decode_genres("['Action', \"Sci-Fi\"]").unwrap(),
            vec!["Action".to_string(), "Sci-Fi".to_string()]
        );
        assert_eq!(decode_genres("['Drama','Comedy']").unwrap(), vec!["Drama", "Comedy"]);
    }

    #[test]
    fn tolerates_whitespace_and_trailing_comma() {
        assert_eq!(decode_genres("  [ 'Drama' , ]  ").unwrap(), vec!["Drama"]);
        assert!(decode_genres("[]").unwrap().is_empty());
        assert!(decode_genres("[ ]").unwrap().is_empty());
    }

    #[test]
    fn handles_escapes_and_embedded_quotes() {
        assert_eq!(
            decode_genres(r#"['Rock \'n\' Roll', "It's"]"#).unwrap(),
            vec!["Rock 'n' Roll", "It's"]
        );
        assert!(matches!(
            decode_genres(r"['a\q']"),
            Err(GenreParseError::BadEscape(_, 'q'))
        ));
    }

    #[test]
    fn rejects_malformed_literals() {
        assert_eq!(
            decode_genres("Action, Drama"),
            Err(GenreParseError::MissingOpenBracket(0))
        );
        assert_eq!(decode_genres("[Action]"), Err(GenreParseError::ExpectedString(1)));
        assert_eq!(decode_genres("[1, 2]"), Err(GenreParseError::ExpectedString(1)));
        assert_eq!(
            decode_genres("['Drama'"),
            Err(GenreParseError::ExpectedSeparator(8))
        );
        assert_eq!(
            decode_genres("['Drama"),
            Err(GenreParseError::UnterminatedString(1))
        );
        assert_eq!(
            decode_genres("['Drama'] x"),
            Err(GenreParseError::TrailingInput(10))
        );
        assert!(decode_genres("[['Drama']]").is_err());
        assert!(decode_genres("").is_err());
    }
}
