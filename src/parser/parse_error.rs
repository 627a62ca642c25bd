use std::fmt::Display;

use crate::parser::QueryParser;

/// Where and why a statement stopped parsing. Offsets count chars; `line`
/// and `column` are 1-based and point at `start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl ParseError {
    pub fn new(message: &str, pivot: usize, parser: &QueryParser) -> Self {
        let pivot = pivot.min(parser.position);
        let (line, column) = Self::locate(parser, pivot);
        Self {
            message: message.to_string(),
            text: parser.text_from_range(pivot, parser.position + 1),
            start: pivot,
            end: parser.position,
            line,
            column,
        }
    }

    pub fn err<T>(self) -> Result<T, ParseError> {
        Err(self)
    }

    fn locate(parser: &QueryParser, offset: usize) -> (usize, usize) {
        let before = &parser.text_v[..offset.min(parser.length)];
        let line = before.iter().filter(|ch| **ch == '\n').count() + 1;
        let column = before.iter().rev().take_while(|ch| **ch != '\n').count() + 1;
        (line, column)
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at line {}, column {} near '{}'", self.message, self.line, self.column, self.text)
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use crate::parser::{ParseError, QueryParser};

    #[test]
    fn test_line_and_column() {
        let mut parser = QueryParser::new("SELECT *\nFROM orders\nWHERE ) = $1");
        parser.jump(27);
        let error = ParseError::new("Expected expression", 27, &parser);

        assert_eq!((error.line, error.column), (3, 7));
        assert_eq!(error.text, ")");
        assert_eq!(error.to_string(), "Expected expression at line 3, column 7 near ')'");
    }

    #[test]
    fn test_pivot_is_clamped() {
        let parser = QueryParser::new("SELECT");
        let error = ParseError::new("Unexpected", 4, &parser);
        assert_eq!((error.start, error.end), (0, 0));
        assert_eq!((error.line, error.column), (1, 1));
    }
}
