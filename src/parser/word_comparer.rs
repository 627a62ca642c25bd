use crate::parser::QueryParser;

/// Case-insensitive matcher for a single keyword or operator at the cursor.
///
/// Keywords (anything starting with a letter) only match on a word boundary,
/// so `IN` does not match the start of `INNER` or `index_id`.
#[derive(Debug, Default)]
pub struct WordComparer {
    pub length: usize,
    pub word: Vec<char>,
    word_boundary: bool,
    forbidden_postfix: Vec<char>,
}

impl WordComparer {
    pub fn new(word: &str) -> Self {
        let word: Vec<char> = word.to_uppercase().chars().collect();
        Self {
            length: word.len(),
            word_boundary: word.first().is_some_and(|c| c.is_ascii_alphabetic()),
            word,
            forbidden_postfix: vec![],
        }
    }

    pub fn is_ident_start(ch: char) -> bool {
        ch.is_alphabetic() || ch == '_'
    }

    pub fn is_ident_char(ch: char) -> bool {
        ch.is_alphanumeric() || ch == '_' || ch == '$'
    }

    pub fn is_block_delimiter(ch: char) -> bool {
        ch.is_whitespace()
    }

    pub fn is_any_delimiter(ch: char) -> bool {
        ch == ',' || ch == '(' || ch == ')' || ch == '.' || ch == ';' || Self::is_block_delimiter(ch)
    }

    pub fn compare(&self, parser: &QueryParser) -> bool {
        if self.length == 0 {
            return false;
        }

        let mut position = 0;
        while position < self.length {
            if (parser.position + position) >= parser.length ||
                self.word[position] != parser.text_v[parser.position + position].to_uppercase().next().unwrap_or('\0') {
                return false;
            }
            position += 1;
        }

        let next = parser.peek(self.length);

        if self.word_boundary && Self::is_ident_char(next) {
            return false;
        }

        !self.forbidden_postfix.contains(&next)
    }

    /// Rejects the match when the next character is `value`, e.g. `<` must not be followed by `=`.
    pub fn without_postfix(mut self, value: char) -> Self { self.forbidden_postfix.push(value); self }
}

#[cfg(test)]
mod tests {
    use crate::parser::{QueryParser, WordComparer};

    #[test]
    fn test_keyword_is_case_insensitive() {
        let parser = QueryParser::new("where id = 1");
        assert!(WordComparer::new("WHERE").compare(&parser));
    }

    #[test]
    fn test_keyword_respects_word_boundary() {
        let parser = QueryParser::new("inner_total");
        assert!(!WordComparer::new("INNER").compare(&parser));
        assert!(!WordComparer::new("IN").compare(&parser));
    }

    #[test]
    fn test_keyword_at_eof() {
        let parser = QueryParser::new("null");
        assert!(WordComparer::new("NULL").compare(&parser));
    }

    #[test]
    fn test_symbol_does_not_need_boundary() {
        let parser = QueryParser::new("=$1");
        assert!(WordComparer::new("=").compare(&parser));
    }

    #[test]
    fn test_symbol_with_forbidden_postfix() {
        let parser = QueryParser::new("<=");
        assert!(!WordComparer::new("<").without_postfix('=').compare(&parser));
        assert!(WordComparer::new("<=").compare(&parser));
    }
}
