use crate::parser::{ParseError, QueryComparers, WordComparer};

/// Selects one comparer out of the parser's `QueryComparers`.
pub type Keyword = fn(&QueryComparers) -> &WordComparer;

/// Nesting bound for subqueries, parentheses and prefix operators. Each level
/// costs several precedence frames, so this keeps a 2 MiB thread stack safe.
const MAX_DEPTH: usize = 32;

/// Character cursor shared by every parsing routine.
#[derive(Debug, Default)]
pub struct QueryParser {
    pub position: usize,
    pub length: usize,
    pub text_v: Vec<char>,
    pub depth: usize,

    pub comparers: QueryComparers,
}

impl QueryParser {
    pub fn new(query: &str) -> Self {
        let text_v: Vec<char> = query.chars().collect();
        Self {
            position: 0,
            length: text_v.len(),
            text_v,
            comparers: QueryComparers::new(),
            ..Default::default()
        }
    }

    pub fn eof(&self) -> bool {
        self.position >= self.length
    }

    pub fn current(&self) -> char {
        self.peek(0)
    }

    pub fn peek(&self, ahead: usize) -> char {
        self.text_v.get(self.position + ahead).copied().unwrap_or('\0')
    }

    pub fn next(&mut self) {
        if self.position < self.length {
            self.position += 1;
        }
    }

    pub fn jump(&mut self, ahead: usize) {
        self.position = (self.position + ahead).min(self.length);
    }

    /// Skips whitespace, `-- line` comments and `/* block */` comments.
    pub fn next_non_whitespace(&mut self) {
        loop {
            while !self.eof() && self.current().is_whitespace() {
                self.next();
            }

            if self.current() == '-' && self.peek(1) == '-' {
                while !self.eof() && self.current() != '\n' {
                    self.next();
                }
            } else if self.current() == '/' && self.peek(1) == '*' {
                self.jump(2);
                let mut nesting = 1;
                while !self.eof() && nesting > 0 {
                    if self.current() == '/' && self.peek(1) == '*' {
                        nesting += 1;
                        self.jump(2);
                    } else if self.current() == '*' && self.peek(1) == '/' {
                        nesting -= 1;
                        self.jump(2);
                    } else {
                        self.next();
                    }
                }
            } else {
                return;
            }
        }
    }

    pub fn text_from_range(&self, start: usize, end: usize) -> String {
        let end = end.min(self.length);
        let start = start.min(end);
        self.text_v[start..end].iter().collect()
    }

    pub fn text_from_pivot(&self, pivot: usize) -> String {
        self.text_from_range(pivot, self.position)
    }

    /// True when the next token is `keyword`; nothing is consumed apart from whitespace.
    pub fn is(&mut self, keyword: Keyword) -> bool {
        self.next_non_whitespace();
        keyword(&self.comparers).compare(self)
    }

    /// Consumes `keyword` when it is the next token.
    pub fn take(&mut self, keyword: Keyword) -> bool {
        self.next_non_whitespace();
        let comparer = keyword(&self.comparers);
        if comparer.compare(self) {
            let length = comparer.length;
            self.jump(length);
            return true;
        }
        false
    }

    pub fn expect(&mut self, keyword: Keyword, message: &str) -> Result<(), ParseError> {
        if self.take(keyword) {
            return Ok(());
        }
        ParseError::new(message, self.position, self).err()
    }

    pub fn is_char(&mut self, ch: char) -> bool {
        self.next_non_whitespace();
        self.current() == ch
    }

    pub fn take_char(&mut self, ch: char) -> bool {
        if self.is_char(ch) {
            self.next();
            return true;
        }
        false
    }

    pub fn expect_char(&mut self, ch: char) -> Result<(), ParseError> {
        if self.take_char(ch) {
            return Ok(());
        }
        ParseError::new(&format!("Expected '{}'", ch), self.position, self).err()
    }

    /// Upper-cased bare word at the cursor, empty when the cursor is not on a word.
    pub fn peek_word(&mut self) -> String {
        self.next_non_whitespace();
        self.word_at(self.position)
    }

    /// Consumes a bare word that has no dedicated comparer (`ROWS`, `PRECEDING`, ...).
    pub fn take_word(&mut self, word: &str) -> bool {
        if self.peek_word() == word {
            self.jump(word.chars().count());
            return true;
        }
        false
    }

    /// Upper-cased bare word following the one at the cursor.
    pub fn peek_second_word(&mut self) -> String {
        self.next_non_whitespace();
        let mut position = self.position;
        while position < self.length && WordComparer::is_ident_char(self.text_v[position]) {
            position += 1;
        }
        while position < self.length && self.text_v[position].is_whitespace() {
            position += 1;
        }
        self.word_at(position)
    }

    fn word_at(&self, start: usize) -> String {
        if start >= self.length || !WordComparer::is_ident_start(self.text_v[start]) {
            return String::new();
        }
        self.text_v[start..]
            .iter()
            .take_while(|ch| WordComparer::is_ident_char(**ch))
            .collect::<String>()
            .to_uppercase()
    }

    pub fn enter(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return ParseError::new("Statement nested too deeply", self.position, self).err();
        }
        Ok(())
    }

    pub fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}
