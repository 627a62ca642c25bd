use crate::parser::{ParseError, QueryComparers, QueryParser, WordComparer};

/// Identifiers: unquoted ones fold to lower case, `"Quoted"` ones keep their case.
pub struct NameParser;

impl NameParser {
    pub fn is_name_start(parser: &QueryParser) -> bool {
        parser.current() == '"' || WordComparer::is_ident_start(parser.current())
    }

    pub fn parse(parser: &mut QueryParser) -> Result<String, ParseError> {
        parser.next_non_whitespace();
        let pivot = parser.position;

        if parser.current() == '"' {
            parser.next();
            let mut name = String::new();
            loop {
                if parser.eof() {
                    return ParseError::new("Unterminated quoted identifier", pivot, parser).err();
                }
                if parser.current() == '"' {
                    if parser.peek(1) == '"' {
                        name.push('"');
                        parser.jump(2);
                        continue;
                    }
                    parser.next();
                    return Ok(name);
                }
                name.push(parser.current());
                parser.next();
            }
        }

        if !WordComparer::is_ident_start(parser.current()) {
            return ParseError::new("Expected identifier", pivot, parser).err();
        }

        while WordComparer::is_ident_char(parser.current()) {
            parser.next();
        }

        Ok(parser.text_from_pivot(pivot).to_lowercase())
    }

    /// `a`, `a.b`, `a.b.c`; stops before `.*`.
    pub fn parse_qualified(parser: &mut QueryParser) -> Result<Vec<String>, ParseError> {
        let mut parts = vec![Self::parse(parser)?];
        while parser.current() == '.'
            && (parser.peek(1) == '"' || WordComparer::is_ident_start(parser.peek(1)))
        {
            parser.next();
            parts.push(Self::parse(parser)?);
        }
        Ok(parts)
    }

    /// `AS name`, or a bare name that is not a reserved word.
    pub fn parse_alias(parser: &mut QueryParser) -> Result<Option<String>, ParseError> {
        if parser.take(|c| &c.alias) {
            return Ok(Some(Self::parse(parser)?));
        }

        parser.next_non_whitespace();
        if parser.current() == '"' {
            return Ok(Some(Self::parse(parser)?));
        }

        let word = parser.peek_word();
        if word.is_empty() || QueryComparers::is_reserved(&word) {
            return Ok(None);
        }

        Ok(Some(Self::parse(parser)?))
    }

    /// `(a, b, c)`
    pub fn parse_list(parser: &mut QueryParser) -> Result<Vec<String>, ParseError> {
        parser.expect_char('(')?;
        let mut names = vec![Self::parse(parser)?];
        while parser.take_char(',') {
            names.push(Self::parse(parser)?);
        }
        parser.expect_char(')')?;
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::{ast::NameParser, QueryParser};

    #[test]
    pub fn test_unquoted_is_folded() {
        let mut parser = QueryParser::new("Orders");
        assert_eq!(NameParser::parse(&mut parser).expect("Failed to parse name"), "orders");
    }

    #[test]
    pub fn test_quoted_keeps_case() {
        let mut parser = QueryParser::new("\"Order \"\"Items\"\"\"");
        assert_eq!(NameParser::parse(&mut parser).expect("Failed to parse name"), "Order \"Items\"");
    }

    #[test]
    pub fn test_qualified_stops_before_wildcard() {
        let mut parser = QueryParser::new("public.orders.*");
        let parts = NameParser::parse_qualified(&mut parser).expect("Failed to parse name");
        assert_eq!(parts, vec!["public", "orders"]);
        assert_eq!(parser.current(), '.');
    }

    #[test]
    pub fn test_alias_skips_reserved() {
        let mut parser = QueryParser::new(" WHERE");
        assert_eq!(NameParser::parse_alias(&mut parser).expect("Failed to parse alias"), None);

        let mut parser = QueryParser::new(" AS o");
        assert_eq!(NameParser::parse_alias(&mut parser).expect("Failed to parse alias"), Some("o".to_string()));

        let mut parser = QueryParser::new(" c,");
        assert_eq!(NameParser::parse_alias(&mut parser).expect("Failed to parse alias"), Some("c".to_string()));
    }

    #[test]
    pub fn test_unterminated_quote() {
        let mut parser = QueryParser::new("\"open");
        match NameParser::parse(&mut parser) {
            Ok(_) => panic!(),
            Err(err) => assert_eq!(err.message, "Unterminated quoted identifier"),
        }
    }
}
