use crate::parser::{ParseError, QueryParser, WordComparer};

/// Single-quoted, `E'...'` and dollar-quoted string constants.
pub struct StringParser;

impl StringParser {
    pub fn is_string(parser: &QueryParser) -> bool {
        let current = parser.current();
        current == '\''
            || ((current == 'e' || current == 'E') && parser.peek(1) == '\'')
            || Self::dollar_tag_length(parser).is_some()
    }

    /// Length of a `$tag$` opener at the cursor (`$$` included), if any.
    fn dollar_tag_length(parser: &QueryParser) -> Option<usize> {
        if parser.current() != '$' {
            return None;
        }
        let next = parser.peek(1);
        if next == '$' {
            return Some(2);
        }
        if !WordComparer::is_ident_start(next) {
            return None;
        }
        let mut ahead = 1;
        while WordComparer::is_ident_char(parser.peek(ahead)) && parser.peek(ahead) != '$' {
            ahead += 1;
        }
        match parser.peek(ahead) {
            '$' => Some(ahead + 1),
            _ => None,
        }
    }

    pub fn parse(parser: &mut QueryParser) -> Result<String, ParseError> {
        if let Some(length) = Self::dollar_tag_length(parser) {
            return Self::parse_dollar_quoted(parser, length);
        }

        let escaped = parser.current() == 'e' || parser.current() == 'E';
        if escaped {
            parser.next();
        }

        let pivot = parser.position;
        if parser.current() != '\'' {
            return Err(ParseError::new("Invalid string value", pivot, parser));
        }
        parser.next();

        let mut value = String::new();
        loop {
            if parser.eof() {
                return Err(ParseError::new("Unterminated string", pivot, parser));
            }

            let current = parser.current();
            if current == '\'' {
                if parser.peek(1) == '\'' {
                    value.push('\'');
                    parser.jump(2);
                    continue;
                }
                parser.next();
                break;
            }

            if escaped && current == '\\' {
                parser.next();
                value.push(match parser.current() {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    'b' => '\u{8}',
                    'f' => '\u{c}',
                    other => other,
                });
                parser.next();
                continue;
            }

            value.push(current);
            parser.next();
        }

        Ok(value)
    }

    fn parse_dollar_quoted(parser: &mut QueryParser, tag_length: usize) -> Result<String, ParseError> {
        let pivot = parser.position;
        let tag: Vec<char> = parser.text_v[pivot..pivot + tag_length].to_vec();
        parser.jump(tag_length);

        let start = parser.position;
        while !parser.eof() {
            if parser.text_v[parser.position..].starts_with(&tag) {
                let value = parser.text_from_pivot(start);
                parser.jump(tag_length);
                return Ok(value);
            }
            parser.next();
        }

        Err(ParseError::new("Unterminated dollar-quoted string", pivot, parser))
    }
}

#[cfg(test)]
pub mod tests {
    use crate::parser::{ast::StringParser, QueryParser};

    #[test]
    pub fn test_string_parser() {
        let text = "'identifier'";

        let mut parser = QueryParser::new(text);

        let result = StringParser::parse(&mut parser);

        match result {
            Ok(result) => assert_eq!(result, "identifier"),
            Err(_) => panic!(),
        }
        assert!(parser.eof());
    }

    #[test]
    pub fn test_string_parser_doubled_quote() {
        let text = "'it''s'";

        let mut parser = QueryParser::new(text);

        let result = StringParser::parse(&mut parser);

        match result {
            Ok(result) => assert_eq!(result, "it's"),
            Err(_) => panic!(),
        }
    }

    #[test]
    pub fn test_string_parser_escape_string() {
        let text = r"E'a\'b\n'";

        let mut parser = QueryParser::new(text);

        let result = StringParser::parse(&mut parser);

        match result {
            Ok(result) => assert_eq!(result, "a'b\n"),
            Err(_) => panic!(),
        }
    }

    #[test]
    pub fn test_string_parser_dollar_quoted() {
        let text = "$fn$ it's $1 $fn$ rest";

        let mut parser = QueryParser::new(text);
        assert!(StringParser::is_string(&parser));

        let result = StringParser::parse(&mut parser);

        match result {
            Ok(result) => assert_eq!(result, " it's $1 "),
            Err(_) => panic!(),
        }
        assert_eq!(parser.current(), ' ');
    }

    #[test]
    pub fn test_param_is_not_dollar_quote() {
        let parser = QueryParser::new("$1");
        assert!(!StringParser::is_string(&parser));
    }

    #[test]
    pub fn test_string_parser_unterminated() {
        let text = "'open";

        let mut parser = QueryParser::new(text);

        let result = StringParser::parse(&mut parser);

        match result {
            Ok(_) => panic!(),
            Err(err) => {
                assert_eq!(err.message, "Unterminated string");
                assert_eq!(err.start, 0);
                assert_eq!(err.end, 5);
            },
        }
    }
}
