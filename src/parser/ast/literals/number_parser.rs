use ordered_float::NotNan;

use crate::parser::{ast::Literal, ParseError, QueryParser, WordComparer};

/// Unsigned numeric constants; the sign is a unary operator.
pub struct NumberParser;

impl NumberParser {
    pub fn is_number(parser: &QueryParser) -> bool {
        let current = parser.current();
        current.is_ascii_digit() || (current == '.' && parser.peek(1).is_ascii_digit())
    }

    pub fn parse(parser: &mut QueryParser) -> Result<Literal, ParseError> {
        let pivot = parser.position;
        let mut is_float = false;

        if !NumberParser::is_number(parser) {
            return Err(ParseError::new("Invalid number value", pivot, parser));
        }

        while parser.current().is_ascii_digit() || parser.current() == '_' {
            parser.next();
        }

        if parser.current() == '.' && parser.peek(1) != '.' {
            is_float = true;
            parser.next();
            while parser.current().is_ascii_digit() {
                parser.next();
            }
        }

        let exponent_start = parser.current() == 'e' || parser.current() == 'E';
        let exponent_digit = parser.peek(1).is_ascii_digit()
            || ((parser.peek(1) == '+' || parser.peek(1) == '-') && parser.peek(2).is_ascii_digit());
        if exponent_start && exponent_digit {
            is_float = true;
            parser.jump(2);
            while parser.current().is_ascii_digit() {
                parser.next();
            }
        }

        if WordComparer::is_ident_char(parser.current()) {
            return Err(ParseError::new("Invalid number value", pivot, parser));
        }

        let number = parser.text_from_pivot(pivot).replace('_', "");
        let float = |parser: &QueryParser| {
            number
                .parse::<f64>()
                .ok()
                .and_then(|value| NotNan::new(value).ok())
                .map(Literal::Float)
                .ok_or_else(|| ParseError::new("Invalid number", pivot, parser))
        };

        match is_float {
            true => float(&*parser),
            // integers beyond i64 stay numeric
            false => match number.parse::<i64>() {
                Ok(value) => Ok(Literal::Int(value)),
                Err(_) => float(&*parser),
            },
        }
    }
}

#[cfg(test)]
pub mod tests {
    use crate::parser::{ast::{Literal, NumberParser}, QueryParser};

    #[test]
    pub fn test_number_parser_int() {
        let text = "32";

        let mut parser = QueryParser::new(text);

        let result = NumberParser::parse(&mut parser);

        match result {
            Ok(result) => match result {
                Literal::Int(value) => assert_eq!(value, 32),
                _ => panic!(),
            },
            Err(_) => panic!(),
        }
    }

    #[test]
    pub fn test_number_parser_float() {
        let text = "3.25)";

        let mut parser = QueryParser::new(text);

        let result = NumberParser::parse(&mut parser);

        match result {
            Ok(result) => match result {
                Literal::Float(value) => assert_eq!(value.into_inner(), 3.25),
                _ => panic!(),
            },
            Err(_) => panic!(),
        }
        assert_eq!(parser.current(), ')');
    }

    #[test]
    pub fn test_number_parser_leading_dot_and_exponent() {
        let mut parser = QueryParser::new(".5");
        match NumberParser::parse(&mut parser) {
            Ok(Literal::Float(value)) => assert_eq!(value.into_inner(), 0.5),
            _ => panic!(),
        }

        let mut parser = QueryParser::new("1e-3");
        match NumberParser::parse(&mut parser) {
            Ok(Literal::Float(value)) => assert_eq!(value.into_inner(), 0.001),
            _ => panic!(),
        }
    }

    #[test]
    pub fn test_number_parser_huge_int() {
        let mut parser = QueryParser::new("99999999999999999999");
        match NumberParser::parse(&mut parser) {
            Ok(Literal::Float(_)) => {}
            _ => panic!(),
        }
    }

    #[test]
    pub fn test_number_parser_wrong() {
        let text = "12ab";

        let mut parser = QueryParser::new(text);

        let result = NumberParser::parse(&mut parser);

        match result {
            Ok(_) => panic!(),
            Err(err) => {
                assert_eq!(err.start, 0);
                assert_eq!(err.end, 2);
            },
        }
    }
}
