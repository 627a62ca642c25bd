use crate::parser::{ast::Param, ParseError, QueryParser, WordComparer};

/// Highest placeholder number the server protocol can bind.
const MAX_PARAM_NUMBER: usize = 65535;

/// Positional placeholders: `$1`, `$2`, ...
pub struct ParamParser;

impl ParamParser {
    pub fn is_param(parser: &QueryParser) -> bool {
        parser.current() == '$' && parser.peek(1).is_ascii_digit()
    }

    pub fn parse(parser: &mut QueryParser) -> Result<Param, ParseError> {
        let pivot = parser.position;
        if !Self::is_param(parser) {
            return Err(ParseError::new("Invalid parameter", pivot, parser));
        }
        parser.next();

        let digits = parser.position;
        while parser.current().is_ascii_digit() {
            parser.next();
        }

        if WordComparer::is_ident_char(parser.current()) {
            return Err(ParseError::new("Invalid parameter", pivot, parser));
        }

        let ordinal = parser
            .text_from_pivot(digits)
            .parse::<usize>()
            .ok()
            .filter(|ordinal| (1..=MAX_PARAM_NUMBER).contains(ordinal))
            .ok_or_else(|| ParseError::new("Invalid parameter number", pivot, parser))?;

        Ok(Param { ordinal, offset: pivot, length: parser.position - pivot })
    }
}

#[cfg(test)]
pub mod tests {
    use crate::parser::{ast::{Param, ParamParser}, QueryParser};

    #[test]
    pub fn test_param_parser() {
        let text = "$1";

        let mut parser = QueryParser::new(text);

        let result = ParamParser::parse(&mut parser);

        match result {
            Ok(result) => assert_eq!(result, Param { ordinal: 1, offset: 0, length: 2 }),
            Err(_) => panic!(),
        }
    }

    #[test]
    pub fn test_param_parser_multi_digit_comma_delimiter() {
        let text = "$12,";

        let mut parser = QueryParser::new(text);

        let result = ParamParser::parse(&mut parser);

        match result {
            Ok(result) => assert_eq!(result.ordinal, 12),
            Err(_) => panic!(),
        }
        assert_eq!(parser.current(), ',');
    }

    #[test]
    pub fn test_param_parser_cast_delimiter() {
        let mut parser = QueryParser::new("$3::date");
        match ParamParser::parse(&mut parser) {
            Ok(result) => assert_eq!(result.ordinal, 3),
            Err(_) => panic!(),
        }
        assert_eq!(parser.current(), ':');
    }

    #[test]
    pub fn test_param_parser_zero() {
        let mut parser = QueryParser::new("$0");
        match ParamParser::parse(&mut parser) {
            Ok(_) => panic!(),
            Err(err) => assert_eq!(err.message, "Invalid parameter number"),
        }
    }

    #[test]
    pub fn test_param_parser_leading_zero() {
        let mut parser = QueryParser::new("$01 ");
        match ParamParser::parse(&mut parser) {
            Ok(result) => assert_eq!(result, Param { ordinal: 1, offset: 0, length: 3 }),
            Err(_) => panic!(),
        }
    }

    #[test]
    pub fn test_param_parser_above_protocol_limit() {
        let mut parser = QueryParser::new("$65535");
        match ParamParser::parse(&mut parser) {
            Ok(result) => assert_eq!(result.ordinal, 65535),
            Err(_) => panic!(),
        }

        for text in ["$65536", "$2000000", "$10000000000000000000000"] {
            let mut parser = QueryParser::new(text);
            match ParamParser::parse(&mut parser) {
                Ok(_) => panic!("{} should be rejected", text),
                Err(err) => assert_eq!(err.message, "Invalid parameter number"),
            }
        }
    }

    #[test]
    pub fn test_param_parser_param_wrong() {
        let text = "$1e";

        let mut parser = QueryParser::new(text);

        let result = ParamParser::parse(&mut parser);

        match result {
            Ok(_) => panic!(),
            Err(err) => {
                assert_eq!(err.text, "$1e");
                assert_eq!(err.start, 0);
                assert_eq!(err.end, 2);
            },
        }
    }
}
