use crate::{
    database::SqlType,
    parser::{ast::NameParser, ParseError, QueryParser},
};

const INTERVAL_FIELDS: &[&str] = &["YEAR", "MONTH", "DAY", "HOUR", "MINUTE", "SECOND", "TO"];

/// Type names after `::`, in `CAST(... AS ...)` and in column definition lists.
pub struct DataTypeParser;

impl DataTypeParser {
    pub fn parse(parser: &mut QueryParser) -> Result<SqlType, ParseError> {
        let parts = NameParser::parse_qualified(parser)?;
        let mut name = parts.join(".");
        let base = parts.last().map(|part| part.as_str()).unwrap_or_default().to_string();

        match base.as_str() {
            "double" => {
                if parser.take_word("PRECISION") {
                    name.push_str(" precision");
                }
            }
            "character" | "char" | "bit" => {
                if parser.take_word("VARYING") {
                    name.push_str(" varying");
                }
            }
            "interval" => {
                while INTERVAL_FIELDS.contains(&parser.peek_word().as_str()) {
                    let word = parser.peek_word();
                    parser.take_word(&word);
                }
            }
            _ => {}
        }

        Self::skip_modifiers(parser)?;

        if (base == "timestamp" || base == "time")
            && matches!(parser.peek_word().as_str(), "WITH" | "WITHOUT")
            && parser.peek_second_word() == "TIME"
        {
            let with = parser.take_word("WITH");
            if !with {
                parser.take_word("WITHOUT");
            }
            parser.expect(|c| &c.time, "Expected TIME")?;
            parser.expect(|c| &c.zone, "Expected ZONE")?;
            if with {
                name.push_str(" with time zone");
            }
        }

        let mut data_type = SqlType::from_name(&name);

        while parser.is_char('[') {
            parser.next();
            while parser.current().is_ascii_digit() {
                parser.next();
            }
            parser.expect_char(']')?;
            data_type = SqlType::array_of(data_type);
        }

        Ok(data_type)
    }

    /// `(n)` or `(p, s)`
    fn skip_modifiers(parser: &mut QueryParser) -> Result<(), ParseError> {
        if !parser.is_char('(') {
            return Ok(());
        }
        parser.next();
        while !parser.eof() && parser.current() != ')' {
            parser.next();
        }
        parser.expect_char(')')
    }
}

#[cfg(test)]
mod tests {
    use crate::{database::SqlType, parser::{ast::DataTypeParser, QueryParser}};

    fn parse(text: &str) -> SqlType {
        let mut parser = QueryParser::new(text);
        DataTypeParser::parse(&mut parser).expect("Failed to parse data type")
    }

    #[test]
    pub fn test_simple_types() {
        assert_eq!(parse("date"), SqlType::Date);
        assert_eq!(parse("INT"), SqlType::Integer);
        assert_eq!(parse("varchar(20)"), SqlType::Varchar);
        assert_eq!(parse("numeric(10,2)"), SqlType::Numeric);
    }

    #[test]
    pub fn test_multi_word_types() {
        assert_eq!(parse("double precision"), SqlType::Double);
        assert_eq!(parse("character varying(5)"), SqlType::Varchar);
        assert_eq!(parse("timestamp(3) with time zone"), SqlType::TimestampTz);
        assert_eq!(parse("timestamp without time zone"), SqlType::Timestamp);
    }

    #[test]
    pub fn test_array_types() {
        assert_eq!(parse("int[]"), SqlType::array_of(SqlType::Integer));
        assert_eq!(parse("text[][]"), SqlType::array_of(SqlType::array_of(SqlType::Text)));
    }

    #[test]
    pub fn test_stops_at_operator() {
        let mut parser = QueryParser::new("date = d");
        assert_eq!(DataTypeParser::parse(&mut parser).expect("Failed to parse data type"), SqlType::Date);
        assert!(parser.is_char('='));
    }

    #[test]
    pub fn test_qualified_type() {
        assert_eq!(parse("pg_catalog.int8"), SqlType::BigInt);
        assert_eq!(parse("public.mood"), SqlType::Other("public.mood".to_string()));
    }
}
