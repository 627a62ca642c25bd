use crate::parser::{ast::{Expr, NameParser}, ParseError, QueryParser};

/// One projection or `RETURNING` item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    pub expression: Expr,
    pub alias: Option<String>,
}

impl Identifier {
    pub fn parse(parser: &mut QueryParser) -> Result<Identifier, ParseError> {
        let expression = Expr::parse(parser)?;
        let alias = NameParser::parse_alias(parser)?;
        Ok(Identifier { expression, alias })
    }

    pub fn parse_list(parser: &mut QueryParser) -> Result<Vec<Identifier>, ParseError> {
        let mut identifiers = vec![Self::parse(parser)?];
        while parser.take_char(',') {
            identifiers.push(Self::parse(parser)?);
        }
        Ok(identifiers)
    }
}
