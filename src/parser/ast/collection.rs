use crate::{
    database::TableName,
    parser::{
        ast::{DataTypeParser, ExprParser, Function, Join, NameParser, SelectQuery},
        ParseError, QueryComparers, QueryParser,
    },
};

/// One `FROM` item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Collection {
    Table { name: TableName, alias: Option<String> },
    Query { query: Box<SelectQuery>, alias: Option<String>, lateral: bool },
    Function { function: Function, alias: Option<String> },
}

impl Collection {
    pub fn parse(parser: &mut QueryParser) -> Result<Collection, ParseError> {
        let lateral = parser.take(|c| &c.lateral);
        let pivot = parser.position;

        if parser.take_char('(') {
            if !ExprParser::is_query_start(parser) && !parser.is_char('(') {
                return ParseError::new("Unsupported parenthesised FROM item", pivot, parser).err();
            }
            let query = SelectQuery::parse(parser)?;
            parser.expect_char(')')?;
            let alias = Self::parse_alias(parser)?;
            return Ok(Collection::Query { query: Box::new(query), alias, lateral });
        }

        parser.take(|c| &c.only);
        if QueryComparers::is_reserved(&parser.peek_word()) {
            return ParseError::new("Expected table name", parser.position, parser).err();
        }
        let parts = NameParser::parse_qualified(parser)?;

        if parser.is_char('(') {
            let function = ExprParser::parse_function(parser, &parts.join("."))?;
            if parser.take(|c| &c.with) && !parser.take_word("ORDINALITY") {
                return ParseError::new("Expected ORDINALITY", parser.position, parser).err();
            }
            let alias = Self::parse_alias(parser)?;
            return Ok(Collection::Function { function, alias });
        }

        let name = TableName::from_parts(&parts)
            .ok_or_else(|| ParseError::new("Invalid table name", pivot, parser))?;
        let alias = Self::parse_alias(parser)?;

        Ok(Collection::Table { name, alias })
    }

    /// `[AS] alias [(column [type], ...)]`
    fn parse_alias(parser: &mut QueryParser) -> Result<Option<String>, ParseError> {
        let alias = NameParser::parse_alias(parser)?;
        if alias.is_some() && parser.take_char('(') {
            loop {
                NameParser::parse(parser)?;
                if !parser.is_char(',') && !parser.is_char(')') {
                    DataTypeParser::parse(parser)?;
                }
                if !parser.take_char(',') {
                    break;
                }
            }
            parser.expect_char(')')?;
        }
        Ok(alias)
    }

    /// Comma separated `FROM` items with the joins hanging off each of them.
    pub fn parse_from(parser: &mut QueryParser) -> Result<(Vec<Collection>, Vec<Join>), ParseError> {
        let mut collections = vec![];
        let mut joins = vec![];
        loop {
            collections.push(Collection::parse(parser)?);
            joins.extend(Join::parse_list(parser)?);
            if !parser.take_char(',') {
                break;
            }
        }
        Ok((collections, joins))
    }

    /// Name the item is visible under in its query.
    pub fn visible_name(&self) -> Option<&str> {
        match self {
            Collection::Table { name, alias } => Some(alias.as_deref().unwrap_or(&name.name)),
            Collection::Query { alias, .. } => alias.as_deref(),
            Collection::Function { function, alias } => Some(alias.as_deref().unwrap_or(function.base_name())),
        }
    }
}
