use crate::parser::{ast::{ComparatorOp, Expr}, ParseError, QueryParser};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub expression: Expr,
    pub ascending: bool,
}

impl OrderBy {
    pub fn parse_single(parser: &mut QueryParser) -> Result<Self, ParseError> {
        let expression = Expr::parse(parser)?;

        let mut ascending = true;
        if parser.take(|c| &c.desc) {
            ascending = false;
        } else if !parser.take(|c| &c.asc) && parser.take(|c| &c.using) {
            match ComparatorOp::check(parser) {
                Some(ComparatorOp::Gt) | Some(ComparatorOp::GtEq) => ascending = false,
                Some(_) => {}
                None => return ParseError::new("Expected operator after USING", parser.position, parser).err(),
            }
        }

        if parser.take(|c| &c.nulls) && !parser.take(|c| &c.first) && !parser.take(|c| &c.last) {
            return ParseError::new("Expected FIRST or LAST", parser.position, parser).err();
        }

        Ok(Self { expression, ascending })
    }

    pub fn parse_list(parser: &mut QueryParser) -> Result<Vec<Self>, ParseError> {
        let mut orders = vec![Self::parse_single(parser)?];
        while parser.take_char(',') {
            orders.push(Self::parse_single(parser)?);
        }
        Ok(orders)
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::{ast::OrderBy, QueryParser};

    #[test]
    pub fn test_order_by_list() {
        let mut parser = QueryParser::new("created_at DESC NULLS LAST, id");
        let orders = OrderBy::parse_list(&mut parser).expect("Failed to parse order by");
        assert_eq!(orders.len(), 2);
        assert!(!orders[0].ascending);
        assert!(orders[1].ascending);
    }

    #[test]
    pub fn test_order_by_invalid_nulls() {
        let mut parser = QueryParser::new("id NULLS");
        match OrderBy::parse_list(&mut parser) {
            Ok(_) => panic!(),
            Err(err) => assert_eq!(err.message, "Expected FIRST or LAST"),
        }
    }
}
