use crate::parser::{ast::{Collection, Expr, NameParser}, ParseError, QueryParser};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

impl JoinType {
    /// Consumes the join keywords up to and including `JOIN`; `None` when no join follows.
    pub fn parse(parser: &mut QueryParser) -> Result<Option<JoinType>, ParseError> {
        let pivot = parser.position;
        let natural = parser.take(|c| &c.natural);

        let join_type = if parser.take(|c| &c.inner) {
            JoinType::Inner
        } else if parser.take(|c| &c.left) {
            parser.take(|c| &c.outer);
            JoinType::Left
        } else if parser.take(|c| &c.right) {
            parser.take(|c| &c.outer);
            JoinType::Right
        } else if parser.take(|c| &c.full) {
            parser.take(|c| &c.outer);
            JoinType::Full
        } else if parser.take(|c| &c.cross) {
            JoinType::Cross
        } else if parser.is(|c| &c.join) {
            JoinType::Inner
        } else if natural {
            return ParseError::new("Invalid Join type", pivot, parser).err();
        } else {
            return Ok(None);
        };

        parser.expect(|c| &c.join, "Invalid join statement")?;
        Ok(Some(join_type))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinConstraint {
    On(Expr),
    Using(Vec<String>),
    None,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    pub join_type: JoinType,
    pub collection: Collection,
    pub constraint: JoinConstraint,
}

impl Join {
    pub fn parse_list(parser: &mut QueryParser) -> Result<Vec<Join>, ParseError> {
        let mut joins: Vec<Join> = vec![];
        while let Some(join_type) = JoinType::parse(parser)? {
            let collection = Collection::parse(parser)?;

            let constraint = if parser.take(|c| &c.on) {
                JoinConstraint::On(Expr::parse(parser)?)
            } else if parser.take(|c| &c.using) {
                JoinConstraint::Using(NameParser::parse_list(parser)?)
            } else {
                JoinConstraint::None
            };

            joins.push(Join { join_type, collection, constraint });
        }

        Ok(joins)
    }
}
