use crate::parser::{
    ast::{Collection, Expr, ExprParser, Identifier, Join, NameParser, OrderBy, Statement},
    ParseError, QueryParser,
};

/// Words that end a `SELECT` list (an empty one included).
const CLAUSE_WORDS: &[&str] = &[
    "FROM", "WHERE", "GROUP", "HAVING", "WINDOW", "ORDER", "LIMIT", "OFFSET", "FETCH", "FOR", "UNION",
    "INTERSECT", "EXCEPT", "INTO", "ON", "RETURNING",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOperator {
    Union,
    Intersect,
    Except,
}

impl SetOperator {
    pub fn check(parser: &mut QueryParser) -> Option<(SetOperator, bool)> {
        let operator = if parser.take(|c| &c.union) {
            SetOperator::Union
        } else if parser.take(|c| &c.intersect) {
            SetOperator::Intersect
        } else if parser.take(|c| &c.except) {
            SetOperator::Except
        } else {
            return None;
        };

        let all = parser.take(|c| &c.all);
        if !all {
            parser.take(|c| &c.distinct);
        }
        Some((operator, all))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetOperation {
    pub operator: SetOperator,
    pub all: bool,
    pub query: SelectQuery,
}

/// `name [(columns)] AS [NOT] [MATERIALIZED] (statement)` from a `WITH` list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cte {
    pub name: String,
    pub columns: Vec<String>,
    pub recursive: bool,
    pub statement: Box<Statement>,
}

impl Cte {
    /// Parses the `WITH` list if there is one.
    pub fn parse_list(parser: &mut QueryParser) -> Result<Vec<Cte>, ParseError> {
        if !parser.take(|c| &c.with) {
            return Ok(vec![]);
        }

        let recursive = parser.take(|c| &c.recursive);
        let mut ctes = vec![];
        loop {
            let name = NameParser::parse(parser)?;
            let columns = match parser.is_char('(') {
                true => NameParser::parse_list(parser)?,
                false => vec![],
            };

            parser.expect(|c| &c.alias, "Expected AS in WITH")?;
            parser.take(|c| &c.not);
            parser.take(|c| &c.materialized);

            parser.expect_char('(')?;
            let statement = Statement::parse_body(parser)?;
            parser.expect_char(')')?;

            ctes.push(Cte { name, columns, recursive, statement: Box::new(statement) });

            if !parser.take_char(',') {
                break;
            }
        }

        Ok(ctes)
    }
}

/// A `SELECT` (or `VALUES`) query block with its set operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectQuery {
    pub ctes: Vec<Cte>,
    pub distinct: bool,
    pub distinct_on: Vec<Expr>,
    pub projection: Vec<Identifier>,
    /// Rows of a `VALUES` body.
    pub values: Vec<Vec<Expr>>,
    pub collections: Vec<Collection>,
    pub joins: Vec<Join>,
    pub criteria: Option<Expr>,
    pub group_by: Vec<Expr>,
    pub having: Option<Expr>,
    /// Expressions held by `WINDOW name AS (...)` definitions.
    pub windows: Vec<Expr>,
    pub order_by: Vec<OrderBy>,
    pub limit: Option<Expr>,
    pub offset: Option<Expr>,
    pub set_operations: Vec<SetOperation>,
}

impl SelectQuery {
    pub fn parse(parser: &mut QueryParser) -> Result<SelectQuery, ParseError> {
        parser.enter()?;
        let result = Cte::parse_list(parser).and_then(|ctes| Self::parse_after_with(parser, ctes));
        parser.leave();
        result
    }

    pub fn parse_after_with(parser: &mut QueryParser, ctes: Vec<Cte>) -> Result<SelectQuery, ParseError> {
        let mut query = Self::parse_body(parser)?;

        while let Some((operator, all)) = SetOperator::check(parser) {
            let right = Self::parse_body(parser)?;
            query.set_operations.push(SetOperation { operator, all, query: right });
        }

        Self::parse_tail(parser, &mut query)?;

        if !ctes.is_empty() {
            query.ctes.splice(0..0, ctes);
        }
        Ok(query)
    }

    fn parse_body(parser: &mut QueryParser) -> Result<SelectQuery, ParseError> {
        if parser.take_char('(') {
            let query = Self::parse(parser)?;
            parser.expect_char(')')?;
            return Ok(query);
        }

        if parser.take(|c| &c.values) {
            return Ok(SelectQuery { values: Self::parse_values_rows(parser)?, ..Default::default() });
        }

        parser.expect(|c| &c.select, "Expected SELECT")?;
        let mut query = SelectQuery::default();

        if parser.take(|c| &c.distinct) {
            query.distinct = true;
            if parser.take(|c| &c.on) {
                parser.expect_char('(')?;
                query.distinct_on = Expr::parse_list(parser)?;
                parser.expect_char(')')?;
            }
        } else {
            parser.take(|c| &c.all);
        }

        if !Self::at_clause_end(parser) {
            query.projection = Identifier::parse_list(parser)?;
        }

        if parser.take(|c| &c.from) {
            let (collections, joins) = Collection::parse_from(parser)?;
            query.collections = collections;
            query.joins = joins;
        }

        if parser.take(|c| &c.r#where) {
            query.criteria = Some(Expr::parse(parser)?);
        }

        if parser.take(|c| &c.group) {
            parser.expect(|c| &c.by, "Expected BY after GROUP")?;
            if !parser.take(|c| &c.all) {
                parser.take(|c| &c.distinct);
            }
            query.group_by = Expr::parse_list(parser)?;
        }

        if parser.take(|c| &c.having) {
            query.having = Some(Expr::parse(parser)?);
        }

        if parser.take(|c| &c.window) {
            loop {
                NameParser::parse(parser)?;
                parser.expect(|c| &c.alias, "Expected AS in WINDOW")?;
                query.windows.extend(ExprParser::parse_window_spec(parser)?);
                if !parser.take_char(',') {
                    break;
                }
            }
        }

        Ok(query)
    }

    fn at_clause_end(parser: &mut QueryParser) -> bool {
        parser.next_non_whitespace();
        parser.eof()
            || parser.current() == ')'
            || parser.current() == ';'
            || CLAUSE_WORDS.contains(&parser.peek_word().as_str())
    }

    /// `(a, b), (c, d)` after `VALUES`.
    fn parse_values_rows(parser: &mut QueryParser) -> Result<Vec<Vec<Expr>>, ParseError> {
        let mut rows = vec![];
        loop {
            parser.expect_char('(')?;
            rows.push(Expr::parse_list(parser)?);
            parser.expect_char(')')?;
            if !parser.take_char(',') {
                break;
            }
        }
        Ok(rows)
    }

    /// `ORDER BY`, `LIMIT`, `OFFSET`, `FETCH` and locking clauses after the last set operand.
    fn parse_tail(parser: &mut QueryParser, query: &mut SelectQuery) -> Result<(), ParseError> {
        if parser.take(|c| &c.order) {
            parser.expect(|c| &c.by, "Expected BY after ORDER")?;
            query.order_by = OrderBy::parse_list(parser)?;
        }

        loop {
            if parser.take(|c| &c.limit) {
                if !parser.take(|c| &c.all) {
                    query.limit = Some(Expr::parse(parser)?);
                }
            } else if parser.take(|c| &c.offset) {
                query.offset = Some(Expr::parse(parser)?);
                if !parser.take_word("ROWS") {
                    parser.take(|c| &c.row);
                }
            } else if parser.take(|c| &c.fetch) {
                if !parser.take(|c| &c.first) {
                    parser.take_word("NEXT");
                }
                if !matches!(parser.peek_word().as_str(), "ROW" | "ROWS") {
                    query.limit = Some(Expr::parse(parser)?);
                }
                if !parser.take_word("ROWS") {
                    parser.take(|c| &c.row);
                }
                if !parser.take(|c| &c.only) {
                    parser.expect(|c| &c.with, "Expected ONLY or WITH TIES")?;
                    if !parser.take_word("TIES") {
                        return ParseError::new("Expected TIES", parser.position, parser).err();
                    }
                }
            } else if parser.take(|c| &c.r#for) {
                Self::skip_locking(parser)?;
            } else {
                return Ok(());
            }
        }
    }

    /// `FOR [NO KEY] UPDATE | [KEY] SHARE [OF t, ...] [NOWAIT | SKIP LOCKED]`
    fn skip_locking(parser: &mut QueryParser) -> Result<(), ParseError> {
        parser.take_word("NO");
        parser.take_word("KEY");
        if !parser.take(|c| &c.update) && !parser.take_word("SHARE") {
            return ParseError::new("Expected UPDATE or SHARE", parser.position, parser).err();
        }
        if parser.take_word("OF") {
            loop {
                NameParser::parse_qualified(parser)?;
                if !parser.take_char(',') {
                    break;
                }
            }
        }
        if !parser.take_word("NOWAIT") && parser.take_word("SKIP") && !parser.take_word("LOCKED") {
            return ParseError::new("Expected LOCKED", parser.position, parser).err();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::{ast::{Collection, SelectQuery, SetOperator}, QueryParser};

    fn parse(text: &str) -> SelectQuery {
        let mut parser = QueryParser::new(text);
        let query = SelectQuery::parse(&mut parser).expect("Failed to parse query");
        parser.next_non_whitespace();
        assert!(parser.eof(), "unparsed tail in {}", text);
        query
    }

    #[test]
    pub fn test_full_select() {
        let query = parse(
            "SELECT DISTINCT o.id, sum(i.price) AS total FROM orders o JOIN items i ON i.order_id = o.id \
             WHERE o.customer_id = $1 GROUP BY o.id HAVING sum(i.price) > $2 ORDER BY total DESC LIMIT $3 OFFSET $4",
        );
        assert!(query.distinct);
        assert_eq!(query.projection.len(), 2);
        assert_eq!(query.collections.len(), 1);
        assert_eq!(query.joins.len(), 1);
        assert!(query.criteria.is_some());
        assert_eq!(query.group_by.len(), 1);
        assert!(query.having.is_some());
        assert_eq!(query.order_by.len(), 1);
        assert!(query.limit.is_some());
        assert!(query.offset.is_some());
    }

    #[test]
    pub fn test_union_with_trailing_limit() {
        let query = parse("SELECT id FROM a WHERE x = $1 UNION ALL (SELECT id FROM b WHERE y = $2) LIMIT 5");
        assert_eq!(query.set_operations.len(), 1);
        assert_eq!(query.set_operations[0].operator, SetOperator::Union);
        assert!(query.set_operations[0].all);
        assert!(query.limit.is_some());
    }

    #[test]
    pub fn test_with_list() {
        let query = parse("WITH recent AS MATERIALIZED (SELECT * FROM orders WHERE created_at > $1) SELECT * FROM recent");
        assert_eq!(query.ctes.len(), 1);
        assert_eq!(query.ctes[0].name, "recent");
    }

    #[test]
    pub fn test_values_body() {
        let query = parse("VALUES ($1, 'a'), ($2, DEFAULT)");
        assert_eq!(query.values.len(), 2);
        assert_eq!(query.values[1].len(), 2);
    }

    #[test]
    pub fn test_subquery_in_from() {
        let query = parse("SELECT t.n FROM (SELECT count(*) AS n FROM orders WHERE status = $1) t");
        match &query.collections[0] {
            Collection::Query { alias, .. } => assert_eq!(alias.as_deref(), Some("t")),
            _ => panic!(),
        }
    }

    #[test]
    pub fn test_fetch_and_locking() {
        let query = parse("SELECT * FROM jobs WHERE queue = $1 ORDER BY id FETCH FIRST $2 ROWS ONLY FOR UPDATE SKIP LOCKED");
        assert!(query.limit.is_some());
    }

    #[test]
    pub fn test_empty_projection() {
        let query = parse("SELECT FROM orders WHERE id = $1");
        assert!(query.projection.is_empty());
    }

    #[test]
    pub fn test_missing_select() {
        let mut parser = QueryParser::new("FROM orders");
        match SelectQuery::parse(&mut parser) {
            Ok(_) => panic!(),
            Err(err) => assert_eq!(err.message, "Expected SELECT"),
        }
    }
}
