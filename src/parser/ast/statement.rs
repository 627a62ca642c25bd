use crate::{
    database::TableName,
    parser::{
        ast::{Collection, Cte, Expr, Identifier, Join, NameParser, SelectQuery},
        ParseError, QueryParser,
    },
};

/// `col = value` or `(a, b) = (x, y)` in `UPDATE ... SET` / `DO UPDATE SET`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub columns: Vec<String>,
    pub value: Expr,
}

impl Assignment {
    pub fn parse_list(parser: &mut QueryParser) -> Result<Vec<Assignment>, ParseError> {
        let mut assignments = vec![];
        loop {
            let columns = match parser.is_char('(') {
                true => NameParser::parse_list(parser)?,
                // `SET t.col = ...` is rejected by PostgreSQL but `col.field` is not; keep the first part
                false => NameParser::parse_qualified(parser)?.into_iter().take(1).collect(),
            };
            if parser.take_char('[') {
                Expr::parse(parser)?;
                parser.expect_char(']')?;
            }
            parser.expect(|c| &c.equal, "Expected '=' in SET")?;
            let value = Expr::parse(parser)?;
            assignments.push(Assignment { columns, value });

            if !parser.take_char(',') {
                break;
            }
        }
        Ok(assignments)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictAction {
    Nothing,
    Update { assignments: Vec<Assignment>, criteria: Option<Expr> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnConflict {
    /// Conflict target index expressions; empty for `ON CONSTRAINT name` or no target.
    pub target: Vec<Expr>,
    pub target_criteria: Option<Expr>,
    pub action: ConflictAction,
}

impl OnConflict {
    fn parse(parser: &mut QueryParser) -> Result<OnConflict, ParseError> {
        parser.expect(|c| &c.conflict, "Expected CONFLICT")?;

        let mut target = vec![];
        let mut target_criteria = None;
        if parser.take_char('(') {
            target = Expr::parse_list(parser)?;
            parser.expect_char(')')?;
            if parser.take(|c| &c.r#where) {
                target_criteria = Some(Expr::parse(parser)?);
            }
        } else if parser.take(|c| &c.on) {
            parser.expect(|c| &c.constraint, "Expected CONSTRAINT")?;
            NameParser::parse(parser)?;
        }

        parser.expect(|c| &c.r#do, "Expected DO")?;
        if parser.take(|c| &c.nothing) {
            return Ok(OnConflict { target, target_criteria, action: ConflictAction::Nothing });
        }

        parser.expect(|c| &c.update, "Expected NOTHING or UPDATE")?;
        parser.expect(|c| &c.set, "Expected SET")?;
        let assignments = Assignment::parse_list(parser)?;
        let criteria = match parser.take(|c| &c.r#where) {
            true => Some(Expr::parse(parser)?),
            false => None,
        };

        Ok(OnConflict { target, target_criteria, action: ConflictAction::Update { assignments, criteria } })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertStatement {
    pub ctes: Vec<Cte>,
    pub table: TableName,
    pub alias: Option<String>,
    pub columns: Vec<String>,
    /// `VALUES` rows or a query; `None` for `DEFAULT VALUES`.
    pub source: Option<Box<SelectQuery>>,
    pub on_conflict: Option<OnConflict>,
    pub returning: Vec<Identifier>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateStatement {
    pub ctes: Vec<Cte>,
    pub table: TableName,
    pub alias: Option<String>,
    pub assignments: Vec<Assignment>,
    pub collections: Vec<Collection>,
    pub joins: Vec<Join>,
    pub criteria: Option<Expr>,
    pub returning: Vec<Identifier>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteStatement {
    pub ctes: Vec<Cte>,
    pub table: TableName,
    pub alias: Option<String>,
    /// `USING` items.
    pub collections: Vec<Collection>,
    pub joins: Vec<Join>,
    pub criteria: Option<Expr>,
    pub returning: Vec<Identifier>,
}

/// One parsed SQL statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Select(SelectQuery),
    Insert(InsertStatement),
    Update(UpdateStatement),
    Delete(DeleteStatement),
}

impl Statement {
    /// Whole input: optional `EXPLAIN` prefix, one statement, optional `;`.
    pub fn parse(parser: &mut QueryParser) -> Result<Statement, ParseError> {
        Self::skip_explain(parser)?;
        let statement = Self::parse_body(parser)?;

        parser.take_char(';');
        parser.next_non_whitespace();
        if !parser.eof() {
            return ParseError::new("Unexpected input after statement", parser.position, parser).err();
        }

        Ok(statement)
    }

    /// One statement, also used for `WITH` list bodies.
    pub fn parse_body(parser: &mut QueryParser) -> Result<Statement, ParseError> {
        parser.enter()?;
        let result = Cte::parse_list(parser).and_then(|ctes| match parser.peek_word().as_str() {
            "INSERT" => Self::parse_insert(parser, ctes).map(Statement::Insert),
            "UPDATE" => Self::parse_update(parser, ctes).map(Statement::Update),
            "DELETE" => Self::parse_delete(parser, ctes).map(Statement::Delete),
            _ => SelectQuery::parse_after_with(parser, ctes).map(Statement::Select),
        });
        parser.leave();
        result
    }

    /// `EXPLAIN [ANALYZE] [VERBOSE]` or `EXPLAIN (option, ...)`.
    fn skip_explain(parser: &mut QueryParser) -> Result<(), ParseError> {
        if !parser.take(|c| &c.explain) {
            return Ok(());
        }

        if parser.take_char('(') {
            let mut depth = 1;
            while depth > 0 {
                if parser.eof() {
                    return ParseError::new("Unterminated EXPLAIN options", parser.position, parser).err();
                }
                match parser.current() {
                    '(' => depth += 1,
                    ')' => depth -= 1,
                    _ => {}
                }
                parser.next();
            }
            return Ok(());
        }

        parser.take(|c| &c.analyze);
        parser.take(|c| &c.verbose);
        Ok(())
    }

    fn parse_target(parser: &mut QueryParser) -> Result<TableName, ParseError> {
        parser.take(|c| &c.only);
        let pivot = parser.position;
        let parts = NameParser::parse_qualified(parser)?;
        TableName::from_parts(&parts).ok_or_else(|| ParseError::new("Invalid table name", pivot, parser))
    }

    fn parse_returning(parser: &mut QueryParser) -> Result<Vec<Identifier>, ParseError> {
        match parser.take(|c| &c.returning) {
            true => Identifier::parse_list(parser),
            false => Ok(vec![]),
        }
    }

    fn parse_insert(parser: &mut QueryParser, ctes: Vec<Cte>) -> Result<InsertStatement, ParseError> {
        parser.expect(|c| &c.insert, "Expected INSERT")?;
        parser.expect(|c| &c.into, "Expected INTO")?;
        let table = Self::parse_target(parser)?;

        let alias = match parser.take(|c| &c.alias) {
            true => Some(NameParser::parse(parser)?),
            false => None,
        };

        let mut columns = vec![];
        if parser.is_char('(') && !Self::parenthesised_query_follows(parser) {
            columns = NameParser::parse_list(parser)?;
        }

        if parser.take_word("OVERRIDING") {
            parser.take_word("SYSTEM");
            parser.take_word("USER");
            parser.expect(|c| &c.values, "Expected VALUE")?;
        }

        let source = match parser.take(|c| &c.default) {
            true => {
                parser.expect(|c| &c.values, "Expected VALUES")?;
                None
            }
            false => Some(Box::new(SelectQuery::parse(parser)?)),
        };

        let on_conflict = match parser.take(|c| &c.on) {
            true => Some(OnConflict::parse(parser)?),
            false => None,
        };

        let returning = Self::parse_returning(parser)?;

        Ok(InsertStatement { ctes, table, alias, columns, source, on_conflict, returning })
    }

    /// `INSERT INTO t (SELECT ...)` as opposed to a column list.
    fn parenthesised_query_follows(parser: &mut QueryParser) -> bool {
        let position = parser.position;
        parser.next();
        let query = matches!(parser.peek_word().as_str(), "SELECT" | "WITH" | "VALUES");
        parser.position = position;
        query
    }

    fn parse_update(parser: &mut QueryParser, ctes: Vec<Cte>) -> Result<UpdateStatement, ParseError> {
        parser.expect(|c| &c.update, "Expected UPDATE")?;
        let table = Self::parse_target(parser)?;
        let alias = NameParser::parse_alias(parser)?;

        parser.expect(|c| &c.set, "Expected SET")?;
        let assignments = Assignment::parse_list(parser)?;

        let (collections, joins) = match parser.take(|c| &c.from) {
            true => Collection::parse_from(parser)?,
            false => (vec![], vec![]),
        };

        let criteria = match parser.take(|c| &c.r#where) {
            true => Some(Expr::parse(parser)?),
            false => None,
        };

        let returning = Self::parse_returning(parser)?;

        Ok(UpdateStatement { ctes, table, alias, assignments, collections, joins, criteria, returning })
    }

    fn parse_delete(parser: &mut QueryParser, ctes: Vec<Cte>) -> Result<DeleteStatement, ParseError> {
        parser.expect(|c| &c.delete, "Expected DELETE")?;
        parser.expect(|c| &c.from, "Expected FROM")?;
        let table = Self::parse_target(parser)?;
        let alias = NameParser::parse_alias(parser)?;

        let (collections, joins) = match parser.take(|c| &c.using) {
            true => Collection::parse_from(parser)?,
            false => (vec![], vec![]),
        };

        let criteria = match parser.take(|c| &c.r#where) {
            true => Some(Expr::parse(parser)?),
            false => None,
        };

        let returning = Self::parse_returning(parser)?;

        Ok(DeleteStatement { ctes, table, alias, collections, joins, criteria, returning })
    }
}

impl TryFrom<&str> for Statement {
    type Error = ParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let mut parser = QueryParser::new(value);
        Statement::parse(&mut parser)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        database::TableName,
        parser::ast::{ConflictAction, Statement},
    };

    #[test]
    pub fn test_select_with_explain_and_semicolon() {
        let statement = Statement::try_from("EXPLAIN (ANALYZE, FORMAT JSON) SELECT * FROM orders WHERE id = $1;")
            .expect("Failed to parse statement");
        match statement {
            Statement::Select(query) => assert!(query.criteria.is_some()),
            _ => panic!(),
        }
    }

    #[test]
    pub fn test_insert_values_on_conflict() {
        let statement = Statement::try_from(
            "INSERT INTO public.users (id, email) VALUES ($1, $2) \
             ON CONFLICT (id) DO UPDATE SET email = excluded.email WHERE users.active RETURNING id",
        )
        .expect("Failed to parse statement");

        match statement {
            Statement::Insert(insert) => {
                assert_eq!(insert.table, TableName::qualified("public", "users"));
                assert_eq!(insert.columns, vec!["id", "email"]);
                assert_eq!(insert.source.map(|source| source.values.len()), Some(1));
                match insert.on_conflict.map(|conflict| conflict.action) {
                    Some(ConflictAction::Update { assignments, criteria }) => {
                        assert_eq!(assignments.len(), 1);
                        assert!(criteria.is_some());
                    }
                    _ => panic!(),
                }
                assert_eq!(insert.returning.len(), 1);
            }
            _ => panic!(),
        }
    }

    #[test]
    pub fn test_insert_select_and_default_values() {
        match Statement::try_from("INSERT INTO archive SELECT * FROM orders WHERE created_at < $1") {
            Ok(Statement::Insert(insert)) => {
                assert!(insert.columns.is_empty());
                assert!(insert.source.is_some());
            }
            _ => panic!(),
        }

        match Statement::try_from("INSERT INTO counters DEFAULT VALUES") {
            Ok(Statement::Insert(insert)) => assert!(insert.source.is_none()),
            _ => panic!(),
        }
    }

    #[test]
    pub fn test_update() {
        let statement = Statement::try_from(
            "UPDATE orders o SET status = $1, (total, updated_at) = ($2, now()) FROM customers c \
             WHERE c.id = o.customer_id AND c.email = $3",
        )
        .expect("Failed to parse statement");

        match statement {
            Statement::Update(update) => {
                assert_eq!(update.alias.as_deref(), Some("o"));
                assert_eq!(update.assignments.len(), 2);
                assert_eq!(update.assignments[1].columns, vec!["total", "updated_at"]);
                assert_eq!(update.collections.len(), 1);
                assert!(update.criteria.is_some());
            }
            _ => panic!(),
        }
    }

    #[test]
    pub fn test_delete_using() {
        match Statement::try_from("DELETE FROM sessions s USING users u WHERE u.id = s.user_id AND u.email = $1 RETURNING s.id") {
            Ok(Statement::Delete(delete)) => {
                assert_eq!(delete.alias.as_deref(), Some("s"));
                assert_eq!(delete.collections.len(), 1);
                assert_eq!(delete.returning.len(), 1);
            }
            _ => panic!(),
        }
    }

    #[test]
    pub fn test_data_modifying_cte() {
        match Statement::try_from("WITH moved AS (DELETE FROM queue WHERE id = $1 RETURNING *) INSERT INTO done SELECT * FROM moved") {
            Ok(Statement::Insert(insert)) => {
                assert_eq!(insert.ctes.len(), 1);
                match insert.ctes[0].statement.as_ref() {
                    Statement::Delete(_) => {}
                    _ => panic!(),
                }
            }
            _ => panic!(),
        }
    }

    #[test]
    pub fn test_trailing_garbage() {
        match Statement::try_from("SELECT 1 FROM t WHERE a = $1 )") {
            Ok(_) => panic!(),
            Err(err) => assert_eq!(err.message, "Unexpected input after statement"),
        }
    }

    #[test]
    pub fn test_error_reports_position() {
        match Statement::try_from("SELECT * FROM WHERE id = $1") {
            Ok(_) => panic!(),
            Err(err) => assert_eq!(err.start, 14),
        }
    }
}
