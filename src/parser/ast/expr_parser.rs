use crate::{
    database::SqlType,
    parser::{
        ast::{
            ArithmeticOp, CaseBranch, Column, ComparatorOp, DataTypeParser, Expr, Function, Literal, NameParser,
            NumberParser, OperatorLevel, OrderBy, ParamParser, Quantifier, SelectQuery, StringParser, UnaryOp,
        },
        ParseError, QueryParser,
    },
};

const TYPED_LITERALS: &[&str] = &["DATE", "TIME", "TIMESTAMP", "TIMESTAMPTZ", "INTERVAL", "UUID", "JSON", "JSONB"];
const TRIM_SIDES: &[&str] = &["BOTH", "LEADING", "TRAILING"];

/// Recursive descent over PostgreSQL's operator precedence:
/// `OR` < `AND` < `NOT` < predicates < other operators < `+ -` < `* / %` < `^` < unary < postfix.
pub struct ExprParser;

impl ExprParser {
    pub fn parse(parser: &mut QueryParser) -> Result<Expr, ParseError> {
        parser.enter()?;
        let result = Self::parse_or(parser);
        parser.leave();
        result
    }

    /// True when a query (rather than an expression) starts at the cursor.
    pub fn is_query_start(parser: &mut QueryParser) -> bool {
        matches!(parser.peek_word().as_str(), "SELECT" | "WITH" | "VALUES")
    }

    fn parse_or(parser: &mut QueryParser) -> Result<Expr, ParseError> {
        let mut items = vec![Self::parse_and(parser)?];
        while parser.take(|c| &c.or) {
            items.push(Self::parse_and(parser)?);
        }
        Ok(match items.len() {
            1 => items.remove(0),
            _ => Expr::Or(items),
        })
    }

    fn parse_and(parser: &mut QueryParser) -> Result<Expr, ParseError> {
        let mut items = vec![Self::parse_not(parser)?];
        while parser.take(|c| &c.and) {
            items.push(Self::parse_not(parser)?);
        }
        Ok(match items.len() {
            1 => items.remove(0),
            _ => Expr::And(items),
        })
    }

    fn parse_not(parser: &mut QueryParser) -> Result<Expr, ParseError> {
        if parser.take(|c| &c.not) {
            parser.enter()?;
            let inner = Self::parse_not(parser);
            parser.leave();
            return Ok(Expr::Not(Box::new(inner?)));
        }
        Self::parse_predicate(parser)
    }

    fn parse_predicate(parser: &mut QueryParser) -> Result<Expr, ParseError> {
        let mut left = Self::parse_binary(parser, OperatorLevel::Other)?;

        loop {
            if let Some(op) = ComparatorOp::check(parser) {
                left = Self::parse_comparison(parser, left, op)?;
                continue;
            }

            if parser.take(|c| &c.is) {
                left = Self::parse_is(parser, left)?;
                continue;
            }

            let pivot = parser.position;
            let negated = parser.peek_word() == "NOT"
                && matches!(parser.peek_second_word().as_str(), "IN" | "LIKE" | "ILIKE" | "BETWEEN" | "SIMILAR");
            if negated {
                parser.take(|c| &c.not);
            }

            if parser.take(|c| &c.r#in) {
                left = Self::parse_in(parser, left, negated)?;
                continue;
            }

            if parser.take(|c| &c.between) {
                parser.take(|c| &c.symmetric);
                let low = Self::parse_binary(parser, OperatorLevel::Other)?;
                parser.expect(|c| &c.and, "Expected AND in BETWEEN")?;
                let high = Self::parse_binary(parser, OperatorLevel::Other)?;
                left = Expr::Between { expr: Box::new(left), low: Box::new(low), high: Box::new(high), negated };
                continue;
            }

            let like = parser.take(|c| &c.like);
            let ilike = !like && parser.take(|c| &c.ilike);
            let similar = !like && !ilike && parser.take(|c| &c.similar);
            if similar {
                parser.expect(|c| &c.to, "Expected TO after SIMILAR")?;
            }
            if like || ilike || similar {
                let pattern = Self::parse_binary(parser, OperatorLevel::Other)?;
                let escape = match parser.take(|c| &c.escape) {
                    true => Some(Box::new(Self::parse_binary(parser, OperatorLevel::Other)?)),
                    false => None,
                };
                left = Expr::Like {
                    expr: Box::new(left),
                    pattern: Box::new(pattern),
                    negated,
                    case_insensitive: ilike,
                    escape,
                };
                continue;
            }

            if negated {
                return ParseError::new("Invalid NOT predicate", pivot, parser).err();
            }

            return Ok(left);
        }
    }

    fn parse_comparison(parser: &mut QueryParser, left: Expr, op: ComparatorOp) -> Result<Expr, ParseError> {
        let quantifier = if parser.take(|c| &c.any) || parser.take(|c| &c.some) {
            Some(Quantifier::Any)
        } else if parser.take(|c| &c.all) {
            Some(Quantifier::All)
        } else {
            None
        };

        match quantifier {
            Some(quantifier) => {
                parser.expect_char('(')?;
                let right = match Self::is_query_start(parser) {
                    true => Expr::Subquery(Box::new(SelectQuery::parse(parser)?)),
                    false => Self::parse(parser)?,
                };
                parser.expect_char(')')?;
                Ok(Expr::Quantified { left: Box::new(left), op, quantifier, right: Box::new(right) })
            }
            None => {
                let right = Self::parse_binary(parser, OperatorLevel::Other)?;
                Ok(Expr::Compare { left: Box::new(left), op, right: Box::new(right) })
            }
        }
    }

    fn parse_is(parser: &mut QueryParser, left: Expr) -> Result<Expr, ParseError> {
        let negated = parser.take(|c| &c.not);
        let expr = Box::new(left);

        if parser.take(|c| &c.null) {
            return Ok(Expr::IsNull { expr, negated });
        }
        if parser.take(|c| &c.b_true) {
            return Ok(Expr::IsBool { expr, value: Some(true), negated });
        }
        if parser.take(|c| &c.b_false) {
            return Ok(Expr::IsBool { expr, value: Some(false), negated });
        }
        if parser.take(|c| &c.unknown) {
            return Ok(Expr::IsBool { expr, value: None, negated });
        }
        if parser.take(|c| &c.distinct) {
            parser.expect(|c| &c.from, "Expected FROM after IS DISTINCT")?;
            let right = Self::parse_binary(parser, OperatorLevel::Other)?;
            let op = match negated {
                true => ComparatorOp::IsNotDistinctFrom,
                false => ComparatorOp::IsDistinctFrom,
            };
            return Ok(Expr::Compare { left: expr, op, right: Box::new(right) });
        }

        ParseError::new("Invalid IS predicate", parser.position, parser).err()
    }

    fn parse_in(parser: &mut QueryParser, left: Expr, negated: bool) -> Result<Expr, ParseError> {
        parser.expect_char('(')?;

        if Self::is_query_start(parser) {
            let query = SelectQuery::parse(parser)?;
            parser.expect_char(')')?;
            return Ok(Expr::InSubquery { expr: Box::new(left), query: Box::new(query), negated });
        }

        let list = Expr::parse_list(parser)?;
        parser.expect_char(')')?;
        Ok(Expr::InList { expr: Box::new(left), list, negated })
    }

    fn parse_binary(parser: &mut QueryParser, level: OperatorLevel) -> Result<Expr, ParseError> {
        let mut left = Self::parse_operand(parser, level)?;
        while let Some(op) = ArithmeticOp::check(parser, level) {
            let right = Self::parse_operand(parser, level)?;
            left = Expr::Arithmetic { left: Box::new(left), op, right: Box::new(right) };
        }
        Ok(left)
    }

    fn parse_operand(parser: &mut QueryParser, level: OperatorLevel) -> Result<Expr, ParseError> {
        match level.tighter() {
            Some(tighter) => Self::parse_binary(parser, tighter),
            None => Self::parse_unary(parser),
        }
    }

    fn parse_unary(parser: &mut QueryParser) -> Result<Expr, ParseError> {
        let negate = parser.take(|c| &c.minus);
        if !negate && !parser.take(|c| &c.plus) {
            return Self::parse_postfix(parser);
        }

        parser.enter()?;
        let inner = Self::parse_unary(parser);
        parser.leave();

        let inner = inner?;
        if !negate {
            return Ok(inner);
        }
        Ok(match inner {
            Expr::Literal(Literal::Int(value)) => Expr::Literal(Literal::Int(-value)),
            Expr::Literal(Literal::Float(value)) => Expr::Literal(Literal::Float(-value)),
            other => Expr::Unary { op: UnaryOp::Neg, expr: Box::new(other) },
        })
    }

    fn parse_postfix(parser: &mut QueryParser) -> Result<Expr, ParseError> {
        let mut expr = Self::parse_primary(parser)?;

        loop {
            if parser.take(|c| &c.double_colon) {
                let data_type = DataTypeParser::parse(parser)?;
                expr = Expr::Cast { expr: Box::new(expr), data_type };
            } else if parser.take_char('[') {
                let index = Self::parse(parser)?;
                let upper = match parser.take_char(':') {
                    true => Some(Box::new(Self::parse(parser)?)),
                    false => None,
                };
                parser.expect_char(']')?;
                expr = Expr::Subscript { expr: Box::new(expr), index: Box::new(index), upper };
            } else if parser.peek_word() == "AT" && parser.peek_second_word() == "TIME" {
                parser.take(|c| &c.at);
                parser.take(|c| &c.time);
                parser.expect(|c| &c.zone, "Expected ZONE")?;
                let zone = Self::parse_unary(parser)?;
                expr = Expr::AtTimeZone { expr: Box::new(expr), zone: Box::new(zone) };
            } else if parser.take(|c| &c.collate) {
                let collation = NameParser::parse_qualified(parser)?.join(".");
                expr = Expr::Collate { expr: Box::new(expr), collation };
            } else {
                return Ok(expr);
            }
        }
    }

    fn parse_primary(parser: &mut QueryParser) -> Result<Expr, ParseError> {
        parser.next_non_whitespace();
        let pivot = parser.position;

        if parser.eof() {
            return ParseError::new("Unexpected end of statement", pivot, parser).err();
        }

        if ParamParser::is_param(parser) {
            return ParamParser::parse(parser).map(Expr::Param);
        }
        if StringParser::is_string(parser) {
            return StringParser::parse(parser).map(|value| Expr::Literal(Literal::String(value)));
        }
        if NumberParser::is_number(parser) {
            return NumberParser::parse(parser).map(Expr::Literal);
        }

        match parser.current() {
            '(' => return Self::parse_parenthesised(parser),
            '[' => {
                parser.next();
                return Self::parse_array_items(parser);
            }
            '*' => {
                parser.next();
                return Ok(Expr::WildCard);
            }
            _ => {}
        }

        if parser.take(|c| &c.null) {
            return Ok(Expr::Literal(Literal::Null));
        }
        if parser.take(|c| &c.b_true) {
            return Ok(Expr::Literal(Literal::Bool(true)));
        }
        if parser.take(|c| &c.b_false) {
            return Ok(Expr::Literal(Literal::Bool(false)));
        }
        if parser.take(|c| &c.default) {
            return Ok(Expr::Default);
        }
        if parser.take(|c| &c.case) {
            return Self::parse_case(parser);
        }
        if parser.take(|c| &c.cast) {
            parser.expect_char('(')?;
            let expr = Self::parse(parser)?;
            parser.expect(|c| &c.alias, "Expected AS in CAST")?;
            let data_type = DataTypeParser::parse(parser)?;
            parser.expect_char(')')?;
            return Ok(Expr::Cast { expr: Box::new(expr), data_type });
        }
        if parser.take(|c| &c.exists) {
            parser.expect_char('(')?;
            let query = SelectQuery::parse(parser)?;
            parser.expect_char(')')?;
            return Ok(Expr::Exists(Box::new(query)));
        }
        if parser.take(|c| &c.array) {
            if parser.take_char('[') {
                return Self::parse_array_items(parser);
            }
            parser.expect_char('(')?;
            let query = SelectQuery::parse(parser)?;
            parser.expect_char(')')?;
            return Ok(Expr::Subquery(Box::new(query)));
        }
        if parser.is(|c| &c.row) && parser.peek_second_word().is_empty() {
            parser.take(|c| &c.row);
            parser.expect_char('(')?;
            let items = match parser.is_char(')') {
                true => vec![],
                false => Expr::parse_list(parser)?,
            };
            parser.expect_char(')')?;
            return Ok(Expr::Tuple(items));
        }
        if parser.take(|c| &c.extract) {
            parser.expect_char('(')?;
            let field = match StringParser::is_string(parser) {
                true => StringParser::parse(parser)?,
                false => NameParser::parse(parser)?,
            };
            parser.expect(|c| &c.from, "Expected FROM in EXTRACT")?;
            let source = Self::parse(parser)?;
            parser.expect_char(')')?;
            return Ok(Expr::Function(Function::new("extract", vec![Expr::Literal(Literal::String(field)), source])));
        }

        if let Some(literal) = Self::parse_typed_literal(parser)? {
            return Ok(Expr::Literal(literal));
        }

        if NameParser::is_name_start(parser) {
            return Self::parse_name_expr(parser);
        }

        ParseError::new("Invalid expression", pivot, parser).err()
    }

    /// `DATE '2024-01-01'`, `INTERVAL '1 day'`, ...
    fn parse_typed_literal(parser: &mut QueryParser) -> Result<Option<Literal>, ParseError> {
        let word = parser.peek_word();
        if !TYPED_LITERALS.contains(&word.as_str()) {
            return Ok(None);
        }

        let mut ahead = word.chars().count();
        while parser.peek(ahead).is_whitespace() {
            ahead += 1;
        }
        if parser.peek(ahead) != '\'' {
            return Ok(None);
        }

        parser.take_word(&word);
        parser.next_non_whitespace();
        let value = StringParser::parse(parser)?;
        Ok(Some(Literal::Typed { ty: SqlType::from_name(&word), value }))
    }

    fn parse_parenthesised(parser: &mut QueryParser) -> Result<Expr, ParseError> {
        parser.expect_char('(')?;

        if Self::is_query_start(parser) {
            let query = SelectQuery::parse(parser)?;
            parser.expect_char(')')?;
            return Ok(Expr::Subquery(Box::new(query)));
        }

        let mut items = Expr::parse_list(parser)?;
        parser.expect_char(')')?;

        Ok(match items.len() {
            1 => items.remove(0),
            _ => Expr::Tuple(items),
        })
    }

    /// Items after `ARRAY[` (or a nested `[`) up to the closing bracket.
    fn parse_array_items(parser: &mut QueryParser) -> Result<Expr, ParseError> {
        let items = match parser.is_char(']') {
            true => vec![],
            false => Expr::parse_list(parser)?,
        };
        parser.expect_char(']')?;
        Ok(Expr::Array(items))
    }

    fn parse_case(parser: &mut QueryParser) -> Result<Expr, ParseError> {
        let operand = match parser.is(|c| &c.when) {
            true => None,
            false => Some(Box::new(Self::parse(parser)?)),
        };

        let mut branches = vec![];
        while parser.take(|c| &c.when) {
            let condition = Self::parse(parser)?;
            parser.expect(|c| &c.then, "Expected THEN")?;
            let result = Self::parse(parser)?;
            branches.push(CaseBranch { condition, result });
        }

        if branches.is_empty() {
            return ParseError::new("Expected WHEN", parser.position, parser).err();
        }

        let else_result = match parser.take(|c| &c.r#else) {
            true => Some(Box::new(Self::parse(parser)?)),
            false => None,
        };
        parser.expect(|c| &c.end, "Expected END")?;

        Ok(Expr::Case { operand, branches, else_result })
    }

    /// Column reference, `alias.*` or function call.
    fn parse_name_expr(parser: &mut QueryParser) -> Result<Expr, ParseError> {
        let pivot = parser.position;
        let parts = NameParser::parse_qualified(parser)?;

        if parser.current() == '.' && parser.peek(1) == '*' {
            parser.jump(2);
            return Ok(Expr::WildCardWithCollection(parts.join(".")));
        }

        if parser.is_char('(') {
            let function = Self::parse_function(parser, &parts.join("."))?;
            return Ok(Expr::Function(function));
        }

        Column::from_parts(parts)
            .map(Expr::Column)
            .ok_or_else(|| ParseError::new("Invalid column", pivot, parser))
    }

    /// Argument list and trailing `FILTER` / `OVER` of a call to `name`.
    pub fn parse_function(parser: &mut QueryParser, name: &str) -> Result<Function, ParseError> {
        parser.expect_char('(')?;
        let mut function = Function::new(name, vec![]);
        let base_name = function.base_name().to_string();

        if !parser.take_char(')') {
            if parser.take(|c| &c.distinct) {
                function.distinct = true;
            } else {
                parser.take(|c| &c.all);
            }

            if base_name == "trim" {
                let side = parser.peek_word();
                if TRIM_SIDES.contains(&side.as_str()) {
                    parser.take_word(&side);
                }
                if parser.take(|c| &c.from) {
                    function.args.push(Self::parse(parser)?);
                    parser.expect_char(')')?;
                    return Self::parse_function_tail(parser, function);
                }
            }

            loop {
                let arg = match base_name == "position" {
                    true => Self::parse_binary(parser, OperatorLevel::Other)?,
                    false => Self::parse(parser)?,
                };
                function.args.push(arg);

                // substring(x FROM 1 FOR 2), position(a IN b), trim(' ' FROM x)
                if parser.take_char(',')
                    || parser.take(|c| &c.from)
                    || parser.take(|c| &c.r#for)
                    || (base_name == "position" && parser.take(|c| &c.r#in))
                {
                    continue;
                }
                break;
            }

            if parser.take(|c| &c.order) {
                parser.expect(|c| &c.by, "Expected BY")?;
                let items = OrderBy::parse_list(parser)?;
                function.window.extend(items.into_iter().map(|item| item.expression));
            }
            parser.expect_char(')')?;
        }

        Self::parse_function_tail(parser, function)
    }

    fn parse_function_tail(parser: &mut QueryParser, mut function: Function) -> Result<Function, ParseError> {
        if parser.take_word("WITHIN") {
            parser.expect(|c| &c.group, "Expected GROUP")?;
            parser.expect_char('(')?;
            parser.expect(|c| &c.order, "Expected ORDER")?;
            parser.expect(|c| &c.by, "Expected BY")?;
            let items = OrderBy::parse_list(parser)?;
            function.window.extend(items.into_iter().map(|item| item.expression));
            parser.expect_char(')')?;
        }

        if parser.take(|c| &c.filter) {
            parser.expect_char('(')?;
            parser.expect(|c| &c.r#where, "Expected WHERE in FILTER")?;
            function.filter = Some(Box::new(Self::parse(parser)?));
            parser.expect_char(')')?;
        }

        if parser.take(|c| &c.over) {
            match parser.is_char('(') {
                true => function.window.extend(Self::parse_window_spec(parser)?),
                false => {
                    NameParser::parse(parser)?;
                }
            }
        }

        Ok(function)
    }

    /// `( [name] [PARTITION BY ...] [ORDER BY ...] [frame] )`, returning the expressions it holds.
    pub fn parse_window_spec(parser: &mut QueryParser) -> Result<Vec<Expr>, ParseError> {
        parser.expect_char('(')?;
        let mut exprs = vec![];

        let word = parser.peek_word();
        if !word.is_empty() && !matches!(word.as_str(), "PARTITION" | "ORDER" | "ROWS" | "RANGE" | "GROUPS") {
            NameParser::parse(parser)?;
        }

        if parser.take(|c| &c.partition) {
            parser.expect(|c| &c.by, "Expected BY")?;
            exprs.extend(Expr::parse_list(parser)?);
        }

        if parser.take(|c| &c.order) {
            parser.expect(|c| &c.by, "Expected BY")?;
            exprs.extend(OrderBy::parse_list(parser)?.into_iter().map(|item| item.expression));
        }

        if parser.take_word("ROWS") || parser.take_word("RANGE") || parser.take_word("GROUPS") {
            let between = parser.take(|c| &c.between);
            Self::parse_frame_bound(parser, &mut exprs)?;
            if between {
                parser.expect(|c| &c.and, "Expected AND in frame")?;
                Self::parse_frame_bound(parser, &mut exprs)?;
            }
            if parser.take_word("EXCLUDE") {
                while !parser.eof() && !parser.is_char(')') {
                    let word = parser.peek_word();
                    if word.is_empty() || !parser.take_word(&word) {
                        return ParseError::new("Invalid frame exclusion", parser.position, parser).err();
                    }
                }
            }
        }

        parser.expect_char(')')?;
        Ok(exprs)
    }

    fn parse_frame_bound(parser: &mut QueryParser, exprs: &mut Vec<Expr>) -> Result<(), ParseError> {
        if parser.take_word("UNBOUNDED") {
            parser.take_word("PRECEDING");
            parser.take_word("FOLLOWING");
            return Ok(());
        }
        if parser.take_word("CURRENT") {
            parser.expect(|c| &c.row, "Expected ROW")?;
            return Ok(());
        }

        exprs.push(Self::parse_binary(parser, OperatorLevel::Other)?);
        if !parser.take_word("PRECEDING") && !parser.take_word("FOLLOWING") {
            return ParseError::new("Expected PRECEDING or FOLLOWING", parser.position, parser).err();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        database::SqlType,
        parser::{
            ast::{ArithmeticOp, Column, ComparatorOp, Expr, Literal, Param, Quantifier, Statement},
            QueryParser,
        },
    };

    fn parse(text: &str) -> Expr {
        let mut parser = QueryParser::new(text);
        let expr = Expr::parse(&mut parser).expect("Failed to parse expression");
        parser.next_non_whitespace();
        assert!(parser.eof(), "unparsed tail in {}", text);
        expr
    }

    fn column(name: &str) -> Expr {
        Expr::Column(Column::Name { name: name.to_string() })
    }

    #[test]
    pub fn test_comparison_with_param() {
        match parse("customer_id = $1") {
            Expr::Compare { left, op, right } => {
                assert_eq!(*left, column("customer_id"));
                assert_eq!(op, ComparatorOp::Eq);
                assert_eq!(*right, Expr::Param(Param { ordinal: 1, offset: 14, length: 2 }));
            }
            _ => panic!(),
        }
    }

    #[test]
    pub fn test_precedence() {
        match parse("total - $1 > 100 AND a = 1 OR b = 2") {
            Expr::Or(items) => {
                assert_eq!(items.len(), 2);
                match &items[0] {
                    Expr::And(conditions) => match &conditions[0] {
                        Expr::Compare { left, op: ComparatorOp::Gt, .. } => match left.as_ref() {
                            Expr::Arithmetic { op: ArithmeticOp::Sub, .. } => {}
                            _ => panic!(),
                        },
                        _ => panic!(),
                    },
                    _ => panic!(),
                }
            }
            _ => panic!(),
        }
    }

    #[test]
    pub fn test_multiplication_binds_tighter() {
        match parse("a + b * c") {
            Expr::Arithmetic { op: ArithmeticOp::Add, right, .. } => match *right {
                Expr::Arithmetic { op: ArithmeticOp::Mul, .. } => {}
                _ => panic!(),
            },
            _ => panic!(),
        }
    }

    #[test]
    pub fn test_between_keeps_outer_and() {
        match parse("created_at BETWEEN $1 AND $2 AND active") {
            Expr::And(items) => {
                assert_eq!(items.len(), 2);
                match &items[0] {
                    Expr::Between { low, high, negated: false, .. } => {
                        assert_eq!(low.as_param().map(|p| p.ordinal), Some(1));
                        assert_eq!(high.as_param().map(|p| p.ordinal), Some(2));
                    }
                    _ => panic!(),
                }
            }
            _ => panic!(),
        }
    }

    #[test]
    pub fn test_not_in_list() {
        match parse("id NOT IN ($1, $2, 3)") {
            Expr::InList { list, negated: true, .. } => assert_eq!(list.len(), 3),
            _ => panic!(),
        }
    }

    #[test]
    pub fn test_in_subquery() {
        match parse("id IN (SELECT order_id FROM items WHERE sku = $1)") {
            Expr::InSubquery { negated: false, .. } => {}
            _ => panic!(),
        }
    }

    #[test]
    pub fn test_casts() {
        match parse("d::date = $1::date") {
            Expr::Compare { left, right, .. } => {
                assert_eq!(*left, Expr::Cast { expr: Box::new(column("d")), data_type: SqlType::Date });
                match *right {
                    Expr::Cast { data_type: SqlType::Date, .. } => {}
                    _ => panic!(),
                }
            }
            _ => panic!(),
        }

        match parse("CAST($2 AS numeric(10, 2))") {
            Expr::Cast { data_type: SqlType::Numeric, .. } => {}
            _ => panic!(),
        }
    }

    #[test]
    pub fn test_quantified_any() {
        match parse("id = ANY($1::int[])") {
            Expr::Quantified { quantifier: Quantifier::Any, right, .. } => match *right {
                Expr::Cast { data_type, .. } => assert_eq!(data_type, SqlType::array_of(SqlType::Integer)),
                _ => panic!(),
            },
            _ => panic!(),
        }
    }

    #[test]
    pub fn test_function_call_features() {
        match parse("count(DISTINCT o.id) FILTER (WHERE o.total > $1) OVER (PARTITION BY o.customer_id ORDER BY o.created_at DESC)") {
            Expr::Function(function) => {
                assert_eq!(function.name, "count");
                assert!(function.distinct);
                assert!(function.filter.is_some());
                assert_eq!(function.window.len(), 2);
            }
            _ => panic!(),
        }
    }

    #[test]
    pub fn test_special_function_forms() {
        match parse("extract(year FROM created_at)") {
            Expr::Function(function) => {
                assert_eq!(function.name, "extract");
                assert_eq!(function.args.len(), 2);
            }
            _ => panic!(),
        }

        match parse("substring(name FROM 1 FOR $1)") {
            Expr::Function(function) => assert_eq!(function.args.len(), 3),
            _ => panic!(),
        }

        match parse("position($1 IN name)") {
            Expr::Function(function) => assert_eq!(function.args.len(), 2),
            _ => panic!(),
        }

        match parse("trim(BOTH ' ' FROM $1)") {
            Expr::Function(function) => assert_eq!(function.args.len(), 2),
            _ => panic!(),
        }
    }

    #[test]
    pub fn test_case_expression() {
        match parse("CASE WHEN status = $1 THEN 1 ELSE 0 END") {
            Expr::Case { operand: None, branches, else_result: Some(_) } => assert_eq!(branches.len(), 1),
            _ => panic!(),
        }
    }

    #[test]
    pub fn test_is_predicates() {
        match parse("deleted_at IS NOT NULL") {
            Expr::IsNull { negated: true, .. } => {}
            _ => panic!(),
        }
        match parse("a IS NOT DISTINCT FROM $1") {
            Expr::Compare { op: ComparatorOp::IsNotDistinctFrom, .. } => {}
            _ => panic!(),
        }
        match parse("flag IS TRUE") {
            Expr::IsBool { value: Some(true), negated: false, .. } => {}
            _ => panic!(),
        }
    }

    #[test]
    pub fn test_json_and_like() {
        match parse("data->>'email' ILIKE $1") {
            Expr::Like { expr, case_insensitive: true, .. } => match *expr {
                Expr::Arithmetic { op: ArithmeticOp::JsonGetText, .. } => {}
                _ => panic!(),
            },
            _ => panic!(),
        }
    }

    #[test]
    pub fn test_literals() {
        assert_eq!(parse("-5"), Expr::Literal(Literal::Int(-5)));
        assert_eq!(parse("NULL"), Expr::Literal(Literal::Null));
        assert_eq!(
            parse("DATE '2024-01-01'"),
            Expr::Literal(Literal::Typed { ty: SqlType::Date, value: "2024-01-01".to_string() })
        );
        assert_eq!(parse("2.5"), Expr::Literal(Literal::from(2.5)));
    }

    #[test]
    pub fn test_tuple_and_array() {
        match parse("(a, b) = ($1, $2)") {
            Expr::Compare { left, .. } => match *left {
                Expr::Tuple(items) => assert_eq!(items.len(), 2),
                _ => panic!(),
            },
            _ => panic!(),
        }
        match parse("tags && ARRAY[$1, 'x']") {
            Expr::Compare { op: ComparatorOp::Overlaps, right, .. } => match *right {
                Expr::Array(items) => assert_eq!(items.len(), 2),
                _ => panic!(),
            },
            _ => panic!(),
        }
    }

    #[test]
    pub fn test_at_time_zone_and_subscript() {
        match parse("created_at AT TIME ZONE 'UTC'") {
            Expr::AtTimeZone { .. } => {}
            _ => panic!(),
        }
        match parse("tags[1]") {
            Expr::Subscript { upper: None, .. } => {}
            _ => panic!(),
        }
    }

    #[test]
    pub fn test_invalid_expression() {
        let mut parser = QueryParser::new("= 1");
        match Expr::parse(&mut parser) {
            Ok(_) => panic!(),
            Err(err) => assert_eq!(err.message, "Invalid expression"),
        }
    }

    #[test]
    pub fn test_deep_nesting_is_rejected() {
        let text = format!("{}1{}", "(".repeat(150), ")".repeat(150));
        let mut parser = QueryParser::new(&text);
        match Expr::parse(&mut parser) {
            Ok(_) => panic!(),
            Err(err) => assert_eq!(err.message, "Statement nested too deeply"),
        }
    }

    #[test]
    pub fn test_nesting_limit_fits_default_thread_stack() {
        let nested = |levels: usize| {
            format!("SELECT * FROM t WHERE a = {}$1{}", "(".repeat(levels), ")".repeat(levels))
        };

        let handle = std::thread::Builder::new()
            .stack_size(2 << 20)
            .spawn(move || {
                let shallow = Statement::try_from(nested(24).as_str()).is_ok();
                let deep = Statement::try_from(nested(200).as_str()).err().map(|err| err.message);
                let subqueries = format!(
                    "SELECT * FROM t WHERE a IN {}SELECT 1{}",
                    "(".repeat(60),
                    ")".repeat(60)
                );
                let deep_subquery = Statement::try_from(subqueries.as_str()).err().map(|err| err.message);
                (shallow, deep, deep_subquery)
            })
            .expect("Failed to spawn parser thread");

        let (shallow, deep, deep_subquery) = handle.join().expect("Parser overflowed a 2 MiB stack");
        assert!(shallow);
        assert_eq!(deep.as_deref(), Some("Statement nested too deeply"));
        assert!(deep_subquery.is_some());
    }
}
