use crate::{
    database::SqlType,
    parser::{
        ast::{ArithmeticOp, Column, ComparatorOp, ExprParser, Function, Literal, Quantifier, SelectQuery, UnaryOp},
        ParseError, QueryParser,
    },
};

/// One `$n` occurrence; `offset` is the character offset of the `$`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Param {
    pub ordinal: usize,
    /// Char offset of the `$`.
    pub offset: usize,
    /// Chars in the token, `$01` counts three.
    pub length: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseBranch {
    pub condition: Expr,
    pub result: Expr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Literal(Literal),
    Param(Param),
    Column(Column),
    WildCard,
    WildCardWithCollection(String),
    /// `DEFAULT` inside `VALUES` or `SET`.
    Default,
    Function(Function),
    Cast { expr: Box<Expr>, data_type: SqlType },
    Unary { op: UnaryOp, expr: Box<Expr> },
    Arithmetic { left: Box<Expr>, op: ArithmeticOp, right: Box<Expr> },
    Compare { left: Box<Expr>, op: ComparatorOp, right: Box<Expr> },
    /// `left op ANY (right)` / `left op ALL (right)`.
    Quantified { left: Box<Expr>, op: ComparatorOp, quantifier: Quantifier, right: Box<Expr> },
    Like { expr: Box<Expr>, pattern: Box<Expr>, negated: bool, case_insensitive: bool, escape: Option<Box<Expr>> },
    InList { expr: Box<Expr>, list: Vec<Expr>, negated: bool },
    InSubquery { expr: Box<Expr>, query: Box<SelectQuery>, negated: bool },
    Between { expr: Box<Expr>, low: Box<Expr>, high: Box<Expr>, negated: bool },
    IsNull { expr: Box<Expr>, negated: bool },
    /// `IS [NOT] TRUE | FALSE | UNKNOWN`; `value` is `None` for `UNKNOWN`.
    IsBool { expr: Box<Expr>, value: Option<bool>, negated: bool },
    And(Vec<Expr>),
    Or(Vec<Expr>),
    Not(Box<Expr>),
    Case { operand: Option<Box<Expr>>, branches: Vec<CaseBranch>, else_result: Option<Box<Expr>> },
    Subquery(Box<SelectQuery>),
    Exists(Box<SelectQuery>),
    /// `(a, b)` and `ROW(a, b)`.
    Tuple(Vec<Expr>),
    /// `ARRAY[a, b]`.
    Array(Vec<Expr>),
    Subscript { expr: Box<Expr>, index: Box<Expr>, upper: Option<Box<Expr>> },
    AtTimeZone { expr: Box<Expr>, zone: Box<Expr> },
    Collate { expr: Box<Expr>, collation: String },
}

impl Expr {
    pub fn parse(parser: &mut QueryParser) -> Result<Expr, ParseError> {
        ExprParser::parse(parser)
    }

    pub fn parse_list(parser: &mut QueryParser) -> Result<Vec<Expr>, ParseError> {
        let mut list = vec![Expr::parse(parser)?];
        while parser.take_char(',') {
            list.push(Expr::parse(parser)?);
        }
        Ok(list)
    }

    pub fn as_param(&self) -> Option<&Param> {
        match self {
            Expr::Param(param) => Some(param),
            _ => None,
        }
    }

    pub fn as_column(&self) -> Option<&Column> {
        match self {
            Expr::Column(column) => Some(column),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Expr::Literal(literal) => Some(literal),
            _ => None,
        }
    }

    /// True for boolean-valued nodes a placeholder can be bound through.
    pub fn is_predicate(&self) -> bool {
        matches!(
            self,
            Expr::Compare { .. }
                | Expr::Quantified { .. }
                | Expr::Like { .. }
                | Expr::InList { .. }
                | Expr::InSubquery { .. }
                | Expr::Between { .. }
                | Expr::IsNull { .. }
                | Expr::IsBool { .. }
        )
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, Expr::And(_) | Expr::Or(_) | Expr::Not(_))
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::{ast::{Column, Expr, Param}, QueryParser};

    #[test]
    pub fn test_parse_list() {
        let mut parser = QueryParser::new("a, $1, 'x'");
        let list = Expr::parse_list(&mut parser).expect("Failed to parse list");
        assert_eq!(list.len(), 3);
        assert_eq!(list[0].as_column(), Some(&Column::Name { name: "a".to_string() }));
        assert_eq!(list[1].as_param(), Some(&Param { ordinal: 1, offset: 3, length: 2 }));
        assert!(list[2].as_literal().is_some());
    }
}
