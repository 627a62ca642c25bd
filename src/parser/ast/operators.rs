use crate::parser::{Keyword, QueryParser};

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparatorOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    IsDistinctFrom,
    IsNotDistinctFrom,
    Contains,
    ContainedBy,
    Overlaps,
    Match,
    MatchCi,
    NotMatch,
    NotMatchCi,
}

use std::fmt;

impl fmt::Display for ComparatorOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComparatorOp::Eq => write!(f, "="),
            ComparatorOp::NotEq => write!(f, "<>"),
            ComparatorOp::Lt => write!(f, "<"),
            ComparatorOp::LtEq => write!(f, "<="),
            ComparatorOp::Gt => write!(f, ">"),
            ComparatorOp::GtEq => write!(f, ">="),
            ComparatorOp::IsDistinctFrom => write!(f, "IS DISTINCT FROM"),
            ComparatorOp::IsNotDistinctFrom => write!(f, "IS NOT DISTINCT FROM"),
            ComparatorOp::Contains => write!(f, "@>"),
            ComparatorOp::ContainedBy => write!(f, "<@"),
            ComparatorOp::Overlaps => write!(f, "&&"),
            ComparatorOp::Match => write!(f, "~"),
            ComparatorOp::MatchCi => write!(f, "~*"),
            ComparatorOp::NotMatch => write!(f, "!~"),
            ComparatorOp::NotMatchCi => write!(f, "!~*"),
        }
    }
}

impl fmt::Debug for ComparatorOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComparatorOp({})", self)
    }
}

const COMPARATORS: &[(Keyword, ComparatorOp)] = &[
    (|c| &c.not_equal_b, ComparatorOp::NotEq),
    (|c| &c.not_equal_c, ComparatorOp::NotEq),
    (|c| &c.less_than_or_equal, ComparatorOp::LtEq),
    (|c| &c.greater_than_or_equal, ComparatorOp::GtEq),
    (|c| &c.contains, ComparatorOp::Contains),
    (|c| &c.contained_by, ComparatorOp::ContainedBy),
    (|c| &c.overlaps, ComparatorOp::Overlaps),
    (|c| &c.regex_not_match_ci, ComparatorOp::NotMatchCi),
    (|c| &c.regex_not_match, ComparatorOp::NotMatch),
    (|c| &c.regex_match_ci, ComparatorOp::MatchCi),
    (|c| &c.regex_match, ComparatorOp::Match),
    (|c| &c.less_than, ComparatorOp::Lt),
    (|c| &c.greater_than, ComparatorOp::Gt),
    (|c| &c.equal, ComparatorOp::Eq),
];

impl ComparatorOp {
    /// Consumes a symbolic comparison operator, longest spelling first.
    pub fn check(parser: &mut QueryParser) -> Option<ComparatorOp> {
        COMPARATORS
            .iter()
            .find(|(keyword, _)| parser.take(*keyword))
            .map(|(_, op)| *op)
    }

    /// Ordering comparisons, the ones a range or sort key participates in.
    pub fn is_ordering(&self) -> bool {
        matches!(self, ComparatorOp::Lt | ComparatorOp::LtEq | ComparatorOp::Gt | ComparatorOp::GtEq)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Concat,
    JsonGet,
    JsonGetText,
    JsonPath,
    JsonPathText,
}

impl fmt::Display for ArithmeticOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArithmeticOp::Add => write!(f, "+"),
            ArithmeticOp::Sub => write!(f, "-"),
            ArithmeticOp::Mul => write!(f, "*"),
            ArithmeticOp::Div => write!(f, "/"),
            ArithmeticOp::Mod => write!(f, "%"),
            ArithmeticOp::Pow => write!(f, "^"),
            ArithmeticOp::Concat => write!(f, "||"),
            ArithmeticOp::JsonGet => write!(f, "->"),
            ArithmeticOp::JsonGetText => write!(f, "->>"),
            ArithmeticOp::JsonPath => write!(f, "#>"),
            ArithmeticOp::JsonPathText => write!(f, "#>>"),
        }
    }
}

impl fmt::Debug for ArithmeticOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ArithmeticOp({})", self)
    }
}

const OTHER_OPERATORS: &[(Keyword, ArithmeticOp)] = &[
    (|c| &c.concat, ArithmeticOp::Concat),
    (|c| &c.json_get_text, ArithmeticOp::JsonGetText),
    (|c| &c.json_get, ArithmeticOp::JsonGet),
    (|c| &c.json_path_text, ArithmeticOp::JsonPathText),
    (|c| &c.json_path, ArithmeticOp::JsonPath),
];

const ADDITIVE: &[(Keyword, ArithmeticOp)] = &[
    (|c| &c.plus, ArithmeticOp::Add),
    (|c| &c.minus, ArithmeticOp::Sub),
];

const MULTIPLICATIVE: &[(Keyword, ArithmeticOp)] = &[
    (|c| &c.star, ArithmeticOp::Mul),
    (|c| &c.slash, ArithmeticOp::Div),
    (|c| &c.percent, ArithmeticOp::Mod),
];

const EXPONENT: &[(Keyword, ArithmeticOp)] = &[(|c| &c.caret, ArithmeticOp::Pow)];

/// Binary operator precedence levels, loosest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorLevel {
    Other,
    Additive,
    Multiplicative,
    Exponent,
}

impl OperatorLevel {
    pub fn tighter(&self) -> Option<OperatorLevel> {
        match self {
            OperatorLevel::Other => Some(OperatorLevel::Additive),
            OperatorLevel::Additive => Some(OperatorLevel::Multiplicative),
            OperatorLevel::Multiplicative => Some(OperatorLevel::Exponent),
            OperatorLevel::Exponent => None,
        }
    }

    fn operators(&self) -> &'static [(Keyword, ArithmeticOp)] {
        match self {
            OperatorLevel::Other => OTHER_OPERATORS,
            OperatorLevel::Additive => ADDITIVE,
            OperatorLevel::Multiplicative => MULTIPLICATIVE,
            OperatorLevel::Exponent => EXPONENT,
        }
    }
}

impl ArithmeticOp {
    pub fn check(parser: &mut QueryParser, level: OperatorLevel) -> Option<ArithmeticOp> {
        level
            .operators()
            .iter()
            .find(|(keyword, _)| parser.take(*keyword))
            .map(|(_, op)| *op)
    }

    /// Operators whose result keeps the operand's domain (`total - $1`), as
    /// opposed to string or JSON access that changes it.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ArithmeticOp::Add | ArithmeticOp::Sub | ArithmeticOp::Mul | ArithmeticOp::Div | ArithmeticOp::Mod | ArithmeticOp::Pow
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quantifier {
    Any,
    All,
}

#[cfg(test)]
mod tests {
    use crate::parser::{ast::{ArithmeticOp, ComparatorOp, OperatorLevel}, QueryParser};

    #[test]
    fn test_longest_comparator_wins() {
        let cases = [
            ("<= 1", ComparatorOp::LtEq),
            ("<> 1", ComparatorOp::NotEq),
            ("!= 1", ComparatorOp::NotEq),
            ("< 1", ComparatorOp::Lt),
            (">=1", ComparatorOp::GtEq),
            ("@> x", ComparatorOp::Contains),
            ("<@ x", ComparatorOp::ContainedBy),
            ("!~* x", ComparatorOp::NotMatchCi),
            ("~ x", ComparatorOp::Match),
            ("= $1", ComparatorOp::Eq),
        ];

        for (text, expected) in cases {
            let mut parser = QueryParser::new(text);
            assert_eq!(ComparatorOp::check(&mut parser), Some(expected), "{}", text);
        }
    }

    #[test]
    fn test_comparator_absent() {
        let mut parser = QueryParser::new("+ 1");
        assert_eq!(ComparatorOp::check(&mut parser), None);
        assert_eq!(parser.position, 0);
    }

    #[test]
    fn test_json_arrow_is_not_minus() {
        let mut parser = QueryParser::new("->> 'a'");
        assert_eq!(ArithmeticOp::check(&mut parser, OperatorLevel::Additive), None);
        assert_eq!(ArithmeticOp::check(&mut parser, OperatorLevel::Other), Some(ArithmeticOp::JsonGetText));
    }

    #[test]
    fn test_comment_is_not_division() {
        let mut parser = QueryParser::new("/* c */ * 2");
        assert_eq!(ArithmeticOp::check(&mut parser, OperatorLevel::Multiplicative), Some(ArithmeticOp::Mul));
    }
}
