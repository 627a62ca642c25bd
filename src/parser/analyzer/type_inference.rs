use chrono::{DateTime, NaiveDate, NaiveDateTime};
use uuid::Uuid;

use crate::{
    database::SqlType,
    parser::{
        analyzer::{Clause, NameHeuristics, Occurrence, Slot, TypeSource},
        ast::{ArithmeticOp, Expr, Literal, UnaryOp},
    },
};

/// Functions whose first argument is text whatever the column around them.
const TEXT_FUNCTIONS: &[&str] = &[
    "lower", "upper", "initcap", "trim", "btrim", "ltrim", "rtrim", "length", "char_length", "md5", "replace",
    "split_part", "strpos", "left", "right", "unaccent", "to_tsquery", "plainto_tsquery",
];

/// What one occurrence says about the placeholder's type without the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeHints {
    pub explicit_cast: Option<SqlType>,
    pub context: Option<SqlType>,
    pub literal_sibling: Option<SqlType>,
}

/// Everything known about one ordinal, in precedence order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeEvidence {
    pub explicit_cast: Option<SqlType>,
    pub catalog: Option<SqlType>,
    pub context: Option<SqlType>,
    pub literal_sibling: Option<SqlType>,
    pub guessed_name: Option<String>,
}

pub struct TypeInference;

impl TypeInference {
    pub fn infer(evidence: &TypeEvidence, heuristics: &NameHeuristics) -> (SqlType, TypeSource) {
        if let Some(ty) = &evidence.explicit_cast {
            return (ty.clone(), TypeSource::ExplicitCast);
        }
        if let Some(ty) = &evidence.catalog {
            return (ty.clone(), TypeSource::Catalog);
        }
        if let Some(ty) = &evidence.context {
            return (ty.clone(), TypeSource::Context);
        }
        if let Some(ty) = &evidence.literal_sibling {
            return (ty.clone(), TypeSource::LiteralSibling);
        }
        if let Some(ty) = evidence.guessed_name.as_deref().and_then(|name| heuristics.guess(name)) {
            return (ty, TypeSource::NameHeuristic);
        }
        (SqlType::Text, TypeSource::Default)
    }

    pub fn hints(occurrence: &Occurrence<'_>) -> TypeHints {
        TypeHints {
            explicit_cast: Self::explicit_cast(occurrence),
            context: Self::context_type(occurrence),
            literal_sibling: Self::literal_sibling(occurrence),
        }
    }

    /// The cast applied directly to the placeholder; in `$1::text::int` that is `text`.
    pub fn explicit_cast(occurrence: &Occurrence<'_>) -> Option<SqlType> {
        match occurrence.parent()?.node {
            Expr::Cast { data_type, .. } => Some(data_type.clone()),
            _ => None,
        }
    }

    /// Type the surrounding syntax expects from the placeholder itself.
    pub fn context_type(occurrence: &Occurrence<'_>) -> Option<SqlType> {
        let Some(parent) = occurrence.parent() else {
            return match occurrence.clause {
                Clause::Limit | Clause::Offset => Some(SqlType::BigInt),
                _ => None,
            };
        };

        match (parent.node, parent.slot) {
            (Expr::Like { .. }, Slot::Pattern | Slot::Escape) => Some(SqlType::Text),
            (Expr::IsBool { .. }, Slot::Subject) => Some(SqlType::Boolean),
            (Expr::Unary { op: UnaryOp::Not, .. }, Slot::Subject) => Some(SqlType::Boolean),
            (Expr::Case { .. }, Slot::Condition(_)) => Some(SqlType::Boolean),
            (Expr::Subscript { .. }, Slot::Index) => Some(SqlType::Integer),
            (Expr::Arithmetic { op: ArithmeticOp::JsonGet | ArithmeticOp::JsonGetText, .. }, Slot::Right) => {
                Some(SqlType::Text)
            }
            (Expr::Arithmetic { op: ArithmeticOp::JsonPath | ArithmeticOp::JsonPathText, .. }, Slot::Right) => {
                Some(SqlType::array_of(SqlType::Text))
            }
            (Expr::Function(function), Slot::Argument(0)) if TEXT_FUNCTIONS.contains(&function.base_name()) => {
                Some(SqlType::Text)
            }
            _ => None,
        }
    }

    /// Type of a literal the placeholder is compared, listed or computed with.
    pub fn literal_sibling(occurrence: &Occurrence<'_>) -> Option<SqlType> {
        let from_predicate = occurrence.predicate().and_then(|frame| match (frame.node, frame.slot) {
            (Expr::Compare { right, .. }, Slot::Left) => Self::literal_of(right),
            (Expr::Compare { left, .. }, Slot::Right) => Self::literal_of(left),
            (Expr::InList { list, .. }, _) => list.iter().find_map(Self::literal_of),
            (Expr::Between { low, high, .. }, _) => Self::literal_of(low).or_else(|| Self::literal_of(high)),
            (Expr::Like { pattern, .. }, Slot::Subject) => Self::literal_of(pattern),
            (Expr::Like { expr, .. }, Slot::Pattern) => Self::literal_of(expr),
            _ => None,
        });
        if from_predicate.is_some() {
            return from_predicate;
        }

        occurrence.ancestors.iter().find_map(|frame| match (frame.node, frame.slot) {
            (Expr::Arithmetic { op, right, .. }, Slot::Left) if op.is_numeric() => Self::literal_of(right),
            (Expr::Arithmetic { op, left, .. }, Slot::Right) if op.is_numeric() => Self::literal_of(left),
            (Expr::Case { branches, else_result, .. }, Slot::Result(_) | Slot::Else) => branches
                .iter()
                .map(|branch| &branch.result)
                .chain(else_result.as_deref())
                .find_map(Self::literal_of),
            _ => None,
        })
    }

    fn literal_of(expr: &Expr) -> Option<SqlType> {
        match expr {
            Expr::Literal(literal) => Self::literal_type(literal),
            Expr::Cast { expr, data_type } if matches!(expr.as_ref(), Expr::Literal(_)) => Some(data_type.clone()),
            Expr::Unary { op: UnaryOp::Neg, expr } => Self::literal_of(expr),
            _ => None,
        }
    }

    pub fn literal_type(literal: &Literal) -> Option<SqlType> {
        match literal {
            Literal::String(value) => Some(Self::string_type(value)),
            Literal::Int(value) => match i32::try_from(*value) {
                Ok(_) => Some(SqlType::Integer),
                Err(_) => Some(SqlType::BigInt),
            },
            Literal::Float(_) => Some(SqlType::Numeric),
            Literal::Bool(_) => Some(SqlType::Boolean),
            Literal::Typed { ty, .. } => Some(ty.clone()),
            Literal::Null => None,
        }
    }

    /// Refines a string constant that reads as a date, timestamp or uuid.
    pub fn string_type(value: &str) -> SqlType {
        let value = value.trim();

        if NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok() {
            return SqlType::Date;
        }
        if DateTime::parse_from_rfc3339(value).is_ok()
            || DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f%#z").is_ok()
        {
            return SqlType::TimestampTz;
        }
        if NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f").is_ok()
            || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
        {
            return SqlType::Timestamp;
        }
        if value.len() == 36 && Uuid::parse_str(value).is_ok() {
            return SqlType::Uuid;
        }
        SqlType::Text
    }
}
