use ordered_float::NotNan;
use std::fmt::{self, Display};

use crate::database::SqlType;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Literal {
    String(String),
    Int(i64),
    Float(NotNan<f64>),
    Bool(bool),
    Null,
    /// `DATE '2024-01-01'`, `INTERVAL '1 day'` and friends.
    Typed { ty: SqlType, value: String },
}

/// Renders the constant back as SQL.
impl Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(value) => write!(f, "'{}'", value.replace('\'', "''")),
            Literal::Int(value) => write!(f, "{}", value),
            Literal::Float(value) => write!(f, "{}", value.into_inner()),
            Literal::Bool(true) => write!(f, "TRUE"),
            Literal::Bool(false) => write!(f, "FALSE"),
            Literal::Null => write!(f, "NULL"),
            Literal::Typed { ty, value } => write!(f, "{} '{}'", ty, value.replace('\'', "''")),
        }
    }
}

impl From<f64> for Literal {
    fn from(value: f64) -> Self {
        NotNan::new(value).map(Literal::Float).unwrap_or(Literal::Null)
    }
}

#[cfg(test)]
mod tests {
    use crate::{database::SqlType, parser::ast::Literal};

    #[test]
    fn test_renders_sql() {
        assert_eq!(Literal::String("it's".to_string()).to_string(), "'it''s'");
        assert_eq!(Literal::from(1.5).to_string(), "1.5");
        assert_eq!(Literal::Bool(false).to_string(), "FALSE");
        assert_eq!(Literal::from(f64::NAN), Literal::Null);
        assert_eq!(
            Literal::Typed { ty: SqlType::Date, value: "2024-01-01".to_string() }.to_string(),
            "date '2024-01-01'"
        );
    }
}
