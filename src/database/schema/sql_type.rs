use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// PostgreSQL scalar type as far as placeholder typing cares about it.
///
/// Parsed leniently from catalog names, SQL spellings and internal aliases
/// (`int4`, `varchar(20)`, `_int4`, `timestamp with time zone`) and rendered
/// back with the canonical SQL name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SqlType {
    Text,
    Varchar,
    Char,
    SmallInt,
    Integer,
    BigInt,
    Numeric,
    Real,
    Double,
    Boolean,
    Date,
    Time,
    TimeTz,
    Timestamp,
    TimestampTz,
    Interval,
    Uuid,
    Json,
    Jsonb,
    Bytea,
    Inet,
    Cidr,
    Regclass,
    Oid,
    Name,
    Array(Box<SqlType>),
    Other(String),
}

impl SqlType {
    pub fn from_name(name: &str) -> SqlType {
        let lower = name.trim().to_lowercase();
        let lower = lower.strip_prefix("pg_catalog.").unwrap_or(&lower);

        if let Some(element) = lower.strip_suffix("[]") {
            return SqlType::Array(Box::new(SqlType::from_name(element)));
        }
        if lower == "array" {
            return SqlType::Array(Box::new(SqlType::Text));
        }
        if let Some(element) = lower.strip_prefix('_').filter(|element| !element.is_empty()) {
            return SqlType::Array(Box::new(SqlType::from_name(element)));
        }

        let normalized = Self::strip_modifiers(lower);

        match normalized.as_str() {
            "text" | "citext" => SqlType::Text,
            "varchar" | "character varying" => SqlType::Varchar,
            "char" | "character" | "bpchar" | "\"char\"" => SqlType::Char,
            "smallint" | "int2" | "smallserial" | "serial2" => SqlType::SmallInt,
            "int" | "integer" | "int4" | "serial" | "serial4" => SqlType::Integer,
            "bigint" | "int8" | "bigserial" | "serial8" => SqlType::BigInt,
            "numeric" | "decimal" | "money" => SqlType::Numeric,
            "real" | "float4" => SqlType::Real,
            "double precision" | "float8" | "float" => SqlType::Double,
            "boolean" | "bool" => SqlType::Boolean,
            "date" => SqlType::Date,
            "time" | "time without time zone" => SqlType::Time,
            "timetz" | "time with time zone" => SqlType::TimeTz,
            "timestamp" | "timestamp without time zone" => SqlType::Timestamp,
            "timestamptz" | "timestamp with time zone" => SqlType::TimestampTz,
            "uuid" => SqlType::Uuid,
            "json" => SqlType::Json,
            "jsonb" => SqlType::Jsonb,
            "bytea" => SqlType::Bytea,
            "inet" => SqlType::Inet,
            "cidr" => SqlType::Cidr,
            "regclass" => SqlType::Regclass,
            "oid" => SqlType::Oid,
            "name" => SqlType::Name,
            other if other.starts_with("interval") => SqlType::Interval,
            other => SqlType::Other(other.to_string()),
        }
    }

    /// Drops `(n)` / `(p, s)` modifiers wherever they appear and collapses whitespace.
    fn strip_modifiers(name: &str) -> String {
        let mut result = String::with_capacity(name.len());
        let mut depth = 0usize;
        for ch in name.chars() {
            match ch {
                '(' => depth += 1,
                ')' => depth = depth.saturating_sub(1),
                _ if depth == 0 => result.push(ch),
                _ => {}
            }
        }
        result.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    pub fn array_of(element: SqlType) -> SqlType {
        SqlType::Array(Box::new(element))
    }

    pub fn element(&self) -> &SqlType {
        match self {
            SqlType::Array(inner) => inner.element(),
            other => other,
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, SqlType::Array(_))
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            SqlType::SmallInt
                | SqlType::Integer
                | SqlType::BigInt
                | SqlType::Numeric
                | SqlType::Real
                | SqlType::Double
                | SqlType::Oid
        )
    }

    pub fn is_textual(&self) -> bool {
        matches!(self, SqlType::Text | SqlType::Varchar | SqlType::Char | SqlType::Name)
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, SqlType::Boolean)
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlType::Text => write!(f, "text"),
            SqlType::Varchar => write!(f, "character varying"),
            SqlType::Char => write!(f, "character"),
            SqlType::SmallInt => write!(f, "smallint"),
            SqlType::Integer => write!(f, "integer"),
            SqlType::BigInt => write!(f, "bigint"),
            SqlType::Numeric => write!(f, "numeric"),
            SqlType::Real => write!(f, "real"),
            SqlType::Double => write!(f, "double precision"),
            SqlType::Boolean => write!(f, "boolean"),
            SqlType::Date => write!(f, "date"),
            SqlType::Time => write!(f, "time"),
            SqlType::TimeTz => write!(f, "time with time zone"),
            SqlType::Timestamp => write!(f, "timestamp"),
            SqlType::TimestampTz => write!(f, "timestamp with time zone"),
            SqlType::Interval => write!(f, "interval"),
            SqlType::Uuid => write!(f, "uuid"),
            SqlType::Json => write!(f, "json"),
            SqlType::Jsonb => write!(f, "jsonb"),
            SqlType::Bytea => write!(f, "bytea"),
            SqlType::Inet => write!(f, "inet"),
            SqlType::Cidr => write!(f, "cidr"),
            SqlType::Regclass => write!(f, "regclass"),
            SqlType::Oid => write!(f, "oid"),
            SqlType::Name => write!(f, "name"),
            SqlType::Array(inner) => write!(f, "{}[]", inner),
            SqlType::Other(name) => write!(f, "{}", name),
        }
    }
}

impl Serialize for SqlType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SqlType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(SqlType::from_name(&name))
    }
}
