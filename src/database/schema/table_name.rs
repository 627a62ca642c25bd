use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Optionally schema-qualified relation name, already case-folded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableName {
    pub schema: Option<String>,
    pub name: String,
}

impl TableName {
    pub fn new(name: &str) -> Self {
        Self { schema: None, name: name.to_string() }
    }

    pub fn qualified(schema: &str, name: &str) -> Self {
        Self { schema: Some(schema.to_string()), name: name.to_string() }
    }

    /// Builds a name from dotted parts; `db.schema.table` keeps the last two.
    pub fn from_parts(parts: &[String]) -> Option<Self> {
        match parts {
            [] => None,
            [name] => Some(Self::new(name)),
            [.., schema, name] => Some(Self::qualified(schema, name)),
        }
    }

    /// Same relation when schemas agree, or when either side leaves the schema open.
    pub fn matches(&self, other: &TableName) -> bool {
        self.name == other.name
            && match (&self.schema, &other.schema) {
                (Some(left), Some(right)) => left == right,
                _ => true,
            }
    }

    /// `schema.table` with each part double-quoted for use in generated SQL.
    pub fn quoted(&self) -> String {
        let quote = |part: &str| format!("\"{}\"", part.replace('"', "\"\""));
        match &self.schema {
            Some(schema) => format!("{}.{}", quote(schema), quote(&self.name)),
            None => quote(&self.name),
        }
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{}.{}", schema, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

impl FromStr for TableName {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let parts: Vec<String> = value
            .split('.')
            .map(|part| part.trim().to_string())
            .collect();

        if parts.iter().any(|part| part.is_empty()) {
            return Err(format!("Invalid table name '{}'", value));
        }

        TableName::from_parts(&parts).ok_or_else(|| format!("Invalid table name '{}'", value))
    }
}

impl Serialize for TableName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TableName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use crate::database::TableName;

    #[test]
    fn test_parse_qualified() {
        let name: TableName = "sales.orders".parse().unwrap();
        assert_eq!(name, TableName::qualified("sales", "orders"));
        assert_eq!(name.to_string(), "sales.orders");
    }

    #[test]
    fn test_parse_rejects_empty_part() {
        assert!("sales.".parse::<TableName>().is_err());
    }

    #[test]
    fn test_matches_open_schema() {
        let bare = TableName::new("orders");
        assert!(bare.matches(&TableName::qualified("public", "orders")));
        assert!(!TableName::qualified("a", "orders").matches(&TableName::qualified("b", "orders")));
    }

    #[test]
    fn test_quoted() {
        assert_eq!(TableName::qualified("public", "Order\"s").quoted(), "\"public\".\"Order\"\"s\"");
    }
}
